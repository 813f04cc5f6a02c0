//! 블랙리스트 필터 모듈.

/// Words and URL prefixes that keep an entry from being posted.
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    words: Vec<String>,
    urls: Vec<String>,
}

impl Blacklist {
    /// Words match case-insensitively anywhere in a title; URLs match as prefixes.
    pub fn new(words: Vec<String>, urls: Vec<String>) -> Self {
        let words = words
            .into_iter()
            .map(|w| w.to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        let urls = urls.into_iter().filter(|u| !u.is_empty()).collect();
        Self { words, urls }
    }

    pub fn contains_blacklisted_words(&self, title: &str) -> bool {
        let title = title.to_lowercase();
        self.words.iter().any(|word| title.contains(word.as_str()))
    }

    pub fn is_blacklisted_url(&self, url: &str) -> bool {
        self.urls.iter().any(|prefix| url.starts_with(prefix.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.urls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blacklist() -> Blacklist {
        Blacklist::new(
            vec!["Webinar".to_string(), "джанго".to_string()],
            vec!["https://ads.example.com/".to_string()],
        )
    }

    #[test]
    fn test_words_match_case_insensitively() {
        let bl = blacklist();
        assert!(bl.contains_blacklisted_words("Free WEBINAR on asyncio"));
        assert!(bl.contains_blacklisted_words("webinars galore"));
        assert!(bl.contains_blacklisted_words("Новости ДЖАНГО"));
        assert!(!bl.contains_blacklisted_words("Python 3.13 released"));
    }

    #[test]
    fn test_urls_match_as_prefix() {
        let bl = blacklist();
        assert!(bl.is_blacklisted_url("https://ads.example.com/promo/1"));
        assert!(!bl.is_blacklisted_url("https://example.com/?r=https://ads.example.com/"));
        assert!(!bl.is_blacklisted_url("http://ads.example.com/promo/1"));
    }

    #[test]
    fn test_empty_blacklist_allows_everything() {
        let bl = Blacklist::default();
        assert!(bl.is_empty());
        assert!(!bl.contains_blacklisted_words("anything"));
        assert!(!bl.is_blacklisted_url("https://anything"));
    }

    #[test]
    fn test_blank_items_are_ignored() {
        let bl = Blacklist::new(vec![String::new()], vec![String::new()]);
        assert!(bl.is_empty());
        assert!(!bl.contains_blacklisted_words("title"));
        assert!(!bl.is_blacklisted_url("https://example.com"));
    }
}
