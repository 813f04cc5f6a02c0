//! Escaping for Telegram's HTML parse mode.

/// Escapes text placed between HTML tags.
///
/// Telegram only understands the `&lt;`, `&gt;`, `&amp;` and `&quot;` entities.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes a value placed inside a double-quoted attribute.
#[must_use]
pub fn escape_attr(s: &str) -> String {
    escape_html(s).replace('"', "&quot;")
}
