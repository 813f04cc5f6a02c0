//! RSS 2.0, RSS 1.0 (RDF) and Atom parsing.

use roxmltree::{Document, Node, ParsingOptions};

use crate::error::{AppError, AppResult};
use crate::models::FeedEntry;

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
const RSS1_NS: &str = "http://purl.org/rss/1.0/";

/// Parses a feed document into its entries, in document order.
///
/// Entries without a usable link are dropped; a missing title becomes empty.
pub fn parse_feed(xml: &str) -> AppResult<Vec<FeedEntry>> {
    // RSS 0.91 feeds commonly carry the Netscape DOCTYPE
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(xml, options)?;
    let root = doc.root_element();

    let entries = match root.tag_name().name() {
        "rss" => {
            let channel = rss_child(root, "channel")
                .ok_or_else(|| AppError::Feed("RSS document has no <channel>".to_string()))?;
            rss_items(channel)
        }
        // RSS 1.0 keeps items next to the channel, not inside it
        "RDF" => rss_items(root),
        "feed" if root.tag_name().namespace() == Some(ATOM_NS) => atom_entries(root),
        other => {
            return Err(AppError::Feed(format!(
                "unsupported document root <{other}>"
            )))
        }
    };

    Ok(entries)
}

fn is_rss_element(node: &Node, name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == name
        && node
            .tag_name()
            .namespace()
            .map_or(true, |ns| ns == RSS1_NS)
}

fn rss_child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| is_rss_element(n, name))
}

fn atom_children<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |n| {
        n.is_element() && n.tag_name().name() == name && n.tag_name().namespace() == Some(ATOM_NS)
    })
}

/// Concatenated text of a node and its descendants, trimmed.
fn text_of(node: Node) -> String {
    node.descendants()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .collect::<String>()
        .trim()
        .to_string()
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn rss_items(parent: Node) -> Vec<FeedEntry> {
    parent
        .children()
        .filter(|n| is_rss_element(n, "item"))
        .filter_map(|item| {
            let title = rss_child(item, "title").map(text_of).unwrap_or_default();
            let link = rss_child(item, "link")
                .map(text_of)
                .and_then(non_empty)
                .or_else(|| permalink_guid(item))?;
            Some(FeedEntry { title, link })
        })
        .collect()
}

/// A `<guid>` doubles as the link unless it is marked `isPermaLink="false"`.
fn permalink_guid(item: Node) -> Option<String> {
    let guid = rss_child(item, "guid")?;
    if guid.attribute("isPermaLink") == Some("false") {
        return None;
    }
    non_empty(text_of(guid))
}

fn atom_entries(feed: Node) -> Vec<FeedEntry> {
    atom_children(feed, "entry")
        .filter_map(|entry| {
            let title = atom_children(entry, "title")
                .next()
                .map(text_of)
                .unwrap_or_default();
            let link = atom_link(entry)?;
            Some(FeedEntry { title, link })
        })
        .collect()
}

fn link_href(link: &Node) -> Option<String> {
    link.attribute("href")
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(ToString::to_string)
}

/// The `alternate` link of an Atom entry; a link without `rel` counts as alternate.
fn atom_link(entry: Node) -> Option<String> {
    atom_children(entry, "link")
        .filter(|n| matches!(n.attribute("rel"), None | Some("alternate")))
        .find_map(|n| link_href(&n))
        .or_else(|| atom_children(entry, "link").find_map(|n| link_href(&n)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS2: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
  <channel>
    <title>Planet Python</title>
    <link>https://planetpython.org/</link>
    <atom:link href="https://planetpython.org/rss20.xml" rel="self"/>
    <item>
      <title>Real Python: Working With &lt;dataclasses&gt;</title>
      <link>https://realpython.com/dataclasses/</link>
      <atom:link href="https://ignored.example.com/"/>
    </item>
    <item>
      <title><![CDATA[PyCon & friends]]></title>
      <guid>https://example.com/pycon</guid>
    </item>
    <item>
      <title>Opaque guid only</title>
      <guid isPermaLink="false">tag:example.com,2024:1</guid>
    </item>
    <item>
      <link>  https://example.com/untitled  </link>
    </item>
  </channel>
</rss>"#;

    const RSS1: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns="http://purl.org/rss/1.0/">
  <channel rdf:about="https://example.com/">
    <title>Example</title>
    <link>https://example.com/</link>
  </channel>
  <item rdf:about="https://example.com/one">
    <title>One</title>
    <link>https://example.com/one</link>
  </item>
</rdf:RDF>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example Atom</title>
  <entry>
    <title type="html">First &amp; foremost</title>
    <link rel="edit" href="https://example.com/edit/1"/>
    <link rel="alternate" href="https://example.com/1"/>
  </entry>
  <entry>
    <title>No rel</title>
    <link href="https://example.com/2"/>
  </entry>
  <entry>
    <title>Only enclosure</title>
    <link rel="enclosure" href="https://example.com/3.mp3"/>
  </entry>
  <entry>
    <title>No link at all</title>
  </entry>
</feed>"#;

    // ============ RSS 2.0 테스트 ============

    #[test]
    fn test_rss2_items_in_order() {
        let entries = parse_feed(RSS2).unwrap();
        let links: Vec<&str> = entries.iter().map(|e| e.link.as_str()).collect();
        assert_eq!(
            links,
            vec![
                "https://realpython.com/dataclasses/",
                "https://example.com/pycon",
                "https://example.com/untitled",
            ]
        );
    }

    #[test]
    fn test_rss2_titles_are_unescaped() {
        let entries = parse_feed(RSS2).unwrap();
        assert_eq!(entries[0].title, "Real Python: Working With <dataclasses>");
        assert_eq!(entries[1].title, "PyCon & friends");
        assert_eq!(entries[2].title, "");
    }

    #[test]
    fn test_rss2_without_channel() {
        let err = parse_feed(r#"<rss version="2.0"></rss>"#).unwrap_err();
        assert!(matches!(err, AppError::Feed(_)));
    }

    #[test]
    fn test_rss2_empty_channel() {
        let entries = parse_feed("<rss><channel><title>t</title></channel></rss>").unwrap();
        assert!(entries.is_empty());
    }

    // ============ RSS 1.0 테스트 ============

    #[test]
    fn test_rss1_items() {
        let entries = parse_feed(RSS1).unwrap();
        assert_eq!(entries, vec![FeedEntry::new("One", "https://example.com/one")]);
    }

    // ============ Atom 테스트 ============

    #[test]
    fn test_atom_entries_prefer_alternate_links() {
        let entries = parse_feed(ATOM).unwrap();
        assert_eq!(
            entries,
            vec![
                FeedEntry::new("First & foremost", "https://example.com/1"),
                FeedEntry::new("No rel", "https://example.com/2"),
                FeedEntry::new("Only enclosure", "https://example.com/3.mp3"),
            ]
        );
    }

    #[test]
    fn test_rss091_with_doctype() {
        let xml = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<!DOCTYPE rss PUBLIC "-//Netscape Communications//DTD RSS 0.91//EN"
  "http://my.netscape.com/publish/formats/rss-0.91.dtd">
<rss version="0.91">
  <channel>
    <title>Old school</title>
    <item>
      <title>Hello</title>
      <link>https://example.com/a</link>
    </item>
  </channel>
</rss>"#;

        let entries = parse_feed(xml).unwrap();
        assert_eq!(entries, vec![FeedEntry::new("Hello", "https://example.com/a")]);
    }

    // ============ 오류 테스트 ============

    #[test]
    fn test_html_is_not_a_feed() {
        let err = parse_feed("<html><body>Moved</body></html>").unwrap_err();
        assert!(err.to_string().contains("<html>"));
    }

    #[test]
    fn test_feed_without_atom_namespace_is_rejected() {
        assert!(parse_feed("<feed><entry/></feed>").is_err());
    }

    #[test]
    fn test_malformed_xml() {
        assert!(matches!(
            parse_feed("<rss><channel>").unwrap_err(),
            AppError::Xml(_)
        ));
    }
}
