//! Link annotation for free-text attribute values.
//!
//! Two passes run over every value:
//!
//! 1. Markdown-like URL annotations are recognized on the raw text:
//!    `[text](url)`, `(text)[url]` and `text [url]`. Each becomes an external
//!    link and its text is never scanned again.
//! 2. In the plain text between those links, whole-word mentions of known
//!    node ids or labels become node links. At any position the longest name
//!    wins.
//!
//! All text is HTML-escaped on the way out.

use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::sync::LazyLock;

use super::escape_html;
use crate::graph::index::GraphIndex;

static MARKDOWN_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\[(?P<t1>[^\[\]]+)\]\((?P<u1>https?://[^)\s]+)\)",
        r"|\((?P<t2>[^()]+)\)\[(?P<u2>https?://[^\]\s]+)\]",
        r"|(?P<t3>[^\s.,;:!?\[\]()][^.,;:!?\[\]()]*?)\s*\[(?P<u3>https?://[^\]\s]+)\]",
    ))
    .expect("valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<'a> {
    Plain(&'a str),
    External { text: &'a str, url: &'a str },
}

/// Split raw text into plain runs and external links.
fn split_external_links(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for caps in MARKDOWN_LINK.captures_iter(text) {
        let (Some(whole), Some(link_text), Some(url)) = (
            caps.get(0),
            caps.name("t1")
                .or_else(|| caps.name("t2"))
                .or_else(|| caps.name("t3")),
            caps.name("u1")
                .or_else(|| caps.name("u2"))
                .or_else(|| caps.name("u3")),
        ) else {
            continue;
        };
        if whole.start() > cursor {
            segments.push(Segment::Plain(&text[cursor..whole.start()]));
        }
        segments.push(Segment::External {
            text: link_text.as_str().trim(),
            url: url.as_str(),
        });
        cursor = whole.end();
    }

    if cursor < text.len() {
        segments.push(Segment::Plain(&text[cursor..]));
    }
    segments
}

/// Finds mentions of node names and maps them to node ids.
pub struct LinkMatcher {
    pattern: Option<Regex>,
    targets: HashMap<String, String>,
}

impl LinkMatcher {
    /// Build a matcher over every node id and label of at least
    /// `min_name_len` characters. When a label equals another node's id,
    /// the id wins.
    pub fn new(index: &GraphIndex, min_name_len: usize) -> Result<Self, regex::Error> {
        let mut targets: HashMap<String, String> = HashMap::new();
        let long_enough =
            |name: &str| !name.trim().is_empty() && name.chars().count() >= min_name_len;

        for node in index.nodes() {
            if long_enough(node.id.as_str()) {
                targets.entry(node.id.clone()).or_insert_with(|| node.id.clone());
            }
        }
        for node in index.nodes() {
            if let Some(label) = &node.label
                && long_enough(label.as_str())
            {
                targets.entry(label.clone()).or_insert_with(|| node.id.clone());
            }
        }

        if targets.is_empty() {
            return Ok(Self {
                pattern: None,
                targets,
            });
        }

        let mut names: Vec<&String> = targets.keys().collect();
        names.sort_by(|a, b| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| a.cmp(b))
        });
        let alternation = names
            .iter()
            .map(|name| regex::escape(name))
            .collect::<Vec<_>>()
            .join("|");
        // Letters, digits and `_` may not touch a name on either side
        let pattern = RegexBuilder::new(&format!(
            r"(?:^|[^\p{{L}}\p{{N}}_])(?P<name>{})(?:$|[^\p{{L}}\p{{N}}_])",
            alternation
        ))
        .size_limit(1 << 26)
        .build()?;

        tracing::debug!("Link matcher built over {} names", targets.len());
        Ok(Self {
            pattern: Some(pattern),
            targets,
        })
    }

    /// Node id a name links to, if any.
    #[cfg(test)]
    pub fn target(&self, name: &str) -> Option<&str> {
        self.targets.get(name).map(String::as_str)
    }

    /// Annotate `text`, leaving mentions of `exclude` (the node whose panel
    /// is being rendered) unlinked.
    pub fn annotate(&self, text: &str, exclude: Option<&str>) -> String {
        let mut out = String::with_capacity(text.len());
        for segment in split_external_links(text) {
            match segment {
                Segment::Plain(plain) => self.link_names(plain, exclude, &mut out),
                Segment::External { text, url } => out.push_str(&format!(
                    r#"<a href="{}" class="external-link" target="_blank" rel="noopener noreferrer">{}</a>"#,
                    escape_html(url),
                    escape_html(text)
                )),
            }
        }
        out
    }

    fn link_names(&self, text: &str, exclude: Option<&str>, out: &mut String) {
        let Some(pattern) = &self.pattern else {
            out.push_str(&escape_html(text));
            return;
        };

        let mut cursor = 0;
        let mut search_from = 0;
        while search_from <= text.len() {
            let Some(caps) = pattern.captures_at(text, search_from) else {
                break;
            };
            let Some(name) = caps.name("name") else {
                break;
            };

            out.push_str(&escape_html(&text[cursor..name.start()]));
            match self.targets.get(name.as_str()) {
                Some(id) if Some(id.as_str()) != exclude => out.push_str(&node_link(id, name.as_str())),
                _ => out.push_str(&escape_html(name.as_str())),
            }
            cursor = name.end();
            // The trailing boundary character may open the next mention
            search_from = name.end();
        }
        out.push_str(&escape_html(&text[cursor..]));
    }
}

/// Anchor that selects and focuses a node when activated.
pub fn node_link(id: &str, text: &str) -> String {
    format!(
        r##"<a href="#" class="node-link" data-id="{}">{}</a>"##,
        escape_html(id),
        escape_html(text)
    )
}

/// Annotate `text` with external and node links.
pub fn annotate_links(text: &str, matcher: &LinkMatcher) -> String {
    matcher.annotate(text, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::graph::index::DegreePolicy;
    use crate::graph::model::Node;

    fn matcher(names: &[(&str, &str)]) -> LinkMatcher {
        let graph = Graph {
            nodes: names
                .iter()
                .map(|(id, label)| Node::new(*id).with_label(*label))
                .collect(),
            edges: Vec::new(),
        };
        let index = GraphIndex::build(graph, DegreePolicy::Distinct);
        LinkMatcher::new(&index, 2).unwrap()
    }

    #[test]
    fn test_links_two_known_names() {
        let m = matcher(&[("A", "Alice"), ("B", "Bob")]);
        let html = annotate_links("Alice met Bob", &m);
        assert_eq!(
            html,
            r##"<a href="#" class="node-link" data-id="A">Alice</a> met <a href="#" class="node-link" data-id="B">Bob</a>"##
        );
    }

    #[test]
    fn test_no_partial_word_links() {
        let m = matcher(&[("A", "Alice"), ("B", "Bob")]);
        let html = annotate_links("Alicebob wrote", &m);
        assert!(!html.contains("node-link"));
        assert_eq!(html, "Alicebob wrote");
    }

    #[test]
    fn test_adjacent_mentions() {
        let m = matcher(&[("A", "Alice"), ("B", "Bob")]);
        let html = annotate_links("Alice,Bob", &m);
        assert_eq!(html.matches("node-link").count(), 2);
    }

    #[test]
    fn test_longest_name_wins() {
        let m = matcher(&[("goya", "Goya"), ("jgoya", "Javier Goya")]);
        let html = annotate_links("Javier Goya was his son", &m);
        assert_eq!(html.matches("node-link").count(), 1);
        assert!(html.contains(r#"data-id="jgoya">Javier Goya</a>"#));
    }

    #[test]
    fn test_falls_back_to_shorter_name_when_longer_is_not_a_word() {
        let m = matcher(&[("ana", "Ana"), ("anam", "Ana Maria")]);
        let html = annotate_links("Ana Mariana", &m);
        assert!(html.contains(r#"data-id="ana">Ana</a>"#));
        assert!(!html.contains("data-id=\"anam\""));
    }

    #[test]
    fn test_ids_are_linked_too() {
        let m = matcher(&[("Goya", "Francisco de Goya")]);
        let html = annotate_links("Pupil of Goya.", &m);
        assert!(html.contains(r#"data-id="Goya">Goya</a>."#));
    }

    #[test]
    fn test_excluded_node_not_linked() {
        let m = matcher(&[("A", "Alice"), ("B", "Bob")]);
        let html = m.annotate("Alice met Bob", Some("A"));
        assert!(html.starts_with("Alice met "));
        assert_eq!(html.matches("node-link").count(), 1);
    }

    #[test]
    fn test_short_names_skipped() {
        let m = matcher(&[("A", "Alice")]);
        let html = annotate_links("A portrait", &m);
        assert_eq!(html, "A portrait");
        assert_eq!(m.target("Alice"), Some("A"));
        assert_eq!(m.target("A"), None);
    }

    #[test]
    fn test_markdown_bracket_paren() {
        let m = matcher(&[("B", "Bob")]);
        let html = annotate_links("See [Bob's page](https://example.org/bob)", &m);
        assert_eq!(
            html,
            r#"See <a href="https://example.org/bob" class="external-link" target="_blank" rel="noopener noreferrer">Bob&#39;s page</a>"#
        );
    }

    #[test]
    fn test_markdown_paren_bracket() {
        let m = matcher(&[]);
        let html = annotate_links("(Prado)[https://museodelprado.es]", &m);
        assert!(html.contains(r#"href="https://museodelprado.es""#));
        assert!(html.contains(">Prado</a>"));
    }

    #[test]
    fn test_markdown_trailing_url() {
        let m = matcher(&[("prado", "Museo del Prado")]);
        let html = annotate_links(
            "Born in Fuendetodos. Works in Museo del Prado [https://museodelprado.es]",
            &m,
        );
        assert!(html.starts_with("Born in Fuendetodos. <a href=\"https://museodelprado.es\""));
        assert!(html.contains(">Works in Museo del Prado</a>"));
        // Text inside the external link is not re-linked
        assert!(!html.contains("node-link"));
    }

    #[test]
    fn test_plain_brackets_are_not_links() {
        let m = matcher(&[]);
        assert_eq!(annotate_links("[sic] (1790)", &m), "[sic] (1790)");
    }

    #[test]
    fn test_escapes_html() {
        let m = matcher(&[("B", "Bob")]);
        let html = annotate_links("<b>Bob</b> & co", &m);
        assert!(html.starts_with("&lt;b&gt;<a href=\"#\""));
        assert!(html.ends_with("&lt;/b&gt; &amp; co"));
    }

    #[test]
    fn test_unicode_word_boundaries() {
        let m = matcher(&[("jose", "José"), ("b", "Bob")]);
        let html = annotate_links("Josééé and José", &m);
        assert_eq!(html.matches("node-link").count(), 1);
    }

    #[test]
    fn test_empty_graph_escapes_only() {
        let m = matcher(&[]);
        assert_eq!(annotate_links("a < b", &m), "a &lt; b");
        assert_eq!(annotate_links("", &m), "");
    }
}
