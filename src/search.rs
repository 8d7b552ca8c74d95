use std::fmt;

use crate::graph::index::GraphIndex;
use crate::graph::model::{AttrValue, Edge, Node};

/// Search strategies, tried in this order until one yields a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMethod {
    Exact,
    Prefix,
    Substring,
    NodeAttribute,
    EdgeAttribute,
}

impl SearchMethod {
    pub const ORDER: [SearchMethod; 5] = [
        SearchMethod::Exact,
        SearchMethod::Prefix,
        SearchMethod::Substring,
        SearchMethod::NodeAttribute,
        SearchMethod::EdgeAttribute,
    ];
}

impl fmt::Display for SearchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchMethod::Exact => "exact match",
            SearchMethod::Prefix => "prefix match",
            SearchMethod::Substring => "name contains",
            SearchMethod::NodeAttribute => "node details contain",
            SearchMethod::EdgeAttribute => "connection details contain",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchHit {
    Node(String),
    Edge(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub method: SearchMethod,
    pub hits: Vec<SearchHit>,
}

/// Run the tiered search. Matching is case-insensitive; an empty query
/// matches nothing.
pub fn search(index: &GraphIndex, query: &str) -> Option<SearchResult> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    for method in SearchMethod::ORDER {
        let hits = match method {
            SearchMethod::EdgeAttribute => index
                .edges()
                .iter()
                .filter(|edge| edge_matches(edge, &needle))
                .map(|edge| SearchHit::Edge(edge.id.clone()))
                .collect::<Vec<_>>(),
            _ => node_hits(index, &needle, method),
        };
        if !hits.is_empty() {
            tracing::debug!("Search \"{}\": {} hit(s) by {}", query, hits.len(), method);
            return Some(SearchResult { method, hits });
        }
    }

    tracing::debug!("Search \"{}\": no match", query);
    None
}

fn node_hits(index: &GraphIndex, needle: &str, method: SearchMethod) -> Vec<SearchHit> {
    let mut nodes: Vec<&Node> = index
        .nodes()
        .iter()
        .filter(|node| {
            let names = names(node);
            match method {
                SearchMethod::Exact => names.iter().any(|name| name == needle),
                SearchMethod::Prefix => names.iter().any(|name| name.starts_with(needle)),
                SearchMethod::Substring => names.iter().any(|name| name.contains(needle)),
                _ => attribute_matches(node, needle),
            }
        })
        .collect();
    nodes.sort_by(|a, b| {
        a.display_name()
            .cmp(b.display_name())
            .then_with(|| a.id.cmp(&b.id))
    });
    nodes
        .into_iter()
        .map(|node| SearchHit::Node(node.id.clone()))
        .collect()
}

fn names(node: &Node) -> Vec<String> {
    let mut names = vec![node.id.to_lowercase()];
    if let Some(label) = &node.label {
        names.push(label.to_lowercase());
    }
    names
}

/// Lower-cased text of every searchable node attribute other than its names,
/// one value per line. The image URL is not searched.
pub fn node_search_text(node: &Node) -> String {
    let mut parts: Vec<&str> = [node.group.as_deref(), node.image_source.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    parts.extend(node.fields.values().flat_map(AttrValue::texts));
    parts.extend(node.extra.values().flat_map(AttrValue::texts));
    parts.join("\n").to_lowercase()
}

/// Lower-cased text of an edge's label, connection level and attributes.
pub fn edge_search_text(edge: &Edge) -> String {
    let level = edge.connection_level.as_ref().map(|level| level.to_string());
    let mut parts: Vec<&str> = [edge.label.as_deref(), level.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    parts.extend(edge.fields.values().flat_map(AttrValue::texts));
    parts.extend(edge.extra.values().flat_map(AttrValue::texts));
    parts.join("\n").to_lowercase()
}

fn attribute_matches(node: &Node, needle: &str) -> bool {
    node_search_text(node).contains(needle)
}

fn edge_matches(edge: &Edge, needle: &str) -> bool {
    edge_search_text(edge).contains(needle)
}
