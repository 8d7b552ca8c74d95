//! Interactive state: what is selected and how every node and edge is
//! highlighted, plus the controller that drives selection from clicks,
//! searches and URL fragments.

use std::collections::HashMap;

use crate::config::Config;
use crate::error::SearchError;
use crate::graph::Graph;
use crate::graph::index::GraphIndex;
use crate::panel::PanelRenderer;
use crate::panel::links::LinkMatcher;
use crate::search::{SearchHit, SearchMethod, search};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Node(String),
    Edge(String),
}

/// Non-default styling. Anything without an entry is drawn normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Selected,
    Neighbor,
    Dimmed,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ViewState {
    selection: Option<Selection>,
    nodes: HashMap<String, Highlight>,
    edges: HashMap<String, Highlight>,
}

impl ViewState {
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn node_highlight(&self, id: &str) -> Option<Highlight> {
        self.nodes.get(id).copied()
    }

    pub fn edge_highlight(&self, id: &str) -> Option<Highlight> {
        self.edges.get(id).copied()
    }

    /// True when nothing is selected and nothing carries a highlight.
    pub fn is_default(&self) -> bool {
        self.selection.is_none() && self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn reset(&mut self) {
        self.selection = None;
        self.nodes.clear();
        self.edges.clear();
    }

    /// Highlight a node and its neighbors, dimming the rest. Unknown ids
    /// leave the state untouched.
    pub fn select_node(&mut self, index: &GraphIndex, id: &str) -> bool {
        if index.node(id).is_none() {
            return false;
        }
        self.reset();

        for node in index.nodes() {
            let highlight = if node.id == id {
                Highlight::Selected
            } else if index.is_neighbor(id, &node.id) {
                Highlight::Neighbor
            } else {
                Highlight::Dimmed
            };
            self.nodes.insert(node.id.clone(), highlight);
        }
        for edge in index.edges() {
            let highlight = if edge.touches(id) {
                Highlight::Neighbor
            } else {
                Highlight::Dimmed
            };
            self.edges.insert(edge.id.clone(), highlight);
        }

        self.selection = Some(Selection::Node(id.to_string()));
        true
    }

    /// Highlight an edge and both endpoints, dimming the rest.
    pub fn select_edge(&mut self, index: &GraphIndex, id: &str) -> bool {
        let Some(edge) = index.edge(id) else {
            return false;
        };
        self.reset();

        for node in index.nodes() {
            let highlight = if edge.touches(&node.id) {
                Highlight::Selected
            } else {
                Highlight::Dimmed
            };
            self.nodes.insert(node.id.clone(), highlight);
        }
        for other in index.edges() {
            let highlight = if other.id == edge.id {
                Highlight::Selected
            } else {
                Highlight::Dimmed
            };
            self.edges.insert(other.id.clone(), highlight);
        }

        self.selection = Some(Selection::Edge(id.to_string()));
        true
    }
}

/// What the UI should show after a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelUpdate {
    pub html: String,
    /// Node to pan and zoom to
    pub focus: Option<String>,
    /// URL fragment to write into the address bar
    pub fragment: Option<String>,
}

/// URL fragment for a node: display name with spaces as underscores,
/// percent-encoded.
pub fn fragment_for(display_name: &str) -> String {
    format!("#{}", urlencoding::encode(&display_name.replace(' ', "_")))
}

/// Decode a fragment back into the name it was made from.
pub fn name_from_fragment(fragment: &str) -> String {
    let raw = fragment.trim().trim_start_matches('#');
    let decoded = urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    decoded.replace('_', " ")
}

/// Owns the graph index, link matcher and view state for one session.
pub struct Explorer {
    index: GraphIndex,
    links: LinkMatcher,
    view: ViewState,
}

impl Explorer {
    pub fn new(graph: Graph, config: &Config) -> Result<Self, regex::Error> {
        let index = GraphIndex::build(graph, config.data.degree_policy);
        let links = LinkMatcher::new(&index, config.panel.min_link_name_len)?;
        Ok(Self {
            index,
            links,
            view: ViewState::default(),
        })
    }

    pub fn index(&self) -> &GraphIndex {
        &self.index
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn renderer(&self) -> PanelRenderer<'_> {
        PanelRenderer::new(&self.index, &self.links)
    }

    /// Select a node as if it had been clicked. A stale id is a no-op.
    pub fn select_node(&mut self, id: &str) -> Option<PanelUpdate> {
        let html = self.renderer().render_node(id)?;
        self.view.select_node(&self.index, id);
        let fragment = self
            .index
            .node(id)
            .map(|node| fragment_for(node.display_name()));
        Some(PanelUpdate {
            html,
            focus: Some(id.to_string()),
            fragment,
        })
    }

    pub fn select_edge(&mut self, id: &str) -> Option<PanelUpdate> {
        let html = self.renderer().render_edge(id)?;
        self.view.select_edge(&self.index, id);
        let focus = self.index.edge(id).map(|edge| edge.from.clone());
        Some(PanelUpdate {
            html,
            focus,
            fragment: None,
        })
    }

    /// Search and select the first hit. A miss leaves the view unchanged.
    pub fn search(&mut self, query: &str) -> Result<(SearchMethod, PanelUpdate), SearchError> {
        let no_match = || SearchError::NoMatch(query.trim().to_string());
        let result = search(&self.index, query).ok_or_else(no_match)?;
        let update = match result.hits.first() {
            Some(SearchHit::Node(id)) => self.select_node(id),
            Some(SearchHit::Edge(id)) => self.select_edge(id),
            None => None,
        };
        update
            .map(|update| (result.method, update))
            .ok_or_else(no_match)
    }

    /// Resolve a node name: URL fragment (`#Name_With_Underscores`), id, or
    /// label.
    pub fn resolve(&self, name: &str) -> Option<String> {
        let name = if name.trim_start().starts_with('#') {
            name_from_fragment(name)
        } else {
            name.to_string()
        };
        self.index
            .resolve(&name)
            .or_else(|| self.index.resolve(&name.replace(' ', "_")))
            .map(|node| node.id.clone())
    }

    /// Select the node a deep link points at.
    pub fn open_fragment(&mut self, fragment: &str) -> Option<PanelUpdate> {
        let id = self.resolve(fragment)?;
        self.select_node(&id)
    }

    pub fn clear(&mut self) {
        self.view.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::{AttrValue, Edge, Node, NodeField};

    fn explorer() -> Explorer {
        let graph = Graph {
            nodes: vec![
                Node::new("A").with_label("Alice"),
                Node::new("B").with_label("Bob"),
                Node::new("C").with_label("Carol Ann").with_field(
                    NodeField::Notes,
                    AttrValue::Text("Once mentioned a alice in passing".into()),
                ),
            ],
            edges: vec![Edge::new("e0", "A", "B"), Edge::new("e1", "B", "C")],
        };
        Explorer::new(graph, &Config::default()).unwrap()
    }

    #[test]
    fn test_select_node_highlights_neighbors() {
        let mut ex = explorer();
        let update = ex.select_node("A").unwrap();
        assert!(update.html.contains("Connections: 1"));
        assert_eq!(update.focus.as_deref(), Some("A"));
        assert_eq!(update.fragment.as_deref(), Some("#Alice"));

        let view = ex.view();
        assert_eq!(view.selection(), Some(&Selection::Node("A".into())));
        assert_eq!(view.node_highlight("A"), Some(Highlight::Selected));
        assert_eq!(view.node_highlight("B"), Some(Highlight::Neighbor));
        assert_eq!(view.node_highlight("C"), Some(Highlight::Dimmed));
        assert_eq!(view.edge_highlight("e0"), Some(Highlight::Neighbor));
        assert_eq!(view.edge_highlight("e1"), Some(Highlight::Dimmed));
    }

    #[test]
    fn test_new_selection_reverts_previous() {
        let mut ex = explorer();
        ex.select_node("A").unwrap();
        ex.select_node("C").unwrap();
        let view = ex.view();
        assert_eq!(view.node_highlight("A"), Some(Highlight::Dimmed));
        assert_eq!(view.node_highlight("B"), Some(Highlight::Neighbor));
        assert_eq!(view.node_highlight("C"), Some(Highlight::Selected));
        assert_eq!(view.edge_highlight("e0"), Some(Highlight::Dimmed));
    }

    #[test]
    fn test_select_then_clear_leaves_no_highlight() {
        let mut ex = explorer();
        ex.select_node("A").unwrap();
        ex.select_node("B").unwrap();
        ex.clear();
        let view = ex.view();
        assert!(view.is_default());
        for id in ["A", "B", "C"] {
            assert_eq!(view.node_highlight(id), None);
        }
        for id in ["e0", "e1"] {
            assert_eq!(view.edge_highlight(id), None);
        }
    }

    #[test]
    fn test_stale_id_is_noop() {
        let mut ex = explorer();
        ex.select_node("A").unwrap();
        let before = ex.view().clone();
        assert!(ex.select_node("ghost").is_none());
        assert!(ex.select_edge("ghost").is_none());
        assert_eq!(ex.view(), &before);
    }

    #[test]
    fn test_select_edge() {
        let mut ex = explorer();
        let update = ex.select_edge("e1").unwrap();
        assert!(update.html.contains("Connection"));
        assert_eq!(update.focus.as_deref(), Some("B"));
        let view = ex.view();
        assert_eq!(view.selection(), Some(&Selection::Edge("e1".into())));
        assert_eq!(view.node_highlight("B"), Some(Highlight::Selected));
        assert_eq!(view.node_highlight("C"), Some(Highlight::Selected));
        assert_eq!(view.node_highlight("A"), Some(Highlight::Dimmed));
        assert_eq!(view.edge_highlight("e1"), Some(Highlight::Selected));
        assert_eq!(view.edge_highlight("e0"), Some(Highlight::Dimmed));
    }

    #[test]
    fn test_search_focuses_match() {
        let mut ex = explorer();
        let (method, update) = ex.search("bob").unwrap();
        assert_eq!(method, SearchMethod::Exact);
        assert_eq!(update.focus.as_deref(), Some("B"));
        assert_eq!(ex.view().node_highlight("B"), Some(Highlight::Selected));
    }

    #[test]
    fn test_search_exact_id_wins_over_free_text() {
        let mut ex = explorer();
        let (_, update) = ex.search("alice").unwrap();
        assert_eq!(update.focus.as_deref(), Some("A"));
    }

    #[test]
    fn test_search_miss_keeps_state() {
        let mut ex = explorer();
        ex.select_node("C").unwrap();
        let before = ex.view().clone();
        let err = ex.search("zzz").unwrap_err();
        assert_eq!(err, SearchError::NoMatch("zzz".into()));
        assert_eq!(ex.view(), &before);
    }

    #[test]
    fn test_fragments() {
        assert_eq!(fragment_for("Carol Ann"), "#Carol_Ann");
        assert_eq!(fragment_for("José"), "#Jos%C3%A9");
        assert_eq!(name_from_fragment("#Jos%C3%A9_Bayeu"), "José Bayeu");
        assert_eq!(name_from_fragment("Carol_Ann"), "Carol Ann");
    }

    #[test]
    fn test_open_fragment() {
        let mut ex = explorer();
        let update = ex.open_fragment("#Carol_Ann").unwrap();
        assert_eq!(update.focus.as_deref(), Some("C"));
        assert_eq!(update.fragment.as_deref(), Some("#Carol_Ann"));
        assert!(ex.open_fragment("#Nobody").is_none());
    }

    #[test]
    fn test_resolve_plain_names() {
        let ex = explorer();
        assert_eq!(ex.resolve("B").as_deref(), Some("B"));
        assert_eq!(ex.resolve("carol ann").as_deref(), Some("C"));
        assert_eq!(ex.resolve("Dave"), None);
    }
}
