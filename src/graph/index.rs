use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

use super::model::{Edge, Node};
use super::Graph;

/// How repeated edges between the same pair of nodes count towards degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DegreePolicy {
    /// Each unordered pair counts once; a self-loop counts once.
    #[default]
    Distinct,
    /// Every edge counts at both endpoints.
    PerEdge,
}

/// Lookup tables over a loaded graph.
pub struct GraphIndex {
    graph: Graph,
    by_id: HashMap<String, usize>,
    /// Exact label -> node position (first node wins)
    by_label: HashMap<String, usize>,
    /// Lower-cased id and label -> node position, for lenient lookups
    by_folded: HashMap<String, usize>,
    edge_by_id: HashMap<String, usize>,
    neighbors: Vec<BTreeSet<usize>>,
    incident: Vec<Vec<usize>>,
    degrees: Vec<usize>,
    distinct_pairs: usize,
}

impl GraphIndex {
    pub fn build(graph: Graph, policy: DegreePolicy) -> Self {
        let mut by_id = HashMap::new();
        let mut by_label = HashMap::new();
        let mut by_folded = HashMap::new();

        for (pos, node) in graph.nodes.iter().enumerate() {
            by_id.entry(node.id.clone()).or_insert(pos);
            if let Some(label) = &node.label {
                by_label.entry(label.clone()).or_insert(pos);
            }
        }
        // Ids take precedence over labels for case-insensitive lookups
        for (pos, node) in graph.nodes.iter().enumerate() {
            by_folded.entry(node.id.to_lowercase()).or_insert(pos);
        }
        for (pos, node) in graph.nodes.iter().enumerate() {
            if let Some(label) = &node.label {
                by_folded.entry(label.to_lowercase()).or_insert(pos);
            }
        }

        let node_count = graph.nodes.len();
        let mut neighbors = vec![BTreeSet::new(); node_count];
        let mut incident = vec![Vec::new(); node_count];
        let mut per_edge = vec![0usize; node_count];
        let mut pairs: HashSet<(usize, usize)> = HashSet::new();
        let mut edge_by_id = HashMap::new();

        for (edge_pos, edge) in graph.edges.iter().enumerate() {
            edge_by_id.entry(edge.id.clone()).or_insert(edge_pos);

            let (Some(&a), Some(&b)) = (by_id.get(&edge.from), by_id.get(&edge.to)) else {
                tracing::debug!("Edge {} references an unknown node", edge.id);
                continue;
            };

            per_edge[a] += 1;
            per_edge[b] += 1;
            incident[a].push(edge_pos);
            if a != b {
                incident[b].push(edge_pos);
            }
            // A self-loop makes the node its own neighbor
            neighbors[a].insert(b);
            neighbors[b].insert(a);
            pairs.insert((a.min(b), a.max(b)));
        }

        let degrees = match policy {
            DegreePolicy::PerEdge => per_edge,
            DegreePolicy::Distinct => {
                let mut degrees = vec![0usize; node_count];
                for &(a, b) in &pairs {
                    degrees[a] += 1;
                    if a != b {
                        degrees[b] += 1;
                    }
                }
                degrees
            }
        };

        Self {
            graph,
            by_id,
            by_label,
            by_folded,
            edge_by_id,
            neighbors,
            incident,
            degrees,
            distinct_pairs: pairs.len(),
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.graph.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.graph.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.by_id.get(id).map(|&pos| &self.graph.nodes[pos])
    }

    pub fn node_by_label(&self, label: &str) -> Option<&Node> {
        self.by_label.get(label).map(|&pos| &self.graph.nodes[pos])
    }

    /// Resolve a user-supplied name: exact id, exact label, then either
    /// compared case-insensitively.
    pub fn resolve(&self, name: &str) -> Option<&Node> {
        let name = name.trim();
        self.node(name)
            .or_else(|| self.node_by_label(name))
            .or_else(|| {
                self.by_folded
                    .get(&name.to_lowercase())
                    .map(|&pos| &self.graph.nodes[pos])
            })
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edge_by_id.get(id).map(|&pos| &self.graph.edges[pos])
    }

    /// All edges joining `a` and `b`, in document order.
    pub fn edges_between(&self, a: &str, b: &str) -> Vec<&Edge> {
        self.incident_edges(a)
            .into_iter()
            .filter(|edge| {
                (edge.from == a && edge.to == b) || (edge.from == b && edge.to == a)
            })
            .collect()
    }

    pub fn incident_edges(&self, id: &str) -> Vec<&Edge> {
        match self.by_id.get(id) {
            Some(&pos) => self.incident[pos]
                .iter()
                .map(|&edge_pos| &self.graph.edges[edge_pos])
                .collect(),
            None => Vec::new(),
        }
    }

    /// Distinct neighbors sorted by display name, then id. A node with a
    /// self-loop is listed among its own neighbors, so under
    /// [`DegreePolicy::Distinct`] the count always equals its degree.
    pub fn neighbors(&self, id: &str) -> Vec<&Node> {
        let Some(&pos) = self.by_id.get(id) else {
            return Vec::new();
        };
        let mut nodes: Vec<&Node> = self.neighbors[pos]
            .iter()
            .map(|&n| &self.graph.nodes[n])
            .collect();
        nodes.sort_by(|a, b| {
            a.display_name()
                .cmp(b.display_name())
                .then_with(|| a.id.cmp(&b.id))
        });
        nodes
    }

    pub fn is_neighbor(&self, a: &str, b: &str) -> bool {
        match (self.by_id.get(a), self.by_id.get(b)) {
            (Some(&a), Some(&b)) => self.neighbors[a].contains(&b),
            _ => false,
        }
    }

    pub fn degree(&self, id: &str) -> usize {
        self.by_id.get(id).map(|&pos| self.degrees[pos]).unwrap_or(0)
    }

    /// Number of distinct unordered endpoint pairs.
    pub fn distinct_connections(&self) -> usize {
        self.distinct_pairs
    }

    /// Undirected petgraph view with one edge per distinct pair. Node weights
    /// are node ids.
    pub fn to_petgraph(&self) -> UnGraph<String, ()> {
        let mut graph = UnGraph::new_undirected();
        let indices: Vec<NodeIndex> = self
            .graph
            .nodes
            .iter()
            .map(|node| graph.add_node(node.id.clone()))
            .collect();

        for (a, targets) in self.neighbors.iter().enumerate() {
            for &b in targets.range(a + 1..) {
                graph.add_edge(indices[a], indices[b], ());
            }
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(nodes: &[(&str, &str)], edges: &[(&str, &str)]) -> Graph {
        Graph {
            nodes: nodes
                .iter()
                .map(|(id, label)| Node::new(*id).with_label(*label))
                .collect(),
            edges: edges
                .iter()
                .enumerate()
                .map(|(i, (from, to))| Edge::new(format!("e{}", i), *from, *to))
                .collect(),
        }
    }

    #[test]
    fn test_lookup_by_id_and_label() {
        let index = GraphIndex::build(
            graph(&[("A", "Alice"), ("B", "Bob")], &[("A", "B")]),
            DegreePolicy::Distinct,
        );
        assert_eq!(index.node("A").unwrap().display_name(), "Alice");
        assert_eq!(index.node_by_label("Bob").unwrap().id, "B");
        assert_eq!(index.resolve("bob").unwrap().id, "B");
        assert_eq!(index.resolve(" a ").unwrap().id, "A");
        assert!(index.resolve("carol").is_none());
        assert!(index.node("missing").is_none());
    }

    #[test]
    fn test_degree_deduplicates_pairs() {
        let index = GraphIndex::build(
            graph(
                &[("A", "Alice"), ("B", "Bob"), ("C", "Carol")],
                &[("A", "B"), ("B", "A"), ("A", "B"), ("A", "C")],
            ),
            DegreePolicy::Distinct,
        );
        assert_eq!(index.degree("A"), 2);
        assert_eq!(index.degree("B"), 1);
        assert_eq!(index.degree("C"), 1);
        assert_eq!(index.distinct_connections(), 2);
    }

    #[test]
    fn test_degree_per_edge_policy() {
        let index = GraphIndex::build(
            graph(
                &[("A", "Alice"), ("B", "Bob")],
                &[("A", "B"), ("B", "A")],
            ),
            DegreePolicy::PerEdge,
        );
        assert_eq!(index.degree("A"), 2);
        assert_eq!(index.degree("B"), 2);
    }

    #[test]
    fn test_self_loop_counts_once() {
        let index = GraphIndex::build(
            graph(&[("A", "Alice")], &[("A", "A"), ("A", "A")]),
            DegreePolicy::Distinct,
        );
        assert_eq!(index.degree("A"), 1);
        let ids: Vec<&str> = index.neighbors("A").iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["A"]);
    }

    #[test]
    fn test_degree_matches_distinct_pairs_for_every_node() {
        let g = graph(
            &[("A", "a"), ("B", "b"), ("C", "c"), ("D", "d")],
            &[("A", "B"), ("B", "C"), ("C", "B"), ("C", "D"), ("D", "A"), ("A", "B")],
        );
        let index = GraphIndex::build(g.clone(), DegreePolicy::Distinct);
        for node in &g.nodes {
            let mut pairs: Vec<(&str, &str)> = g
                .edges
                .iter()
                .filter(|e| e.touches(&node.id))
                .map(|e| e.unordered_pair())
                .collect();
            pairs.sort();
            pairs.dedup();
            assert_eq!(index.degree(&node.id), pairs.len(), "node {}", node.id);
            assert_eq!(index.neighbors(&node.id).len(), pairs.len(), "node {}", node.id);
        }
    }

    #[test]
    fn test_neighbors_sorted_by_display_name() {
        let index = GraphIndex::build(
            graph(
                &[("hub", "Hub"), ("z", "Zoe"), ("a", "Maria"), ("m", "Ana")],
                &[("hub", "z"), ("hub", "a"), ("m", "hub")],
            ),
            DegreePolicy::Distinct,
        );
        let names: Vec<&str> = index
            .neighbors("hub")
            .iter()
            .map(|n| n.display_name())
            .collect();
        assert_eq!(names, vec!["Ana", "Maria", "Zoe"]);
    }

    #[test]
    fn test_edges_between_and_incident() {
        let index = GraphIndex::build(
            graph(
                &[("A", "Alice"), ("B", "Bob"), ("C", "Carol")],
                &[("A", "B"), ("B", "A"), ("B", "C")],
            ),
            DegreePolicy::Distinct,
        );
        assert_eq!(index.edges_between("A", "B").len(), 2);
        assert_eq!(index.edges_between("A", "C").len(), 0);
        assert_eq!(index.incident_edges("B").len(), 3);
        assert!(index.is_neighbor("C", "B"));
        assert!(!index.is_neighbor("A", "C"));
        assert_eq!(index.edge("e2").unwrap().to, "C");
    }

    #[test]
    fn test_to_petgraph_one_edge_per_pair() {
        let index = GraphIndex::build(
            graph(
                &[("A", "Alice"), ("B", "Bob"), ("C", "Carol")],
                &[("A", "B"), ("B", "A"), ("B", "C")],
            ),
            DegreePolicy::Distinct,
        );
        let pg = index.to_petgraph();
        assert_eq!(pg.node_count(), 3);
        assert_eq!(pg.edge_count(), 2);
    }
}
