use petgraph::algo::connected_components;

use super::index::GraphIndex;

/// Graph analytics results
#[derive(Debug, Clone)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub distinct_connections: usize,
    pub connected_components: usize,
    pub density: f64,
    pub avg_degree: f64,
    pub max_degree: usize,
    pub isolated_nodes: Vec<String>,
    /// (display name, degree), highest first
    pub top_degree: Vec<(String, usize)>,
}

/// Compute full graph statistics.
///
/// Density is measured over distinct undirected connections.
pub fn compute_stats(index: &GraphIndex) -> GraphStats {
    let nodes = index.nodes();
    let node_count = nodes.len();
    let distinct_connections = index.distinct_connections();

    let connected = connected_components(&index.to_petgraph());

    let density = if node_count > 1 {
        2.0 * distinct_connections as f64 / (node_count as f64 * (node_count as f64 - 1.0))
    } else {
        0.0
    };

    let degrees: Vec<(String, usize)> = nodes
        .iter()
        .map(|node| (node.display_name().to_string(), index.degree(&node.id)))
        .collect();

    let avg_degree = if node_count > 0 {
        degrees.iter().map(|(_, d)| d).sum::<usize>() as f64 / node_count as f64
    } else {
        0.0
    };
    let max_degree = degrees.iter().map(|(_, d)| *d).max().unwrap_or(0);

    let isolated_nodes = nodes
        .iter()
        .filter(|node| index.neighbors(&node.id).is_empty())
        .map(|node| node.display_name().to_string())
        .collect();

    let mut top_degree = degrees;
    top_degree.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top_degree.truncate(10);

    GraphStats {
        node_count,
        edge_count: index.edges().len(),
        distinct_connections,
        connected_components: connected,
        density,
        avg_degree,
        max_degree,
        isolated_nodes,
        top_degree,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::graph::index::DegreePolicy;
    use crate::graph::model::{Edge, Node};

    fn build(edges: &[(&str, &str)], extra_nodes: &[&str]) -> GraphIndex {
        let mut ids: Vec<&str> = edges.iter().flat_map(|(a, b)| [*a, *b]).collect();
        ids.extend_from_slice(extra_nodes);
        ids.sort();
        ids.dedup();
        let graph = Graph {
            nodes: ids.iter().map(|id| Node::new(*id)).collect(),
            edges: edges
                .iter()
                .enumerate()
                .map(|(i, (a, b))| Edge::new(format!("e{}", i), *a, *b))
                .collect(),
        };
        GraphIndex::build(graph, DegreePolicy::Distinct)
    }

    #[test]
    fn test_compute_stats() {
        let index = build(&[("a", "b"), ("b", "c"), ("a", "c"), ("c", "a")], &[]);
        let stats = compute_stats(&index);
        assert_eq!(stats.node_count, 3);
        assert_eq!(stats.edge_count, 4);
        assert_eq!(stats.distinct_connections, 3);
        assert_eq!(stats.connected_components, 1);
        assert!((stats.density - 1.0).abs() < f64::EPSILON);
        assert_eq!(stats.max_degree, 2);
        assert!(stats.isolated_nodes.is_empty());
    }

    #[test]
    fn test_compute_stats_disconnected() {
        let index = build(&[("a", "b"), ("c", "d")], &["lonely"]);
        let stats = compute_stats(&index);
        assert_eq!(stats.connected_components, 3);
        assert_eq!(stats.isolated_nodes, vec!["lonely".to_string()]);
    }

    #[test]
    fn test_top_degree_order() {
        let index = build(&[("hub", "x"), ("hub", "y"), ("hub", "z"), ("x", "y")], &[]);
        let stats = compute_stats(&index);
        assert_eq!(stats.top_degree[0], ("hub".to_string(), 3));
        assert_eq!(stats.top_degree[1], ("x".to_string(), 2));
    }

    #[test]
    fn test_empty_graph() {
        let index = GraphIndex::build(Graph::default(), DegreePolicy::Distinct);
        let stats = compute_stats(&index);
        assert_eq!(stats.node_count, 0);
        assert_eq!(stats.connected_components, 0);
        assert_eq!(stats.avg_degree, 0.0);
    }
}
