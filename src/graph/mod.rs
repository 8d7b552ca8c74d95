pub mod analytics;
pub mod gexf;
pub mod index;
pub mod loader;
pub mod model;

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::error::LoadError;
use model::{Edge, Node};

/// The whole network, held in memory for the lifetime of a command.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Node and edge objects exactly as found in the source document.
#[derive(Debug, Default, Deserialize)]
pub struct RawDocument {
    pub nodes: Vec<Map<String, Value>>,
    #[serde(default)]
    pub edges: Vec<Map<String, Value>>,
}

/// Problems found while turning a raw document into a [`Graph`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LoadReport {
    /// Node ids seen more than once; only the first occurrence is kept
    pub duplicate_nodes: Vec<String>,
    /// (edge id, missing endpoint) for edges that were dropped
    pub dangling_edges: Vec<(String, String)>,
    /// Edge ids that repeat an already-seen unordered endpoint pair
    pub duplicate_connections: Vec<String>,
    pub self_loops: Vec<String>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.duplicate_nodes.is_empty()
            && self.dangling_edges.is_empty()
            && self.duplicate_connections.is_empty()
            && self.self_loops.is_empty()
    }
}

impl Graph {
    /// Validate and type a raw document.
    ///
    /// Edges whose endpoints are not in the node set are dropped so every
    /// remaining edge references existing nodes.
    pub fn from_document(raw: &RawDocument) -> Result<(Self, LoadReport), LoadError> {
        let mut report = LoadReport::default();
        let mut nodes = Vec::with_capacity(raw.nodes.len());
        let mut seen_nodes: HashSet<String> = HashSet::new();

        for (index, object) in raw.nodes.iter().enumerate() {
            let node = Node::from_json(index, object)?;
            if !seen_nodes.insert(node.id.clone()) {
                tracing::warn!("Duplicate node id \"{}\", keeping the first", node.id);
                report.duplicate_nodes.push(node.id);
                continue;
            }
            nodes.push(node);
        }

        let mut edges = Vec::with_capacity(raw.edges.len());
        let mut seen_edge_ids: HashSet<String> = HashSet::new();
        // Ids written in the document; generated ids must never take one
        let explicit_ids: HashSet<String> = raw
            .edges
            .iter()
            .filter_map(|object| object.get("id").and_then(model::scalar_text))
            .collect();
        let mut seen_pairs: HashSet<(String, String)> = HashSet::new();

        for (index, object) in raw.edges.iter().enumerate() {
            let mut edge = Edge::from_json(index, object)?;
            let generated = object.get("id").and_then(model::scalar_text).is_none();

            if let Some(missing) = [&edge.from, &edge.to]
                .into_iter()
                .find(|id| !seen_nodes.contains(id.as_str()))
            {
                tracing::warn!(
                    "Dropping edge {}: unknown node \"{}\"",
                    edge.id,
                    missing
                );
                report.dangling_edges.push((edge.id.clone(), missing.clone()));
                continue;
            }

            let taken = seen_edge_ids.contains(&edge.id)
                || (generated && explicit_ids.contains(&edge.id));
            if taken {
                let fresh = fresh_edge_id(index, &seen_edge_ids, &explicit_ids);
                tracing::debug!("Edge id {} reused, renaming to {}", edge.id, fresh);
                edge.id = fresh;
            }
            seen_edge_ids.insert(edge.id.clone());

            if edge.from == edge.to {
                report.self_loops.push(edge.id.clone());
            }
            let (a, b) = edge.unordered_pair();
            if !seen_pairs.insert((a.to_string(), b.to_string())) {
                report.duplicate_connections.push(edge.id.clone());
            }

            edges.push(edge);
        }

        tracing::info!("Loaded {} nodes and {} edges", nodes.len(), edges.len());
        Ok((Self { nodes, edges }, report))
    }
}

/// `e{index}`, then `e{index}_1`, `e{index}_2`... until nothing uses it.
fn fresh_edge_id(index: usize, seen: &HashSet<String>, explicit: &HashSet<String>) -> String {
    let base = format!("e{}", index);
    let mut candidate = base.clone();
    let mut suffix = 0;
    while seen.contains(&candidate) || explicit.contains(&candidate) {
        suffix += 1;
        candidate = format!("{}_{}", base, suffix);
    }
    candidate
}
