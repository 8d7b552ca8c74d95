use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::graph::index::GraphIndex;

/// Export format for JSON
#[derive(Serialize)]
struct JsonExport {
    nodes: Vec<Value>,
    edges: Vec<Value>,
}

/// Flattened nodes, each carrying its degree under the index's policy.
fn node_records(index: &GraphIndex) -> Vec<Value> {
    index
        .nodes()
        .iter()
        .map(|node| {
            let mut record = node.to_json();
            if let Value::Object(object) = &mut record {
                object.insert("degree".into(), Value::from(index.degree(&node.id)));
            }
            record
        })
        .collect()
}

fn edge_records(index: &GraphIndex) -> Vec<Value> {
    index.edges().iter().map(|edge| edge.to_json()).collect()
}

/// Export the normalized graph to a JSON file
pub fn export_json(index: &GraphIndex, path: &Path) -> Result<()> {
    let export = JsonExport {
        nodes: node_records(index),
        edges: edge_records(index),
    };

    let file =
        File::create(path).with_context(|| format!("Failed to create file: {}", path.display()))?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, &export).context("Failed to write JSON")?;

    Ok(())
}

/// Export nodes and edges to two CSV files
pub fn export_csv(index: &GraphIndex, nodes_path: &Path, edges_path: &Path) -> Result<()> {
    let file = File::create(nodes_path)
        .with_context(|| format!("Failed to create file: {}", nodes_path.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "id,label,group,degree")?;
    for node in index.nodes() {
        writeln!(
            writer,
            "\"{}\",\"{}\",\"{}\",{}",
            escape_csv(&node.id),
            escape_csv(node.label.as_deref().unwrap_or("")),
            escape_csv(node.group.as_deref().unwrap_or("")),
            index.degree(&node.id)
        )?;
    }
    writer.flush()?;

    let file = File::create(edges_path)
        .with_context(|| format!("Failed to create file: {}", edges_path.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "id,from,to,label,connection_level")?;
    for edge in index.edges() {
        let level = edge
            .connection_level
            .as_ref()
            .map(|level| level.to_string())
            .unwrap_or_default();
        writeln!(
            writer,
            "\"{}\",\"{}\",\"{}\",\"{}\",\"{}\"",
            escape_csv(&edge.id),
            escape_csv(&edge.from),
            escape_csv(&edge.to),
            escape_csv(edge.label.as_deref().unwrap_or("")),
            escape_csv(&level)
        )?;
    }
    writer.flush()?;

    Ok(())
}

/// Export to GraphML. Every flattened attribute becomes a string key; list
/// values are joined with `"; "`.
pub fn export_graphml(index: &GraphIndex, path: &Path) -> Result<()> {
    let nodes = node_records(index);
    let edges = edge_records(index);

    let file =
        File::create(path).with_context(|| format!("Failed to create file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        writer,
        r#"<graphml xmlns="http://graphml.graphdrawing.org/xmlns" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://graphml.graphdrawing.org/xmlns http://graphml.graphdrawing.org/xmlns/1.0/graphml.xsd">"#
    )?;

    let node_keys = attribute_keys(&nodes, &["id"]);
    let edge_keys = attribute_keys(&edges, &["id", "from", "to"]);
    for key in &node_keys {
        let attr_type = if key == "degree" { "int" } else { "string" };
        writeln!(
            writer,
            r#"  <key id="{}" for="node" attr.name="{}" attr.type="{}"/>"#,
            key_id("n_", key),
            escape_xml(key),
            attr_type
        )?;
    }
    for key in &edge_keys {
        writeln!(
            writer,
            r#"  <key id="{}" for="edge" attr.name="{}" attr.type="string"/>"#,
            key_id("e_", key),
            escape_xml(key)
        )?;
    }

    writeln!(writer, r#"  <graph id="G" edgedefault="undirected">"#)?;

    for (node, record) in index.nodes().iter().zip(&nodes) {
        writeln!(writer, r#"    <node id="{}">"#, escape_xml(&node.id))?;
        write_data(&mut writer, "n_", record, &node_keys)?;
        writeln!(writer, r#"    </node>"#)?;
    }

    for (edge, record) in index.edges().iter().zip(&edges) {
        writeln!(
            writer,
            r#"    <edge id="{}" source="{}" target="{}">"#,
            escape_xml(&edge.id),
            escape_xml(&edge.from),
            escape_xml(&edge.to)
        )?;
        write_data(&mut writer, "e_", record, &edge_keys)?;
        writeln!(writer, r#"    </edge>"#)?;
    }

    writeln!(writer, r#"  </graph>"#)?;
    writeln!(writer, r#"</graphml>"#)?;

    Ok(())
}

fn attribute_keys(records: &[Value], skip: &[&str]) -> BTreeSet<String> {
    records
        .iter()
        .filter_map(Value::as_object)
        .flat_map(|object| object.keys())
        .filter(|key| !skip.contains(&key.as_str()))
        .cloned()
        .collect()
}

fn write_data(
    writer: &mut impl Write,
    prefix: &str,
    record: &Value,
    keys: &BTreeSet<String>,
) -> Result<()> {
    for key in keys {
        let Some(value) = record.get(key) else {
            continue;
        };
        writeln!(
            writer,
            r#"      <data key="{}">{}</data>"#,
            key_id(prefix, key),
            escape_xml(&value_text(value))
        )?;
    }
    Ok(())
}

/// GraphML key ids must be XML names, so anything but ASCII alphanumerics
/// becomes `_`.
fn key_id(prefix: &str, key: &str) -> String {
    let name: String = key
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}{}", prefix, name)
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(value_text)
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

/// Escape special characters for CSV
fn escape_csv(s: &str) -> String {
    s.replace('"', "\"\"")
}

/// Escape special characters for XML
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
