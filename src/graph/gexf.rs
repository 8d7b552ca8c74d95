//! GEXF import.
//!
//! Converts the node/edge/attribute subset of a GEXF document into the same
//! raw shape as the JSON format, so the rest of the pipeline never knows which
//! format was loaded. Visual extensions (`viz:*`) are ignored.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::RawDocument;
use crate::error::LoadError;

/// Declared attribute: display title and whether it holds a list.
struct AttributeDecl {
    title: String,
    is_list: bool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Class {
    Node,
    Edge,
}

pub fn parse(text: &str) -> Result<RawDocument, LoadError> {
    let mut reader = Reader::from_str(text);

    let mut seen_root = false;
    let mut seen_nodes = false;
    let mut node_attrs = HashMap::new();
    let mut edge_attrs = HashMap::new();
    let mut declaring: Option<Class> = None;
    let mut open: Option<(Class, Map<String, Value>)> = None;
    let mut nodes = Vec::new();
    let mut edges = Vec::new();

    loop {
        let event = reader.read_event().map_err(|e| {
            LoadError::Gexf(format!("{} at byte {}", e, reader.error_position()))
        })?;
        let (element, is_empty) = match event {
            Event::Start(element) => (element, false),
            Event::Empty(element) => (element, true),
            Event::End(element) => {
                match element.local_name().as_ref() {
                    b"attributes" => declaring = None,
                    b"node" | b"edge" => {
                        if let Some((class, object)) = open.take() {
                            match class {
                                Class::Node => nodes.push(object),
                                Class::Edge => edges.push(object),
                            }
                        }
                    }
                    _ => {}
                }
                continue;
            }
            Event::Eof => break,
            // Comments, CDATA, text and processing instructions carry no graph data
            _ => continue,
        };

        match element.local_name().as_ref() {
            b"gexf" => seen_root = true,
            b"nodes" => seen_nodes = true,
            b"attributes" if !is_empty => {
                let head = xml_attributes(&element)?;
                declaring = Some(match head.get("class").map(String::as_str) {
                    Some("edge") => Class::Edge,
                    _ => Class::Node,
                });
            }
            b"attribute" => {
                let Some(class) = declaring else {
                    continue;
                };
                let attrs = xml_attributes(&element)?;
                let Some(id) = attrs.get("id") else {
                    continue;
                };
                let title = attrs.get("title").unwrap_or(id).clone();
                let is_list = attrs
                    .get("type")
                    .is_some_and(|t| t.to_lowercase().starts_with("list"));
                let target = match class {
                    Class::Node => &mut node_attrs,
                    Class::Edge => &mut edge_attrs,
                };
                target.insert(id.clone(), AttributeDecl { title, is_list });
            }
            b"node" if open.is_none() => {
                let attrs = xml_attributes(&element)?;
                let mut object = Map::new();
                for key in ["id", "label"] {
                    if let Some(value) = attrs.get(key) {
                        object.insert(key.to_string(), Value::String(value.clone()));
                    }
                }
                if is_empty {
                    nodes.push(object);
                } else {
                    open = Some((Class::Node, object));
                }
            }
            b"edge" if open.is_none() => {
                let attrs = xml_attributes(&element)?;
                let mut object = Map::new();
                for (gexf_key, json_key) in [
                    ("id", "id"),
                    ("source", "from"),
                    ("target", "to"),
                    ("label", "label"),
                ] {
                    if let Some(value) = attrs.get(gexf_key) {
                        object.insert(json_key.to_string(), Value::String(value.clone()));
                    }
                }
                if is_empty {
                    edges.push(object);
                } else {
                    open = Some((Class::Edge, object));
                }
            }
            b"attvalue" => {
                let Some((class, object)) = open.as_mut() else {
                    continue;
                };
                let decls = match class {
                    Class::Node => &node_attrs,
                    Class::Edge => &edge_attrs,
                };
                apply_attvalue(&xml_attributes(&element)?, decls, object);
            }
            _ => {}
        }
    }

    if !seen_root {
        return Err(LoadError::Gexf("missing <gexf> root element".to_string()));
    }
    if !seen_nodes {
        return Err(LoadError::Gexf("missing <nodes> element".to_string()));
    }

    tracing::debug!("GEXF: {} nodes, {} edges", nodes.len(), edges.len());
    Ok(RawDocument { nodes, edges })
}

fn apply_attvalue(
    attrs: &HashMap<String, String>,
    decls: &HashMap<String, AttributeDecl>,
    object: &mut Map<String, Value>,
) {
    let (Some(key), Some(value)) = (attrs.get("for"), attrs.get("value")) else {
        return;
    };
    let (title, is_list) = match decls.get(key) {
        Some(decl) => (decl.title.clone(), decl.is_list),
        None => (key.clone(), false),
    };
    let value = if is_list {
        Value::Array(split_list(value).into_iter().map(Value::String).collect())
    } else {
        Value::String(value.clone())
    };
    object.insert(title, value);
}

/// GEXF list values are `a|b|c`, optionally wrapped in brackets.
fn split_list(raw: &str) -> Vec<String> {
    let trimmed = raw.trim().trim_start_matches('[').trim_end_matches(']');
    let separator = if trimmed.contains('|') { '|' } else { ',' };
    trimmed
        .split(separator)
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Unprefixed attribute names with entity and character references decoded.
fn xml_attributes(element: &BytesStart<'_>) -> Result<HashMap<String, String>, LoadError> {
    let mut attrs = HashMap::new();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| LoadError::Gexf(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| LoadError::Gexf(e.to_string()))?;
        attrs.insert(key, value.into_owned());
    }
    Ok(attrs)
}
