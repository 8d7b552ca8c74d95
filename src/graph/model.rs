use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::LoadError;

/// A free-text attribute: either a single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Text(String),
    List(Vec<String>),
}

impl AttrValue {
    /// Convert a JSON value, dropping anything without displayable text.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => {
                let items: Vec<String> = items.iter().filter_map(scalar_text).collect();
                if items.is_empty() {
                    None
                } else {
                    Some(AttrValue::List(items))
                }
            }
            other => scalar_text(other).map(AttrValue::Text),
        }
    }

    /// Every string carried by this value, in order.
    pub fn texts(&self) -> Vec<&str> {
        match self {
            AttrValue::Text(text) => vec![text.as_str()],
            AttrValue::List(items) => items.iter().map(String::as_str).collect(),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Text(text) => write!(f, "{}", text),
            AttrValue::List(items) => write!(f, "{}", items.join(", ")),
        }
    }
}

pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if text.is_empty() { None } else { Some(text) }
}

/// Lower-case a key, treat `_` and `-` as spaces and collapse whitespace.
pub fn normalize_key(key: &str) -> String {
    key.to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keys that only affect how the browser library draws a node or edge.
const PRESENTATION_KEYS: &[&str] = &[
    "shape",
    "font",
    "size",
    "color",
    "x",
    "y",
    "value",
    "border width",
    "borderwidth",
    "hidden",
    "physics",
    "fixed",
    "mass",
];

macro_rules! field_catalogue {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => $key:literal, $label:literal $(| $alias:literal)*;)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// Canonical (normalized) key.
            pub fn key(self) -> &'static str {
                match self {
                    $($name::$variant => $key,)+
                }
            }

            /// Heading shown in the detail panel.
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            /// Match an already-normalized key against the catalogue.
            pub fn from_key(key: &str) -> Option<Self> {
                match key {
                    $($key $(| $alias)* => Some($name::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

field_catalogue! {
    /// Known biographical fields of a node.
    NodeField {
        FullName => "full name", "Full name" | "name";
        AlsoKnownAs => "also known as", "Also known as" | "aka" | "alias" | "aliases";
        LifeDates => "life dates", "Life dates" | "dates" | "lifespan";
        PlaceOfBirth => "place of birth", "Place of birth" | "birthplace" | "born in";
        PlaceOfDeath => "place of death", "Place of death" | "died in";
        Nationality => "nationality", "Nationality";
        Profession => "profession", "Profession" | "occupation";
        Titles => "titles", "Titles" | "title" | "honours" | "honors";
        Father => "father", "Father";
        Mother => "mother", "Mother";
        MarriedTo => "married to", "Married to" | "spouse" | "spouses";
        Children => "children", "Children";
        Siblings => "siblings", "Siblings";
        OtherRelatives => "other relatives", "Other relatives" | "relatives";
        Friends => "friends", "Friends";
        Training => "training", "Training" | "education";
        Teachers => "teachers", "Teachers" | "masters";
        Students => "students", "Students" | "pupils";
        Patrons => "patrons", "Patrons";
        Positions => "positions", "Positions" | "posts";
        NotableWorks => "notable works", "Notable works" | "works";
        Biography => "biography", "Biography" | "description" | "bio";
        Notes => "notes", "Notes";
        Sources => "sources", "Sources" | "references" | "bibliography";
    }
}

field_catalogue! {
    /// Known relationship fields of an edge.
    EdgeField {
        RelationshipType => "relationship type", "Relationship type" | "relationship" | "type";
        Period => "period", "Period" | "dates";
        Place => "place", "Place" | "location";
        Correspondence => "correspondence", "Correspondence" | "letters";
        SharedWorks => "shared works", "Shared works" | "works";
        Description => "description", "Description" | "notes";
        Sources => "sources", "Sources" | "references" | "bibliography";
    }
}

/// How directly two nodes are connected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionLevel {
    Direct,
    Secondary,
    Other(String),
}

impl ConnectionLevel {
    pub fn parse(raw: &str) -> Self {
        match normalize_key(raw).as_str() {
            "direct" => ConnectionLevel::Direct,
            "secondary" | "indirect" => ConnectionLevel::Secondary,
            _ => ConnectionLevel::Other(raw.trim().to_string()),
        }
    }
}

impl fmt::Display for ConnectionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionLevel::Direct => write!(f, "direct"),
            ConnectionLevel::Secondary => write!(f, "secondary"),
            ConnectionLevel::Other(level) => write!(f, "{}", level),
        }
    }
}

/// A person or place in the network.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub label: Option<String>,
    pub image: Option<String>,
    pub image_source: Option<String>,
    pub group: Option<String>,
    pub fields: BTreeMap<NodeField, AttrValue>,
    /// Attributes outside the catalogue, keyed by their original name.
    pub extra: BTreeMap<String, AttrValue>,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            image: None,
            image_source: None,
            group: None,
            fields: BTreeMap::new(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_field(mut self, field: NodeField, value: AttrValue) -> Self {
        self.fields.insert(field, value);
        self
    }

    /// Label when present, otherwise the id.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }

    pub fn from_json(index: usize, object: &Map<String, Value>) -> Result<Self, LoadError> {
        let id = object
            .get("id")
            .and_then(scalar_text)
            .ok_or_else(|| LoadError::Schema {
                kind: "node",
                index,
                reason: "missing \"id\"".to_string(),
            })?;

        let mut node = Node::new(id);

        for (key, value) in object {
            let normalized = normalize_key(key);
            match normalized.as_str() {
                "id" => {}
                "label" => node.label = scalar_text(value),
                "image" => node.image = scalar_text(value),
                "image source" => node.image_source = scalar_text(value),
                "group" => node.group = scalar_text(value),
                k if PRESENTATION_KEYS.contains(&k) => {}
                k => insert_attribute(
                    key,
                    k,
                    value,
                    &mut node.fields,
                    &mut node.extra,
                    NodeField::from_key,
                ),
            }
        }

        Ok(node)
    }

    /// Flattened JSON form used by exports.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert("id".into(), Value::String(self.id.clone()));
        if let Some(label) = &self.label {
            object.insert("label".into(), Value::String(label.clone()));
        }
        if let Some(image) = &self.image {
            object.insert("image".into(), Value::String(image.clone()));
        }
        if let Some(source) = &self.image_source {
            object.insert("image_source".into(), Value::String(source.clone()));
        }
        if let Some(group) = &self.group {
            object.insert("group".into(), Value::String(group.clone()));
        }
        for (field, value) in &self.fields {
            object.insert(field.key().to_string(), attr_json(value));
        }
        for (key, value) in &self.extra {
            object.insert(key.clone(), attr_json(value));
        }
        Value::Object(object)
    }
}

/// A relationship between two nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: String,
    pub from: String,
    pub to: String,
    pub label: Option<String>,
    pub connection_level: Option<ConnectionLevel>,
    pub fields: BTreeMap<EdgeField, AttrValue>,
    pub extra: BTreeMap<String, AttrValue>,
}

impl Edge {
    pub fn new(id: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            label: None,
            connection_level: None,
            fields: BTreeMap::new(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, field: EdgeField, value: AttrValue) -> Self {
        self.fields.insert(field, value);
        self
    }

    /// Endpoint pair with the smaller id first.
    pub fn unordered_pair(&self) -> (&str, &str) {
        if self.from <= self.to {
            (self.from.as_str(), self.to.as_str())
        } else {
            (self.to.as_str(), self.from.as_str())
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.from == node_id || self.to == node_id
    }

    /// Parse an edge object. Edges without an `id` are given `e{index}`.
    pub fn from_json(index: usize, object: &Map<String, Value>) -> Result<Self, LoadError> {
        let endpoint = |primary: &str, alias: &str| {
            object
                .get(primary)
                .or_else(|| object.get(alias))
                .and_then(scalar_text)
                .ok_or_else(|| LoadError::Schema {
                    kind: "edge",
                    index,
                    reason: format!("missing \"{}\"", primary),
                })
        };
        let from = endpoint("from", "source")?;
        let to = endpoint("to", "target")?;
        let id = object
            .get("id")
            .and_then(scalar_text)
            .unwrap_or_else(|| format!("e{}", index));

        let mut edge = Edge::new(id, from, to);

        for (key, value) in object {
            let normalized = normalize_key(key);
            match normalized.as_str() {
                "id" | "from" | "to" | "source" | "target" => {}
                "label" => edge.label = scalar_text(value),
                "connection level" => {
                    edge.connection_level =
                        scalar_text(value).map(|raw| ConnectionLevel::parse(&raw))
                }
                k if PRESENTATION_KEYS.contains(&k) => {}
                k => insert_attribute(
                    key,
                    k,
                    value,
                    &mut edge.fields,
                    &mut edge.extra,
                    EdgeField::from_key,
                ),
            }
        }

        Ok(edge)
    }

    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert("id".into(), Value::String(self.id.clone()));
        object.insert("from".into(), Value::String(self.from.clone()));
        object.insert("to".into(), Value::String(self.to.clone()));
        if let Some(label) = &self.label {
            object.insert("label".into(), Value::String(label.clone()));
        }
        if let Some(level) = &self.connection_level {
            object.insert("connection_level".into(), Value::String(level.to_string()));
        }
        for (field, value) in &self.fields {
            object.insert(field.key().to_string(), attr_json(value));
        }
        for (key, value) in &self.extra {
            object.insert(key.clone(), attr_json(value));
        }
        Value::Object(object)
    }
}

fn insert_attribute<F: Ord>(
    original_key: &str,
    normalized: &str,
    value: &Value,
    fields: &mut BTreeMap<F, AttrValue>,
    extra: &mut BTreeMap<String, AttrValue>,
    lookup: impl Fn(&str) -> Option<F>,
) {
    if value.is_object() {
        tracing::warn!("Ignoring nested object in attribute \"{}\"", original_key);
        return;
    }
    let Some(attr) = AttrValue::from_json(value) else {
        return;
    };
    match lookup(normalized) {
        Some(field) => {
            fields.entry(field).or_insert(attr);
        }
        None => {
            extra.insert(original_key.to_string(), attr);
        }
    }
}

fn attr_json(value: &AttrValue) -> Value {
    match value {
        AttrValue::Text(text) => Value::String(text.clone()),
        AttrValue::List(items) => Value::Array(items.iter().cloned().map(Value::String).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("Life_Dates"), "life dates");
        assert_eq!(normalize_key("  married-to "), "married to");
        assert_eq!(normalize_key("relationship   type"), "relationship type");
    }

    #[test]
    fn test_attr_value_from_json() {
        assert_eq!(
            AttrValue::from_json(&json!(" painter ")),
            Some(AttrValue::Text("painter".into()))
        );
        assert_eq!(
            AttrValue::from_json(&json!(1746)),
            Some(AttrValue::Text("1746".into()))
        );
        assert_eq!(
            AttrValue::from_json(&json!(["a", null, "", "b"])),
            Some(AttrValue::List(vec!["a".into(), "b".into()]))
        );
        assert_eq!(AttrValue::from_json(&json!("")), None);
        assert_eq!(AttrValue::from_json(&json!([])), None);
        assert_eq!(AttrValue::from_json(&Value::Null), None);
    }

    #[test]
    fn test_node_from_json_sorts_known_and_extra_fields() {
        let node = Node::from_json(
            0,
            &object(json!({
                "id": "Goya",
                "label": "Francisco de Goya",
                "image": "goya.jpg",
                "image_source": "Museo del Prado",
                "profession": "Painter",
                "Married_to": "Josefa Bayeu",
                "children": ["Javier Goya"],
                "favourite colour": "black",
                "shape": "dot",
                "size": 30
            })),
        )
        .unwrap();

        assert_eq!(node.id, "Goya");
        assert_eq!(node.display_name(), "Francisco de Goya");
        assert_eq!(node.image.as_deref(), Some("goya.jpg"));
        assert_eq!(node.image_source.as_deref(), Some("Museo del Prado"));
        assert_eq!(
            node.fields.get(&NodeField::Profession),
            Some(&AttrValue::Text("Painter".into()))
        );
        assert_eq!(
            node.fields.get(&NodeField::MarriedTo),
            Some(&AttrValue::Text("Josefa Bayeu".into()))
        );
        assert!(matches!(
            node.fields.get(&NodeField::Children),
            Some(AttrValue::List(_))
        ));
        assert!(node.extra.contains_key("favourite colour"));
        assert!(!node.extra.contains_key("shape"));
        assert!(!node.extra.contains_key("size"));
    }

    #[test]
    fn test_node_numeric_id_and_alias() {
        let node = Node::from_json(3, &object(json!({"id": 7, "occupation": "Engraver"}))).unwrap();
        assert_eq!(node.id, "7");
        assert_eq!(node.display_name(), "7");
        assert!(node.fields.contains_key(&NodeField::Profession));
    }

    #[test]
    fn test_node_missing_id() {
        let err = Node::from_json(4, &object(json!({"label": "Nobody"}))).unwrap_err();
        assert!(err.to_string().contains("node #4"));
    }

    #[test]
    fn test_edge_from_json() {
        let edge = Edge::from_json(
            2,
            &object(json!({
                "from": "Goya",
                "to": "Bayeu",
                "connection_level": "Direct",
                "relationship type": "brother-in-law",
                "correspondence": ["1780", "1781"],
                "mood": "tense"
            })),
        )
        .unwrap();

        assert_eq!(edge.id, "e2");
        assert_eq!(edge.connection_level, Some(ConnectionLevel::Direct));
        assert!(edge.fields.contains_key(&EdgeField::RelationshipType));
        assert!(edge.fields.contains_key(&EdgeField::Correspondence));
        assert!(edge.extra.contains_key("mood"));
        assert_eq!(edge.unordered_pair(), ("Bayeu", "Goya"));
    }

    #[test]
    fn test_edge_source_target_aliases() {
        let edge =
            Edge::from_json(0, &object(json!({"id": "x", "source": "a", "target": "b"}))).unwrap();
        assert_eq!(edge.id, "x");
        assert_eq!(edge.from, "a");
        assert_eq!(edge.to, "b");
    }

    #[test]
    fn test_edge_missing_endpoint() {
        let err = Edge::from_json(1, &object(json!({"from": "a"}))).unwrap_err();
        assert!(err.to_string().contains("\"to\""));
    }

    #[test]
    fn test_connection_level_other() {
        assert_eq!(
            ConnectionLevel::parse("Tertiary"),
            ConnectionLevel::Other("Tertiary".into())
        );
        assert_eq!(ConnectionLevel::parse("secondary").to_string(), "secondary");
    }

    #[test]
    fn test_catalogue_keys_roundtrip() {
        for field in NodeField::ALL {
            assert_eq!(NodeField::from_key(field.key()), Some(*field));
        }
        for field in EdgeField::ALL {
            assert_eq!(EdgeField::from_key(field.key()), Some(*field));
        }
    }

    #[test]
    fn test_to_json_flattens_fields() {
        let node = Node::new("a")
            .with_label("Alice")
            .with_field(NodeField::Profession, AttrValue::Text("Poet".into()));
        let value = node.to_json();
        assert_eq!(value["label"], "Alice");
        assert_eq!(value["profession"], "Poet");
    }
}
