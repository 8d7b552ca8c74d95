pub mod links;

use crate::graph::index::GraphIndex;
use crate::graph::model::{AttrValue, Edge, EdgeField, Node, NodeField};
use links::{LinkMatcher, annotate_links, node_link};

/// A titled group of node fields, rendered in catalogue order.
pub struct Section {
    pub title: &'static str,
    pub fields: &'static [NodeField],
}

pub const NODE_SECTIONS: &[Section] = &[
    Section {
        title: "Identity and Personal Data",
        fields: &[
            NodeField::FullName,
            NodeField::AlsoKnownAs,
            NodeField::LifeDates,
            NodeField::PlaceOfBirth,
            NodeField::PlaceOfDeath,
            NodeField::Nationality,
            NodeField::Profession,
            NodeField::Titles,
        ],
    },
    Section {
        title: "Family and Personal Relationships",
        fields: &[
            NodeField::Father,
            NodeField::Mother,
            NodeField::MarriedTo,
            NodeField::Children,
            NodeField::Siblings,
            NodeField::OtherRelatives,
            NodeField::Friends,
        ],
    },
    Section {
        title: "Career and Works",
        fields: &[
            NodeField::Training,
            NodeField::Teachers,
            NodeField::Students,
            NodeField::Patrons,
            NodeField::Positions,
            NodeField::NotableWorks,
        ],
    },
    Section {
        title: "Biography",
        fields: &[NodeField::Biography, NodeField::Notes],
    },
    Section {
        title: "Sources",
        fields: &[NodeField::Sources],
    },
];

pub const EDGE_FIELDS: &[EdgeField] = &[
    EdgeField::RelationshipType,
    EdgeField::Period,
    EdgeField::Place,
    EdgeField::Correspondence,
    EdgeField::SharedWorks,
    EdgeField::Description,
    EdgeField::Sources,
];

const EXTRA_SECTION_TITLE: &str = "Additional Information";

/// Escape special characters for HTML text and attribute values
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Formats node and edge detail panels.
pub struct PanelRenderer<'a> {
    index: &'a GraphIndex,
    links: &'a LinkMatcher,
}

impl<'a> PanelRenderer<'a> {
    pub fn new(index: &'a GraphIndex, links: &'a LinkMatcher) -> Self {
        Self { index, links }
    }

    /// Render the panel for a node. Returns `None` for an unknown id.
    pub fn render_node(&self, id: &str) -> Option<String> {
        let Some(node) = self.index.node(id) else {
            tracing::debug!("No node with id {}", id);
            return None;
        };

        let mut html = String::from(r#"<div class="detail node-detail">"#);

        if let Some(image) = &node.image {
            html.push_str(&image_tag(image, node.display_name(), "node-image"));
            if let Some(source) = &node.image_source {
                html.push_str(&format!(
                    r#"<p class="image-source"><em>Image source:</em> {}</p>"#,
                    self.links.annotate(source, Some(node.id.as_str()))
                ));
            }
        }

        html.push_str(&format!("<h2>{}</h2>", escape_html(node.display_name())));
        if node.label.as_deref().is_some_and(|label| label != node.id) {
            html.push_str(&format!(
                r#"<p class="node-id">{}</p>"#,
                escape_html(&node.id)
            ));
        }
        if let Some(group) = &node.group {
            html.push_str(&format!(
                r#"<p class="node-group">{}</p>"#,
                escape_html(group)
            ));
        }

        for section in NODE_SECTIONS {
            let rows: Vec<(&str, &AttrValue)> = section
                .fields
                .iter()
                .filter_map(|field| node.fields.get(field).map(|value| (field.label(), value)))
                .collect();
            self.push_section(&mut html, section.title, &rows, Some(node.id.as_str()));
        }

        let extra: Vec<(&str, &AttrValue)> = node
            .extra
            .iter()
            .map(|(key, value)| (key.as_str(), value))
            .collect();
        self.push_section(&mut html, EXTRA_SECTION_TITLE, &extra, Some(node.id.as_str()));

        html.push_str(&self.connections(node));
        html.push_str("</div>");
        Some(html)
    }

    /// Render the panel for an edge. Returns `None` for an unknown id or an
    /// edge whose endpoints are gone.
    pub fn render_edge(&self, id: &str) -> Option<String> {
        let Some(edge) = self.index.edge(id) else {
            tracing::debug!("No edge with id {}", id);
            return None;
        };
        let (Some(from), Some(to)) = (self.index.node(&edge.from), self.index.node(&edge.to))
        else {
            tracing::debug!("Edge {} has a missing endpoint", id);
            return None;
        };

        let mut html = String::from(r#"<div class="detail edge-detail">"#);

        let images: Vec<String> = [from, to]
            .iter()
            .filter_map(|node| {
                node.image
                    .as_deref()
                    .map(|image| image_tag(image, node.display_name(), "endpoint-image"))
            })
            .collect();
        if !images.is_empty() {
            html.push_str(r#"<div class="endpoint-images">"#);
            html.push_str(&images.concat());
            html.push_str("</div>");
        }

        html.push_str("<h2>Connection</h2>");
        html.push_str(&format!(
            r#"<p class="edge-summary">{} &harr; {}</p>"#,
            node_link(&from.id, from.display_name()),
            node_link(&to.id, to.display_name())
        ));
        if let Some(label) = &edge.label {
            html.push_str(&format!(
                r#"<p class="edge-label">{}</p>"#,
                annotate_links(label, self.links)
            ));
        }
        if let Some(level) = &edge.connection_level {
            html.push_str(&format!(
                "<p><strong>Connection level:</strong> {}</p>",
                escape_html(&level.to_string())
            ));
        }

        html.push_str(&self.edge_fields(edge));
        html.push_str("</div>");
        Some(html)
    }

    fn edge_fields(&self, edge: &Edge) -> String {
        let mut html = String::new();
        for field in EDGE_FIELDS {
            if let Some(value) = edge.fields.get(field) {
                html.push_str(&self.field_row(field.label(), value, None));
            }
        }
        let extra: Vec<(&str, &AttrValue)> = edge
            .extra
            .iter()
            .map(|(key, value)| (key.as_str(), value))
            .collect();
        self.push_section(&mut html, EXTRA_SECTION_TITLE, &extra, None);
        html
    }

    /// Emit a heading and its rows, or nothing when there are no rows.
    fn push_section(
        &self,
        html: &mut String,
        title: &str,
        rows: &[(&str, &AttrValue)],
        owner: Option<&str>,
    ) {
        if rows.is_empty() {
            return;
        }
        html.push_str(&format!(
            r#"<h3 class="section-title">{}</h3>"#,
            escape_html(title)
        ));
        for (label, value) in rows {
            html.push_str(&self.field_row(label, value, owner));
        }
    }

    fn field_row(&self, label: &str, value: &AttrValue, owner: Option<&str>) -> String {
        match value {
            AttrValue::Text(text) => format!(
                "<p><strong>{}:</strong> {}</p>",
                escape_html(&capitalize(label)),
                self.links.annotate(text, owner)
            ),
            AttrValue::List(items) => {
                let list: String = items
                    .iter()
                    .map(|item| format!("<li>{}</li>", self.links.annotate(item, owner)))
                    .collect();
                format!(
                    "<p><strong>{}:</strong></p><ul>{}</ul>",
                    escape_html(&capitalize(label)),
                    list
                )
            }
        }
    }

    fn connections(&self, node: &Node) -> String {
        let neighbors = self.index.neighbors(&node.id);
        let items: String = neighbors
            .iter()
            .map(|neighbor| format!("<li>{}</li>", node_link(&neighbor.id, neighbor.display_name())))
            .collect();
        format!(
            r#"<h3 class="connections-title">Connections: {}</h3><ul class="connections">{}</ul>"#,
            neighbors.len(),
            items
        )
    }
}

fn image_tag(src: &str, alt: &str, class: &str) -> String {
    format!(
        r#"<img src="{}" alt="{}" class="{}">"#,
        escape_html(src),
        escape_html(alt),
        class
    )
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
