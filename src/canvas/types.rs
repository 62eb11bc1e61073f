//! Canvas data types matching the `.canvas` JSON format.

use super::geometry::Region;
use crate::filter::error::{FilterError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

/// Payload-specific part of a node, keyed by the JSON `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
    Text {
        #[serde(default)]
        text: String,
    },
    File {
        file: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subpath: Option<String>,
    },
    Link {
        url: String,
    },
    Group {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        background: Option<String>,
    },
}

/// A positioned unit of content on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(flatten)]
    pub region: Region,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl Node {
    pub fn text(id: &str, region: Region, text: &str) -> Self {
        Self {
            id: id.into(),
            region,
            color: None,
            kind: NodeKind::Text { text: text.into() },
        }
    }

    pub fn file(id: &str, region: Region, file: &str) -> Self {
        Self {
            id: id.into(),
            region,
            color: None,
            kind: NodeKind::File {
                file: file.into(),
                subpath: None,
            },
        }
    }

    pub fn link(id: &str, region: Region, url: &str) -> Self {
        Self {
            id: id.into(),
            region,
            color: None,
            kind: NodeKind::Link { url: url.into() },
        }
    }

    pub fn group(id: &str, region: Region, label: &str) -> Self {
        Self {
            id: id.into(),
            region,
            color: None,
            kind: NodeKind::Group {
                label: Some(label.into()),
                background: None,
            },
        }
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group { .. })
    }

    /// Color used for matching. Absent and empty colors share the `""` key.
    pub fn color_key(&self) -> &str {
        self.color.as_deref().unwrap_or("")
    }

    pub fn is_colorless(&self) -> bool {
        self.color_key().is_empty()
    }

    /// Short text shown on the canvas for this node
    pub fn display_label(&self) -> &str {
        match &self.kind {
            NodeKind::Text { text } => text,
            NodeKind::File { file, .. } => file,
            NodeKind::Link { url } => url,
            NodeKind::Group { label, .. } => label.as_deref().unwrap_or(""),
        }
    }
}

/// A directed relationship between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    #[serde(rename = "fromNode")]
    pub from: String,
    #[serde(rename = "toNode")]
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_side: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_side: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Edge {
    pub fn new(id: &str, from: &str, to: &str) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            from_side: None,
            to_side: None,
            color: None,
            label: None,
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.from == node_id || self.to == node_id
    }
}

/// Complete canvas contents as stored on disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasData {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl CanvasData {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a `.canvas` file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| FilterError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let data = Self::from_json(&contents)?;
        tracing::info!(
            "Loaded canvas {:?}: {} nodes, {} edges",
            path,
            data.nodes.len(),
            data.edges.len()
        );
        Ok(data)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn node_ids(&self) -> HashSet<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    /// Edges whose endpoints both exist. Dangling edges never match anything.
    pub fn connected_edges(&self) -> Vec<Edge> {
        let ids = self.node_ids();
        self.edges
            .iter()
            .filter(|e| ids.contains(e.from.as_str()) && ids.contains(e.to.as_str()))
            .cloned()
            .collect()
    }
}

/// Read-only view of the canvas captured at the start of a command.
/// Cheap to clone; later edits to the live canvas are not observed.
#[derive(Debug, Clone, Default)]
pub struct CanvasSnapshot(Arc<CanvasData>);

impl CanvasSnapshot {
    pub fn new(data: Arc<CanvasData>) -> Self {
        Self(data)
    }
}

impl From<CanvasData> for CanvasSnapshot {
    fn from(data: CanvasData) -> Self {
        Self(Arc::new(data))
    }
}

impl Deref for CanvasSnapshot {
    type Target = CanvasData;

    fn deref(&self) -> &CanvasData {
        &self.0
    }
}

/// Ids of the currently selected nodes and edges
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub nodes: Vec<String>,
    pub edges: Vec<String>,
}

impl Selection {
    pub fn nodes<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            nodes: ids.into_iter().map(Into::into).collect(),
            edges: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n == id)
    }

    pub fn contains_edge(&self, id: &str) -> bool {
        self.edges.iter().any(|e| e == id)
    }
}
