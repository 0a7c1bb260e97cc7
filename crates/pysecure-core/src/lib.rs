pub mod identifier;
pub mod settings;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub use identifier::{classify, IdentifierKind};
pub use settings::{ai_configured, read_settings, write_settings, AiSettings, PromptVariant};

// --- Types (wire shape of the generation response) ---

/// One generated source artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectFile {
    pub name: String,
    pub content: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    File,
    Logic,
    Ui,
    Security,
    /// Any type string the model invents. Rendered with the neutral colour.
    #[serde(other)]
    Other,
}

impl NodeType {
    /// Fill colour used by the architecture map.
    pub fn color(self) -> &'static str {
        match self {
            NodeType::File => "#3b82f6",
            NodeType::Security => "#ef4444",
            NodeType::Logic => "#10b981",
            NodeType::Ui => "#f59e0b",
            NodeType::Other => "#94a3b8",
        }
    }

    /// Legend text shown above the map.
    pub fn legend(self) -> &'static str {
        match self {
            NodeType::File => "Arquivo",
            NodeType::Security => "Segurança",
            NodeType::Logic => "Lógica",
            NodeType::Ui => "Interface",
            NodeType::Other => "Outro",
        }
    }

    /// The legend entries in display order. `Other` has no legend entry.
    pub const LEGEND: [NodeType; 4] = [
        NodeType::File,
        NodeType::Security,
        NodeType::Logic,
        NodeType::Ui,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
}

/// A dependency or data-flow edge. Drawn undirected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
}

/// The mental map. Node ids are unique; links may dangle.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

impl Graph {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Links whose source and target both name an existing node.
    pub fn resolved_links(&self) -> impl Iterator<Item = &GraphLink> {
        self.links
            .iter()
            .filter(|l| self.contains(&l.source) && self.contains(&l.target))
    }

    /// Links referencing at least one missing node id.
    pub fn dangling_links(&self) -> Vec<&GraphLink> {
        self.links
            .iter()
            .filter(|l| !self.contains(&l.source) || !self.contains(&l.target))
            .collect()
    }

    pub fn nodes_of_type(&self, node_type: NodeType) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter().filter(move |n| n.node_type == node_type)
    }

    /// First id that appears more than once, if any.
    fn first_duplicate_id(&self) -> Option<&str> {
        let mut seen = HashSet::with_capacity(self.nodes.len());
        self.nodes
            .iter()
            .map(|n| n.id.as_str())
            .find(|id| !seen.insert(*id))
    }
}

/// The complete generated project: files, markdown documentation and graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBundle {
    pub files: Vec<ProjectFile>,
    pub documentation: String,
    pub mental_map: Graph,
}

#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("response is not a valid project bundle: {0}")]
    Json(#[from] serde_json::Error),

    #[error("mental map declares node '{0}' more than once")]
    DuplicateNode(String),
}

impl ProjectBundle {
    /// Parse and validate a response body. Either the whole bundle is
    /// accepted or nothing is; there is no repair step.
    pub fn from_json(raw: &str) -> Result<Self, BundleError> {
        let bundle: ProjectBundle = serde_json::from_str(raw)?;
        bundle.validate()?;

        let dangling = bundle.mental_map.dangling_links();
        if !dangling.is_empty() {
            tracing::warn!(
                count = dangling.len(),
                "mental map has links to unknown nodes; they will not be drawn"
            );
        }
        Ok(bundle)
    }

    pub fn validate(&self) -> Result<(), BundleError> {
        match self.mental_map.first_duplicate_id() {
            Some(id) => Err(BundleError::DuplicateNode(id.to_string())),
            None => Ok(()),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, BundleError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn file(&self, index: usize) -> Option<&ProjectFile> {
        self.files.get(index)
    }
}

/// Application lifecycle. See the shell for transitions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Idle,
    Generating,
    Ready,
    Error,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Idle => "idle",
            ApplicationStatus::Generating => "generating",
            ApplicationStatus::Ready => "ready",
            ApplicationStatus::Error => "error",
        }
    }
}
