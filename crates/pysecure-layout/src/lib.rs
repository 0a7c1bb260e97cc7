//! # pysecure-layout
//!
//! Lays out the mental map of a generated project and projects it to SVG.
//!
//! ```text
//! Graph ──> Simulation ──tick──> Layout ──> svg::render
//!               ▲                  │
//!           drag pins        LayoutRunner (watch channel)
//! ```

pub mod runner;
pub mod simulation;
pub mod svg;

use serde::Serialize;

use pysecure_core::{GraphLink, NodeType};

pub use runner::{DragCommand, LayoutRunner};
pub use simulation::{ForceParams, Simulation};

/// Drawing area the layout is centred in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 400.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub x: f64,
    pub y: f64,
    pub pinned: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedEdge {
    pub source: String,
    pub target: String,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// One frame of the simulation. Only resolvable links appear in `edges`.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Layout {
    pub nodes: Vec<PlacedNode>,
    pub edges: Vec<PlacedEdge>,
    pub dangling: Vec<GraphLink>,
    pub alpha: f64,
    pub settled: bool,
}

impl Layout {
    pub fn node(&self, id: &str) -> Option<&PlacedNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Lay out a graph headlessly until it settles.
pub fn settle(graph: &pysecure_core::Graph, viewport: Viewport) -> Layout {
    let mut sim = Simulation::new(graph, viewport);
    let ticks = sim.run_to_settle(MAX_SETTLE_TICKS);
    tracing::debug!(ticks, nodes = graph.nodes.len(), "layout settled");
    sim.snapshot()
}

/// Upper bound for headless settling; default decay settles in ~300 ticks.
pub const MAX_SETTLE_TICKS: usize = 1_000;
