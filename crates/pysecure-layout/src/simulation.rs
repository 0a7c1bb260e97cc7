//! Force-directed layout.
//!
//! Damped iterative relaxation with the same defaults as d3-force:
//! a link spring, all-pairs many-body repulsion and a centering force,
//! damped by an `alpha` that decays towards `alpha_target`.

use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

use pysecure_core::{Graph, GraphLink, NodeType};

use crate::{Layout, PlacedEdge, PlacedNode, Viewport};

const JIGGLE_SEED: u64 = 0x5eed_1a70;

/// Force and damping parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceParams {
    /// Rest length of every link spring.
    pub link_distance: f64,
    /// Many-body strength; negative repels.
    pub charge: f64,
    /// Fraction of the centroid offset removed each tick.
    pub center_strength: f64,
    /// Pair distances below this are clamped.
    pub distance_min: f64,
    pub alpha_min: f64,
    pub alpha_decay: f64,
    pub velocity_decay: f64,
    /// Alpha target while a node is being dragged.
    pub drag_alpha_target: f64,
}

impl Default for ForceParams {
    fn default() -> Self {
        let alpha_min = 0.001_f64;
        Self {
            link_distance: 120.0,
            charge: -400.0,
            center_strength: 1.0,
            distance_min: 1.0,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            velocity_decay: 0.4,
            drag_alpha_target: 0.3,
        }
    }
}

#[derive(Debug, Clone)]
struct Body {
    id: String,
    label: String,
    node_type: NodeType,
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    fx: Option<f64>,
    fy: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
struct Spring {
    source: usize,
    target: usize,
    strength: f64,
    bias: f64,
}

pub struct Simulation {
    bodies: Vec<Body>,
    index: HashMap<String, usize>,
    springs: Vec<Spring>,
    dangling: Vec<GraphLink>,
    viewport: Viewport,
    params: ForceParams,
    alpha: f64,
    alpha_target: f64,
    dragging: HashSet<usize>,
    rng: Xoshiro256StarStar,
    ticks: u64,
}

impl Simulation {
    pub fn new(graph: &Graph, viewport: Viewport) -> Self {
        Self::with_params(graph, viewport, ForceParams::default())
    }

    /// Copies the graph; the caller's data is never touched.
    pub fn with_params(graph: &Graph, viewport: Viewport, params: ForceParams) -> Self {
        let (cx, cy) = viewport.center();
        let mut bodies = Vec::with_capacity(graph.nodes.len());
        let mut index = HashMap::with_capacity(graph.nodes.len());

        for node in &graph.nodes {
            if index.contains_key(&node.id) {
                continue;
            }
            // phyllotaxis seed, same as d3
            let i = bodies.len() as f64;
            let radius = 10.0 * (0.5 + i).sqrt();
            let angle = i * PI * (3.0 - 5.0_f64.sqrt());
            index.insert(node.id.clone(), bodies.len());
            bodies.push(Body {
                id: node.id.clone(),
                label: node.label.clone(),
                node_type: node.node_type,
                x: cx + radius * angle.cos(),
                y: cy + radius * angle.sin(),
                vx: 0.0,
                vy: 0.0,
                fx: None,
                fy: None,
            });
        }

        let mut resolved = Vec::new();
        let mut dangling = Vec::new();
        for link in &graph.links {
            match (index.get(&link.source), index.get(&link.target)) {
                (Some(&s), Some(&t)) => resolved.push((s, t)),
                _ => dangling.push(link.clone()),
            }
        }
        if !dangling.is_empty() {
            tracing::debug!(count = dangling.len(), "skipping links to unknown nodes");
        }

        let mut degree = vec![0usize; bodies.len()];
        for &(s, t) in &resolved {
            degree[s] += 1;
            degree[t] += 1;
        }
        let springs = resolved
            .into_iter()
            .map(|(s, t)| {
                let (ds, dt) = (degree[s] as f64, degree[t] as f64);
                Spring {
                    source: s,
                    target: t,
                    strength: 1.0 / ds.min(dt),
                    bias: ds / (ds + dt),
                }
            })
            .collect();

        Self {
            bodies,
            index,
            springs,
            dangling,
            viewport,
            params,
            alpha: 1.0,
            alpha_target: 0.0,
            dragging: HashSet::new(),
            rng: Xoshiro256StarStar::seed_from_u64(JIGGLE_SEED),
            ticks: 0,
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Settled once energy is spent and nothing is holding it up.
    pub fn is_settled(&self) -> bool {
        self.alpha < self.params.alpha_min && self.alpha_target < self.params.alpha_min
    }

    /// Advance one step.
    pub fn tick(&mut self) {
        self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay;
        self.apply_links();
        self.apply_charge();
        self.apply_center();

        let keep = 1.0 - self.params.velocity_decay;
        for b in &mut self.bodies {
            match b.fx {
                Some(fx) => {
                    b.x = fx;
                    b.vx = 0.0;
                }
                None => {
                    b.vx *= keep;
                    b.x += b.vx;
                }
            }
            match b.fy {
                Some(fy) => {
                    b.y = fy;
                    b.vy = 0.0;
                }
                None => {
                    b.vy *= keep;
                    b.y += b.vy;
                }
            }
        }
        self.ticks += 1;
    }

    /// Tick until settled or `max_ticks` is reached. Returns ticks run.
    pub fn run_to_settle(&mut self, max_ticks: usize) -> usize {
        let mut n = 0;
        while n < max_ticks && !self.is_settled() {
            self.tick();
            n += 1;
        }
        n
    }

    fn jiggle(&mut self) -> f64 {
        (self.rng.gen::<f64>() - 0.5) * 1e-6
    }

    fn apply_links(&mut self) {
        for i in 0..self.springs.len() {
            let Spring {
                source,
                target,
                strength,
                bias,
            } = self.springs[i];
            if source == target {
                continue;
            }
            let (s, t) = (&self.bodies[source], &self.bodies[target]);
            let mut dx = t.x + t.vx - s.x - s.vx;
            let mut dy = t.y + t.vy - s.y - s.vy;
            if dx == 0.0 {
                dx = self.jiggle();
            }
            if dy == 0.0 {
                dy = self.jiggle();
            }
            let len = (dx * dx + dy * dy).sqrt();
            let k = (len - self.params.link_distance) / len * self.alpha * strength;
            dx *= k;
            dy *= k;

            let t = &mut self.bodies[target];
            t.vx -= dx * bias;
            t.vy -= dy * bias;
            let s = &mut self.bodies[source];
            s.vx += dx * (1.0 - bias);
            s.vy += dy * (1.0 - bias);
        }
    }

    fn apply_charge(&mut self) {
        let n = self.bodies.len();
        let min2 = self.params.distance_min * self.params.distance_min;
        let scale = self.params.charge * self.alpha;

        for i in 0..n {
            let (mut ax, mut ay) = (0.0, 0.0);
            for j in 0..n {
                if i == j {
                    continue;
                }
                let mut dx = self.bodies[j].x - self.bodies[i].x;
                let mut dy = self.bodies[j].y - self.bodies[i].y;
                if dx == 0.0 {
                    dx = self.jiggle();
                }
                if dy == 0.0 {
                    dy = self.jiggle();
                }
                let mut l2 = dx * dx + dy * dy;
                if l2 < min2 {
                    l2 = (min2 * l2).sqrt();
                }
                ax += dx * scale / l2;
                ay += dy * scale / l2;
            }
            self.bodies[i].vx += ax;
            self.bodies[i].vy += ay;
        }
    }

    fn apply_center(&mut self) {
        if self.bodies.is_empty() {
            return;
        }
        let n = self.bodies.len() as f64;
        let (cx, cy) = self.viewport.center();
        let sx = self.bodies.iter().map(|b| b.x).sum::<f64>() / n - cx;
        let sy = self.bodies.iter().map(|b| b.y).sum::<f64>() / n - cy;
        let k = self.params.center_strength;
        for b in &mut self.bodies {
            b.x -= sx * k;
            b.y -= sy * k;
        }
    }

    // --- Dragging ---

    /// Pin `id` where it is and re-energise. False for unknown ids.
    pub fn drag_start(&mut self, id: &str) -> bool {
        let Some(&i) = self.index.get(id) else {
            return false;
        };
        let b = &mut self.bodies[i];
        b.fx = Some(b.x);
        b.fy = Some(b.y);
        self.dragging.insert(i);
        self.alpha_target = self.params.drag_alpha_target;
        true
    }

    /// Move the pin of a node being dragged. A move without a preceding
    /// `drag_start` starts the drag.
    pub fn drag_to(&mut self, id: &str, x: f64, y: f64) -> bool {
        let Some(&i) = self.index.get(id) else {
            return false;
        };
        if !self.dragging.contains(&i) {
            self.drag_start(id);
        }
        let b = &mut self.bodies[i];
        b.fx = Some(x);
        b.fy = Some(y);
        true
    }

    /// Release the pin; the layout keeps settling from here.
    pub fn drag_end(&mut self, id: &str) -> bool {
        let Some(&i) = self.index.get(id) else {
            return false;
        };
        let b = &mut self.bodies[i];
        b.fx = None;
        b.fy = None;
        self.dragging.remove(&i);
        if self.dragging.is_empty() {
            self.alpha_target = 0.0;
        }
        true
    }

    pub fn position(&self, id: &str) -> Option<(f64, f64)> {
        self.index.get(id).map(|&i| (self.bodies[i].x, self.bodies[i].y))
    }

    pub fn snapshot(&self) -> Layout {
        let nodes = self
            .bodies
            .iter()
            .map(|b| PlacedNode {
                id: b.id.clone(),
                label: b.label.clone(),
                node_type: b.node_type,
                x: b.x,
                y: b.y,
                pinned: b.fx.is_some(),
            })
            .collect();
        let edges = self
            .springs
            .iter()
            .map(|s| {
                let (a, b) = (&self.bodies[s.source], &self.bodies[s.target]);
                PlacedEdge {
                    source: a.id.clone(),
                    target: b.id.clone(),
                    x1: a.x,
                    y1: a.y,
                    x2: b.x,
                    y2: b.y,
                }
            })
            .collect();
        Layout {
            nodes,
            edges,
            dangling: self.dangling.clone(),
            alpha: self.alpha,
            settled: self.is_settled(),
        }
    }
}
