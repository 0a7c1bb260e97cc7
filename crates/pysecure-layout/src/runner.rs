//! Animation loop for interactive views.
//!
//! The simulation runs on a tokio task ticking at frame rate and publishes
//! every frame through a `watch` channel. Dragging goes in through an mpsc
//! channel. The task idles once the layout has settled and wakes again on
//! the next drag. Replacing the graph or dropping the runner aborts the task.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use pysecure_core::Graph;

use crate::{Layout, Simulation, Viewport};

/// ~60 frames per second.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, PartialEq)]
pub enum DragCommand {
    Start { id: String },
    Move { id: String, x: f64, y: f64 },
    End { id: String },
}

fn apply(sim: &mut Simulation, cmd: DragCommand) {
    let known = match &cmd {
        DragCommand::Start { id } => sim.drag_start(id),
        DragCommand::Move { id, x, y } => sim.drag_to(id, *x, *y),
        DragCommand::End { id } => sim.drag_end(id),
    };
    if !known {
        tracing::debug!(?cmd, "drag on unknown node ignored");
    }
}

async fn drive(
    mut sim: Simulation,
    mut commands: mpsc::UnboundedReceiver<DragCommand>,
    frames: watch::Sender<Layout>,
    period: Duration,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        if sim.is_settled() {
            match commands.recv().await {
                Some(cmd) => {
                    apply(&mut sim, cmd);
                    continue;
                }
                None => return,
            }
        }

        tokio::select! {
            _ = ticker.tick() => {
                sim.tick();
                let frame = sim.snapshot();
                let settled = frame.settled;
                if frames.send(frame).is_err() {
                    return;
                }
                if settled {
                    tracing::debug!(ticks = sim.ticks(), "layout loop idle");
                }
            }
            cmd = commands.recv() => match cmd {
                Some(cmd) => apply(&mut sim, cmd),
                None => return,
            },
        }
    }
}

/// Owns the background layout task for one graph at a time.
pub struct LayoutRunner {
    viewport: Viewport,
    period: Duration,
    handle: Option<JoinHandle<()>>,
    commands: mpsc::UnboundedSender<DragCommand>,
    frames: watch::Receiver<Layout>,
}

impl LayoutRunner {
    /// Start laying out `graph`. Must be called inside a tokio runtime.
    pub fn spawn(graph: &Graph, viewport: Viewport) -> Self {
        Self::with_interval(graph, viewport, FRAME_INTERVAL)
    }

    pub fn with_interval(graph: &Graph, viewport: Viewport, period: Duration) -> Self {
        let (handle, commands, frames) = Self::start(graph, viewport, period);
        Self {
            viewport,
            period,
            handle: Some(handle),
            commands,
            frames,
        }
    }

    fn start(
        graph: &Graph,
        viewport: Viewport,
        period: Duration,
    ) -> (
        JoinHandle<()>,
        mpsc::UnboundedSender<DragCommand>,
        watch::Receiver<Layout>,
    ) {
        let sim = Simulation::new(graph, viewport);
        let (frame_tx, frame_rx) = watch::channel(sim.snapshot());
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(drive(sim, cmd_rx, frame_tx, period));
        (handle, cmd_tx, frame_rx)
    }

    /// Subscribe to frames of the current graph.
    pub fn frames(&self) -> watch::Receiver<Layout> {
        self.frames.clone()
    }

    pub fn latest(&self) -> Layout {
        self.frames.borrow().clone()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// False once the loop has been stopped.
    pub fn drag(&self, cmd: DragCommand) -> bool {
        self.handle.is_some() && self.commands.send(cmd).is_ok()
    }

    /// Drop the current loop and lay out `graph` from scratch.
    pub fn replace(&mut self, graph: &Graph) {
        self.stop();
        let (handle, commands, frames) = Self::start(graph, self.viewport, self.period);
        self.handle = Some(handle);
        self.commands = commands;
        self.frames = frames;
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for LayoutRunner {
    fn drop(&mut self) {
        self.stop();
    }
}
