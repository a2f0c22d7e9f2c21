pub(in crate::app) mod build;
mod interaction;
mod view;

use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{Pos2, Sense, Ui, Vec2};

use crate::domain::Snapshot;

use super::physics::{Simulation, SimulationConfig};
use super::viewport::{Viewport, ZOOM_STEP};
pub(in crate::app) use build::{EdgeKind, GraphModel, RebuildSummary};
use interaction::InteractionController;

const RESIZE_REHEAT_ALPHA: f32 = 0.1;

/// Notifications the surrounding UI reacts to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(in crate::app) enum GraphEvent {
    /// A press and release on the same node without crossing the drag threshold.
    NodeClicked(String),
}

struct SearchMatchCache {
    query: String,
    revision: u64,
    matches: Arc<HashSet<usize>>,
}

/// Owns the node arena, the simulation, the transform and the pointer controller for one surface.
///
/// Each call to [`GraphView::frame`] runs one simulation tick followed by one full redraw.
pub(in crate::app) struct GraphView {
    model: GraphModel,
    simulation: Simulation,
    viewport: Viewport,
    controller: InteractionController,
    selected: Option<String>,
    size: Vec2,
    mounted: bool,
    live_physics: bool,
    search: String,
    search_cache: Option<SearchMatchCache>,
    revision: u64,
}

impl GraphView {
    pub(in crate::app) fn new(config: SimulationConfig) -> Self {
        Self {
            model: GraphModel::default(),
            simulation: Simulation::new(config, Vec2::ZERO),
            viewport: Viewport::default(),
            controller: InteractionController::default(),
            selected: None,
            size: Vec2::ZERO,
            mounted: true,
            live_physics: true,
            search: String::new(),
            search_cache: None,
            revision: 0,
        }
    }

    /// Rebuilds the model from `snapshot`, keeping surviving node positions.
    ///
    /// The simulation is replaced only when the node or edge set changed, so a no-op
    /// update never relayouts.
    pub(in crate::app) fn apply_snapshot(&mut self, snapshot: &Snapshot) -> RebuildSummary {
        let summary = self.model.rebuild(snapshot);
        self.controller.retain_valid(&self.model, &mut self.simulation);
        self.revision = self.revision.wrapping_add(1);

        if summary.topology_changed {
            self.simulation.stop();
            let mut simulation = Simulation::new(self.simulation.config(), self.simulation.center());
            if self.controller.is_dragging() {
                simulation.set_alpha_target(simulation.drag_alpha_target());
            }
            self.simulation = simulation;
        }
        summary
    }

    pub(in crate::app) fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<String>) {
        self.selected = selected;
    }

    pub(in crate::app) fn set_search(&mut self, query: &str) {
        if self.search != query {
            self.search = query.to_owned();
        }
    }

    pub(in crate::app) fn live_physics(&self) -> bool {
        self.live_physics
    }

    pub(in crate::app) fn set_live_physics(&mut self, live: bool) {
        self.live_physics = live;
    }

    pub(in crate::app) fn node_count(&self) -> usize {
        self.model.nodes.len()
    }

    pub(in crate::app) fn is_settled(&self) -> bool {
        !self.simulation.is_running()
    }

    pub(in crate::app) fn alpha(&self) -> f32 {
        self.simulation.alpha()
    }

    pub(in crate::app) fn zoom_percent(&self) -> f32 {
        self.viewport.scale * 100.0
    }

    fn surface_center(&self) -> Pos2 {
        (self.size * 0.5).to_pos2()
    }

    pub(in crate::app) fn zoom_in(&mut self) {
        let anchor = self.surface_center();
        self.viewport.zoom_at(anchor, ZOOM_STEP);
    }

    pub(in crate::app) fn zoom_out(&mut self) {
        let anchor = self.surface_center();
        self.viewport.zoom_at(anchor, 1.0 / ZOOM_STEP);
    }

    pub(in crate::app) fn fit_to_view(&mut self) {
        let positions = self.model.nodes.iter().filter_map(|node| node.position);
        if !self.viewport.fit(positions, self.size) {
            tracing::debug!(size = ?self.size, "fit to view skipped");
        }
    }

    /// Reheats the layout to full energy without touching node identities.
    pub(in crate::app) fn reset_layout(&mut self) {
        self.simulation.restart();
    }

    /// Records the surface size and recenters the layout target on it.
    ///
    /// A zero-sized measurement is skipped; the next valid one is applied.
    pub(in crate::app) fn resize(&mut self, size: Vec2) {
        if !(size.x > 0.0 && size.y > 0.0) {
            tracing::debug!(?size, "resize skipped for empty surface");
            return;
        }
        if size == self.size {
            return;
        }

        self.size = size;
        self.simulation.set_center(size * 0.5);
        self.simulation.reheat(RESIZE_REHEAT_ALPHA);
    }

    /// Stops the simulation and drops any pointer hold; later frames draw nothing.
    pub(in crate::app) fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.simulation.stop();
        self.controller.reset(&mut self.model, &mut self.simulation);
        tracing::debug!(nodes = self.model.nodes.len(), "graph view unmounted");
    }

    fn hold_pins(&mut self) {
        for node in &mut self.model.nodes {
            if let Some(pin) = node.pin {
                node.position = Some(pin);
            }
        }
    }

    /// Runs one tick and one redraw into the remaining space of `ui`.
    pub(in crate::app) fn frame(&mut self, ui: &mut Ui) -> Vec<GraphEvent> {
        if !self.mounted {
            return Vec::new();
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        self.resize(rect.size());

        let events = self.handle_input(ui, rect, &response);

        if self.live_physics {
            self.simulation.tick(&mut self.model);
        } else {
            self.simulation.place_unplaced(&mut self.model);
            self.hold_pins();
        }

        self.paint(ui, rect);
        ui.ctx().request_repaint();
        events
    }
}
