use eframe::egui::{CursorIcon, PointerButton, Pos2, Rect, Response, Ui, Vec2};

use super::super::physics::Simulation;
use super::super::render_utils::NODE_RADIUS;
use super::super::viewport::Viewport;
use super::{GraphEvent, GraphModel, GraphView};

pub(in crate::app) const HIT_PADDING: f32 = 4.0;
/// Per-axis screen distance a held node must travel before the press counts as a drag.
pub(in crate::app) const DRAG_THRESHOLD: f32 = 3.0;
const WHEEL_ZOOM_RATE: f32 = 0.0018;

#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) enum InteractionState {
    Idle,
    Panning { last: Pos2 },
    PotentialDrag { node_id: String, origin: Pos2 },
    Dragging { node_id: String },
}

/// Single-pointer input in surface-local screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) enum PointerEvent {
    Down(Pos2),
    Move(Pos2),
    Up(Pos2),
    Cancel,
}

/// Topmost node under `screen`, scanning from the last-drawn node backwards.
pub(in crate::app) fn hit_test(model: &GraphModel, viewport: &Viewport, screen: Pos2) -> Option<usize> {
    let point = viewport.screen_to_sim(screen);
    let reach = NODE_RADIUS + HIT_PADDING;
    model.nodes.iter().enumerate().rev().find_map(|(index, node)| {
        let position = node.position?;
        ((position - point).length_sq() <= reach * reach).then_some(index)
    })
}

/// Disambiguates clicks, node drags and background pans.
pub(in crate::app) struct InteractionController {
    state: InteractionState,
    hovered: Option<String>,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self {
            state: InteractionState::Idle,
            hovered: None,
        }
    }
}

impl InteractionController {
    pub(in crate::app) fn state(&self) -> &InteractionState {
        &self.state
    }

    pub(in crate::app) fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    /// Zoom gestures are ignored while a pan or a real drag is in flight.
    pub(in crate::app) fn zoom_enabled(&self) -> bool {
        !matches!(
            self.state,
            InteractionState::Panning { .. } | InteractionState::Dragging { .. }
        )
    }

    pub(in crate::app) fn is_idle(&self) -> bool {
        self.state == InteractionState::Idle
    }

    pub(in crate::app) fn is_dragging(&self) -> bool {
        matches!(self.state, InteractionState::Dragging { .. })
    }

    pub(in crate::app) fn clear_hover(&mut self) {
        self.hovered = None;
    }

    fn held_node(&self) -> Option<&str> {
        match &self.state {
            InteractionState::PotentialDrag { node_id, .. } | InteractionState::Dragging { node_id } => {
                Some(node_id)
            }
            _ => None,
        }
    }

    fn release(model: &mut GraphModel, node_id: &str) {
        if let Some(node) = model.node_mut(node_id)
            && let Some(pin) = node.pin.take()
        {
            node.position = Some(pin);
            node.velocity = Vec2::ZERO;
        }
    }

    fn set_pin(model: &mut GraphModel, viewport: &Viewport, node_id: &str, screen: Pos2) {
        if let Some(node) = model.node_mut(node_id) {
            node.pin = Some(viewport.screen_to_sim(screen));
        }
    }

    /// Feeds one pointer event through the state machine.
    ///
    /// Returns the id of the node that received a genuine click, if any.
    pub(in crate::app) fn handle(
        &mut self,
        event: PointerEvent,
        model: &mut GraphModel,
        viewport: &mut Viewport,
        simulation: &mut Simulation,
    ) -> Option<String> {
        let state = std::mem::replace(&mut self.state, InteractionState::Idle);
        let (next, clicked) = match (state, event) {
            (InteractionState::Idle, PointerEvent::Down(point)) => {
                match hit_test(model, viewport, point) {
                    Some(index) => {
                        let node = &mut model.nodes[index];
                        node.pin = node.position;
                        (
                            InteractionState::PotentialDrag {
                                node_id: node.id.clone(),
                                origin: point,
                            },
                            None,
                        )
                    }
                    None => (InteractionState::Panning { last: point }, None),
                }
            }
            (InteractionState::Idle, PointerEvent::Move(point)) => {
                self.hovered = hit_test(model, viewport, point).map(|index| model.nodes[index].id.clone());
                (InteractionState::Idle, None)
            }
            (InteractionState::Panning { last }, PointerEvent::Move(point)) => {
                viewport.pan(point - last);
                (InteractionState::Panning { last: point }, None)
            }
            (InteractionState::Panning { .. }, PointerEvent::Up(_) | PointerEvent::Cancel) => {
                (InteractionState::Idle, None)
            }
            (InteractionState::PotentialDrag { node_id, origin }, PointerEvent::Move(point)) => {
                Self::set_pin(model, viewport, &node_id, point);
                let delta = point - origin;
                if delta.x.abs() > DRAG_THRESHOLD || delta.y.abs() > DRAG_THRESHOLD {
                    simulation.set_alpha_target(simulation.drag_alpha_target());
                    (InteractionState::Dragging { node_id }, None)
                } else {
                    (InteractionState::PotentialDrag { node_id, origin }, None)
                }
            }
            (InteractionState::PotentialDrag { node_id, .. }, PointerEvent::Up(_)) => {
                Self::release(model, &node_id);
                tracing::info!(node = %node_id, "node clicked");
                (InteractionState::Idle, Some(node_id))
            }
            (InteractionState::PotentialDrag { node_id, .. }, PointerEvent::Cancel) => {
                Self::release(model, &node_id);
                (InteractionState::Idle, None)
            }
            (InteractionState::Dragging { node_id }, PointerEvent::Move(point)) => {
                Self::set_pin(model, viewport, &node_id, point);
                (InteractionState::Dragging { node_id }, None)
            }
            (InteractionState::Dragging { node_id }, PointerEvent::Up(_) | PointerEvent::Cancel) => {
                Self::release(model, &node_id);
                simulation.set_alpha_target(0.0);
                (InteractionState::Idle, None)
            }
            (state, _) => (state, None),
        };

        self.state = next;
        clicked
    }

    /// Drops a hold or hover on a node that no longer exists in `model`.
    pub(in crate::app) fn retain_valid(&mut self, model: &GraphModel, simulation: &mut Simulation) {
        if self.hovered.as_deref().is_some_and(|id| model.node(id).is_none()) {
            self.hovered = None;
        }

        if self.held_node().is_some_and(|id| model.node(id).is_none()) {
            if matches!(self.state, InteractionState::Dragging { .. }) {
                simulation.set_alpha_target(0.0);
            }
            self.state = InteractionState::Idle;
        }
    }

    /// Returns to idle, releasing any pin.
    pub(in crate::app) fn reset(&mut self, model: &mut GraphModel, simulation: &mut Simulation) {
        if let Some(node_id) = self.held_node().map(str::to_owned) {
            Self::release(model, &node_id);
        }
        if matches!(self.state, InteractionState::Dragging { .. }) {
            simulation.set_alpha_target(0.0);
        }
        self.state = InteractionState::Idle;
        self.hovered = None;
    }
}

impl GraphView {
    pub(super) fn send(&mut self, event: PointerEvent) -> Option<String> {
        self.controller
            .handle(event, &mut self.model, &mut self.viewport, &mut self.simulation)
    }

    /// Feeds this frame's egui pointer input through the controller.
    ///
    /// Positions are converted to surface-local coordinates before they reach the state machine.
    pub(super) fn handle_input(&mut self, ui: &Ui, rect: Rect, response: &Response) -> Vec<GraphEvent> {
        let mut events = Vec::new();
        let (latest, pressed, released, primary_down) = ui.input(|input| {
            (
                input.pointer.latest_pos(),
                input.pointer.primary_pressed(),
                input.pointer.primary_released(),
                input.pointer.primary_down(),
            )
        });

        let Some(pointer) = latest else {
            if !self.controller.is_idle() {
                self.send(PointerEvent::Cancel);
            }
            self.controller.clear_hover();
            return events;
        };
        let local = (pointer - rect.min).to_pos2();

        if pressed && response.hovered() && self.controller.is_idle() {
            self.send(PointerEvent::Down(local));
        }

        if !self.controller.is_idle() || response.hovered() {
            self.send(PointerEvent::Move(local));
        } else {
            self.controller.clear_hover();
        }

        if released && !self.controller.is_idle() {
            if let Some(node_id) = self.send(PointerEvent::Up(local)) {
                events.push(GraphEvent::NodeClicked(node_id));
            }
        } else if !primary_down && !self.controller.is_idle() {
            // Release happened outside our view of the input stream.
            self.send(PointerEvent::Cancel);
        }

        if self.controller.is_idle()
            && (response.dragged_by(PointerButton::Secondary)
                || response.dragged_by(PointerButton::Middle))
        {
            self.viewport.pan(response.drag_delta());
        }

        if self.controller.zoom_enabled() && response.hovered() {
            let (scroll, pinch) = ui.input(|input| (input.raw_scroll_delta.y, input.zoom_delta()));
            let factor = if (pinch - 1.0).abs() > f32::EPSILON {
                pinch
            } else if scroll.abs() > f32::EPSILON {
                (1.0 + (scroll * WHEEL_ZOOM_RATE)).clamp(0.85, 1.15)
            } else {
                1.0
            };
            if factor != 1.0 {
                self.viewport.zoom_at(local, factor);
            }
        }

        let cursor = match self.controller.state() {
            InteractionState::Panning { .. } | InteractionState::Dragging { .. } => {
                Some(CursorIcon::Grabbing)
            }
            _ if self.controller.hovered().is_some() => Some(CursorIcon::PointingHand),
            _ => None,
        };
        if let Some(cursor) = cursor {
            ui.output_mut(|output| {
                output.cursor_icon = cursor;
            });
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::super::build::tests::{relationship, snapshot};
    use super::*;
    use crate::app::physics::SimulationConfig;

    struct Harness {
        model: GraphModel,
        viewport: Viewport,
        simulation: Simulation,
        controller: InteractionController,
    }

    impl Harness {
        fn new() -> Self {
            let mut model = GraphModel::default();
            model.rebuild(&snapshot(
                &["a", "b", "c"],
                vec![relationship("r1", "a", "b", "FRIEND_OF")],
                Vec::new(),
            ));
            model.nodes[0].position = Some(vec2(100.0, 100.0));
            model.nodes[1].position = Some(vec2(300.0, 100.0));
            model.nodes[2].position = Some(vec2(300.0, 300.0));

            Self {
                model,
                viewport: Viewport::default(),
                simulation: Simulation::new(SimulationConfig::default(), vec2(200.0, 200.0)),
                controller: InteractionController::default(),
            }
        }

        fn send(&mut self, event: PointerEvent) -> Option<String> {
            self.controller
                .handle(event, &mut self.model, &mut self.viewport, &mut self.simulation)
        }
    }

    #[test]
    fn hit_test_center_and_miss() {
        let harness = Harness::new();
        assert_eq!(hit_test(&harness.model, &harness.viewport, pos2(100.0, 100.0)), Some(0));
        let far = NODE_RADIUS + HIT_PADDING + 0.5;
        assert_eq!(
            hit_test(&harness.model, &harness.viewport, pos2(100.0 + far, 100.0)),
            None
        );
    }

    #[test]
    fn hit_test_respects_transform() {
        let mut harness = Harness::new();
        harness.viewport = Viewport {
            translate: vec2(50.0, -20.0),
            scale: 2.0,
        };
        let screen = harness.viewport.sim_to_screen(vec2(300.0, 300.0));
        assert_eq!(hit_test(&harness.model, &harness.viewport, screen), Some(2));
    }

    #[test]
    fn hit_test_prefers_topmost_of_overlapping_nodes() {
        let mut harness = Harness::new();
        harness.model.nodes[1].position = Some(vec2(104.0, 100.0));
        assert_eq!(hit_test(&harness.model, &harness.viewport, pos2(102.0, 100.0)), Some(1));
    }

    #[test]
    fn hit_test_skips_unplaced_nodes() {
        let mut harness = Harness::new();
        harness.model.nodes[0].position = None;
        assert_eq!(hit_test(&harness.model, &harness.viewport, pos2(100.0, 100.0)), None);
    }

    #[test]
    fn small_movement_is_a_click() {
        let mut harness = Harness::new();
        let others_before = [harness.model.nodes[1].position, harness.model.nodes[2].position];

        assert_eq!(harness.send(PointerEvent::Down(pos2(100.0, 100.0))), None);
        assert!(matches!(harness.controller.state(), InteractionState::PotentialDrag { .. }));
        assert_eq!(harness.model.nodes[0].pin, Some(vec2(100.0, 100.0)));

        assert_eq!(harness.send(PointerEvent::Move(pos2(102.0, 97.0))), None);
        assert!(matches!(harness.controller.state(), InteractionState::PotentialDrag { .. }));
        assert_eq!(harness.simulation.alpha_target(), 0.0);

        let clicked = harness.send(PointerEvent::Up(pos2(102.0, 97.0)));
        assert_eq!(clicked.as_deref(), Some("a"));
        assert!(harness.controller.is_idle());
        assert_eq!(harness.model.nodes[0].pin, None);
        assert_eq!(
            [harness.model.nodes[1].position, harness.model.nodes[2].position],
            others_before
        );
    }

    #[test]
    fn crossing_threshold_becomes_a_drag_without_click() {
        let mut harness = Harness::new();
        harness.viewport = Viewport {
            translate: vec2(10.0, 10.0),
            scale: 2.0,
        };
        let start = harness.viewport.sim_to_screen(vec2(100.0, 100.0));

        harness.send(PointerEvent::Down(start));
        harness.send(PointerEvent::Move(start + vec2(10.0, 0.0)));
        assert!(matches!(harness.controller.state(), InteractionState::Dragging { .. }));
        assert!(harness.simulation.alpha_target() > 0.0);
        assert!(!harness.controller.zoom_enabled());

        let end = start + vec2(60.0, 40.0);
        harness.send(PointerEvent::Move(end));
        let expected = harness.viewport.screen_to_sim(end);
        assert_eq!(harness.model.nodes[0].pin, Some(expected));

        assert_eq!(harness.send(PointerEvent::Up(end)), None);
        assert!(harness.controller.is_idle());
        assert_eq!(harness.model.nodes[0].pin, None);
        assert_eq!(harness.model.nodes[0].position, Some(expected));
        assert_eq!(harness.simulation.alpha_target(), 0.0);
        assert!(harness.controller.zoom_enabled());
    }

    #[test]
    fn background_press_pans_by_screen_delta() {
        let mut harness = Harness::new();
        harness.viewport.scale = 3.0;

        harness.send(PointerEvent::Down(pos2(600.0, 600.0)));
        assert!(matches!(harness.controller.state(), InteractionState::Panning { .. }));
        assert!(!harness.controller.zoom_enabled());

        harness.send(PointerEvent::Move(pos2(610.0, 590.0)));
        harness.send(PointerEvent::Move(pos2(620.0, 600.0)));
        assert_eq!(harness.viewport.translate, vec2(20.0, 0.0));

        assert_eq!(harness.send(PointerEvent::Up(pos2(620.0, 600.0))), None);
        assert!(harness.controller.is_idle());
    }

    #[test]
    fn idle_move_tracks_hover() {
        let mut harness = Harness::new();
        harness.send(PointerEvent::Move(pos2(300.0, 305.0)));
        assert_eq!(harness.controller.hovered(), Some("c"));
        harness.send(PointerEvent::Move(pos2(0.0, 0.0)));
        assert_eq!(harness.controller.hovered(), None);
    }

    #[test]
    fn cancel_releases_without_click() {
        let mut harness = Harness::new();
        harness.send(PointerEvent::Down(pos2(100.0, 100.0)));
        assert_eq!(harness.send(PointerEvent::Cancel), None);
        assert!(harness.controller.is_idle());
        assert_eq!(harness.model.nodes[0].pin, None);
    }

    #[test]
    fn vanished_drag_target_returns_to_idle() {
        let mut harness = Harness::new();
        harness.send(PointerEvent::Down(pos2(100.0, 100.0)));
        harness.send(PointerEvent::Move(pos2(150.0, 150.0)));
        assert!(harness.simulation.alpha_target() > 0.0);

        harness.model.rebuild(&snapshot(&["b", "c"], Vec::new(), Vec::new()));
        harness
            .controller
            .retain_valid(&harness.model, &mut harness.simulation);
        assert!(harness.controller.is_idle());
        assert_eq!(harness.simulation.alpha_target(), 0.0);
    }

    #[test]
    fn reset_releases_held_node() {
        let mut harness = Harness::new();
        harness.send(PointerEvent::Down(pos2(300.0, 100.0)));
        harness.send(PointerEvent::Move(pos2(340.0, 100.0)));
        harness
            .controller
            .reset(&mut harness.model, &mut harness.simulation);

        assert!(harness.controller.is_idle());
        assert_eq!(harness.model.nodes[1].pin, None);
        assert_eq!(harness.simulation.alpha_target(), 0.0);
    }
}
