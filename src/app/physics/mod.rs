mod forces;
mod quadtree;

use eframe::egui::{Vec2, vec2};

use crate::util::stable_pair;

use super::graph::GraphModel;
use forces::{
    CollisionParams, accumulate_centering, accumulate_collision_pairs, accumulate_links,
    accumulate_repulsion_for_node, accumulate_repulsion_pairwise,
};
use quadtree::QuadNode;

const INITIAL_PLACEMENT_RADIUS: f32 = 10.0;
const MIN_ALPHA_MIN: f32 = 1e-6;
/// Graphs up to this size use exact repulsion instead of the quadtree walk.
const PAIRWISE_REPULSION_MAX_NODES: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SimulationConfig {
    pub link_distance: f32,
    /// Negative values repel.
    pub charge: f32,
    pub collision_radius: f32,
    pub collision_strength: f32,
    pub center_strength: f32,
    pub alpha_decay: f32,
    pub alpha_min: f32,
    pub velocity_decay: f32,
    pub drag_alpha_target: f32,
    pub theta: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            link_distance: 120.0,
            charge: -300.0,
            collision_radius: 30.0,
            collision_strength: 0.7,
            center_strength: 0.1,
            alpha_decay: 0.02,
            alpha_min: 0.001,
            velocity_decay: 0.4,
            drag_alpha_target: 0.3,
            theta: 0.9,
        }
    }
}

impl SimulationConfig {
    /// Replaces out-of-range or non-finite values with usable ones.
    pub(crate) fn sanitized(self) -> Self {
        let defaults = Self::default();
        let pick = |value: f32, fallback: f32| if value.is_finite() { value } else { fallback };

        Self {
            link_distance: pick(self.link_distance, defaults.link_distance).max(1.0),
            charge: -pick(self.charge, defaults.charge).abs(),
            collision_radius: pick(self.collision_radius, defaults.collision_radius).max(0.0),
            collision_strength: pick(self.collision_strength, defaults.collision_strength)
                .clamp(0.0, 1.0),
            center_strength: pick(self.center_strength, defaults.center_strength).clamp(0.0, 1.0),
            alpha_decay: pick(self.alpha_decay, defaults.alpha_decay).clamp(0.001, 1.0),
            alpha_min: pick(self.alpha_min, defaults.alpha_min).clamp(MIN_ALPHA_MIN, 1.0),
            velocity_decay: pick(self.velocity_decay, defaults.velocity_decay).clamp(0.0, 1.0),
            drag_alpha_target: pick(self.drag_alpha_target, defaults.drag_alpha_target)
                .clamp(0.0, 1.0),
            theta: pick(self.theta, defaults.theta).max(0.0),
        }
    }
}

struct PhysicsScratch {
    forces: Vec<Vec2>,
    positions: Vec<Vec2>,
    degrees: Vec<usize>,
    edges: Vec<(usize, usize)>,
}

/// Heat-scheduled force layout over a [`GraphModel`] it borrows each tick.
pub(in crate::app) struct Simulation {
    config: SimulationConfig,
    alpha: f32,
    alpha_target: f32,
    running: bool,
    center: Vec2,
    scratch: PhysicsScratch,
}

impl Simulation {
    pub(in crate::app) fn new(config: SimulationConfig, center: Vec2) -> Self {
        Self {
            config: config.sanitized(),
            alpha: 1.0,
            alpha_target: 0.0,
            running: true,
            center,
            scratch: PhysicsScratch {
                forces: Vec::new(),
                positions: Vec::new(),
                degrees: Vec::new(),
                edges: Vec::new(),
            },
        }
    }

    pub(in crate::app) fn config(&self) -> SimulationConfig {
        self.config
    }

    pub(in crate::app) fn alpha(&self) -> f32 {
        self.alpha
    }

    #[cfg(test)]
    pub(in crate::app) fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub(in crate::app) fn is_running(&self) -> bool {
        self.running
    }

    pub(in crate::app) fn center(&self) -> Vec2 {
        self.center
    }

    pub(in crate::app) fn set_center(&mut self, center: Vec2) {
        self.center = center;
    }

    /// Raises or drops the floor alpha is driven toward; a positive target keeps ticking.
    pub(in crate::app) fn set_alpha_target(&mut self, target: f32) {
        self.alpha_target = target.clamp(0.0, 1.0);
        if self.alpha_target > 0.0 {
            self.running = true;
        }
    }

    pub(in crate::app) fn drag_alpha_target(&self) -> f32 {
        self.config.drag_alpha_target
    }

    /// Lifts alpha to at least `alpha` and resumes ticking.
    pub(in crate::app) fn reheat(&mut self, alpha: f32) {
        self.alpha = self.alpha.max(alpha).clamp(0.0, 1.0);
        self.running = true;
    }

    pub(in crate::app) fn restart(&mut self) {
        self.alpha = 1.0;
        self.running = true;
    }

    pub(in crate::app) fn stop(&mut self) {
        self.running = false;
    }

    fn is_converged(&self) -> bool {
        self.alpha < self.config.alpha_min && self.alpha_target <= 0.0
    }

    /// Gives unplaced nodes a phyllotaxis spot around the center.
    ///
    /// Runs on every tick and also while the layout is paused, so new nodes always appear.
    pub(in crate::app) fn place_unplaced(&self, model: &mut GraphModel) {
        let golden_angle = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
        for (index, node) in model.nodes.iter_mut().enumerate() {
            if node.position.is_some() {
                continue;
            }

            let radius = INITIAL_PLACEMENT_RADIUS * (0.5 + index as f32).sqrt();
            let angle = index as f32 * golden_angle;
            let (jx, jy) = stable_pair(&node.id);
            node.position =
                Some(self.center + vec2(angle.cos(), angle.sin()) * radius + vec2(jx, jy));
            node.velocity = Vec2::ZERO;
        }
    }

    /// Advances the layout by one step. Returns `false` when the step was skipped.
    pub(in crate::app) fn tick(&mut self, model: &mut GraphModel) -> bool {
        if !self.running {
            return false;
        }
        if self.is_converged() {
            self.running = false;
            tracing::debug!(alpha = self.alpha, "simulation converged");
            return false;
        }

        self.place_unplaced(model);
        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
        self.alpha = self.alpha.clamp(0.0, 1.0);

        let node_count = model.nodes.len();
        if node_count == 0 {
            return true;
        }

        let scratch = &mut self.scratch;
        scratch.forces.clear();
        scratch.forces.resize(node_count, Vec2::ZERO);
        scratch.positions.clear();
        scratch
            .positions
            .extend(model.nodes.iter().map(|node| node.position.unwrap_or(self.center)));
        scratch.degrees.clear();
        scratch.degrees.resize(node_count, 0);
        scratch.edges.clear();
        for edge in &model.edges {
            scratch.edges.push((edge.source, edge.target));
            scratch.degrees[edge.source] += 1;
            scratch.degrees[edge.target] += 1;
        }

        let forces = &mut scratch.forces;
        let positions = &scratch.positions;

        accumulate_links(
            &scratch.edges,
            &scratch.degrees,
            positions,
            self.config.link_distance,
            forces,
        );

        let quadtree = QuadNode::build(positions);
        let charge = -self.config.charge;
        if node_count <= PAIRWISE_REPULSION_MAX_NODES {
            accumulate_repulsion_pairwise(positions, charge, forces);
        } else if let Some(quadtree) = &quadtree {
            for (index, force) in forces.iter_mut().enumerate() {
                accumulate_repulsion_for_node(
                    quadtree,
                    index,
                    positions,
                    charge,
                    self.config.theta,
                    force,
                );
            }
        }

        accumulate_centering(positions, self.center, self.config.center_strength, forces);

        if let Some(quadtree) = &quadtree
            && self.config.collision_radius > 0.0
        {
            accumulate_collision_pairs(
                quadtree,
                quadtree,
                true,
                positions,
                CollisionParams {
                    min_distance: self.config.collision_radius * 2.0,
                    strength: self.config.collision_strength,
                },
                forces,
            );
        }

        let retain = 1.0 - self.config.velocity_decay;
        for (node, force) in model.nodes.iter_mut().zip(forces.iter()) {
            if let Some(pin) = node.pin {
                node.position = Some(pin);
                node.velocity = Vec2::ZERO;
                continue;
            }

            node.velocity = (node.velocity + *force * self.alpha) * retain;
            let position = node.position.unwrap_or(self.center) + node.velocity;
            node.position = Some(position);
        }

        true
    }
}
