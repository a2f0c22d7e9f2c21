use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;

const MIN_DISTANCE_SQ: f32 = 1.0;

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) min_distance: f32,
    pub(super) strength: f32,
}

/// Deterministic unit direction for pairs sitting on top of each other.
fn fallback_direction(from: usize, to: usize) -> Vec2 {
    let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

/// Spring along every edge toward `rest_length`, split between endpoints by degree.
pub(super) fn accumulate_links(
    edges: &[(usize, usize)],
    degrees: &[usize],
    positions: &[Vec2],
    rest_length: f32,
    forces: &mut [Vec2],
) {
    for &(source, target) in edges {
        if source == target || source >= positions.len() || target >= positions.len() {
            continue;
        }

        let mut delta = positions[target] - positions[source];
        let mut distance = delta.length();
        if distance <= 0.0001 {
            delta = fallback_direction(source, target) * 0.0001;
            distance = 0.0001;
        }

        let source_degree = degrees[source].max(1) as f32;
        let target_degree = degrees[target].max(1) as f32;
        let strength = 1.0 / source_degree.min(target_degree);
        let bias = source_degree / (source_degree + target_degree);

        let correction = delta * ((distance - rest_length) / distance * strength);
        forces[target] -= correction * bias;
        forces[source] += correction * (1.0 - bias);
    }
}

fn repulsion_between(point: Vec2, other: Vec2, charge: f32, mass: f32, fallback: Vec2) -> Vec2 {
    let delta = point - other;
    let distance_sq = delta.length_sq();
    if distance_sq <= f32::EPSILON {
        return fallback * (charge * mass);
    }
    delta * (charge * mass / distance_sq.max(MIN_DISTANCE_SQ))
}

/// Exact pairwise repulsion; `charge` is the (positive) repulsion magnitude.
pub(super) fn accumulate_repulsion_pairwise(positions: &[Vec2], charge: f32, forces: &mut [Vec2]) {
    for index in 0..positions.len() {
        for other in (index + 1)..positions.len() {
            let push = repulsion_between(
                positions[index],
                positions[other],
                charge,
                1.0,
                fallback_direction(index, other),
            );
            forces[index] += push;
            forces[other] -= push;
        }
    }
}

/// Barnes-Hut approximation of [`accumulate_repulsion_pairwise`] for a single node.
pub(super) fn accumulate_repulsion_for_node(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    charge: f32,
    theta: f32,
    force: &mut Vec2,
) {
    if node.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other_index in &node.indices {
            if other_index == index {
                continue;
            }
            *force += repulsion_between(
                point,
                positions[other_index],
                charge,
                1.0,
                fallback_direction(index, other_index),
            );
        }
        return;
    }

    let distance = (point - node.center_of_mass).length().max(0.0001);
    let can_approximate =
        !node.bounds.contains(point) && (node.bounds.side_length() / distance) < theta;

    if can_approximate {
        *force += repulsion_between(
            point,
            node.center_of_mass,
            charge,
            node.mass,
            fallback_direction(index, 0),
        );
        return;
    }

    for child in node.children.iter().flatten() {
        accumulate_repulsion_for_node(child, index, positions, charge, theta, force);
    }
}

/// Uniform pull that moves the centroid toward `center` without reshaping the layout.
pub(super) fn accumulate_centering(positions: &[Vec2], center: Vec2, strength: f32, forces: &mut [Vec2]) {
    if positions.is_empty() {
        return;
    }

    let centroid = positions.iter().copied().fold(Vec2::ZERO, |sum, p| sum + p) / positions.len() as f32;
    let pull = (center - centroid) * strength;
    for force in forces.iter_mut() {
        *force += pull;
    }
}

fn push_apart(from: usize, to: usize, positions: &[Vec2], params: CollisionParams, forces: &mut [Vec2]) {
    let delta = positions[from] - positions[to];
    let distance = delta.length();
    if distance >= params.min_distance {
        return;
    }

    let direction = if distance > 0.0001 {
        delta / distance
    } else {
        fallback_direction(from, to)
    };
    let overlap_push = direction * ((params.min_distance - distance) * params.strength * 0.5);
    forces[from] += overlap_push;
    forces[to] -= overlap_push;
}

/// Soft collision: every pair closer than `min_distance` is pushed apart in proportion to the overlap.
pub(super) fn accumulate_collision_pairs(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    positions: &[Vec2],
    params: CollisionParams,
    forces: &mut [Vec2],
) {
    let reach = params.min_distance * params.min_distance;
    if node_a.bounds.distance_sq_to(node_b.bounds) > reach {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for (offset, &from) in node_a.indices.iter().enumerate() {
                for &to in &node_a.indices[offset + 1..] {
                    push_apart(from, to, positions, params, forces);
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    push_apart(from, to, positions, params, forces);
                }
            }
        }
        return;
    }

    if same_node {
        for first in 0..4 {
            let Some(child_a) = node_a.children[first].as_ref() else {
                continue;
            };

            accumulate_collision_pairs(child_a, child_a, true, positions, params, forces);

            for second in (first + 1)..4 {
                let Some(child_b) = node_a.children[second].as_ref() else {
                    continue;
                };
                accumulate_collision_pairs(child_a, child_b, false, positions, params, forces);
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.half_extent >= node_b.bounds.half_extent
    };

    if split_a {
        for child in node_a.children.iter().flatten() {
            accumulate_collision_pairs(child, node_b, false, positions, params, forces);
        }
    } else {
        for child in node_b.children.iter().flatten() {
            accumulate_collision_pairs(node_a, child, false, positions, params, forces);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scattered(count: usize) -> Vec<Vec2> {
        (0..count)
            .map(|index| {
                let angle = index as f32 * 2.399_963;
                let radius = 15.0 * (index as f32 + 0.5).sqrt();
                vec2(angle.cos() * radius, angle.sin() * radius)
            })
            .collect()
    }

    #[test]
    fn stretched_link_pulls_endpoints_together() {
        let positions = [vec2(0.0, 0.0), vec2(300.0, 0.0)];
        let mut forces = [Vec2::ZERO; 2];
        accumulate_links(&[(0, 1)], &[1, 1], &positions, 120.0, &mut forces);

        assert!(forces[0].x > 0.0);
        assert!(forces[1].x < 0.0);
        assert!((forces[0].x + forces[1].x).abs() < 1e-3);
    }

    #[test]
    fn compressed_link_pushes_endpoints_apart() {
        let positions = [vec2(0.0, 0.0), vec2(20.0, 0.0)];
        let mut forces = [Vec2::ZERO; 2];
        accumulate_links(&[(0, 1)], &[1, 1], &positions, 120.0, &mut forces);

        assert!(forces[0].x < 0.0);
        assert!(forces[1].x > 0.0);
    }

    #[test]
    fn repulsion_weakens_with_distance() {
        let mut near = [Vec2::ZERO; 2];
        accumulate_repulsion_pairwise(&[vec2(0.0, 0.0), vec2(10.0, 0.0)], 300.0, &mut near);
        let mut far = [Vec2::ZERO; 2];
        accumulate_repulsion_pairwise(&[vec2(0.0, 0.0), vec2(100.0, 0.0)], 300.0, &mut far);

        assert!(near[0].x < 0.0 && near[1].x > 0.0);
        assert!(near[1].x > far[1].x);
    }

    #[test]
    fn barnes_hut_without_approximation_matches_pairwise() {
        let positions = scattered(150);
        let mut exact = vec![Vec2::ZERO; positions.len()];
        accumulate_repulsion_pairwise(&positions, 300.0, &mut exact);

        let tree = QuadNode::build(&positions).unwrap();
        for (index, expected) in exact.iter().enumerate() {
            let mut walked = Vec2::ZERO;
            accumulate_repulsion_for_node(&tree, index, &positions, 300.0, 0.0, &mut walked);
            assert!((walked - *expected).length() < 1e-2, "node {index}: {walked:?} vs {expected:?}");
        }
    }

    #[test]
    fn barnes_hut_approximates_distant_clusters() {
        let mut positions = scattered(40);
        positions.push(vec2(2_000.0, 0.0));
        let probe = positions.len() - 1;

        let mut exact = vec![Vec2::ZERO; positions.len()];
        accumulate_repulsion_pairwise(&positions, 300.0, &mut exact);

        let tree = QuadNode::build(&positions).unwrap();
        let mut approx = Vec2::ZERO;
        accumulate_repulsion_for_node(&tree, probe, &positions, 300.0, 0.9, &mut approx);

        assert!(approx.x > 0.0);
        assert!((approx - exact[probe]).length() <= exact[probe].length() * 0.05);
    }

    #[test]
    fn collision_only_touches_overlapping_pairs() {
        let positions = [vec2(0.0, 0.0), vec2(10.0, 0.0), vec2(500.0, 0.0)];
        let tree = QuadNode::build(&positions).unwrap();
        let mut forces = [Vec2::ZERO; 3];
        let params = CollisionParams {
            min_distance: 60.0,
            strength: 0.7,
        };
        accumulate_collision_pairs(&tree, &tree, true, &positions, params, &mut forces);

        assert!(forces[0].x < 0.0);
        assert!(forces[1].x > 0.0);
        assert_eq!(forces[2], Vec2::ZERO);
    }

    #[test]
    fn centering_pulls_uniformly_toward_target() {
        let positions = [vec2(0.0, 0.0), vec2(20.0, 0.0)];
        let mut forces = [Vec2::ZERO; 2];
        accumulate_centering(&positions, vec2(110.0, 0.0), 0.5, &mut forces);

        assert_eq!(forces[0], vec2(50.0, 0.0));
        assert_eq!(forces[0], forces[1]);
    }
}
