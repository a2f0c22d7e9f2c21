use std::collections::HashMap;

use eframe::egui::{Color32, Vec2};

use crate::domain::{Snapshot, category_color, relationship_label};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum EdgeKind {
    Relationship,
    Link,
}

#[derive(Clone, Debug)]
pub(in crate::app) struct GraphNode {
    pub id: String,
    pub label: String,
    pub category: String,
    pub color: Color32,
    /// Simulation-space position; `None` until the simulation places the node.
    pub position: Option<Vec2>,
    pub velocity: Vec2,
    /// Present only while the node is held by the pointer.
    pub pin: Option<Vec2>,
}

#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) struct GraphEdge {
    pub id: String,
    pub source: usize,
    pub target: usize,
    pub label: String,
    pub kind: EdgeKind,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(in crate::app) struct RebuildSummary {
    pub nodes: usize,
    pub edges: usize,
    pub dropped_edges: usize,
    pub topology_changed: bool,
}

/// Arena of nodes indexed by entity id, with edges referring to nodes by id and index.
#[derive(Default)]
pub(in crate::app) struct GraphModel {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    index_by_id: HashMap<String, usize>,
}

impl GraphModel {
    pub(in crate::app) fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub(in crate::app) fn node(&self, id: &str) -> Option<&GraphNode> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    pub(in crate::app) fn node_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
        let index = self.index_of(id)?;
        self.nodes.get_mut(index)
    }

    pub(in crate::app) fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn make_node(id: &str, title: &str, category: &str) -> GraphNode {
        GraphNode {
            id: id.to_owned(),
            label: title.to_owned(),
            category: category.to_owned(),
            color: category_color(category),
            position: None,
            velocity: Vec2::ZERO,
            pin: None,
        }
    }

    fn collect_edges(
        snapshot: &Snapshot,
        index_by_id: &HashMap<String, usize>,
    ) -> (Vec<GraphEdge>, usize) {
        let relationships = snapshot.relationships.iter().map(|rel| {
            (
                &rel.id,
                &rel.from_id,
                &rel.to_id,
                relationship_label(&rel.type_label),
                EdgeKind::Relationship,
            )
        });
        let links = snapshot
            .links
            .iter()
            .map(|link| (&link.id, &link.from_id, &link.to_id, link.note.clone(), EdgeKind::Link));

        let mut edges = Vec::with_capacity(snapshot.connection_count());
        let mut dropped = 0usize;
        for (id, from_id, to_id, label, kind) in relationships.chain(links) {
            let (Some(&source), Some(&target)) = (index_by_id.get(from_id), index_by_id.get(to_id))
            else {
                dropped += 1;
                continue;
            };

            edges.push(GraphEdge {
                id: id.clone(),
                source,
                target,
                label,
                kind,
            });
        }
        (edges, dropped)
    }

    /// Replaces the node and edge sets with the contents of `snapshot`.
    ///
    /// Nodes whose id survives keep their position and velocity; new ids start unplaced.
    /// Edges with an endpoint outside the entity set are dropped.
    pub(in crate::app) fn rebuild(&mut self, snapshot: &Snapshot) -> RebuildSummary {
        let mut prior_nodes = std::mem::take(&mut self.nodes)
            .into_iter()
            .map(|node| (node.id.clone(), node))
            .collect::<HashMap<_, _>>();
        let prior_ids = std::mem::take(&mut self.index_by_id);

        let mut nodes = Vec::with_capacity(snapshot.entities.len());
        let mut index_by_id = HashMap::with_capacity(snapshot.entities.len());
        for entity in &snapshot.entities {
            if index_by_id.contains_key(&entity.id) {
                continue;
            }
            index_by_id.insert(entity.id.clone(), nodes.len());

            let node = match prior_nodes.remove(&entity.id) {
                Some(mut node) => {
                    node.label = entity.title.clone();
                    if node.category != entity.category {
                        node.color = category_color(&entity.category);
                        node.category = entity.category.clone();
                    }
                    node
                }
                None => Self::make_node(&entity.id, &entity.title, &entity.category),
            };
            nodes.push(node);
        }

        let (edges, dropped_edges) = Self::collect_edges(snapshot, &index_by_id);

        let topology_changed = prior_ids != index_by_id
            || self.edges.len() != edges.len()
            || self
                .edges
                .iter()
                .zip(&edges)
                .any(|(old, new)| old.id != new.id || old.source != new.source || old.target != new.target);

        self.nodes = nodes;
        self.edges = edges;
        self.index_by_id = index_by_id;

        let summary = RebuildSummary {
            nodes: self.nodes.len(),
            edges: self.edges.len(),
            dropped_edges,
            topology_changed,
        };
        tracing::debug!(
            nodes = summary.nodes,
            edges = summary.edges,
            dropped_edges = summary.dropped_edges,
            topology_changed = summary.topology_changed,
            "graph model rebuilt"
        );
        summary
    }
}

#[cfg(test)]
pub(in crate::app) mod tests {
    use eframe::egui::vec2;

    use super::*;
    use crate::domain::{Entity, Link, Relationship};

    pub(in crate::app) fn entity(id: &str) -> Entity {
        Entity {
            id: id.to_owned(),
            title: format!("Entity {id}"),
            category: "CHARACTER".to_owned(),
            tags: Vec::new(),
        }
    }

    pub(in crate::app) fn relationship(id: &str, from: &str, to: &str, kind: &str) -> Relationship {
        Relationship {
            id: id.to_owned(),
            from_id: from.to_owned(),
            to_id: to.to_owned(),
            type_label: kind.to_owned(),
        }
    }

    pub(in crate::app) fn snapshot(
        ids: &[&str],
        relationships: Vec<Relationship>,
        links: Vec<Link>,
    ) -> Snapshot {
        Snapshot {
            project: None,
            entities: ids.iter().map(|id| entity(id)).collect(),
            relationships,
            links,
        }
    }

    #[test]
    fn friend_scenario_then_entity_deleted() {
        let mut model = GraphModel::default();
        let first = snapshot(
            &["a", "b"],
            vec![relationship("r1", "a", "b", "FRIEND_OF")],
            Vec::new(),
        );
        let summary = model.rebuild(&first);
        assert_eq!(summary.nodes, 2);
        assert_eq!(summary.edges, 1);
        assert_eq!(model.edges[0].label, "Friend of");
        assert_eq!(model.edges[0].kind, EdgeKind::Relationship);

        let second = snapshot(
            &["a"],
            vec![relationship("r1", "a", "b", "FRIEND_OF")],
            Vec::new(),
        );
        let summary = model.rebuild(&second);
        assert_eq!(model.nodes.len(), 1);
        assert!(model.edges.is_empty());
        assert_eq!(summary.dropped_edges, 1);
        assert!(summary.topology_changed);
        assert!(model.node("b").is_none());
    }

    #[test]
    fn duplicate_entity_ids_keep_first_occurrence() {
        let mut model = GraphModel::default();
        let mut data = snapshot(&["a", "b", "a"], Vec::new(), Vec::new());
        data.entities[2].title = "Shadow".to_owned();
        model.rebuild(&data);

        assert_eq!(model.nodes.len(), 2);
        assert_eq!(model.node("a").map(|node| node.label.as_str()), Some("Entity a"));
    }

    #[test]
    fn links_become_untyped_edges_labelled_by_note() {
        let mut model = GraphModel::default();
        let data = snapshot(
            &["a", "b"],
            Vec::new(),
            vec![
                Link {
                    id: "l1".into(),
                    from_id: "b".into(),
                    to_id: "a".into(),
                    note: "owes a favour".into(),
                },
                Link {
                    id: "l2".into(),
                    from_id: "b".into(),
                    to_id: "ghost".into(),
                    note: String::new(),
                },
            ],
        );
        let summary = model.rebuild(&data);

        assert_eq!(summary.edges, 1);
        assert_eq!(summary.dropped_edges, 1);
        let edge = &model.edges[0];
        assert_eq!(edge.kind, EdgeKind::Link);
        assert_eq!(edge.label, "owes a favour");
        assert_eq!((edge.source, edge.target), (1, 0));
        assert_eq!(
            (model.nodes[edge.source].id.as_str(), model.nodes[edge.target].id.as_str()),
            ("b", "a")
        );
    }

    #[test]
    fn unchanged_rebuild_keeps_positions_and_reports_no_change() {
        let mut model = GraphModel::default();
        let data = snapshot(
            &["a", "b", "c"],
            vec![relationship("r1", "a", "b", "ALLIED_WITH")],
            Vec::new(),
        );
        model.rebuild(&data);
        for (index, node) in model.nodes.iter_mut().enumerate() {
            node.position = Some(vec2(index as f32 * 10.0, -3.5));
            node.velocity = vec2(0.25, 0.5);
        }
        let before = model
            .nodes
            .iter()
            .map(|node| (node.position, node.velocity))
            .collect::<Vec<_>>();

        let summary = model.rebuild(&data);
        let after = model
            .nodes
            .iter()
            .map(|node| (node.position, node.velocity))
            .collect::<Vec<_>>();

        assert!(!summary.topology_changed);
        assert_eq!(before, after);
    }

    #[test]
    fn new_nodes_start_unplaced_while_survivors_keep_state() {
        let mut model = GraphModel::default();
        model.rebuild(&snapshot(&["a"], Vec::new(), Vec::new()));
        if let Some(node) = model.node_mut("a") {
            node.position = Some(vec2(42.0, 7.0));
        }

        let summary = model.rebuild(&snapshot(&["b", "a"], Vec::new(), Vec::new()));
        assert!(summary.topology_changed);
        assert_eq!(model.index_of("a"), Some(1));
        assert_eq!(model.node("a").and_then(|node| node.position), Some(vec2(42.0, 7.0)));
        assert_eq!(model.node("b").and_then(|node| node.position), None);
    }

    #[test]
    fn node_count_matches_unique_ids_for_varied_inputs() {
        let inputs: [&[&str]; 4] = [&[], &["x"], &["x", "x", "x"], &["p", "q", "p", "r", "q"]];
        for ids in inputs {
            let mut model = GraphModel::default();
            model.rebuild(&snapshot(ids, Vec::new(), Vec::new()));
            let mut unique = ids.to_vec();
            unique.sort_unstable();
            unique.dedup();
            assert_eq!(model.nodes.len(), unique.len());
        }
    }
}
