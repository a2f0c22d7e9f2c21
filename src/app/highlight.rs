use std::collections::HashSet;

use super::graph::GraphModel;

/// Nodes and edges that touch the selected node.
#[derive(Debug, Default)]
pub(in crate::app) struct HighlightState {
    pub selected: Option<usize>,
    pub related_nodes: HashSet<usize>,
    pub related_edges: HashSet<usize>,
}

impl HighlightState {
    pub(in crate::app) fn is_active(&self) -> bool {
        self.selected.is_some()
    }
}

pub(in crate::app) fn build_highlight_state(model: &GraphModel, selected_id: Option<&str>) -> HighlightState {
    let Some(selected) = selected_id.and_then(|id| model.index_of(id)) else {
        return HighlightState::default();
    };

    let mut state = HighlightState {
        selected: Some(selected),
        ..HighlightState::default()
    };
    for (edge_index, edge) in model.edges.iter().enumerate() {
        let other = if edge.source == selected {
            edge.target
        } else if edge.target == selected {
            edge.source
        } else {
            continue;
        };
        state.related_edges.insert(edge_index);
        if other != selected {
            state.related_nodes.insert(other);
        }
    }
    state
}

#[cfg(test)]
mod tests {
    use super::super::graph::build::tests::{relationship, snapshot};
    use super::*;

    #[test]
    fn collects_edges_touching_selection_in_both_directions() {
        let mut model = GraphModel::default();
        model.rebuild(&snapshot(
            &["a", "b", "c", "d"],
            vec![
                relationship("r1", "a", "b", "FRIEND_OF"),
                relationship("r2", "c", "a", "ENEMY_OF"),
                relationship("r3", "c", "d", "KNOWS"),
            ],
            Vec::new(),
        ));

        let state = build_highlight_state(&model, Some("a"));
        assert_eq!(state.selected, Some(0));
        assert_eq!(state.related_edges, HashSet::from([0, 1]));
        assert_eq!(state.related_nodes, HashSet::from([1, 2]));
    }

    #[test]
    fn unknown_or_missing_selection_is_inactive() {
        let mut model = GraphModel::default();
        model.rebuild(&snapshot(&["a"], Vec::new(), Vec::new()));

        assert!(!build_highlight_state(&model, None).is_active());
        assert!(!build_highlight_state(&model, Some("ghost")).is_active());
    }
}
