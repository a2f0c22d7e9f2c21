use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, Ui, Vec2, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::super::highlight::build_highlight_state;
use super::super::render_utils::{
    GLOW_EXTENT, HOVERED_RADIUS, NODE_RADIUS, RELATED_ACCENT, SEARCH_ACCENT, SELECTED_ACCENT,
    SELECTED_RADIUS, blend_color, circle_visible, dim_color, draw_background, edge_visible,
    truncate_label, with_alpha,
};
use super::{EdgeKind, GraphView, SearchMatchCache};

const NODE_LABEL_MAX_CHARS: usize = 28;
const EDGE_LABEL_MIN_SCALE: f32 = 0.6;
const NODE_LABEL_MIN_SCALE: f32 = 0.45;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

struct LabelJob {
    anchor: Pos2,
    align: Align2,
    text: String,
    size: f32,
    color: Color32,
}

impl GraphView {
    /// Indices of nodes whose title fuzzily matches the search box, cached per query and model revision.
    fn search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_cache
            && cached.revision == self.revision
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .model
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                fuzzy_match_score(&matcher, &node.label, query).map(|_| index)
            })
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            revision: self.revision,
            matches: Arc::clone(&matches),
        });
        Some(matches)
    }

    fn draw_empty_state(painter: &Painter, rect: Rect) {
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            "No entities yet",
            FontId::proportional(18.0),
            Color32::from_gray(170),
        );
        painter.text(
            rect.center() + vec2(0.0, 24.0),
            Align2::CENTER_CENTER,
            "Add entities to the snapshot and reload to see their constellation.",
            FontId::proportional(12.5),
            Color32::from_gray(120),
        );
    }

    /// Draws edges, then nodes, then every text label over the full surface.
    pub(super) fn paint(&mut self, ui: &Ui, rect: Rect) {
        let painter = ui.painter_at(rect);
        draw_background(&painter, rect, &self.viewport);

        if self.model.is_empty() {
            Self::draw_empty_state(&painter, rect);
            return;
        }

        // Selection takes over the highlight; search only colours an unselected graph.
        let search_matches = if self.selected.is_none() {
            self.search_matches()
        } else {
            None
        };
        let search_active = search_matches.as_ref().is_some_and(|matches| !matches.is_empty());
        let highlight = build_highlight_state(&self.model, self.selected.as_deref());
        let hovered = if self.controller.is_idle() {
            self.controller.hovered().and_then(|id| self.model.index_of(id))
        } else {
            None
        };

        let viewport = self.viewport;
        let scale = viewport.scale;
        let to_screen = |sim: Vec2| rect.min + viewport.sim_to_screen(sim).to_vec2();
        let mut labels = Vec::new();

        for (edge_index, edge) in self.model.edges.iter().enumerate() {
            let (Some(source), Some(target)) = (
                self.model.nodes[edge.source].position,
                self.model.nodes[edge.target].position,
            ) else {
                continue;
            };

            let start = to_screen(source);
            let end = to_screen(target);
            if !edge_visible(rect, start, end, 2.0) {
                continue;
            }

            let related = highlight.related_edges.contains(&edge_index);
            let (width, color) = if related {
                (1.5 * scale, with_alpha(RELATED_ACCENT, 220))
            } else if highlight.is_active() {
                (0.8 * scale, Color32::from_rgba_unmultiplied(90, 100, 115, 60))
            } else {
                (0.8 * scale, Color32::from_rgba_unmultiplied(148, 163, 184, 120))
            };
            let stroke = Stroke::new(width.max(0.5), color);

            match edge.kind {
                EdgeKind::Relationship => {
                    painter.line_segment([start, end], stroke);
                }
                EdgeKind::Link => {
                    let dash = (6.0 * scale).max(2.0);
                    let gap = (4.0 * scale).max(1.5);
                    painter.extend(Shape::dashed_line(&[start, end], stroke, dash, gap));
                }
            }

            if !edge.label.is_empty() && (related || scale >= EDGE_LABEL_MIN_SCALE) {
                labels.push(LabelJob {
                    anchor: start + (end - start) * 0.5,
                    align: Align2::CENTER_CENTER,
                    text: truncate_label(&edge.label, NODE_LABEL_MAX_CHARS),
                    size: (9.0 * scale).clamp(8.0, 13.0),
                    color: if related {
                        RELATED_ACCENT
                    } else {
                        Color32::from_rgba_unmultiplied(170, 180, 195, 170)
                    },
                });
            }
        }

        let mut node_labels = Vec::new();
        for (index, node) in self.model.nodes.iter().enumerate() {
            let Some(position) = node.position else {
                continue;
            };

            let is_selected = highlight.selected == Some(index);
            let is_hovered = hovered == Some(index);
            let is_related = highlight.related_nodes.contains(&index);
            let is_match = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&index));

            let base_radius = if is_selected {
                SELECTED_RADIUS
            } else if is_hovered {
                HOVERED_RADIUS
            } else {
                NODE_RADIUS
            };
            let center = to_screen(position);
            let radius = base_radius * scale;
            let glow = radius + GLOW_EXTENT * scale;
            if !circle_visible(rect, center, glow) {
                continue;
            }

            let color = if is_selected || is_hovered || is_related {
                node.color
            } else if is_match {
                blend_color(node.color, SEARCH_ACCENT, 0.3)
            } else if highlight.is_active() {
                dim_color(node.color, 0.55)
            } else if search_active {
                dim_color(node.color, 0.4)
            } else {
                node.color
            };

            if is_selected || is_hovered {
                painter.circle_filled(center, glow, with_alpha(node.color, 0x30));
            }
            painter.circle_filled(center, radius, color);

            let outline = if is_selected {
                Stroke::new((2.0 * scale).max(1.0), SELECTED_ACCENT)
            } else if is_match {
                Stroke::new(1.5, SEARCH_ACCENT)
            } else {
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190))
            };
            painter.circle_stroke(center, radius, outline);

            let emphasised = is_selected || is_hovered || is_related || is_match;
            if emphasised || scale >= NODE_LABEL_MIN_SCALE {
                node_labels.push(LabelJob {
                    anchor: center + vec2(0.0, radius + 3.0 * scale.max(0.5)),
                    align: Align2::CENTER_TOP,
                    text: truncate_label(&node.label, NODE_LABEL_MAX_CHARS),
                    size: (11.0 * scale).clamp(9.0, 16.0),
                    color: if emphasised {
                        Color32::from_gray(245)
                    } else {
                        Color32::from_gray(200)
                    },
                });
            }
        }

        for label in labels.into_iter().chain(node_labels) {
            painter.text(
                label.anchor,
                label.align,
                label.text,
                FontId::proportional(label.size),
                label.color,
            );
        }

        if let Some(index) = hovered {
            let node = &self.model.nodes[index];
            let degree = self
                .model
                .edges
                .iter()
                .filter(|edge| edge.source == index || edge.target == index)
                .count();
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!("{}  |  {}  |  connections {degree}", node.label, node.category),
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::build::tests::snapshot;
    use super::*;
    use crate::app::physics::SimulationConfig;

    fn titled_view(titles: &[(&str, &str)]) -> GraphView {
        let ids = titles.iter().map(|(id, _)| *id).collect::<Vec<_>>();
        let mut data = snapshot(&ids, Vec::new(), Vec::new());
        for (entity, (_, title)) in data.entities.iter_mut().zip(titles) {
            entity.title = (*title).to_owned();
        }
        let mut view = GraphView::new(SimulationConfig::default());
        view.apply_snapshot(&data);
        view
    }

    #[test]
    fn search_matches_titles_fuzzily_and_case_insensitively() {
        let mut view = titled_view(&[("a", "Aria Vell"), ("b", "Brass Keep"), ("c", "Ariadne")]);
        view.set_search("aria");

        let matches = view.search_matches().unwrap_or_default();
        assert!(matches.contains(&0));
        assert!(matches.contains(&2));
        assert!(!matches.contains(&1));
    }

    #[test]
    fn search_cache_is_reused_until_query_or_model_changes() {
        let mut view = titled_view(&[("a", "Aria Vell"), ("b", "Brass Keep")]);
        view.set_search("keep");
        let first = view.search_matches().unwrap_or_default();
        let second = view.search_matches().unwrap_or_default();
        assert!(Arc::ptr_eq(&first, &second));

        view.apply_snapshot(&snapshot(&["a", "b"], Vec::new(), Vec::new()));
        let third = view.search_matches().unwrap_or_default();
        assert!(!Arc::ptr_eq(&first, &third));
        assert!(third.is_empty());
    }

    #[test]
    fn blank_search_is_inactive() {
        let mut view = titled_view(&[("a", "Aria Vell")]);
        view.set_search("   ");
        assert!(view.search_matches().is_none());
    }
}
