use std::path::Path;

use eframe::egui::{self, Align, Align2, Color32, Context, Key, Layout, RichText, Sense, vec2};

use crate::domain::CATEGORY_PALETTE;

use super::super::ViewModel;

/// `CHARACTER` -> `Character`.
pub(super) fn category_title(category: &str) -> String {
    let mut chars = category.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

impl ViewModel {
    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        snapshot_path: &Path,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        if ctx.input(|input| input.key_pressed(Key::Escape)) && self.connecting_from.is_some() {
            self.cancel_connecting();
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Constellation");
                    ui.separator();
                    if let Some(project) = &self.snapshot.project {
                        ui.label(RichText::new(project).strong());
                    }
                    ui.label(format!("snapshot: {}", snapshot_path.display()));
                    ui.label(format!("entities: {}", self.snapshot.entities.len()));
                    ui.label(format!("relationships: {}", self.snapshot.relationships.len()));
                    ui.label(format!("links: {}", self.snapshot.links.len()));
                    let reload_button =
                        ui.add_enabled(!is_reloading, egui::Button::new("Reload snapshot"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    if is_reloading {
                        ui.spinner();
                    }
                    if let Some(error) = &self.reload_error {
                        ui.colored_label(Color32::from_rgb(239, 100, 97), "reload failed")
                            .on_hover_text(error.as_str());
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!("zoom {:.0}%", self.graph.zoom_percent()));
                        if self.graph.is_settled() {
                            ui.label("layout settled");
                        } else {
                            ui.label(format!("simulating (alpha {:.3})", self.graph.alpha()));
                        }
                        ui.label(format!("nodes: {}", self.graph.node_count()));
                    });
                });
            });

        egui::TopBottomPanel::top("toolbar")
            .resizable(false)
            .show(ctx, |ui| self.draw_toolbar(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                for event in self.graph.frame(ui) {
                    self.handle_graph_event(event);
                }
            });

        Self::draw_legend(ctx);
    }

    fn draw_legend(ctx: &Context) {
        egui::Area::new(egui::Id::new("category_legend"))
            .anchor(Align2::LEFT_BOTTOM, vec2(12.0, -12.0))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    for (category, color) in CATEGORY_PALETTE {
                        ui.horizontal(|ui| {
                            let (rect, _) = ui.allocate_exact_size(vec2(12.0, 12.0), Sense::hover());
                            ui.painter().circle_filled(rect.center(), 5.0, color);
                            ui.small(category_title(category));
                        });
                    }
                    ui.separator();
                    ui.small("solid: relationship");
                    ui.small("dashed: link");
                });
            });
    }
}

#[cfg(test)]
mod tests {
    use super::category_title;

    #[test]
    fn category_titles_are_capitalised() {
        assert_eq!(category_title("CHARACTER"), "Character");
        assert_eq!(category_title("item"), "Item");
        assert_eq!(category_title(""), "");
    }
}
