use eframe::egui::{self, Color32, RichText, Ui};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_toolbar(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            if ui
                .button("Zoom in")
                .on_hover_text("Zoom in around the surface center.")
                .clicked()
            {
                self.graph.zoom_in();
            }
            if ui
                .button("Zoom out")
                .on_hover_text("Zoom out around the surface center.")
                .clicked()
            {
                self.graph.zoom_out();
            }
            if ui
                .button("Fit to view")
                .on_hover_text("Frame every placed entity.")
                .clicked()
            {
                self.graph.fit_to_view();
            }
            if ui
                .button("Reset layout")
                .on_hover_text("Reheat the simulation so the layout settles again.")
                .clicked()
            {
                self.graph.reset_layout();
            }

            let mut live = self.graph.live_physics();
            if ui
                .checkbox(&mut live, "Live physics")
                .on_hover_text("Pause or resume the force simulation.")
                .changed()
            {
                self.graph.set_live_physics(live);
            }

            ui.separator();

            let search_response = ui.add(
                egui::TextEdit::singleline(&mut self.search)
                    .hint_text("Search entities")
                    .desired_width(220.0),
            );
            if search_response.changed() {
                self.graph.set_search(&self.search);
            }
            if !self.search.trim().is_empty() && self.graph.selected().is_some() {
                ui.small("clear the selection to highlight matches");
            }

            if let Some(from) = &self.connecting_from {
                ui.separator();
                ui.label(
                    RichText::new(format!(
                        "Connecting from {}: click another entity (Esc to cancel)",
                        self.entity_title(from)
                    ))
                    .color(Color32::from_rgb(245, 206, 93)),
                );
            }
        });
    }
}
