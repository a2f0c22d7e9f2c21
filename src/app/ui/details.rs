use eframe::egui::{self, Color32, RichText, Ui};

use crate::domain::{category_color, tag_color};

use super::super::ViewModel;
use super::panels::category_title;

enum DetailsAction {
    Select(String),
    ClearSelection,
    StartConnecting,
    CancelConnecting,
    DismissRequest,
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Details");
        ui.add_space(6.0);

        let mut action = None;

        if let Some((from, to)) = &self.pending_connection {
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.label(RichText::new("Connection requested").strong());
                ui.label(format!(
                    "{} → {}",
                    self.entity_title(from),
                    self.entity_title(to)
                ));
                if ui.small_button("Dismiss").clicked() {
                    action = Some(DetailsAction::DismissRequest);
                }
            });
            ui.add_space(6.0);
        }

        let selected = self.graph.selected().map(str::to_owned);
        match selected.as_deref().and_then(|id| self.snapshot.entity(id)) {
            None => {
                ui.label("Click a node to see its connections.");
            }
            Some(entity) => {
                let badge = if entity.category.is_empty() {
                    "Unknown".to_owned()
                } else {
                    category_title(&entity.category)
                };
                ui.label(
                    RichText::new(badge)
                        .small()
                        .color(Color32::WHITE)
                        .background_color(category_color(&entity.category)),
                );
                ui.label(RichText::new(entity.title.as_str()).strong().size(17.0));
                ui.small(entity.id.as_str());
                ui.add_space(6.0);

                if !entity.tags.is_empty() {
                    ui.label(RichText::new("Tags").small().weak());
                    ui.horizontal_wrapped(|ui| {
                        for tag in &entity.tags {
                            let color = tag_color(&tag.color);
                            ui.label(
                                RichText::new(tag.name.as_str())
                                    .small()
                                    .color(color)
                                    .background_color(color.gamma_multiply(0.15)),
                            );
                        }
                    });
                    ui.add_space(6.0);
                }

                ui.horizontal(|ui| {
                    if self.connecting_from.is_some() {
                        if ui.button("Cancel connect").clicked() {
                            action = Some(DetailsAction::CancelConnecting);
                        }
                    } else if ui
                        .button("Connect…")
                        .on_hover_text("Click another entity to request a connection.")
                        .clicked()
                    {
                        action = Some(DetailsAction::StartConnecting);
                    }
                    if ui.button("Clear selection").clicked() {
                        action = Some(DetailsAction::ClearSelection);
                    }
                });

                ui.separator();
                let connections = self.snapshot.connections_of(&entity.id);
                ui.label(RichText::new(format!("Connections ({})", connections.len())).strong());
                if connections.is_empty() {
                    ui.label("No relationships or links yet.");
                }

                egui::ScrollArea::vertical()
                    .id_salt("connections_scroll")
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        for connection in &connections {
                            let arrow = if connection.outgoing { "→" } else { "←" };
                            let label = if connection.label.is_empty() {
                                "link"
                            } else {
                                connection.label.as_str()
                            };
                            ui.horizontal(|ui| {
                                ui.label(arrow);
                                let text = RichText::new(label);
                                ui.label(if connection.is_link { text.italics() } else { text });
                                let other = self.entity_title(&connection.other_id);
                                let known = self.snapshot.entity(&connection.other_id).is_some();
                                if ui.link(other).clicked() && known {
                                    action =
                                        Some(DetailsAction::Select(connection.other_id.clone()));
                                }
                            });
                        }
                    });
            }
        }

        match action {
            Some(DetailsAction::Select(id)) => self.select(Some(id)),
            Some(DetailsAction::ClearSelection) => {
                self.cancel_connecting();
                self.select(None);
            }
            Some(DetailsAction::StartConnecting) => self.start_connecting(),
            Some(DetailsAction::CancelConnecting) => self.cancel_connecting(),
            Some(DetailsAction::DismissRequest) => self.pending_connection = None,
            None => {}
        }
    }
}
