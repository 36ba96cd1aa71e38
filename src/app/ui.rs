use super::state::{SurfaceState, TrackingState};
use super::CsvUploaderApp;
use crate::surface::{ResultPanel, Tone};
use crate::upload::SelectedFile;
use crate::utils::color::{badge_color, palette, ERROR, MUTED, SUCCESS, WARNING};
use crate::utils::file_size::FileSizeUtils;
use eframe::egui::{self, Align, RichText};

impl CsvUploaderApp {
    pub fn render(&mut self, ctx: &egui::Context, state: &SurfaceState) {
        let hovering = ctx.input(|i| !i.raw.hovered_files.is_empty());

        egui::CentralPanel::default().show(ctx, |ui| {
            let footer_height = 30.0;
            let content_height = ui.available_height() - footer_height;

            egui::ScrollArea::vertical()
                .max_height(content_height)
                .show(ui, |ui| {
                    ui.add_space(20.0);
                    ui.vertical_centered(|ui| {
                        ui.heading("Subir CSV");
                        ui.add_space(5.0);
                        ui.label(
                            RichText::new("Valida tu archivo, súbelo y sigue su procesamiento")
                                .color(ui.visuals().text_color().gamma_multiply(0.7)),
                        );
                    });

                    ui.add_space(20.0);
                    self.render_picker(ui, hovering, state.selection.as_ref());

                    ui.add_space(10.0);
                    ui.vertical_centered(|ui| {
                        let button =
                            egui::Button::new("📤 Subir").min_size(egui::vec2(200.0, 40.0));
                        if ui.add(button).clicked() {
                            self.submit();
                        }
                    });

                    ui.add_space(10.0);
                    if !state.status_line.is_empty() {
                        let text = RichText::new(&state.status_line);
                        match state.status_tone {
                            Tone::Info => ui.label(text),
                            Tone::Error => ui.colored_label(palette(ERROR), text),
                        };
                    }

                    if let Some(panel) = &state.result {
                        ui.add_space(10.0);
                        self.render_result(ui, panel);
                    }

                    if let Some(tracking) = &state.tracking {
                        ui.add_space(20.0);
                        self.render_tracking(ui, tracking);
                    }

                    ui.add_space(20.0);
                    self.render_manual_check(ui);
                    ui.add_space(20.0);
                });

            ui.with_layout(egui::Layout::bottom_up(Align::Center), |ui| {
                ui.add_space(5.0);
                ui.label(
                    RichText::new(format!("Servidor: {}", self.config.base_url))
                        .small()
                        .color(palette(MUTED)),
                );
            });
        });
    }

    fn render_picker(&mut self, ui: &mut egui::Ui, hovering: bool, selection: Option<&SelectedFile>) {
        let frame = egui::Frame::group(ui.style());
        let frame = if hovering {
            frame.stroke(egui::Stroke::new(2.0, palette(SUCCESS)))
        } else {
            frame
        };

        frame.show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                if ui.button("📁 Seleccionar archivo").clicked() {
                    self.pick_file();
                }
                ui.label("o arrastra un archivo .csv a esta ventana");
            });

            if let Some(file) = selection {
                ui.add_space(5.0);
                ui.label(
                    RichText::new(format!(
                        "📄 {} ({})",
                        file.name,
                        FileSizeUtils::format_size(file.size)
                    ))
                    .color(palette(MUTED)),
                );
            }
        });
    }

    fn render_result(&mut self, ui: &mut egui::Ui, panel: &ResultPanel) {
        ui.group(|ui| {
            ui.set_width(ui.available_width());
            let details = match panel {
                ResultPanel::Success {
                    filename,
                    saved_to,
                    validation,
                    warning,
                } => {
                    ui.colored_label(palette(SUCCESS), format!("✅ Subida correcta: {}", filename));
                    if let Some(saved_to) = saved_to {
                        ui.label(format!("Guardado en: {}", saved_to));
                    }
                    if let Some(warning) = warning {
                        ui.colored_label(palette(WARNING), warning.as_str());
                    }
                    validation.as_ref()
                }
                ResultPanel::Error { message, details } => {
                    ui.colored_label(palette(ERROR), format!("❌ Error: {}", message));
                    details.as_ref()
                }
            };

            if let Some(details) = details {
                if ui
                    .button(if self.show_details {
                        "Ocultar detalles"
                    } else {
                        "Ver detalles"
                    })
                    .clicked()
                {
                    self.show_details = !self.show_details;
                }

                if self.show_details {
                    egui::ScrollArea::vertical()
                        .id_source("result_details")
                        .max_height(200.0)
                        .show(ui, |ui| {
                            egui::Frame::none()
                                .fill(ui.style().visuals.extreme_bg_color)
                                .show(ui, |ui| {
                                    ui.label(RichText::new(details).monospace());
                                });
                        });
                }
            }
        });
    }

    fn render_tracking(&mut self, ui: &mut egui::Ui, tracking: &TrackingState) {
        ui.group(|ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(format!("Trabajo: {}", tracking.work_id));
                if let Some(badge) = &tracking.badge {
                    ui.label(
                        RichText::new(format!(" {} ", badge.label()))
                            .strong()
                            .color(egui::Color32::WHITE)
                            .background_color(badge_color(badge)),
                    );
                }
            });

            ui.add_space(5.0);
            ui.label(tracking.message.as_str());

            if let Some(error) = &tracking.error {
                ui.add_space(5.0);
                ui.colored_label(palette(ERROR), error.as_str());
            }

            if let Some(url) = &tracking.download_url {
                ui.add_space(5.0);
                ui.horizontal(|ui| {
                    if ui.button("⬇ Descargar resultado").clicked() {
                        self.open_download(url);
                    }
                    ui.label(RichText::new(url).small().color(palette(MUTED)));
                });
            }

            ui.add_space(5.0);
            if ui.button("Dejar de seguir").clicked() {
                self.stop_tracking();
            }
        });
    }

    fn render_manual_check(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.label("¿Ya tienes un work_id? Consulta su estado:");
            ui.horizontal(|ui| {
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.work_id_input)
                        .hint_text("work_id")
                        .desired_width(250.0),
                );
                let submitted =
                    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if ui.button("🔎 Consultar").clicked() || submitted {
                    self.track_manual();
                }
            });
        });
    }
}
