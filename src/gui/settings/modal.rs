use eframe::egui;

use super::data::SettingsData;

/// Edits a working copy of the settings; the caller receives the copy only
/// when the user saves.
#[derive(Default)]
pub struct SettingsModal {
    open: bool,
    working: SettingsData,
}

impl SettingsModal {
    pub fn open_settings(&mut self, current: SettingsData) {
        self.working = current;
        self.open = true;
    }

    pub fn show(&mut self, ctx: &egui::Context) -> Option<SettingsData> {
        if !self.open {
            return None;
        }

        let mut saved = None;

        let modal = egui::Modal::new(egui::Id::new("settings_modal")).show(ctx, |ui| {
            ui.set_width(380.0);
            ui.heading("Settings");
            ui.add_space(10.0);

            egui::Grid::new("settings_grid").num_columns(2).spacing([12.0, 8.0]).show(ui, |ui| {
                ui.label("Backend URL");
                ui.add(
                    egui::TextEdit::singleline(&mut self.working.backend_url)
                        .desired_width(220.0),
                );
                ui.end_row();

                ui.label("Refill every");
                ui.horizontal(|ui| {
                    ui.add(egui::Slider::new(&mut self.working.refill_batch_size, 1..=20));
                    ui.label("decisions");
                });
                ui.end_row();
            });

            ui.add_space(15.0);

            ui.horizontal(|ui| {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Save").clicked() {
                        saved = Some(self.working.clone());
                        ui.close();
                    }
                    if ui.button("Cancel").clicked() {
                        ui.close();
                    }
                });
            });
        });

        if modal.should_close() {
            self.open = false;
        }

        saved
    }
}
