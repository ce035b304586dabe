use eframe::egui::{
    self,
    containers,
};

use crate::gui::settings::{
    SettingsData,
    SettingsModal,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopBarAction {
    SignOut,
    ToggleMatches,
}

pub struct TopBar;

impl TopBar {
    pub fn show(
        ctx: &egui::Context,
        settings_modal: &mut SettingsModal,
        current_settings: &SettingsData,
        signed_in: bool,
        backend_connected: bool,
        matches_open: bool,
    ) -> Option<TopBarAction> {
        let mut action = None;

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            containers::menu::Bar::new().ui(ui, |ui| {
                egui::widgets::global_theme_preference_switch(ui);

                ui.menu_button("File", |ui| {
                    if ui.button("Settings").clicked() {
                        settings_modal.open_settings(current_settings.clone());
                    }
                    if signed_in && ui.button("Sign Out").clicked() {
                        action = Some(TopBarAction::SignOut);
                    }
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                let matches_label = if matches_open { "Hide Matches" } else { "Matches" };
                if ui.button(matches_label).clicked() {
                    action = Some(TopBarAction::ToggleMatches);
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    Self::show_status_indicator(ui, backend_connected);
                });
            });
        });

        action
    }

    fn show_status_indicator(ui: &mut egui::Ui, backend_connected: bool) {
        let color = if backend_connected {
            egui::Color32::from_rgb(0, 200, 0)
        } else {
            egui::Color32::from_rgb(200, 80, 80)
        };

        let tooltip = if backend_connected {
            "Connected to the Tandem backend"
        } else {
            "Not connected to the Tandem backend"
        };

        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 2.0;
            ui.small("backend").on_hover_text(tooltip);
            ui.small(egui::RichText::new("●").color(color)).on_hover_text(tooltip);
        });
    }
}
