use eframe::egui;
use egui_extras::{
    Column,
    TableBuilder,
};

use crate::{
    core::Card,
    gui::theme::Theme,
};

/// Side panel listing the cards both partners said yes to. Read-only;
/// refreshed on demand.
#[derive(Default)]
pub struct MatchesPanel {
    pub open: bool,
    matches: Vec<Card>,
    loading: bool,
    failed: bool,
}

impl MatchesPanel {
    pub fn set_loading(&mut self) {
        self.loading = true;
        self.failed = false;
    }

    pub fn set_matches(&mut self, cards: Vec<Card>) {
        self.matches = cards;
        self.loading = false;
        self.failed = false;
    }

    pub fn set_failed(&mut self) {
        self.loading = false;
        self.failed = true;
    }

    /// Returns true when the user asked for a refresh.
    pub fn show(&mut self, ctx: &egui::Context, theme: &Theme) -> bool {
        let mut refresh_requested = false;

        egui::SidePanel::right("matches_panel").resizable(false).default_width(240.0).show_animated(
            ctx,
            self.open,
            |ui| {
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    ui.label(theme.heading("Matches"));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if self.loading {
                            ui.add(egui::Spinner::new());
                        } else if ui.button("⟳").on_hover_text("Refresh").clicked() {
                            refresh_requested = true;
                        }
                    });
                });
                ui.separator();

                if self.failed {
                    ui.label(egui::RichText::new("Couldn't load matches.").color(theme.reject()));
                    return;
                }

                if self.matches.is_empty() && !self.loading {
                    ui.label(egui::RichText::new("No mutual matches yet.").color(theme.muted()));
                    return;
                }

                let text_height = egui::TextStyle::Body
                    .resolve(ui.style())
                    .size
                    .max(ui.spacing().interact_size.y);

                TableBuilder::new(ui)
                    .striped(true)
                    .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                    .column(Column::remainder())
                    .column(Column::auto().at_least(50.0))
                    .header(22.0, |mut header| {
                        header.col(|ui| {
                            ui.label(theme.heading("Card"));
                        });
                        header.col(|ui| {
                            ui.label(theme.heading("Heat"));
                        });
                    })
                    .body(|mut body| {
                        body.rows(text_height, self.matches.len(), |mut row| {
                            let card = &self.matches[row.index()];
                            row.col(|ui| {
                                let label = ui.label(theme.bold(&card.title));
                                if let Some(description) = &card.description {
                                    label.on_hover_text(description);
                                }
                            });
                            row.col(|ui| {
                                ui.label(
                                    egui::RichText::new(
                                        "♥".repeat(card.intensity.max(1) as usize),
                                    )
                                    .color(theme.accent()),
                                );
                            });
                        });
                    });
            },
        );

        refresh_requested
    }
}
