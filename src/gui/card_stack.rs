use eframe::egui::{
    self,
    Align2,
    FontId,
    Rect,
    RichText,
    Sense,
    Stroke,
    StrokeKind,
    Vec2,
};

use crate::{
    core::Card,
    engine::{
        DecisionCoordinator,
        EngineCommand,
        GestureSample,
        ReleaseVelocity,
        SwipeOutcome,
    },
    gui::theme::{
        blend_colors,
        Theme,
    },
};

const CARD_SIZE: Vec2 = Vec2::new(300.0, 420.0);
const CUE_FLASH_SECS: f32 = 0.25;
const MIN_EXIT_SPEED: f32 = 1100.0;

struct ExitAnim {
    card: Card,
    outcome: SwipeOutcome,
    velocity: Vec2,
    offset: Vec2,
}

/// The swipe screen. Owns only presentation state (drag offset, cue flash,
/// exit animation); every decision goes through the engine, and the commands
/// it returns are handed back to the caller for dispatch.
#[derive(Default)]
pub struct CardStack {
    drag_offset: Vec2,
    dragging: bool,
    cue_flash: f32,
    exit: Option<ExitAnim>,
}

impl CardStack {
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        engine: &mut DecisionCoordinator,
        theme: &Theme,
    ) -> Vec<EngineCommand> {
        let mut commands = Vec::new();
        let dt = ctx.input(|i| i.stable_dt).min(0.1);

        self.footer(ctx, engine, theme);

        egui::CentralPanel::default().show(ctx, |ui| {
            let base_rect = Rect::from_center_size(ui.max_rect().center(), CARD_SIZE);

            if let Some(card) = engine.current_card().cloned() {
                commands = self.active_card(ui, ctx, engine, theme, base_rect, card, dt);
            } else if self.exit.is_none() {
                Self::caught_up(ui, theme);
            }

            self.exit_animation(ui, ctx, engine, theme, base_rect, dt);
        });

        commands
    }

    fn active_card(
        &mut self,
        ui: &mut egui::Ui,
        ctx: &egui::Context,
        engine: &mut DecisionCoordinator,
        theme: &Theme,
        base_rect: Rect,
        card: Card,
        dt: f32,
    ) -> Vec<EngineCommand> {
        let mut commands = Vec::new();
        let rect = base_rect.translate(self.drag_offset);
        let response = ui.interact(rect, egui::Id::new(card.id), Sense::drag());

        if response.drag_started() {
            self.dragging = true;
            self.drag_offset = Vec2::ZERO;
            engine.on_gesture_start();
        }

        if response.dragged() {
            self.drag_offset += response.drag_delta();
            let sample = GestureSample::new(self.drag_offset.x, self.drag_offset.y);
            if engine.on_gesture_update(sample) {
                self.cue_flash = CUE_FLASH_SECS;
            }
        }

        if response.drag_stopped() {
            self.dragging = false;
            let pointer_velocity = ctx.input(|i| i.pointer.velocity());
            let resolution = engine.on_gesture_end(
                GestureSample::new(self.drag_offset.x, self.drag_offset.y),
                ReleaseVelocity { vx: pointer_velocity.x, vy: pointer_velocity.y },
            );
            commands = resolution.commands;

            if let Some(decided) = resolution.card {
                self.exit = Some(ExitAnim {
                    card: decided,
                    outcome: resolution.outcome,
                    velocity: exit_velocity(resolution.outcome, resolution.velocity),
                    offset: self.drag_offset,
                });
                self.drag_offset = Vec2::ZERO;
                self.cue_flash = 0.0;
                // The next card is painted next frame; the exit animation
                // covers this one.
                return commands;
            }
        }

        if !self.dragging && self.drag_offset != Vec2::ZERO {
            // Snap back toward the resting position after a cancel.
            self.drag_offset = self.drag_offset * (-dt * 14.0).exp();
            if self.drag_offset.length() < 0.5 {
                self.drag_offset = Vec2::ZERO;
            }
            ctx.request_repaint();
        }

        if self.cue_flash > 0.0 {
            self.cue_flash = (self.cue_flash - dt).max(0.0);
            ctx.request_repaint();
        }

        let rect = base_rect.translate(self.drag_offset);
        self.paint_card(ui, engine, theme, rect, &card);
        commands
    }

    fn paint_card(
        &self,
        ui: &mut egui::Ui,
        engine: &DecisionCoordinator,
        theme: &Theme,
        rect: Rect,
        card: &Card,
    ) {
        let offset = self.drag_offset;
        let progress_x =
            (offset.x.abs() / engine.classifier().threshold_x()).clamp(0.0, 1.0);
        let progress_y =
            ((-offset.y).max(0.0) / engine.classifier().threshold_y()).clamp(0.0, 1.0);
        let (hint_color, stamp, progress) = if progress_x >= progress_y {
            if offset.x >= 0.0 {
                (theme.affirm(), "YES", progress_x)
            } else {
                (theme.reject(), "NO", progress_x)
            }
        } else {
            (theme.defer(), "LATER", progress_y)
        };

        let fill = ui.visuals().widgets.inactive.bg_fill;
        let neutral = ui.visuals().widgets.noninteractive.bg_stroke.color;
        let border = blend_colors(neutral, hint_color, progress);

        let painter = ui.painter();
        painter.rect_filled(rect, 16.0, fill);
        painter.rect_stroke(rect, 16.0, Stroke::new(2.0, border), StrokeKind::Inside);

        if self.cue_flash > 0.0 {
            let glow = theme.accent().gamma_multiply(self.cue_flash / CUE_FLASH_SECS);
            painter.rect_stroke(
                rect.expand(4.0),
                20.0,
                Stroke::new(3.0, glow),
                StrokeKind::Outside,
            );
        }

        if progress > 0.05 {
            painter.text(
                rect.left_top() + Vec2::new(24.0, 34.0),
                Align2::LEFT_CENTER,
                stamp,
                FontId::proportional(28.0),
                hint_color.gamma_multiply(progress.max(0.35)),
            );
        }

        // Visible after an undo: the stored answer this swipe would replace.
        if let Some(previous) = engine.local_decision(card.id) {
            painter.text(
                rect.right_top() + Vec2::new(-24.0, 34.0),
                Align2::RIGHT_CENTER,
                format!("Earlier: {}", previous.label()),
                FontId::proportional(13.0),
                theme.muted(),
            );
        }

        let content = rect.shrink(22.0);
        let mut content_ui = ui.new_child(
            egui::UiBuilder::new()
                .max_rect(content)
                .layout(egui::Layout::top_down(egui::Align::Min)),
        );

        content_ui.add_space(40.0);
        content_ui.label(RichText::new(&card.title).size(22.0).strong());
        content_ui.add_space(6.0);
        content_ui.label(
            RichText::new("♥".repeat(card.intensity.max(1) as usize)).color(theme.accent()),
        );
        if let Some(category) = &card.category {
            content_ui.label(RichText::new(category).color(theme.category()).small());
        }
        if !card.tags.is_empty() {
            content_ui.label(RichText::new(card.tags.join(" · ")).color(theme.muted()).small());
        }
        if let Some(description) = &card.description {
            content_ui.add_space(10.0);
            content_ui.label(RichText::new(description));
        }
    }

    fn exit_animation(
        &mut self,
        ui: &mut egui::Ui,
        ctx: &egui::Context,
        engine: &DecisionCoordinator,
        theme: &Theme,
        base_rect: Rect,
        dt: f32,
    ) {
        let mut finished = false;

        if let Some(exit) = &mut self.exit {
            exit.offset += exit.velocity * dt;
            let rect = base_rect.translate(exit.offset);

            if !ui.clip_rect().intersects(rect) {
                finished = true;
            } else {
                let fade = (1.0 - exit.offset.length() / 900.0).clamp(0.0, 1.0);
                let color = match exit.outcome {
                    SwipeOutcome::Affirm => theme.affirm(),
                    SwipeOutcome::Reject => theme.reject(),
                    SwipeOutcome::Defer => theme.defer(),
                    SwipeOutcome::Cancel => theme.muted(),
                };

                let fill = ui.visuals().widgets.inactive.bg_fill;
                let text_color = ui.visuals().text_color();
                let painter = ui.painter();
                painter.rect_filled(rect, 16.0, fill.gamma_multiply(fade));
                painter.rect_stroke(
                    rect,
                    16.0,
                    Stroke::new(2.0, color.gamma_multiply(fade)),
                    StrokeKind::Inside,
                );
                if let Some(response) = exit.outcome.response() {
                    painter.text(
                        rect.left_top() + Vec2::new(24.0, 34.0),
                        Align2::LEFT_CENTER,
                        response.label().to_uppercase(),
                        FontId::proportional(28.0),
                        color.gamma_multiply(fade),
                    );
                }
                painter.text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    &exit.card.title,
                    FontId::proportional(20.0),
                    text_color.gamma_multiply(fade),
                );
                if engine.is_saving(exit.card.id) {
                    painter.text(
                        rect.center() + Vec2::new(0.0, 30.0),
                        Align2::CENTER_CENTER,
                        "Saving...",
                        FontId::proportional(13.0),
                        theme.muted().gamma_multiply(fade),
                    );
                }
            }

            ctx.request_repaint();
        }

        if finished {
            self.exit = None;
        }
    }

    fn footer(&mut self, ctx: &egui::Context, engine: &mut DecisionCoordinator, theme: &Theme) {
        egui::TopBottomPanel::bottom("card_footer").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                let undo = ui.add_enabled(engine.can_undo(), egui::Button::new("⟲ Undo"));
                if undo.clicked() && engine.request_undo() {
                    self.drag_offset = Vec2::ZERO;
                    self.exit = None;
                }

                ui.label(
                    RichText::new(format!(
                        "{} left · {} decided",
                        engine.remaining(),
                        engine.session_decision_count()
                    ))
                    .color(theme.muted()),
                );

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if engine.pending_submissions() > 0 {
                        ui.label(RichText::new("Saving...").color(theme.muted()));
                        ui.add(egui::Spinner::new());
                    }
                });
            });
            ui.vertical_centered(|ui| {
                ui.label(
                    RichText::new("swipe right for yes · left for no · up for later")
                        .color(theme.muted())
                        .small(),
                );
            });
            ui.add_space(2.0);
        });
    }

    fn caught_up(ui: &mut egui::Ui, theme: &Theme) {
        ui.add_space(ui.available_height() * 0.4);
        ui.vertical_centered(|ui| {
            ui.label(RichText::new("All caught up").size(24.0).strong());
            ui.add_space(4.0);
            ui.label(
                RichText::new("New cards will appear here as your deck refreshes.")
                    .color(theme.muted()),
            );
        });
    }
}

fn exit_velocity(outcome: SwipeOutcome, release: ReleaseVelocity) -> Vec2 {
    let released = Vec2::new(release.vx, release.vy);
    if released.length() >= MIN_EXIT_SPEED {
        return released;
    }
    let direction = match outcome {
        SwipeOutcome::Affirm => Vec2::new(1.0, -0.15),
        SwipeOutcome::Reject => Vec2::new(-1.0, -0.15),
        SwipeOutcome::Defer | SwipeOutcome::Cancel => Vec2::new(0.0, -1.0),
    };
    direction.normalized() * MIN_EXIT_SPEED
}
