use eframe::egui;

#[derive(Default, Clone)]
pub struct ErrorData {
    pub title: String,
    pub message: String,
    pub details: Option<String>,
    pub retryable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorAction {
    Dismissed,
    Retry,
}

/// Dismissible error dialog. When the underlying failure is retryable the
/// dialog offers "Try Again" and reports which button closed it.
pub struct ErrorModal {
    open: bool,
    data: ErrorData,
    retry_clicked: bool,
}

impl ErrorModal {
    pub fn new() -> Self {
        Self { open: false, data: ErrorData::default(), retry_clicked: false }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn show_error(
        &mut self,
        title: impl Into<String>,
        message: impl Into<String>,
        details: Option<impl Into<String>>,
        retryable: bool,
    ) {
        self.data = ErrorData {
            title: title.into(),
            message: message.into(),
            details: details.map(|d| d.into()),
            retryable,
        };
        self.retry_clicked = false;
        self.open = true;
    }

    pub fn show(&mut self, ctx: &egui::Context) -> Option<ErrorAction> {
        if !self.open {
            return None;
        }

        let modal = egui::Modal::new(egui::Id::new("error_modal")).show(ctx, |ui| {
            ui.set_width(420.0);

            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("⚠").size(24.0).color(egui::Color32::RED));
                ui.label(
                    egui::RichText::new(&self.data.title)
                        .size(18.0)
                        .strong(),
                );
            });

            ui.add_space(10.0);

            ui.label(egui::RichText::new(&self.data.message).size(14.0));

            if let Some(details) = &self.data.details {
                ui.add_space(10.0);
                ui.collapsing("Technical Details", |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut details.as_str())
                            .desired_width(f32::INFINITY)
                            .desired_rows(4)
                            .code_editor(),
                    );
                });
            };

            ui.add_space(15.0);

            ui.horizontal(|ui| {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if self.data.retryable && ui.button("Try Again").clicked() {
                        self.retry_clicked = true;
                        ui.close();
                    }
                    if ui.button("Dismiss").clicked() {
                        ui.close();
                    }
                });
            });
        });

        if modal.should_close() {
            self.open = false;
            self.data = ErrorData::default();
            let action =
                if self.retry_clicked { ErrorAction::Retry } else { ErrorAction::Dismissed };
            self.retry_clicked = false;
            return Some(action);
        }

        None
    }
}

impl Default for ErrorModal {
    fn default() -> Self {
        Self::new()
    }
}
