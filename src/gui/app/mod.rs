use std::time::Instant;

use eframe::egui::{
    self,
    RichText,
};

use crate::{
    backend::BackendClient,
    core::{
        tasks::{
            TaskManager,
            TaskResult,
        },
        Session,
    },
    engine::{
        DecisionCoordinator,
        EngineCommand,
        EngineError,
        GestureClassifier,
        RefillTrigger,
    },
    gui::{
        card_stack::CardStack,
        error_modal::{
            ErrorAction,
            ErrorModal,
        },
        matches_panel::MatchesPanel,
        message_overlay::MessageOverlay,
        settings::{
            SettingsData,
            SettingsModal,
        },
        theme::{
            set_theme,
            Theme,
        },
        top_bar::{
            TopBar,
            TopBarAction,
        },
    },
    persistence::{
        get_app_data_dir,
        load_json_or_default,
        save_json,
    },
};

const CONNECTION_CHECK_SECS: u64 = 5;

/// Which failure the open error dialog belongs to, so Retry/Dismiss land in
/// the right place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorSource {
    Engine,
    InitialLoad,
}

pub struct TandemApp {
    // Configuration
    settings_data: SettingsData,
    session: Option<Session>,

    // The decision engine; exists once the deck has loaded.
    engine: Option<DecisionCoordinator>,

    // UI State
    theme: Theme,
    card_stack: CardStack,
    message_overlay: MessageOverlay,
    error_modal: ErrorModal,
    settings_modal: SettingsModal,
    matches_panel: MatchesPanel,
    error_source: Option<ErrorSource>,

    // External services
    task_manager: TaskManager,
    backend_connected: bool,
    last_connection_check: Option<Instant>,
}

impl TandemApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let task_manager = TaskManager::new();
        let settings_data = load_json_or_default::<SettingsData>("settings.json");
        let session = Session::load();

        let theme = Theme::ember();
        set_theme(&cc.egui_ctx, theme.clone());
        cc.egui_ctx.set_theme(if settings_data.dark_mode {
            egui::Theme::Dark
        } else {
            egui::Theme::Light
        });
        cc.egui_ctx.options_mut(|o| {
            o.theme_preference = if settings_data.dark_mode {
                egui::ThemePreference::Dark
            } else {
                egui::ThemePreference::Light
            };
        });

        let mut app = Self {
            settings_data,
            session,
            engine: None,
            theme,
            card_stack: CardStack::default(),
            message_overlay: MessageOverlay::new(),
            error_modal: ErrorModal::new(),
            settings_modal: SettingsModal::default(),
            matches_panel: MatchesPanel::default(),
            error_source: None,
            task_manager,
            backend_connected: false,
            last_connection_check: None,
        };

        match &app.session {
            Some(session) => {
                let actor_id = session.actor_id;
                app.task_manager.load_initial(app.backend(), actor_id);
            }
            None => app.message_overlay.clear_message(),
        }

        app
    }

    fn backend(&self) -> BackendClient {
        let token = self.session.as_ref().map(|s| s.auth_token.clone()).unwrap_or_default();
        BackendClient::new(self.settings_data.backend_url.clone(), token)
    }

    fn dispatch_command(&self, command: EngineCommand) {
        match command {
            EngineCommand::SubmitDecision { actor_id, card_id, response } => {
                self.task_manager.submit_decision(self.backend(), actor_id, card_id, response);
            }
            EngineCommand::RequestRefill { exclude } => {
                self.task_manager.fetch_refill(self.backend(), exclude);
            }
        }
    }

    fn start_initial_load(&mut self) {
        if let Some(session) = &self.session {
            self.message_overlay.set_message("Loading your deck...".to_string());
            self.task_manager.load_initial(self.backend(), session.actor_id);
        }
    }

    fn refresh_matches(&mut self) {
        if let Some(session) = &self.session {
            self.matches_panel.set_loading();
            self.task_manager.fetch_matches(self.backend(), session.actor_id);
        }
    }

    fn sign_out(&mut self) {
        Session::clear();
        self.session = None;
        self.engine = None;
        self.matches_panel = MatchesPanel::default();
        self.error_source = None;
        self.message_overlay.clear_message();
    }

    fn save_settings(&self) {
        if let Err(e) = save_json(&self.settings_data, "settings.json") {
            log::error!("Failed to save settings: {}", e);
        }
    }

    fn handle_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::Connection(connected) => {
                self.backend_connected = connected;
            }

            TaskResult::InitialLoad(Ok((catalog, decided))) => {
                self.message_overlay.clear_message();
                if let Some(session) = &self.session {
                    log::info!(
                        "Deck loaded: {} cards, {} already decided",
                        catalog.len(),
                        decided.len()
                    );
                    self.engine = Some(DecisionCoordinator::new(
                        session.actor_id,
                        GestureClassifier::default(),
                        RefillTrigger::new(self.settings_data.refill_batch_size),
                        catalog,
                        decided,
                    ));
                }
            }

            TaskResult::InitialLoad(Err(e)) => {
                self.message_overlay.clear_message();
                self.error_source = Some(ErrorSource::InitialLoad);
                self.error_modal.show_error(
                    "Connection problem",
                    "Couldn't load your deck.",
                    Some(e.as_str()),
                    true,
                );
            }

            TaskResult::DecisionSaved { card_id, result } => {
                let follow_up =
                    self.engine.as_mut().and_then(|engine| engine.on_submit_result(card_id, result));
                if let Some(command) = follow_up {
                    self.dispatch_command(command);
                }
            }

            TaskResult::RefillLoaded(result) => {
                if let Some(engine) = &mut self.engine {
                    engine.on_refill(result);
                }
            }

            TaskResult::MatchesLoaded(Ok(cards)) => {
                self.matches_panel.set_matches(cards);
            }

            TaskResult::MatchesLoaded(Err(e)) => {
                log::warn!("Failed to load matches: {}", e);
                self.matches_panel.set_failed();
            }

            TaskResult::LoadingMessage(message) => {
                self.message_overlay.set_message(message);
            }
        }
    }

    /// Surfaces the engine's error slot through the modal, once per error.
    fn sync_engine_error(&mut self) {
        if self.error_modal.is_open() || self.error_source.is_some() {
            return;
        }
        let Some(engine) = &self.engine else {
            return;
        };
        let Some(error) = engine.last_error() else {
            return;
        };

        let title = match error {
            EngineError::SaveFailed { .. } => "Save failed",
            EngineError::CardGone { .. } => "Card removed",
            EngineError::SessionExpired => "Signed out",
        };
        let retryable = error.is_retryable();
        let message = error.to_string();
        self.error_source = Some(ErrorSource::Engine);
        self.error_modal.show_error(title, message, None::<String>, retryable);
    }

    fn update_connection_status(&mut self) {
        let now = Instant::now();
        let should_check = match self.last_connection_check {
            None => true,
            Some(last_check) => now.duration_since(last_check).as_secs() >= CONNECTION_CHECK_SECS,
        };

        if should_check {
            self.task_manager.check_connection(self.backend());
            self.last_connection_check = Some(now);
        }
    }

    fn sync_theme_preference(&mut self, ctx: &egui::Context) {
        let dark_mode = ctx.style().visuals.dark_mode;
        if dark_mode != self.settings_data.dark_mode {
            self.settings_data.dark_mode = dark_mode;
            self.save_settings();
        }
    }

    fn show_placeholder(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(ui.available_height() * 0.35);
            ui.vertical_centered(|ui| {
                if self.session.is_none() {
                    ui.label(RichText::new("Welcome to Tandem").size(24.0).strong());
                    ui.add_space(8.0);
                    ui.label("Link this device from the mobile app, then drop the");
                    ui.label("exported session.json into the app data folder:");
                    ui.add_space(4.0);
                    ui.label(
                        RichText::new(get_app_data_dir().display().to_string()).monospace(),
                    );
                    ui.add_space(12.0);
                    if ui.button("Reload session").clicked() {
                        self.session = Session::load();
                        if self.session.is_some() {
                            self.start_initial_load();
                        }
                    }
                } else if ui.button("Retry loading your deck").clicked() {
                    self.start_initial_load();
                }
            });
        });
    }
}

impl eframe::App for TandemApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        for result in self.task_manager.poll_results() {
            self.handle_task_result(result);
        }

        self.update_connection_status();
        self.sync_theme_preference(ctx);

        if let Some(action) = TopBar::show(
            ctx,
            &mut self.settings_modal,
            &self.settings_data,
            self.session.is_some(),
            self.backend_connected,
            self.matches_panel.open,
        ) {
            match action {
                TopBarAction::SignOut => self.sign_out(),
                TopBarAction::ToggleMatches => {
                    self.matches_panel.open = !self.matches_panel.open;
                    if self.matches_panel.open {
                        self.refresh_matches();
                    }
                }
            }
        }

        if self.matches_panel.show(ctx, &self.theme) {
            self.refresh_matches();
        }

        let mut commands = Vec::new();
        match self.engine.as_mut() {
            Some(engine) => {
                commands = self.card_stack.show(ctx, engine, &self.theme);
            }
            None => self.show_placeholder(ctx),
        }
        for command in commands {
            self.dispatch_command(command);
        }

        if let Some(settings) = self.settings_modal.show(ctx) {
            let backend_changed = settings.backend_url != self.settings_data.backend_url;
            let batch_changed =
                settings.refill_batch_size != self.settings_data.refill_batch_size;
            self.settings_data = settings;
            self.save_settings();

            if batch_changed {
                if let Some(engine) = &mut self.engine {
                    engine
                        .set_refill_policy(RefillTrigger::new(self.settings_data.refill_batch_size));
                }
            }
            if backend_changed && self.session.is_some() {
                self.engine = None;
                self.start_initial_load();
            }
        }

        if let Some(action) = self.error_modal.show(ctx) {
            let source = self.error_source.take();
            match (action, source) {
                (ErrorAction::Retry, Some(ErrorSource::InitialLoad)) => self.start_initial_load(),
                (ErrorAction::Retry, Some(ErrorSource::Engine)) => {
                    let command = self.engine.as_mut().and_then(|engine| engine.retry_failed());
                    if let Some(command) = command {
                        self.dispatch_command(command);
                    }
                }
                (ErrorAction::Dismissed, Some(ErrorSource::Engine)) => {
                    if let Some(engine) = &mut self.engine {
                        engine.clear_error();
                    }
                }
                _ => {}
            }
        }
        self.sync_engine_error();

        self.message_overlay.show(ctx, &self.theme);
    }
}
