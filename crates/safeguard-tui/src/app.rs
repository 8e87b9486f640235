//! Application state management for the SAFE.Guard terminal client.
//!
//! This module contains the core `App` struct that manages UI state, the
//! per-screen data and background task coordination. Authentication state
//! and the current route are owned by the core `NavigationGate`; the app only
//! reads them.
//!
//! Network calls run in spawned tasks and report back through an MPSC channel.
//! Each result is tagged with the gate epoch it was started under and the
//! screen that asked for it, and is dropped if either no longer matches.

use std::future::Future;
use std::path::PathBuf;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use safeguard_core::api::EditableResource;
use safeguard_core::models::{
    Alert, AlertFilter, Reading, Risk, RiskLevel, Sensor, Station, StationFilter,
};
use safeguard_core::{
    request_confirmation, ApiClient, ApiError, AuthError, AuthFlow, AuthState, Config,
    Credentials, NavigationGate, PendingConfirmation, PreferenceStore, Preferences, Route, Screen,
    UserDecision,
};

use crate::form::{EntityForm, LoginForm, Submission};
use crate::ui::styles::Theme;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

const SESSION_EXPIRED_NOTICE: &str = "Your session has expired. Please log in again.";

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    /// Typing into the current screen's filter
    Filtering,
    /// Create/edit form open
    Editing,
    /// Waiting for an answer to a `PendingConfirmation`
    Confirming,
    ShowingHelp,
    Quitting,
}

/// Actions that need the user's confirmation before running
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    Delete { screen: Screen, id: i64 },
    Logout,
    RestoreDefaults,
    Quit,
}

/// A loaded list plus its cursor
#[derive(Debug, Clone)]
pub struct ListView<T> {
    pub items: Vec<T>,
    pub selection: usize,
    pub loading: bool,
    /// At least one load has finished
    pub loaded: bool,
}

impl<T> Default for ListView<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            selection: 0,
            loading: false,
            loaded: false,
        }
    }
}

impl<T> ListView<T> {
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.loading = false;
        self.loaded = true;
        self.clamp(self.items.len());
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Keep the cursor inside a list of `len` visible rows
    pub fn clamp(&mut self, len: usize) {
        if self.selection >= len {
            self.selection = len.saturating_sub(1);
        }
    }

    pub fn move_by(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.selection = 0;
            return;
        }
        let max = len - 1;
        self.selection = if delta < 0 {
            self.selection.saturating_sub(delta.unsigned_abs())
        } else {
            (self.selection + delta as usize).min(max)
        };
    }
}

/// Sensors shown over the map for one station
#[derive(Debug, Clone)]
pub struct StationDetail {
    pub station: Station,
    pub sensors: ListView<Sensor>,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Data fetched for a screen
#[derive(Debug)]
pub enum Loaded {
    Alerts(Vec<Alert>),
    Sensors(Vec<Sensor>),
    Readings {
        readings: Vec<Reading>,
        sensors: Vec<Sensor>,
    },
    Risks(Vec<Risk>),
    Stations(Vec<Station>),
}

/// Results sent from spawned tasks back to the main loop.
#[derive(Debug)]
pub enum TaskResult {
    Bootstrapped(AuthState),
    LoginFinished(Result<AuthState, AuthError>),
    Loaded {
        epoch: u64,
        screen: Screen,
        result: Result<Loaded, ApiError>,
    },
    StationSensors {
        epoch: u64,
        station_id: i64,
        result: Result<Vec<Sensor>, ApiError>,
    },
    Mutated {
        epoch: u64,
        screen: Screen,
        verb: &'static str,
        result: Result<(), ApiError>,
    },
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    config_path: Option<PathBuf>,
    pub gate: NavigationGate,
    pub api: ApiClient,
    pub auth: AuthFlow,
    pub prefs_store: PreferenceStore,
    pub prefs: Preferences,

    // UI state
    pub state: AppState,
    pub login: LoginForm,
    pub form: Option<EntityForm>,
    pub pending: Option<PendingConfirmation<PendingAction>>,
    pub status_message: Option<String>,

    // Screen data
    pub alerts: ListView<Alert>,
    pub alert_filter: AlertFilter,
    pub sensors: ListView<Sensor>,
    pub readings: ListView<Reading>,
    pub reading_sensors: Vec<Sensor>,
    pub risks: ListView<Risk>,
    pub map: ListView<Station>,
    pub station_filter: StationFilter,
    pub station_detail: Option<StationDetail>,
    pub stations: ListView<Station>,

    // Background task channel
    task_rx: mpsc::Receiver<TaskResult>,
    task_tx: mpsc::Sender<TaskResult>,

    state_rx: watch::Receiver<AuthState>,
    last_state: AuthState,
    logging_out: bool,
}

impl App {
    /// `config_path` is where the last username is remembered; `None`
    /// disables writing the config.
    pub fn new(
        config: Config,
        config_path: Option<PathBuf>,
        api: ApiClient,
        prefs_store: PreferenceStore,
    ) -> Self {
        let gate = api.gate().clone();
        let state_rx = gate.subscribe();
        let last_state = gate.state();
        let (task_tx, task_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let prefs = prefs_store.load();
        let login = LoginForm::new(config.last_username.clone());

        Self {
            config,
            config_path,
            auth: AuthFlow::new(api.clone()),
            gate,
            api,
            prefs_store,
            prefs,

            state: AppState::Normal,
            login,
            form: None,
            pending: None,
            status_message: None,

            alerts: ListView::default(),
            alert_filter: AlertFilter::default(),
            sensors: ListView::default(),
            readings: ListView::default(),
            reading_sensors: Vec::new(),
            risks: ListView::default(),
            map: ListView::default(),
            station_filter: StationFilter::default(),
            station_detail: None,
            stations: ListView::default(),

            task_rx,
            task_tx,
            state_rx,
            last_state,
            logging_out: false,
        }
    }

    pub fn theme(&self) -> Theme {
        Theme::new(self.prefs.dark_mode)
    }

    pub fn route(&self) -> Route {
        self.gate.route()
    }

    pub fn current_screen(&self) -> Option<Screen> {
        self.route().screen()
    }

    fn spawn_task<F>(&self, task: F)
    where
        F: Future<Output = TaskResult> + Send + 'static,
    {
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = task.await;
            if let Err(e) = tx.send(result).await {
                error!(error = %e, "Failed to send task result - channel closed");
            }
        });
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Resolve the startup state in the background. The loading screen shows
    /// until it finishes.
    pub fn start_bootstrap(&self) {
        let gate = self.gate.clone();
        let api = self.api.clone();
        let policy = self.config.bootstrap;
        self.spawn_task(async move { TaskResult::Bootstrapped(gate.bootstrap(&api, policy).await) });
    }

    /// Submit the login form. Ignored while a previous attempt is running.
    pub fn submit_login(&mut self) {
        if self.login.submitting {
            return;
        }

        let credentials = Credentials::new(self.login.username.trim(), self.login.password.clone());
        if let Err(e) = credentials.validate() {
            self.login.error = Some(e.user_message());
            return;
        }

        self.login.error = None;
        self.login.notice = None;
        self.login.submitting = true;
        let auth = self.auth.clone();
        self.spawn_task(async move { TaskResult::LoginFinished(auth.login(&credentials).await) });
    }

    fn remember_username(&mut self) {
        let username = self.login.username.trim().to_string();
        if username.is_empty() || self.config.last_username.as_deref() == Some(username.as_str()) {
            return;
        }
        self.config.last_username = Some(username);
        if let Some(path) = &self.config_path {
            if let Err(e) = self.config.save_to(path) {
                warn!(error = %e, "Failed to save config");
            }
        }
    }

    fn on_auth_state_changed(&mut self, state: AuthState) {
        let previous = self.last_state;
        self.last_state = state;
        debug!(?previous, ?state, "App observed authentication change");

        self.clear_screen_data();
        self.form = None;
        self.pending = None;
        if self.state != AppState::Quitting {
            self.state = AppState::Normal;
        }

        match state {
            AuthState::Authenticated => {
                self.remember_username();
                self.login.clear_secret();
                self.login.notice = None;
                self.status_message = None;
                if let Some(screen) = self.current_screen() {
                    self.load_screen(screen);
                }
            }
            AuthState::Unauthenticated => {
                self.login.clear_secret();
                if previous == AuthState::Authenticated && !self.logging_out {
                    self.login.notice = Some(SESSION_EXPIRED_NOTICE.to_string());
                }
                self.logging_out = false;
                self.status_message = None;
            }
            AuthState::Unknown => {}
        }
    }

    fn clear_screen_data(&mut self) {
        self.alerts.clear();
        self.alert_filter = AlertFilter::default();
        self.sensors.clear();
        self.readings.clear();
        self.reading_sensors.clear();
        self.risks.clear();
        self.map.clear();
        self.station_filter = StationFilter::default();
        self.station_detail = None;
        self.stations.clear();
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn switch_screen(&mut self, screen: Screen) {
        if self.route() == Route::Tab(screen) {
            return;
        }
        if self.gate.navigate(screen) {
            self.station_detail = None;
            self.load_screen(screen);
        }
    }

    /// Pop one route. Returns false at the root.
    pub fn go_back(&mut self) -> bool {
        let popped = self.gate.back();
        if !matches!(self.route(), Route::StationDetail { .. }) {
            self.station_detail = None;
        }
        popped
    }

    pub fn refresh_current(&mut self) {
        match self.route() {
            Route::StationDetail { station_id } => self.load_station_sensors(station_id),
            Route::Tab(screen) => self.load_screen(screen),
            Route::Loading | Route::Login => {}
        }
    }

    fn list_loading(&mut self, screen: Screen) {
        match screen {
            Screen::Alerts => self.alerts.loading = true,
            Screen::Sensors => self.sensors.loading = true,
            Screen::Readings => self.readings.loading = true,
            Screen::Risks => self.risks.loading = true,
            Screen::Map => self.map.loading = true,
            Screen::Stations => self.stations.loading = true,
            Screen::Settings | Screen::Instructions => {}
        }
    }

    /// Fetch whatever `screen` shows
    pub fn load_screen(&mut self, screen: Screen) {
        if matches!(screen, Screen::Settings | Screen::Instructions) {
            self.prefs = self.prefs_store.load();
            return;
        }

        self.list_loading(screen);
        let epoch = self.gate.epoch();
        let api = self.api.clone();
        self.spawn_task(async move {
            let result = fetch_screen(&api, screen).await;
            TaskResult::Loaded { epoch, screen, result }
        });
    }

    /// Open the sensor list for the station under the map cursor
    pub fn open_station_detail(&mut self) {
        let Some(station) = self.visible_map_stations().get(self.map.selection).map(|s| (*s).clone())
        else {
            return;
        };
        let station_id = station.id;
        if self.gate.push(Route::StationDetail { station_id }) {
            self.station_detail = Some(StationDetail {
                station,
                sensors: ListView::default(),
            });
            self.load_station_sensors(station_id);
        }
    }

    fn load_station_sensors(&mut self, station_id: i64) {
        if let Some(detail) = self.station_detail.as_mut() {
            detail.sensors.loading = true;
        }
        let epoch = self.gate.epoch();
        let api = self.api.clone();
        self.spawn_task(async move {
            let result = api.station_sensors(station_id).await;
            TaskResult::StationSensors { epoch, station_id, result }
        });
    }

    // =========================================================================
    // Filtering and selection
    // =========================================================================

    pub fn visible_alerts(&self) -> Vec<&Alert> {
        self.alert_filter.apply(&self.alerts.items)
    }

    pub fn visible_map_stations(&self) -> Vec<&Station> {
        self.station_filter.apply(&self.map.items)
    }

    /// Whether the current screen has a text filter
    pub fn has_filter(&self) -> bool {
        matches!(self.route(), Route::Tab(Screen::Alerts) | Route::Tab(Screen::Map))
    }

    pub fn filter_text_mut(&mut self) -> Option<&mut String> {
        match self.route() {
            Route::Tab(Screen::Alerts) => Some(&mut self.alert_filter.text),
            Route::Tab(Screen::Map) => Some(&mut self.station_filter.text),
            _ => None,
        }
    }

    pub fn clear_filter(&mut self) {
        match self.route() {
            Route::Tab(Screen::Alerts) => self.alert_filter = AlertFilter::default(),
            Route::Tab(Screen::Map) => self.station_filter = StationFilter::default(),
            _ => {}
        }
        self.after_filter_change();
    }

    /// Step the alert level filter: all, Baixo .. Crítico, all
    pub fn cycle_alert_level_filter(&mut self) {
        self.alert_filter.level = RiskLevel::cycle(self.alert_filter.level);
        self.after_filter_change();
    }

    pub fn after_filter_change(&mut self) {
        let alerts = self.visible_alerts().len();
        let stations = self.visible_map_stations().len();
        self.alerts.clamp(alerts);
        self.map.clamp(stations);
    }

    /// Move the cursor on the current screen
    pub fn move_selection(&mut self, delta: isize) {
        match self.route() {
            Route::Tab(Screen::Alerts) => {
                let len = self.visible_alerts().len();
                self.alerts.move_by(delta, len);
            }
            Route::Tab(Screen::Sensors) => {
                let len = self.sensors.items.len();
                self.sensors.move_by(delta, len);
            }
            Route::Tab(Screen::Readings) => {
                let len = self.readings.items.len();
                self.readings.move_by(delta, len);
            }
            Route::Tab(Screen::Risks) => {
                let len = self.risks.items.len();
                self.risks.move_by(delta, len);
            }
            Route::Tab(Screen::Map) => {
                let len = self.visible_map_stations().len();
                self.map.move_by(delta, len);
            }
            Route::Tab(Screen::Stations) => {
                let len = self.stations.items.len();
                self.stations.move_by(delta, len);
            }
            Route::StationDetail { .. } => {
                if let Some(detail) = self.station_detail.as_mut() {
                    let len = detail.sensors.items.len();
                    detail.sensors.move_by(delta, len);
                }
            }
            _ => {}
        }
    }

    /// Id of the record under the cursor on an editable screen
    fn selected_id(&self, screen: Screen) -> Option<i64> {
        match screen {
            Screen::Alerts => self.visible_alerts().get(self.alerts.selection).map(|a| a.id),
            Screen::Sensors => self.sensors.items.get(self.sensors.selection).map(|s| s.id),
            Screen::Readings => self.readings.items.get(self.readings.selection).map(|r| r.id),
            Screen::Stations => self.stations.items.get(self.stations.selection).map(|s| s.id),
            _ => None,
        }
    }

    // =========================================================================
    // Forms
    // =========================================================================

    pub fn start_new(&mut self) {
        let Some(screen) = self.tab_screen() else {
            return;
        };
        if let Some(form) = EntityForm::blank(screen) {
            self.form = Some(form);
            self.state = AppState::Editing;
        }
    }

    pub fn start_edit(&mut self) {
        let form = match self.tab_screen() {
            Some(Screen::Alerts) => self
                .visible_alerts()
                .get(self.alerts.selection)
                .map(|a| EntityForm::edit_alert(a)),
            Some(Screen::Sensors) => self
                .sensors
                .items
                .get(self.sensors.selection)
                .map(EntityForm::edit_sensor),
            Some(Screen::Readings) => self
                .readings
                .items
                .get(self.readings.selection)
                .map(EntityForm::edit_reading),
            Some(Screen::Stations) => self
                .stations
                .items
                .get(self.stations.selection)
                .map(EntityForm::edit_station),
            _ => None,
        };
        if let Some(form) = form {
            self.form = Some(form);
            self.state = AppState::Editing;
        }
    }

    pub fn cancel_form(&mut self) {
        self.form = None;
        self.state = AppState::Normal;
    }

    /// Validate and send the open form. Invalid input keeps the form open
    /// with an error and makes no request.
    pub fn submit_form(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        let submission = match form.submission() {
            Ok(s) => s,
            Err(e) => {
                form.error = Some(e.to_string());
                return;
            }
        };

        let screen = form.screen;
        let id = form.editing_id;
        let verb = if id.is_some() { "updated" } else { "created" };
        self.form = None;
        self.state = AppState::Normal;
        self.status_message = Some("Saving...".to_string());

        let epoch = self.gate.epoch();
        let api = self.api.clone();
        self.spawn_task(async move {
            let result = match submission {
                Submission::Alert(input) => save::<Alert>(&api, id, &input).await,
                Submission::Sensor(input) => save::<Sensor>(&api, id, &input).await,
                Submission::Reading(input) => save::<Reading>(&api, id, &input).await,
                Submission::Station(input) => save::<Station>(&api, id, &input).await,
            };
            TaskResult::Mutated { epoch, screen, verb, result }
        });
    }

    fn tab_screen(&self) -> Option<Screen> {
        match self.route() {
            Route::Tab(screen) => Some(screen),
            _ => None,
        }
    }

    // =========================================================================
    // Confirmations
    // =========================================================================

    fn ask(&mut self, prompt: String, action: PendingAction) {
        self.pending = Some(request_confirmation(prompt, action));
        self.state = AppState::Confirming;
    }

    pub fn request_delete(&mut self) {
        let Some(screen) = self.tab_screen() else {
            return;
        };
        let Some(id) = self.selected_id(screen) else {
            return;
        };
        let noun = match screen {
            Screen::Alerts => "this alert",
            Screen::Sensors => "this sensor",
            Screen::Readings => "this reading",
            Screen::Stations => "this station",
            _ => return,
        };
        self.ask(format!("Delete {} (#{})?", noun, id), PendingAction::Delete { screen, id });
    }

    pub fn request_logout(&mut self) {
        self.ask(
            "Do you really want to log out?".to_string(),
            PendingAction::Logout,
        );
    }

    pub fn request_restore_defaults(&mut self) {
        self.ask(
            "Restore default settings?".to_string(),
            PendingAction::RestoreDefaults,
        );
    }

    pub fn request_quit(&mut self) {
        self.ask("Are you sure you want to quit?".to_string(), PendingAction::Quit);
    }

    /// Answer the open confirmation. The action only runs on `Confirm`.
    pub fn resolve_pending(&mut self, decision: UserDecision) {
        self.state = AppState::Normal;
        let Some(pending) = self.pending.take() else {
            return;
        };
        let Some(action) = pending.resolve(decision) else {
            debug!("Confirmation cancelled");
            return;
        };

        match action {
            PendingAction::Delete { screen, id } => self.delete(screen, id),
            PendingAction::Logout => self.logout(),
            PendingAction::RestoreDefaults => self.restore_defaults(),
            PendingAction::Quit => self.state = AppState::Quitting,
        }
    }

    fn delete(&mut self, screen: Screen, id: i64) {
        self.status_message = Some("Deleting...".to_string());
        let epoch = self.gate.epoch();
        let api = self.api.clone();
        self.spawn_task(async move {
            let result = match screen {
                Screen::Alerts => api.delete::<Alert>(id).await,
                Screen::Sensors => api.delete::<Sensor>(id).await,
                Screen::Readings => api.delete::<Reading>(id).await,
                Screen::Stations => api.delete::<Station>(id).await,
                other => Err(ApiError::InvalidRequest(format!("{} is read-only", other.title()))),
            };
            TaskResult::Mutated { epoch, screen, verb: "deleted", result }
        });
    }

    fn logout(&mut self) {
        self.logging_out = true;
        self.auth.logout();
        info!("User logged out");
    }

    // =========================================================================
    // Preferences
    // =========================================================================

    fn report_pref_error(&mut self, e: safeguard_core::StorageError) {
        warn!(error = %e, "Failed to save preference");
        self.status_message = Some("Could not save settings".to_string());
        self.prefs = self.prefs_store.load();
    }

    pub fn toggle_notifications(&mut self) {
        self.prefs.notifications_enabled = !self.prefs.notifications_enabled;
        if let Err(e) = self.prefs_store.set_notifications(self.prefs.notifications_enabled) {
            self.report_pref_error(e);
        }
    }

    pub fn toggle_dark_mode(&mut self) {
        self.prefs.dark_mode = !self.prefs.dark_mode;
        if let Err(e) = self.prefs_store.set_dark_mode(self.prefs.dark_mode) {
            self.report_pref_error(e);
        }
    }

    pub fn toggle_language(&mut self) {
        self.prefs.language = self.prefs.language.toggled();
        if let Err(e) = self.prefs_store.set_language(self.prefs.language) {
            self.report_pref_error(e);
        }
    }

    fn restore_defaults(&mut self) {
        match self.prefs_store.restore_defaults() {
            Ok(prefs) => {
                self.prefs = prefs;
                self.status_message = Some("Default settings restored".to_string());
            }
            Err(e) => self.report_pref_error(e),
        }
    }

    // =========================================================================
    // Background results
    // =========================================================================

    /// Drain finished tasks and react to authentication changes
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.task_rx.try_recv() {
            results.push(result);
        }
        for result in results {
            self.process_task_result(result);
        }

        if self.state_rx.has_changed().unwrap_or(false) {
            let state = *self.state_rx.borrow_and_update();
            if state != self.last_state {
                self.on_auth_state_changed(state);
            }
        }
    }

    fn is_stale(&self, epoch: u64) -> bool {
        epoch != self.gate.epoch()
    }

    fn report_error(&mut self, what: &str, e: &ApiError) {
        // 401s are handled by the gate; the login screen explains them
        if e.is_session_expired() {
            return;
        }
        warn!(error = %e, what, "Request failed");
        self.status_message = Some(format!("{}: {}", what, e.user_message()));
    }

    fn process_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::Bootstrapped(state) => {
                info!(?state, "Startup check finished");
            }
            TaskResult::LoginFinished(Ok(state)) => {
                debug!(?state, "Login finished");
                self.login.submitting = false;
            }
            TaskResult::LoginFinished(Err(e)) => {
                self.login.submitting = false;
                self.login.error = Some(e.user_message());
            }
            TaskResult::Loaded { epoch, screen, result } => {
                if self.is_stale(epoch) || self.current_screen() != Some(screen) {
                    debug!(?screen, epoch, "Dropping result for an unmounted screen");
                    return;
                }
                match result {
                    Ok(loaded) => self.apply_loaded(loaded, screen),
                    Err(e) => {
                        self.list_done(screen);
                        self.report_error(&format!("Could not load {}", screen.title()), &e);
                    }
                }
            }
            TaskResult::StationSensors { epoch, station_id, result } => {
                if self.is_stale(epoch) || self.route() != (Route::StationDetail { station_id }) {
                    debug!(station_id, "Dropping station sensors for a closed view");
                    return;
                }
                match result {
                    Ok(sensors) => {
                        if let Some(detail) = self.station_detail.as_mut() {
                            detail.sensors.set_items(sensors);
                        }
                    }
                    Err(e) => {
                        if let Some(detail) = self.station_detail.as_mut() {
                            detail.sensors.loading = false;
                        }
                        self.report_error("Could not load station sensors", &e);
                    }
                }
            }
            TaskResult::Mutated { epoch, screen, verb, result } => {
                if self.is_stale(epoch) {
                    debug!(?screen, "Dropping mutation result from an old session");
                    return;
                }
                match result {
                    Ok(()) => {
                        self.status_message = Some(format!("Record {}", verb));
                        if self.current_screen() == Some(screen) {
                            self.load_screen(screen);
                        }
                    }
                    Err(e) => self.report_error("Could not save changes", &e),
                }
            }
        }
    }

    fn list_done(&mut self, screen: Screen) {
        match screen {
            Screen::Alerts => self.alerts.loading = false,
            Screen::Sensors => self.sensors.loading = false,
            Screen::Readings => self.readings.loading = false,
            Screen::Risks => self.risks.loading = false,
            Screen::Map => self.map.loading = false,
            Screen::Stations => self.stations.loading = false,
            Screen::Settings | Screen::Instructions => {}
        }
    }

    fn apply_loaded(&mut self, loaded: Loaded, screen: Screen) {
        match loaded {
            Loaded::Alerts(items) => {
                self.alerts.set_items(items);
                self.after_filter_change();
            }
            Loaded::Sensors(items) => self.sensors.set_items(items),
            Loaded::Readings { readings, sensors } => {
                self.readings.set_items(readings);
                self.reading_sensors = sensors;
            }
            Loaded::Risks(items) => self.risks.set_items(items),
            Loaded::Stations(items) if screen == Screen::Map => {
                self.map.set_items(items);
                self.after_filter_change();
            }
            Loaded::Stations(items) => self.stations.set_items(items),
        }
    }
}

async fn fetch_screen(api: &ApiClient, screen: Screen) -> Result<Loaded, ApiError> {
    match screen {
        Screen::Alerts => api.list::<Alert>().await.map(Loaded::Alerts),
        Screen::Sensors => api.list::<Sensor>().await.map(Loaded::Sensors),
        Screen::Readings => {
            let (readings, sensors) = futures::join!(api.list::<Reading>(), api.list::<Sensor>());
            let sensors = sensors.unwrap_or_else(|e| {
                warn!(error = %e, "Could not load sensors for the readings screen");
                Vec::new()
            });
            Ok(Loaded::Readings {
                readings: readings?,
                sensors,
            })
        }
        Screen::Risks => api.list::<Risk>().await.map(Loaded::Risks),
        Screen::Map | Screen::Stations => api.list::<Station>().await.map(Loaded::Stations),
        Screen::Settings | Screen::Instructions => Err(ApiError::InvalidRequest(format!(
            "{} has nothing to load",
            screen.title()
        ))),
    }
}

async fn save<R: EditableResource>(
    api: &ApiClient,
    id: Option<i64>,
    input: &R::Input,
) -> Result<(), ApiError> {
    match id {
        Some(id) => api.update::<R>(id, input).await,
        None => api.create::<R>(input).await,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use safeguard_core::gate::GateEvent;
    use safeguard_core::store::MemoryStore;
    use safeguard_core::{KeyValueStore, SessionStore};

    use super::*;

    fn app_for(server: &MockServer, token: Option<&str>) -> App {
        let store: Arc<dyn KeyValueStore> = match token {
            Some(t) => Arc::new(MemoryStore::with_entries([("token", t)])),
            None => Arc::new(MemoryStore::new()),
        };
        let gate = NavigationGate::new(SessionStore::new(store.clone()));
        let api = ApiClient::with_base_url(&server.uri(), Duration::from_secs(5), gate).unwrap();
        App::new(Config::default(), None, api, PreferenceStore::new(store))
    }

    fn alert(id: i64) -> Alert {
        Alert {
            id,
            message: Some(format!("Alerta {}", id)),
            risk_level: Some("Alto".to_string()),
            issued_at: None,
        }
    }

    async fn settle(app: &mut App) {
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            app.check_background_tasks();
        }
    }

    #[test]
    fn test_list_view_move_and_clamp() {
        let mut list: ListView<i32> = ListView::default();
        list.set_items(vec![1, 2, 3]);
        list.move_by(5, 3);
        assert_eq!(list.selection, 2);
        list.move_by(-10, 3);
        assert_eq!(list.selection, 0);
        list.selection = 2;
        list.set_items(vec![1]);
        assert_eq!(list.selection, 0);
    }

    #[tokio::test]
    async fn test_stale_epoch_result_is_dropped() {
        let server = MockServer::start().await;
        let mut app = app_for(&server, Some("abc"));
        app.gate.dispatch(GateEvent::TokenAccepted);
        let old_epoch = app.gate.epoch();
        app.gate.dispatch(GateEvent::SessionExpired);
        app.gate.session().save_token("new").unwrap();
        app.gate.dispatch(GateEvent::LoginSucceeded);

        app.process_task_result(TaskResult::Loaded {
            epoch: old_epoch,
            screen: Screen::Alerts,
            result: Ok(Loaded::Alerts(vec![alert(1)])),
        });
        assert!(app.alerts.items.is_empty());

        app.process_task_result(TaskResult::Loaded {
            epoch: app.gate.epoch(),
            screen: Screen::Alerts,
            result: Ok(Loaded::Alerts(vec![alert(2)])),
        });
        assert_eq!(app.alerts.items.len(), 1);
    }

    #[tokio::test]
    async fn test_result_for_other_screen_is_dropped() {
        let server = MockServer::start().await;
        let mut app = app_for(&server, Some("abc"));
        app.gate.dispatch(GateEvent::TokenAccepted);
        app.gate.navigate(Screen::Risks);

        app.process_task_result(TaskResult::Loaded {
            epoch: app.gate.epoch(),
            screen: Screen::Alerts,
            result: Ok(Loaded::Alerts(vec![alert(1)])),
        });
        assert!(app.alerts.items.is_empty());
    }

    #[tokio::test]
    async fn test_session_expiry_clears_data_and_shows_notice() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/alertas"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let mut app = app_for(&server, Some("abc"));
        app.gate.dispatch(GateEvent::TokenAccepted);
        app.check_background_tasks();
        app.alerts.set_items(vec![alert(1)]);

        app.refresh_current();
        settle(&mut app).await;

        assert_eq!(app.route(), Route::Login);
        assert!(app.alerts.items.is_empty());
        assert_eq!(app.login.notice.as_deref(), Some(SESSION_EXPIRED_NOTICE));
        assert!(app.status_message.is_none());
    }

    #[tokio::test]
    async fn test_logout_needs_confirmation_and_shows_no_notice() {
        let server = MockServer::start().await;
        let mut app = app_for(&server, Some("abc"));
        app.gate.dispatch(GateEvent::TokenAccepted);
        app.check_background_tasks();

        app.request_logout();
        assert_eq!(app.state, AppState::Confirming);
        app.resolve_pending(UserDecision::Cancel);
        assert!(app.gate.is_authenticated());

        app.request_logout();
        app.resolve_pending(UserDecision::Confirm);
        app.check_background_tasks();
        assert_eq!(app.route(), Route::Login);
        assert!(app.login.notice.is_none());
        assert!(!app.gate.session().has_token());
    }

    #[tokio::test]
    async fn test_cancelled_delete_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        let mut app = app_for(&server, Some("abc"));
        app.gate.dispatch(GateEvent::TokenAccepted);
        app.check_background_tasks();
        app.alerts.set_items(vec![alert(7)]);

        app.request_delete();
        assert_eq!(
            app.pending.as_ref().map(|p| p.action().clone()),
            Some(PendingAction::Delete { screen: Screen::Alerts, id: 7 })
        );
        app.resolve_pending(UserDecision::Cancel);
        settle(&mut app).await;
        assert!(app.pending.is_none());
    }

    #[tokio::test]
    async fn test_confirmed_delete_reloads_screen() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/alertas/7"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/alertas"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let mut app = app_for(&server, Some("abc"));
        app.gate.dispatch(GateEvent::TokenAccepted);
        app.check_background_tasks();
        settle(&mut app).await;
        app.alerts.set_items(vec![alert(7)]);

        app.request_delete();
        app.resolve_pending(UserDecision::Confirm);
        settle(&mut app).await;
        assert!(app.alerts.items.is_empty());
        assert_eq!(app.status_message.as_deref(), Some("Record deleted"));
    }

    #[tokio::test]
    async fn test_invalid_form_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let mut app = app_for(&server, Some("abc"));
        app.gate.dispatch(GateEvent::TokenAccepted);
        app.check_background_tasks();
        app.switch_screen(Screen::Stations);

        app.start_new();
        assert_eq!(app.state, AppState::Editing);
        app.submit_form();
        assert_eq!(app.state, AppState::Editing);
        assert!(app.form.as_ref().and_then(|f| f.error.as_ref()).is_some());
    }

    #[tokio::test]
    async fn test_login_button_disabled_while_submitting() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"token": "abc"}))
                    .set_delay(Duration::from_millis(200)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut app = app_for(&server, None);
        app.gate.dispatch(GateEvent::TokenMissing);
        app.check_background_tasks();
        app.login.username = "admin".into();
        app.login.password = "admin".into();

        app.submit_login();
        assert!(app.login.submitting);
        app.submit_login();
        settle(&mut app).await;

        assert!(app.gate.is_authenticated());
        assert_eq!(app.route(), Route::Tab(Screen::Alerts));
        assert!(app.login.password.is_empty());
        assert_eq!(app.config.last_username.as_deref(), Some("admin"));
    }

    #[tokio::test]
    async fn test_blank_login_shows_error() {
        let server = MockServer::start().await;
        let mut app = app_for(&server, None);
        app.gate.dispatch(GateEvent::TokenMissing);
        app.submit_login();
        assert!(!app.login.submitting);
        assert_eq!(app.login.error.as_deref(), Some("Username and password required"));
    }

    #[tokio::test]
    async fn test_preferences_toggle_persists() {
        let server = MockServer::start().await;
        let mut app = app_for(&server, None);
        app.toggle_dark_mode();
        app.toggle_language();
        let reloaded = app.prefs_store.load();
        assert!(reloaded.dark_mode);
        assert_eq!(reloaded.language, safeguard_core::Language::En);
    }
}
