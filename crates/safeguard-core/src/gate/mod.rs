//! Session bootstrap and navigation gate.
//!
//! The gate owns the `AuthState` and the navigation history. Every change
//! goes through `NavigationGate::dispatch`, which applies the pure
//! `transition` function and its side effects:
//!
//! - entering `Unauthenticated` removes the stored token and resets history
//!   to the login route
//! - entering `Authenticated` resets history to the first tab
//! - every applied transition bumps the epoch, so results of requests started
//!   under an older session can be recognised and dropped
//!
//! While the state is `Unknown` the route is `Loading`; the login screen is
//! never shown before the startup check finishes.

pub mod history;
pub mod state;

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::auth::SessionStore;
use crate::config::BootstrapPolicy;

pub use history::{NavigationHistory, Route, Screen};
pub use state::{transition, AuthState, GateEvent};

/// Authenticated request used to test a stored token at startup
pub const PROBE_PATH: &str = "/alertas";

/// First tab shown after authentication
pub const HOME_SCREEN: Screen = Screen::Alerts;

struct GateInner {
    state: AuthState,
    epoch: u64,
    history: NavigationHistory,
}

/// Shared handle to the authentication state machine.
/// Clone is cheap; all clones drive the same machine.
#[derive(Clone)]
pub struct NavigationGate {
    inner: Arc<Mutex<GateInner>>,
    session: SessionStore,
    state_tx: Arc<watch::Sender<AuthState>>,
}

impl NavigationGate {
    pub fn new(session: SessionStore) -> Self {
        let (state_tx, _) = watch::channel(AuthState::Unknown);
        Self {
            inner: Arc::new(Mutex::new(GateInner {
                state: AuthState::Unknown,
                epoch: 0,
                history: NavigationHistory::new(Route::Loading),
            })),
            session,
            state_tx: Arc::new(state_tx),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateInner> {
        // Fields are only ever assigned whole, poisoning can't tear them
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn state(&self) -> AuthState {
        self.lock().state
    }

    pub fn epoch(&self) -> u64 {
        self.lock().epoch
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == AuthState::Authenticated
    }

    /// Route to render now
    pub fn route(&self) -> Route {
        let inner = self.lock();
        match inner.state {
            AuthState::Unknown => Route::Loading,
            _ => inner.history.current(),
        }
    }

    pub fn history_depth(&self) -> usize {
        self.lock().history.depth()
    }

    /// Watch state changes
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Feed an event to the state machine. Returns the state afterwards.
    pub fn dispatch(&self, event: GateEvent) -> AuthState {
        let mut inner = self.lock();
        let from = inner.state;

        let Some(to) = transition(from, event) else {
            debug!(?from, ?event, "Gate event ignored");
            if event == GateEvent::LoggedOut {
                self.clear_token();
            }
            return from;
        };

        inner.state = to;
        inner.epoch += 1;
        match to {
            AuthState::Unauthenticated => {
                self.clear_token();
                inner.history.reset(Route::Login);
            }
            AuthState::Authenticated => inner.history.reset(Route::Tab(HOME_SCREEN)),
            AuthState::Unknown => {}
        }
        info!(?from, ?to, ?event, epoch = inner.epoch, "Authentication state changed");
        drop(inner);

        self.state_tx.send_replace(to);
        to
    }

    fn clear_token(&self) {
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to clear stored token");
        }
    }

    /// Switch to a tab of the authenticated tree. Refused otherwise.
    pub fn navigate(&self, screen: Screen) -> bool {
        let mut inner = self.lock();
        if inner.state != AuthState::Authenticated {
            return false;
        }
        inner.history.switch_tab(screen);
        true
    }

    /// Open a detail route over the current tab. Refused unless authenticated.
    pub fn push(&self, route: Route) -> bool {
        let mut inner = self.lock();
        if inner.state != AuthState::Authenticated || !route.is_authenticated() {
            return false;
        }
        inner.history.push(route);
        true
    }

    /// Go back one step. The root of each tree is never popped, so there is
    /// no way back from login into the authenticated tree.
    pub fn back(&self) -> bool {
        self.lock().history.back()
    }

    /// Resolve `Unknown` into one of the other two states.
    ///
    /// No-op if the state is already resolved.
    pub async fn bootstrap(&self, api: &ApiClient, policy: BootstrapPolicy) -> AuthState {
        let state = self.state();
        if state.is_resolved() {
            return state;
        }

        let token = match self.session.token() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Could not read session store, starting logged out");
                None
            }
        };

        if token.is_none() {
            debug!("No stored token");
            return self.dispatch(GateEvent::TokenMissing);
        }

        match policy {
            BootstrapPolicy::Local => self.dispatch(GateEvent::TokenAccepted),
            BootstrapPolicy::Probe => match api.get_value(PROBE_PATH).await {
                Ok(_) => self.dispatch(GateEvent::ProbeSucceeded),
                Err(e) => {
                    warn!(error = %e, "Stored token failed the probe");
                    self.dispatch(GateEvent::ProbeFailed)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::store::{FailingStore, MemoryStore};

    fn gate_with_token(token: Option<&str>) -> NavigationGate {
        let store = match token {
            Some(t) => MemoryStore::with_entries([("token", t)]),
            None => MemoryStore::new(),
        };
        NavigationGate::new(SessionStore::new(Arc::new(store)))
    }

    #[test]
    fn test_unknown_renders_loading() {
        let gate = gate_with_token(Some("abc"));
        assert_eq!(gate.state(), AuthState::Unknown);
        assert_eq!(gate.route(), Route::Loading);
        assert_eq!(gate.epoch(), 0);
    }

    #[test]
    fn test_entering_unauthenticated_clears_token() {
        let gate = gate_with_token(Some("abc"));
        gate.dispatch(GateEvent::ProbeFailed);
        assert_eq!(gate.state(), AuthState::Unauthenticated);
        assert_eq!(gate.route(), Route::Login);
        assert!(!gate.session().has_token());
    }

    #[test]
    fn test_authenticated_resets_to_home() {
        let gate = gate_with_token(Some("abc"));
        gate.dispatch(GateEvent::TokenAccepted);
        assert_eq!(gate.route(), Route::Tab(HOME_SCREEN));
        assert!(gate.session().has_token());
    }

    #[test]
    fn test_logout_resets_history() {
        let gate = gate_with_token(Some("abc"));
        gate.dispatch(GateEvent::TokenAccepted);
        assert!(gate.navigate(Screen::Map));
        assert!(gate.push(Route::StationDetail { station_id: 7 }));
        assert_eq!(gate.history_depth(), 2);

        gate.dispatch(GateEvent::LoggedOut);
        assert_eq!(gate.route(), Route::Login);
        assert_eq!(gate.history_depth(), 1);
        assert!(!gate.back());
        assert_eq!(gate.route(), Route::Login);
    }

    #[test]
    fn test_navigation_refused_when_logged_out() {
        let gate = gate_with_token(None);
        gate.dispatch(GateEvent::TokenMissing);
        assert!(!gate.navigate(Screen::Sensors));
        assert!(!gate.push(Route::StationDetail { station_id: 1 }));
        assert_eq!(gate.route(), Route::Login);
    }

    #[test]
    fn test_push_rejects_unauthenticated_routes() {
        let gate = gate_with_token(Some("abc"));
        gate.dispatch(GateEvent::TokenAccepted);
        assert!(!gate.push(Route::Login));
        assert!(!gate.push(Route::Loading));
    }

    #[test]
    fn test_ignored_event_keeps_epoch() {
        let gate = gate_with_token(None);
        gate.dispatch(GateEvent::TokenMissing);
        let epoch = gate.epoch();
        gate.dispatch(GateEvent::SessionExpired);
        gate.dispatch(GateEvent::ProbeSucceeded);
        assert_eq!(gate.epoch(), epoch);
        assert_eq!(gate.state(), AuthState::Unauthenticated);
    }

    #[test]
    fn test_logout_when_logged_out_still_clears() {
        let gate = gate_with_token(None);
        gate.dispatch(GateEvent::TokenMissing);
        // Token written behind the gate's back
        gate.session().save_token("stray").unwrap();
        gate.dispatch(GateEvent::LoggedOut);
        assert!(!gate.session().has_token());
    }

    #[test]
    fn test_subscribers_see_changes() {
        let gate = gate_with_token(Some("abc"));
        let rx = gate.subscribe();
        assert_eq!(*rx.borrow(), AuthState::Unknown);
        gate.dispatch(GateEvent::TokenAccepted);
        assert_eq!(*rx.borrow(), AuthState::Authenticated);
        gate.dispatch(GateEvent::SessionExpired);
        assert_eq!(*rx.borrow(), AuthState::Unauthenticated);
    }

    fn api_for(gate: &NavigationGate, base_url: &str) -> ApiClient {
        ApiClient::with_base_url(base_url, Duration::from_secs(5), gate.clone()).unwrap()
    }

    #[tokio::test]
    async fn test_bootstrap_local_trusts_stored_token() {
        let gate = gate_with_token(Some("abc"));
        // Nothing listens here; local bootstrap makes no request
        let api = api_for(&gate, "http://127.0.0.1:9");
        let state = gate.bootstrap(&api, BootstrapPolicy::Local).await;
        assert_eq!(state, AuthState::Authenticated);
        assert_eq!(gate.route(), Route::Tab(HOME_SCREEN));
        assert_eq!(gate.epoch(), 1);
    }

    #[tokio::test]
    async fn test_bootstrap_without_token_shows_login() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let gate = gate_with_token(None);
        let api = api_for(&gate, &server.uri());
        let state = gate.bootstrap(&api, BootstrapPolicy::Probe).await;
        assert_eq!(state, AuthState::Unauthenticated);
        assert_eq!(gate.route(), Route::Login);
    }

    #[tokio::test]
    async fn test_bootstrap_rejected_token_is_discarded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PROBE_PATH))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let gate = gate_with_token(Some("stale"));
        let api = api_for(&gate, &server.uri());
        let state = gate.bootstrap(&api, BootstrapPolicy::Probe).await;
        assert_eq!(state, AuthState::Unauthenticated);
        assert!(!gate.session().has_token());
        // Only the one transition out of Unknown
        assert_eq!(gate.epoch(), 1);
    }

    #[tokio::test]
    async fn test_bootstrap_accepted_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PROBE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let gate = gate_with_token(Some("abc"));
        let api = api_for(&gate, &server.uri());
        assert_eq!(gate.bootstrap(&api, BootstrapPolicy::Probe).await, AuthState::Authenticated);
        // Already resolved, no second request
        assert_eq!(gate.bootstrap(&api, BootstrapPolicy::Probe).await, AuthState::Authenticated);
        assert_eq!(gate.epoch(), 1);
    }

    #[tokio::test]
    async fn test_bootstrap_storage_failure_starts_logged_out() {
        let gate = NavigationGate::new(SessionStore::new(Arc::new(FailingStore)));
        let api = api_for(&gate, "http://127.0.0.1:9");
        let state = gate.bootstrap(&api, BootstrapPolicy::Local).await;
        assert_eq!(state, AuthState::Unauthenticated);
        assert_eq!(gate.route(), Route::Login);
    }

    #[test]
    fn test_clones_share_state() {
        let gate = gate_with_token(Some("abc"));
        let other = gate.clone();
        gate.dispatch(GateEvent::TokenAccepted);
        assert!(other.is_authenticated());
        assert_eq!(other.epoch(), 1);
    }
}
