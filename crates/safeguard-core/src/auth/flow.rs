//! Login and logout.
//!
//! A successful login stores the token before the gate is told about it, so
//! the first authenticated request already carries it. A failed login writes
//! nothing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::gate::{AuthState, GateEvent, NavigationGate};

use super::error::DEFAULT_REJECTED_MESSAGE;
use super::{AuthError, Credentials};

/// Clears the in-flight flag when the login attempt ends, however it ends
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Clone)]
pub struct AuthFlow {
    api: ApiClient,
    in_flight: Arc<AtomicBool>,
}

impl AuthFlow {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    fn gate(&self) -> &NavigationGate {
        self.api.gate()
    }

    /// True while a login request is outstanding
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Exchange credentials for a token, store it and enter the
    /// authenticated tree. At most one attempt runs at a time.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthState, AuthError> {
        credentials.validate()?;
        let _guard = self.begin()?;

        let token = self.fetch_token(credentials).await?;
        self.gate().session().save_token(&token)?;
        let state = self.gate().dispatch(GateEvent::LoginSucceeded);
        info!(username = %credentials.username, ?state, "Login succeeded");
        Ok(state)
    }

    /// Log in, replacing any session already in place. The old session is
    /// only ended once the new credentials have been accepted.
    pub async fn replace_session(&self, credentials: &Credentials) -> Result<AuthState, AuthError> {
        credentials.validate()?;
        let _guard = self.begin()?;

        let token = self.fetch_token(credentials).await?;
        if self.gate().is_authenticated() {
            self.logout();
        }
        self.gate().session().save_token(&token)?;
        let state = self.gate().dispatch(GateEvent::LoginSucceeded);
        info!(username = %credentials.username, ?state, "Session replaced");
        Ok(state)
    }

    fn begin(&self) -> Result<InFlight, AuthError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(AuthError::Busy);
        }
        Ok(InFlight(Arc::clone(&self.in_flight)))
    }

    async fn fetch_token(&self, credentials: &Credentials) -> Result<String, AuthError> {
        self.api.login(credentials).await.map_err(|e| {
            warn!(username = %credentials.username, error = %e, "Login failed");
            map_login_error(e)
        })
    }

    /// Remove the stored token and return to the login screen. Never fails;
    /// a storage error is logged and the gate still moves.
    pub fn logout(&self) -> AuthState {
        if let Err(e) = self.gate().session().clear() {
            warn!(error = %e, "Failed to remove token on logout");
        }
        let state = self.gate().dispatch(GateEvent::LoggedOut);
        info!("Logged out");
        state
    }
}

fn map_login_error(e: ApiError) -> AuthError {
    match e {
        ApiError::SessionExpired { message } => {
            AuthError::Rejected(message.unwrap_or_else(|| DEFAULT_REJECTED_MESSAGE.to_string()))
        }
        ApiError::Http { status: 400 | 403, message } => AuthError::Rejected(message),
        other => AuthError::Api(other),
    }
}
