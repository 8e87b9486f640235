/// Authentication state held by the navigation gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// Startup check still running. Only valid initial state.
    Unknown,
    Authenticated,
    Unauthenticated,
}

impl AuthState {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, AuthState::Unknown)
    }
}

/// Inputs to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateEvent {
    /// Bootstrap found no stored token (or could not read the store)
    TokenMissing,
    /// Bootstrap found a token and the local policy accepts it as is
    TokenAccepted,
    /// Bootstrap probe request succeeded with the stored token
    ProbeSucceeded,
    /// Bootstrap probe request failed for any reason
    ProbeFailed,
    LoginSucceeded,
    LoggedOut,
    /// The HTTP client received a 401
    SessionExpired,
}

/// The single transition function. `None` means the event does not apply in
/// `state` and is ignored.
pub fn transition(state: AuthState, event: GateEvent) -> Option<AuthState> {
    use AuthState::*;
    use GateEvent::*;

    match (state, event) {
        (Unknown, TokenAccepted | ProbeSucceeded) => Some(Authenticated),
        (Unknown, TokenMissing | ProbeFailed | SessionExpired | LoggedOut) => Some(Unauthenticated),
        (Unauthenticated, LoginSucceeded) => Some(Authenticated),
        (Authenticated, LoggedOut | SessionExpired) => Some(Unauthenticated),
        _ => None,
    }
}
