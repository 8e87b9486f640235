//! Confirm-then-act.
//!
//! Destructive actions are wrapped in a `PendingConfirmation` and only handed
//! back for execution once the user confirms. Cancelling drops the action.

/// The user's answer to a confirmation prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserDecision {
    Confirm,
    Cancel,
}

/// An action waiting for the user's answer
#[derive(Debug, Clone, PartialEq)]
pub struct PendingConfirmation<A> {
    prompt: String,
    action: A,
}

pub fn request_confirmation<A>(prompt: impl Into<String>, action: A) -> PendingConfirmation<A> {
    PendingConfirmation {
        prompt: prompt.into(),
        action,
    }
}

impl<A> PendingConfirmation<A> {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn action(&self) -> &A {
        &self.action
    }

    /// The action to run, only on `Confirm`
    pub fn resolve(self, decision: UserDecision) -> Option<A> {
        match decision {
            UserDecision::Confirm => Some(self.action),
            UserDecision::Cancel => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Action {
        Delete(i64),
    }

    #[test]
    fn test_confirm_returns_action() {
        let pending = request_confirmation("Delete station 3?", Action::Delete(3));
        assert_eq!(pending.prompt(), "Delete station 3?");
        assert_eq!(pending.resolve(UserDecision::Confirm), Some(Action::Delete(3)));
    }

    #[test]
    fn test_cancel_drops_action() {
        let pending = request_confirmation("Log out?", Action::Delete(1));
        assert_eq!(pending.resolve(UserDecision::Cancel), None);
    }
}
