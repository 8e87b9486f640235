//! Authentication module for managing the user session.
//!
//! This module provides:
//! - `SessionStore`: the stored bearer token, read fresh on every request
//! - `Credentials`: username and password for a single login attempt
//! - `AuthFlow`: login and logout, wired to the navigation gate
//!
//! Tokens carry no client-side expiry; the server decides, and a 401 ends the
//! session.

pub mod credentials;
pub mod error;
pub mod flow;
pub mod session;

pub use credentials::Credentials;
pub use error::AuthError;
pub use flow::AuthFlow;
pub use session::{Session, SessionStore};
