//! SAFE.Guard core library.
//!
//! Session and request orchestration for the SAFE.Guard monitoring client:
//!
//! - `store`: Durable key-value storage (file, OS keychain, memory)
//! - `auth`: Session store, credentials and the login/logout flow
//! - `api`: HTTP client with credential injection and 401 handling
//! - `gate`: Authentication state machine and navigation history
//! - `prefs`: Locally persisted user preferences
//! - `models`: Alert, sensor, reading, risk and station payloads
//! - `confirm`: Two-step confirm-then-act protocol

pub mod api;
pub mod auth;
pub mod config;
pub mod confirm;
pub mod gate;
pub mod models;
pub mod prefs;
pub mod store;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthError, AuthFlow, Credentials, SessionStore};
pub use config::{BootstrapPolicy, Config, StoreBackend};
pub use confirm::{request_confirmation, PendingConfirmation, UserDecision};
pub use gate::{AuthState, NavigationGate, Route, Screen};
pub use prefs::{Language, PreferenceStore, Preferences};
pub use store::{KeyValueStore, StorageError};
