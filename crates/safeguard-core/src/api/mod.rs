//! REST API client module for the SAFE.Guard server.
//!
//! This module provides the `ApiClient` for talking to the monitoring API
//! and the typed CRUD helpers for its collections.
//!
//! The API uses bearer token authentication obtained from `POST /auth/login`.

pub mod client;
pub mod error;
pub mod resources;

pub use client::ApiClient;
pub use error::ApiError;
pub use reqwest::Method;
pub use resources::{EditableResource, Resource};
