//! REST API client module for the TAKE a TASK backend.
//!
//! This module provides the `ApiClient` for tasks, users, tags, comments,
//! attachments and subtasks, plus the login exchange.
//!
//! The backend uses bearer token authentication; the token comes from
//! `POST /api/auth/login` and is held by the `SessionGate`.

pub mod client;
pub mod error;

pub use client::{ApiClient, AuthMode};
pub use error::{ApiError, AuthError, CONNECTION_FALLBACK_MESSAGE, LOGIN_FALLBACK_MESSAGE};
