//! Core library for the TAKE a TASK client.
//!
//! This crate owns everything that is not presentation:
//!
//! - `auth`: the session gate (token lifecycle over the durable store and the
//!   cookie jar) and the route guard
//! - `api`: the REST client for the TAKE a TASK backend
//! - `cache`: the explicit tag cache
//! - `models`: wire types for tasks, users, tags, comments, attachments
//! - `config`: configuration loading and base URL resolution
//! - `utils`: formatting and local pagination helpers

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError, AuthError};
pub use auth::{GuardDecision, RouteGuard, SessionGate};
pub use config::{Config, LogoutPolicy};
