//! Authentication module for managing the client session.
//!
//! This module provides:
//! - `SessionGate`: token acquisition, persistence, attachment and teardown
//! - `RouteGuard`: the per-navigation allow/redirect decision
//! - `DurableStore` / `CookieJar`: the two places the credential lives
//!
//! Tokens carry no client-side expiry. The backend signals expiry with a 401,
//! and cookies written at login live for seven days.

pub mod cookies;
pub mod guard;
pub mod session;
pub mod store;

pub use cookies::CookieJar;
pub use guard::{GuardDecision, PathClass, RouteGuard};
pub use session::{
    post_login_destination, Navigator, RecordingNavigator, SessionGate, COOKIE_LIFETIME_DAYS,
    DEFAULT_APP_PATH, DISPLAY_NAME_PLACEHOLDER, LOGIN_PATH, TOKEN_KEY,
};
pub use store::{DurableStore, FileStore, MemoryStore, StoreError};
