use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::Duration;
use reqwest::{RequestBuilder, StatusCode};
use tracing::{debug, info, warn};

use crate::api::{ApiClient, AuthError};
use crate::config::LogoutPolicy;
use crate::models::LoginResponse;

use super::cookies::CookieJar;
use super::store::{DurableStore, FileStore, MemoryStore, StoreError};

/// Durable store / cookie key of the bearer token
pub const TOKEN_KEY: &str = "token";

/// Durable store / cookie key of the display name
pub const USER_NAME_KEY: &str = "userName";

/// Durable store key of the opt-in remembered login
pub const REMEMBERED_LOGIN_KEY: &str = "rememberedLogin";

/// Lifetime of the token and display name cookies.
pub const COOKIE_LIFETIME_DAYS: i64 = 7;

pub const LOGIN_PATH: &str = "/auth/login";

/// Where an authenticated user lands by default.
pub const DEFAULT_APP_PATH: &str = "/tarefas";

/// Shown when no display name is stored.
pub const DISPLAY_NAME_PLACEHOLDER: &str = "Usuário";

const STORAGE_FILE: &str = "storage.json";
const COOKIES_FILE: &str = "cookies.json";

/// Receives forced navigations, e.g. the redirect to the login view after the
/// backend rejected the stored token.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Navigator that only remembers where it was sent.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<String> {
        let visits = self.visits.lock().unwrap_or_else(|e| e.into_inner());
        visits.last().cloned()
    }

    pub fn take(&self) -> Vec<String> {
        let mut visits = self.visits.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *visits)
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        let mut visits = self.visits.lock().unwrap_or_else(|e| e.into_inner());
        visits.push(path.to_string());
    }
}

/// Owns the credential lifecycle.
///
/// The durable store is what the API layer reads and the cookie jar is what
/// the route guard reads. All credential writes go through this type, and a
/// token present in only one of them (the cookie expired, a file was lost)
/// reads as no session at all.
pub struct SessionGate {
    store: Box<dyn DurableStore>,
    cookies: CookieJar,
    logout_policy: LogoutPolicy,
    navigator: Arc<dyn Navigator>,
    // Serializes multi-key updates across both stores.
    write_lock: Mutex<()>,
}

impl SessionGate {
    pub fn new(
        store: Box<dyn DurableStore>,
        cookies: CookieJar,
        logout_policy: LogoutPolicy,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            store,
            cookies,
            logout_policy,
            navigator,
            write_lock: Mutex::new(()),
        }
    }

    /// Open the file-backed stores under `state_dir`.
    pub fn open(
        state_dir: &Path,
        logout_policy: LogoutPolicy,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, StoreError> {
        let store = FileStore::open(state_dir.join(STORAGE_FILE))?;
        let cookies = CookieJar::open(state_dir.join(COOKIES_FILE))?;
        Ok(Self::new(Box::new(store), cookies, logout_policy, navigator))
    }

    pub fn in_memory(logout_policy: LogoutPolicy, navigator: Arc<dyn Navigator>) -> Self {
        Self::new(
            Box::new(MemoryStore::new()),
            CookieJar::in_memory(),
            logout_policy,
            navigator,
        )
    }

    pub fn logout_policy(&self) -> LogoutPolicy {
        self.logout_policy
    }

    // ===== Reads =====

    /// Token as seen by the API layer.
    pub fn token(&self) -> Option<String> {
        self.live_token()
    }

    /// Token as seen by the route guard.
    pub fn cookie_token(&self) -> Option<String> {
        self.live_token()
    }

    /// Token both stores agree on.
    ///
    /// The cookie expires on its own while the durable copy does not, so a
    /// disagreement means the session lapsed. It is ended on the spot and
    /// both views read as logged out.
    fn live_token(&self) -> Option<String> {
        let durable = self.durable_token();
        let cookie = self.cookies.get(TOKEN_KEY);
        if durable == cookie {
            return durable;
        }

        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        // A login may have been halfway through writing both stores.
        let durable = self.durable_token();
        if durable == self.cookies.get(TOKEN_KEY) {
            return durable;
        }
        info!("Session cookie lapsed, ending session");
        if let Err(e) = self.clear_token() {
            warn!(error = %e, "Failed to clear lapsed session");
        }
        None
    }

    fn durable_token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn display_name(&self) -> String {
        self.store
            .get(USER_NAME_KEY)
            .or_else(|| self.cookies.get(USER_NAME_KEY))
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| DISPLAY_NAME_PLACEHOLDER.to_string())
    }

    pub fn stored_display_name(&self) -> Option<String> {
        self.store.get(USER_NAME_KEY)
    }

    pub fn cookie_display_name(&self) -> Option<String> {
        self.cookies.get(USER_NAME_KEY)
    }

    /// Login identifier to prefill the login form with.
    pub fn remembered_login(&self) -> Option<String> {
        self.store.get(REMEMBERED_LOGIN_KEY).filter(|l| !l.is_empty())
    }

    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    // ===== Lifecycle =====

    /// Send the credentials and, on success, persist the session.
    ///
    /// Nothing is written when the backend rejects the login or cannot be
    /// reached.
    pub async fn authenticate(
        &self,
        api: &ApiClient,
        login: &str,
        senha: &str,
        remember: bool,
    ) -> Result<LoginResponse, AuthError> {
        if login.trim().is_empty() || senha.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let response = api.login(login, senha).await?;
        self.establish(&response, login, remember)
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        info!(login, "Login successful");
        Ok(response)
    }

    /// Persist a successful login response.
    ///
    /// The token goes to both stores. The display name is written when the
    /// profile carries one and cleared otherwise, so a previous user's name
    /// never survives. The login is remembered only when asked to.
    pub fn establish(
        &self,
        response: &LoginResponse,
        login: &str,
        remember: bool,
    ) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let result = self.write_session(response, login, remember);
        if result.is_err() {
            // Roll back to logged out rather than leave one store behind.
            if let Err(e) = self.clear_token() {
                warn!(error = %e, "Failed to roll back partially written session");
            }
        }
        result
    }

    fn write_session(
        &self,
        response: &LoginResponse,
        login: &str,
        remember: bool,
    ) -> Result<(), StoreError> {
        let lifetime = Duration::days(COOKIE_LIFETIME_DAYS);

        self.store.set(TOKEN_KEY, &response.token)?;
        self.cookies.set(TOKEN_KEY, &response.token, lifetime)?;

        match response.display_name() {
            Some(name) => {
                self.store.set(USER_NAME_KEY, name)?;
                self.cookies.set(USER_NAME_KEY, name, lifetime)?;
            }
            None => {
                warn!("Login response carried no display name, clearing stored name");
                self.store.remove(USER_NAME_KEY)?;
                self.cookies.remove(USER_NAME_KEY)?;
            }
        }

        if remember {
            self.store.set(REMEMBERED_LOGIN_KEY, login)?;
        } else {
            self.store.remove(REMEMBERED_LOGIN_KEY)?;
        }

        debug!(token_len = response.token.len(), remember, "Session persisted");
        Ok(())
    }

    /// Clear the token from both stores. Safe to call repeatedly.
    ///
    /// Under `LogoutPolicy::ClearAll` the display name and remembered login
    /// are cleared as well.
    pub fn end_session(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        self.clear_token()?;
        if self.logout_policy == LogoutPolicy::ClearAll {
            self.store.remove(USER_NAME_KEY)?;
            self.cookies.remove(USER_NAME_KEY)?;
            self.store.remove(REMEMBERED_LOGIN_KEY)?;
        }
        info!(policy = ?self.logout_policy, "Session ended");
        Ok(())
    }

    fn clear_token(&self) -> Result<(), StoreError> {
        self.store.remove(TOKEN_KEY)?;
        self.cookies.remove(TOKEN_KEY)
    }

    // ===== Request plumbing =====

    /// Add the bearer token to an outbound request when one is stored.
    ///
    /// Requests are never held back for lack of a token; the backend decides.
    pub fn attach_credential(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// React to the status of an authorized response.
    ///
    /// A 401 while a token is stored means the session is gone: the session
    /// is ended and the client is sent to the login view. Returns whether
    /// that happened. Without a stored token nothing changes, which keeps the
    /// login view from redirecting to itself.
    pub fn handle_unauthorized(&self, status: StatusCode) -> bool {
        if status != StatusCode::UNAUTHORIZED || self.token().is_none() {
            return false;
        }

        warn!("Token rejected by backend, possibly expired. Redirecting to login");
        if let Err(e) = self.end_session() {
            warn!(error = %e, "Failed to clear rejected session");
        }
        self.navigator.navigate(LOGIN_PATH);
        true
    }
}

/// Where to go after a successful login.
///
/// The return-to path is honoured when it is an in-app, non-auth path.
pub fn post_login_destination(return_to: Option<&str>) -> String {
    match return_to {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.starts_with("/auth")
                && path != "/" =>
        {
            path.to_string()
        }
        _ => DEFAULT_APP_PATH.to_string(),
    }
}
