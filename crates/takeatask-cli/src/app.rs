//! Application state for the takeatask CLI.
//!
//! `App` wires the configuration, the session gate and the API client
//! together, and owns the interactive login flow.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use takeatask_core::auth::{post_login_destination, RecordingNavigator, LOGIN_PATH};
use takeatask_core::{ApiClient, AuthError, Config, SessionGate};

// ============================================================================
// Constants
// ============================================================================

/// Maximum length for login input. Matches the backend's login column.
const MAX_LOGIN_LENGTH: usize = 50;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

pub struct App {
    pub config: Config,
    pub session: Arc<SessionGate>,
    pub api: ApiClient,
    navigator: Arc<RecordingNavigator>,
}

impl App {
    /// Load configuration, open the session stores and build the client.
    pub fn new(api_url: Option<String>) -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };
        let state_dir = config.state_dir()?;
        std::fs::create_dir_all(&state_dir)
            .with_context(|| format!("Failed to create state directory {:?}", state_dir))?;
        debug!(?state_dir, "State directory configured");

        let navigator = Arc::new(RecordingNavigator::new());
        let session = Arc::new(
            SessionGate::open(&state_dir, config.logout_policy, navigator.clone())
                .context("Failed to open session storage")?,
        );
        let api = match api_url {
            Some(url) => {
                let timeout = config.request_timeout_secs.map(Duration::from_secs);
                ApiClient::with_timeout(&url, session.clone(), timeout)?
            }
            None => ApiClient::from_config(&config, session.clone())?,
        };
        debug!(api_url = api.base_url(), "API client ready");

        Ok(Self {
            config,
            session,
            api,
            navigator,
        })
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Fail early with the login hint when there is no session.
    pub fn require_session(&self) -> Result<()> {
        if self.is_authenticated() {
            Ok(())
        } else {
            anyhow::bail!("Not logged in. Run `takeatask login` first.")
        }
    }

    /// Interactive login. The remembered login is offered as the default.
    ///
    /// A rejected login surfaces as an [`AuthError`] in the returned chain.
    pub async fn login_interactive(
        &self,
        login: Option<String>,
        remember: bool,
        redirect: Option<&str>,
    ) -> Result<()> {
        println!("\n=== TAKE a TASK Login ===\n");

        let login = match login {
            Some(login) => login,
            None => self.prompt_login()?,
        };
        let senha = Self::prompt_password()?;
        if !can_accept_login(&login) || !can_accept_password(&senha) {
            return Err(AuthError::MissingCredentials.into());
        }

        println!("\nAuthenticating...");
        self.session
            .authenticate(&self.api, login.trim(), &senha, remember)
            .await?;

        info!("Interactive login completed");
        println!("Bem-vindo, {}!", self.session.display_name());
        println!("-> {}", post_login_destination(redirect));
        Ok(())
    }

    fn prompt_login(&self) -> Result<String> {
        match self.session.remembered_login() {
            Some(remembered) => {
                print!("Login [{}]: ", remembered);
                io::stdout().flush()?;
                let input = read_line()?;
                if input.is_empty() {
                    Ok(remembered)
                } else {
                    Ok(input)
                }
            }
            None => {
                print!("Login: ");
                io::stdout().flush()?;
                read_line()
            }
        }
    }

    fn prompt_password() -> Result<String> {
        let password = rpassword::prompt_password("Senha: ")?;
        Ok(password)
    }

    pub fn logout(&self) -> Result<()> {
        self.session
            .end_session()
            .context("Failed to clear the session")?;
        Ok(())
    }

    /// Message to show when a command ended the session because the backend
    /// rejected the token.
    pub fn forced_logout_hint(&self) -> Option<String> {
        let navigations = self.navigator.take();
        if navigations.iter().any(|p| p == LOGIN_PATH) {
            Some("Sessão expirada. Faça login novamente com `takeatask login`.".to_string())
        } else {
            None
        }
    }
}

fn read_line() -> Result<String> {
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

// ============================================================================
// Input validation helpers
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

pub fn can_accept_login(login: &str) -> bool {
    let login = login.trim();
    !login.is_empty()
        && login.chars().count() <= MAX_LOGIN_LENGTH
        && login.chars().all(is_valid_input_char)
}

pub fn can_accept_password(password: &str) -> bool {
    !password.is_empty()
        && password.chars().count() <= MAX_PASSWORD_LENGTH
        && password.chars().all(is_valid_input_char)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_accept_login() {
        assert!(can_accept_login("joao"));
        assert!(can_accept_login("  joao  "));
        assert!(!can_accept_login(""));
        assert!(!can_accept_login("   "));
        assert!(!can_accept_login(&"a".repeat(MAX_LOGIN_LENGTH + 1)));
        assert!(!can_accept_login("jo\u{7}ao"));
    }

    #[test]
    fn test_can_accept_password() {
        assert!(can_accept_password("segredo 123"));
        assert!(!can_accept_password(""));
        assert!(!can_accept_password(&"x".repeat(MAX_PASSWORD_LENGTH + 1)));
        assert!(!can_accept_password("abc\n"));
    }
}
