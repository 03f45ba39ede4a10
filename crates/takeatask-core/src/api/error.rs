use reqwest::StatusCode;
use thiserror::Error;

use crate::models::ValidationError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized - session expired or token rejected")]
    Unauthorized,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid input - {0}")]
    Validation(#[from] ValidationError),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Shown when the backend gives no usable reason for a failed login.
pub const LOGIN_FALLBACK_MESSAGE: &str = "Login ou senha inválidos";

/// Shown when the backend could not be reached at all.
pub const CONNECTION_FALLBACK_MESSAGE: &str = "Erro ao conectar com o servidor. Tente novamente.";

/// Truncate a response body to avoid logging excessive data
fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
}

/// Pull a human-readable reason out of an error body.
///
/// Spring-style bodies carry it in `message` (or `error`); a short plain-text
/// body is taken as-is.
pub(crate) fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => ["message", "error"]
            .iter()
            .filter_map(|key| value.get(*key).and_then(|v| v.as_str()))
            .map(str::trim)
            .find(|m| !m.is_empty())
            .map(str::to_string),
        Err(_) if trimmed.len() <= 200 && !trimmed.starts_with('<') => Some(trimmed.to_string()),
        Err(_) => None,
    }
}

impl ApiError {
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let reason = extract_message(body).unwrap_or_else(|| truncate_body(body));
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            400 => ApiError::BadRequest(reason),
            403 => ApiError::AccessDenied(reason),
            404 => ApiError::NotFound(reason),
            409 => ApiError::Conflict(reason),
            500..=599 => ApiError::ServerError(reason),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, reason)),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

/// Why a login attempt failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The backend answered with a non-2xx status.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid login response: {0}")]
    InvalidResponse(String),

    #[error("Login e senha são obrigatórios.")]
    MissingCredentials,

    #[error("Could not persist session: {0}")]
    Storage(String),
}

impl AuthError {
    /// Build a rejection from the status and body of a failed login.
    ///
    /// Prefers the backend's own message, otherwise `Credenciais inválidas (<status>)`.
    pub fn rejected(status: StatusCode, body: &str) -> Self {
        let message = extract_message(body)
            .unwrap_or_else(|| format!("Credenciais inválidas ({})", status.as_u16()));
        AuthError::Rejected {
            status: status.as_u16(),
            message,
        }
    }

    /// Text suitable for showing next to the login form.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Rejected { message, .. } if !message.trim().is_empty() => message.clone(),
            AuthError::Rejected { .. } | AuthError::InvalidResponse(_) => {
                LOGIN_FALLBACK_MESSAGE.to_string()
            }
            AuthError::MissingCredentials => self.to_string(),
            AuthError::Network(_) | AuthError::Storage(_) => {
                CONNECTION_FALLBACK_MESSAGE.to_string()
            }
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AuthError::InvalidResponse(err.to_string())
        } else {
            AuthError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_maps_codes() {
        assert!(ApiError::from_status(StatusCode::UNAUTHORIZED, "").is_unauthorized());
        assert!(matches!(
            ApiError::from_status(StatusCode::CONFLICT, r#"{"message":"Login já existe"}"#),
            ApiError::Conflict(m) if m == "Login já existe"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream down"),
            ApiError::ServerError(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::IM_A_TEAPOT, ""),
            ApiError::InvalidResponse(_)
        ));
    }

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        let body = "é".repeat(400);
        let truncated = truncate_body(&body);
        assert!(truncated.contains("truncated, 800 total bytes"));
    }

    #[test]
    fn test_extract_message() {
        assert_eq!(
            extract_message(r#"{"message":"Credenciais inválidas"}"#).as_deref(),
            Some("Credenciais inválidas")
        );
        assert_eq!(
            extract_message(r#"{"error":"Bad Request","message":""}"#).as_deref(),
            Some("Bad Request")
        );
        assert_eq!(extract_message("Usuário inativo").as_deref(), Some("Usuário inativo"));
        assert_eq!(extract_message("<html>oops</html>"), None);
        assert_eq!(extract_message("  "), None);
        assert_eq!(extract_message(r#"{"status":500}"#), None);
    }

    #[test]
    fn test_rejected_message() {
        let err = AuthError::rejected(StatusCode::BAD_REQUEST, r#"{"message":"Credenciais inválidas"}"#);
        assert_eq!(err.user_message(), "Credenciais inválidas");

        let err = AuthError::rejected(StatusCode::UNAUTHORIZED, "");
        assert_eq!(err.user_message(), "Credenciais inválidas (401)");
    }

    #[test]
    fn test_fallback_messages() {
        assert_eq!(
            AuthError::Network("connection refused".into()).user_message(),
            CONNECTION_FALLBACK_MESSAGE
        );
        assert_eq!(
            AuthError::InvalidResponse("missing token".into()).user_message(),
            LOGIN_FALLBACK_MESSAGE
        );
    }
}
