//! Field checks run before a payload is sent.
//!
//! Messages match the ones the backend returns for the same constraint, so a
//! user sees the same text whichever side catches the problem.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub(crate) fn required(field: &'static str, value: &str, message: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new(field, message))
    } else {
        Ok(())
    }
}

/// Length in characters of the trimmed value must be within `min..=max`.
pub(crate) fn length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
    message: &str,
) -> Result<(), ValidationError> {
    let len = value.trim().chars().count();
    if len < min || len > max {
        Err(ValidationError::new(field, message))
    } else {
        Ok(())
    }
}

pub(crate) fn email(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.contains(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new(field, "Formato de email inválido."))
    }
}

/// `#RRGGBB`
pub(crate) fn hex_color(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let valid = value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new(
            field,
            "A cor da tag deve estar no formato hexadecimal (ex: #RRGGBB).",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required() {
        assert!(required("nome", "x", "obrigatório").is_ok());
        let err = required("nome", "   ", "obrigatório").unwrap_err();
        assert_eq!(err.field, "nome");
        assert_eq!(err.to_string(), "nome: obrigatório");
    }

    #[test]
    fn test_length_counts_chars() {
        assert!(length("nome", "ção", 3, 3, "m").is_ok());
        assert!(length("nome", "ab", 3, 10, "m").is_err());
        assert!(length("nome", "  abc  ", 3, 3, "m").is_ok());
    }

    #[test]
    fn test_email() {
        assert!(email("email", "joao@example.com").is_ok());
        assert!(email("email", "joao@example").is_err());
        assert!(email("email", "@example.com").is_err());
        assert!(email("email", "jo ao@example.com").is_err());
        assert!(email("email", "a@b@c.com").is_err());
    }

    #[test]
    fn test_hex_color() {
        assert!(hex_color("cor", "#71717A").is_ok());
        assert!(hex_color("cor", "#fff").is_err());
        assert!(hex_color("cor", "71717A1").is_err());
        assert!(hex_color("cor", "#GGGGGG").is_err());
    }
}
