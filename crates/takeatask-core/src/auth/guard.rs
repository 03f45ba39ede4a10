//! Per-navigation access decision.
//!
//! The guard runs before anything is rendered and only sees the request path
//! and the token cookie.

use super::session::{DEFAULT_APP_PATH, LOGIN_PATH};

/// Query parameter carrying the path to return to after login.
pub const RETURN_TO_PARAM: &str = "redirect";

/// Extensions served as public static assets.
const STATIC_ASSET_EXTENSIONS: &[&str] = &["ico", "png", "jpg", "jpeg", "svg", "css", "js"];

/// Prefixes the guard never runs on (backend proxy and framework assets).
const UNGUARDED_PREFIXES: &[&str] = &["api", "_next/static", "_next/image", "favicon.ico"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    Unguarded,
    StaticAsset,
    AuthPage,
    Protected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectToLogin { return_to: Option<String> },
    RedirectToApp,
}

impl GuardDecision {
    /// Redirect target, `None` for `Allow`.
    pub fn location(&self) -> Option<String> {
        match self {
            GuardDecision::Allow => None,
            GuardDecision::RedirectToApp => Some(DEFAULT_APP_PATH.to_string()),
            GuardDecision::RedirectToLogin { return_to: None } => Some(LOGIN_PATH.to_string()),
            GuardDecision::RedirectToLogin {
                return_to: Some(path),
            } => {
                let query = url::form_urlencoded::Serializer::new(String::new())
                    .append_pair(RETURN_TO_PARAM, path)
                    .finish();
                Some(format!("{}?{}", LOGIN_PATH, query))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RouteGuard;

impl RouteGuard {
    /// Classify the path part of a URL (query and fragment are ignored).
    pub fn classify(path: &str) -> PathClass {
        let path = pathname(path);
        let relative = path.trim_start_matches('/');

        if UNGUARDED_PREFIXES.iter().any(|p| relative.starts_with(p)) {
            PathClass::Unguarded
        } else if is_static_asset(path) {
            PathClass::StaticAsset
        } else if path.starts_with("/auth") {
            PathClass::AuthPage
        } else {
            PathClass::Protected
        }
    }

    pub fn evaluate(path: &str, cookie_token: Option<&str>) -> GuardDecision {
        let has_token = cookie_token.is_some_and(|t| !t.is_empty());

        match (Self::classify(path), has_token) {
            (PathClass::Unguarded, _) | (PathClass::StaticAsset, _) => GuardDecision::Allow,
            (PathClass::Protected, false) => {
                let path = pathname(path);
                let return_to = if path == "/" || path.is_empty() {
                    None
                } else {
                    Some(path.to_string())
                };
                GuardDecision::RedirectToLogin { return_to }
            }
            (PathClass::Protected, true) => GuardDecision::Allow,
            (PathClass::AuthPage, true) => GuardDecision::RedirectToApp,
            (PathClass::AuthPage, false) => GuardDecision::Allow,
        }
    }
}

fn pathname(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

fn is_static_asset(path: &str) -> bool {
    match path.rsplit_once('.') {
        Some((_, ext)) => STATIC_ASSET_EXTENSIONS.contains(&ext),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_assets_always_allowed() {
        for path in ["/logo.png", "/styles/site.css", "/app.js", "/img/a.jpeg", "/icon.svg"] {
            assert_eq!(RouteGuard::evaluate(path, None), GuardDecision::Allow, "{}", path);
            assert_eq!(RouteGuard::evaluate(path, Some("tok")), GuardDecision::Allow, "{}", path);
        }
    }

    #[test]
    fn test_protected_without_token_redirects_with_return_to() {
        assert_eq!(
            RouteGuard::evaluate("/usuarios", None),
            GuardDecision::RedirectToLogin {
                return_to: Some("/usuarios".into())
            }
        );
    }

    #[test]
    fn test_root_without_token_has_no_return_to() {
        assert_eq!(
            RouteGuard::evaluate("/", None),
            GuardDecision::RedirectToLogin { return_to: None }
        );
    }

    #[test]
    fn test_protected_with_token_allowed() {
        assert_eq!(RouteGuard::evaluate("/tarefas/3", Some("tok")), GuardDecision::Allow);
        assert_eq!(RouteGuard::evaluate("/", Some("tok")), GuardDecision::Allow);
    }

    #[test]
    fn test_auth_pages() {
        assert_eq!(
            RouteGuard::evaluate("/auth/login", Some("tok")),
            GuardDecision::RedirectToApp
        );
        assert_eq!(
            RouteGuard::evaluate("/auth/register", Some("tok")),
            GuardDecision::RedirectToApp
        );
        assert_eq!(RouteGuard::evaluate("/auth/login", None), GuardDecision::Allow);
    }

    #[test]
    fn test_empty_cookie_counts_as_absent() {
        assert_eq!(RouteGuard::evaluate("/auth/login", Some("")), GuardDecision::Allow);
        assert!(matches!(
            RouteGuard::evaluate("/tarefas", Some("")),
            GuardDecision::RedirectToLogin { .. }
        ));
    }

    #[test]
    fn test_query_string_is_not_part_of_return_to() {
        assert_eq!(
            RouteGuard::evaluate("/tarefas?tipo=minhas", None),
            GuardDecision::RedirectToLogin {
                return_to: Some("/tarefas".into())
            }
        );
        assert_eq!(RouteGuard::classify("/logo.png?v=2"), PathClass::StaticAsset);
    }

    #[test]
    fn test_unguarded_prefixes() {
        assert_eq!(RouteGuard::classify("/api/tarefas"), PathClass::Unguarded);
        assert_eq!(RouteGuard::classify("/_next/static/chunk"), PathClass::Unguarded);
        assert_eq!(RouteGuard::evaluate("/api/tarefas", None), GuardDecision::Allow);
        assert_eq!(RouteGuard::classify("/_next/data/x"), PathClass::Protected);
    }

    #[test]
    fn test_location_rendering() {
        assert_eq!(GuardDecision::Allow.location(), None);
        assert_eq!(GuardDecision::RedirectToApp.location().as_deref(), Some("/tarefas"));
        assert_eq!(
            GuardDecision::RedirectToLogin { return_to: None }.location().as_deref(),
            Some("/auth/login")
        );
        assert_eq!(
            GuardDecision::RedirectToLogin {
                return_to: Some("/tarefas/7".into())
            }
            .location()
            .as_deref(),
            Some("/auth/login?redirect=%2Ftarefas%2F7")
        );
    }

    #[test]
    fn test_extension_match_is_suffix_only() {
        assert_eq!(RouteGuard::classify("/docs.js/page"), PathClass::Protected);
        assert_eq!(RouteGuard::classify("/LOGO.PNG"), PathClass::Protected);
    }
}
