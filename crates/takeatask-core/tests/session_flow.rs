//! End-to-end session behaviour against a stub backend.

use std::sync::Arc;

use chrono::{Duration, Utc};

use takeatask_core::auth::{RecordingNavigator, LOGIN_PATH, TOKEN_KEY};
use takeatask_core::models::TarefaFilter;
use takeatask_core::{ApiClient, AuthError, GuardDecision, LogoutPolicy, RouteGuard, SessionGate};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    server: MockServer,
    api: ApiClient,
    session: Arc<SessionGate>,
    navigator: Arc<RecordingNavigator>,
    dir: TempDir,
}

async fn harness(policy: LogoutPolicy) -> Harness {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let navigator = Arc::new(RecordingNavigator::new());
    let session = Arc::new(SessionGate::open(dir.path(), policy, navigator.clone()).unwrap());
    let api = ApiClient::new(&server.uri(), session.clone()).unwrap();
    Harness {
        server,
        api,
        session,
        navigator,
        dir,
    }
}

async fn mount_login(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_then_logout_keeps_stores_in_step() {
    let h = harness(LogoutPolicy::KeepProfile).await;
    mount_login(
        &h.server,
        serde_json::json!({"token": "jwt-123", "usuario": {"id": 1, "nome": "João Silva"}}),
    )
    .await;

    h.session
        .authenticate(&h.api, "joao", "123456", true)
        .await
        .unwrap();

    assert_eq!(h.session.token().as_deref(), Some("jwt-123"));
    assert_eq!(h.session.cookie_token().as_deref(), Some("jwt-123"));
    assert_eq!(h.session.display_name(), "João Silva");
    assert_eq!(h.session.remembered_login().as_deref(), Some("joao"));

    // state survives a restart
    let reopened = SessionGate::open(
        h.dir.path(),
        LogoutPolicy::KeepProfile,
        Arc::new(RecordingNavigator::new()),
    )
    .unwrap();
    assert_eq!(reopened.token().as_deref(), Some("jwt-123"));
    assert_eq!(reopened.cookie_token().as_deref(), Some("jwt-123"));

    h.session.end_session().unwrap();
    assert_eq!(h.session.token(), None);
    assert_eq!(h.session.cookie_token(), None);
    // profile data outlives logout under the default policy
    assert_eq!(h.session.display_name(), "João Silva");
    assert_eq!(h.session.remembered_login().as_deref(), Some("joao"));
}

#[tokio::test]
async fn test_clear_all_policy_forgets_profile() {
    let h = harness(LogoutPolicy::ClearAll).await;
    mount_login(
        &h.server,
        serde_json::json!({"token": "jwt-123", "usuario": {"nome": "João Silva"}}),
    )
    .await;

    h.session
        .authenticate(&h.api, "joao", "123456", true)
        .await
        .unwrap();
    h.session.end_session().unwrap();

    assert_eq!(h.session.stored_display_name(), None);
    assert_eq!(h.session.cookie_display_name(), None);
    assert_eq!(h.session.remembered_login(), None);
    assert_eq!(h.session.display_name(), "Usuário");
}

#[tokio::test]
async fn test_guard_follows_session_cookie() {
    let h = harness(LogoutPolicy::KeepProfile).await;
    mount_login(&h.server, serde_json::json!({"token": "jwt-123"})).await;

    let before = RouteGuard::evaluate("/tarefas/7", h.session.cookie_token().as_deref());
    assert_eq!(
        before.location().as_deref(),
        Some("/auth/login?redirect=%2Ftarefas%2F7")
    );
    assert_eq!(
        RouteGuard::evaluate("/", h.session.cookie_token().as_deref()),
        GuardDecision::RedirectToLogin { return_to: None }
    );

    h.session
        .authenticate(&h.api, "joao", "123456", false)
        .await
        .unwrap();

    let cookie = h.session.cookie_token();
    assert_eq!(
        RouteGuard::evaluate("/tarefas/7", cookie.as_deref()),
        GuardDecision::Allow
    );
    assert_eq!(
        RouteGuard::evaluate("/auth/login", cookie.as_deref()),
        GuardDecision::RedirectToApp
    );
}

#[tokio::test]
async fn test_login_without_name_clears_previous_name() {
    let h = harness(LogoutPolicy::KeepProfile).await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({"token": "first", "usuario": {"nome": "Maria"}}),
        ))
        .up_to_n_times(1)
        .mount(&h.server)
        .await;
    mount_login(&h.server, serde_json::json!({"token": "second", "usuario": {"id": 2}})).await;

    h.session
        .authenticate(&h.api, "maria", "123456", false)
        .await
        .unwrap();
    assert_eq!(h.session.stored_display_name().as_deref(), Some("Maria"));

    h.session
        .authenticate(&h.api, "joao", "123456", false)
        .await
        .unwrap();
    assert_eq!(h.session.token().as_deref(), Some("second"));
    assert_eq!(h.session.stored_display_name(), None);
    assert_eq!(h.session.cookie_display_name(), None);
    assert_eq!(h.session.display_name(), "Usuário");
}

#[tokio::test]
async fn test_end_session_twice_is_harmless() {
    let h = harness(LogoutPolicy::KeepProfile).await;
    mount_login(&h.server, serde_json::json!({"token": "jwt"})).await;
    h.session
        .authenticate(&h.api, "joao", "123456", false)
        .await
        .unwrap();

    h.session.end_session().unwrap();
    let name = h.session.stored_display_name();
    h.session.end_session().unwrap();

    assert_eq!(h.session.token(), None);
    assert_eq!(h.session.cookie_token(), None);
    assert_eq!(h.session.stored_display_name(), name);
}

#[tokio::test]
async fn test_unauthorized_with_token_logs_out_and_redirects() {
    let h = harness(LogoutPolicy::KeepProfile).await;
    mount_login(&h.server, serde_json::json!({"token": "expired"})).await;
    Mock::given(method("GET"))
        .and(path("/api/tarefas"))
        .and(header("authorization", "Bearer expired"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&h.server)
        .await;

    h.session
        .authenticate(&h.api, "joao", "123456", false)
        .await
        .unwrap();
    assert!(h.api.list_tarefas(&TarefaFilter::default()).await.is_err());

    assert_eq!(h.session.token(), None);
    assert_eq!(h.session.cookie_token(), None);
    assert_eq!(h.navigator.take(), vec![LOGIN_PATH.to_string()]);
}

#[tokio::test]
async fn test_unauthorized_without_token_changes_nothing() {
    let h = harness(LogoutPolicy::KeepProfile).await;
    Mock::given(method("GET"))
        .and(path("/api/tarefas"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;

    assert!(h.api.list_tarefas(&TarefaFilter::default()).await.is_err());

    assert!(h.navigator.take().is_empty());
    assert_eq!(h.session.token(), None);
    let requests = h.server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_rejected_login_shows_backend_message_and_persists_nothing() {
    let h = harness(LogoutPolicy::KeepProfile).await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(serde_json::json!({"message": "Credenciais inválidas"})),
        )
        .mount(&h.server)
        .await;

    let err = h
        .session
        .authenticate(&h.api, "joao", "wrong", true)
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Credenciais inválidas");
    assert_eq!(h.session.token(), None);
    assert_eq!(h.session.cookie_token(), None);
    assert_eq!(h.session.remembered_login(), None);
    assert!(h.navigator.take().is_empty());
}

#[tokio::test]
async fn test_blank_credentials_are_not_sent() {
    let h = harness(LogoutPolicy::KeepProfile).await;

    let err = h
        .session
        .authenticate(&h.api, "  ", "x", false)
        .await
        .unwrap_err();

    assert_eq!(err, AuthError::MissingCredentials);
    assert!(h.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_lapsed_cookie_logs_out_both_sides() {
    let h = harness(LogoutPolicy::KeepProfile).await;
    mount_login(&h.server, serde_json::json!({"token": "jwt-123"})).await;
    Mock::given(method("GET"))
        .and(path("/api/tarefas"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;

    h.session
        .authenticate(&h.api, "joao", "123456", false)
        .await
        .unwrap();
    h.session
        .cookies()
        .set_with_expiry(TOKEN_KEY, "jwt-123", Utc::now() - Duration::seconds(1))
        .unwrap();

    assert!(!h.session.is_authenticated());
    assert_eq!(
        RouteGuard::evaluate("/tarefas", h.session.cookie_token().as_deref()),
        GuardDecision::RedirectToLogin {
            return_to: Some("/tarefas".into())
        }
    );

    // the lapse survives a restart
    let reopened = SessionGate::open(
        h.dir.path(),
        LogoutPolicy::KeepProfile,
        Arc::new(RecordingNavigator::new()),
    )
    .unwrap();
    assert_eq!(reopened.token(), None);

    assert!(h.api.list_tarefas(&TarefaFilter::default()).await.is_err());
    let requests = h.server.received_requests().await.unwrap();
    let listing = requests
        .iter()
        .find(|r| r.url.path() == "/api/tarefas")
        .unwrap();
    assert!(listing.headers.get("authorization").is_none());
    assert!(h.navigator.take().is_empty());
}
