//! API client for the TAKE a TASK backend.
//!
//! Every request is tagged with an [`AuthMode`]. Authorized requests carry the
//! session's bearer token, and any failed response to one is first offered
//! to [`SessionGate::handle_unauthorized`] so a rejected token ends the
//! session before the error reaches the caller.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{multipart, Client, IntoUrl, Method, RequestBuilder, Response, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::auth::SessionGate;
use crate::cache::{self, TagCache};
use crate::config::Config;
use crate::models::{
    Anexo, Comentario, LoginRequest, LoginResponse, NovaSubtarefa, NovaTag, NovaTarefa,
    NovoComentario, NovoUsuario, Subtarefa, SubtarefaUpdate, Tag, Tarefa, TarefaFilter,
    TarefaStats, TarefaUpdate, Usuario, UsuarioUpdate,
};

use super::{ApiError, AuthError};

// ============================================================================
// Constants
// ============================================================================

const LOGIN_PATH: &str = "/api/auth/login";
const TAREFAS_PATH: &str = "/api/tarefas";
const USUARIOS_PATH: &str = "/api/usuarios";
const TAGS_PATH: &str = "/api/tags";

/// Multipart field name the backend reads uploads from.
const UPLOAD_FIELD: &str = "arquivo";

/// Whether a request carries the session credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Attach the bearer token; a 401 ends the session.
    Required,
    /// Sent as-is (login, self-registration).
    None,
}

/// API client for the TAKE a TASK backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Arc<str>,
    session: Arc<SessionGate>,
    tags: Arc<TagCache>,
}

impl ApiClient {
    /// Create a client without a request timeout.
    pub fn new(base_url: &str, session: Arc<SessionGate>) -> Result<Self> {
        Self::with_timeout(base_url, session, None)
    }

    pub fn with_timeout(
        base_url: &str,
        session: Arc<SessionGate>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            session,
            tags: Arc::new(TagCache::new()),
        })
    }

    pub fn from_config(config: &Config, session: Arc<SessionGate>) -> Result<Self> {
        let timeout = config.request_timeout_secs.map(Duration::from_secs);
        Self::with_timeout(&config.api_url(), session, timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionGate> {
        &self.session
    }

    pub fn tag_cache(&self) -> &TagCache {
        &self.tags
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `prefix` followed by one percent-encoded path segment.
    fn segment_url(&self, prefix: &str, segment: &str) -> Result<Url> {
        let mut url = Url::parse(&self.url(prefix))
            .with_context(|| format!("Invalid API URL: {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Invalid API URL: {}", self.base_url))?
            .push(segment);
        Ok(url)
    }

    fn request<U: IntoUrl>(&self, method: Method, url: U, auth: AuthMode) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match auth {
            AuthMode::Required => self.session.attach_credential(builder),
            AuthMode::None => builder,
        }
    }

    /// Send a request and turn any non-2xx status into an [`ApiError`].
    async fn send(&self, request: RequestBuilder, auth: AuthMode) -> Result<Response> {
        let response = request.send().await.map_err(ApiError::from)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if auth == AuthMode::Required && self.session.handle_unauthorized(status) {
            warn!(status = status.as_u16(), "Session ended by backend");
        }
        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "Request failed");
        Err(ApiError::from_status(status, &body).into())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        self.get_url(self.url(path), path, query).await
    }

    async fn get_url<T: DeserializeOwned, U: IntoUrl>(
        &self,
        url: U,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let request = self.request(Method::GET, url, AuthMode::Required).query(query);
        let response = self
            .send(request, AuthMode::Required)
            .await
            .with_context(|| format!("GET {} failed", path))?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", path))
    }

    async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        auth: AuthMode,
    ) -> Result<T> {
        let request = self.request(method.clone(), self.url(path), auth).json(body);
        let response = self
            .send(request, auth)
            .await
            .with_context(|| format!("{} {} failed", method, path))?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", path))
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<T> {
        self.send_json(Method::POST, path, body, AuthMode::Required).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<T> {
        self.send_json(Method::PUT, path, body, AuthMode::Required).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let request = self.request(Method::DELETE, self.url(path), AuthMode::Required);
        self.send(request, AuthMode::Required)
            .await
            .with_context(|| format!("DELETE {} failed", path))?;
        Ok(())
    }

    // ===== Auth =====

    /// Exchange credentials for a token. Nothing is persisted here.
    pub async fn login(&self, login: &str, senha: &str) -> Result<LoginResponse, AuthError> {
        info!(login = login, url = %self.url(LOGIN_PATH), "Attempting login");
        let request = self
            .request(Method::POST, self.url(LOGIN_PATH), AuthMode::None)
            .json(&LoginRequest { login, senha });
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Login rejected");
            return Err(AuthError::rejected(status, &body));
        }

        let login_response: LoginResponse = response.json().await?;
        if login_response.token.trim().is_empty() {
            return Err(AuthError::InvalidResponse("empty token".to_string()));
        }
        Ok(login_response)
    }

    /// Self-registration. Sent without a credential.
    pub async fn register(&self, novo: &NovoUsuario) -> Result<Usuario> {
        novo.validate().map_err(ApiError::from)?;
        self.send_json(Method::POST, USUARIOS_PATH, novo, AuthMode::None)
            .await
    }

    // ===== Tarefas =====

    pub async fn list_tarefas(&self, filter: &TarefaFilter) -> Result<Vec<Tarefa>> {
        self.get(TAREFAS_PATH, &filter.to_query()).await
    }

    pub async fn search_tarefas(&self, keyword: &str) -> Result<Vec<Tarefa>> {
        let path = format!("{}/pesquisar", TAREFAS_PATH);
        self.get(&path, &[("keyword", keyword.trim().to_string())]).await
    }

    pub async fn get_tarefa(&self, id: i64) -> Result<Tarefa> {
        self.get(&format!("{}/{}", TAREFAS_PATH, id), &[]).await
    }

    pub async fn create_tarefa(&self, nova: &NovaTarefa) -> Result<Tarefa> {
        nova.validate().map_err(ApiError::from)?;
        self.post(TAREFAS_PATH, nova).await
    }

    pub async fn update_tarefa(&self, id: i64, update: &TarefaUpdate) -> Result<Tarefa> {
        update.validate().map_err(ApiError::from)?;
        self.put(&format!("{}/{}", TAREFAS_PATH, id), update).await
    }

    pub async fn delete_tarefa(&self, id: i64) -> Result<()> {
        self.delete(&format!("{}/{}", TAREFAS_PATH, id)).await
    }

    pub async fn tarefa_stats(&self) -> Result<TarefaStats> {
        self.get(&format!("{}/stats", TAREFAS_PATH), &[]).await
    }

    // ===== Usuarios =====

    pub async fn list_usuarios(&self, q: Option<&str>) -> Result<Vec<Usuario>> {
        self.get(USUARIOS_PATH, &search_query(q)).await
    }

    pub async fn get_usuario(&self, id: i64) -> Result<Usuario> {
        self.get(&format!("{}/{}", USUARIOS_PATH, id), &[]).await
    }

    pub async fn get_usuario_by_login(&self, login: &str) -> Result<Usuario> {
        let prefix = format!("{}/login", USUARIOS_PATH);
        let url = self.segment_url(&prefix, login)?;
        let path = url.path().to_string();
        self.get_url(url, &path, &[]).await
    }

    pub async fn create_usuario(&self, novo: &NovoUsuario) -> Result<Usuario> {
        novo.validate().map_err(ApiError::from)?;
        self.post(USUARIOS_PATH, novo).await
    }

    pub async fn update_usuario(&self, id: i64, update: &UsuarioUpdate) -> Result<Usuario> {
        update.validate().map_err(ApiError::from)?;
        self.put(&format!("{}/{}", USUARIOS_PATH, id), update).await
    }

    pub async fn delete_usuario(&self, id: i64) -> Result<()> {
        self.delete(&format!("{}/{}", USUARIOS_PATH, id)).await
    }

    // ===== Tags =====

    pub async fn list_tags(&self, q: Option<&str>) -> Result<Vec<Tag>> {
        self.get(TAGS_PATH, &search_query(q)).await
    }

    pub async fn get_tag(&self, id: i64) -> Result<Tag> {
        self.get(&format!("{}/{}", TAGS_PATH, id), &[]).await
    }

    pub async fn get_tag_by_name(&self, nome: &str) -> Result<Tag> {
        let prefix = format!("{}/nome", TAGS_PATH);
        let url = self.segment_url(&prefix, nome)?;
        let path = url.path().to_string();
        self.get_url(url, &path, &[]).await
    }

    pub async fn create_tag(&self, nova: &NovaTag) -> Result<Tag> {
        nova.validate().map_err(ApiError::from)?;
        let tag = self.post(TAGS_PATH, nova).await?;
        self.tags.invalidate().await;
        Ok(tag)
    }

    pub async fn update_tag(&self, id: i64, nova: &NovaTag) -> Result<Tag> {
        nova.validate().map_err(ApiError::from)?;
        let tag = self.put(&format!("{}/{}", TAGS_PATH, id), nova).await?;
        self.tags.invalidate().await;
        Ok(tag)
    }

    pub async fn delete_tag(&self, id: i64) -> Result<()> {
        self.delete(&format!("{}/{}", TAGS_PATH, id)).await?;
        self.tags.invalidate().await;
        Ok(())
    }

    /// All tags, served from the tag cache when it is fresh.
    pub async fn tags(&self) -> Result<Vec<Tag>> {
        self.tags.get_or_fetch(|| self.list_tags(None)).await
    }

    pub async fn find_tag_by_name(&self, nome: &str) -> Result<Option<Tag>> {
        let tags = self.tags().await?;
        Ok(cache::find_by_name(&tags, nome).cloned())
    }

    pub async fn tag_color(&self, nome: &str) -> Result<String> {
        let tags = self.tags().await?;
        Ok(cache::color_of(&tags, nome))
    }

    pub async fn tags_by_names(&self, names: &[String]) -> Result<Vec<Tag>> {
        let tags = self.tags().await?;
        Ok(cache::by_names(&tags, names))
    }

    // ===== Comentarios =====

    pub async fn list_comentarios(&self, tarefa_id: i64) -> Result<Vec<Comentario>> {
        self.get(&comentarios_path(tarefa_id), &[]).await
    }

    pub async fn add_comentario(&self, tarefa_id: i64, texto: &str) -> Result<Comentario> {
        let novo = NovoComentario {
            texto: texto.trim().to_string(),
        };
        novo.validate().map_err(ApiError::from)?;
        self.post(&comentarios_path(tarefa_id), &novo).await
    }

    pub async fn delete_comentario(&self, tarefa_id: i64, comentario_id: i64) -> Result<()> {
        self.delete(&format!("{}/{}", comentarios_path(tarefa_id), comentario_id))
            .await
    }

    // ===== Anexos =====

    pub async fn list_anexos(&self, tarefa_id: i64) -> Result<Vec<Anexo>> {
        self.get(&anexos_path(tarefa_id), &[]).await
    }

    pub async fn get_anexo(&self, tarefa_id: i64, anexo_id: i64) -> Result<Anexo> {
        self.get(&format!("{}/{}", anexos_path(tarefa_id), anexo_id), &[])
            .await
    }

    pub async fn upload_anexo(
        &self,
        tarefa_id: i64,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Anexo> {
        if bytes.is_empty() {
            return Err(ApiError::BadRequest(format!("{} está vazio", file_name)).into());
        }
        let path = anexos_path(tarefa_id);
        let part = multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = multipart::Form::new().part(UPLOAD_FIELD, part);
        let request = self
            .request(Method::POST, self.url(&path), AuthMode::Required)
            .multipart(form);
        let response = self
            .send(request, AuthMode::Required)
            .await
            .with_context(|| format!("Upload of {} failed", file_name))?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", path))
    }

    pub async fn download_anexo(&self, tarefa_id: i64, anexo_id: i64) -> Result<Vec<u8>> {
        let path = format!("{}/{}/download", anexos_path(tarefa_id), anexo_id);
        let request = self.request(Method::GET, self.url(&path), AuthMode::Required);
        let response = self
            .send(request, AuthMode::Required)
            .await
            .with_context(|| format!("GET {} failed", path))?;
        let bytes = response
            .bytes()
            .await
            .context("Failed to read attachment body")?;
        Ok(bytes.to_vec())
    }

    pub async fn delete_anexo(&self, tarefa_id: i64, anexo_id: i64) -> Result<()> {
        self.delete(&format!("{}/{}", anexos_path(tarefa_id), anexo_id))
            .await
    }

    // ===== Subtarefas =====

    pub async fn list_subtarefas(&self, tarefa_id: i64) -> Result<Vec<Subtarefa>> {
        self.get(&subtarefas_path(tarefa_id), &[]).await
    }

    pub async fn create_subtarefa(&self, nova: &NovaSubtarefa) -> Result<Subtarefa> {
        nova.validate().map_err(ApiError::from)?;
        self.post(&subtarefas_path(nova.tarefa_principal_id), nova)
            .await
    }

    pub async fn update_subtarefa(
        &self,
        tarefa_id: i64,
        subtarefa_id: i64,
        update: &SubtarefaUpdate,
    ) -> Result<Subtarefa> {
        update.validate().map_err(ApiError::from)?;
        self.put(
            &format!("{}/{}", subtarefas_path(tarefa_id), subtarefa_id),
            update,
        )
        .await
    }

    pub async fn delete_subtarefa(&self, tarefa_id: i64, subtarefa_id: i64) -> Result<()> {
        self.delete(&format!("{}/{}", subtarefas_path(tarefa_id), subtarefa_id))
            .await
    }
}

fn search_query(q: Option<&str>) -> Vec<(&'static str, String)> {
    q.map(str::trim)
        .filter(|q| !q.is_empty())
        .map(|q| vec![("q", q.to_string())])
        .unwrap_or_default()
}

fn comentarios_path(tarefa_id: i64) -> String {
    format!("{}/{}/comentarios", TAREFAS_PATH, tarefa_id)
}

fn anexos_path(tarefa_id: i64) -> String {
    format!("{}/{}/anexos", TAREFAS_PATH, tarefa_id)
}

fn subtarefas_path(tarefa_id: i64) -> String {
    format!("{}/{}/subtarefas", TAREFAS_PATH, tarefa_id)
}

// ============================================================================
// Tests
// ============================================================================
