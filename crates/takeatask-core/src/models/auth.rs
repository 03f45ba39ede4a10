use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub login: &'a str,
    pub senha: &'a str,
}

/// Body of a successful `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub usuario: Option<UsuarioLogado>,
}

impl LoginResponse {
    /// Non-blank display name from the profile, if the backend sent one.
    pub fn display_name(&self) -> Option<&str> {
        self.usuario
            .as_ref()
            .and_then(|u| u.nome.as_deref())
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UsuarioLogado {
    pub id: Option<i64>,
    pub nome: Option<String>,
    pub email: Option<String>,
    pub perfil: Option<String>,
}
