use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::validation::{self, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PerfilUsuario {
    #[serde(rename = "ADMINISTRADOR_GESTOR")]
    AdministradorGestor,
    #[serde(rename = "USUARIO_PADRAO")]
    UsuarioPadrao,
    #[serde(other)]
    Desconhecido,
}

impl PerfilUsuario {
    pub fn label(&self) -> &'static str {
        match self {
            PerfilUsuario::AdministradorGestor => "Administrador/Gestor",
            PerfilUsuario::UsuarioPadrao => "Usuário Padrão",
            PerfilUsuario::Desconhecido => "Desconhecido",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, PerfilUsuario::AdministradorGestor)
    }
}

impl fmt::Display for PerfilUsuario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PerfilUsuario {
    type Err = String;

    /// Accepts the API value, the label, or the short forms `admin` / `padrao`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        match wanted.as_str() {
            "administrador_gestor" | "administrador/gestor" | "admin" => {
                Ok(PerfilUsuario::AdministradorGestor)
            }
            "usuario_padrao" | "usuário padrão" | "padrao" => Ok(PerfilUsuario::UsuarioPadrao),
            _ => Err(format!("Perfil desconhecido: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usuario {
    pub id: i64,
    pub nome: String,
    pub login: String,
    pub email: Option<String>,
    pub perfil: Option<PerfilUsuario>,
    pub cargo: Option<String>,
    pub telefone: Option<String>,
    pub departamento: Option<String>,
    #[serde(default)]
    pub ativo: bool,
    #[serde(rename = "dataCriacao")]
    pub data_criacao: Option<NaiveDateTime>,
    #[serde(rename = "dataAtualizacao")]
    pub data_atualizacao: Option<NaiveDateTime>,
    pub tema: Option<String>,
    pub idioma: Option<String>,
    #[serde(rename = "fusoHorario")]
    pub fuso_horario: Option<String>,
    #[serde(rename = "formatoData")]
    pub formato_data: Option<String>,
    #[serde(rename = "formatoHora")]
    pub formato_hora: Option<String>,
}

/// Payload for `POST /api/usuarios`, also used by self-registration.
#[derive(Debug, Clone, Serialize)]
pub struct NovoUsuario {
    pub nome: String,
    pub login: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub senha: String,
    pub perfil: PerfilUsuario,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cargo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departamento: Option<String>,
}

impl NovoUsuario {
    /// Minimal self-registration payload with the default profile.
    pub fn registration(nome: &str, login: &str, senha: &str) -> Self {
        Self {
            nome: nome.to_string(),
            login: login.to_string(),
            email: None,
            senha: senha.to_string(),
            perfil: PerfilUsuario::UsuarioPadrao,
            cargo: None,
            telefone: None,
            departamento: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::required("nome", &self.nome, "O nome do usuário é obrigatório.")?;
        validate_nome(&self.nome)?;
        validation::required("login", &self.login, "O login do usuário é obrigatório.")?;
        validate_login(&self.login)?;
        validation::required("senha", &self.senha, "A senha é obrigatória.")?;
        validate_senha(&self.senha)?;
        validate_optional_fields(
            self.email.as_deref(),
            self.cargo.as_deref(),
            self.telefone.as_deref(),
            self.departamento.as_deref(),
        )
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UsuarioUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub senha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perfil: Option<PerfilUsuario>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cargo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departamento: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ativo: Option<bool>,
}

impl UsuarioUpdate {
    pub fn is_empty(&self) -> bool {
        self.nome.is_none()
            && self.login.is_none()
            && self.email.is_none()
            && self.senha.is_none()
            && self.perfil.is_none()
            && self.cargo.is_none()
            && self.telefone.is_none()
            && self.departamento.is_none()
            && self.ativo.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(ref nome) = self.nome {
            validate_nome(nome)?;
        }
        if let Some(ref login) = self.login {
            validate_login(login)?;
        }
        if let Some(ref senha) = self.senha {
            validate_senha(senha)?;
        }
        validate_optional_fields(
            self.email.as_deref(),
            self.cargo.as_deref(),
            self.telefone.as_deref(),
            self.departamento.as_deref(),
        )
    }
}

fn validate_nome(nome: &str) -> Result<(), ValidationError> {
    validation::length(
        "nome",
        nome,
        3,
        100,
        "O nome do usuário deve ter entre 3 e 100 caracteres.",
    )
}

fn validate_login(login: &str) -> Result<(), ValidationError> {
    validation::length(
        "login",
        login,
        3,
        50,
        "O login do usuário deve ter entre 3 e 50 caracteres.",
    )
}

fn validate_senha(senha: &str) -> Result<(), ValidationError> {
    if senha.chars().count() < 6 {
        return Err(ValidationError::new(
            "senha",
            "A senha deve ter no mínimo 6 caracteres.",
        ));
    }
    Ok(())
}

fn validate_optional_fields(
    email: Option<&str>,
    cargo: Option<&str>,
    telefone: Option<&str>,
    departamento: Option<&str>,
) -> Result<(), ValidationError> {
    if let Some(email) = email {
        validation::email("email", email)?;
        validation::length("email", email, 0, 100, "O email deve ter no máximo 100 caracteres.")?;
    }
    if let Some(cargo) = cargo {
        validation::length("cargo", cargo, 0, 100, "O cargo deve ter no máximo 100 caracteres.")?;
    }
    if let Some(telefone) = telefone {
        validation::length(
            "telefone",
            telefone,
            10,
            20,
            "O telefone deve ter entre 10 e 20 caracteres.",
        )?;
    }
    if let Some(departamento) = departamento {
        validation::length(
            "departamento",
            departamento,
            0,
            100,
            "O departamento deve ter no máximo 100 caracteres.",
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_usuario() {
        let json = r#"{"id":3,"nome":"Ana Souza","login":"ana","perfil":"ADMINISTRADOR_GESTOR",
            "dataCriacao":"2024-01-02T03:04:05","ativo":true,"tema":"escuro","idioma":"pt-BR"}"#;
        let usuario: Usuario = serde_json::from_str(json).unwrap();
        assert_eq!(usuario.perfil, Some(PerfilUsuario::AdministradorGestor));
        assert!(usuario.perfil.unwrap().is_admin());
        assert!(usuario.ativo);
        assert_eq!(usuario.email, None);
    }

    #[test]
    fn test_unknown_profile() {
        let perfil: PerfilUsuario = serde_json::from_str("\"SUPERVISOR\"").unwrap();
        assert_eq!(perfil, PerfilUsuario::Desconhecido);
    }

    #[test]
    fn test_perfil_from_str() {
        assert_eq!("admin".parse(), Ok(PerfilUsuario::AdministradorGestor));
        assert_eq!("USUARIO_PADRAO".parse(), Ok(PerfilUsuario::UsuarioPadrao));
        assert_eq!("Usuário Padrão".parse(), Ok(PerfilUsuario::UsuarioPadrao));
        assert!("desconhecido".parse::<PerfilUsuario>().is_err());
    }

    #[test]
    fn test_registration_payload() {
        let novo = NovoUsuario::registration("João Silva", "joao", "segredo1");
        assert!(novo.validate().is_ok());
        let body = serde_json::to_value(&novo).unwrap();
        assert_eq!(body["perfil"], "USUARIO_PADRAO");
        assert!(body.get("email").is_none());
    }

    #[test]
    fn test_novo_usuario_validation() {
        let mut novo = NovoUsuario::registration("Jo", "joao", "segredo1");
        assert_eq!(novo.validate().unwrap_err().field, "nome");

        novo.nome = "João".into();
        novo.senha = "123".into();
        assert_eq!(
            novo.validate().unwrap_err().message,
            "A senha deve ter no mínimo 6 caracteres."
        );

        novo.senha = "123456".into();
        novo.email = Some("joao.example.com".into());
        assert_eq!(novo.validate().unwrap_err().field, "email");

        novo.email = Some("joao@example.com".into());
        novo.telefone = Some("1234".into());
        assert_eq!(novo.validate().unwrap_err().field, "telefone");
    }

    #[test]
    fn test_update_validation() {
        assert!(UsuarioUpdate::default().validate().is_ok());
        let update = UsuarioUpdate {
            login: Some("ab".into()),
            ..Default::default()
        };
        assert_eq!(update.validate().unwrap_err().field, "login");
    }
}
