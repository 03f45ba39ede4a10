//! Data models for TAKE a TASK entities.
//!
//! These mirror the backend DTOs field for field (camelCase on the wire):
//!
//! - `Tarefa`, `NovaTarefa`, `TarefaUpdate`, `TarefaStats`, `TarefaFilter`
//! - `Usuario`, `NovoUsuario`, `UsuarioUpdate`, `PerfilUsuario`
//! - `Tag`, `NovaTag`
//! - `Comentario`, `Anexo`, `Subtarefa`
//! - `LoginRequest`, `LoginResponse`
//!
//! Payload types carry a `validate()` that runs before anything is sent.

pub mod anexo;
pub mod auth;
pub mod comentario;
pub mod subtarefa;
pub mod tag;
pub mod tarefa;
pub mod usuario;
pub mod validation;

pub use anexo::Anexo;
pub use auth::{LoginRequest, LoginResponse, UsuarioLogado};
pub use comentario::{Comentario, NovoComentario};
pub use subtarefa::{NovaSubtarefa, Subtarefa, SubtarefaUpdate};
pub use tag::{NovaTag, Tag, DEFAULT_TAG_COLOR};
pub use tarefa::{
    BadgeTone, NovaTarefa, PrioridadeTarefa, StatusTarefa, Tarefa, TarefaFilter, TarefaStats,
    TarefaUpdate, TipoFiltro,
};
pub use usuario::{NovoUsuario, PerfilUsuario, Usuario, UsuarioUpdate};
pub use validation::ValidationError;

use serde::{Deserialize, Deserializer};

/// Treat an explicit `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
