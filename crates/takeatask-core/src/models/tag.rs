use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::validation::{self, ValidationError};

/// Colour used when a tag has none.
pub const DEFAULT_TAG_COLOR: &str = "#71717A";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub nome: String,
    pub cor: Option<String>,
    pub descricao: Option<String>,
    #[serde(rename = "dataCriacao", default)]
    pub data_criacao: Option<NaiveDateTime>,
}

impl Tag {
    pub fn color(&self) -> &str {
        self.cor
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_TAG_COLOR)
    }
}

/// Payload for creating or replacing a tag.
#[derive(Debug, Clone, Serialize)]
pub struct NovaTag {
    pub nome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
}

impl NovaTag {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::required("nome", &self.nome, "O nome da tag é obrigatório.")?;
        validation::length(
            "nome",
            &self.nome,
            2,
            50,
            "O nome da tag deve ter entre 2 e 50 caracteres.",
        )?;
        if let Some(ref cor) = self.cor {
            validation::hex_color("cor", cor)?;
        }
        if let Some(ref descricao) = self.descricao {
            validation::length(
                "descricao",
                descricao,
                0,
                255,
                "A descrição da tag deve ter no máximo 255 caracteres.",
            )?;
        }
        Ok(())
    }
}
