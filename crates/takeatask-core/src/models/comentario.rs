use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::validation::{self, ValidationError};
use crate::utils::initials;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comentario {
    pub id: i64,
    pub texto: String,
    #[serde(rename = "tarefaId")]
    pub tarefa_id: Option<i64>,
    #[serde(rename = "autorId")]
    pub autor_id: Option<i64>,
    #[serde(rename = "nomeAutor")]
    pub nome_autor: Option<String>,
    #[serde(rename = "dataCriacao")]
    pub data_criacao: Option<NaiveDateTime>,
    #[serde(rename = "dataAtualizacao")]
    pub data_atualizacao: Option<NaiveDateTime>,
}

impl Comentario {
    pub fn author_initials(&self) -> String {
        initials(self.nome_autor.as_deref().unwrap_or(""))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NovoComentario {
    pub texto: String,
}

impl NovoComentario {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::required("texto", &self.texto, "O texto do comentário é obrigatório.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_comentario() {
        let json = r#"{"id":9,"texto":"Feito!","tarefaId":7,"autorId":2,"nomeAutor":"Maria Clara Lima",
            "dataCriacao":"2024-05-02T10:00:00","dataAtualizacao":null}"#;
        let c: Comentario = serde_json::from_str(json).unwrap();
        assert_eq!(c.tarefa_id, Some(7));
        assert_eq!(c.author_initials(), "ML");
    }

    #[test]
    fn test_missing_author_initials() {
        let c: Comentario = serde_json::from_str(r#"{"id":1,"texto":"oi"}"#).unwrap();
        assert_eq!(c.author_initials(), "??");
    }

    #[test]
    fn test_blank_comment_rejected() {
        assert!(NovoComentario { texto: " \n".into() }.validate().is_err());
        assert!(NovoComentario { texto: "ok".into() }.validate().is_ok());
    }
}
