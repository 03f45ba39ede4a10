use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::validation::{self, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subtarefa {
    pub id: i64,
    pub descricao: String,
    #[serde(default)]
    pub concluida: bool,
    #[serde(rename = "tarefaPrincipalId")]
    pub tarefa_principal_id: Option<i64>,
    #[serde(rename = "responsavelId")]
    pub responsavel_id: Option<i64>,
    #[serde(rename = "nomeResponsavel")]
    pub nome_responsavel: Option<String>,
    #[serde(rename = "dataCriacao")]
    pub data_criacao: Option<NaiveDateTime>,
    #[serde(rename = "dataAtualizacao")]
    pub data_atualizacao: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NovaSubtarefa {
    pub descricao: String,
    #[serde(rename = "tarefaPrincipalId")]
    pub tarefa_principal_id: i64,
    #[serde(rename = "responsavelId", skip_serializing_if = "Option::is_none")]
    pub responsavel_id: Option<i64>,
}

impl NovaSubtarefa {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::required(
            "descricao",
            &self.descricao,
            "A descrição da subtarefa é obrigatória.",
        )?;
        validate_descricao(&self.descricao)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SubtarefaUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concluida: Option<bool>,
    #[serde(rename = "responsavelId", skip_serializing_if = "Option::is_none")]
    pub responsavel_id: Option<i64>,
}

impl SubtarefaUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.descricao {
            Some(ref d) => validate_descricao(d),
            None => Ok(()),
        }
    }
}

fn validate_descricao(descricao: &str) -> Result<(), ValidationError> {
    validation::length(
        "descricao",
        descricao,
        0,
        255,
        "A descrição da subtarefa deve ter no máximo 255 caracteres.",
    )
}

/// (done, total) over a task's subtasks.
pub fn progress(subtarefas: &[Subtarefa]) -> (usize, usize) {
    let done = subtarefas.iter().filter(|s| s.concluida).count();
    (done, subtarefas.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress() {
        let subs: Vec<Subtarefa> = serde_json::from_str(
            r#"[{"id":1,"descricao":"a","concluida":true},{"id":2,"descricao":"b","concluida":false},{"id":3,"descricao":"c"}]"#,
        )
        .unwrap();
        assert_eq!(progress(&subs), (1, 3));
        assert_eq!(progress(&[]), (0, 0));
    }

    #[test]
    fn test_validation() {
        let nova = NovaSubtarefa {
            descricao: "".into(),
            tarefa_principal_id: 1,
            responsavel_id: None,
        };
        assert!(nova.validate().is_err());

        let update = SubtarefaUpdate {
            descricao: Some("x".repeat(300)),
            ..Default::default()
        };
        assert!(update.validate().is_err());

        let done = SubtarefaUpdate {
            concluida: Some(true),
            ..Default::default()
        };
        assert!(done.validate().is_ok());
        assert_eq!(
            serde_json::to_value(&done).unwrap(),
            serde_json::json!({"concluida": true})
        );
    }
}
