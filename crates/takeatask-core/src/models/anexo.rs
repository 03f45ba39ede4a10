use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::utils::format_file_size;

/// File attached to a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anexo {
    pub id: i64,
    #[serde(rename = "nomeArquivo")]
    pub nome_arquivo: String,
    #[serde(rename = "tipoArquivo")]
    pub tipo_arquivo: Option<String>,
    #[serde(rename = "tamanhoArquivo")]
    pub tamanho_arquivo: Option<u64>,
    #[serde(rename = "caminhoArquivo")]
    pub caminho_arquivo: Option<String>,
    #[serde(rename = "tarefaId")]
    pub tarefa_id: Option<i64>,
    #[serde(rename = "usuarioUploadId")]
    pub usuario_upload_id: Option<i64>,
    #[serde(rename = "nomeUsuarioUpload")]
    pub nome_usuario_upload: Option<String>,
    #[serde(rename = "dataUpload")]
    pub data_upload: Option<NaiveDateTime>,
}

impl Anexo {
    pub fn size_display(&self) -> String {
        match self.tamanho_arquivo {
            Some(bytes) => format_file_size(bytes),
            None => "-".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_anexo() {
        let json = r#"{"id":2,"nomeArquivo":"plano.pdf","tipoArquivo":"application/pdf",
            "tamanhoArquivo":1536,"caminhoArquivo":"uploads/plano.pdf","tarefaId":7,
            "usuarioUploadId":1,"nomeUsuarioUpload":"João","dataUpload":"2024-05-03T08:00:00"}"#;
        let anexo: Anexo = serde_json::from_str(json).unwrap();
        assert_eq!(anexo.nome_arquivo, "plano.pdf");
        assert_eq!(anexo.size_display(), "1.5 KB");
    }
}
