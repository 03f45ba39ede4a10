//! Task models and the list filter.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::validation::{self, ValidationError};
use super::{Anexo, Comentario, Tag};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusTarefa {
    #[serde(rename = "A_FAZER")]
    AFazer,
    #[serde(rename = "EM_ANDAMENTO")]
    EmAndamento,
    #[serde(rename = "BLOQUEADA")]
    Bloqueada,
    #[serde(rename = "EM_REVISAO")]
    EmRevisao,
    #[serde(rename = "CONCLUIDA")]
    Concluida,
}

/// Badge colour family for a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTone {
    Neutral,
    Info,
    Warning,
    Success,
    Danger,
}

impl StatusTarefa {
    pub const ALL: [StatusTarefa; 5] = [
        StatusTarefa::AFazer,
        StatusTarefa::EmAndamento,
        StatusTarefa::Bloqueada,
        StatusTarefa::EmRevisao,
        StatusTarefa::Concluida,
    ];

    pub fn as_api_str(&self) -> &'static str {
        match self {
            StatusTarefa::AFazer => "A_FAZER",
            StatusTarefa::EmAndamento => "EM_ANDAMENTO",
            StatusTarefa::Bloqueada => "BLOQUEADA",
            StatusTarefa::EmRevisao => "EM_REVISAO",
            StatusTarefa::Concluida => "CONCLUIDA",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusTarefa::AFazer => "A Fazer",
            StatusTarefa::EmAndamento => "Em Andamento",
            StatusTarefa::Bloqueada => "Bloqueada",
            StatusTarefa::EmRevisao => "Em Revisão",
            StatusTarefa::Concluida => "Concluída",
        }
    }

    pub fn tone(&self) -> BadgeTone {
        match self {
            StatusTarefa::AFazer => BadgeTone::Warning,
            StatusTarefa::EmAndamento | StatusTarefa::EmRevisao => BadgeTone::Info,
            StatusTarefa::Bloqueada => BadgeTone::Danger,
            StatusTarefa::Concluida => BadgeTone::Success,
        }
    }
}

impl fmt::Display for StatusTarefa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StatusTarefa {
    type Err = String;

    /// Accepts the API value or the label, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        StatusTarefa::ALL
            .into_iter()
            .find(|st| {
                st.as_api_str().eq_ignore_ascii_case(wanted)
                    || st.label().to_lowercase() == wanted.to_lowercase()
            })
            .ok_or_else(|| format!("Status desconhecido: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrioridadeTarefa {
    Baixa,
    Media,
    Alta,
    Urgente,
}

impl PrioridadeTarefa {
    pub const ALL: [PrioridadeTarefa; 4] = [
        PrioridadeTarefa::Baixa,
        PrioridadeTarefa::Media,
        PrioridadeTarefa::Alta,
        PrioridadeTarefa::Urgente,
    ];

    pub fn as_api_str(&self) -> &'static str {
        match self {
            PrioridadeTarefa::Baixa => "BAIXA",
            PrioridadeTarefa::Media => "MEDIA",
            PrioridadeTarefa::Alta => "ALTA",
            PrioridadeTarefa::Urgente => "URGENTE",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PrioridadeTarefa::Baixa => "Baixa",
            PrioridadeTarefa::Media => "Média",
            PrioridadeTarefa::Alta => "Alta",
            PrioridadeTarefa::Urgente => "Urgente",
        }
    }

    pub fn tone(&self) -> BadgeTone {
        match self {
            PrioridadeTarefa::Baixa => BadgeTone::Neutral,
            PrioridadeTarefa::Media => BadgeTone::Info,
            PrioridadeTarefa::Alta => BadgeTone::Warning,
            PrioridadeTarefa::Urgente => BadgeTone::Danger,
        }
    }
}

impl fmt::Display for PrioridadeTarefa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PrioridadeTarefa {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        PrioridadeTarefa::ALL
            .into_iter()
            .find(|p| {
                p.as_api_str().eq_ignore_ascii_case(wanted)
                    || p.label().to_lowercase() == wanted.to_lowercase()
            })
            .ok_or_else(|| format!("Prioridade desconhecida: {}", s))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tarefa {
    pub id: i64,
    pub nome: String,
    pub descricao: Option<String>,
    pub status: StatusTarefa,
    pub prioridade: PrioridadeTarefa,
    #[serde(rename = "responsavelId")]
    pub responsavel_id: Option<i64>,
    #[serde(rename = "nomeResponsavel")]
    pub nome_responsavel: Option<String>,
    #[serde(rename = "criadorId")]
    pub criador_id: Option<i64>,
    #[serde(rename = "nomeCriador")]
    pub nome_criador: Option<String>,
    #[serde(rename = "dataCriacao")]
    pub data_criacao: Option<NaiveDateTime>,
    #[serde(rename = "dataAtualizacao")]
    pub data_atualizacao: Option<NaiveDateTime>,
    #[serde(rename = "dataPrazo")]
    pub data_prazo: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub tags: Vec<Tag>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub anexos: Vec<Anexo>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub comentarios: Vec<Comentario>,
}

impl Tarefa {
    /// Past its deadline and not done.
    pub fn is_overdue(&self, now: NaiveDateTime) -> bool {
        self.status != StatusTarefa::Concluida && self.data_prazo.is_some_and(|prazo| prazo < now)
    }

    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.nome.as_str()).collect()
    }

    pub fn responsavel_display(&self) -> &str {
        self.nome_responsavel.as_deref().unwrap_or("N/A")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NovaTarefa {
    pub nome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    pub status: StatusTarefa,
    pub prioridade: PrioridadeTarefa,
    #[serde(rename = "responsavelId", skip_serializing_if = "Option::is_none")]
    pub responsavel_id: Option<i64>,
    #[serde(rename = "dataPrazo", skip_serializing_if = "Option::is_none")]
    pub data_prazo: Option<NaiveDateTime>,
    /// Tag names; unknown names are created by the backend.
    pub tags: Vec<String>,
}

impl NovaTarefa {
    pub fn new(nome: impl Into<String>) -> Self {
        Self {
            nome: nome.into(),
            descricao: None,
            status: StatusTarefa::AFazer,
            prioridade: PrioridadeTarefa::Media,
            responsavel_id: None,
            data_prazo: None,
            tags: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::required("nome", &self.nome, "O nome da tarefa é obrigatório.")?;
        validation::length(
            "nome",
            &self.nome,
            3,
            150,
            "O nome da tarefa deve ter entre 3 e 150 caracteres.",
        )
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TarefaUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusTarefa>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prioridade: Option<PrioridadeTarefa>,
    #[serde(rename = "responsavelId", skip_serializing_if = "Option::is_none")]
    pub responsavel_id: Option<i64>,
    #[serde(rename = "dataPrazo", skip_serializing_if = "Option::is_none")]
    pub data_prazo: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl TarefaUpdate {
    /// Only a status change, as sent by the status picker.
    pub fn status(status: StatusTarefa) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nome.is_none()
            && self.descricao.is_none()
            && self.status.is_none()
            && self.prioridade.is_none()
            && self.responsavel_id.is_none()
            && self.data_prazo.is_none()
            && self.tags.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.nome {
            Some(ref nome) => validation::length(
                "nome",
                nome,
                3,
                150,
                "O nome da tarefa deve ter entre 3 e 150 caracteres.",
            ),
            None => Ok(()),
        }
    }
}

/// Dashboard counters from `GET /api/tarefas/stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TarefaStats {
    #[serde(rename = "totalTarefas")]
    pub total_tarefas: u64,
    #[serde(rename = "tarefasConcluidas")]
    pub tarefas_concluidas: u64,
    #[serde(rename = "tarefasEmAndamento")]
    pub tarefas_em_andamento: u64,
    #[serde(rename = "tarefasAtrasadas")]
    pub tarefas_atrasadas: u64,
}

impl TarefaStats {
    /// Share of finished tasks, rounded down; 0 when there are none.
    pub fn completion_percent(&self) -> u8 {
        if self.total_tarefas == 0 {
            return 0;
        }
        let pct = self.tarefas_concluidas.min(self.total_tarefas) * 100 / self.total_tarefas;
        pct as u8
    }
}

/// Scope of a task listing (`tipo` query parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TipoFiltro {
    Minhas,
    Equipe,
    #[default]
    Todas,
    Atrasadas,
}

impl TipoFiltro {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            TipoFiltro::Minhas => "minhas",
            TipoFiltro::Equipe => "equipe",
            TipoFiltro::Todas => "todas",
            TipoFiltro::Atrasadas => "atrasadas",
        }
    }
}

/// Query for `GET /api/tarefas`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TarefaFilter {
    pub tipo: TipoFiltro,
    pub status: Option<StatusTarefa>,
    pub prioridade: Option<PrioridadeTarefa>,
    pub responsavel_id: Option<i64>,
    pub tag_ids: Vec<i64>,
    pub q: Option<String>,
}

impl TarefaFilter {
    /// Filter for one of the task list tabs.
    pub fn from_tab(tab: &str) -> Option<Self> {
        let mut filter = Self::default();
        match tab {
            "minhas" => filter.tipo = TipoFiltro::Minhas,
            "equipe" => filter.tipo = TipoFiltro::Equipe,
            "todas" => filter.tipo = TipoFiltro::Todas,
            "atrasadas" => filter.tipo = TipoFiltro::Atrasadas,
            "pendentes" => filter.status = Some(StatusTarefa::AFazer),
            "andamento" => filter.status = Some(StatusTarefa::EmAndamento),
            "concluidas" => filter.status = Some(StatusTarefa::Concluida),
            _ => return None,
        }
        Some(filter)
    }

    pub fn with_query(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("tipo", self.tipo.as_api_str().to_string())];
        if let Some(status) = self.status {
            params.push(("status", status.as_api_str().to_string()));
        }
        if let Some(prioridade) = self.prioridade {
            params.push(("prioridade", prioridade.as_api_str().to_string()));
        }
        if let Some(id) = self.responsavel_id {
            params.push(("responsavelId", id.to_string()));
        }
        if !self.tag_ids.is_empty() {
            let ids: Vec<String> = self.tag_ids.iter().map(|id| id.to_string()).collect();
            params.push(("tagIds", ids.join(",")));
        }
        if let Some(q) = self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            params.push(("q", q.to_string()));
        }
        params
    }
}
