use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical process number: the CNJ mask plus the digits-only query form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedId {
    pub masked: String,
    pub digits: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Pending,
    Ready,
    NotFound,
    Error,
}

/// Summary fields resolved during preview for one process number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessSummary {
    pub classe: Option<String>,
    pub orgao_julgador: Option<String>,
    pub data_ajuizamento: Option<DateTime<Utc>>,
    pub tribunal: Option<String>,
    pub grau: Option<String>,
    pub assuntos: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub codigo: Option<i64>,
    pub nome: Option<String>,
    pub data_hora: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub codigo: Option<i64>,
    pub nome: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub nome: Option<String>,
    pub polo: Option<String>,
    pub tipo_pessoa: Option<String>,
}

/// Full payload persisted at import time: summary plus nested rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessDetail {
    pub summary: ProcessSummary,
    pub movimentos: Vec<Movement>,
    pub assuntos: Vec<Subject>,
    pub partes: Vec<Party>,
}

/// One line of input, from raw identifier to resolution status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportItem {
    pub raw: String,
    pub normalized: Option<NormalizedId>,
    pub status: ItemStatus,
    pub summary: Option<ProcessSummary>,
    pub message: Option<String>,
}

impl ImportItem {
    pub fn pending(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            normalized: None,
            status: ItemStatus::Pending,
            summary: None,
            message: None,
        }
    }

    pub fn ready(raw: impl Into<String>, normalized: NormalizedId, summary: ProcessSummary) -> Self {
        Self {
            raw: raw.into(),
            normalized: Some(normalized),
            status: ItemStatus::Ready,
            summary: Some(summary),
            message: None,
        }
    }

    pub fn not_found(
        raw: impl Into<String>,
        normalized: NormalizedId,
        message: impl Into<String>,
    ) -> Self {
        Self {
            raw: raw.into(),
            normalized: Some(normalized),
            status: ItemStatus::NotFound,
            summary: None,
            message: Some(message.into()),
        }
    }

    pub fn error(
        raw: impl Into<String>,
        normalized: Option<NormalizedId>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            raw: raw.into(),
            normalized,
            status: ItemStatus::Error,
            summary: None,
            message: Some(message.into()),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == ItemStatus::Ready
    }
}

/// Aggregate counters reported when an import run finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub imported: usize,
    pub already_imported: usize,
}

/// Row shape returned by the backend for an existing process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedProcess {
    pub id: i64,
    pub numero_digits: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyExists,
}
