use crate::domain::model::{InsertOutcome, PersistedProcess, ProcessDetail};
use crate::domain::ports::{ConfigProvider, ProcessStore};
use crate::utils::error::{ImportError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Serialize;

/// Sentinel the backend returns when an insert races an existing record.
const PROCESS_EXISTS: &str = "PROCESS_EXISTS";

/// Process persistence over the backend's REST query façade.
///
/// Reads use filter/select/limit query parameters; writes go through the
/// typed insert endpoints, one table at a time. Each process row is inserted
/// first, then its nested movements, subjects and parties keyed by the
/// returned id.
#[derive(Clone)]
pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl RestStore {
    pub fn new(config: &impl ConfigProvider) -> Self {
        Self::from_parts(config.backend_url(), config.backend_api_key())
    }

    pub fn from_parts(base_url: &str, api_key: Option<&str>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(ToString::to_string),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.base_url, table)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("apikey", key),
            None => request,
        }
    }

    async fn insert_rows<T: Serialize>(&self, table: &str, rows: &[T]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let response = self
            .authorized(self.client.post(self.table_url(table)))
            .json(rows)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImportError::PersistenceFailure {
                message: format!("insert into {} failed with status {}: {}", table, status, body),
            });
        }
        Ok(())
    }

    async fn insert_children(&self, process_id: i64, detail: &ProcessDetail) -> Result<()> {
        let movements: Vec<MovementRow> = detail
            .movimentos
            .iter()
            .map(|m| MovementRow {
                process_id,
                codigo: m.codigo,
                nome: m.nome.as_deref(),
                data_hora: m.data_hora,
            })
            .collect();
        self.insert_rows("process_movements", &movements).await?;

        let subjects: Vec<SubjectRow> = detail
            .assuntos
            .iter()
            .map(|s| SubjectRow {
                process_id,
                codigo: s.codigo,
                nome: s.nome.as_deref(),
            })
            .collect();
        self.insert_rows("process_subjects", &subjects).await?;

        let parties: Vec<PartyRow> = detail
            .partes
            .iter()
            .map(|p| PartyRow {
                process_id,
                nome: p.nome.as_deref(),
                polo: p.polo.as_deref(),
                tipo_pessoa: p.tipo_pessoa.as_deref(),
            })
            .collect();
        self.insert_rows("process_parties", &parties).await
    }
}

#[async_trait]
impl ProcessStore for RestStore {
    async fn find_by_number(&self, digits: &str) -> Result<Option<PersistedProcess>> {
        let response = self
            .authorized(self.client.get(self.table_url("processes")))
            .query(&[
                ("numero_digits", format!("eq.{}", digits)),
                ("select", "id,numero_digits".to_string()),
                ("limit", "1".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImportError::PersistenceFailure {
                message: format!("existence check failed with status {}", status),
            });
        }

        let rows: Vec<PersistedProcess> = response.json().await?;
        Ok(rows.into_iter().next())
    }

    async fn insert(&self, digits: &str, detail: &ProcessDetail) -> Result<InsertOutcome> {
        let row = ProcessRow {
            numero: crate::core::normalize::format_mask(digits),
            numero_digits: digits,
            classe: detail.summary.classe.as_deref(),
            orgao_julgador: detail.summary.orgao_julgador.as_deref(),
            data_ajuizamento: detail.summary.data_ajuizamento,
            tribunal: detail.summary.tribunal.as_deref(),
            grau: detail.summary.grau.as_deref(),
        };

        let response = self
            .authorized(self.client.post(self.table_url("processes")))
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::CONFLICT {
            return Ok(InsertOutcome::AlreadyExists);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if body.contains(PROCESS_EXISTS) {
                return Ok(InsertOutcome::AlreadyExists);
            }
            return Err(ImportError::PersistenceFailure {
                message: format!("process insert failed with status {}: {}", status, body),
            });
        }

        let created: Vec<PersistedProcess> = response.json().await?;
        let process = created
            .into_iter()
            .next()
            .ok_or_else(|| ImportError::PersistenceFailure {
                message: "insert returned no representation".to_string(),
            })?;

        self.insert_children(process.id, detail).await?;
        Ok(InsertOutcome::Inserted)
    }
}

#[derive(Serialize)]
struct ProcessRow<'a> {
    numero: String,
    numero_digits: &'a str,
    classe: Option<&'a str>,
    orgao_julgador: Option<&'a str>,
    data_ajuizamento: Option<DateTime<Utc>>,
    tribunal: Option<&'a str>,
    grau: Option<&'a str>,
}

#[derive(Serialize)]
struct MovementRow<'a> {
    process_id: i64,
    codigo: Option<i64>,
    nome: Option<&'a str>,
    data_hora: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct SubjectRow<'a> {
    process_id: i64,
    codigo: Option<i64>,
    nome: Option<&'a str>,
}

#[derive(Serialize)]
struct PartyRow<'a> {
    process_id: i64,
    nome: Option<&'a str>,
    polo: Option<&'a str>,
    tipo_pessoa: Option<&'a str>,
}
