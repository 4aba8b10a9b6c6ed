use crate::domain::model::{Movement, Party, ProcessDetail, ProcessSummary, Subject};
use crate::domain::ports::{ConfigProvider, ProcessLookup};
use crate::utils::error::{ImportError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Client for the external judicial-data search API.
///
/// One POST per process number against a fixed search endpoint, matching on
/// the digits-only query form; the response is an Elasticsearch-shaped
/// envelope and only the first hit is used. Stateless, no batching, no
/// automatic retries.
#[derive(Clone)]
pub struct DatajudClient {
    client: Client,
    search_url: String,
    tribunal: String,
    api_key: Option<String>,
    size: usize,
}

impl DatajudClient {
    pub fn new(config: &impl ConfigProvider) -> Self {
        Self::from_parts(
            config.search_url(),
            config.tribunal(),
            config.lookup_api_key(),
            config.hit_size(),
        )
    }

    pub fn from_parts(
        search_url: &str,
        tribunal: &str,
        api_key: Option<&str>,
        size: usize,
    ) -> Self {
        Self {
            client: Client::new(),
            search_url: search_url.to_string(),
            tribunal: tribunal.to_string(),
            api_key: api_key.map(ToString::to_string),
            size,
        }
    }

    /// A non-success status and an empty hit list both come back as
    /// `Ok(None)`; only transport and decoding failures are errors.
    async fn search(&self, digits: &str) -> Result<Option<HitSource>> {
        let body = SearchRequest {
            endpoint: &self.tribunal,
            query: Query {
                match_: Match {
                    numero_processo: digits,
                },
            },
            size: self.size,
        };

        let mut request = self.client.post(&self.search_url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.header(reqwest::header::AUTHORIZATION, format!("APIKey {}", key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| ImportError::LookupFailed {
                message: format!("search request failed: {}", e),
            })?;

        if !response.status().is_success() {
            tracing::debug!("search returned {} for {}", response.status(), digits);
            return Ok(None);
        }

        let envelope: SearchResponse =
            response
                .json()
                .await
                .map_err(|e| ImportError::LookupFailed {
                    message: format!("malformed search response: {}", e),
                })?;

        Ok(envelope
            .hits
            .map(|h| h.hits)
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(|hit| hit.source))
    }
}

#[async_trait]
impl ProcessLookup for DatajudClient {
    async fn fetch_summary(&self, digits: &str) -> Result<Option<ProcessSummary>> {
        Ok(self.search(digits).await?.map(HitSource::into_summary))
    }

    async fn fetch_detail(&self, digits: &str) -> Result<Option<ProcessDetail>> {
        Ok(self.search(digits).await?.map(HitSource::into_detail))
    }
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    endpoint: &'a str,
    query: Query<'a>,
    size: usize,
}

#[derive(Serialize)]
struct Query<'a> {
    #[serde(rename = "match")]
    match_: Match<'a>,
}

#[derive(Serialize)]
struct Match<'a> {
    #[serde(rename = "numeroProcesso")]
    numero_processo: &'a str,
}

#[derive(Deserialize)]
struct SearchResponse {
    hits: Option<HitsEnvelope>,
}

#[derive(Deserialize)]
struct HitsEnvelope {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: HitSource,
}

/// The court API's nested metadata, with every field optional; callers
/// decide the fallback at each access point instead of trusting the shape.
#[derive(Deserialize, Default)]
struct HitSource {
    classe: Option<Named>,
    #[serde(rename = "orgaoJulgador")]
    orgao_julgador: Option<Named>,
    #[serde(rename = "dataAjuizamento")]
    data_ajuizamento: Option<DateTime<Utc>>,
    tribunal: Option<String>,
    grau: Option<String>,
    #[serde(default)]
    assuntos: Vec<Coded>,
    #[serde(default)]
    movimentos: Vec<RawMovement>,
    #[serde(default)]
    partes: Vec<RawParty>,
}

#[derive(Deserialize, Default)]
struct Named {
    nome: Option<String>,
}

#[derive(Deserialize)]
struct Coded {
    codigo: Option<i64>,
    nome: Option<String>,
}

#[derive(Deserialize)]
struct RawMovement {
    codigo: Option<i64>,
    nome: Option<String>,
    #[serde(rename = "dataHora")]
    data_hora: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct RawParty {
    nome: Option<String>,
    polo: Option<String>,
    #[serde(rename = "tipoPessoa")]
    tipo_pessoa: Option<String>,
}

impl HitSource {
    fn summary_fields(&self) -> ProcessSummary {
        ProcessSummary {
            classe: self.classe.as_ref().and_then(|c| c.nome.clone()),
            orgao_julgador: self.orgao_julgador.as_ref().and_then(|o| o.nome.clone()),
            data_ajuizamento: self.data_ajuizamento,
            tribunal: self.tribunal.clone(),
            grau: self.grau.clone(),
            assuntos: self
                .assuntos
                .iter()
                .filter_map(|a| a.nome.clone())
                .collect(),
        }
    }

    fn into_summary(self) -> ProcessSummary {
        self.summary_fields()
    }

    fn into_detail(self) -> ProcessDetail {
        let summary = self.summary_fields();
        ProcessDetail {
            summary,
            movimentos: self
                .movimentos
                .into_iter()
                .map(|m| Movement {
                    codigo: m.codigo,
                    nome: m.nome,
                    data_hora: m.data_hora,
                })
                .collect(),
            assuntos: self
                .assuntos
                .into_iter()
                .map(|a| Subject {
                    codigo: a.codigo,
                    nome: a.nome,
                })
                .collect(),
            partes: self
                .partes
                .into_iter()
                .map(|p| Party {
                    nome: p.nome,
                    polo: p.polo,
                    tipo_pessoa: p.tipo_pessoa,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    const DIGITS: &str = "12345678920208272729";

    fn client(server: &MockServer) -> DatajudClient {
        DatajudClient::from_parts(&server.url("/search"), "api_publica_tjto", None, 1)
    }

    fn hit_body() -> serde_json::Value {
        serde_json::json!({
            "hits": {
                "hits": [{
                    "_source": {
                        "numeroProcesso": DIGITS,
                        "classe": {"codigo": 7, "nome": "Procedimento Comum Cível"},
                        "orgaoJulgador": {"nome": "2ª Vara Cível de Palmas"},
                        "dataAjuizamento": "2020-06-15T00:00:00.000Z",
                        "tribunal": "TJTO",
                        "grau": "G1",
                        "assuntos": [{"codigo": 1234, "nome": "Obrigações"}],
                        "movimentos": [
                            {"codigo": 26, "nome": "Distribuição", "dataHora": "2020-06-15T10:30:00.000Z"}
                        ],
                        "partes": [
                            {"nome": "Fulano de Tal", "polo": "AT", "tipoPessoa": "fisica"}
                        ]
                    }
                }]
            }
        })
    }

    #[tokio::test]
    async fn test_fetch_summary_maps_first_hit() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/search").json_body_partial(
                r#"{"endpoint": "api_publica_tjto", "query": {"match": {"numeroProcesso": "12345678920208272729"}}, "size": 1}"#,
            );
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(hit_body());
        });

        let summary = client(&server)
            .fetch_summary(DIGITS)
            .await
            .unwrap()
            .unwrap();

        mock.assert();
        assert_eq!(summary.classe.as_deref(), Some("Procedimento Comum Cível"));
        assert_eq!(
            summary.orgao_julgador.as_deref(),
            Some("2ª Vara Cível de Palmas")
        );
        assert_eq!(summary.tribunal.as_deref(), Some("TJTO"));
        assert_eq!(summary.grau.as_deref(), Some("G1"));
        assert_eq!(summary.assuntos, vec!["Obrigações"]);
    }

    #[tokio::test]
    async fn test_fetch_detail_includes_nested_rows() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/search");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(hit_body());
        });

        let detail = client(&server).fetch_detail(DIGITS).await.unwrap().unwrap();
        assert_eq!(detail.movimentos.len(), 1);
        assert_eq!(detail.movimentos[0].codigo, Some(26));
        assert_eq!(detail.assuntos.len(), 1);
        assert_eq!(detail.partes.len(), 1);
        assert_eq!(detail.partes[0].polo.as_deref(), Some("AT"));
    }

    #[tokio::test]
    async fn test_empty_hits_is_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/search");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"hits": {"hits": []}}));
        });

        let summary = client(&server).fetch_summary(DIGITS).await.unwrap();
        assert!(summary.is_none());
    }

    #[tokio::test]
    async fn test_http_failure_is_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/search");
            then.status(502);
        });

        let summary = client(&server).fetch_summary(DIGITS).await.unwrap();
        assert!(summary.is_none());
    }

    #[tokio::test]
    async fn test_malformed_body_is_transient_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/search");
            then.status(200)
                .header("Content-Type", "application/json")
                .body("not json at all");
        });

        let err = client(&server).fetch_summary(DIGITS).await.unwrap_err();
        assert!(matches!(err, ImportError::LookupFailed { .. }));
    }

    #[tokio::test]
    async fn test_missing_nested_fields_become_absent() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/search");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "hits": {"hits": [{"_source": {"numeroProcesso": DIGITS}}]}
                }));
        });

        let summary = client(&server).fetch_summary(DIGITS).await.unwrap().unwrap();
        assert!(summary.classe.is_none());
        assert!(summary.data_ajuizamento.is_none());
        assert!(summary.assuntos.is_empty());
    }

    #[tokio::test]
    async fn test_api_key_header_is_sent() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/search")
                .header("Authorization", "APIKey secret-key");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"hits": {"hits": []}}));
        });

        let client = DatajudClient::from_parts(
            &server.url("/search"),
            "api_publica_tjto",
            Some("secret-key"),
            1,
        );
        client.fetch_summary(DIGITS).await.unwrap();
        mock.assert();
    }
}
