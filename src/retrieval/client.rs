use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::error::{RetrievalError, RetrievalResult};
use super::types::Snippet;

const QUERY_TIMEOUT: Duration = Duration::from_secs(60);
const RETRY_BACKOFF: Duration = Duration::from_secs(2);

#[derive(Serialize)]
struct RetrievalRequest<'a> {
    question: &'a str,
    dataset_ids: &'a [String],
    page: u32,
    page_size: u32,
}

/// HTTP client for a RAGFlow-style retrieval endpoint.
#[derive(Clone)]
pub struct HttpRetrievalClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpRetrievalClient {
    /// Creates a client for `base_url` authenticating with `api_key`.
    pub fn new(base_url: &str, api_key: &str) -> RetrievalResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(QUERY_TIMEOUT)
            .build()
            .map_err(|e| RetrievalError::ClientBuild {
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/v1/retrieval", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
        })
    }

    /// Sends one retrieval query. Connect and timeout failures are retried
    /// once after a short backoff; other failures surface immediately.
    pub async fn retrieve(
        &self,
        question: &str,
        dataset_ids: &[String],
        page: u32,
        page_size: u32,
    ) -> RetrievalResult<Vec<Snippet>> {
        let request = RetrievalRequest {
            question,
            dataset_ids,
            page,
            page_size,
        };

        let mut attempt = 0;
        let response = loop {
            attempt += 1;
            let result = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&request)
                .send()
                .await;
            match result {
                Ok(resp) => break resp,
                Err(e) if attempt == 1 && (e.is_connect() || e.is_timeout()) => {
                    warn!(error = %e, "retrieval request failed, retrying once");
                    tokio::time::sleep(RETRY_BACKOFF).await;
                }
                Err(e) => {
                    return Err(RetrievalError::Request {
                        url: self.endpoint.clone(),
                        message: e.to_string(),
                    });
                }
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(RetrievalError::Status {
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| RetrievalError::Malformed {
                message: e.to_string(),
            })?;

        let snippets = parse_envelope(&body)?;
        debug!(question, count = snippets.len(), "retrieval query completed");
        Ok(snippets)
    }
}

/// Unpacks the `{code: 0, data: {chunks: [...]}}` envelope. Chunk field
/// names vary across endpoint versions, so every field has a fallback
/// chain.
fn parse_envelope(body: &Value) -> RetrievalResult<Vec<Snippet>> {
    let code = body.get("code").and_then(Value::as_i64).unwrap_or(-1);
    if code != 0 {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        return Err(RetrievalError::Envelope { code, message });
    }

    let chunks = body
        .get("data")
        .and_then(|d| d.get("chunks"))
        .and_then(Value::as_array)
        .ok_or_else(|| RetrievalError::Malformed {
            message: "missing data.chunks".to_string(),
        })?;

    Ok(chunks.iter().map(parse_chunk).collect())
}

fn parse_chunk(chunk: &Value) -> Snippet {
    let content = ["content", "content_with_weight", "content_ltks"]
        .iter()
        .find_map(|k| chunk.get(*k).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string();

    let page = chunk
        .get("positions")
        .and_then(Value::as_array)
        .and_then(|p| p.first())
        .and_then(Value::as_array)
        .and_then(|p| p.first())
        .and_then(Value::as_u64)
        .or_else(|| chunk.get("page_num").and_then(Value::as_u64))
        .map(|p| p as u32);

    let score = chunk
        .get("similarity")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);

    let chunk_id = ["id", "chunk_id"]
        .iter()
        .find_map(|k| chunk.get(*k).and_then(Value::as_str))
        .map(str::to_string);

    let doc_name = ["document_keyword", "docnm_kwd"]
        .iter()
        .find_map(|k| chunk.get(*k).and_then(Value::as_str))
        .map(str::to_string);

    Snippet {
        content,
        score,
        page,
        chunk_id,
        doc_name,
    }
}

/// Minimal async interface used by the compliance engine.
pub trait RetrievalClient: Send + Sync {
    /// Runs one retrieval query against the given datasets.
    fn retrieve(
        &self,
        question: &str,
        dataset_ids: &[String],
        page: u32,
        page_size: u32,
    ) -> impl std::future::Future<Output = RetrievalResult<Vec<Snippet>>> + Send;
}

impl RetrievalClient for HttpRetrievalClient {
    async fn retrieve(
        &self,
        question: &str,
        dataset_ids: &[String],
        page: u32,
        page_size: u32,
    ) -> RetrievalResult<Vec<Snippet>> {
        self.retrieve(question, dataset_ids, page, page_size).await
    }
}
