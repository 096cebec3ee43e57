//! # Inference Client
//! Adapter between this service's request shapes and the external
//! sentiment-inference service's wire contract.
//!
//! Batches travel as one round trip (not per item) to bound latency and
//! connection overhead; there is no client-side chunking, the API layer keeps
//! batch sizes within the upstream's accepted limit. The trait seam lets
//! tests substitute a deterministic backend without opening sockets.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::config::Settings;
use crate::error::ApiError;

#[async_trait]
pub trait ScorerClient: Send + Sync {
    /// Single-text analysis. Returns the raw, loosely-typed result record.
    async fn analyze_one(
        &self,
        text: &str,
        idioma: &str,
        threshold: Option<f64>,
    ) -> Result<Value, ApiError>;

    /// Whole-list analysis in a single request. Fails with
    /// `MalformedUpstreamResponse` when the reply lacks the result collection.
    async fn analyze_many(&self, textos: &[String], idioma: &str)
        -> Result<Vec<Value>, ApiError>;

    /// Single-text analysis with a ranked list of up to `top_n` influential terms.
    async fn explain_one(&self, text: &str, idioma: &str, top_n: u32) -> Result<Value, ApiError>;
}

/// Trait object used by handlers and tests.
pub type DynScorer = Arc<dyn ScorerClient>;

/// HTTP implementation against the real inference service.
pub struct HttpScorer {
    http: reqwest::Client,
    base: String,
}

impl HttpScorer {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("sentiment-gateway/0.1")
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.read_timeout)
            .build()?;
        Ok(Self {
            http,
            base: settings.upstream_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base, path);
        let resp = self.http.post(&url).json(body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Upstream { status, body });
        }
        resp.json::<Value>()
            .await
            .map_err(|e| ApiError::MalformedUpstreamResponse(e.to_string()))
    }
}

#[async_trait]
impl ScorerClient for HttpScorer {
    async fn analyze_one(
        &self,
        text: &str,
        idioma: &str,
        threshold: Option<f64>,
    ) -> Result<Value, ApiError> {
        let mut body = Map::new();
        body.insert("text".to_string(), json!(text));
        body.insert("idioma".to_string(), json!(idioma));
        if let Some(t) = threshold {
            body.insert("threshold".to_string(), json!(t));
        }
        self.post_json("/sentiment", &Value::Object(body)).await
    }

    async fn analyze_many(
        &self,
        textos: &[String],
        idioma: &str,
    ) -> Result<Vec<Value>, ApiError> {
        let body = json!({ "textos": textos, "idioma": idioma });
        let v = self.post_json("/sentiment/batch", &body).await?;
        match v.get("resultados").and_then(Value::as_array) {
            Some(items) => Ok(items.to_vec()),
            None => Err(ApiError::MalformedUpstreamResponse(
                "la respuesta no contiene 'resultados'".to_string(),
            )),
        }
    }

    async fn explain_one(&self, text: &str, idioma: &str, top_n: u32) -> Result<Value, ApiError> {
        let body = json!({ "text": text, "idioma": idioma, "top_n": top_n });
        self.post_json("/sentiment/explain", &body).await
    }
}
