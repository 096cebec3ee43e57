//! Wire DTOs for the public API.
//!
//! Caller-facing JSON keeps the field names of the original frontend contract
//! (`textos`, `idioma`, `porcentajePositivos`, ...), so responses serialize in
//! camelCase. The upstream inference service speaks snake_case; the mapping
//! between the two lives in `normalize.rs`.

use serde::{Deserialize, Serialize};

use crate::stats::BatchStats;

/// Classification label reported for positive texts. Anything else counts as negative.
pub const LABEL_POSITIVE: &str = "Positivo";

#[derive(Debug, Clone, Deserialize)]
pub struct SentimentRequest {
    pub text: String,
    #[serde(default)]
    pub idioma: Option<String>,
    #[serde(default)]
    pub threshold: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExplainRequest {
    pub text: String,
    #[serde(default)]
    pub idioma: Option<String>,
    #[serde(default, rename = "topN", alias = "top_n")]
    pub top_n: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchRequest {
    pub textos: Vec<String>,
    #[serde(default)]
    pub idioma: Option<String>,
    #[serde(default)]
    pub threshold: Option<f64>,
}

/// Canonical analysis result. Produced only by `normalize::normalize_result`;
/// optional fields absent upstream stay unset rather than defaulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentResponse {
    pub prevision: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probabilidad: Option<f64>,
    pub texto: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idioma_detectado: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confianza: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainResponse {
    pub prevision: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentimiento: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probabilidad: Option<f64>,
    pub texto: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub palabras_importantes: Option<Vec<PalabraImportante>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub palabras_influyentes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idioma_detectado: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confianza: Option<String>,
}

/// One ranked influential term from the explain endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PalabraImportante {
    pub palabra: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub importancia: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentimiento: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    #[serde(flatten)]
    pub stats: BatchStats,
    pub resultados: Vec<SentimentResponse>,
}
