//! HTTP routing layer: request validation, upstream calls, aggregation,
//! history writes. All endpoints live under `/api`.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::{debug, info};

use crate::csv;
use crate::dto::{
    BatchRequest, BatchResponse, ExplainRequest, ExplainResponse, SentimentRequest,
    SentimentResponse,
};
use crate::error::ApiError;
use crate::history::{AnalysisRecord, History, HistoryEntry};
use crate::normalize::{normalize_explain, normalize_result};
use crate::scorer::DynScorer;
use crate::stats::BatchStats;

pub const MAX_BATCH_TEXTS: usize = 1000;
pub const MAX_CSV_BYTES: usize = 10 * 1024 * 1024;
/// Batches larger than this skip history recording entirely (load shedding,
/// not correctness: statistics are always computed and returned).
pub const HISTORY_BATCH_LIMIT: usize = 100;

const DEFAULT_IDIOMA: &str = "auto";
const DEFAULT_THRESHOLD: f64 = 0.5;
const DEFAULT_TOP_N: u32 = 5;

#[derive(Clone)]
pub struct AppState {
    pub scorer: DynScorer,
    pub history: Arc<History>,
}

impl AppState {
    pub fn new(scorer: DynScorer) -> Self {
        Self {
            scorer,
            history: Arc::new(History::new()),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/", get(root))
        .route("/api/health", get(health))
        .route("/api/sentiment", post(analyze))
        .route("/api/sentiment/explain", post(explain))
        .route("/api/sentiment/batch", post(analyze_batch))
        .route("/api/sentiment/batch/csv", post(analyze_csv))
        .route("/api/stats", get(stats))
        .route("/api/debug/history", get(debug_history))
        // The default body limit is far below the documented 10MB upload cap.
        .layer(DefaultBodyLimit::max(MAX_CSV_BYTES + 64 * 1024))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn root() -> &'static str {
    "Sentiment Analysis Backend - Running"
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "UP", "service": "sentiment-gateway" }))
}

async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<SentimentRequest>,
) -> Result<Json<SentimentResponse>, ApiError> {
    let text = req.text.trim().to_string();
    validate_text(&text)?;
    validate_threshold(req.threshold)?;
    let idioma = req.idioma.as_deref().unwrap_or(DEFAULT_IDIOMA);

    info!(chars = text.chars().count(), "analyzing sentiment: {}", preview(&text));

    let raw = state.scorer.analyze_one(&text, idioma, req.threshold).await?;
    let result = normalize_result(&raw)?;
    info!(
        "result: {} ({})",
        result.prevision,
        result
            .probabilidad
            .map_or_else(|| "n/a".to_string(), |p| format!("{:.0}%", p * 100.0))
    );

    state.history.record(AnalysisRecord {
        texto: result.texto.clone(),
        prevision: result.prevision.clone(),
        probabilidad: result.probabilidad,
        confianza: result.confianza.clone(),
        idioma: req.idioma,
        threshold: req.threshold,
    });

    Ok(Json(result))
}

async fn explain(
    State(state): State<AppState>,
    Json(req): Json<ExplainRequest>,
) -> Result<Json<ExplainResponse>, ApiError> {
    let text = req.text.trim().to_string();
    validate_text(&text)?;
    let top_n = req.top_n.unwrap_or(DEFAULT_TOP_N);
    if !(1..=20).contains(&top_n) {
        return Err(ApiError::Validation(
            "top_n debe estar entre 1 y 20".to_string(),
        ));
    }
    let idioma = req.idioma.as_deref().unwrap_or(DEFAULT_IDIOMA);

    info!(top_n, "explaining sentiment: {}", preview(&text));

    let raw = state.scorer.explain_one(&text, idioma, top_n).await?;
    let result = normalize_explain(&raw)?;
    info!(
        terms = result.palabras_importantes.as_ref().map_or(0, Vec::len),
        "explain result: {}", result.prevision
    );
    Ok(Json(result))
}

async fn stats(State(state): State<AppState>) -> Json<BatchStats> {
    Json(state.history.stats())
}

async fn analyze_batch(
    State(state): State<AppState>,
    Json(req): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    if req.textos.is_empty() {
        return Err(ApiError::Validation(
            "La lista de textos no puede estar vacía".to_string(),
        ));
    }
    if req.textos.len() > MAX_BATCH_TEXTS {
        return Err(ApiError::Validation(
            "Máximo 1000 textos por request".to_string(),
        ));
    }
    if req.threshold.is_some() {
        // Not forwarded: the batch endpoint upstream takes no threshold, and
        // batch history entries carry the fixed default instead.
        debug!("batch threshold accepted but not forwarded upstream");
    }

    let response = run_batch(&state, &req.textos, req.idioma).await?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct CsvParams {
    #[serde(default = "default_idioma")]
    idioma: String,
    #[serde(default = "default_threshold")]
    threshold: f64,
}

fn default_idioma() -> String {
    DEFAULT_IDIOMA.to_string()
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

async fn analyze_csv(
    State(state): State<AppState>,
    Query(params): Query<CsvParams>,
    mut multipart: Multipart,
) -> Result<Json<BatchResponse>, ApiError> {
    validate_threshold(Some(params.threshold))?;

    let mut content: Option<Vec<u8>> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("formulario multipart inválido: {e}")))?
    {
        if field.name() == Some("file") {
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(format!("no se pudo leer el archivo: {e}")))?;
            content = Some(data.to_vec());
            break;
        }
    }

    let content =
        content.ok_or_else(|| ApiError::Validation("falta el campo 'file'".to_string()))?;
    if content.is_empty() {
        return Err(ApiError::Validation("El archivo está vacío".to_string()));
    }
    if content.len() > MAX_CSV_BYTES {
        return Err(ApiError::Validation(
            "El archivo no puede superar 10MB".to_string(),
        ));
    }

    let textos = csv::extract_texts(&content)?;
    info!(
        count = textos.len(),
        bytes = content.len(),
        "extracted texts from CSV upload"
    );

    let response = run_batch(&state, &textos, Some(params.idioma)).await?;
    Ok(Json(response))
}

/// Shared batch pipeline: one upstream round trip, normalization,
/// aggregation, then the small-batch history write.
async fn run_batch(
    state: &AppState,
    textos: &[String],
    idioma_hint: Option<String>,
) -> Result<BatchResponse, ApiError> {
    let started = Instant::now();
    let idioma = idioma_hint.as_deref().unwrap_or(DEFAULT_IDIOMA);
    info!(count = textos.len(), idioma, "starting batch analysis");

    let raw = state.scorer.analyze_many(textos, idioma).await?;
    let resultados = raw
        .iter()
        .map(normalize_result)
        .collect::<Result<Vec<_>, _>>()?;
    let stats = BatchStats::from_labels(resultados.iter().map(|r| r.prevision.as_str()));

    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        total = stats.total,
        positivos = stats.positivos,
        negativos = stats.negativos,
        "batch completed"
    );

    if resultados.len() <= HISTORY_BATCH_LIMIT {
        // Per-item parameters are not tracked at batch granularity, so the
        // entries carry the batch idioma and the fixed default threshold.
        for r in &resultados {
            state.history.record(AnalysisRecord {
                texto: r.texto.clone(),
                prevision: r.prevision.clone(),
                probabilidad: r.probabilidad,
                confianza: r.confianza.clone(),
                idioma: idioma_hint.clone(),
                threshold: Some(DEFAULT_THRESHOLD),
            });
        }
    }

    Ok(BatchResponse { stats, resultados })
}

async fn debug_history(State(state): State<AppState>) -> Json<Vec<HistoryEntry>> {
    Json(state.history.snapshot_last_n(10))
}

fn validate_text(text: &str) -> Result<(), ApiError> {
    if text.is_empty() {
        return Err(ApiError::Validation(
            "El texto no puede estar vacío".to_string(),
        ));
    }
    let chars = text.chars().count();
    if !(3..=5000).contains(&chars) {
        return Err(ApiError::Validation(
            "El texto debe tener entre 3 y 5000 caracteres".to_string(),
        ));
    }
    Ok(())
}

fn validate_threshold(threshold: Option<f64>) -> Result<(), ApiError> {
    if let Some(t) = threshold {
        if !(0.0..=1.0).contains(&t) {
            return Err(ApiError::Validation(
                "threshold debe estar entre 0.0 y 1.0".to_string(),
            ));
        }
    }
    Ok(())
}

/// First 50 chars of a text, for log lines.
fn preview(text: &str) -> String {
    text.chars().take(50).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_bounds_are_inclusive() {
        assert!(validate_text("abc").is_ok());
        assert!(validate_text("ab").is_err());
        assert!(validate_text("").is_err());
        assert!(validate_text(&"x".repeat(5000)).is_ok());
        assert!(validate_text(&"x".repeat(5001)).is_err());
    }

    #[test]
    fn threshold_bounds_are_inclusive() {
        assert!(validate_threshold(None).is_ok());
        assert!(validate_threshold(Some(0.0)).is_ok());
        assert!(validate_threshold(Some(1.0)).is_ok());
        assert!(validate_threshold(Some(-0.01)).is_err());
        assert!(validate_threshold(Some(1.01)).is_err());
    }

    #[test]
    fn preview_truncates_by_chars_not_bytes() {
        let long = "ñ".repeat(80);
        assert_eq!(preview(&long).chars().count(), 50);
    }
}
