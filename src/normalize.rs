//! # Result Normalizer
//! Narrow decoding step between the loosely-typed upstream records and the
//! canonical DTOs. The upstream guarantees neither field presence nor types,
//! so everything optional is extracted leniently and left unset when absent;
//! only the classification label and the text are mandatory, because the
//! aggregation downstream depends on them.

use serde_json::Value;

use crate::dto::{ExplainResponse, PalabraImportante, SentimentResponse};
use crate::error::ApiError;

/// Convert one raw result record into the canonical shape.
/// Fails with `InvalidResult` only when `prevision` or `texto` is missing.
pub fn normalize_result(raw: &Value) -> Result<SentimentResponse, ApiError> {
    let prevision = str_field(raw, "prevision")
        .ok_or_else(|| ApiError::InvalidResult("falta el campo 'prevision'".to_string()))?;
    let texto = str_field(raw, "texto")
        .ok_or_else(|| ApiError::InvalidResult("falta el campo 'texto'".to_string()))?;

    Ok(SentimentResponse {
        prevision,
        probabilidad: raw.get("probabilidad").and_then(Value::as_f64),
        texto,
        idioma_detectado: str_field(raw, "idioma_detectado"),
        confianza: str_field(raw, "confianza"),
        timestamp: raw.get("timestamp").and_then(Value::as_i64),
    })
}

/// Like [`normalize_result`], plus the ranked influential-term list from the
/// explain endpoint. Term records that lack even the word itself are dropped.
pub fn normalize_explain(raw: &Value) -> Result<ExplainResponse, ApiError> {
    let base = normalize_result(raw)?;

    let palabras_importantes = raw
        .get("palabras_importantes")
        .or_else(|| raw.get("palabrasImportantes"))
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(parse_palabra).collect::<Vec<_>>());

    let palabras_influyentes = raw
        .get("palabras_influyentes")
        .or_else(|| raw.get("palabrasInfluyentes"))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect::<Vec<_>>()
        });

    Ok(ExplainResponse {
        prevision: base.prevision,
        sentimiento: str_field(raw, "sentimiento"),
        probabilidad: base.probabilidad,
        texto: base.texto,
        palabras_importantes,
        palabras_influyentes,
        idioma_detectado: base.idioma_detectado,
        confianza: base.confianza,
    })
}

fn parse_palabra(v: &Value) -> Option<PalabraImportante> {
    Some(PalabraImportante {
        palabra: str_field(v, "palabra")?,
        importancia: v.get("importancia").and_then(Value::as_f64),
        sentimiento: str_field(v, "sentimiento"),
    })
}

fn str_field(v: &Value, key: &str) -> Option<String> {
    v.get(key).and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn full_record_maps_all_fields() {
        let raw = json!({
            "prevision": "Positivo",
            "probabilidad": 0.93,
            "texto": "me encanta",
            "idioma_detectado": "es",
            "confianza": "Muy Alta",
        });
        let r = normalize_result(&raw).unwrap();
        assert_eq!(r.prevision, "Positivo");
        assert_eq!(r.probabilidad, Some(0.93));
        assert_eq!(r.texto, "me encanta");
        assert_eq!(r.idioma_detectado.as_deref(), Some("es"));
        assert_eq!(r.confianza.as_deref(), Some("Muy Alta"));
        assert_eq!(r.timestamp, None);
    }

    #[test]
    fn optional_fields_stay_unset_not_defaulted() {
        let raw = json!({ "prevision": "Negativo", "texto": "meh" });
        let r = normalize_result(&raw).unwrap();
        assert_eq!(r.probabilidad, None, "absent probability must not become 0.0");
        assert_eq!(r.idioma_detectado, None);
        assert_eq!(r.confianza, None);
    }

    #[test]
    fn integer_probability_is_coerced() {
        let raw = json!({ "prevision": "Positivo", "texto": "ok", "probabilidad": 1 });
        let r = normalize_result(&raw).unwrap();
        assert_eq!(r.probabilidad, Some(1.0));
    }

    #[test]
    fn missing_label_or_text_fails_closed() {
        let no_label = json!({ "texto": "algo" });
        assert!(matches!(
            normalize_result(&no_label),
            Err(ApiError::InvalidResult(_))
        ));
        let no_text = json!({ "prevision": "Positivo" });
        assert!(matches!(
            normalize_result(&no_text),
            Err(ApiError::InvalidResult(_))
        ));
    }

    #[test]
    fn explain_parses_ranked_terms_leniently() {
        let raw = json!({
            "prevision": "Positivo",
            "texto": "gran producto",
            "palabras_importantes": [
                { "palabra": "gran", "importancia": 0.8, "sentimiento": "Positivo" },
                { "importancia": 0.1 },
                { "palabra": "producto" },
            ],
            "palabras_influyentes": ["gran", "producto"],
        });
        let r = normalize_explain(&raw).unwrap();
        let terms = r.palabras_importantes.unwrap();
        // The record without a word is dropped, order is preserved.
        assert_eq!(terms.len(), 2);
        assert_eq!(terms[0].palabra, "gran");
        assert_eq!(terms[0].importancia, Some(0.8));
        assert_eq!(terms[1].palabra, "producto");
        assert_eq!(terms[1].importancia, None);
        assert_eq!(r.palabras_influyentes.unwrap(), vec!["gran", "producto"]);
    }

    #[test]
    fn explain_without_term_list_is_valid() {
        let raw = json!({ "prevision": "Negativo", "texto": "malo" });
        let r = normalize_explain(&raw).unwrap();
        assert!(r.palabras_importantes.is_none());
        assert!(r.palabras_influyentes.is_none());
    }
}
