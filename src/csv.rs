//! Text extraction for the CSV upload endpoint.
//!
//! The accepted format is a single-column, line-delimited CSV. The first
//! non-empty line is always dropped as the header (fixed policy, not a
//! heuristic). Wrapping quotes are stripped and doubled quotes (`""`)
//! unescaped; no general CSV parsing (multiple columns, embedded newlines)
//! is attempted.

use crate::error::ApiError;

/// Parse raw upload bytes into a clean, ordered list of texts.
/// Fails when the content is not UTF-8 or when zero usable texts remain.
pub fn extract_texts(content: &[u8]) -> Result<Vec<String>, ApiError> {
    let text = std::str::from_utf8(content)
        .map_err(|_| ApiError::Validation("El archivo debe ser texto UTF-8".to_string()))?;

    let mut texts = Vec::new();
    let mut header_seen = false;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !header_seen {
            header_seen = true;
            continue;
        }

        let mut cleaned = line;
        if cleaned.len() > 1 && cleaned.starts_with('"') && cleaned.ends_with('"') {
            cleaned = &cleaned[1..cleaned.len() - 1];
        }
        let cleaned = cleaned.replace("\"\"", "\"");
        let cleaned = cleaned.trim();
        if !cleaned.is_empty() {
            texts.push(cleaned.to_string());
        }
    }

    if texts.is_empty() {
        return Err(ApiError::Validation(
            "El CSV no contiene textos válidos".to_string(),
        ));
    }
    Ok(texts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_input_is_returned_verbatim_in_order() {
        let csv = "texto\nfirst line\nsecond line\nthird line\n";
        let out = extract_texts(csv.as_bytes()).unwrap();
        assert_eq!(out, vec!["first line", "second line", "third line"]);
    }

    #[test]
    fn strips_one_pair_of_wrapping_quotes_and_unescapes() {
        let csv = "texto\n\"He said \"\"hi\"\"\"\n";
        let out = extract_texts(csv.as_bytes()).unwrap();
        assert_eq!(out, vec!["He said \"hi\""]);
    }

    #[test]
    fn skips_blank_lines_and_trims() {
        let csv = "texto\n\n   padded text   \n\n\nanother\n";
        let out = extract_texts(csv.as_bytes()).unwrap();
        assert_eq!(out, vec!["padded text", "another"]);
    }

    #[test]
    fn first_non_empty_line_is_always_dropped() {
        // Even when it looks like data, the first non-empty line is the header.
        let csv = "\n\nthis is data, honest\nreal row\n";
        let out = extract_texts(csv.as_bytes()).unwrap();
        assert_eq!(out, vec!["real row"]);
    }

    #[test]
    fn header_only_file_yields_validation_error() {
        let err = extract_texts(b"texto\n").unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn quoted_empty_row_is_skipped() {
        let csv = "texto\n\"\"\nkept\n";
        let out = extract_texts(csv.as_bytes()).unwrap();
        assert_eq!(out, vec!["kept"]);
    }

    #[test]
    fn lone_quote_survives_unstripped() {
        // A single `"` has length 1; the strip rule requires length > 1.
        let csv = "texto\n\"\n";
        let out = extract_texts(csv.as_bytes()).unwrap();
        assert_eq!(out, vec!["\""]);
    }

    #[test]
    fn non_utf8_content_is_rejected() {
        let err = extract_texts(&[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
