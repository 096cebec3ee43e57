//! # Batch Aggregator
//! Pure statistics over classification labels. No I/O, suitable for unit
//! tests; shared by the batch endpoints and the history store.

use serde::Serialize;

use crate::dto::LABEL_POSITIVE;

/// Aggregate counts over a collection of analysis results.
/// Invariant: `positivos + negativos == total`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    pub total: u64,
    pub positivos: u64,
    pub negativos: u64,
    pub porcentaje_positivos: f64,
}

impl BatchStats {
    /// Compute statistics from an iterator of classification labels.
    /// An empty input is valid and yields all-zero statistics.
    pub fn from_labels<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut total = 0u64;
        let mut positivos = 0u64;
        for label in labels {
            total += 1;
            if label == LABEL_POSITIVE {
                positivos += 1;
            }
        }
        let porcentaje_positivos = if total > 0 {
            positivos as f64 * 100.0 / total as f64
        } else {
            0.0
        };
        Self {
            total,
            positivos,
            negativos: total - positivos,
            porcentaje_positivos,
        }
    }
}
