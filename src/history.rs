//! In-memory rolling history of past analyses.
//!
//! Bounded, newest-first log shared across request workers. A single mutex
//! guards the whole structure; at this size (<= 1000 entries) and write rate
//! that is plenty. Entries are never mutated after creation and are only
//! removed by capacity eviction.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::stats::BatchStats;

pub const HISTORY_CAPACITY: usize = 1000;

/// A normalized result plus the request parameters that produced it,
/// as handed to [`History::record`].
#[derive(Debug, Clone)]
pub struct AnalysisRecord {
    pub texto: String,
    pub prevision: String,
    pub probabilidad: Option<f64>,
    pub confianza: Option<String>,
    pub idioma: Option<String>,
    pub threshold: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: u64,
    pub texto: String,
    pub prevision: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probabilidad: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confianza: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idioma: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    pub fecha_analisis: DateTime<Utc>,
}

#[derive(Debug)]
pub struct History {
    inner: Mutex<Inner>,
    cap: usize,
}

#[derive(Debug)]
struct Inner {
    /// Newest entries at the front.
    entries: VecDeque<HistoryEntry>,
    next_id: u64,
}

impl History {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: VecDeque::with_capacity(cap.min(10_000)),
                next_id: 1,
            }),
            cap,
        }
    }

    /// Append a new entry at the front; evict from the back past capacity.
    /// The id and creation timestamp are assigned under the lock, so ids are
    /// distinct and front-to-back order matches recording order.
    pub fn record(&self, rec: AnalysisRecord) {
        let mut inner = self.inner.lock().expect("history mutex poisoned");
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push_front(HistoryEntry {
            id,
            texto: rec.texto,
            prevision: rec.prevision,
            probabilidad: rec.probabilidad,
            confianza: rec.confianza,
            idioma: rec.idioma,
            threshold: rec.threshold,
            fecha_analisis: Utc::now(),
        });
        while inner.entries.len() > self.cap {
            inner.entries.pop_back();
        }
    }

    /// Statistics over the full current contents, computed fresh on every call.
    pub fn stats(&self) -> BatchStats {
        let inner = self.inner.lock().expect("history mutex poisoned");
        BatchStats::from_labels(inner.entries.iter().map(|e| e.prevision.as_str()))
    }

    /// The most recent `n` entries, newest first. For diagnostics.
    pub fn snapshot_last_n(&self, n: usize) -> Vec<HistoryEntry> {
        let inner = self.inner.lock().expect("history mutex poisoned");
        inner.entries.iter().take(n).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .expect("history mutex poisoned")
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(texto: &str, prevision: &str) -> AnalysisRecord {
        AnalysisRecord {
            texto: texto.to_string(),
            prevision: prevision.to_string(),
            probabilidad: Some(0.9),
            confianza: None,
            idioma: Some("es".to_string()),
            threshold: Some(0.5),
        }
    }

    #[test]
    fn never_exceeds_capacity_and_evicts_oldest() {
        let h = History::with_capacity(5);
        for i in 0..8 {
            h.record(rec(&format!("text {i}"), "Positivo"));
        }
        assert_eq!(h.len(), 5);

        // The three oldest entries (0..3) are gone; the rest survive newest-first.
        let snap = h.snapshot_last_n(10);
        let texts: Vec<&str> = snap.iter().map(|e| e.texto.as_str()).collect();
        assert_eq!(texts, vec!["text 7", "text 6", "text 5", "text 4", "text 3"]);
    }

    #[test]
    fn ids_are_distinct_and_increasing() {
        let h = History::with_capacity(10);
        h.record(rec("a", "Positivo"));
        h.record(rec("b", "Negativo"));
        h.record(rec("c", "Positivo"));
        let snap = h.snapshot_last_n(3);
        assert_eq!(snap[0].id, 3);
        assert_eq!(snap[1].id, 2);
        assert_eq!(snap[2].id, 1);
    }

    #[test]
    fn stats_reflect_current_contents() {
        let h = History::with_capacity(100);
        assert_eq!(h.stats().total, 0);
        h.record(rec("up", "Positivo"));
        h.record(rec("down", "Negativo"));
        h.record(rec("up again", "Positivo"));
        let s = h.stats();
        assert_eq!(s.total, 3);
        assert_eq!(s.positivos, 2);
        assert_eq!(s.negativos, 1);
    }

    #[test]
    fn eviction_drops_evicted_entries_from_stats() {
        let h = History::with_capacity(2);
        h.record(rec("old positive", "Positivo"));
        h.record(rec("neg 1", "Negativo"));
        h.record(rec("neg 2", "Negativo"));
        let s = h.stats();
        assert_eq!(s.total, 2);
        assert_eq!(s.positivos, 0);
    }
}
