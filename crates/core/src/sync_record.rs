//! Per-document failure records collected during a run.

use std::fmt;
use std::sync::Mutex;

use serde::Serialize;

use crate::scope::ScopeEnv;

/// Which kind of document a record refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Material,
    Category,
    Position,
    Plan,
    Activity,
    H5Properties,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Material => "material",
            Self::Category => "category",
            Self::Position => "position",
            Self::Plan => "plan",
            Self::Activity => "activity",
            Self::H5Properties => "h5_properties",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncRecord {
    /// `{database}.{collection}` the document was read from.
    pub source: String,
    pub doc_id: String,
    pub kind: RecordKind,
    pub message: String,
    pub scope: String,
    pub env: String,
}

impl SyncRecord {
    pub fn new(
        source: impl Into<String>,
        doc_id: impl Into<String>,
        kind: RecordKind,
        message: impl Into<String>,
        scope_env: &ScopeEnv,
    ) -> Self {
        Self {
            source: source.into(),
            doc_id: doc_id.into(),
            kind,
            message: message.into(),
            scope: scope_env.scope.clone(),
            env: scope_env.env.clone(),
        }
    }
}

/// Append-only record list shared by the tasks of one run.
#[derive(Debug, Default)]
pub struct ErrorRecorder {
    records: Mutex<Vec<SyncRecord>>,
}

impl ErrorRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, record: SyncRecord) {
        lock_unpoisoned(&self.records).push(record);
    }

    pub fn len(&self) -> usize {
        lock_unpoisoned(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every record so far, in insertion order.
    pub fn snapshot(&self) -> Vec<SyncRecord> {
        lock_unpoisoned(&self.records).clone()
    }
}

/// Lock a mutex, recovering the data if a holder panicked.
pub fn lock_unpoisoned<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn records_keep_insertion_order() {
        let rec = ErrorRecorder::new();
        let se = ScopeEnv::new("icc", "qa");
        rec.record(SyncRecord::new("db.material", "a", RecordKind::Material, "e1", &se));
        rec.record(SyncRecord::new("db.material", "b", RecordKind::Material, "e2", &se));

        let ids: Vec<String> = rec.snapshot().into_iter().map(|r| r.doc_id).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(rec.snapshot()[0].env, "qa");
    }

    #[test]
    fn concurrent_writers_do_not_lose_records() {
        let rec = Arc::new(ErrorRecorder::new());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let rec = Arc::clone(&rec);
                std::thread::spawn(move || {
                    let se = ScopeEnv::new("s", "e");
                    for i in 0..25 {
                        rec.record(SyncRecord::new("x", format!("{t}-{i}"), RecordKind::Plan, "", &se));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(rec.len(), 100);
    }
}
