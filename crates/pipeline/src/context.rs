//! State shared by every task of one run.

use std::fmt;
use std::ops::AddAssign;
use std::sync::Arc;

use mongodb::Client;
use opsync_core::overrides::OverrideCache;
use opsync_core::scope::{ExclusionList, ScopeEnv, ScopeTable};
use opsync_core::sync_record::{ErrorRecorder, RecordKind, SyncRecord};
use opsync_core::types::DocId;
use opsync_events::EventSender;
use serde::Serialize;

use crate::schema::SchemaRegistry;

/// Caches, failure records and the event sender of one run.
///
/// Actions receive it behind an `Arc` so per-database tasks can share it.
pub struct RunContext {
    pub scopes: ScopeTable,
    pub exclusions: ExclusionList,
    pub errors: ErrorRecorder,
    pub overrides: OverrideCache,
    pub schemas: SchemaRegistry,
    pub sender: Arc<dyn EventSender>,
    /// Messages per send call.
    pub batch_size: usize,
}

impl RunContext {
    pub fn new(scopes: ScopeTable, sender: Arc<dyn EventSender>) -> Self {
        Self {
            scopes,
            exclusions: ExclusionList::builtin(),
            errors: ErrorRecorder::new(),
            overrides: OverrideCache::new(),
            schemas: SchemaRegistry::new(),
            sender,
            batch_size: 1,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Log and record a failed document.
    pub fn record_failure(
        &self,
        source: &str,
        doc_id: DocId,
        kind: RecordKind,
        message: impl fmt::Display,
        scope_env: &ScopeEnv,
    ) {
        let message = message.to_string();
        tracing::warn!(
            source,
            id = %doc_id,
            kind = %kind,
            error = %message,
            "document skipped"
        );
        self.errors
            .record(SyncRecord::new(source, doc_id.to_hex(), kind, message, scope_env));
    }
}

/// MongoDB clients an action may need.
#[derive(Clone)]
pub struct Connections {
    pub mongo: Client,
    /// Cluster holding the `bmall` database, only for `mapOfBmallAndOPS`.
    pub bmall: Option<Client>,
}

/// Counts reported by every action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActionSummary {
    /// Documents read or matched.
    pub processed: usize,
    /// Documents inserted, updated or deleted.
    pub written: usize,
    /// Documents recorded as failed.
    pub failed: usize,
    /// Events accepted by the sender.
    pub published: usize,
}

impl AddAssign for ActionSummary {
    fn add_assign(&mut self, other: Self) {
        self.processed += other.processed;
        self.written += other.written;
        self.failed += other.failed;
        self.published += other.published;
    }
}

impl fmt::Display for ActionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed={} written={} failed={} published={}",
            self.processed, self.written, self.failed, self.published
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summaries_add_up() {
        let mut total = ActionSummary::default();
        total += ActionSummary {
            processed: 10,
            written: 8,
            failed: 2,
            published: 8,
        };
        total += ActionSummary {
            processed: 5,
            written: 5,
            failed: 0,
            published: 4,
        };
        assert_eq!(
            total,
            ActionSummary {
                processed: 15,
                written: 13,
                failed: 2,
                published: 12
            }
        );
        assert_eq!(total.to_string(), "processed=15 written=13 failed=2 published=12");
    }
}
