//! `mapOfBmallAndOPS`: record which operational material each Bmall item
//! id belongs to.

use std::fmt;

use opsync_core::pagination::{PageRequest, RELATIONSHIP_PAGE_SIZE};
use opsync_core::relationship::RelationshipScan;
use opsync_core::scope::{logical_db, ScopeEnv};
use opsync_db::collections::BMALL_DB;
use opsync_db::repositories::relationship_repo::SaveOutcome;
use opsync_db::repositories::{MaterialRepo, RelationshipRepo};

use crate::context::{ActionSummary, Connections};
use crate::error::PipelineError;

/// Only the production camera360 materials carry Bmall ids.
pub const BMALL_SOURCE_SCOPE: &str = "camera360";
pub const BMALL_SOURCE_ENV: &str = "prod";

/// Counts reported when the scan ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelationshipTally {
    pub materials: usize,
    /// Bmall id slots inspected.
    pub total: usize,
    /// Slots without a usable id.
    pub not_ok: usize,
    pub inserted: usize,
    pub updated: usize,
    /// Relationships that were already stored unchanged.
    pub repeated: usize,
    pub failed: usize,
}

impl RelationshipTally {
    pub fn add_scan(&mut self, scan: &RelationshipScan) {
        self.materials += 1;
        self.total += scan.total;
        self.not_ok += scan.not_ok;
    }

    pub fn add_outcome(&mut self, outcome: SaveOutcome) {
        match outcome {
            SaveOutcome::Inserted => self.inserted += 1,
            SaveOutcome::Updated => self.updated += 1,
            SaveOutcome::Repeated => self.repeated += 1,
        }
    }

    pub fn summary(&self) -> ActionSummary {
        ActionSummary {
            processed: self.materials,
            written: self.inserted + self.updated,
            failed: self.failed,
            published: 0,
        }
    }
}

impl fmt::Display for RelationshipTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "materials={} total={} notOK={} inserted={} updated={} repeated={} failed={}",
            self.materials,
            self.total,
            self.not_ok,
            self.inserted,
            self.updated,
            self.repeated,
            self.failed
        )
    }
}

pub(super) async fn map_bmall_ids(conns: &Connections) -> Result<ActionSummary, PipelineError> {
    let bmall = conns
        .bmall
        .as_ref()
        .ok_or(PipelineError::MissingConfig("BMALL_MONGO_DNS"))?
        .database(BMALL_DB);
    let source_env = ScopeEnv::new(BMALL_SOURCE_SCOPE, BMALL_SOURCE_ENV);
    let source = conns.mongo.database(&source_env.db_name(logical_db::MATERIALS));

    let mut tally = RelationshipTally::default();
    let mut request = PageRequest::first(RELATIONSHIP_PAGE_SIZE);
    loop {
        let page = MaterialRepo::find_bmall_page(&source, request).await?;
        tracing::debug!(page = page.page, total_pages = page.total_pages, "bmall page");

        for material in &page.items {
            let scan = RelationshipScan::from_material(material);
            tally.add_scan(&scan);
            for rel in &scan.relationships {
                match RelationshipRepo::save(&bmall, rel).await {
                    Ok(outcome) => tally.add_outcome(outcome),
                    Err(e) => {
                        tracing::warn!(bmall_id = %rel.bmall_id, ops_id = %rel.ops_id, error = %e, "relationship not saved");
                        tally.failed += 1;
                    }
                }
            }
        }

        if !page.has_next {
            break;
        }
        request = request.next();
    }

    tracing::info!(%tally, "bmall relationships mapped");
    Ok(tally.summary())
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsync_core::relationship::RelationshipId;
    use opsync_core::types::DocId;

    #[test]
    fn tally_counts_scans_and_outcomes() {
        let mut tally = RelationshipTally::default();
        tally.add_scan(&RelationshipScan {
            relationships: vec![RelationshipId {
                bmall_id: DocId::new(),
                ops_id: "a".into(),
            }],
            total: 2,
            not_ok: 1,
        });
        tally.add_scan(&RelationshipScan::default());
        tally.add_outcome(SaveOutcome::Inserted);
        tally.add_outcome(SaveOutcome::Repeated);
        tally.add_outcome(SaveOutcome::Updated);

        assert_eq!(tally.materials, 2);
        assert_eq!(tally.total, 2);
        assert_eq!(tally.not_ok, 1);
        assert_eq!(
            tally.summary(),
            ActionSummary {
                processed: 2,
                written: 2,
                failed: 0,
                published: 0
            }
        );
        assert_eq!(
            tally.to_string(),
            "materials=2 total=2 notOK=1 inserted=1 updated=1 repeated=1 failed=0"
        );
    }
}
