//! Repository for `plan`.

use bson::{doc, Bson, Document};
use mongodb::{Collection, Database};
use opsync_core::plan::Plan;

use crate::collections::PLAN;
use crate::DbError;

pub struct PlanRepo;

impl PlanRepo {
    pub fn collection(db: &Database) -> Collection<Plan> {
        db.collection(PLAN)
    }

    /// Number of plans with at least one placement carrying a VIP or
    /// period override.
    pub async fn count_with_overrides(db: &Database) -> Result<u64, DbError> {
        Ok(Self::collection(db)
            .count_documents(overrides_filter())
            .await?)
    }
}

/// Plans whose placed materials (nested in categories or top level) set
/// `vip` or `period`.
pub fn overrides_filter() -> Document {
    doc! {
        "$or": [
            placed_with_override("placingContents.categories.materials"),
            placed_with_override("placingContents.materials"),
        ]
    }
}

fn placed_with_override(path: &str) -> Document {
    let set = |field: &str| {
        let key = format!("{path}.{field}");
        let mut cond = Document::new();
        cond.insert(key, doc! { "$exists": true, "$ne": Bson::Null });
        cond
    };
    let mut missing = Document::new();
    missing.insert(path, doc! { "$exists": false });
    let mut empty = Document::new();
    empty.insert(path, doc! { "$size": 0 });

    doc! {
        "$nor": [missing, empty],
        "$or": [set("vip"), set("period")],
    }
}
