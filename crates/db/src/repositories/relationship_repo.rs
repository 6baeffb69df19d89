//! Repository for `bmall.id_relationship`.

use bson::doc;
use mongodb::{Collection, Database};
use opsync_core::relationship::RelationshipId;

use super::by_id;
use crate::collections::ID_RELATIONSHIP;
use crate::DbError;

/// What [`RelationshipRepo::save`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Inserted,
    /// An identical row already existed.
    Repeated,
    /// The row existed with another ops id and was updated.
    Updated,
}

pub struct RelationshipRepo;

impl RelationshipRepo {
    pub fn collection(db: &Database) -> Collection<RelationshipId> {
        db.collection(ID_RELATIONSHIP)
    }

    pub async fn save(db: &Database, rel: &RelationshipId) -> Result<SaveOutcome, DbError> {
        let coll = Self::collection(db);
        match coll.find_one(by_id(rel.bmall_id)).await? {
            None => {
                coll.insert_one(rel).await?;
                Ok(SaveOutcome::Inserted)
            }
            Some(existing) if existing == *rel => Ok(SaveOutcome::Repeated),
            Some(existing) => {
                tracing::info!(
                    bmall_id = %rel.bmall_id,
                    old = %existing.ops_id,
                    new = %rel.ops_id,
                    "relationship changed"
                );
                coll.update_one(
                    by_id(rel.bmall_id),
                    doc! { "$set": { "opsID": rel.ops_id.as_str() } },
                )
                .upsert(true)
                .await?;
                Ok(SaveOutcome::Updated)
            }
        }
    }
}
