//! Repository for `operational-positions.activity`.

use bson::{doc, Bson, Document};
use futures::TryStreamExt;
use mongodb::{Collection, Database};
use opsync_core::h5::{Activity, H5_ACTIVITY_TYPES, POS_CENTER_FIELD_CODES};
use opsync_core::types::DocId;

use crate::collections::ACTIVITY;
use crate::DbError;

/// A field backfilled on activities that lack it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backfill {
    /// `type: 1` where `type` does not exist.
    Type,
    /// `isDeleted: false` where `isDeleted` does not exist.
    SoftDelete,
    /// `active: false` where `active` is null or missing.
    Active,
}

impl Backfill {
    pub fn filter(self) -> Document {
        match self {
            Self::Type => doc! { "type": { "$exists": false } },
            Self::SoftDelete => doc! { "isDeleted": { "$exists": false } },
            Self::Active => doc! { "active": Bson::Null },
        }
    }

    pub fn update(self) -> Document {
        match self {
            Self::Type => doc! { "$set": { "type": 1 } },
            Self::SoftDelete => doc! { "$set": { "isDeleted": false } },
            Self::Active => doc! { "$set": { "active": false } },
        }
    }
}

pub struct ActivityRepo;

impl ActivityRepo {
    pub fn collection(db: &Database) -> Collection<Activity> {
        db.collection(ACTIVITY)
    }

    async fn find_all(db: &Database, filter: Document) -> Result<Vec<Activity>, DbError> {
        let found = Self::collection(db).find(filter).await?.try_collect().await?;
        Ok(found)
    }

    /// Every non-deleted h5 activity.
    pub async fn find_h5(db: &Database) -> Result<Vec<Activity>, DbError> {
        Self::find_all(db, h5_filter()).await
    }

    /// Non-deleted h5 roots; with `active_only`, only active ones.
    pub async fn find_h5_roots(db: &Database, active_only: bool) -> Result<Vec<Activity>, DbError> {
        Self::find_all(db, h5_roots_filter(active_only)).await
    }

    /// Non-deleted h5 nodes built from the positioned field definitions.
    pub async fn find_h5_positioned(db: &Database) -> Result<Vec<Activity>, DbError> {
        let mut filter = h5_filter();
        filter.insert("fieldDefCode", doc! { "$in": POS_CENTER_FIELD_CODES.to_vec() });
        Self::find_all(db, filter).await
    }

    /// Give every node under `root_id` the type `activity_type`.
    pub async fn set_tree_type(
        db: &Database,
        root_id: DocId,
        activity_type: i32,
    ) -> Result<u64, DbError> {
        let res = Self::collection(db)
            .update_many(
                doc! { "rootID": root_id, "type": { "$ne": activity_type } },
                doc! { "$set": { "type": activity_type } },
            )
            .await?;
        Ok(res.modified_count)
    }

    /// Set `active` on the direct children of `parent_id`.
    pub async fn set_children_active(
        db: &Database,
        parent_id: DocId,
        active: bool,
    ) -> Result<u64, DbError> {
        let res = Self::collection(db)
            .update_many(doc! { "pid": parent_id }, doc! { "$set": { "active": active } })
            .await?;
        Ok(res.modified_count)
    }

    pub async fn backfill(db: &Database, field: Backfill) -> Result<u64, DbError> {
        let res = Self::collection(db)
            .update_many(field.filter(), field.update())
            .await?;
        Ok(res.modified_count)
    }
}

pub fn h5_filter() -> Document {
    doc! { "type": { "$in": H5_ACTIVITY_TYPES.to_vec() }, "isDeleted": false }
}

pub fn h5_roots_filter(active_only: bool) -> Document {
    let mut filter = h5_filter();
    filter.insert("pid", doc! { "$exists": false });
    if active_only {
        filter.insert("active", true);
    }
    filter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roots_exclude_children() {
        let f = h5_roots_filter(false);
        assert!(!f.get_document("pid").unwrap().get_bool("$exists").unwrap());
        assert_eq!(
            f.get_document("type").unwrap().get_array("$in").unwrap(),
            &vec![Bson::Int32(2), Bson::Int32(3)]
        );
        assert!(!f.contains_key("active"));
        assert!(h5_roots_filter(true).get_bool("active").unwrap());
    }

    #[test]
    fn backfills_target_missing_fields() {
        assert_eq!(Backfill::Active.filter(), doc! { "active": Bson::Null });
        assert_eq!(
            Backfill::Type.update(),
            doc! { "$set": { "type": 1 } }
        );
        assert_eq!(
            Backfill::SoftDelete.filter(),
            doc! { "isDeleted": { "$exists": false } }
        );
    }
}
