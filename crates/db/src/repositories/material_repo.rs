//! Repository for the `material` collection, in both the legacy and the
//! versioned materials databases.

use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::{Collection, Database};
use opsync_core::legacy::LegacyMaterial;
use opsync_core::material::Material;
use opsync_core::pagination::{Page, PageRequest};
use opsync_core::relationship::{BMALL_ID_ANDROID_FIELD, BMALL_ID_FIELD};
use opsync_core::types::{DocId, Timestamp};

use super::by_id;
use crate::collections::MATERIAL;
use crate::pagination::find_page;
use crate::DbError;

/// Materials whose versions changed after 2022-12-01T00:00:00+08:00 are
/// removed by `clearMaterials`.
pub const CLEAR_UPDATED_AFTER_MS: i64 = 1_669_824_000_000;

pub struct MaterialRepo;

impl MaterialRepo {
    pub fn collection(db: &Database) -> Collection<Material> {
        db.collection(MATERIAL)
    }

    pub fn legacy_collection(db: &Database) -> Collection<LegacyMaterial> {
        db.collection(MATERIAL)
    }

    pub async fn find_by_id(db: &Database, id: DocId) -> Result<Option<Material>, DbError> {
        Ok(Self::collection(db).find_one(by_id(id)).await?)
    }

    /// Every material of the database, newest first.
    pub async fn list_all(db: &Database) -> Result<Vec<Material>, DbError> {
        let all = Self::collection(db)
            .find(doc! {})
            .sort(doc! { "_id": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(all)
    }

    /// Insert or overwrite `material` by id.
    pub async fn upsert(db: &Database, material: &Material) -> Result<(), DbError> {
        Self::collection(db)
            .replace_one(by_id(material.id), material)
            .upsert(true)
            .await?;
        Ok(())
    }

    /// Delete materials with any version updated after `after`.
    pub async fn delete_updated_after(db: &Database, after: Timestamp) -> Result<u64, DbError> {
        let res = Self::collection(db)
            .delete_many(updated_after_filter(after))
            .await?;
        Ok(res.deleted_count)
    }

    /// Set the id of version 0. Returns false when the material is absent.
    pub async fn set_default_version_id(
        db: &Database,
        id: DocId,
        version_id: DocId,
    ) -> Result<bool, DbError> {
        let res = Self::collection(db)
            .update_one(by_id(id), doc! { "$set": { "versions.0.versionID": version_id } })
            .await?;
        Ok(res.matched_count > 0)
    }

    /// Page through non-deleted materials carrying a Bmall id field.
    pub async fn find_bmall_page(
        db: &Database,
        request: PageRequest,
    ) -> Result<Page<Material>, DbError> {
        find_page(&Self::collection(db), bmall_filter(), request).await
    }
}

pub fn updated_after_filter(after: Timestamp) -> Document {
    doc! { "versions.updatedAt": { "$gt": after } }
}

pub fn bmall_filter() -> Document {
    let exists = |field: &str| {
        let mut cond = Document::new();
        cond.insert(format!("versions.custom.{field}"), doc! { "$exists": 1 });
        cond
    };
    doc! {
        "isDeleted": false,
        "$or": [exists(BMALL_ID_FIELD), exists(BMALL_ID_ANDROID_FIELD)],
    }
}
