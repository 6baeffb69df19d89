//! Repository for `h5.properties`.

use bson::doc;
use futures::TryStreamExt;
use mongodb::{Collection, Database};
use opsync_core::h5::H5Properties;
use opsync_core::types::DocId;

use super::by_id;
use crate::collections::H5_PROPERTIES;
use crate::DbError;

pub struct H5PropertiesRepo;

impl H5PropertiesRepo {
    pub fn collection(db: &Database) -> Collection<H5Properties> {
        db.collection(H5_PROPERTIES)
    }

    pub async fn find_all(db: &Database) -> Result<Vec<H5Properties>, DbError> {
        let all = Self::collection(db).find(doc! {}).await?.try_collect().await?;
        Ok(all)
    }

    pub async fn find_by_activity_id(
        db: &Database,
        activity_id: &str,
    ) -> Result<Option<H5Properties>, DbError> {
        Ok(Self::collection(db)
            .find_one(doc! { "activityID": activity_id })
            .await?)
    }

    /// Insert or overwrite `props` by id.
    pub async fn upsert(db: &Database, props: &H5Properties) -> Result<(), DbError> {
        Self::collection(db)
            .replace_one(by_id(props.id), props)
            .upsert(true)
            .await?;
        Ok(())
    }

    pub async fn delete_by_id(db: &Database, id: DocId) -> Result<u64, DbError> {
        let res = Self::collection(db).delete_one(by_id(id)).await?;
        Ok(res.deleted_count)
    }
}
