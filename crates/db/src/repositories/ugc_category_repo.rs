//! Repository for `operational_ugc.ugcCategory`.

use bson::{doc, Document};
use mongodb::Database;

use crate::collections::UGC_CATEGORY;
use crate::DbError;

pub struct UgcCategoryRepo;

impl UgcCategoryRepo {
    /// Rename the first version named `from` of every category to `to`.
    pub async fn rename_versions(db: &Database, from: &str, to: &str) -> Result<u64, DbError> {
        let res = db
            .collection::<Document>(UGC_CATEGORY)
            .update_many(
                doc! { "versions": { "$elemMatch": { "versionName": from } } },
                doc! { "$set": { "versions.$.versionName": to } },
            )
            .await?;
        Ok(res.modified_count)
    }
}
