//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept the `&Database` to operate on as their first argument. Filter
//! builders are plain functions so they can be tested without a server.

pub mod activity_repo;
pub mod category_repo;
pub mod field_definition_repo;
pub mod h5_properties_repo;
pub mod material_repo;
pub mod plan_repo;
pub mod position_repo;
pub mod relationship_repo;
pub mod ugc_category_repo;

pub use activity_repo::ActivityRepo;
pub use category_repo::CategoryRepo;
pub use field_definition_repo::FieldDefinitionRepo;
pub use h5_properties_repo::H5PropertiesRepo;
pub use material_repo::MaterialRepo;
pub use plan_repo::PlanRepo;
pub use position_repo::PositionRepo;
pub use relationship_repo::RelationshipRepo;
pub use ugc_category_repo::UgcCategoryRepo;

use bson::{doc, Document};
use mongodb::Collection;
use opsync_core::migrate::Document as StoredDocument;

use crate::DbError;

/// `{_id: id}`.
pub(crate) fn by_id(id: impl Into<bson::Bson>) -> Document {
    doc! { "_id": id.into() }
}

/// Delete any document with the same id, then upsert `doc`. Not atomic.
pub async fn replace_by_id<T: StoredDocument>(coll: &Collection<T>, doc: &T) -> Result<(), DbError> {
    let filter = by_id(doc.doc_id());
    coll.delete_one(filter.clone()).await?;
    coll.replace_one(filter, doc).upsert(true).await?;
    Ok(())
}
