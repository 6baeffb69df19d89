//! MongoDB implementations of the `opsync-core` storage traits.

use async_trait::async_trait;
use bson::doc;
use mongodb::{Collection, Database};
use opsync_core::fields::{FieldCategory, FieldsDefinition};
use opsync_core::material::Material;
use opsync_core::migrate::Document as StoredDocument;
use opsync_core::pagination::{Page, PageRequest};
use opsync_core::store::{DocumentSink, FieldSchemaSource, MaterialStore, PageSource};
use opsync_core::types::DocId;
use serde::de::DeserializeOwned;

use crate::pagination::find_page;
use crate::repositories::{replace_by_id, FieldDefinitionRepo, MaterialRepo};
use crate::DbError;

/// Every document of a collection, paged newest first.
pub struct CollectionPages<T: Send + Sync> {
    coll: Collection<T>,
}

impl<T: Send + Sync> CollectionPages<T> {
    pub fn new(coll: Collection<T>) -> Self {
        Self { coll }
    }
}

#[async_trait]
impl<T> PageSource<T> for CollectionPages<T>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    type Error = DbError;

    fn source_name(&self) -> String {
        self.coll.namespace().to_string()
    }

    async fn fetch_page(&self, request: PageRequest) -> Result<Page<T>, DbError> {
        find_page(&self.coll, doc! {}, request).await
    }
}

/// Writes documents into a collection by id.
pub struct CollectionSink<T: Send + Sync> {
    coll: Collection<T>,
}

impl<T: Send + Sync> CollectionSink<T> {
    pub fn new(coll: Collection<T>) -> Self {
        Self { coll }
    }
}

#[async_trait]
impl<T: StoredDocument> DocumentSink<T> for CollectionSink<T> {
    type Error = DbError;

    async fn replace(&self, doc: &T) -> Result<(), DbError> {
        replace_by_id(&self.coll, doc).await
    }
}

/// Field schemas of one `field-definitions` database.
pub struct SchemaDatabase {
    db: Database,
}

impl SchemaDatabase {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FieldSchemaSource for SchemaDatabase {
    type Error = DbError;

    async fn fetch_schema(
        &self,
        type_id: &str,
        category: FieldCategory,
    ) -> Result<Option<FieldsDefinition>, DbError> {
        FieldDefinitionRepo::find(&self.db, type_id, category).await
    }
}

/// Versioned materials of one `operational_materials` database.
pub struct MaterialDatabase {
    db: Database,
}

impl MaterialDatabase {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MaterialStore for MaterialDatabase {
    type Error = DbError;

    async fn load_material(&self, id: DocId) -> Result<Option<Material>, DbError> {
        MaterialRepo::find_by_id(&self.db, id).await
    }

    async fn save_material(&self, material: &Material) -> Result<(), DbError> {
        MaterialRepo::upsert(&self.db, material).await
    }
}
