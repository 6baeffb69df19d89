//! Storage seams used by the pipeline.
//!
//! The MongoDB implementations live in `opsync-db`; tests drive the same
//! loops through in-memory implementations.

use async_trait::async_trait;

use crate::fields::{FieldCategory, FieldsDefinition};
use crate::material::Material;
use crate::migrate::Document;
use crate::pagination::{Page, PageRequest};
use crate::types::DocId;

/// A collection read page by page, newest `_id` first.
#[async_trait]
pub trait PageSource<T: Send>: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// `{database}.{collection}` used in failure records.
    fn source_name(&self) -> String;

    async fn fetch_page(&self, request: PageRequest) -> Result<Page<T>, Self::Error>;
}

/// Lookup of field schemas by type id and category.
#[async_trait]
pub trait FieldSchemaSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn fetch_schema(
        &self,
        type_id: &str,
        category: FieldCategory,
    ) -> Result<Option<FieldsDefinition>, Self::Error>;
}

/// Destination collection of a sync.
#[async_trait]
pub trait DocumentSink<T: Document>: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Delete any document with the same id, then upsert `doc`. Not atomic.
    async fn replace(&self, doc: &T) -> Result<(), Self::Error>;
}

/// Read and write access to versioned materials of one database.
#[async_trait]
pub trait MaterialStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn load_material(&self, id: DocId) -> Result<Option<Material>, Self::Error>;

    /// Upsert `material` by id.
    async fn save_material(&self, material: &Material) -> Result<(), Self::Error>;
}
