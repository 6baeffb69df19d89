//! Traits tying stored document types to the generic sync loops.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::fields::{FieldCategory, FieldsDefinition};
use crate::sync_record::RecordKind;
use crate::types::DocId;

/// A stored document with an ObjectId primary key.
pub trait Document: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Kind reported in failure records.
    const KIND: RecordKind;

    fn doc_id(&self) -> DocId;
}

/// A legacy document that migrates into a versioned document under a
/// field schema.
pub trait LegacyDocument: Document {
    type Target: Document;

    /// Field category the schema is looked up under.
    const FIELD_CATEGORY: FieldCategory;

    /// The `typeID` selecting the schema.
    fn type_id(&self) -> &str;

    fn migrate(&self, schema: &FieldsDefinition) -> Self::Target;
}
