//! Versioned material categories.

use serde::{Deserialize, Serialize};

use crate::convert::convert_custom_attributes;
use crate::field_value::{deserialize_custom, CustomMap, Localize};
use crate::fields::{FieldCategory, FieldsDefinition};
use crate::legacy::LegacyCategory;
use crate::localize::convert_localized;
use crate::migrate::{Document, LegacyDocument};
use crate::serde_util::null_default;
use crate::sync_record::RecordKind;
use crate::types::{epoch, DocId, Timestamp};

/// Name given to the version created by migration.
pub const DEFAULT_VERSION_NAME: &str = "默认版本";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryVersion {
    /// Stored as `versionId`, unlike material versions.
    pub version_id: DocId,
    #[serde(default)]
    pub version_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub mender: String,
    #[serde(default = "epoch")]
    pub created_at: Timestamp,
    #[serde(default = "epoch")]
    pub updated_at: Timestamp,
    #[serde(default, deserialize_with = "deserialize_custom")]
    pub custom: CustomMap,
    #[serde(default, deserialize_with = "null_default")]
    pub localize: Vec<Localize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: DocId,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub parent: String,
    #[serde(rename = "typeID", default)]
    pub type_id: String,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub versions: Vec<CategoryVersion>,
}

impl Category {
    pub fn from_legacy(old: &LegacyCategory, schema: &FieldsDefinition) -> Self {
        let version = CategoryVersion {
            version_id: DocId::new(),
            version_name: DEFAULT_VERSION_NAME.to_string(),
            name: old.name.clone(),
            creator: old.creator.clone(),
            mender: old.mender.clone(),
            created_at: old.created_at,
            updated_at: old.updated_at,
            custom: convert_custom_attributes(schema, &old.custom_attributes),
            localize: convert_localized(schema, &old.localize_attributes),
        };

        Self {
            id: old.id,
            scope: old.scope.clone(),
            parent: old.parent_id.clone(),
            type_id: old.type_id.clone(),
            sort_order: old.sort_order,
            is_deleted: old.is_deleted,
            versions: vec![version],
        }
    }
}

impl Document for Category {
    const KIND: RecordKind = RecordKind::Category;

    fn doc_id(&self) -> DocId {
        self.id
    }
}

impl Document for LegacyCategory {
    const KIND: RecordKind = RecordKind::Category;

    fn doc_id(&self) -> DocId {
        self.id
    }
}

impl LegacyDocument for LegacyCategory {
    type Target = Category;
    const FIELD_CATEGORY: FieldCategory = FieldCategory::MaterialCategory;

    fn type_id(&self) -> &str {
        &self.type_id
    }

    fn migrate(&self, schema: &FieldsDefinition) -> Category {
        Category::from_legacy(self, schema)
    }
}
