//! Material positions, copied as-is between databases.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::legacy::SemVerRange;
use crate::migrate::Document;
use crate::serde_util::null_default;
use crate::sync_record::RecordKind;
use crate::types::{epoch, DocId, Timestamp};

/// `deviceLimited` key for device models.
pub const DEVICE_LIMITED_MODEL: &str = "model";
/// `deviceLimited` key for OS versions.
pub const DEVICE_LIMITED_SYSTEM_VERSION: &str = "systemVersion";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialPosition {
    #[serde(rename = "_id")]
    pub id: DocId,
    #[serde(default)]
    pub scope: String,
    /// Client request key, unique per scope and platform.
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "materialTypeId", default)]
    pub material_type_id: String,
    #[serde(default)]
    pub contains_category: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub platform: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub client_version: BTreeMap<String, SemVerRange>,
    #[serde(default, deserialize_with = "null_default")]
    pub device_limited: BTreeMap<String, String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub goto_id: Vec<String>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(rename = "createdat", default = "epoch")]
    pub created_at: Timestamp,
    #[serde(rename = "updatedat", default = "epoch")]
    pub updated_at: Timestamp,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub editor: String,
}

impl MaterialPosition {
    pub fn device_limit(&self, key: &str) -> &str {
        self.device_limited.get(key).map(String::as_str).unwrap_or("")
    }
}

impl Document for MaterialPosition {
    const KIND: RecordKind = RecordKind::Position;

    fn doc_id(&self) -> DocId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_lowercase_edit_info() {
        let id = DocId::new();
        let doc = bson::doc! {
            "_id": id,
            "code": "home-banner",
            "materialTypeId": "banner",
            "deviceLimited": { "model": "iPhone" },
            "gotoId": bson::Bson::Null,
            "createdat": bson::DateTime::from_millis(3_000),
            "editor": "ed",
        };
        let p: MaterialPosition = bson::from_document(doc).unwrap();
        assert_eq!(p.id, id);
        assert_eq!(p.device_limit(DEVICE_LIMITED_MODEL), "iPhone");
        assert_eq!(p.device_limit(DEVICE_LIMITED_SYSTEM_VERSION), "");
        assert_eq!(p.created_at.timestamp_millis(), 3_000);
        assert!(p.goto_id.is_empty());
    }
}
