//! Bmall to operational material id relationships.

use serde::{Deserialize, Serialize};

use crate::field_value::FieldValue;
use crate::material::Material;
use crate::types::{parse_doc_id, DocId};

/// Custom field holding the Bmall id of the iOS item.
pub const BMALL_ID_FIELD: &str = "bmallId";
/// Custom field holding the Bmall id of the Android item.
pub const BMALL_ID_ANDROID_FIELD: &str = "bmallIdArd";

/// Row of `bmall.id_relationship`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipId {
    #[serde(rename = "_id")]
    pub bmall_id: DocId,
    #[serde(rename = "opsID")]
    pub ops_id: String,
}

/// Relationships found on one material, with counts of the slots seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationshipScan {
    pub relationships: Vec<RelationshipId>,
    /// Bmall id slots inspected (two per material with versions).
    pub total: usize,
    /// Slots that were missing, empty, or not a valid id.
    pub not_ok: usize,
}

impl RelationshipScan {
    pub fn from_material(material: &Material) -> Self {
        let mut scan = Self::default();
        let Some(version) = material.default_version() else {
            return scan;
        };
        let ops_id = material.id.to_hex();

        for field in [BMALL_ID_FIELD, BMALL_ID_ANDROID_FIELD] {
            scan.total += 1;
            let text = version
                .custom
                .get(field)
                .and_then(FieldValue::as_text)
                .unwrap_or_default();
            match parse_doc_id(text) {
                Ok(bmall_id) => scan.relationships.push(RelationshipId {
                    bmall_id,
                    ops_id: ops_id.clone(),
                }),
                Err(_) => {
                    if !text.is_empty() {
                        tracing::warn!(material = %ops_id, bmall_id = text, "invalid bmall id");
                    }
                    scan.not_ok += 1;
                }
            }
        }
        scan
    }
}
