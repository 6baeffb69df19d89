//! Storage shapes of the legacy (unversioned) material schema.
//!
//! A legacy [`LegacyFieldValue`] carries one optional slot per value kind
//! and normally populates exactly one of them. Which one is populated is
//! not authoritative: the field schema decides how a value is read.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::field_value::{ClientVersion, File, Image, Video};
use crate::serde_util::null_default;
use crate::types::{epoch, DocId, Timestamp};

/// `{ "value": ... }` wrapper used by most legacy value slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueCell<T> {
    #[serde(default)]
    pub value: T,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LegacyFile {
    pub uri: String,
    pub size: i64,
    pub suffix: String,
    pub is_private: bool,
}

impl LegacyFile {
    pub fn to_file(&self) -> File {
        File {
            uri: self.uri.clone(),
            ext: self.suffix.clone(),
            size: self.size,
            is_private: self.is_private,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LegacyImage {
    pub uri: String,
    pub size: i64,
    pub suffix: String,
    pub is_private: bool,
    pub width: i64,
    pub height: i64,
}

impl LegacyImage {
    pub fn to_image(&self) -> Image {
        Image {
            uri: self.uri.clone(),
            ext: self.suffix.clone(),
            size: self.size,
            is_private: self.is_private,
            width: self.width as i32,
            height: self.height as i32,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LegacyVideo {
    pub uri: String,
    pub size: i64,
    pub suffix: String,
    pub is_private: bool,
    pub width: i64,
    pub height: i64,
    pub screenshot: Option<LegacyImage>,
}

impl LegacyVideo {
    pub fn to_video(&self) -> Video {
        Video {
            uri: self.uri.clone(),
            ext: self.suffix.clone(),
            size: self.size,
            is_private: self.is_private,
            width: self.width as i32,
            height: self.height as i32,
            screenshot: self.screenshot.as_ref().map(LegacyImage::to_image),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LegacyReference {
    #[serde(deserialize_with = "null_default")]
    pub value: Vec<String>,
    pub pkg_url: String,
    /// Packed file per locale, e.g. `defaultLocal`, `zh-Hans`.
    pub pack_info: Option<BTreeMap<String, Option<LegacyFile>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameAndValues {
    pub name: String,
    #[serde(deserialize_with = "null_default")]
    pub value: Vec<String>,
}

// ---------------------------------------------------------------------------
// Semantic versions
// ---------------------------------------------------------------------------

/// A stored semantic version. Older writers used a plain string, newer ones
/// a `{major, minor, patch}` document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SemVer(pub bson::Bson);

impl SemVer {
    /// Render as `major.minor.patch`, or an empty string when unset.
    pub fn render(&self) -> String {
        match &self.0 {
            bson::Bson::String(s) => s.clone(),
            bson::Bson::Document(d) => {
                let part = |k: &str| match d.get(k) {
                    Some(bson::Bson::Int32(n)) => i64::from(*n),
                    Some(bson::Bson::Int64(n)) => *n,
                    Some(bson::Bson::Double(n)) => *n as i64,
                    _ => 0,
                };
                format!("{}.{}.{}", part("major"), part("minor"), part("patch"))
            }
            bson::Bson::Int32(n) => n.to_string(),
            bson::Bson::Int64(n) => n.to_string(),
            _ => String::new(),
        }
    }
}

/// Stored client compatibility range for one platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SemVerRange {
    pub min: SemVer,
    pub max: SemVer,
    #[serde(deserialize_with = "null_default")]
    pub unsupported: Vec<SemVer>,
}

impl SemVerRange {
    pub fn to_client_version(&self) -> ClientVersion {
        ClientVersion {
            min: self.min.render(),
            max: self.max.render(),
            unsupported: self.unsupported.iter().map(SemVer::render).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// LegacyFieldValue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LegacyFieldValue {
    pub text_value: Option<ValueCell<String>>,
    pub number_value: Option<ValueCell<f64>>,
    pub number_range_value: Option<ValueCell<Option<Vec<f64>>>>,
    pub date_time_value: Option<ValueCell<Option<Vec<i64>>>>,
    pub enum_value: Option<ValueCell<Option<Vec<String>>>>,
    pub file_value: Option<LegacyFile>,
    pub image_value: Option<LegacyImage>,
    pub video_value: Option<LegacyVideo>,
    pub reference_value: Option<LegacyReference>,
    pub name_and_values_value: Option<Vec<NameAndValues>>,
    /// Platform → compatibility range.
    pub version_value: Option<BTreeMap<String, Option<SemVerRange>>>,
    pub tag_value: Option<ValueCell<Option<Vec<String>>>>,
    #[serde(rename = "numberInt")]
    pub number_int: Option<ValueCell<Option<i64>>>,
    #[serde(rename = "numberFloat")]
    pub number_float: Option<ValueCell<Option<f64>>>,
    pub color_value: Option<ValueCell<String>>,
}

/// A `{code, fieldType, value}` attribute of a legacy document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomAttribute {
    pub code: String,
    pub field_type: String,
    pub value: Option<LegacyFieldValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocalizeAttribute {
    #[serde(deserialize_with = "null_default")]
    pub system_attributes: Vec<CustomAttribute>,
    #[serde(deserialize_with = "null_default")]
    pub custom_attributes: Vec<CustomAttribute>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DatePeriod {
    pub start_date: i64,
    pub end_date: i64,
}

// ---------------------------------------------------------------------------
// Legacy documents
// ---------------------------------------------------------------------------

/// A material in the legacy `operations_materials` database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyMaterial {
    #[serde(rename = "_id")]
    pub id: DocId,
    #[serde(default)]
    pub scope: String,
    #[serde(rename = "typeID", default)]
    pub type_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "isVIP", default)]
    pub is_vip: i32,
    #[serde(rename = "tagIDs", default, deserialize_with = "null_default")]
    pub tag_ids: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub platform: Vec<String>,
    #[serde(default)]
    pub date_period: DatePeriod,
    #[serde(default, deserialize_with = "null_default")]
    pub system_attributes: Vec<CustomAttribute>,
    #[serde(default, deserialize_with = "null_default")]
    pub custom_attributes: Vec<CustomAttribute>,
    #[serde(default, deserialize_with = "null_default")]
    pub localize_attributes: Vec<LocalizeAttribute>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub mender: String,
    #[serde(default = "epoch")]
    pub created_at: Timestamp,
    #[serde(default = "epoch")]
    pub updated_at: Timestamp,
}

/// A material category in the legacy `operations_materials` database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyCategory {
    #[serde(rename = "_id")]
    pub id: DocId,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parent_id: String,
    #[serde(rename = "typeID", default)]
    pub type_id: String,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default, deserialize_with = "null_default")]
    pub system_attributes: Vec<CustomAttribute>,
    #[serde(default, deserialize_with = "null_default")]
    pub localize_attributes: Vec<LocalizeAttribute>,
    #[serde(default, deserialize_with = "null_default")]
    pub custom_attributes: Vec<CustomAttribute>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub mender: String,
    #[serde(default = "epoch")]
    pub created_at: Timestamp,
    #[serde(default = "epoch")]
    pub updated_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semver_renders_strings_and_documents() {
        assert_eq!(SemVer(bson::Bson::String("1.2.3".into())).render(), "1.2.3");
        let doc = bson::doc! { "major": 2, "minor": 0_i64, "patch": 7 };
        assert_eq!(SemVer(bson::Bson::Document(doc)).render(), "2.0.7");
        assert_eq!(SemVer::default().render(), "");
    }

    #[test]
    fn legacy_material_decodes_with_null_slices() {
        let id = DocId::new();
        let doc = bson::doc! {
            "_id": id,
            "scope": "camera360",
            "typeID": "t1",
            "name": "sticker",
            "isVIP": 1,
            "tagIDs": bson::Bson::Null,
            "platform": ["ios"],
            "datePeriod": { "startDate": 10_i64, "endDate": 20_i64 },
            "customAttributes": [
                { "code": "title", "fieldType": "text", "value": { "textValue": { "value": "hello" } } },
            ],
            "localizeAttributes": bson::Bson::Null,
            "createdAt": bson::DateTime::from_millis(1_000),
        };
        let m: LegacyMaterial = bson::from_document(doc).unwrap();
        assert_eq!(m.id, id);
        assert_eq!(m.is_vip, 1);
        assert!(m.tag_ids.is_empty());
        assert_eq!(m.date_period.end_date, 20);
        assert_eq!(
            m.custom_attributes[0]
                .value
                .as_ref()
                .and_then(|v| v.text_value.as_ref())
                .map(|c| c.value.as_str()),
            Some("hello")
        );
        assert_eq!(m.updated_at, epoch());
    }
}
