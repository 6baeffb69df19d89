//! Typed custom field values of the versioned document schema.
//!
//! A stored value is a document with exactly one populated key, e.g.
//! `{ "numberInt": 3 }`. Documents written by other services may carry
//! every key with most of them `null`; decoding picks the first populated
//! one and drops values with none.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::serde_util::null_default;

/// Reference type tag for material references.
pub const REFERENCE_TYPE_MATERIAL: i32 = 1;

// ---------------------------------------------------------------------------
// Value payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct File {
    pub uri: String,
    pub url: String,
    pub ext: String,
    pub size: i64,
    pub expire: i64,
    pub is_private: bool,
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Image {
    pub uri: String,
    pub url: String,
    pub ext: String,
    pub size: i64,
    pub expire: i64,
    pub is_private: bool,
    pub width: i32,
    pub height: i32,
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Video {
    pub uri: String,
    pub url: String,
    pub ext: String,
    pub size: i64,
    pub expire: i64,
    pub is_private: bool,
    pub width: i32,
    pub height: i32,
    pub path: String,
    pub screenshot: Option<Image>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Reference {
    #[serde(deserialize_with = "null_default")]
    pub value: Vec<String>,
    pub pkg_url: String,
    #[serde(deserialize_with = "null_default")]
    pub pack_info: BTreeMap<String, File>,
    #[serde(rename = "type")]
    pub reference_type: i32,
}

/// Validity window in unix seconds. `end == 0` means open-ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Period {
    pub begin: i64,
    pub end: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientVersion {
    pub min: String,
    pub max: String,
    #[serde(deserialize_with = "null_default")]
    pub unsupported: Vec<String>,
}

/// Client version compatibility keyed by platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Version {
    #[serde(deserialize_with = "null_default")]
    pub v: BTreeMap<String, ClientVersion>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientLocale {
    pub typ: String,
    #[serde(deserialize_with = "null_default")]
    pub selected: Vec<String>,
}

/// Locale type of the bucket shown when no other locale matches.
pub const DEFAULT_LOCALE: &str = "default";

/// One localised attribute bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Localize {
    pub priority: i32,
    pub client_locale: Option<ClientLocale>,
    #[serde(deserialize_with = "deserialize_custom")]
    pub custom: CustomMap,
}

impl Localize {
    pub fn is_default(&self) -> bool {
        self.client_locale
            .as_ref()
            .is_some_and(|l| l.typ == DEFAULT_LOCALE)
    }
}

// ---------------------------------------------------------------------------
// FieldValue
// ---------------------------------------------------------------------------

/// A single custom field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "FieldValueRepr")]
pub enum FieldValue {
    Text(String),
    TextArray(Vec<String>),
    NumberInt(i64),
    NumberIntArray(Vec<i64>),
    NumberFloat(f64),
    NumberFloatArray(Vec<f64>),
    Bool(bool),
    File(File),
    Image(Image),
    Video(Video),
    Reference(Reference),
    Period(Period),
    Version(Version),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Custom values keyed by field code.
pub type CustomMap = BTreeMap<String, FieldValue>;

/// Storage shape of a [`FieldValue`]: one optional key per variant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FieldValueRepr {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text_array: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    number_int: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    number_int_array: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    number_float: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    number_float_array: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bool: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<File>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<Image>,
    #[serde(skip_serializing_if = "Option::is_none")]
    video: Option<Video>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference: Option<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    period: Option<Period>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<Version>,
}

impl FieldValueRepr {
    fn into_value(self) -> Option<FieldValue> {
        use FieldValue as V;
        self.text
            .map(V::Text)
            .or_else(|| self.text_array.map(V::TextArray))
            .or_else(|| self.number_int.map(V::NumberInt))
            .or_else(|| self.number_int_array.map(V::NumberIntArray))
            .or_else(|| self.number_float.map(V::NumberFloat))
            .or_else(|| self.number_float_array.map(V::NumberFloatArray))
            .or_else(|| self.bool.map(V::Bool))
            .or_else(|| self.file.map(V::File))
            .or_else(|| self.image.map(V::Image))
            .or_else(|| self.video.map(V::Video))
            .or_else(|| self.reference.map(V::Reference))
            .or_else(|| self.period.map(V::Period))
            .or_else(|| self.version.map(V::Version))
    }
}

impl From<FieldValue> for FieldValueRepr {
    fn from(value: FieldValue) -> Self {
        let mut r = Self::default();
        match value {
            FieldValue::Text(v) => r.text = Some(v),
            FieldValue::TextArray(v) => r.text_array = Some(v),
            FieldValue::NumberInt(v) => r.number_int = Some(v),
            FieldValue::NumberIntArray(v) => r.number_int_array = Some(v),
            FieldValue::NumberFloat(v) => r.number_float = Some(v),
            FieldValue::NumberFloatArray(v) => r.number_float_array = Some(v),
            FieldValue::Bool(v) => r.bool = Some(v),
            FieldValue::File(v) => r.file = Some(v),
            FieldValue::Image(v) => r.image = Some(v),
            FieldValue::Video(v) => r.video = Some(v),
            FieldValue::Reference(v) => r.reference = Some(v),
            FieldValue::Period(v) => r.period = Some(v),
            FieldValue::Version(v) => r.version = Some(v),
        }
        r
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        FieldValueRepr::deserialize(deserializer)?
            .into_value()
            .ok_or_else(|| serde::de::Error::custom("field value has no populated key"))
    }
}

/// Decode a custom map, dropping `null` and empty entries.
pub fn deserialize_custom<'de, D>(deserializer: D) -> Result<CustomMap, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Option<FieldValueRepr>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(code, repr)| repr.and_then(FieldValueRepr::into_value).map(|v| (code, v)))
        .collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
