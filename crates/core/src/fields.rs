//! Field-definition schema ("fields definition").
//!
//! A [`FieldsDefinition`] describes the custom fields a material type (or
//! category type, activity, h5 page) carries. The schema decides how each
//! legacy value is decoded, see [`crate::convert`].

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::serde_util::null_default;

// ---------------------------------------------------------------------------
// FieldCategory
// ---------------------------------------------------------------------------

/// Which kind of document a definition applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum FieldCategory {
    Material,
    MaterialCategory,
    Activity,
    Html5,
}

impl FieldCategory {
    pub fn code(self) -> i32 {
        match self {
            Self::Material => 1,
            Self::MaterialCategory => 2,
            Self::Activity => 3,
            Self::Html5 => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Material => "material",
            Self::MaterialCategory => "material_category",
            Self::Activity => "activity",
            Self::Html5 => "h5",
        }
    }
}

impl TryFrom<i32> for FieldCategory {
    type Error = CoreError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Material),
            2 => Ok(Self::MaterialCategory),
            3 => Ok(Self::Activity),
            4 => Ok(Self::Html5),
            other => Err(CoreError::Validation(format!(
                "unknown field category {other}"
            ))),
        }
    }
}

impl From<FieldCategory> for i32 {
    fn from(c: FieldCategory) -> Self {
        c.code()
    }
}

impl std::fmt::Display for FieldCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Kind codes
// ---------------------------------------------------------------------------

pub mod kind_code {
    pub const TEXT: i32 = 1;
    pub const NUMBER_RANGE: i32 = 2;
    pub const DATETIME: i32 = 3;
    pub const ENUMERATION: i32 = 4;
    pub const IMAGE: i32 = 5;
    pub const FILE: i32 = 6;
    pub const MATERIAL_REFERENCE: i32 = 7;
    pub const VIDEO: i32 = 8;
    pub const GOTO: i32 = 9;
    pub const TAG: i32 = 10;
    pub const NUMBER: i32 = 11;
    pub const COLOR: i32 = 12;
}

/// Well-known system attribute codes.
pub mod system_code {
    pub const PRIORITY: &str = "priority";
    pub const CLIENT_LOCALE: &str = "clientLocale";
    pub const CLIENT_VERSION: &str = "clientVersion";
}

/// Numeric storage of a `Number` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    Int,
    Float,
    Unspecified,
}

/// Whether a `Datetime` field stores one instant or a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatetimeKind {
    Point,
    Range,
    Unspecified,
}

/// Element type of an enumeration's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumValueType {
    String,
    Int,
    Bool,
    Float,
}

impl EnumValueType {
    /// Codes other than int (1), bool (2) and float (3) read as strings.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Self::Int,
            2 => Self::Bool,
            3 => Self::Float,
            _ => Self::String,
        }
    }
}

/// The resolved kind of a custom field, with what conversion needs to know.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number(NumberKind),
    NumberRange,
    Datetime(DatetimeKind),
    Enumeration {
        value_type: EnumValueType,
        multiple: bool,
    },
    File,
    Image,
    Video,
    MaterialReference,
    Goto,
    Tag,
    Color,
    Unknown(i32),
}

// ---------------------------------------------------------------------------
// Per-kind configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    #[serde(rename = "type")]
    pub text_type: i32,
    pub hint: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatetimeConfig {
    #[serde(rename = "type")]
    pub datetime_type: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumItem {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnumConfig {
    pub is_multiple: bool,
    pub value_type: i32,
    #[serde(deserialize_with = "null_default")]
    pub enum_items: Vec<EnumItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSize {
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageConfig {
    #[serde(deserialize_with = "null_default")]
    pub supported_size: Vec<ImageSize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReferenceConfig {
    pub id: String,
    pub is_pack: bool,
}

/// Stored without explicit key names, hence the lowercase keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GotoConfig {
    #[serde(rename = "enabledtypes", deserialize_with = "null_default")]
    pub enabled_types: Vec<String>,
    #[serde(rename = "materialcodes", deserialize_with = "null_default")]
    pub material_codes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TagConfig {
    pub tag_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberConfig {
    #[serde(rename = "type")]
    pub number_type: i32,
    pub hint: String,
}

// ---------------------------------------------------------------------------
// Field
// ---------------------------------------------------------------------------

/// One field of a definition, as stored in `fields_definition`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Field {
    pub code: String,
    pub name: String,
    pub comment: String,
    pub required: bool,
    pub is_systematized: bool,
    pub is_localized: bool,
    pub sys_field_type: i32,
    pub customized_field_type: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_field: Option<TextConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime_field: Option<DatetimeConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_field: Option<EnumConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_field: Option<ImageConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_reference_field: Option<ReferenceConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goto_field: Option<GotoConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_field: Option<TagConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_field: Option<NumberConfig>,
}

impl Field {
    /// Resolve the declared kind. A kind whose configuration block is
    /// missing resolves to its `Unspecified` sub-kind.
    pub fn kind(&self) -> FieldKind {
        match self.customized_field_type {
            kind_code::TEXT => FieldKind::Text,
            kind_code::NUMBER => FieldKind::Number(match self.number_field.as_ref() {
                Some(c) if c.number_type == 1 => NumberKind::Int,
                Some(c) if c.number_type == 2 => NumberKind::Float,
                _ => NumberKind::Unspecified,
            }),
            kind_code::NUMBER_RANGE => FieldKind::NumberRange,
            kind_code::DATETIME => FieldKind::Datetime(match self.datetime_field.as_ref() {
                Some(c) if c.datetime_type == 1 => DatetimeKind::Point,
                Some(c) if c.datetime_type == 2 => DatetimeKind::Range,
                _ => DatetimeKind::Unspecified,
            }),
            kind_code::ENUMERATION => {
                let cfg = self.enum_field.clone().unwrap_or_default();
                FieldKind::Enumeration {
                    value_type: EnumValueType::from_code(cfg.value_type),
                    multiple: cfg.is_multiple,
                }
            }
            kind_code::FILE => FieldKind::File,
            kind_code::IMAGE => FieldKind::Image,
            kind_code::VIDEO => FieldKind::Video,
            kind_code::MATERIAL_REFERENCE => FieldKind::MaterialReference,
            kind_code::GOTO => FieldKind::Goto,
            kind_code::TAG => FieldKind::Tag,
            kind_code::COLOR => FieldKind::Color,
            other => FieldKind::Unknown(other),
        }
    }
}

// ---------------------------------------------------------------------------
// FieldsDefinition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GotoParamName {
    #[serde(rename = "iOS")]
    pub ios: String,
    pub android: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DefinitionConfigs {
    pub system_field_name_is_unique: bool,
    pub cover_code: String,
    pub child_ref_code: String,
    #[serde(rename = "packageCode", deserialize_with = "null_default")]
    pub package_codes: Vec<String>,
    pub goto_param: Option<GotoParamName>,
}

/// A field schema, stored in the `fields_definition` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldsDefinition {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub category: FieldCategory,
    #[serde(default, deserialize_with = "null_default")]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub configs: DefinitionConfigs,
    #[serde(default)]
    pub deleted_at: i64,
}

impl FieldsDefinition {
    pub fn new(id: impl Into<String>, category: FieldCategory, fields: Vec<Field>) -> Self {
        Self {
            id: id.into(),
            scope: String::new(),
            name: String::new(),
            category,
            fields,
            configs: DefinitionConfigs::default(),
            deleted_at: 0,
        }
    }

    /// Look up a field by its code.
    pub fn field(&self, code: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.code == code)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
