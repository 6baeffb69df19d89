//! JSON wire representations published on the operate topics.
//!
//! Ids are hex strings, timestamps unix seconds, and localised buckets are
//! sorted default-first.

use std::collections::BTreeMap;

use opsync_core::category::{Category, CategoryVersion};
use opsync_core::field_value::{ClientVersion, CustomMap, Localize, Period, Version};
use opsync_core::h5::H5Properties;
use opsync_core::localize::sorted_localized;
use opsync_core::material::{Material, MaterialVersion};
use opsync_core::plan::{
    PlacingCategory, PlacingContent, PlacingMaterial, Plan, TimeRange, UserSelection,
    USER_SELECTION_GROUPS, USER_SELECTION_PROPERTIES,
};
use opsync_core::position::{
    MaterialPosition, DEVICE_LIMITED_MODEL, DEVICE_LIMITED_SYSTEM_VERSION,
};
use opsync_core::types::{unix_seconds, Timestamp};
use serde::Serialize;

fn seconds(ts: Option<Timestamp>) -> i64 {
    ts.map(unix_seconds).unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Material
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMaterial {
    pub id: String,
    #[serde(rename = "type")]
    pub type_id: String,
    pub scope: String,
    pub versions: Vec<ApiMaterialVersion>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMaterialVersion {
    #[serde(rename = "versionID")]
    pub version_id: String,
    pub version_name: String,
    pub name: String,
    pub vip: i32,
    pub tag: Vec<String>,
    pub platform: Vec<String>,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub creator: String,
    pub mender: String,
    pub valid_duration: Period,
    pub client_version: Version,
    pub custom: CustomMap,
    pub localize: Vec<Localize>,
}

impl From<&MaterialVersion> for ApiMaterialVersion {
    fn from(v: &MaterialVersion) -> Self {
        Self {
            version_id: v.version_id.to_hex(),
            version_name: v.version_name.clone(),
            name: v.name.clone(),
            vip: v.vip,
            tag: v.tag.clone(),
            platform: v.platform.clone(),
            status: v.status.clone(),
            created_at: unix_seconds(v.created_at),
            updated_at: unix_seconds(v.updated_at),
            creator: v.creator.clone(),
            mender: v.mender.clone(),
            valid_duration: v.valid_duration,
            client_version: v.client_version.clone(),
            custom: v.custom.clone(),
            localize: sorted_localized(&v.localize),
        }
    }
}

impl From<&Material> for ApiMaterial {
    fn from(m: &Material) -> Self {
        Self {
            id: m.id.to_hex(),
            type_id: m.type_id.clone(),
            scope: m.scope.clone(),
            versions: m.versions.iter().map(ApiMaterialVersion::from).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCategory {
    pub id: String,
    pub scope: String,
    pub sort_order: i32,
    pub parent: String,
    #[serde(rename = "type")]
    pub type_id: String,
    pub versions: Vec<ApiCategoryVersion>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCategoryVersion {
    #[serde(rename = "versionID")]
    pub version_id: String,
    pub version_name: String,
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub creator: String,
    pub mender: String,
    pub custom: CustomMap,
    pub localize: Vec<Localize>,
}

impl From<&CategoryVersion> for ApiCategoryVersion {
    fn from(v: &CategoryVersion) -> Self {
        Self {
            version_id: v.version_id.to_hex(),
            version_name: v.version_name.clone(),
            name: v.name.clone(),
            created_at: unix_seconds(v.created_at),
            updated_at: unix_seconds(v.updated_at),
            creator: v.creator.clone(),
            mender: v.mender.clone(),
            custom: v.custom.clone(),
            localize: sorted_localized(&v.localize),
        }
    }
}

impl From<&Category> for ApiCategory {
    fn from(c: &Category) -> Self {
        Self {
            id: c.id.to_hex(),
            scope: c.scope.clone(),
            sort_order: c.sort_order,
            parent: c.parent.clone(),
            type_id: c.type_id.clone(),
            versions: c.versions.iter().map(ApiCategoryVersion::from).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Material position
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMaterialPosition {
    pub id: String,
    pub scope: String,
    pub code: String,
    pub name: String,
    pub material_type_id: String,
    pub contains_category: bool,
    pub platform: Vec<String>,
    pub client_version: BTreeMap<String, ClientVersion>,
    pub device_model_limited: String,
    pub device_system_version_limited: String,
    pub summary: String,
    pub active: bool,
    pub goto_id: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub creator: String,
    pub editor: String,
}

impl From<&MaterialPosition> for ApiMaterialPosition {
    fn from(p: &MaterialPosition) -> Self {
        Self {
            id: p.id.to_hex(),
            scope: p.scope.clone(),
            code: p.code.clone(),
            name: p.name.clone(),
            material_type_id: p.material_type_id.clone(),
            contains_category: p.contains_category,
            platform: p.platform.clone(),
            client_version: p
                .client_version
                .iter()
                .map(|(platform, range)| (platform.clone(), range.to_client_version()))
                .collect(),
            device_model_limited: p.device_limit(DEVICE_LIMITED_MODEL).to_string(),
            device_system_version_limited: p
                .device_limit(DEVICE_LIMITED_SYSTEM_VERSION)
                .to_string(),
            summary: p.summary.clone(),
            active: p.active,
            goto_id: p.goto_id.clone(),
            created_at: unix_seconds(p.created_at),
            updated_at: unix_seconds(p.updated_at),
            creator: p.creator.clone(),
            editor: p.editor.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// A period in unix seconds; an unset end is omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApiPeriod {
    pub begin: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
}

impl From<TimeRange> for ApiPeriod {
    fn from(r: TimeRange) -> Self {
        Self {
            begin: seconds(r.begin),
            end: r.end.map(unix_seconds),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiUserProperty {
    pub code: String,
    pub op: String,
    pub value: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiUserSelection {
    #[serde(rename = "type")]
    pub selection_type: i32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub user_properties: Vec<ApiUserProperty>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub user_groups_id: Vec<String>,
}

impl From<&UserSelection> for ApiUserSelection {
    fn from(s: &UserSelection) -> Self {
        let mut api = Self {
            selection_type: s.selection_type,
            user_properties: Vec::new(),
            user_groups_id: Vec::new(),
        };
        match s.selection_type {
            USER_SELECTION_GROUPS => api.user_groups_id = s.user_groups_id.clone(),
            USER_SELECTION_PROPERTIES => {
                api.user_properties = s
                    .user_properties
                    .iter()
                    .map(|p| ApiUserProperty {
                        code: p.code.clone(),
                        op: p.op.clone(),
                        value: p.value.clone(),
                    })
                    .collect()
            }
            _ => {}
        }
        api
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPlacingMaterial {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vip: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<ApiPeriod>,
    #[serde(rename = "versionID")]
    pub version_id: String,
}

impl From<&PlacingMaterial> for ApiPlacingMaterial {
    fn from(m: &PlacingMaterial) -> Self {
        Self {
            id: m.id.clone(),
            vip: m.vip,
            period: m.period.map(ApiPeriod::from),
            version_id: m.version_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPlacingCategory {
    pub id: String,
    pub pid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<ApiPeriod>,
    pub materials: Vec<ApiPlacingMaterial>,
}

impl From<&PlacingCategory> for ApiPlacingCategory {
    fn from(c: &PlacingCategory) -> Self {
        Self {
            id: c.id.clone(),
            pid: c.pid.clone(),
            active: c.active,
            period: c.period.map(ApiPeriod::from),
            materials: c.materials.iter().map(ApiPlacingMaterial::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCategoryContent {
    pub category_type_def_id: String,
    pub categories: Vec<ApiPlacingCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiMaterialList {
    pub list: Vec<ApiPlacingMaterial>,
}

/// A placing content holds either categories or a flat material list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPlacingContent {
    pub id: String,
    pub ratio: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_value: Option<ApiCategoryContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_value: Option<ApiMaterialList>,
}

impl From<&PlacingContent> for ApiPlacingContent {
    fn from(c: &PlacingContent) -> Self {
        let (category_value, material_value) = if c.category_type_def_id.is_empty() {
            let list = c.materials.iter().map(ApiPlacingMaterial::from).collect();
            (None, Some(ApiMaterialList { list }))
        } else {
            let content = ApiCategoryContent {
                category_type_def_id: c.category_type_def_id.clone(),
                categories: c.categories.iter().map(ApiPlacingCategory::from).collect(),
            };
            (Some(content), None)
        };
        Self {
            id: c.id.to_hex(),
            ratio: c.ratio,
            category_value,
            material_value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPlan {
    pub id: String,
    pub pos_id: String,
    pub scope: String,
    #[serde(rename = "type")]
    pub plan_type: String,
    pub name: String,
    pub active: bool,
    pub priority: i64,
    pub period: ApiPeriod,
    pub user_selection: ApiUserSelection,
    pub creator: String,
    pub editor: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub contents: Vec<ApiPlacingContent>,
}

impl From<&Plan> for ApiPlan {
    fn from(p: &Plan) -> Self {
        Self {
            id: p.id.to_hex(),
            pos_id: p.pos_id.to_hex(),
            scope: p.scope.clone(),
            plan_type: p.plan_type.clone(),
            name: p.name.clone(),
            active: p.active,
            priority: p.priority,
            period: ApiPeriod::from(p.period()),
            user_selection: ApiUserSelection::from(&p.user_selection),
            creator: p.creator.clone(),
            editor: p.editor.clone(),
            created_at: seconds(p.created_at),
            updated_at: seconds(p.updated_at),
            contents: p
                .placing_contents
                .iter()
                .map(ApiPlacingContent::from)
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// H5 properties
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiH5Properties {
    pub id: String,
    pub attribute: String,
    pub style: String,
    #[serde(rename = "activityID")]
    pub activity_id: String,
}

/// h5 properties together with the name of their activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiH5PropertiesWithName {
    pub h5_properties: ApiH5Properties,
    pub name: String,
}

impl ApiH5PropertiesWithName {
    pub fn new(props: &H5Properties, activity_name: &str) -> Self {
        Self {
            h5_properties: ApiH5Properties {
                id: props.id.to_hex(),
                attribute: props.attribute.clone(),
                style: props.style.clone(),
                activity_id: props.activity_id.clone(),
            },
            name: activity_name.to_string(),
        }
    }
}
