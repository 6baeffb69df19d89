//! Placement plans.
//!
//! A plan places materials (directly, or grouped by category) in a
//! position. A placed material may override the material's VIP flag or
//! validity window; see [`crate::overrides`] for how such overrides become
//! material versions.

use serde::{Deserialize, Serialize};

use crate::field_value::Period;
use crate::migrate::Document;
use crate::serde_util::{is_empty_str, null_default};
use crate::sync_record::RecordKind;
use crate::types::{unix_seconds, DocId, Timestamp};

/// A time window stored as BSON datetimes. Missing bounds are omitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<Timestamp>,
}

impl TimeRange {
    /// Unix-second period; a missing bound reads as zero.
    pub fn to_period(self) -> Period {
        Period {
            begin: self.begin.map(unix_seconds).unwrap_or(0),
            end: self.end.map(unix_seconds).unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSelectionProperty {
    pub code: String,
    pub op: String,
    #[serde(deserialize_with = "null_default")]
    pub value: Vec<String>,
}

/// Audience selection: 0 everyone, 1 user properties, 2 user groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserSelection {
    #[serde(rename = "type")]
    pub selection_type: i32,
    #[serde(deserialize_with = "null_default")]
    pub user_properties: Vec<UserSelectionProperty>,
    #[serde(rename = "userGroupsID", deserialize_with = "null_default")]
    pub user_groups_id: Vec<String>,
}

pub const USER_SELECTION_PROPERTIES: i32 = 1;
pub const USER_SELECTION_GROUPS: i32 = 2;

/// A material placed by a plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacingMaterial {
    /// Material id as hex.
    pub id: String,
    /// Placed version; empty means the default version.
    #[serde(rename = "versionID")]
    pub version_id: String,
    pub vip: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<TimeRange>,
}

/// The traits a placement asks the material to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverrideRequest {
    pub vip: Option<bool>,
    pub period: Option<Period>,
}

impl PlacingMaterial {
    /// True when the entry overrides VIP or period and has not been bound
    /// to a specific version yet.
    pub fn has_override(&self) -> bool {
        self.version_id.is_empty() && (self.vip.is_some() || self.period.is_some())
    }

    pub fn override_request(&self) -> Option<OverrideRequest> {
        self.has_override().then(|| OverrideRequest {
            vip: self.vip,
            period: self.period.map(TimeRange::to_period),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacingCategory {
    pub id: String,
    #[serde(skip_serializing_if = "is_empty_str")]
    pub pid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<TimeRange>,
    #[serde(deserialize_with = "null_default")]
    pub materials: Vec<PlacingMaterial>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacingContent {
    pub id: DocId,
    #[serde(default)]
    pub ratio: i32,
    /// Set when the position groups materials by category.
    #[serde(
        rename = "categoryTypeDefID",
        default,
        skip_serializing_if = "is_empty_str"
    )]
    pub category_type_def_id: String,
    #[serde(
        default,
        deserialize_with = "null_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub categories: Vec<PlacingCategory>,
    #[serde(
        default,
        deserialize_with = "null_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub materials: Vec<PlacingMaterial>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    #[serde(rename = "_id")]
    pub id: DocId,
    #[serde(rename = "posID")]
    pub pos_id: DocId,
    #[serde(default)]
    pub scope: String,
    #[serde(rename = "type", default)]
    pub plan_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Timestamp>,
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub user_selection: UserSelection,
    #[serde(rename = "placingContents", default, deserialize_with = "null_default")]
    pub placing_contents: Vec<PlacingContent>,
    #[serde(default)]
    pub decision_data_changed_at: Option<Timestamp>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(rename = "createdat", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(rename = "updatedat", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub editor: String,
}

impl Plan {
    pub fn period(&self) -> TimeRange {
        TimeRange {
            begin: self.begin,
            end: self.end,
        }
    }

    /// Every placed material: per content, category materials first, then
    /// the content's own materials.
    pub fn placing_materials_mut(&mut self) -> impl Iterator<Item = &mut PlacingMaterial> {
        self.placing_contents.iter_mut().flat_map(|content| {
            let PlacingContent {
                categories,
                materials,
                ..
            } = content;
            categories
                .iter_mut()
                .flat_map(|c| c.materials.iter_mut())
                .chain(materials.iter_mut())
        })
    }

    pub fn placing_materials(&self) -> impl Iterator<Item = &PlacingMaterial> {
        self.placing_contents.iter().flat_map(|content| {
            content
                .categories
                .iter()
                .flat_map(|c| c.materials.iter())
                .chain(content.materials.iter())
        })
    }

    pub fn has_pending_overrides(&self) -> bool {
        self.placing_materials().any(PlacingMaterial::has_override)
    }
}

impl Document for Plan {
    const KIND: RecordKind = RecordKind::Plan;

    fn doc_id(&self) -> DocId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placed(id: &str) -> PlacingMaterial {
        PlacingMaterial {
            id: id.into(),
            ..Default::default()
        }
    }

    fn plan_with(contents: Vec<PlacingContent>) -> Plan {
        Plan {
            id: DocId::new(),
            pos_id: DocId::new(),
            scope: "camera360".into(),
            plan_type: "normal".into(),
            name: "p".into(),
            active: true,
            begin: None,
            end: None,
            priority: 0,
            user_selection: UserSelection::default(),
            placing_contents: contents,
            decision_data_changed_at: None,
            is_deleted: false,
            created_at: None,
            updated_at: None,
            creator: String::new(),
            editor: String::new(),
        }
    }

    #[test]
    fn override_requires_empty_version_id() {
        let mut m = placed("a");
        assert!(!m.has_override());

        m.vip = Some(false);
        assert!(m.has_override());
        assert_eq!(
            m.override_request(),
            Some(OverrideRequest {
                vip: Some(false),
                period: None
            })
        );

        m.version_id = "64b0c1d2e3f4a5b6c7d8e9f0".into();
        assert!(!m.has_override());
        assert_eq!(m.override_request(), None);
    }

    #[test]
    fn time_range_reads_unix_seconds() {
        let r = TimeRange {
            begin: Some(bson::DateTime::from_millis(10_500)),
            end: None,
        };
        assert_eq!(r.to_period(), Period { begin: 10, end: 0 });
    }

    #[test]
    fn placing_materials_walks_categories_then_materials() {
        let content = PlacingContent {
            id: DocId::new(),
            ratio: 100,
            category_type_def_id: "c".into(),
            categories: vec![PlacingCategory {
                id: "cat".into(),
                materials: vec![placed("a"), placed("b")],
                ..Default::default()
            }],
            materials: vec![placed("c")],
        };
        let mut plan = plan_with(vec![content.clone(), content]);
        let ids: Vec<String> = plan.placing_materials_mut().map(|m| m.id.clone()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "a", "b", "c"]);

        plan.placing_materials_mut().for_each(|m| m.vip = Some(true));
        assert!(plan.has_pending_overrides());
    }

    #[test]
    fn empty_optional_parts_are_omitted_when_stored() {
        let plan = plan_with(vec![PlacingContent {
            id: DocId::new(),
            ratio: 0,
            category_type_def_id: String::new(),
            categories: vec![],
            materials: vec![placed("m")],
        }]);
        let doc = bson::to_document(&plan).unwrap();
        assert!(!doc.contains_key("begin"));
        let content = doc.get_array("placingContents").unwrap()[0]
            .as_document()
            .unwrap()
            .clone();
        assert!(!content.contains_key("categories"));
        assert!(!content.contains_key("categoryTypeDefID"));
        let m = content.get_array("materials").unwrap()[0].as_document().unwrap().clone();
        assert!(!m.contains_key("period"));
        assert_eq!(m.get_str("versionID").unwrap(), "");
    }
}
