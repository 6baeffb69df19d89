//! Activities and the h5 properties derived from them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::migrate::Document;
use crate::sync_record::RecordKind;
use crate::types::DocId;

/// Activity types that are h5 pages (2) or h5 templates (3).
pub const H5_ACTIVITY_TYPES: [i32; 2] = [2, 3];
/// Field definitions whose h5 nodes are positioned by `posCenter`.
pub const POS_CENTER_FIELD_CODES: [&str; 2] = ["image-t1", "text-t1"];

const POS_CENTER: &str = "posCenter";
const Z_INDEX: &str = "zIndex";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Extral {
    /// JSON text `{"style": {...}, "attribute": {...}}`.
    pub html5_style: String,
}

/// A node of an activity tree in `operational-positions.activity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(rename = "_id")]
    pub id: DocId,
    #[serde(default)]
    pub scope: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<DocId>,
    /// Root of the tree; equal to `id` on roots.
    #[serde(rename = "rootID", default, skip_serializing_if = "Option::is_none")]
    pub root_id: Option<DocId>,
    #[serde(rename = "type", default)]
    pub activity_type: i32,
    #[serde(default)]
    pub extral: Extral,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub active: bool,
    #[serde(rename = "isDeleted", default)]
    pub is_deleted: bool,
}

impl Document for Activity {
    const KIND: RecordKind = RecordKind::Activity;

    fn doc_id(&self) -> DocId {
        self.id
    }
}

/// Rendering properties of one h5 activity, in `h5.properties`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct H5Properties {
    #[serde(rename = "_id")]
    pub id: DocId,
    #[serde(default)]
    pub attribute: String,
    #[serde(default)]
    pub style: String,
    /// Hex id of the owning activity.
    #[serde(rename = "activityID", default)]
    pub activity_id: String,
}

impl H5Properties {
    /// Properties for `activity` keyed by the activity's own id, used when
    /// none exist yet so every environment ends up with the same id.
    pub fn for_activity(activity: &Activity) -> Self {
        Self {
            id: activity.id,
            attribute: String::new(),
            style: String::new(),
            activity_id: activity.id.to_hex(),
        }
    }
}

impl Document for H5Properties {
    const KIND: RecordKind = RecordKind::H5Properties;

    fn doc_id(&self) -> DocId {
        self.id
    }
}

/// Split `extral.html5Style` into its `style` and `attribute` JSON texts.
///
/// Unparseable input yields two empty strings; a missing or null part
/// yields an empty string for that part.
pub fn extract_style_and_attribute(html5_style: &str) -> (String, String) {
    let Ok(Value::Object(parts)) = serde_json::from_str::<Value>(html5_style) else {
        return (String::new(), String::new());
    };
    let render = |key: &str| match parts.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(v) => to_sorted_json(v.clone()).unwrap_or_default(),
    };
    (render("style"), render("attribute"))
}

/// Add `"posCenter": true` to an attribute JSON object when it lacks the
/// key and its `zIndex` is absent or numerically below 1.
///
/// Returns the new attribute text, or `None` when nothing changes.
pub fn ensure_pos_center(attribute: &str) -> Result<Option<String>, serde_json::Error> {
    let mut attrs = if attribute.is_empty() {
        BTreeMap::new()
    } else {
        serde_json::from_str::<BTreeMap<String, Value>>(attribute)?
    };

    if attrs.contains_key(POS_CENTER) {
        return Ok(None);
    }
    let needs = match attrs.get(Z_INDEX) {
        None => true,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|z| z < 1.0),
        Some(_) => false,
    };
    if !needs {
        return Ok(None);
    }

    attrs.insert(POS_CENTER.to_string(), Value::Bool(true));
    to_sorted_json(Value::Object(attrs.into_iter().collect())).map(Some)
}

/// JSON text with object keys in ascending order at every depth, the form
/// the h5 services store.
fn to_sorted_json(value: Value) -> Result<String, serde_json::Error> {
    serde_json::to_string(&sort_keys(value))
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, sort_keys(v))).collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_both_parts() {
        let raw = r#"{"style":{"opacity":1},"attribute":{"zIndex":0,"left":0,"borderRadius":10}}"#;
        let (style, attr) = extract_style_and_attribute(raw);
        assert_eq!(style, r#"{"opacity":1}"#);
        assert_eq!(attr, r#"{"borderRadius":10,"left":0,"zIndex":0}"#);
    }

    #[test]
    fn nested_keys_are_sorted() {
        let raw = r#"{"style":{"z":{"b":1,"a":2},"a":[{"y":0,"x":0}]},"attribute":{}}"#;
        let (style, attr) = extract_style_and_attribute(raw);
        assert_eq!(style, r#"{"a":[{"x":0,"y":0}],"z":{"a":2,"b":1}}"#);
        assert_eq!(attr, "{}");

        assert_eq!(
            ensure_pos_center(r#"{"size":{"w":1,"h":2},"zIndex":0.5}"#)
                .unwrap()
                .as_deref(),
            Some(r#"{"posCenter":true,"size":{"h":2,"w":1},"zIndex":0.5}"#)
        );
    }

    #[test]
    fn bad_or_partial_style_yields_empty_parts() {
        assert_eq!(extract_style_and_attribute(""), (String::new(), String::new()));
        assert_eq!(
            extract_style_and_attribute(r#"{"style":null,"attribute":[1]}"#),
            (String::new(), "[1]".to_string())
        );
    }

    #[test]
    fn pos_center_added_for_low_or_missing_z_index() {
        assert_eq!(ensure_pos_center("").unwrap().as_deref(), Some(r#"{"posCenter":true}"#));
        assert_eq!(
            ensure_pos_center(r#"{"zIndex":0,"left":3}"#).unwrap().as_deref(),
            Some(r#"{"left":3,"posCenter":true,"zIndex":0}"#)
        );
        assert_eq!(
            ensure_pos_center(r#"{"top":1}"#).unwrap().as_deref(),
            Some(r#"{"posCenter":true,"top":1}"#)
        );
    }

    #[test]
    fn pos_center_left_alone_otherwise() {
        assert_eq!(ensure_pos_center(r#"{"posCenter":false}"#).unwrap(), None);
        assert_eq!(ensure_pos_center(r#"{"zIndex":2}"#).unwrap(), None);
        assert_eq!(ensure_pos_center(r#"{"zIndex":"0"}"#).unwrap(), None);
        assert!(ensure_pos_center("not json").is_err());
    }

    #[test]
    fn activity_decodes_without_optional_links() {
        let id = DocId::new();
        let a: Activity = bson::from_document(bson::doc! {
            "_id": id,
            "type": 2,
            "extral": { "html5Style": "{}" },
            "name": "spring",
        })
        .unwrap();
        assert_eq!(a.pid, None);
        assert_eq!(a.root_id, None);
        assert!(!a.is_deleted);

        let props = H5Properties::for_activity(&a);
        assert_eq!(props.id, id);
        assert_eq!(props.activity_id, id.to_hex());
    }
}
