//! Versioned materials.

use serde::{Deserialize, Serialize};

use crate::convert::{client_version_from_system, convert_custom_attributes};
use crate::field_value::{deserialize_custom, CustomMap, Localize, Period, Version};
use crate::fields::{FieldCategory, FieldsDefinition};
use crate::legacy::LegacyMaterial;
use crate::localize::convert_localized;
use crate::migrate::{Document, LegacyDocument};
use crate::overrides::OverrideKey;
use crate::serde_util::null_default;
use crate::sync_record::RecordKind;
use crate::types::{epoch, DocId, Timestamp};

/// Name given to the version created by migration.
pub const INITIAL_VERSION_NAME: &str = "初始版本";

/// Name of the `n`-th override version, `n` being the version count before
/// it was appended.
pub fn override_version_name(n: usize) -> String {
    format!("覆盖版本{n}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialVersion {
    #[serde(rename = "versionID")]
    pub version_id: DocId,
    #[serde(default)]
    pub version_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub vip: i32,
    #[serde(default, deserialize_with = "null_default")]
    pub tag: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub platform: Vec<String>,
    #[serde(default)]
    pub client_version: Version,
    #[serde(default)]
    pub valid_duration: Period,
    #[serde(default = "epoch")]
    pub created_at: Timestamp,
    #[serde(default = "epoch")]
    pub updated_at: Timestamp,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub mender: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "deserialize_custom")]
    pub custom: CustomMap,
    #[serde(default, deserialize_with = "null_default")]
    pub localize: Vec<Localize>,
}

impl MaterialVersion {
    pub fn is_vip(&self) -> bool {
        self.vip > 0
    }

    /// The override key this version satisfies for `material_id`.
    pub fn override_key(&self, material_id: DocId) -> OverrideKey {
        OverrideKey {
            material_id,
            vip: self.is_vip(),
            period: self.valid_duration,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    #[serde(rename = "_id")]
    pub id: DocId,
    #[serde(default)]
    pub scope: String,
    #[serde(rename = "typeID", default)]
    pub type_id: String,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub versions: Vec<MaterialVersion>,
}

impl Material {
    /// Assemble a versioned material with a single initial version.
    ///
    /// Apart from the freshly generated version id the result depends only
    /// on the inputs.
    pub fn from_legacy(old: &LegacyMaterial, schema: &FieldsDefinition) -> Self {
        let version = MaterialVersion {
            version_id: DocId::new(),
            version_name: INITIAL_VERSION_NAME.to_string(),
            name: old.name.clone(),
            vip: old.is_vip,
            tag: old.tag_ids.clone(),
            platform: old.platform.clone(),
            client_version: client_version_from_system(&old.system_attributes),
            valid_duration: Period {
                begin: old.date_period.start_date,
                end: old.date_period.end_date,
            },
            created_at: old.created_at,
            updated_at: old.updated_at,
            creator: old.creator.clone(),
            mender: old.mender.clone(),
            status: old.status.clone(),
            custom: convert_custom_attributes(schema, &old.custom_attributes),
            localize: convert_localized(schema, &old.localize_attributes),
        };

        Self {
            id: old.id,
            scope: old.scope.clone(),
            type_id: old.type_id.clone(),
            is_deleted: old.is_deleted,
            versions: vec![version],
        }
    }

    pub fn default_version(&self) -> Option<&MaterialVersion> {
        self.versions.first()
    }

    /// Index of the first version satisfying `key`.
    pub fn find_version(&self, key: &OverrideKey) -> Option<usize> {
        self.versions
            .iter()
            .position(|v| v.override_key(self.id) == *key)
    }
}

impl Document for Material {
    const KIND: RecordKind = RecordKind::Material;

    fn doc_id(&self) -> DocId {
        self.id
    }
}

impl Document for LegacyMaterial {
    const KIND: RecordKind = RecordKind::Material;

    fn doc_id(&self) -> DocId {
        self.id
    }
}

impl LegacyDocument for LegacyMaterial {
    type Target = Material;
    const FIELD_CATEGORY: FieldCategory = FieldCategory::Material;

    fn type_id(&self) -> &str {
        &self.type_id
    }

    fn migrate(&self, schema: &FieldsDefinition) -> Material {
        Material::from_legacy(self, schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field_value::FieldValue;
    use crate::fields::{kind_code, Field};
    use crate::legacy::{CustomAttribute, DatePeriod, LegacyFieldValue, ValueCell};

    fn legacy_material() -> LegacyMaterial {
        LegacyMaterial {
            id: DocId::new(),
            scope: "camera360".into(),
            type_id: "sticker".into(),
            name: "Hearts".into(),
            is_vip: 1,
            tag_ids: vec!["t1".into()],
            platform: vec!["ios".into(), "android".into()],
            date_period: DatePeriod {
                start_date: 100,
                end_date: 200,
            },
            system_attributes: vec![],
            custom_attributes: vec![CustomAttribute {
                code: "title".into(),
                field_type: "text".into(),
                value: Some(LegacyFieldValue {
                    text_value: Some(ValueCell { value: "hello".into() }),
                    ..Default::default()
                }),
            }],
            localize_attributes: vec![],
            status: "online".into(),
            is_deleted: false,
            creator: "ann".into(),
            mender: "bo".into(),
            created_at: bson::DateTime::from_millis(1_000),
            updated_at: bson::DateTime::from_millis(2_000),
        }
    }

    fn schema() -> FieldsDefinition {
        FieldsDefinition::new(
            "sticker",
            FieldCategory::Material,
            vec![Field {
                code: "title".into(),
                customized_field_type: kind_code::TEXT,
                ..Default::default()
            }],
        )
    }

    #[test]
    fn assembles_one_initial_version() {
        let old = legacy_material();
        let m = Material::from_legacy(&old, &schema());

        assert_eq!(m.id, old.id);
        assert_eq!(m.versions.len(), 1);
        let v = &m.versions[0];
        assert_eq!(v.version_name, INITIAL_VERSION_NAME);
        assert_eq!(v.vip, 1);
        assert_eq!(v.valid_duration, Period { begin: 100, end: 200 });
        assert_eq!(v.custom["title"], FieldValue::Text("hello".into()));
        assert_eq!(v.updated_at, old.updated_at);
    }

    #[test]
    fn assembling_twice_differs_only_in_version_ids() {
        let old = legacy_material();
        let mut a = Material::from_legacy(&old, &schema());
        let b = Material::from_legacy(&old, &schema());

        assert_ne!(a.versions[0].version_id, b.versions[0].version_id);
        a.versions[0].version_id = b.versions[0].version_id;
        assert_eq!(a, b);
    }

    #[test]
    fn find_version_matches_vip_and_period() {
        let m = Material::from_legacy(&legacy_material(), &schema());
        let hit = OverrideKey {
            material_id: m.id,
            vip: true,
            period: Period { begin: 100, end: 200 },
        };
        assert_eq!(m.find_version(&hit), Some(0));

        let miss = OverrideKey { vip: false, ..hit };
        assert_eq!(m.find_version(&miss), None);
    }

    #[test]
    fn stored_shape_uses_legacy_key_names() {
        let m = Material::from_legacy(&legacy_material(), &schema());
        let doc = bson::to_document(&m).unwrap();
        assert!(doc.contains_key("_id"));
        assert!(doc.contains_key("typeID"));
        let v = &doc.get_array("versions").unwrap()[0];
        let v = v.as_document().unwrap();
        assert!(v.get_object_id("versionID").is_ok());
        assert!(v.get_datetime("createdAt").is_ok());

        let back: Material = bson::from_document(doc).unwrap();
        assert_eq!(back, m);
    }
}
