//! Legacy value → typed [`FieldValue`] conversion.
//!
//! Conversion is pure and driven by the field's declared [`FieldKind`]: the
//! populated slot of the legacy value is ignored unless it is the one the
//! kind reads. An absent value, an absent schema field, or a kind with no
//! value representation (goto, tag, unknown) yields `None`.

use crate::field_value::{CustomMap, FieldValue, Reference, Version, REFERENCE_TYPE_MATERIAL};
use crate::fields::{
    system_code, DatetimeKind, EnumValueType, Field, FieldKind, FieldsDefinition, NumberKind,
};
use crate::legacy::{CustomAttribute, LegacyFieldValue, LegacyReference};

/// Convert one legacy value according to `field`.
pub fn convert_value(value: &LegacyFieldValue, field: &Field) -> Option<FieldValue> {
    match field.kind() {
        FieldKind::Text => text(value),
        FieldKind::Color => value
            .color_value
            .as_ref()
            .map(|c| FieldValue::Text(c.value.clone())),
        FieldKind::Number(kind) => number(value, kind),
        FieldKind::NumberRange => Some(FieldValue::NumberFloatArray(
            value
                .number_range_value
                .as_ref()
                .and_then(|c| c.value.clone())
                .unwrap_or_default(),
        )),
        FieldKind::Datetime(DatetimeKind::Point) => value
            .date_time_value
            .as_ref()
            .and_then(|c| c.value.as_ref())
            .and_then(|v| v.first().copied())
            .map(FieldValue::NumberInt),
        FieldKind::Datetime(DatetimeKind::Range) => Some(FieldValue::NumberIntArray(
            value
                .date_time_value
                .as_ref()
                .and_then(|c| c.value.clone())
                .unwrap_or_default(),
        )),
        FieldKind::Datetime(DatetimeKind::Unspecified) => None,
        FieldKind::Enumeration {
            value_type,
            multiple,
        } => enumeration(enum_items(value), value_type, multiple),
        FieldKind::File => value.file_value.as_ref().map(|f| FieldValue::File(f.to_file())),
        FieldKind::Image => value
            .image_value
            .as_ref()
            .map(|i| FieldValue::Image(i.to_image())),
        FieldKind::Video => value
            .video_value
            .as_ref()
            .map(|v| FieldValue::Video(v.to_video())),
        FieldKind::MaterialReference => value
            .reference_value
            .as_ref()
            .map(|r| FieldValue::Reference(reference(r))),
        FieldKind::Goto | FieldKind::Tag | FieldKind::Unknown(_) => None,
    }
}

/// Convert a list of legacy attributes against a schema.
///
/// Attributes with no value, no matching field, or no converted value are
/// left out of the map.
pub fn convert_custom_attributes(schema: &FieldsDefinition, attrs: &[CustomAttribute]) -> CustomMap {
    attrs
        .iter()
        .filter_map(|attr| {
            let value = attr.value.as_ref()?;
            let field = schema.field(&attr.code)?;
            convert_value(value, field).map(|v| (attr.code.clone(), v))
        })
        .collect()
}

/// Client version compatibility from the `clientVersion` system attribute.
pub fn client_version_from_system(system: &[CustomAttribute]) -> Version {
    system
        .iter()
        .find(|a| a.code == system_code::CLIENT_VERSION && a.value.is_some())
        .and_then(|a| a.value.as_ref())
        .and_then(|v| v.version_value.as_ref())
        .map(|platforms| Version {
            v: platforms
                .iter()
                .filter_map(|(p, range)| range.as_ref().map(|r| (p.clone(), r.to_client_version())))
                .collect(),
        })
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Per-kind helpers
// ---------------------------------------------------------------------------

fn text(value: &LegacyFieldValue) -> Option<FieldValue> {
    value
        .text_value
        .as_ref()
        .map(|c| FieldValue::Text(c.value.clone()))
}

/// The schema decides int vs float; only the matching legacy slot is read.
fn number(value: &LegacyFieldValue, kind: NumberKind) -> Option<FieldValue> {
    match kind {
        NumberKind::Int => value
            .number_int
            .as_ref()
            .and_then(|c| c.value)
            .map(FieldValue::NumberInt),
        NumberKind::Float => value
            .number_float
            .as_ref()
            .and_then(|c| c.value)
            .map(FieldValue::NumberFloat),
        NumberKind::Unspecified => None,
    }
}

fn enum_items(value: &LegacyFieldValue) -> Option<&[String]> {
    value
        .enum_value
        .as_ref()
        .and_then(|c| c.value.as_deref())
}

/// Decode enumeration values.
///
/// Unparsable ints and floats become zero and unparsable bools `false`,
/// matching how the values were read before migration. Bool enumerations
/// always read the first item, whatever their multiplicity.
pub fn enumeration(
    items: Option<&[String]>,
    value_type: EnumValueType,
    multiple: bool,
) -> Option<FieldValue> {
    let items = items.unwrap_or_default();
    let first = items.first();

    match (value_type, multiple) {
        (EnumValueType::Bool, _) => first.map(|s| FieldValue::Bool(parse_bool(s))),
        (EnumValueType::Int, true) => Some(FieldValue::NumberIntArray(
            items.iter().map(|s| parse_int(s)).collect(),
        )),
        (EnumValueType::Int, false) => first.map(|s| FieldValue::NumberInt(parse_int(s))),
        (EnumValueType::Float, true) => Some(FieldValue::NumberFloatArray(
            items.iter().map(|s| parse_float(s)).collect(),
        )),
        (EnumValueType::Float, false) => first.map(|s| FieldValue::NumberFloat(parse_float(s))),
        (EnumValueType::String, true) => Some(FieldValue::TextArray(items.to_vec())),
        (EnumValueType::String, false) => first.map(|s| FieldValue::Text(s.clone())),
    }
}

fn parse_int(s: &str) -> i64 {
    s.parse().unwrap_or(0)
}

fn parse_float(s: &str) -> f64 {
    s.parse().unwrap_or(0.0)
}

fn parse_bool(s: &str) -> bool {
    matches!(s, "1" | "t" | "T" | "true" | "TRUE" | "True")
}

fn reference(r: &LegacyReference) -> Reference {
    Reference {
        value: r.value.clone(),
        pkg_url: r.pkg_url.clone(),
        pack_info: r
            .pack_info
            .iter()
            .flatten()
            .filter_map(|(locale, file)| file.as_ref().map(|f| (locale.clone(), f.to_file())))
            .collect(),
        reference_type: REFERENCE_TYPE_MATERIAL,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{kind_code, DatetimeConfig, EnumConfig, FieldCategory, NumberConfig};
    use crate::legacy::{LegacyFile, LegacyVideo, LegacyImage, SemVer, SemVerRange, ValueCell};
    use assert_matches::assert_matches;
    use std::collections::BTreeMap;

    fn field(kind: i32) -> Field {
        Field {
            code: "f".into(),
            customized_field_type: kind,
            ..Default::default()
        }
    }

    fn enum_field(value_type: i32, multiple: bool) -> Field {
        Field {
            enum_field: Some(EnumConfig {
                is_multiple: multiple,
                value_type,
                enum_items: vec![],
            }),
            ..field(kind_code::ENUMERATION)
        }
    }

    fn enum_value(items: &[&str]) -> LegacyFieldValue {
        LegacyFieldValue {
            enum_value: Some(ValueCell {
                value: Some(items.iter().map(|s| s.to_string()).collect()),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn enum_int_single_parses_first_item() {
        let v = convert_value(&enum_value(&["3"]), &enum_field(1, false));
        assert_eq!(v, Some(FieldValue::NumberInt(3)));
    }

    #[test]
    fn enum_bool_reads_first_item_or_nothing() {
        assert_eq!(
            convert_value(&enum_value(&["true"]), &enum_field(2, false)),
            Some(FieldValue::Bool(true))
        );
        assert_eq!(
            convert_value(&enum_value(&["true", "false"]), &enum_field(2, true)),
            Some(FieldValue::Bool(true))
        );
        assert_eq!(convert_value(&enum_value(&[]), &enum_field(2, false)), None);
    }

    #[test]
    fn enum_parse_failures_coerce_to_zero() {
        assert_eq!(
            convert_value(&enum_value(&["x", "2"]), &enum_field(1, true)),
            Some(FieldValue::NumberIntArray(vec![0, 2]))
        );
        assert_eq!(
            convert_value(&enum_value(&["nope"]), &enum_field(3, false)),
            Some(FieldValue::NumberFloat(0.0))
        );
        assert_eq!(
            convert_value(&enum_value(&["yes"]), &enum_field(2, false)),
            Some(FieldValue::Bool(false))
        );
    }

    #[test]
    fn enum_string_multi_keeps_items() {
        assert_eq!(
            convert_value(&enum_value(&["a", "b"]), &enum_field(0, true)),
            Some(FieldValue::TextArray(vec!["a".into(), "b".into()]))
        );
        assert_eq!(
            convert_value(&enum_value(&["a"]), &enum_field(9, false)),
            Some(FieldValue::Text("a".into()))
        );
    }

    #[test]
    fn populated_slot_is_not_authoritative() {
        // A text field whose legacy value only populated the enum slot.
        let v = convert_value(&enum_value(&["a"]), &field(kind_code::TEXT));
        assert_eq!(v, None);
    }

    #[test]
    fn number_follows_schema_numeric_kind() {
        let value = LegacyFieldValue {
            number_value: Some(ValueCell { value: 7.9 }),
            number_int: Some(ValueCell { value: Some(3) }),
            number_float: Some(ValueCell { value: Some(2.5) }),
            ..Default::default()
        };
        let int_field = Field {
            number_field: Some(NumberConfig {
                number_type: 1,
                hint: String::new(),
            }),
            ..field(kind_code::NUMBER)
        };
        let float_field = Field {
            number_field: Some(NumberConfig {
                number_type: 2,
                hint: String::new(),
            }),
            ..field(kind_code::NUMBER)
        };
        assert_eq!(convert_value(&value, &int_field), Some(FieldValue::NumberInt(3)));
        assert_eq!(
            convert_value(&value, &float_field),
            Some(FieldValue::NumberFloat(2.5))
        );
        assert_eq!(convert_value(&value, &field(kind_code::NUMBER)), None);
    }

    #[test]
    fn number_ignores_slots_of_the_other_kind() {
        let int_field = Field {
            number_field: Some(NumberConfig {
                number_type: 1,
                hint: String::new(),
            }),
            ..field(kind_code::NUMBER)
        };
        let float_field = Field {
            number_field: Some(NumberConfig {
                number_type: 2,
                hint: String::new(),
            }),
            ..field(kind_code::NUMBER)
        };
        let generic_only = LegacyFieldValue {
            number_value: Some(ValueCell { value: 7.9 }),
            ..Default::default()
        };
        assert_eq!(convert_value(&generic_only, &int_field), None);
        assert_eq!(convert_value(&generic_only, &float_field), None);

        let float_only = LegacyFieldValue {
            number_float: Some(ValueCell { value: Some(7.9) }),
            ..Default::default()
        };
        assert_eq!(convert_value(&float_only, &int_field), None);

        let int_only = LegacyFieldValue {
            number_int: Some(ValueCell { value: Some(7) }),
            ..Default::default()
        };
        assert_eq!(convert_value(&int_only, &float_field), None);
    }

    #[test]
    fn datetime_point_and_range() {
        let value = LegacyFieldValue {
            date_time_value: Some(ValueCell {
                value: Some(vec![100, 200]),
            }),
            ..Default::default()
        };
        let mut f = field(kind_code::DATETIME);
        f.datetime_field = Some(DatetimeConfig { datetime_type: 1 });
        assert_eq!(convert_value(&value, &f), Some(FieldValue::NumberInt(100)));

        f.datetime_field = Some(DatetimeConfig { datetime_type: 2 });
        assert_eq!(
            convert_value(&value, &f),
            Some(FieldValue::NumberIntArray(vec![100, 200]))
        );

        f.datetime_field = None;
        assert_eq!(convert_value(&value, &f), None);
    }

    #[test]
    fn number_range_defaults_to_empty() {
        let v = convert_value(&LegacyFieldValue::default(), &field(kind_code::NUMBER_RANGE));
        assert_eq!(v, Some(FieldValue::NumberFloatArray(vec![])));
    }

    #[test]
    fn video_carries_screenshot() {
        let value = LegacyFieldValue {
            video_value: Some(LegacyVideo {
                uri: "v.mp4".into(),
                suffix: "mp4".into(),
                width: 10,
                height: 20,
                screenshot: Some(LegacyImage {
                    uri: "s.png".into(),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_matches!(
            convert_value(&value, &field(kind_code::VIDEO)),
            Some(FieldValue::Video(v)) if v.ext == "mp4" && v.width == 10 && v.screenshot.as_ref().unwrap().uri == "s.png"
        );
    }

    #[test]
    fn reference_keeps_pack_info() {
        let value = LegacyFieldValue {
            reference_value: Some(LegacyReference {
                value: vec!["m1".into()],
                pkg_url: "pkg".into(),
                pack_info: Some(BTreeMap::from([
                    ("zh-Hans".to_string(), Some(LegacyFile { uri: "z".into(), ..Default::default() })),
                    ("broken".to_string(), None),
                ])),
            }),
            ..Default::default()
        };
        assert_matches!(
            convert_value(&value, &field(kind_code::MATERIAL_REFERENCE)),
            Some(FieldValue::Reference(r)) if r.pack_info.len() == 1 && r.pack_info["zh-Hans"].uri == "z"
        );
    }

    #[test]
    fn goto_tag_and_unknown_are_skipped() {
        let value = LegacyFieldValue {
            tag_value: Some(ValueCell {
                value: Some(vec!["t".into()]),
            }),
            ..Default::default()
        };
        assert_eq!(convert_value(&value, &field(kind_code::TAG)), None);
        assert_eq!(convert_value(&value, &field(kind_code::GOTO)), None);
        assert_eq!(convert_value(&value, &field(99)), None);
    }

    #[test]
    fn custom_attributes_skip_unknown_codes_and_absent_values() {
        let schema = FieldsDefinition::new(
            "t",
            FieldCategory::Material,
            vec![Field {
                code: "title".into(),
                ..field(kind_code::TEXT)
            }],
        );
        let attrs = vec![
            CustomAttribute {
                code: "title".into(),
                value: Some(LegacyFieldValue {
                    text_value: Some(ValueCell { value: "hi".into() }),
                    ..Default::default()
                }),
                ..Default::default()
            },
            CustomAttribute {
                code: "unknown".into(),
                value: Some(LegacyFieldValue::default()),
                ..Default::default()
            },
            CustomAttribute {
                code: "title2".into(),
                value: None,
                ..Default::default()
            },
        ];
        let map = convert_custom_attributes(&schema, &attrs);
        assert_eq!(map.len(), 1);
        assert_eq!(map["title"], FieldValue::Text("hi".into()));
    }

    #[test]
    fn client_version_reads_system_attribute() {
        let system = vec![CustomAttribute {
            code: system_code::CLIENT_VERSION.into(),
            value: Some(LegacyFieldValue {
                version_value: Some(BTreeMap::from([
                    (
                        "ios".to_string(),
                        Some(SemVerRange {
                            min: SemVer(bson::Bson::String("1.0.0".into())),
                            ..Default::default()
                        }),
                    ),
                    ("android".to_string(), None),
                ])),
                ..Default::default()
            }),
            ..Default::default()
        }];
        let version = client_version_from_system(&system);
        assert_eq!(version.v.len(), 1);
        assert_eq!(version.v["ios"].min, "1.0.0");
        assert_eq!(client_version_from_system(&[]), Version::default());
    }
}
