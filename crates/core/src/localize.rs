//! Localised attribute buckets.

use crate::convert::convert_custom_attributes;
use crate::field_value::{ClientLocale, Localize};
use crate::fields::{system_code, FieldsDefinition};
use crate::legacy::LocalizeAttribute;

/// Convert legacy localised buckets, keeping their stored order.
pub fn convert_localized(schema: &FieldsDefinition, buckets: &[LocalizeAttribute]) -> Vec<Localize> {
    buckets.iter().map(|b| convert_bucket(schema, b)).collect()
}

fn convert_bucket(schema: &FieldsDefinition, bucket: &LocalizeAttribute) -> Localize {
    let mut out = Localize::default();

    for attr in &bucket.system_attributes {
        let Some(value) = attr.value.as_ref() else {
            continue;
        };
        match attr.code.as_str() {
            system_code::PRIORITY => {
                if let Some(n) = value.number_value.as_ref() {
                    out.priority = n.value as i32;
                }
            }
            system_code::CLIENT_LOCALE => {
                out.client_locale = value
                    .name_and_values_value
                    .as_ref()
                    .and_then(|list| list.first())
                    .map(|nv| ClientLocale {
                        typ: nv.name.clone(),
                        selected: nv.value.clone(),
                    });
            }
            _ => {}
        }
    }

    out.custom = convert_custom_attributes(schema, &bucket.custom_attributes);
    out
}

/// Order buckets: `default` locale first, then the rest by ascending
/// priority. The sort is stable.
pub fn sort_localized(buckets: &mut [Localize]) {
    buckets.sort_by_key(|b| {
        if b.is_default() {
            (0, 0)
        } else {
            (1, b.priority)
        }
    });
}

/// [`sort_localized`] on an owned copy.
pub fn sorted_localized(buckets: &[Localize]) -> Vec<Localize> {
    let mut out = buckets.to_vec();
    sort_localized(&mut out);
    out
}
