//! Deserialisation helpers for documents written by other services.
//!
//! Those writers store empty slices and maps as BSON `null`, which serde's
//! `#[serde(default)]` alone does not accept.

use serde::{Deserialize, Deserializer};

/// Treat a missing or `null` value as `T::default()`.
pub fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `skip_serializing_if` predicate for empty strings.
pub fn is_empty_str(s: &str) -> bool {
    s.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "null_default")]
        tags: Vec<String>,
    }

    #[test]
    fn null_and_missing_become_default() {
        let h: Holder = bson::from_document(bson::doc! { "tags": bson::Bson::Null }).unwrap();
        assert!(h.tags.is_empty());

        let h: Holder = bson::from_document(bson::doc! {}).unwrap();
        assert!(h.tags.is_empty());

        let h: Holder = bson::from_document(bson::doc! { "tags": ["a"] }).unwrap();
        assert_eq!(h.tags, vec!["a".to_string()]);
    }
}
