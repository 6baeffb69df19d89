//! Repository for `field-definitions.fields_definition`.

use bson::{doc, Document};
use mongodb::{Collection, Database};
use opsync_core::fields::{FieldCategory, FieldsDefinition};

use crate::collections::FIELDS_DEFINITION;
use crate::DbError;

pub struct FieldDefinitionRepo;

impl FieldDefinitionRepo {
    pub fn collection(db: &Database) -> Collection<FieldsDefinition> {
        db.collection(FIELDS_DEFINITION)
    }

    /// The schema of `type_id` under `category`, if one exists.
    pub async fn find(
        db: &Database,
        type_id: &str,
        category: FieldCategory,
    ) -> Result<Option<FieldsDefinition>, DbError> {
        let found = Self::collection(db)
            .find_one(schema_filter(type_id, category))
            .await?;
        Ok(found)
    }
}

pub fn schema_filter(type_id: &str, category: FieldCategory) -> Document {
    doc! { "_id": type_id, "type": category.code() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_matches_id_and_category_code() {
        let f = schema_filter("sticker", FieldCategory::MaterialCategory);
        assert_eq!(f.get_str("_id").unwrap(), "sticker");
        assert_eq!(f.get_i32("type").unwrap(), 2);
    }
}
