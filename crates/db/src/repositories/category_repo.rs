//! Repository for `material_category`.

use mongodb::{Collection, Database};
use opsync_core::category::Category;
use opsync_core::legacy::LegacyCategory;

use crate::collections::MATERIAL_CATEGORY;

pub struct CategoryRepo;

impl CategoryRepo {
    pub fn collection(db: &Database) -> Collection<Category> {
        db.collection(MATERIAL_CATEGORY)
    }

    pub fn legacy_collection(db: &Database) -> Collection<LegacyCategory> {
        db.collection(MATERIAL_CATEGORY)
    }
}
