//! Repository for `materialPosition`.

use mongodb::{Collection, Database};
use opsync_core::position::MaterialPosition;

use crate::collections::MATERIAL_POSITION;

pub struct PositionRepo;

impl PositionRepo {
    pub fn collection(db: &Database) -> Collection<MaterialPosition> {
        db.collection(MATERIAL_POSITION)
    }
}
