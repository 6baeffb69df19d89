//! Collection names inside the per scope/env databases.

pub const MATERIAL: &str = "material";
pub const MATERIAL_CATEGORY: &str = "material_category";
pub const MATERIAL_POSITION: &str = "materialPosition";
pub const PLAN: &str = "plan";
pub const FIELDS_DEFINITION: &str = "fields_definition";
pub const ACTIVITY: &str = "activity";
pub const H5_PROPERTIES: &str = "properties";
pub const UGC_CATEGORY: &str = "ugcCategory";

/// Database and collection of the Bmall relationship table.
pub const BMALL_DB: &str = "bmall";
pub const ID_RELATIONSHIP: &str = "id_relationship";

