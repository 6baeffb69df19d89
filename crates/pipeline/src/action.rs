//! The maintenance actions selectable on the command line.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    SyncMaterials,
    SyncMaterialCategories,
    SyncPositions,
    SyncPlans,
    DealWithPlanOverrides,
    CountPlanOverrides,
    ClearMaterials,
    SyncH5Style,
    ResetH5Type,
    ResetH5Active,
    ResetH5Attribute,
    ResetH5StyleMainId,
    ResetMaterialVersionId,
    InitUgcCategoryVersionName,
    SetActivityType,
    SetSoftDelete,
    FixActivityActive,
    MapBmallIds,
}

impl Action {
    pub const ALL: [Action; 18] = [
        Self::SyncMaterials,
        Self::SyncMaterialCategories,
        Self::SyncPositions,
        Self::SyncPlans,
        Self::DealWithPlanOverrides,
        Self::CountPlanOverrides,
        Self::ClearMaterials,
        Self::SyncH5Style,
        Self::ResetH5Type,
        Self::ResetH5Active,
        Self::ResetH5Attribute,
        Self::ResetH5StyleMainId,
        Self::ResetMaterialVersionId,
        Self::InitUgcCategoryVersionName,
        Self::SetActivityType,
        Self::SetSoftDelete,
        Self::FixActivityActive,
        Self::MapBmallIds,
    ];

    /// Name accepted by `--action`, also used to name the failure report.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SyncMaterials => "syncMaterials",
            Self::SyncMaterialCategories => "syncMaterialCategorys",
            Self::SyncPositions => "syncMaterialsPosition",
            Self::SyncPlans => "syncMaterialsPlan",
            Self::DealWithPlanOverrides => "dealWithPlanBytraverse",
            Self::CountPlanOverrides => "countPlanOverrides",
            Self::ClearMaterials => "clearMaterials",
            Self::SyncH5Style => "syncH5Style",
            Self::ResetH5Type => "resetH5Type",
            Self::ResetH5Active => "resetH5Active",
            Self::ResetH5Attribute => "resetH5Attribute",
            Self::ResetH5StyleMainId => "resetH5StyleMainID",
            Self::ResetMaterialVersionId => "resetMaterialVersionID",
            Self::InitUgcCategoryVersionName => "initUgcCategoryVersionName",
            Self::SetActivityType => "setActivityType",
            Self::SetSoftDelete => "setSoftDelete",
            Self::FixActivityActive => "fixActivityActive",
            Self::MapBmallIds => "mapOfBmallAndOPS",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action {0:?}")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}
