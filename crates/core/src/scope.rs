//! Tenant scopes, deployment environments, and database naming.
//!
//! Every tenant ("scope") has one database per environment and logical
//! service, named `{scope}_{env}_{logical}`, for example
//! `camera360_prod_operational_materials`.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Scopes covered by a run unless overridden.
pub const DEFAULT_SCOPES: &[&str] = &[
    "videobeats",
    "camera360",
    "idphoto",
    "mix",
    "salad",
    "inface",
    "icc",
    "april",
];

/// Environments covered for every scope unless overridden.
pub const DEFAULT_ENVS: &[&str] = &["prod", "operation", "dev", "qa", "pre"];

/// The environment whose documents other environments are repaired from.
pub const OPERATION_ENV: &str = "operation";

/// Logical database names appended to `{scope}_{env}_`.
pub mod logical_db {
    pub const LEGACY_MATERIALS: &str = "operations_materials";
    pub const MATERIALS: &str = "operational_materials";
    pub const LEGACY_POSITIONS: &str = "material-positions-v2";
    pub const FIELD_DEFINITIONS: &str = "field-definitions";
    pub const ACTIVITIES: &str = "operational-positions";
    pub const H5: &str = "h5";
    pub const UGC: &str = "operational_ugc";
}

/// Material ids that must never be migrated or overridden, per scope/env.
const EXCLUDED_MATERIAL_IDS: &[(&str, &str, &[&str])] = &[(
    "videobeats",
    "operation",
    &[
        "63a51a0fe99dc512b16e916b", "63bb8379b52c0f797ff1810f", "63bb83dcbdf592838b09a5d9",
        "63a52418d72a90f71ab08c19", "63bbb554b52c0f797ff18112", "63bbb4fbb52c0f797ff18111",
        "63bbb521bdf592838b09a5da", "63bb83a7b52c0f797ff18110", "63a523e9d72a90f71ab08c18",
        "638416db53b5477a729ed71f", "6384176de1da649b2cbffedf", "638417287e366f7d1575903b",
        "63745112e26f5473a81fd750", "637451938e9024f2dd0f428c", "63745166e26f5473a81fd751",
        "6250134db404242ef7d2c218", "6305ea701fbbb4d2e0a0159e", "634d3053a2a8727060a9f0a8",
        "634d30a5a2a8727060a9f0aa", "634d306ea2a8727060a9f0a9", "634d302718ff2d1020834187",
        "62aa95005ae6ac2543af58a7", "6348d692a2a8727060a9f0a0", "62f9e6fb6a3e09b6bbc52bb6",
        "626506c61ce80fa6e768f41b", "630c79f31fbbb4d2e0a015a6", "630c7a4b6a3e09b6bbc52bdd",
        "619f288b9d06e8d7a7b537c0", "619f28729d06e8d7a7b537bf", "61e7c4dc253a4e1487ec9672",
        "61e7c4ba253a4e1487ec9671", "62b27976f24cc3cfb0168e0a", "62b2795c5ae6ac2543af58bb",
        "630327e06a3e09b6bbc52bbb", "62b405ecf24cc3cfb0168e10", "62b406945ae6ac2543af58bf",
        "6306eb731fbbb4d2e0a015a1",
    ],
)];

// ---------------------------------------------------------------------------
// ScopeEnv
// ---------------------------------------------------------------------------

/// One tenant scope in one deployment environment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeEnv {
    pub scope: String,
    pub env: String,
}

impl ScopeEnv {
    pub fn new(scope: impl Into<String>, env: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            env: env.into(),
        }
    }

    /// Full database name for a logical database of this scope/env.
    ///
    /// ```
    /// use opsync_core::scope::{logical_db, ScopeEnv};
    ///
    /// let se = ScopeEnv::new("camera360", "prod");
    /// assert_eq!(se.db_name(logical_db::MATERIALS), "camera360_prod_operational_materials");
    /// ```
    pub fn db_name(&self, logical: &str) -> String {
        format!("{}_{}_{}", self.scope, self.env, logical)
    }

    /// Recover the scope and env from a `{scope}_{env}_...` database name.
    pub fn parse_db_name(name: &str) -> Result<Self, CoreError> {
        let mut parts = name.split('_');
        match (parts.next(), parts.next()) {
            (Some(scope), Some(env)) if !scope.is_empty() && !env.is_empty() => {
                Ok(Self::new(scope, env))
            }
            _ => Err(CoreError::Validation(format!(
                "cannot derive scope and env from database name '{name}'"
            ))),
        }
    }

    pub fn is_operation(&self) -> bool {
        self.env == OPERATION_ENV
    }
}

impl fmt::Display for ScopeEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.scope, self.env)
    }
}

// ---------------------------------------------------------------------------
// ScopeTable
// ---------------------------------------------------------------------------

/// The set of scope → environments a run iterates over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeTable {
    entries: BTreeMap<String, Vec<String>>,
}

impl ScopeTable {
    pub fn new(entries: BTreeMap<String, Vec<String>>) -> Self {
        Self { entries }
    }

    /// Parse a table of the form `camera360:prod,qa;icc:dev`.
    ///
    /// Whitespace around names is ignored. Empty scope or env names are
    /// rejected, as is a scope with no envs.
    pub fn parse(spec: &str) -> Result<Self, CoreError> {
        let mut entries = BTreeMap::new();
        for chunk in spec.split(';').map(str::trim).filter(|c| !c.is_empty()) {
            let (scope, envs) = chunk.split_once(':').ok_or_else(|| {
                CoreError::Validation(format!("scope entry '{chunk}' is missing ':'"))
            })?;
            let scope = scope.trim();
            if scope.is_empty() {
                return Err(CoreError::Validation(format!(
                    "scope entry '{chunk}' has an empty scope"
                )));
            }
            let envs: Vec<String> = envs
                .split(',')
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string)
                .collect();
            if envs.is_empty() {
                return Err(CoreError::Validation(format!(
                    "scope '{scope}' lists no environments"
                )));
            }
            entries.insert(scope.to_string(), envs);
        }
        if entries.is_empty() {
            return Err(CoreError::Validation("scope table is empty".to_string()));
        }
        Ok(Self { entries })
    }

    /// Every scope/env pair, ordered by scope then by the listed env order.
    pub fn scope_envs(&self) -> Vec<ScopeEnv> {
        self.entries
            .iter()
            .flat_map(|(scope, envs)| envs.iter().map(move |env| ScopeEnv::new(scope, env)))
            .collect()
    }

    /// Scopes with their environment lists.
    pub fn scopes(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(s, e)| (s.as_str(), e.as_slice()))
    }
}

impl Default for ScopeTable {
    fn default() -> Self {
        let entries = DEFAULT_SCOPES
            .iter()
            .map(|s| {
                let envs = DEFAULT_ENVS.iter().map(|e| e.to_string()).collect();
                (s.to_string(), envs)
            })
            .collect();
        Self { entries }
    }
}

// ---------------------------------------------------------------------------
// ExclusionList
// ---------------------------------------------------------------------------

/// Material ids skipped by migration and override handling.
#[derive(Debug, Clone, Default)]
pub struct ExclusionList {
    by_scope_env: HashMap<ScopeEnv, HashSet<String>>,
}

impl ExclusionList {
    /// The list shipped with the tool.
    pub fn builtin() -> Self {
        let mut list = Self::default();
        for (scope, env, ids) in EXCLUDED_MATERIAL_IDS {
            for id in *ids {
                list.insert(ScopeEnv::new(*scope, *env), *id);
            }
        }
        list
    }

    pub fn insert(&mut self, scope_env: ScopeEnv, id: impl Into<String>) {
        self.by_scope_env
            .entry(scope_env)
            .or_default()
            .insert(id.into());
    }

    pub fn is_excluded(&self, scope_env: &ScopeEnv, id: &str) -> bool {
        self.by_scope_env
            .get(scope_env)
            .is_some_and(|ids| ids.contains(id))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_db_name_takes_first_two_segments() {
        let se = ScopeEnv::parse_db_name("camera360_prod_operations_materials").unwrap();
        assert_eq!(se, ScopeEnv::new("camera360", "prod"));

        let se = ScopeEnv::parse_db_name("icc_qa_material-positions-v2").unwrap();
        assert_eq!(se, ScopeEnv::new("icc", "qa"));
    }

    #[test]
    fn parse_db_name_rejects_single_segment() {
        assert!(ScopeEnv::parse_db_name("bmall").is_err());
        assert!(ScopeEnv::parse_db_name("_prod").is_err());
    }

    #[test]
    fn default_table_covers_every_scope_and_env() {
        let table = ScopeTable::default();
        assert_eq!(
            table.scope_envs().len(),
            DEFAULT_SCOPES.len() * DEFAULT_ENVS.len()
        );
    }

    #[test]
    fn parse_table_keeps_env_order() {
        let table = ScopeTable::parse(" icc : dev ; camera360:prod, qa ").unwrap();
        let pairs: Vec<String> = table.scope_envs().iter().map(|s| s.to_string()).collect();
        assert_eq!(pairs, vec!["camera360_prod", "camera360_qa", "icc_dev"]);
    }

    #[test]
    fn parse_table_rejects_scope_without_envs() {
        assert!(ScopeTable::parse("icc:").is_err());
        assert!(ScopeTable::parse("icc").is_err());
        assert!(ScopeTable::parse("").is_err());
    }

    #[test]
    fn builtin_exclusions_are_scoped() {
        let list = ExclusionList::builtin();
        let id = "63a51a0fe99dc512b16e916b";
        assert!(list.is_excluded(&ScopeEnv::new("videobeats", "operation"), id));
        assert!(!list.is_excluded(&ScopeEnv::new("videobeats", "prod"), id));
        assert!(!list.is_excluded(&ScopeEnv::new("videobeats", "operation"), "other"));
    }
}
