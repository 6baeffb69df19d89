//! Plan override materialisation.
//!
//! A placement that overrides a material's VIP flag or validity window is
//! rewritten to point at a material version carrying those values. Matching
//! versions are reused; otherwise version 0 is cloned, patched, appended and
//! persisted. Ids of created versions are remembered per [`OverrideKey`] for
//! the rest of the run so every database assigns the same id to the same
//! override.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::field_value::Period;
use crate::material::{override_version_name, MaterialVersion};
use crate::plan::{OverrideRequest, Plan};
use crate::scope::{ExclusionList, ScopeEnv};
use crate::store::MaterialStore;
use crate::sync_record::lock_unpoisoned;
use crate::types::{parse_doc_id, DocId};

/// Identity of an override version: which material, and the VIP flag and
/// period it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverrideKey {
    pub material_id: DocId,
    pub vip: bool,
    pub period: Period,
}

impl OverrideKey {
    /// The key `request` resolves to on top of the default version `base`.
    pub fn resolve(material_id: DocId, base: &MaterialVersion, request: &OverrideRequest) -> Self {
        Self {
            material_id,
            vip: request.vip.unwrap_or_else(|| base.is_vip()),
            period: request.period.unwrap_or(base.valid_duration),
        }
    }
}

/// Run-wide map of override key to the version id created for it.
#[derive(Debug, Default)]
pub struct OverrideCache {
    ids: Mutex<HashMap<OverrideKey, DocId>>,
}

impl OverrideCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &OverrideKey) -> Option<DocId> {
        lock_unpoisoned(&self.ids).get(key).copied()
    }

    pub fn insert(&self, key: OverrideKey, version_id: DocId) {
        lock_unpoisoned(&self.ids).insert(key, version_id);
    }

    pub fn len(&self) -> usize {
        lock_unpoisoned(&self.ids).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OverrideError<E: std::error::Error + 'static> {
    #[error("placement references invalid material id {0:?}")]
    InvalidMaterialId(String),

    #[error("material {0} not found")]
    MissingMaterial(DocId),

    #[error("material {0} has no versions")]
    EmptyMaterial(DocId),

    #[error("material store: {0}")]
    Store(#[source] E),
}

/// What [`OverrideMaterializer::apply`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverrideOutcome {
    /// Placements whose version id was rewritten.
    pub rewritten: usize,
    /// Versions appended to materials.
    pub created: usize,
}

impl OverrideOutcome {
    /// True when the plan was modified and must be saved.
    pub fn changed(&self) -> bool {
        self.rewritten > 0
    }
}

pub struct OverrideMaterializer<'a, S> {
    store: &'a S,
    cache: &'a OverrideCache,
    exclusions: &'a ExclusionList,
    scope_env: &'a ScopeEnv,
}

impl<'a, S: MaterialStore> OverrideMaterializer<'a, S> {
    pub fn new(
        store: &'a S,
        cache: &'a OverrideCache,
        exclusions: &'a ExclusionList,
        scope_env: &'a ScopeEnv,
    ) -> Self {
        Self {
            store,
            cache,
            exclusions,
            scope_env,
        }
    }

    /// Bind every overriding placement of `plan` to a material version.
    ///
    /// Stops at the first error; materials already saved stay saved and
    /// placements already rewritten stay rewritten.
    pub async fn apply(&self, plan: &mut Plan) -> Result<OverrideOutcome, OverrideError<S::Error>> {
        let mut outcome = OverrideOutcome::default();

        for placed in plan.placing_materials_mut() {
            let Some(request) = placed.override_request() else {
                continue;
            };
            if self.exclusions.is_excluded(self.scope_env, &placed.id) {
                continue;
            }

            let material_id = parse_doc_id(&placed.id)
                .map_err(|_| OverrideError::InvalidMaterialId(placed.id.clone()))?;
            let mut material = self
                .store
                .load_material(material_id)
                .await
                .map_err(OverrideError::Store)?
                .ok_or(OverrideError::MissingMaterial(material_id))?;
            let base = material
                .default_version()
                .cloned()
                .ok_or(OverrideError::EmptyMaterial(material_id))?;

            let key = OverrideKey::resolve(material_id, &base, &request);

            match material.find_version(&key) {
                // The default version already carries the override.
                Some(0) => {}
                Some(i) => {
                    let version_id = material.versions[i].version_id;
                    placed.version_id = version_id.to_hex();
                    self.cache.insert(key, version_id);
                    outcome.rewritten += 1;
                }
                None => {
                    let version_id = self.cache.get(&key).unwrap_or_else(DocId::new);
                    let mut version = base;
                    version.version_id = version_id;
                    version.vip = i32::from(key.vip);
                    version.valid_duration = key.period;
                    version.version_name = override_version_name(material.versions.len());
                    material.versions.push(version);

                    self.store
                        .save_material(&material)
                        .await
                        .map_err(OverrideError::Store)?;
                    tracing::info!(
                        material = %material_id,
                        version = %version_id,
                        "appended override version"
                    );

                    placed.version_id = version_id.to_hex();
                    self.cache.insert(key, version_id);
                    outcome.rewritten += 1;
                    outcome.created += 1;
                }
            }
        }

        Ok(outcome)
    }
}
