//! Run-wide cache of field schemas.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use opsync_core::fields::{FieldCategory, FieldsDefinition};
use opsync_core::scope::ScopeEnv;
use opsync_core::store::FieldSchemaSource;
use opsync_core::sync_record::lock_unpoisoned;

type SchemaKey = (ScopeEnv, String, FieldCategory);

/// Field schemas looked up during a run, misses included.
///
/// Type ids are only unique within one `field-definitions` database, so
/// entries are keyed by scope/env as well.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    cache: Mutex<HashMap<SchemaKey, Option<Arc<FieldsDefinition>>>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The schema for `type_id` under `category`, fetched from `source` on
    /// first use. Source errors are not cached.
    pub async fn get<S: FieldSchemaSource + ?Sized>(
        &self,
        source: &S,
        scope_env: &ScopeEnv,
        type_id: &str,
        category: FieldCategory,
    ) -> Result<Option<Arc<FieldsDefinition>>, S::Error> {
        let key = (scope_env.clone(), type_id.to_string(), category);
        let cached = lock_unpoisoned(&self.cache).get(&key).cloned();
        if let Some(hit) = cached {
            return Ok(hit);
        }

        let fetched = source.fetch_schema(type_id, category).await?.map(Arc::new);
        if fetched.is_none() {
            tracing::debug!(scope_env = %scope_env, type_id, category = %category, "no field definition");
        }
        lock_unpoisoned(&self.cache).insert(key, fetched.clone());
        Ok(fetched)
    }

    pub fn len(&self) -> usize {
        lock_unpoisoned(&self.cache).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
