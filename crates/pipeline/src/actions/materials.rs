//! Material and category migration, and material repairs.

use std::sync::Arc;

use mongodb::Client;
use opsync_core::scope::{logical_db, ScopeEnv, OPERATION_ENV};
use opsync_core::sync_record::RecordKind;
use opsync_db::collections::MATERIAL;
use opsync_db::repositories::material_repo::CLEAR_UPDATED_AFTER_MS;
use opsync_db::repositories::{CategoryRepo, MaterialRepo};
use opsync_db::stores::{CollectionPages, CollectionSink, SchemaDatabase};
use tokio::task::JoinSet;

use super::absorb;
use crate::context::{ActionSummary, Connections, RunContext};
use crate::error::PipelineError;
use crate::sync::migrate_collection;

/// `syncMaterials`: one task per source database.
pub(super) async fn sync_materials(
    ctx: Arc<RunContext>,
    conns: &Connections,
) -> Result<ActionSummary, PipelineError> {
    let mut tasks = JoinSet::new();
    for scope_env in ctx.scopes.scope_envs() {
        let ctx = Arc::clone(&ctx);
        let client = conns.mongo.clone();
        tasks.spawn(async move {
            let result = sync_material_db(&ctx, &client, &scope_env).await;
            (scope_env, result)
        });
    }

    let mut total = ActionSummary::default();
    while let Some(joined) = tasks.join_next().await {
        let (scope_env, result) = joined?;
        absorb(&mut total, &scope_env.db_name(logical_db::LEGACY_MATERIALS), result);
    }
    Ok(total)
}

async fn sync_material_db(
    ctx: &RunContext,
    client: &Client,
    scope_env: &ScopeEnv,
) -> Result<ActionSummary, PipelineError> {
    let legacy = client.database(&scope_env.db_name(logical_db::LEGACY_MATERIALS));
    let target = client.database(&scope_env.db_name(logical_db::MATERIALS));
    let fields = client.database(&scope_env.db_name(logical_db::FIELD_DEFINITIONS));
    tracing::info!(from = %legacy.name(), to = %target.name(), "syncing materials");

    migrate_collection(
        ctx,
        scope_env,
        &CollectionPages::new(MaterialRepo::legacy_collection(&legacy)),
        &SchemaDatabase::new(fields),
        &CollectionSink::new(MaterialRepo::collection(&target)),
    )
    .await
}

/// `syncMaterialCategorys`: databases one after another.
pub(super) async fn sync_categories(ctx: &RunContext, conns: &Connections) -> ActionSummary {
    let mut total = ActionSummary::default();
    for scope_env in ctx.scopes.scope_envs() {
        let legacy = conns.mongo.database(&scope_env.db_name(logical_db::LEGACY_MATERIALS));
        let target = conns.mongo.database(&scope_env.db_name(logical_db::MATERIALS));
        let fields = conns.mongo.database(&scope_env.db_name(logical_db::FIELD_DEFINITIONS));
        tracing::info!(from = %legacy.name(), to = %target.name(), "syncing categories");

        let result = migrate_collection(
            ctx,
            &scope_env,
            &CollectionPages::new(CategoryRepo::legacy_collection(&legacy)),
            &SchemaDatabase::new(fields),
            &CollectionSink::new(CategoryRepo::collection(&target)),
        )
        .await;
        absorb(&mut total, legacy.name(), result);
    }
    total
}

/// `clearMaterials`: drop migrated materials edited after the cut-over.
pub(super) async fn clear_materials(ctx: &RunContext, conns: &Connections) -> ActionSummary {
    let cutoff = bson::DateTime::from_millis(CLEAR_UPDATED_AFTER_MS);
    let mut total = ActionSummary::default();
    for scope_env in ctx.scopes.scope_envs() {
        let db = conns.mongo.database(&scope_env.db_name(logical_db::MATERIALS));
        let result = MaterialRepo::delete_updated_after(&db, cutoff)
            .await
            .map(|deleted| {
                tracing::info!(db = %db.name(), deleted, "materials cleared");
                let deleted = usize::try_from(deleted).unwrap_or(usize::MAX);
                ActionSummary {
                    processed: deleted,
                    written: deleted,
                    ..Default::default()
                }
            })
            .map_err(PipelineError::from);
        absorb(&mut total, db.name(), result);
    }
    total
}

/// `resetMaterialVersionID`: give version 0 of every material the id it
/// has in the scope's operation env.
pub(super) async fn reset_version_ids(ctx: &RunContext, conns: &Connections) -> ActionSummary {
    let mut total = ActionSummary::default();
    for (scope, envs) in ctx.scopes.scopes() {
        let operation = ScopeEnv::new(scope, OPERATION_ENV);
        let source = conns.mongo.database(&operation.db_name(logical_db::MATERIALS));
        let materials = match MaterialRepo::list_all(&source).await {
            Ok(materials) => materials,
            Err(e) => {
                tracing::error!(db = %source.name(), error = %e, "database skipped");
                continue;
            }
        };

        for material in &materials {
            let Some(version) = material.default_version() else {
                continue;
            };
            for env in envs.iter() {
                let scope_env = ScopeEnv::new(scope, env.as_str());
                if scope_env.is_operation() {
                    continue;
                }
                let db = conns.mongo.database(&scope_env.db_name(logical_db::MATERIALS));
                total.processed += 1;
                match MaterialRepo::set_default_version_id(&db, material.id, version.version_id)
                    .await
                {
                    Ok(true) => total.written += 1,
                    Ok(false) => {
                        tracing::debug!(db = %db.name(), material = %material.id, "not present")
                    }
                    Err(e) => {
                        ctx.record_failure(
                            &format!("{}.{MATERIAL}", db.name()),
                            material.id,
                            RecordKind::Material,
                            e,
                            &scope_env,
                        );
                        total.failed += 1;
                    }
                }
            }
        }
        tracing::info!(scope, materials = materials.len(), "version ids reset");
    }
    total
}
