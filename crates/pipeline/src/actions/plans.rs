//! Position and plan copies, and plan override handling.

use opsync_core::scope::logical_db;
use opsync_db::repositories::{PlanRepo, PositionRepo};
use opsync_db::stores::{CollectionPages, CollectionSink, MaterialDatabase};

use super::absorb;
use crate::context::{ActionSummary, Connections, RunContext};
use crate::sync::{copy_collection, materialize_plans};

/// `syncMaterialsPosition`: legacy positions db to the materials db.
pub(super) async fn sync_positions(ctx: &RunContext, conns: &Connections) -> ActionSummary {
    let mut total = ActionSummary::default();
    for scope_env in ctx.scopes.scope_envs() {
        let legacy = conns.mongo.database(&scope_env.db_name(logical_db::LEGACY_POSITIONS));
        let target = conns.mongo.database(&scope_env.db_name(logical_db::MATERIALS));
        let result = copy_collection(
            ctx,
            &scope_env,
            &CollectionPages::new(PositionRepo::collection(&legacy)),
            &CollectionSink::new(PositionRepo::collection(&target)),
        )
        .await;
        absorb(&mut total, legacy.name(), result);
    }
    total
}

/// `syncMaterialsPlan`: legacy positions db to the materials db.
pub(super) async fn sync_plans(ctx: &RunContext, conns: &Connections) -> ActionSummary {
    let mut total = ActionSummary::default();
    for scope_env in ctx.scopes.scope_envs() {
        let legacy = conns.mongo.database(&scope_env.db_name(logical_db::LEGACY_POSITIONS));
        let target = conns.mongo.database(&scope_env.db_name(logical_db::MATERIALS));
        let result = copy_collection(
            ctx,
            &scope_env,
            &CollectionPages::new(PlanRepo::collection(&legacy)),
            &CollectionSink::new(PlanRepo::collection(&target)),
        )
        .await;
        absorb(&mut total, legacy.name(), result);
    }
    total
}

/// `dealWithPlanBytraverse`
pub(super) async fn materialize_overrides(ctx: &RunContext, conns: &Connections) -> ActionSummary {
    let mut total = ActionSummary::default();
    for scope_env in ctx.scopes.scope_envs() {
        let db = conns.mongo.database(&scope_env.db_name(logical_db::MATERIALS));
        let result = materialize_plans(
            ctx,
            &scope_env,
            &CollectionPages::new(PlanRepo::collection(&db)),
            &MaterialDatabase::new(db.clone()),
            &CollectionSink::new(PlanRepo::collection(&db)),
        )
        .await;
        absorb(&mut total, db.name(), result);
    }
    total
}

/// `countPlanOverrides`
pub(super) async fn count_overrides(ctx: &RunContext, conns: &Connections) -> ActionSummary {
    let mut total = ActionSummary::default();
    for scope_env in ctx.scopes.scope_envs() {
        let db = conns.mongo.database(&scope_env.db_name(logical_db::MATERIALS));
        let result = PlanRepo::count_with_overrides(&db).await.map(|count| {
            if count > 0 {
                tracing::info!(db = %db.name(), scope_env = %scope_env, count, "plans with overrides");
            }
            ActionSummary {
                processed: usize::try_from(count).unwrap_or(usize::MAX),
                ..Default::default()
            }
        });
        absorb(&mut total, db.name(), result.map_err(Into::into));
    }
    total
}
