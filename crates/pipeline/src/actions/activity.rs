//! Field backfills on `activity`.

use opsync_core::scope::logical_db;
use opsync_db::repositories::activity_repo::Backfill;
use opsync_db::repositories::ActivityRepo;

use super::absorb;
use crate::context::{ActionSummary, Connections, RunContext};

/// `setActivityType`, `setSoftDelete` and `fixActivityActive`.
pub(super) async fn backfill(ctx: &RunContext, conns: &Connections, field: Backfill) -> ActionSummary {
    let mut total = ActionSummary::default();
    for scope_env in ctx.scopes.scope_envs() {
        let db = conns.mongo.database(&scope_env.db_name(logical_db::ACTIVITIES));
        let result = ActivityRepo::backfill(&db, field).await.map(|modified| {
            tracing::info!(db = %db.name(), field = ?field, modified, "activities backfilled");
            let modified = usize::try_from(modified).unwrap_or(usize::MAX);
            ActionSummary {
                processed: modified,
                written: modified,
                ..Default::default()
            }
        });
        absorb(&mut total, db.name(), result.map_err(Into::into));
    }
    total
}
