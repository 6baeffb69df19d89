use opsync_core::category::DEFAULT_VERSION_NAME;
use opsync_core::material::INITIAL_VERSION_NAME;
use opsync_core::scope::logical_db;
use opsync_db::repositories::UgcCategoryRepo;

use super::absorb;
use crate::context::{ActionSummary, Connections, RunContext};

/// `initUgcCategoryVersionName`: ugc category versions named like the
/// migrated default are renamed to the initial version name.
pub(super) async fn init_category_version_name(
    ctx: &RunContext,
    conns: &Connections,
) -> ActionSummary {
    let mut total = ActionSummary::default();
    for scope_env in ctx.scopes.scope_envs() {
        let db = conns.mongo.database(&scope_env.db_name(logical_db::UGC));
        let result = UgcCategoryRepo::rename_versions(&db, DEFAULT_VERSION_NAME, INITIAL_VERSION_NAME)
            .await
            .map(|renamed| {
                tracing::info!(db = %db.name(), renamed, "ugc category versions renamed");
                let renamed = usize::try_from(renamed).unwrap_or(usize::MAX);
                ActionSummary {
                    processed: renamed,
                    written: renamed,
                    ..Default::default()
                }
            });
        absorb(&mut total, db.name(), result.map_err(Into::into));
    }
    total
}
