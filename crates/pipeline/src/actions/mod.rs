//! One function per [`Action`].
//!
//! Every action walks the configured scope/env databases. A failure on one
//! database is logged and the action moves on to the next.

mod activity;
mod h5;
mod materials;
mod plans;
mod relationship;
mod ugc;

use std::sync::Arc;

use opsync_db::repositories::activity_repo::Backfill;

use crate::action::Action;
use crate::context::{ActionSummary, Connections, RunContext};
use crate::error::PipelineError;

pub use relationship::{RelationshipTally, BMALL_SOURCE_ENV, BMALL_SOURCE_SCOPE};

pub async fn run(
    action: Action,
    ctx: Arc<RunContext>,
    conns: &Connections,
) -> Result<ActionSummary, PipelineError> {
    tracing::info!(action = %action, "action started");
    let summary = match action {
        Action::SyncMaterials => materials::sync_materials(ctx, conns).await?,
        Action::SyncMaterialCategories => materials::sync_categories(&ctx, conns).await,
        Action::SyncPositions => plans::sync_positions(&ctx, conns).await,
        Action::SyncPlans => plans::sync_plans(&ctx, conns).await,
        Action::DealWithPlanOverrides => plans::materialize_overrides(&ctx, conns).await,
        Action::CountPlanOverrides => plans::count_overrides(&ctx, conns).await,
        Action::ClearMaterials => materials::clear_materials(&ctx, conns).await,
        Action::SyncH5Style => h5::sync_style(&ctx, conns).await,
        Action::ResetH5Type => h5::reset_type(&ctx, conns).await,
        Action::ResetH5Active => h5::reset_active(&ctx, conns).await,
        Action::ResetH5Attribute => h5::reset_attribute(&ctx, conns).await,
        Action::ResetH5StyleMainId => h5::reset_style_main_id(&ctx, conns).await,
        Action::ResetMaterialVersionId => materials::reset_version_ids(&ctx, conns).await,
        Action::InitUgcCategoryVersionName => ugc::init_category_version_name(&ctx, conns).await,
        Action::SetActivityType => activity::backfill(&ctx, conns, Backfill::Type).await,
        Action::SetSoftDelete => activity::backfill(&ctx, conns, Backfill::SoftDelete).await,
        Action::FixActivityActive => activity::backfill(&ctx, conns, Backfill::Active).await,
        Action::MapBmallIds => relationship::map_bmall_ids(conns).await?,
    };
    tracing::info!(action = %action, %summary, "action finished");
    Ok(summary)
}

/// Add the outcome of one database to `total`, logging failures.
fn absorb(total: &mut ActionSummary, db: &str, result: Result<ActionSummary, PipelineError>) {
    match result {
        Ok(summary) => *total += summary,
        Err(e) => tracing::error!(db, error = %e, "database skipped"),
    }
}
