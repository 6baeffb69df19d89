//! h5 activity repairs and the h5 properties sync.

use opsync_core::h5::{ensure_pos_center, extract_style_and_attribute, Activity, H5Properties};
use opsync_core::migrate::Document;
use opsync_core::scope::{logical_db, ScopeEnv, OPERATION_ENV};
use opsync_db::collections::{ACTIVITY, H5_PROPERTIES};
use opsync_db::repositories::{ActivityRepo, H5PropertiesRepo};
use opsync_db::Database;
use opsync_events::envelope::NamedH5Properties;
use opsync_events::publish_batch;

use super::absorb;
use crate::context::{ActionSummary, Connections, RunContext};
use crate::error::PipelineError;

/// `syncH5Style`: split each activity's `html5Style` into an h5 properties
/// document and announce it.
pub(super) async fn sync_style(ctx: &RunContext, conns: &Connections) -> ActionSummary {
    let mut total = ActionSummary::default();
    for scope_env in ctx.scopes.scope_envs() {
        let activities = conns.mongo.database(&scope_env.db_name(logical_db::ACTIVITIES));
        let h5 = conns.mongo.database(&scope_env.db_name(logical_db::H5));
        let result = sync_style_db(ctx, &scope_env, &activities, &h5).await;
        absorb(&mut total, activities.name(), result);
    }
    total
}

async fn sync_style_db(
    ctx: &RunContext,
    scope_env: &ScopeEnv,
    activities: &Database,
    h5: &Database,
) -> Result<ActionSummary, PipelineError> {
    let source = format!("{}.{ACTIVITY}", activities.name());
    let found = ActivityRepo::find_h5(activities).await?;
    tracing::info!(db = %activities.name(), activities = found.len(), "syncing h5 styles");

    let mut summary = ActionSummary::default();
    let mut written = Vec::with_capacity(found.len());
    for activity in found {
        summary.processed += 1;
        let activity_id = activity.id.to_hex();

        // Existing properties keep their id; new ones take the activity's
        // id so every env agrees on it.
        let mut props = match H5PropertiesRepo::find_by_activity_id(h5, &activity_id).await {
            Ok(existing) => existing.unwrap_or_else(|| H5Properties::for_activity(&activity)),
            Err(e) => {
                ctx.record_failure(&source, activity.id, Activity::KIND, e, scope_env);
                summary.failed += 1;
                continue;
            }
        };
        let (style, attribute) = extract_style_and_attribute(&activity.extral.html5_style);
        props.style = style;
        props.attribute = attribute;
        props.activity_id = activity_id;

        if let Err(e) = H5PropertiesRepo::upsert(h5, &props).await {
            ctx.record_failure(&source, activity.id, Activity::KIND, e, scope_env);
            summary.failed += 1;
            continue;
        }
        written.push(NamedH5Properties {
            properties: props,
            activity_name: activity.name,
        });
    }

    summary.written = written.len();
    summary.published = publish_batch(ctx.sender.as_ref(), ctx.batch_size, scope_env, &written).await;
    Ok(summary)
}

/// `resetH5Type`: every node of an h5 tree takes its root's type.
pub(super) async fn reset_type(ctx: &RunContext, conns: &Connections) -> ActionSummary {
    let mut total = ActionSummary::default();
    for scope_env in ctx.scopes.scope_envs() {
        let db = conns.mongo.database(&scope_env.db_name(logical_db::ACTIVITIES));
        let result = reset_type_db(&db).await;
        absorb(&mut total, db.name(), result);
    }
    total
}

async fn reset_type_db(db: &Database) -> Result<ActionSummary, PipelineError> {
    let mut summary = ActionSummary::default();
    for root in ActivityRepo::find_h5_roots(db, false).await? {
        summary.processed += 1;
        match ActivityRepo::set_tree_type(db, root.id, root.activity_type).await {
            Ok(modified) => {
                if modified > 0 {
                    tracing::info!(root = %root.id, activity_type = root.activity_type, modified, "h5 tree type reset");
                }
                summary.written += usize::try_from(modified).unwrap_or(usize::MAX);
            }
            Err(e) => {
                tracing::warn!(root = %root.id, error = %e, "h5 tree type not reset");
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}

/// `resetH5Active`: direct children of active roots are made active.
pub(super) async fn reset_active(ctx: &RunContext, conns: &Connections) -> ActionSummary {
    let mut total = ActionSummary::default();
    for scope_env in ctx.scopes.scope_envs() {
        let db = conns.mongo.database(&scope_env.db_name(logical_db::ACTIVITIES));
        let result = reset_active_db(&db).await;
        absorb(&mut total, db.name(), result);
    }
    total
}

async fn reset_active_db(db: &Database) -> Result<ActionSummary, PipelineError> {
    let mut summary = ActionSummary::default();
    for root in ActivityRepo::find_h5_roots(db, true).await? {
        summary.processed += 1;
        match ActivityRepo::set_children_active(db, root.id, root.active).await {
            Ok(modified) => summary.written += usize::try_from(modified).unwrap_or(usize::MAX),
            Err(e) => {
                tracing::warn!(root = %root.id, error = %e, "h5 children not activated");
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}

/// `resetH5Attribute`: centre positioned h5 nodes that have no z-order.
pub(super) async fn reset_attribute(ctx: &RunContext, conns: &Connections) -> ActionSummary {
    let mut total = ActionSummary::default();
    for scope_env in ctx.scopes.scope_envs() {
        let activities = conns.mongo.database(&scope_env.db_name(logical_db::ACTIVITIES));
        let h5 = conns.mongo.database(&scope_env.db_name(logical_db::H5));
        let result = reset_attribute_db(ctx, &scope_env, &activities, &h5).await;
        absorb(&mut total, activities.name(), result);
    }
    total
}

async fn reset_attribute_db(
    ctx: &RunContext,
    scope_env: &ScopeEnv,
    activities: &Database,
    h5: &Database,
) -> Result<ActionSummary, PipelineError> {
    let source = format!("{}.{H5_PROPERTIES}", h5.name());
    let mut summary = ActionSummary::default();

    for activity in ActivityRepo::find_h5_positioned(activities).await? {
        summary.processed += 1;
        let Some(mut props) = H5PropertiesRepo::find_by_activity_id(h5, &activity.id.to_hex()).await?
        else {
            continue;
        };

        let attribute = match ensure_pos_center(&props.attribute) {
            Ok(Some(attribute)) => attribute,
            Ok(None) => continue,
            Err(e) => {
                ctx.record_failure(&source, props.id, H5Properties::KIND, e, scope_env);
                summary.failed += 1;
                continue;
            }
        };
        props.attribute = attribute;

        match H5PropertiesRepo::upsert(h5, &props).await {
            Ok(()) => {
                tracing::info!(activity = %activity.id, attribute = %props.attribute, "h5 attribute centred");
                summary.written += 1;
            }
            Err(e) => {
                ctx.record_failure(&source, props.id, H5Properties::KIND, e, scope_env);
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}

/// `resetH5StyleMainID`: re-key the h5 properties of every env onto the
/// ids used in the scope's operation env, matching by activity id.
pub(super) async fn reset_style_main_id(ctx: &RunContext, conns: &Connections) -> ActionSummary {
    let mut total = ActionSummary::default();
    for (scope, envs) in ctx.scopes.scopes() {
        let operation = ScopeEnv::new(scope, OPERATION_ENV);
        let source = conns.mongo.database(&operation.db_name(logical_db::H5));
        let main = match H5PropertiesRepo::find_all(&source).await {
            Ok(main) => main,
            Err(e) => {
                tracing::error!(db = %source.name(), error = %e, "database skipped");
                continue;
            }
        };

        for env in envs.iter() {
            let scope_env = ScopeEnv::new(scope, env.as_str());
            if scope_env.is_operation() {
                continue;
            }
            let db = conns.mongo.database(&scope_env.db_name(logical_db::H5));
            let result = rekey_db(ctx, &scope_env, &db, &main).await;
            absorb(&mut total, db.name(), result);
        }
    }
    total
}

async fn rekey_db(
    ctx: &RunContext,
    scope_env: &ScopeEnv,
    db: &Database,
    main: &[H5Properties],
) -> Result<ActionSummary, PipelineError> {
    let source = format!("{}.{H5_PROPERTIES}", db.name());
    let mut summary = ActionSummary::default();

    for props in main {
        summary.processed += 1;
        let Some(local) = H5PropertiesRepo::find_by_activity_id(db, &props.activity_id).await? else {
            tracing::debug!(db = %db.name(), activity = %props.activity_id, "no local h5 properties");
            continue;
        };

        if local.id != props.id {
            if let Err(e) = H5PropertiesRepo::delete_by_id(db, local.id).await {
                ctx.record_failure(&source, local.id, H5Properties::KIND, e, scope_env);
                summary.failed += 1;
                continue;
            }
        }
        match H5PropertiesRepo::upsert(db, props).await {
            Ok(()) => summary.written += 1,
            Err(e) => {
                ctx.record_failure(&source, props.id, H5Properties::KIND, e, scope_env);
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}
