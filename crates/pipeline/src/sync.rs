//! Generic per-database loops behind the sync actions.
//!
//! Each loop reads its source page by page, handles every document on its
//! own, and publishes a `Create` event for each document it wrote once the
//! page is done. Per-document failures are recorded in the [`RunContext`]
//! and never stop the page; a failed page read ends the loop.

use opsync_core::migrate::{Document, LegacyDocument};
use opsync_core::overrides::OverrideMaterializer;
use opsync_core::pagination::{PageRequest, DEFAULT_PAGE_SIZE};
use opsync_core::plan::Plan;
use opsync_core::scope::ScopeEnv;
use opsync_core::store::{DocumentSink, FieldSchemaSource, MaterialStore, PageSource};
use opsync_events::{publish_batch, Publishable};

use crate::context::{ActionSummary, RunContext};
use crate::error::PipelineError;

/// Migrate every legacy document of `pages` into `sink` under the field
/// schema of its type.
pub async fn migrate_collection<L, P, F, K>(
    ctx: &RunContext,
    scope_env: &ScopeEnv,
    pages: &P,
    schemas: &F,
    sink: &K,
) -> Result<ActionSummary, PipelineError>
where
    L: LegacyDocument,
    L::Target: Publishable,
    P: PageSource<L>,
    F: FieldSchemaSource,
    K: DocumentSink<L::Target>,
{
    let source = pages.source_name();
    let mut summary = ActionSummary::default();
    let mut request = PageRequest::first(DEFAULT_PAGE_SIZE);

    loop {
        let page = pages.fetch_page(request).await.map_err(PipelineError::store)?;
        let mut written = Vec::with_capacity(page.items.len());

        for old in &page.items {
            summary.processed += 1;
            let id = old.doc_id();
            if ctx.exclusions.is_excluded(scope_env, &id.to_hex()) {
                tracing::debug!(id = %id, "excluded");
                continue;
            }

            let schema = match ctx
                .schemas
                .get(schemas, scope_env, old.type_id(), L::FIELD_CATEGORY)
                .await
            {
                Ok(Some(schema)) => schema,
                Ok(None) => {
                    let message = format!(
                        "field definition {} ({}) not found",
                        old.type_id(),
                        L::FIELD_CATEGORY
                    );
                    ctx.record_failure(&source, id, L::KIND, message, scope_env);
                    summary.failed += 1;
                    continue;
                }
                Err(e) => {
                    ctx.record_failure(&source, id, L::KIND, e, scope_env);
                    summary.failed += 1;
                    continue;
                }
            };

            let doc = old.migrate(&schema);
            if let Err(e) = sink.replace(&doc).await {
                ctx.record_failure(&source, id, L::KIND, e, scope_env);
                summary.failed += 1;
                continue;
            }
            written.push(doc);
        }

        summary.written += written.len();
        summary.published +=
            publish_batch(ctx.sender.as_ref(), ctx.batch_size, scope_env, &written).await;

        if !page.has_next {
            break;
        }
        request = request.next();
    }

    tracing::info!(source = %source, %summary, "migrated");
    Ok(summary)
}

/// Copy every document of `pages` into `sink` unchanged.
pub async fn copy_collection<T, P, K>(
    ctx: &RunContext,
    scope_env: &ScopeEnv,
    pages: &P,
    sink: &K,
) -> Result<ActionSummary, PipelineError>
where
    T: Document + Publishable,
    P: PageSource<T>,
    K: DocumentSink<T>,
{
    let source = pages.source_name();
    let mut summary = ActionSummary::default();
    let mut request = PageRequest::first(DEFAULT_PAGE_SIZE);

    loop {
        let page = pages.fetch_page(request).await.map_err(PipelineError::store)?;
        let mut written = Vec::with_capacity(page.items.len());

        for doc in page.items {
            summary.processed += 1;
            if let Err(e) = sink.replace(&doc).await {
                ctx.record_failure(&source, doc.doc_id(), T::KIND, e, scope_env);
                summary.failed += 1;
                continue;
            }
            written.push(doc);
        }

        summary.written += written.len();
        summary.published +=
            publish_batch(ctx.sender.as_ref(), ctx.batch_size, scope_env, &written).await;

        if !page.has_next {
            break;
        }
        request = request.next();
    }

    tracing::info!(source = %source, %summary, "copied");
    Ok(summary)
}

/// Bind the overriding placements of every plan to material versions and
/// persist the plans that changed.
pub async fn materialize_plans<P, S, K>(
    ctx: &RunContext,
    scope_env: &ScopeEnv,
    plans: &P,
    materials: &S,
    sink: &K,
) -> Result<ActionSummary, PipelineError>
where
    P: PageSource<Plan>,
    S: MaterialStore,
    K: DocumentSink<Plan>,
{
    let source = plans.source_name();
    let materializer =
        OverrideMaterializer::new(materials, &ctx.overrides, &ctx.exclusions, scope_env);
    let mut summary = ActionSummary::default();
    let mut request = PageRequest::first(DEFAULT_PAGE_SIZE);

    loop {
        let page = plans.fetch_page(request).await.map_err(PipelineError::store)?;

        for mut plan in page.items {
            summary.processed += 1;
            if !plan.has_pending_overrides() {
                continue;
            }

            let outcome = match materializer.apply(&mut plan).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    ctx.record_failure(&source, plan.id, Plan::KIND, e, scope_env);
                    summary.failed += 1;
                    continue;
                }
            };
            if !outcome.changed() {
                continue;
            }

            match sink.replace(&plan).await {
                Ok(()) => {
                    tracing::info!(
                        plan = %plan.id,
                        rewritten = outcome.rewritten,
                        created = outcome.created,
                        "plan overrides bound"
                    );
                    summary.written += 1;
                }
                Err(e) => {
                    ctx.record_failure(&source, plan.id, Plan::KIND, e, scope_env);
                    summary.failed += 1;
                }
            }
        }

        if !page.has_next {
            break;
        }
        request = request.next();
    }

    tracing::info!(source = %source, %summary, overrides = ctx.overrides.len(), "plans processed");
    Ok(summary)
}
