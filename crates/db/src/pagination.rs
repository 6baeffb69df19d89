//! Paged reads sorted by `_id` descending.

use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::Collection;
use opsync_core::pagination::{Page, PageRequest};
use serde::de::DeserializeOwned;

use crate::DbError;

/// Count the documents matching `filter`, then read page `request`.
pub async fn find_page<T>(
    coll: &Collection<T>,
    filter: Document,
    request: PageRequest,
) -> Result<Page<T>, DbError>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let total = coll.count_documents(filter.clone()).await?;
    let items: Vec<T> = coll
        .find(filter)
        .sort(doc! { "_id": -1 })
        .skip(request.skip())
        .limit(request.limit())
        .await?
        .try_collect()
        .await?;

    tracing::debug!(
        collection = %coll.namespace(),
        page = request.page,
        total,
        returned = items.len(),
        "fetched page"
    );
    Ok(Page::new(items, request, total))
}
