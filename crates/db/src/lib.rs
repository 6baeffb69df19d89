//! MongoDB access for the operational material databases.
//!
//! Repositories are zero-sized structs whose async methods take the
//! `&Database` they operate on. [`stores`] adapts them to the storage
//! traits of `opsync-core`.

pub mod collections;
pub mod pagination;
pub mod repositories;
pub mod stores;

use mongodb::bson::doc;
use mongodb::Client;
use opsync_core::error::CoreError;

pub use mongodb::Database;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("mongodb: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("bson encode: {0}")]
    Encode(#[from] bson::ser::Error),

    #[error("bson decode: {0}")]
    Decode(#[from] bson::de::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Connect to the cluster at `uri`. The driver connects lazily; call
/// [`health_check`] to verify the server is reachable.
pub async fn connect(uri: &str) -> Result<Client, DbError> {
    let client = Client::with_uri_str(uri).await?;
    Ok(client)
}

/// Ping the server through the `admin` database.
pub async fn health_check(client: &Client) -> Result<(), DbError> {
    client.database("admin").run_command(doc! { "ping": 1 }).await?;
    Ok(())
}
