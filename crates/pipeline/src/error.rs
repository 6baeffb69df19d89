use opsync_core::error::CoreError;
use opsync_db::DbError;
use opsync_events::PublishError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error(transparent)]
    Core(#[from] CoreError),

    /// A store behind one of the `opsync-core` traits failed.
    #[error("store: {0}")]
    Store(Box<dyn std::error::Error + Send + Sync>),

    #[error("csv report: {0}")]
    Csv(#[from] csv::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),

    #[error("task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl PipelineError {
    pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Store(Box::new(e))
    }
}
