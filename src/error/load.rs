use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Load test worker pool failed: {source}")]
    WorkerPool {
        #[source]
        source: tokio::task::JoinError,
    },
}
