use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MockServerError {
    #[error("Failed to bind to address {addr}: {source}")]
    BindError {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server task panicked")]
    ServerPanic(#[from] tokio::task::JoinError),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Timed out after {0:?} waiting for alerts")]
    WaitTimeout(Duration),
}
