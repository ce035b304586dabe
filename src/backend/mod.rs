use thiserror::Error;

pub mod api;

pub use api::BackendClient;

/// Failure classes at the persistence boundary, as the engine consumes them.
/// Network failures are transient and safe to retry; conflicts mean the card
/// is gone upstream; auth failures belong to the session layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistError {
    #[error("network error: {0}")]
    Network(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("session rejected: {0}")]
    Auth(String),
}
