use crate::model::ModelError;
use thiserror::Error;

/// Runtime errors that abort the current turn.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The model requested a tool with no registered adapter.
    #[error("unknown tool requested: {0}")]
    UnknownTool(String),

    /// The model provider was unreachable or returned an unusable response.
    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, Error>;
