use thiserror::Error;

use crate::background::types::ImageId;

/// Background image store errors.
///
/// None of these are fatal: a failed add or remove leaves the store on its
/// last successfully persisted state and the caller decides what to show.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid image payload: {0}")]
    InvalidImage(String),

    #[error("image not found: {0}")]
    NotFound(ImageId),

    #[error("persistence failed: {0}")]
    Persistence(String),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, StoreError>;
