use thiserror::Error;

/// Camera subsystem errors.
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    #[error("device enumeration failed: {0}")]
    Enumeration(String),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, CameraError>;
