//! Backend error types.

use thiserror::Error;

/// Errors reported by a device backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The backend refused to create a resource.
    #[error("resource creation failed: {0}")]
    ResourceCreationFailed(String),
    /// The requested feature is not supported by the device.
    #[error("feature not supported: {0}")]
    FeatureNotSupported(String),
    /// Out of device memory.
    #[error("out of device memory")]
    OutOfMemory,
    /// The device was lost.
    #[error("device lost")]
    DeviceLost,
    /// Internal backend error.
    #[error("internal backend error: {0}")]
    Internal(String),
}
