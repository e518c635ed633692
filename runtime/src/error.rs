//! Runtime error types.

use thiserror::Error;

use crate::backend::BackendError;
use crate::device::DeviceId;

/// Errors that can occur in the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// A subsystem failed to come up during runtime initialization.
    #[error("subsystem `{subsystem}` failed to initialize: {reason}")]
    BringUpFailed {
        /// Name of the failing subsystem.
        subsystem: &'static str,
        /// What went wrong.
        reason: String,
    },
    /// An earlier initialization attempt failed; the runtime is unusable.
    #[error("runtime initialization failed earlier, the runtime is unusable")]
    InitializationFailed,
    /// The runtime was torn down and cannot be initialized again.
    #[error("runtime has been torn down")]
    TornDown,
    /// This build is past its expiration date.
    #[error("build expired at {expires_at} (unix seconds)")]
    Expired {
        /// Expiration time in seconds since the Unix epoch.
        expires_at: u64,
    },
    /// A feature flag has a malformed value.
    #[error("invalid value `{value}` for flag {name}")]
    InvalidFlag {
        /// Flag name.
        name: &'static str,
        /// The rejected value.
        value: String,
    },
    /// The option string contains an unknown key or a malformed value.
    #[error("invalid option: {0}")]
    InvalidOption(String),
    /// A context was requested without any device.
    #[error("no devices available")]
    NoDevices,
    /// A device backend refused to create a per-device resource.
    #[error("device {device} failed to create resource: {source}")]
    DeviceResourceFailed {
        /// The device that failed.
        device: DeviceId,
        /// The backend's error.
        source: BackendError,
    },
}
