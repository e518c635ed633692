//! Device backend abstraction layer.
//!
//! Each compute device is driven by a backend implementing [`DeviceBackend`].
//! Backends materialize logical resources into native handles owned by the
//! runtime.
//!
//! # Available Backends
//!
//! - `dummy` (default): No-op backend for testing and development
//!
//! Driver backends live outside this crate and plug in through
//! [`DeviceBackend`] and [`NativeSampler`].

#[cfg(feature = "dummy")]
pub mod dummy;
mod error;

#[cfg(feature = "dummy")]
pub use dummy::DummyBackend;
pub use error::BackendError;

use redlilium_core::sampler::SamplerState;

/// A sampler object owned by a driver backend.
///
/// The driver releases the native object when the value is dropped.
pub trait NativeSampler: Send + Sync + std::fmt::Debug {
    /// The packed state the sampler was created from.
    fn state(&self) -> SamplerState;
}

/// Handle to a device sampler resource.
pub enum GpuSampler {
    /// Dummy backend (no device allocation)
    Dummy {
        /// Packed state the sampler was created with.
        state: SamplerState,
    },
    /// Sampler created by a driver backend
    Native(Box<dyn NativeSampler>),
}

impl GpuSampler {
    /// The packed state this handle was created from.
    pub fn state(&self) -> SamplerState {
        match self {
            Self::Dummy { state } => *state,
            Self::Native(native) => native.state(),
        }
    }
}

impl std::fmt::Debug for GpuSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dummy { state } => f
                .debug_struct("GpuSampler::Dummy")
                .field("state", state)
                .finish(),
            Self::Native(native) => f.debug_tuple("GpuSampler::Native").field(native).finish(),
        }
    }
}

/// Backend trait for abstracting different device drivers.
pub trait DeviceBackend: Send + Sync + 'static {
    /// Get the backend name.
    fn name(&self) -> &'static str;

    /// Create a sampler resource from a packed state word.
    fn create_sampler(&self, state: SamplerState) -> Result<GpuSampler, BackendError>;
}
