//! Dummy device backend for testing and development.
//!
//! This backend doesn't talk to any driver but provides a valid
//! implementation for exercising the runtime without hardware.

use redlilium_core::sampler::SamplerState;

use super::{BackendError, DeviceBackend, GpuSampler};

/// Dummy device backend.
#[derive(Debug, Default)]
pub struct DummyBackend;

impl DummyBackend {
    /// Create a new dummy backend.
    pub fn new() -> Self {
        Self
    }
}

impl DeviceBackend for DummyBackend {
    fn name(&self) -> &'static str {
        "Dummy Backend"
    }

    fn create_sampler(&self, state: SamplerState) -> Result<GpuSampler, BackendError> {
        log::trace!("DummyBackend: creating sampler (state: {:#x})", state.bits());
        Ok(GpuSampler::Dummy { state })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dummy_sampler_keeps_state() {
        let backend = DummyBackend::new();
        let sampler = backend
            .create_sampler(SamplerState::from_bits(0x25))
            .unwrap();
        assert_eq!(sampler.state().bits(), 0x25);
        assert!(format!("{sampler:?}").contains("Dummy"));
    }
}
