//! Logical texture samplers.
//!
//! A [`Sampler`] describes sampling settings once, for a whole context, and
//! owns one native sampler per bound device. The settings live only in the
//! packed [`SamplerState`] word; accessors decode it.
//!
//! # Example
//!
//! ```ignore
//! let settings = SamplerSettings::new(true, AddressMode::Repeat, FilterMode::Linear);
//! let mut sampler = Sampler::new(&context, settings);
//! sampler.create()?;
//!
//! let native = sampler.device_sampler(device.id());
//! ```

use std::collections::HashMap;

use redlilium_core::profile_function;
use redlilium_core::sampler::{AddressMode, FilterMode, SamplerSettings, SamplerState};

use crate::backend::GpuSampler;
use crate::context::Context;
use crate::device::DeviceId;
use crate::error::RuntimeError;
use crate::object::{ObjectType, Ref, RuntimeObject};

/// Native samplers keyed by the device that owns them.
pub type DeviceSamplers = HashMap<DeviceId, GpuSampler>;

/// A context-wide sampler materialized on every bound device.
pub struct Sampler {
    context: Ref<Context>,
    state: SamplerState,
    device_samplers: DeviceSamplers,
}

impl Sampler {
    /// Create a sampler for `context`.
    ///
    /// No device resources exist until [`Sampler::create`] is called.
    pub fn new(context: &Ref<Context>, settings: SamplerSettings) -> Self {
        Self {
            context: Ref::retain(context),
            state: SamplerState::pack(settings),
            device_samplers: DeviceSamplers::new(),
        }
    }

    /// Create a sampler from raw API codes.
    ///
    /// Unrecognized address codes select [`AddressMode::None`]; any filter
    /// code other than linear selects [`FilterMode::Nearest`].
    pub fn from_raw(
        context: &Ref<Context>,
        normalized_coords: bool,
        address_mode: u32,
        filter_mode: u32,
    ) -> Self {
        Self::new(
            context,
            SamplerSettings::from_raw(normalized_coords, address_mode, filter_mode),
        )
    }

    /// Materialize the sampler on every device of the context, in context
    /// order.
    ///
    /// Stops at the first device that fails. Device samplers created before
    /// the failure stay in place until the sampler is dropped; a sampler that
    /// failed here should be abandoned. Calling `create` again rebuilds the
    /// whole set.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::DeviceResourceFailed`] naming the failing device.
    pub fn create(&mut self) -> Result<(), RuntimeError> {
        profile_function!();

        self.device_samplers.clear();
        for device in self.context.devices() {
            let native = device.create_sampler(self.state).map_err(|source| {
                log::warn!("Device {} refused sampler: {source}", device.id());
                RuntimeError::DeviceResourceFailed {
                    device: device.id(),
                    source,
                }
            })?;
            self.device_samplers.insert(device.id(), native);
        }

        log::trace!(
            "Sampler {:#x} created on {} device(s)",
            self.state.bits(),
            self.device_samplers.len()
        );
        Ok(())
    }

    /// Get the native sampler for `device`, if one was created.
    pub fn device_sampler(&self, device: DeviceId) -> Option<&GpuSampler> {
        self.device_samplers.get(&device)
    }

    /// Get the number of devices this sampler is materialized on.
    pub fn device_sampler_count(&self) -> usize {
        self.device_samplers.len()
    }

    /// Get the owning context.
    pub fn context(&self) -> &Ref<Context> {
        &self.context
    }

    /// Get the packed state word.
    pub fn state(&self) -> SamplerState {
        self.state
    }

    /// Decode all settings.
    pub fn settings(&self) -> SamplerSettings {
        self.state.unpack()
    }

    /// Whether coordinates are normalized.
    pub fn normalized_coords(&self) -> bool {
        self.state.normalized_coords()
    }

    /// Get the address mode.
    pub fn address_mode(&self) -> AddressMode {
        self.state.address_mode()
    }

    /// Get the filter mode.
    pub fn filter_mode(&self) -> FilterMode {
        self.state.filter_mode()
    }
}

impl RuntimeObject for Sampler {
    fn object_type(&self) -> ObjectType {
        ObjectType::Sampler
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        if !self.device_samplers.is_empty() {
            log::trace!(
                "Sampler {:#x}: releasing {} device sampler(s)",
                self.state.bits(),
                self.device_samplers.len()
            );
        }
        self.device_samplers.clear();
    }
}

impl std::fmt::Debug for Sampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sampler")
            .field("state", &self.state)
            .field("device_samplers", &self.device_samplers.len())
            .finish()
    }
}

// Ensure Sampler is Send + Sync
static_assertions::assert_impl_all!(Sampler: Send, Sync);
