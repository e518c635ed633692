//! Compute contexts.
//!
//! A [`Context`] binds an ordered set of devices. Logical resources created
//! against a context are materialized once per bound device, in this order.

use redlilium_core::sampler::SamplerSettings;

use crate::device::{Device, DeviceId};
use crate::error::RuntimeError;
use crate::object::{ObjectType, Ref, RuntimeObject};
use crate::sampler::Sampler;

/// A compute context over one or more devices.
pub struct Context {
    devices: Vec<Ref<Device>>,
}

impl Context {
    /// Create a context bound to `devices`.
    ///
    /// Devices keep the given order; repeated devices are bound once.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::NoDevices`] if `devices` is empty.
    pub fn new(devices: Vec<Ref<Device>>) -> Result<Ref<Context>, RuntimeError> {
        if devices.is_empty() {
            return Err(RuntimeError::NoDevices);
        }

        let mut bound: Vec<Ref<Device>> = Vec::with_capacity(devices.len());
        for device in devices {
            if bound.iter().any(|d| d.id() == device.id()) {
                log::warn!("Device {} bound to a context twice, ignoring", device.id());
                continue;
            }
            bound.push(device);
        }

        log::debug!("Created context over {} device(s)", bound.len());
        Ok(Ref::new(Self { devices: bound }))
    }

    /// Get the bound devices, in context order.
    pub fn devices(&self) -> &[Ref<Device>] {
        &self.devices
    }

    /// Find a bound device by id.
    pub fn device(&self, id: DeviceId) -> Option<&Ref<Device>> {
        self.devices.iter().find(|d| d.id() == id)
    }

    /// Create a sampler and materialize it on every bound device.
    ///
    /// If any device fails, the partially created sampler is dropped, which
    /// releases the device samplers created before the failure.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::DeviceResourceFailed`] for the first device
    /// whose backend refuses the sampler.
    pub fn create_sampler(
        context: &Ref<Context>,
        settings: SamplerSettings,
    ) -> Result<Ref<Sampler>, RuntimeError> {
        let mut sampler = Sampler::new(context, settings);
        sampler.create()?;
        Ok(Ref::new(sampler))
    }
}

impl RuntimeObject for Context {
    fn object_type(&self) -> ObjectType {
        ObjectType::Context
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field(
                "devices",
                &self.devices.iter().map(|d| d.id()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

static_assertions::assert_impl_all!(Ref<Context>: Send, Sync);
