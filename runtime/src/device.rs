//! Compute devices and the device-enumeration subsystem.
//!
//! A [`Device`] pairs a process-unique [`DeviceId`] with the
//! [`DeviceBackend`] that drives it. The enumeration subsystem discovers the
//! devices available to the process at bring-up and drops them at teardown.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::RwLock;
use redlilium_core::sampler::SamplerState;

use crate::backend::{BackendError, DeviceBackend, GpuSampler};
use crate::config::options;
use crate::error::RuntimeError;
use crate::lifecycle::Subsystem;
use crate::object::{ObjectType, Ref, RuntimeObject};

static NEXT_DEVICE_ID: AtomicU32 = AtomicU32::new(0);

/// Devices enumerated at bring-up.
static DEVICES: RwLock<Vec<Ref<Device>>> = RwLock::new(Vec::new());

/// Process-unique identity of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceId(u32);

impl DeviceId {
    fn next() -> Self {
        Self(NEXT_DEVICE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Create an id from its raw value.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw id value.
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A compute device.
///
/// # Thread Safety
///
/// `Device` is `Send + Sync`; backends synchronize internally.
pub struct Device {
    id: DeviceId,
    name: String,
    backend: Arc<dyn DeviceBackend>,
}

impl Device {
    /// Create a device driven by `backend` and assign it a fresh id.
    pub fn new(name: impl Into<String>, backend: Arc<dyn DeviceBackend>) -> Ref<Device> {
        let device = Self {
            id: DeviceId::next(),
            name: name.into(),
            backend,
        };
        log::debug!(
            "Device {} ({}) using {}",
            device.id,
            device.name,
            device.backend.name()
        );
        Ref::new(device)
    }

    /// Get the device identity.
    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the name of the backend driving this device.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Ask the backend for a native sampler.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if it cannot create the sampler.
    pub fn create_sampler(&self, state: SamplerState) -> Result<GpuSampler, BackendError> {
        log::trace!(
            "Device {}: creating sampler (state: {:#x})",
            self.id,
            state.bits()
        );
        self.backend.create_sampler(state)
    }
}

impl RuntimeObject for Device {
    fn object_type(&self) -> ObjectType {
        ObjectType::Device
    }
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("backend", &self.backend.name())
            .finish()
    }
}

/// Get the devices enumerated at bring-up, in enumeration order.
///
/// Empty before the runtime is initialized and after it is torn down.
pub fn devices() -> Vec<Ref<Device>> {
    DEVICES.read().clone()
}

fn enumerate() -> Vec<Ref<Device>> {
    let options = options::current();
    let mut found = Vec::new();

    #[cfg(feature = "dummy")]
    {
        let backend: Arc<dyn DeviceBackend> = Arc::new(crate::backend::DummyBackend::new());
        for index in 0..options.dummy_devices {
            found.push(Device::new(
                format!("Dummy Device {index}"),
                Arc::clone(&backend),
            ));
        }
    }
    #[cfg(not(feature = "dummy"))]
    let _ = options;

    found
}

/// Device-enumeration subsystem.
#[derive(Debug)]
pub(crate) struct DeviceSubsystem;

impl Subsystem for DeviceSubsystem {
    fn name(&self) -> &'static str {
        "devices"
    }

    fn init(&self) -> Result<(), RuntimeError> {
        let mut devices = DEVICES.write();
        if !devices.is_empty() {
            return Ok(());
        }

        *devices = enumerate();
        if devices.is_empty() {
            log::warn!("No compute devices found");
        } else {
            log::info!("Enumerated {} compute device(s)", devices.len());
        }
        Ok(())
    }

    fn tear_down(&self) {
        let devices = std::mem::take(&mut *DEVICES.write());
        if !devices.is_empty() {
            log::debug!("Releasing {} compute device(s)", devices.len());
        }
    }
}

// Ensure Device is Send + Sync
static_assertions::assert_impl_all!(Device: Send, Sync);
static_assertions::assert_impl_all!(Ref<Device>: Send, Sync);
