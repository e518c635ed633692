//! Common utilities for runtime integration tests.
//!
//! Provides a device backend that counts every native sampler it creates and
//! releases, and can be told to refuse creation.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use redlilium_runtime::{
    BackendError, Context, Device, DeviceBackend, GpuSampler, NativeSampler, Ref, SamplerState,
};

/// Counters shared between a [`TrackingBackend`] and its samplers.
#[derive(Debug, Default)]
pub struct BackendStats {
    attempts: AtomicUsize,
    created: AtomicUsize,
    released: AtomicUsize,
}

impl BackendStats {
    /// Number of `create_sampler` calls, successful or not.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Number of native samplers handed out.
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Number of native samplers dropped.
    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Number of native samplers still alive.
    pub fn live(&self) -> usize {
        self.created() - self.released()
    }
}

#[derive(Debug)]
struct TrackedSampler {
    state: SamplerState,
    stats: Arc<BackendStats>,
}

impl NativeSampler for TrackedSampler {
    fn state(&self) -> SamplerState {
        self.state
    }
}

impl Drop for TrackedSampler {
    fn drop(&mut self) {
        self.stats.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Backend that records sampler traffic.
#[derive(Debug)]
pub struct TrackingBackend {
    stats: Arc<BackendStats>,
    refuse: bool,
}

impl DeviceBackend for TrackingBackend {
    fn name(&self) -> &'static str {
        "Tracking"
    }

    fn create_sampler(&self, state: SamplerState) -> Result<GpuSampler, BackendError> {
        self.stats.attempts.fetch_add(1, Ordering::SeqCst);
        if self.refuse {
            return Err(BackendError::ResourceCreationFailed(
                "refused by test backend".to_string(),
            ));
        }
        self.stats.created.fetch_add(1, Ordering::SeqCst);
        Ok(GpuSampler::Native(Box::new(TrackedSampler {
            state,
            stats: Arc::clone(&self.stats),
        })))
    }
}

/// Create a device with its own tracking backend.
pub fn tracked_device(name: &str, refuse: bool) -> (Ref<Device>, Arc<BackendStats>) {
    let stats = Arc::new(BackendStats::default());
    let backend = TrackingBackend {
        stats: Arc::clone(&stats),
        refuse,
    };
    (Device::new(name, Arc::new(backend)), stats)
}

/// Create a context over `count` healthy tracked devices.
pub fn tracked_context(count: usize) -> (Ref<Context>, Vec<Arc<BackendStats>>) {
    let (devices, stats): (Vec<_>, Vec<_>) = (0..count)
        .map(|i| tracked_device(&format!("device {i}"), false))
        .unzip();
    let context = Context::new(devices).expect("context over tracked devices");
    (context, stats)
}
