//! # RedLilium Runtime
//!
//! Bootstrap and resource-management core of the RedLilium compute runtime.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`Runtime`] - Ordered, once-only bring-up and teardown of the runtime subsystems
//! - [`Ref`] - Reference-counted handles with a deferrable termination hook
//! - [`Context`] - An ordered set of compute devices
//! - [`Sampler`] - A logical sampler materialized once per device
//! - [`DeviceBackend`] - Trait for device driver backends, with a Dummy backend for testing
//!
//! ## Example
//!
//! ```ignore
//! use redlilium_runtime::{Context, Runtime, SamplerSettings, device};
//!
//! Runtime::init()?;
//! let context = Context::new(device::devices())?;
//! let sampler = Context::create_sampler(&context, SamplerSettings::default())?;
//! // ...
//! Runtime::tear_down();
//! ```

pub mod agent;
pub mod backend;
pub mod config;
pub mod context;
pub mod device;
pub mod error;
pub mod lifecycle;
pub mod object;
pub mod process;
pub mod sampler;

// Re-export main types for convenience
pub use backend::{BackendError, DeviceBackend, GpuSampler, NativeSampler};
pub use context::Context;
pub use device::{Device, DeviceId};
pub use error::RuntimeError;
pub use lifecycle::{Gate, Lifecycle, LifecycleState, Runtime, Subsystem};
pub use object::{Deferred, ObjectType, Ref, Release, RuntimeObject, Termination};
pub use redlilium_core::sampler::{AddressMode, FilterMode, SamplerSettings, SamplerState};
pub use sampler::Sampler;

/// Runtime library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
