//! # RedLilium Core
//!
//! Backend-agnostic building blocks for the RedLilium compute runtime:
//! - [`sampler`] - Sampler settings and the packed state word consumed by device code
//! - [`sync`] - A spin lock usable before any runtime synchronization exists
//! - [`profiling`] - Optional Tracy instrumentation

pub mod profiling;
pub mod sampler;
pub mod sync;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
