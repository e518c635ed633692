//! Backend-agnostic sampler types.
//!
//! Provides [`AddressMode`], [`FilterMode`] and [`SamplerSettings`] for
//! describing how a texture is sampled, and [`SamplerState`], the packed word
//! that compiled device code consumes.

mod state;
mod types;

pub use state::SamplerState;
pub use types::{AddressMode, FilterMode, SamplerSettings};
