//! Runtime configuration.
//!
//! Two subsystems come up first during runtime initialization:
//! - [`flags`] reads environment switches once.
//! - [`options`] parses the option string carried by the flags.

pub mod flags;
pub mod options;

pub use flags::Flags;
pub use options::RuntimeOptions;
