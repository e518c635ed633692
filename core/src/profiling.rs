//! Profiling support via Tracy.
//!
//! Instrumentation is enabled with the `profiling` Cargo feature. When it is
//! disabled (the default) every macro here expands to nothing.
//!
//! ```ignore
//! use redlilium_core::{profile_function, profile_scope};
//!
//! fn bring_up() {
//!     profile_function!();
//!
//!     {
//!         profile_scope!("enumerate_devices");
//!         // ...
//!     }
//! }
//! ```

#[cfg(feature = "profiling")]
pub use tracy_client::{self, Client, span};

/// Start the Tracy client if profiling is enabled.
///
/// Returns `true` when a client is running afterwards.
pub fn start_client() -> bool {
    #[cfg(feature = "profiling")]
    {
        let _ = tracy_client::Client::start();
        log::debug!("Tracy client started");
        true
    }
    #[cfg(not(feature = "profiling"))]
    {
        false
    }
}

/// Create a profiling span for the current scope.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_scope {
    ($name:expr) => {
        let _profile_span = $crate::profiling::span!($name);
    };
}

/// Create a profiling span (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_scope {
    ($name:expr) => {};
}

/// Create a profiling span for the entire function.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_function {
    () => {
        let _profile_span = $crate::profiling::span!();
    };
}

/// Create a profiling span for function (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_function {
    () => {};
}
