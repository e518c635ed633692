//! Feature flags read from the environment.

use parking_lot::RwLock;

use crate::error::RuntimeError;
use crate::lifecycle::Subsystem;

/// Environment variable controlling whether process-exit hooks tear the runtime down.
pub const ENABLE_SHUTDOWN: &str = "REDLILIUM_ENABLE_SHUTDOWN";
/// Environment variable carrying the runtime option string.
pub const OPTIONS: &str = "REDLILIUM_OPTIONS";

static FLAGS: RwLock<Option<Flags>> = RwLock::new(None);

/// Runtime feature flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flags {
    /// Run teardown from process-exit hooks.
    pub enable_shutdown: bool,
    /// Raw option string, parsed by the configuration subsystem.
    pub options: String,
}

impl Default for Flags {
    fn default() -> Self {
        Self {
            enable_shutdown: true,
            options: String::new(),
        }
    }
}

impl Flags {
    /// Read flags through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::InvalidFlag`] for a malformed boolean.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, RuntimeError> {
        let mut flags = Self::default();

        if let Some(value) = lookup(ENABLE_SHUTDOWN) {
            flags.enable_shutdown = parse_bool(ENABLE_SHUTDOWN, &value)?;
        }
        if let Some(value) = lookup(OPTIONS) {
            flags.options = value;
        }

        Ok(flags)
    }

    /// Read flags from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::InvalidFlag`] for a malformed boolean.
    pub fn from_env() -> Result<Self, RuntimeError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, RuntimeError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(RuntimeError::InvalidFlag {
            name,
            value: value.to_string(),
        }),
    }
}

/// Get the current flags, or the defaults before bring-up.
pub fn current() -> Flags {
    FLAGS.read().clone().unwrap_or_default()
}

/// Feature-flag subsystem.
#[derive(Debug)]
pub(crate) struct FlagsSubsystem;

impl Subsystem for FlagsSubsystem {
    fn name(&self) -> &'static str {
        "flags"
    }

    fn init(&self) -> Result<(), RuntimeError> {
        let flags = Flags::from_env()?;
        log::debug!("Runtime flags: {flags:?}");
        *FLAGS.write() = Some(flags);
        Ok(())
    }

    fn tear_down(&self) {
        FLAGS.write().take();
    }
}
