//! Runtime options parsed from the option string flag.
//!
//! The option string is a whitespace-separated list of `key=value` tokens:
//!
//! | key             | value          | default |
//! |-----------------|----------------|---------|
//! | `dummy-devices` | device count   | `1`     |
//! | `agents`        | `on` / `off`   | `on`    |

use parking_lot::RwLock;

use super::flags;
use crate::error::RuntimeError;
use crate::lifecycle::Subsystem;

static OPTIONS: RwLock<Option<RuntimeOptions>> = RwLock::new(None);

/// Parsed runtime options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeOptions {
    /// Number of dummy devices to enumerate.
    pub dummy_devices: usize,
    /// Attach registered agents at bring-up.
    pub agents: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            dummy_devices: 1,
            agents: true,
        }
    }
}

impl RuntimeOptions {
    /// Parse an option string.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::InvalidOption`] for unknown keys, tokens
    /// without a value, or malformed values.
    pub fn parse(input: &str) -> Result<Self, RuntimeError> {
        let mut options = Self::default();

        for token in input.split_whitespace() {
            let Some((key, value)) = token.split_once('=') else {
                return Err(RuntimeError::InvalidOption(format!(
                    "expected key=value, got `{token}`"
                )));
            };

            match key {
                "dummy-devices" => {
                    options.dummy_devices = value.parse().map_err(|_| {
                        RuntimeError::InvalidOption(format!("dummy-devices: `{value}` is not a count"))
                    })?;
                }
                "agents" => {
                    options.agents = match value {
                        "on" => true,
                        "off" => false,
                        _ => {
                            return Err(RuntimeError::InvalidOption(format!(
                                "agents: expected on or off, got `{value}`"
                            )));
                        }
                    };
                }
                _ => {
                    return Err(RuntimeError::InvalidOption(format!("unknown option `{key}`")));
                }
            }
        }

        Ok(options)
    }
}

/// Get the current options, or the defaults before bring-up.
pub fn current() -> RuntimeOptions {
    OPTIONS.read().clone().unwrap_or_default()
}

/// Configuration subsystem.
#[derive(Debug)]
pub(crate) struct OptionsSubsystem;

impl Subsystem for OptionsSubsystem {
    fn name(&self) -> &'static str {
        "options"
    }

    fn init(&self) -> Result<(), RuntimeError> {
        let options = RuntimeOptions::parse(&flags::current().options)?;
        log::debug!("Runtime options: {options:?}");
        *OPTIONS.write() = Some(options);
        Ok(())
    }

    fn tear_down(&self) {
        OPTIONS.write().take();
    }
}
