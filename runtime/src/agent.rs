//! Instrumentation agents.
//!
//! Agents are tools (debuggers, profilers, tracers) that observe the runtime.
//! They are registered before [`Runtime::init`](crate::Runtime::init) and are
//! attached last during bring-up, once every other subsystem is up. At
//! teardown they are detached first, in reverse attach order, while the
//! runtime they observe still exists.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::config::options;
use crate::device;
use crate::error::RuntimeError;
use crate::lifecycle::Subsystem;

static REGISTERED: RwLock<Vec<Arc<dyn Agent>>> = RwLock::new(Vec::new());
static ATTACHED: Mutex<Vec<Arc<dyn Agent>>> = Mutex::new(Vec::new());

/// Snapshot of the runtime handed to agents when they attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeInfo {
    /// Runtime version.
    pub version: &'static str,
    /// Number of enumerated devices.
    pub device_count: usize,
}

/// A tool observing the runtime.
pub trait Agent: Send + Sync {
    /// Get the agent name.
    fn name(&self) -> &str;

    /// Attach to a fully initialized runtime.
    ///
    /// An error aborts runtime initialization.
    fn on_attach(&self, info: &RuntimeInfo) -> Result<(), String>;

    /// Detach before the runtime is torn down.
    fn on_detach(&self) {}
}

/// Register an agent to be attached at the next bring-up.
pub fn register(agent: Arc<dyn Agent>) {
    log::debug!("Registered agent {}", agent.name());
    REGISTERED.write().push(agent);
}

/// Get the number of currently attached agents.
pub fn attached_count() -> usize {
    ATTACHED.lock().len()
}

/// Instrumentation/agent subsystem.
#[derive(Debug)]
pub(crate) struct AgentSubsystem;

impl Subsystem for AgentSubsystem {
    fn name(&self) -> &'static str {
        "agents"
    }

    fn init(&self) -> Result<(), RuntimeError> {
        if redlilium_core::profiling::start_client() {
            log::info!("Profiling client attached");
        }

        if !options::current().agents {
            log::debug!("Agents disabled by options");
            return Ok(());
        }

        let info = RuntimeInfo {
            version: crate::VERSION,
            device_count: device::devices().len(),
        };

        let registered = REGISTERED.read().clone();
        for agent in registered {
            agent
                .on_attach(&info)
                .map_err(|reason| RuntimeError::BringUpFailed {
                    subsystem: "agents",
                    reason: format!("agent {}: {reason}", agent.name()),
                })?;
            log::debug!("Attached agent {}", agent.name());
            ATTACHED.lock().push(agent);
        }

        Ok(())
    }

    fn tear_down(&self) {
        let attached = std::mem::take(&mut *ATTACHED.lock());
        for agent in attached.iter().rev() {
            log::debug!("Detaching agent {}", agent.name());
            agent.on_detach();
        }
    }
}
