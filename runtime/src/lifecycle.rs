//! Runtime lifecycle.
//!
//! The runtime brings its subsystems up in a fixed order and tears them down
//! in reverse:
//!
//! | order | subsystem | bring-up | teardown |
//! |-------|-----------|----------|----------|
//! | 1     | flags     | first    | last     |
//! | 2     | options   | second   | third    |
//! | 3     | devices   | third    | second   |
//! | 4     | agents    | last     | first    |
//!
//! [`Lifecycle`] is the state machine driving one such sequence. The process
//! owns exactly one, behind [`Runtime`]; tests build their own over test
//! doubles.
//!
//! ```text
//! Uninitialized ──init ok──▶ Initialized ──tear_down──▶ TornDown
//!       │
//!       └──────init err────▶ Failed
//! ```
//!
//! There is no way back from `TornDown` or `Failed`. A failed bring-up is not
//! rolled back: the process is expected to give up on the runtime.

use std::sync::atomic::{AtomicU8, Ordering};

use redlilium_core::profile_function;
use redlilium_core::sync::SpinLock;

use crate::agent::AgentSubsystem;
use crate::config::flags::FlagsSubsystem;
use crate::config::options::OptionsSubsystem;
use crate::device::DeviceSubsystem;
use crate::error::RuntimeError;

/// A runtime subsystem with an ordered bring-up and teardown.
pub trait Subsystem: Sync {
    /// Get the subsystem name.
    fn name(&self) -> &'static str;

    /// Bring the subsystem up.
    fn init(&self) -> Result<(), RuntimeError>;

    /// Tear the subsystem down.
    ///
    /// Must be a no-op if the subsystem was never brought up or was already
    /// torn down.
    fn tear_down(&self);
}

/// Observable state of a [`Lifecycle`].
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// No bring-up has completed yet.
    Uninitialized = 0,
    /// Every subsystem is up.
    Initialized = 1,
    /// Subsystems were torn down; the runtime cannot be used again.
    TornDown = 2,
    /// A bring-up failed; the runtime cannot be used.
    Failed = 3,
}

impl LifecycleState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Initialized,
            2 => Self::TornDown,
            3 => Self::Failed,
            _ => Self::Uninitialized,
        }
    }
}

/// Check run before any subsystem is brought up.
pub type Gate = fn() -> Result<(), RuntimeError>;

/// Ordered, idempotent initialization and teardown of a set of subsystems.
pub struct Lifecycle<'a> {
    region: SpinLock,
    state: AtomicU8,
    gate: Gate,
    subsystems: &'a [&'a dyn Subsystem],
}

impl<'a> Lifecycle<'a> {
    /// Create a lifecycle over `subsystems`, listed in bring-up order.
    ///
    /// Bring-up is gated on the build expiration check.
    pub const fn new(subsystems: &'a [&'a dyn Subsystem]) -> Self {
        Self::with_gate(subsystems, check_build_expiry)
    }

    /// Create a lifecycle whose bring-up first has to pass `gate`.
    pub const fn with_gate(subsystems: &'a [&'a dyn Subsystem], gate: Gate) -> Self {
        Self {
            region: SpinLock::new(),
            state: AtomicU8::new(LifecycleState::Uninitialized as u8),
            gate,
            subsystems,
        }
    }

    /// Get the current state.
    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Bring every subsystem up, once.
    ///
    /// Any number of threads may call this concurrently: one runs the
    /// bring-up while the others spin, and all of them see the same outcome.
    /// Calling it again after success returns `Ok` immediately.
    ///
    /// # Errors
    ///
    /// Returns the first subsystem error, [`RuntimeError::InitializationFailed`]
    /// if an earlier attempt failed, or [`RuntimeError::TornDown`] after
    /// teardown.
    pub fn init(&self) -> Result<(), RuntimeError> {
        if self.state() == LifecycleState::Initialized {
            return Ok(());
        }

        let _region = self.region.enter();

        // Another thread may have finished while we were spinning
        match self.state() {
            LifecycleState::Initialized => return Ok(()),
            LifecycleState::Failed => return Err(RuntimeError::InitializationFailed),
            LifecycleState::TornDown => return Err(RuntimeError::TornDown),
            LifecycleState::Uninitialized => {}
        }

        let result = self.bring_up();
        let next = match result {
            Ok(()) => LifecycleState::Initialized,
            Err(_) => LifecycleState::Failed,
        };
        // Published before the region is left
        self.state.store(next as u8, Ordering::Release);
        result
    }

    fn bring_up(&self) -> Result<(), RuntimeError> {
        profile_function!();

        (self.gate)()?;

        for subsystem in self.subsystems {
            log::debug!("Bringing up {}", subsystem.name());
            if let Err(err) = subsystem.init() {
                log::error!("Runtime bring-up failed in {}: {err}", subsystem.name());
                return Err(err);
            }
        }

        log::info!(
            "RedLilium runtime v{} initialized ({} subsystems)",
            crate::VERSION,
            self.subsystems.len()
        );
        Ok(())
    }

    /// Tear every subsystem down in reverse bring-up order.
    ///
    /// A no-op unless the lifecycle is [`LifecycleState::Initialized`].
    /// Meant to run once, from a single thread, at process exit.
    pub fn tear_down(&self) {
        let _region = self.region.enter();

        if self.state() != LifecycleState::Initialized {
            return;
        }

        for subsystem in self.subsystems.iter().rev() {
            log::debug!("Tearing down {}", subsystem.name());
            subsystem.tear_down();
        }

        self.state
            .store(LifecycleState::TornDown as u8, Ordering::Release);
        log::info!("RedLilium runtime torn down");
    }
}

impl std::fmt::Debug for Lifecycle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lifecycle")
            .field("state", &self.state())
            .field(
                "subsystems",
                &self.subsystems.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Check a build expiration time against `now`, both in Unix seconds.
///
/// # Errors
///
/// Returns [`RuntimeError::Expired`] once `now` is past `expires_at`.
pub fn check_expiry(now: u64, expires_at: u64) -> Result<(), RuntimeError> {
    if now > expires_at {
        log::error!("Build expired at {expires_at} (unix seconds)");
        return Err(RuntimeError::Expired { expires_at });
    }
    log::warn!("For test only: build expires at {expires_at} (unix seconds)");
    Ok(())
}

/// Check the expiration time baked in through `REDLILIUM_EXPIRES_AT`.
///
/// Always passes unless the `expiry` feature is enabled.
pub fn check_build_expiry() -> Result<(), RuntimeError> {
    #[cfg(feature = "expiry")]
    {
        check_baked_expiry()
    }
    #[cfg(not(feature = "expiry"))]
    {
        Ok(())
    }
}

#[cfg(feature = "expiry")]
fn check_baked_expiry() -> Result<(), RuntimeError> {
    use std::time::{SystemTime, UNIX_EPOCH};

    let Some(raw) = option_env!("REDLILIUM_EXPIRES_AT") else {
        return Ok(());
    };
    let expires_at = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| RuntimeError::InvalidFlag {
            name: "REDLILIUM_EXPIRES_AT",
            value: raw.to_string(),
        })?;
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0);
    check_expiry(now, expires_at)
}

static SUBSYSTEMS: [&dyn Subsystem; 4] = [
    &FlagsSubsystem,
    &OptionsSubsystem,
    &DeviceSubsystem,
    // Agents observe a fully formed runtime
    &AgentSubsystem,
];

pub(crate) static RUNTIME: Lifecycle<'static> = Lifecycle::new(&SUBSYSTEMS);

/// The process-wide runtime.
///
/// # Example
///
/// ```ignore
/// Runtime::init().expect("runtime bring-up failed");
/// let context = Context::new(devices())?;
/// // ...
/// Runtime::tear_down();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Runtime;

impl Runtime {
    /// Bring the runtime up. See [`Lifecycle::init`].
    ///
    /// # Errors
    ///
    /// Any error is fatal; the caller should abort rather than retry.
    pub fn init() -> Result<(), RuntimeError> {
        RUNTIME.init()
    }

    /// Tear the runtime down. See [`Lifecycle::tear_down`].
    pub fn tear_down() {
        RUNTIME.tear_down();
    }

    /// Get the runtime state.
    pub fn state() -> LifecycleState {
        RUNTIME.state()
    }

    /// Check whether the runtime is initialized.
    pub fn is_initialized() -> bool {
        RUNTIME.state() == LifecycleState::Initialized
    }
}

static_assertions::assert_impl_all!(Lifecycle<'static>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use parking_lot::Mutex;

    /// Records bring-up and teardown calls into a shared log.
    struct Recording {
        name: &'static str,
        events: Arc<Mutex<Vec<String>>>,
        inits: AtomicUsize,
        fail: bool,
    }

    impl Recording {
        fn new(name: &'static str, events: &Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                name,
                events: Arc::clone(events),
                inits: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing(name: &'static str, events: &Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                fail: true,
                ..Self::new(name, events)
            }
        }

        fn inits(&self) -> usize {
            self.inits.load(Ordering::SeqCst)
        }
    }

    impl Subsystem for Recording {
        fn name(&self) -> &'static str {
            self.name
        }

        fn init(&self) -> Result<(), RuntimeError> {
            self.inits.fetch_add(1, Ordering::SeqCst);
            // Widen the window for racing callers
            std::thread::sleep(Duration::from_millis(5));
            self.events.lock().push(format!("init {}", self.name));
            if self.fail {
                return Err(RuntimeError::BringUpFailed {
                    subsystem: self.name,
                    reason: "test failure".to_string(),
                });
            }
            Ok(())
        }

        fn tear_down(&self) {
            self.events.lock().push(format!("tear_down {}", self.name));
        }
    }

    #[test]
    fn test_init_runs_in_order() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let flags = Recording::new("flags", &events);
        let config = Recording::new("config", &events);
        let device = Recording::new("device", &events);
        let agent = Recording::new("agent", &events);
        let subsystems: [&dyn Subsystem; 4] = [&flags, &config, &device, &agent];
        let lifecycle = Lifecycle::new(&subsystems);

        assert_eq!(lifecycle.state(), LifecycleState::Uninitialized);
        lifecycle.init().unwrap();
        assert_eq!(lifecycle.state(), LifecycleState::Initialized);

        // Second call is a no-op
        lifecycle.init().unwrap();
        assert_eq!(flags.inits(), 1);

        assert_eq!(
            *events.lock(),
            ["init flags", "init config", "init device", "init agent"]
        );
    }

    #[test]
    fn test_concurrent_init_runs_once() {
        const THREADS: usize = 16;

        let events = Arc::new(Mutex::new(Vec::new()));
        let flags = Recording::new("flags", &events);
        let config = Recording::new("config", &events);
        let device = Recording::new("device", &events);
        let agent = Recording::new("agent", &events);
        let subsystems: [&dyn Subsystem; 4] = [&flags, &config, &device, &agent];
        let lifecycle = Lifecycle::new(&subsystems);

        let results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| scope.spawn(|| lifecycle.init()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(results.iter().all(Result::is_ok));
        for subsystem in [&flags, &config, &device, &agent] {
            assert_eq!(subsystem.inits(), 1, "{} ran more than once", subsystem.name);
        }
        assert_eq!(lifecycle.state(), LifecycleState::Initialized);
    }

    #[test]
    fn test_concurrent_failed_init_fails_everywhere() {
        const THREADS: usize = 8;

        let events = Arc::new(Mutex::new(Vec::new()));
        let flags = Recording::new("flags", &events);
        let config = Recording::new("config", &events);
        let device = Recording::failing("device", &events);
        let agent = Recording::new("agent", &events);
        let subsystems: [&dyn Subsystem; 4] = [&flags, &config, &device, &agent];
        let lifecycle = Lifecycle::new(&subsystems);

        let results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| scope.spawn(|| lifecycle.init()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(results.iter().all(Result::is_err));
        assert_eq!(
            results
                .iter()
                .filter(|r| matches!(r, Err(RuntimeError::BringUpFailed { .. })))
                .count(),
            1
        );
        assert_eq!(device.inits(), 1);
        // Fail-fast: nothing after the failing subsystem runs
        assert_eq!(agent.inits(), 0);
        assert_eq!(lifecycle.state(), LifecycleState::Failed);
    }

    #[test]
    fn test_failed_init_is_not_rolled_back() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let flags = Recording::new("flags", &events);
        let config = Recording::failing("config", &events);
        let subsystems: [&dyn Subsystem; 2] = [&flags, &config];
        let lifecycle = Lifecycle::new(&subsystems);

        assert!(lifecycle.init().is_err());
        assert_eq!(lifecycle.init(), Err(RuntimeError::InitializationFailed));

        // Teardown only runs from Initialized
        lifecycle.tear_down();
        assert_eq!(*events.lock(), ["init flags", "init config"]);
        assert_eq!(lifecycle.state(), LifecycleState::Failed);
    }

    #[test]
    fn test_tear_down_reverse_order() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let flags = Recording::new("flags", &events);
        let config = Recording::new("config", &events);
        let device = Recording::new("device", &events);
        let agent = Recording::new("agent", &events);
        let subsystems: [&dyn Subsystem; 4] = [&flags, &config, &device, &agent];
        let lifecycle = Lifecycle::new(&subsystems);

        lifecycle.init().unwrap();
        events.lock().clear();

        lifecycle.tear_down();
        assert_eq!(
            *events.lock(),
            [
                "tear_down agent",
                "tear_down device",
                "tear_down config",
                "tear_down flags"
            ]
        );
        assert_eq!(lifecycle.state(), LifecycleState::TornDown);

        // Second teardown does nothing
        lifecycle.tear_down();
        assert_eq!(events.lock().len(), 4);
    }

    #[test]
    fn test_tear_down_before_init_is_noop() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let flags = Recording::new("flags", &events);
        let subsystems: [&dyn Subsystem; 1] = [&flags];
        let lifecycle = Lifecycle::new(&subsystems);

        lifecycle.tear_down();
        assert!(events.lock().is_empty());
        assert_eq!(lifecycle.state(), LifecycleState::Uninitialized);
    }

    #[test]
    fn test_no_init_after_tear_down() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let flags = Recording::new("flags", &events);
        let subsystems: [&dyn Subsystem; 1] = [&flags];
        let lifecycle = Lifecycle::new(&subsystems);

        lifecycle.init().unwrap();
        lifecycle.tear_down();

        assert_eq!(lifecycle.init(), Err(RuntimeError::TornDown));
        assert_eq!(lifecycle.state(), LifecycleState::TornDown);
        assert_eq!(flags.inits(), 1);
    }

    #[test]
    fn test_check_expiry() {
        assert!(check_expiry(100, 200).is_ok());
        assert!(check_expiry(200, 200).is_ok());
        assert_eq!(
            check_expiry(201, 200),
            Err(RuntimeError::Expired { expires_at: 200 })
        );
    }

    #[test]
    fn test_expired_build_fails_bring_up() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let flags = Recording::new("flags", &events);
        let subsystems: [&dyn Subsystem; 1] = [&flags];
        let lifecycle = Lifecycle::with_gate(&subsystems, || check_expiry(201, 200));

        assert_eq!(
            lifecycle.init(),
            Err(RuntimeError::Expired { expires_at: 200 })
        );
        assert_eq!(lifecycle.state(), LifecycleState::Failed);
        assert_eq!(flags.inits(), 0);
        assert_eq!(lifecycle.init(), Err(RuntimeError::InitializationFailed));
    }

    #[test]
    fn test_unexpired_build_brings_up() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let flags = Recording::new("flags", &events);
        let subsystems: [&dyn Subsystem; 1] = [&flags];
        let lifecycle = Lifecycle::with_gate(&subsystems, || check_expiry(100, 200));

        lifecycle.init().unwrap();
        assert_eq!(flags.inits(), 1);
    }

    #[cfg(not(feature = "expiry"))]
    #[test]
    fn test_build_expiry_passes_without_feature() {
        assert!(check_build_expiry().is_ok());
    }

    #[test]
    fn test_state_from_u8() {
        for state in [
            LifecycleState::Uninitialized,
            LifecycleState::Initialized,
            LifecycleState::TornDown,
            LifecycleState::Failed,
        ] {
            assert_eq!(LifecycleState::from_u8(state as u8), state);
        }
    }
}
