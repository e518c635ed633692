//! Process attach/detach integration.
//!
//! Platforms notify the runtime when the process (or the module hosting the
//! runtime) is going away. Registration is platform specific and lives behind
//! [`ProcessNotifier`]; the runtime only supplies [`process_detach`].

use crate::config::flags::{self, Flags};
use crate::lifecycle::{Lifecycle, LifecycleState, RUNTIME};

/// Platform hook that calls back when the process detaches.
pub trait ProcessNotifier {
    /// Arrange for `hook` to run on process detach.
    fn on_detach(&self, hook: fn());
}

/// Register [`process_detach`] with a platform notifier.
pub fn register(notifier: &dyn ProcessNotifier) {
    notifier.on_detach(process_detach);
}

/// Tear the runtime down on process detach, if shutdown is enabled.
///
/// Controlled by the `REDLILIUM_ENABLE_SHUTDOWN` flag. Safe to call when the
/// runtime was never initialized.
pub fn process_detach() {
    detach(&RUNTIME, &flags::current());
}

fn detach(lifecycle: &Lifecycle<'_>, flags: &Flags) {
    if lifecycle.state() != LifecycleState::Initialized {
        return;
    }

    if flags.enable_shutdown {
        lifecycle.tear_down();
    } else {
        log::debug!("Shutdown disabled, skipping runtime teardown on detach");
    }
}
