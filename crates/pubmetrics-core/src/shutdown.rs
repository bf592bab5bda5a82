//! Cancellation support via atomic flag

use std::sync::atomic::AtomicBool;

/// Global cancellation flag, set by the SIGTERM/SIGINT handler.
///
/// Runners take `&AtomicBool` rather than reading this directly, so tests can
/// pass their own flag.
pub fn shutdown_flag() -> &'static AtomicBool {
    static FLAG: AtomicBool = AtomicBool::new(false);
    &FLAG
}
