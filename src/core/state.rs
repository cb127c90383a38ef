//! Process-wide run state.
//!
//! - `SHUTDOWN`: Has shutdown been requested? (Ctrl+C received)

use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Whether Ctrl+C was received.
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::SeqCst)
}

/// Install the Ctrl+C handler.
///
/// A one-shot `build` exits immediately. In watch mode the loop polls
/// [`is_shutdown`] and stops after the current rebuild.
pub fn setup_shutdown_handler(watching: bool) -> anyhow::Result<()> {
    ctrlc::set_handler(move || {
        if !watching {
            std::process::exit(130);
        }
        SHUTDOWN.store(true, Ordering::SeqCst);
        crate::log!("watch"; "shutting down...");
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}
