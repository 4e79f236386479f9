//! Process-wide library lifecycle
//!
//! Rendering works without calling [`initialize`]; the call only wires up
//! diagnostics. It is guarded so repeated initialization is a no-op.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Environment variable overriding the resource directory
pub const RESOURCES_ENV: &str = "STILLFRAME_RESOURCES";

/// Initialize the library: installs a logger at info level, or debug level
/// when `verbose` is set
///
/// Returns `true` if this call performed the initialization, `false` when
/// the library was already initialized.
pub fn initialize(verbose: bool) -> bool {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        log::debug!("stillframe already initialized");
        return false;
    }

    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    // A logger installed by the host application wins; ignore the conflict
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .try_init();

    log::debug!("stillframe initialized");
    true
}

/// Whether [`initialize`] has been called without a matching [`shutdown`]
pub fn is_initialized() -> bool {
    INITIALIZED.load(Ordering::SeqCst)
}

/// Tear down the library state; idempotent
///
/// The installed logger stays in place (loggers are process-global), but a
/// later [`initialize`] call is treated as a fresh one again.
pub fn shutdown() {
    if INITIALIZED.swap(false, Ordering::SeqCst) {
        log::debug!("stillframe shut down");
    }
}

/// Directory model paths are resolved against when given relative
///
/// Reads the `STILLFRAME_RESOURCES` environment variable, falling back to
/// `resources/` under the current directory.
pub fn resource_directory() -> PathBuf {
    std::env::var_os(RESOURCES_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("resources"))
}
