//! Console and log-file output for the launcher commands.
//!
//! Library code logs through `tracing` directly. Commands go through
//! [`Logger`], which adds stage headers, dry-run lines and the end-of-run
//! summary of swapped files.

mod logger;
mod subscriber;
mod types;
mod utils;

pub use logger::Logger;
pub use subscriber::init_subscriber;
pub use types::{EntryStatus, SummaryEntry};

/// Guards `XDG_CACHE_HOME` while tests point it at a temp directory.
#[cfg(test)]
static CACHE_HOME_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Run `f` with `XDG_CACHE_HOME` set to `dir`.
#[cfg(test)]
pub(crate) fn with_cache_home<T>(dir: &std::path::Path, f: impl FnOnce() -> T) -> T {
    let _lock = CACHE_HOME_LOCK
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    // SAFETY: every writer of XDG_CACHE_HOME in this crate's tests holds
    // CACHE_HOME_LOCK, and the variable is removed before it is released.
    #[allow(unsafe_code)]
    unsafe {
        std::env::set_var("XDG_CACHE_HOME", dir);
    }
    let out = f();
    // SAFETY: as above.
    #[allow(unsafe_code)]
    unsafe {
        std::env::remove_var("XDG_CACHE_HOME");
    }
    out
}

/// A [`Logger`] plus a thread-local subscriber writing its file under a temp
/// cache directory. Keep the guard alive for the whole test.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) fn isolated_logger() -> (Logger, tempfile::TempDir, tracing::dispatcher::DefaultGuard) {
    use tracing_subscriber::{Layer as _, filter::LevelFilter, layer::SubscriberExt as _};

    let tmp = tempfile::tempdir().expect("temp cache dir");
    let (layer, log) = with_cache_home(tmp.path(), || {
        (subscriber::FileLayer::new("test"), Logger::new("test"))
    });
    let layer = layer.expect("file layer");
    let subscriber = tracing_subscriber::registry().with(layer.with_filter(LevelFilter::DEBUG));
    let guard = tracing::dispatcher::set_default(&tracing::Dispatch::new(subscriber));
    (log, tmp, guard)
}
