//! Process-wide registry of destinations currently swapped by live sessions.
//!
//! Used only to detect two sessions swapping the same destination at the
//! same time. Detection is reported, never enforced: coordinating such
//! launches is up to the caller.
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, PoisonError};

use super::session::SessionId;

static CLAIMS: LazyLock<Mutex<HashMap<PathBuf, Vec<SessionId>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Record that `session` has swapped `destination`.
///
/// Returns the other sessions that already hold a claim on it.
#[must_use]
pub fn claim(destination: &Path, session: &SessionId) -> Vec<SessionId> {
    let mut claims = CLAIMS.lock().unwrap_or_else(PoisonError::into_inner);
    let holders = claims.entry(destination.to_path_buf()).or_default();
    let others = holders.iter().filter(|h| *h != session).cloned().collect();
    if !holders.contains(session) {
        holders.push(session.clone());
    }
    others
}

/// Drop every claim held by `session`.
pub fn release(session: &SessionId) {
    let mut claims = CLAIMS.lock().unwrap_or_else(PoisonError::into_inner);
    claims.retain(|_, holders| {
        holders.retain(|h| h != session);
        !holders.is_empty()
    });
}

/// Sessions in this process that currently hold `destination`.
#[must_use]
pub fn holders(destination: &Path) -> Vec<SessionId> {
    CLAIMS
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(destination)
        .cloned()
        .unwrap_or_default()
}
