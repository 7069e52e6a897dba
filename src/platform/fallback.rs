//! Ordered fallback chains.
//!
//! A chain is a list of candidate mechanisms tried strictly in order. The
//! first candidate whose attempt returns `Ok` wins and the rest are skipped.
//! Failures are logged and swallowed, so callers only ever see a `bool`.

use std::fmt::Display;

use super::PlatformError;

/// Tries `attempt` on each candidate in order until one succeeds.
///
/// Returns `false` without calling `attempt` when `candidates` is empty.
pub(crate) fn first_success<C, F>(operation: &str, candidates: &[C], mut attempt: F) -> bool
where
    C: Copy + Display,
    F: FnMut(C) -> Result<(), PlatformError>,
{
    if candidates.is_empty() {
        log::debug!("{operation}: no mechanism available");
        return false;
    }

    for &candidate in candidates {
        match attempt(candidate) {
            Ok(()) => {
                log::debug!("{operation}: done via {candidate}");
                return true;
            }
            Err(e) => log::debug!("{operation}: {candidate} failed: {e}"),
        }
    }

    log::warn!(
        "{operation}: all {} mechanism(s) failed",
        candidates.len()
    );
    false
}
