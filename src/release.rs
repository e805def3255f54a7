//! Release-instant scheduling
//!
//! New slots appear on the remote calendar at a fixed local wall-clock
//! time. The waiter polls a caller-supplied clock so it is testable, and
//! checks the cancellation token at every sleep boundary.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Upper bound on a single nap while waiting for the release instant.
pub const WAIT_GRANULARITY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waited {
    /// The instant has been reached (or was already in the past).
    Ready,
    /// The cancellation signal fired first.
    Cancelled,
}

/// Combine a calendar date with the configured release time in `tz`.
///
/// A DST-ambiguous local time resolves to its earliest mapping; a local
/// time skipped by a DST gap yields `None` and must be treated as a
/// configuration error by the caller.
pub fn release_instant(today: NaiveDate, hour: u32, minute: u32, tz: Tz) -> Option<DateTime<Tz>> {
    let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
    tz.from_local_datetime(&today.and_time(time)).earliest()
}

/// Cooperatively wait until `instant`, polling `now` at most once per
/// [`WAIT_GRANULARITY`]. Returns [`Waited::Ready`] immediately, without
/// sleeping, when `now() >= instant`.
pub async fn await_instant<F>(instant: DateTime<Tz>, now: F, cancel: &CancellationToken) -> Waited
where
    F: Fn() -> DateTime<Tz>,
{
    loop {
        let current = now();
        if current >= instant {
            return Waited::Ready;
        }
        let remaining = (instant - current).to_std().unwrap_or(Duration::ZERO);
        let nap = remaining.min(WAIT_GRANULARITY);
        tokio::select! {
            _ = cancel.cancelled() => return Waited::Cancelled,
            _ = sleep(nap) => {}
        }
    }
}
