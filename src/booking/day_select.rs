//! Day-selection poller
//!
//! Repeatedly refreshes the calendar until the sentinel day anchors the
//! view and the target day is clickable. Every cycle counts against the
//! budget; exhaustion is terminal for the attempt, not silently ignored.

use thiserror::Error;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::calendar::{CalendarError, CalendarView, Locator, Presence};
use crate::dates::TargetDay;
use crate::retry::RetryBudget;

#[derive(Debug, Error)]
pub enum DaySelectError {
    #[error("day {day} not found after {attempts} attempts")]
    BudgetExhausted { day: u32, attempts: u32 },

    #[error("booking attempt cancelled")]
    Cancelled,

    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

/// Refresh-and-check loop: sentinel day present, then click the target
/// day. Succeeds at most once; retryable misses (sentinel slow to load,
/// target day not on the page yet, stale click) each consume one attempt.
pub async fn select_day<C: CalendarView + ?Sized>(
    calendar: &C,
    target: &TargetDay,
    budget: &RetryBudget,
    cancel: &CancellationToken,
) -> Result<(), DaySelectError> {
    let sentinel = Locator::link(target.sentinel_label());
    let day = Locator::link(target.day_label());

    for attempt in budget.attempts() {
        if cancel.is_cancelled() {
            return Err(DaySelectError::Cancelled);
        }

        calendar.refresh().await?;

        match calendar
            .wait_for_presence(&sentinel, budget.per_attempt_timeout)
            .await?
        {
            Presence::TimedOut => {
                // Tolerates a slow page load, not systemic failure.
                warn!(attempt, "sentinel {} not visible, refreshing", sentinel);
            }
            Presence::Found => {
                let matches = calendar.find_all(&day).await?;
                match matches.first() {
                    None => {
                        // Page may legitimately not show next month yet.
                        debug!(attempt, "sentinel present but {} missing", day);
                    }
                    Some(element) => match calendar.click(element).await {
                        Ok(()) => {
                            info!(attempt, "selected day {}", target.day_number);
                            return Ok(());
                        }
                        Err(e) if e.is_retryable() => {
                            warn!(attempt, "day click failed ({}), retrying", e);
                        }
                        Err(e) => return Err(e.into()),
                    },
                }
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => return Err(DaySelectError::Cancelled),
            _ = sleep(budget.poll_interval) => {}
        }
    }

    Err(DaySelectError::BudgetExhausted {
        day: target.day_number,
        attempts: budget.max_attempts,
    })
}
