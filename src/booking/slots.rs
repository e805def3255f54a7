//! Slot acquisition poller and confirmation sub-loop
//!
//! Scans the day's page for candidate time labels and books the best one
//! present. A slot is only reported booked once the confirmation surface
//! accepted a single submit click; the submit is never retried against
//! the same slot, so submission stays at-most-once.

use thiserror::Error;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::calendar::{CalendarError, CalendarView, ElementHandle, Locator, Scope};
use crate::retry::RetryBudget;
use crate::times::TimeOfDay;

/// Which slot to take when several candidates are on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionPolicy {
    /// Click the first candidate found in generation order. Generation
    /// already ripples outward from the preferred time, so this
    /// approximates nearest-to-preferred without a separate sort.
    GeneratorOrder,
    /// Scan everything present, rank by distance from the preferred time
    /// (ties to the earlier clock time), and fall through to the next
    /// ranked candidate when a click or its confirmation fails.
    RankedByDistance,
}

/// Everything the acquisition poller needs, fixed per attempt.
#[derive(Debug, Clone)]
pub struct AcquisitionPlan {
    /// Acceptable times in generation (ripple) order.
    pub candidates: Vec<TimeOfDay>,
    pub preferred: TimeOfDay,
    pub policy: AcquisitionPolicy,
    /// Nested surface holding the booking form after a slot click.
    pub confirm_scope: Scope,
    /// Name of the submit control inside the confirmation surface.
    pub submit_control: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOutcome {
    /// Slot clicked and confirmation submitted.
    Booked { time: TimeOfDay },
    /// No candidate appeared within budget. Expected, non-fatal.
    SlotUnavailable { cycles: u32 },
    /// A slot was clicked but the booking never completed. Callers must
    /// not blindly retry the same slot; a retry could double-submit.
    ConfirmationFailed { time: TimeOfDay },
}

#[derive(Debug, Error)]
pub enum SlotError {
    #[error("booking attempt cancelled")]
    Cancelled,

    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

/// What a single polling cycle concluded.
enum Cycle {
    Booked(TimeOfDay),
    ConfirmationFailed(TimeOfDay),
    NothingPresent,
}

/// Poll the day's page for candidate slots, at most `budget.max_attempts`
/// cycles, sleeping `poll_interval` between empty scans.
pub async fn acquire_slot<C: CalendarView + ?Sized>(
    calendar: &C,
    plan: &AcquisitionPlan,
    budget: &RetryBudget,
    confirm_budget: &RetryBudget,
    cancel: &CancellationToken,
) -> Result<SlotOutcome, SlotError> {
    if plan.candidates.is_empty() {
        return Ok(SlotOutcome::SlotUnavailable { cycles: 0 });
    }

    for attempt in budget.attempts() {
        if cancel.is_cancelled() {
            return Err(SlotError::Cancelled);
        }

        let cycle = match plan.policy {
            AcquisitionPolicy::GeneratorOrder => {
                generator_order_cycle(calendar, plan, confirm_budget, cancel).await?
            }
            AcquisitionPolicy::RankedByDistance => {
                ranked_cycle(calendar, plan, confirm_budget, cancel).await?
            }
        };

        match cycle {
            Cycle::Booked(time) => {
                info!(attempt, %time, "slot booked");
                return Ok(SlotOutcome::Booked { time });
            }
            Cycle::ConfirmationFailed(time) => {
                warn!(attempt, %time, "slot clicked but confirmation never completed");
                return Ok(SlotOutcome::ConfirmationFailed { time });
            }
            Cycle::NothingPresent => {
                debug!(attempt, "no candidate slot on the page yet");
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => return Err(SlotError::Cancelled),
            _ = sleep(budget.poll_interval) => {}
        }
    }

    Ok(SlotOutcome::SlotUnavailable { cycles: budget.max_attempts })
}

/// One cycle under [`AcquisitionPolicy::GeneratorOrder`]: click the first
/// candidate present and stop with its confirmation verdict.
async fn generator_order_cycle<C: CalendarView + ?Sized>(
    calendar: &C,
    plan: &AcquisitionPlan,
    confirm_budget: &RetryBudget,
    cancel: &CancellationToken,
) -> Result<Cycle, SlotError> {
    for time in &plan.candidates {
        let found = calendar.find_all(&Locator::link(time.label())).await?;
        let Some(element) = found.first() else {
            continue;
        };
        match calendar.click(element).await {
            Ok(()) => {
                return if confirm_booking(calendar, plan, confirm_budget, cancel).await? {
                    Ok(Cycle::Booked(*time))
                } else {
                    Ok(Cycle::ConfirmationFailed(*time))
                };
            }
            Err(e) if e.is_retryable() => {
                // Slot vanished between scan and click; someone else won it.
                warn!(%time, "slot went stale before click");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(Cycle::NothingPresent)
}

/// One cycle under [`AcquisitionPolicy::RankedByDistance`]: collect every
/// candidate currently present, then work down the ranking. The page can
/// race, so a stale click or failed confirmation falls through to the
/// next ranked candidate rather than ending the cycle.
async fn ranked_cycle<C: CalendarView + ?Sized>(
    calendar: &C,
    plan: &AcquisitionPlan,
    confirm_budget: &RetryBudget,
    cancel: &CancellationToken,
) -> Result<Cycle, SlotError> {
    let mut present: Vec<(TimeOfDay, ElementHandle)> = Vec::new();
    for time in &plan.candidates {
        let found = calendar.find_all(&Locator::link(time.label())).await?;
        if let Some(element) = found.into_iter().next() {
            present.push((*time, element));
        }
    }
    if present.is_empty() {
        return Ok(Cycle::NothingPresent);
    }

    present.sort_by_key(|(time, _)| (time.distance_minutes(plan.preferred), *time));
    debug!(
        "candidates present, best first: {:?}",
        present.iter().map(|(t, _)| t.to_string()).collect::<Vec<_>>()
    );

    let mut clicked: Option<TimeOfDay> = None;
    for (time, element) in &present {
        if cancel.is_cancelled() {
            return Err(SlotError::Cancelled);
        }
        match calendar.click(element).await {
            Ok(()) => {
                clicked.get_or_insert(*time);
                if confirm_booking(calendar, plan, confirm_budget, cancel).await? {
                    return Ok(Cycle::Booked(*time));
                }
                warn!(%time, "confirmation failed, trying next ranked slot");
                // Back to the calendar surface before the next click.
                calendar.enter_scope(&Scope::Top).await?;
            }
            Err(e) if e.is_retryable() => {
                warn!(%time, "slot went stale before click, trying next");
            }
            Err(e) => return Err(e.into()),
        }
    }

    match clicked {
        Some(time) => Ok(Cycle::ConfirmationFailed(time)),
        None => Ok(Cycle::NothingPresent),
    }
}

/// Confirmation sub-loop: enter the booking surface and press submit.
///
/// The submit control may render late, so its presence is polled on a
/// smaller budget. Submitting is non-repeatable: once the control is
/// found it is clicked exactly once, and a failed click is reported as an
/// unconfirmed booking rather than retried.
async fn confirm_booking<C: CalendarView + ?Sized>(
    calendar: &C,
    plan: &AcquisitionPlan,
    budget: &RetryBudget,
    cancel: &CancellationToken,
) -> Result<bool, SlotError> {
    let submit = Locator::control(plan.submit_control.clone());
    calendar.enter_scope(&plan.confirm_scope).await?;

    for attempt in budget.attempts() {
        if cancel.is_cancelled() {
            return Err(SlotError::Cancelled);
        }

        if calendar
            .wait_for_clickable(&submit, budget.per_attempt_timeout)
            .await?
            .is_found()
        {
            let controls = calendar.find_all(&submit).await?;
            if let Some(control) = controls.first() {
                return match calendar.click(control).await {
                    Ok(()) => Ok(true),
                    // At-most-once: never re-click a submit control.
                    Err(CalendarError::Stale) => Ok(false),
                    Err(e) => Err(e.into()),
                };
            }
        }
        debug!(attempt, "submit control not present yet");

        tokio::select! {
            _ = cancel.cancelled() => return Err(SlotError::Cancelled),
            _ = sleep(budget.poll_interval) => {}
        }
    }

    Ok(false)
}
