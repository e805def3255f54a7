//! Booking orchestration
//!
//! Composes the pure planning steps (candidate generation, date
//! resolution, release instant) with the two pollers into a single
//! booking attempt that ends in exactly one [`BookingOutcome`].

use std::fmt;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::booking::{
    acquire_slot, select_day, AcquisitionPlan, AcquisitionPolicy, DaySelectError, SlotOutcome,
};
use crate::calendar::{CalendarView, Scope};
use crate::config::Config;
use crate::dates::{self, TargetDay};
use crate::redact;
use crate::release::{self, Waited};
use crate::times::{self, TimeOfDay, TimeWindow, WindowError};
use crate::webdriver::WebDriverCalendar;

/// Name of the submit control on the booking confirmation form.
const SUBMIT_CONTROL: &str = "submit_frm_nopay";

/// Frame index of the confirmation surface after a slot click.
const CONFIRM_FRAME: u16 = 0;

/// One member's booking request: credentials plus the acceptable
/// time range. Loaded from a JSON requests file or from the environment.
#[derive(Clone, Deserialize)]
pub struct BookingRequest {
    pub username: String,
    pub password: String,
    pub preferred_time: TimeOfDay,
    pub min_time: TimeOfDay,
    pub max_time: TimeOfDay,
}

// Credentials stay out of debug output.
impl fmt::Debug for BookingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookingRequest")
            .field("username", &redact::username(&self.username))
            .field("preferred_time", &self.preferred_time)
            .field("min_time", &self.min_time)
            .field("max_time", &self.max_time)
            .finish_non_exhaustive()
    }
}

impl BookingRequest {
    /// Single-request mode: credentials and times from the environment.
    pub fn from_env() -> Result<Self> {
        Self::from_getter(|key| std::env::var(key).ok())
    }

    /// Parse a request from a custom getter function (for testing)
    pub fn from_getter<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            get(key).ok_or_else(|| anyhow!("{} is required in single-request mode", key))
        };
        let time = |key: &str| -> Result<TimeOfDay> {
            required(key)?
                .parse()
                .map_err(|e| anyhow!("{}: {}", key, e))
        };
        Ok(BookingRequest {
            username: required("TEE_USERNAME")?,
            password: required("TEE_PASSWORD")?,
            preferred_time: time("TEE_PREFERRED_TIME")?,
            min_time: time("TEE_MIN_TIME")?,
            max_time: time("TEE_MAX_TIME")?,
        })
    }

    /// Load a batch of requests from a JSON file.
    pub fn load_file(path: &str) -> Result<Vec<Self>> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read requests file '{}'", path))?;
        let requests: Vec<Self> = serde_json::from_str(&text)
            .with_context(|| format!("requests file '{}' is not valid JSON", path))?;
        Ok(requests)
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("username and password must both be non-empty")]
    BlankCredentials,

    #[error(transparent)]
    ReversedWindow(#[from] WindowError),

    #[error("slot step must be greater than zero minutes")]
    ZeroStep,

    #[error("no candidate time between {min} and {max} for preferred {preferred}")]
    NoCandidates {
        preferred: TimeOfDay,
        min: TimeOfDay,
        max: TimeOfDay,
    },
}

/// Everything a booking attempt needs, computed before the browser opens.
#[derive(Debug, Clone)]
pub struct BookingTarget {
    pub day: TargetDay,
    pub release_instant: DateTime<Tz>,
    pub candidates: Vec<TimeOfDay>,
}

/// Final verdict of one booking attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingOutcome {
    Booked { time: TimeOfDay },
    SlotUnavailable,
    DaySelectionFailed,
    ConfirmationFailed,
}

impl fmt::Display for BookingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingOutcome::Booked { time } => write!(f, "booked {}", time),
            BookingOutcome::SlotUnavailable => write!(f, "no acceptable slot was available"),
            BookingOutcome::DaySelectionFailed => write!(f, "target day never became selectable"),
            BookingOutcome::ConfirmationFailed => {
                write!(f, "a slot was clicked but the booking did not confirm")
            }
        }
    }
}

/// Validate a request against the config and plan the attempt.
///
/// Runs before any collaborator interaction so a bad request never
/// opens a browser session.
pub fn prepare(config: &Config, request: &BookingRequest) -> Result<BookingTarget> {
    if request.username.trim().is_empty() || request.password.trim().is_empty() {
        return Err(ValidationError::BlankCredentials.into());
    }
    if config.slot_step_minutes == 0 {
        return Err(ValidationError::ZeroStep.into());
    }
    let window =
        TimeWindow::new(request.min_time, request.max_time).map_err(ValidationError::from)?;

    let candidates =
        times::generate_candidates(request.preferred_time, &window, config.slot_step_minutes);
    if candidates.is_empty() {
        return Err(ValidationError::NoCandidates {
            preferred: request.preferred_time,
            min: window.min(),
            max: window.max(),
        }
        .into());
    }

    let today = Utc::now().with_timezone(&config.time_zone).date_naive();
    let day = dates::resolve(today, config.lead_days);
    let release_instant = release::release_instant(
        today,
        config.release_hour,
        config.release_minute,
        config.time_zone,
    )
    .ok_or_else(|| {
        anyhow!(
            "release time {:02}:{:02} does not exist on {} in {}",
            config.release_hour,
            config.release_minute,
            today,
            config.time_zone
        )
    })?;

    Ok(BookingTarget {
        day,
        release_instant,
        candidates,
    })
}

/// Drive one booking attempt against an already logged-in calendar view.
///
/// Generic over the view so the whole flow is testable with a scripted
/// fake. Fatal collaborator errors and cancellation surface as `Err`;
/// everything else is one of the four outcomes.
pub async fn run_booking<C: CalendarView + ?Sized>(
    calendar: &C,
    config: &Config,
    request: &BookingRequest,
    target: &BookingTarget,
    skip_wait: bool,
    cancel: &CancellationToken,
) -> Result<BookingOutcome> {
    if skip_wait {
        info!("skipping the release wait");
    } else {
        info!(
            "waiting for release at {} for day {}",
            target.release_instant, target.day.day_number
        );
        let tz = config.time_zone;
        let waited = release::await_instant(
            target.release_instant,
            || Utc::now().with_timezone(&tz),
            cancel,
        )
        .await;
        if waited == Waited::Cancelled {
            return Err(anyhow!("cancelled while waiting for release"));
        }
    }

    match select_day(calendar, &target.day, &config.page_budget(), cancel).await {
        Ok(()) => {}
        Err(DaySelectError::BudgetExhausted { day, attempts }) => {
            warn!(day, attempts, "day selection budget exhausted");
            return Ok(BookingOutcome::DaySelectionFailed);
        }
        Err(e) => return Err(e.into()),
    }

    let plan = AcquisitionPlan {
        candidates: target.candidates.clone(),
        preferred: request.preferred_time,
        policy: AcquisitionPolicy::RankedByDistance,
        confirm_scope: Scope::Frame(CONFIRM_FRAME),
        submit_control: SUBMIT_CONTROL.to_string(),
    };
    let outcome = acquire_slot(
        calendar,
        &plan,
        &config.slot_budget(),
        &config.confirm_budget(),
        cancel,
    )
    .await?;

    Ok(match outcome {
        SlotOutcome::Booked { time } => BookingOutcome::Booked { time },
        SlotOutcome::SlotUnavailable { cycles } => {
            warn!(cycles, "no candidate slot appeared within budget");
            BookingOutcome::SlotUnavailable
        }
        SlotOutcome::ConfirmationFailed { time } => {
            warn!(%time, "booking did not confirm");
            BookingOutcome::ConfirmationFailed
        }
    })
}

/// Run one complete attempt: open a browser session, log in, book, and
/// tear the session down on every exit path.
pub async fn run_attempt(
    config: &Config,
    request: &BookingRequest,
    skip_wait: bool,
    cancel: &CancellationToken,
) -> Result<BookingOutcome> {
    let target = prepare(config, request)?;
    info!(
        "attempt for {}: day {} (sentinel {}), {} candidate times",
        redact::username(&request.username),
        target.day.day_number,
        target.day.sentinel_day_number,
        target.candidates.len()
    );

    let calendar = WebDriverCalendar::connect(config)
        .await
        .context("cannot open a webdriver session")?;

    let result = async {
        calendar
            .login(&request.username, &request.password)
            .await
            .context("login failed")?;
        run_booking(&calendar, config, request, &target, skip_wait, cancel).await
    }
    .await;

    if let Err(e) = calendar.close().await {
        warn!("webdriver session teardown failed: {}", e);
    }

    result
}
