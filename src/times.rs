//! Time-of-day values and candidate generation
//!
//! Candidates ripple outward from the preferred time in fixed steps,
//! so generation order doubles as nearest-to-preferred order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Default spacing between tee slots on the remote calendar, in minutes.
pub const DEFAULT_STEP_MINUTES: u32 = 8;

/// A wall-clock time of day (no date). Stored as minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    minutes: u16,
}

#[derive(Debug, Error, PartialEq)]
pub enum TimeParseError {
    #[error("time '{0}' is not in HH:MM form")]
    Malformed(String),
    #[error("time '{0}' is out of range")]
    OutOfRange(String),
}

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self { minutes: (hour * 60 + minute) as u16 })
        } else {
            None
        }
    }

    pub fn from_minutes(minutes: u16) -> Option<Self> {
        if minutes < MINUTES_PER_DAY {
            Some(Self { minutes })
        } else {
            None
        }
    }

    pub fn hour(&self) -> u32 {
        (self.minutes / 60) as u32
    }

    pub fn minute(&self) -> u32 {
        (self.minutes % 60) as u32
    }

    pub fn minutes_from_midnight(&self) -> u16 {
        self.minutes
    }

    /// Absolute distance to another time, in minutes.
    pub fn distance_minutes(&self, other: TimeOfDay) -> u32 {
        (self.minutes as i32 - other.minutes as i32).unsigned_abs()
    }

    /// The exact text label the remote calendar renders for this slot.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m) = s
            .split_once(':')
            .ok_or_else(|| TimeParseError::Malformed(s.to_string()))?;
        let hour: u32 = h
            .trim()
            .parse()
            .map_err(|_| TimeParseError::Malformed(s.to_string()))?;
        let minute: u32 = m
            .trim()
            .parse()
            .map_err(|_| TimeParseError::Malformed(s.to_string()))?;
        TimeOfDay::new(hour, minute).ok_or_else(|| TimeParseError::OutOfRange(s.to_string()))
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = TimeParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> String {
        t.to_string()
    }
}

/// Inclusive acceptable range for a booking. Invariant: `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    min: TimeOfDay,
    max: TimeOfDay,
}

#[derive(Debug, Error, PartialEq)]
#[error("window minimum {min} is after maximum {max}")]
pub struct WindowError {
    pub min: TimeOfDay,
    pub max: TimeOfDay,
}

impl TimeWindow {
    pub fn new(min: TimeOfDay, max: TimeOfDay) -> Result<Self, WindowError> {
        if min <= max {
            Ok(Self { min, max })
        } else {
            Err(WindowError { min, max })
        }
    }

    pub fn min(&self) -> TimeOfDay {
        self.min
    }

    pub fn max(&self) -> TimeOfDay {
        self.max
    }

    pub fn contains(&self, t: TimeOfDay) -> bool {
        self.min <= t && t <= self.max
    }
}

/// Generate acceptable times around `preferred`, nearest first.
///
/// Starts at `preferred` and expands outward by `step_minutes` per
/// iteration (later side first within each ring), keeping only values
/// inside the window. A preferred time outside the window is excluded,
/// though ripple offsets that land back inside still appear.
pub fn generate_candidates(
    preferred: TimeOfDay,
    window: &TimeWindow,
    step_minutes: u32,
) -> Vec<TimeOfDay> {
    let mut candidates = Vec::new();

    if window.contains(preferred) {
        candidates.push(preferred);
    }
    // Caller validates; the guard keeps the loop total on bad input.
    if step_minutes == 0 {
        return candidates;
    }

    let preferred_min = preferred.minutes_from_midnight() as i64;
    let lo = window.min.minutes_from_midnight() as i64;
    let hi = window.max.minutes_from_midnight() as i64;
    let step = step_minutes as i64;

    let mut i: i64 = 1;
    loop {
        let up = preferred_min + i * step;
        let down = preferred_min - i * step;

        if (lo..=hi).contains(&up) {
            candidates.push(TimeOfDay { minutes: up as u16 });
        }
        if (lo..=hi).contains(&down) {
            candidates.push(TimeOfDay { minutes: down as u16 });
        }

        // Both directions past the window: no later ring can re-enter.
        if up > hi && down < lo {
            break;
        }
        i += 1;
    }

    candidates
}

/// Rank candidates by distance from `preferred`; equidistant pairs are
/// ordered earlier-clock-time first so the tie-break is deterministic.
pub fn rank_by_distance(candidates: &[TimeOfDay], preferred: TimeOfDay) -> Vec<TimeOfDay> {
    let mut ranked = candidates.to_vec();
    ranked.sort_by_key(|t| (t.distance_minutes(preferred), *t));
    ranked
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn any_time() -> impl Strategy<Value = TimeOfDay> {
        (0u16..MINUTES_PER_DAY).prop_map(|m| TimeOfDay::from_minutes(m).unwrap())
    }

    proptest! {
        /// generation terminates and stays inside the window
        #[test]
        fn generated_values_in_window(
            preferred in any_time(),
            a in any_time(),
            b in any_time(),
            step in 1u32..240,
        ) {
            let (min, max) = if a <= b { (a, b) } else { (b, a) };
            let w = TimeWindow::new(min, max).unwrap();
            let got = generate_candidates(preferred, &w, step);
            prop_assert!(got.iter().all(|c| w.contains(*c)));
        }

        /// preferred inside the window is always the first candidate
        #[test]
        fn preferred_in_window_is_first(
            preferred in any_time(),
            a in any_time(),
            b in any_time(),
            step in 1u32..240,
        ) {
            let (min, max) = if a <= b { (a, b) } else { (b, a) };
            let w = TimeWindow::new(min, max).unwrap();
            if w.contains(preferred) {
                let got = generate_candidates(preferred, &w, step);
                prop_assert_eq!(got[0], preferred);
            }
        }

        /// no duplicates for any window/step combination
        #[test]
        fn no_duplicate_candidates(
            preferred in any_time(),
            a in any_time(),
            b in any_time(),
            step in 1u32..240,
        ) {
            let (min, max) = if a <= b { (a, b) } else { (b, a) };
            let w = TimeWindow::new(min, max).unwrap();
            let got = generate_candidates(preferred, &w, step);
            let mut dedup = got.clone();
            dedup.sort();
            dedup.dedup();
            prop_assert_eq!(dedup.len(), got.len());
        }

        /// ranking is a permutation with non-decreasing distance
        #[test]
        fn ranking_sorted_by_distance(
            preferred in any_time(),
            times in proptest::collection::vec(0u16..MINUTES_PER_DAY, 0..30),
        ) {
            let candidates: Vec<TimeOfDay> =
                times.iter().map(|m| TimeOfDay::from_minutes(*m).unwrap()).collect();
            let ranked = rank_by_distance(&candidates, preferred);
            prop_assert_eq!(ranked.len(), candidates.len());
            for pair in ranked.windows(2) {
                let (d0, d1) = (pair[0].distance_minutes(preferred), pair[1].distance_minutes(preferred));
                prop_assert!(d0 < d1 || (d0 == d1 && pair[0] <= pair[1]));
            }
        }

        /// parse/format round-trip
        #[test]
        fn display_parse_round_trip(time in any_time()) {
            let back: TimeOfDay = time.to_string().parse().unwrap();
            prop_assert_eq!(back, time);
        }
    }
}

/// Kani formal verification proofs
#[cfg(kani)]
mod kani_proofs {
    use super::*;

    #[kani::proof]
    fn time_of_day_construction_bounded() {
        let hour: u32 = kani::any();
        let minute: u32 = kani::any();
        match TimeOfDay::new(hour, minute) {
            Some(t) => {
                kani::assert(hour < 24 && minute < 60, "only valid inputs construct");
                kani::assert(t.minutes_from_midnight() < MINUTES_PER_DAY, "stored value bounded");
            }
            None => kani::assert(hour >= 24 || minute >= 60, "rejection implies invalid input"),
        }
    }

    #[kani::proof]
    fn distance_is_symmetric() {
        let a: u16 = kani::any();
        let b: u16 = kani::any();
        kani::assume(a < MINUTES_PER_DAY && b < MINUTES_PER_DAY);
        let x = TimeOfDay::from_minutes(a).unwrap();
        let y = TimeOfDay::from_minutes(b).unwrap();
        kani::assert(x.distance_minutes(y) == y.distance_minutes(x), "distance must be symmetric");
    }
}
