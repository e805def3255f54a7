//! Target date resolution
//!
//! The remote calendar only opens bookings a fixed number of days ahead
//! and labels days with bare integers (no leading zeros). The sentinel is
//! the day before the target: a bare day-of-month is ambiguous across
//! month pages, so the previous day anchors the view before the target
//! day can be trusted.

use chrono::{Datelike, Duration, NaiveDate};

/// Days ahead at which the calendar opens new slots.
pub const DEFAULT_LEAD_DAYS: u32 = 9;

/// The day the calendar will open today, plus its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetDay {
    /// Day-of-month (1-31) of the bookable date.
    pub day_number: u32,
    /// Day-of-month of the date immediately before the target. Must be
    /// visible before the target day label can be trusted; never clicked.
    pub sentinel_day_number: u32,
}

impl TargetDay {
    /// Label the remote calendar renders for the target day.
    pub fn day_label(&self) -> String {
        self.day_number.to_string()
    }

    pub fn sentinel_label(&self) -> String {
        self.sentinel_day_number.to_string()
    }
}

/// Resolve today's bookable day number, `lead_days` ahead.
///
/// Month and year boundaries wrap through calendar arithmetic, never
/// through day-number arithmetic (day 31 + 1 is day 1, not day 32).
pub fn resolve(today: NaiveDate, lead_days: u32) -> TargetDay {
    let target = today + Duration::days(lead_days as i64);
    let sentinel = target - Duration::days(1);
    TargetDay {
        day_number: target.day(),
        sentinel_day_number: sentinel.day(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_resolve_mid_month() {
        let t = resolve(date(2024, 10, 10), 9);
        assert_eq!(t.day_number, 19);
        assert_eq!(t.sentinel_day_number, 18);
    }

    #[test]
    fn test_resolve_wraps_31_day_month() {
        // Oct 23 + 9 = Nov 1; sentinel is Oct 31
        let t = resolve(date(2024, 10, 23), 9);
        assert_eq!(t.day_number, 1);
        assert_eq!(t.sentinel_day_number, 31);
    }

    #[test]
    fn test_resolve_wraps_into_february() {
        // Jan 24 + 9 = Feb 2; sentinel Feb 1
        let t = resolve(date(2024, 1, 24), 9);
        assert_eq!(t.day_number, 2);
        assert_eq!(t.sentinel_day_number, 1);
    }

    #[test]
    fn test_resolve_wraps_year() {
        // Dec 28 + 9 = Jan 6 next year
        let t = resolve(date(2024, 12, 28), 9);
        assert_eq!(t.day_number, 6);
        assert_eq!(t.sentinel_day_number, 5);
    }

    #[test]
    fn test_resolve_leap_day() {
        // Feb 20 2024 + 9 = Feb 29 (leap year)
        let t = resolve(date(2024, 2, 20), 9);
        assert_eq!(t.day_number, 29);
        assert_eq!(t.sentinel_day_number, 28);

        // same date in a non-leap year lands in March
        let t = resolve(date(2025, 2, 20), 9);
        assert_eq!(t.day_number, 1);
        assert_eq!(t.sentinel_day_number, 28);
    }

    #[test]
    fn test_labels_have_no_leading_zeros() {
        let t = resolve(date(2024, 10, 23), 9);
        assert_eq!(t.day_label(), "1");
        assert_eq!(t.sentinel_label(), "31");
    }

    #[test]
    fn test_resolve_zero_lead_days() {
        let t = resolve(date(2024, 3, 15), 0);
        assert_eq!(t.day_number, 15);
        assert_eq!(t.sentinel_day_number, 14);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn any_date() -> impl Strategy<Value = NaiveDate> {
        // ~55 years either side of 2024 covers plenty of leap cycles
        (-20_000i64..20_000).prop_map(|offset| {
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(offset)
        })
    }

    proptest! {
        /// sentinel is always exactly one calendar day before the target
        #[test]
        fn sentinel_precedes_target(today in any_date(), lead in 0u32..60) {
            let t = resolve(today, lead);
            let target_date = today + Duration::days(lead as i64);
            prop_assert_eq!(t.day_number, target_date.day());
            prop_assert_eq!(t.sentinel_day_number, (target_date - Duration::days(1)).day());
        }

        /// day numbers are always valid days of month
        #[test]
        fn day_numbers_in_range(today in any_date(), lead in 0u32..60) {
            let t = resolve(today, lead);
            prop_assert!((1..=31).contains(&t.day_number));
            prop_assert!((1..=31).contains(&t.sentinel_day_number));
        }

        /// consecutive day numbers differ by 1 except across a month wrap,
        /// where the sentinel is the last day of its month
        #[test]
        fn wrap_is_consistent(today in any_date(), lead in 0u32..60) {
            let t = resolve(today, lead);
            if t.day_number > 1 {
                prop_assert_eq!(t.sentinel_day_number, t.day_number - 1);
            } else {
                prop_assert!(t.sentinel_day_number >= 28);
            }
        }
    }
}

/// Kani formal verification proofs
#[cfg(kani)]
mod kani_proofs {
    use super::*;

    #[kani::proof]
    fn day_labels_never_zero_padded() {
        let day: u32 = kani::any();
        kani::assume(day >= 1 && day <= 31);
        let t = TargetDay { day_number: day, sentinel_day_number: 1 };
        let label = t.day_label();
        kani::assert(!label.starts_with('0'), "labels must be bare integers");
    }
}
