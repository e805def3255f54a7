//! Flux Refinement Types for TeeClaim
//!
//! This module contains Flux refinement type annotations for critical functions.
//! To verify, install Flux and run: flux-rs check verification/flux/lib.rs
//!
//! Flux installation: https://github.com/flux-rs/flux

// ============================================================================
// TIME OF DAY: minutes since midnight stay below one day
// ============================================================================

const MINUTES_PER_DAY: usize = 1440;

/// Combine an in-range hour and minute into minutes since midnight
///
/// Flux signature ensures the result is a valid time of day
#[flux::sig(fn(hour: usize{v: v < 24}, minute: usize{v: v < 60}) -> usize{v: v < MINUTES_PER_DAY})]
pub fn minutes_from_midnight(hour: usize, minute: usize) -> usize {
    hour * 60 + minute
}

/// Absolute distance in minutes between two times of day
///
/// Flux signature ensures the distance never exceeds a day
#[flux::sig(fn(a: usize{v: v < MINUTES_PER_DAY}, b: usize{v: v < MINUTES_PER_DAY}) -> usize{v: v < MINUTES_PER_DAY})]
pub fn distance_minutes(a: usize, b: usize) -> usize {
    if a >= b {
        a - b
    } else {
        b - a
    }
}

// ============================================================================
// WINDOW CLAMP: a candidate kept by the filter lies inside the window
// ============================================================================

/// Keep a candidate only when it lies in the inclusive window
#[flux::sig(fn(value: usize, min: usize, max: usize{min <= max}) -> Option<usize{v: min <= v && v <= max}>)]
pub fn keep_in_window(value: usize, min: usize, max: usize) -> Option<usize> {
    if min <= value && value <= max {
        Some(value)
    } else {
        None
    }
}
