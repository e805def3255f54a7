//! Verus Formal Verification for TeeClaim
//!
//! This module contains Verus specifications and proofs for critical functions.
//! To verify, install Verus and run: verus verification/verus/src/lib.rs
//!
//! Verus installation: https://github.com/verus-lang/verus

use vstd::prelude::*;

verus! {

// ============================================================================
// TIME OF DAY: minutes since midnight stay below one day
// ============================================================================

pub const MINUTES_PER_DAY: u32 = 1440;

/// Specification: a valid hour/minute pair maps below MINUTES_PER_DAY
#[spec]
pub fn minutes_of(hour: nat, minute: nat) -> nat {
    hour * 60 + minute
}

/// Proof: every in-range clock time fits in a day
#[proof]
pub fn lemma_clock_time_in_day(hour: nat, minute: nat)
    requires
        hour < 24,
        minute < 60,
    ensures
        minutes_of(hour, minute) < 1440,
{
    // hour * 60 <= 23 * 60 = 1380, plus minute <= 59 gives 1439
}

// ============================================================================
// DISTANCE: absolute distance between two times is symmetric and bounded
// ============================================================================

#[spec]
pub fn distance(a: nat, b: nat) -> nat {
    if a >= b { (a - b) as nat } else { (b - a) as nat }
}

/// Proof: distance is symmetric
#[proof]
pub fn lemma_distance_symmetric(a: nat, b: nat)
    ensures
        distance(a, b) == distance(b, a),
{
}

/// Proof: distance between two times within a day is itself within a day
#[proof]
pub fn lemma_distance_bounded(a: nat, b: nat)
    requires
        a < 1440,
        b < 1440,
    ensures
        distance(a, b) < 1440,
{
}

// ============================================================================
// CANDIDATE GENERATION: every emitted value lies inside the window
// ============================================================================

/// Executable ripple generation with verified window membership
/// Note: This is a simplified version for verification purposes
#[exec]
pub fn generate_candidates_verified(
    preferred: u32,
    min: u32,
    max: u32,
    step: u32,
) -> (result: Vec<u32>)
    requires
        min <= max,
        max < 1440,
        step > 0,
        step < 1440,
    ensures
        forall|i: int| 0 <= i < result.len() ==> min <= result[i] && result[i] <= max,
{
    let mut out: Vec<u32> = Vec::new();

    if min <= preferred && preferred <= max {
        out.push(preferred);
    }

    let mut offset: u32 = step;
    while offset < 1440
        invariant
            forall|i: int| 0 <= i < out.len() ==> min <= out[i] && out[i] <= max,
            offset >= step,
    {
        let up = preferred + offset;
        if min <= up && up <= max {
            out.push(up);
        }
        if preferred >= offset {
            let down = preferred - offset;
            if min <= down && down <= max {
                out.push(down);
            }
        }
        if up > max && (preferred < offset || preferred - offset < min) {
            break;
        }
        offset = offset + step;
    }

    out
}

} // verus!
