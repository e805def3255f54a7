//! Aeneas-compatible Rust code for Lean verification
//!
//! This module contains simplified Rust code that can be translated to Lean 4
//! using Aeneas for formal verification.
//!
//! To verify:
//!   1. Install Aeneas: https://github.com/AeneasVerif/aeneas
//!   2. Run: aeneas -backend lean4 src/lib.rs
//!   3. Write proofs in the generated Lean files
//!
//! Note: Aeneas works best with simple, ownership-clear code.
//! Avoid: unsafe, RefCell, async, complex generics.

/// A candidate tee time as minutes since midnight
#[derive(Clone)]
pub struct Candidate {
    pub minutes: u32,
}

/// Simplified list for candidates (Aeneas prefers explicit lists)
#[derive(Clone)]
pub enum CandidateList {
    Nil,
    Cons(Candidate, Box<CandidateList>),
}

impl CandidateList {
    /// Create an empty list
    pub fn new() -> Self {
        CandidateList::Nil
    }

    /// Get the length of the list
    pub fn len(&self) -> u32 {
        match self {
            CandidateList::Nil => 0,
            CandidateList::Cons(_, tail) => 1 + tail.len(),
        }
    }

    /// True when every candidate lies in the inclusive window
    pub fn all_in_window(&self, min: u32, max: u32) -> bool {
        match self {
            CandidateList::Nil => true,
            CandidateList::Cons(head, tail) => {
                min <= head.minutes && head.minutes <= max && tail.all_in_window(min, max)
            }
        }
    }

    /// Prepend a candidate
    pub fn push(self, minutes: u32) -> Self {
        CandidateList::Cons(Candidate { minutes }, Box::new(self))
    }
}

/// Ripple outward from the preferred time, keeping in-window values.
/// Bounded by the remaining fuel so Lean sees structural termination.
pub fn ripple(preferred: u32, min: u32, max: u32, step: u32, fuel: u32) -> CandidateList {
    let mut out = CandidateList::new();
    if min <= preferred && preferred <= max {
        out = out.push(preferred);
    }
    ripple_from(preferred, min, max, step, step, fuel, out)
}

fn ripple_from(
    preferred: u32,
    min: u32,
    max: u32,
    step: u32,
    offset: u32,
    fuel: u32,
    acc: CandidateList,
) -> CandidateList {
    if fuel == 0 || step == 0 {
        return acc;
    }
    let mut acc = acc;
    let up = preferred + offset;
    if min <= up && up <= max {
        acc = acc.push(up);
    }
    if preferred >= offset {
        let down = preferred - offset;
        if min <= down && down <= max {
            acc = acc.push(down);
        }
    }
    let above = up > max;
    let below = preferred < offset || preferred - offset < min;
    if above && below {
        return acc;
    }
    ripple_from(preferred, min, max, step, offset + step, fuel - 1, acc)
}
