//! Bounded retry-poll state machines for the booking flow

mod day_select;
mod slots;

#[cfg(test)]
mod model;

pub use day_select::{select_day, DaySelectError};
pub use slots::{
    acquire_slot, AcquisitionPlan, AcquisitionPolicy, SlotError, SlotOutcome,
};
