//! Slot Acquisition State Machine - Stateright Model
//! Formally verifies the polling flow: scan -> click -> confirm -> book
//!
//! Run with: cargo test --release acquisition_model -- --nocapture

use stateright::*;

/// Poller states matching the acquisition/confirmation implementation
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum AcqState {
    Scanning { cycles: u8 },
    Confirming { polls: u8 },
    Booked,
    Unavailable,
    ConfirmFailed,
}

/// Events the remote page can produce during acquisition
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum AcqAction {
    ScanEmpty,
    ScanHit,
    SlotStaleOnClick,
    SubmitMissing,
    SubmitFound,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct AcqModel {
    pub state: AcqState,
    pub slot_clicks: u8,
    pub submit_clicks: u8,
}

/// Configuration for the model checker
#[derive(Clone)]
pub struct AcquisitionChecker {
    pub max_cycles: u8,
    pub max_confirm_polls: u8,
}

impl Default for AcquisitionChecker {
    fn default() -> Self {
        Self {
            max_cycles: 4,
            max_confirm_polls: 3,
        }
    }
}

impl Model for AcquisitionChecker {
    type State = AcqModel;
    type Action = AcqAction;

    fn init_states(&self) -> Vec<Self::State> {
        vec![AcqModel {
            state: AcqState::Scanning { cycles: 0 },
            slot_clicks: 0,
            submit_clicks: 0,
        }]
    }

    fn actions(&self, state: &Self::State, actions: &mut Vec<Self::Action>) {
        match &state.state {
            AcqState::Scanning { cycles } => {
                if *cycles < self.max_cycles {
                    actions.push(AcqAction::ScanEmpty);
                    actions.push(AcqAction::ScanHit);
                    actions.push(AcqAction::SlotStaleOnClick);
                }
            }
            AcqState::Confirming { polls } => {
                if *polls < self.max_confirm_polls {
                    actions.push(AcqAction::SubmitMissing);
                }
                actions.push(AcqAction::SubmitFound);
            }
            AcqState::Booked | AcqState::Unavailable | AcqState::ConfirmFailed => {
                // Terminal states - no actions
            }
        }
    }

    fn next_state(&self, state: &Self::State, action: Self::Action) -> Option<Self::State> {
        let mut next = state.clone();

        match action {
            AcqAction::ScanEmpty | AcqAction::SlotStaleOnClick => {
                if let AcqState::Scanning { cycles } = state.state {
                    let spent = cycles + 1;
                    next.state = if spent >= self.max_cycles {
                        AcqState::Unavailable
                    } else {
                        AcqState::Scanning { cycles: spent }
                    };
                }
            }

            AcqAction::ScanHit => {
                if matches!(state.state, AcqState::Scanning { .. }) {
                    next.slot_clicks = state.slot_clicks.saturating_add(1);
                    next.state = AcqState::Confirming { polls: 0 };
                }
            }

            AcqAction::SubmitMissing => {
                if let AcqState::Confirming { polls } = state.state {
                    let spent = polls + 1;
                    next.state = if spent >= self.max_confirm_polls {
                        AcqState::ConfirmFailed
                    } else {
                        AcqState::Confirming { polls: spent }
                    };
                }
            }

            AcqAction::SubmitFound => {
                if matches!(state.state, AcqState::Confirming { .. }) {
                    next.submit_clicks = state.submit_clicks.saturating_add(1);
                    next.state = AcqState::Booked;
                }
            }
        }

        Some(next)
    }

    fn properties(&self) -> Vec<Property<Self>> {
        vec![
            // Safety: the submit control is clicked at most once, ever
            Property::always("at_most_once_submit", |_, state: &AcqModel| {
                state.submit_clicks <= 1
            }),
            // Safety: booked implies exactly one submission happened
            Property::always("booked_means_submitted", |_, state: &AcqModel| {
                state.state != AcqState::Booked || state.submit_clicks == 1
            }),
            // Safety: no submission without a prior slot click
            Property::always("no_submit_without_slot", |_, state: &AcqModel| {
                state.submit_clicks == 0 || state.slot_clicks >= 1
            }),
            // Safety: scan cycles never exceed the budget
            Property::always("cycles_bounded", |model: &AcquisitionChecker, state: &AcqModel| {
                match state.state {
                    AcqState::Scanning { cycles } => cycles < model.max_cycles,
                    _ => true,
                }
            }),
            // Safety: unavailable means nothing was ever submitted
            Property::always("unavailable_is_clean", |_, state: &AcqModel| {
                state.state != AcqState::Unavailable || state.submit_clicks == 0
            }),
            // Liveness: every run reaches a terminal outcome
            Property::eventually("terminal_outcome", |_, state: &AcqModel| {
                matches!(
                    state.state,
                    AcqState::Booked | AcqState::Unavailable | AcqState::ConfirmFailed
                )
            }),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stateright::Checker;

    #[test]
    fn acquisition_model_check_safety() {
        let checker = AcquisitionChecker::default().checker().spawn_bfs().join();
        println!("States explored: {}", checker.unique_state_count());
        checker.assert_properties();
    }

    #[test]
    fn acquisition_model_happy_path() {
        let model = AcquisitionChecker::default();

        let mut state = model.init_states()[0].clone();
        assert_eq!(state.state, AcqState::Scanning { cycles: 0 });

        // page loads slowly: one empty scan first
        state = model.next_state(&state, AcqAction::ScanEmpty).unwrap();
        assert_eq!(state.state, AcqState::Scanning { cycles: 1 });

        // a candidate appears and gets clicked
        state = model.next_state(&state, AcqAction::ScanHit).unwrap();
        assert_eq!(state.state, AcqState::Confirming { polls: 0 });
        assert_eq!(state.slot_clicks, 1);

        // submit renders late, then is pressed once
        state = model.next_state(&state, AcqAction::SubmitMissing).unwrap();
        state = model.next_state(&state, AcqAction::SubmitFound).unwrap();
        assert_eq!(state.state, AcqState::Booked);
        assert_eq!(state.submit_clicks, 1);
    }

    #[test]
    fn acquisition_model_budget_exhaustion() {
        let model = AcquisitionChecker::default();

        let mut state = model.init_states()[0].clone();
        for _ in 0..model.max_cycles {
            state = model.next_state(&state, AcqAction::ScanEmpty).unwrap();
        }
        assert_eq!(state.state, AcqState::Unavailable);
        assert_eq!(state.submit_clicks, 0);
    }

    #[test]
    fn acquisition_model_confirmation_failure() {
        let model = AcquisitionChecker::default();

        let mut state = model.init_states()[0].clone();
        state = model.next_state(&state, AcqAction::ScanHit).unwrap();
        for _ in 0..model.max_confirm_polls {
            state = model.next_state(&state, AcqAction::SubmitMissing).unwrap();
        }
        assert_eq!(state.state, AcqState::ConfirmFailed);
        assert_eq!(state.slot_clicks, 1);
        assert_eq!(state.submit_clicks, 0, "unconfirmed booking must not submit");
    }
}
