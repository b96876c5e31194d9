use crate::error::{AppError, Result};
use crate::models::SettleState;

/// State machine governing money-moving records.
///
/// `Pending` is the only non-terminal state; a record transitions exactly
/// once. The caller is responsible for re-reading the record under lock
/// before consulting this table, and for performing the compensating ledger
/// credit (for `Cancelled`/`Rejected`) in the same transaction as the status
/// update.
#[derive(Debug, Clone)]
pub struct MovementStateMachine;

impl MovementStateMachine {
    /// Returns valid next states from the current state.
    pub fn valid_transitions(current: SettleState) -> Vec<SettleState> {
        match current {
            SettleState::Pending => vec![
                SettleState::Approved,
                SettleState::Rejected,
                SettleState::Cancelled,
            ],
            // Terminal states
            SettleState::Approved | SettleState::Rejected | SettleState::Cancelled => vec![],
        }
    }

    /// Checks if a transition is valid.
    pub fn can_transition(from: SettleState, to: SettleState) -> bool {
        Self::valid_transitions(from).contains(&to)
    }

    /// Attempts to transition to a new state, failing with `AlreadyProcessed`
    /// when the record has already left `Pending`.
    pub fn transition(from: SettleState, to: SettleState) -> Result<SettleState> {
        if Self::can_transition(from, to) {
            Ok(to)
        } else {
            Err(AppError::AlreadyProcessed(format!(
                "invalid state transition from {:?} to {:?}",
                from, to
            )))
        }
    }
}
