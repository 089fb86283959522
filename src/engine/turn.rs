//! Whose turn it is, and when the match is over.

use crate::engine::common::ShotOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum TurnState {
    MyTurn,
    OpponentTurn,
    GameOver { won: bool },
}

/// A shot result arrived for a side that does not hold the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{side} shot resolved while the turn state is {actual:?}")]
pub struct TurnError {
    pub side: &'static str,
    pub actual: TurnState,
}

/// Turn bookkeeping for one match. A hit keeps the turn, a miss passes it,
/// and `GameOver` is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnStateMachine {
    state: TurnState,
}

impl TurnStateMachine {
    /// Starts a match with the first move the authority assigned.
    pub fn new(my_turn: bool) -> Self {
        let state = if my_turn {
            TurnState::MyTurn
        } else {
            TurnState::OpponentTurn
        };
        Self { state }
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn is_my_turn(&self) -> bool {
        self.state == TurnState::MyTurn
    }

    pub fn is_over(&self) -> bool {
        matches!(self.state, TurnState::GameOver { .. })
    }

    /// `Some(won)` once the match is over.
    pub fn won(&self) -> Option<bool> {
        match self.state {
            TurnState::GameOver { won } => Some(won),
            _ => None,
        }
    }

    /// Applies the result of the player's own shot.
    pub fn after_my_shot(&mut self, outcome: ShotOutcome) -> Result<TurnState, TurnError> {
        self.advance(TurnState::MyTurn, TurnState::OpponentTurn, "own", outcome)
    }

    /// Applies the result of the opponent's shot.
    pub fn after_opponent_shot(&mut self, outcome: ShotOutcome) -> Result<TurnState, TurnError> {
        self.advance(TurnState::OpponentTurn, TurnState::MyTurn, "opponent", outcome)
    }

    /// Ends the match. Has no effect once the match is already over.
    pub fn finish(&mut self, won: bool) {
        if !self.is_over() {
            self.state = TurnState::GameOver { won };
        }
    }

    fn advance(
        &mut self,
        holder: TurnState,
        other: TurnState,
        side: &'static str,
        outcome: ShotOutcome,
    ) -> Result<TurnState, TurnError> {
        if self.state != holder {
            return Err(TurnError {
                side,
                actual: self.state,
            });
        }
        if !outcome.is_hit() {
            self.state = other;
        }
        Ok(self.state)
    }
}
