//! The match lifecycle: placement, matchmaking, play and postgame.
//!
//! [`MatchEngine`] is a synchronous state machine. Operations return the
//! [`ClientMessage`] to send, and [`MatchEngine::handle`] applies one
//! [`ServerMessage`] and reports the resulting [`MatchEvent`]. It performs no
//! I/O; [`crate::session`] drives it from a single task.

use alloc::vec::Vec;

use log::{debug, info};

use crate::engine::board::{BoardModel, OpponentBoard};
use crate::engine::common::{Cell, InferenceError, PlacementError, ShotError, ShotOutcome};
use crate::engine::config::{Grid, BOARD_SIZE, TOTAL_SHIP_CELLS};
use crate::engine::placement::validate_fleet;
use crate::engine::ship::{ShipPlacement, ShipState};
use crate::engine::turn::{TurnError, TurnStateMachine};
use crate::protocol::{ClientMessage, ServerMessage};

/// Where the player is in the match lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Stage {
    #[default]
    Placement,
    Matchmaking,
    Playing,
    Postgame,
}

/// Notification raised after a server message has been fully applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchEvent {
    OpponentFound { my_turn: bool },
    OpponentShot { x: u8, y: u8, outcome: ShotOutcome },
    MyShotReceived { x: u8, y: u8, outcome: ShotOutcome },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error(transparent)]
    Shot(#[from] ShotError),
    #[error("cannot {action} during {stage:?}")]
    InvalidStage { action: &'static str, stage: Stage },
    #[error("`{message}` is not expected during {stage:?}")]
    UnexpectedMessage { message: ServerMessage, stage: Stage },
    #[error("opponent shot contradicts own board: {0}")]
    OwnBoardDesync(ShotError),
    #[error("shot result contradicts opponent board: {0}")]
    Inference(#[from] InferenceError),
    #[error(transparent)]
    Turn(#[from] TurnError),
}

impl MatchError {
    /// Errors caused by the peer; the session cannot continue after them.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MatchError::UnexpectedMessage { .. }
                | MatchError::OwnBoardDesync(_)
                | MatchError::Inference(_)
                | MatchError::Turn(_)
        )
    }
}

/// Read-only copy of everything a front end may display.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchSnapshot {
    pub stage: Stage,
    pub my_turn: bool,
    pub shot_pending: bool,
    pub last_shot: Option<(u8, u8)>,
    pub game_over: bool,
    pub won: Option<bool>,
    pub fleet: Vec<ShipPlacement>,
    pub own_ships: Vec<ShipState>,
    pub own_misses: Grid,
    pub own_verified_empty: Grid,
    pub opponent: OpponentBoard,
}

impl MatchSnapshot {
    pub fn opponent_cell(&self, x: u8, y: u8) -> Cell {
        self.opponent.cell(x as usize, y as usize)
    }

    pub fn opponent_verified_empty(&self, x: u8, y: u8) -> bool {
        self.opponent.verified_empty().contains(x as usize, y as usize)
    }

    pub fn own_miss(&self, x: u8, y: u8) -> bool {
        self.own_misses.contains(x as usize, y as usize)
    }

    pub fn own_verified_empty(&self, x: u8, y: u8) -> bool {
        self.own_verified_empty.contains(x as usize, y as usize)
    }

    /// Whether a shot at `(x, y)` would be accepted right now.
    pub fn can_shoot(&self, x: u8, y: u8) -> bool {
        self.stage == Stage::Playing
            && self.my_turn
            && !self.shot_pending
            && x < BOARD_SIZE
            && y < BOARD_SIZE
            && self.opponent_cell(x, y) == Cell::Unknown
            && !self.opponent_verified_empty(x, y)
    }
}

/// One player's side of a match.
#[derive(Debug, Clone, Default)]
pub struct MatchEngine {
    stage: Stage,
    fleet: Vec<ShipPlacement>,
    board: Option<BoardModel>,
    turn: Option<TurnStateMachine>,
    pending: Option<(u8, u8)>,
    last_shot: Option<(u8, u8)>,
}

impl MatchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Validates and submits a fleet, moving to matchmaking.
    pub fn enter_matchmaking(
        &mut self,
        fleet: Vec<ShipPlacement>,
    ) -> Result<ClientMessage, MatchError> {
        self.require(Stage::Placement, "enter matchmaking")?;
        validate_fleet(&fleet)?;
        self.fleet = fleet.clone();
        self.stage = Stage::Matchmaking;
        info!("entering matchmaking with {} ships", fleet.len());
        Ok(ClientMessage::Enter(fleet))
    }

    /// Withdraws the submitted fleet before an opponent is found.
    pub fn leave_matchmaking(&mut self) -> Result<ClientMessage, MatchError> {
        self.require(Stage::Matchmaking, "leave matchmaking")?;
        self.fleet.clear();
        self.stage = Stage::Placement;
        info!("left matchmaking");
        Ok(ClientMessage::Leave)
    }

    /// Fires at `(x, y)` if the shot is currently allowed.
    pub fn shoot(&mut self, x: u8, y: u8) -> Result<ClientMessage, ShotError> {
        let (Some(board), Some(turn)) = (&self.board, &self.turn) else {
            return Err(ShotError::NotPlaying);
        };
        if self.stage != Stage::Playing {
            return Err(ShotError::NotPlaying);
        }
        if !turn.is_my_turn() {
            return Err(ShotError::NotYourTurn);
        }
        if self.pending.is_some() {
            return Err(ShotError::ShotPending);
        }
        if x >= BOARD_SIZE || y >= BOARD_SIZE {
            return Err(ShotError::OutOfBounds { x, y });
        }
        let (cx, cy) = (x as usize, y as usize);
        if board.opponent.cell(cx, cy) != Cell::Unknown {
            return Err(ShotError::AlreadyResolved { x, y });
        }
        if board.opponent.verified_empty().contains(cx, cy) {
            return Err(ShotError::VerifiedEmpty { x, y });
        }
        self.pending = Some((x, y));
        self.last_shot = Some((x, y));
        debug!("shooting at ({}, {})", x, y);
        Ok(ClientMessage::Shoot { x, y })
    }

    /// Discards the finished (or never started) match and returns to
    /// placement.
    pub fn new_game(&mut self) -> Result<(), MatchError> {
        if !matches!(self.stage, Stage::Placement | Stage::Postgame) {
            return Err(MatchError::InvalidStage {
                action: "start a new game",
                stage: self.stage,
            });
        }
        *self = Self::default();
        Ok(())
    }

    /// Applies one message from the authority.
    pub fn handle(&mut self, message: ServerMessage) -> Result<MatchEvent, MatchError> {
        let unexpected = MatchError::UnexpectedMessage {
            message,
            stage: self.stage,
        };
        match message {
            ServerMessage::YourTurn | ServerMessage::OpponentsTurn => {
                if self.stage != Stage::Matchmaking {
                    return Err(unexpected);
                }
                let my_turn = message == ServerMessage::YourTurn;
                self.board = Some(BoardModel::new(&self.fleet));
                self.turn = Some(TurnStateMachine::new(my_turn));
                self.stage = Stage::Playing;
                info!("opponent found, {} first", if my_turn { "we move" } else { "they move" });
                Ok(MatchEvent::OpponentFound { my_turn })
            }
            ServerMessage::YouMissed | ServerMessage::YouHit | ServerMessage::YouSank => {
                let (Stage::Playing, Some((x, y)), Some(outcome)) =
                    (self.stage, self.pending, message.shot_outcome())
                else {
                    return Err(unexpected);
                };
                let (Some(board), Some(turn)) = (self.board.as_mut(), self.turn.as_mut()) else {
                    return Err(unexpected);
                };
                board.opponent.record_shot(x, y, outcome)?;
                turn.after_my_shot(outcome)?;
                self.pending = None;
                if board.opponent.ship_cells() == TOTAL_SHIP_CELLS {
                    turn.finish(true);
                    self.stage = Stage::Postgame;
                    info!("all opponent ships sunk, match won");
                }
                Ok(MatchEvent::MyShotReceived { x, y, outcome })
            }
            ServerMessage::OpponentShot { x, y } => {
                if self.stage != Stage::Playing {
                    return Err(unexpected);
                }
                let (Some(board), Some(turn)) = (self.board.as_mut(), self.turn.as_mut()) else {
                    return Err(unexpected);
                };
                if turn.is_my_turn() {
                    return Err(unexpected);
                }
                let outcome = board
                    .own
                    .receive_shot(x, y)
                    .map_err(MatchError::OwnBoardDesync)?;
                turn.after_opponent_shot(outcome)?;
                if board.own.all_sunk() {
                    turn.finish(false);
                    self.stage = Stage::Postgame;
                    info!("own fleet destroyed, match lost");
                }
                Ok(MatchEvent::OpponentShot { x, y, outcome })
            }
        }
    }

    fn require(&self, stage: Stage, action: &'static str) -> Result<(), MatchError> {
        if self.stage == stage {
            Ok(())
        } else {
            Err(MatchError::InvalidStage {
                action,
                stage: self.stage,
            })
        }
    }

    pub fn my_turn(&self) -> bool {
        self.turn.is_some_and(|t| t.is_my_turn())
    }

    pub fn game_over(&self) -> bool {
        self.turn.is_some_and(|t| t.is_over())
    }

    pub fn won(&self) -> Option<bool> {
        self.turn.and_then(|t| t.won())
    }

    pub fn shot_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn last_shot(&self) -> Option<(u8, u8)> {
        self.last_shot
    }

    /// The fleet as submitted to matchmaking.
    pub fn fleet(&self) -> &[ShipPlacement] {
        &self.fleet
    }

    /// Own ships with their segment state; empty before an opponent is
    /// found.
    pub fn own_ships(&self) -> &[ShipState] {
        self.board.as_ref().map_or(&[], |b| b.own.ships())
    }

    pub fn board(&self) -> Option<&BoardModel> {
        self.board.as_ref()
    }

    pub fn opponent_cell(&self, x: u8, y: u8) -> Cell {
        self.board
            .as_ref()
            .map_or(Cell::Unknown, |b| b.opponent.cell(x as usize, y as usize))
    }

    pub fn opponent_verified_empty(&self, x: u8, y: u8) -> bool {
        self.board.as_ref().is_some_and(|b| {
            b.opponent
                .verified_empty()
                .contains(x as usize, y as usize)
        })
    }

    pub fn own_verified_empty(&self, x: u8, y: u8) -> bool {
        self.board
            .as_ref()
            .is_some_and(|b| b.own.verified_empty().contains(x as usize, y as usize))
    }

    pub fn own_miss(&self, x: u8, y: u8) -> bool {
        self.board
            .as_ref()
            .is_some_and(|b| b.own.misses().contains(x as usize, y as usize))
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        let (own_ships, own_misses, own_verified_empty, opponent) = match &self.board {
            Some(b) => (
                b.own.ships().to_vec(),
                b.own.misses(),
                b.own.verified_empty(),
                b.opponent,
            ),
            None => Default::default(),
        };
        MatchSnapshot {
            stage: self.stage,
            my_turn: self.my_turn(),
            shot_pending: self.shot_pending(),
            last_shot: self.last_shot,
            game_over: self.game_over(),
            won: self.won(),
            fleet: self.fleet.clone(),
            own_ships,
            own_misses,
            own_verified_empty,
            opponent,
        }
    }
}
