//! The match engine. Pure state and algorithms, no I/O.

pub mod bitboard;
pub mod board;
pub mod common;
pub mod config;
pub mod game;
pub mod inference;
pub mod placement;
pub mod resolver;
pub mod ship;
pub mod turn;

pub use bitboard::{BitBoard, BitBoardError};
pub use board::{BoardModel, OpponentBoard, OwnBoard};
pub use common::{Cell, InferenceError, PlacementError, ShotError, ShotOutcome};
pub use config::*;
pub use game::{MatchEngine, MatchError, MatchEvent, MatchSnapshot, Stage};
pub use placement::{generate_random_fleet, overlaps, validate_fleet, within_board};
pub use resolver::{resolve, Resolution};
pub use ship::{Orientation, ShipPlacement, ShipState};
pub use turn::{TurnError, TurnState, TurnStateMachine};
