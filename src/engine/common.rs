//! Common types for the match engine: shot outcomes, cell knowledge and the
//! engine's error enums.

use crate::engine::bitboard::BitBoardError;

/// Outcome of a single shot, as reported by the authority or computed
/// against one's own fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum ShotOutcome {
    /// Shot hit water.
    Miss,
    /// Shot hit a living ship segment.
    Hit,
    /// Shot hit the last living segment of a ship.
    Sink,
}

impl ShotOutcome {
    /// `Hit` and `Sink` both keep the turn with the shooter.
    pub fn is_hit(self) -> bool {
        !matches!(self, ShotOutcome::Miss)
    }
}

/// What the attacker knows about one cell of the opponent's board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Cell {
    #[default]
    Unknown,
    Ship,
    Empty,
}

/// Rejections of a submitted fleet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    /// The ship sizes are not the canonical fleet.
    #[error("fleet must be exactly the ship sizes 4, 3, 3, 2, 2, 2, 1, 1, 1, 1")]
    WrongShipSet,
    /// Ship at `index` leaves the board.
    #[error("ship {index} does not fit on the board")]
    OutOfBounds { index: usize },
    /// Ships `first` and `second` overlap or touch.
    #[error("ships {first} and {second} overlap or touch")]
    Overlapping { first: usize, second: usize },
}

/// Local rejections of a shot request. Nothing is sent when one of these is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShotError {
    #[error("no match is being played")]
    NotPlaying,
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("a shot is already awaiting its result")]
    ShotPending,
    #[error("({x}, {y}) is outside the board")]
    OutOfBounds { x: u8, y: u8 },
    #[error("({x}, {y}) has already been fired upon")]
    AlreadyResolved { x: u8, y: u8 },
    #[error("({x}, {y}) is known to be empty")]
    VerifiedEmpty { x: u8, y: u8 },
}

/// A reported result that contradicts what has already been inferred about
/// the opponent's board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InferenceError {
    #[error("result reported for ({x}, {y}), which is already known")]
    AlreadyKnown { x: u8, y: u8 },
    #[error("hit reported at ({x}, {y}), which was proven empty")]
    HitOnVerifiedEmpty { x: u8, y: u8 },
    #[error("sunk ship through ({x}, {y}) spans {length} cells")]
    ShipTooLong { x: u8, y: u8, length: usize },
    #[error(transparent)]
    BitBoard(#[from] BitBoardError),
}
