//! Per-side board state.
//!
//! [`OwnBoard`] is the defender's view: the exact fleet, where the opponent
//! missed, and which cells were proven empty around sunk ships.
//! [`OpponentBoard`] is the attacker's view, built only from reported shot
//! outcomes. Both only ever learn; nothing is forgotten until a new match.

use alloc::vec::Vec;
use core::fmt;

use crate::engine::common::{Cell, InferenceError, ShotError, ShotOutcome};
use crate::engine::config::{Grid, BOARD_SIZE};
use crate::engine::inference::{buffer_sunk_ship, infer_sunk_ship};
use crate::engine::resolver::{resolve, Resolution};
use crate::engine::ship::{ShipPlacement, ShipState};

fn check_coords(x: u8, y: u8) -> Result<(usize, usize), ShotError> {
    if x >= BOARD_SIZE || y >= BOARD_SIZE {
        Err(ShotError::OutOfBounds { x, y })
    } else {
        Ok((x as usize, y as usize))
    }
}

/// The player's own board.
#[derive(Clone, PartialEq, Eq)]
pub struct OwnBoard {
    fleet: Vec<ShipState>,
    misses: Grid,
    verified_empty: Grid,
}

impl OwnBoard {
    pub fn new(placements: &[ShipPlacement]) -> Self {
        Self {
            fleet: placements.iter().copied().map(ShipState::new).collect(),
            misses: Grid::new(),
            verified_empty: Grid::new(),
        }
    }

    pub fn ships(&self) -> &[ShipState] {
        &self.fleet
    }

    /// Cells where the opponent fired and missed.
    pub fn misses(&self) -> Grid {
        self.misses
    }

    /// Cells proven empty around the player's sunk ships.
    pub fn verified_empty(&self) -> Grid {
        self.verified_empty
    }

    /// Returns `true` once every ship is dead.
    pub fn all_sunk(&self) -> bool {
        self.fleet.iter().all(ShipState::is_dead)
    }

    /// Applies an opponent shot. Re-firing at a cell that was already hit or
    /// missed is rejected and changes nothing.
    pub fn receive_shot(&mut self, x: u8, y: u8) -> Result<ShotOutcome, ShotError> {
        let (cx, cy) = check_coords(x, y)?;
        if self.misses.contains(cx, cy) {
            return Err(ShotError::AlreadyResolved { x, y });
        }
        match resolve(&mut self.fleet, cx, cy) {
            Resolution::Miss => {
                self.misses
                    .set(cx, cy)
                    .map_err(|_| ShotError::OutOfBounds { x, y })?;
                Ok(ShotOutcome::Miss)
            }
            Resolution::AlreadyHit { .. } => Err(ShotError::AlreadyResolved { x, y }),
            Resolution::Hit { sunk: false, .. } => Ok(ShotOutcome::Hit),
            Resolution::Hit { ship, sunk: true, .. } => {
                let placement = *self.fleet[ship].placement();
                buffer_sunk_ship(&placement, &mut self.verified_empty);
                Ok(ShotOutcome::Sink)
            }
        }
    }
}

/// What the player has learned about the opponent's board.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct OpponentBoard {
    ships: Grid,
    empty: Grid,
    verified_empty: Grid,
}

impl OpponentBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cell(&self, x: usize, y: usize) -> Cell {
        if self.ships.contains(x, y) {
            Cell::Ship
        } else if self.empty.contains(x, y) {
            Cell::Empty
        } else {
            Cell::Unknown
        }
    }

    /// Cells reported as hit.
    pub fn ships(&self) -> Grid {
        self.ships
    }

    /// Cells reported as missed.
    pub fn empty(&self) -> Grid {
        self.empty
    }

    /// Cells proven empty by sink inference.
    pub fn verified_empty(&self) -> Grid {
        self.verified_empty
    }

    /// Number of opponent ship cells revealed so far.
    pub fn ship_cells(&self) -> usize {
        self.ships.count_ones()
    }

    /// Records the authority's verdict on our shot at `(x, y)`.
    pub fn record_shot(&mut self, x: u8, y: u8, outcome: ShotOutcome) -> Result<(), InferenceError> {
        let (cx, cy) = (x as usize, y as usize);
        if self.cell(cx, cy) != Cell::Unknown {
            return Err(InferenceError::AlreadyKnown { x, y });
        }
        match outcome {
            ShotOutcome::Miss => self.empty.set(cx, cy)?,
            ShotOutcome::Hit | ShotOutcome::Sink => {
                if self.verified_empty.contains(cx, cy) {
                    return Err(InferenceError::HitOnVerifiedEmpty { x, y });
                }
                self.ships.set(cx, cy)?;
                if outcome == ShotOutcome::Sink {
                    infer_sunk_ship(&self.ships, cx, cy, &mut self.verified_empty)?;
                }
            }
        }
        Ok(())
    }
}

/// Both sides of one match.
#[derive(Clone, PartialEq, Eq)]
pub struct BoardModel {
    pub own: OwnBoard,
    pub opponent: OpponentBoard,
}

impl BoardModel {
    pub fn new(placements: &[ShipPlacement]) -> Self {
        Self {
            own: OwnBoard::new(placements),
            opponent: OpponentBoard::new(),
        }
    }
}

impl fmt::Debug for OwnBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "OwnBoard {{\n  misses: {:?},\n  verified_empty: {:?},\n  ships: {:?}\n}}",
            self.misses, self.verified_empty, self.fleet
        )
    }
}

impl fmt::Debug for OpponentBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "OpponentBoard {{\n  ships: {:?},\n  empty: {:?},\n  verified_empty: {:?}\n}}",
            self.ships, self.empty, self.verified_empty
        )
    }
}

impl fmt::Debug for BoardModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}{:?}", self.own, self.opponent)
    }
}
