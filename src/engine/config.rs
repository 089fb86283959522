use super::bitboard::BitBoard;

pub const BOARD_SIZE: u8 = 10;
pub const NUM_SHIPS: usize = 10;
pub const MAX_SHIP_SIZE: usize = 4;

/// Canonical fleet, largest first.
pub const FLEET: [u8; NUM_SHIPS] = [4, 3, 3, 2, 2, 2, 1, 1, 1, 1];

/// Total number of ship segments in the canonical fleet.
pub const TOTAL_SHIP_CELLS: usize = 4 + 3 + 3 + 2 + 2 + 2 + 1 + 1 + 1 + 1;

/// Port the original relay server listens on.
pub const DEFAULT_PORT: u16 = 7070;

/// Grid type used for every per-cell overlay.
pub type Grid = BitBoard<u128, { BOARD_SIZE as usize }>;
