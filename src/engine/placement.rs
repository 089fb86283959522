//! Fleet legality: bounds, the no-touching rule, random fleets and whole
//! fleet validation.

use alloc::vec::Vec;
use rand::Rng;

use crate::engine::common::PlacementError;
use crate::engine::config::{Grid, BOARD_SIZE, FLEET, MAX_SHIP_SIZE, NUM_SHIPS};
use crate::engine::ship::{Orientation, ShipPlacement};

/// Returns `true` when every cell of `placement` is on the board.
pub fn within_board(placement: &ShipPlacement) -> bool {
    let (w, h) = placement.dimensions();
    let board = BOARD_SIZE as u16;
    let (x, y) = (placement.x as u16, placement.y as u16);
    x < board && y < board && x + w as u16 <= board && y + h as u16 <= board
}

/// Returns `true` when `candidate` shares a cell with, or touches (including
/// diagonally), any ship in `existing`.
pub fn overlaps(existing: &[ShipPlacement], candidate: &ShipPlacement) -> bool {
    let occupied = existing
        .iter()
        .fold(Grid::new(), |acc, ship| acc | ship.footprint());
    occupied.dilate().intersects(&candidate.footprint())
}

/// Places the canonical fleet at random, largest ship first.
///
/// Each ship samples an orientation and an anchor whose bounding box fits,
/// and resamples until it keeps clear of the ships placed before it.
pub fn generate_random_fleet<R: Rng>(rng: &mut R) -> Vec<ShipPlacement> {
    let mut sizes = FLEET;
    sizes.sort_unstable_by(|a, b| b.cmp(a));

    let mut fleet: Vec<ShipPlacement> = Vec::with_capacity(NUM_SHIPS);
    for size in sizes {
        let ship = loop {
            let orientation = if rng.random() {
                Orientation::Vertical
            } else {
                Orientation::Horizontal
            };
            let span = BOARD_SIZE - (size - 1);
            let (x, y) = match orientation {
                Orientation::Vertical => (rng.random_range(0..BOARD_SIZE), rng.random_range(0..span)),
                Orientation::Horizontal => (rng.random_range(0..span), rng.random_range(0..BOARD_SIZE)),
            };
            let candidate = ShipPlacement::new(size, x, y, orientation);
            if !overlaps(&fleet, &candidate) {
                break candidate;
            }
        };
        fleet.push(ship);
    }
    fleet
}

/// Checks a complete fleet: ship set first, then bounds, then spacing.
pub fn validate_fleet(fleet: &[ShipPlacement]) -> Result<(), PlacementError> {
    if !is_canonical_set(fleet) {
        return Err(PlacementError::WrongShipSet);
    }
    if let Some(index) = fleet.iter().position(|ship| !within_board(ship)) {
        return Err(PlacementError::OutOfBounds { index });
    }
    for (first, a) in fleet.iter().enumerate() {
        for (offset, b) in fleet[first + 1..].iter().enumerate() {
            if overlaps(core::slice::from_ref(a), b) {
                return Err(PlacementError::Overlapping {
                    first,
                    second: first + 1 + offset,
                });
            }
        }
    }
    Ok(())
}

fn is_canonical_set(fleet: &[ShipPlacement]) -> bool {
    let mut want = [0usize; MAX_SHIP_SIZE + 1];
    FLEET.iter().for_each(|&s| want[s as usize] += 1);

    let mut have = [0usize; MAX_SHIP_SIZE + 1];
    for ship in fleet {
        match have.get_mut(ship.size as usize) {
            Some(count) if ship.size > 0 => *count += 1,
            _ => return false,
        }
    }
    have == want
}
