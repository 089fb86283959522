//! Sink inference: which cells must be empty once a ship goes down.
//!
//! The defender knows the sunk ship's exact shape and buffers it directly.
//! The attacker only knows its own recorded hits, so it rebuilds the sunk
//! ship by walking the straight run of `Ship` cells through the sinking shot.

use log::debug;

use crate::engine::common::InferenceError;
use crate::engine::config::{Grid, MAX_SHIP_SIZE};
use crate::engine::ship::ShipPlacement;

const DIRECTIONS: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Defender side: every neighbour of the sunk ship that is not part of it
/// becomes verified empty.
pub fn buffer_sunk_ship(placement: &ShipPlacement, verified_empty: &mut Grid) {
    let hull = placement.footprint();
    *verified_empty |= hull.dilate() & !hull;
}

/// Attacker side: buffers the run of recorded `ships` cells through the
/// sinking shot at `(x, y)` and returns the run.
///
/// The run extends from `(x, y)` along each axis direction while the next
/// cell is a recorded hit, and stops at the board edge or the first cell
/// that is not. Recorded hits never become verified empty.
pub fn infer_sunk_ship(
    ships: &Grid,
    x: usize,
    y: usize,
    verified_empty: &mut Grid,
) -> Result<Grid, InferenceError> {
    let mut run = Grid::new();
    run.set(x, y)?;

    for (dx, dy) in DIRECTIONS {
        let (mut cx, mut cy) = (x as isize + dx, y as isize + dy);
        while Grid::in_bounds(cx, cy) && ships.contains(cx as usize, cy as usize) {
            run.set(cx as usize, cy as usize)?;
            cx += dx;
            cy += dy;
        }
    }

    let length = run.count_ones();
    if length > MAX_SHIP_SIZE {
        return Err(InferenceError::ShipTooLong {
            x: x as u8,
            y: y as u8,
            length,
        });
    }

    *verified_empty |= run.dilate() & !*ships & !run;
    debug!("sunk ship of length {} through ({}, {})", length, x, y);
    Ok(run)
}
