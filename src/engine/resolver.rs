//! Maps a fired coordinate onto a fully known fleet.

use crate::engine::ship::ShipState;

/// What a shot did to a known fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// No ship occupies the cell.
    Miss,
    /// A living segment was destroyed; `sunk` is set when it was the ship's
    /// last one.
    Hit {
        ship: usize,
        segment: usize,
        sunk: bool,
    },
    /// The segment at the cell was already dead. The fleet is unchanged.
    AlreadyHit { ship: usize, segment: usize },
}

/// Finds the ship segment at `(x, y)` and kills it.
///
/// Ships never share a cell, so the first match is the only one. Firing at a
/// dead segment again reports [`Resolution::AlreadyHit`] and leaves every
/// ship as it was.
pub fn resolve(fleet: &mut [ShipState], x: usize, y: usize) -> Resolution {
    for (ship, state) in fleet.iter_mut().enumerate() {
        let Some(segment) = state.placement().cells().position(|c| c == (x, y)) else {
            continue;
        };
        if state.segment_alive().get(segment) != Some(&true) {
            return Resolution::AlreadyHit { ship, segment };
        }
        state.hit(segment);
        return Resolution::Hit {
            ship,
            segment,
            sunk: state.is_dead(),
        };
    }
    Resolution::Miss
}
