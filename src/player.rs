use alloc::vec::Vec;

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::engine::{generate_random_fleet, Cell, MatchSnapshot, ShipPlacement, BOARD_SIZE};

/// Interface implemented by automatic players.
pub trait Player {
    /// Choose a fleet to submit.
    fn place_fleet(&mut self) -> Vec<ShipPlacement>;

    /// Choose the next target, or `None` when the snapshot allows no shot.
    fn select_target(&mut self, view: &MatchSnapshot) -> Option<(u8, u8)>;
}

/// Random search until something is hit, then finish that ship before
/// searching again.
pub struct HuntPlayer<R> {
    rng: R,
}

impl<R: Rng> HuntPlayer<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

const DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

fn step(x: u8, y: u8, (dx, dy): (i8, i8)) -> Option<(u8, u8)> {
    let nx = x.checked_add_signed(dx)?;
    let ny = y.checked_add_signed(dy)?;
    (nx < BOARD_SIZE && ny < BOARD_SIZE).then_some((nx, ny))
}

/// Shootable cells next to hits that are not yet known to be sunk. Cells
/// that extend a line of two or more hits come first.
fn hunt_targets(view: &MatchSnapshot) -> Vec<(u8, u8)> {
    let mut along_line = Vec::new();
    let mut adjacent = Vec::new();
    for (x, y) in view.opponent.ships().iter_set_bits() {
        let (x, y) = (x as u8, y as u8);
        for dir in DIRECTIONS {
            let Some((tx, ty)) = step(x, y, dir) else {
                continue;
            };
            if !view.can_shoot(tx, ty) {
                continue;
            }
            let behind = step(x, y, (-dir.0, -dir.1));
            if behind.is_some_and(|(bx, by)| view.opponent_cell(bx, by) == Cell::Ship) {
                along_line.push((tx, ty));
            } else {
                adjacent.push((tx, ty));
            }
        }
    }
    if along_line.is_empty() {
        adjacent
    } else {
        along_line
    }
}

/// Every shootable cell, restricted to one colour of the checkerboard while
/// that colour still has candidates.
fn search_targets(view: &MatchSnapshot) -> Vec<(u8, u8)> {
    let open: Vec<(u8, u8)> = (0..BOARD_SIZE)
        .flat_map(|y| (0..BOARD_SIZE).map(move |x| (x, y)))
        .filter(|&(x, y)| view.can_shoot(x, y))
        .collect();
    let parity: Vec<(u8, u8)> = open
        .iter()
        .copied()
        .filter(|&(x, y)| (x + y) % 2 == 0)
        .collect();
    if parity.is_empty() {
        open
    } else {
        parity
    }
}

impl<R: Rng> Player for HuntPlayer<R> {
    fn place_fleet(&mut self) -> Vec<ShipPlacement> {
        generate_random_fleet(&mut self.rng)
    }

    fn select_target(&mut self, view: &MatchSnapshot) -> Option<(u8, u8)> {
        let hunt = hunt_targets(view);
        let candidates = if hunt.is_empty() {
            search_targets(view)
        } else {
            hunt
        };
        candidates.choose(&mut self.rng).copied()
    }
}
