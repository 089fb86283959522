//! Ship placements and per-segment life tracking.

use core::fmt;

use crate::engine::config::{Grid, MAX_SHIP_SIZE};

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn is_vertical(self) -> bool {
        self == Orientation::Vertical
    }
}

/// Where a ship lies: its anchor (top/left cell), length and orientation.
///
/// Placements are plain data; [`crate::engine::placement`] decides whether a
/// placement is legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct ShipPlacement {
    pub size: u8,
    pub x: u8,
    pub y: u8,
    pub orientation: Orientation,
}

impl ShipPlacement {
    pub const fn new(size: u8, x: u8, y: u8, orientation: Orientation) -> Self {
        Self {
            size,
            x,
            y,
            orientation,
        }
    }

    /// Width and height of the ship's bounding box.
    pub fn dimensions(&self) -> (u8, u8) {
        match self.orientation {
            Orientation::Horizontal => (self.size, 1),
            Orientation::Vertical => (1, self.size),
        }
    }

    /// Coordinate of segment `index`, counted from the anchor. May lie off
    /// the board for placements that do not fit.
    pub fn segment(&self, index: u8) -> (usize, usize) {
        let (x, y) = (self.x as usize, self.y as usize);
        match self.orientation {
            Orientation::Horizontal => (x + index as usize, y),
            Orientation::Vertical => (x, y + index as usize),
        }
    }

    /// Coordinates of every segment, anchor first.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.size).map(move |i| self.segment(i))
    }

    /// Occupancy of the segments that lie on the board.
    pub fn footprint(&self) -> Grid {
        let mut grid = Grid::new();
        for (x, y) in self.cells() {
            let _ = grid.set(x, y);
        }
        grid
    }
}

/// A placed ship and which of its segments are still alive.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ShipState {
    placement: ShipPlacement,
    alive: [bool; MAX_SHIP_SIZE],
}

impl ShipState {
    pub fn new(placement: ShipPlacement) -> Self {
        let mut alive = [false; MAX_SHIP_SIZE];
        let len = (placement.size as usize).min(MAX_SHIP_SIZE);
        alive[..len].iter_mut().for_each(|a| *a = true);
        Self { placement, alive }
    }

    pub fn placement(&self) -> &ShipPlacement {
        &self.placement
    }

    /// Life flags, one per segment.
    pub fn segment_alive(&self) -> &[bool] {
        &self.alive[..(self.placement.size as usize).min(MAX_SHIP_SIZE)]
    }

    /// Marks `segment` as hit. Hitting an already dead segment changes
    /// nothing.
    pub fn hit(&mut self, segment: usize) {
        if let Some(a) = self.alive.get_mut(segment) {
            *a = false;
        }
    }

    pub fn is_dead(&self) -> bool {
        self.segment_alive().iter().all(|alive| !alive)
    }
}

impl fmt::Debug for ShipState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.placement;
        write!(
            f,
            "Ship {{ size: {}, origin: ({}, {}), orientation: {:?}, alive: {:?} }}",
            p.size,
            p.x,
            p.y,
            p.orientation,
            self.segment_alive(),
        )
    }
}
