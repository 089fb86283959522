//! Commonly used types and utilities for ease of import.

pub use crate::{
    generate_random_fleet, validate_fleet, Cell, HuntPlayer, MatchEngine, MatchEvent,
    MatchSnapshot, Player, ShipPlacement, ShotOutcome, Stage,
};

#[cfg(feature = "std")]
pub use crate::{MatchSession, Referee, Seat, SessionError};

#[cfg(feature = "std")]
pub use crate::transport::{in_memory::InMemoryTransport, tcp::TcpTransport, Transport};
