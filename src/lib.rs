#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod engine;
pub mod player;
pub mod prelude;
pub mod protocol;

#[cfg(feature = "std")]
pub mod cli;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
pub mod referee;
#[cfg(feature = "std")]
pub mod session;
#[cfg(feature = "std")]
pub mod transport;

pub use engine::*;
pub use player::{HuntPlayer, Player};
pub use protocol::{ClientMessage, ProtocolError, ServerMessage};

#[cfg(feature = "std")]
pub use logging::init_logging;
#[cfg(feature = "std")]
pub use referee::{MatchRecord, Referee, RefereeSummary, Seat};
#[cfg(feature = "std")]
pub use session::{EventStream, MatchSession, SessionError};
#[cfg(feature = "std")]
pub use transport::tcp::TcpTransport;
