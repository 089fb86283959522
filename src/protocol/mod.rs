//! Text commands exchanged with the authority.
//!
//! Every frame is either a bare keyword or `header:payload`, split on the
//! first `:`. Clients send [`ClientMessage`]s and receive
//! [`ServerMessage`]s. Both directions parse with [`str::parse`] and encode
//! with [`Display`](core::fmt::Display).

pub mod codec;
mod error;

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use crate::engine::common::ShotOutcome;
use crate::engine::ship::ShipPlacement;

pub use error::ProtocolError;

pub const NAME: &str = "name";
pub const ENTER: &str = "enter";
pub const LEAVE: &str = "leave";
pub const SHOOT: &str = "shoot";

pub const YOUR_TURN: &str = "yourTurn";
pub const OPPONENTS_TURN: &str = "opponentsTurn";
pub const YOU_MISSED: &str = "youMissed";
pub const YOU_HIT: &str = "youHit";
pub const YOU_SANK: &str = "youSank";
pub const OPPONENT_SHOT: &str = "opponentShot";

/// Commands sent by a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// Announces the player's display name.
    Name(String),
    /// Submits a fleet and asks to be paired.
    Enter(Vec<ShipPlacement>),
    /// Withdraws from matchmaking.
    Leave,
    /// Fires at the opponent's board.
    Shoot { x: u8, y: u8 },
}

impl ClientMessage {
    /// Builds a `name` command, rejecting names that cannot travel in a
    /// single frame.
    pub fn name(name: &str) -> Result<Self, ProtocolError> {
        if name.is_empty() || name.contains(['\n', '\r']) {
            return Err(ProtocolError::InvalidName(name.to_string()));
        }
        Ok(ClientMessage::Name(name.to_string()))
    }
}

/// Events pushed by the authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerMessage {
    /// Opponent found; this player moves first.
    YourTurn,
    /// Opponent found; the opponent moves first.
    OpponentsTurn,
    YouMissed,
    YouHit,
    YouSank,
    /// The opponent fired at `(x, y)` on this player's board.
    OpponentShot { x: u8, y: u8 },
}

impl ServerMessage {
    /// The reply to a player's own shot.
    pub fn from_outcome(outcome: ShotOutcome) -> Self {
        match outcome {
            ShotOutcome::Miss => ServerMessage::YouMissed,
            ShotOutcome::Hit => ServerMessage::YouHit,
            ShotOutcome::Sink => ServerMessage::YouSank,
        }
    }

    /// `Some` for the three shot replies.
    pub fn shot_outcome(&self) -> Option<ShotOutcome> {
        match self {
            ServerMessage::YouMissed => Some(ShotOutcome::Miss),
            ServerMessage::YouHit => Some(ShotOutcome::Hit),
            ServerMessage::YouSank => Some(ShotOutcome::Sink),
            _ => None,
        }
    }
}

fn split_frame(frame: &str) -> Result<(&str, Option<&str>), ProtocolError> {
    if frame.is_empty() {
        return Err(ProtocolError::Empty);
    }
    Ok(match frame.split_once(':') {
        Some((header, payload)) => (header, Some(payload)),
        None => (frame, None),
    })
}

fn bare<T>(command: &'static str, payload: Option<&str>, value: T) -> Result<T, ProtocolError> {
    match payload {
        None => Ok(value),
        Some(payload) => Err(ProtocolError::UnexpectedPayload {
            command,
            payload: payload.to_string(),
        }),
    }
}

impl FromStr for ClientMessage {
    type Err = ProtocolError;

    fn from_str(frame: &str) -> Result<Self, Self::Err> {
        let (header, payload) = split_frame(frame)?;
        match header {
            NAME => ClientMessage::name(payload.ok_or(ProtocolError::MissingPayload(NAME))?),
            ENTER => {
                let payload = payload.ok_or(ProtocolError::MissingPayload(ENTER))?;
                Ok(ClientMessage::Enter(codec::parse_fleet(payload)?))
            }
            LEAVE => bare(LEAVE, payload, ClientMessage::Leave),
            SHOOT => {
                let payload = payload.ok_or(ProtocolError::MissingPayload(SHOOT))?;
                let (x, y) = codec::parse_coords(payload)?;
                Ok(ClientMessage::Shoot { x, y })
            }
            other => Err(ProtocolError::UnknownCommand(other.to_string())),
        }
    }
}

impl fmt::Display for ClientMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientMessage::Name(name) => write!(f, "{}:{}", NAME, name),
            ClientMessage::Enter(fleet) => {
                write!(f, "{}:", ENTER)?;
                codec::write_fleet(f, fleet)
            }
            ClientMessage::Leave => f.write_str(LEAVE),
            ClientMessage::Shoot { x, y } => {
                write!(f, "{}:", SHOOT)?;
                codec::write_coords(f, *x, *y)
            }
        }
    }
}

impl FromStr for ServerMessage {
    type Err = ProtocolError;

    fn from_str(frame: &str) -> Result<Self, Self::Err> {
        let (header, payload) = split_frame(frame)?;
        match header {
            YOUR_TURN => bare(YOUR_TURN, payload, ServerMessage::YourTurn),
            OPPONENTS_TURN => bare(OPPONENTS_TURN, payload, ServerMessage::OpponentsTurn),
            YOU_MISSED => bare(YOU_MISSED, payload, ServerMessage::YouMissed),
            YOU_HIT => bare(YOU_HIT, payload, ServerMessage::YouHit),
            YOU_SANK => bare(YOU_SANK, payload, ServerMessage::YouSank),
            OPPONENT_SHOT => {
                let payload = payload.ok_or(ProtocolError::MissingPayload(OPPONENT_SHOT))?;
                let (x, y) = codec::parse_coords(payload)?;
                Ok(ServerMessage::OpponentShot { x, y })
            }
            other => Err(ProtocolError::UnknownCommand(other.to_string())),
        }
    }
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerMessage::YourTurn => f.write_str(YOUR_TURN),
            ServerMessage::OpponentsTurn => f.write_str(OPPONENTS_TURN),
            ServerMessage::YouMissed => f.write_str(YOU_MISSED),
            ServerMessage::YouHit => f.write_str(YOU_HIT),
            ServerMessage::YouSank => f.write_str(YOU_SANK),
            ServerMessage::OpponentShot { x, y } => {
                write!(f, "{}:", OPPONENT_SHOT)?;
                codec::write_coords(f, *x, *y)
            }
        }
    }
}
