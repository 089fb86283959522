//! Payload encodings shared by the client and server commands.
//!
//! Coordinates travel as `x'y`, ships as `x'y'size'IsVertical` with
//! `IsVertical` spelled `True` or `False`, and a fleet is its ships joined by
//! `|`.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::{self, Write};

use crate::engine::config::BOARD_SIZE;
use crate::engine::ship::{Orientation, ShipPlacement};
use crate::protocol::ProtocolError;

pub const FIELD_SEPARATOR: char = '\'';
pub const SHIP_SEPARATOR: char = '|';

/// Parses an on-board `x'y` pair.
pub fn parse_coords(payload: &str) -> Result<(u8, u8), ProtocolError> {
    let malformed = || ProtocolError::MalformedCoordinates(payload.to_string());
    let (x, y) = payload.split_once(FIELD_SEPARATOR).ok_or_else(malformed)?;
    let x: u8 = x.parse().map_err(|_| malformed())?;
    let y: u8 = y.parse().map_err(|_| malformed())?;
    if x >= BOARD_SIZE || y >= BOARD_SIZE {
        return Err(malformed());
    }
    Ok((x, y))
}

pub fn write_coords(f: &mut impl Write, x: u8, y: u8) -> fmt::Result {
    write!(f, "{}{}{}", x, FIELD_SEPARATOR, y)
}

/// Parses one `x'y'size'IsVertical` ship. Legality of the placement is left
/// to [`crate::engine::placement::validate_fleet`].
pub fn parse_ship(text: &str) -> Result<ShipPlacement, ProtocolError> {
    let malformed = || ProtocolError::MalformedShip(text.to_string());
    let mut fields = text.split(FIELD_SEPARATOR);
    let mut number = || -> Result<u8, ProtocolError> {
        fields
            .next()
            .and_then(|f| f.parse().ok())
            .ok_or_else(malformed)
    };
    let (x, y, size) = (number()?, number()?, number()?);
    let vertical = fields.next().ok_or_else(malformed)?;
    if fields.next().is_some() {
        return Err(malformed());
    }
    let orientation = if vertical.eq_ignore_ascii_case("true") {
        Orientation::Vertical
    } else if vertical.eq_ignore_ascii_case("false") {
        Orientation::Horizontal
    } else {
        return Err(malformed());
    };
    Ok(ShipPlacement::new(size, x, y, orientation))
}

pub fn write_ship(f: &mut impl Write, ship: &ShipPlacement) -> fmt::Result {
    let vertical = if ship.orientation.is_vertical() {
        "True"
    } else {
        "False"
    };
    let sep = FIELD_SEPARATOR;
    write!(f, "{}{sep}{}{sep}{}{sep}{}", ship.x, ship.y, ship.size, vertical)
}

pub fn parse_fleet(payload: &str) -> Result<Vec<ShipPlacement>, ProtocolError> {
    payload.split(SHIP_SEPARATOR).map(parse_ship).collect()
}

pub fn write_fleet(f: &mut impl Write, fleet: &[ShipPlacement]) -> fmt::Result {
    for (i, ship) in fleet.iter().enumerate() {
        if i > 0 {
            f.write_char(SHIP_SEPARATOR)?;
        }
        write_ship(f, ship)?;
    }
    Ok(())
}

/// Encodes a fleet as an `enter` payload.
pub fn encode_fleet(fleet: &[ShipPlacement]) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_fleet(&mut out, fleet);
    out
}
