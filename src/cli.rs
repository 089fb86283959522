//! Text rendering of a match for the command line client.
//!
//! Own board: `S` ship, `X` hit segment, `o` opponent miss, `-` proven empty.
//! Opponent board: `X` hit, `o` miss, `-` proven empty, `.` unknown.

use std::fmt::Write;

use crate::engine::{Cell, MatchSnapshot, Stage, BOARD_SIZE};
use crate::player::Player;
use crate::session::{EventStream, MatchSession, SessionError};

fn own_symbol(view: &MatchSnapshot, x: u8, y: u8) -> char {
    for ship in &view.own_ships {
        let mut cells = ship.placement().cells();
        if let Some(i) = cells.position(|c| c == (x as usize, y as usize)) {
            let alive = ship.segment_alive().get(i).copied().unwrap_or(false);
            return if alive { 'S' } else { 'X' };
        }
    }
    let cell = (x as usize, y as usize);
    if view.own_ships.is_empty() && view.fleet.iter().any(|p| p.cells().any(|c| c == cell)) {
        return 'S';
    }
    if view.own_miss(x, y) {
        'o'
    } else if view.own_verified_empty(x, y) {
        '-'
    } else {
        '.'
    }
}

fn opponent_symbol(view: &MatchSnapshot, x: u8, y: u8) -> char {
    match view.opponent_cell(x, y) {
        Cell::Ship => 'X',
        Cell::Empty => 'o',
        Cell::Unknown if view.opponent_verified_empty(x, y) => '-',
        Cell::Unknown => '.',
    }
}

/// Both boards side by side, opponent on the right, with a status line.
pub fn render(view: &MatchSnapshot) -> String {
    let mut out = String::new();
    let header: String = (0..BOARD_SIZE).map(|x| format!(" {}", x)).collect();
    let width = 2 * BOARD_SIZE as usize + 5;
    let _ = writeln!(out, "  {:<width$}{}", " Your board", " Opponent");
    let _ = writeln!(out, "  {}     {}", header, header);
    for y in 0..BOARD_SIZE {
        let own: String = (0..BOARD_SIZE)
            .map(|x| format!(" {}", own_symbol(view, x, y)))
            .collect();
        let opponent: String = (0..BOARD_SIZE)
            .map(|x| format!(" {}", opponent_symbol(view, x, y)))
            .collect();
        let _ = writeln!(out, "{:2}{}  {:2} {}", y, own, y, opponent);
    }
    let _ = write!(out, "{}", status_line(view));
    out
}

pub fn status_line(view: &MatchSnapshot) -> String {
    match (view.stage, view.won) {
        (Stage::Postgame, Some(true)) => "Game over: you won".to_string(),
        (Stage::Postgame, _) => "Game over: you lost".to_string(),
        (Stage::Placement, _) => "Placing ships".to_string(),
        (Stage::Matchmaking, _) => "Waiting for an opponent".to_string(),
        (Stage::Playing, _) if view.shot_pending => "Waiting for the shot result".to_string(),
        (Stage::Playing, _) if view.my_turn => "Your turn".to_string(),
        (Stage::Playing, _) => "Opponent's turn".to_string(),
    }
}

/// Plays one match on `session` with an automatic `player`, calling
/// `on_update` after every event. Returns the final snapshot.
///
/// If the session stops before the match ends this returns
/// [`SessionError::Stopped`]; [`MatchSession::finish`] then reports the
/// underlying cause.
pub async fn autoplay<P: Player>(
    session: &MatchSession,
    events: &mut EventStream,
    player: &mut P,
    mut on_update: impl FnMut(&MatchSnapshot),
) -> Result<MatchSnapshot, SessionError> {
    session.enter_matchmaking(player.place_fleet()).await?;
    on_update(&session.snapshot());
    loop {
        let view = session.snapshot();
        if view.game_over {
            return Ok(view);
        }
        if view.stage == Stage::Playing && view.my_turn && !view.shot_pending {
            if let Some((x, y)) = player.select_target(&view) {
                session.shoot(x, y).await?;
            }
        }
        if events.recv().await.is_none() {
            return Err(SessionError::Stopped);
        }
        on_update(&session.snapshot());
    }
}
