//! A two-seat authority.
//!
//! Holds both fleets, resolves every shot and tells each side what happened.
//! There is no queue or pairing: exactly two connections are refereed, and
//! after a fleet is destroyed both seats may enter again for another match.

use log::{debug, info, warn};
use tokio::sync::mpsc;

use crate::engine::{resolve, validate_fleet, Grid, Resolution, ShipState, ShotOutcome};
use crate::protocol::{ClientMessage, ServerMessage};
use crate::transport::{FrameReader, FrameWriter, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Seat {
    A,
    B,
}

impl Seat {
    pub fn other(self) -> Seat {
        match self {
            Seat::A => Seat::B,
            Seat::B => Seat::A,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// How one refereed match ended.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MatchRecord {
    pub winner: Seat,
    pub winner_name: Option<String>,
    pub shots: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct RefereeSummary {
    pub matches: Vec<MatchRecord>,
}

#[derive(Default)]
struct SeatState {
    name: Option<String>,
    fleet: Option<Vec<ShipState>>,
    fired_at: Grid,
}

struct Play {
    turn: Seat,
    shots: u32,
}

type Incoming = (Seat, anyhow::Result<Option<String>>);

pub struct Referee<W> {
    writers: [W; 2],
    seats: [SeatState; 2],
    play: Option<Play>,
    first: Seat,
    summary: RefereeSummary,
}

impl<W: FrameWriter> Referee<W> {
    /// Referees `seat_a` and `seat_b` until one of them disconnects.
    /// `first` moves first in every match.
    ///
    /// Returns an error for malformed or out-of-order commands and for a
    /// disconnect in the middle of a match.
    pub async fn run<T>(seat_a: T, seat_b: T, first: Seat) -> anyhow::Result<RefereeSummary>
    where
        T: Transport<Writer = W>,
    {
        let (reader_a, writer_a) = seat_a.into_split();
        let (reader_b, writer_b) = seat_b.into_split();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let readers = [
            tokio::spawn(forward(Seat::A, reader_a, tx.clone())),
            tokio::spawn(forward(Seat::B, reader_b, tx)),
        ];

        let mut referee = Referee {
            writers: [writer_a, writer_b],
            seats: Default::default(),
            play: None,
            first,
            summary: RefereeSummary::default(),
        };
        let result = referee.serve(&mut rx).await;
        for reader in readers {
            reader.abort();
        }
        result.map(|()| referee.summary)
    }

    async fn serve(
        &mut self,
        rx: &mut mpsc::UnboundedReceiver<Incoming>,
    ) -> anyhow::Result<()> {
        while let Some((seat, frame)) = rx.recv().await {
            let Some(frame) = frame? else {
                if self.play.is_some() {
                    return Err(anyhow::anyhow!("{:?} disconnected mid-match", seat));
                }
                info!("{:?} disconnected", seat);
                return Ok(());
            };
            debug!("{:?} -> {}", seat, frame);
            let message: ClientMessage = frame
                .parse()
                .map_err(|e| anyhow::anyhow!("{:?} sent `{}`: {}", seat, frame, e))?;
            self.handle(seat, message).await?;
        }
        Ok(())
    }

    async fn handle(&mut self, seat: Seat, message: ClientMessage) -> anyhow::Result<()> {
        match message {
            ClientMessage::Name(name) => {
                info!("{:?} is {}", seat, name);
                self.seats[seat.index()].name = Some(name);
            }
            ClientMessage::Enter(fleet) => {
                if self.play.is_some() || self.seats[seat.index()].fleet.is_some() {
                    return Err(anyhow::anyhow!("{:?} entered twice", seat));
                }
                validate_fleet(&fleet).map_err(|e| anyhow::anyhow!("{:?}: {}", seat, e))?;
                self.seats[seat.index()].fleet =
                    Some(fleet.into_iter().map(ShipState::new).collect());
                info!("{:?} entered matchmaking", seat);
                if self.seats.iter().all(|s| s.fleet.is_some()) {
                    self.begin().await?;
                }
            }
            ClientMessage::Leave => {
                if self.play.is_some() || self.seats[seat.index()].fleet.take().is_none() {
                    return Err(anyhow::anyhow!("{:?} left without waiting", seat));
                }
                info!("{:?} left matchmaking", seat);
            }
            ClientMessage::Shoot { x, y } => self.shoot(seat, x, y).await?,
        }
        Ok(())
    }

    async fn begin(&mut self) -> anyhow::Result<()> {
        let first = self.first;
        for seat in &mut self.seats {
            seat.fired_at = Grid::new();
        }
        self.play = Some(Play {
            turn: first,
            shots: 0,
        });
        info!("match started, {:?} moves first", first);
        self.send(first, ServerMessage::YourTurn).await?;
        self.send(first.other(), ServerMessage::OpponentsTurn).await
    }

    async fn shoot(&mut self, seat: Seat, x: u8, y: u8) -> anyhow::Result<()> {
        let Some(play) = self.play.as_mut() else {
            return Err(anyhow::anyhow!("{:?} shot outside a match", seat));
        };
        if play.turn != seat {
            return Err(anyhow::anyhow!("{:?} shot out of turn", seat));
        }
        play.shots += 1;

        let (cx, cy) = (x as usize, y as usize);
        let shooter = &mut self.seats[seat.index()];
        if shooter.fired_at.contains(cx, cy) {
            return Err(anyhow::anyhow!("{:?} fired at ({}, {}) twice", seat, x, y));
        }
        shooter.fired_at.set(cx, cy)?;

        let defender = &mut self.seats[seat.other().index()];
        let fleet = defender
            .fleet
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("{:?} has no fleet", seat.other()))?;
        let outcome = match resolve(fleet, cx, cy) {
            Resolution::Miss => ShotOutcome::Miss,
            Resolution::Hit { sunk: false, .. } => ShotOutcome::Hit,
            Resolution::Hit { sunk: true, .. } => ShotOutcome::Sink,
            Resolution::AlreadyHit { .. } => {
                return Err(anyhow::anyhow!("{:?} hit a dead segment", seat))
            }
        };
        let destroyed = fleet.iter().all(ShipState::is_dead);
        if outcome == ShotOutcome::Miss {
            play.turn = seat.other();
        }
        let shots = play.shots;

        self.send(seat, ServerMessage::from_outcome(outcome)).await?;
        self.send(seat.other(), ServerMessage::OpponentShot { x, y })
            .await?;

        if destroyed {
            let winner_name = self.seats[seat.index()].name.clone();
            info!("{:?} won after {} shots", seat, shots);
            self.summary.matches.push(MatchRecord {
                winner: seat,
                winner_name,
                shots,
            });
            self.play = None;
            for state in &mut self.seats {
                state.fleet = None;
            }
        }
        Ok(())
    }

    async fn send(&mut self, seat: Seat, message: ServerMessage) -> anyhow::Result<()> {
        debug!("{:?} <- {}", seat, message);
        self.writers[seat.index()]
            .send_frame(&message.to_string())
            .await
    }
}

async fn forward<R: FrameReader>(seat: Seat, mut reader: R, tx: mpsc::UnboundedSender<Incoming>) {
    loop {
        let frame = reader.recv_frame().await;
        let done = !matches!(frame, Ok(Some(_)));
        if let Err(e) = &frame {
            warn!("{:?} read failed: {}", seat, e);
        }
        if tx.send((seat, frame)).is_err() || done {
            break;
        }
    }
}
