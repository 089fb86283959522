//! The actor that runs one player's side of a connection.
//!
//! [`MatchSession::start`] splits the transport and spawns three tasks:
//!
//! * a reader that blocks on the next frame, parses it, and forwards it;
//! * a writer that drains the outbound queue in order;
//! * the dispatcher, the only owner of the [`MatchEngine`].
//!
//! The handle's operations go through the dispatcher and return as soon as
//! the command is validated and queued. State is observed through
//! [`MatchSnapshot`]s published on a `watch` channel, and [`MatchEvent`]s are
//! pushed on an unbounded channel after the snapshot for the same mutation.

use log::{debug, error, info, warn};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::engine::{MatchEngine, MatchError, MatchEvent, MatchSnapshot, ShipPlacement};
use crate::protocol::{ClientMessage, ProtocolError, ServerMessage};
use crate::transport::{FrameReader, FrameWriter, Transport};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Match(#[from] MatchError),
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("transport error: {0}")]
    Transport(anyhow::Error),
    #[error("connection closed by peer")]
    Disconnected,
    #[error("session stopped")]
    Stopped,
}

impl SessionError {
    /// A rejected operation that left the session running.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SessionError::Match(e) if !e.is_fatal())
    }
}

/// Events raised by a running session. Ends when the session stops.
pub type EventStream = mpsc::UnboundedReceiver<MatchEvent>;

type Reply<T> = oneshot::Sender<Result<T, MatchError>>;

enum Command {
    Enter {
        fleet: Vec<ShipPlacement>,
        reply: Reply<()>,
    },
    Leave {
        reply: Reply<()>,
    },
    Shoot {
        x: u8,
        y: u8,
        reply: Reply<()>,
    },
    NewGame {
        reply: Reply<()>,
    },
    Stop,
}

enum Inbound {
    Message(ServerMessage),
    Failed(SessionError),
    Closed,
}

/// Handle to a running session.
pub struct MatchSession {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<MatchSnapshot>,
    dispatcher: JoinHandle<Result<(), SessionError>>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl MatchSession {
    /// Starts a session on `transport` and announces `name` to the
    /// authority. Must be called from within a tokio runtime.
    pub fn start<T: Transport>(
        transport: T,
        name: &str,
    ) -> Result<(Self, EventStream), SessionError> {
        let hello = ClientMessage::name(name)?;
        let (frame_reader, frame_writer) = transport.into_split();

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(MatchSnapshot::default());

        // Queued before the dispatcher exists so it is always the first frame.
        let _ = outbound_tx.send(hello.to_string());

        let reader = tokio::spawn(read_loop(frame_reader, inbound_tx.clone()));
        let writer = tokio::spawn(write_loop(frame_writer, outbound_rx, inbound_tx));
        let dispatcher = Dispatcher {
            engine: MatchEngine::new(),
            commands: command_rx,
            inbound: inbound_rx,
            outbound: outbound_tx,
            events: event_tx,
            snapshots: snapshot_tx,
        };
        let dispatcher = tokio::spawn(dispatcher.run());
        info!("session started as {}", name);

        Ok((
            Self {
                commands: command_tx,
                snapshots: snapshot_rx,
                dispatcher,
                reader,
                writer,
            },
            event_rx,
        ))
    }

    /// Submits `fleet` and enters matchmaking.
    pub async fn enter_matchmaking(&self, fleet: Vec<ShipPlacement>) -> Result<(), SessionError> {
        self.request(|reply| Command::Enter { fleet, reply }).await
    }

    pub async fn leave_matchmaking(&self) -> Result<(), SessionError> {
        self.request(|reply| Command::Leave { reply }).await
    }

    /// Fires at `(x, y)`. Returns once the shot is queued; the result arrives
    /// later as [`MatchEvent::MyShotReceived`].
    pub async fn shoot(&self, x: u8, y: u8) -> Result<(), SessionError> {
        self.request(|reply| Command::Shoot { x, y, reply }).await
    }

    pub async fn new_game(&self) -> Result<(), SessionError> {
        self.request(|reply| Command::NewGame { reply }).await
    }

    /// The most recently published state.
    pub fn snapshot(&self) -> MatchSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver that is notified after every state change.
    pub fn watch(&self) -> watch::Receiver<MatchSnapshot> {
        self.snapshots.clone()
    }

    /// Stops the session, flushes queued frames and returns the error that
    /// ended it, if any.
    pub async fn finish(self) -> Result<(), SessionError> {
        let _ = self.commands.send(Command::Stop);
        let result = match self.dispatcher.await {
            Ok(result) => result,
            Err(e) => {
                error!("dispatcher task failed: {}", e);
                Err(SessionError::Stopped)
            }
        };
        let _ = self.writer.await;
        self.reader.abort();
        result
    }

    async fn request(
        &self,
        command: impl FnOnce(Reply<()>) -> Command,
    ) -> Result<(), SessionError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .map_err(|_| SessionError::Stopped)?;
        response.await.map_err(|_| SessionError::Stopped)??;
        Ok(())
    }
}

struct Dispatcher {
    engine: MatchEngine,
    commands: mpsc::UnboundedReceiver<Command>,
    inbound: mpsc::UnboundedReceiver<Inbound>,
    outbound: mpsc::UnboundedSender<String>,
    events: mpsc::UnboundedSender<MatchEvent>,
    snapshots: watch::Sender<MatchSnapshot>,
}

impl Dispatcher {
    async fn run(mut self) -> Result<(), SessionError> {
        let result = self.dispatch().await;
        match &result {
            Ok(()) => debug!("session dispatcher stopped"),
            Err(e) => error!("session ended: {}", e),
        }
        result
    }

    async fn dispatch(&mut self) -> Result<(), SessionError> {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Stop) | None => return Ok(()),
                    Some(command) => self.apply(command),
                },
                inbound = self.inbound.recv() => match inbound {
                    Some(Inbound::Message(message)) => self.on_message(message)?,
                    Some(Inbound::Failed(e)) => return Err(e),
                    Some(Inbound::Closed) | None => return Err(SessionError::Disconnected),
                },
            }
        }
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::Enter { fleet, reply } => {
                let result = self.engine.enter_matchmaking(fleet);
                self.send_outcome(result, reply);
            }
            Command::Leave { reply } => {
                let result = self.engine.leave_matchmaking();
                self.send_outcome(result, reply);
            }
            Command::Shoot { x, y, reply } => {
                let result = self.engine.shoot(x, y).map_err(MatchError::from);
                self.send_outcome(result, reply);
            }
            Command::NewGame { reply } => {
                let result = self.engine.new_game();
                if result.is_ok() {
                    self.publish();
                }
                let _ = reply.send(result);
            }
            Command::Stop => {}
        }
    }

    fn send_outcome(&self, result: Result<ClientMessage, MatchError>, reply: Reply<()>) {
        let result = result.map(|message| {
            debug!("-> {}", message);
            let _ = self.outbound.send(message.to_string());
            self.publish();
        });
        if let Err(e) = &result {
            warn!("rejected: {}", e);
        }
        let _ = reply.send(result);
    }

    fn on_message(&mut self, message: ServerMessage) -> Result<(), SessionError> {
        debug!("<- {}", message);
        let event = self.engine.handle(message)?;
        self.publish();
        let _ = self.events.send(event);
        Ok(())
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.engine.snapshot());
    }
}

async fn read_loop<R: FrameReader>(mut reader: R, inbound: mpsc::UnboundedSender<Inbound>) {
    loop {
        let next = match reader.recv_frame().await {
            Ok(Some(frame)) => match frame.parse::<ServerMessage>() {
                Ok(message) => Inbound::Message(message),
                Err(e) => Inbound::Failed(e.into()),
            },
            Ok(None) => Inbound::Closed,
            Err(e) => Inbound::Failed(SessionError::Transport(e)),
        };
        let done = !matches!(next, Inbound::Message(_));
        if inbound.send(next).is_err() || done {
            break;
        }
    }
}

async fn write_loop<W: FrameWriter>(
    mut writer: W,
    mut outbound: mpsc::UnboundedReceiver<String>,
    inbound: mpsc::UnboundedSender<Inbound>,
) {
    while let Some(frame) = outbound.recv().await {
        if let Err(e) = writer.send_frame(&frame).await {
            let _ = inbound.send(Inbound::Failed(SessionError::Transport(e)));
            break;
        }
    }
}
