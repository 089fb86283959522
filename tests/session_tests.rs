use std::time::Duration;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use seabattle::cli::autoplay;
use seabattle::transport::in_memory::{InMemoryReader, InMemoryTransport, InMemoryWriter};
use seabattle::transport::{FrameReader, FrameWriter, Transport};
use seabattle::{
    Cell, ClientMessage, HuntPlayer, MatchError, MatchEvent, MatchSession, Orientation,
    ProtocolError, Referee, Seat, SessionError, ShipPlacement, ShotError, ShotOutcome, Stage,
};

fn h(size: u8, x: u8, y: u8) -> ShipPlacement {
    ShipPlacement::new(size, x, y, Orientation::Horizontal)
}

fn fleet() -> Vec<ShipPlacement> {
    vec![
        h(4, 0, 0),
        h(3, 5, 0),
        h(3, 0, 2),
        h(2, 4, 2),
        h(2, 7, 2),
        h(2, 0, 4),
        h(1, 3, 4),
        h(1, 5, 4),
        h(1, 7, 4),
        h(1, 9, 4),
    ]
}

/// A session plus the authority's end of its connection.
fn connect(name: &str) -> (MatchSession, seabattle::EventStream, InMemoryReader, InMemoryWriter) {
    let (authority, client) = InMemoryTransport::pair();
    let (session, events) = MatchSession::start(client, name).unwrap();
    let (reader, writer) = authority.into_split();
    (session, events, reader, writer)
}

async fn next_frame(reader: &mut InMemoryReader) -> String {
    reader
        .recv_frame()
        .await
        .unwrap()
        .expect("session closed its connection")
}

#[tokio::test(flavor = "multi_thread")]
async fn test_scripted_match_start() -> anyhow::Result<()> {
    let (session, mut events, mut reader, mut writer) = connect("Tester");
    assert_eq!(next_frame(&mut reader).await, "name:Tester");

    session.enter_matchmaking(fleet()).await?;
    assert_eq!(
        next_frame(&mut reader).await,
        ClientMessage::Enter(fleet()).to_string()
    );
    assert_eq!(session.snapshot().stage, Stage::Matchmaking);

    writer.send_frame("yourTurn").await?;
    assert_eq!(
        events.recv().await,
        Some(MatchEvent::OpponentFound { my_turn: true })
    );
    let view = session.snapshot();
    assert_eq!(view.stage, Stage::Playing);
    assert!(view.my_turn);
    assert_eq!(view.own_ships.len(), 10);

    session.shoot(9, 9).await?;
    assert_eq!(next_frame(&mut reader).await, "shoot:9'9");
    assert!(session.snapshot().shot_pending);

    let err = session.shoot(8, 8).await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Match(MatchError::Shot(ShotError::ShotPending))
    ));
    assert!(err.is_recoverable());

    writer.send_frame("youHit").await?;
    assert_eq!(
        events.recv().await,
        Some(MatchEvent::MyShotReceived {
            x: 9,
            y: 9,
            outcome: ShotOutcome::Hit
        })
    );
    let view = session.snapshot();
    assert_eq!(view.opponent_cell(9, 9), Cell::Ship);
    assert!(view.my_turn);
    assert!(!view.shot_pending);

    writer.send_frame("opponentShot:0'0").await?;
    // An opponent shot during our own turn cannot happen.
    assert_eq!(events.recv().await, None);
    assert!(matches!(
        session.finish().await,
        Err(SessionError::Match(MatchError::UnexpectedMessage { .. }))
    ));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_opponent_shots_are_applied() -> anyhow::Result<()> {
    let (session, mut events, mut reader, mut writer) = connect("Tester");
    next_frame(&mut reader).await;
    session.enter_matchmaking(fleet()).await?;
    next_frame(&mut reader).await;

    writer.send_frame("opponentsTurn").await?;
    assert_eq!(
        events.recv().await,
        Some(MatchEvent::OpponentFound { my_turn: false })
    );
    let err = session.shoot(0, 0).await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Match(MatchError::Shot(ShotError::NotYourTurn))
    ));

    writer.send_frame("opponentShot:3'4").await?;
    assert_eq!(
        events.recv().await,
        Some(MatchEvent::OpponentShot {
            x: 3,
            y: 4,
            outcome: ShotOutcome::Sink
        })
    );
    writer.send_frame("opponentShot:9'9").await?;
    assert_eq!(
        events.recv().await,
        Some(MatchEvent::OpponentShot {
            x: 9,
            y: 9,
            outcome: ShotOutcome::Miss
        })
    );
    let view = session.snapshot();
    assert!(view.my_turn);
    assert!(view.own_miss(9, 9));
    assert!(view.own_verified_empty(4, 5));
    assert!(view.own_ships[6].is_dead());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_watch_sees_published_state() -> anyhow::Result<()> {
    let (session, _events, mut reader, _writer) = connect("Tester");
    let mut watch = session.watch();
    next_frame(&mut reader).await;

    session.enter_matchmaking(fleet()).await?;
    watch.changed().await?;
    assert_eq!(watch.borrow().stage, Stage::Matchmaking);

    session.leave_matchmaking().await?;
    assert_eq!(next_frame(&mut reader).await, ClientMessage::Enter(fleet()).to_string());
    assert_eq!(next_frame(&mut reader).await, "leave");
    assert_eq!(session.snapshot().stage, Stage::Placement);

    let err = session.leave_matchmaking().await.unwrap_err();
    assert!(err.is_recoverable());
    session.new_game().await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_malformed_frame_ends_session() {
    let (session, mut events, _reader, mut writer) = connect("Tester");
    writer.send_frame("bogus:1").await.unwrap();
    assert_eq!(events.recv().await, None);

    match session.finish().await {
        Err(SessionError::Protocol(ProtocolError::UnknownCommand(command))) => {
            assert_eq!(command, "bogus")
        }
        other => panic!("expected a protocol error, got {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dropped_connection_is_reported() {
    let (session, mut events, _reader, writer) = connect("Tester");
    drop(writer);
    assert_eq!(events.recv().await, None);
    assert!(matches!(
        session.finish().await,
        Err(SessionError::Disconnected)
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_finish_closes_snapshots() {
    let (session, _events, _reader, _writer) = connect("Tester");
    let handle = session.watch();
    assert!(session.finish().await.is_ok());
    assert!(handle.has_changed().is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_name_is_rejected() {
    let (_authority, client) = InMemoryTransport::pair();
    let result = MatchSession::start(client, "two\nlines");
    assert!(matches!(
        result,
        Err(SessionError::Protocol(ProtocolError::InvalidName(_)))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_refereed_match_between_sessions() -> anyhow::Result<()> {
    let (server_a, client_a) = InMemoryTransport::pair();
    let (server_b, client_b) = InMemoryTransport::pair();
    let referee = tokio::spawn(Referee::run(server_a, server_b, Seat::A));

    let (session_a, mut events_a) = MatchSession::start(client_a, "Alpha")?;
    let (session_b, mut events_b) = MatchSession::start(client_b, "Bravo")?;
    let mut player_a = HuntPlayer::new(SmallRng::seed_from_u64(7));
    let mut player_b = HuntPlayer::new(SmallRng::seed_from_u64(8));

    let (view_a, view_b) = tokio::time::timeout(Duration::from_secs(30), async {
        tokio::join!(
            autoplay(&session_a, &mut events_a, &mut player_a, |_| {}),
            autoplay(&session_b, &mut events_b, &mut player_b, |_| {}),
        )
    })
    .await?;
    let (view_a, view_b) = (view_a?, view_b?);

    assert!(view_a.game_over && view_b.game_over);
    assert_eq!(view_a.stage, Stage::Postgame);
    let a_won = view_a.won == Some(true);
    assert_eq!(view_b.won, Some(!a_won));
    let winner = if a_won { &view_a } else { &view_b };
    let loser = if a_won { &view_b } else { &view_a };
    assert_eq!(winner.opponent.ship_cells(), 20);
    assert!(loser.own_ships.iter().all(|s| s.is_dead()));

    session_a.finish().await?;
    // The referee hangs up once Alpha leaves, which may reach Bravo first.
    assert!(matches!(
        session_b.finish().await,
        Ok(()) | Err(SessionError::Disconnected)
    ));
    let summary = referee.await??;
    assert_eq!(summary.matches.len(), 1);
    let record = &summary.matches[0];
    assert_eq!(record.winner, if a_won { Seat::A } else { Seat::B });
    assert_eq!(
        record.winner_name.as_deref(),
        Some(if a_won { "Alpha" } else { "Bravo" })
    );
    assert!(record.shots >= 20);
    Ok(())
}
