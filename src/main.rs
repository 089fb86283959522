#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use clap::Parser;
#[cfg(feature = "std")]
use rand::rngs::SmallRng;
#[cfg(feature = "std")]
use rand::SeedableRng;
#[cfg(feature = "std")]
use seabattle::{
    cli::{autoplay, render},
    init_logging,
    transport::in_memory::InMemoryTransport,
    HuntPlayer, MatchSession, MatchSnapshot, Referee, Seat, SessionError, TcpTransport,
    DEFAULT_PORT,
};
#[cfg(feature = "std")]
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
#[cfg(feature = "std")]
enum Commands {
    /// Connect to an authority and play one match automatically.
    Play {
        #[arg(long, default_value_t = format!("127.0.0.1:{}", DEFAULT_PORT))]
        connect: String,
        #[arg(long, default_value = "Player")]
        name: String,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
    /// Accept two players and referee their matches.
    Host {
        #[arg(long, default_value_t = format!("0.0.0.0:{}", DEFAULT_PORT))]
        bind: String,
    },
    /// Play two automatic players against each other in memory.
    Local {
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[arg(long, help = "Print a JSON summary instead of the boards")]
        json: bool,
    },
}

#[cfg(feature = "std")]
fn make_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => {
            let mut seed_rng = rand::rng();
            SmallRng::from_rng(&mut seed_rng)
        }
    }
}

/// Prefers the error that actually ended the session over the
/// `Stopped` seen by the driver.
#[cfg(feature = "std")]
async fn settle(
    session: MatchSession,
    played: Result<MatchSnapshot, SessionError>,
) -> anyhow::Result<MatchSnapshot> {
    let finished = session.finish().await;
    match (played, finished) {
        (Ok(view), _) => Ok(view),
        (Err(SessionError::Stopped), Err(e)) => Err(e.into()),
        (Err(e), _) => Err(e.into()),
    }
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            connect,
            name,
            seed,
        } => {
            println!("Connecting to {}...", connect);
            if let Some(s) = seed {
                println!("Using fixed seed: {} (game will be reproducible)", s);
            }
            let transport = TcpTransport::connect(&connect).await?;
            let (session, mut events) = MatchSession::start(transport, &name)?;
            let mut player = HuntPlayer::new(make_rng(seed));
            let played = autoplay(&session, &mut events, &mut player, |view| {
                println!("\n{}", render(view));
            })
            .await;
            let view = settle(session, played).await?;
            println!("\n{}", render(&view));
        }
        Commands::Host { bind } => {
            let listener = TcpListener::bind(&bind).await?;
            println!("Listening on {}", bind);
            let (stream_a, addr_a) = listener.accept().await?;
            println!("First player connected from {}", addr_a);
            let (stream_b, addr_b) = listener.accept().await?;
            println!("Second player connected from {}", addr_b);
            let summary = Referee::run(
                TcpTransport::new(stream_a),
                TcpTransport::new(stream_b),
                Seat::A,
            )
            .await?;
            for (i, record) in summary.matches.iter().enumerate() {
                println!(
                    "Match {}: {:?} ({}) won in {} shots",
                    i + 1,
                    record.winner,
                    record.winner_name.as_deref().unwrap_or("unnamed"),
                    record.shots
                );
            }
        }
        Commands::Local { seed, json } => {
            let (server_a, client_a) = InMemoryTransport::pair();
            let (server_b, client_b) = InMemoryTransport::pair();
            let referee = tokio::spawn(Referee::run(server_a, server_b, Seat::A));

            let (session_a, mut events_a) = MatchSession::start(client_a, "Alpha")?;
            let (session_b, mut events_b) = MatchSession::start(client_b, "Bravo")?;
            let mut player_a = HuntPlayer::new(make_rng(seed));
            let mut player_b = HuntPlayer::new(make_rng(seed.map(|s| s.wrapping_add(1))));

            let (played_a, played_b) = tokio::join!(
                autoplay(&session_a, &mut events_a, &mut player_a, |view| {
                    if !json {
                        println!("\nAlpha\n{}", render(view));
                    }
                }),
                autoplay(&session_b, &mut events_b, &mut player_b, |_| {}),
            );
            let view_a = settle(session_a, played_a).await?;
            let view_b = settle(session_b, played_b).await?;
            let summary = referee.await??;

            if json {
                let result = serde_json::json!({
                    "seed": seed,
                    "alpha": { "won": view_a.won, "ship_cells_found": view_a.opponent.ship_cells() },
                    "bravo": { "won": view_b.won, "ship_cells_found": view_b.opponent.ship_cells() },
                    "matches": summary.matches,
                });
                println!("{}", serde_json::to_string(&result)?);
            } else {
                match view_a.won {
                    Some(true) => println!("Alpha wins"),
                    _ => println!("Bravo wins"),
                }
            }
        }
    }
    Ok(())
}
