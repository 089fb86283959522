use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use seabattle::cli::{render, status_line};
use seabattle::{
    validate_fleet, HuntPlayer, MatchEngine, MatchEvent, MatchSnapshot, Orientation, Player,
    ServerMessage, ShipPlacement, Stage,
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

fn player(seed: u64) -> HuntPlayer<SmallRng> {
    HuntPlayer::new(SmallRng::seed_from_u64(seed))
}

/// Two paired engines; the first one moves first.
fn paired(a_fleet: Vec<ShipPlacement>, b_fleet: Vec<ShipPlacement>) -> (MatchEngine, MatchEngine) {
    let mut a = MatchEngine::new();
    let mut b = MatchEngine::new();
    a.enter_matchmaking(a_fleet).unwrap();
    b.enter_matchmaking(b_fleet).unwrap();
    a.handle(ServerMessage::YourTurn).unwrap();
    b.handle(ServerMessage::OpponentsTurn).unwrap();
    (a, b)
}

fn fire(shooter: &mut MatchEngine, defender: &mut MatchEngine, x: u8, y: u8) {
    shooter.shoot(x, y).unwrap();
    let Ok(MatchEvent::OpponentShot { outcome, .. }) =
        defender.handle(ServerMessage::OpponentShot { x, y })
    else {
        panic!("defender rejected ({}, {})", x, y);
    };
    shooter.handle(ServerMessage::from_outcome(outcome)).unwrap();
}

#[test]
fn placed_fleets_are_legal() {
    for seed in 0..20 {
        assert_eq!(validate_fleet(&player(seed).place_fleet()), Ok(()));
    }
}

#[test]
fn no_target_without_the_turn() {
    let mut p = player(1);
    assert_eq!(p.select_target(&MatchSnapshot::default()), None);

    let (_a, b) = paired(fleet(), fleet());
    assert_eq!(p.select_target(&b.snapshot()), None);
}

#[test]
fn opening_shots_follow_the_checkerboard() {
    let (a, _b) = paired(fleet(), fleet());
    let view = a.snapshot();
    for seed in 0..20 {
        let (x, y) = player(seed).select_target(&view).unwrap();
        assert_eq!((x + y) % 2, 0);
        assert!(view.can_shoot(x, y));
    }
}

#[test]
fn hunts_around_a_hit() {
    let (mut a, mut b) = paired(fleet(), fleet());
    fire(&mut a, &mut b, 0, 0);
    let view = a.snapshot();
    for seed in 0..20 {
        let target = player(seed).select_target(&view).unwrap();
        assert!(target == (1, 0) || target == (0, 1), "{:?}", target);
    }

    fire(&mut a, &mut b, 1, 0);
    let view = a.snapshot();
    for seed in 0..20 {
        assert_eq!(player(seed).select_target(&view), Some((2, 0)));
    }
}

#[test]
fn sunk_ships_are_not_hunted() {
    let (mut a, mut b) = paired(fleet(), fleet());
    fire(&mut a, &mut b, 3, 4);
    let view = a.snapshot();
    for seed in 0..20 {
        let (x, y) = player(seed).select_target(&view).unwrap();
        assert!(view.can_shoot(x, y));
        assert!(!(2..=4).contains(&x) || !(3..=5).contains(&y));
    }
}

#[test]
fn render_shows_both_boards() {
    let (mut a, mut b) = paired(fleet(), fleet());
    fire(&mut a, &mut b, 0, 0);
    fire(&mut a, &mut b, 9, 9);

    let text = render(&a.snapshot());
    assert!(text.contains("Your board"));
    assert!(text.ends_with("Opponent's turn"));
    let rows: Vec<&str> = text.lines().collect();
    // Title, header, ten rows, status.
    assert_eq!(rows.len(), 13);
    assert!(rows[2].starts_with(" 0 S S S S"));
    assert!(rows[2].trim_end().ends_with(". . . . . . . . ."));
    assert!(rows[2].contains(" 0  X"));
    assert!(rows[11].trim_end().ends_with('o'));

    let defender = render(&b.snapshot());
    assert!(defender.lines().nth(2).unwrap().starts_with(" 0 X S S S"));
    assert!(defender.ends_with("Your turn"));

    let mut idle = MatchEngine::new();
    assert_eq!(status_line(&idle.snapshot()), "Placing ships");
    idle.enter_matchmaking(fleet()).unwrap();
    let waiting = idle.snapshot();
    assert_eq!(waiting.stage, Stage::Matchmaking);
    assert_eq!(status_line(&waiting), "Waiting for an opponent");
    assert!(render(&waiting).lines().nth(2).unwrap().starts_with(" 0 S S S S"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn hunt_players_finish_a_match(seed_a in any::<u64>(), seed_b in any::<u64>()) {
        let mut pa = player(seed_a);
        let mut pb = player(seed_b);
        let (mut a, mut b) = paired(pa.place_fleet(), pb.place_fleet());

        let mut shots = 0;
        while !a.game_over() {
            let (shooter, defender, p) = if a.my_turn() {
                (&mut a, &mut b, &mut pa)
            } else {
                (&mut b, &mut a, &mut pb)
            };
            let (x, y) = p.select_target(&shooter.snapshot()).expect("a target");
            fire(shooter, defender, x, y);
            shots += 1;
            prop_assert!(shots <= 200);
        }
        prop_assert!(b.game_over());
        prop_assert_ne!(a.won(), b.won());
        prop_assert_eq!(a.stage(), Stage::Postgame);
    }
}
