use proptest::prelude::*;
use seabattle::{
    resolve, OwnBoard, Orientation, Resolution, ShipPlacement, ShipState, ShotError,
    ShotOutcome, BOARD_SIZE,
};

fn fleet() -> Vec<ShipState> {
    vec![
        ShipState::new(ShipPlacement::new(3, 2, 2, Orientation::Horizontal)),
        ShipState::new(ShipPlacement::new(2, 7, 5, Orientation::Vertical)),
        ShipState::new(ShipPlacement::new(1, 0, 9, Orientation::Horizontal)),
    ]
}

#[test]
fn resolves_segments_along_the_ship() {
    let mut ships = fleet();
    assert_eq!(
        resolve(&mut ships, 3, 2),
        Resolution::Hit { ship: 0, segment: 1, sunk: false }
    );
    assert_eq!(
        resolve(&mut ships, 7, 6),
        Resolution::Hit { ship: 1, segment: 1, sunk: false }
    );
    assert_eq!(resolve(&mut ships, 5, 2), Resolution::Miss);
    assert_eq!(ships[0].segment_alive(), &[true, false, true]);
}

#[test]
fn last_segment_sinks() {
    let mut ships = fleet();
    assert!(matches!(resolve(&mut ships, 2, 2), Resolution::Hit { sunk: false, .. }));
    assert!(matches!(resolve(&mut ships, 4, 2), Resolution::Hit { sunk: false, .. }));
    assert_eq!(
        resolve(&mut ships, 3, 2),
        Resolution::Hit { ship: 0, segment: 1, sunk: true }
    );
    assert!(ships[0].is_dead());
    assert!(!ships[1].is_dead());

    assert_eq!(
        resolve(&mut ships, 0, 9),
        Resolution::Hit { ship: 2, segment: 0, sunk: true }
    );
}

#[test]
fn repeated_fire_is_reported_and_harmless() {
    let mut ships = fleet();
    resolve(&mut ships, 7, 5);
    let before = ships.clone();
    assert_eq!(
        resolve(&mut ships, 7, 5),
        Resolution::AlreadyHit { ship: 1, segment: 0 }
    );
    assert_eq!(ships, before);
}

#[test]
fn own_board_rejects_repeats() {
    let placements: Vec<_> = fleet().iter().map(|s| *s.placement()).collect();
    let mut board = OwnBoard::new(&placements);
    assert_eq!(board.receive_shot(9, 9), Ok(ShotOutcome::Miss));
    assert_eq!(
        board.receive_shot(9, 9),
        Err(ShotError::AlreadyResolved { x: 9, y: 9 })
    );
    assert_eq!(board.receive_shot(2, 2), Ok(ShotOutcome::Hit));
    assert_eq!(
        board.receive_shot(2, 2),
        Err(ShotError::AlreadyResolved { x: 2, y: 2 })
    );
    assert_eq!(
        board.receive_shot(10, 0),
        Err(ShotError::OutOfBounds { x: 10, y: 0 })
    );
    assert!(board.misses().contains(9, 9));
    assert_eq!(board.misses().count_ones(), 1);
}

#[test]
fn own_board_reports_fleet_destroyed() {
    let placements: Vec<_> = fleet().iter().map(|s| *s.placement()).collect();
    let mut board = OwnBoard::new(&placements);
    let cells: Vec<(usize, usize)> = placements.iter().flat_map(|p| p.cells()).collect();
    for (i, &(x, y)) in cells.iter().enumerate() {
        assert!(!board.all_sunk());
        let outcome = board.receive_shot(x as u8, y as u8).unwrap();
        assert!(outcome.is_hit(), "shot {} at ({}, {})", i, x, y);
    }
    assert!(board.all_sunk());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn resolve_twice_keeps_dead_state(x in 0..BOARD_SIZE as usize, y in 0..BOARD_SIZE as usize) {
        let mut ships = fleet();
        let first = resolve(&mut ships, x, y);
        let dead: Vec<bool> = ships.iter().map(ShipState::is_dead).collect();
        let second = resolve(&mut ships, x, y);
        let dead_after: Vec<bool> = ships.iter().map(ShipState::is_dead).collect();
        prop_assert_eq!(dead, dead_after);
        match first {
            Resolution::Miss => prop_assert_eq!(second, Resolution::Miss),
            Resolution::Hit { ship, segment, .. } => {
                prop_assert_eq!(second, Resolution::AlreadyHit { ship, segment })
            }
            Resolution::AlreadyHit { .. } => prop_assert!(false, "fresh fleet cannot be already hit"),
        }
    }
}
