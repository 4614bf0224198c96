//! Spawn tests - placement, values, and distribution

use rand::rngs::StdRng;
use rand::SeedableRng;

use tui_2048::core::{
    empty_board, random_tile_value, spawn_tile, try_spawn_tile, Board, Coord, SimpleRng,
};
use tui_2048::types::CELL_COUNT;

fn full_board() -> Board {
    Board::from_array([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]])
}

#[test]
fn test_spawn_adds_exactly_one_tile() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut board = empty_board();
    for placed in 1..=CELL_COUNT {
        let next = spawn_tile(&board, &mut rng);
        assert_eq!(next.count_empty(), CELL_COUNT - placed);

        let mut changed = 0;
        for row in 0..4 {
            for col in 0..4 {
                let (before, after) = (board.get(row, col), next.get(row, col));
                if before != after {
                    changed += 1;
                    assert_eq!(before, Some(0));
                    assert!(matches!(after, Some(2) | Some(4)));
                }
            }
        }
        assert_eq!(changed, 1);
        board = next;
    }
    assert!(board.is_full());
}

#[test]
fn test_spawn_reports_its_cell() {
    let mut rng = StdRng::seed_from_u64(5);
    let board = Board::from_array([[2, 2, 2, 2], [2, 2, 2, 2], [2, 2, 0, 2], [2, 2, 2, 2]]);
    let (next, spawn) = try_spawn_tile(&board, &mut rng).unwrap();
    assert_eq!(spawn.coord, Coord::new(2, 2));
    assert_eq!(next.at(spawn.coord), spawn.value);
    assert!(next.is_full());
}

#[test]
fn test_full_board_is_returned_unchanged() {
    let mut rng = StdRng::seed_from_u64(9);
    let board = full_board();
    assert_eq!(spawn_tile(&board, &mut rng), board);
    assert!(try_spawn_tile(&board, &mut rng).is_none());
}

#[test]
fn test_spawn_does_not_touch_input() {
    let mut rng = StdRng::seed_from_u64(3);
    let board = Board::from_array([[2, 0, 0, 0], [0; 4], [0; 4], [0, 0, 0, 4]]);
    let copy = board;
    let _ = spawn_tile(&board, &mut rng);
    assert_eq!(board, copy);
}

#[test]
fn test_four_probability_is_about_ten_percent() {
    let mut rng = StdRng::seed_from_u64(2048);
    let draws = 20_000;
    let fours = (0..draws)
        .map(|_| random_tile_value(&mut rng))
        .inspect(|&v| assert!(v == 2 || v == 4))
        .filter(|&v| v == 4)
        .count();
    let ratio = fours as f64 / draws as f64;
    assert!((0.08..0.12).contains(&ratio), "ratio of fours: {}", ratio);
}

#[test]
fn test_positions_are_roughly_uniform() {
    let mut rng = StdRng::seed_from_u64(77);
    let mut hits = [[0u32; 4]; 4];
    let rounds = 16_000;
    for _ in 0..rounds {
        let (_, spawn) = try_spawn_tile(&empty_board(), &mut rng).unwrap();
        hits[spawn.coord.row][spawn.coord.col] += 1;
    }
    // Expect ~1000 per cell.
    for count in hits.iter().flatten() {
        assert!((800..1200).contains(count), "cell hit {} times", count);
    }
}

#[test]
fn test_simple_rng_spawns_are_roughly_uniform() {
    let mut rng = SimpleRng::new(2048);
    let mut hits = [[0u32; 4]; 4];
    let mut fours = 0;
    let rounds = 32_000;
    for _ in 0..rounds {
        let (_, spawn) = try_spawn_tile(&empty_board(), &mut rng).unwrap();
        hits[spawn.coord.row][spawn.coord.col] += 1;
        if spawn.value == 4 {
            fours += 1;
        }
    }
    // Expect ~2000 per cell.
    for count in hits.iter().flatten() {
        assert!((1700..2300).contains(count), "cell hit {} times", count);
    }
    let ratio = fours as f64 / rounds as f64;
    assert!((0.08..0.12).contains(&ratio), "ratio of fours: {}", ratio);
}

#[test]
fn test_same_seed_same_spawns() {
    let mut a = SimpleRng::new(12345);
    let mut b = SimpleRng::new(12345);
    let mut board_a = empty_board();
    let mut board_b = empty_board();
    for _ in 0..10 {
        board_a = spawn_tile(&board_a, &mut a);
        board_b = spawn_tile(&board_b, &mut b);
        assert_eq!(board_a, board_b);
    }
}
