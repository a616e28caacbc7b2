//! Property tests for the playfield engine.
//!
//! Random command streams over every supported piece size must keep:
//! - the grid at its configured shape with no full rows left behind,
//! - the active piece clear of walls and locked cells while the game runs,
//! - score and line counters monotonic,
//! - snapshots restorable into a paused, running game.

use polytris::core::{GameState, SimpleRng};
use polytris::types::GameSettings;
use proptest::prelude::*;

fn apply(game: &mut GameState, op: u8) {
    match op % 6 {
        0 => {
            game.try_move(-1, 0);
        }
        1 => {
            game.try_move(1, 0);
        }
        2 => {
            game.try_rotate();
        }
        3 => {
            game.drop_piece();
        }
        4 => {
            game.hard_drop();
        }
        _ => {
            game.try_move(0, 1);
        }
    }
}

fn assert_invariants(game: &GameState) {
    let board = game.board();
    assert_eq!(board.height(), game.height());
    assert_eq!(board.rows().count(), game.height());
    for y in 0..board.height() {
        assert_eq!(board.row(y).map(<[_]>::len), Some(game.width()));
        assert!(!board.is_row_full(y), "row {y} left full");
    }

    if !game.game_over() {
        let piece = game.active().expect("running game has an active piece");
        assert!(!game.collides(&piece, 0, 0));
        assert_eq!(piece.cells().len(), piece.kind.native_size() as usize);
    }
}

proptest! {
    #[test]
    fn engine_invariants_hold_over_random_play(
        seed in any::<u32>(),
        piece_size in 4u8..=7,
        width in 7usize..16,
        ops in proptest::collection::vec(any::<u8>(), 1..200),
    ) {
        let mut game = GameState::with_shuffle(
            GameSettings::new(width, 20, piece_size),
            "prop",
            Box::new(SimpleRng::new(seed)),
        );
        assert_invariants(&game);

        let (mut score, mut lines) = (game.score(), game.lines());
        for op in ops {
            apply(&mut game, op);
            assert_invariants(&game);
            prop_assert!(game.score() >= score);
            prop_assert!(game.lines() >= lines);
            score = game.score();
            lines = game.lines();
        }
    }

    #[test]
    fn snapshots_restore_paused_and_running(
        seed in any::<u32>(),
        piece_size in 4u8..=7,
        steps in 1usize..80,
    ) {
        let mut game = GameState::with_shuffle(
            GameSettings::new(10, 20, piece_size),
            "prop",
            Box::new(SimpleRng::new(seed)),
        );
        for i in 0..steps {
            apply(&mut game, (i as u8).wrapping_mul(7).wrapping_add(seed as u8));
        }

        let record = game.snapshot();
        let restored = GameState::restore(&record).expect("own snapshot restores");
        prop_assert!(restored.paused());
        prop_assert!(!restored.game_over());
        prop_assert_eq!(restored.board(), game.board());
        prop_assert_eq!(restored.score(), game.score());
        prop_assert_eq!(restored.snapshot(), record);
    }
}
