use polytris::core::{ActiveRecord, GameState, SaveRecord, SimpleRng};
use polytris::term::{AnchorY, GameView, Hud, Viewport};
use polytris::types::{GameSettings, PieceKind};

fn game(width: usize, height: usize, piece_size: u8) -> GameState {
    GameState::with_shuffle(
        GameSettings::new(width, height, piece_size),
        "viewer",
        Box::new(SimpleRng::new(11)),
    )
}

fn all_text(lines: &[String]) -> String {
    lines.join("\n")
}

#[test]
fn term_view_renders_border_corners() {
    let state = game(10, 20, 4);
    let view = GameView::default().with_anchor_y(AnchorY::Top);

    // With cell_w=2 and cell_h=1 the frame is 22x22; the panel is clipped.
    let fb = view.render(&state, &Hud::default(), Viewport::new(22, 22));

    assert_eq!(fb.get(0, 0).unwrap().ch, '┌');
    assert_eq!(fb.get(21, 0).unwrap().ch, '┐');
    assert_eq!(fb.get(0, 21).unwrap().ch, '└');
    assert_eq!(fb.get(21, 21).unwrap().ch, '┘');
}

#[test]
fn term_view_renders_locked_cell_as_two_chars_wide() {
    let mut record = game(10, 20, 4).snapshot();
    record.grid[19][0] = Some(PieceKind::T);
    record.active = None;
    let state = GameState::restore(&record).unwrap();

    let view = GameView::default().with_anchor_y(AnchorY::Top);
    let fb = view.render(&state, &Hud::default(), Viewport::new(22, 22));

    // Inside border: (1,1) origin. Each cell is 2 chars wide.
    let (x0, y0) = (1, 1 + 19);
    assert_eq!(fb.get(x0, y0).unwrap().ch, '█');
    assert_eq!(fb.get(x0 + 1, y0).unwrap().ch, '█');
    assert_ne!(fb.get(x0 + 2, y0).unwrap().ch, '█');
}

#[test]
fn term_view_draws_ghost_below_active_piece() {
    let record = SaveRecord {
        active: Some(ActiveRecord {
            kind: PieceKind::O,
            x: 0,
            y: 2,
            shape: vec![
                vec![0, 1, 1, 0],
                vec![0, 1, 1, 0],
                vec![0, 0, 0, 0],
                vec![0, 0, 0, 0],
            ],
        }),
        ..game(10, 20, 4).snapshot()
    };
    let state = GameState::restore(&record).unwrap();
    let view = GameView::default().with_anchor_y(AnchorY::Top);
    let fb = view.render(&state, &Hud::default(), Viewport::new(22, 22));

    // O occupies columns 1..=2; on screen x = 1 + 2 * col.
    assert_eq!(fb.get(3, 1 + 2).unwrap().ch, '█');
    assert_eq!(fb.get(3, 1 + 19).unwrap().ch, '░');

    let no_ghost = GameView::default()
        .with_anchor_y(AnchorY::Top)
        .with_ghost(false)
        .render(&state, &Hud::default(), Viewport::new(22, 22));
    assert_ne!(no_ghost.get(3, 1 + 19).unwrap().ch, '░');
}

#[test]
fn term_view_draws_side_panel_when_wide_enough() {
    let mut record = game(10, 20, 5).snapshot();
    record.score = 1234;
    record.level = 2;
    record.lines_cleared = 7;
    let state = GameState::restore(&record).unwrap();

    let help = [("space", "hard drop"), ("p", "pause")];
    let hud = Hud {
        notification: None,
        help: &help,
    };
    let fb = GameView::default().render(&state, &hud, Viewport::new(60, 24));
    let all = all_text(&fb.to_lines());

    for text in ["PLAYER", "viewer", "SCORE", "1234", "LEVEL", "LINES", "NEXT", "hard drop"] {
        assert!(all.contains(text), "missing {text}");
    }
}

#[test]
fn term_view_shows_pause_and_notification() {
    let mut state = game(10, 20, 4);
    state.set_paused(true);
    let hud = Hud {
        notification: Some("Game saved"),
        help: &[],
    };
    let fb = GameView::default().render(&state, &hud, Viewport::new(60, 24));
    let all = all_text(&fb.to_lines());
    assert!(all.contains("PAUSED"));
    assert!(all.contains("Game saved"));
}

#[test]
fn term_view_shows_game_over_with_score() {
    let mut record = game(10, 20, 4).snapshot();
    record.grid[0][9] = Some(PieceKind::O);
    record.score = 77;
    record.active = Some(ActiveRecord {
        kind: PieceKind::I,
        x: -2,
        y: 0,
        shape: vec![vec![0, 0, 1, 0]; 4],
    });
    let mut state = GameState::restore(&record).unwrap();
    state.set_paused(false);
    state.hard_drop();
    assert!(state.game_over());

    let fb = GameView::default().render(&state, &Hud::default(), Viewport::new(60, 24));
    let all = all_text(&fb.to_lines());
    assert!(all.contains("GAME OVER"));
    assert!(all.contains("SCORE 77"));
    assert!(!all.contains("PAUSED"));
}

#[test]
fn term_view_frame_follows_field_size() {
    for (w, h) in [(4usize, 4usize), (7, 12), (40, 60)] {
        let state = game(w, h, 4);
        let vp = Viewport::new(200, 70);
        let fb = GameView::default()
            .with_anchor_y(AnchorY::Top)
            .render(&state, &Hud::default(), vp);
        let top = &fb.to_lines()[0];
        let start = top.chars().position(|c| c == '┌').unwrap();
        let end = top.chars().position(|c| c == '┐').unwrap();
        assert_eq!(end - start + 1, w * 2 + 2, "{w}x{h}");
    }
}
