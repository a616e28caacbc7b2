//! GameView: maps `core::GameState` into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::pieces::{self, Piece};
use crate::core::GameState;
use crate::fb::{CellStyle, FrameBuffer, Rgb};

const PANEL_GAP: u16 = 2;
const PANEL_W: u16 = 18;

const FIELD_BG: Rgb = Rgb::new(30, 30, 40);
const SCREEN_BG: Rgb = Rgb::new(0, 0, 0);

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Session-level text drawn around the field.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hud<'a> {
    /// Short message under the field ("Game saved", ...).
    pub notification: Option<&'a str>,
    /// `(key, action)` pairs listed in the side panel.
    pub help: &'a [(&'a str, &'a str)],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

/// Terminal renderer for a game of any field and piece size.
#[derive(Debug, Clone)]
pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
    show_ghost: bool,
    show_grid: bool,
    anchor_y: AnchorY,
}

impl Default for GameView {
    fn default() -> Self {
        // 2x1 keeps cells roughly square in most terminal fonts.
        Self::new(2, 1)
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
            show_ghost: true,
            show_grid: true,
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_ghost(mut self, show: bool) -> Self {
        self.show_ghost = show;
        self
    }

    pub fn with_grid(mut self, show: bool) -> Self {
        self.show_grid = show;
        self
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    /// Render into an existing framebuffer, resizing it to the viewport.
    pub fn render_into(
        &self,
        game: &GameState,
        hud: &Hud<'_>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().cell(' '));

        let board_w = game.width() as u16 * self.cell_w;
        let board_h = game.height() as u16 * self.cell_h;
        let frame_w = board_w + 2;
        let frame_h = board_h + 2;

        let total_w = frame_w + PANEL_GAP + PANEL_W;
        let start_x = viewport.width.saturating_sub(total_w) / 2;
        let start_y = match self.anchor_y {
            // One spare row under the frame for notifications.
            AnchorY::Center => viewport.height.saturating_sub(frame_h + 1) / 2,
            AnchorY::Top => 0,
        };
        let origin = (start_x + 1, start_y + 1);

        let field = CellStyle::new(Rgb::new(80, 80, 90), FIELD_BG);
        fb.fill_rect(origin.0, origin.1, board_w, board_h, ' ', field);
        draw_border(
            fb,
            start_x,
            start_y,
            frame_w,
            frame_h,
            CellStyle::new(Rgb::new(200, 200, 200), SCREEN_BG),
        );

        for (y, row) in game.board().rows().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                let (x, y) = (x as i32, y as i32);
                match cell {
                    Some(kind) => self.draw_block(fb, origin, x, y, pieces::color(*kind)),
                    None if self.show_grid => {
                        let grid = CellStyle::new(Rgb::new(90, 90, 100), FIELD_BG).dim();
                        self.fill_cell(fb, origin, x, y, '·', grid);
                    }
                    None => {}
                }
            }
        }

        if self.show_ghost {
            if let Some(ghost) = game.ghost() {
                let style = CellStyle::new(Rgb::new(140, 140, 140), FIELD_BG).dim();
                self.draw_piece_cells(fb, game, &ghost, |view, fb, x, y| {
                    view.fill_cell(fb, origin, x, y, '░', style)
                });
            }
        }

        if let Some(active) = game.active() {
            self.draw_piece_cells(fb, game, &active, |view, fb, x, y| {
                view.draw_block(fb, origin, x, y, active.color)
            });
        }

        let panel_x = start_x + frame_w + PANEL_GAP;
        self.draw_side_panel(fb, game, hud, panel_x, start_y);

        if game.game_over() {
            let mid = start_y + frame_h / 2;
            draw_centered(fb, start_x, frame_w, mid.saturating_sub(1), "GAME OVER");
            let score = format!("SCORE {}", game.score());
            draw_centered(fb, start_x, frame_w, mid + 1, &score);
        } else if game.paused() {
            draw_centered(fb, start_x, frame_w, start_y + frame_h / 2, "PAUSED");
        }

        if let Some(message) = hud.notification {
            let style = CellStyle::new(Rgb::new(120, 230, 140), SCREEN_BG).bold();
            let text_w = message.chars().count() as u16;
            let x = start_x + frame_w.saturating_sub(text_w) / 2;
            fb.put_str(x, start_y + frame_h, message, style);
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, game: &GameState, hud: &Hud<'_>, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(game, hud, viewport, &mut fb);
        fb
    }

    /// Visit the piece cells that fall inside the field.
    fn draw_piece_cells(
        &self,
        fb: &mut FrameBuffer,
        game: &GameState,
        piece: &Piece,
        mut draw: impl FnMut(&Self, &mut FrameBuffer, i32, i32),
    ) {
        let (w, h) = (game.width() as i32, game.height() as i32);
        for (x, y) in piece.cells() {
            if (0..w).contains(&x) && (0..h).contains(&y) {
                draw(self, fb, x, y);
            }
        }
    }

    fn draw_block(&self, fb: &mut FrameBuffer, origin: (u16, u16), x: i32, y: i32, color: Rgb) {
        let style = CellStyle::new(color, FIELD_BG).bold();
        self.fill_cell(fb, origin, x, y, '█', style);
    }

    fn fill_cell(
        &self,
        fb: &mut FrameBuffer,
        origin: (u16, u16),
        x: i32,
        y: i32,
        ch: char,
        style: CellStyle,
    ) {
        if x < 0 || y < 0 {
            return;
        }
        let px = origin.0.saturating_add(x as u16 * self.cell_w);
        let py = origin.1.saturating_add(y as u16 * self.cell_h);
        fb.fill_rect(px, py, self.cell_w, self.cell_h, ch, style);
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        game: &GameState,
        hud: &Hud<'_>,
        x: u16,
        start_y: u16,
    ) {
        if x >= fb.width() {
            return;
        }
        let label = CellStyle::new(Rgb::new(220, 220, 220), SCREEN_BG).bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), SCREEN_BG);

        let mut y = start_y;
        fb.put_str(x, y, "PLAYER", label);
        fb.put_str(x, y + 1, game.player_name(), value);
        y += 3;

        for (name, number) in [
            ("SCORE", game.score()),
            ("LEVEL", game.level()),
            ("LINES", game.lines()),
        ] {
            fb.put_str(x, y, name, label);
            fb.put_u32(x, y + 1, number, value);
            y += 3;
        }

        fb.put_str(x, y, "NEXT", label);
        y += 1;
        if let Some(next) = game.next_preview() {
            let n = next.width() as u16;
            for (dx, dy) in next.shape.offsets() {
                let px = x + dx as u16 * self.cell_w;
                let py = y + dy as u16;
                let style = CellStyle::new(next.color, SCREEN_BG).bold();
                fb.fill_rect(px, py, self.cell_w, 1, '█', style);
            }
            y += n;
        }
        y += 1;

        let dim = value.dim();
        for (key, action) in hud.help {
            let end = fb.put_str(x, y, key, value);
            fb.put_str(end + 1, y, action, dim);
            y += 1;
        }
    }
}

fn draw_border(fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, style: CellStyle) {
    if w < 2 || h < 2 {
        return;
    }

    fb.put_char(x, y, '┌', style);
    fb.put_char(x + w - 1, y, '┐', style);
    fb.put_char(x, y + h - 1, '└', style);
    fb.put_char(x + w - 1, y + h - 1, '┘', style);

    for dx in 1..w - 1 {
        fb.put_char(x + dx, y, '─', style);
        fb.put_char(x + dx, y + h - 1, '─', style);
    }
    for dy in 1..h - 1 {
        fb.put_char(x, y + dy, '│', style);
        fb.put_char(x + w - 1, y + dy, '│', style);
    }
}

fn draw_centered(fb: &mut FrameBuffer, start_x: u16, frame_w: u16, y: u16, text: &str) {
    let text_w = text.chars().count() as u16;
    let x = start_x.saturating_add(frame_w.saturating_sub(text_w) / 2);
    let style = CellStyle::new(Rgb::new(255, 255, 255), SCREEN_BG).bold();
    fb.put_str(x, y, text, style);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SimpleRng;
    use crate::types::GameSettings;

    fn game(width: usize, height: usize, piece_size: u8) -> GameState {
        GameState::with_shuffle(
            GameSettings::new(width, height, piece_size),
            "Ann",
            Box::new(SimpleRng::new(7)),
        )
    }

    #[test]
    fn test_frame_tracks_field_size() {
        let view = GameView::default().with_anchor_y(AnchorY::Top);
        let fb = view.render(&game(8, 16, 4), &Hud::default(), Viewport::new(60, 24));
        let lines = fb.to_lines();
        assert!(lines[0].starts_with('┌'));
        // 8 cells of 2 columns plus the two border columns.
        assert_eq!(lines[0].chars().position(|c| c == '┐'), Some(17));
        assert!(lines[17].starts_with('└'));
    }

    #[test]
    fn test_side_panel_shows_player_and_stats() {
        let view = GameView::default().with_anchor_y(AnchorY::Top);
        let fb = view.render(&game(10, 20, 5), &Hud::default(), Viewport::new(60, 24));
        let text = fb.to_lines().join("\n");
        for label in ["PLAYER", "Ann", "SCORE", "LEVEL", "LINES", "NEXT"] {
            assert!(text.contains(label), "missing {label}");
        }
    }

    #[test]
    fn test_grid_toggle() {
        let g = game(10, 20, 4);
        let vp = Viewport::new(60, 24);
        let with_grid = GameView::default().render(&g, &Hud::default(), vp);
        let without = GameView::default()
            .with_grid(false)
            .render(&g, &Hud::default(), vp);
        assert!(with_grid.to_lines().join("").contains('·'));
        assert!(!without.to_lines().join("").contains('·'));
    }

    #[test]
    fn test_small_viewport_does_not_panic() {
        let view = GameView::default();
        let fb = view.render(&game(20, 30, 7), &Hud::default(), Viewport::new(10, 5));
        assert_eq!((fb.width(), fb.height()), (10, 5));
    }
}
