//! GameView: maps a `GameSnapshot` into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::GameSnapshot;
use crate::engine::Hint;
use crate::fb::{digit_count, CellStyle, FrameBuffer, Rgb};
use crate::types::{Tile, BOARD_SIZE};

const BOARD_BG: Rgb = Rgb::new(187, 173, 160);
const EMPTY_BG: Rgb = Rgb::new(205, 193, 180);
const DARK_TEXT: Rgb = Rgb::new(119, 110, 101);
const LIGHT_TEXT: Rgb = Rgb::new(249, 246, 242);

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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterStatusView {
    pub client_count: u16,
    pub controller_id: Option<usize>,
    pub streaming_count: u16,
}

/// Everything drawn next to the board that is not part of the snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hud<'a> {
    pub hint: Option<&'a Hint>,
    pub adapter: Option<&'a AdapterStatusView>,
    /// Show the `2048!` banner (the caller clears it on the next input).
    pub celebrate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

/// Board renderer. Each tile is a `cell_w x cell_h` box.
pub struct GameView {
    cell_w: u16,
    cell_h: u16,
    anchor_y: AnchorY,
}

impl Default for GameView {
    fn default() -> Self {
        // Wide enough for six digits plus a gap column.
        Self {
            cell_w: 7,
            cell_h: 3,
            anchor_y: AnchorY::Center,
        }
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(2),
            cell_h: cell_h.max(1),
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    /// Total board frame size including the border.
    pub fn frame_size(&self) -> (u16, u16) {
        (
            (BOARD_SIZE as u16) * self.cell_w + 2,
            (BOARD_SIZE as u16) * self.cell_h + 2,
        )
    }

    /// Render into an existing framebuffer.
    ///
    /// Callers reuse one framebuffer across frames; it is only reallocated
    /// when the viewport grows.
    pub fn render_into(
        &self,
        snap: &GameSnapshot,
        hud: Hud<'_>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().cell(' '));

        let (frame_w, frame_h) = self.frame_size();
        let start_x = viewport.width.saturating_sub(frame_w + PANEL_MIN_W) / 2;
        let start_y = match self.anchor_y {
            AnchorY::Center => viewport.height.saturating_sub(frame_h) / 2,
            AnchorY::Top => 0,
        };

        let bg = CellStyle::new(BOARD_BG, BOARD_BG);
        fb.fill_rect(start_x + 1, start_y + 1, frame_w - 2, frame_h - 2, ' ', bg);
        draw_border(fb, start_x, start_y, frame_w, frame_h, CellStyle::default());

        for (row, cells) in snap.board.iter().enumerate() {
            for (col, &value) in cells.iter().enumerate() {
                self.draw_tile(fb, start_x, start_y, row as u16, col as u16, value);
            }
        }

        self.draw_side_panel(fb, snap, hud, viewport, start_x + frame_w + 2, start_y);

        if snap.game_over {
            draw_overlay_text(fb, start_x, start_y, frame_w, frame_h, "GAME OVER");
        } else if hud.celebrate {
            draw_overlay_text(fb, start_x, start_y, frame_w, frame_h, "2048!");
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, hud: Hud<'_>, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, hud, viewport, &mut fb);
        fb
    }

    fn draw_tile(
        &self,
        fb: &mut FrameBuffer,
        start_x: u16,
        start_y: u16,
        row: u16,
        col: u16,
        value: Tile,
    ) {
        let px = start_x + 1 + col * self.cell_w;
        let py = start_y + 1 + row * self.cell_h;
        // Last column of each box stays board-colored as a gutter.
        let box_w = self.cell_w - 1;
        let mid_y = py + self.cell_h / 2;

        if value == 0 {
            let style = CellStyle::new(DARK_TEXT, EMPTY_BG).dim();
            fb.fill_rect(px, py, box_w, self.cell_h, ' ', style);
            fb.put_char(px + box_w / 2, mid_y, '·', style);
            return;
        }

        let (fg, bg) = tile_colors(value);
        let style = CellStyle::new(fg, bg).bold();
        fb.fill_rect(px, py, box_w, self.cell_h, ' ', style);
        let digits = digit_count(value);
        let tx = px + box_w.saturating_sub(digits) / 2;
        fb.put_u32(tx, mid_y, value, style);
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        hud: Hud<'_>,
        viewport: Viewport,
        panel_x: u16,
        start_y: u16,
    ) {
        if panel_x >= viewport.width || viewport.width - panel_x < 12 {
            return;
        }

        let label = CellStyle::default().bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));
        let dim = value.dim();

        let mut y = start_y;
        for (name, v) in [
            ("SCORE", snap.score),
            ("BEST", snap.best_score),
            ("MOVES", snap.moves),
            ("MAX", snap.max_tile),
        ] {
            fb.put_str(panel_x, y, name, label);
            fb.put_u32(panel_x + 7, y, v, value);
            y = y.saturating_add(1);
        }

        y = y.saturating_add(1);
        fb.put_str(panel_x, y, "HINT", label);
        match hud.hint {
            Some(hint) => {
                fb.put_str(panel_x + 7, y, hint.direction.as_str(), value);
                y = y.saturating_add(1);
                fb.put_str(panel_x, y, &hint.reason, dim);
            }
            None => {
                fb.put_str(panel_x + 7, y, "press ?", dim);
                y = y.saturating_add(1);
            }
        }

        y = y.saturating_add(2);
        fb.put_str(panel_x, y, "AI", label);
        match hud.adapter {
            Some(st) => {
                fb.put_str(panel_x + 7, y, "ON", value);
                y = y.saturating_add(1);
                fb.put_str(panel_x, y, "clients", dim);
                fb.put_u32(panel_x + 8, y, st.client_count as u32, value);
                y = y.saturating_add(1);
                fb.put_str(panel_x, y, "stream", dim);
                fb.put_u32(panel_x + 8, y, st.streaming_count as u32, value);
                y = y.saturating_add(1);
                fb.put_str(panel_x, y, "ctrl", dim);
                match st.controller_id {
                    Some(id) => {
                        fb.put_u32(panel_x + 8, y, id as u32, value);
                    }
                    None => fb.put_str(panel_x + 8, y, "-", value),
                }
            }
            None => fb.put_str(panel_x + 7, y, "OFF", value),
        }

        if snap.won && !snap.game_over {
            y = y.saturating_add(2);
            fb.put_str(panel_x, y, "Keep going!", label);
        }
    }
}

/// Space reserved to the right of the board when centering.
const PANEL_MIN_W: u16 = 24;

/// Foreground/background for a tile value, following the familiar palette.
pub fn tile_colors(value: Tile) -> (Rgb, Rgb) {
    match value {
        2 => (DARK_TEXT, Rgb::new(238, 228, 218)),
        4 => (DARK_TEXT, Rgb::new(237, 224, 200)),
        8 => (LIGHT_TEXT, Rgb::new(242, 177, 121)),
        16 => (LIGHT_TEXT, Rgb::new(245, 149, 99)),
        32 => (LIGHT_TEXT, Rgb::new(246, 124, 95)),
        64 => (LIGHT_TEXT, Rgb::new(246, 94, 59)),
        128 => (LIGHT_TEXT, Rgb::new(237, 207, 114)),
        256 => (LIGHT_TEXT, Rgb::new(237, 204, 97)),
        512 => (LIGHT_TEXT, Rgb::new(237, 200, 80)),
        1024 => (LIGHT_TEXT, Rgb::new(237, 197, 63)),
        2048 => (LIGHT_TEXT, Rgb::new(237, 194, 46)),
        _ => (LIGHT_TEXT, Rgb::new(60, 58, 50)),
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

fn draw_overlay_text(
    fb: &mut FrameBuffer,
    start_x: u16,
    start_y: u16,
    frame_w: u16,
    frame_h: u16,
    text: &str,
) {
    let mid_y = start_y.saturating_add(frame_h / 2);
    let text_w = text.chars().count() as u16;
    let x = start_x.saturating_add(frame_w.saturating_sub(text_w + 2) / 2);
    let style = CellStyle::new(Rgb::new(255, 255, 255), Rgb::new(0, 0, 0)).bold();
    fb.put_char(x, mid_y, ' ', style);
    fb.put_str(x + 1, mid_y, text, style);
    fb.put_char(x + 1 + text_w, mid_y, ' ', style);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_colors_distinguish_small_and_large_values() {
        assert_eq!(tile_colors(2).0, DARK_TEXT);
        assert_eq!(tile_colors(8).0, LIGHT_TEXT);
        assert_ne!(tile_colors(2).1, tile_colors(4).1);
        assert_eq!(tile_colors(4096), tile_colors(8192));
    }

    #[test]
    fn frame_size_scales_with_cell_size() {
        assert_eq!(GameView::new(7, 3).frame_size(), (30, 14));
        assert_eq!(GameView::new(0, 0).frame_size(), (10, 6));
    }
}
