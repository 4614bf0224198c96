//! Terminal front end for the 2048 board.
//!
//! Rendering is split in two: [`GameView`] maps a read-only
//! [`GameSnapshot`](tui_2048_core::GameSnapshot) into a [`FrameBuffer`] with no
//! I/O, and [`TerminalRenderer`] flushes framebuffers to the real terminal,
//! diffing against the previous frame.
//!
//! No widget toolkit is involved; tiles are plain styled character cells.

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use tui_2048_core as core;
pub use tui_2048_engine as engine;
pub use tui_2048_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{tile_colors, AdapterStatusView, AnchorY, GameView, Hud, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
