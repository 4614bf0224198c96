//! Adapter module - programmatic control via TCP socket with JSON protocol
//!
//! External programs (bots, test harnesses, training loops) drive the game
//! through a TCP connection. The adapter only validates and queues; the game
//! loop stays the single writer of game state.
//!
//! # Protocol Overview
//!
//! **Line-delimited JSON** over TCP:
//!
//! 1. **Connection**: client connects (default `127.0.0.1:7788`)
//! 2. **Handshake**: client sends `hello`, server answers `welcome`
//! 3. **Controller Assignment**: first client to hello becomes the controller
//! 4. **Observations**: clients that asked for them receive the state after
//!    every change
//! 5. **Commanding**: the controller sends `command` with up to 32 moves
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: client info, `protocol_version` (major must be `1`), requested streaming
//! - **command**: `moves`, each of `up`, `down`, `left`, `right`, `restart`
//! - **control**: `claim` or `release` controller status
//!
//! ## Server → Client
//!
//! - **welcome**: assigned client id, role and capabilities
//! - **observation**: board, score, best score, moves, flags and `state_hash`
//! - **ack**: command applied
//! - **error**: `code` and `message`
//!
//! # Environment Variables
//!
//! - `TUI2048_AI_HOST`: bind address (default: "127.0.0.1")
//! - `TUI2048_AI_PORT`: port number (default: 7788)
//! - `TUI2048_AI_MAX_PENDING`: queued commands before `backpressure` (default: 10)
//! - `TUI2048_AI_DISABLED`: set to "1" or "true" to disable the adapter
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":1700000000000,"client":{"name":"bot","version":"0.1"},"protocol_version":"1.0.0","requested":{"stream_observations":true}}
//! Server -> Client: {"type":"welcome","seq":1,"ts":1700000000001,"protocol_version":"1.0.0","client_id":1,"role":"controller",...}
//! Server -> Client: {"type":"observation","seq":1,"ts":1700000000002,"board":{"size":4,"cells":[[0,2,0,0],...]},...}
//! Client -> Server: {"type":"command","seq":2,"ts":1700000000100,"moves":["left","down"]}
//! Server -> Client: {"type":"ack","seq":2,"ts":1700000000101,"status":"ok"}
//! ```
//!
//! # Testing
//!
//! ```bash
//! nc 127.0.0.1 7788
//! {"type":"hello","seq":1,"ts":0,"client":{"name":"nc","version":"0"},"protocol_version":"1.0.0","requested":{"stream_observations":true}}
//! ```

pub mod protocol;
pub mod runtime;
pub mod server;

pub use tui_2048_core as core;
pub use tui_2048_types as types;

pub use protocol::*;
pub use runtime::{Adapter, ClientCommand, InboundCommand, InboundPayload, OutboundMessage};
pub use server::{build_observation, run_server, state_hash, AdapterStatus, ServerConfig};
