//! Adapter runtime integration.
//!
//! Bridges the sync game loop with the async TCP server. The loop polls
//! [`Adapter::try_recv`] between frames, applies commands itself, and
//! sends acks and observations back with [`Adapter::send`].

use std::net::SocketAddr;

use anyhow::Context;
use arrayvec::ArrayVec;
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, oneshot, watch};

use crate::protocol::{AckMessage, ObservationMessage, MAX_MOVES_PER_COMMAND};
use crate::server::{run_server, AdapterStatus, ServerConfig};
use crate::types::GameAction;

/// Command delivered to the game loop.
#[derive(Debug, Clone)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone)]
pub enum InboundPayload {
    Command(ClientCommand),
    /// The client asked for observations; send it the current state.
    SnapshotRequest,
}

/// Command payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    Moves(ArrayVec<GameAction, MAX_MOVES_PER_COMMAND>),
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClientAck { client_id: usize, ack: AckMessage },
    ToClientObservation {
        client_id: usize,
        obs: ObservationMessage,
    },
    BroadcastObservation { obs: ObservationMessage },
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    local_addr: SocketAddr,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    status_rx: watch::Receiver<AdapterStatus>,
}

impl Adapter {
    /// Start the server on a background runtime and wait until it is listening.
    pub fn start(config: ServerConfig) -> anyhow::Result<Self> {
        let max_pending = config.max_pending_commands.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
        let (status_tx, status_rx) = watch::channel(AdapterStatus::default());
        let (ready_tx, ready_rx) = oneshot::channel::<SocketAddr>();

        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("tui2048-adapter")
            .enable_all()
            .build()
            .context("failed to create adapter runtime")?;

        let handle = rt.spawn(async move {
            if let Err(e) = run_server(config, cmd_tx, out_rx, status_tx, Some(ready_tx)).await {
                log::error!("control adapter stopped: {:#}", e);
            }
        });

        let local_addr = match rt.block_on(ready_rx) {
            Ok(addr) => addr,
            Err(_) => {
                // Sender dropped before binding; the task has logged why.
                let _ = rt.block_on(handle);
                anyhow::bail!("control adapter failed to start");
            }
        };

        Ok(Self {
            _rt: rt,
            local_addr,
            cmd_rx,
            out_tx,
            status_rx,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }

    /// Latest connection summary.
    pub fn status(&self) -> AdapterStatus {
        *self.status_rx.borrow()
    }
}
