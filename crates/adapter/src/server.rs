//! TCP server for the control adapter
//!
//! Accepts connections, runs the handshake/controller state machine per
//! client and forwards validated commands to the game loop. The server never
//! touches game state; acks and observations come back from the loop through
//! [`OutboundMessage`].

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, watch, RwLock};

use crate::core::{GameSnapshot, MoveEvent};
use crate::protocol::*;
use crate::runtime::{ClientCommand, InboundCommand, InboundPayload, OutboundMessage};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 7788;
pub const DEFAULT_MAX_PENDING: usize = 10;

/// Stable 64-bit FNV-1a hasher for deterministic `state_hash`.
///
/// `DefaultHasher` output is not guaranteed stable across Rust releases.
#[derive(Debug, Clone)]
struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl std::hash::Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_pending_commands: usize,
    pub disabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_pending_commands: DEFAULT_MAX_PENDING,
            disabled: false,
        }
    }
}

impl ServerConfig {
    /// Read the `TUI2048_AI_*` settings through `lookup` (usually the process environment).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = lookup("TUI2048_AI_HOST")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = lookup("TUI2048_AI_PORT")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let max_pending_commands = lookup("TUI2048_AI_MAX_PENDING")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_MAX_PENDING);
        let disabled = lookup("TUI2048_AI_DISABLED")
            .map(|v| {
                let v = v.trim();
                v == "1" || v.eq_ignore_ascii_case("true")
            })
            .unwrap_or(false);

        Self {
            host,
            port,
            max_pending_commands,
            disabled,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid adapter address {}:{}", self.host, self.port))
    }
}

/// Connection summary published for the UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdapterStatus {
    pub client_count: u16,
    pub streaming_count: u16,
    pub controller_id: Option<usize>,
}

/// Handle to a connected client
struct ClientHandle {
    id: usize,
    stream_observations: bool,
    handshaken: bool,
    last_seq: Option<u64>,
    tx: mpsc::UnboundedSender<ClientOutbound>,
}

#[derive(Debug, Clone)]
enum ClientOutbound {
    Welcome(WelcomeMessage),
    Ack(AckMessage),
    Error(ErrorMessage),
    Observation(ObservationMessage),
}

/// Shared server state
struct ServerState {
    clients: RwLock<Vec<ClientHandle>>,
    controller: RwLock<Option<usize>>,
    status_tx: watch::Sender<AdapterStatus>,
}

impl ServerState {
    fn new(status_tx: watch::Sender<AdapterStatus>) -> Self {
        Self {
            clients: RwLock::new(Vec::new()),
            controller: RwLock::new(None),
            status_tx,
        }
    }

    async fn publish_status(&self) {
        let controller = *self.controller.read().await;
        let clients = self.clients.read().await;
        let status = AdapterStatus {
            client_count: clients.len() as u16,
            streaming_count: clients.iter().filter(|c| c.stream_observations).count() as u16,
            controller_id: controller,
        };
        self.status_tx.send_replace(status);
    }

    async fn is_handshaken(&self, client_id: usize) -> bool {
        let clients = self.clients.read().await;
        clients
            .iter()
            .find(|c| c.id == client_id)
            .map(|c| c.handshaken)
            .unwrap_or(false)
    }

    async fn is_controller(&self, client_id: usize) -> bool {
        *self.controller.read().await == Some(client_id)
    }

    /// Record `seq` if it is strictly greater than the last one seen.
    async fn check_and_update_seq(&self, client_id: usize, seq: u64) -> bool {
        let mut clients = self.clients.write().await;
        let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
            return false;
        };
        match client.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                client.last_seq = Some(seq);
                true
            }
        }
    }

    async fn send_to(&self, client_id: usize, msg: ClientOutbound) {
        let clients = self.clients.read().await;
        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
            let _ = c.tx.send(msg);
        }
    }

    async fn broadcast(&self, obs: ObservationMessage) {
        let clients = self.clients.read().await;
        for c in clients.iter().filter(|c| c.handshaken && c.stream_observations) {
            let _ = c.tx.send(ClientOutbound::Observation(obs.clone()));
        }
    }

    /// Remove a client; if it held control, promote the lowest remaining handshaken id.
    async fn remove_client(&self, client_id: usize) {
        {
            let mut controller = self.controller.write().await;
            let mut clients = self.clients.write().await;
            clients.retain(|c| c.id != client_id);

            if *controller == Some(client_id) {
                *controller = clients.iter().filter(|c| c.handshaken).map(|c| c.id).min();
                match *controller {
                    Some(new_id) => {
                        log::info!("controller {} left, promoted {}", client_id, new_id)
                    }
                    None => log::info!("controller {} left, no client to promote", client_id),
                }
            }
        }
        self.publish_status().await;
    }
}

/// Start the TCP server.
///
/// `ready_tx` receives the bound address once the listener is up (useful with port 0).
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    status_tx: watch::Sender<AdapterStatus>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind adapter on {}", addr))?;
    let bound = listener.local_addr()?;
    log::info!("control adapter listening on {}", bound);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new(status_tx));
    let mut client_id_counter = 0usize;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                match msg {
                    OutboundMessage::ToClientAck { client_id, ack } => {
                        state.send_to(client_id, ClientOutbound::Ack(ack)).await;
                    }
                    OutboundMessage::ToClientObservation { client_id, obs } => {
                        state.send_to(client_id, ClientOutbound::Observation(obs)).await;
                    }
                    OutboundMessage::BroadcastObservation { obs } => {
                        state.broadcast(obs).await;
                    }
                }
            }
        });
    }

    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        log::info!("client {} connected from {}", client_id, addr);

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        tokio::spawn(async move {
            let result =
                handle_client(socket, addr, client_id, Arc::clone(&state), command_tx).await;
            if let Err(e) = result {
                log::warn!("client {} error: {}", client_id, e);
            }
            state.remove_client(client_id).await;
            log::info!("client {} disconnected", client_id);
        });
    }
}

fn send_error(
    tx: &mpsc::UnboundedSender<ClientOutbound>,
    seq: u64,
    code: ErrorCode,
    message: &str,
) {
    log::debug!("error {:?} for seq {}: {}", code, seq, message);
    let _ = tx.send(ClientOutbound::Error(create_error(seq, code, message)));
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: usize,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);

    let (tx, mut rx) = mpsc::unbounded_channel::<ClientOutbound>();

    {
        let mut clients = state.clients.write().await;
        clients.push(ClientHandle {
            id: client_id,
            stream_observations: false,
            handshaken: false,
            last_seq: None,
            tx: tx.clone(),
        });
    }
    state.publish_status().await;

    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(1024);
        while let Some(msg) = rx.recv().await {
            buf.clear();
            let encoded = match &msg {
                ClientOutbound::Welcome(v) => serde_json::to_writer(&mut buf, v),
                ClientOutbound::Ack(v) => serde_json::to_writer(&mut buf, v),
                ClientOutbound::Error(v) => serde_json::to_writer(&mut buf, v),
                ClientOutbound::Observation(v) => serde_json::to_writer(&mut buf, v),
            };
            if encoded.is_err() {
                continue;
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() || writer.flush().await.is_err() {
                break;
            }
        }
    });

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        log::trace!("client {} <- {}", client_id, trimmed);

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                if state.is_handshaken(client_id).await
                    && !state.check_and_update_seq(client_id, hello.seq).await
                {
                    send_error(
                        &tx,
                        hello.seq,
                        ErrorCode::InvalidCommand,
                        "seq must be strictly increasing",
                    );
                    continue;
                }

                if !hello.is_compatible() {
                    send_error(
                        &tx,
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!(
                            "protocol version {} not supported, expected {}",
                            hello.protocol_version, PROTOCOL_VERSION
                        ),
                    );
                    break;
                }

                let controller_id = {
                    let mut controller = state.controller.write().await;
                    let mut clients = state.clients.write().await;
                    if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                        client.handshaken = true;
                        client.last_seq = Some(hello.seq);
                        client.stream_observations = hello.requested.stream_observations;
                    }
                    if controller.is_none() {
                        *controller = Some(client_id);
                        log::info!(
                            "client {} ({}) is now controller",
                            client_id,
                            hello.client.name
                        );
                    }
                    *controller
                };
                state.publish_status().await;

                let role = if controller_id == Some(client_id) {
                    AssignedRole::Controller
                } else {
                    AssignedRole::Observer
                };
                let welcome = create_welcome(
                    hello.seq,
                    client_id as u64,
                    role,
                    controller_id.map(|id| id as u64),
                );
                let _ = tx.send(ClientOutbound::Welcome(welcome));

                if hello.requested.stream_observations {
                    let request = InboundCommand {
                        client_id,
                        seq: hello.seq,
                        payload: InboundPayload::SnapshotRequest,
                    };
                    if command_tx.try_send(request).is_err() {
                        // Streaming stays on; the next broadcast catches the client up.
                        send_error(
                            &tx,
                            hello.seq,
                            ErrorCode::Backpressure,
                            "command queue is full, first observation deferred",
                        );
                    }
                }
            }

            Ok(ParsedMessage::Command(cmd)) => {
                if !state.is_handshaken(client_id).await {
                    send_error(
                        &tx,
                        cmd.seq,
                        ErrorCode::HandshakeRequired,
                        "send hello before command",
                    );
                    continue;
                }
                if !state.check_and_update_seq(client_id, cmd.seq).await {
                    send_error(
                        &tx,
                        cmd.seq,
                        ErrorCode::InvalidCommand,
                        "seq must be strictly increasing",
                    );
                    continue;
                }
                if !state.is_controller(client_id).await {
                    send_error(
                        &tx,
                        cmd.seq,
                        ErrorCode::NotController,
                        "only the controller may send commands",
                    );
                    continue;
                }
                if cmd.moves.0.is_empty() {
                    send_error(&tx, cmd.seq, ErrorCode::InvalidCommand, "moves must not be empty");
                    continue;
                }

                // Ack is sent by the game loop once the moves are applied.
                let inbound = InboundCommand {
                    client_id,
                    seq: cmd.seq,
                    payload: InboundPayload::Command(ClientCommand::Moves(cmd.moves.0)),
                };
                if command_tx.try_send(inbound).is_err() {
                    send_error(&tx, cmd.seq, ErrorCode::Backpressure, "command queue is full");
                }
            }

            Ok(ParsedMessage::Control(ctrl)) => {
                if !state.is_handshaken(client_id).await {
                    send_error(
                        &tx,
                        ctrl.seq,
                        ErrorCode::HandshakeRequired,
                        "send hello before control",
                    );
                    continue;
                }
                if !state.check_and_update_seq(client_id, ctrl.seq).await {
                    send_error(
                        &tx,
                        ctrl.seq,
                        ErrorCode::InvalidCommand,
                        "seq must be strictly increasing",
                    );
                    continue;
                }

                let outcome = {
                    let mut controller = state.controller.write().await;
                    match ctrl.action {
                        ControlAction::Claim => match *controller {
                            None => {
                                *controller = Some(client_id);
                                Ok(())
                            }
                            Some(id) if id == client_id => Ok(()),
                            Some(_) => {
                                Err((ErrorCode::ControllerActive, "controller already assigned"))
                            }
                        },
                        ControlAction::Release => {
                            if *controller == Some(client_id) {
                                *controller = None;
                                Ok(())
                            } else {
                                Err((ErrorCode::NotController, "only the controller may release"))
                            }
                        }
                    }
                };

                match outcome {
                    Ok(()) => {
                        log::info!("client {} {:?} control", client_id, ctrl.action);
                        state.publish_status().await;
                        let _ = tx.send(ClientOutbound::Ack(create_ack(ctrl.seq)));
                    }
                    Err((code, message)) => send_error(&tx, ctrl.seq, code, message),
                }
            }

            Ok(ParsedMessage::Unknown(unknown)) => {
                if state.is_handshaken(client_id).await
                    && !state.check_and_update_seq(client_id, unknown.seq).await
                {
                    send_error(
                        &tx,
                        unknown.seq,
                        ErrorCode::InvalidCommand,
                        "seq must be strictly increasing",
                    );
                    continue;
                }
                send_error(&tx, unknown.seq, ErrorCode::InvalidCommand, "unknown message type");
            }

            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                send_error(&tx, seq, ErrorCode::InvalidCommand, &format!("invalid message: {}", e));
            }
        }
    }

    log::debug!("client {} ({}) closed its stream", client_id, addr);
    drop(tx);
    {
        // The client list holds the other sender; drop it so the writer drains and exits.
        let mut clients = state.clients.write().await;
        clients.retain(|c| c.id != client_id);
    }
    let _ = write_task.await;

    Ok(())
}

/// FNV-1a over the observable game state.
pub fn state_hash(snap: &GameSnapshot) -> u64 {
    use std::hash::{Hash, Hasher};

    let mut hasher = Fnv1aHasher::new();
    snap.board.hash(&mut hasher);
    snap.score.hash(&mut hasher);
    snap.moves.hash(&mut hasher);
    snap.episode_id.hash(&mut hasher);
    snap.game_over.hash(&mut hasher);
    hasher.finish()
}

/// Build an observation from a snapshot.
pub fn build_observation(
    snap: &GameSnapshot,
    last_event: Option<MoveEvent>,
    seq: u64,
) -> ObservationMessage {
    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        playable: snap.playable(),
        game_over: snap.game_over,
        won: snap.won,
        episode_id: snap.episode_id,
        seed: snap.seed,
        board: BoardSnapshot {
            size: crate::types::BOARD_SIZE as u8,
            cells: snap.board,
        },
        score: snap.score,
        best_score: snap.best_score,
        moves: snap.moves,
        max_tile: snap.max_tile,
        last_event: last_event.map(LastEvent::from),
        state_hash: StateHash(state_hash(snap)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Board, GameState};
    use crate::types::Direction;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.socket_addr().unwrap().port(), DEFAULT_PORT);
    }

    #[test]
    fn test_server_config_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("TUI2048_AI_HOST", "0.0.0.0"),
            ("TUI2048_AI_PORT", "9000"),
            ("TUI2048_AI_MAX_PENDING", "3"),
            ("TUI2048_AI_DISABLED", "TRUE"),
        ]));
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.max_pending_commands, 3);
        assert!(config.disabled);
    }

    #[test]
    fn test_server_config_ignores_bad_values() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("TUI2048_AI_PORT", "not-a-port"),
            ("TUI2048_AI_DISABLED", "0"),
        ]));
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(!config.disabled);
    }

    #[test]
    fn test_invalid_host_is_an_error() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            ..ServerConfig::default()
        };
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn test_state_hash_is_deterministic() {
        let mut a = GameState::new(5);
        a.start();
        let mut b = GameState::new(5);
        b.start();
        assert_eq!(state_hash(&a.snapshot()), state_hash(&b.snapshot()));
    }

    #[test]
    fn test_state_hash_changes_with_board_and_episode() {
        let mut gs = GameState::from_board(
            Board::from_array([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]),
            3,
        );
        let before = state_hash(&gs.snapshot());
        assert!(gs.apply_move(Direction::Left).is_some());
        assert_ne!(before, state_hash(&gs.snapshot()));

        let mut snap = gs.snapshot();
        let h = state_hash(&snap);
        snap.episode_id += 1;
        assert_ne!(h, state_hash(&snap));
    }

    #[test]
    fn test_build_observation_fields() {
        let mut gs = GameState::from_board(
            Board::from_array([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]),
            3,
        );
        let event = gs.apply_move(Direction::Left);
        let obs = build_observation(&gs.snapshot(), event, 7);
        assert_eq!(obs.seq, 7);
        assert_eq!(obs.board.size, 4);
        assert_eq!(obs.board.cells[0][0], 4);
        assert_eq!(obs.score, 4);
        assert_eq!(obs.moves, 1);
        assert!(obs.playable);
        assert_eq!(obs.last_event.map(|e| e.score_delta), Some(4));
    }
}
