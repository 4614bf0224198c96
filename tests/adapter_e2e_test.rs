use std::net::SocketAddr;
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use tui_2048::adapter::{
    build_observation, create_ack, create_hello, run_server, AdapterStatus, ClientCommand,
    InboundCommand, InboundPayload, OutboundMessage, ServerConfig,
};
use tui_2048::core::GameState;
use tui_2048::types::GameAction;

const WAIT: Duration = Duration::from_secs(2);

struct TestServer {
    addr: SocketAddr,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    status_rx: watch::Receiver<AdapterStatus>,
    handle: JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn start_server(max_pending: usize) -> TestServer {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        max_pending_commands: max_pending,
        disabled: false,
    };

    let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
    let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
    let (status_tx, status_rx) = watch::channel(AdapterStatus::default());
    let (ready_tx, ready_rx) = oneshot::channel();

    let handle = tokio::spawn(async move {
        let _ = run_server(config, cmd_tx, out_rx, status_tx, Some(ready_tx)).await;
    });

    let addr = tokio::time::timeout(WAIT, ready_rx)
        .await
        .expect("server did not signal ready")
        .expect("ready channel dropped");

    TestServer {
        addr,
        cmd_rx,
        out_tx,
        status_rx,
        handle,
    }
}

impl TestServer {
    async fn next_command(&mut self) -> InboundCommand {
        tokio::time::timeout(WAIT, self.cmd_rx.recv())
            .await
            .expect("timed out waiting for inbound command")
            .expect("command channel closed")
    }

    async fn wait_for_status(&mut self, pred: impl FnMut(&AdapterStatus) -> bool) -> AdapterStatus {
        let status = tokio::time::timeout(WAIT, self.status_rx.wait_for(pred))
            .await
            .expect("timed out waiting for status")
            .expect("status channel closed");
        *status
    }
}

struct TestClient {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect failed");
        let (read_half, writer) = stream.into_split();
        Self {
            lines: BufReader::new(read_half).lines(),
            writer,
        }
    }

    async fn send_line(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
        self.writer.flush().await.unwrap();
    }

    async fn hello(&mut self, seq: u64, stream: bool) -> Value {
        let hello = create_hello(seq, "e2e-test", stream);
        self.send_line(&serde_json::to_string(&hello).unwrap()).await;
        let welcome = self.recv().await;
        assert_eq!(welcome["type"], "welcome");
        welcome
    }

    async fn command(&mut self, seq: u64, moves: &str) {
        let line = format!(r#"{{"type":"command","seq":{},"ts":1,"moves":{}}}"#, seq, moves);
        self.send_line(&line).await;
    }

    async fn control(&mut self, seq: u64, action: &str) {
        let line = format!(r#"{{"type":"control","seq":{},"ts":1,"action":"{}"}}"#, seq, action);
        self.send_line(&line).await;
    }

    async fn recv(&mut self) -> Value {
        let line = tokio::time::timeout(WAIT, self.lines.next_line())
            .await
            .expect("timed out waiting for a line")
            .expect("read failed")
            .expect("connection closed");
        serde_json::from_str(&line).unwrap()
    }

    async fn recv_error(&mut self, code: &str) -> Value {
        let v = self.recv().await;
        assert_eq!(v["type"], "error", "unexpected message: {}", v);
        assert_eq!(v["code"], code, "unexpected error: {}", v);
        v
    }
}

#[tokio::test]
async fn adapter_hello_command_ack_and_observation() {
    let mut server = start_server(8).await;
    let mut client = TestClient::connect(server.addr).await;

    let welcome = client.hello(1, true).await;
    assert_eq!(welcome["seq"], 1);
    assert_eq!(welcome["protocol_version"], "1.0.0");
    assert_eq!(welcome["role"], "controller");
    assert_eq!(welcome["client_id"], welcome["controller_id"]);
    assert_eq!(welcome["game_id"], "tui-2048");
    assert_eq!(welcome["capabilities"]["max_moves_per_command"], 32);
    assert_eq!(
        welcome["capabilities"]["moves"],
        serde_json::json!(["up", "down", "left", "right"])
    );

    // A streaming hello asks the loop for the current state.
    let request = server.next_command().await;
    assert!(matches!(request.payload, InboundPayload::SnapshotRequest));

    let mut game = GameState::new(1);
    game.start();
    let obs = build_observation(&game.snapshot(), None, 1);
    server
        .out_tx
        .send(OutboundMessage::ToClientObservation {
            client_id: request.client_id,
            obs,
        })
        .unwrap();
    let first = client.recv().await;
    assert_eq!(first["type"], "observation");
    assert_eq!(first["board"]["size"], 4);
    assert!(first.get("last_event").is_none());

    client.command(2, r#"["LEFT","down"]"#).await;
    let inbound = server.next_command().await;
    assert_eq!(inbound.seq, 2);
    match inbound.payload {
        InboundPayload::Command(ClientCommand::Moves(moves)) => {
            assert_eq!(moves.as_slice(), &[GameAction::MoveLeft, GameAction::MoveDown]);
        }
        other => panic!("unexpected payload: {:?}", other),
    }

    // Ack only after the loop applied the moves.
    for action in [GameAction::MoveLeft, GameAction::MoveDown] {
        game.apply_action(action);
    }
    server
        .out_tx
        .send(OutboundMessage::ToClientAck {
            client_id: inbound.client_id,
            ack: create_ack(2),
        })
        .unwrap();
    let ack = client.recv().await;
    assert_eq!(ack["type"], "ack");
    assert_eq!(ack["seq"], 2);
    assert_eq!(ack["status"], "ok");

    let obs = build_observation(&game.snapshot(), game.last_event(), 2);
    server
        .out_tx
        .send(OutboundMessage::BroadcastObservation { obs })
        .unwrap();
    let obs_v = client.recv().await;
    assert_eq!(obs_v["type"], "observation");
    assert_eq!(obs_v["seq"], 2);
    assert_eq!(obs_v["score"], game.score());
    assert_eq!(obs_v["state_hash"].as_str().unwrap().len(), 16);
}

#[tokio::test]
async fn adapter_broadcast_skips_non_streaming_clients() {
    let server = start_server(8).await;
    let mut quiet = TestClient::connect(server.addr).await;
    quiet.hello(1, false).await;

    let mut game = GameState::new(3);
    game.start();
    server
        .out_tx
        .send(OutboundMessage::BroadcastObservation {
            obs: build_observation(&game.snapshot(), None, 1),
        })
        .unwrap();

    // The next thing this client sees is the reply to its own bad message.
    quiet.send_line(r#"{"type":"ping","seq":2}"#).await;
    quiet.recv_error("invalid_command").await;
}

#[tokio::test]
async fn adapter_requires_hello_before_command() {
    let server = start_server(8).await;
    let mut client = TestClient::connect(server.addr).await;

    client.command(1, r#"["left"]"#).await;
    let err = client.recv_error("handshake_required").await;
    assert_eq!(err["seq"], 1);

    client.control(2, "claim").await;
    client.recv_error("handshake_required").await;
}

#[tokio::test]
async fn adapter_rejects_incompatible_protocol_and_closes() {
    let server = start_server(8).await;
    let mut client = TestClient::connect(server.addr).await;

    let mut hello = create_hello(1, "old-bot", false);
    hello.protocol_version = "2.1.0".to_string();
    client.send_line(&serde_json::to_string(&hello).unwrap()).await;
    client.recv_error("protocol_mismatch").await;

    let closed = tokio::time::timeout(WAIT, client.lines.next_line())
        .await
        .expect("connection stayed open")
        .unwrap();
    assert!(closed.is_none());
}

#[tokio::test]
async fn adapter_rejects_non_increasing_seq() {
    let mut server = start_server(8).await;
    let mut client = TestClient::connect(server.addr).await;
    client.hello(5, false).await;

    client.command(5, r#"["left"]"#).await;
    client.recv_error("invalid_command").await;
    client.command(3, r#"["left"]"#).await;
    client.recv_error("invalid_command").await;

    client.command(6, r#"["left"]"#).await;
    assert_eq!(server.next_command().await.seq, 6);
}

#[tokio::test]
async fn adapter_rejects_malformed_commands() {
    let mut server = start_server(8).await;
    let mut client = TestClient::connect(server.addr).await;
    client.hello(1, false).await;

    client.command(2, "[]").await;
    client.recv_error("invalid_command").await;

    client.command(3, r#"["left","hold"]"#).await;
    let err = client.recv_error("invalid_command").await;
    assert_eq!(err["seq"], 3);

    let too_many = format!("[{}]", vec![r#""up""#; 33].join(","));
    client.command(4, &too_many).await;
    client.recv_error("invalid_command").await;

    client.send_line("{not json").await;
    client.recv_error("invalid_command").await;

    // Nothing reached the game loop.
    assert!(server.cmd_rx.try_recv().is_err());

    client.command(5, r#"["restart"]"#).await;
    match server.next_command().await.payload {
        InboundPayload::Command(ClientCommand::Moves(moves)) => {
            assert_eq!(moves.as_slice(), &[GameAction::Restart]);
        }
        other => panic!("unexpected payload: {:?}", other),
    }
}

#[tokio::test]
async fn adapter_second_client_is_observer() {
    let mut server = start_server(8).await;
    let mut controller = TestClient::connect(server.addr).await;
    let mut observer = TestClient::connect(server.addr).await;

    let first = controller.hello(1, false).await;
    let second = observer.hello(1, true).await;
    assert_eq!(first["role"], "controller");
    assert_eq!(second["role"], "observer");
    assert_eq!(second["controller_id"], first["client_id"]);

    let status = server
        .wait_for_status(|s| s.client_count == 2 && s.streaming_count == 1)
        .await;
    assert_eq!(status.controller_id, first["client_id"].as_u64().map(|id| id as usize));

    observer.command(2, r#"["up"]"#).await;
    observer.recv_error("not_controller").await;

    observer.control(3, "claim").await;
    observer.recv_error("controller_active").await;
    observer.control(4, "release").await;
    observer.recv_error("not_controller").await;

    // Hand control over explicitly.
    controller.control(2, "release").await;
    assert_eq!(controller.recv().await["type"], "ack");
    observer.control(5, "claim").await;
    let ack = observer.recv().await;
    assert_eq!(ack["type"], "ack");
    assert_eq!(ack["seq"], 5);

    // Drain the snapshot request from the observer's hello.
    let request = server.next_command().await;
    assert!(matches!(request.payload, InboundPayload::SnapshotRequest));

    observer.command(6, r#"["up"]"#).await;
    let inbound = server.next_command().await;
    assert_eq!(inbound.seq, 6);
    assert_eq!(Some(inbound.client_id), second["client_id"].as_u64().map(|id| id as usize));
}

#[tokio::test]
async fn adapter_promotes_next_client_when_controller_disconnects() {
    let mut server = start_server(8).await;
    let mut first = TestClient::connect(server.addr).await;
    let mut second = TestClient::connect(server.addr).await;

    let first_welcome = first.hello(1, false).await;
    let second_welcome = second.hello(1, false).await;
    assert_eq!(second_welcome["role"], "observer");
    let second_id = second_welcome["client_id"].as_u64().unwrap() as usize;
    assert_ne!(first_welcome["client_id"], second_welcome["client_id"]);

    drop(first);
    let status = server
        .wait_for_status(|s| s.client_count == 1)
        .await;
    assert_eq!(status.controller_id, Some(second_id));

    second.command(2, r#"["down"]"#).await;
    let inbound = server.next_command().await;
    assert_eq!(inbound.client_id, second_id);
}

#[tokio::test]
async fn adapter_backpressure_returns_error() {
    let mut server = start_server(1).await;
    let mut client = TestClient::connect(server.addr).await;
    client.hello(1, false).await;

    // The loop never drains, so the second command overflows the queue.
    client.command(2, r#"["left"]"#).await;
    client.command(3, r#"["right"]"#).await;
    let err = client.recv_error("backpressure").await;
    assert_eq!(err["seq"], 3);

    assert_eq!(server.next_command().await.seq, 2);
    client.command(4, r#"["up"]"#).await;
    assert_eq!(server.next_command().await.seq, 4);
}

#[tokio::test]
async fn adapter_streaming_hello_reports_full_queue() {
    let mut server = start_server(1).await;
    let mut controller = TestClient::connect(server.addr).await;
    controller.hello(1, false).await;

    // Fill the queue; the overflow error confirms it is full.
    controller.command(2, r#"["left"]"#).await;
    controller.command(3, r#"["right"]"#).await;
    controller.recv_error("backpressure").await;

    let mut watcher = TestClient::connect(server.addr).await;
    let welcome = watcher.hello(7, true).await;
    assert_eq!(welcome["role"], "observer");
    let err = watcher.recv_error("backpressure").await;
    assert_eq!(err["seq"], 7);

    // Streaming stays on, so the next broadcast still reaches the watcher.
    let mut game = GameState::new(5);
    game.start();
    server
        .out_tx
        .send(OutboundMessage::BroadcastObservation {
            obs: build_observation(&game.snapshot(), None, 1),
        })
        .unwrap();
    let obs = watcher.recv().await;
    assert_eq!(obs["type"], "observation");
    assert_eq!(obs["score"], 0);

    assert_eq!(server.next_command().await.seq, 2);
}
