//! Protocol module - JSON message types for the control adapter
//!
//! Line-delimited JSON. Every message carries `type`, `seq` (sender-assigned
//! sequence number) and `ts` (milliseconds since the Unix epoch).

use serde::{Deserialize, Serialize};

use arrayvec::ArrayVec;

use crate::core::{MoveEvent, Spawn};
use crate::types::{Direction, GameAction, Tile, BOARD_SIZE};

/// Version announced in `welcome`. Clients must share the major number.
pub const PROTOCOL_VERSION: &str = "1.0.0";
pub const PROTOCOL_MAJOR: &str = "1";

/// Upper bound on moves carried by one `command`.
pub const MAX_MOVES_PER_COMMAND: usize = 32;

pub const GAME_ID: &str = "tui-2048";

// ============== Client -> Game Messages ==============

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HelloType {
    #[default]
    #[serde(rename = "hello")]
    Hello,
}

/// Client hello message (first message on a connection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: HelloType,
    pub seq: u64,
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    #[serde(default)]
    pub requested: RequestedCapabilities,
}

impl HelloMessage {
    /// Whether the client speaks a compatible protocol major version.
    pub fn is_compatible(&self) -> bool {
        self.protocol_version.split('.').next().map(str::trim) == Some(PROTOCOL_MAJOR)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RequestedCapabilities {
    #[serde(default)]
    pub stream_observations: bool,
}

/// Command message (controller only)
#[derive(Debug, Clone, Deserialize)]
pub struct CommandMessage {
    pub seq: u64,
    pub ts: u64,
    pub moves: MoveList,
}

/// Up to [`MAX_MOVES_PER_COMMAND`] actions, parsed case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveList(pub ArrayVec<GameAction, MAX_MOVES_PER_COMMAND>);

impl<'de> Deserialize<'de> for MoveList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;
        impl<'de> serde::de::Visitor<'de> for V {
            type Value = MoveList;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "an array of move strings")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut out = ArrayVec::<GameAction, MAX_MOVES_PER_COMMAND>::new();
                // Owned: buffered tagged-enum content cannot always borrow from the input.
                while let Some(name) = seq.next_element::<String>()? {
                    let action = GameAction::from_str(&name).ok_or_else(|| {
                        serde::de::Error::custom(format!("unknown move: {}", name))
                    })?;
                    out.try_push(action)
                        .map_err(|_| serde::de::Error::custom("too many moves"))?;
                }
                Ok(MoveList(out))
            }
        }

        deserializer.deserialize_seq(V)
    }
}

/// Control message (claim/release controller status)
#[derive(Debug, Clone, Deserialize)]
pub struct ControlMessage {
    pub seq: u64,
    pub ts: u64,
    pub action: ControlAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlAction {
    Claim,
    Release,
}

impl<'de> Deserialize<'de> for ControlAction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s.eq_ignore_ascii_case("claim") {
            Ok(Self::Claim)
        } else if s.eq_ignore_ascii_case("release") {
            Ok(Self::Release)
        } else {
            Err(serde::de::Error::custom("invalid control action"))
        }
    }
}

// ============== Game -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WelcomeType {
    #[serde(rename = "welcome")]
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckStatus {
    #[serde(rename = "ok")]
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservationType {
    #[serde(rename = "observation")]
    Observation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "handshake_required")]
    HandshakeRequired,
    #[serde(rename = "protocol_mismatch")]
    ProtocolMismatch,
    #[serde(rename = "not_controller")]
    NotController,
    #[serde(rename = "controller_active")]
    ControllerActive,
    #[serde(rename = "invalid_command")]
    InvalidCommand,
    #[serde(rename = "backpressure")]
    Backpressure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignedRole {
    #[serde(rename = "controller")]
    Controller,
    #[serde(rename = "observer")]
    Observer,
}

/// Welcome message (response to hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub client_id: u64,
    pub role: AssignedRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_id: Option<u64>,
    pub game_id: String,
    pub capabilities: ServerCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCapabilities {
    pub formats: [CapabilityFormat; 1],
    pub moves: [DirectionLower; 4],
    pub max_moves_per_command: usize,
    pub features: Vec<CapabilityFeature>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapabilityFormat {
    #[serde(rename = "json")]
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapabilityFeature {
    #[serde(rename = "restart")]
    Restart,
    #[serde(rename = "best_score")]
    BestScore,
    #[serde(rename = "last_event")]
    LastEvent,
    #[serde(rename = "state_hash")]
    StateHash,
}

/// Acknowledgment, sent after the command has been applied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
}

/// Error message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

/// Game state observation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: ObservationType,
    pub seq: u64,
    pub ts: u64,
    pub playable: bool,
    pub game_over: bool,
    pub won: bool,
    pub episode_id: u32,
    pub seed: u32,
    pub board: BoardSnapshot,
    pub score: u32,
    pub best_score: u32,
    pub moves: u32,
    pub max_tile: Tile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_event: Option<LastEvent>,
    pub state_hash: StateHash,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub size: u8,
    pub cells: [[Tile; BOARD_SIZE]; BOARD_SIZE],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DirectionLower {
    #[serde(rename = "up")]
    Up,
    #[serde(rename = "down")]
    Down,
    #[serde(rename = "left")]
    Left,
    #[serde(rename = "right")]
    Right,
}

impl From<Direction> for DirectionLower {
    fn from(value: Direction) -> Self {
        match value {
            Direction::Up => DirectionLower::Up,
            Direction::Down => DirectionLower::Down,
            Direction::Left => DirectionLower::Left,
            Direction::Right => DirectionLower::Right,
        }
    }
}

/// The most recent accepted move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastEvent {
    pub direction: DirectionLower,
    pub score_delta: u32,
    pub merges: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spawn: Option<SpawnSnapshot>,
    pub game_over: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnSnapshot {
    pub row: u8,
    pub col: u8,
    pub value: Tile,
}

impl From<Spawn> for SpawnSnapshot {
    fn from(value: Spawn) -> Self {
        Self {
            row: value.coord.row as u8,
            col: value.coord.col as u8,
            value: value.value,
        }
    }
}

impl From<MoveEvent> for LastEvent {
    fn from(value: MoveEvent) -> Self {
        Self {
            direction: value.direction.into(),
            score_delta: value.score_delta,
            merges: value.merges,
            spawn: value.spawn.map(SpawnSnapshot::from),
            game_over: value.game_over,
        }
    }
}

/// Deterministic state hash serialized as 16 lowercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateHash(pub u64);

impl Serialize for StateHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        const HEX: &[u8; 16] = b"0123456789abcdef";
        let mut buf = [0u8; 16];
        let mut v = self.0;
        for i in 0..16 {
            buf[15 - i] = HEX[(v & 0x0f) as usize];
            v >>= 4;
        }
        let s = std::str::from_utf8(&buf).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(s)
    }
}

impl<'de> Deserialize<'de> for StateHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        u64::from_str_radix(s.trim(), 16)
            .map(StateHash)
            .map_err(|_| serde::de::Error::custom("invalid hex"))
    }
}

// ============== Message Parsing ==============

/// Parsed incoming message
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    Control(ControlMessage),
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMessage {
    pub seq: u64,
}

/// Parse one protocol line.
///
/// A well-formed object with an unrecognized `type` is reported as
/// [`ParsedMessage::Unknown`] rather than an error.
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type")]
    enum InboundMessage {
        #[serde(rename = "hello")]
        Hello(HelloMessage),
        #[serde(rename = "command")]
        Command(CommandMessage),
        #[serde(rename = "control")]
        Control(ControlMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(InboundMessage::Command(m)) => Ok(ParsedMessage::Command(m)),
        Ok(InboundMessage::Control(m)) => Ok(ParsedMessage::Control(m)),
        Err(e) => {
            #[derive(Debug, Deserialize)]
            struct Envelope<'a> {
                #[serde(rename = "type", borrow)]
                msg_type: Option<&'a str>,
                seq: Option<u64>,
            }
            let envelope = serde_json::from_str::<Envelope>(json)?;
            match envelope.msg_type {
                Some("hello") | Some("command") | Some("control") => Err(e),
                _ => Ok(ParsedMessage::Unknown(UnknownMessage {
                    seq: envelope.seq.unwrap_or(0),
                })),
            }
        }
    }
}

/// Pull `seq` out of a line that failed to parse, if it is there at all.
pub fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest
        .as_bytes()
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

// ============== Utility Functions ==============

/// Create a hello message (client side; used by tests and tools)
pub fn create_hello(seq: u64, client_name: &str, stream_observations: bool) -> HelloMessage {
    HelloMessage {
        msg_type: HelloType::Hello,
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: PROTOCOL_VERSION.to_string(),
        requested: RequestedCapabilities { stream_observations },
    }
}

/// Create a welcome message
pub fn create_welcome(
    seq: u64,
    client_id: u64,
    role: AssignedRole,
    controller_id: Option<u64>,
) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        ts: current_timestamp_ms(),
        protocol_version: PROTOCOL_VERSION.to_string(),
        client_id,
        role,
        controller_id,
        game_id: GAME_ID.to_string(),
        capabilities: ServerCapabilities {
            formats: [CapabilityFormat::Json],
            moves: [
                DirectionLower::Up,
                DirectionLower::Down,
                DirectionLower::Left,
                DirectionLower::Right,
            ],
            max_moves_per_command: MAX_MOVES_PER_COMMAND,
            features: vec![
                CapabilityFeature::Restart,
                CapabilityFeature::BestScore,
                CapabilityFeature::LastEvent,
                CapabilityFeature::StateHash,
            ],
        },
    }
}

/// Create an ack echoing the command's `seq`
pub fn create_ack(seq: u64) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        status: AckStatus::Ok,
    }
}

/// Create an error message
pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

/// Current timestamp in milliseconds
pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
