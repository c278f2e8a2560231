use serde::{Deserialize, Serialize};

/// Reliable-channel handshake message, client to server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientHello {
    pub protocol_version: u32,
    pub session_token: String,
    pub connection_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_id: Option<String>,
}

/// Unreliable-channel per-tick input, client to server.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputCmd {
    pub input_seq: u64,
    pub move_x: f64,
    pub move_y: f64,
    pub look_delta_x: f64,
    pub look_delta_y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_yaw: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_pitch: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weapon_slot: Option<u32>,
    pub jump: bool,
    pub fire: bool,
    pub sprint: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grapple: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shield: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shockwave: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ping {
    pub client_time_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pong {
    pub client_time_ms: u64,
}

/// Every message a client may send, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    ClientHello(ClientHello),
    InputCmd(InputCmd),
    Ping(Ping),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerHello {
    pub protocol_version: u32,
    pub connection_id: String,
    pub client_id: String,
    pub server_tick_rate: u32,
    pub snapshot_rate: u32,
    pub snapshot_keyframe_interval: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_nonce: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub client_id: String,
    pub nickname: String,
    pub character_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMessage {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub server_tick: u64,
    pub last_processed_input_seq: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    pub pos_x: f64,
    pub pos_y: f64,
    pub pos_z: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub vel_z: f64,
    pub weapon_slot: u32,
    pub dash_cooldown: f64,
    pub health: f64,
    pub kills: u32,
    pub deaths: u32,
}

/// A delta relative to `base_tick`'s full [`StateSnapshot`]; only the
/// fields selected by `mask` (see [`crate::SnapshotFieldMask`]) are
/// `Some`. Every field the mask does not select is serialized as absent,
/// not as a stale value, so a client can never mistake "field present but
/// unchanged" for "field omitted".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshotDelta {
    pub server_tick: u64,
    pub base_tick: u64,
    pub last_processed_input_seq: u64,
    pub mask: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos_z: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vel_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vel_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vel_z: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash_cooldown: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kills: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deaths: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weapon_slot: Option<u32>,
}

/// Event-specific payloads folded under the single `GameEvent` wire
/// message, tagged by `event`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum GameEventKind {
    ProjectileSpawn {
        owner_id: String,
        projectile_id: u64,
        pos_x: f64,
        pos_y: f64,
        pos_z: f64,
        vel_x: f64,
        vel_y: f64,
        vel_z: f64,
        ttl: f64,
    },
    ProjectileRemove {
        owner_id: String,
        projectile_id: u64,
    },
    Hit {
        attacker_id: String,
        target_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        damage: Option<f64>,
        killed: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEvent {
    #[serde(flatten)]
    pub kind: GameEventKind,
}

/// Every message the server may send, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    ServerHello(ServerHello),
    PlayerProfile(PlayerProfile),
    Error(ErrorMessage),
    Pong(Pong),
    StateSnapshot(StateSnapshot),
    StateSnapshotDelta(StateSnapshotDelta),
    GameEvent(GameEvent),
}
