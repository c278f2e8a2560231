//! The wire message set exchanged between a client and the authoritative
//! server, plus the HTTP signaling request/response bodies. Every public
//! struct derives `serde::{Serialize, Deserialize}`; field names and the
//! `type` discriminator are part of the external contract and must not be
//! renamed.

mod codec;
mod error;
pub mod http;
mod mask;
mod messages;
mod validate;

pub use codec::{decode_client_message, decode_server_message, encode_message};
pub use error::ProtocolError;
pub use mask::SnapshotFieldMask;
pub use messages::{
    ClientHello, ClientMessage, GameEvent, InputCmd, PlayerProfile, Ping, Pong, ServerHello,
    ServerMessage, StateSnapshot, StateSnapshotDelta,
};
pub use validate::validate_input_cmd;

/// The protocol version this crate implements. A `ClientHello` carrying
/// any other value fails the handshake with `ProtocolMismatch`.
pub const PROTOCOL_VERSION: u32 = 3;
/// Authoritative tick rate, ticks per second.
pub const SERVER_TICK_RATE: u32 = 60;
/// Target rate at which snapshots are produced, per second.
pub const SNAPSHOT_RATE: u32 = 20;
/// Every Nth snapshot in sequence is a full keyframe; `0` means "never
/// delta, always full".
pub const SNAPSHOT_KEYFRAME_INTERVAL: u32 = 5;
/// Hard ceiling on a single client-to-server message, enforced before any
/// JSON parsing is attempted.
pub const MAX_CLIENT_MESSAGE_BYTES: usize = 4096;

/// The two logical data channels a connection carries.
pub const RELIABLE_CHANNEL_LABEL: &str = "afps_reliable";
pub const UNRELIABLE_CHANNEL_LABEL: &str = "afps_unreliable";
