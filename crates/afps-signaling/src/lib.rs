//! Session issuance, connection lifecycle, the handshake state machine, and
//! policed input dispatch. This crate owns everything between "a client
//! asked for a session" and "an `InputCmd` lands in a connection's pending
//! queue"; the tick loop (a different crate) drains that queue and is the
//! only thing that ever mutates simulation state.

mod channel;
mod config;
mod connection;
mod error;
mod handshake;
mod session;
mod store;

pub use channel::{Channel, InProcessChannel, SendError};
pub use config::SignalingConfig;
pub use connection::{
    ConnectionPhase, ConnectionState, IceCandidate, InputRejection, PlayerIdentity,
};
pub use error::SignalingError;
pub use handshake::{normalize_character_id, normalize_nickname};
pub use session::SessionInfo;
pub use store::{DispatchOutcome, SignalingStore};
