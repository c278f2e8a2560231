use std::{
    collections::VecDeque,
    sync::atomic::{AtomicBool, Ordering},
};

use afps_protocol::{validate_input_cmd, InputCmd, StateSnapshot};
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::{
    channel::Channel,
    config::SignalingConfig,
    handshake::{normalize_character_id, normalize_nickname},
};

/// Where a connection sits in the handshake state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    Created,
    OfferSent,
    AnswerApplied,
    ChannelOpen,
    HelloPending,
    Ready,
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IceCandidate {
    pub candidate: String,
    pub mid: Option<String>,
}

/// An established player identity, set once the handshake succeeds.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerIdentity {
    pub nickname: String,
    pub character_id: String,
}

/// Why a `ClientHello` or input message was rejected during the handshake
/// or post-handshake input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRejection {
    InvalidJson,
    ProtocolMismatch,
    IdMismatch,
    StaleSequence,
    OversizedMessage,
    BeforeHandshake,
    RateLimited,
}

struct Mutable {
    phase: ConnectionPhase,
    local_description: Option<String>,
    remote_description: Option<String>,
    local_candidates: Vec<IceCandidate>,
    handshake_attempts: u32,
    identity: Option<PlayerIdentity>,
    last_input_seq: Option<u64>,
    pending_inputs: VecDeque<InputCmd>,
    invalid_input_count: u32,
    rate_limit_count: u32,
    snapshot_baseline: Option<StateSnapshot>,
    snapshot_seq: u64,
}

/// Per-connection handshake, input, and snapshot-sequencing state. Owns its
/// own lock so transport callbacks never need the registry's lock to make
/// progress; the registry lock is never held across a callback into
/// transport/user code.
pub struct ConnectionState {
    pub session_token: String,
    pub connection_id: String,
    pub nonce: String,
    reliable: Box<dyn Channel>,
    unreliable: Box<dyn Channel>,
    inner: Mutex<Mutable>,
    closed: AtomicBool,
    pub(crate) offer_ready: Notify,
}

impl ConnectionState {
    pub(crate) fn new(
        session_token: String,
        connection_id: String,
        nonce: String,
        reliable: Box<dyn Channel>,
        unreliable: Box<dyn Channel>,
    ) -> Self {
        Self {
            session_token,
            connection_id,
            nonce,
            reliable,
            unreliable,
            inner: Mutex::new(Mutable {
                phase: ConnectionPhase::Created,
                local_description: None,
                remote_description: None,
                local_candidates: Vec::new(),
                handshake_attempts: 0,
                identity: None,
                last_input_seq: None,
                pending_inputs: VecDeque::new(),
                invalid_input_count: 0,
                rate_limit_count: 0,
                snapshot_baseline: None,
                snapshot_seq: 0,
            }),
            closed: AtomicBool::new(false),
            offer_ready: Notify::new(),
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn phase(&self) -> ConnectionPhase {
        self.inner.lock().phase
    }

    #[must_use]
    pub fn identity(&self) -> Option<PlayerIdentity> {
        self.inner.lock().identity.clone()
    }

    #[must_use]
    pub fn handshake_complete(&self) -> bool {
        self.phase() == ConnectionPhase::Ready
    }

    /// Closes the connection. Idempotent and sticky: once set, every
    /// subsequent transport callback or store operation sees `closed`.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        let mut inner = self.inner.lock();
        inner.phase = ConnectionPhase::Closed;
        inner.pending_inputs.clear();
    }

    /// Called by the (stub) transport layer once ICE gathering produces a
    /// local description. Wakes anyone blocked in `SignalingStore::await_offer`.
    pub fn set_local_description(&self, sdp: String) {
        let mut inner = self.inner.lock();
        inner.local_description = Some(sdp);
        if inner.phase == ConnectionPhase::Created {
            inner.phase = ConnectionPhase::OfferSent;
        }
        drop(inner);
        self.offer_ready.notify_waiters();
    }

    #[must_use]
    pub fn local_description(&self) -> Option<String> {
        self.inner.lock().local_description.clone()
    }

    pub fn apply_answer(&self, sdp: String) {
        let mut inner = self.inner.lock();
        inner.remote_description = Some(sdp);
        if inner.phase == ConnectionPhase::OfferSent {
            inner.phase = ConnectionPhase::AnswerApplied;
        }
    }

    pub fn add_remote_candidate(&self, _candidate: &str, _mid: Option<&str>) {
        // Out of scope: a real ICE agent would feed this into its connectivity
        // checks. The stub only needs remote candidates to not error.
    }

    pub fn push_local_candidate(&self, candidate: IceCandidate) {
        self.inner.lock().local_candidates.push(candidate);
    }

    #[must_use]
    pub fn drain_local_candidates(&self) -> Vec<IceCandidate> {
        std::mem::take(&mut self.inner.lock().local_candidates)
    }

    /// Marks both data channels open, ready for a `ClientHello`.
    pub fn mark_channel_open(&self) {
        let mut inner = self.inner.lock();
        if matches!(
            inner.phase,
            ConnectionPhase::AnswerApplied | ConnectionPhase::OfferSent
        ) {
            inner.phase = ConnectionPhase::ChannelOpen;
        }
    }

    /// Validates and applies a `ClientHello`. On success advances to `Ready`
    /// and returns the normalized identity; on failure increments the
    /// attempt counter and closes the connection once attempts are
    /// exhausted.
    pub fn apply_client_hello(
        &self,
        protocol_version: u32,
        session_token: &str,
        connection_id: &str,
        nickname: Option<&str>,
        character_id: Option<&str>,
        character_allowlist: &[String],
        config: &SignalingConfig,
    ) -> Result<PlayerIdentity, InputRejection> {
        let mut inner = self.inner.lock();
        if inner.phase == ConnectionPhase::Closed {
            return Err(InputRejection::BeforeHandshake);
        }
        inner.phase = ConnectionPhase::HelloPending;

        let valid = protocol_version == afps_protocol::PROTOCOL_VERSION
            && session_token == self.session_token
            && connection_id == self.connection_id;

        if !valid {
            inner.handshake_attempts += 1;
            let exhausted = inner.handshake_attempts >= config.max_client_hello_attempts;
            drop(inner);
            if exhausted {
                self.close();
            }
            return Err(if protocol_version != afps_protocol::PROTOCOL_VERSION {
                InputRejection::ProtocolMismatch
            } else {
                InputRejection::IdMismatch
            });
        }

        let identity = PlayerIdentity {
            nickname: normalize_nickname(nickname, connection_id),
            character_id: normalize_character_id(character_id, character_allowlist),
        };
        inner.identity = Some(identity.clone());
        inner.phase = ConnectionPhase::Ready;
        Ok(identity)
    }

    /// Applies an already-rate-limited, already-JSON-decoded `InputCmd`:
    /// validates field ranges and sequence monotonicity, then enqueues it
    /// (head-drop at `max_pending_inputs`) or counts it as invalid.
    pub fn accept_input(
        &self,
        cmd: InputCmd,
        config: &SignalingConfig,
    ) -> Result<(), InputRejection> {
        if !self.handshake_complete() {
            self.bump_invalid(config);
            return Err(InputRejection::BeforeHandshake);
        }
        if validate_input_cmd(&cmd).is_err() {
            self.bump_invalid(config);
            return Err(InputRejection::InvalidJson);
        }

        let mut inner = self.inner.lock();
        if inner.last_input_seq.is_some_and(|last| cmd.input_seq <= last) {
            drop(inner);
            self.bump_invalid(config);
            return Err(InputRejection::StaleSequence);
        }
        inner.last_input_seq = Some(cmd.input_seq);
        if inner.pending_inputs.len() >= config.max_pending_inputs {
            inner.pending_inputs.pop_front();
        }
        inner.pending_inputs.push_back(cmd);
        Ok(())
    }

    /// Records a rate-limit denial, closing the connection once
    /// `max_rate_limit_drops` is exceeded.
    pub fn record_rate_limited(&self, config: &SignalingConfig) {
        let exceeded = {
            let mut inner = self.inner.lock();
            inner.rate_limit_count += 1;
            inner.rate_limit_count > config.max_rate_limit_drops
        };
        if exceeded {
            self.close();
        }
    }

    fn bump_invalid(&self, config: &SignalingConfig) {
        let exceeded = {
            let mut inner = self.inner.lock();
            inner.invalid_input_count += 1;
            inner.invalid_input_count > config.max_invalid_inputs
        };
        if exceeded {
            self.close();
        }
    }

    /// Atomically swaps the pending-input queue for an empty one, returning
    /// everything accepted since the last drain.
    #[must_use]
    pub fn drain_inputs(&self) -> Vec<InputCmd> {
        let mut inner = self.inner.lock();
        std::mem::take(&mut inner.pending_inputs).into()
    }

    #[must_use]
    pub fn snapshot_baseline(&self) -> Option<StateSnapshot> {
        self.inner.lock().snapshot_baseline
    }

    pub fn set_snapshot_baseline(&self, snapshot: StateSnapshot) {
        self.inner.lock().snapshot_baseline = Some(snapshot);
    }

    /// Returns the current snapshot sequence index and increments it.
    pub fn next_snapshot_seq(&self) -> u64 {
        let mut inner = self.inner.lock();
        let seq = inner.snapshot_seq;
        inner.snapshot_seq += 1;
        seq
    }

    pub fn send_reliable(&self, bytes: Bytes) -> Result<(), crate::channel::SendError> {
        self.reliable.send(bytes)
    }

    pub fn send_unreliable(&self, bytes: Bytes) -> Result<(), crate::channel::SendError> {
        self.unreliable.send(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::InProcessChannel;

    fn new_connection() -> ConnectionState {
        let (reliable, _rx1) = InProcessChannel::pair();
        let (unreliable, _rx2) = InProcessChannel::pair();
        ConnectionState::new(
            "tok".to_owned(),
            "conn".to_owned(),
            "nonce".to_owned(),
            Box::new(reliable),
            Box::new(unreliable),
        )
    }

    #[test]
    fn handshake_succeeds_with_matching_ids() {
        let conn = new_connection();
        let config = SignalingConfig::default();
        let identity = conn
            .apply_client_hello(
                afps_protocol::PROTOCOL_VERSION,
                "tok",
                "conn",
                Some("Nick"),
                None,
                &[],
                &config,
            )
            .unwrap();
        assert_eq!(identity.nickname, "Nick");
        assert!(conn.handshake_complete());
    }

    #[test]
    fn three_bad_hellos_close_the_connection() {
        let conn = new_connection();
        let config = SignalingConfig::default();
        for _ in 0..3 {
            let _ = conn.apply_client_hello(
                afps_protocol::PROTOCOL_VERSION,
                "wrong-token",
                "conn",
                None,
                None,
                &[],
                &config,
            );
        }
        assert!(conn.is_closed());
        assert!(!conn.handshake_complete());
        let result = conn.apply_client_hello(
            afps_protocol::PROTOCOL_VERSION,
            "tok",
            "conn",
            None,
            None,
            &[],
            &config,
        );
        assert!(result.is_err());
    }

    #[test]
    fn input_before_handshake_is_rejected() {
        let conn = new_connection();
        let config = SignalingConfig::default();
        let cmd = InputCmd {
            input_seq: 1,
            move_x: 0.0,
            move_y: 0.0,
            look_delta_x: 0.0,
            look_delta_y: 0.0,
            view_yaw: None,
            view_pitch: None,
            weapon_slot: None,
            jump: false,
            fire: false,
            sprint: false,
            dash: None,
            grapple: None,
            shield: None,
            shockwave: None,
        };
        assert_eq!(
            conn.accept_input(cmd, &config),
            Err(InputRejection::BeforeHandshake)
        );
    }

    #[test]
    fn stale_sequence_is_rejected() {
        let conn = new_connection();
        let config = SignalingConfig::default();
        conn.apply_client_hello(
            afps_protocol::PROTOCOL_VERSION,
            "tok",
            "conn",
            None,
            None,
            &[],
            &config,
        )
        .unwrap();
        let mut cmd = InputCmd {
            input_seq: 5,
            move_x: 0.0,
            move_y: 0.0,
            look_delta_x: 0.0,
            look_delta_y: 0.0,
            view_yaw: None,
            view_pitch: None,
            weapon_slot: None,
            jump: false,
            fire: false,
            sprint: false,
            dash: None,
            grapple: None,
            shield: None,
            shockwave: None,
        };
        assert!(conn.accept_input(cmd, &config).is_ok());
        cmd.input_seq = 5;
        assert_eq!(
            conn.accept_input(cmd, &config),
            Err(InputRejection::StaleSequence)
        );
    }

    #[test]
    fn a_duplicate_zero_sequence_is_rejected() {
        let conn = new_connection();
        let config = SignalingConfig::default();
        conn.apply_client_hello(
            afps_protocol::PROTOCOL_VERSION,
            "tok",
            "conn",
            None,
            None,
            &[],
            &config,
        )
        .unwrap();
        let cmd = InputCmd {
            input_seq: 0,
            move_x: 0.0,
            move_y: 0.0,
            look_delta_x: 0.0,
            look_delta_y: 0.0,
            view_yaw: None,
            view_pitch: None,
            weapon_slot: None,
            jump: false,
            fire: false,
            sprint: false,
            dash: None,
            grapple: None,
            shield: None,
            shockwave: None,
        };
        assert!(conn.accept_input(cmd.clone(), &config).is_ok());
        assert_eq!(
            conn.accept_input(cmd, &config),
            Err(InputRejection::StaleSequence)
        );
    }

    #[test]
    fn pending_inputs_head_drop_at_capacity() {
        let conn = new_connection();
        let mut config = SignalingConfig::default();
        config.max_pending_inputs = 2;
        conn.apply_client_hello(
            afps_protocol::PROTOCOL_VERSION,
            "tok",
            "conn",
            None,
            None,
            &[],
            &config,
        )
        .unwrap();
        for seq in 1..=3u64 {
            let cmd = InputCmd {
                input_seq: seq,
                move_x: 0.0,
                move_y: 0.0,
                look_delta_x: 0.0,
                look_delta_y: 0.0,
                view_yaw: None,
                view_pitch: None,
                weapon_slot: None,
                jump: false,
                fire: false,
                sprint: false,
                dash: None,
                grapple: None,
                shield: None,
                shockwave: None,
            };
            conn.accept_input(cmd, &config).unwrap();
        }
        let drained = conn.drain_inputs();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].input_seq, 2);
        assert_eq!(drained[1].input_seq, 3);
    }
}
