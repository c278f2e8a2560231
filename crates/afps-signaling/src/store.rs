use std::{sync::Arc, time::Duration};

use afps_protocol::{ClientMessage, Ping};
use afps_ratelimit::RateLimiter;
use papaya::HashMap as PapayaMap;
use rustc_hash::FxBuildHasher;

use crate::{
    channel::Channel,
    config::SignalingConfig,
    connection::{ConnectionState, InputRejection, PlayerIdentity},
    error::SignalingError,
    session::{random_token, SessionInfo},
};

/// The result of dispatching a decoded message from a connection's
/// unreliable channel, post-handshake.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DispatchOutcome {
    InputAccepted,
    Pong { client_time_ms: u64 },
}

/// Session issuance, connection lifecycle, the handshake state machine, and
/// message dispatch into the tick loop's input queues. Backed by `papaya`
/// concurrent maps keyed by opaque token. Membership (insert/remove) goes
/// through the map; mutation of an individual connection's fields goes
/// through that connection's own lock.
pub struct SignalingStore {
    config: SignalingConfig,
    character_allowlist: Vec<String>,
    sessions: PapayaMap<String, SessionInfo, FxBuildHasher>,
    connections: PapayaMap<String, Arc<ConnectionState>, FxBuildHasher>,
    input_limiter: RateLimiter<String>,
}

impl SignalingStore {
    #[must_use]
    pub fn new(config: SignalingConfig, character_allowlist: Vec<String>) -> Self {
        let input_limiter =
            RateLimiter::new(config.input_max_tokens, config.input_refill_per_second);
        Self {
            config,
            character_allowlist,
            sessions: PapayaMap::default(),
            connections: PapayaMap::default(),
            input_limiter,
        }
    }

    /// Lazily prunes sessions (and their connections) whose expiry has
    /// passed, before any mutating lookup.
    fn prune_sessions(&self, now: f64) {
        let sessions = self.sessions.pin();
        let expired: Vec<String> = sessions
            .iter()
            .filter(|(_, info)| now >= info.expires_at)
            .map(|(token, _)| token.clone())
            .collect();
        if expired.is_empty() {
            return;
        }
        for token in &expired {
            sessions.remove(token);
        }
        let connections = self.connections.pin();
        let dead: Vec<String> = connections
            .iter()
            .filter(|(_, conn)| expired.contains(&conn.session_token))
            .map(|(id, _)| id.clone())
            .collect();
        for id in dead {
            if let Some(conn) = connections.get(&id) {
                conn.close();
            }
            connections.remove(&id);
        }
    }

    /// Issues a new session, returning its bearer token and expiry.
    pub fn create_session(&self, now: f64) -> (String, SessionInfo) {
        self.prune_sessions(now);
        let token = random_token();
        let info = SessionInfo {
            expires_at: now + self.config.session_ttl_seconds,
        };
        self.sessions.pin().insert(token.clone(), info);
        (token, info)
    }

    fn validate_session(&self, session_token: &str, now: f64) -> Result<(), SignalingError> {
        self.prune_sessions(now);
        match self.sessions.pin().get(session_token) {
            Some(info) if now < info.expires_at => Ok(()),
            Some(_) => Err(SignalingError::SessionExpired),
            None => Err(SignalingError::SessionNotFound),
        }
    }

    /// Creates a connection under `session_token`, wiring up the two data
    /// channels. Does not block; callers that need the local description
    /// should follow up with `await_offer`.
    pub fn create_connection(
        &self,
        session_token: &str,
        reliable: Box<dyn Channel>,
        unreliable: Box<dyn Channel>,
        now: f64,
    ) -> Result<Arc<ConnectionState>, SignalingError> {
        self.validate_session(session_token, now)?;
        let connection_id = random_token();
        let nonce = random_token();
        let connection = Arc::new(ConnectionState::new(
            session_token.to_owned(),
            connection_id.clone(),
            nonce,
            reliable,
            unreliable,
        ));
        self.connections
            .pin()
            .insert(connection_id, connection.clone());
        Ok(connection)
    }

    /// Blocks up to `wait` for the connection's local description to
    /// become ready, dropping the connection and returning `OfferTimeout`
    /// on expiry.
    pub async fn await_offer(
        &self,
        connection: &Arc<ConnectionState>,
        wait: Duration,
    ) -> Result<String, SignalingError> {
        if let Some(sdp) = connection.local_description() {
            return Ok(sdp);
        }
        let notified = connection.offer_ready.notified();
        match tokio::time::timeout(wait, notified).await {
            Ok(()) => connection
                .local_description()
                .ok_or(SignalingError::OfferTimeout),
            Err(_) => {
                self.connections.pin().remove(&connection.connection_id);
                connection.close();
                Err(SignalingError::OfferTimeout)
            }
        }
    }

    #[must_use]
    pub fn get_connection(&self, connection_id: &str) -> Option<Arc<ConnectionState>> {
        self.connections.pin().get(connection_id).cloned()
    }

    pub fn apply_answer(
        &self,
        connection_id: &str,
        sdp: String,
    ) -> Result<(), SignalingError> {
        let conn = self
            .get_connection(connection_id)
            .ok_or(SignalingError::ConnectionNotFound)?;
        conn.apply_answer(sdp);
        conn.mark_channel_open();
        Ok(())
    }

    pub fn add_remote_candidate(
        &self,
        connection_id: &str,
        candidate: &str,
        mid: Option<&str>,
    ) -> Result<(), SignalingError> {
        let conn = self
            .get_connection(connection_id)
            .ok_or(SignalingError::ConnectionNotFound)?;
        conn.add_remote_candidate(candidate, mid);
        Ok(())
    }

    /// Validates and applies a `ClientHello`, returning the normalized
    /// identity on success. Broadcasting the new `PlayerProfile` and
    /// replaying existing profiles is the caller's job (it needs access to
    /// the protocol encoder, which this crate does not depend on).
    pub fn apply_client_hello(
        &self,
        connection_id: &str,
        protocol_version: u32,
        session_token: &str,
        nickname: Option<&str>,
        character_id: Option<&str>,
    ) -> Result<PlayerIdentity, InputRejection> {
        let Some(conn) = self.get_connection(connection_id) else {
            return Err(InputRejection::IdMismatch);
        };
        conn.apply_client_hello(
            protocol_version,
            session_token,
            connection_id,
            nickname,
            character_id,
            &self.character_allowlist,
            &self.config,
        )
    }

    /// Dispatches a decoded client message from `connection_id`'s
    /// unreliable channel, applying the per-connection rate limit first.
    pub fn dispatch_client_message(
        &self,
        connection_id: &str,
        message: ClientMessage,
        now: f64,
    ) -> Result<DispatchOutcome, InputRejection> {
        let Some(conn) = self.get_connection(connection_id) else {
            return Err(InputRejection::IdMismatch);
        };
        if !self
            .input_limiter
            .allow(connection_id.to_owned(), now)
        {
            conn.record_rate_limited(&self.config);
            return Err(InputRejection::RateLimited);
        }
        match message {
            ClientMessage::InputCmd(cmd) => {
                conn.accept_input(cmd, &self.config)?;
                Ok(DispatchOutcome::InputAccepted)
            }
            ClientMessage::Ping(Ping { client_time_ms }) => {
                Ok(DispatchOutcome::Pong { client_time_ms })
            }
            ClientMessage::ClientHello(_) => Err(InputRejection::BeforeHandshake),
        }
    }

    /// Every connection with a completed handshake that hasn't been closed.
    #[must_use]
    pub fn ready_connection_ids(&self) -> Vec<String> {
        self.connections
            .pin()
            .iter()
            .filter(|(_, conn)| conn.handshake_complete() && !conn.is_closed())
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Drains every connection's pending-input queue in one pass. Connections
    /// that never accepted an input this tick are simply absent.
    #[must_use]
    pub fn drain_all_inputs(&self) -> Vec<(String, Vec<afps_protocol::InputCmd>)> {
        self.connections
            .pin()
            .iter()
            .filter_map(|(id, conn)| {
                let drained = conn.drain_inputs();
                if drained.is_empty() {
                    None
                } else {
                    Some((id.clone(), drained))
                }
            })
            .collect()
    }

    pub fn remove_connection(&self, connection_id: &str) {
        if let Some(conn) = self.connections.pin().get(connection_id) {
            conn.close();
        }
        self.connections.pin().remove(connection_id);
        self.input_limiter.remove(&connection_id.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::InProcessChannel;

    fn store() -> SignalingStore {
        SignalingStore::new(SignalingConfig::default(), Vec::new())
    }

    fn channels() -> (Box<dyn Channel>, Box<dyn Channel>) {
        let (reliable, _rx1) = InProcessChannel::pair();
        let (unreliable, _rx2) = InProcessChannel::pair();
        (Box::new(reliable), Box::new(unreliable))
    }

    #[test]
    fn unknown_session_is_rejected() {
        let store = store();
        let (r, u) = channels();
        let result = store.create_connection("nope", r, u, 0.0);
        assert!(matches!(result, Err(SignalingError::SessionNotFound)));
    }

    #[test]
    fn expired_session_is_pruned_lazily() {
        let store = store();
        let (token, _info) = store.create_session(0.0);
        let (r, u) = channels();
        let far_future = 10_000.0;
        let result = store.create_connection(&token, r, u, far_future);
        assert!(matches!(result, Err(SignalingError::SessionNotFound)));
    }

    #[test]
    fn full_handshake_reaches_ready() {
        let store = store();
        let (token, _info) = store.create_session(0.0);
        let (r, u) = channels();
        let conn = store.create_connection(&token, r, u, 0.0).unwrap();
        conn.set_local_description("offer-sdp".to_owned());
        conn.apply_answer("answer-sdp".to_owned());
        conn.mark_channel_open();

        let identity = store
            .apply_client_hello(
                &conn.connection_id,
                afps_protocol::PROTOCOL_VERSION,
                &token,
                Some("Nick"),
                None,
            )
            .unwrap();
        assert_eq!(identity.nickname, "Nick");
        assert_eq!(store.ready_connection_ids(), vec![conn.connection_id.clone()]);
    }

    #[tokio::test]
    async fn await_offer_times_out_and_drops_the_connection() {
        let store = store();
        let (token, _info) = store.create_session(0.0);
        let (r, u) = channels();
        let conn = store.create_connection(&token, r, u, 0.0).unwrap();
        let result = store.await_offer(&conn, Duration::from_millis(10)).await;
        assert!(matches!(result, Err(SignalingError::OfferTimeout)));
        assert!(conn.is_closed());
        assert!(store.get_connection(&conn.connection_id).is_none());
    }

    #[test]
    fn rate_limited_input_is_dropped() {
        let store = SignalingStore::new(
            SignalingConfig {
                input_max_tokens: 1,
                input_refill_per_second: 0.0,
                ..SignalingConfig::default()
            },
            Vec::new(),
        );
        let (token, _info) = store.create_session(0.0);
        let (r, u) = channels();
        let conn = store.create_connection(&token, r, u, 0.0).unwrap();
        conn.set_local_description("offer".to_owned());
        conn.apply_answer("answer".to_owned());
        conn.mark_channel_open();
        store
            .apply_client_hello(
                &conn.connection_id,
                afps_protocol::PROTOCOL_VERSION,
                &token,
                None,
                None,
            )
            .unwrap();

        let ping = ClientMessage::Ping(Ping { client_time_ms: 1 });
        assert!(store
            .dispatch_client_message(&conn.connection_id, ping.clone(), 0.0)
            .is_ok());
        assert_eq!(
            store.dispatch_client_message(&conn.connection_id, ping, 0.0),
            Err(InputRejection::RateLimited)
        );
    }
}
