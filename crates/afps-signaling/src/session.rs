use rand::RngCore;

/// An issued session: an opaque bearer token plus an absolute expiry.
/// Expired sessions are pruned lazily before every mutating lookup
/// (`SignalingStore::prune_sessions`), never proactively.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionInfo {
    pub expires_at: f64,
}

/// Generates an opaque, URL-safe token from 16 random bytes, hex-encoded
/// (32 hex chars). Used for both session tokens and connection ids.
pub(crate) fn random_token() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
