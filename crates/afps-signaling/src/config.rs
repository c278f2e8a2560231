use serde::{Deserialize, Serialize};

/// Tunables for session/connection lifecycle and input policing. Part of
/// the aggregate `ServerConfig` assembled by the config-loading crate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalingConfig {
    pub session_ttl_seconds: f64,
    pub offer_timeout_ms: u64,
    pub max_client_hello_attempts: u32,
    pub max_pending_inputs: usize,
    pub max_invalid_inputs: u32,
    pub max_rate_limit_drops: u32,
    pub input_max_tokens: u32,
    pub input_refill_per_second: f64,
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            session_ttl_seconds: 900.0,
            offer_timeout_ms: 5_000,
            max_client_hello_attempts: 3,
            max_pending_inputs: 128,
            max_invalid_inputs: 5,
            max_rate_limit_drops: 20,
            input_max_tokens: 30,
            input_refill_per_second: 20.0,
        }
    }
}
