use serde::{Deserialize, Serialize};

/// Tick/snapshot cadence and channel naming. Mostly the protocol
/// constants from `afps_protocol`, kept as plain overridable fields (not
/// `const`s) so tests can run a faster tick rate without touching the
/// wire contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportConfig {
    pub tick_rate: u32,
    pub snapshot_rate: u32,
    pub snapshot_keyframe_interval: u32,
    /// How many ticks back a hitscan rewind is allowed to look, i.e. the
    /// `PoseHistory` depth each connection keeps.
    pub rewind_ticks: u64,
    /// Upper bound on catch-up ticks a single accumulator `advance` call
    /// may report, guarding against a spiral of death after a stall.
    pub tick_burst_cap: u32,
    pub reliable_channel_label: String,
    pub unreliable_channel_label: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tick_rate: afps_protocol::SERVER_TICK_RATE,
            snapshot_rate: afps_protocol::SNAPSHOT_RATE,
            snapshot_keyframe_interval: afps_protocol::SNAPSHOT_KEYFRAME_INTERVAL,
            rewind_ticks: afps_protocol::SERVER_TICK_RATE as u64 / 2,
            tick_burst_cap: 8,
            reliable_channel_label: afps_protocol::RELIABLE_CHANNEL_LABEL.to_owned(),
            unreliable_channel_label: afps_protocol::UNRELIABLE_CHANNEL_LABEL.to_owned(),
        }
    }
}
