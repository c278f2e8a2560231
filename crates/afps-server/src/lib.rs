//! Wires the signaling store, the HTTP front door, and the dedicated tick
//! thread into one running server. The binary (`src/main.rs`) is a thin
//! CLI/startup wrapper around what's here so integration tests can drive
//! the same pieces directly.

pub mod error;
pub mod http;
pub mod runtime;

pub use error::AfpsError;
pub use http::{router, AppState};
pub use runtime::AsyncRuntime;

use std::{sync::Arc, thread, time::Duration};

use afps_config::ServerConfig;
use afps_signaling::SignalingStore;
use afps_tick::TickLoop;
use tracing::info;

/// Builds the [`SignalingStore`] and [`TickLoop`] from a loaded config and
/// spawns the tick loop on its own dedicated OS thread, which is the only
/// writer of simulation state and never blocks on I/O. Returns the
/// store (shared with the HTTP front door) and a handle to the thread.
pub fn spawn_tick_thread(
    config: &ServerConfig,
    store: Arc<SignalingStore>,
) -> thread::JoinHandle<()> {
    let tick_rate = config.transport.tick_rate;
    let snapshot_rate = config.transport.snapshot_rate;
    let keyframe_interval = config.transport.snapshot_keyframe_interval;
    let rewind_ticks = config.transport.rewind_ticks;
    let sim_config = config.sim;
    let weapon_config = config.weapons.clone();
    let pickups = config.pickups.clone();

    thread::Builder::new()
        .name("afps-tick".to_owned())
        .spawn(move || {
            let mut tick_loop = TickLoop::new(
                sim_config,
                weapon_config,
                None,
                tick_rate,
                snapshot_rate,
                keyframe_interval,
                rewind_ticks,
                pickups,
            );
            let tick_duration = Duration::from_secs_f64(1.0 / f64::from(tick_rate.max(1)));
            info!(tick_rate, "tick loop starting");
            loop {
                let started = std::time::Instant::now();
                let now = crate::http::now_unix_seconds();
                tick_loop.step(&store, tick_duration.as_secs_f64(), now);
                let elapsed = started.elapsed();
                if let Some(remaining) = tick_duration.checked_sub(elapsed) {
                    thread::sleep(remaining);
                }
            }
        })
        .expect("failed to spawn tick thread")
}
