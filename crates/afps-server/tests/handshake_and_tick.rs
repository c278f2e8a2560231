//! Exercises a full handshake against an in-process channel pair and a few
//! tick-loop steps, asserting that a `StateSnapshot` eventually reaches the
//! connection's unreliable channel with the expected `client_id` and a
//! strictly increasing `server_tick`.

use std::sync::Arc;

use afps_config::ServerConfig;
use afps_protocol::{decode_server_message, ServerMessage};
use afps_signaling::{Channel, InProcessChannel, SignalingStore};
use afps_tick::TickLoop;

#[test]
fn handshake_then_ticks_produce_a_snapshot() {
    let config = ServerConfig::default();
    let store = Arc::new(SignalingStore::new(
        config.signaling,
        config.character_allowlist.clone(),
    ));

    let (token, _info) = store.create_session(0.0);

    let (reliable, _reliable_rx) = InProcessChannel::pair();
    let (unreliable, unreliable_rx) = InProcessChannel::pair();
    let connection = store
        .create_connection(
            &token,
            Box::new(reliable) as Box<dyn Channel>,
            Box::new(unreliable) as Box<dyn Channel>,
            0.0,
        )
        .unwrap();

    connection.set_local_description(format!("offer:{}", connection.connection_id));
    connection.apply_answer("answer-sdp".to_owned());
    connection.mark_channel_open();

    let identity = store
        .apply_client_hello(
            &connection.connection_id,
            afps_protocol::PROTOCOL_VERSION,
            &token,
            Some("Nick"),
            None,
        )
        .unwrap();
    assert_eq!(identity.nickname, "Nick");
    assert_eq!(
        store.ready_connection_ids(),
        vec![connection.connection_id.clone()]
    );

    let mut tick_loop = TickLoop::new(
        config.sim,
        config.weapons.clone(),
        None,
        config.transport.tick_rate,
        config.transport.snapshot_rate,
        config.transport.snapshot_keyframe_interval,
        config.transport.rewind_ticks,
        config.pickups.clone(),
    );

    let dt = 1.0 / f64::from(config.transport.tick_rate);
    let mut last_tick_seen = 0u64;
    let mut snapshots_seen = 0;
    for step in 0..10 {
        let now = f64::from(step) * dt;
        tick_loop.step(&store, dt, now);

        while let Ok(Some(bytes)) = unreliable_rx.try_recv() {
            let message = decode_server_message(&bytes).unwrap();
            if let ServerMessage::StateSnapshot(snapshot) = message {
                assert_eq!(snapshot.client_id.as_deref(), Some(connection.connection_id.as_str()));
                assert!(snapshot.server_tick >= last_tick_seen);
                last_tick_seen = snapshot.server_tick;
                snapshots_seen += 1;
            }
        }
    }

    assert!(snapshots_seen > 0, "expected at least one snapshot to be emitted");
}
