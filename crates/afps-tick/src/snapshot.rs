use afps_geometry::Vec3;
use afps_protocol::{ServerMessage, SnapshotFieldMask, StateSnapshot, StateSnapshotDelta};
use afps_signaling::ConnectionState;

/// The subset of a player's state the snapshot pipeline cares about,
/// gathered by the tick loop from `PlayerState`/`CombatState`/
/// `PlayerWeaponState` before encoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapshotFields {
    pub position: Vec3,
    pub velocity: Vec3,
    pub dash_cooldown: f64,
    pub health: f64,
    pub kills: u32,
    pub deaths: u32,
    pub weapon_slot: u32,
}

/// Produces the next snapshot frame for one connection: a full
/// `StateSnapshot` if there is no baseline yet or the sequence index is a
/// multiple of `keyframe_interval` (`0` disables deltas entirely), a
/// `StateSnapshotDelta` against the last keyframe otherwise. Updates the
/// connection's baseline and sequence counter as a side effect.
#[must_use]
pub fn encode_snapshot(
    conn: &ConnectionState,
    server_tick: u64,
    last_processed_input_seq: u64,
    client_id: &str,
    fields: SnapshotFields,
    keyframe_interval: u32,
) -> ServerMessage {
    let seq = conn.next_snapshot_seq();
    let full = StateSnapshot {
        server_tick,
        last_processed_input_seq,
        client_id: Some(client_id.to_owned()),
        pos_x: fields.position.x,
        pos_y: fields.position.y,
        pos_z: fields.position.z,
        vel_x: fields.velocity.x,
        vel_y: fields.velocity.y,
        vel_z: fields.velocity.z,
        weapon_slot: fields.weapon_slot,
        dash_cooldown: fields.dash_cooldown,
        health: fields.health,
        kills: fields.kills,
        deaths: fields.deaths,
    };

    let baseline = conn.snapshot_baseline();
    let is_keyframe =
        baseline.is_none() || (keyframe_interval != 0 && seq % u64::from(keyframe_interval) == 0);

    if is_keyframe {
        conn.set_snapshot_baseline(full);
        return ServerMessage::StateSnapshot(full);
    }

    let base = baseline.expect("checked by is_keyframe above");
    let mut mask = 0u32;
    let mut delta = StateSnapshotDelta {
        server_tick,
        base_tick: base.server_tick,
        last_processed_input_seq,
        mask: 0,
        pos_x: None,
        pos_y: None,
        pos_z: None,
        vel_x: None,
        vel_y: None,
        vel_z: None,
        dash_cooldown: None,
        health: None,
        kills: None,
        deaths: None,
        weapon_slot: None,
    };

    if full.pos_x != base.pos_x {
        mask |= SnapshotFieldMask::PosX.bit();
        delta.pos_x = Some(full.pos_x);
    }
    if full.pos_y != base.pos_y {
        mask |= SnapshotFieldMask::PosY.bit();
        delta.pos_y = Some(full.pos_y);
    }
    if full.pos_z != base.pos_z {
        mask |= SnapshotFieldMask::PosZ.bit();
        delta.pos_z = Some(full.pos_z);
    }
    if full.vel_x != base.vel_x {
        mask |= SnapshotFieldMask::VelX.bit();
        delta.vel_x = Some(full.vel_x);
    }
    if full.vel_y != base.vel_y {
        mask |= SnapshotFieldMask::VelY.bit();
        delta.vel_y = Some(full.vel_y);
    }
    if full.vel_z != base.vel_z {
        mask |= SnapshotFieldMask::VelZ.bit();
        delta.vel_z = Some(full.vel_z);
    }
    if full.dash_cooldown != base.dash_cooldown {
        mask |= SnapshotFieldMask::DashCooldown.bit();
        delta.dash_cooldown = Some(full.dash_cooldown);
    }
    if full.health != base.health {
        mask |= SnapshotFieldMask::Health.bit();
        delta.health = Some(full.health);
    }
    if full.kills != base.kills {
        mask |= SnapshotFieldMask::Kills.bit();
        delta.kills = Some(full.kills);
    }
    if full.deaths != base.deaths {
        mask |= SnapshotFieldMask::Deaths.bit();
        delta.deaths = Some(full.deaths);
    }
    if full.weapon_slot != base.weapon_slot {
        mask |= SnapshotFieldMask::WeaponSlot.bit();
        delta.weapon_slot = Some(full.weapon_slot);
    }
    delta.mask = mask;

    ServerMessage::StateSnapshotDelta(delta)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use afps_signaling::{Channel, InProcessChannel, SignalingConfig, SignalingStore};

    use super::*;

    fn connection() -> Arc<ConnectionState> {
        let store = SignalingStore::new(SignalingConfig::default(), Vec::new());
        let (token, _info) = store.create_session(0.0);
        let (reliable, _rx1) = InProcessChannel::pair();
        let (unreliable, _rx2) = InProcessChannel::pair();
        let reliable: Box<dyn Channel> = Box::new(reliable);
        let unreliable: Box<dyn Channel> = Box::new(unreliable);
        store
            .create_connection(&token, reliable, unreliable, 0.0)
            .unwrap()
    }

    fn fields(x: f64) -> SnapshotFields {
        SnapshotFields {
            position: Vec3::new(x, 0.0, 0.0),
            velocity: Vec3::ZERO,
            dash_cooldown: 0.0,
            health: 100.0,
            kills: 0,
            deaths: 0,
            weapon_slot: 0,
        }
    }

    #[test]
    fn first_snapshot_is_always_a_keyframe() {
        let conn = connection();
        let message = encode_snapshot(&conn, 1, 0, "conn", fields(0.0), 5);
        assert!(matches!(message, ServerMessage::StateSnapshot(_)));
    }

    #[test]
    fn unchanged_fields_produce_an_empty_mask_delta() {
        let conn = connection();
        encode_snapshot(&conn, 1, 0, "conn", fields(0.0), 0);
        let message = encode_snapshot(&conn, 2, 0, "conn", fields(0.0), 0);
        match message {
            ServerMessage::StateSnapshotDelta(delta) => assert_eq!(delta.mask, 0),
            other => panic!("expected a delta, got {other:?}"),
        }
    }

    #[test]
    fn negative_and_positive_zero_are_unchanged() {
        let conn = connection();
        encode_snapshot(&conn, 1, 0, "conn", fields(0.0), 0);
        let mut moved = fields(0.0);
        moved.position.x = -0.0;
        let message = encode_snapshot(&conn, 2, 0, "conn", moved, 0);
        match message {
            ServerMessage::StateSnapshotDelta(delta) => assert_eq!(delta.mask, 0),
            other => panic!("expected a delta, got {other:?}"),
        }
    }

    #[test]
    fn keyframe_interval_forces_periodic_full_frames() {
        let conn = connection();
        let mut keyframes = 0;
        for i in 0..25 {
            let message = encode_snapshot(&conn, i, 0, "conn", fields(f64::from(i)), 5);
            if matches!(message, ServerMessage::StateSnapshot(_)) {
                keyframes += 1;
            }
        }
        assert_eq!(keyframes, 5);
    }

    #[test]
    fn changed_position_sets_only_the_corresponding_bit() {
        let conn = connection();
        encode_snapshot(&conn, 1, 0, "conn", fields(0.0), 0);
        let message = encode_snapshot(&conn, 2, 0, "conn", fields(1.0), 0);
        match message {
            ServerMessage::StateSnapshotDelta(delta) => {
                assert_eq!(delta.mask, SnapshotFieldMask::PosX.bit());
                assert_eq!(delta.pos_x, Some(1.0));
                assert_eq!(delta.pos_y, None);
            }
            other => panic!("expected a delta, got {other:?}"),
        }
    }
}
