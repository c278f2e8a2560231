use afps_geometry::Vec3;
use afps_tick::{PickupDefinition, PickupKind};

/// A small default pickup layout: two health packs and one ammo crate
/// per launcher slot, placed symmetrically around the arena center. The
/// on-disk arena/pickup layout loader named in the original source is
/// out of scope; this hardcoded table is what `ServerConfig::default`
/// ships so the tick loop has something to simulate against out of the
/// box.
#[must_use]
pub fn default_pickups() -> Vec<PickupDefinition> {
    vec![
        PickupDefinition {
            kind: PickupKind::Health,
            position: Vec3::new(10.0, 0.0, 0.0),
            radius: 1.0,
            respawn_seconds: 15.0,
            health_amount: 50.0,
            ammo_slot: 0,
            ammo_amount: 0,
        },
        PickupDefinition {
            kind: PickupKind::Health,
            position: Vec3::new(-10.0, 0.0, 0.0),
            radius: 1.0,
            respawn_seconds: 15.0,
            health_amount: 50.0,
            ammo_slot: 0,
            ammo_amount: 0,
        },
        PickupDefinition {
            kind: PickupKind::Ammo,
            position: Vec3::new(0.0, 10.0, 0.0),
            radius: 1.0,
            respawn_seconds: 20.0,
            health_amount: 0.0,
            ammo_slot: 2,
            ammo_amount: 4,
        },
    ]
}
