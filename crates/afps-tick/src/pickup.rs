use afps_geometry::Vec3;
use serde::{Deserialize, Serialize};

/// What a pickup grants on collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    Health,
    Ammo,
}

/// Static placement and effect of one world pickup. The on-disk loader for
/// arena layouts is out of scope; callers construct these directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupDefinition {
    pub kind: PickupKind,
    pub position: Vec3,
    pub radius: f64,
    pub respawn_seconds: f64,
    pub health_amount: f64,
    pub ammo_slot: usize,
    pub ammo_amount: u32,
}

/// A placed pickup's live state: active/collected and, while inactive, the
/// tick at which it reactivates.
#[derive(Debug, Clone)]
pub struct PickupState {
    pub definition: PickupDefinition,
    pub active: bool,
    pub respawn_tick: Option<u64>,
}

impl PickupState {
    #[must_use]
    pub fn new(definition: PickupDefinition) -> Self {
        Self {
            definition,
            active: true,
            respawn_tick: None,
        }
    }

    /// Marks this pickup collected, scheduling reactivation `respawn_seconds`
    /// (converted to ticks at `tick_rate`) after `current_tick`.
    pub fn deactivate(&mut self, current_tick: u64, tick_rate: u32) {
        self.active = false;
        let delay_ticks = (self.definition.respawn_seconds * f64::from(tick_rate)).round() as u64;
        self.respawn_tick = Some(current_tick + delay_ticks.max(1));
    }

    /// Reactivates this pickup if its countdown has elapsed.
    pub fn maybe_reactivate(&mut self, current_tick: u64) {
        if !self.active {
            if let Some(at) = self.respawn_tick {
                if current_tick >= at {
                    self.active = true;
                    self.respawn_tick = None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn health_pickup() -> PickupDefinition {
        PickupDefinition {
            kind: PickupKind::Health,
            position: Vec3::ZERO,
            radius: 1.0,
            respawn_seconds: 2.0,
            health_amount: 25.0,
            ammo_slot: 0,
            ammo_amount: 0,
        }
    }

    #[test]
    fn deactivate_schedules_reactivation_in_ticks() {
        let mut pickup = PickupState::new(health_pickup());
        pickup.deactivate(100, 60);
        assert!(!pickup.active);
        assert_eq!(pickup.respawn_tick, Some(100 + 120));
    }

    #[test]
    fn reactivates_once_countdown_elapses() {
        let mut pickup = PickupState::new(health_pickup());
        pickup.deactivate(0, 60);
        pickup.maybe_reactivate(119);
        assert!(!pickup.active);
        pickup.maybe_reactivate(120);
        assert!(pickup.active);
        assert!(pickup.respawn_tick.is_none());
    }

    #[test]
    fn reactivate_is_a_no_op_while_already_active() {
        let mut pickup = PickupState::new(health_pickup());
        pickup.maybe_reactivate(50);
        assert!(pickup.active);
    }
}
