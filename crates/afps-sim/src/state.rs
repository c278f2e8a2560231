use afps_geometry::Vec3;
use serde::{Deserialize, Serialize};

/// A latched grapple attachment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct GrappleState {
    pub active: bool,
    pub point: Vec3,
    pub normal: Vec3,
    pub length: f64,
}

/// The simulation-authoritative state of one player. Mutated only by
/// [`crate::step_player`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub position: Vec3,
    pub velocity: Vec3,
    pub grounded: bool,

    pub dash_cooldown: f64,
    pub grapple_cooldown: f64,
    pub shield_cooldown: f64,
    pub shockwave_cooldown: f64,
    pub shield_timer: f64,
    pub shield_active: bool,

    pub grapple: GrappleState,

    /// Edge-triggered button latches: true while the corresponding input
    /// button was held on the previous tick, used to detect press/release
    /// transitions rather than re-triggering every tick the button stays
    /// down.
    pub grapple_input_latched: bool,
    pub shield_input_latched: bool,
    pub shockwave_input_latched: bool,

    /// Set for exactly the tick the shockwave trigger fires; the tick
    /// loop reads and clears it when folding abilities into the combat
    /// resolver.
    pub shockwave_triggered: bool,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            grounded: false,
            dash_cooldown: 0.0,
            grapple_cooldown: 0.0,
            shield_cooldown: 0.0,
            shockwave_cooldown: 0.0,
            shield_timer: 0.0,
            shield_active: false,
            grapple: GrappleState::default(),
            grapple_input_latched: false,
            shield_input_latched: false,
            shockwave_input_latched: false,
            shockwave_triggered: false,
        }
    }
}

impl PlayerState {
    /// Spawns a fresh player at `position`, all timers and latches clear.
    #[must_use]
    pub fn spawn_at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}
