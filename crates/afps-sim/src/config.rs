use serde::{Deserialize, Serialize};

/// Tunables for [`crate::step_player`]. Every field is a plain `f64` so the
/// whole struct can be loaded from the layered config file without any unit
/// conversion at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub move_speed: f64,
    pub sprint_multiplier: f64,
    pub accel: f64,
    pub friction: f64,
    pub gravity: f64,
    pub jump_velocity: f64,
    pub dash_impulse: f64,
    pub dash_cooldown: f64,
    pub grapple_max_distance: f64,
    pub grapple_pull_strength: f64,
    pub grapple_damping: f64,
    pub grapple_cooldown: f64,
    /// Minimum z-component a surface normal must have for a grapple to
    /// attach to it (keeps players from grappling onto near-vertical
    /// walls). Named `normal_y` in the original source, which used a
    /// y-up convention; this port is z-up throughout, so the same
    /// constant gates the normal's z component instead. See DESIGN.md.
    pub grapple_min_attach_normal_z: f64,
    pub grapple_rope_slack: f64,
    pub shield_duration: f64,
    pub shield_cooldown: f64,
    pub shield_damage_multiplier: f64,
    pub shockwave_radius: f64,
    pub shockwave_impulse: f64,
    pub shockwave_cooldown: f64,
    pub shockwave_damage: f64,
    pub arena_half_size: f64,
    pub player_radius: f64,
    pub player_height: f64,
    pub obstacle_min_x: f64,
    pub obstacle_max_x: f64,
    pub obstacle_min_y: f64,
    pub obstacle_max_y: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            sprint_multiplier: 1.5,
            accel: 50.0,
            friction: 8.0,
            gravity: 30.0,
            jump_velocity: 7.5,
            dash_impulse: 12.0,
            dash_cooldown: 0.5,
            grapple_max_distance: 20.0,
            grapple_pull_strength: 25.0,
            grapple_damping: 4.0,
            grapple_cooldown: 1.0,
            grapple_min_attach_normal_z: 0.2,
            grapple_rope_slack: 0.5,
            shield_duration: 2.0,
            shield_cooldown: 5.0,
            shield_damage_multiplier: 0.4,
            shockwave_radius: 6.0,
            shockwave_impulse: 10.0,
            shockwave_cooldown: 6.0,
            shockwave_damage: 10.0,
            arena_half_size: 30.0,
            player_radius: 0.5,
            player_height: 1.7,
            obstacle_min_x: 0.0,
            obstacle_max_x: 0.0,
            obstacle_min_y: 0.0,
            obstacle_max_y: 0.0,
        }
    }
}

impl SimConfig {
    /// Eye height above the player's feet used for view-origin and grapple
    /// raycasts: the lesser of `player_height` and a fixed `1.6`, matching
    /// a crouched or short hitbox never placing the eye above its own head.
    #[must_use]
    pub fn eye_height(&self) -> f64 {
        self.player_height.min(1.6)
    }
}
