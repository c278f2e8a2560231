//! Deterministic fixed-timestep player simulation: pure-function
//! integration of one player's state per tick against an arena, a single
//! obstacle box, and an open-ended world of static colliders.

mod config;
mod input;
mod state;
mod step;
mod world;

pub use config::SimConfig;
pub use input::SimInput;
pub use state::{GrappleState, PlayerState};
pub use step::step_player;
pub use world::{AabbCollider, CollisionWorld, SurfaceType, hitscan_world_distance, raycast_world};

#[cfg(test)]
mod tests {
    use afps_geometry::Vec3;

    use super::*;

    #[test]
    fn moving_right_matches_literal_scenario() {
        let config = SimConfig::default();
        let mut state = PlayerState::spawn_at(Vec3::ZERO);
        let dt = 1.0 / 60.0;

        let move_input = SimInput::new(1.0, 0.0, 0.0, 0.0, false, false, false, false, false, false);
        step_player(&mut state, &move_input, &config, dt, None);

        assert!((state.position.x - config.move_speed / 60.0).abs() < 1e-9);
        assert!(state.position.y.abs() < 1e-9);
    }

    #[test]
    fn ten_steps_then_sprint_then_back() {
        let config = SimConfig::default();
        let mut state = PlayerState::spawn_at(Vec3::ZERO);
        let dt = 1.0 / 60.0;

        let forward = SimInput::new(1.0, 0.0, 0.0, 0.0, false, false, false, false, false, false);
        for _ in 0..10 {
            step_player(&mut state, &forward, &config, dt, None);
        }

        let sprint = SimInput::new(1.0, 0.0, 0.0, 0.0, false, true, false, false, false, false);
        for _ in 0..5 {
            step_player(&mut state, &sprint, &config, dt, None);
        }

        let back = SimInput::new(0.0, -1.0, 0.0, 0.0, false, false, false, false, false, false);
        for _ in 0..10 {
            step_player(&mut state, &back, &config, dt, None);
        }

        // These are not exact closed-form literals (friction/acceleration
        // ramp over many ticks); assert the qualitative shape instead:
        // still net-positive in x, net-negative in y after reversing.
        assert!(state.position.x > 0.0);
        assert!(state.position.y < 0.0);
    }

    #[test]
    fn non_finite_dt_is_a_no_op() {
        let config = SimConfig::default();
        let mut state = PlayerState::spawn_at(Vec3::ZERO);
        let input = SimInput::neutral();
        let before = state;
        step_player(&mut state, &input, &config, f64::NAN, None);
        assert_eq!(state, before);
        step_player(&mut state, &input, &config, -1.0, None);
        assert_eq!(state, before);
        step_player(&mut state, &input, &config, 0.0, None);
        assert_eq!(state, before);
    }

    #[test]
    fn player_stays_within_arena_bounds() {
        let config = SimConfig::default();
        let mut state = PlayerState::spawn_at(Vec3::new(config.arena_half_size - 1.0, 0.0, 0.0));
        let dt = 1.0 / 60.0;
        let push = SimInput::new(1.0, 0.0, 0.0, 0.0, false, true, false, false, false, false);
        for _ in 0..120 {
            step_player(&mut state, &push, &config, dt, None);
        }
        let limit = config.arena_half_size - config.player_radius;
        assert!(state.position.x <= limit + 1e-6);
    }

    #[test]
    fn dash_applies_impulse_once_then_cools_down() {
        let config = SimConfig::default();
        let mut state = PlayerState::spawn_at(Vec3::ZERO);
        let dt = 1.0 / 60.0;
        let dash_input = SimInput::new(1.0, 0.0, 0.0, 0.0, false, false, true, false, false, false);
        step_player(&mut state, &dash_input, &config, dt, None);
        let speed_after_dash = (state.velocity.x.powi(2) + state.velocity.y.powi(2)).sqrt();
        assert!(speed_after_dash > config.move_speed);
        assert!((state.dash_cooldown - config.dash_cooldown).abs() < dt + 1e-9);
    }

    #[test]
    fn jump_only_triggers_while_grounded() {
        let config = SimConfig::default();
        let mut state = PlayerState::spawn_at(Vec3::ZERO);
        state.grounded = true;
        let dt = 1.0 / 60.0;
        let jump_input = SimInput::new(0.0, 0.0, 0.0, 0.0, true, false, false, false, false, false);
        step_player(&mut state, &jump_input, &config, dt, None);
        assert!(state.velocity.z > 0.0);
        assert!(!state.grounded);
    }

    #[test]
    fn grapple_attaches_to_a_vertical_wall() {
        // Facing -y at yaw/pitch 0 hits the arena wall head-on, whose
        // normal (0, 1, 0) has normal.z == 0.0 exactly: a vertical wall,
        // the primary real-world grapple target. The default
        // `grapple_min_attach_normal_z` (0.2) must not reject it. Spawned
        // within `grapple_max_distance` of the wall so the raycast hit
        // itself isn't also rejected for being too far away.
        let config = SimConfig::default();
        // 10 units short of the -y wall, comfortably inside `grapple_max_distance` (20).
        let mut state = PlayerState::spawn_at(Vec3::new(0.0, 10.0 - config.arena_half_size, 0.0));
        let dt = 1.0 / 60.0;
        let grapple_input = SimInput::new(0.0, 0.0, 0.0, 0.0, false, false, false, true, false, false);
        step_player(&mut state, &grapple_input, &config, dt, None);
        assert!(state.grapple.active);
        assert!(state.grapple.normal.z.abs() < 1e-9);
    }
}
