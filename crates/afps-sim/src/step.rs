use afps_geometry::{Aabb, Ray, Vec3, segment_vs_aabb};

use crate::{CollisionWorld, SimConfig, SimInput, state::PlayerState};

const MAX_SWEEP_ITERATIONS: usize = 3;
const MAX_OVERLAP_PASSES: usize = 4;
const EPSILON: f64 = 1e-9;

/// Advances `state` by one fixed tick under `input`, `config`, and an
/// optional `world` of static colliders. A pure function: no global state,
/// no randomness. Non-finite or non-positive `dt` is a no-op, matching the
/// determinism contract (identical inputs must produce bit-identical
/// output).
///
/// Integration order is fixed and load-bearing: horizontal move, dash,
/// grapple, shield, shockwave, jump/gravity, collision sweep, vertical
/// integration. Reordering any of these changes observable behavior.
pub fn step_player(
    state: &mut PlayerState,
    input: &SimInput,
    config: &SimConfig,
    dt: f64,
    world: Option<&CollisionWorld>,
) {
    if !dt.is_finite() || dt <= 0.0 {
        return;
    }

    horizontal_move(state, input, config, dt);
    dash(state, input, config, dt);
    grapple_press(state, input, config, world);
    shield(state, input, config, dt);
    shockwave(state, input, config, dt);
    grapple_physics(state, config, dt);
    jump_and_gravity(state, input, config, dt);
    collision_sweep(state, config, world, dt);
    vertical_integrate(state, config, dt);
}

fn horizontal_move(state: &mut PlayerState, input: &SimInput, config: &SimConfig, dt: f64) {
    let wish = Vec3::new(input.move_x, input.move_y, 0.0);
    let wish_len = wish.length();
    let wish_dir = if wish_len > EPSILON {
        wish / wish_len.max(1.0)
    } else {
        Vec3::ZERO
    };
    let has_input = wish_len > EPSILON;

    let mut horizontal = Vec3::new(state.velocity.x, state.velocity.y, 0.0);

    if has_input && config.accel > 0.0 {
        horizontal += wish_dir * config.accel * dt;
        let cap = config.move_speed * if input.sprint { config.sprint_multiplier } else { 1.0 };
        let speed = horizontal.length();
        if speed > cap && speed > EPSILON {
            horizontal *= cap / speed;
        }
    } else if config.friction > 0.0 {
        let speed = horizontal.length();
        if speed > EPSILON {
            let new_speed = (speed - config.friction * dt).max(0.0);
            horizontal *= new_speed / speed;
        }
    }

    state.velocity.x = horizontal.x;
    state.velocity.y = horizontal.y;
}

fn dash(state: &mut PlayerState, input: &SimInput, config: &SimConfig, dt: f64) {
    state.dash_cooldown = (state.dash_cooldown - dt).max(0.0);

    if !input.dash || state.dash_cooldown > 0.0 {
        return;
    }

    let wish = Vec3::new(input.move_x, input.move_y, 0.0);
    let current = Vec3::new(state.velocity.x, state.velocity.y, 0.0);
    let dir = if wish.length_squared() > EPSILON {
        wish.normalize()
    } else if current.length_squared() > EPSILON {
        current.normalize()
    } else {
        return;
    };

    state.velocity += dir * config.dash_impulse;
    state.dash_cooldown = config.dash_cooldown;
}

fn eye_position(state: &PlayerState, config: &SimConfig) -> Vec3 {
    state.position + Vec3::new(0.0, 0.0, config.eye_height())
}

fn grapple_press(
    state: &mut PlayerState,
    input: &SimInput,
    config: &SimConfig,
    world: Option<&CollisionWorld>,
) {
    let pressed = input.grapple && !state.grapple_input_latched;
    state.grapple_input_latched = input.grapple;

    if !pressed || state.grapple.active || state.grapple_cooldown > 0.0 {
        return;
    }

    let origin = eye_position(state, config);
    let direction = input.view.direction();
    let ray = Ray::new(origin, direction);

    let Some((t, normal)) = raycast_world(&ray, config, world) else {
        return;
    };

    if t < 0.0 || t > config.grapple_max_distance {
        return;
    }
    let normal_z = normal.z.abs();
    let allow_attach = normal_z < 1e-6
        || config.grapple_min_attach_normal_z <= 0.0
        || normal_z >= config.grapple_min_attach_normal_z;
    if !allow_attach {
        return;
    }

    state.grapple = crate::state::GrappleState {
        active: true,
        point: ray.at(t),
        normal,
        length: t,
    };
}

/// Casts a ray against the arena bounds, the obstacle box, and any world
/// colliders, returning the nearest hit distance and surface normal.
fn raycast_world(ray: &Ray, config: &SimConfig, world: Option<&CollisionWorld>) -> Option<(f64, Vec3)> {
    let mut best: Option<(f64, Vec3)> = None;
    let mut consider = |candidate: Option<(f64, Vec3)>| {
        if let Some((t, normal)) = candidate {
            if t >= 0.0 && best.is_none_or(|(best_t, _)| t < best_t) {
                best = Some((t, normal));
            }
        }
    };

    consider(CollisionWorld::arena_bounds(config).intersect_ray(ray));
    if let Some(obstacle) = CollisionWorld::obstacle(config) {
        consider(obstacle.intersect_ray(ray));
    }
    if let Some(world) = world {
        for collider in &world.colliders {
            consider(collider.aabb.intersect_ray(ray));
        }
    }

    best
}

fn grapple_physics(state: &mut PlayerState, config: &SimConfig, dt: f64) {
    state.grapple_cooldown = (state.grapple_cooldown - dt).max(0.0);

    if !state.grapple.active {
        return;
    }

    let to_anchor = state.grapple.point - state.position;
    let distance = to_anchor.length();

    let broken = distance > config.grapple_max_distance + config.grapple_rope_slack;
    if broken {
        detach_grapple(state, config);
        return;
    }

    if distance <= state.grapple.length + config.grapple_rope_slack {
        return;
    }

    let dir = if distance > EPSILON { to_anchor / distance } else { Vec3::ZERO };
    let stretch = distance - state.grapple.length;
    let radial_speed = state.velocity.dot(dir);
    let accel = dir * (config.grapple_pull_strength * stretch) - dir * (config.grapple_damping * radial_speed);
    state.velocity += accel * dt;
}

fn detach_grapple(state: &mut PlayerState, config: &SimConfig) {
    state.grapple = crate::state::GrappleState::default();
    state.grapple_cooldown = config.grapple_cooldown;
}

fn shield(state: &mut PlayerState, input: &SimInput, config: &SimConfig, dt: f64) {
    state.shield_cooldown = (state.shield_cooldown - dt).max(0.0);

    let pressed = input.shield && !state.shield_input_latched;
    state.shield_input_latched = input.shield;

    if state.shield_active {
        state.shield_timer -= dt;
        if !input.shield || state.shield_timer <= 0.0 {
            state.shield_active = false;
            state.shield_timer = 0.0;
            state.shield_cooldown = config.shield_cooldown;
        }
        return;
    }

    if pressed && state.shield_cooldown <= 0.0 {
        state.shield_active = true;
        state.shield_timer = config.shield_duration;
    }
}

fn shockwave(state: &mut PlayerState, input: &SimInput, config: &SimConfig, dt: f64) {
    state.shockwave_cooldown = (state.shockwave_cooldown - dt).max(0.0);
    state.shockwave_triggered = false;

    let pressed = input.shockwave && !state.shockwave_input_latched;
    state.shockwave_input_latched = input.shockwave;

    if pressed && state.shockwave_cooldown <= 0.0 {
        state.shockwave_triggered = true;
        state.shockwave_cooldown = config.shockwave_cooldown;
    }
}

fn jump_and_gravity(state: &mut PlayerState, input: &SimInput, config: &SimConfig, dt: f64) {
    if state.grounded && input.jump && config.jump_velocity > 0.0 {
        state.velocity.z = config.jump_velocity;
        state.grounded = false;
    } else if !state.grounded {
        state.velocity.z -= config.gravity * dt;
    }
}

/// All the expanded horizontal footprints (xy rectangles, z unconstrained)
/// a player can collide with this tick: the obstacle box and any world
/// colliders whose z range overlaps the player's vertical extent, each
/// grown by `player_radius`.
fn expanded_footprints(state: &PlayerState, config: &SimConfig, world: Option<&CollisionWorld>) -> Vec<Aabb> {
    let mut out = Vec::new();
    let slab_lo = state.position.z;
    let slab_hi = state.position.z + config.player_height;

    let mut push = |aabb: &Aabb| {
        if aabb.max.z < slab_lo || aabb.min.z > slab_hi {
            return;
        }
        let expanded = aabb.expand(config.player_radius);
        out.push(Aabb::new(
            Vec3::new(expanded.min.x, expanded.min.y, -1e6),
            Vec3::new(expanded.max.x, expanded.max.y, 1e6),
        ));
    };

    if let Some(obstacle) = CollisionWorld::obstacle(config) {
        push(&obstacle);
    }
    if let Some(world) = world {
        for collider in &world.colliders {
            push(&collider.aabb);
        }
    }
    out
}

fn resolve_horizontal_overlaps(pos: &mut Vec3, state: &mut PlayerState, footprints: &[Aabb]) {
    for _ in 0..MAX_OVERLAP_PASSES {
        let mut pushed = false;
        for footprint in footprints {
            if !footprint.contains_point(*pos) {
                continue;
            }
            let push_x_neg = pos.x - footprint.min.x;
            let push_x_pos = footprint.max.x - pos.x;
            let push_y_neg = pos.y - footprint.min.y;
            let push_y_pos = footprint.max.y - pos.y;

            let min_push = push_x_neg.min(push_x_pos).min(push_y_neg).min(push_y_pos);
            if min_push == push_x_neg {
                pos.x = footprint.min.x;
                state.velocity.x = state.velocity.x.min(0.0);
            } else if min_push == push_x_pos {
                pos.x = footprint.max.x;
                state.velocity.x = state.velocity.x.max(0.0);
            } else if min_push == push_y_neg {
                pos.y = footprint.min.y;
                state.velocity.y = state.velocity.y.min(0.0);
            } else {
                pos.y = footprint.max.y;
                state.velocity.y = state.velocity.y.max(0.0);
            }
            pushed = true;
        }
        if !pushed {
            break;
        }
    }
}

fn clamp_to_arena(pos: &mut Vec3, state: &mut PlayerState, config: &SimConfig) {
    let limit = config.arena_half_size - config.player_radius;
    if pos.x < -limit {
        pos.x = -limit;
        state.velocity.x = state.velocity.x.max(0.0);
    } else if pos.x > limit {
        pos.x = limit;
        state.velocity.x = state.velocity.x.min(0.0);
    }
    if pos.y < -limit {
        pos.y = -limit;
        state.velocity.y = state.velocity.y.max(0.0);
    } else if pos.y > limit {
        pos.y = limit;
        state.velocity.y = state.velocity.y.min(0.0);
    }
}

fn collision_sweep(state: &mut PlayerState, config: &SimConfig, world: Option<&CollisionWorld>, dt: f64) {
    let footprints = expanded_footprints(state, config, world);
    let mut pos = state.position;
    let mut remaining = Vec3::new(state.velocity.x * dt, state.velocity.y * dt, 0.0);

    clamp_to_arena(&mut pos, state, config);
    resolve_horizontal_overlaps(&mut pos, state, &footprints);

    for _ in 0..MAX_SWEEP_ITERATIONS {
        if remaining.length_squared() < EPSILON * EPSILON {
            break;
        }

        let target = pos + remaining;
        let mut best: Option<(f64, Vec3)> = None;
        for footprint in &footprints {
            if let Some(hit) = segment_vs_aabb(pos, target, footprint) {
                if hit.t > EPSILON && best.is_none_or(|(best_t, _)| hit.t < best_t) {
                    best = Some((hit.t, hit.normal));
                }
            }
        }

        let limit = config.arena_half_size - config.player_radius;
        for (axis_val, dir_val, bound, normal) in [
            (pos.x, remaining.x, limit, Vec3::new(-1.0, 0.0, 0.0)),
            (pos.x, remaining.x, -limit, Vec3::new(1.0, 0.0, 0.0)),
            (pos.y, remaining.y, limit, Vec3::new(0.0, -1.0, 0.0)),
            (pos.y, remaining.y, -limit, Vec3::new(0.0, 1.0, 0.0)),
        ] {
            if dir_val.abs() < EPSILON {
                continue;
            }
            let t = (bound - axis_val) / dir_val;
            if (0.0..=1.0).contains(&t) && best.is_none_or(|(best_t, _)| t < best_t) {
                best = Some((t, normal));
            }
        }

        match best {
            Some((t, normal)) => {
                pos += remaining * t;
                let into_plane = Vec3::new(state.velocity.x, state.velocity.y, 0.0).dot(normal);
                if into_plane < 0.0 {
                    let correction = normal * into_plane;
                    state.velocity.x -= correction.x;
                    state.velocity.y -= correction.y;
                }
                let leftover = remaining * (1.0 - t);
                let drop = normal * leftover.dot(normal);
                remaining = leftover - drop;
            }
            None => {
                pos = target;
                remaining = Vec3::ZERO;
            }
        }
    }

    state.position.x = pos.x;
    state.position.y = pos.y;
    resolve_horizontal_overlaps(&mut state.position, state, &footprints);
    clamp_to_arena(&mut state.position, state, config);
}

fn vertical_integrate(state: &mut PlayerState, config: &SimConfig, dt: f64) {
    state.position.z += state.velocity.z * dt;

    let ceiling = config.arena_half_size - config.player_height;
    if state.position.z <= 0.0 {
        state.position.z = 0.0;
        state.grounded = true;
        if state.velocity.z < 0.0 {
            state.velocity.z = 0.0;
        }
    } else if state.position.z >= ceiling {
        state.position.z = ceiling;
        if state.velocity.z > 0.0 {
            state.velocity.z = 0.0;
        }
    } else {
        state.grounded = false;
    }
}
