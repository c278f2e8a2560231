use std::{collections::HashMap, hash::Hash};

use afps_geometry::{Aabb, Cylinder, Vec3, segment_vs_cylinder};
use afps_sim::{CollisionWorld, PlayerState, SimConfig};

const EPSILON: f64 = 1e-9;

/// A live projectile owned by `owner_id`.
#[derive(Debug, Clone)]
pub struct ProjectileState<Id> {
    pub id: u64,
    pub owner_id: Id,
    pub position: Vec3,
    pub velocity: Vec3,
    pub ttl: f64,
    pub radius: f64,
    pub damage: f64,
    pub explosion_radius: f64,
}

/// Result of sweeping a projectile's per-tick displacement against players
/// and world geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectileImpact<Id> {
    None,
    World { point: Vec3, t: f64 },
    Player { target_id: Id, point: Vec3, t: f64 },
}

fn segment_exit_aabb(p0: Vec3, p1: Vec3, aabb: &Aabb) -> Option<f64> {
    let delta = p1 - p0;
    let mut t_min = 0.0_f64;
    let mut t_max = 1.0_f64;

    for axis in 0..3 {
        let origin = p0[axis];
        let d = delta[axis];
        let min = aabb.min[axis];
        let max = aabb.max[axis];

        if d.abs() < EPSILON {
            if origin < min || origin > max {
                return None;
            }
            continue;
        }
        let inv_d = 1.0 / d;
        let mut t1 = (min - origin) * inv_d;
        let mut t2 = (max - origin) * inv_d;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        t_min = t_min.max(t1);
        t_max = t_max.min(t2);
        if t_min > t_max {
            return None;
        }
    }

    Some(t_max)
}

fn segment_vs_ground(p0: Vec3, delta: Vec3) -> Option<f64> {
    if delta.z.abs() < EPSILON {
        return None;
    }
    let t = -p0.z / delta.z;
    (0.0..=1.0).contains(&t).then_some(t)
}

/// Sweeps `proj`'s per-tick displacement `delta`, returning the earliest
/// impact against a player (other than `ignore_id`, modeled as an
/// inflated cylinder) or world geometry (arena bounds, the obstacle box,
/// or the ground plane at `z=0`). Non-finite deltas are rejected outright.
pub fn resolve_projectile_impact<Id>(
    proj: &ProjectileState<Id>,
    delta: Vec3,
    config: &SimConfig,
    players: &HashMap<Id, PlayerState>,
    ignore_id: &Id,
) -> ProjectileImpact<Id>
where
    Id: Eq + Hash + Clone,
{
    if !delta.x.is_finite() || !delta.y.is_finite() || !delta.z.is_finite() {
        return ProjectileImpact::None;
    }

    let p0 = proj.position;
    let p1 = p0 + delta;

    let mut best_t: Option<f64> = None;
    let mut best_target: Option<Id> = None;

    for (id, pose) in players {
        if id == ignore_id {
            continue;
        }
        let cylinder = Cylinder::new(
            pose.position,
            config.player_radius + proj.radius,
            config.player_height,
        );
        let Some(t) = segment_vs_cylinder(p0, p1, &cylinder) else {
            continue;
        };
        if best_t.is_none_or(|best| t < best) {
            best_t = Some(t);
            best_target = Some(id.clone());
        }
    }

    let mut world_t: Option<f64> = None;
    if let Some(t) = segment_exit_aabb(p0, p1, &CollisionWorld::arena_bounds(config)) {
        world_t = Some(world_t.map_or(t, |cur: f64| cur.min(t)));
    }
    if let Some(obstacle) = CollisionWorld::obstacle(config) {
        if let Some(hit) = afps_geometry::segment_vs_aabb(p0, p1, &obstacle) {
            world_t = Some(world_t.map_or(hit.t, |cur: f64| cur.min(hit.t)));
        }
    }
    if let Some(t) = segment_vs_ground(p0, delta) {
        world_t = Some(world_t.map_or(t, |cur: f64| cur.min(t)));
    }

    match (best_t, world_t) {
        (None, None) => ProjectileImpact::None,
        (Some(t), None) => ProjectileImpact::Player {
            target_id: best_target.expect("set alongside best_t"),
            point: p0 + delta * t,
            t,
        },
        (None, Some(t)) => ProjectileImpact::World {
            point: p0 + delta * t,
            t,
        },
        // An exact tie favors the world hit.
        (Some(player_t), Some(world_t)) => {
            if player_t < world_t {
                ProjectileImpact::Player {
                    target_id: best_target.expect("set alongside best_t"),
                    point: p0 + delta * player_t,
                    t: player_t,
                }
            } else {
                ProjectileImpact::World {
                    point: p0 + delta * world_t,
                    t: world_t,
                }
            }
        }
    }
}
