use afps_geometry::{Aabb, Ray, Vec3};
use serde::{Deserialize, Serialize};

use crate::SimConfig;

/// What kind of geometry a collider represents, used by the grapple
/// raycast to decide whether a surface is attachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceType {
    ArenaFloor,
    ArenaCeiling,
    ArenaWall,
    Obstacle,
    World,
}

/// One static collider in the world. Invariant: `aabb.min < aabb.max` on
/// every axis, enforced by construction via [`Aabb::new`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AabbCollider {
    pub aabb: Aabb,
    pub surface_type: SurfaceType,
    pub tags: Vec<String>,
}

/// The read-only world of static colliders a tick is simulated against.
/// Arena bounds and the single obstacle box are derived from
/// [`SimConfig`]; `colliders` holds any additional world geometry.
#[derive(Debug, Clone, Default)]
pub struct CollisionWorld {
    pub colliders: Vec<AabbCollider>,
}

impl CollisionWorld {
    #[must_use]
    pub fn new(colliders: Vec<AabbCollider>) -> Self {
        Self { colliders }
    }

    /// The arena's bounding box: `[-half, half]` on x/y, `[0, half]` on z.
    #[must_use]
    pub fn arena_bounds(config: &SimConfig) -> Aabb {
        let half = config.arena_half_size;
        Aabb::new(Vec3::new(-half, -half, 0.0), Vec3::new(half, half, half))
    }

    /// The single configured obstacle box, or `None` if the config
    /// describes a degenerate (zero-area) footprint, which is how "no
    /// obstacle" is expressed. Spans the full arena height.
    #[must_use]
    pub fn obstacle(config: &SimConfig) -> Option<Aabb> {
        if config.obstacle_max_x <= config.obstacle_min_x
            || config.obstacle_max_y <= config.obstacle_min_y
        {
            return None;
        }
        Some(Aabb::new(
            Vec3::new(config.obstacle_min_x, config.obstacle_min_y, 0.0),
            Vec3::new(
                config.obstacle_max_x,
                config.obstacle_max_y,
                config.arena_half_size,
            ),
        ))
    }
}

/// Intersects a ray's xy projection against an axis-aligned rectangle,
/// returning the `(entry, exit)` parametric distances, ignoring z
/// entirely. `None` if the ray's xy projection never crosses the
/// rectangle.
pub(crate) fn slab_t_range_xy(
    origin: Vec3,
    direction: Vec3,
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
) -> Option<(f64, f64)> {
    let mut t_min = f64::NEG_INFINITY;
    let mut t_max = f64::INFINITY;

    for (origin_axis, dir_axis, min, max) in
        [(origin.x, direction.x, min_x, max_x), (origin.y, direction.y, min_y, max_y)]
    {
        if dir_axis.abs() < 1e-12 {
            if origin_axis < min || origin_axis > max {
                return None;
            }
            continue;
        }
        let inv = 1.0 / dir_axis;
        let mut t1 = (min - origin_axis) * inv;
        let mut t2 = (max - origin_axis) * inv;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        t_min = t_min.max(t1);
        t_max = t_max.min(t2);
        if t_min > t_max {
            return None;
        }
    }

    Some((t_min, t_max))
}

/// The world-distance bound used by the hitscan resolver: the range at
/// which the ray would exit the arena, clipped by the nearest obstacle
/// face it enters first. Ignores z and any `World` colliders by design;
/// only the arena box and the single obstacle box gate hitscan range.
#[must_use]
pub fn hitscan_world_distance(origin: Vec3, direction: Vec3, config: &SimConfig) -> f64 {
    let half = config.arena_half_size;
    let arena_exit = slab_t_range_xy(origin, direction, -half, half, -half, half)
        .map_or(f64::INFINITY, |(_, t_max)| t_max.max(0.0));

    let obstacle_entry = CollisionWorld::obstacle(config).map_or(f64::INFINITY, |obstacle| {
        slab_t_range_xy(
            origin,
            direction,
            obstacle.min.x,
            obstacle.max.x,
            obstacle.min.y,
            obstacle.max.y,
        )
        .map_or(f64::INFINITY, |(t_min, _)| t_min.max(0.0))
    });

    arena_exit.min(obstacle_entry)
}

/// Casts a ray against the arena bounds, the obstacle box, and every
/// collider in `world` (if given), returning the nearest non-negative hit
/// distance and surface normal. Used by the grapple raycast and by the
/// shockwave's line-of-sight gate; both need full 3D world occlusion,
/// unlike [`hitscan_world_distance`].
#[must_use]
pub fn raycast_world(ray: &Ray, config: &SimConfig, world: Option<&CollisionWorld>) -> Option<(f64, Vec3)> {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_distance_is_bounded_by_arena_when_no_obstacle() {
        let config = SimConfig::default();
        let distance =
            hitscan_world_distance(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0), &config);
        assert!((distance - config.arena_half_size).abs() < 1e-9);
    }

    #[test]
    fn obstacle_in_path_shortens_world_distance() {
        let mut config = SimConfig::default();
        config.obstacle_min_x = -1.0;
        config.obstacle_max_x = 1.0;
        config.obstacle_min_y = -3.0;
        config.obstacle_max_y = -2.0;
        let distance =
            hitscan_world_distance(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0), &config);
        assert!((distance - 2.0).abs() < 1e-9);
    }

    #[test]
    fn obstacle_behind_target_does_not_shorten_distance() {
        let mut config = SimConfig::default();
        config.obstacle_min_x = -1.0;
        config.obstacle_max_x = 1.0;
        config.obstacle_min_y = -8.0;
        config.obstacle_max_y = -7.0;
        let distance =
            hitscan_world_distance(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0), &config);
        assert!((distance - 7.0).abs() < 1e-9);
    }
}
