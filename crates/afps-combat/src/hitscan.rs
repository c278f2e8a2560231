use std::{collections::HashMap, hash::Hash};

use afps_geometry::{Cylinder, Ray, Vec3, ViewAngles};
use afps_sim::{SimConfig, hitscan_world_distance};

use crate::pose_history::PoseHistory;

/// Outcome of a hitscan resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum HitResult<Id> {
    Miss,
    Hit {
        target_id: Id,
        distance: f64,
        point: Vec3,
    },
}

/// Resolves a hitscan shot fired by `shooter_id`, rewinding every
/// player's pose to `rewind_tick` via their [`PoseHistory`]. `view` must
/// already be sanitized ([`ViewAngles::sanitize`]).
///
/// World occlusion only considers the arena bounds and the single
/// obstacle box (via [`hitscan_world_distance`]), deliberately not any
/// `World`-tagged colliders, while player hits are tested against every
/// other connection's rewound pose, modeled as a vertical cylinder.
pub fn resolve_hitscan<Id>(
    shooter_id: &Id,
    histories: &HashMap<Id, PoseHistory>,
    rewind_tick: u64,
    view: ViewAngles,
    config: &SimConfig,
    range: f64,
) -> HitResult<Id>
where
    Id: Eq + Hash + Clone,
{
    let Some(shooter_history) = histories.get(shooter_id) else {
        return HitResult::Miss;
    };
    let Some(shooter_pose) = shooter_history.sample_at_or_before(rewind_tick) else {
        return HitResult::Miss;
    };

    let origin = shooter_pose.position + Vec3::new(0.0, 0.0, config.eye_height());
    let direction = view.direction();
    let ray = Ray::new(origin, direction);

    let world_distance = hitscan_world_distance(origin, direction, config);

    let mut best: Option<(f64, Id)> = None;
    for (id, history) in histories {
        if id == shooter_id {
            continue;
        }
        let Some(pose) = history.sample_at_or_before(rewind_tick) else {
            continue;
        };
        let cylinder = Cylinder::new(pose.position, config.player_radius, config.player_height);
        let Some(t) = cylinder.raycast(&ray) else {
            continue;
        };
        if t < 0.0 || t > range {
            continue;
        }
        if best.as_ref().is_none_or(|(best_t, _)| t < *best_t) {
            best = Some((t, id.clone()));
        }
    }

    match best {
        Some((t, target_id)) if t < world_distance => HitResult::Hit {
            target_id,
            distance: t,
            point: ray.at(t),
        },
        _ => HitResult::Miss,
    }
}
