use std::{collections::HashMap, hash::Hash};

use afps_geometry::{Ray, Vec3};
use afps_sim::{raycast_world, PlayerState, SimConfig};

const LOS_EPSILON: f64 = 1e-3;

/// One player's share of an area-effect hit.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaHit<Id> {
    pub target_id: Id,
    pub damage: f64,
    /// Unit vector from the effect's center toward the target, used to
    /// apply knockback. `(0, 0, 1)` when the target is at the center.
    pub impulse_direction: Vec3,
}

fn linear_falloff(distance: f64, radius: f64, max_damage: f64) -> Option<f64> {
    if radius <= 0.0 || distance > radius {
        return None;
    }
    Some(max_damage * (1.0 - distance / radius))
}

fn impulse_direction(center: Vec3, target: Vec3) -> Vec3 {
    let delta = target - center;
    let distance = delta.length();
    if distance > 1e-9 {
        delta / distance
    } else {
        Vec3::new(0.0, 0.0, 1.0)
    }
}

/// Unconditional radial falloff damage, no line-of-sight check: every
/// player within `radius` of `center` (other than `ignore`) takes
/// `max_damage * (1 - dist / radius)`.
pub fn explosion_damage<Id>(
    center: Vec3,
    radius: f64,
    max_damage: f64,
    players: &HashMap<Id, PlayerState>,
    ignore: &Id,
) -> Vec<AreaHit<Id>>
where
    Id: Eq + Hash + Clone,
{
    let mut hits = Vec::new();
    for (id, pose) in players {
        if id == ignore {
            continue;
        }
        let distance = pose.position.distance(center);
        let Some(damage) = linear_falloff(distance, radius, max_damage) else {
            continue;
        };
        hits.push(AreaHit {
            target_id: id.clone(),
            damage,
            impulse_direction: impulse_direction(center, pose.position),
        });
    }
    hits
}

/// Radial falloff damage with an additional line-of-sight gate: a player
/// is excluded if the world occludes the straight line from `center` to
/// their torso (the world ray is shorter than the player distance minus
/// [`LOS_EPSILON`]). `max_impulse` is not applied here; it is reported
/// back to the caller as the knockback magnitude to scale
/// [`AreaHit::impulse_direction`] by, since this crate has no concept of
/// physical mass to convert impulse into a velocity change.
pub fn shockwave_hits<Id>(
    center: Vec3,
    radius: f64,
    max_impulse: f64,
    max_damage: f64,
    config: &SimConfig,
    world: Option<&afps_sim::CollisionWorld>,
    players: &HashMap<Id, PlayerState>,
    ignore: &Id,
) -> Vec<(AreaHit<Id>, f64)>
where
    Id: Eq + Hash + Clone,
{
    let mut hits = Vec::new();
    for (id, pose) in players {
        if id == ignore {
            continue;
        }
        let torso = pose.position + Vec3::new(0.0, 0.0, config.player_height * 0.5);
        let to_target = torso - center;
        let distance = to_target.length();
        let Some(damage) = linear_falloff(distance, radius, max_damage) else {
            continue;
        };

        if distance > LOS_EPSILON {
            let ray = Ray::new(center, to_target);
            if let Some((world_t, _)) = raycast_world(&ray, config, world) {
                if world_t < distance - LOS_EPSILON {
                    continue;
                }
            }
        }

        hits.push((
            AreaHit {
                target_id: id.clone(),
                damage,
                impulse_direction: impulse_direction(center, torso),
            },
            max_impulse,
        ));
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn players(entries: &[(&str, Vec3)]) -> HashMap<String, PlayerState> {
        entries
            .iter()
            .map(|(id, pos)| ((*id).to_owned(), PlayerState::spawn_at(*pos)))
            .collect()
    }

    #[test]
    fn explosion_falloff_matches_literal_scenario() {
        let config = SimConfig::default();
        let players = players(&[
            ("a", Vec3::new(0.0, 0.0, 0.0)),
            ("b", Vec3::new(2.0, 0.0, 0.0)),
        ]);
        let center = Vec3::new(0.0, 0.0, config.player_height / 2.0);
        let hits = explosion_damage(center, 4.0, 100.0, &players, &"ignored".to_owned());

        let a = hits.iter().find(|h| h.target_id == "a").unwrap();
        let b = hits.iter().find(|h| h.target_id == "b").unwrap();
        assert!((a.damage - 100.0).abs() < 1e-9);
        assert!((b.damage - 50.0).abs() < 1e-9);
    }

    #[test]
    fn explosion_ignores_the_attacker() {
        let players = players(&[("attacker", Vec3::ZERO)]);
        let hits = explosion_damage(Vec3::ZERO, 5.0, 100.0, &players, &"attacker".to_owned());
        assert!(hits.is_empty());
    }

    #[test]
    fn shockwave_drops_occluded_targets() {
        let mut config = SimConfig::default();
        config.obstacle_min_x = -1.0;
        config.obstacle_max_x = 1.0;
        config.obstacle_min_y = -3.0;
        config.obstacle_max_y = -2.0;

        let players = players(&[("target", Vec3::new(0.0, -5.0, 0.0))]);
        let hits = shockwave_hits(
            Vec3::ZERO,
            10.0,
            5.0,
            100.0,
            &config,
            None,
            &players,
            &"attacker".to_owned(),
        );
        assert!(hits.is_empty());
    }

    #[test]
    fn shockwave_hits_unoccluded_targets() {
        let config = SimConfig::default();
        let players = players(&[("target", Vec3::new(0.0, -3.0, 0.0))]);
        let hits = shockwave_hits(
            Vec3::ZERO,
            10.0,
            5.0,
            100.0,
            &config,
            None,
            &players,
            &"attacker".to_owned(),
        );
        assert_eq!(hits.len(), 1);
    }
}
