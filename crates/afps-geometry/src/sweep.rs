use crate::{Aabb, Cylinder, Vec3};

/// Result of a swept collision test: the fraction of the segment traveled
/// before impact, and the surface normal at the point of impact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepHit {
    pub t: f64,
    pub normal: Vec3,
}

/// Sweeps a point from `p0` to `p1` against a static AABB, returning the
/// earliest `t` in `[0, 1]` at which the point enters the box, or `None` if
/// the segment never enters it. If `p0` already lies inside the box this
/// returns `t = 0` with a zero normal; the caller is expected to run a
/// separate overlap-resolution pass for that case (matching the collision
/// sweep's "resolve any initial overlap, then sweep" two-phase design).
#[must_use]
pub fn segment_vs_aabb(p0: Vec3, p1: Vec3, aabb: &Aabb) -> Option<SweepHit> {
    if aabb.contains_point(p0) {
        return Some(SweepHit {
            t: 0.0,
            normal: Vec3::ZERO,
        });
    }

    let delta = p1 - p0;
    let mut t_min = 0.0_f64;
    let mut t_max = 1.0_f64;
    let mut normal = Vec3::ZERO;

    for axis in 0..3 {
        let origin = p0[axis];
        let d = delta[axis];
        let min = aabb.min[axis];
        let max = aabb.max[axis];

        if d.abs() < 1e-12 {
            if origin < min || origin > max {
                return None;
            }
            continue;
        }

        let inv_d = 1.0 / d;
        let mut t1 = (min - origin) * inv_d;
        let mut t2 = (max - origin) * inv_d;
        let mut sign = -1.0_f64;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
            sign = 1.0;
        }
        if t1 > t_min {
            t_min = t1;
            normal = Vec3::ZERO;
            normal[axis] = sign;
        }
        t_max = t_max.min(t2);
        if t_min > t_max {
            return None;
        }
    }

    Some(SweepHit {
        t: t_min,
        normal,
    })
}

/// Sweeps a moving AABB's displacement against a static AABB by expanding
/// the static box by the moving box's half-extents (Minkowski sum) and
/// tracing the moving box's center path against it.
#[must_use]
pub fn sweep_aabb_vs_aabb(moving: &Aabb, delta: Vec3, target: &Aabb) -> Option<SweepHit> {
    let half_extents = moving.lens() * 0.5;
    let expanded = Aabb::new(target.min - half_extents, target.max + half_extents);
    let center = moving.mid();
    segment_vs_aabb(center, center + delta, &expanded)
}

/// Sweeps a line segment against an upright cylinder, returning the
/// earliest `t` in `[0, 1]` at which it enters the cylinder's lateral
/// surface within its vertical extent.
#[must_use]
pub fn segment_vs_cylinder(p0: Vec3, p1: Vec3, cyl: &Cylinder) -> Option<f64> {
    let ox = p0.x - cyl.base.x;
    let oy = p0.y - cyl.base.y;
    let dx = p1.x - p0.x;
    let dy = p1.y - p0.y;

    let a = dx * dx + dy * dy;
    let top = cyl.base.z + cyl.height;

    let check_z = |t: f64| -> Option<f64> {
        if !(0.0..=1.0).contains(&t) {
            return None;
        }
        let z = p0.z + (p1.z - p0.z) * t;
        (z >= cyl.base.z && z <= top).then_some(t)
    };

    if a < 1e-12 {
        if ox * ox + oy * oy <= cyl.radius * cyl.radius {
            return check_z(0.0);
        }
        return None;
    }

    let b = 2.0 * (dx * ox + dy * oy);
    let c = ox * ox + oy * oy - cyl.radius * cyl.radius;
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_disc = discriminant.sqrt();
    let t1 = (-b - sqrt_disc) / (2.0 * a);
    let t2 = (-b + sqrt_disc) / (2.0 * a);

    match (check_z(t1), check_z(t2)) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_enters_box_from_outside() {
        let aabb = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let hit = segment_vs_aabb(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0), &aabb)
            .expect("should hit");
        assert!((hit.t - 0.4).abs() < 1e-9);
        assert_eq!(hit.normal, Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn segment_starting_inside_reports_zero() {
        let aabb = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let hit = segment_vs_aabb(Vec3::ZERO, Vec3::new(5.0, 0.0, 0.0), &aabb).expect("inside");
        assert_eq!(hit.t, 0.0);
    }

    #[test]
    fn segment_vs_cylinder_finds_entry() {
        let cyl = Cylinder::new(Vec3::ZERO, 0.5, 1.8);
        let t = segment_vs_cylinder(
            Vec3::new(-5.0, 0.0, 0.9),
            Vec3::new(5.0, 0.0, 0.9),
            &cyl,
        )
        .expect("should hit");
        assert!((t - 0.45).abs() < 1e-9);
    }

    #[test]
    fn segment_vs_cylinder_misses_past_height() {
        let cyl = Cylinder::new(Vec3::ZERO, 0.5, 1.8);
        assert!(
            segment_vs_cylinder(Vec3::new(-5.0, 0.0, 5.0), Vec3::new(5.0, 0.0, 5.0), &cyl)
                .is_none()
        );
    }
}
