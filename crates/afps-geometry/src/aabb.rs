use serde::{Deserialize, Serialize};

use crate::{Ray, Vec3};

/// An axis-aligned bounding box. Invariant: `min < max` on every axis
/// (strict), enforced by [`Aabb::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Builds an AABB, reordering `a`/`b` on each axis so `min <= max`.
    #[must_use]
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    #[must_use]
    pub fn mid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn lens(&self) -> Vec3 {
        self.max - self.min
    }

    /// Grows the box by `amount` on every axis in both directions.
    #[must_use]
    pub fn expand(&self, amount: f64) -> Self {
        Self {
            min: self.min - Vec3::splat(amount),
            max: self.max + Vec3::splat(amount),
        }
    }

    /// Translates the box by `delta`.
    #[must_use]
    pub fn translate(&self, delta: Vec3) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    /// Intersects this box with a `[lo, hi]` slab on the z axis, returning
    /// `None` if the result would be empty.
    #[must_use]
    pub fn clamp_z(&self, lo: f64, hi: f64) -> Option<Self> {
        let min_z = self.min.z.max(lo);
        let max_z = self.max.z.min(hi);
        (min_z < max_z).then_some(Self {
            min: Vec3::new(self.min.x, self.min.y, min_z),
            max: Vec3::new(self.max.x, self.max.y, max_z),
        })
    }

    #[must_use]
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    #[must_use]
    pub fn collides(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Per-axis overlap extent (positive where the boxes overlap on that
    /// axis). Used by the overlap-resolution pass to find the
    /// minimum-penetration axis.
    #[must_use]
    pub fn overlap(&self, other: &Self) -> Vec3 {
        Vec3::new(
            (self.max.x.min(other.max.x) - self.min.x.max(other.min.x)).max(0.0),
            (self.max.y.min(other.max.y) - self.min.y.max(other.min.y)).max(0.0),
            (self.max.z.min(other.max.z) - self.min.z.max(other.min.z)).max(0.0),
        )
    }

    /// Slab-test ray/AABB intersection. Returns the entry `t >= 0` if the
    /// ray hits the box, along with the outward surface normal at that
    /// point.
    #[must_use]
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(f64, Vec3)> {
        let mut t_min = f64::NEG_INFINITY;
        let mut t_max = f64::INFINITY;
        let mut normal = Vec3::ZERO;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let dir = ray.direction[axis];
            let min = self.min[axis];
            let max = self.max[axis];

            if dir.abs() < 1e-12 {
                if origin < min || origin > max {
                    return None;
                }
                continue;
            }

            let inv_dir = 1.0 / dir;
            let mut t1 = (min - origin) * inv_dir;
            let mut t2 = (max - origin) * inv_dir;
            let mut axis_normal_sign = -1.0_f64;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
                axis_normal_sign = 1.0;
            }
            if t1 > t_min {
                t_min = t1;
                normal = Vec3::ZERO;
                normal[axis] = axis_normal_sign;
            }
            t_max = t_max.min(t2);
            if t_min > t_max {
                return None;
            }
        }

        if t_max < 0.0 {
            return None;
        }
        let t = if t_min >= 0.0 { t_min } else { 0.0 };
        Some((t, normal))
    }

    #[must_use]
    pub fn surface_area(&self) -> f64 {
        let lens = self.lens();
        2.0 * (lens.x * lens.y + lens.y * lens.z + lens.x * lens.z)
    }

    #[must_use]
    pub fn volume(&self) -> f64 {
        let lens = self.lens();
        lens.x * lens.y * lens.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_hits_box_face_on() {
        let aabb = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let (t, normal) = aabb.intersect_ray(&ray).expect("should hit");
        assert!((t - 4.0).abs() < 1e-9);
        assert_eq!(normal, Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn ray_misses_box_beside_it() {
        let aabb = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let ray = Ray::new(Vec3::new(-5.0, 5.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(aabb.intersect_ray(&ray).is_none());
    }

    #[test]
    fn overlap_is_zero_when_disjoint() {
        let a = Aabb::new(Vec3::ZERO, Vec3::splat(1.0));
        let b = Aabb::new(Vec3::splat(5.0), Vec3::splat(6.0));
        assert_eq!(a.overlap(&b), Vec3::ZERO);
    }
}
