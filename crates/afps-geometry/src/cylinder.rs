use crate::{Ray, Vec3};

/// An upright (z-axis-aligned) cylinder, used to model a player's hitbox:
/// `radius` in the xy plane, `height` measured up from `base`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cylinder {
    pub base: Vec3,
    pub radius: f64,
    pub height: f64,
}

impl Cylinder {
    #[must_use]
    pub fn new(base: Vec3, radius: f64, height: f64) -> Self {
        Self {
            base,
            radius,
            height,
        }
    }

    /// Casts an infinite ray (`t >= 0`) against the cylinder's lateral
    /// surface, clipped to its vertical extent. Returns the smallest
    /// non-negative `t`.
    #[must_use]
    pub fn raycast(&self, ray: &Ray) -> Option<f64> {
        let ox = ray.origin.x - self.base.x;
        let oy = ray.origin.y - self.base.y;
        let dx = ray.direction.x;
        let dy = ray.direction.y;

        let a = dx * dx + dy * dy;
        let candidates: [Option<f64>; 2] = if a < 1e-12 {
            // Ray is vertical in xy: either always inside the circle or
            // never. If inside, the nearest surface point is t=0.
            if ox * ox + oy * oy <= self.radius * self.radius {
                [Some(0.0), None]
            } else {
                [None, None]
            }
        } else {
            let b = 2.0 * (dx * ox + dy * oy);
            let c = ox * ox + oy * oy - self.radius * self.radius;
            let discriminant = b * b - 4.0 * a * c;
            if discriminant < 0.0 {
                [None, None]
            } else {
                let sqrt_disc = discriminant.sqrt();
                let t1 = (-b - sqrt_disc) / (2.0 * a);
                let t2 = (-b + sqrt_disc) / (2.0 * a);
                [Some(t1), Some(t2)]
            }
        };

        let top = self.base.z + self.height;
        let mut best: Option<f64> = None;
        for t in candidates.into_iter().flatten() {
            if t < 0.0 {
                continue;
            }
            let z = ray.origin.z + ray.direction.z * t;
            if z < self.base.z || z > top {
                continue;
            }
            best = Some(best.map_or(t, |cur: f64| cur.min(t)));
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raycast_hits_cylinder_head_on() {
        let cyl = Cylinder::new(Vec3::new(0.0, 0.0, 0.0), 0.5, 1.8);
        let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.9), Vec3::new(1.0, 0.0, 0.0));
        let t = cyl.raycast(&ray).expect("should hit");
        assert!((t - 4.5).abs() < 1e-9);
    }

    #[test]
    fn raycast_misses_above_cylinder() {
        let cyl = Cylinder::new(Vec3::new(0.0, 0.0, 0.0), 0.5, 1.8);
        let ray = Ray::new(Vec3::new(-5.0, 0.0, 5.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(cyl.raycast(&ray).is_none());
    }

    #[test]
    fn raycast_misses_when_offset_beyond_radius() {
        let cyl = Cylinder::new(Vec3::new(0.0, 0.0, 0.0), 0.5, 1.8);
        let ray = Ray::new(Vec3::new(-5.0, 5.0, 0.9), Vec3::new(1.0, 0.0, 0.0));
        assert!(cyl.raycast(&ray).is_none());
    }
}
