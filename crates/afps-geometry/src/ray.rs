use crate::Vec3;

/// A ray with a pre-normalized direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Normalizes `direction`; a zero-length direction becomes `+x` so the
    /// ray never carries a NaN.
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        let direction = if direction.length_squared() > 1e-18 {
            direction.normalize()
        } else {
            Vec3::X
        };
        Self { origin, direction }
    }

    #[must_use]
    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.direction * t
    }
}
