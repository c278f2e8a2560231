//! Shared geometric primitives used by the simulation and combat resolver.
//!
//! Everything here operates in `f64` (`glam::DVec3`) rather than `f32`: the
//! simulation's determinism contract requires bit-identical results across
//! platforms, and `f64` gives headroom that keeps intermediate results from
//! drifting across the kind of long rewind windows the combat resolver uses.

mod aabb;
mod cylinder;
mod ray;
mod sweep;

pub use aabb::Aabb;
pub use cylinder::Cylinder;
pub use ray::Ray;
pub use sweep::{SweepHit, segment_vs_aabb, segment_vs_cylinder, sweep_aabb_vs_aabb};

/// A point or displacement in world space.
pub type Vec3 = glam::DVec3;

/// Shorthand for constructing a [`Vec3`], mirroring `glam`'s own `vec3`
/// free function but over `f64` components.
#[must_use]
pub const fn vec3(x: f64, y: f64, z: f64) -> Vec3 {
    Vec3::new(x, y, z)
}

/// Wraps an angle in radians into `(-pi, pi]`.
#[must_use]
pub fn wrap_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let two_pi = std::f64::consts::TAU;
    let mut wrapped = (angle + std::f64::consts::PI) % two_pi;
    if wrapped < 0.0 {
        wrapped += two_pi;
    }
    wrapped - std::f64::consts::PI
}

/// Clamps a possibly non-finite angle into a safe range, substituting `0.0`
/// for non-finite input so the simulation never propagates NaN/Inf.
#[must_use]
pub fn safe_angle(angle: f64) -> f64 {
    if angle.is_finite() { angle } else { 0.0 }
}

/// Yaw/pitch view angles, sanitized so trigonometric paths never see
/// non-finite or out-of-range values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewAngles {
    pub yaw: f64,
    pub pitch: f64,
}

impl ViewAngles {
    const PITCH_LIMIT: f64 = std::f64::consts::FRAC_PI_2 - 0.01;

    #[must_use]
    pub fn sanitize(yaw: f64, pitch: f64) -> Self {
        let yaw = wrap_angle(safe_angle(yaw));
        let pitch = safe_angle(pitch).clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
        Self { yaw, pitch }
    }

    /// Unit view direction derived from yaw and pitch. Yaw `0` points along
    /// `-y` (forward in this arena's convention), increasing clockwise
    /// toward `-x`; pitch `0` is level, positive pitch looks up.
    #[must_use]
    pub fn direction(self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vec3::new(-cos_pitch * sin_yaw, -cos_pitch * cos_yaw, sin_pitch)
    }
}
