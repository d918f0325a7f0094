//! Ray casting against flat rectangular colliders.
//!
//! Monitors, toggle buttons and door panels are all treated as two-sided
//! rectangles, which is all the interaction ray needs.

use bevy_math::{Vec2, Vec3};

/// A flat rectangle facing `normal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub center: Vec3,
    /// Outward normal of the visible face.
    pub normal: Vec3,
    /// In-plane up direction; re-orthogonalized against `normal`.
    pub up: Vec3,
    /// Half width and half height.
    pub half_extents: Vec2,
}

impl Quad {
    pub fn new(center: Vec3, normal: Vec3, up: Vec3, size: Vec2) -> Self {
        Self {
            center,
            normal: normal.normalize_or_zero(),
            up,
            half_extents: size * 0.5,
        }
    }

    /// Distance along the ray to the quad, if the ray hits it within `max_distance`.
    pub fn intersect(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<f32> {
        let direction = direction.try_normalize()?;
        let denom = direction.dot(self.normal);
        if denom.abs() < 1e-6 {
            return None;
        }

        let t = (self.center - origin).dot(self.normal) / denom;
        if t < 0.0 || t > max_distance {
            return None;
        }

        let up = (self.up - self.normal * self.up.dot(self.normal)).try_normalize()?;
        let right = up.cross(self.normal);
        let local = origin + direction * t - self.center;

        let inside = local.dot(right).abs() <= self.half_extents.x
            && local.dot(up).abs() <= self.half_extents.y;
        inside.then_some(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall_monitor() -> Quad {
        // A 1x0.6 screen on the wall at z = -3, facing the room (+Z).
        Quad::new(Vec3::new(0.0, 1.5, -3.0), Vec3::Z, Vec3::Y, Vec2::new(1.0, 0.6))
    }

    #[test]
    fn test_hit_straight_on() {
        let t = wall_monitor().intersect(Vec3::new(0.0, 1.5, 0.0), Vec3::NEG_Z, 10.0);
        assert!((t.unwrap() - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_miss_outside_extents() {
        let quad = wall_monitor();
        assert!(quad.intersect(Vec3::new(0.6, 1.5, 0.0), Vec3::NEG_Z, 10.0).is_none());
        assert!(quad.intersect(Vec3::new(0.0, 1.85, 0.0), Vec3::NEG_Z, 10.0).is_none());
    }

    #[test]
    fn test_miss_beyond_range_or_behind() {
        let quad = wall_monitor();
        assert!(quad.intersect(Vec3::new(0.0, 1.5, 0.0), Vec3::NEG_Z, 2.0).is_none());
        assert!(quad.intersect(Vec3::new(0.0, 1.5, 0.0), Vec3::Z, 10.0).is_none());
    }

    #[test]
    fn test_parallel_ray_misses() {
        assert!(wall_monitor().intersect(Vec3::new(0.0, 1.5, 0.0), Vec3::X, 10.0).is_none());
    }
}
