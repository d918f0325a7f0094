//! Rigid poses (position + rotation) and the helpers the state machines need.
//!
//! Cameras look down their local -Z axis with +Y up, the same convention the
//! viewer's renderer uses.

use bevy_math::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// A position and orientation in world space (or relative to an owner).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Pose at `position` with no rotation.
    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    /// Pose at `position` looking along `direction`.
    ///
    /// Falls back to an alternate up axis when `direction` is parallel to `up`.
    pub fn looking_to(position: Vec3, direction: Vec3, up: Vec3) -> Self {
        Self::new(position, look_rotation(direction, up))
    }

    /// The direction this pose looks along (local -Z).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Local +Y in world space.
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// World pose of something attached to `self` at `local` offset.
    pub fn compose(&self, local: &Pose) -> Pose {
        Pose {
            position: self.position + self.rotation * local.position,
            rotation: (self.rotation * local.rotation).normalize(),
        }
    }

    /// Angle in radians between the two orientations.
    pub fn angle_to(&self, other: &Pose) -> f32 {
        self.rotation.angle_between(other.rotation)
    }
}

/// Rotation that points local -Z along `direction` with local +Y near `up`.
pub fn look_rotation(direction: Vec3, up: Vec3) -> Quat {
    let back = match (-direction).try_normalize() {
        Some(back) => back,
        None => return Quat::IDENTITY,
    };
    let right = up
        .cross(back)
        .try_normalize()
        .or_else(|| Vec3::Z.cross(back).try_normalize())
        .unwrap_or(Vec3::X);
    let up = back.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, back)).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looking_to_faces_direction() {
        let pose = Pose::looking_to(Vec3::ZERO, Vec3::X, Vec3::Y);
        assert!(pose.forward().distance(Vec3::X) < 1e-5);
        assert!(pose.up().distance(Vec3::Y) < 1e-5);
    }

    #[test]
    fn test_looking_straight_down_uses_fallback_up() {
        let pose = Pose::looking_to(Vec3::ZERO, Vec3::NEG_Y, Vec3::Y);
        assert!(pose.forward().distance(Vec3::NEG_Y) < 1e-5);
    }

    #[test]
    fn test_compose_applies_owner_rotation() {
        let owner = Pose::looking_to(Vec3::new(1.0, 0.0, 0.0), Vec3::X, Vec3::Y);
        let local = Pose::from_position(Vec3::new(0.0, 0.0, -2.0));
        let world = owner.compose(&local);

        // Two units in front of an owner that looks down +X.
        assert!(world.position.distance(Vec3::new(3.0, 0.0, 0.0)) < 1e-5);
    }

    #[test]
    fn test_pose_serialization() {
        let pose = Pose::from_position(Vec3::new(1.0, 2.0, 3.0));
        let json = serde_json::to_string(&pose).unwrap();
        let back: Pose = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pose);
    }
}
