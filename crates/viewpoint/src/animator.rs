//! Exponential-decay approach toward a target.
//!
//! One [`Approach`] drives one leg of a transition: the caller steps it once
//! per frame and snaps to the target when it reports arrival. Multi-leg
//! sequences (lower, then raise) run their legs one after the other.

use bevy_math::{Quat, Vec3};
use cam_events::Pose;

/// Distance below which a leg counts as arrived.
pub const ARRIVAL_TOLERANCE: f32 = 0.01;

/// Angle in radians below which a rotation counts as arrived.
pub const ANGLE_TOLERANCE: f32 = 0.01;

/// Fraction of the remaining distance covered this frame.
pub fn lerp_factor(rate: f32, dt: f32) -> f32 {
    (rate * dt).clamp(0.0, 1.0)
}

/// Result of stepping an approach by one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step<T> {
    /// Still on the way; the new intermediate value.
    Moving(T),
    /// Within tolerance; the exact target.
    Arrived(T),
}

impl<T: Copy> Step<T> {
    pub fn value(&self) -> T {
        match self {
            Step::Moving(v) | Step::Arrived(v) => *v,
        }
    }

    pub fn is_arrived(&self) -> bool {
        matches!(self, Step::Arrived(_))
    }
}

/// Chases a target position at a fixed rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Approach {
    pub target: Vec3,
    pub rate: f32,
}

impl Approach {
    pub fn new(target: Vec3, rate: f32) -> Self {
        Self { target, rate }
    }

    /// Advances `current` by one frame.
    pub fn step(&self, current: Vec3, dt: f32) -> Step<Vec3> {
        if current.distance(self.target) < ARRIVAL_TOLERANCE {
            return Step::Arrived(self.target);
        }
        Step::Moving(current.lerp(self.target, lerp_factor(self.rate, dt)))
    }
}

/// Chases a target pose: position by lerp, rotation by slerp, same factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseApproach {
    pub target: Pose,
    pub rate: f32,
}

impl PoseApproach {
    pub fn new(target: Pose, rate: f32) -> Self {
        Self { target, rate }
    }

    /// Arrives only when both position and rotation are within tolerance.
    pub fn step(&self, current: &Pose, dt: f32) -> Step<Pose> {
        let close = current.position.distance(self.target.position) < ARRIVAL_TOLERANCE
            && current.angle_to(&self.target) < ANGLE_TOLERANCE;
        if close {
            return Step::Arrived(self.target);
        }

        let t = lerp_factor(self.rate, dt);
        Step::Moving(Pose {
            position: current.position.lerp(self.target.position, t),
            rotation: chase_rotation(current.rotation, self.target.rotation, self.rate, dt),
        })
    }
}

/// One frame of spherical chase toward `target`, with no arrival check.
pub fn chase_rotation(current: Quat, target: Quat, rate: f32, dt: f32) -> Quat {
    current.slerp(target, lerp_factor(rate, dt)).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_lerp_factor_clamps() {
        assert_eq!(lerp_factor(5.0, 1.0), 1.0);
        assert_eq!(lerp_factor(5.0, -1.0), 0.0);
        assert!((lerp_factor(5.0, 0.1) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_approach_converges_and_snaps() {
        let approach = Approach::new(Vec3::new(0.0, -0.5, 0.0), 5.0);
        let mut current = Vec3::ZERO;
        let mut frames = 0;

        loop {
            match approach.step(current, DT) {
                Step::Moving(next) => {
                    assert!(next.distance(approach.target) < current.distance(approach.target));
                    current = next;
                }
                Step::Arrived(at) => {
                    current = at;
                    break;
                }
            }
            frames += 1;
            assert!(frames < 10_000, "approach never arrived");
        }

        assert_eq!(current, approach.target);
    }

    #[test]
    fn test_approach_already_there() {
        let approach = Approach::new(Vec3::ONE, 5.0);
        let step = approach.step(Vec3::ONE + Vec3::splat(0.001), DT);

        assert!(step.is_arrived());
        assert_eq!(step.value(), Vec3::ONE);
    }

    #[test]
    fn test_pose_approach_requires_rotation() {
        let target = Pose::looking_to(Vec3::ZERO, Vec3::X, Vec3::Y);
        let approach = PoseApproach::new(target, 4.0);

        // Right position, wrong rotation: still moving.
        let current = Pose::from_position(Vec3::ZERO);
        assert!(!approach.step(&current, DT).is_arrived());
    }

    #[test]
    fn test_pose_approach_arrives() {
        let target = Pose::looking_to(Vec3::new(0.0, 1.0, 2.0), Vec3::NEG_Z, Vec3::Y);
        let approach = PoseApproach::new(target, 4.0);
        let mut current = Pose::looking_to(Vec3::new(3.0, 1.5, 6.0), Vec3::X, Vec3::Y);

        for _ in 0..10_000 {
            match approach.step(&current, DT) {
                Step::Moving(next) => current = next,
                Step::Arrived(at) => {
                    assert_eq!(at, target);
                    return;
                }
            }
        }
        panic!("pose approach never arrived");
    }

    #[test]
    fn test_chase_rotation_moves_toward_target() {
        let target = Quat::from_rotation_y(1.0);
        let next = chase_rotation(Quat::IDENTITY, target, 3.0, DT);

        assert!(next.angle_between(target) < Quat::IDENTITY.angle_between(target));
    }
}
