//! First-person look and walk, applied only while the player owns the eye.

use bevy::math::EulerRot;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};
use std::f32::consts::FRAC_PI_2;
use viewpoint::ViewOwner;

use crate::driver::ViewerRig;
use crate::input::FrameInput;

/// Maximum pitch angle (in radians) to avoid flipping the camera upside down.
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;

#[derive(Resource, Debug, Clone)]
pub struct LookSettings {
    /// Radians per pixel of mouse motion
    pub sensitivity: f32,
    /// Walking speed in metres per second
    pub walk_speed: f32,
}

impl Default for LookSettings {
    fn default() -> Self {
        Self {
            sensitivity: 0.002,
            walk_speed: 2.0,
        }
    }
}

/// Turns `rotation` by a mouse delta, keeping the horizon level.
pub fn apply_look(rotation: Quat, delta: Vec2, sensitivity: f32) -> Quat {
    let (yaw, pitch, _) = rotation.to_euler(EulerRot::YXZ);
    let yaw = yaw - delta.x * sensitivity;
    let pitch = (pitch - delta.y * sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0)
}

/// Horizontal walking direction for `input` (x right, y forward).
pub fn walk_direction(rotation: Quat, input: Vec2) -> Vec3 {
    let forward = (rotation * Vec3::NEG_Z).with_y(0.0).normalize_or_zero();
    let right = (rotation * Vec3::X).with_y(0.0).normalize_or_zero();
    (forward * input.y + right * input.x).normalize_or_zero()
}

pub fn free_look(
    time: Res<Time>,
    settings: Res<LookSettings>,
    keys: Res<ButtonInput<KeyCode>>,
    frame: Res<FrameInput>,
    mut viewer: ResMut<ViewerRig>,
) {
    let delta = viewer.rig.look_delta(&frame.0);
    if delta != Vec2::ZERO {
        viewer.eye.rotation = apply_look(viewer.eye.rotation, delta, settings.sensitivity);
    }

    if viewer.rig.view() != ViewOwner::FreeLook {
        return;
    }
    let mut walk = Vec2::ZERO;
    if keys.pressed(KeyCode::KeyW) {
        walk.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyS) {
        walk.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) {
        walk.x += 1.0;
    }
    if keys.pressed(KeyCode::KeyA) {
        walk.x -= 1.0;
    }
    let step = walk_direction(viewer.eye.rotation, walk) * settings.walk_speed * time.delta_seconds();
    viewer.eye.position += step;
}

pub fn grab_cursor(mut windows: Query<&mut Window, With<PrimaryWindow>>) {
    for mut window in windows.iter_mut() {
        window.cursor.grab_mode = CursorGrabMode::Locked;
        window.cursor.visible = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_look_yaws_left_on_negative_x() {
        let rotation = apply_look(Quat::IDENTITY, Vec2::new(-100.0, 0.0), 0.01);
        let forward = rotation * Vec3::NEG_Z;
        assert!(forward.x < 0.0);
        assert!(forward.y.abs() < 1e-5);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let rotation = apply_look(Quat::IDENTITY, Vec2::new(0.0, -10_000.0), 0.01);
        let forward = rotation * Vec3::NEG_Z;
        assert!(forward.y > 0.99);
        assert!(forward.y < 1.0);
    }

    #[test]
    fn test_walk_stays_horizontal() {
        let looking_down = Quat::from_rotation_x(-0.8);
        let direction = walk_direction(looking_down, Vec2::new(0.0, 1.0));

        assert_eq!(direction.y, 0.0);
        assert!(direction.distance(Vec3::NEG_Z) < 1e-5);
        assert_eq!(walk_direction(Quat::IDENTITY, Vec2::ZERO), Vec3::ZERO);
    }
}
