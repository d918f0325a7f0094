//! On-screen feedback text, recording indicators and the F3 debug overlay.

use bevy::prelude::*;
use std::collections::VecDeque;
use viewpoint::ViewOwner;

use crate::driver::ViewerRig;
use crate::room::SceneHandles;

/// Plugin for HUD rendering.
pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DebugOverlay>()
            .add_systems(Startup, setup_hud)
            .add_systems(
                Update,
                (
                    update_feedback_text,
                    sync_indicators,
                    toggle_debug_overlay,
                    update_debug_text,
                )
                    .run_if(resource_exists::<ViewerRig>),
            );
    }
}

/// Resource controlling debug overlay settings.
#[derive(Resource, Default)]
pub struct DebugOverlay {
    pub enabled: bool,
}

#[derive(Component)]
pub struct FeedbackText;

#[derive(Component)]
pub struct DebugOverlayContainer;

#[derive(Component)]
pub struct DebugText;

/// Local resource for FPS history.
#[derive(Default)]
struct FpsHistory {
    history: VecDeque<f32>,
}

impl FpsHistory {
    fn push(&mut self, fps: f32) {
        self.history.push_back(fps);
        if self.history.len() > 60 {
            self.history.pop_front();
        }
    }

    fn average(&self) -> f32 {
        if self.history.is_empty() {
            0.0
        } else {
            self.history.iter().sum::<f32>() / self.history.len() as f32
        }
    }
}

fn setup_hud(mut commands: Commands) {
    // Crosshair
    commands
        .spawn(NodeBundle {
            style: Style {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            ..default()
        })
        .with_children(|parent| {
            parent.spawn(TextBundle::from_section(
                "+",
                TextStyle {
                    font_size: 20.0,
                    color: Color::srgba(1.0, 1.0, 1.0, 0.6),
                    ..default()
                },
            ));
        });

    // Feedback text (bottom centre)
    commands
        .spawn(NodeBundle {
            style: Style {
                position_type: PositionType::Absolute,
                bottom: Val::Px(60.0),
                width: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                ..default()
            },
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                TextBundle::from_section(
                    "",
                    TextStyle {
                        font_size: 28.0,
                        color: Color::srgb(0.3, 1.0, 0.4),
                        ..default()
                    },
                ),
                FeedbackText,
            ));
        });

    // Debug overlay container (top-left)
    commands
        .spawn((
            NodeBundle {
                style: Style {
                    position_type: PositionType::Absolute,
                    top: Val::Px(10.0),
                    left: Val::Px(10.0),
                    padding: UiRect::all(Val::Px(10.0)),
                    flex_direction: FlexDirection::Column,
                    ..default()
                },
                background_color: Color::srgba(0.0, 0.0, 0.0, 0.8).into(),
                visibility: Visibility::Hidden,
                ..default()
            },
            DebugOverlayContainer,
        ))
        .with_children(|parent| {
            parent.spawn(TextBundle::from_section(
                "DEBUG (F3 to toggle)",
                TextStyle {
                    font_size: 14.0,
                    color: Color::srgb(0.9, 0.9, 0.3),
                    ..default()
                },
            ));
            parent.spawn((
                TextBundle::from_section(
                    "",
                    TextStyle {
                        font_size: 12.0,
                        color: Color::srgb(0.8, 0.8, 0.8),
                        ..default()
                    },
                ),
                DebugText,
            ));
        });
}

fn update_feedback_text(viewer: Res<ViewerRig>, mut text: Query<&mut Text, With<FeedbackText>>) {
    let message = viewer.hud.message().unwrap_or("");
    for mut text in text.iter_mut() {
        if text.sections[0].value != message {
            text.sections[0].value = message.to_string();
        }
    }
}

fn sync_indicators(
    mut viewer: ResMut<ViewerRig>,
    handles: Res<SceneHandles>,
    mut visibility: Query<&mut Visibility>,
) {
    for (indicator, visible) in viewer.hud.take_changed() {
        let Some(mut vis) = handles
            .indicators
            .get(&indicator)
            .and_then(|&e| visibility.get_mut(e).ok())
        else {
            continue;
        };
        *vis = if visible {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
}

fn toggle_debug_overlay(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut debug_overlay: ResMut<DebugOverlay>,
    mut container: Query<&mut Visibility, With<DebugOverlayContainer>>,
) {
    if keyboard.just_pressed(KeyCode::F3) {
        debug_overlay.enabled = !debug_overlay.enabled;

        for mut visibility in container.iter_mut() {
            *visibility = if debug_overlay.enabled {
                Visibility::Inherited
            } else {
                Visibility::Hidden
            };
        }

        let status = if debug_overlay.enabled { "ON" } else { "OFF" };
        tracing::info!("Debug overlay: {}", status);
    }
}

/// Short label for who owns the screen.
pub fn view_label(owner: ViewOwner) -> String {
    match owner {
        ViewOwner::FreeLook => "Free look".to_string(),
        ViewOwner::Trail(index) => format!("Trail cam {}", index + 1),
        ViewOwner::Viewfinder => "Viewfinder".to_string(),
        ViewOwner::Docking(group) => format!("Docking ({})", group),
        ViewOwner::Docked(group) => format!("Docked ({})", group),
    }
}

fn update_debug_text(
    debug_overlay: Res<DebugOverlay>,
    viewer: Res<ViewerRig>,
    time: Res<Time>,
    mut fps_history: Local<FpsHistory>,
    mut debug_text: Query<&mut Text, With<DebugText>>,
) {
    if !debug_overlay.enabled {
        return;
    }

    let dt = time.delta_seconds();
    if dt > 0.0 {
        fps_history.push(1.0 / dt);
    }

    let rig = &viewer.rig;
    let eye = viewer.eye.position;
    let mut lines = vec![
        format!("FPS: {:.0}", fps_history.average()),
        format!("View: {}", view_label(rig.view())),
        format!("Eye: ({:.2}, {:.2}, {:.2})", eye.x, eye.y, eye.z),
        format!(
            "Device: {}{}",
            rig.devices().current(),
            if rig.devices().is_switching() { " (switching)" } else { "" }
        ),
    ];
    for group in rig.feeds().groups() {
        lines.push(format!(
            "{}: {} feed {}/{}{}",
            group.name(),
            if group.is_active() { "online" } else { "offline" },
            group.index() + 1,
            group.len(),
            if group.is_docked() { " [docked]" } else { "" }
        ));
    }
    if let Some(door) = rig.doors().aimed() {
        lines.push(format!("Door: {} {:?} {:?}", door.name(), door.mode(), door.glow()));
    }
    lines.push(format!("Cues played: {}", viewer.audio.played()));

    for mut text in debug_text.iter_mut() {
        text.sections[0].value = lines.join("\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cam_events::GroupId;

    #[test]
    fn test_debug_overlay_default() {
        let overlay = DebugOverlay::default();
        assert!(!overlay.enabled);
    }

    #[test]
    fn test_fps_history() {
        let mut history = FpsHistory::default();
        assert_eq!(history.average(), 0.0);

        history.push(60.0);
        history.push(60.0);
        assert_eq!(history.average(), 60.0);

        history.push(30.0);
        assert!((history.average() - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_view_labels() {
        assert_eq!(view_label(ViewOwner::Trail(0)), "Trail cam 1");
        assert_eq!(view_label(ViewOwner::Docked(GroupId(1))), "Docked (group_1)");
    }
}
