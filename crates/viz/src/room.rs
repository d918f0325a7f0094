//! Room spawning: turns a room layout into Bevy entities and wires the rig.

use bevy::prelude::*;
use cam_events::{CameraId, DoorId, IndicatorId, MaterialId, ModelId, Pose, SurfaceId};
use cam_sim::Scenario;
use std::collections::HashMap;
use std::f32::consts::TAU;
use viewpoint::{RigConfig, SceneDirectory};

use crate::driver::ViewerRig;

/// Room layout and rig configuration chosen on the command line.
#[derive(Resource, Debug, Clone)]
pub struct ViewerSetup {
    pub config: RigConfig,
    pub room: Scenario,
}

/// Maps the rig's handles onto Bevy entities and assets.
#[derive(Resource, Debug, Default)]
pub struct SceneHandles {
    pub cameras: HashMap<CameraId, Entity>,
    pub models: HashMap<ModelId, Entity>,
    pub indicators: HashMap<IndicatorId, Entity>,
    pub door_materials: HashMap<DoorId, Handle<StandardMaterial>>,
    pub surfaces: HashMap<SurfaceId, Handle<Image>>,
    pub materials: HashMap<MaterialId, Handle<StandardMaterial>>,
}

/// Marks the player's camera.
#[derive(Component)]
pub struct EyeCamera;

/// Marks a security or trail camera body.
#[derive(Component)]
pub struct FeedCamera {
    pub name: String,
}

pub fn pose_transform(pose: &Pose) -> Transform {
    Transform::from_translation(pose.position).with_rotation(pose.rotation)
}

/// Rotation turning a flat panel's front face (+Z) toward `normal`.
pub fn panel_rotation(normal: Vec3) -> Quat {
    Quat::from_rotation_arc(Vec3::Z, normal.normalize_or_zero())
}

/// Where the `index`-th of `count` room cameras hangs: evenly spaced on a
/// ring under the ceiling.
pub fn ring_position(index: usize, count: usize, radius: f32, height: f32) -> Vec3 {
    let angle = TAU * index as f32 / count.max(1) as f32;
    Vec3::new(angle.cos() * radius, height, angle.sin() * radius)
}

const RING_TARGET: Vec3 = Vec3::new(0.0, 1.0, 0.0);

/// Spawns the room, then sets the rig up against it.
pub fn setup_room(
    mut commands: Commands,
    setup: Res<ViewerSetup>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let layout = &setup.room.scene;
    let scene = setup.room.build_scene();
    let mut handles = SceneHandles::default();
    let mut order: isize = 0;
    let mut next_order = || {
        order += 1;
        order
    };

    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 150.0,
    });
    commands.spawn(PointLightBundle {
        point_light: PointLight {
            intensity: 1_500_000.0,
            shadows_enabled: true,
            ..default()
        },
        transform: Transform::from_xyz(0.0, 2.9, 0.0),
        ..default()
    });
    commands.spawn(PbrBundle {
        mesh: meshes.add(Plane3d::default().mesh().size(8.0, 8.0)),
        material: materials.add(Color::srgb(0.25, 0.25, 0.27)),
        ..default()
    });

    let eye_pose = setup.room.eye.pose();
    if let Some(id) = scene.eye_camera() {
        let entity = commands
            .spawn((
                Camera3dBundle {
                    transform: pose_transform(&eye_pose),
                    ..default()
                },
                EyeCamera,
            ))
            .id();
        handles.cameras.insert(id, entity);
    }

    let panel_material = materials.add(Color::srgb(0.12, 0.12, 0.14));
    for panel in &layout.panels {
        let Some(model) = scene.model(&panel.name) else {
            continue;
        };
        let entity = commands
            .spawn((
                PbrBundle {
                    mesh: meshes.add(Cuboid::new(panel.size.x, panel.size.y, 0.03)),
                    material: panel_material.clone(),
                    transform: Transform::from_translation(panel.center)
                        .with_rotation(panel_rotation(panel.normal)),
                    ..default()
                },
                Name::new(panel.name.clone()),
            ))
            .id();
        handles.models.insert(model, entity);
    }

    for door in &layout.doors {
        let Some((id, model, hinge)) = scene.door(&door.name) else {
            continue;
        };
        let material = materials.add(StandardMaterial {
            base_color: Color::srgb(0.45, 0.3, 0.2),
            ..default()
        });
        let panel = PbrBundle {
            mesh: meshes.add(Cuboid::new(door.size.x, door.size.y, 0.05)),
            material: material.clone(),
            transform: Transform::from_translation(door.center - hinge.position)
                .with_rotation(panel_rotation(door.normal)),
            ..default()
        };
        let entity = commands
            .spawn((
                SpatialBundle::from_transform(pose_transform(&hinge)),
                Name::new(door.name.clone()),
            ))
            .with_children(|parent| {
                parent.spawn(panel);
            })
            .id();
        handles.models.insert(model, entity);
        handles.door_materials.insert(id, material);
    }

    let device_mesh = meshes.add(Cuboid::new(0.12, 0.09, 0.18));
    let device_material = materials.add(Color::srgb(0.1, 0.1, 0.1));
    for name in &layout.models {
        let Some(model) = scene.model(name) else {
            continue;
        };
        let entity = commands
            .spawn((
                PbrBundle {
                    mesh: device_mesh.clone(),
                    material: device_material.clone(),
                    ..default()
                },
                Name::new(name.clone()),
            ))
            .id();
        handles.models.insert(model, entity);
    }

    // Device cameras ride on their device model.
    let devices = &setup.config.devices;
    let mounts: HashMap<&str, &str> = [&devices.camcorder, &devices.polaroid]
        .into_iter()
        .filter_map(|d| Some((d.camera.as_deref()?, d.model.as_deref()?)))
        .collect();

    let body_mesh = meshes.add(Cuboid::new(0.15, 0.1, 0.25));
    let indicator_mesh = meshes.add(Sphere::new(0.025));
    let indicator_material = materials.add(StandardMaterial {
        base_color: Color::srgb(1.0, 0.1, 0.1),
        emissive: LinearRgba::rgb(4.0, 0.2, 0.2),
        ..default()
    });

    let room_cameras: Vec<&String> = layout
        .feeds
        .iter()
        .chain(layout.cameras.iter().filter(|n| !mounts.contains_key(n.as_str())))
        .collect();
    for (index, name) in room_cameras.iter().enumerate() {
        let Some(id) = scene.camera(name) else {
            continue;
        };
        let position = ring_position(index, room_cameras.len(), 3.4, 2.6);
        let mut indicator = None;
        let entity = commands
            .spawn((
                Camera3dBundle {
                    camera: Camera {
                        order: next_order(),
                        is_active: false,
                        ..default()
                    },
                    transform: Transform::from_translation(position).looking_at(RING_TARGET, Vec3::Y),
                    ..default()
                },
                FeedCamera {
                    name: name.to_string(),
                },
                Name::new(name.to_string()),
            ))
            .with_children(|parent| {
                parent.spawn(PbrBundle {
                    mesh: body_mesh.clone(),
                    material: device_material.clone(),
                    transform: Transform::from_xyz(0.0, 0.0, 0.15),
                    ..default()
                });
                if scene.indicator(name).is_some() {
                    indicator = Some(
                        parent
                            .spawn(PbrBundle {
                                mesh: indicator_mesh.clone(),
                                material: indicator_material.clone(),
                                transform: Transform::from_xyz(0.05, 0.07, 0.05),
                                visibility: Visibility::Hidden,
                                ..default()
                            })
                            .id(),
                    );
                }
            })
            .id();
        handles.cameras.insert(id, entity);
        if let (Some(rec), Some(indicator)) = (scene.indicator(name), indicator) {
            handles.indicators.insert(rec, indicator);
        }
    }

    for (camera_name, model_name) in &mounts {
        let (Some(id), Some(model)) = (scene.camera(camera_name), scene.model(model_name)) else {
            continue;
        };
        let Some(&parent) = handles.models.get(&model) else {
            continue;
        };
        let entity = commands
            .spawn((
                Camera3dBundle {
                    camera: Camera {
                        order: next_order(),
                        is_active: false,
                        ..default()
                    },
                    ..default()
                },
                Name::new(camera_name.to_string()),
            ))
            .set_parent(parent)
            .id();
        handles.cameras.insert(id, entity);
    }

    tracing::info!(
        "Room '{}': {} cameras, {} models",
        setup.room.name,
        handles.cameras.len(),
        handles.models.len()
    );

    match ViewerRig::setup(&setup.config, scene, eye_pose) {
        Ok(viewer) => commands.insert_resource(viewer),
        Err(e) => tracing::error!("Rig setup failed: {}", e),
    }
    commands.insert_resource(handles);
}

/// Moves the eye, device models and doors to where the rig says they are.
pub fn sync_transforms(
    viewer: Res<ViewerRig>,
    handles: Res<SceneHandles>,
    mut transforms: Query<&mut Transform>,
) {
    let rig = &viewer.rig;
    let eye = std::iter::once((rig.eye_camera(), viewer.eye))
        .filter_map(|(id, pose)| Some((*handles.cameras.get(&id)?, pose)));
    let models = rig
        .model_poses(&viewer.eye)
        .into_iter()
        .chain(rig.door_poses())
        .filter_map(|(id, pose)| Some((*handles.models.get(&id)?, pose)));

    for (entity, pose) in eye.chain(models) {
        if let Ok(mut transform) = transforms.get_mut(entity) {
            *transform = pose_transform(&pose);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_rotation_faces_normal() {
        let rotation = panel_rotation(Vec3::X);
        assert!((rotation * Vec3::Z).distance(Vec3::X) < 1e-5);
    }

    #[test]
    fn test_ring_positions_are_distinct() {
        let a = ring_position(0, 4, 3.0, 2.5);
        let b = ring_position(1, 4, 3.0, 2.5);

        assert!((a.length() - Vec3::new(3.0, 2.5, 0.0).length()).abs() < 1e-5);
        assert!(a.distance(b) > 1.0);
        assert_eq!(a.y, 2.5);
    }

    #[test]
    fn test_pose_transform_keeps_pose() {
        let pose = Pose::looking_to(Vec3::new(1.0, 2.0, 3.0), Vec3::X, Vec3::Y);
        let transform = pose_transform(&pose);

        assert_eq!(transform.translation, pose.position);
        assert!(transform.forward().distance(Vec3::X) < 1e-5);
    }
}
