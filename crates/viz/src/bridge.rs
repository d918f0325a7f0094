//! Service backends for the viewer.
//!
//! The rig talks to [`RenderOps`], which hands out handles immediately and
//! queues the work. [`apply_render_ops`] then carries the queue out against
//! Bevy cameras, images and materials once per frame.

use bevy::prelude::*;
use bevy::render::camera::RenderTarget as BevyTarget;
use bevy::render::render_resource::{
    Extent3d, TextureDescriptor, TextureDimension, TextureFormat, TextureUsages,
};
use bevy::window::WindowRef;
use cam_events::{
    CameraId, DoorId, Glow, IndicatorId, MaterialBinding, MaterialId, ModelId, RenderTarget,
    SurfaceId,
};
use std::collections::HashMap;
use viewpoint::{AudioService, DisplayService, RenderError, RenderService};

use crate::room::SceneHandles;
use crate::ViewerRig;

/// One queued render operation.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOp {
    AllocateSurface { surface: SurfaceId, size: u32 },
    AllocateMaterial { material: MaterialId, display: ModelId },
    BindOutput { camera: CameraId, target: RenderTarget },
    SetEnabled { camera: CameraId, enabled: bool },
    Retarget { material: MaterialId, binding: MaterialBinding },
    RenderOnce { camera: CameraId, surface: SurfaceId },
    SetVisible { model: ModelId, visible: bool },
    SetGlow { door: DoorId, glow: Glow },
}

/// Render service that records operations for the frame's apply pass.
#[derive(Debug, Default)]
pub struct RenderOps {
    next_surface: u32,
    next_material: u32,
    ops: Vec<RenderOp>,
}

impl RenderOps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &[RenderOp] {
        &self.ops
    }

    pub fn drain(&mut self) -> Vec<RenderOp> {
        std::mem::take(&mut self.ops)
    }
}

impl RenderService for RenderOps {
    fn allocate_surface(&mut self, label: &str, size: u32) -> Result<SurfaceId, RenderError> {
        if size == 0 {
            return Err(RenderError::AllocationFailed {
                what: format!("surface {}", label),
            });
        }
        let surface = SurfaceId(self.next_surface);
        self.next_surface += 1;
        self.ops.push(RenderOp::AllocateSurface { surface, size });
        Ok(surface)
    }

    fn allocate_material(&mut self, display: ModelId) -> Result<MaterialId, RenderError> {
        let material = MaterialId(self.next_material);
        self.next_material += 1;
        self.ops.push(RenderOp::AllocateMaterial { material, display });
        Ok(material)
    }

    fn bind_output(&mut self, camera: CameraId, target: RenderTarget) -> Result<(), RenderError> {
        self.ops.push(RenderOp::BindOutput { camera, target });
        Ok(())
    }

    fn set_camera_enabled(&mut self, camera: CameraId, enabled: bool) {
        self.ops.push(RenderOp::SetEnabled { camera, enabled });
    }

    fn retarget_material(&mut self, material: MaterialId, binding: MaterialBinding) {
        self.ops.push(RenderOp::Retarget { material, binding });
    }

    fn render_once(&mut self, camera: CameraId, surface: SurfaceId) {
        self.ops.push(RenderOp::RenderOnce { camera, surface });
    }

    fn set_model_visible(&mut self, model: ModelId, visible: bool) {
        self.ops.push(RenderOp::SetVisible { model, visible });
    }

    fn set_glow(&mut self, door: DoorId, glow: Glow) {
        self.ops.push(RenderOp::SetGlow { door, glow });
    }
}

/// Cues are logged; the viewer ships no audio assets.
#[derive(Debug, Default)]
pub struct CueLog {
    played: u64,
    last: Option<String>,
}

impl CueLog {
    pub fn played(&self) -> u64 {
        self.played
    }

    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }
}

impl AudioService for CueLog {
    fn play_cue(&mut self, cue: &str, position: Vec3) {
        tracing::info!("Cue {} at ({:.1}, {:.1}, {:.1})", cue, position.x, position.y, position.z);
        self.played += 1;
        self.last = Some(cue.to_string());
    }
}

/// On-screen feedback text and indicator state.
#[derive(Debug, Default)]
pub struct HudState {
    message: Option<(String, f32)>,
    indicators: HashMap<IndicatorId, bool>,
    changed: Vec<IndicatorId>,
}

impl HudState {
    /// The message still on screen, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_ref().map(|(text, _)| text.as_str())
    }

    pub fn tick(&mut self, dt: f32) {
        if let Some((_, remaining)) = &mut self.message {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.message = None;
            }
        }
    }

    pub fn indicator(&self, indicator: IndicatorId) -> bool {
        self.indicators.get(&indicator).copied().unwrap_or(false)
    }

    /// Indicators whose state changed since the last call.
    pub fn take_changed(&mut self) -> Vec<(IndicatorId, bool)> {
        let changed = std::mem::take(&mut self.changed);
        changed
            .into_iter()
            .map(|id| (id, self.indicator(id)))
            .collect()
    }
}

impl DisplayService for HudState {
    fn show_text(&mut self, text: &str, duration: f32) {
        self.message = Some((text.to_string(), duration));
    }

    fn set_indicator(&mut self, indicator: IndicatorId, visible: bool) {
        let previous = self.indicators.insert(indicator, visible);
        if previous != Some(visible) && !self.changed.contains(&indicator) {
            self.changed.push(indicator);
        }
    }
}

/// A square image cameras can render into.
pub fn render_image(size: u32) -> Image {
    let extent = Extent3d {
        width: size,
        height: size,
        ..default()
    };
    let mut image = Image {
        texture_descriptor: TextureDescriptor {
            label: None,
            size: extent,
            dimension: TextureDimension::D2,
            format: TextureFormat::Bgra8UnormSrgb,
            mip_level_count: 1,
            sample_count: 1,
            usage: TextureUsages::TEXTURE_BINDING
                | TextureUsages::COPY_DST
                | TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        },
        ..default()
    };
    image.resize(extent);
    image
}

pub const PLACEHOLDER_COLOR: Color = Color::srgb(0.05, 0.06, 0.08);

/// Emissive level of a door panel for each glow level.
pub fn glow_emissive(glow: Glow) -> LinearRgba {
    match glow {
        Glow::Off => LinearRgba::BLACK,
        Glow::Far => LinearRgba::rgb(0.25, 0.18, 0.02),
        Glow::Near => LinearRgba::rgb(1.0, 0.75, 0.1),
    }
}

/// A camera pointed at a surface for one frame, to be put back next frame.
#[derive(Debug, Clone)]
pub struct PendingCapture {
    entity: Entity,
    target: BevyTarget,
    active: bool,
}

/// Carries out the rig's queued render operations.
#[allow(clippy::too_many_arguments)]
pub fn apply_render_ops(
    mut viewer: ResMut<ViewerRig>,
    mut handles: ResMut<SceneHandles>,
    mut images: ResMut<Assets<Image>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut cameras: Query<&mut Camera>,
    mut visibility: Query<&mut Visibility>,
    mut mesh_materials: Query<&mut Handle<StandardMaterial>>,
    mut captures: Local<Vec<PendingCapture>>,
) {
    for capture in captures.drain(..) {
        if let Ok(mut camera) = cameras.get_mut(capture.entity) {
            camera.target = capture.target;
            camera.is_active = capture.active;
        }
    }

    for op in viewer.render.drain() {
        match op {
            RenderOp::AllocateSurface { surface, size } => {
                let image = images.add(render_image(size));
                handles.surfaces.insert(surface, image);
            }
            RenderOp::AllocateMaterial { material, display } => {
                let handle = materials.add(StandardMaterial {
                    base_color: PLACEHOLDER_COLOR,
                    unlit: true,
                    ..default()
                });
                if let Some(mut mesh_material) = handles
                    .models
                    .get(&display)
                    .and_then(|&e| mesh_materials.get_mut(e).ok())
                {
                    *mesh_material = handle.clone();
                } else {
                    // tracing's macros import a `display` fn that would shadow the local.
                    let model = display;
                    tracing::warn!("Material {} has no display entity for {}", material, model);
                }
                handles.materials.insert(material, handle);
            }
            RenderOp::BindOutput { camera, target } => {
                let target = match target {
                    RenderTarget::Screen => Some(BevyTarget::Window(WindowRef::Primary)),
                    RenderTarget::Surface(surface) => {
                        handles.surfaces.get(&surface).cloned().map(BevyTarget::Image)
                    }
                };
                let entity = handles.cameras.get(&camera).copied();
                match (entity.and_then(|e| cameras.get_mut(e).ok()), target) {
                    (Some(mut cam), Some(target)) => cam.target = target,
                    _ => tracing::warn!("Cannot bind {} output", camera),
                }
            }
            RenderOp::SetEnabled { camera, enabled } => {
                if let Some(mut cam) = handles
                    .cameras
                    .get(&camera)
                    .and_then(|&e| cameras.get_mut(e).ok())
                {
                    cam.is_active = enabled;
                }
            }
            RenderOp::Retarget { material, binding } => {
                let Some(mat) = handles
                    .materials
                    .get(&material)
                    .and_then(|h| materials.get_mut(h))
                else {
                    continue;
                };
                match binding {
                    MaterialBinding::Live(surface) => {
                        mat.base_color = Color::WHITE;
                        mat.base_color_texture = handles.surfaces.get(&surface).cloned();
                    }
                    MaterialBinding::Placeholder => {
                        mat.base_color = PLACEHOLDER_COLOR;
                        mat.base_color_texture = None;
                    }
                }
            }
            RenderOp::RenderOnce { camera, surface } => {
                let (Some(&entity), Some(image)) =
                    (handles.cameras.get(&camera), handles.surfaces.get(&surface))
                else {
                    continue;
                };
                if let Ok(mut cam) = cameras.get_mut(entity) {
                    captures.push(PendingCapture {
                        entity,
                        target: cam.target.clone(),
                        active: cam.is_active,
                    });
                    cam.target = BevyTarget::Image(image.clone());
                    cam.is_active = true;
                }
            }
            RenderOp::SetVisible { model, visible } => {
                if let Some(mut vis) = handles
                    .models
                    .get(&model)
                    .and_then(|&e| visibility.get_mut(e).ok())
                {
                    *vis = if visible {
                        Visibility::Inherited
                    } else {
                        Visibility::Hidden
                    };
                }
            }
            RenderOp::SetGlow { door, glow } => {
                if let Some(mat) = handles
                    .door_materials
                    .get(&door)
                    .and_then(|h| materials.get_mut(h))
                {
                    mat.emissive = glow_emissive(glow);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ops_hand_out_sequential_handles() {
        let mut ops = RenderOps::new();

        let a = ops.allocate_surface("lobby", 256).unwrap();
        let b = ops.allocate_surface("warehouse", 256).unwrap();
        let m = ops.allocate_material(ModelId(3)).unwrap();

        assert_ne!(a, b);
        assert_eq!(m, MaterialId(0));
        assert_eq!(ops.pending().len(), 3);
        assert_eq!(
            ops.pending()[2],
            RenderOp::AllocateMaterial {
                material: m,
                display: ModelId(3)
            }
        );
    }

    #[test]
    fn test_zero_sized_surface_rejected() {
        let mut ops = RenderOps::new();
        assert!(ops.allocate_surface("bad", 0).is_err());
        assert!(ops.pending().is_empty());
    }

    #[test]
    fn test_drain_keeps_order() {
        let mut ops = RenderOps::new();
        ops.set_camera_enabled(CameraId(1), false);
        ops.set_camera_enabled(CameraId(2), true);

        let drained = ops.drain();
        assert_eq!(
            drained,
            vec![
                RenderOp::SetEnabled { camera: CameraId(1), enabled: false },
                RenderOp::SetEnabled { camera: CameraId(2), enabled: true },
            ]
        );
        assert!(ops.pending().is_empty());
    }

    #[test]
    fn test_hud_message_expires() {
        let mut hud = HudState::default();
        hud.show_text("LOBBY CAMS OFFLINE", 1.0);

        hud.tick(0.5);
        assert_eq!(hud.message(), Some("LOBBY CAMS OFFLINE"));
        hud.tick(0.6);
        assert_eq!(hud.message(), None);
    }

    #[test]
    fn test_hud_reports_indicator_changes_once() {
        let mut hud = HudState::default();
        hud.set_indicator(IndicatorId(0), true);
        hud.set_indicator(IndicatorId(0), true);
        hud.set_indicator(IndicatorId(1), false);

        let changed = hud.take_changed();
        assert_eq!(changed, vec![(IndicatorId(0), true), (IndicatorId(1), false)]);
        assert!(hud.take_changed().is_empty());
    }

    #[test]
    fn test_render_image_is_attachment() {
        let image = render_image(128);
        assert_eq!(image.texture_descriptor.size.width, 128);
        assert!(image
            .texture_descriptor
            .usage
            .contains(TextureUsages::RENDER_ATTACHMENT));
    }
}
