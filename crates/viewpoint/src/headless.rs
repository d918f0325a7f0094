//! In-memory service backends.
//!
//! These record every side effect the core performs, so the headless runner
//! can log them and tests can assert on them. `HeadlessScene` doubles as the
//! name directory and the ray-cast scene.

use bevy_math::{Vec2, Vec3};
use cam_events::{
    CameraId, DoorId, Glow, IndicatorId, MaterialBinding, MaterialId, ModelId, Pose,
    RenderTarget, SurfaceId,
};
use std::collections::{HashMap, HashSet};

use crate::error::RenderError;
use crate::geometry::Quad;
use crate::services::{
    AudioService, DisplayService, RayHit, RenderService, SceneDirectory, SceneQuery,
};

/// Records camera, surface and material state.
#[derive(Debug, Default)]
pub struct HeadlessRender {
    next_surface: u32,
    next_material: u32,
    surfaces: HashMap<SurfaceId, String>,
    materials: HashMap<MaterialId, (ModelId, MaterialBinding)>,
    outputs: HashMap<CameraId, RenderTarget>,
    enabled: HashMap<CameraId, bool>,
    visible: HashMap<ModelId, bool>,
    glow: HashMap<DoorId, Glow>,
    captures: Vec<(CameraId, SurfaceId)>,
    rejected_cameras: HashSet<CameraId>,
    fail_allocations: bool,
}

impl HeadlessRender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later surface/material allocation fail.
    pub fn fail_allocations(&mut self) {
        self.fail_allocations = true;
    }

    /// Makes `bind_output` fail for `camera`.
    pub fn reject_binding(&mut self, camera: CameraId) {
        self.rejected_cameras.insert(camera);
    }

    pub fn is_enabled(&self, camera: CameraId) -> bool {
        self.enabled.get(&camera).copied().unwrap_or(false)
    }

    /// Cameras among `cameras` that are currently enabled.
    pub fn enabled_among(&self, cameras: &[CameraId]) -> Vec<CameraId> {
        cameras
            .iter()
            .copied()
            .filter(|c| self.is_enabled(*c))
            .collect()
    }

    pub fn output_of(&self, camera: CameraId) -> Option<RenderTarget> {
        self.outputs.get(&camera).copied()
    }

    pub fn binding_of(&self, material: MaterialId) -> Option<MaterialBinding> {
        self.materials.get(&material).map(|(_, binding)| *binding)
    }

    /// The model a material was placed on.
    pub fn display_of(&self, material: MaterialId) -> Option<ModelId> {
        self.materials.get(&material).map(|(display, _)| *display)
    }

    pub fn is_visible(&self, model: ModelId) -> bool {
        self.visible.get(&model).copied().unwrap_or(false)
    }

    pub fn glow_of(&self, door: DoorId) -> Glow {
        self.glow.get(&door).copied().unwrap_or_default()
    }

    pub fn captures(&self) -> &[(CameraId, SurfaceId)] {
        &self.captures
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }
}

impl RenderService for HeadlessRender {
    fn allocate_surface(&mut self, label: &str, _size: u32) -> Result<SurfaceId, RenderError> {
        if self.fail_allocations {
            return Err(RenderError::AllocationFailed {
                what: format!("surface {}", label),
            });
        }
        let id = SurfaceId(self.next_surface);
        self.next_surface += 1;
        self.surfaces.insert(id, label.to_string());
        Ok(id)
    }

    fn allocate_material(&mut self, display: ModelId) -> Result<MaterialId, RenderError> {
        if self.fail_allocations {
            return Err(RenderError::AllocationFailed {
                what: format!("material for {}", display),
            });
        }
        let id = MaterialId(self.next_material);
        self.next_material += 1;
        self.materials
            .insert(id, (display, MaterialBinding::Placeholder));
        Ok(id)
    }

    fn bind_output(&mut self, camera: CameraId, target: RenderTarget) -> Result<(), RenderError> {
        if self.rejected_cameras.contains(&camera) {
            return Err(RenderError::BindingRejected { camera });
        }
        self.outputs.insert(camera, target);
        Ok(())
    }

    fn set_camera_enabled(&mut self, camera: CameraId, enabled: bool) {
        self.enabled.insert(camera, enabled);
    }

    fn retarget_material(&mut self, material: MaterialId, binding: MaterialBinding) {
        if let Some(entry) = self.materials.get_mut(&material) {
            entry.1 = binding;
        }
    }

    fn render_once(&mut self, camera: CameraId, surface: SurfaceId) {
        self.captures.push((camera, surface));
    }

    fn set_model_visible(&mut self, model: ModelId, visible: bool) {
        self.visible.insert(model, visible);
    }

    fn set_glow(&mut self, door: DoorId, glow: Glow) {
        self.glow.insert(door, glow);
    }
}

/// Counts cues per name. Memory stays bounded by the number of distinct cues.
#[derive(Debug, Default)]
pub struct HeadlessAudio {
    played: HashMap<String, usize>,
    last: Option<(String, Vec3)>,
}

impl HeadlessAudio {
    pub fn played(&self, cue: &str) -> usize {
        self.played.get(cue).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.played.values().sum()
    }

    /// The most recent cue and where it played.
    pub fn last_cue(&self) -> Option<(&str, Vec3)> {
        self.last.as_ref().map(|(cue, at)| (cue.as_str(), *at))
    }
}

impl AudioService for HeadlessAudio {
    fn play_cue(&mut self, cue: &str, position: Vec3) {
        *self.played.entry(cue.to_string()).or_default() += 1;
        self.last = Some((cue.to_string(), position));
    }
}

/// Keeps the latest text message and indicator state.
#[derive(Debug, Default)]
pub struct HeadlessDisplay {
    last_message: Option<(String, f32)>,
    message_count: usize,
    indicators: HashMap<IndicatorId, bool>,
}

impl HeadlessDisplay {
    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_ref().map(|(text, _)| text.as_str())
    }

    pub fn message_count(&self) -> usize {
        self.message_count
    }

    pub fn indicator(&self, indicator: IndicatorId) -> Option<bool> {
        self.indicators.get(&indicator).copied()
    }
}

impl DisplayService for HeadlessDisplay {
    fn show_text(&mut self, text: &str, duration: f32) {
        self.last_message = Some((text.to_string(), duration));
        self.message_count += 1;
    }

    fn set_indicator(&mut self, indicator: IndicatorId, visible: bool) {
        self.indicators.insert(indicator, visible);
    }
}

#[derive(Debug, Clone)]
struct Collider {
    model: ModelId,
    quad: Quad,
}

/// A named scene made of handles and flat colliders.
#[derive(Debug, Default)]
pub struct HeadlessScene {
    eye: Option<CameraId>,
    cameras: HashMap<String, CameraId>,
    models: HashMap<String, ModelId>,
    indicators: HashMap<String, IndicatorId>,
    doors: HashMap<String, (DoorId, ModelId, Pose)>,
    colliders: Vec<Collider>,
    next_camera: u32,
    next_model: u32,
    next_indicator: u32,
    next_door: u32,
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the free-look camera.
    pub fn add_eye(&mut self) -> CameraId {
        let id = self.add_camera("eye");
        self.eye = Some(id);
        id
    }

    pub fn add_camera(&mut self, name: &str) -> CameraId {
        let id = CameraId(self.next_camera);
        self.next_camera += 1;
        self.cameras.insert(name.to_string(), id);
        id
    }

    /// Registers a feed camera together with its recording indicator.
    pub fn add_feed(&mut self, name: &str) -> (CameraId, IndicatorId) {
        let camera = self.add_camera(name);
        let indicator = IndicatorId(self.next_indicator);
        self.next_indicator += 1;
        self.indicators.insert(name.to_string(), indicator);
        (camera, indicator)
    }

    /// Registers a model with no collider.
    pub fn add_model(&mut self, name: &str) -> ModelId {
        let id = ModelId(self.next_model);
        self.next_model += 1;
        self.models.insert(name.to_string(), id);
        id
    }

    /// Registers a model with a flat collider.
    pub fn add_quad(&mut self, name: &str, quad: Quad) -> ModelId {
        let model = self.add_model(name);
        self.colliders.push(Collider { model, quad });
        model
    }

    /// Registers a door hinged at `hinge`, with a panel collider.
    pub fn add_door(&mut self, name: &str, hinge: Pose, panel: Quad) -> DoorId {
        let model = self.add_quad(name, panel);
        let id = DoorId(self.next_door);
        self.next_door += 1;
        self.doors.insert(name.to_string(), (id, model, hinge));
        id
    }

    /// Shorthand for a wall-mounted screen or button facing `normal`.
    pub fn add_panel(&mut self, name: &str, center: Vec3, normal: Vec3, size: Vec2) -> ModelId {
        self.add_quad(name, Quad::new(center, normal, Vec3::Y, size))
    }
}

impl SceneDirectory for HeadlessScene {
    fn eye_camera(&self) -> Option<CameraId> {
        self.eye
    }

    fn camera(&self, name: &str) -> Option<CameraId> {
        self.cameras.get(name).copied()
    }

    fn model(&self, name: &str) -> Option<ModelId> {
        self.models.get(name).copied()
    }

    fn indicator(&self, feed_name: &str) -> Option<IndicatorId> {
        self.indicators.get(feed_name).copied()
    }

    fn door(&self, name: &str) -> Option<(DoorId, ModelId, Pose)> {
        self.doors.get(name).copied()
    }
}

impl SceneQuery for HeadlessScene {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        self.colliders
            .iter()
            .filter_map(|c| {
                c.quad
                    .intersect(origin, direction, max_distance)
                    .map(|distance| RayHit {
                        model: c.model,
                        distance,
                        origin: c.quad.center,
                        normal: c.quad.normal,
                    })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_hit_wins() {
        let mut scene = HeadlessScene::new();
        let far = scene.add_panel("far", Vec3::new(0.0, 0.0, -5.0), Vec3::Z, Vec2::ONE);
        let near = scene.add_panel("near", Vec3::new(0.0, 0.0, -2.0), Vec3::Z, Vec2::ONE);

        let hit = scene.raycast(Vec3::ZERO, Vec3::NEG_Z, 10.0).unwrap();
        assert_eq!(hit.model, near);
        assert_ne!(hit.model, far);
        assert!((hit.distance - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_directory_lookups() {
        let mut scene = HeadlessScene::new();
        let eye = scene.add_eye();
        let (cam, rec) = scene.add_feed("lobby_cam_1");

        assert_eq!(scene.eye_camera(), Some(eye));
        assert_eq!(scene.camera("lobby_cam_1"), Some(cam));
        assert_eq!(scene.indicator("lobby_cam_1"), Some(rec));
        assert_eq!(scene.camera("missing"), None);
    }

    #[test]
    fn test_render_records_state() {
        let mut render = HeadlessRender::new();
        let surface = render.allocate_surface("lobby", 512).unwrap();
        let material = render.allocate_material(ModelId(4)).unwrap();

        render.bind_output(CameraId(1), RenderTarget::Surface(surface)).unwrap();
        render.set_camera_enabled(CameraId(1), true);
        render.retarget_material(material, MaterialBinding::Live(surface));

        assert!(render.is_enabled(CameraId(1)));
        assert_eq!(render.output_of(CameraId(1)), Some(RenderTarget::Surface(surface)));
        assert_eq!(render.binding_of(material), Some(MaterialBinding::Live(surface)));
        assert_eq!(render.display_of(material), Some(ModelId(4)));
    }

    #[test]
    fn test_failure_switches() {
        let mut render = HeadlessRender::new();
        render.reject_binding(CameraId(2));
        assert!(render.bind_output(CameraId(2), RenderTarget::Screen).is_err());

        render.fail_allocations();
        assert!(render.allocate_surface("x", 16).is_err());
        assert!(render.allocate_material(ModelId(0)).is_err());
    }

    #[test]
    fn test_audio_and_display_keep_counts() {
        let mut audio = HeadlessAudio::default();
        for _ in 0..1_000 {
            audio.play_cue("event:/Door/Open", Vec3::X);
        }
        audio.play_cue("event:/Door/Close", Vec3::Y);

        assert_eq!(audio.played("event:/Door/Open"), 1_000);
        assert_eq!(audio.played("event:/Door/Slam"), 0);
        assert_eq!(audio.total(), 1_001);
        assert_eq!(audio.last_cue(), Some(("event:/Door/Close", Vec3::Y)));

        let mut display = HeadlessDisplay::default();
        display.show_text("LOBBY CAMS OFFLINE", 2.0);
        display.show_text("LOBBY CAMS ONLINE", 2.0);

        assert_eq!(display.last_message(), Some("LOBBY CAMS ONLINE"));
        assert_eq!(display.message_count(), 2);
    }
}
