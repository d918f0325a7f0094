//! Side-effecting collaborators the core drives.
//!
//! The render, audio and display services are fire-and-forget. The scene
//! query answers "what is the player looking at". `SceneDirectory` resolves
//! configured names into handles once, at setup.

use bevy_math::Vec3;
use cam_events::{
    CameraId, CamEventKind, DoorId, Glow, IndicatorId, MaterialBinding, MaterialId, ModelId,
    Pose, RenderTarget, SurfaceId,
};

use crate::error::RenderError;

/// Camera, surface and material plumbing.
pub trait RenderService {
    /// Creates an offscreen surface of `size`×`size` pixels.
    fn allocate_surface(&mut self, label: &str, size: u32) -> Result<SurfaceId, RenderError>;
    /// Creates a display material and puts it on `display`.
    fn allocate_material(&mut self, display: ModelId) -> Result<MaterialId, RenderError>;
    /// Points a camera's output at the screen or a surface.
    fn bind_output(&mut self, camera: CameraId, target: RenderTarget) -> Result<(), RenderError>;
    fn set_camera_enabled(&mut self, camera: CameraId, enabled: bool);
    /// Changes what a display material shows.
    fn retarget_material(&mut self, material: MaterialId, binding: MaterialBinding);
    /// Renders one frame from `camera` into `surface`, leaving its binding untouched.
    fn render_once(&mut self, camera: CameraId, surface: SurfaceId);
    fn set_model_visible(&mut self, model: ModelId, visible: bool);
    fn set_glow(&mut self, door: DoorId, glow: Glow);
}

/// One-shot audio cues.
pub trait AudioService {
    fn play_cue(&mut self, cue: &str, position: Vec3);
}

/// On-screen text and small indicators.
pub trait DisplayService {
    fn show_text(&mut self, text: &str, duration: f32);
    fn set_indicator(&mut self, indicator: IndicatorId, visible: bool);
}

/// Nearest hit of a ray cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// The logical object owning the hit surface.
    pub model: ModelId,
    pub distance: f32,
    /// The owning object's origin.
    pub origin: Vec3,
    /// Outward normal of the hit face.
    pub normal: Vec3,
}

/// Forward ray casts against the scene.
pub trait SceneQuery {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit>;
}

/// Resolves configured scene names into handles.
pub trait SceneDirectory {
    /// The free-look camera.
    fn eye_camera(&self) -> Option<CameraId>;
    fn camera(&self, name: &str) -> Option<CameraId>;
    fn model(&self, name: &str) -> Option<ModelId>;
    /// Recording indicator attached to the named feed camera, if it has one.
    fn indicator(&self, feed_name: &str) -> Option<IndicatorId>;
    /// A door, its clickable model and its hinge pose.
    fn door(&self, name: &str) -> Option<(DoorId, ModelId, Pose)>;
}

/// Plays `cue` when one is configured; an unset cue is a no-op.
pub fn play_optional_cue(audio: &mut dyn AudioService, cue: Option<&str>, position: Vec3) {
    if let Some(cue) = cue {
        audio.play_cue(cue, position);
    }
}

/// Transitions raised during a frame, drained by the host.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<CamEventKind>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: CamEventKind) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<CamEventKind> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CamEventKind> {
        self.events.iter()
    }
}

/// The mutable services handed to every state machine for one frame.
pub struct Services<'a> {
    pub render: &'a mut dyn RenderService,
    pub audio: &'a mut dyn AudioService,
    pub display: &'a mut dyn DisplayService,
    pub events: &'a mut EventQueue,
}

impl<'a> Services<'a> {
    pub fn new(
        render: &'a mut dyn RenderService,
        audio: &'a mut dyn AudioService,
        display: &'a mut dyn DisplayService,
        events: &'a mut EventQueue,
    ) -> Self {
        Self {
            render,
            audio,
            display,
            events,
        }
    }

    pub fn cue(&mut self, cue: Option<&str>, position: Vec3) {
        play_optional_cue(self.audio, cue, position);
    }

    pub fn emit(&mut self, event: CamEventKind) {
        self.events.push(event);
    }
}
