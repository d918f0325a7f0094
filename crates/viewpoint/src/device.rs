//! The held device and its raise/lower switching.
//!
//! A switch is a two-leg task: lower the current device, then raise the next
//! one. `task` being present is the switching lock; triggers that arrive
//! while it is set are dropped. Each device also has a small in-hand mode:
//! the camcorder viewfinder and the polaroid's capture/hold cycle.
//!
//! Device models are attached to the eye. Their world pose is always
//! `eye ∘ offset`, computed on demand.

use bevy_math::Vec3;
use cam_events::{
    CameraId, CamEventKind, DeviceKind, HandheldMode, MaterialBinding, ModelId, Pose,
    RenderTarget, SurfaceId,
};

use crate::animator::{Approach, Step};
use crate::config::{DeviceConfig, HandheldConfig};
use crate::error::SetupError;
use crate::input::{Action, InputSource};
use crate::services::{SceneDirectory, Services};

/// Local offset of the held photo relative to the eye.
pub const HELD_PHOTO_OFFSET: Vec3 = Vec3::new(0.0, -0.15, -0.4);

/// Static wiring and animated offset of one device.
#[derive(Debug, Clone)]
pub struct DeviceSlot {
    kind: DeviceKind,
    available: bool,
    model: Option<ModelId>,
    camera: Option<CameraId>,
    /// LCD (camcorder) or viewfinder (polaroid) surface the camera feeds.
    live_surface: Option<SurfaceId>,
    photo_surface: Option<SurfaceId>,
    held_photo: Option<ModelId>,
    rest: Vec3,
    lowered: Vec3,
    offset: Vec3,
    raise_cue: Option<String>,
    lower_cue: Option<String>,
    shutter_cue: Option<String>,
}

impl DeviceSlot {
    fn neutral(model: Option<ModelId>) -> Self {
        Self {
            kind: DeviceKind::Neutral,
            available: true,
            model,
            camera: None,
            live_surface: None,
            photo_surface: None,
            held_photo: None,
            rest: Vec3::ZERO,
            lowered: Vec3::ZERO,
            offset: Vec3::ZERO,
            raise_cue: None,
            lower_cue: None,
            shutter_cue: None,
        }
    }

    fn unavailable(kind: DeviceKind) -> Self {
        Self {
            kind,
            available: false,
            ..Self::neutral(None)
        }
    }

    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn model(&self) -> Option<ModelId> {
        self.model
    }

    pub fn camera(&self) -> Option<CameraId> {
        self.camera
    }

    pub fn live_surface(&self) -> Option<SurfaceId> {
        self.live_surface
    }

    pub fn photo_surface(&self) -> Option<SurfaceId> {
        self.photo_surface
    }

    pub fn held_photo(&self) -> Option<ModelId> {
        self.held_photo
    }

    /// Current offset from the eye.
    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    /// Raised offset from the eye.
    pub fn rest(&self) -> Vec3 {
        self.rest
    }

    pub fn lowered(&self) -> Vec3 {
        self.lowered
    }

    pub fn world_pose(&self, eye: &Pose) -> Pose {
        eye.compose(&Pose::from_position(self.offset))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchStep {
    Lowering,
    Raising,
}

/// The in-flight switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchTask {
    pub from: DeviceKind,
    pub to: DeviceKind,
    pub step: SwitchStep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoStep {
    /// Capture taken; the polaroid is going down.
    Lowering,
    /// The photo is in hand.
    Holding,
    /// The polaroid is coming back up.
    Raising,
}

/// What the current device is doing in hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandheldState {
    #[default]
    Idle,
    Viewfinder,
    Photo(PhotoStep),
}

/// Owns every device slot and the one switch that may be in flight.
#[derive(Debug)]
pub struct DeviceSwitcher {
    eye_camera: CameraId,
    slots: [DeviceSlot; 3],
    current: DeviceKind,
    task: Option<SwitchTask>,
    handheld: HandheldState,
    speed: f32,
}

impl DeviceSwitcher {
    /// Starts in `Neutral`. Devices whose references are missing are marked
    /// unavailable and skipped by every switch.
    pub fn setup(
        config: &DeviceConfig,
        eye_camera: CameraId,
        directory: &dyn SceneDirectory,
        services: &mut Services,
    ) -> Self {
        let marker = config.neutral.model.as_deref().and_then(|name| {
            let model = directory.model(name);
            if model.is_none() {
                tracing::warn!("neutral: missing marker model {}", name);
            }
            model
        });
        if let Some(marker) = marker {
            services.render.set_model_visible(marker, true);
        }

        let camcorder = setup_handheld(
            DeviceKind::Camcorder,
            &config.camcorder,
            config,
            directory,
            services,
        );
        let polaroid = setup_handheld(
            DeviceKind::Polaroid,
            &config.polaroid,
            config,
            directory,
            services,
        );

        let slots = [
            DeviceSlot::neutral(marker),
            camcorder.unwrap_or_else(|e| {
                tracing::warn!("Device disabled: {}", e);
                DeviceSlot::unavailable(DeviceKind::Camcorder)
            }),
            polaroid.unwrap_or_else(|e| {
                tracing::warn!("Device disabled: {}", e);
                DeviceSlot::unavailable(DeviceKind::Polaroid)
            }),
        ];

        Self {
            eye_camera,
            slots,
            current: DeviceKind::Neutral,
            task: None,
            handheld: HandheldState::Idle,
            speed: config.switch_speed,
        }
    }

    pub fn current(&self) -> DeviceKind {
        self.current
    }

    pub fn is_switching(&self) -> bool {
        self.task.is_some()
    }

    pub fn task(&self) -> Option<SwitchTask> {
        self.task
    }

    pub fn handheld(&self) -> HandheldState {
        self.handheld
    }

    pub fn viewfinder_open(&self) -> bool {
        self.handheld == HandheldState::Viewfinder
    }

    pub fn slot(&self, kind: DeviceKind) -> &DeviceSlot {
        &self.slots[kind.index()]
    }

    /// The next available device after the current one, if it differs.
    pub fn next_available(&self) -> Option<DeviceKind> {
        let mut candidate = self.current.next();
        while candidate != self.current {
            if self.slot(candidate).available {
                return Some(candidate);
            }
            candidate = candidate.next();
        }
        None
    }

    /// Starts a switch to the next device. Returns false when the trigger is
    /// dropped: a switch or photo animation is already running, or no other
    /// device is available.
    pub fn trigger(&mut self, eye: &Pose, services: &mut Services) -> bool {
        if self.task.is_some() || self.photo_in_motion() {
            return false;
        }
        let Some(to) = self.next_available() else {
            return false;
        };
        let from = self.current;

        tracing::info!("Switching device {} -> {}", from, to);
        services.emit(CamEventKind::DeviceSwitchStarted { from, to });
        self.task = Some(SwitchTask {
            from,
            to,
            step: SwitchStep::Lowering,
        });

        if from == DeviceKind::Neutral {
            if let Some(marker) = self.slots[0].model {
                services.render.set_model_visible(marker, false);
            }
            self.begin_raise(to, eye, services);
        } else {
            self.release_view(services);
            self.put_photo_away(services);
            let slot = &self.slots[from.index()];
            let position = eye.compose(&Pose::from_position(slot.offset)).position;
            services.cue(slot.lower_cue.as_deref(), position);
        }
        true
    }

    /// Handles the in-hand controls of the current device.
    pub fn handle_input(&mut self, input: &dyn InputSource, eye: &Pose, services: &mut Services) {
        if self.task.is_some() {
            return;
        }

        match self.current {
            DeviceKind::Neutral => {}
            DeviceKind::Camcorder => {
                if input.pressed(Action::Aim) && self.handheld == HandheldState::Idle {
                    self.open_viewfinder(services);
                } else if input.released(Action::Aim) {
                    self.release_view(services);
                }
            }
            DeviceKind::Polaroid => {
                if !input.pressed(Action::Capture) {
                    return;
                }
                match self.handheld {
                    HandheldState::Idle => self.capture(eye, services),
                    HandheldState::Photo(PhotoStep::Holding) => {
                        let slot = &mut self.slots[DeviceKind::Polaroid.index()];
                        slot.offset = slot.lowered;
                        self.handheld = HandheldState::Photo(PhotoStep::Raising);
                    }
                    _ => {}
                }
            }
        }
    }

    /// True while the polaroid is moving for a capture or put-away.
    pub fn photo_in_motion(&self) -> bool {
        matches!(
            self.handheld,
            HandheldState::Photo(PhotoStep::Lowering | PhotoStep::Raising)
        )
    }

    /// Closes the camcorder viewfinder if it is open.
    pub fn release_view(&mut self, services: &mut Services) {
        if self.handheld != HandheldState::Viewfinder {
            return;
        }
        self.handheld = HandheldState::Idle;
        let slot = &self.slots[DeviceKind::Camcorder.index()];
        if let (Some(camera), Some(lcd)) = (slot.camera, slot.live_surface) {
            if let Err(e) = services.render.bind_output(camera, RenderTarget::Surface(lcd)) {
                tracing::warn!("camcorder: could not restore LCD: {}", e);
            }
        }
        services.render.set_camera_enabled(self.eye_camera, true);
        services.emit(CamEventKind::Handheld {
            device: DeviceKind::Camcorder,
            mode: HandheldMode::ViewfinderClosed,
        });
    }

    /// Advances the running switch leg or photo animation by one frame.
    pub fn tick(&mut self, dt: f32, eye: &Pose, services: &mut Services) {
        if let Some(task) = self.task {
            let device = match task.step {
                SwitchStep::Lowering => task.from,
                SwitchStep::Raising => task.to,
            };
            if !self.step_offset(device, dt) {
                return;
            }
            match task.step {
                SwitchStep::Lowering => {
                    self.hide(task.from, services);
                    self.begin_raise(task.to, eye, services);
                }
                SwitchStep::Raising => self.finish_switch(task.to, services),
            }
            return;
        }

        let polaroid = DeviceKind::Polaroid;
        match self.handheld {
            HandheldState::Photo(PhotoStep::Lowering) => {
                if self.step_offset(polaroid, dt) {
                    let slot = self.slot(polaroid);
                    if let Some(photo) = slot.held_photo {
                        services.render.set_model_visible(photo, true);
                    }
                    self.handheld = HandheldState::Photo(PhotoStep::Holding);
                    services.emit(CamEventKind::Handheld {
                        device: polaroid,
                        mode: HandheldMode::PhotoHeld,
                    });
                }
            }
            HandheldState::Photo(PhotoStep::Raising) => {
                if self.step_offset(polaroid, dt) {
                    self.put_photo_away(services);
                }
            }
            _ => {}
        }
    }

    /// World poses of every device model that should be drawn this frame.
    pub fn model_poses(&self, eye: &Pose) -> Vec<(ModelId, Pose)> {
        let mut poses = Vec::new();
        let slot = self.slot(self.current);
        if let Some(model) = slot.model {
            poses.push((model, slot.world_pose(eye)));
        }
        if let Some(photo) = self.slot(DeviceKind::Polaroid).held_photo {
            poses.push((photo, eye.compose(&Pose::from_position(HELD_PHOTO_OFFSET))));
        }
        poses
    }

    fn begin_raise(&mut self, to: DeviceKind, eye: &Pose, services: &mut Services) {
        self.current = to;
        if to == DeviceKind::Neutral {
            if let Some(marker) = self.slots[0].model {
                services.render.set_model_visible(marker, true);
            }
            self.finish_switch(to, services);
            return;
        }

        let slot = &mut self.slots[to.index()];
        slot.offset = slot.lowered;
        if let Some(model) = slot.model {
            services.render.set_model_visible(model, true);
        }
        if let Some(camera) = slot.camera {
            services.render.set_camera_enabled(camera, true);
        }
        let position = eye.compose(&Pose::from_position(slot.offset)).position;
        services.cue(slot.raise_cue.as_deref(), position);

        if let Some(task) = self.task.as_mut() {
            task.step = SwitchStep::Raising;
        }
    }

    fn finish_switch(&mut self, device: DeviceKind, services: &mut Services) {
        self.task = None;
        tracing::info!("Now holding {}", device);
        services.emit(CamEventKind::DeviceSwitchCompleted { device });
    }

    fn hide(&mut self, kind: DeviceKind, services: &mut Services) {
        let slot = &self.slots[kind.index()];
        if let Some(model) = slot.model {
            services.render.set_model_visible(model, false);
        }
        if let Some(camera) = slot.camera {
            services.render.set_camera_enabled(camera, false);
        }
    }

    /// Moves a slot one frame toward its leg target. Returns true on arrival.
    fn step_offset(&mut self, kind: DeviceKind, dt: f32) -> bool {
        let lowering = match (self.task, self.handheld) {
            (Some(task), _) => task.step == SwitchStep::Lowering,
            (None, HandheldState::Photo(PhotoStep::Lowering)) => true,
            _ => false,
        };
        let slot = &mut self.slots[kind.index()];
        let target = if lowering { slot.lowered } else { slot.rest };

        match Approach::new(target, self.speed).step(slot.offset, dt) {
            Step::Moving(offset) => {
                slot.offset = offset;
                false
            }
            Step::Arrived(offset) => {
                slot.offset = offset;
                true
            }
        }
    }

    fn open_viewfinder(&mut self, services: &mut Services) {
        let Some(camera) = self.slot(DeviceKind::Camcorder).camera else {
            return;
        };
        if let Err(e) = services.render.bind_output(camera, RenderTarget::Screen) {
            tracing::warn!("camcorder: viewfinder unavailable: {}", e);
            return;
        }
        services.render.set_camera_enabled(self.eye_camera, false);
        self.handheld = HandheldState::Viewfinder;
        services.emit(CamEventKind::Handheld {
            device: DeviceKind::Camcorder,
            mode: HandheldMode::ViewfinderOpened,
        });
    }

    fn capture(&mut self, eye: &Pose, services: &mut Services) {
        let slot = self.slot(DeviceKind::Polaroid);
        let (Some(camera), Some(photo)) = (slot.camera, slot.photo_surface) else {
            return;
        };
        services.render.render_once(camera, photo);
        let position = slot.world_pose(eye).position;
        services.cue(slot.shutter_cue.as_deref(), position);

        self.handheld = HandheldState::Photo(PhotoStep::Lowering);
        tracing::debug!("Polaroid captured a photo");
        services.emit(CamEventKind::Handheld {
            device: DeviceKind::Polaroid,
            mode: HandheldMode::PhotoCaptured,
        });
    }

    fn put_photo_away(&mut self, services: &mut Services) {
        if !matches!(self.handheld, HandheldState::Photo(_)) {
            return;
        }
        self.handheld = HandheldState::Idle;
        if let Some(photo) = self.slot(DeviceKind::Polaroid).held_photo {
            services.render.set_model_visible(photo, false);
        }
        services.emit(CamEventKind::Handheld {
            device: DeviceKind::Polaroid,
            mode: HandheldMode::PhotoPutAway,
        });
    }
}

fn setup_handheld(
    kind: DeviceKind,
    config: &HandheldConfig,
    devices: &DeviceConfig,
    directory: &dyn SceneDirectory,
    services: &mut Services,
) -> Result<DeviceSlot, SetupError> {
    let component = kind.to_string();
    let lookup_model = |name: &Option<String>, what: &str| {
        name.as_deref()
            .and_then(|n| directory.model(n))
            .ok_or_else(|| SetupError::missing(&component, what))
    };

    let model = lookup_model(&config.model, "model")?;
    let camera = config
        .camera
        .as_deref()
        .and_then(|n| directory.camera(n))
        .ok_or_else(|| SetupError::missing(&component, "camera"))?;
    let held_photo = match kind {
        DeviceKind::Polaroid => Some(lookup_model(&config.held_photo, "held photo")?),
        _ => None,
    };

    let live_label = match kind {
        DeviceKind::Polaroid => "polaroid viewfinder",
        _ => "camcorder lcd",
    };
    let live = services
        .render
        .allocate_surface(live_label, devices.surface_size)
        .map_err(|e| SetupError::render(&component, e))?;
    services
        .render
        .bind_output(camera, RenderTarget::Surface(live))
        .map_err(|e| SetupError::render(&component, e))?;
    let screen = services
        .render
        .allocate_material(model)
        .map_err(|e| SetupError::render(&component, e))?;
    services.render.retarget_material(screen, MaterialBinding::Live(live));

    let mut photo_surface = None;
    if let Some(held_photo) = held_photo {
        let photo = services
            .render
            .allocate_surface("polaroid photo", devices.surface_size)
            .map_err(|e| SetupError::render(&component, e))?;
        let print = services
            .render
            .allocate_material(held_photo)
            .map_err(|e| SetupError::render(&component, e))?;
        services.render.retarget_material(print, MaterialBinding::Live(photo));
        services.render.set_model_visible(held_photo, false);
        photo_surface = Some(photo);
    }

    services.render.set_model_visible(model, false);
    services.render.set_camera_enabled(camera, false);

    let rest = match kind {
        DeviceKind::Polaroid => Vec3::new(
            config.rest_offset.x,
            devices.polaroid_raised_height,
            config.rest_offset.z,
        ),
        _ => config.rest_offset,
    };
    let lowered = rest + devices.lowered_offset;

    Ok(DeviceSlot {
        kind,
        available: true,
        model: Some(model),
        camera: Some(camera),
        live_surface: Some(live),
        photo_surface,
        held_photo,
        rest,
        lowered,
        offset: lowered,
        raise_cue: config.raise_cue.clone(),
        lower_cue: config.lower_cue.clone(),
        shutter_cue: config.shutter_cue.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessAudio, HeadlessDisplay, HeadlessRender, HeadlessScene};
    use crate::input::InputSnapshot;
    use crate::services::EventQueue;

    const DT: f32 = 1.0 / 60.0;

    struct Fixture {
        scene: HeadlessScene,
        render: HeadlessRender,
        audio: HeadlessAudio,
        display: HeadlessDisplay,
        events: EventQueue,
        eye: Pose,
    }

    impl Fixture {
        fn new() -> Self {
            let mut scene = HeadlessScene::new();
            scene.add_eye();
            for model in ["empty_hands", "camcorder", "polaroid", "held_photo"] {
                scene.add_model(model);
            }
            scene.add_camera("camcorder_cam");
            scene.add_camera("polaroid_cam");
            Self {
                scene,
                render: HeadlessRender::new(),
                audio: HeadlessAudio::default(),
                display: HeadlessDisplay::default(),
                events: EventQueue::new(),
                eye: Pose::from_position(Vec3::new(0.0, 1.7, 0.0)),
            }
        }

        fn switcher(&mut self, config: &DeviceConfig) -> DeviceSwitcher {
            let eye = self.scene.eye_camera().unwrap();
            let mut services = Services::new(
                &mut self.render,
                &mut self.audio,
                &mut self.display,
                &mut self.events,
            );
            DeviceSwitcher::setup(config, eye, &self.scene, &mut services)
        }

        fn trigger(&mut self, switcher: &mut DeviceSwitcher) -> bool {
            let mut services = Services::new(
                &mut self.render,
                &mut self.audio,
                &mut self.display,
                &mut self.events,
            );
            switcher.trigger(&self.eye, &mut services)
        }

        fn tick(&mut self, switcher: &mut DeviceSwitcher) {
            let mut services = Services::new(
                &mut self.render,
                &mut self.audio,
                &mut self.display,
                &mut self.events,
            );
            switcher.tick(DT, &self.eye, &mut services);
        }

        fn input(&mut self, switcher: &mut DeviceSwitcher, input: &InputSnapshot) {
            let mut services = Services::new(
                &mut self.render,
                &mut self.audio,
                &mut self.display,
                &mut self.events,
            );
            switcher.handle_input(input, &self.eye, &mut services);
        }

        fn settle(&mut self, switcher: &mut DeviceSwitcher) -> usize {
            let mut frames = 0;
            while switcher.is_switching() || switcher.photo_in_motion() {
                self.tick(switcher);
                frames += 1;
                assert!(frames < 10_000, "transition never finished");
            }
            frames
        }
    }

    #[test]
    fn test_three_presses_return_to_neutral() {
        let mut fx = Fixture::new();
        let mut switcher = fx.switcher(&DeviceConfig::default());

        let mut visited = Vec::new();
        for _ in 0..3 {
            assert!(fx.trigger(&mut switcher));
            fx.settle(&mut switcher);
            visited.push(switcher.current());
        }

        assert_eq!(
            visited,
            vec![DeviceKind::Camcorder, DeviceKind::Polaroid, DeviceKind::Neutral]
        );
    }

    #[test]
    fn test_retrigger_while_switching_is_dropped() {
        let mut fx = Fixture::new();
        let mut switcher = fx.switcher(&DeviceConfig::default());

        assert!(fx.trigger(&mut switcher));
        fx.tick(&mut switcher);
        let task = switcher.task();
        assert!(!fx.trigger(&mut switcher));
        assert_eq!(switcher.task(), task);

        fx.settle(&mut switcher);
        assert_eq!(switcher.current(), DeviceKind::Camcorder);
        assert!(!switcher.is_switching());
    }

    #[test]
    fn test_switch_snaps_to_rest_and_plays_cues() {
        let mut fx = Fixture::new();
        let mut switcher = fx.switcher(&DeviceConfig::default());
        let camcorder = fx.scene.model("camcorder").unwrap();
        let marker = fx.scene.model("empty_hands").unwrap();

        fx.trigger(&mut switcher);
        fx.settle(&mut switcher);

        let slot = switcher.slot(DeviceKind::Camcorder);
        assert_eq!(slot.offset(), slot.rest());
        assert!(fx.render.is_visible(camcorder));
        assert!(!fx.render.is_visible(marker));
        assert_eq!(fx.audio.played("event:/Camcorder/Raise"), 1);
        assert_eq!(fx.audio.played("event:/Camcorder/Lower"), 0);
    }

    #[test]
    fn test_missing_device_is_skipped() {
        let mut fx = Fixture::new();
        let mut config = DeviceConfig::default();
        config.camcorder.model = None;
        let mut switcher = fx.switcher(&config);

        assert!(!switcher.slot(DeviceKind::Camcorder).is_available());
        fx.trigger(&mut switcher);
        fx.settle(&mut switcher);
        assert_eq!(switcher.current(), DeviceKind::Polaroid);
    }

    #[test]
    fn test_polaroid_rests_at_raised_height() {
        let mut fx = Fixture::new();
        let switcher = fx.switcher(&DeviceConfig::default());
        let slot = switcher.slot(DeviceKind::Polaroid);

        assert_eq!(slot.rest(), Vec3::new(0.3, 0.2, -0.55));
        assert_eq!(slot.lowered(), Vec3::new(0.3, -0.3, -0.55));
    }

    #[test]
    fn test_viewfinder_routes_camcorder_to_screen() {
        let mut fx = Fixture::new();
        let mut switcher = fx.switcher(&DeviceConfig::default());
        let eye_cam = fx.scene.eye_camera().unwrap();
        let cam = fx.scene.camera("camcorder_cam").unwrap();
        fx.trigger(&mut switcher);
        fx.settle(&mut switcher);

        fx.input(&mut switcher, &InputSnapshot::new().press(Action::Aim));
        assert!(switcher.viewfinder_open());
        assert_eq!(fx.render.output_of(cam), Some(RenderTarget::Screen));
        assert!(!fx.render.is_enabled(eye_cam));

        fx.input(&mut switcher, &InputSnapshot::new().release(Action::Aim));
        assert!(!switcher.viewfinder_open());
        let lcd = switcher.slot(DeviceKind::Camcorder).live_surface().unwrap();
        assert_eq!(fx.render.output_of(cam), Some(RenderTarget::Surface(lcd)));
        assert!(fx.render.is_enabled(eye_cam));
    }

    #[test]
    fn test_switching_away_closes_viewfinder() {
        let mut fx = Fixture::new();
        let mut switcher = fx.switcher(&DeviceConfig::default());
        let eye_cam = fx.scene.eye_camera().unwrap();
        fx.trigger(&mut switcher);
        fx.settle(&mut switcher);
        fx.input(&mut switcher, &InputSnapshot::new().press(Action::Aim));

        fx.trigger(&mut switcher);
        assert!(!switcher.viewfinder_open());
        assert!(fx.render.is_enabled(eye_cam));
    }

    #[test]
    fn test_polaroid_capture_and_put_away() {
        let mut fx = Fixture::new();
        let mut switcher = fx.switcher(&DeviceConfig::default());
        let photo = fx.scene.model("held_photo").unwrap();
        let cam = fx.scene.camera("polaroid_cam").unwrap();
        for _ in 0..2 {
            fx.trigger(&mut switcher);
            fx.settle(&mut switcher);
        }
        assert_eq!(switcher.current(), DeviceKind::Polaroid);

        fx.input(&mut switcher, &InputSnapshot::new().press(Action::Capture));
        assert_eq!(switcher.handheld(), HandheldState::Photo(PhotoStep::Lowering));
        let surface = switcher.slot(DeviceKind::Polaroid).photo_surface().unwrap();
        assert_eq!(fx.render.captures(), &[(cam, surface)]);
        assert_eq!(fx.audio.played("event:/Polaroid/Shutter"), 1);
        assert!(!fx.render.is_visible(photo));

        // Presses mid-animation are ignored.
        fx.input(&mut switcher, &InputSnapshot::new().press(Action::Capture));
        assert_eq!(fx.render.captures().len(), 1);

        fx.settle(&mut switcher);
        assert_eq!(switcher.handheld(), HandheldState::Photo(PhotoStep::Holding));
        assert!(fx.render.is_visible(photo));

        fx.input(&mut switcher, &InputSnapshot::new().press(Action::Capture));
        fx.settle(&mut switcher);
        assert_eq!(switcher.handheld(), HandheldState::Idle);
        assert!(!fx.render.is_visible(photo));
        let slot = switcher.slot(DeviceKind::Polaroid);
        assert_eq!(slot.offset(), slot.rest());
    }

    #[test]
    fn test_model_pose_follows_eye() {
        let mut fx = Fixture::new();
        let mut switcher = fx.switcher(&DeviceConfig::default());
        fx.trigger(&mut switcher);
        fx.settle(&mut switcher);

        let camcorder = fx.scene.model("camcorder").unwrap();
        let poses = switcher.model_poses(&fx.eye);
        let (_, pose) = poses.iter().find(|(m, _)| *m == camcorder).unwrap();
        let expected = fx.eye.position + switcher.slot(DeviceKind::Camcorder).rest();

        assert!(pose.position.distance(expected) < 1e-5);
    }
}
