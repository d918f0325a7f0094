//! Feed groups and their auto-cycle timers.
//!
//! Every group owns one display surface that all of its feeds render into,
//! and one display material on the group's monitor. Only the current feed's
//! camera is enabled, so the surface always shows that feed. While a group is
//! docked its current feed renders to the screen instead.

use cam_events::{
    CameraId, CamEventKind, CycleCause, GroupId, IndicatorId, MaterialBinding, MaterialId,
    ModelId, RenderTarget, SurfaceId,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::config::{FeedConfig, GroupConfig, RigConfig};
use crate::error::SetupError;
use crate::indicator::BlinkLoop;
use crate::schedule::{AutoCycle, Jitter};
use crate::services::{SceneDirectory, Services};

/// One camera in a group.
#[derive(Debug, Clone)]
pub struct Feed {
    pub name: String,
    pub camera: CameraId,
    blink: Option<BlinkLoop>,
}

impl Feed {
    pub fn indicator(&self) -> Option<IndicatorId> {
        self.blink.as_ref().map(BlinkLoop::indicator)
    }

    pub fn is_blinking(&self) -> bool {
        self.blink.as_ref().is_some_and(BlinkLoop::is_running)
    }
}

/// A named set of feeds sharing one monitor.
#[derive(Debug, Clone)]
pub struct FeedGroup {
    id: GroupId,
    name: String,
    monitor: ModelId,
    toggle: Option<ModelId>,
    feeds: Vec<Feed>,
    index: usize,
    active: bool,
    docked: bool,
    surface: SurfaceId,
    material: MaterialId,
    timer: AutoCycle,
}

impl FeedGroup {
    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn monitor(&self) -> ModelId {
        self.monitor
    }

    pub fn toggle(&self) -> Option<ModelId> {
        self.toggle
    }

    pub fn feeds(&self) -> &[Feed] {
        &self.feeds
    }

    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }

    /// Index of the displayed feed. Meaningless for an empty group.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_docked(&self) -> bool {
        self.docked
    }

    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    pub fn timer(&self) -> &AutoCycle {
        &self.timer
    }

    pub fn current_camera(&self) -> Option<CameraId> {
        self.feeds.get(self.index).map(|f| f.camera)
    }

    /// What the monitor should show given the active flag.
    pub fn expected_binding(&self) -> MaterialBinding {
        if self.active && !self.feeds.is_empty() {
            MaterialBinding::Live(self.surface)
        } else {
            MaterialBinding::Placeholder
        }
    }

    fn advance(&mut self) -> (CameraId, CameraId) {
        let old = self.feeds[self.index].camera;
        self.index = (self.index + 1) % self.feeds.len();
        (old, self.feeds[self.index].camera)
    }
}

/// All feed groups, indexed densely by [`GroupId`].
#[derive(Debug)]
pub struct FeedRegistry {
    groups: Vec<FeedGroup>,
    rng: SmallRng,
    message_duration: f32,
}

impl FeedRegistry {
    /// Wires every configured group. A group that cannot be wired is left out
    /// and logged once; the rest of the registry is unaffected.
    pub fn setup(config: &RigConfig, directory: &dyn SceneDirectory, services: &mut Services) -> Self {
        let mut rng = match config.feeds.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        let mut groups = Vec::with_capacity(config.groups.len());
        for group_config in &config.groups {
            let id = GroupId(groups.len());
            match setup_group(id, group_config, &config.feeds, directory, &mut rng, services) {
                Ok(group) => {
                    tracing::info!(
                        "Feed group {} ready with {} feeds",
                        group.name,
                        group.feeds.len()
                    );
                    groups.push(group);
                }
                Err(e) => tracing::warn!("Feed group disabled: {}", e),
            }
        }

        Self {
            groups,
            rng,
            message_duration: config.feeds.message_duration,
        }
    }

    pub fn groups(&self) -> &[FeedGroup] {
        &self.groups
    }

    pub fn get(&self, id: GroupId) -> Option<&FeedGroup> {
        self.groups.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Looks a group up by its configured name.
    pub fn find(&self, name: &str) -> Option<GroupId> {
        self.groups.iter().find(|g| g.name == name).map(|g| g.id)
    }

    pub fn group_for_monitor(&self, model: ModelId) -> Option<GroupId> {
        self.groups.iter().find(|g| g.monitor == model).map(|g| g.id)
    }

    pub fn group_for_toggle(&self, model: ModelId) -> Option<GroupId> {
        self.groups
            .iter()
            .find(|g| g.toggle == Some(model))
            .map(|g| g.id)
    }

    /// Only active, non-empty groups can be viewed from the inside.
    pub fn is_dockable(&self, id: GroupId) -> bool {
        self.get(id).is_some_and(|g| g.active && !g.feeds.is_empty())
    }

    /// Flips a group on or off. Returns whether anything changed.
    ///
    /// Empty groups and the docked group ignore the toggle.
    pub fn toggle(&mut self, id: GroupId, services: &mut Services) -> bool {
        let duration = self.message_duration;
        let Some(group) = self.groups.get_mut(id.0) else {
            return false;
        };
        if group.feeds.is_empty() || group.docked {
            return false;
        }

        group.active = !group.active;
        let camera = group.feeds[group.index].camera;
        if group.active {
            services.render.set_camera_enabled(camera, true);
            services
                .render
                .retarget_material(group.material, MaterialBinding::Live(group.surface));
            for feed in &mut group.feeds {
                if let Some(blink) = feed.blink.as_mut() {
                    blink.start(services.display);
                }
            }
        } else {
            services.render.set_camera_enabled(camera, false);
            services
                .render
                .retarget_material(group.material, MaterialBinding::Placeholder);
            for feed in &mut group.feeds {
                if let Some(blink) = feed.blink.as_mut() {
                    blink.stop(services.display);
                }
            }
        }

        let state = if group.active { "ONLINE" } else { "OFFLINE" };
        services
            .display
            .show_text(&format!("{} CAMS {}", group.name.to_uppercase(), state), duration);
        tracing::info!("Group {} toggled {}", group.name, if group.active { "on" } else { "off" });
        services.emit(CamEventKind::GroupToggled {
            group: id,
            active: group.active,
        });
        true
    }

    /// Advances every group's timer and blink loops by one frame.
    pub fn tick(&mut self, dt: f32, services: &mut Services) {
        for group in &mut self.groups {
            let wakes = group.timer.tick(dt, &mut self.rng);
            for _ in 0..wakes {
                if !group.active || group.feeds.is_empty() || group.docked {
                    continue;
                }
                let (old, new) = group.advance();
                services.render.set_camera_enabled(old, false);
                services.render.set_camera_enabled(new, true);
                services
                    .render
                    .retarget_material(group.material, MaterialBinding::Live(group.surface));
                tracing::debug!("Group {} auto-cycled to feed {}", group.name, group.index);
                services.emit(CamEventKind::FeedCycled {
                    group: group.id,
                    index: group.index,
                    cause: CycleCause::Auto,
                });
            }

            for feed in &mut group.feeds {
                if let Some(blink) = feed.blink.as_mut() {
                    blink.tick(dt, services.display);
                }
            }
        }
    }

    /// Hands the group's current feed to the screen. Returns the camera now
    /// being viewed, or `None` if the group cannot be docked.
    pub fn present(&mut self, id: GroupId, services: &mut Services) -> Option<CameraId> {
        if !self.is_dockable(id) {
            return None;
        }
        let group = &mut self.groups[id.0];
        let camera = group.feeds[group.index].camera;
        if let Err(e) = services.render.bind_output(camera, RenderTarget::Screen) {
            tracing::warn!("Cannot present {}: {}", group.name, e);
            return None;
        }
        services.render.set_camera_enabled(camera, true);
        group.docked = true;
        Some(camera)
    }

    /// Manual cycle while docked. The old feed goes back to the group surface
    /// and the new one takes over the screen.
    pub fn cycle_docked(&mut self, id: GroupId, services: &mut Services) -> Option<CameraId> {
        let group = self.groups.get_mut(id.0)?;
        if !group.docked || group.feeds.is_empty() {
            return None;
        }

        let (old, new) = group.advance();
        services.render.set_camera_enabled(old, false);
        rebind(services, old, RenderTarget::Surface(group.surface));
        rebind(services, new, RenderTarget::Screen);
        services.render.set_camera_enabled(new, true);
        services
            .render
            .retarget_material(group.material, MaterialBinding::Live(group.surface));

        tracing::info!("Docked view of {} cycled to feed {}", group.name, group.index);
        services.emit(CamEventKind::FeedCycled {
            group: id,
            index: group.index,
            cause: CycleCause::Manual,
        });
        Some(new)
    }

    /// Returns the viewed feed to its surface after undocking.
    pub fn withdraw(&mut self, id: GroupId, services: &mut Services) {
        let Some(group) = self.groups.get_mut(id.0) else {
            return;
        };
        if !group.docked {
            return;
        }
        group.docked = false;
        let Some(camera) = group.current_camera() else {
            return;
        };
        services.render.set_camera_enabled(camera, false);
        rebind(services, camera, RenderTarget::Surface(group.surface));
        if group.active {
            services.render.set_camera_enabled(camera, true);
        }
    }
}

fn rebind(services: &mut Services, camera: CameraId, target: RenderTarget) {
    if let Err(e) = services.render.bind_output(camera, target) {
        tracing::warn!("Rebinding {} failed: {}", camera, e);
    }
}

fn setup_group(
    id: GroupId,
    config: &GroupConfig,
    feeds_config: &FeedConfig,
    directory: &dyn SceneDirectory,
    rng: &mut SmallRng,
    services: &mut Services,
) -> Result<FeedGroup, SetupError> {
    let component = format!("feed group {}", config.name);
    let monitor = directory
        .model(&config.monitor)
        .ok_or_else(|| SetupError::missing(&component, format!("monitor {}", config.monitor)))?;

    let toggle = config.toggle.as_deref().and_then(|name| {
        let model = directory.model(name);
        if model.is_none() {
            tracing::warn!("{}: toggle {} not found, group cannot be toggled", component, name);
        }
        model
    });

    let surface = services
        .render
        .allocate_surface(&config.name, feeds_config.surface_size)
        .map_err(|e| SetupError::render(&component, e))?;
    let material = services
        .render
        .allocate_material(monitor)
        .map_err(|e| SetupError::render(&component, e))?;

    let mut feeds = Vec::with_capacity(config.feeds.len());
    for name in &config.feeds {
        let Some(camera) = directory.camera(name) else {
            tracing::warn!("{}: feed camera {} not found, skipping", component, name);
            continue;
        };
        if let Err(e) = services.render.bind_output(camera, RenderTarget::Surface(surface)) {
            tracing::warn!("{}: skipping feed {}: {}", component, name, e);
            continue;
        }
        services.render.set_camera_enabled(camera, feeds.is_empty());
        let blink = directory
            .indicator(name)
            .map(|indicator| BlinkLoop::new(indicator, feeds_config.blink_interval));
        feeds.push(Feed {
            name: name.clone(),
            camera,
            blink,
        });
    }

    if feeds.is_empty() {
        tracing::warn!("{}", SetupError::empty(&component));
        services
            .render
            .retarget_material(material, MaterialBinding::Placeholder);
    } else {
        services
            .render
            .retarget_material(material, MaterialBinding::Live(surface));
        for feed in &mut feeds {
            if let Some(blink) = feed.blink.as_mut() {
                blink.start(services.display);
            }
        }
    }

    let base = config.cycle_interval.unwrap_or(feeds_config.cycle_interval);
    let timer = AutoCycle::new(
        base,
        Jitter::new(feeds_config.jitter_min, feeds_config.jitter_max),
        rng,
    );

    Ok(FeedGroup {
        id,
        name: config.name.clone(),
        monitor,
        toggle,
        feeds,
        index: 0,
        active: true,
        docked: false,
        surface,
        material,
        timer,
    })
}
