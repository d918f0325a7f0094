//! Full-screen view of auxiliary trail cameras, one at a time.

use cam_events::{CameraId, CamEventKind, RenderTarget};

use crate::config::TrailConfig;
use crate::services::{SceneDirectory, Services};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailState {
    Inactive,
    Viewing(usize),
}

/// Cycles through a fixed list of trail feeds.
#[derive(Debug)]
pub struct TrailCycler {
    eye: CameraId,
    feeds: Vec<(String, CameraId)>,
    state: TrailState,
    label_duration: f32,
}

impl TrailCycler {
    /// Sends every trail feed to the screen, disabled. Feeds that cannot be
    /// found or bound are dropped from the cycle.
    pub fn setup(
        config: &TrailConfig,
        eye: CameraId,
        directory: &dyn SceneDirectory,
        services: &mut Services,
    ) -> Self {
        let mut feeds = Vec::with_capacity(config.feeds.len());
        for name in &config.feeds {
            let Some(camera) = directory.camera(name) else {
                tracing::warn!("trail: missing camera {}, skipping", name);
                continue;
            };
            if let Err(e) = services.render.bind_output(camera, RenderTarget::Screen) {
                tracing::warn!("trail: skipping {}: {}", name, e);
                continue;
            }
            services.render.set_camera_enabled(camera, false);
            feeds.push((name.clone(), camera));
        }

        Self {
            eye,
            feeds,
            state: TrailState::Inactive,
            label_duration: config.label_duration,
        }
    }

    pub fn state(&self) -> TrailState {
        self.state
    }

    pub fn is_viewing(&self) -> bool {
        matches!(self.state, TrailState::Viewing(_))
    }

    pub fn cameras(&self) -> impl Iterator<Item = CameraId> + '_ {
        self.feeds.iter().map(|(_, camera)| *camera)
    }

    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }

    /// Enters the trail view at feed 0, or moves to the next feed.
    pub fn cycle(&mut self, services: &mut Services) {
        if self.feeds.is_empty() {
            return;
        }

        let index = match self.state {
            TrailState::Inactive => {
                services.render.set_camera_enabled(self.eye, false);
                0
            }
            TrailState::Viewing(i) => (i + 1) % self.feeds.len(),
        };
        let entering = self.state == TrailState::Inactive;
        self.state = TrailState::Viewing(index);
        self.enable_only(index, services);

        let (name, camera) = &self.feeds[index];
        tracing::info!("Trail cam -> {}: {}", index, name);
        services
            .display
            .show_text(&format!("TRAIL CAM {}", index + 1), self.label_duration);
        let camera = *camera;
        services.emit(if entering {
            CamEventKind::TrailViewEntered { index, camera }
        } else {
            CamEventKind::TrailViewCycled { index, camera }
        });
    }

    /// Leaves the trail view from any state: all trail feeds off, free-look on.
    pub fn cancel(&mut self, services: &mut Services) {
        for (_, camera) in &self.feeds {
            services.render.set_camera_enabled(*camera, false);
        }
        services.render.set_camera_enabled(self.eye, true);

        if self.is_viewing() {
            tracing::info!("Trail view closed");
            services.emit(CamEventKind::TrailViewExited);
        }
        self.state = TrailState::Inactive;
    }

    fn enable_only(&self, index: usize, services: &mut Services) {
        for (i, (_, camera)) in self.feeds.iter().enumerate() {
            services.render.set_camera_enabled(*camera, i == index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessAudio, HeadlessDisplay, HeadlessRender, HeadlessScene};
    use crate::services::EventQueue;

    fn trail_config() -> TrailConfig {
        TrailConfig {
            feeds: vec!["trail_a".into(), "trail_b".into(), "trail_c".into()],
            label_duration: 1.0,
        }
    }

    #[test]
    fn test_cycle_wraps_and_enables_one() {
        let mut scene = HeadlessScene::new();
        let eye = scene.add_eye();
        let cams = [
            scene.add_camera("trail_a"),
            scene.add_camera("trail_b"),
            scene.add_camera("trail_c"),
        ];
        let mut render = HeadlessRender::new();
        let mut audio = HeadlessAudio::default();
        let mut display = HeadlessDisplay::default();
        let mut events = EventQueue::new();
        let mut services = Services::new(&mut render, &mut audio, &mut display, &mut events);
        services.render.set_camera_enabled(eye, true);

        let mut trail = TrailCycler::setup(&trail_config(), eye, &scene, &mut services);
        for expected in [0, 1, 2, 0] {
            trail.cycle(&mut services);
            assert_eq!(trail.state(), TrailState::Viewing(expected));
        }
        drop(services);

        assert!(!render.is_enabled(eye));
        assert_eq!(render.enabled_among(&cams), vec![cams[0]]);
        assert_eq!(render.output_of(cams[1]), Some(RenderTarget::Screen));
        assert_eq!(display.last_message(), Some("TRAIL CAM 1"));
        assert!(matches!(events.iter().next(), Some(CamEventKind::TrailViewEntered { index: 0, .. })));
    }

    #[test]
    fn test_cancel_from_any_state() {
        let mut scene = HeadlessScene::new();
        let eye = scene.add_eye();
        let a = scene.add_camera("trail_a");
        let mut render = HeadlessRender::new();
        let mut audio = HeadlessAudio::default();
        let mut display = HeadlessDisplay::default();
        let mut events = EventQueue::new();
        let mut services = Services::new(&mut render, &mut audio, &mut display, &mut events);

        let mut trail = TrailCycler::setup(&trail_config(), eye, &scene, &mut services);
        assert_eq!(trail.len(), 1);

        trail.cancel(&mut services);
        assert!(services.events.is_empty());

        trail.cycle(&mut services);
        trail.cancel(&mut services);
        drop(services);

        assert_eq!(trail.state(), TrailState::Inactive);
        assert!(render.is_enabled(eye));
        assert!(!render.is_enabled(a));
        assert_eq!(events.iter().last(), Some(&CamEventKind::TrailViewExited));
    }

    #[test]
    fn test_empty_trail_is_noop() {
        let mut scene = HeadlessScene::new();
        let eye = scene.add_eye();
        let mut render = HeadlessRender::new();
        let mut audio = HeadlessAudio::default();
        let mut display = HeadlessDisplay::default();
        let mut events = EventQueue::new();
        let mut services = Services::new(&mut render, &mut audio, &mut display, &mut events);
        services.render.set_camera_enabled(eye, true);

        let mut trail = TrailCycler::setup(&TrailConfig::default(), eye, &scene, &mut services);
        trail.cycle(&mut services);
        drop(services);

        assert_eq!(trail.state(), TrailState::Inactive);
        assert!(render.is_enabled(eye));
    }
}
