//! Viewpoint and camera-feed management.
//!
//! Decides which camera owns the player's screen and keeps many cycling
//! security feeds consistent with the few monitors that show them. Every
//! machine is advanced by an explicit `tick`, and all side effects go through
//! the service traits in [`services`], so the same core runs headless in
//! tests and the batch runner and inside the Bevy viewer.
//!
//! # Modules
//!
//! - [`rig`]: the per-frame driver that routes input between machines
//! - [`device`]: held device switching, camcorder viewfinder, polaroid capture
//! - [`trail`]: full-screen trail camera cycling
//! - [`feeds`]: feed groups, monitors and auto-cycle
//! - [`docking`]: moving the eye into a monitor and back
//! - [`door`]: door toggle, peek, slam and glow
//! - [`headless`]: recording service backends

pub mod animator;
pub mod config;
pub mod device;
pub mod docking;
pub mod door;
pub mod error;
pub mod feeds;
pub mod geometry;
pub mod headless;
pub mod indicator;
pub mod input;
pub mod rig;
pub mod schedule;
pub mod services;
pub mod trail;

pub use config::{
    default_config_toml, DeviceConfig, DockingConfig, DoorConfig, FeedConfig, GroupConfig,
    HandheldConfig, KeyBindings, NeutralConfig, RigConfig, TrailConfig,
};
pub use device::{DeviceSwitcher, HandheldState, PhotoStep, SwitchStep, SwitchTask};
pub use docking::{DockState, DockingController, ViewpointSession};
pub use door::{glow_for_distance, Door, DoorMode, DoorSet};
pub use error::{ConfigError, RenderError, SetupError, TomlSerializeError};
pub use feeds::{Feed, FeedGroup, FeedRegistry};
pub use geometry::Quad;
pub use input::{Action, InputSnapshot, InputSource};
pub use rig::{Rig, ViewOwner};
pub use services::{
    AudioService, DisplayService, EventQueue, RayHit, RenderService, SceneDirectory, SceneQuery,
    Services,
};
pub use trail::{TrailCycler, TrailState};
