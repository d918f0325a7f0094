//! Headless runner: replays scripted input against the rig and logs events.

pub mod logger;
pub mod scenario;
pub mod sim;
pub mod systems;

pub use logger::EventLogger;
pub use scenario::{InputStep, Scenario, ScenarioError, Timeline};
pub use sim::{SimError, Simulation};
