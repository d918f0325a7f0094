//! Recording-light blink loop.

use cam_events::IndicatorId;

use crate::schedule::clamp_step;
use crate::services::DisplayService;

/// Smallest half-period accepted; shorter intervals are clamped to it.
const MIN_BLINK_INTERVAL: f32 = 0.05;

/// Blinks one indicator on and off while running.
#[derive(Debug, Clone, PartialEq)]
pub struct BlinkLoop {
    indicator: IndicatorId,
    interval: f32,
    elapsed: f32,
    lit: bool,
    running: bool,
}

impl BlinkLoop {
    /// Creates a stopped loop.
    pub fn new(indicator: IndicatorId, interval: f32) -> Self {
        Self {
            indicator,
            interval: interval.max(MIN_BLINK_INTERVAL),
            elapsed: 0.0,
            lit: false,
            running: false,
        }
    }

    pub fn indicator(&self) -> IndicatorId {
        self.indicator
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    /// (Re)starts from the lit phase. Restarting resets the phase.
    pub fn start(&mut self, display: &mut dyn DisplayService) {
        self.running = true;
        self.elapsed = 0.0;
        self.set_lit(true, display);
    }

    /// Stops and leaves the indicator dark.
    pub fn stop(&mut self, display: &mut dyn DisplayService) {
        self.running = false;
        self.elapsed = 0.0;
        self.set_lit(false, display);
    }

    pub fn tick(&mut self, dt: f32, display: &mut dyn DisplayService) {
        if !self.running {
            return;
        }
        self.elapsed += clamp_step(dt);
        while self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            let lit = !self.lit;
            self.set_lit(lit, display);
        }
    }

    fn set_lit(&mut self, lit: bool, display: &mut dyn DisplayService) {
        self.lit = lit;
        display.set_indicator(self.indicator, lit);
    }
}
