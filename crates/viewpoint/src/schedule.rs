//! Per-group auto-cycle timers.
//!
//! Each timer waits `base + jitter` seconds, where the jitter is drawn from
//! `[jitter_min, jitter_max)` and re-rolled on every wake, whether or not the
//! wake ends up advancing the group.

use rand::Rng;

/// Floor on a single interval so a zero base cannot spin forever.
pub const MIN_CYCLE_INTERVAL: f32 = 0.01;

/// Longest frame step a timer accepts in one tick.
pub const MAX_STEP: f32 = 60.0;

/// Clamps a frame step into `[0, MAX_STEP]`. Non-finite steps count as no time.
pub fn clamp_step(dt: f32) -> f32 {
    if dt.is_finite() {
        dt.clamp(0.0, MAX_STEP)
    } else {
        0.0
    }
}

/// Half-open jitter range in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Jitter {
    pub min: f32,
    pub max: f32,
}

impl Jitter {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Draws one jitter value. A degenerate range yields `min`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max > self.min {
            rng.gen_range(self.min..self.max)
        } else {
            self.min
        }
    }
}

/// A repeating timer with a jittered interval.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoCycle {
    base_interval: f32,
    jitter: Jitter,
    remaining: f32,
    last_jitter: f32,
}

impl AutoCycle {
    /// Creates a timer with its first interval already rolled.
    pub fn new<R: Rng + ?Sized>(base_interval: f32, jitter: Jitter, rng: &mut R) -> Self {
        let mut cycle = Self {
            base_interval: base_interval.max(0.0),
            jitter,
            remaining: 0.0,
            last_jitter: 0.0,
        };
        cycle.remaining = cycle.roll(rng);
        cycle
    }

    pub fn base_interval(&self) -> f32 {
        self.base_interval
    }

    /// Jitter used for the interval currently counting down.
    pub fn last_jitter(&self) -> f32 {
        self.last_jitter
    }

    /// Seconds until the next wake.
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Advances the timer and returns how many times it woke.
    pub fn tick<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) -> u32 {
        self.remaining -= clamp_step(dt);
        let mut wakes = 0;
        while self.remaining <= 0.0 {
            wakes += 1;
            self.remaining += self.roll(rng);
        }
        wakes
    }

    fn roll<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f32 {
        self.last_jitter = self.jitter.sample(rng);
        (self.base_interval + self.last_jitter).max(MIN_CYCLE_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_jitter_within_bounds_and_varies() {
        let mut rng = SmallRng::seed_from_u64(42);
        let jitter = Jitter::new(0.1, 0.3);

        let samples: Vec<f32> = (0..500).map(|_| jitter.sample(&mut rng)).collect();

        assert!(samples.iter().all(|s| (0.1..0.3).contains(s)));
        let first = samples[0];
        assert!(samples.iter().any(|s| (s - first).abs() > 1e-4));
    }

    #[test]
    fn test_degenerate_jitter_is_min() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(Jitter::new(0.2, 0.2).sample(&mut rng), 0.2);
    }

    #[test]
    fn test_first_wake_after_base_plus_jitter() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut cycle = AutoCycle::new(2.0, Jitter::new(0.1, 0.3), &mut rng);
        let first = cycle.remaining();

        assert!((2.1..2.3).contains(&first));
        assert_eq!(cycle.tick(2.0, &mut rng), 0);
        assert_eq!(cycle.tick(0.31, &mut rng), 1);
    }

    #[test]
    fn test_jitter_rerolled_every_wake() {
        let mut rng = SmallRng::seed_from_u64(99);
        let mut cycle = AutoCycle::new(0.5, Jitter::new(0.1, 0.3), &mut rng);
        let mut jitters = Vec::new();

        for _ in 0..50 {
            let wakes = cycle.tick(0.9, &mut rng);
            assert!(wakes >= 1);
            jitters.push(cycle.last_jitter());
        }

        assert!(jitters.iter().all(|j| (0.1..0.3).contains(j)));
        assert!(jitters.windows(2).any(|w| (w[0] - w[1]).abs() > 1e-4));
    }

    #[test]
    fn test_zero_interval_is_bounded() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut cycle = AutoCycle::new(0.0, Jitter::new(0.0, 0.0), &mut rng);

        let wakes = cycle.tick(0.1, &mut rng);
        assert!((9..=11).contains(&wakes));
    }

    #[test]
    fn test_non_finite_and_huge_steps_terminate() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut cycle = AutoCycle::new(2.0, Jitter::new(0.1, 0.3), &mut rng);
        let before = cycle.remaining();

        assert_eq!(cycle.tick(f32::INFINITY, &mut rng), 0);
        assert_eq!(cycle.tick(f32::NAN, &mut rng), 0);
        assert_eq!(cycle.remaining(), before);

        let wakes = cycle.tick(1.0e30, &mut rng);
        assert!(wakes >= 1);
        assert!(wakes as f32 <= MAX_STEP / 2.1 + 1.0);
        assert!(cycle.remaining() > 0.0);
    }
}
