//! Fixed timestep accumulator
//!
//! Wall-clock time is banked in whole `Duration`s and paid out one tick at a
//! time, so the update rate is independent of how fast frames are drawn.

use std::thread;
use std::time::Duration;

use crate::error::BrainError;

/// Something the loop can step and draw
pub trait Simulation {
    /// Advance exactly one tick
    fn update(&mut self) -> Result<(), BrainError>;
    fn render(&mut self);
}

/// What one loop iteration did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Iteration {
    pub updates: u32,
    pub rendered: bool,
}

#[derive(Debug, Clone)]
pub struct FixedStep {
    tick: Duration,
    accumulator: Duration,
}

impl FixedStep {
    pub fn new(tick: Duration) -> Self {
        Self {
            // A zero tick would never drain the accumulator
            tick: tick.max(Duration::from_nanos(1)),
            accumulator: Duration::ZERO,
        }
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Banked time not yet paid out as a tick
    pub fn pending(&self) -> Duration {
        self.accumulator
    }

    /// Bank `elapsed` and return how many ticks are now due
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulator += elapsed;
        let mut due = 0;
        while self.accumulator >= self.tick {
            self.accumulator -= self.tick;
            due += 1;
        }
        due
    }

    /// One loop iteration: catch-up updates, a voluntary sleep of `idle`,
    /// then a render if anything changed.
    pub fn run<S: Simulation + ?Sized>(
        &mut self,
        elapsed: Duration,
        sim: &mut S,
        idle: Duration,
    ) -> Result<Iteration, BrainError> {
        let due = self.advance(elapsed);
        for _ in 0..due {
            sim.update()?;
        }

        if !idle.is_zero() {
            thread::sleep(idle);
        }

        let rendered = due > 0;
        if rendered {
            sim.render();
        }
        Ok(Iteration {
            updates: due,
            rendered,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        updates: u32,
        renders: u32,
        fail_at: Option<u32>,
    }

    impl Simulation for Counter {
        fn update(&mut self) -> Result<(), BrainError> {
            if self.fail_at == Some(self.updates) {
                return Err(BrainError::DimensionMismatch {
                    expected: 5,
                    actual: 4,
                });
            }
            self.updates += 1;
            Ok(())
        }

        fn render(&mut self) {
            self.renders += 1;
        }
    }

    const TICK: Duration = Duration::from_nanos(16_666_666);

    #[test]
    fn test_three_ticks_of_time_three_updates_one_render() {
        let mut step = FixedStep::new(TICK);
        let mut sim = Counter::default();

        let it = step.run(TICK * 3, &mut sim, Duration::ZERO).unwrap();

        assert_eq!(
            it,
            Iteration {
                updates: 3,
                rendered: true
            }
        );
        assert_eq!(sim.updates, 3);
        assert_eq!(sim.renders, 1);
        assert_eq!(step.pending(), Duration::ZERO);
    }

    #[test]
    fn test_short_frame_skips_render() {
        let mut step = FixedStep::new(TICK);
        let mut sim = Counter::default();

        let it = step.run(TICK / 2, &mut sim, Duration::ZERO).unwrap();
        assert_eq!(it, Iteration::default());
        assert_eq!(sim.renders, 0);

        // The banked half tick completes on the next frame
        let it = step.run(TICK / 2, &mut sim, Duration::ZERO).unwrap();
        assert_eq!(it.updates, 1);
        assert!(it.rendered);
    }

    #[test]
    fn test_remainder_is_carried() {
        let mut step = FixedStep::new(Duration::from_millis(10));
        assert_eq!(step.advance(Duration::from_millis(25)), 2);
        assert_eq!(step.pending(), Duration::from_millis(5));
        assert_eq!(step.advance(Duration::from_millis(5)), 1);
        assert_eq!(step.pending(), Duration::ZERO);
    }

    #[test]
    fn test_update_error_propagates() {
        let mut step = FixedStep::new(TICK);
        let mut sim = Counter {
            fail_at: Some(1),
            ..Default::default()
        };
        let result = step.run(TICK * 3, &mut sim, Duration::ZERO);
        assert!(matches!(result, Err(BrainError::DimensionMismatch { .. })));
        assert_eq!(sim.renders, 0);
    }

    #[test]
    fn test_zero_tick_is_clamped() {
        let mut step = FixedStep::new(Duration::ZERO);
        assert_eq!(step.tick(), Duration::from_nanos(1));
        assert_eq!(step.advance(Duration::from_nanos(3)), 3);
    }
}
