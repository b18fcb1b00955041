use std::thread;
use std::time::Duration;

use anyhow::Result;

use crate::sampler::TrajectorySampler;

/// Owns the tick loop the sampler itself stays free of: advancing the clock,
/// stopping once the configured duration is reached, and optional wall-clock
/// pacing between ticks.
pub struct AnimationDriver {
    sampler: TrajectorySampler,
    tick_interval: Duration,
}

impl AnimationDriver {
    pub fn new(sampler: TrajectorySampler, tick_interval_ms: u64) -> Self {
        Self {
            sampler,
            tick_interval: Duration::from_millis(tick_interval_ms),
        }
    }

    pub fn sampler(&self) -> &TrajectorySampler {
        &self.sampler
    }

    pub fn into_sampler(self) -> TrajectorySampler {
        self.sampler
    }

    /// Restarts the animation and ticks until the elapsed time reaches the
    /// animation duration, invoking `on_tick` after every advance. The clock
    /// is advanced before the stop check, so the final tick may land at or
    /// just past the duration. Returns the number of ticks performed.
    pub fn run<F>(&mut self, mut on_tick: F) -> Result<usize>
    where
        F: FnMut(usize, &TrajectorySampler) -> Result<()>,
    {
        let dt = self.sampler.params().time_step;
        let duration = self.sampler.params().animation_duration;

        self.sampler.start();
        let mut ticks = 0;
        while self.sampler.is_animating() {
            self.sampler.advance(dt);
            ticks += 1;
            on_tick(ticks, &self.sampler)?;

            if self.sampler.current_time() >= duration {
                self.sampler.stop();
            } else if !self.tick_interval.is_zero() {
                thread::sleep(self.tick_interval);
            }
        }

        Ok(ticks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::WheelParameters;

    fn sampler(duration: f64) -> TrajectorySampler {
        TrajectorySampler::new(WheelParameters {
            radius: 1.0,
            velocity: 1.0,
            time_step: 0.1,
            max_points: 100,
            animation_duration: duration,
        })
    }

    #[test]
    fn runs_until_the_duration_is_reached() {
        let mut driver = AnimationDriver::new(sampler(0.95), 0);
        let mut seen = 0;
        let ticks = driver
            .run(|tick, state| {
                seen = tick;
                assert!(!state.points().is_empty());
                Ok(())
            })
            .unwrap();
        assert_eq!(ticks, 10);
        assert_eq!(seen, ticks);
        assert!(driver.sampler().current_time() >= 0.95);
        assert!(!driver.sampler().is_animating());
    }

    #[test]
    fn zero_duration_still_performs_one_tick() {
        let mut driver = AnimationDriver::new(sampler(0.0), 0);
        let ticks = driver.run(|_, _| Ok(())).unwrap();
        assert_eq!(ticks, 1);
    }

    #[test]
    fn callback_errors_abort_the_run() {
        let mut driver = AnimationDriver::new(sampler(5.0), 0);
        let result = driver.run(|tick, _| {
            if tick == 3 {
                anyhow::bail!("renderer failure");
            }
            Ok(())
        });
        assert!(result.is_err());
    }
}
