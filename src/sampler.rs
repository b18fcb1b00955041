use std::collections::VecDeque;

use serde::Serialize;

/// Parameters of the rolling-wheel model and its animation window.
///
/// `radius` must be non-zero; the sampler does not check it and a zero radius
/// propagates non-finite values into the rim height. The config layer supplies
/// defaults instead of clamping.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct WheelParameters {
    /// Wheel radius in meters.
    pub radius: f64,
    /// Horizontal speed of the wheel center in m/s; the sign gives direction.
    pub velocity: f64,
    /// Simulation step in seconds.
    pub time_step: f64,
    /// Bound on the number of retained samples.
    pub max_points: usize,
    /// Elapsed time at which the animation stops, in seconds.
    pub animation_duration: f64,
}

/// One sample of the rim point path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrajectoryPoint {
    pub x: f64,
    pub y: f64,
}

/// Suggested horizontal axis bounds for rendering.
///
/// The bounds follow the sliding animation window, not the retained points:
/// near t = 0 they extend left of the oldest sample, and a negative velocity
/// reverses them. Both quirks are kept for compatibility with the reference
/// renderer; callers normalize for display.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Viewport {
    pub x_min: f64,
    pub x_max: f64,
}

// Tolerance on target / time_step so a target landing exactly on a step
// boundary still yields that step despite rounding.
const STEP_RATIO_EPS: f64 = 1e-9;

/// Samples the path traced by a point on the rim of a rolling wheel,
/// `y = r * |sin(x / r)|`, over a sliding time window bounded by `max_points`.
#[derive(Debug, Clone)]
pub struct TrajectorySampler {
    params: WheelParameters,
    current_time: f64,
    animating: bool,
    buffer: VecDeque<TrajectoryPoint>,
}

impl TrajectorySampler {
    pub fn new(params: WheelParameters) -> Self {
        Self {
            params,
            current_time: 0.0,
            animating: false,
            buffer: VecDeque::new(),
        }
    }

    pub fn params(&self) -> &WheelParameters {
        &self.params
    }

    pub fn points(&self) -> &VecDeque<TrajectoryPoint> {
        &self.buffer
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// Clears the buffer and regenerates every sample from t = 0 up to and
    /// including `target`, then evicts from the front down to `max_points`.
    ///
    /// Sample times come from an integer step index rather than repeated
    /// addition of `time_step`, so the point count does not drift over long
    /// runs.
    pub fn recompute_full(&mut self, target: f64) {
        self.buffer.clear();

        let dt = self.params.time_step;
        let steps = if target > 0.0 {
            (target / dt + STEP_RATIO_EPS).floor() as usize
        } else {
            0
        };

        for k in 0..=steps {
            let t = k as f64 * dt;
            let x = self.params.velocity * t;
            let theta = x / self.params.radius;
            let y = (self.params.radius * theta.sin()).abs();
            self.buffer.push_back(TrajectoryPoint { x, y });
        }

        while self.buffer.len() > self.params.max_points {
            self.buffer.pop_front();
        }
    }

    /// One animation tick: advances the clock by `dt` and rebuilds the buffer.
    pub fn advance(&mut self, dt: f64) {
        self.current_time += dt;
        self.recompute_full(self.current_time);
    }

    /// Rewinds the clock to zero and drops all samples; parameters survive.
    pub fn reset(&mut self) {
        self.current_time = 0.0;
        self.buffer.clear();
    }

    pub fn start(&mut self) {
        self.reset();
        self.animating = true;
    }

    pub fn stop(&mut self) {
        self.animating = false;
    }

    pub fn set_radius(&mut self, radius: f64) {
        self.params.radius = radius;
        self.recompute_full(self.current_time);
    }

    pub fn set_velocity(&mut self, velocity: f64) {
        self.params.velocity = velocity;
        self.recompute_full(self.current_time);
    }

    pub fn set_animation_duration(&mut self, duration: f64) {
        self.params.animation_duration = duration;
        self.recompute_full(self.current_time);
    }

    /// Axis bounds centered on the sliding window of `max_points` steps
    /// ending at the current time. Pure in the clock and parameters; the
    /// buffer contents do not enter the formula.
    pub fn viewport(&self) -> Viewport {
        let window = self.params.max_points as f64 * self.params.time_step;
        let center_x = self.current_time - window / 2.0;
        Viewport {
            x_min: center_x * self.params.velocity,
            x_max: (center_x + window) * self.params.velocity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(radius: f64, velocity: f64) -> WheelParameters {
        WheelParameters {
            radius,
            velocity,
            time_step: 0.1,
            max_points: 100,
            animation_duration: 10.0,
        }
    }

    #[test]
    fn zero_target_yields_single_origin_point() {
        let mut sampler = TrajectorySampler::new(params(2.5, -3.0));
        sampler.recompute_full(0.0);
        assert_eq!(sampler.points().len(), 1);
        let first = sampler.points()[0];
        assert_eq!(first.x, 0.0);
        assert_eq!(first.y, 0.0);
    }

    #[test]
    fn known_values_at_first_step() {
        let mut sampler = TrajectorySampler::new(params(1.0, 1.0));
        sampler.recompute_full(0.1);
        assert_eq!(sampler.points().len(), 2);
        let second = sampler.points()[1];
        assert!((second.x - 0.1).abs() < 1e-12);
        assert!((second.y - 0.1_f64.sin().abs()).abs() < 1e-12);
        assert!((second.y - 0.0998334).abs() < 1e-6);
    }

    #[test]
    fn buffer_never_exceeds_bound() {
        let mut sampler = TrajectorySampler::new(params(1.0, 1.0));
        for target in [0.0, 0.5, 5.0, 9.9, 20.0, 137.3] {
            sampler.recompute_full(target);
            assert!(sampler.points().len() <= 100, "target {target} overflowed");
        }
    }

    #[test]
    fn eviction_keeps_newest_window() {
        let mut sampler = TrajectorySampler::new(params(1.0, 1.0));
        sampler.recompute_full(20.0);
        // 201 generated, the oldest 101 evicted; the survivor front is the
        // sample for step index 101.
        assert_eq!(sampler.points().len(), 100);
        let oldest = sampler.points()[0];
        assert!((oldest.x - 10.1).abs() < 1e-9);
        let newest = sampler.points()[99];
        assert!((newest.x - 20.0).abs() < 1e-9);
    }

    #[test]
    fn heights_are_never_negative() {
        let mut sampler = TrajectorySampler::new(params(0.7, -2.3));
        sampler.recompute_full(50.0);
        assert!(sampler.points().iter().all(|p| p.y >= 0.0));
    }

    #[test]
    fn x_is_monotonic_in_the_direction_of_travel() {
        let mut forward = TrajectorySampler::new(params(1.0, 1.5));
        forward.recompute_full(8.0);
        for pair in forward.points().iter().collect::<Vec<_>>().windows(2) {
            assert!(pair[1].x >= pair[0].x);
        }

        let mut backward = TrajectorySampler::new(params(1.0, -1.5));
        backward.recompute_full(8.0);
        for pair in backward.points().iter().collect::<Vec<_>>().windows(2) {
            assert!(pair[1].x <= pair[0].x);
        }
    }

    #[test]
    fn advance_matches_full_recompute() {
        let mut ticked = TrajectorySampler::new(params(1.3, 0.8));
        for _ in 0..37 {
            ticked.advance(0.1);
        }

        let mut rebuilt = TrajectorySampler::new(params(1.3, 0.8));
        rebuilt.recompute_full(ticked.current_time());

        assert_eq!(ticked.points().len(), rebuilt.points().len());
        for (a, b) in ticked.points().iter().zip(rebuilt.points().iter()) {
            assert!((a.x - b.x).abs() < 1e-12);
            assert!((a.y - b.y).abs() < 1e-12);
        }
    }

    #[test]
    fn reset_clears_samples_and_clock() {
        let mut sampler = TrajectorySampler::new(params(1.0, 1.0));
        for _ in 0..25 {
            sampler.advance(0.1);
        }
        sampler.reset();
        assert!(sampler.points().is_empty());
        assert_eq!(sampler.current_time(), 0.0);
        assert!((sampler.params().radius - 1.0).abs() < 1e-12);
    }

    #[test]
    fn setters_recompute_at_the_current_time() {
        let mut sampler = TrajectorySampler::new(params(1.0, 1.0));
        for _ in 0..5 {
            sampler.advance(0.1);
        }
        sampler.set_velocity(2.0);
        let newest = *sampler.points().back().unwrap();
        assert!((newest.x - 1.0).abs() < 1e-9);
        assert_eq!(sampler.points().len(), 6);
    }

    #[test]
    fn viewport_follows_the_reference_formula() {
        let mut sampler = TrajectorySampler::new(params(1.0, 2.0));
        for _ in 0..50 {
            sampler.advance(0.1);
        }
        assert!((sampler.current_time() - 5.0).abs() < 1e-9);
        let view = sampler.viewport();
        assert!(view.x_min.abs() < 1e-9);
        assert!((view.x_max - 20.0).abs() < 1e-9);
    }

    #[test]
    fn viewport_reverses_under_negative_velocity() {
        let sampler = TrajectorySampler::new(params(1.0, -1.0));
        let view = sampler.viewport();
        assert!(view.x_min > view.x_max);
    }
}
