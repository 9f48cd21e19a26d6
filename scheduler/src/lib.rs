#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Dual-cadence timing policies for the Delve simulation.
//!
//! One simulation authority advances at a fixed tick rate while the
//! presentation loop samples state at its own capped rate. The policies here
//! are pure over injected [`Instant`] values: nothing in this crate sleeps
//! or reads the clock, which keeps every timing rule testable.

use std::time::{Duration, Instant};

use glam::Vec2;

/// Interval between simulation ticks: ten updates per simulated second.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Presentation pacing target of sixty frames per second.
pub const FRAME_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / 60);

/// Blend factor applied once per presentation frame by [`CameraFollow`].
pub const CAMERA_BLEND: f32 = 0.2;

/// Decides when the fixed-rate simulation tick is due.
///
/// At most one tick is reported per presentation iteration and no catch-up
/// ticks are issued after a slow frame: the reference point jumps to the
/// moment the tick was granted, so the simulation falls behind wall-clock
/// time rather than bursting. That is the intended trade-off.
#[derive(Clone, Copy, Debug)]
pub struct TickClock {
    interval: Duration,
    last_tick: Option<Instant>,
}

impl TickClock {
    /// Creates a clock issuing ticks at the provided fixed interval.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_tick: None,
        }
    }

    /// Reports whether a tick is due at `now`, consuming it if so.
    ///
    /// The first call arms the clock and reports no tick, so a freshly
    /// started loop renders at least one frame before simulating.
    pub fn due(&mut self, now: Instant) -> bool {
        let Some(last_tick) = self.last_tick else {
            self.last_tick = Some(now);
            return false;
        };

        if now.duration_since(last_tick) >= self.interval {
            self.last_tick = Some(now);
            true
        } else {
            false
        }
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new(TICK_INTERVAL)
    }
}

/// Computes the sleep needed to hold the presentation loop at its target rate.
#[derive(Clone, Copy, Debug)]
pub struct FrameLimiter {
    frame_budget: Duration,
}

impl FrameLimiter {
    /// Creates a limiter around the provided per-frame budget.
    #[must_use]
    pub const fn new(frame_budget: Duration) -> Self {
        Self { frame_budget }
    }

    /// Surplus left in the frame budget, zero when the frame ran long.
    #[must_use]
    pub fn surplus(&self, frame_start: Instant, now: Instant) -> Duration {
        self.frame_budget
            .saturating_sub(now.duration_since(frame_start))
    }
}

impl Default for FrameLimiter {
    fn default() -> Self {
        Self::new(FRAME_INTERVAL)
    }
}

/// Displayed camera position chasing the tick-computed target.
///
/// The blend is applied once per presentation iteration, so smoothing speed
/// varies with frame rate. That matches the behavior the renderer expects
/// and is deliberate.
#[derive(Clone, Copy, Debug, Default)]
pub struct CameraFollow {
    position: Vec2,
}

impl CameraFollow {
    /// Creates a follower resting exactly on the provided position.
    #[must_use]
    pub const fn snapped_to(position: Vec2) -> Self {
        Self { position }
    }

    /// Teleports the camera, discarding any in-flight interpolation.
    pub fn snap_to(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Moves a fixed fraction of the remaining distance toward `target` and
    /// returns the updated position.
    pub fn advance_toward(&mut self, target: Vec2, blend: f32) -> Vec2 {
        self.position += (target - self.position) * blend;
        self.position
    }

    /// Camera position currently presented.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Instant {
        Instant::now()
    }

    #[test]
    fn first_poll_arms_the_clock_without_ticking() {
        let mut clock = TickClock::new(TICK_INTERVAL);
        assert!(!clock.due(base()));
    }

    #[test]
    fn ticks_fire_once_per_interval() {
        let start = base();
        let mut clock = TickClock::new(TICK_INTERVAL);
        assert!(!clock.due(start));

        assert!(!clock.due(start + Duration::from_millis(50)));
        assert!(clock.due(start + Duration::from_millis(100)));
        assert!(!clock.due(start + Duration::from_millis(150)));
        assert!(clock.due(start + Duration::from_millis(200)));
    }

    #[test]
    fn slow_frames_do_not_produce_catch_up_ticks() {
        let start = base();
        let mut clock = TickClock::new(TICK_INTERVAL);
        assert!(!clock.due(start));

        // Five intervals pass inside one long frame: exactly one tick fires
        // and the reference point moves to the grant, not to the schedule.
        assert!(clock.due(start + Duration::from_millis(500)));
        assert!(!clock.due(start + Duration::from_millis(510)));
        assert!(!clock.due(start + Duration::from_millis(590)));
        assert!(clock.due(start + Duration::from_millis(600)));
    }

    #[test]
    fn limiter_reports_the_unspent_budget() {
        let start = base();
        let limiter = FrameLimiter::new(Duration::from_millis(16));
        assert_eq!(
            limiter.surplus(start, start + Duration::from_millis(6)),
            Duration::from_millis(10),
        );
    }

    #[test]
    fn limiter_reports_zero_for_overlong_frames() {
        let start = base();
        let limiter = FrameLimiter::new(Duration::from_millis(16));
        assert_eq!(
            limiter.surplus(start, start + Duration::from_millis(40)),
            Duration::ZERO,
        );
    }

    #[test]
    fn camera_converges_without_overshooting() {
        let mut camera = CameraFollow::snapped_to(Vec2::ZERO);
        let target = Vec2::new(10.0, -4.0);

        let mut previous_distance = camera.position().distance(target);
        for _ in 0..64 {
            let position = camera.advance_toward(target, CAMERA_BLEND);
            let distance = position.distance(target);
            assert!(distance <= previous_distance, "camera must not overshoot");
            previous_distance = distance;
        }
        assert!(previous_distance < 0.01);
    }

    #[test]
    fn camera_moves_a_fifth_of_the_gap_per_frame() {
        let mut camera = CameraFollow::snapped_to(Vec2::ZERO);
        let position = camera.advance_toward(Vec2::new(10.0, 0.0), CAMERA_BLEND);
        assert!((position.x - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn snapping_discards_interpolation() {
        let mut camera = CameraFollow::default();
        let _ = camera.advance_toward(Vec2::new(10.0, 10.0), CAMERA_BLEND);
        camera.snap_to(Vec2::new(3.0, 4.0));
        assert_eq!(camera.position(), Vec2::new(3.0, 4.0));
    }
}
