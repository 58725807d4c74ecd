//! Animation clock and frame statistics.
//!
//! [`AnimationClock`] feeds the render session its millisecond timestamp. It
//! is monotonic: scaling only ever stretches elapsed wall-clock time and a
//! paused clock holds its value.

use std::time::{Duration, Instant};

use tracing::warn;

/// Wall-clock time scaled by `time_scale`, in milliseconds.
#[derive(Debug, Clone)]
pub struct AnimationClock {
    elapsed_ms: f64,
    last: Instant,
    time_scale: f64,
    paused: bool,
}

impl AnimationClock {
    /// A clock starting at zero. Negative or non-finite scales are treated as 0.
    pub fn new(time_scale: f64, paused: bool) -> Self {
        Self::starting_at(Instant::now(), time_scale, paused)
    }

    fn starting_at(start: Instant, time_scale: f64, paused: bool) -> Self {
        let sanitized = if time_scale.is_finite() && time_scale >= 0.0 {
            time_scale
        } else {
            warn!(time_scale, "Invalid time scale, clock frozen");
            0.0
        };
        Self {
            elapsed_ms: 0.0,
            last: start,
            time_scale: sanitized,
            paused,
        }
    }

    /// Current timestamp in milliseconds.
    pub fn now_ms(&mut self) -> f64 {
        self.sample(Instant::now())
    }

    /// Advances to `now` and returns the timestamp. Instants earlier than the
    /// last sample are ignored.
    pub fn sample(&mut self, now: Instant) -> f64 {
        let delta = now.saturating_duration_since(self.last);
        self.last = self.last.max(now);
        if !self.paused {
            self.elapsed_ms += delta.as_secs_f64() * 1000.0 * self.time_scale;
        }
        self.elapsed_ms
    }

    pub fn pause(&mut self) {
        self.pause_at(Instant::now());
    }

    pub fn resume(&mut self) {
        self.resume_at(Instant::now());
    }

    /// Toggles pause and returns whether the clock is now paused.
    pub fn toggle(&mut self) -> bool {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
        self.paused
    }

    fn pause_at(&mut self, now: Instant) {
        self.sample(now);
        self.paused = true;
    }

    fn resume_at(&mut self, now: Instant) {
        self.last = self.last.max(now);
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }
}

/// Frames-per-second over one-second windows.
#[derive(Debug, Clone)]
pub struct FrameStats {
    window_start: Instant,
    frames: u32,
}

impl FrameStats {
    const WINDOW: Duration = Duration::from_secs(1);

    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    fn starting_at(start: Instant) -> Self {
        Self {
            window_start: start,
            frames: 0,
        }
    }

    /// Counts a frame at `now`. Returns the FPS of the window that just
    /// closed, or `None` while the window is still open.
    pub fn record(&mut self, now: Instant) -> Option<f64> {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < Self::WINDOW {
            return None;
        }
        let fps = f64::from(self.frames) / elapsed.as_secs_f64();
        self.window_start = now;
        self.frames = 0;
        Some(fps)
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_clock_tracks_wall_time() {
        let start = Instant::now();
        let mut clock = AnimationClock::starting_at(start, 1.0, false);
        assert_eq!(clock.sample(start), 0.0);
        assert!((clock.sample(start + ms(250)) - 250.0).abs() < 1e-6);
        assert!((clock.sample(start + ms(1000)) - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_time_scale_stretches_time() {
        let start = Instant::now();
        let mut clock = AnimationClock::starting_at(start, 0.5, false);
        assert!((clock.sample(start + ms(400)) - 200.0).abs() < 1e-6);
    }

    #[test]
    fn test_paused_clock_holds_value() {
        let start = Instant::now();
        let mut clock = AnimationClock::starting_at(start, 1.0, false);
        clock.pause_at(start + ms(100));
        assert!((clock.sample(start + ms(900)) - 100.0).abs() < 1e-6);

        clock.resume_at(start + ms(1000));
        assert!((clock.sample(start + ms(1050)) - 150.0).abs() < 1e-6);
    }

    #[test]
    fn test_starts_paused() {
        let start = Instant::now();
        let mut clock = AnimationClock::starting_at(start, 1.0, true);
        assert!(clock.is_paused());
        assert_eq!(clock.sample(start + ms(500)), 0.0);
    }

    #[test]
    fn test_never_runs_backwards() {
        let start = Instant::now();
        let mut clock = AnimationClock::starting_at(start + ms(100), 1.0, false);
        let a = clock.sample(start + ms(200));
        let b = clock.sample(start);
        let c = clock.sample(start + ms(250));
        assert!(b >= a, "{b} < {a}");
        assert!((c - 150.0).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_scale_freezes() {
        let start = Instant::now();
        for scale in [-1.0, f64::NAN, f64::INFINITY] {
            let mut clock = AnimationClock::starting_at(start, scale, false);
            assert_eq!(clock.time_scale(), 0.0);
            assert_eq!(clock.sample(start + ms(500)), 0.0);
        }
    }

    #[test]
    fn test_toggle_flips_state() {
        let mut clock = AnimationClock::new(1.0, false);
        assert!(clock.toggle());
        assert!(!clock.toggle());
    }

    #[test]
    fn test_frame_stats_window() {
        let start = Instant::now();
        let mut stats = FrameStats::starting_at(start);
        for i in 1..60 {
            assert_eq!(stats.record(start + ms(i * 16)), None);
        }
        let fps = stats.record(start + ms(1000)).expect("window closed");
        assert!((fps - 60.0).abs() < 1e-9, "fps {fps}");

        // Next window starts empty.
        assert_eq!(stats.record(start + ms(1500)), None);
        let fps = stats.record(start + ms(2000)).expect("second window closed");
        assert!((fps - 2.0).abs() < 1e-9, "fps {fps}");
    }
}
