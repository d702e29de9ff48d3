use std::fmt;
use tracing::warn;

/// Irregularities in the raw timestamp stream. The clock degrades instead of
/// failing: the step is clamped and the anomaly is reported on the tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClockAnomaly {
    NonMonotonic { previous_ms: f64, current_ms: f64 },
    NonFinite,
    Gap { raw_delta: f32, clamped: f32 },
}

impl fmt::Display for ClockAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClockAnomaly::NonMonotonic { previous_ms, current_ms } => {
                write!(f, "NonMonotonic previous_ms={previous_ms:.3} current_ms={current_ms:.3}")
            }
            ClockAnomaly::NonFinite => write!(f, "NonFinite"),
            ClockAnomaly::Gap { raw_delta, clamped } => {
                write!(f, "Gap raw_delta={raw_delta:.3}s clamped={clamped:.4}s")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockTick {
    pub delta: f32,
    pub elapsed: f32,
    pub anomaly: Option<ClockAnomaly>,
}

/// Turns a stream of millisecond timestamps into per-tick deltas and an
/// accumulated simulation time.
pub struct Clock {
    last_timestamp_ms: Option<f64>,
    // Accumulated in f64 so long sessions keep sub-millisecond resolution.
    elapsed: f64,
    ticks: u64,
    max_delta: f32,
    fps_sample_frames: u64,
    fps: Option<u32>,
}

impl Clock {
    pub const DEFAULT_MAX_DELTA: f32 = 1.0 / 15.0;

    pub fn new(max_delta: f32, fps_sample_frames: u32) -> Self {
        let max_delta = if max_delta.is_finite() && max_delta > 0.0 { max_delta } else { Self::DEFAULT_MAX_DELTA };
        Self {
            last_timestamp_ms: None,
            elapsed: 0.0,
            ticks: 0,
            max_delta,
            fps_sample_frames: u64::from(fps_sample_frames.max(1)),
            fps: None,
        }
    }

    pub fn tick(&mut self, raw_timestamp_ms: f64, running: bool) -> ClockTick {
        self.ticks += 1;
        let (delta, raw_delta, anomaly) = self.measure(raw_timestamp_ms);
        if let Some(anomaly) = anomaly {
            warn!(target: "clock", tick = self.ticks, %anomaly, "timestamp anomaly");
        }
        if running {
            self.elapsed += f64::from(delta);
        }
        if self.ticks % self.fps_sample_frames == 0 && raw_delta > 0.0 {
            self.fps = Some((1.0 / raw_delta).round() as u32);
        }
        ClockTick { delta, elapsed: self.elapsed as f32, anomaly }
    }

    fn measure(&mut self, raw_timestamp_ms: f64) -> (f32, f32, Option<ClockAnomaly>) {
        if !raw_timestamp_ms.is_finite() {
            return (0.0, 0.0, Some(ClockAnomaly::NonFinite));
        }
        let Some(previous_ms) = self.last_timestamp_ms.replace(raw_timestamp_ms) else {
            return (0.0, 0.0, None);
        };
        if raw_timestamp_ms < previous_ms {
            // Keep the later baseline so a single bad sample cannot rewind the clock.
            self.last_timestamp_ms = Some(previous_ms);
            let anomaly = ClockAnomaly::NonMonotonic { previous_ms, current_ms: raw_timestamp_ms };
            return (0.0, 0.0, Some(anomaly));
        }
        let raw_delta = ((raw_timestamp_ms - previous_ms) / 1000.0) as f32;
        if raw_delta > self.max_delta {
            let anomaly = ClockAnomaly::Gap { raw_delta, clamped: self.max_delta };
            return (self.max_delta, raw_delta, Some(anomaly));
        }
        (raw_delta, raw_delta, None)
    }

    /// Zeroes elapsed time and the tick counter. The timestamp baseline is kept
    /// so the next delta is still measured against the wall clock.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.ticks = 0;
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed as f32
    }

    pub fn elapsed_seconds_f64(&self) -> f64 {
        self.elapsed
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn fps(&self) -> Option<u32> {
        self.fps
    }

    pub fn max_delta(&self) -> f32 {
        self.max_delta
    }

    pub fn last_timestamp_ms(&self) -> Option<f64> {
        self.last_timestamp_ms
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_DELTA, 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_has_zero_delta() {
        let mut clock = Clock::default();
        let tick = clock.tick(987_654.0, true);
        assert_eq!(tick.delta, 0.0);
        assert!(tick.anomaly.is_none());
        assert_eq!(clock.elapsed_seconds(), 0.0);
        assert_eq!(clock.ticks(), 1);
    }

    #[test]
    fn regular_ticks_accumulate() {
        let mut clock = Clock::default();
        clock.tick(1000.0, true);
        let tick = clock.tick(1016.0, true);
        assert!((tick.delta - 0.016).abs() < 1e-6);
        clock.tick(1032.0, true);
        assert!((clock.elapsed_seconds() - 0.032).abs() < 1e-6);
    }

    #[test]
    fn backwards_timestamp_yields_zero_delta() {
        let mut clock = Clock::default();
        clock.tick(500.0, true);
        let tick = clock.tick(400.0, true);
        assert_eq!(tick.delta, 0.0);
        assert!(matches!(tick.anomaly, Some(ClockAnomaly::NonMonotonic { .. })));
        let next = clock.tick(516.0, true);
        assert!((next.delta - 0.016).abs() < 1e-6, "baseline should stay at the later sample");
    }

    #[test]
    fn long_gap_is_clamped() {
        let mut clock = Clock::new(1.0 / 15.0, 60);
        clock.tick(0.0, true);
        let tick = clock.tick(5000.0, true);
        assert!(tick.delta <= 1.0 / 15.0 + f32::EPSILON);
        assert!(matches!(tick.anomaly, Some(ClockAnomaly::Gap { .. })));
    }

    #[test]
    fn non_finite_timestamp_is_ignored() {
        let mut clock = Clock::default();
        clock.tick(100.0, true);
        let tick = clock.tick(f64::NAN, true);
        assert_eq!(tick.delta, 0.0);
        assert_eq!(tick.anomaly, Some(ClockAnomaly::NonFinite));
        assert_eq!(clock.last_timestamp_ms(), Some(100.0));
    }

    #[test]
    fn paused_ticks_do_not_advance_elapsed() {
        let mut clock = Clock::default();
        clock.tick(0.0, true);
        clock.tick(16.0, true);
        let before = clock.elapsed_seconds();
        for i in 2..10 {
            let tick = clock.tick(f64::from(i) * 16.0, false);
            assert!(tick.delta > 0.0);
        }
        assert_eq!(clock.elapsed_seconds(), before);
        assert_eq!(clock.ticks(), 10);
    }

    #[test]
    fn reset_keeps_timestamp_baseline() {
        let mut clock = Clock::default();
        clock.tick(0.0, true);
        clock.tick(50.0, true);
        clock.reset();
        assert_eq!(clock.elapsed_seconds(), 0.0);
        assert_eq!(clock.ticks(), 0);
        let tick = clock.tick(66.0, true);
        assert!((tick.delta - 0.016).abs() < 1e-6);
    }

    #[test]
    fn fps_is_sampled_on_the_configured_frame() {
        let mut clock = Clock::new(1.0 / 15.0, 4);
        for i in 0..3 {
            clock.tick(f64::from(i) * 20.0, true);
        }
        assert_eq!(clock.fps(), None);
        clock.tick(60.0, true);
        assert_eq!(clock.fps(), Some(50));
    }

    #[test]
    fn long_sessions_keep_elapsed_precision() {
        let mut clock = Clock::default();
        let frames = 1_000_000u32;
        for i in 0..frames {
            clock.tick(f64::from(i) * 16.0, true);
        }
        let expected = f64::from(frames - 1) * f64::from(0.016_f32);
        assert!((clock.elapsed_seconds_f64() - expected).abs() < 1e-3);
        assert!((f64::from(clock.elapsed_seconds()) - expected).abs() < 2e-3);
    }
}
