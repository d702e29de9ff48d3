use bevy_ecs::prelude::Resource;
use std::collections::BTreeMap;
use std::time::Instant;

#[derive(Clone, Copy, Debug)]
pub struct SystemTimingSummary {
    pub name: &'static str,
    pub average_ms: f32,
    pub max_ms: f32,
    pub samples: u64,
}

#[derive(Default)]
struct SystemTiming {
    total_ms: f64,
    max_ms: f32,
    samples: u64,
}

impl SystemTiming {
    fn push(&mut self, ms: f32) {
        self.total_ms += f64::from(ms);
        self.max_ms = self.max_ms.max(ms);
        self.samples += 1;
    }

    fn average_ms(&self) -> f32 {
        if self.samples == 0 {
            0.0
        } else {
            (self.total_ms / self.samples as f64) as f32
        }
    }
}

/// Per-system wall-clock cost for the particle and animation passes.
#[derive(Resource, Default)]
pub struct SystemProfiler {
    timings: BTreeMap<&'static str, SystemTiming>,
}

impl SystemProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Times the caller until the returned span drops.
    pub fn span(&mut self, name: &'static str) -> ProfileSpan<'_> {
        ProfileSpan { name, started: Instant::now(), profiler: self }
    }

    /// Most expensive average first; equal averages keep name order.
    pub fn summaries(&self) -> Vec<SystemTimingSummary> {
        let mut out: Vec<_> = self
            .timings
            .iter()
            .map(|(&name, timing)| SystemTimingSummary {
                name,
                average_ms: timing.average_ms(),
                max_ms: timing.max_ms,
                samples: timing.samples,
            })
            .collect();
        out.sort_by(|a, b| b.average_ms.total_cmp(&a.average_ms));
        out
    }
}

pub struct ProfileSpan<'a> {
    name: &'static str,
    started: Instant,
    profiler: &'a mut SystemProfiler,
}

impl Drop for ProfileSpan<'_> {
    fn drop(&mut self) {
        let ms = self.started.elapsed().as_secs_f32() * 1000.0;
        self.profiler.timings.entry(self.name).or_default().push(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_accumulate_per_system() {
        let mut profiler = SystemProfiler::new();
        for _ in 0..3 {
            let _span = profiler.span("sys_cull_particles");
        }
        drop(profiler.span("sys_orbit_lights"));
        let summaries = profiler.summaries();
        assert_eq!(summaries.len(), 2);
        let cull = summaries.iter().find(|s| s.name == "sys_cull_particles").expect("cull timing");
        assert_eq!(cull.samples, 3);
        assert!(cull.max_ms >= cull.average_ms);
    }

    #[test]
    fn empty_timing_averages_zero() {
        assert_eq!(SystemTiming::default().average_ms(), 0.0);
    }
}
