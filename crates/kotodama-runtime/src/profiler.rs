//! One-shot device speed probe
//!
//! Classifies the host into a discrete tier by timing a fixed CPU-bound
//! workload once at startup. The tier picks the particle-population cap
//! and the pixel-density ceiling; it never changes for the session.

use kotodama_core::WordRng;
use std::time::{Duration, Instant};

const WORKLOAD_DRAWS: u32 = 1_000_000;
const HIGH_CUTOFF: Duration = Duration::from_millis(50);
const MEDIUM_CUTOFF: Duration = Duration::from_millis(100);

/// Discrete device performance classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceTier {
    High,
    Medium,
    Low,
}

/// What a tier means for the renderer and the field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierProfile {
    /// Active-particle population cap
    pub max_particles: usize,
    /// Ceiling applied to the device pixel density; None means native
    pub density_cap: Option<f32>,
}

impl PerformanceTier {
    pub fn profile(self) -> TierProfile {
        match self {
            PerformanceTier::High => TierProfile {
                max_particles: 200,
                density_cap: None,
            },
            PerformanceTier::Medium => TierProfile {
                max_particles: 100,
                density_cap: Some(1.5),
            },
            PerformanceTier::Low => TierProfile {
                max_particles: 50,
                density_cap: Some(1.0),
            },
        }
    }

    /// Effective render pixel density for a device reporting `native`
    pub fn pixel_density(self, native: f32) -> f32 {
        match self.profile().density_cap {
            Some(cap) => native.min(cap),
            None => native,
        }
    }
}

pub struct PerformanceProfiler;

impl PerformanceProfiler {
    /// Run the workload once and classify. Blocks exactly as long as the
    /// workload takes; no retries.
    pub fn probe() -> PerformanceTier {
        let mut rng = WordRng::new(0x9E37_79B9);
        let started = Instant::now();
        let mut sink = 0u32;
        for _ in 0..WORKLOAD_DRAWS {
            sink = sink.wrapping_add(rng.next_u32());
        }
        let elapsed = started.elapsed();
        // Keep the accumulator observable so the loop can't be optimized out
        std::hint::black_box(sink);
        let tier = Self::classify(elapsed);
        println!(
            "[profiler] workload {:?} -> {:?} ({} particles)",
            elapsed,
            tier,
            tier.profile().max_particles
        );
        tier
    }

    /// Pure threshold mapping, separated from measurement for tests
    pub fn classify(elapsed: Duration) -> PerformanceTier {
        if elapsed < HIGH_CUTOFF {
            PerformanceTier::High
        } else if elapsed < MEDIUM_CUTOFF {
            PerformanceTier::Medium
        } else {
            PerformanceTier::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirty_ms_is_high_tier() {
        let tier = PerformanceProfiler::classify(Duration::from_millis(30));
        assert_eq!(tier, PerformanceTier::High);
        let profile = tier.profile();
        assert_eq!(profile.max_particles, 200);
        // Native density passes through untouched
        assert_eq!(tier.pixel_density(2.0), 2.0);
    }

    #[test]
    fn hundred_twenty_ms_is_low_tier() {
        let tier = PerformanceProfiler::classify(Duration::from_millis(120));
        assert_eq!(tier, PerformanceTier::Low);
        let profile = tier.profile();
        assert_eq!(profile.max_particles, 50);
        assert_eq!(tier.pixel_density(2.0), 1.0);
    }

    #[test]
    fn boundaries_fall_to_the_slower_tier() {
        assert_eq!(
            PerformanceProfiler::classify(Duration::from_millis(50)),
            PerformanceTier::Medium
        );
        assert_eq!(
            PerformanceProfiler::classify(Duration::from_millis(100)),
            PerformanceTier::Low
        );
    }

    #[test]
    fn medium_tier_caps_density() {
        let tier = PerformanceTier::Medium;
        assert_eq!(tier.pixel_density(2.0), 1.5);
        assert_eq!(tier.pixel_density(1.0), 1.0);
    }

    #[test]
    fn probe_returns_some_tier() {
        // Smoke test: whatever this machine is, probe must terminate and
        // produce a classification.
        let _ = PerformanceProfiler::probe();
    }
}
