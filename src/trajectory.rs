//! Synthetic movement: a biased random walk over geographic coordinates.
//!
//! Each source advances mostly "forward" (increasing latitude) with
//! occasional lateral jitter and rare reversals, which looks convincing
//! enough on a map for backend load tests. The RNG is injectable via a seed
//! so walks replay deterministically.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Coarse step, roughly 20 m per sample at the equator.
pub const STEP_COARSE: f64 = 0.0002;
/// Fine step, roughly 2 m per sample.
pub const STEP_FINE: f64 = 0.00002;

/// A latitude/longitude pair, always rounded to 6 decimal places.
/// Wire field names match the ingestion backend's schema.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(rename = "latitud")]
    pub latitude: f64,
    #[serde(rename = "longitud")]
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: round6(latitude),
            longitude: round6(longitude),
        }
    }
}

fn round6(v: f64) -> f64 {
    (v * 1_000_000.0).round() / 1_000_000.0
}

/// What the walk does on a no-forward-progress draw (`r >= 80`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JitterPreset {
    /// Drift sideways without longitudinal change (the default).
    LateralDrift,
    /// Hold position entirely.
    Stationary,
}

#[derive(Debug, Clone, Copy)]
pub struct WalkPolicy {
    /// Per-deployment step size in degrees.
    pub step: f64,
    pub preset: JitterPreset,
}

impl Default for WalkPolicy {
    fn default() -> Self {
        Self {
            step: STEP_COARSE,
            preset: JitterPreset::LateralDrift,
        }
    }
}

/// Stochastic next-position policy. Branch weights: 60% forward, 15%
/// forward + lateral jitter, 5% backward + lateral jitter, 20% jitter-only
/// (or stationary, per the active preset).
pub struct RandomWalk {
    policy: WalkPolicy,
    rng: StdRng,
}

impl RandomWalk {
    pub fn new(policy: WalkPolicy) -> Self {
        Self {
            policy,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Fixed-seed constructor for reproducible walks.
    pub fn seeded(policy: WalkPolicy, seed: u64) -> Self {
        Self {
            policy,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn preset(&self) -> JitterPreset {
        self.policy.preset
    }

    pub fn step(&self) -> f64 {
        self.policy.step
    }

    /// Next position from `previous`. Never fails; the result is rounded to
    /// 6 decimal places and is what the caller should feed back in.
    pub fn next(&mut self, previous: Coordinate) -> Coordinate {
        let step = self.policy.step;
        let r: f64 = self.rng.random_range(0.0..100.0);

        let mut lat_offset = 0.0;
        let mut lng_offset = 0.0;
        if r < 60.0 {
            lat_offset = step;
        } else if r < 75.0 {
            lat_offset = step;
            lng_offset = self.lateral(step);
        } else if r < 80.0 {
            lat_offset = -step;
            lng_offset = self.lateral(step);
        } else if self.policy.preset == JitterPreset::LateralDrift {
            lng_offset = self.lateral(step);
        }

        Coordinate::new(previous.latitude + lat_offset, previous.longitude + lng_offset)
    }

    fn lateral(&mut self, step: f64) -> f64 {
        if self.rng.random_bool(0.5) {
            step
        } else {
            -step
        }
    }
}
