//! Drives a configurable set of simulated sources against one shared
//! session.

use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::runner::{RunnerConfig, SourceRunner};
use crate::session::PublishSink;
use crate::trajectory::{Coordinate, RandomWalk, WalkPolicy};

#[derive(Debug, Clone)]
pub struct FleetConfig {
    pub size: usize,
    /// Starting position of the fleet; source `i` begins offset from here.
    pub base: Coordinate,
    /// Per-id offset in degrees so trajectories diverge from the start.
    pub spread: f64,
    pub policy: WalkPolicy,
    pub runner: RunnerConfig,
    /// Fixed base seed for reproducible fleets; each source derives its own.
    pub seed: Option<u64>,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            size: 10,
            base: Coordinate::new(-12.05, -77.04),
            spread: 0.002,
            policy: WalkPolicy::default(),
            runner: RunnerConfig::default(),
            seed: None,
        }
    }
}

pub struct Fleet {
    cfg: FleetConfig,
    sink: Arc<dyn PublishSink>,
    runners: Mutex<Vec<Arc<SourceRunner>>>,
}

impl Fleet {
    pub fn new(sink: Arc<dyn PublishSink>, cfg: FleetConfig) -> Self {
        Self {
            cfg,
            sink,
            runners: Mutex::new(Vec::new()),
        }
    }

    pub fn is_running(&self) -> bool {
        !self.runners.lock().expect("fleet runners lock").is_empty()
    }

    /// Runners currently owned by the fleet, for inspection.
    pub fn runners(&self) -> Vec<Arc<SourceRunner>> {
        self.runners.lock().expect("fleet runners lock").clone()
    }

    /// Constructs and starts sources with ids `1..=size`, all sharing the
    /// session. No-op while a fleet is already running; callers don't need
    /// their own mutual exclusion.
    pub fn start(&self) {
        let mut runners = self.runners.lock().expect("fleet runners lock");
        if !runners.is_empty() {
            debug!("fleet already running");
            return;
        }

        for id in 1..=self.cfg.size as i64 {
            let offset = id as f64 * self.cfg.spread;
            let start = Coordinate::new(
                self.cfg.base.latitude + offset,
                self.cfg.base.longitude + offset,
            );
            let walk = match self.cfg.seed {
                Some(seed) => RandomWalk::seeded(self.cfg.policy, seed.wrapping_add(id as u64)),
                None => RandomWalk::new(self.cfg.policy),
            };
            let runner = Arc::new(SourceRunner::new(
                id,
                start,
                walk,
                Arc::clone(&self.sink),
                self.cfg.runner.clone(),
            ));
            runner.start();
            runners.push(runner);
        }
        info!(size = self.cfg.size, "fleet started");
    }

    /// Stops and discards every source; no timer is live after this
    /// returns. Idempotent.
    pub fn stop(&self) {
        let mut runners = self.runners.lock().expect("fleet runners lock");
        if runners.is_empty() {
            return;
        }
        for runner in runners.drain(..) {
            runner.stop();
        }
        info!("fleet stopped");
    }
}

impl Drop for Fleet {
    fn drop(&mut self) {
        self.stop();
    }
}
