// src/config.rs
// Deployment configuration from the environment (plus .env in dev).

use std::str::FromStr;
use std::time::Duration;

use crate::runner::RunnerConfig;
use crate::trajectory::{Coordinate, JitterPreset, WalkPolicy, STEP_COARSE};

/// Whether the binary drives one source (publishing under the logged-in
/// user's id) or a whole simulated fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimMode {
    Single,
    Fleet,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// WebSocket origin of the ingestion backend.
    pub ws_url: String,
    /// REST login endpoint.
    pub login_url: String,
    /// Destination identifier every location batch is published to.
    pub destination: String,
    pub mode: SimMode,
    pub fleet_size: usize,
    pub base: Coordinate,
    pub spread: f64,
    pub sample_period: Duration,
    pub flush_period: Duration,
    pub step: f64,
    pub preset: JitterPreset,
    /// Fixed walk seed for reproducible runs; unset means OS entropy.
    pub seed: Option<u64>,
    pub state_path: String,
}

impl Config {
    pub fn from_env() -> Self {
        let preset = match std::env::var("WALK_JITTER_PRESET")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str()
        {
            "stationary" => JitterPreset::Stationary,
            _ => JitterPreset::LateralDrift,
        };
        let mode = match std::env::var("SIMULATION_MODE")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str()
        {
            "single" => SimMode::Single,
            _ => SimMode::Fleet,
        };

        Self {
            ws_url: env_or(
                "UPLINK_WS_URL",
                "wss://api-transporte-98xe.onrender.com/ws",
            ),
            login_url: env_or(
                "LOGIN_URL",
                "https://api-transporte-98xe.onrender.com/api/auth/login",
            ),
            destination: env_or("LOCATION_DESTINATION", "/app/ubicacion"),
            mode,
            fleet_size: env_parse("FLEET_SIZE", 10),
            base: Coordinate::new(env_parse("BASE_LAT", -12.05), env_parse("BASE_LNG", -77.04)),
            spread: env_parse("FLEET_SPREAD_DEG", 0.002),
            sample_period: Duration::from_millis(env_parse("SAMPLE_PERIOD_MS", 200)),
            flush_period: Duration::from_millis(env_parse("FLUSH_PERIOD_MS", 5000)),
            step: env_parse("WALK_STEP_DEG", STEP_COARSE),
            preset,
            seed: std::env::var("WALK_SEED").ok().and_then(|v| v.parse().ok()),
            state_path: env_or("SESSION_STATE_PATH", "state/session.json"),
        }
    }

    pub fn walk_policy(&self) -> WalkPolicy {
        WalkPolicy {
            step: self.step,
            preset: self.preset,
        }
    }

    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            sample_period: self.sample_period,
            flush_period: self.flush_period,
            destination: self.destination.clone(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr + Copy>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
