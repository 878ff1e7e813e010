// src/lib.rs
// Public library surface for integration tests (and the uplink binary).

pub mod auth;
pub mod buffer;
pub mod codec;
pub mod config;
pub mod error;
pub mod fleet;
pub mod runner;
pub mod session;
pub mod stomp;
pub mod store;
pub mod trajectory;

// ---- Re-exports for stable public API ----
pub use crate::codec::{LocationBatch, SingleLocation};
pub use crate::config::{Config, SimMode};
pub use crate::error::{UplinkError, UplinkResult};
pub use crate::fleet::{Fleet, FleetConfig};
pub use crate::runner::{RunnerConfig, SourceRunner};
pub use crate::session::{ConnectionState, Credentials, PublishSink, UplinkSession};
pub use crate::trajectory::{Coordinate, JitterPreset, RandomWalk, WalkPolicy};
