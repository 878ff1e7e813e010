//! One simulated source: sample on a short period, flush on a longer one.
//!
//! The sample task walks the trajectory and feeds the buffer; the flush task
//! drains the buffer into a batch and hands it to the session. Batches that
//! cannot be published are dropped, never requeued (at-most-once,
//! best-effort delivery).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info, warn};

use crate::buffer::SampleBuffer;
use crate::codec::LocationBatch;
use crate::session::{ConnectionState, PublishSink};
use crate::trajectory::{Coordinate, RandomWalk};

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub sample_period: Duration,
    pub flush_period: Duration,
    pub destination: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            sample_period: Duration::from_millis(200),
            flush_period: Duration::from_millis(5000),
            destination: "/app/ubicacion".into(),
        }
    }
}

/// Walk state touched only by the sample task; kept across stop/start so a
/// restarted source continues from where it was.
struct WalkState {
    walk: RandomWalk,
    position: Coordinate,
}

pub struct SourceRunner {
    id: i64,
    cfg: RunnerConfig,
    sink: Arc<dyn PublishSink>,
    buffer: Arc<SampleBuffer>,
    walk: Arc<Mutex<WalkState>>,
    running: AtomicBool,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    last_payload: Arc<Mutex<Option<String>>>,
}

impl SourceRunner {
    pub fn new(
        id: i64,
        start: Coordinate,
        walk: RandomWalk,
        sink: Arc<dyn PublishSink>,
        cfg: RunnerConfig,
    ) -> Self {
        Self {
            id,
            cfg,
            sink,
            buffer: Arc::new(SampleBuffer::new()),
            walk: Arc::new(Mutex::new(WalkState {
                walk,
                position: start,
            })),
            running: AtomicBool::new(false),
            tasks: Mutex::new(Vec::new()),
            last_payload: Arc::new(Mutex::new(None)),
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Current position of the simulated source.
    pub fn position(&self) -> Coordinate {
        self.walk.lock().expect("walk state lock").position
    }

    /// Serialized form of the most recently published batch, for
    /// inspection.
    pub fn last_payload(&self) -> Option<String> {
        self.last_payload.lock().expect("last payload lock").clone()
    }

    /// Arms both periodic tasks. No-op when already running or when the
    /// session is not connected.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            debug!(source_id = self.id, "runner already active");
            return;
        }
        if self.sink.state() != ConnectionState::Connected {
            warn!(source_id = self.id, "not starting: uplink not connected");
            self.running.store(false, Ordering::SeqCst);
            return;
        }

        let sample_task = {
            let walk = Arc::clone(&self.walk);
            let buffer = Arc::clone(&self.buffer);
            let period = self.cfg.sample_period;
            tokio::spawn(async move {
                let mut ticker = time::interval(period);
                ticker.tick().await; // the zeroth tick fires immediately
                loop {
                    ticker.tick().await;
                    let next = {
                        let mut state = walk.lock().expect("walk state lock");
                        let pos = state.position;
                        let next = state.walk.next(pos);
                        state.position = next;
                        next
                    };
                    buffer.push(next);
                }
            })
        };

        let flush_task = {
            let buffer = Arc::clone(&self.buffer);
            let sink = Arc::clone(&self.sink);
            let last_payload = Arc::clone(&self.last_payload);
            let destination = self.cfg.destination.clone();
            let period = self.cfg.flush_period;
            let id = self.id;
            tokio::spawn(async move {
                let mut ticker = time::interval(period);
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    let samples = buffer.drain_all();
                    if samples.is_empty() {
                        continue;
                    }
                    let count = samples.len();
                    let batch = LocationBatch::new(id, samples);
                    let payload = match batch.encode() {
                        Ok(payload) => payload,
                        Err(e) => {
                            warn!(source_id = id, error = %e, "batch encode failed");
                            continue;
                        }
                    };
                    match sink.publish(&destination, payload.clone()).await {
                        Ok(()) => {
                            debug!(source_id = id, samples = count, "batch published");
                            let rendered = String::from_utf8_lossy(&payload).into_owned();
                            *last_payload.lock().expect("last payload lock") = Some(rendered);
                        }
                        Err(e) => {
                            warn!(source_id = id, error = %e, samples = count, "batch dropped");
                        }
                    }
                }
            })
        };

        self.tasks
            .lock()
            .expect("runner tasks lock")
            .extend([sample_task, flush_task]);
        info!(source_id = self.id, "runner started");
    }

    /// Cancels both task handles before any other teardown, so no tick can
    /// fire afterwards, then discards unflushed samples. Safe to call
    /// repeatedly or when never started.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        for task in self.tasks.lock().expect("runner tasks lock").drain(..) {
            task.abort();
        }
        self.buffer.clear();
        info!(source_id = self.id, "runner stopped");
    }
}

impl Drop for SourceRunner {
    fn drop(&mut self) {
        self.stop();
    }
}
