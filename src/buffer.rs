//! Per-source sample buffer shared by a runner's sample and flush tasks.

use std::sync::Mutex;

use crate::trajectory::Coordinate;

/// Ordered buffer of positions collected between flushes. Push order is the
/// only notion of time the samples carry, so a drain must observe every
/// sample pushed before it, in order.
#[derive(Debug, Default)]
pub struct SampleBuffer {
    samples: Mutex<Vec<Coordinate>>,
}

impl SampleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, sample: Coordinate) {
        self.samples.lock().expect("sample buffer lock").push(sample);
    }

    /// Takes the current contents and empties the buffer in one step. An
    /// empty result means "nothing to send" and the caller skips the publish.
    pub fn drain_all(&self) -> Vec<Coordinate> {
        std::mem::take(&mut *self.samples.lock().expect("sample buffer lock"))
    }

    pub fn len(&self) -> usize {
        self.samples.lock().expect("sample buffer lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.samples.lock().expect("sample buffer lock").clear();
    }
}
