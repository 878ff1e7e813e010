// Shared test doubles for the integration suite.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fleet_uplink::{ConnectionState, PublishSink, UplinkError, UplinkResult};

#[derive(Debug, Clone)]
pub struct PublishedFrame {
    pub destination: String,
    pub payload: Vec<u8>,
}

/// Publish sink that records every accepted frame and rejects publishes
/// whenever it is not in the `Connected` state, like the real session.
pub struct RecordingSink {
    state: Mutex<ConnectionState>,
    published: Mutex<Vec<PublishedFrame>>,
}

impl RecordingSink {
    pub fn connected() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ConnectionState::Connected),
            published: Mutex::new(Vec::new()),
        })
    }

    pub fn disconnected() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ConnectionState::Disconnected),
            published: Mutex::new(Vec::new()),
        })
    }

    pub fn set_state(&self, state: ConnectionState) {
        *self.state.lock().unwrap() = state;
    }

    pub fn published(&self) -> Vec<PublishedFrame> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl PublishSink for RecordingSink {
    fn state(&self) -> ConnectionState {
        *self.state.lock().unwrap()
    }

    async fn publish(&self, destination: &str, payload: Vec<u8>) -> UplinkResult<()> {
        if self.state() != ConnectionState::Connected {
            return Err(UplinkError::NotConnected);
        }
        self.published.lock().unwrap().push(PublishedFrame {
            destination: destination.to_string(),
            payload,
        });
        Ok(())
    }
}
