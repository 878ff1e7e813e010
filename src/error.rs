//! Error taxonomy for the uplink engine.
//!
//! Connection-layer failures stay inside the session and are observable via
//! its state; runners degrade to dropped batches. Only missing credentials
//! block startup.

use thiserror::Error;

pub type UplinkResult<T> = Result<T, UplinkError>;

#[derive(Error, Debug)]
pub enum UplinkError {
    /// Token or user id absent at initialization. Fatal to starting the
    /// engine; there is nothing to retry.
    #[error("missing credentials: {0}")]
    MissingCredentials(&'static str),

    /// The backend rejected connection establishment.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// Mid-session connection drop or write failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Publish attempted while the session is not connected. The batch is
    /// dropped by the caller, never requeued.
    #[error("publish rejected: session not connected")]
    NotConnected,
}
