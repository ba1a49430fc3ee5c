//! Fatal error taxonomy for the simulator (spec §7).
//!
//! Every condition here is unrecoverable: a simulation that hits one of
//! these cannot produce meaningful output, so there is no retry path.

/// The three fatal categories a running simulation can hit.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invariant violation: {0}")]
    Invariant(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl SimError {
    pub fn config(msg: impl Into<String>) -> Self {
        SimError::Config(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        SimError::Invariant(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        SimError::Transport(msg.into())
    }
}
