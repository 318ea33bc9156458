//! Error type shared by the solver and the reservoir buffer.
//!
//! Every variant is fatal: callers surface it and stop. Nothing in this
//! crate retries on error.

use std::path::PathBuf;

use thiserror::Error;

use crate::cfr::config::ConfigError;

/// Errors produced by the CFR engines, the policy table and the reservoir buffer.
#[derive(Error, Debug)]
pub enum SolverError {
    /// An infoset key resolved to a policy sized for a different number of actions.
    ///
    /// This means two distinct decision points share a key in the game model.
    #[error("strategy for infoset {key} has n_actions={stored} but node has n_children={requested}")]
    ActionCountMismatch {
        /// Lossy UTF-8 rendering of the infoset key.
        key: String,
        /// Action count recorded when the policy was created.
        stored: usize,
        /// Child count of the node that requested the policy.
        requested: usize,
    },

    /// Binary encoding or decoding failed.
    #[error("encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    /// A reservoir sample could not be encoded.
    #[error("sample encoding error: {0}")]
    SampleEncode(#[from] rmp_serde::encode::Error),

    /// A stored reservoir sample does not match the sample type it was read as.
    #[error("sample decoding error: {0}")]
    SampleDecode(#[from] rmp_serde::decode::Error),

    /// Filesystem I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing store reported an error.
    #[error("store error: {0}")]
    Store(#[from] sled::Error),

    /// Persisted state carries an unexpected magic tag or version.
    #[error("incompatible persisted format: expected {expected}, found {found}")]
    Format {
        /// Header this build understands.
        expected: String,
        /// Header read from the input.
        found: String,
    },

    /// Reservoir metadata points at a store that does not exist.
    #[error("backing store does not exist: {}", .0.display())]
    MissingStore(PathBuf),

    /// A store key could not be decoded as a slot index.
    #[error("corrupt slot key: {0:?}")]
    CorruptSlotKey(Vec<u8>),

    /// The solver configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, SolverError>;
