//! Error types for the fallible seams around the simulation
//!
//! The simulation itself never fails. Errors only surface from storage,
//! configuration loading and audio playback, and callers are expected to
//! log and continue rather than abort the session.

use thiserror::Error;

/// Failure reading or writing the persistent store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backend not reachable (no window, storage disabled, quota)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Filesystem error from the native backend
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored value could not be decoded
    #[error("Corrupt stored value: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Invalid static configuration
#[derive(Error, Debug)]
pub enum TuningError {
    #[error("Failed to parse tuning data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Level {index} threshold {threshold} does not exceed previous threshold {previous}")]
    ThresholdOrder {
        index: usize,
        threshold: u64,
        previous: u64,
    },
}

/// Failure inside an audio backend
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to load sound '{cue}': {reason}")]
    Load { cue: &'static str, reason: String },

    #[error("Failed to play sound '{cue}': {reason}")]
    Playback { cue: &'static str, reason: String },

    #[error("Audio not initialized")]
    NotInitialized,
}
