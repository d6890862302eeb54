//! Crate error types
//!
//! Error types for broadcast operations. Probe failures are deliberately
//! absent here as a variant consumed by callers: the pipeline recovers from
//! them locally with the configured fallback bitrate.

use std::io;

/// Convenience result alias for broadcast operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for broadcast operations
#[derive(Debug)]
pub enum Error {
    /// No file in the effects directory matched the requested clip name
    EffectNotFound(String),
    /// The bitrate probe produced no parsable output
    ProbeFailed(String),
    /// The mixer process could not be spawned or wired up
    MixerUnavailable(String),
    /// The operation requires an active pipeline but none is running
    PipelineStopped,
    /// Underlying I/O failure (missing source file, broken pipe, ...)
    Io(io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::EffectNotFound(name) => write!(f, "Effect not found: {}", name),
            Error::ProbeFailed(detail) => write!(f, "Bitrate probe failed: {}", detail),
            Error::MixerUnavailable(detail) => write!(f, "Mixer unavailable: {}", detail),
            Error::PipelineStopped => write!(f, "No active pipeline"),
            Error::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}
