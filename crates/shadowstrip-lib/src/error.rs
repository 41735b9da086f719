//! Error types for shadowstrip-lib.
//!
//! Only setup-time concerns surface as errors here. Runtime conditions the
//! daemon absorbs by policy (a refused connect, a malformed shadow document,
//! a garbled colour value) are not errors at all: they degrade, retry or
//! fall to black without ever reaching this module.

use std::fmt;

use crate::config::ConfigError;
use crate::led::StripError;
use crate::trust::TrustError;

/// Unified error type for all shadowstrip operations.
#[derive(Debug)]
pub enum ShadowstripError {
    /// Configuration document missing or malformed.
    Config(ConfigError),
    /// Trust material missing or unusable.
    Trust(TrustError),
    /// Strip backend failure.
    Strip(StripError),
    /// I/O error (file operations).
    Io(std::io::Error),
}

impl fmt::Display for ShadowstripError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShadowstripError::Config(e) => write!(f, "config error: {e}"),
            ShadowstripError::Trust(e) => write!(f, "trust error: {e}"),
            ShadowstripError::Strip(e) => write!(f, "strip error: {e}"),
            ShadowstripError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for ShadowstripError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShadowstripError::Config(e) => Some(e),
            ShadowstripError::Trust(e) => Some(e),
            ShadowstripError::Strip(e) => Some(e),
            ShadowstripError::Io(e) => Some(e),
        }
    }
}

impl From<ConfigError> for ShadowstripError {
    fn from(e: ConfigError) -> Self {
        ShadowstripError::Config(e)
    }
}

impl From<TrustError> for ShadowstripError {
    fn from(e: TrustError) -> Self {
        ShadowstripError::Trust(e)
    }
}

impl From<StripError> for ShadowstripError {
    fn from(e: StripError) -> Self {
        ShadowstripError::Strip(e)
    }
}

impl From<std::io::Error> for ShadowstripError {
    fn from(e: std::io::Error) -> Self {
        ShadowstripError::Io(e)
    }
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, ShadowstripError>;
