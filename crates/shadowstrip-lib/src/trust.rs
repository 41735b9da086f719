//! TLS trust material: CA root, client certificate, private key.
//!
//! Files are read as PEM and checked only for armor; real X.509 validation
//! belongs to the TLS stack. A missing or garbled file is reported but never
//! fatal: the supervisor indicates the condition and still attempts to
//! connect, and the attempt then fails at the transport layer.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

const PEM_ARMOR: &str = "-----BEGIN";

/// Errors raised while loading trust material.
#[derive(Debug)]
pub enum TrustError {
    /// A required file could not be read.
    Missing(String),
    /// A file was read but is not usable as PEM material.
    Invalid(String),
}

impl fmt::Display for TrustError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrustError::Missing(msg) => write!(f, "trust material missing: {msg}"),
            TrustError::Invalid(msg) => write!(f, "trust material invalid: {msg}"),
        }
    }
}

impl std::error::Error for TrustError {}

/// Locations of the three PEM files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustPaths {
    pub ca: PathBuf,
    pub certificate: PathBuf,
    pub private_key: PathBuf,
}

/// Loaded PEM bytes handed to the transport at connect time.
#[derive(Debug, Clone)]
pub struct TrustMaterial {
    pub ca: Vec<u8>,
    pub certificate: Vec<u8>,
    pub private_key: Vec<u8>,
}

impl TrustMaterial {
    /// Load and armor-check all three files.
    pub fn load(paths: &TrustPaths) -> Result<TrustMaterial, TrustError> {
        Ok(TrustMaterial {
            ca: read_pem("CA certificate", &paths.ca)?,
            certificate: read_pem("client certificate", &paths.certificate)?,
            private_key: read_pem("private key", &paths.private_key)?,
        })
    }
}

fn read_pem(role: &str, path: &Path) -> Result<Vec<u8>, TrustError> {
    let bytes = fs::read(path)
        .map_err(|e| TrustError::Missing(format!("{role}: {}: {e}", path.display())))?;
    let looks_like_pem = std::str::from_utf8(&bytes)
        .map(|s| s.contains(PEM_ARMOR))
        .unwrap_or(false);
    if !looks_like_pem {
        return Err(TrustError::Invalid(format!(
            "{role}: {}: no PEM armor found (DER files must be converted to PEM)",
            path.display()
        )));
    }
    Ok(bytes)
}
