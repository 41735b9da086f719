//! shadowstrip: device-shadow synchronization for addressable LED strips.

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod led;
pub mod mqtt;
pub mod runtime;
pub mod shadow;
pub mod supervisor;
pub mod transport;
pub mod trust;

pub use error::ShadowstripError;
