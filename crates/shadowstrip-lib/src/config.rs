//! Daemon configuration: TOML-based, platform-aware paths.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::trust::TrustPaths;

/// Header comment prepended to saved config files.
const CONFIG_HEADER: &str =
    "# shadowstrip configuration. Point `endpoint` and the trust material paths\n\
     # at your AWS IoT thing, then restart the daemon.\n\n";

/// Client identities longer than this are not guaranteed to be accepted
/// by MQTT 3.1.1 brokers.
const MAX_CLIENT_ID_LEN: usize = 23;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// AWS IoT ATS endpoint hostname. Empty = unconfigured.
    #[serde(default)]
    pub endpoint: String,

    /// MQTT-over-TLS port. Default: 8883.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Thing name whose shadow this strip mirrors.
    #[serde(default = "default_thing_name")]
    pub thing_name: String,

    /// MQTT client identity. Empty = derived from `thing_name`.
    #[serde(default)]
    pub client_id: String,

    /// Number of physical pixels on the strip. Default: 10.
    #[serde(default = "default_led_count")]
    pub led_count: usize,

    /// Fixed delay between failed connection attempts, in seconds. Default: 5.
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,

    /// MQTT keep-alive interval, in seconds. Default: 60.
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,

    /// CA root certificate (PEM). Empty = `<certs dir>/AmazonRootCA1.pem`.
    #[serde(default)]
    pub ca_path: String,

    /// Client certificate (PEM). Empty = `<certs dir>/certificate.pem.crt`.
    #[serde(default)]
    pub cert_path: String,

    /// Client private key (PEM). Empty = `<certs dir>/private.pem.key`.
    #[serde(default)]
    pub key_path: String,
}

fn default_port() -> u16 {
    8883
}
fn default_thing_name() -> String {
    "led-lightstrip-1".into()
}
fn default_led_count() -> usize {
    10
}
fn default_backoff_secs() -> u64 {
    5
}
fn default_keep_alive_secs() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Config {
            endpoint: String::new(),
            port: default_port(),
            thing_name: default_thing_name(),
            client_id: String::new(),
            led_count: default_led_count(),
            backoff_secs: default_backoff_secs(),
            keep_alive_secs: default_keep_alive_secs(),
            ca_path: String::new(),
            cert_path: String::new(),
            key_path: String::new(),
        }
    }
}

/// Errors raised by the strict (daemon) loader.
#[derive(Debug)]
pub enum ConfigError {
    /// No config document could be read at the expected location.
    Unavailable(String),
    /// The document was read but is not valid TOML for this schema.
    Malformed(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Unavailable(msg) => write!(f, "config unavailable: {msg}"),
            ConfigError::Malformed(msg) => write!(f, "config malformed: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Validation problems that [`Config::validate`] can return.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// `endpoint` is empty; the daemon has nowhere to connect.
    EmptyEndpoint,
    /// `led_count` is zero; every frame would be empty.
    ZeroLedCount,
    /// `backoff_secs` is zero; failed reconnects would spin.
    ZeroBackoff,
    /// A trust material file is not present on disk.
    TrustFileMissing { role: &'static str, path: PathBuf },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyEndpoint => write!(f, "endpoint is not configured"),
            ValidationError::ZeroLedCount => write!(f, "led_count must be at least 1"),
            ValidationError::ZeroBackoff => write!(f, "backoff_secs must be at least 1"),
            ValidationError::TrustFileMissing { role, path } => {
                write!(f, "{role} not found: {}", path.display())
            }
        }
    }
}

impl Config {
    /// Platform-specific config directory.
    pub fn dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("shadowstrip"))
    }

    /// Full path to the config file.
    pub fn path() -> Option<PathBuf> {
        Self::dir().map(|d| d.join("config.toml"))
    }

    /// Directory holding the default trust material files.
    pub fn certs_dir() -> Option<PathBuf> {
        Self::dir().map(|d| d.join("certs"))
    }

    /// Load config from disk, or return defaults if not found.
    pub fn load() -> Self {
        let (config, warnings) = Self::load_with_warnings();
        for w in &warnings {
            log::warn!("{w}");
        }
        config
    }

    /// Load config from the default path, returning the config and any
    /// parse warnings.
    pub fn load_with_warnings() -> (Self, Vec<String>) {
        let Some(path) = Self::path() else {
            return (Self::default(), vec![]);
        };
        Self::load_from(&path)
    }

    /// Load config from an arbitrary path, returning the config and any
    /// parse warnings.
    ///
    /// Returns `(defaults, [])` if the file doesn't exist.
    /// Returns `(defaults, [warning])` if the file exists but can't be parsed.
    pub fn load_from(path: &Path) -> (Self, Vec<String>) {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => (config, vec![]),
                Err(e) => {
                    let warning = format!(
                        "config parse error ({}), using defaults: {e}",
                        path.display()
                    );
                    (Self::default(), vec![warning])
                }
            },
            Err(_) => (Self::default(), vec![]),
        }
    }

    /// Strict loader for the daemon: the document must exist and parse.
    ///
    /// A failure here is the degraded-boot condition; the caller decides
    /// whether to proceed on defaults.
    pub fn load_required(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Unavailable(format!("{}: {e}", path.display())))?;
        toml::from_str(&contents)
            .map_err(|e| ConfigError::Malformed(format!("{}: {e}", path.display())))
    }

    /// Save config to an arbitrary path atomically (write to temp file, then
    /// rename). A header comment is prepended.
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let serialized = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        let contents = format!("{CONFIG_HEADER}{serialized}");
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, &contents)?;
        match std::fs::rename(&tmp, path) {
            Ok(()) => Ok(()),
            Err(_) => {
                // Rename can fail across filesystems; fall back to direct write + cleanup
                let result = std::fs::write(path, &contents);
                let _ = std::fs::remove_file(&tmp);
                result
            }
        }
    }

    /// Save config to the default platform path.
    pub fn save(&self) -> std::io::Result<()> {
        let Some(path) = Self::path() else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No config directory",
            ));
        };
        self.save_to(&path)
    }

    /// MQTT client identity: `client_id`, falling back to `thing_name`,
    /// truncated to the length brokers are guaranteed to accept.
    pub fn identity(&self) -> String {
        let base = if self.client_id.trim().is_empty() {
            self.thing_name.trim()
        } else {
            self.client_id.trim()
        };
        base.chars().take(MAX_CLIENT_ID_LEN).collect()
    }

    /// Resolved trust material locations, with empty fields falling back to
    /// the certs directory defaults.
    pub fn trust_paths(&self) -> TrustPaths {
        let certs = Self::certs_dir().unwrap_or_else(|| PathBuf::from("certs"));
        let resolve = |field: &str, default_name: &str| -> PathBuf {
            if field.trim().is_empty() {
                certs.join(default_name)
            } else {
                PathBuf::from(field)
            }
        };
        TrustPaths {
            ca: resolve(&self.ca_path, "AmazonRootCA1.pem"),
            certificate: resolve(&self.cert_path, "certificate.pem.crt"),
            private_key: resolve(&self.key_path, "private.pem.key"),
        }
    }

    /// Fixed reconnect backoff as a `Duration`.
    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }

    /// MQTT keep-alive as a `Duration`.
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }

    /// Check the config for problems, collecting all of them.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if self.endpoint.trim().is_empty() {
            errors.push(ValidationError::EmptyEndpoint);
        }
        if self.led_count == 0 {
            errors.push(ValidationError::ZeroLedCount);
        }
        if self.backoff_secs == 0 {
            errors.push(ValidationError::ZeroBackoff);
        }
        let paths = self.trust_paths();
        for (role, path) in [
            ("CA certificate", &paths.ca),
            ("client certificate", &paths.certificate),
            ("private key", &paths.private_key),
        ] {
            if !path.exists() {
                errors.push(ValidationError::TrustFileMissing {
                    role,
                    path: path.clone(),
                });
            }
        }
        errors
    }
}
