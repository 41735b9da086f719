//! CLI subcommands: the daemon entry point plus config and strip inspection.

mod config_cmd;
mod render;
mod run;
mod status;
mod topics;

use std::path::Path;

use clap::Subcommand;
use serde::Serialize;

pub(super) use crate::RUNNING;
pub(super) use shadowstrip_lib::config::Config;
pub(super) use shadowstrip_lib::error::Result;
pub(super) use shadowstrip_lib::led;
pub(super) use shadowstrip_lib::shadow::ShadowTopics;

const PADDING: usize = 2;

/// Compute alignment width for a command's key-value output.
/// Ensures at least PADDING spaces after the longest key in either level,
/// with top-level and indent values aligned to the same column.
pub(super) fn kv_width(top: &[&str], indent: &[&str]) -> usize {
    let top_max = top.iter().map(|k| k.len()).max().unwrap_or(0);
    let indent_max = indent.iter().map(|k| k.len()).max().unwrap_or(0);
    let top_need = if top.is_empty() { 0 } else { top_max + PADDING };
    // Indent keys lose 2 chars of inner width to the "  " prefix
    let indent_need = if indent.is_empty() {
        0
    } else {
        indent_max + PADDING + 2
    };
    top_need.max(indent_need)
}

pub(super) fn kv(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("{key:<width$}{value}", width = w);
}

pub(super) fn kv_indent(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("  {key:<width$}{value}", width = w - 2);
}

/// Load config for a subcommand, surfacing parse problems as warnings.
pub(super) fn load_config(custom_path: Option<&Path>) -> Config {
    let (config, warnings) = match custom_path {
        Some(p) => Config::load_from(p),
        None => Config::load_with_warnings(),
    };
    for w in &warnings {
        log::warn!("{w}");
    }
    config
}

// ── JSON output structs ──

#[derive(Serialize)]
pub(super) struct StatusOutput {
    pub version: String,
    pub ready: bool,
    pub endpoint: String,
    pub thing_name: String,
    pub client_id: String,
    pub led_count: usize,
    pub trust: Vec<TrustFileJson>,
    pub problems: Vec<String>,
}

#[derive(Serialize)]
pub(super) struct TrustFileJson {
    pub role: String,
    pub path: String,
    pub present: bool,
}

#[derive(Serialize)]
pub(super) struct ConfigOutput {
    pub config_file: Option<String>,
    pub config_file_exists: bool,
    pub settings: Config,
    pub trust: Vec<TrustFileJson>,
}

#[derive(Serialize)]
pub(super) struct TopicsOutput {
    pub thing_name: String,
    pub subscribe: Vec<String>,
    pub publish: Vec<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the synchronization daemon (connects and stays up)
    Run {
        /// Override the broker endpoint from the config
        #[arg(long)]
        endpoint: Option<String>,
        /// Override the thing name from the config
        #[arg(long)]
        thing_name: Option<String>,
    },

    /// Show configuration, trust material, and connection readiness
    Status,

    /// Show current configuration and file paths
    Config {
        /// Write a default config file if none exists yet
        #[arg(long)]
        init: bool,
    },

    /// Print the shadow topics for the configured thing
    Topics,

    /// Render a color on the terminal strip without connecting
    Render {
        /// Hex color, with or without a leading '#'
        color: String,
        /// Number of pixels to light (default: all)
        #[arg(long)]
        count: Option<usize>,
        /// Strip length to render (default: configured led_count)
        #[arg(long)]
        leds: Option<usize>,
    },
}

/// Warn if `--json` was passed to a command that doesn't support it.
fn warn_json_unsupported(cmd_name: &str) {
    log::warn!("--json is not supported for `{cmd_name}` (ignored)");
}

pub fn run(cmd: Command, json: bool, config_path: Option<&Path>) -> Result<()> {
    match cmd {
        Command::Run {
            endpoint,
            thing_name,
        } => {
            if json {
                warn_json_unsupported("run");
            }
            run::cmd_run(config_path, endpoint, thing_name)
        }
        Command::Status => status::cmd_status(json, config_path),
        Command::Config { init } => config_cmd::cmd_config(json, config_path, init),
        Command::Topics => topics::cmd_topics(json, config_path),
        Command::Render { color, count, leds } => {
            if json {
                warn_json_unsupported("render");
            }
            render::cmd_render(config_path, &color, count, leds)
        }
    }
}

/// Trust material roles with resolved paths and on-disk presence.
pub(super) fn trust_files(config: &Config) -> Vec<TrustFileJson> {
    let paths = config.trust_paths();
    [
        ("CA certificate", &paths.ca),
        ("client certificate", &paths.certificate),
        ("private key", &paths.private_key),
    ]
    .into_iter()
    .map(|(role, path)| TrustFileJson {
        role: role.to_string(),
        path: path.display().to_string(),
        present: path.exists(),
    })
    .collect()
}

#[cfg(test)]
mod format_tests {
    use super::*;

    #[test]
    fn kv_width_top_only() {
        let w = kv_width(&["Short:", "Longer key:"], &[]);
        // "Longer key:" = 11 + PADDING = 13
        assert_eq!(w, 13);
    }

    #[test]
    fn kv_width_indent_drives_width() {
        // Indent key needs +2 for the prefix
        let w = kv_width(&["A:"], &["Very long indent key:"]);
        // "Very long indent key:" = 21 + PADDING + 2 = 25
        assert_eq!(w, 25);
    }

    #[test]
    fn kv_width_empty_both() {
        let w = kv_width(&[], &[]);
        assert_eq!(w, 0);
    }

    #[test]
    fn status_width_is_compact() {
        let w = kv_width(
            &["Version:", "Thing:", "Client id:", "Endpoint:", "Strip:"],
            &["CA certificate:", "Client certificate:", "Private key:"],
        );
        // Longest indent key: "Client certificate:" (19) + 2 + 2 = 23
        assert_eq!(w, 23);
    }
}
