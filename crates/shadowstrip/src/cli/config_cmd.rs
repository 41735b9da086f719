//! `config` subcommand: show current configuration and file paths.

use std::path::{Path, PathBuf};

use super::{Config, ConfigOutput, Result, kv, kv_indent, kv_width, trust_files};
use shadowstrip_lib::config::ConfigError;

pub(super) fn cmd_config(json: bool, custom_path: Option<&Path>, init: bool) -> Result<()> {
    if init {
        return cmd_config_init(custom_path);
    }

    let config = super::load_config(custom_path);
    let config_path = custom_path.map(|p| p.to_path_buf()).or_else(Config::path);
    let config_exists = config_path.as_ref().map(|p| p.exists()).unwrap_or(false);
    let trust = trust_files(&config);

    if json {
        let output = ConfigOutput {
            config_file: config_path.as_ref().map(|p| p.display().to_string()),
            config_file_exists: config_exists,
            settings: config,
            trust,
        };
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
        return Ok(());
    }

    // Human-readable output
    let w = kv_width(
        &["Config file:"],
        &[
            "endpoint:",
            "port:",
            "thing_name:",
            "client_id:",
            "led_count:",
            "backoff_secs:",
            "keep_alive_secs:",
            "CA certificate:",
            "Client certificate:",
            "Private key:",
        ],
    );

    match &config_path {
        Some(p) => {
            if config_exists {
                kv("Config file:", format_args!("{} (loaded)", p.display()), w);
            } else {
                kv(
                    "Config file:",
                    format_args!("{} (not found, using defaults)", p.display()),
                    w,
                );
            }
        }
        None => kv("Config file:", "(no config directory)", w),
    }
    println!();

    println!("Settings:");
    let endpoint_display = if config.endpoint.trim().is_empty() {
        "(not configured)".to_string()
    } else {
        config.endpoint.trim().to_string()
    };
    kv_indent("endpoint:", endpoint_display, w);
    kv_indent("port:", config.port, w);
    kv_indent("thing_name:", &config.thing_name, w);
    let client_display = if config.client_id.trim().is_empty() {
        format!("(thing name) {}", config.identity())
    } else {
        config.identity()
    };
    kv_indent("client_id:", client_display, w);
    kv_indent("led_count:", config.led_count, w);
    kv_indent("backoff_secs:", config.backoff_secs, w);
    kv_indent("keep_alive_secs:", config.keep_alive_secs, w);
    println!();

    println!("Trust material:");
    for file in &trust {
        let state = if file.present { "present" } else { "not found" };
        let mut key = file.role.clone();
        if let Some(first) = key.get_mut(..1) {
            first.make_ascii_uppercase();
        }
        key.push(':');
        kv_indent(&key, format_args!("{} ({state})", file.path), w);
    }
    Ok(())
}

/// Write a default config document so the operator has something to edit.
fn cmd_config_init(custom_path: Option<&Path>) -> Result<()> {
    let target = custom_path
        .map(PathBuf::from)
        .or_else(Config::path)
        .ok_or_else(|| ConfigError::Unavailable("no config directory on this platform".into()))?;

    if target.exists() {
        println!("Config already exists: {}", target.display());
        return Ok(());
    }

    Config::default().save_to(&target)?;
    println!("Wrote default config: {}", target.display());
    println!("Edit it to set your endpoint and trust material paths.");
    Ok(())
}
