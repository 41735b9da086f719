//! `status` subcommand: configuration summary and connection readiness.

use std::path::Path;

use super::{Result, StatusOutput, kv, kv_indent, kv_width, trust_files};

pub(super) fn cmd_status(json: bool, config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path);
    let trust = trust_files(&config);
    let problems: Vec<String> = config.validate().iter().map(|p| p.to_string()).collect();
    let ready = problems.is_empty();

    if json {
        let output = StatusOutput {
            version: env!("CARGO_PKG_VERSION").to_string(),
            ready,
            endpoint: config.endpoint.trim().to_string(),
            thing_name: config.thing_name.clone(),
            client_id: config.identity(),
            led_count: config.led_count,
            trust,
            problems,
        };
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
        return Ok(());
    }

    // Human-readable output
    let w = kv_width(
        &["Version:", "Thing:", "Client id:", "Endpoint:", "Strip:"],
        &["CA certificate:", "Client certificate:", "Private key:"],
    );

    kv("Version:", env!("CARGO_PKG_VERSION"), w);
    kv("Thing:", &config.thing_name, w);
    kv("Client id:", config.identity(), w);
    if config.endpoint.trim().is_empty() {
        kv("Endpoint:", "(not configured)", w);
    } else {
        kv(
            "Endpoint:",
            format_args!("{}:{}", config.endpoint.trim(), config.port),
            w,
        );
    }
    kv("Strip:", format_args!("{} LEDs", config.led_count), w);
    println!();

    println!("Trust material:");
    for file in &trust {
        let state = if file.present { "present" } else { "missing" };
        // Capitalize the role for display keys
        let mut key = file.role.clone();
        if let Some(first) = key.get_mut(..1) {
            first.make_ascii_uppercase();
        }
        key.push(':');
        kv_indent(&key, format_args!("{} ({state})", file.path), w);
    }
    println!();

    if ready {
        println!("Ready to connect.");
    } else {
        println!("Not ready:");
        for p in &problems {
            println!("  - {p}");
        }
    }
    Ok(())
}
