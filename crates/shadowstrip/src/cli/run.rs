//! `run` subcommand: the synchronization daemon itself.

use std::path::Path;

use super::{Config, RUNNING, Result};
use shadowstrip_lib::clock::SystemClock;
use shadowstrip_lib::led::TermStrip;
use shadowstrip_lib::mqtt::MqttSession;
use shadowstrip_lib::runtime::Runtime;

pub(super) fn cmd_run(
    config_path: Option<&Path>,
    endpoint: Option<String>,
    thing_name: Option<String>,
) -> Result<()> {
    // An explicit --config that cannot be read is an operator error. Only a
    // missing or broken default config degrades to defaults.
    let mut config = match config_path {
        Some(p) => Config::load_required(p)?,
        None => Config::load(),
    };
    if let Some(endpoint) = endpoint {
        config.endpoint = endpoint;
    }
    if let Some(thing_name) = thing_name {
        config.thing_name = thing_name;
    }

    for problem in config.validate() {
        log::warn!("config: {problem}");
    }

    // Banner
    println!("Shadowstrip: device shadow synchronization daemon.");
    println!("  Thing:    {}", config.thing_name);
    if config.endpoint.trim().is_empty() {
        println!("  Endpoint: (not configured)");
    } else {
        println!("  Endpoint: {}:{}", config.endpoint.trim(), config.port);
    }
    println!("  Strip:    {} LEDs", config.led_count);
    println!("Press Ctrl+C to exit (clears the strip).");
    println!();

    let transport = MqttSession::new(&config);
    let strip = TermStrip::new(config.led_count);
    let mut runtime = Runtime::new(&config, transport, strip, SystemClock);
    runtime.run(&RUNNING);

    println!();
    println!("Done.");
    Ok(())
}
