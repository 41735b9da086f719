//! `render` subcommand: drive the terminal strip locally, no broker needed.

use std::path::Path;

use super::{Result, led};
use shadowstrip_lib::led::TermStrip;

pub(super) fn cmd_render(
    config_path: Option<&Path>,
    color: &str,
    count: Option<usize>,
    leds: Option<usize>,
) -> Result<()> {
    let config = super::load_config(config_path);
    let capacity = leds.unwrap_or(config.led_count);
    let value = led::decode_color(color);
    let lit = count.unwrap_or(capacity).min(capacity);

    let mut strip = TermStrip::new(capacity);
    led::apply_state(&mut strip, value, lit)?;
    println!("{} across {lit} of {capacity} LEDs", led::format_color(value));
    Ok(())
}
