//! Frame-level strip operations.
//!
//! Everything that turns `(colour, active count)` into pixels lives here, so
//! clamping happens in exactly one place and re-applying the same state
//! always produces the same frame.

use crate::led::strip::{LedStrip, StripError};

/// Build a full-strip frame: pixels below `active_count` lit in `color`, the
/// remainder off.
///
/// `active_count` is clamped to `[0, capacity]`; the returned frame always
/// has exactly `capacity` entries.
pub fn build_frame(color: u32, active_count: usize, capacity: usize) -> Vec<u32> {
    let lit = active_count.min(capacity);
    let mut frame = vec![0u32; capacity];
    frame[..lit].fill(color & 0xFF_FFFF);
    frame
}

/// Clamp and render a `(colour, active count)` pair.
pub fn apply_state(
    strip: &mut impl LedStrip,
    color: u32,
    active_count: usize,
) -> Result<(), StripError> {
    let frame = build_frame(color, active_count, strip.capacity());
    strip.render(&frame)
}

/// Render a single status pixel in `color`, remainder off.
///
/// Connection-status indication; only the supervisor calls this.
pub fn show_status(strip: &mut impl LedStrip, color: u32) -> Result<(), StripError> {
    apply_state(strip, color, 1)
}

/// All pixels off.
pub fn clear(strip: &mut impl LedStrip) -> Result<(), StripError> {
    apply_state(strip, 0, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::led::strip::mock::MockStrip;

    // ── build_frame ──

    #[test]
    fn fills_below_count_clears_rest() {
        assert_eq!(
            build_frame(0xFF0000, 2, 5),
            vec![0xFF0000, 0xFF0000, 0, 0, 0]
        );
    }

    #[test]
    fn zero_count_all_off() {
        assert_eq!(build_frame(0xFF0000, 0, 3), vec![0, 0, 0]);
    }

    #[test]
    fn count_above_capacity_clamps() {
        assert_eq!(build_frame(0x00FF00, 99, 3), vec![0x00FF00; 3]);
    }

    #[test]
    fn count_equal_capacity_fills_all() {
        assert_eq!(build_frame(0x0000FF, 4, 4), vec![0x0000FF; 4]);
    }

    #[test]
    fn zero_capacity_empty_frame() {
        assert!(build_frame(0xFFFFFF, 7, 0).is_empty());
    }

    #[test]
    fn colour_masked_to_24_bits() {
        assert_eq!(build_frame(0xAB_FF0000, 1, 1), vec![0xFF0000]);
    }

    #[test]
    fn same_inputs_same_frame() {
        assert_eq!(build_frame(0x123456, 3, 10), build_frame(0x123456, 3, 10));
    }

    // ── apply_state / helpers ──

    #[test]
    fn apply_state_renders_clamped_frame() {
        let mut strip = MockStrip::new(4);
        apply_state(&mut strip, 0xFF00FF, 6).unwrap();
        assert_eq!(strip.last_frame(), Some(&[0xFF00FF; 4][..]));
    }

    #[test]
    fn apply_state_is_idempotent_on_frames() {
        let mut strip = MockStrip::new(5);
        apply_state(&mut strip, 0x00FFAA, 2).unwrap();
        apply_state(&mut strip, 0x00FFAA, 2).unwrap();
        assert_eq!(strip.render_count(), 2);
        assert_eq!(strip.frames[0], strip.frames[1]);
    }

    #[test]
    fn show_status_lights_first_pixel_only() {
        let mut strip = MockStrip::new(3);
        show_status(&mut strip, 0x0000FF).unwrap();
        assert_eq!(strip.last_frame(), Some(&[0x0000FF, 0, 0][..]));
    }

    #[test]
    fn clear_turns_everything_off() {
        let mut strip = MockStrip::new(3);
        apply_state(&mut strip, 0xFFFFFF, 3).unwrap();
        clear(&mut strip).unwrap();
        assert_eq!(strip.last_frame(), Some(&[0u32, 0, 0][..]));
    }

    #[test]
    fn render_failure_propagates() {
        let mut strip = MockStrip::new(2);
        strip.fail_render = true;
        assert!(apply_state(&mut strip, 0xFF0000, 1).is_err());
    }
}
