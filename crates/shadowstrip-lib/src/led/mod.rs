//! LED strip control: colour handling, frame operations, strip backends.

mod color;
mod ops;
mod strip;

pub use color::{decode_color, format_color};
pub use ops::{apply_state, build_frame, clear, show_status};
pub use strip::{LedStrip, StripError, TermStrip};

#[doc(hidden)]
pub use strip::mock;
