//! LED strip backends.
//!
//! The daemon talks to the strip through the [`LedStrip`] trait so the
//! reconciliation engine and the connection supervisor never know which
//! backend is wired in. [`TermStrip`] renders frames as true-colour blocks on
//! a terminal and doubles as the simulator backend; hardware backends
//! implement the same trait out of tree.

use std::fmt;
use std::io::{self, Write};

/// Errors raised by strip backends.
#[derive(Debug)]
pub enum StripError {
    /// Backend write failure, with context.
    Io(String),
    /// Frame length does not match the strip capacity.
    FrameSize { expected: usize, got: usize },
}

impl fmt::Display for StripError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StripError::Io(msg) => write!(f, "strip I/O: {msg}"),
            StripError::FrameSize { expected, got } => {
                write!(f, "frame size mismatch: expected {expected} pixels, got {got}")
            }
        }
    }
}

impl std::error::Error for StripError {}

/// Abstraction over an addressable LED strip.
///
/// A frame is a full-strip slice of 24-bit `0xRRGGBB` values whose length
/// must equal [`capacity`](LedStrip::capacity). Pushing an identical frame
/// twice leaves the visible state unchanged.
pub trait LedStrip {
    /// Number of physical pixels on the strip.
    fn capacity(&self) -> usize;

    /// Push a complete frame to the strip.
    fn render(&mut self, frame: &[u32]) -> Result<(), StripError>;
}

// ── Terminal backend ──

/// Terminal-rendered strip: one row of true-colour blocks per frame.
///
/// Used as the simulator backend and by the one-shot `render` command.
/// Identical consecutive frames are skipped so an idle daemon does not
/// scroll the terminal.
pub struct TermStrip {
    capacity: usize,
    last: Option<Vec<u32>>,
    out: Box<dyn Write + Send>,
}

impl TermStrip {
    /// Strip of `capacity` pixels rendering to stdout.
    pub fn new(capacity: usize) -> Self {
        Self::with_writer(capacity, Box::new(io::stdout()))
    }

    /// Strip rendering to an arbitrary writer.
    pub fn with_writer(capacity: usize, out: Box<dyn Write + Send>) -> Self {
        TermStrip {
            capacity,
            last: None,
            out,
        }
    }
}

impl LedStrip for TermStrip {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn render(&mut self, frame: &[u32]) -> Result<(), StripError> {
        if frame.len() != self.capacity {
            return Err(StripError::FrameSize {
                expected: self.capacity,
                got: frame.len(),
            });
        }
        if self.last.as_deref() == Some(frame) {
            return Ok(());
        }
        write_frame(&mut *self.out, frame)
            .map_err(|e| StripError::Io(format!("terminal write: {e}")))?;
        self.last = Some(frame.to_vec());
        Ok(())
    }
}

fn write_frame(out: &mut (dyn Write + Send), frame: &[u32]) -> io::Result<()> {
    for &px in frame {
        let (r, g, b) = ((px >> 16) as u8, (px >> 8) as u8, px as u8);
        write!(out, "\x1b[48;2;{r};{g};{b}m  ")?;
    }
    writeln!(out, "\x1b[0m")?;
    out.flush()
}

// ── Mock ──

/// Mock strip for tests. Not part of the public API surface.
#[doc(hidden)]
pub mod mock {
    use super::{LedStrip, StripError};

    /// Records every frame passed to `render`; failures injectable.
    pub struct MockStrip {
        capacity: usize,
        /// Frames received, in call order.
        pub frames: Vec<Vec<u32>>,
        /// When true, `render` fails with an I/O error.
        pub fail_render: bool,
    }

    impl MockStrip {
        pub fn new(capacity: usize) -> Self {
            MockStrip {
                capacity,
                frames: Vec::new(),
                fail_render: false,
            }
        }

        /// Number of `render` calls observed.
        pub fn render_count(&self) -> usize {
            self.frames.len()
        }

        /// The most recent frame, if any.
        pub fn last_frame(&self) -> Option<&[u32]> {
            self.frames.last().map(Vec::as_slice)
        }
    }

    impl LedStrip for MockStrip {
        fn capacity(&self) -> usize {
            self.capacity
        }

        fn render(&mut self, frame: &[u32]) -> Result<(), StripError> {
            if self.fail_render {
                return Err(StripError::Io("mock render failure".into()));
            }
            self.frames.push(frame.to_vec());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockStrip;
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Shared buffer writer so tests can inspect what TermStrip wrote.
    #[derive(Clone)]
    struct Sink(Arc<Mutex<Vec<u8>>>);

    impl Sink {
        fn new() -> Self {
            Sink(Arc::new(Mutex::new(Vec::new())))
        }

        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    // ── TermStrip ──

    #[test]
    fn term_strip_writes_truecolor_cells() {
        let sink = Sink::new();
        let mut strip = TermStrip::with_writer(2, Box::new(sink.clone()));
        strip.render(&[0xFF0000, 0x000000]).unwrap();

        let out = sink.contents();
        assert!(out.contains("\x1b[48;2;255;0;0m"));
        assert!(out.contains("\x1b[48;2;0;0;0m"));
        assert!(out.ends_with("\x1b[0m\n"));
    }

    #[test]
    fn term_strip_skips_identical_frames() {
        let sink = Sink::new();
        let mut strip = TermStrip::with_writer(2, Box::new(sink.clone()));
        strip.render(&[0x00FF00, 0]).unwrap();
        let first = sink.contents();
        strip.render(&[0x00FF00, 0]).unwrap();
        assert_eq!(sink.contents(), first, "unchanged frame should not rewrite");

        strip.render(&[0x0000FF, 0]).unwrap();
        assert!(sink.contents().len() > first.len());
    }

    #[test]
    fn term_strip_rejects_wrong_frame_size() {
        let mut strip = TermStrip::with_writer(3, Box::new(Sink::new()));
        let err = strip.render(&[0x123456]).unwrap_err();
        match err {
            StripError::FrameSize { expected, got } => {
                assert_eq!(expected, 3);
                assert_eq!(got, 1);
            }
            other => panic!("expected FrameSize, got {other:?}"),
        }
    }

    // ── MockStrip ──

    #[test]
    fn mock_strip_records_frames() {
        let mut strip = MockStrip::new(4);
        strip.render(&[1, 2, 3, 4]).unwrap();
        strip.render(&[0, 0, 0, 0]).unwrap();
        assert_eq!(strip.render_count(), 2);
        assert_eq!(strip.last_frame(), Some(&[0u32, 0, 0, 0][..]));
    }

    #[test]
    fn mock_strip_injected_failure() {
        let mut strip = MockStrip::new(1);
        strip.fail_render = true;
        assert!(strip.render(&[0]).is_err());
        assert_eq!(strip.render_count(), 0);
    }

    #[test]
    fn error_display() {
        assert_eq!(
            StripError::Io("broken pipe".into()).to_string(),
            "strip I/O: broken pipe"
        );
        assert_eq!(
            StripError::FrameSize {
                expected: 10,
                got: 2
            }
            .to_string(),
            "frame size mismatch: expected 10 pixels, got 2"
        );
    }
}
