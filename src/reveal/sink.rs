//! Display sinks that receive reveal frames.

use super::frames::{DEFAULT_CURSOR, RevealFrame};
use std::io::{self, Write};
use tokio::sync::mpsc::UnboundedSender;

/// A display surface that accepts reveal frames.
///
/// Each frame holds the full text to show, not a delta. A sink that fails a
/// write aborts the reveal; sinks are never retried.
pub trait DisplaySink {
    /// Displays `frame`, replacing whatever the previous frame showed.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be displayed.
    fn append(&mut self, frame: &RevealFrame) -> io::Result<()>;
}

impl<S: DisplaySink + ?Sized> DisplaySink for &mut S {
    fn append(&mut self, frame: &RevealFrame) -> io::Result<()> {
        (**self).append(frame)
    }
}

/// Records every frame in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    frames: Vec<RevealFrame>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub const fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Frames received so far.
    #[must_use]
    pub fn frames(&self) -> &[RevealFrame] {
        &self.frames
    }

    /// Consumes the sink, returning its frames.
    #[must_use]
    pub fn into_frames(self) -> Vec<RevealFrame> {
        self.frames
    }

    /// The most recent frame.
    #[must_use]
    pub fn last(&self) -> Option<&RevealFrame> {
        self.frames.last()
    }
}

impl DisplaySink for MemorySink {
    fn append(&mut self, frame: &RevealFrame) -> io::Result<()> {
        self.frames.push(frame.clone());
        Ok(())
    }
}

/// Forwards frames over a tokio channel.
///
/// Fails once the receiving side has been dropped.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: UnboundedSender<RevealFrame>,
}

impl ChannelSink {
    /// Wraps the sending half of a channel.
    #[must_use]
    pub const fn new(tx: UnboundedSender<RevealFrame>) -> Self {
        Self { tx }
    }
}

impl DisplaySink for ChannelSink {
    fn append(&mut self, frame: &RevealFrame) -> io::Result<()> {
        self.tx
            .send(frame.clone())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "frame receiver dropped"))
    }
}

/// Renders frames to a terminal stream, redrawing in place.
///
/// Only the newly revealed part of each frame is written. The cursor glyph is
/// erased with a backspace before the next write, and the terminal frame ends
/// the line.
#[derive(Debug)]
pub struct TerminalSink<W: Write> {
    out: W,
    cursor: String,
    shown: String,
    cursor_visible: bool,
}

impl<W: Write> TerminalSink<W> {
    /// Creates a sink writing to `out` with the default cursor.
    pub fn new(out: W) -> Self {
        Self::with_cursor(out, DEFAULT_CURSOR)
    }

    /// Creates a sink that recognizes `cursor` as the progress marker.
    pub fn with_cursor(out: W, cursor: impl Into<String>) -> Self {
        Self {
            out,
            cursor: cursor.into(),
            shown: String::new(),
            cursor_visible: false,
        }
    }

    /// Consumes the sink, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DisplaySink for TerminalSink<W> {
    fn append(&mut self, frame: &RevealFrame) -> io::Result<()> {
        let body = if frame.terminal || self.cursor.is_empty() {
            frame.content.as_str()
        } else {
            frame
                .content
                .strip_suffix(self.cursor.as_str())
                .unwrap_or(&frame.content)
        };

        if self.cursor_visible {
            self.out.write_all(b"\x08 \x08")?;
            self.cursor_visible = false;
        }

        // The terminal frame drops the trailing space, so it is already shown.
        if let Some(delta) = body.strip_prefix(self.shown.as_str()) {
            self.out.write_all(delta.as_bytes())?;
            self.shown.push_str(delta);
        }

        if frame.terminal {
            self.out.write_all(b"\n")?;
            self.shown.clear();
        } else if !self.cursor.is_empty() {
            self.out.write_all(self.cursor.as_bytes())?;
            self.cursor_visible = true;
        }

        self.out.flush()
    }
}
