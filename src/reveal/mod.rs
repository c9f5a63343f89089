//! Incremental reveal of a cleaned completion.
//!
//! The completion arrives in one piece; the revealer replays it word by word
//! to a [`DisplaySink`] at a fixed pace so it reads like live generation.
//!
//! Two scheduling models are supported:
//!
//! - [`IncrementalRevealer::reveal_blocking`] sleeps the calling thread.
//! - [`IncrementalRevealer::reveal`] is async and races each pause against a
//!   [`CancellationToken`]; [`IncrementalRevealer::spawn`] runs it on a tokio
//!   task and streams frames back over a channel.
//!
//! Either way the sink sees a strictly growing sequence of progress frames
//! followed by exactly one terminal frame equal to the input text. A cancelled
//! reveal writes no terminal frame.

mod frames;
mod sink;

pub use frames::{DEFAULT_CURSOR, Frames, RevealFrame, frame_count};
pub use sink::{ChannelSink, DisplaySink, MemorySink, TerminalSink};

use crate::error::{Error, Result, SinkWriteError};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, warn};

/// Default pause between words (milliseconds).
pub const DEFAULT_PACE_MS: u64 = 50;

/// How a reveal ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Every frame, including the terminal one, was written.
    Completed,
    /// The caller cancelled; no terminal frame was written.
    Cancelled {
        /// Progress frames written before cancellation.
        frames_written: usize,
    },
}

impl RevealOutcome {
    /// Returns `true` if the terminal frame was written.
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Replays text to a sink one word per tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncrementalRevealer {
    pace: Duration,
    cursor: String,
}

impl Default for IncrementalRevealer {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_PACE_MS))
    }
}

impl IncrementalRevealer {
    /// Creates a revealer with the given pause between words.
    #[must_use]
    pub fn new(pace: Duration) -> Self {
        Self {
            pace,
            cursor: DEFAULT_CURSOR.to_string(),
        }
    }

    /// Sets the progress marker appended to each progress frame.
    #[must_use]
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = cursor.into();
        self
    }

    /// Pause between words.
    #[must_use]
    pub const fn pace(&self) -> Duration {
        self.pace
    }

    /// Progress marker.
    #[must_use]
    pub fn cursor(&self) -> &str {
        &self.cursor
    }

    /// The frames a reveal of `text` would write.
    #[must_use]
    pub fn frames<'a>(&'a self, text: &'a str) -> Frames<'a> {
        Frames::new(text, &self.cursor)
    }

    /// Reveals `text`, blocking the calling thread between words.
    ///
    /// `cancel` is checked at every word boundary.
    ///
    /// # Errors
    ///
    /// Returns [`SinkWriteError`] if the sink rejects a frame. No further
    /// frames are written after a failure.
    pub fn reveal_blocking<S>(
        &self,
        text: &str,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> std::result::Result<RevealOutcome, SinkWriteError>
    where
        S: DisplaySink + ?Sized,
    {
        for (index, frame) in self.frames(text).enumerate() {
            if cancel.is_cancelled() {
                debug!(frames_written = index, "reveal cancelled");
                return Ok(RevealOutcome::Cancelled {
                    frames_written: index,
                });
            }
            write_frame(sink, &frame, index)?;
            if !frame.terminal && !self.pace.is_zero() {
                std::thread::sleep(self.pace);
            }
        }
        Ok(RevealOutcome::Completed)
    }

    /// Reveals `text`, pausing asynchronously between words.
    ///
    /// Each pause races `cancel`; cancellation stops the reveal at the next
    /// word boundary without writing the terminal frame.
    ///
    /// # Errors
    ///
    /// Returns [`SinkWriteError`] if the sink rejects a frame. No further
    /// frames are written after a failure.
    pub async fn reveal<S>(
        &self,
        text: &str,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> std::result::Result<RevealOutcome, SinkWriteError>
    where
        S: DisplaySink + ?Sized,
    {
        for (index, frame) in self.frames(text).enumerate() {
            if cancel.is_cancelled() {
                debug!(frames_written = index, "reveal cancelled");
                return Ok(RevealOutcome::Cancelled {
                    frames_written: index,
                });
            }
            write_frame(sink, &frame, index)?;
            if !frame.terminal && !self.pace.is_zero() {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        debug!(frames_written = index + 1, "reveal cancelled");
                        return Ok(RevealOutcome::Cancelled {
                            frames_written: index + 1,
                        });
                    }
                    () = tokio::time::sleep(self.pace) => {}
                }
            }
        }
        Ok(RevealOutcome::Completed)
    }

    /// Runs the reveal on a tokio task, sending frames over a channel.
    ///
    /// The task stops when `cancel` fires or when the returned [`RevealTask`]
    /// is dropped. Dropping the task does not cancel `cancel` itself.
    #[must_use]
    pub fn spawn(&self, text: String, cancel: &CancellationToken) -> RevealTask {
        let (tx, rx) = mpsc::unbounded_channel();
        let revealer = self.clone();
        let cancel = cancel.child_token();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let mut sink = ChannelSink::new(tx);
            revealer.reveal(&text, &mut sink, &token).await
        });
        RevealTask {
            frames: rx,
            handle,
            cancel: cancel.clone(),
            guard: cancel.drop_guard(),
        }
    }
}

fn write_frame<S>(
    sink: &mut S,
    frame: &RevealFrame,
    index: usize,
) -> std::result::Result<(), SinkWriteError>
where
    S: DisplaySink + ?Sized,
{
    sink.append(frame).map_err(|e| {
        warn!(frame = index, error = %e, "display sink rejected frame");
        SinkWriteError::new(index, e.to_string())
    })
}

/// A reveal running on a background task.
#[derive(Debug)]
pub struct RevealTask {
    frames: UnboundedReceiver<RevealFrame>,
    handle: JoinHandle<std::result::Result<RevealOutcome, SinkWriteError>>,
    cancel: CancellationToken,
    guard: DropGuard,
}

impl RevealTask {
    /// Receives the next frame, or `None` once the reveal has stopped.
    pub async fn next_frame(&mut self) -> Option<RevealFrame> {
        self.frames.recv().await
    }

    /// Requests cancellation at the next word boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A token that cancels only this reveal.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Drains every frame into `sink`, then waits for the task.
    ///
    /// # Errors
    ///
    /// Returns an error if the reveal task failed or `sink` rejects a frame.
    pub async fn forward_to<S>(mut self, sink: &mut S) -> Result<RevealOutcome>
    where
        S: DisplaySink + ?Sized,
    {
        let mut index = 0;
        while let Some(frame) = self.frames.recv().await {
            if let Err(e) = write_frame(sink, &frame, index) {
                self.cancel.cancel();
                return Err(e.into());
            }
            index += 1;
        }
        self.join().await
    }

    /// Waits for the reveal to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink failed or the task panicked.
    pub async fn join(self) -> Result<RevealOutcome> {
        let Self { handle, guard, .. } = self;
        let outcome = handle.await.map_err(|e| Error::InvalidState {
            message: format!("reveal task failed: {e}"),
        })??;
        drop(guard);
        Ok(outcome)
    }
}
