//! Reveal frame planning.

use serde::Serialize;

/// Default "in progress" glyph appended to progress frames.
pub const DEFAULT_CURSOR: &str = "▌";

/// One display update emitted during a reveal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevealFrame {
    /// Full text to display, cursor included for progress frames.
    pub content: String,
    /// Whether this is the final frame (no cursor).
    pub terminal: bool,
}

impl RevealFrame {
    /// Creates a progress frame.
    #[must_use]
    pub const fn progress(content: String) -> Self {
        Self {
            content,
            terminal: false,
        }
    }

    /// Creates the terminal frame.
    #[must_use]
    pub const fn terminal(content: String) -> Self {
        Self {
            content,
            terminal: true,
        }
    }
}

/// Iterator over the frames of a reveal.
///
/// Yields one progress frame per whitespace-separated word (the accumulated
/// words, each followed by a space, then the cursor) and finally one terminal
/// frame holding `text` unchanged.
///
/// # Examples
///
/// ```
/// use lunga_rs::reveal::Frames;
///
/// let frames: Vec<String> = Frames::new("a b", "▌").map(|f| f.content).collect();
/// assert_eq!(frames, vec!["a ▌", "a b ▌", "a b"]);
/// ```
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    text: &'a str,
    cursor: &'a str,
    words: std::str::SplitWhitespace<'a>,
    accumulator: String,
    done: bool,
}

impl<'a> Frames<'a> {
    /// Plans the frames for `text` using `cursor` as the progress marker.
    #[must_use]
    pub fn new(text: &'a str, cursor: &'a str) -> Self {
        Self {
            text,
            cursor,
            words: text.split_whitespace(),
            accumulator: String::with_capacity(text.len() + 1),
            done: false,
        }
    }

    /// The accumulated words so far, each followed by a space.
    #[must_use]
    pub fn accumulated(&self) -> &str {
        &self.accumulator
    }
}

impl Iterator for Frames<'_> {
    type Item = RevealFrame;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Some(word) = self.words.next() {
            self.accumulator.push_str(word);
            self.accumulator.push(' ');
            let mut content = String::with_capacity(self.accumulator.len() + self.cursor.len());
            content.push_str(&self.accumulator);
            content.push_str(self.cursor);
            return Some(RevealFrame::progress(content));
        }
        self.done = true;
        Some(RevealFrame::terminal(self.text.to_string()))
    }
}

/// Number of frames a reveal of `text` produces (words plus the terminal one).
#[must_use]
pub fn frame_count(text: &str) -> usize {
    text.split_whitespace().count() + 1
}
