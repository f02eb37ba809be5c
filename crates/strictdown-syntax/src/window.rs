//! Caller-owned input buffer.
//!
//! Text is pushed in as it arrives and addressed by character index. Tape
//! positions are indices into this buffer, so the buffer and the tape are
//! always compacted by the same amount.

use crate::chars::SENTINEL;
use crate::span::Span;
use crate::tape::MAX_POSITION;

/// A growable window of decoded input characters.
#[derive(Debug, Default, Clone)]
pub struct InputWindow {
    buf: Vec<char>,
    position: usize,
    mark: usize,
    ended: bool,
}

impl InputWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk of input.
    ///
    /// Panics if the window would exceed the range a tape position can
    /// address; callers must compact before that happens.
    pub fn push_str(&mut self, chunk: &str) {
        assert!(!self.ended, "input pushed after end of input");
        self.buf.extend(chunk.chars());
        assert!(
            self.buf.len() <= MAX_POSITION,
            "input window of {} chars exceeds {MAX_POSITION}",
            self.buf.len()
        );
    }

    pub fn push(&mut self, c: char) {
        let mut tmp = [0u8; 4];
        self.push_str(c.encode_utf8(&mut tmp));
    }

    /// Appends the end-of-input sentinel. Idempotent.
    pub fn end_of_input(&mut self) {
        if !self.ended {
            self.push(SENTINEL);
            self.ended = true;
        }
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Current read position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of characters filled so far.
    pub fn limit(&self) -> usize {
        self.buf.len()
    }

    /// Unread characters.
    pub fn remaining(&self) -> usize {
        self.limit() - self.position
    }

    pub fn get(&self, index: usize) -> Option<char> {
        self.buf.get(index).copied()
    }

    /// Character at the read position.
    pub fn peek(&self) -> Option<char> {
        self.get(self.position)
    }

    /// Character `offset` places past the read position.
    pub fn peek_at(&self, offset: usize) -> Option<char> {
        self.get(self.position + offset)
    }

    /// Consumes one character.
    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += 1;
        Some(c)
    }

    pub fn advance(&mut self, n: usize) {
        self.set_position(self.position + n);
    }

    /// Moves the read position. Panics beyond the fill.
    pub fn set_position(&mut self, position: usize) {
        assert!(
            position <= self.buf.len(),
            "position {position} beyond window fill {}",
            self.buf.len()
        );
        self.position = position;
    }

    /// Saves the read position for a later [`reset`](Self::reset).
    pub fn mark(&mut self) {
        self.mark = self.position;
    }

    pub fn reset(&mut self) {
        self.position = self.mark;
    }

    pub fn slice(&self, span: Span) -> &[char] {
        let span = span.clip(self.buf.len());
        &self.buf[span.start..span.end]
    }

    pub fn text(&self, span: Span) -> String {
        self.slice(span).iter().collect()
    }

    /// Drops everything before `cutoff` and rebases positions onto it.
    pub fn compact(&mut self, cutoff: usize) {
        assert!(
            cutoff <= self.position,
            "compacting past the read position ({cutoff} > {})",
            self.position
        );
        self.buf.drain(..cutoff);
        self.position -= cutoff;
        self.mark = self.mark.saturating_sub(cutoff);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_and_marks() {
        let mut w = InputWindow::new();
        w.push_str("ab");
        w.push('c');
        assert_eq!(w.bump(), Some('a'));
        w.mark();
        w.advance(2);
        assert_eq!(w.peek(), None);
        w.reset();
        assert_eq!(w.peek(), Some('b'));
        assert_eq!(w.peek_at(1), Some('c'));
    }

    #[test]
    fn compaction_rebases_positions() {
        let mut w = InputWindow::new();
        w.push_str("héllo world");
        w.set_position(6);
        w.compact(6);
        assert_eq!(w.position(), 0);
        assert_eq!(w.text(Span::new(0, 5)), "world");
    }

    #[test]
    fn end_of_input_appends_sentinel_once() {
        let mut w = InputWindow::new();
        w.end_of_input();
        w.end_of_input();
        assert_eq!(w.limit(), 1);
        assert_eq!(w.get(0), Some(SENTINEL));
        assert!(w.is_ended());
    }

    #[test]
    #[should_panic(expected = "compacting past")]
    fn compacting_unread_input_panics() {
        let mut w = InputWindow::new();
        w.push_str("abc");
        w.compact(2);
    }
}
