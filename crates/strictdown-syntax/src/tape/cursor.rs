use super::{Entry, Tape};
use crate::span::Span;
use crate::state::State;

/// Read-only position on the tape.
///
/// Renderers walk the tape with a cursor and keep only its index between
/// calls, so a cursor can be rebuilt after the tape was appended to or
/// compacted.
#[derive(Clone, Copy)]
pub struct Cursor<'t> {
    tape: &'t Tape,
    index: usize,
}

impl<'t> Cursor<'t> {
    pub fn new(tape: &'t Tape, index: usize) -> Self {
        Self { tape, index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether an entry exists at the cursor.
    pub fn is_available(&self) -> bool {
        self.index < self.tape.len()
    }

    /// Entry at the cursor. Panics past the end of the tape.
    pub fn entry(&self) -> Entry {
        self.tape.get(self.index)
    }

    pub fn state(&self) -> State {
        self.entry().state
    }

    pub fn position(&self) -> usize {
        self.entry().position
    }

    pub fn is_marker_start(&self) -> bool {
        self.entry().is_marker_start()
    }

    pub fn is_marker_stop(&self) -> bool {
        self.entry().is_marker_stop()
    }

    pub fn is_content_start(&self) -> bool {
        self.entry().is_content_start()
    }

    pub fn is_content_stop(&self) -> bool {
        self.entry().is_content_stop()
    }

    /// Entry `offset` places ahead, if already on the tape.
    pub fn peek(&self, offset: usize) -> Option<Entry> {
        let index = self.index + offset;
        (index < self.tape.len()).then(|| self.tape.get(index))
    }

    /// Position of the following entry, if it exists yet.
    pub fn next_position(&self) -> Option<usize> {
        self.peek(1).map(|e| e.position)
    }

    pub fn advance(&mut self) {
        self.index += 1;
    }

    /// Text covered by a leaf region starting at the cursor: the gap up to the
    /// next entry, clipped to `fill`.
    ///
    /// Returns `None` while the next entry is not on the tape, which means the
    /// leaf may still grow.
    pub fn content_span(&self, fill: usize) -> Option<Span> {
        let next = self.next_position()?;
        Some(Span::new(self.position(), next).clip(fill))
    }

    /// Finds the raw content of a `state` sub-region belonging to the region
    /// that starts at the cursor.
    ///
    /// The search stops when the owning region's marker stop is reached.
    /// Returns `None` if no such sub-region is on the tape yet.
    pub fn find_content(&self, state: State) -> Option<Span> {
        let owner = self.state();
        let mut index = self.index;
        while index < self.tape.len() {
            let entry = self.tape.get(index);
            if entry.state == state && entry.is_content_start() {
                if entry.is_content_stop() {
                    return Some(Span::new(entry.position, entry.position));
                }
                let next = Cursor::new(self.tape, index).next_position()?;
                return Some(Span::new(entry.position, next));
            }
            if index > self.index && entry.state == owner && entry.is_marker_stop() {
                return None;
            }
            index += 1;
        }
        None
    }
}
