//! Tape-to-HTML rendering.
//!
//! The renderer walks the tape with a cursor and keeps only two integers
//! between calls: the index of the entry it is working on and how many output
//! units of that entry it has already emitted. When a bounded sink fills up,
//! the next call regenerates the entry's units, skips the ones already
//! emitted, and carries on. Compaction never changes an entry's units, so the
//! resume offset survives it unchanged.
//!
//! | entry | units |
//! |-------|-------|
//! | marker start | open tag (links, images and code blocks add escaped attribute characters) |
//! | content start of a copied leaf | one unit per escaped character |
//! | marker stop | close tag |

use strictdown_syntax::{Cursor, InputWindow, Span, State, Tape};

use crate::escape::{Escaping, escape_char};
use crate::sink::{BoundedSink, Sink};
use crate::tags::{
    ATTRIBUTE_END, CODE_BLOCK_OPEN, CODE_BLOCK_OPEN_INFO, Flavor, IMAGE_ALT, IMAGE_OPEN,
    LINK_OPEN,
};

#[derive(Debug, Default, Clone)]
pub struct Renderer {
    flavor: Flavor,
    /// Entry being rendered.
    index: usize,
    /// Units of that entry already emitted.
    emitted: usize,
}

/// Counts units, skipping the ones emitted by an earlier call.
struct Units<'s, S: ?Sized> {
    sink: &'s mut S,
    skip: usize,
    count: usize,
    full: bool,
}

impl<S: Sink + ?Sized> Units<'_, S> {
    fn push(&mut self, unit: &str) {
        if self.full {
            return;
        }
        if self.count < self.skip {
            self.count += 1;
        } else if self.sink.push_unit(unit) {
            self.count += 1;
        } else {
            self.full = true;
        }
    }

    fn push_chars(&mut self, window: &InputWindow, span: Span, escaping: Escaping) {
        let mut buf = [0u8; 4];
        for &c in window.slice(span) {
            if let Some(escaped) = escape_char(c, escaping, &mut buf) {
                self.push(&escaped);
            }
        }
    }
}

impl Renderer {
    pub fn new(flavor: Flavor) -> Self {
        Self {
            flavor,
            ..Self::default()
        }
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// Index of the next entry to render.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Renders every entry that is ready into `out`.
    pub fn render(&mut self, tape: &Tape, window: &InputWindow, out: &mut String) {
        self.drive(tape, window, out);
    }

    /// Renders into a bounded sink.
    ///
    /// Returns true once every ready entry is rendered, false if the sink
    /// filled up first; drain it and call again to continue.
    pub fn append(&mut self, tape: &Tape, window: &InputWindow, sink: &mut BoundedSink) -> bool {
        self.drive(tape, window, sink)
    }

    /// Compacts the tape down to the entries not yet rendered and returns
    /// the origin by which the input window must be compacted.
    pub fn compact(&mut self, tape: &mut Tape, cutoff: usize) -> usize {
        tape.compact(cutoff, &mut self.index)
    }

    fn drive<S: Sink + ?Sized>(&mut self, tape: &Tape, window: &InputWindow, sink: &mut S) -> bool {
        while self.index < tape.len() {
            let cursor = tape.cursor(self.index);
            if !is_ready(&cursor, window) {
                break;
            }
            let mut units = Units {
                sink: &mut *sink,
                skip: self.emitted,
                count: 0,
                full: false,
            };
            self.emit(&cursor, window, &mut units);
            if units.full {
                self.emitted = units.count;
                return false;
            }
            self.index += 1;
            self.emitted = 0;
        }
        true
    }

    fn emit<S: Sink + ?Sized>(&self, cursor: &Cursor<'_>, window: &InputWindow, units: &mut Units<'_, S>) {
        let state = cursor.state();
        if cursor.is_marker_start() {
            self.emit_open(cursor, window, units);
        }
        if cursor.is_content_start()
            && state.copies_content()
            && let Some(span) = cursor.content_span(window.limit())
        {
            units.push_chars(window, span, Escaping::Text);
        }
        if cursor.is_marker_stop()
            && let Some(tag) = self.flavor.close_tag(state)
        {
            units.push(tag);
        }
    }

    fn emit_open<S: Sink + ?Sized>(
        &self,
        cursor: &Cursor<'_>,
        window: &InputWindow,
        units: &mut Units<'_, S>,
    ) {
        let empty = Span::new(cursor.position(), cursor.position());
        match cursor.state() {
            State::Link => {
                let url = cursor.find_content(State::LinkUrl).unwrap_or(empty);
                units.push(LINK_OPEN);
                units.push_chars(window, url, Escaping::Attribute);
                units.push(ATTRIBUTE_END);
            }
            State::Image => {
                let url = cursor.find_content(State::ImageUrl).unwrap_or(empty);
                let alt = cursor.find_content(State::Image).unwrap_or(empty);
                units.push(IMAGE_OPEN);
                units.push_chars(window, url, Escaping::Attribute);
                units.push(IMAGE_ALT);
                units.push_chars(window, alt, Escaping::Attribute);
                units.push(self.flavor.image_end());
            }
            State::CodeBlock => match code_info(cursor) {
                Some(info) => {
                    units.push(CODE_BLOCK_OPEN_INFO);
                    units.push_chars(window, info, Escaping::Attribute);
                    units.push(ATTRIBUTE_END);
                }
                None => units.push(CODE_BLOCK_OPEN),
            },
            state => {
                if let Some(tag) = self.flavor.open_tag(state) {
                    units.push(tag);
                }
            }
        }
    }
}

/// Whether the entry at the cursor can be rendered with what is on the tape
/// and in the window.
fn is_ready(cursor: &Cursor<'_>, window: &InputWindow) -> bool {
    if cursor.position() > window.limit() {
        return false;
    }
    let copies = cursor.is_content_start() && cursor.state().copies_content();
    !copies || cursor.next_position().is_some_and(|next| next <= window.limit())
}

/// The info string of a fenced code block, which directly follows its
/// marker start.
fn code_info(cursor: &Cursor<'_>) -> Option<Span> {
    let next = cursor.peek(1)?;
    if next.state != State::CodeInfo || !next.is_content_start() {
        return None;
    }
    let end = cursor.peek(2)?.position;
    Some(Span::new(next.position, end))
}
