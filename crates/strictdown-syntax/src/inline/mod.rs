//! # Inline Text Machine
//!
//! Parses the free text of one line into nested inline regions. Block and
//! line parsers call [`parse_line`] once per line after they have consumed
//! the line's block syntax (`# `, `> `, a list marker).
//!
//! ## Dispatch
//!
//! The machine looks at the current character plus two characters of
//! lookahead. Closers are checked before openers and only the construct on
//! top of the stack may close.
//!
//! | Chars | Construct | Opens when |
//! |-------|-----------|------------|
//! | `~~` | strikethrough | not followed by `~` or whitespace |
//! | `**` | bold | not followed by whitespace |
//! | `*` | italic | not followed by `*` or whitespace |
//! | `__` | underline | not followed by whitespace |
//! | `` ` `` | inline code | not followed by `` ` `` (`` `` `` is dropped) |
//! | `[` | link | not followed by whitespace, not inside a link |
//! | `![` `!(` | image | not inside a link |
//! | `\` + space | hard break | rolled back if non-space follows |
//! | `\` + char | escape | always |
//!
//! ## Leaves
//!
//! Copyable text lives in `Text` or `Unparsable` leaves that never contain
//! other entries. The running leaf is closed before any construct opens and
//! a new one is opened lazily by the next plain character.
//!
//! ## Admission Control
//!
//! A construct opens only if the tape has room for its opening entries, its
//! closing entries, a text leaf inside and a text leaf after it. The closing
//! entries and the trailing leaf are reserved until the construct closes.
//! When the check fails the rest of the line becomes one `Unparsable` leaf,
//! so the tape stays well nested however small its ceiling.
//!
//! ## Rollback
//!
//! Links and images that are still open at the end of the line are removed
//! from the tape with everything nested in them, and the line is rescanned
//! from just after the opening bracket with the bracket as plain text.

mod stack;

use crate::chars::{is_blank, is_line_terminator, is_whitespace};
use crate::lookahead::{Lookahead, line_end};
use crate::state::State;
use crate::tape::{Entry, Flags, Tape};
use crate::window::InputWindow;

use stack::{Frame, Kind, Stack};

/// Entries needed to open and close one text leaf.
const LEAF: usize = 2;

/// Where the line parsed by [`parse_line`] stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnd {
    /// At the next line terminator, which is included in the last text region
    /// and consumed.
    Terminator,
    /// At this position, which is not consumed. Used for heading content.
    At(usize),
}

/// Outcome of parsing one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineResult {
    /// The line terminator is not in the window yet.
    Void,
    /// The line is empty.
    Blank,
    /// Nothing could be committed to the tape.
    Invalid,
    Parsed,
}

/// Parses the text between the window position and `end`.
///
/// On [`LineResult::Parsed`] the window is left after the line. For every
/// other result neither the window nor the tape is touched.
pub fn parse_line(window: &mut InputWindow, tape: &mut Tape, end: LineEnd) -> LineResult {
    let start = window.position();
    let (limit, terminated) = match end {
        LineEnd::Terminator => match line_end(window, start) {
            Lookahead::Found(t) => (t, true),
            _ => return LineResult::Void,
        },
        LineEnd::At(pos) => (pos, false),
    };
    if limit <= start {
        return LineResult::Blank;
    }
    if tape.remaining() < LEAF {
        log::debug!("no tape room for a line at {start}");
        return LineResult::Invalid;
    }

    let mut machine = Machine {
        window: &*window,
        tape,
        stack: Stack::default(),
        leaf: None,
        committed: false,
        limit,
    };
    if !machine.run(start, terminated) {
        return LineResult::Invalid;
    }
    window.set_position(if terminated { limit + 1 } else { limit });
    LineResult::Parsed
}

struct Machine<'a> {
    window: &'a InputWindow,
    tape: &'a mut Tape,
    stack: Stack,
    /// Open `Text` or `Unparsable` leaf.
    leaf: Option<State>,
    /// Whether anything was written for this line.
    committed: bool,
    /// Position of the line end.
    limit: usize,
}

impl Machine<'_> {
    fn run(&mut self, start: usize, terminated: bool) -> bool {
        let mut i = start;
        loop {
            while i < self.limit {
                i = self.step(i);
            }
            match self.stack.link_index() {
                Some(index) => i = self.abandon(index),
                None => break,
            }
        }
        if !self.committed {
            return false;
        }
        self.finish(terminated);
        true
    }

    /// Character at `i`, with everything past the line end reading as a
    /// newline.
    fn at(&self, i: usize) -> char {
        if i < self.limit {
            self.window.get(i).unwrap_or('\n')
        } else {
            '\n'
        }
    }

    fn step(&mut self, i: usize) -> usize {
        if self.leaf == Some(State::Unparsable) {
            return self.limit;
        }
        let c = self.at(i);
        if let Some(top) = self.stack.top() {
            match top.kind {
                Kind::Code if c == '`' => return self.close(i, 1),
                Kind::Link { url: true } | Kind::Image { url: true } if c == ')' => {
                    return self.close_url(i);
                }
                Kind::Image { url: false } if c == ']' => return self.end_alt(i),
                Kind::HardBreak if is_whitespace(c) => return i + 1,
                Kind::HardBreak => return self.drop_hard_break(),
                kind if kind.is_raw() => return i + 1,
                _ => {}
            }
        }
        if let Some(next) = self.try_close(i, c) {
            return next;
        }
        if let Some(next) = self.try_open(i, c) {
            return next;
        }
        self.plain(i, c)
    }

    fn try_close(&mut self, i: usize, c: char) -> Option<usize> {
        let top = self.stack.top()?;
        let next = self.at(i + 1);
        match top.kind {
            Kind::Strikethrough if c == '~' && next == '~' => Some(self.close(i, 2)),
            Kind::Bold if c == '*' && next == '*' => Some(self.close(i, 2)),
            Kind::Italic if c == '*' && (next != '*' || self.stack.contains(State::Bold)) => {
                Some(self.close(i, 1))
            }
            Kind::Underline if c == '_' && next == '_' => Some(self.close(i, 2)),
            Kind::Link { url: false } if c == ']' => {
                if next == '(' {
                    Some(self.begin_url(i, State::Link, State::LinkUrl))
                } else {
                    Some(self.abandon(self.stack.len() - 1))
                }
            }
            _ => None,
        }
    }

    fn try_open(&mut self, i: usize, c: char) -> Option<usize> {
        let next = self.at(i + 1);
        let after = self.at(i + 2);
        let in_link = self.stack.link_index().is_some();
        // (kind, open entries, close entries, delimiter width)
        let (kind, open, close, width) = match c {
            '~' if next == '~' && after != '~' && !is_blank(after) => {
                (Some(Kind::Strikethrough), 2, 2, 2)
            }
            '*' if next == '*' && !is_blank(after) => (Some(Kind::Bold), 2, 2, 2),
            '*' if next != '*' && !is_blank(next) => (Some(Kind::Italic), 2, 2, 1),
            '_' if next == '_' && !is_blank(after) => (Some(Kind::Underline), 2, 2, 2),
            '`' if next == '`' => {
                if self.leaf.is_some() && self.tape.remaining() < LEAF {
                    return None;
                }
                self.close_leaf(i);
                return Some(i + 2);
            }
            '`' if !is_line_terminator(next) => (Some(Kind::Code), 2, 2, 1),
            '[' if !is_blank(next) && !in_link => (Some(Kind::Link { url: false }), 2, 6, 1),
            '!' if next == '[' && !in_link => (Some(Kind::Image { url: false }), 2, 6, 2),
            '!' if next == '(' && !in_link => (Some(Kind::Image { url: true }), 4, 3, 2),
            '\\' if is_blank(next) => (Some(Kind::HardBreak), 1, 1, 1),
            '\\' => (None, 3, 0, 2),
            _ => return None,
        };

        let Some(kind) = kind else {
            return Some(self.escape(i));
        };
        if self.stack.contains(kind.state()) || self.stack.is_full() {
            return None;
        }
        if self.tape.remaining() < open + close + 2 * LEAF {
            return self.degrade(i);
        }

        self.close_leaf(i);
        self.tape.reserve(open + close + LEAF);
        self.tape.release(open);
        let state = kind.state();
        match kind {
            Kind::Image { url: true } => {
                self.tape.add_start(State::Image, i);
                self.tape
                    .add(Entry::new(State::Image, Flags::CONTENT_START | Flags::CONTENT_STOP, i + 1));
                self.tape.add_start(State::ImageUrl, i + 1);
                self.tape.add_start_content(State::ImageUrl, i + 2);
            }
            Kind::HardBreak => self.tape.add_start_both(state, i),
            _ => {
                self.tape.add_start(state, i);
                self.tape.add_start_content(state, i + width);
            }
        }
        self.stack.push(Frame {
            kind,
            start: i,
            reserved: close + LEAF,
        });
        self.committed = true;
        Some(i + width)
    }

    /// `\x` becomes a three-entry escape region.
    fn escape(&mut self, i: usize) -> usize {
        if self.tape.remaining() < 3 + LEAF {
            return self.degrade(i).unwrap_or_else(|| self.plain(i, '\\'));
        }
        self.close_leaf(i);
        self.tape.add_start(State::Escape, i);
        self.tape.add_start_content(State::Escape, i + 1);
        self.tape.add_stop_both(State::Escape, i + 2);
        self.committed = true;
        i + 2
    }

    /// Falls back to an `Unparsable` leaf running to the line end.
    ///
    /// Returns `None` when even that does not fit, leaving the character to
    /// be handled as plain text.
    fn degrade(&mut self, i: usize) -> Option<usize> {
        if self.tape.remaining() < LEAF {
            log::debug!("tape exhausted at {i}, keeping markup as text");
            return None;
        }
        log::debug!("tape nearly full at {i}, rest of line is unparsable");
        self.close_leaf(i);
        self.open_leaf(State::Unparsable, i);
        Some(self.limit)
    }

    fn plain(&mut self, i: usize, c: char) -> usize {
        if self.leaf.is_none() {
            let leading = !self.committed && self.stack.is_empty() && is_whitespace(c);
            if !leading && !self.open_leaf(State::Text, i) {
                log::warn!("no tape room for text at {i}, character dropped");
            }
        }
        i + 1
    }

    fn open_leaf(&mut self, state: State, at: usize) -> bool {
        if !self.tape.reserve(LEAF) {
            return false;
        }
        self.tape.release(1);
        self.tape.add_start_both(state, at);
        self.leaf = Some(state);
        self.committed = true;
        true
    }

    fn close_leaf(&mut self, at: usize) {
        if let Some(state) = self.leaf.take() {
            self.tape.release(1);
            self.tape.add_stop_both(state, at);
        }
    }

    /// Closes the top construct at its `width`-character closer. A construct
    /// with no content collapses to nothing.
    fn close(&mut self, i: usize, width: usize) -> usize {
        let Some(frame) = self.stack.pop() else {
            return i + width;
        };
        self.close_leaf(i);
        self.tape.release(frame.reserved);
        let state = frame.state();
        let empty = self.tape.last().is_some_and(|e| {
            e.state == state
                && e.flags == Flags::CONTENT_START
                && (e.position == i || !frame.kind.is_raw())
        });
        if !(empty && self.tape.rollback_last_marker_or_content_start(state)) {
            self.tape.add_stop_content(state, i);
            self.tape.add_stop(state, i + width);
        }
        i + width
    }

    /// `](` ends link text or image alt and starts the URL.
    fn begin_url(&mut self, i: usize, owner: State, url: State) -> usize {
        self.close_leaf(i);
        if let Some(frame) = self.stack.top_mut() {
            frame.kind = match frame.kind {
                Kind::Link { .. } => Kind::Link { url: true },
                _ => Kind::Image { url: true },
            };
            frame.reserved -= 3;
        }
        self.tape.release(3);
        self.tape.add_stop_content(owner, i);
        self.tape.add_start(url, i + 1);
        self.tape.add_start_content(url, i + 2);
        i + 2
    }

    fn end_alt(&mut self, i: usize) -> usize {
        if self.at(i + 1) == '(' {
            self.begin_url(i, State::Image, State::ImageUrl)
        } else {
            self.abandon(self.stack.len() - 1)
        }
    }

    /// `)` closes the URL and its owning link or image.
    fn close_url(&mut self, i: usize) -> usize {
        let Some(frame) = self.stack.pop() else {
            return i + 1;
        };
        self.tape.release(frame.reserved);
        let url = match frame.kind {
            Kind::Link { .. } => State::LinkUrl,
            _ => State::ImageUrl,
        };
        self.tape.add_stop_content(url, i);
        self.tape.add_stop(url, i + 1);
        self.tape.add_stop(frame.state(), i + 1);
        i + 1
    }

    /// Removes the construct at `index` and everything above it, and resumes
    /// with its opening delimiter as text.
    fn abandon(&mut self, index: usize) -> usize {
        let Some(frame) = self.stack.get(index) else {
            return self.limit;
        };
        if let Some(state) = self.leaf.take() {
            log::trace!("dropping open {state:?} leaf");
            self.tape.release(1);
        }
        while self.stack.len() > index {
            if let Some(popped) = self.stack.pop() {
                self.tape.release(popped.reserved);
            }
        }
        self.tape.rollback_state(frame.state());
        self.open_leaf(State::Text, frame.start);
        frame.start + 1
    }

    /// A hard break followed by more text on the line was a literal `\`.
    fn drop_hard_break(&mut self) -> usize {
        let Some(frame) = self.stack.pop() else {
            return self.limit;
        };
        self.tape.release(frame.reserved);
        self.tape.rollback_last_marker_or_content_start(State::HardBreak);
        self.open_leaf(State::Text, frame.start);
        frame.start + 1
    }

    fn finish(&mut self, terminated: bool) {
        if let Some(top) = self.stack.top()
            && top.kind == Kind::HardBreak
        {
            self.stack.pop();
            self.tape.release(top.reserved);
            self.tape.add_stop_both(State::HardBreak, self.limit);
        }
        let close_at = if terminated { self.limit + 1 } else { self.limit };
        let raw_top = self.stack.top().is_some_and(|f| f.kind == Kind::Code);
        if terminated && !raw_top && self.leaf.is_none() {
            self.open_leaf(State::Text, self.limit);
        }
        self.close_leaf(close_at);
        while let Some(frame) = self.stack.pop() {
            self.tape.release(frame.reserved);
            self.tape.add_stop_both(frame.state(), close_at);
        }
    }
}
