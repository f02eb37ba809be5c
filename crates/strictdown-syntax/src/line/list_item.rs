use crate::inline::LineResult;
use crate::line::{QuoteLine, parse_code_line, parse_text_line};
use crate::lookahead::{
    Lookahead, OrderedStyle, detect_blank_line, lookahead_ordered_marker,
    lookahead_unordered_marker, skip_columns,
};
use crate::state::State;
use crate::tape::Tape;
use crate::window::InputWindow;

/// Kind and marker style of one list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Ordered(OrderedStyle),
    Unordered(char),
}

impl Default for ListKind {
    fn default() -> Self {
        ListKind::Unordered('-')
    }
}

impl ListKind {
    pub fn state(self) -> State {
        match self {
            ListKind::Ordered(OrderedStyle::Decimal) => State::OrderedList,
            ListKind::Ordered(OrderedStyle::LowerAlpha) => State::OrderedListLowerAlpha,
            ListKind::Ordered(OrderedStyle::UpperAlpha) => State::OrderedListUpperAlpha,
            ListKind::Ordered(OrderedStyle::LowerRoman) => State::OrderedListLowerRoman,
            ListKind::Ordered(OrderedStyle::UpperRoman) => State::OrderedListUpperRoman,
            ListKind::Unordered(_) => State::UnorderedList,
        }
    }

    /// Columns past the marker column where item content continues.
    pub fn continuation(self) -> usize {
        match self {
            ListKind::Ordered(_) => 3,
            ListKind::Unordered(_) => 2,
        }
    }

    /// Looks for any list marker at `from`. Returns the kind it would start
    /// and the position after the marker.
    pub fn detect(window: &InputWindow, from: usize) -> Lookahead<(ListKind, usize)> {
        match lookahead_unordered_marker(window, from, None) {
            Lookahead::Found(m) => return Lookahead::Found((ListKind::Unordered(m.bullet), m.end)),
            Lookahead::Insufficient => return Lookahead::Insufficient,
            Lookahead::NotFound => {}
        }
        match lookahead_ordered_marker(window, from, None) {
            Lookahead::Found(m) => Lookahead::Found((ListKind::Ordered(m.style), m.end)),
            Lookahead::Insufficient => Lookahead::Insufficient,
            Lookahead::NotFound => Lookahead::NotFound,
        }
    }

    /// Looks for a marker of exactly this kind and style at `from`.
    pub fn marker_at(self, window: &InputWindow, from: usize) -> Lookahead<usize> {
        let found = match self {
            ListKind::Ordered(style) => {
                lookahead_ordered_marker(window, from, Some(style)).found().map(|m| m.end)
            }
            ListKind::Unordered(bullet) => {
                lookahead_unordered_marker(window, from, Some(bullet)).found().map(|m| m.end)
            }
        };
        match found {
            Some(end) => Lookahead::Found(end),
            None => Lookahead::NotFound,
        }
    }
}

/// What the current item is holding after its first line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Sub {
    #[default]
    None,
    /// Lines continuing the item's first text run.
    Text,
    /// A paragraph opened by text after a blank line or a nested block.
    SubParagraph,
    Code,
    Quote(QuoteLine),
    SubList,
}

/// One depth of a (possibly nested) list.
///
/// Tape entries owned by a level: the list region, the current `ListItem`,
/// and the region of its sub-construct. Each holds one reserved entry for its
/// closing stop.
#[derive(Debug, Default, Clone, Copy)]
pub struct ListLevel {
    pub kind: ListKind,
    /// Column of the marker of this list's items.
    pub marker_col: usize,
    pub sub: Sub,
}

impl ListLevel {
    /// Entries that must be free to open a level with a first text line.
    pub const OPEN_COST: usize = 6;

    /// Column from which lines continue the current item.
    pub fn threshold(&self) -> usize {
        self.marker_col + self.kind.continuation()
    }

    pub fn in_sub_paragraph(&self) -> bool {
        self.sub == Sub::SubParagraph
    }

    /// Opens the list and its first item at `at`. The caller checks
    /// [`OPEN_COST`](Self::OPEN_COST).
    pub fn open(kind: ListKind, marker_col: usize, tape: &mut Tape, at: usize) -> Self {
        tape.reserve(4);
        tape.release(2);
        tape.add_start_both(kind.state(), at);
        tape.add_start_both(State::ListItem, at);
        Self {
            kind,
            marker_col,
            sub: Sub::None,
        }
    }

    /// Closes the current item and opens the next one at `marker`.
    ///
    /// Returns false, touching nothing, if there is no room for the new item
    /// and its first line.
    pub fn next_item(&mut self, tape: &mut Tape, line_start: usize, marker: usize) -> bool {
        if tape.remaining() < 4 {
            return false;
        }
        self.close_sub(tape, line_start);
        tape.release(1);
        tape.add_stop_both(State::ListItem, line_start);
        tape.reserve(2);
        tape.release(1);
        tape.add_start_both(State::ListItem, marker);
        true
    }

    /// Parses the first line of an item, after its marker.
    pub fn first_line(&mut self, window: &mut InputWindow, tape: &mut Tape) -> LineResult {
        if let Lookahead::Found(next) = detect_blank_line(window, window.position()) {
            window.set_position(next);
            self.sub = Sub::None;
            return LineResult::Blank;
        }
        self.sub = Sub::Text;
        parse_text_line(window, tape)
    }

    /// Continues the item with a text line at `content`.
    pub fn text_line(
        &mut self,
        window: &mut InputWindow,
        tape: &mut Tape,
        content: usize,
    ) -> LineResult {
        if !matches!(self.sub, Sub::Text | Sub::SubParagraph) {
            if tape.remaining() < 4 {
                return LineResult::Void;
            }
            self.close_sub(tape, content);
            tape.reserve(2);
            tape.release(1);
            tape.add_start_both(State::Paragraph, content);
            self.sub = Sub::SubParagraph;
        }
        window.set_position(content);
        parse_text_line(window, tape)
    }

    /// Continues the item with an indented code line starting at `line_start`.
    pub fn code_line(
        &mut self,
        window: &mut InputWindow,
        tape: &mut Tape,
        line_start: usize,
    ) -> LineResult {
        if self.sub != Sub::Code {
            if tape.remaining() < 4 {
                return LineResult::Void;
            }
            self.close_sub(tape, line_start);
            tape.reserve(2);
            tape.release(1);
            tape.add_start_both(State::CodeBlock, line_start);
            self.sub = Sub::Code;
        }
        let from = skip_columns(window, line_start, self.threshold() + 4);
        match parse_code_line(window, tape, from) {
            LineResult::Invalid => LineResult::Void,
            other => other,
        }
    }

    /// Continues the item with a quote line whose `>` is at `marker`.
    pub fn quote_line(
        &mut self,
        window: &mut InputWindow,
        tape: &mut Tape,
        marker: usize,
    ) -> LineResult {
        let line_start = window.position();
        if !matches!(self.sub, Sub::Quote(_)) {
            if tape.remaining() < 6 {
                return LineResult::Void;
            }
            self.close_sub(tape, line_start);
            tape.reserve(2);
            tape.release(1);
            tape.add_start_both(State::Quote, marker);
            self.sub = Sub::Quote(QuoteLine::default());
        }
        let Sub::Quote(mut quote) = self.sub else {
            return LineResult::Invalid;
        };
        window.set_position(marker);
        let result = quote.parse(window, tape);
        if result == LineResult::Void {
            window.set_position(line_start);
        }
        self.sub = Sub::Quote(quote);
        result
    }

    /// Closes whatever the current item is holding.
    pub fn close_sub(&mut self, tape: &mut Tape, pos: usize) {
        match self.sub {
            Sub::SubParagraph => {
                tape.release(1);
                tape.add_stop_both(State::Paragraph, pos);
            }
            Sub::Code => {
                tape.release(1);
                tape.add_stop_both(State::CodeBlock, pos);
            }
            Sub::Quote(mut quote) => {
                quote.close(tape, pos);
                tape.release(1);
                tape.add_stop_both(State::Quote, pos);
            }
            Sub::None | Sub::Text | Sub::SubList => {}
        }
        self.sub = Sub::None;
    }

    /// Closes the current item and the list.
    pub fn close(&mut self, tape: &mut Tape, pos: usize) {
        self.close_sub(tape, pos);
        tape.release(2);
        tape.add_stop_both(State::ListItem, pos);
        tape.add_stop_both(self.kind.state(), pos);
    }
}
