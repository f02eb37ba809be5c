use super::fenced_code::opens_fence;
use super::{ParseResult, block_indent, is_rule_line};
use crate::chars::{SENTINEL, is_line_terminator, is_whitespace};
use crate::inline::{LineEnd, parse_line};
use crate::line::ListKind;
use crate::lookahead::{Lookahead, detect_blank_line, line_end, lookahead_quote_marker};
use crate::span::Span;
use crate::state::State;
use crate::tape::Tape;
use crate::window::InputWindow;

/// Entries a heading needs: its four boundaries and one text leaf.
const HEADING_COST: usize = 6;

/// `# Title`, up to six hashes, with an optional closing hash run.
#[derive(Debug, Default, Clone, Copy)]
pub struct AtxHeading;

impl AtxHeading {
    pub fn parse_next(&mut self, window: &mut InputWindow, tape: &mut Tape) -> ParseResult {
        let start = window.position();
        let Lookahead::Found(end) = line_end(window, start) else {
            return ParseResult::Void;
        };
        let Some(first) = block_indent(window, start) else {
            return ParseResult::Invalid;
        };
        let Some(level) = atx_level(window, first) else {
            return ParseResult::Invalid;
        };
        if tape.remaining() < HEADING_COST {
            return ParseResult::Invalid;
        }
        let after = first + level;

        let content = trim_closing_hashes(window, trim(window, Span::new(after, end)));
        write_heading(window, tape, State::heading(level), start, content, end + 1);
        ParseResult::End
    }
}

/// A line of text underlined by `===` (level 1) or `---` (level 2).
#[derive(Debug, Default, Clone, Copy)]
pub struct SetextHeading;

impl SetextHeading {
    pub fn parse_next(&mut self, window: &mut InputWindow, tape: &mut Tape) -> ParseResult {
        let start = window.position();
        let Lookahead::Found(first_end) = line_end(window, start) else {
            return ParseResult::Void;
        };
        if window.get(first_end) == Some(SENTINEL)
            || detect_blank_line(window, start).found().is_some()
            || opens_other_block(window, start, first_end)
        {
            return ParseResult::Invalid;
        }
        let Lookahead::Found(second_end) = line_end(window, first_end + 1) else {
            return ParseResult::Void;
        };
        let Some(level) = underline_level(window, first_end + 1, second_end) else {
            return ParseResult::Invalid;
        };
        if tape.remaining() < HEADING_COST {
            return ParseResult::Invalid;
        }

        let content = trim(window, Span::new(start, first_end));
        write_heading(window, tape, State::heading(level), start, content, second_end + 1);
        ParseResult::End
    }
}

/// Level of an ATX opener at `first`: one to six `#` followed by whitespace
/// or the line end.
fn atx_level(window: &InputWindow, first: usize) -> Option<usize> {
    let mut level = 0;
    while window.get(first + level) == Some('#') {
        level += 1;
    }
    let spaced = window
        .get(first + level)
        .is_some_and(|c| is_whitespace(c) || is_line_terminator(c));
    ((1..=6).contains(&level) && spaced).then_some(level)
}

/// Whether the line at `start` belongs to another grammar, so an underline
/// below it cannot make it a heading.
fn opens_other_block(window: &InputWindow, start: usize, end: usize) -> bool {
    let Some(first) = block_indent(window, start) else {
        return true;
    };
    is_rule_line(window, start, end)
        || underline_level(window, start, end).is_some()
        || atx_level(window, first).is_some()
        || opens_fence(window, start)
        || lookahead_quote_marker(window, start).found().is_some()
        || ListKind::detect(window, first).found().is_some()
}

/// Heading level of an underline: three or more `=` or `-` from the start of
/// the line, then only whitespace.
fn underline_level(window: &InputWindow, start: usize, end: usize) -> Option<usize> {
    let rule = window.get(start).filter(|c| matches!(c, '=' | '-'))?;
    let mut run = start;
    while run < end && window.get(run) == Some(rule) {
        run += 1;
    }
    let rest_blank = (run..end).all(|i| window.get(i).is_some_and(is_whitespace));
    if run - start < 3 || !rest_blank {
        return None;
    }
    Some(if rule == '=' { 1 } else { 2 })
}

fn trim(window: &InputWindow, span: Span) -> Span {
    let mut start = span.start;
    let mut end = span.end;
    while start < end && window.get(start).is_some_and(is_whitespace) {
        start += 1;
    }
    while end > start && window.get(end - 1).is_some_and(is_whitespace) {
        end -= 1;
    }
    Span::new(start, end)
}

/// Drops a closing `#` run that is separated from the text by whitespace.
fn trim_closing_hashes(window: &InputWindow, span: Span) -> Span {
    let mut run = span.end;
    while run > span.start && window.get(run - 1) == Some('#') {
        run -= 1;
    }
    if run == span.end {
        return span;
    }
    if run == span.start || window.get(run - 1).is_some_and(is_whitespace) {
        return trim(window, Span::new(span.start, run));
    }
    span
}

/// Writes the heading's boundaries around its inline content. `stop` is
/// where the heading's marker region ends and where the window is left.
fn write_heading(
    window: &mut InputWindow,
    tape: &mut Tape,
    state: State,
    start: usize,
    content: Span,
    stop: usize,
) {
    tape.reserve(4);
    tape.release(2);
    tape.add_start(state, start);
    tape.add_start_content(state, content.start);
    window.set_position(content.start);
    // An empty heading has no inline content; a full tape leaves it bare.
    let _ = parse_line(window, tape, LineEnd::At(content.end));
    tape.release(2);
    tape.add_stop_content(state, content.end);
    tape.add_stop(state, stop);
    window.set_position(stop);
}
