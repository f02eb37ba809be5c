use super::{ParseResult, block_indent};
use crate::chars::{SENTINEL, is_identifier, is_whitespace};
use crate::inline::LineResult;
use crate::line::parse_code_line;
use crate::lookahead::{Lookahead, line_end};
use crate::state::State;
use crate::tape::Tape;
use crate::window::InputWindow;

/// An opening or closing fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fence {
    ch: char,
    len: usize,
    /// Position after the fence run.
    after: usize,
}

/// Three or more backticks or tildes, at most three columns in.
fn fence_at(window: &InputWindow, start: usize) -> Option<Fence> {
    let first = block_indent(window, start)?;
    let ch = window.get(first).filter(|c| matches!(c, '`' | '~'))?;
    let mut after = first;
    while window.get(after) == Some(ch) {
        after += 1;
    }
    let len = after - first;
    (len >= 3).then_some(Fence { ch, len, after })
}

/// Whether the line at `start` opens a fence.
pub(super) fn opens_fence(window: &InputWindow, start: usize) -> bool {
    fence_at(window, start).is_some()
}

/// Code between ```` ``` ```` or `~~~` fences.
///
/// Lines are copied verbatim. The block ends at a fence of the same character
/// at least as long as the opening one, or at the end of input.
#[derive(Debug, Default)]
pub struct FencedCode {
    open: Option<Fence>,
}

impl FencedCode {
    pub fn parse_next(&mut self, window: &mut InputWindow, tape: &mut Tape) -> ParseResult {
        match self.open {
            Some(fence) => self.continue_block(window, tape, fence),
            None => self.start(window, tape),
        }
    }

    fn start(&mut self, window: &mut InputWindow, tape: &mut Tape) -> ParseResult {
        let start = window.position();
        let Lookahead::Found(end) = line_end(window, start) else {
            return ParseResult::Void;
        };
        let Some(fence) = fence_at(window, start) else {
            return ParseResult::Invalid;
        };

        let mut info_start = fence.after;
        while info_start < end && window.get(info_start).is_some_and(is_whitespace) {
            info_start += 1;
        }
        let mut info_end = info_start;
        while info_end < end && window.get(info_end).is_some_and(is_identifier) {
            info_end += 1;
        }
        let has_info = info_end > info_start;

        let open = if has_info { 4 } else { 2 };
        if tape.remaining() < open + 2 + 2 {
            return ParseResult::Invalid;
        }
        tape.reserve(open + 2);
        tape.release(open);
        tape.add_start(State::CodeBlock, start);
        if has_info {
            tape.add_start_both(State::CodeInfo, info_start);
            tape.add_stop_both(State::CodeInfo, info_end);
        }
        tape.add_start_content(State::CodeBlock, end + 1);
        window.set_position(end + 1);
        self.open = Some(fence);

        if window.get(end) == Some(SENTINEL) {
            self.end_block(tape, end + 1);
            return ParseResult::End;
        }
        ParseResult::Continue
    }

    fn continue_block(
        &mut self,
        window: &mut InputWindow,
        tape: &mut Tape,
        fence: Fence,
    ) -> ParseResult {
        let start = window.position();
        let Lookahead::Found(end) = line_end(window, start) else {
            return ParseResult::Void;
        };
        if start == end && window.get(end) == Some(SENTINEL) {
            self.close(tape, start, end + 1);
            window.set_position(end + 1);
            return ParseResult::End;
        }
        if let Some(closing) = fence_at(window, start)
            && closing.ch == fence.ch
            && closing.len >= fence.len
            && (closing.after..end).all(|i| window.get(i).is_some_and(is_whitespace))
        {
            self.close(tape, start, end + 1);
            window.set_position(end + 1);
            return ParseResult::End;
        }
        match parse_code_line(window, tape, start) {
            LineResult::Parsed => ParseResult::Continue,
            _ => ParseResult::Void,
        }
    }

    fn close(&mut self, tape: &mut Tape, content_end: usize, stop: usize) {
        if self.open.take().is_some() {
            tape.release(2);
            tape.add_stop_content(State::CodeBlock, content_end);
            tape.add_stop(State::CodeBlock, stop);
        }
    }

    pub fn end_block(&mut self, tape: &mut Tape, pos: usize) {
        self.close(tape, pos, pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assert_well_nested, outline, window};
    use pretty_assertions::assert_eq;

    fn run(input: &str) -> (Vec<ParseResult>, String) {
        let mut w = window(input);
        w.end_of_input();
        let mut tape = Tape::new();
        let mut code = FencedCode::default();
        let mut results = Vec::new();
        loop {
            let result = code.parse_next(&mut w, &mut tape);
            results.push(result);
            if result != ParseResult::Continue {
                break;
            }
        }
        assert_eq!(tape.reserved(), 0);
        assert_well_nested(&tape);
        (results, outline(&tape, &w))
    }

    #[test]
    fn copies_lines_verbatim() {
        let (results, outline) = run("```rust\nlet *x* = 1;\n\n```\nafter\n");
        assert_eq!(results.last(), Some(&ParseResult::End));
        assert_eq!(
            outline,
            r#"CodeBlock[CodeInfo["rust"]CodeLine["let *x* = 1;\n"]CodeLine["\n"]]"#
        );
    }

    #[test]
    fn closing_fence_must_match() {
        let (_, outline) = run("~~~~\n```\n~~~\n~~~~~\n");
        assert_eq!(outline, r#"CodeBlock[CodeLine["```\n"]CodeLine["~~~\n"]]"#);
    }

    #[test]
    fn end_of_input_closes_block() {
        let (results, outline) = run("```\ncode\n");
        assert_eq!(results.last(), Some(&ParseResult::End));
        assert_eq!(outline, r#"CodeBlock[CodeLine["code\n"]]"#);
    }

    #[test]
    fn info_string_stops_at_non_identifier() {
        let (_, outline) = run("``` c++ {x}\n```\n");
        assert_eq!(outline, r#"CodeBlock[CodeInfo["c++"]]"#);
    }

    #[test]
    fn two_backticks_are_not_a_fence() {
        let mut w = window("``\n");
        let mut tape = Tape::new();
        assert_eq!(
            FencedCode::default().parse_next(&mut w, &mut tape),
            ParseResult::Invalid
        );
    }
}
