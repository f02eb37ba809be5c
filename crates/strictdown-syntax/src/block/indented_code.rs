use super::ParseResult;
use crate::inline::LineResult;
use crate::line::parse_code_line;
use crate::lookahead::{Lookahead, detect_blank_line, line_end, measure_indent, skip_columns};
use crate::state::State;
use crate::tape::Tape;
use crate::window::InputWindow;

/// Columns of indentation that make a line code.
const CODE_INDENT: usize = 4;

/// Lines indented by four or more columns.
///
/// The indentation is stripped; the block ends at the first blank or
/// less-indented line, which is left for the next block.
#[derive(Debug, Default)]
pub struct IndentedCode {
    open: bool,
}

impl IndentedCode {
    pub fn parse_next(&mut self, window: &mut InputWindow, tape: &mut Tape) -> ParseResult {
        let start = window.position();
        if line_end(window, start).is_insufficient() {
            return ParseResult::Void;
        }
        let is_code = match measure_indent(window, start) {
            Lookahead::Found(indent) => {
                indent.width >= CODE_INDENT
                    && detect_blank_line(window, start).found().is_none()
            }
            _ => false,
        };

        if !is_code {
            if self.open {
                self.end_block(tape, start);
                return ParseResult::End;
            }
            return ParseResult::Invalid;
        }

        if !self.open {
            if tape.remaining() < 4 {
                return ParseResult::Invalid;
            }
            tape.reserve(2);
            tape.release(1);
            tape.add_start_both(State::CodeBlock, start);
            self.open = true;
        }
        let from = skip_columns(window, start, CODE_INDENT);
        match parse_code_line(window, tape, from) {
            LineResult::Parsed => ParseResult::Continue,
            _ => ParseResult::Void,
        }
    }

    pub fn end_block(&mut self, tape: &mut Tape, pos: usize) {
        if self.open {
            tape.release(1);
            tape.add_stop_both(State::CodeBlock, pos);
            self.open = false;
        }
    }
}
