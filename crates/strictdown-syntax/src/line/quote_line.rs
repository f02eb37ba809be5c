use crate::checkpoint::Checkpoint;
use crate::inline::LineResult;
use crate::line::parse_text_line;
use crate::lookahead::{Lookahead, detect_blank_line, line_end, lookahead_quote_marker};
use crate::state::State;
use crate::tape::Tape;
use crate::window::InputWindow;

/// One `>` line of a quote.
///
/// Consecutive non-empty quote lines share a paragraph; an empty `>` line
/// closes it. The quote region itself belongs to the caller.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QuoteLine {
    paragraph: bool,
}

impl QuoteLine {
    /// Whether the inner paragraph is open.
    pub fn in_paragraph(&self) -> bool {
        self.paragraph
    }

    /// Parses the quote line at the window position.
    ///
    /// Returns `Blank` for an empty quote line, `Invalid` when the line is not
    /// a quote line and `Void` when the line is incomplete or the tape has no
    /// room. Only `Parsed` and `Blank` consume input.
    pub fn parse(&mut self, window: &mut InputWindow, tape: &mut Tape) -> LineResult {
        let start = window.position();
        if line_end(window, start).is_insufficient() {
            return LineResult::Void;
        }
        let Lookahead::Found(content) = lookahead_quote_marker(window, start) else {
            return LineResult::Invalid;
        };
        if let Lookahead::Found(next) = detect_blank_line(window, content) {
            self.close(tape, start);
            window.set_position(next);
            return LineResult::Blank;
        }

        let checkpoint = Checkpoint::begin(window, tape);
        if !self.paragraph {
            if tape.remaining() < 4 {
                checkpoint.rollback(window, tape);
                return LineResult::Void;
            }
            tape.reserve(2);
            tape.release(1);
            tape.add_start_both(State::Paragraph, content);
        }
        window.set_position(content);
        match parse_text_line(window, tape) {
            LineResult::Parsed => {
                checkpoint.commit();
                self.paragraph = true;
                LineResult::Parsed
            }
            _ => {
                checkpoint.rollback(window, tape);
                LineResult::Void
            }
        }
    }

    /// Closes the inner paragraph, if open, at `pos`.
    pub fn close(&mut self, tape: &mut Tape, pos: usize) {
        if self.paragraph {
            tape.release(1);
            tape.add_stop_both(State::Paragraph, pos);
            self.paragraph = false;
        }
    }
}
