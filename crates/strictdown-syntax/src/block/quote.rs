use super::ParseResult;
use crate::checkpoint::Checkpoint;
use crate::inline::LineResult;
use crate::line::QuoteLine;
use crate::lookahead::{Lookahead, detect_blank_line, line_end, lookahead_quote_marker};
use crate::state::State;
use crate::tape::Tape;
use crate::window::InputWindow;

/// Consecutive `>` lines, closed by the first line without a marker. A
/// blank closing line is consumed with the quote.
#[derive(Debug, Default)]
pub struct QuoteBlock {
    open: bool,
    line: QuoteLine,
}

impl QuoteBlock {
    pub fn parse_next(&mut self, window: &mut InputWindow, tape: &mut Tape) -> ParseResult {
        if self.open {
            return match self.line.parse(window, tape) {
                LineResult::Parsed | LineResult::Blank => ParseResult::Continue,
                LineResult::Void => ParseResult::Void,
                LineResult::Invalid => {
                    let start = window.position();
                    self.end_block(tape, start);
                    if let Lookahead::Found(next) = detect_blank_line(window, start) {
                        window.set_position(next);
                    }
                    ParseResult::End
                }
            };
        }

        let start = window.position();
        if line_end(window, start).is_insufficient() {
            return ParseResult::Void;
        }
        match lookahead_quote_marker(window, start) {
            Lookahead::Found(_) => {}
            Lookahead::Insufficient => return ParseResult::Void,
            Lookahead::NotFound => return ParseResult::Invalid,
        }
        if tape.remaining() < 6 {
            return ParseResult::Invalid;
        }

        let checkpoint = Checkpoint::begin(window, tape);
        tape.reserve(2);
        tape.release(1);
        tape.add_start_both(State::Quote, start);
        self.line = QuoteLine::default();
        match self.line.parse(window, tape) {
            LineResult::Parsed | LineResult::Blank => {
                checkpoint.commit();
                self.open = true;
                ParseResult::Continue
            }
            _ => {
                checkpoint.rollback(window, tape);
                ParseResult::Void
            }
        }
    }

    pub fn end_block(&mut self, tape: &mut Tape, pos: usize) {
        if self.open {
            self.line.close(tape, pos);
            tape.release(1);
            tape.add_stop_both(State::Quote, pos);
            self.open = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assert_well_nested, outline, window};
    use pretty_assertions::assert_eq;

    #[test]
    fn quote_ends_at_unquoted_line() {
        let mut w = window("> a\n> b\n>\n> c\n\nafter\n");
        let mut tape = Tape::new();
        let mut quote = QuoteBlock::default();
        for _ in 0..4 {
            assert_eq!(quote.parse_next(&mut w, &mut tape), ParseResult::Continue);
        }
        assert_eq!(quote.parse_next(&mut w, &mut tape), ParseResult::End);
        assert_eq!(w.position(), 15);
        assert_eq!(tape.reserved(), 0);
        assert_well_nested(&tape);
        assert_eq!(
            outline(&tape, &w),
            r#"Quote[Paragraph["a\n""b\n"]Paragraph["c\n"]]"#
        );
    }

    #[test]
    fn plain_closing_line_is_left_for_the_next_block() {
        let mut w = window("> a
after
");
        let mut tape = Tape::new();
        let mut quote = QuoteBlock::default();
        assert_eq!(quote.parse_next(&mut w, &mut tape), ParseResult::Continue);
        assert_eq!(quote.parse_next(&mut w, &mut tape), ParseResult::End);
        assert_eq!(w.position(), 4);
        assert_eq!(outline(&tape, &w), r#"Quote[Paragraph["a\n"]]"#);
    }

    #[test]
    fn end_block_closes_inner_paragraph() {
        let mut w = window("> quote\n>\n");
        let mut tape = Tape::new();
        let mut quote = QuoteBlock::default();
        assert_eq!(quote.parse_next(&mut w, &mut tape), ParseResult::Continue);
        assert_eq!(quote.parse_next(&mut w, &mut tape), ParseResult::Continue);
        assert_eq!(quote.parse_next(&mut w, &mut tape), ParseResult::Void);
        quote.end_block(&mut tape, w.position());
        assert_eq!(outline(&tape, &w), r#"Quote[Paragraph["quote\n"]]"#);
        assert_eq!(tape.reserved(), 0);
    }

    #[test]
    fn not_a_quote() {
        let mut w = window("    > code\n");
        let mut tape = Tape::new();
        assert_eq!(
            QuoteBlock::default().parse_next(&mut w, &mut tape),
            ParseResult::Invalid
        );
    }
}
