use super::ParseResult;
use crate::checkpoint::Checkpoint;
use crate::inline::LineResult;
use crate::line::parse_text_line;
use crate::lookahead::{Lookahead, detect_blank_line, line_end};
use crate::state::State;
use crate::tape::Tape;
use crate::window::InputWindow;

/// Consecutive non-blank lines, closed by a blank line.
#[derive(Debug, Default)]
pub struct Paragraph {
    open: bool,
}

impl Paragraph {
    pub fn parse_next(&mut self, window: &mut InputWindow, tape: &mut Tape) -> ParseResult {
        if self.open {
            self.continue_paragraph(window, tape)
        } else {
            self.start(window, tape)
        }
    }

    fn start(&mut self, window: &mut InputWindow, tape: &mut Tape) -> ParseResult {
        let start = window.position();
        match detect_blank_line(window, start) {
            Lookahead::Insufficient => return ParseResult::Void,
            Lookahead::Found(_) => return ParseResult::Invalid,
            Lookahead::NotFound => {}
        }
        if line_end(window, start).is_insufficient() {
            return ParseResult::Void;
        }
        if tape.remaining() < 4 {
            return ParseResult::Invalid;
        }
        let checkpoint = Checkpoint::begin(window, tape);
        tape.reserve(2);
        tape.release(1);
        tape.add_start_both(State::Paragraph, start);
        match parse_text_line(window, tape) {
            LineResult::Parsed => {
                checkpoint.commit();
                self.open = true;
                ParseResult::Continue
            }
            _ => {
                checkpoint.rollback(window, tape);
                ParseResult::Invalid
            }
        }
    }

    fn continue_paragraph(&mut self, window: &mut InputWindow, tape: &mut Tape) -> ParseResult {
        let start = window.position();
        match detect_blank_line(window, start) {
            Lookahead::Insufficient => ParseResult::Void,
            Lookahead::Found(next) => {
                self.end_block(tape, start);
                window.set_position(next);
                ParseResult::End
            }
            Lookahead::NotFound => match parse_text_line(window, tape) {
                LineResult::Parsed => ParseResult::Continue,
                LineResult::Void => ParseResult::Void,
                _ => {
                    log::debug!("paragraph line at {start} did not fit, closing paragraph");
                    self.end_block(tape, start);
                    ParseResult::End
                }
            },
        }
    }

    pub fn end_block(&mut self, tape: &mut Tape, pos: usize) {
        if self.open {
            tape.release(1);
            tape.add_stop_both(State::Paragraph, pos);
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
    fn runs_until_blank_line() {
        let mut w = window("one\ntwo\n\nthree\n");
        let mut tape = Tape::new();
        let mut p = Paragraph::default();
        assert_eq!(p.parse_next(&mut w, &mut tape), ParseResult::Continue);
        assert_eq!(p.parse_next(&mut w, &mut tape), ParseResult::Continue);
        assert_eq!(p.parse_next(&mut w, &mut tape), ParseResult::End);
        assert_eq!(w.position(), 9);
        assert_well_nested(&tape);
        assert_eq!(outline(&tape, &w), r#"Paragraph["one\n""two\n"]"#);
    }

    #[test]
    fn end_block_closes_open_paragraph() {
        let mut w = window("text\n");
        let mut tape = Tape::new();
        let mut p = Paragraph::default();
        assert_eq!(p.parse_next(&mut w, &mut tape), ParseResult::Continue);
        assert_eq!(p.parse_next(&mut w, &mut tape), ParseResult::Void);
        p.end_block(&mut tape, 5);
        assert_eq!(tape.reserved(), 0);
        assert_eq!(outline(&tape, &w), r#"Paragraph["text\n"]"#);
    }

    #[test]
    fn blank_line_is_not_a_paragraph() {
        let mut w = window("  \n");
        let mut tape = Tape::new();
        assert_eq!(
            Paragraph::default().parse_next(&mut w, &mut tape),
            ParseResult::Invalid
        );
    }
}
