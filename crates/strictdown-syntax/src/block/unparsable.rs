use super::ParseResult;
use crate::inline::LineResult;
use crate::line::parse_unparsable_line;
use crate::tape::Tape;
use crate::window::InputWindow;

/// Catch-all: one whole line kept verbatim.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnparsableBlock;

impl UnparsableBlock {
    pub fn parse_next(&mut self, window: &mut InputWindow, tape: &mut Tape) -> ParseResult {
        match parse_unparsable_line(window, tape) {
            LineResult::Parsed => ParseResult::End,
            _ => {
                log::debug!("no tape room for an unparsable line at {}", window.position());
                ParseResult::Void
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{outline, window};

    #[test]
    fn keeps_line_verbatim() {
        let mut w = window("**odd\nnext\n");
        let mut tape = Tape::new();
        assert_eq!(UnparsableBlock.parse_next(&mut w, &mut tape), ParseResult::End);
        assert_eq!(outline(&tape, &w), r#"Unparsable["**odd\n"]"#);
    }

    #[test]
    fn void_without_room() {
        let mut w = window("x\n");
        let mut tape = Tape::with_max_entries(1);
        assert_eq!(UnparsableBlock.parse_next(&mut w, &mut tape), ParseResult::Void);
        assert_eq!(w.position(), 0);
    }
}
