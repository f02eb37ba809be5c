//! # Line Parsers
//!
//! Grammars that own exactly one line per call and sit between the block
//! parsers and the inline machine:
//!
//! - [`parse_code_line`]: one verbatim `CodeLine` leaf
//! - [`QuoteLine`]: a `>` line and the paragraph it belongs to
//! - [`ListLevel`]: one depth of a list and the content of its current item
//!
//! They never look past the line they were given and leave the window just
//! after its terminator when they succeed.

mod code_line;
mod list_item;
mod quote_line;

pub use code_line::parse_code_line;
pub use list_item::{ListKind, ListLevel, Sub};
pub use quote_line::QuoteLine;

use crate::inline::{LineEnd, LineResult, parse_line};
use crate::lookahead::{Lookahead, line_end};
use crate::state::State;
use crate::tape::Tape;
use crate::window::InputWindow;

/// Parses inline text to the end of the line, keeping the line verbatim when
/// the inline machine cannot commit anything.
pub fn parse_text_line(window: &mut InputWindow, tape: &mut Tape) -> LineResult {
    match parse_line(window, tape, LineEnd::Terminator) {
        LineResult::Invalid => parse_unparsable_line(window, tape),
        other => other,
    }
}

/// Writes the rest of the line as one `Unparsable` leaf.
pub fn parse_unparsable_line(window: &mut InputWindow, tape: &mut Tape) -> LineResult {
    let start = window.position();
    let Lookahead::Found(end) = line_end(window, start) else {
        return LineResult::Void;
    };
    if tape.remaining() < 2 {
        return LineResult::Invalid;
    }
    tape.add_start_both(State::Unparsable, start);
    tape.add_stop_both(State::Unparsable, end + 1);
    window.set_position(end + 1);
    LineResult::Parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{outline, window};

    #[test]
    fn text_line_falls_back_to_unparsable() {
        let mut w = window("``\n");
        let mut tape = Tape::new();
        assert_eq!(parse_text_line(&mut w, &mut tape), LineResult::Parsed);
        assert_eq!(outline(&tape, &w), r#"Unparsable["``\n"]"#);
        assert_eq!(w.position(), 3);
    }

    #[test]
    fn unparsable_line_needs_room() {
        let mut w = window("abc\n");
        let mut tape = Tape::with_max_entries(1);
        assert_eq!(parse_unparsable_line(&mut w, &mut tape), LineResult::Invalid);
        assert_eq!(w.position(), 0);
    }
}
