use crate::inline::LineResult;
use crate::lookahead::{Lookahead, line_end};
use crate::state::State;
use crate::tape::Tape;
use crate::window::InputWindow;

/// Writes the line at the window position as a `CodeLine` leaf whose content
/// starts at `from` and includes the terminator.
///
/// Returns `Invalid` without touching anything if the tape has no room for
/// the two entries.
pub fn parse_code_line(window: &mut InputWindow, tape: &mut Tape, from: usize) -> LineResult {
    let Lookahead::Found(end) = line_end(window, window.position()) else {
        return LineResult::Void;
    };
    if tape.remaining() < 2 {
        return LineResult::Invalid;
    }
    tape.add_start_both(State::CodeLine, from.min(end));
    tape.add_stop_both(State::CodeLine, end + 1);
    window.set_position(end + 1);
    LineResult::Parsed
}
