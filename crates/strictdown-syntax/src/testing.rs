//! Helpers shared by the unit tests of this crate.

use std::collections::HashMap;

use crate::span::Span;
use crate::state::State;
use crate::tape::Tape;
use crate::window::InputWindow;

pub fn window(input: &str) -> InputWindow {
    let mut w = InputWindow::new();
    w.push_str(input);
    w
}

/// Compact bracketed view of a tape: `Bold["text"]`.
///
/// `Text` leaves print only their quoted content. Raw sub-regions (URLs,
/// alt text, code info) print their content too.
pub fn outline(tape: &Tape, window: &InputWindow) -> String {
    let mut out = String::new();
    for (index, entry) in tape.iter().enumerate() {
        let shown = entry.state != State::Text;
        if entry.is_marker_start() && shown {
            out.push_str(&format!("{:?}[", entry.state));
        }
        let raw = entry.state.copies_content()
            || matches!(
                entry.state,
                State::LinkUrl | State::ImageUrl | State::Image | State::CodeInfo
            );
        if raw
            && entry.is_content_start()
            && !entry.is_content_stop()
            && index + 1 < tape.len()
        {
            let span = Span::new(entry.position, tape.get(index + 1).position);
            out.push_str(&format!("{:?}", window.text(span)));
        }
        if entry.is_marker_stop() && shown {
            out.push(']');
        }
    }
    out
}

/// Asserts every state's flags read in order are balanced and never close
/// something that is not open.
pub fn assert_well_nested(tape: &Tape) {
    let mut markers: HashMap<State, isize> = HashMap::new();
    let mut contents: HashMap<State, isize> = HashMap::new();
    for entry in tape.iter() {
        let m = markers.entry(entry.state).or_default();
        if entry.is_marker_start() {
            *m += 1;
        }
        if entry.is_marker_stop() {
            *m -= 1;
        }
        assert!(*m >= 0, "unmatched marker stop: {entry:?}\n{}", tape.dump());
        let c = contents.entry(entry.state).or_default();
        if entry.is_content_start() {
            *c += 1;
        }
        if entry.is_content_stop() {
            *c -= 1;
        }
        assert!(*c >= 0, "unmatched content stop: {entry:?}\n{}", tape.dump());
    }
    for (state, open) in markers.iter().chain(contents.iter()) {
        assert_eq!(*open, 0, "{state:?} left open\n{}", tape.dump());
    }
}
