use super::{ParseResult, block_indent};
use crate::chars::is_whitespace;
use crate::lookahead::{Lookahead, line_end};
use crate::state::State;
use crate::tape::Tape;
use crate::window::InputWindow;

/// `---`, `***` or `___`, optionally spaced out.
#[derive(Debug, Default, Clone, Copy)]
pub struct HorizontalRule;

impl HorizontalRule {
    pub fn parse_next(&mut self, window: &mut InputWindow, tape: &mut Tape) -> ParseResult {
        let start = window.position();
        let Lookahead::Found(end) = line_end(window, start) else {
            return ParseResult::Void;
        };
        if !is_rule_line(window, start, end) || tape.remaining() < 2 {
            return ParseResult::Invalid;
        }
        tape.add_start_both(State::HorizontalRule, start);
        tape.add_stop_both(State::HorizontalRule, end + 1);
        window.set_position(end + 1);
        ParseResult::End
    }
}

/// Whether `[start, end)` holds three or more of one rule character and
/// nothing but whitespace besides.
pub fn is_rule_line(window: &InputWindow, start: usize, end: usize) -> bool {
    let Some(first) = block_indent(window, start) else {
        return false;
    };
    let Some(rule) = window.get(first).filter(|c| matches!(c, '-' | '*' | '_')) else {
        return false;
    };
    let mut count = 0;
    for i in first..end {
        match window.get(i) {
            Some(c) if c == rule => count += 1,
            Some(c) if is_whitespace(c) => {}
            _ => return false,
        }
    }
    count >= 3
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::window;
    use rstest::rstest;

    #[rstest]
    #[case("---\n", true)]
    #[case(" * * *\n", true)]
    #[case("___  \n", true)]
    #[case("--\n", false)]
    #[case("-*-\n", false)]
    #[case("--- x\n", false)]
    #[case("    ---\n", false)]
    fn rule_lines(#[case] input: &str, #[case] expected: bool) {
        let w = window(input);
        let end = input.chars().count() - 1;
        assert_eq!(is_rule_line(&w, 0, end), expected);
    }

    #[test]
    fn consumes_whole_line() {
        let mut w = window("***\nx");
        let mut tape = Tape::new();
        assert_eq!(HorizontalRule.parse_next(&mut w, &mut tape), ParseResult::End);
        assert_eq!(w.position(), 4);
        assert_eq!(tape.len(), 2);
    }
}
