use super::ParseResult;
use crate::chars::SENTINEL;
use crate::inline::LineResult;
use crate::line::{ListKind, ListLevel, Sub};
use crate::lookahead::{
    Indent, Lookahead, detect_blank_line, line_end, lookahead_ordered_marker, lookahead_quote_marker,
    lookahead_unordered_marker, measure_indent,
};
use crate::tape::Tape;
use crate::window::InputWindow;

/// Deepest nesting of lists inside one another.
const MAX_LEVELS: usize = 5;

/// Ordered or unordered list, with items that may hold paragraphs, code,
/// quotes and nested lists.
///
/// Which marker family starts the list is fixed at construction; the
/// numbering style or bullet character is fixed by the first item.
#[derive(Debug)]
pub struct List {
    ordered: bool,
    levels: [ListLevel; MAX_LEVELS],
    depth: usize,
    /// A blank line was seen inside the current item.
    blank_pending: bool,
}

impl List {
    pub fn ordered() -> Self {
        Self::new(true)
    }

    pub fn unordered() -> Self {
        Self::new(false)
    }

    fn new(ordered: bool) -> Self {
        Self {
            ordered,
            levels: [ListLevel::default(); MAX_LEVELS],
            depth: 0,
            blank_pending: false,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn parse_next(&mut self, window: &mut InputWindow, tape: &mut Tape) -> ParseResult {
        if self.depth == 0 {
            return self.start(window, tape);
        }
        let start = window.position();
        let result = self.continue_list(window, tape);
        if result == ParseResult::Void {
            window.set_position(start);
        }
        result
    }

    fn start(&mut self, window: &mut InputWindow, tape: &mut Tape) -> ParseResult {
        let start = window.position();
        if line_end(window, start).is_insufficient() {
            return ParseResult::Void;
        }
        let Lookahead::Found(indent) = measure_indent(window, start) else {
            return ParseResult::Void;
        };
        if indent.width > 3 {
            return ParseResult::Invalid;
        }
        let marker = if self.ordered {
            match lookahead_ordered_marker(window, indent.end, None) {
                Lookahead::Found(m) => Lookahead::Found((ListKind::Ordered(m.style), m.end)),
                Lookahead::Insufficient => Lookahead::Insufficient,
                Lookahead::NotFound => Lookahead::NotFound,
            }
        } else {
            match lookahead_unordered_marker(window, indent.end, None) {
                Lookahead::Found(m) => Lookahead::Found((ListKind::Unordered(m.bullet), m.end)),
                Lookahead::Insufficient => Lookahead::Insufficient,
                Lookahead::NotFound => Lookahead::NotFound,
            }
        };
        let (kind, marker_end) = match marker {
            Lookahead::Found(found) => found,
            Lookahead::Insufficient => return ParseResult::Void,
            Lookahead::NotFound => return ParseResult::Invalid,
        };
        if tape.remaining() < ListLevel::OPEN_COST {
            return ParseResult::Invalid;
        }

        self.levels[0] = ListLevel::open(kind, indent.width, tape, indent.end);
        self.depth = 1;
        self.blank_pending = false;
        window.set_position(marker_end);
        let first = self.levels[0].first_line(window, tape);
        self.line_result(first)
    }

    fn continue_list(&mut self, window: &mut InputWindow, tape: &mut Tape) -> ParseResult {
        let start = window.position();
        let Lookahead::Found(end) = line_end(window, start) else {
            return ParseResult::Void;
        };

        if let Lookahead::Found(next) = detect_blank_line(window, start) {
            if self.blank_pending || window.get(end) == Some(SENTINEL) {
                self.close_all(tape, start);
                window.set_position(next);
                return ParseResult::End;
            }
            self.levels[self.depth - 1].close_sub(tape, start);
            self.blank_pending = true;
            window.set_position(next);
            return ParseResult::Continue;
        }

        let Lookahead::Found(indent) = measure_indent(window, start) else {
            return ParseResult::Void;
        };
        loop {
            let d = self.depth - 1;
            let level = self.levels[d];
            if indent.width >= level.threshold() {
                return self.continue_item(window, tape, indent);
            }
            if indent.width >= level.marker_col
                && let Lookahead::Found(marker_end) = level.kind.marker_at(window, indent.end)
            {
                if !self.levels[d].next_item(tape, start, indent.end) {
                    return ParseResult::Void;
                }
                self.blank_pending = false;
                window.set_position(marker_end);
                let first = self.levels[d].first_line(window, tape);
                return self.line_result(first);
            }

            self.levels[d].close(tape, start);
            self.depth -= 1;
            if self.depth == 0 {
                self.blank_pending = false;
                return ParseResult::End;
            }
            self.levels[self.depth - 1].sub = Sub::None;
        }
    }

    /// Continues the deepest item with a line indented past its threshold.
    fn continue_item(
        &mut self,
        window: &mut InputWindow,
        tape: &mut Tape,
        indent: Indent,
    ) -> ParseResult {
        let start = window.position();
        let d = self.depth - 1;
        self.blank_pending = false;

        if lookahead_quote_marker(window, indent.end).found().is_some() {
            let result = self.levels[d].quote_line(window, tape, indent.end);
            return self.line_result(result);
        }
        if indent.width >= self.levels[d].threshold() + 4 {
            let result = self.levels[d].code_line(window, tape, start);
            return self.line_result(result);
        }
        if self.depth < MAX_LEVELS
            && tape.remaining() >= ListLevel::OPEN_COST
            && let Lookahead::Found((kind, marker_end)) = ListKind::detect(window, indent.end)
        {
            self.levels[d].close_sub(tape, start);
            self.levels[d].sub = Sub::SubList;
            self.levels[self.depth] = ListLevel::open(kind, indent.width, tape, indent.end);
            self.depth += 1;
            window.set_position(marker_end);
            let first = self.levels[self.depth - 1].first_line(window, tape);
            return self.line_result(first);
        }
        let result = self.levels[d].text_line(window, tape, indent.end);
        self.line_result(result)
    }

    fn line_result(&self, result: LineResult) -> ParseResult {
        match result {
            LineResult::Parsed | LineResult::Blank => ParseResult::Continue,
            LineResult::Void | LineResult::Invalid => ParseResult::Void,
        }
    }

    fn close_all(&mut self, tape: &mut Tape, pos: usize) {
        for level in self.levels[..self.depth].iter_mut().rev() {
            level.close(tape, pos);
        }
        self.depth = 0;
        self.blank_pending = false;
    }

    pub fn end_block(&mut self, tape: &mut Tape, pos: usize) {
        self.close_all(tape, pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assert_well_nested, outline, window};
    use pretty_assertions::assert_eq;

    /// Runs the list until it ends or needs input, then closes it at the
    /// window position.
    fn run(mut list: List, input: &str) -> (String, usize) {
        let mut w = window(input);
        let mut tape = Tape::new();
        loop {
            match list.parse_next(&mut w, &mut tape) {
                ParseResult::Continue => {}
                ParseResult::End => break,
                ParseResult::Void => {
                    list.end_block(&mut tape, w.position());
                    break;
                }
                other => panic!("unexpected {other:?}\n{}", tape.dump()),
            }
        }
        assert_eq!(tape.reserved(), 0);
        assert_well_nested(&tape);
        (outline(&tape, &w), w.position())
    }

    #[test]
    fn ordered_items() {
        let (outline, pos) = run(List::ordered(), "1. a\n2. b\n\n");
        assert_eq!(outline, r#"OrderedList[ListItem["a\n"]ListItem["b\n"]]"#);
        assert_eq!(pos, 11);
    }

    #[test]
    fn numbering_style_is_fixed_by_first_item() {
        let (outline, pos) = run(List::ordered(), "a. x\nb. y\n1. z\n");
        assert_eq!(
            outline,
            r#"OrderedListLowerAlpha[ListItem["x\n"]ListItem["y\n"]]"#
        );
        assert_eq!(pos, 10);
    }

    #[test]
    fn wrong_family_is_invalid() {
        let mut w = window("- a\n");
        let mut tape = Tape::new();
        assert_eq!(
            List::ordered().parse_next(&mut w, &mut tape),
            ParseResult::Invalid
        );
        assert!(tape.is_empty());
    }

    #[test]
    fn nested_lists() {
        let (outline, _) = run(List::unordered(), "- a\n  * b\n  * c\n- d\n");
        assert_eq!(
            outline,
            concat!(
                r#"UnorderedList[ListItem["a\n"UnorderedList[ListItem["b\n"]ListItem["c\n"]]]"#,
                r#"ListItem["d\n"]]"#
            )
        );
    }

    #[test]
    fn blank_line_then_indented_text_opens_paragraph() {
        let (outline, _) = run(List::unordered(), "- a\n\n  b\n");
        assert_eq!(outline, r#"UnorderedList[ListItem["a\n"Paragraph["b\n"]]]"#);
    }

    #[test]
    fn two_blank_lines_end_the_list() {
        let (outline, pos) = run(List::unordered(), "- a\n\n\nafter\n");
        assert_eq!(outline, r#"UnorderedList[ListItem["a\n"]]"#);
        assert_eq!(pos, 6);
    }

    #[test]
    fn unindented_text_ends_the_list_unconsumed() {
        let (outline, pos) = run(List::unordered(), "- a\nb\n");
        assert_eq!(outline, r#"UnorderedList[ListItem["a\n"]]"#);
        assert_eq!(pos, 4);
    }

    #[test]
    fn item_holds_code_and_quote() {
        let (outline, _) = run(List::unordered(), "- a\n      code\n  > q\n");
        assert_eq!(
            outline,
            concat!(
                r#"UnorderedList[ListItem["a\n"CodeBlock[CodeLine["code\n"]]"#,
                r#"Quote[Paragraph["q\n"]]]]"#
            )
        );
    }

    #[test]
    fn nesting_stops_at_max_depth() {
        let input = "- 1\n  - 2\n    - 3\n      - 4\n        - 5\n          - 6\n";
        let mut w = window(input);
        let mut tape = Tape::new();
        let mut list = List::unordered();
        while list.parse_next(&mut w, &mut tape) == ParseResult::Continue {
            assert!(list.depth() <= MAX_LEVELS);
        }
        assert_eq!(list.depth(), MAX_LEVELS);
        list.end_block(&mut tape, w.position());
        assert_well_nested(&tape);
    }

    #[test]
    fn void_leaves_window_untouched() {
        let mut w = window("- a\n- b");
        let mut tape = Tape::new();
        let mut list = List::unordered();
        assert_eq!(list.parse_next(&mut w, &mut tape), ParseResult::Continue);
        assert_eq!(list.parse_next(&mut w, &mut tape), ParseResult::Void);
        assert_eq!(w.position(), 4);
    }
}
