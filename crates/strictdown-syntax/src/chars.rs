//! Character classification shared by every grammar.
//!
//! The dialect only needs three classes beyond "everything else": horizontal
//! whitespace, line terminators (including the end-of-input sentinel), and
//! identifier characters for fenced code info strings.

/// Reserved control code injected by the caller to mark the true end of input.
///
/// Grammars close constructs on it exactly as on a newline, renderers never
/// copy it to output.
pub const SENTINEL: char = '\u{1c}';

/// Width of a tab when measuring indentation.
pub const TAB_WIDTH: usize = 4;

/// Returns true for characters that end a line.
pub fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\u{2028}' | '\u{2029}' | SENTINEL)
}

/// Returns true for whitespace that does not end a line.
pub fn is_whitespace(c: char) -> bool {
    c.is_whitespace() && !is_line_terminator(c)
}

/// Returns true for whitespace or a line terminator.
pub fn is_blank(c: char) -> bool {
    c.is_whitespace() || c == SENTINEL
}

/// Characters allowed in a fenced code block's language tag.
pub fn is_identifier(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '+' | '#' | '.')
}

/// Column width contributed by a leading whitespace character.
pub fn indent_width(c: char) -> usize {
    if c == '\t' { TAB_WIDTH } else { 1 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case('\n', true)]
    #[case(SENTINEL, true)]
    #[case('\u{2028}', true)]
    #[case('\r', false)]
    #[case(' ', false)]
    #[case('a', false)]
    fn terminators(#[case] c: char, #[case] expected: bool) {
        assert_eq!(is_line_terminator(c), expected);
    }

    #[rstest]
    #[case(' ', true)]
    #[case('\t', true)]
    #[case('\r', true)]
    #[case('\u{a0}', true)]
    #[case('\n', false)]
    #[case(SENTINEL, false)]
    #[case('x', false)]
    fn whitespace(#[case] c: char, #[case] expected: bool) {
        assert_eq!(is_whitespace(c), expected);
    }

    #[test]
    fn sentinel_is_blank() {
        assert!(is_blank(SENTINEL));
        assert!(is_blank('\n'));
        assert!(!is_blank('*'));
    }

    #[test]
    fn tabs_count_as_four_columns() {
        assert_eq!(indent_width('\t'), 4);
        assert_eq!(indent_width(' '), 1);
    }

    #[test]
    fn identifier_characters() {
        assert!(is_identifier('r'));
        assert!(is_identifier('+'));
        assert!(!is_identifier(' '));
        assert!(!is_identifier('`'));
    }
}
