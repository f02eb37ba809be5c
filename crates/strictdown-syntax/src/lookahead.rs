//! Non-consuming lookahead over the input window.
//!
//! Each check starts at an explicit position and reports one of three
//! outcomes. `Insufficient` means the answer depends on input that has not
//! arrived yet; grammars turn it into `Void` and wait for the next chunk.

use crate::chars::{indent_width, is_line_terminator, is_whitespace};
use crate::window::InputWindow;

/// Outcome of a lookahead check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookahead<T> {
    Found(T),
    NotFound,
    Insufficient,
}

impl<T> Lookahead<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Lookahead::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self, Lookahead::Insufficient)
    }
}

/// Index of the line terminator at or after `from`.
pub fn line_end(window: &InputWindow, from: usize) -> Lookahead<usize> {
    let mut i = from;
    while let Some(c) = window.get(i) {
        if is_line_terminator(c) {
            return Lookahead::Found(i);
        }
        i += 1;
    }
    Lookahead::Insufficient
}

/// Checks whether the line at `from` holds only whitespace.
///
/// Returns the position just past its terminator.
pub fn detect_blank_line(window: &InputWindow, from: usize) -> Lookahead<usize> {
    let mut i = from;
    while let Some(c) = window.get(i) {
        if is_line_terminator(c) {
            return Lookahead::Found(i + 1);
        }
        if !is_whitespace(c) {
            return Lookahead::NotFound;
        }
        i += 1;
    }
    Lookahead::Insufficient
}

/// Leading whitespace of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indent {
    /// Width in columns, tabs counting as four.
    pub width: usize,
    /// Position of the first non-whitespace character.
    pub end: usize,
}

/// Measures the whitespace starting at `from`.
pub fn measure_indent(window: &InputWindow, from: usize) -> Lookahead<Indent> {
    let mut width = 0;
    let mut i = from;
    while let Some(c) = window.get(i) {
        if !is_whitespace(c) {
            return Lookahead::Found(Indent { width, end: i });
        }
        width += indent_width(c);
        i += 1;
    }
    Lookahead::Insufficient
}

/// Position reached after skipping at least `columns` columns of indentation
/// starting at `from`.
pub fn skip_columns(window: &InputWindow, from: usize, columns: usize) -> usize {
    let mut width = 0;
    let mut i = from;
    while width < columns {
        match window.get(i) {
            Some(c) if is_whitespace(c) => {
                width += indent_width(c);
                i += 1;
            }
            _ => break,
        }
    }
    i
}

/// Numbering style of an ordered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderedStyle {
    Decimal,
    LowerAlpha,
    UpperAlpha,
    LowerRoman,
    UpperRoman,
}

const MAX_ORDINAL_LEN: usize = 9;

fn is_roman(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), 'i' | 'v' | 'x' | 'l' | 'c' | 'd' | 'm')
}

impl OrderedStyle {
    /// Style implied by the ordinal of a list's first item.
    pub fn classify(ordinal: &[char]) -> Option<OrderedStyle> {
        let first = *ordinal.first()?;
        if ordinal.iter().all(char::is_ascii_digit) {
            return Some(OrderedStyle::Decimal);
        }
        let lower = ordinal.iter().all(char::is_ascii_lowercase);
        let upper = ordinal.iter().all(char::is_ascii_uppercase);
        if !lower && !upper {
            return None;
        }
        let roman = if ordinal.len() == 1 {
            first.eq_ignore_ascii_case(&'i')
        } else if ordinal.iter().all(|c| is_roman(*c)) {
            true
        } else {
            return None;
        };
        Some(match (roman, lower) {
            (true, true) => OrderedStyle::LowerRoman,
            (true, false) => OrderedStyle::UpperRoman,
            (false, true) => OrderedStyle::LowerAlpha,
            (false, false) => OrderedStyle::UpperAlpha,
        })
    }

    /// Whether a later item's ordinal fits a list of this style.
    pub fn accepts(self, ordinal: &[char]) -> bool {
        !ordinal.is_empty()
            && match self {
                OrderedStyle::Decimal => ordinal.iter().all(char::is_ascii_digit),
                OrderedStyle::LowerAlpha => {
                    ordinal.len() == 1 && ordinal[0].is_ascii_lowercase()
                }
                OrderedStyle::UpperAlpha => {
                    ordinal.len() == 1 && ordinal[0].is_ascii_uppercase()
                }
                OrderedStyle::LowerRoman => ordinal
                    .iter()
                    .all(|c| c.is_ascii_lowercase() && is_roman(*c)),
                OrderedStyle::UpperRoman => ordinal
                    .iter()
                    .all(|c| c.is_ascii_uppercase() && is_roman(*c)),
            }
    }
}

/// An ordered list marker such as `12.` or `iv.`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderedMarker {
    pub style: OrderedStyle,
    /// Position just past the `.`.
    pub end: usize,
}

/// Looks for an ordered marker at `from`.
///
/// With `fixed` set, only ordinals compatible with that style match.
pub fn lookahead_ordered_marker(
    window: &InputWindow,
    from: usize,
    fixed: Option<OrderedStyle>,
) -> Lookahead<OrderedMarker> {
    let mut ordinal = [' '; MAX_ORDINAL_LEN];
    let mut len = 0;
    let mut i = from;
    loop {
        let Some(c) = window.get(i) else {
            return Lookahead::Insufficient;
        };
        if !c.is_ascii_alphanumeric() {
            break;
        }
        if len == MAX_ORDINAL_LEN {
            return Lookahead::NotFound;
        }
        ordinal[len] = c;
        len += 1;
        i += 1;
    }
    let ordinal = &ordinal[..len];
    let style = match fixed {
        Some(style) if style.accepts(ordinal) => style,
        Some(_) => return Lookahead::NotFound,
        None => match OrderedStyle::classify(ordinal) {
            Some(style) => style,
            None => return Lookahead::NotFound,
        },
    };
    match (window.get(i), window.get(i + 1)) {
        (Some('.'), Some(c)) if is_whitespace(c) => Lookahead::Found(OrderedMarker {
            style,
            end: i + 1,
        }),
        (Some('.'), None) => Lookahead::Insufficient,
        (None, _) => Lookahead::Insufficient,
        _ => Lookahead::NotFound,
    }
}

/// A bullet marker such as `-` or `*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnorderedMarker {
    pub bullet: char,
    /// Position just past the bullet.
    pub end: usize,
}

/// Looks for a bullet at `from`, restricted to `fixed` when given.
pub fn lookahead_unordered_marker(
    window: &InputWindow,
    from: usize,
    fixed: Option<char>,
) -> Lookahead<UnorderedMarker> {
    let Some(bullet) = window.get(from) else {
        return Lookahead::Insufficient;
    };
    if !matches!(bullet, '*' | '-' | '+') || fixed.is_some_and(|f| f != bullet) {
        return Lookahead::NotFound;
    }
    match window.get(from + 1) {
        Some(c) if is_whitespace(c) => Lookahead::Found(UnorderedMarker {
            bullet,
            end: from + 1,
        }),
        Some(_) => Lookahead::NotFound,
        None => Lookahead::Insufficient,
    }
}

/// Looks for a `>` quote marker after at most three columns of indentation.
///
/// Returns the position after the marker and one optional space.
pub fn lookahead_quote_marker(window: &InputWindow, from: usize) -> Lookahead<usize> {
    let indent = match measure_indent(window, from) {
        Lookahead::Found(indent) => indent,
        Lookahead::NotFound => return Lookahead::NotFound,
        Lookahead::Insufficient => return Lookahead::Insufficient,
    };
    if indent.width > 3 || window.get(indent.end) != Some('>') {
        return Lookahead::NotFound;
    }
    let after = indent.end + 1;
    match window.get(after) {
        Some(' ') | Some('\t') => Lookahead::Found(after + 1),
        Some(_) => Lookahead::Found(after),
        None => Lookahead::Insufficient,
    }
}
