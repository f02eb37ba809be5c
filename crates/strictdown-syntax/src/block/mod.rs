//! # Block-Level Grammars
//!
//! Each grammar recognizes one kind of block from its first line and, if the
//! block spans several lines, keeps just enough state to continue it on the
//! next call. All of them follow the same contract:
//!
//! | Result | Meaning | Input consumed |
//! |--------|---------|----------------|
//! | `Void` | needs more input (or tape room) | no |
//! | `Invalid` | this grammar does not apply | no |
//! | `Continue` | block is open, call again | yes |
//! | `End` | block is closed | usually |
//! | `EmptyLine` | a blank line was skipped | yes |
//!
//! A grammar that returns `Void` or `Invalid` leaves the window and the tape
//! exactly as it found them, so the chain can try the next candidate.
//!
//! ## Priority
//!
//! Grammars are tried in the order of [`BlockParser::default_chain`]. Setext
//! headings come first because their first line would otherwise start a
//! paragraph; the unparsable fallback comes last and accepts any line.

mod fenced_code;
mod heading;
mod indented_code;
mod list;
mod paragraph;
mod quote;
mod rule;
mod unparsable;

pub use fenced_code::FencedCode;
pub use heading::{AtxHeading, SetextHeading};
pub use indented_code::IndentedCode;
pub use list::List;
pub use paragraph::Paragraph;
pub use quote::QuoteBlock;
pub use rule::{HorizontalRule, is_rule_line};
pub use unparsable::UnparsableBlock;

use crate::lookahead::{Lookahead, measure_indent};
use crate::tape::Tape;
use crate::window::InputWindow;

/// Outcome of one block-level parse call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseResult {
    Void,
    EmptyLine,
    End,
    Continue,
    Invalid,
}

/// The closed set of block grammars.
pub enum BlockParser {
    SetextHeading(SetextHeading),
    AtxHeading(AtxHeading),
    HorizontalRule(HorizontalRule),
    OrderedList(List),
    UnorderedList(List),
    IndentedCode(IndentedCode),
    FencedCode(FencedCode),
    Quote(QuoteBlock),
    Paragraph(Paragraph),
    Unparsable(UnparsableBlock),
}

impl BlockParser {
    /// Every grammar, highest priority first.
    pub fn default_chain() -> Vec<BlockParser> {
        vec![
            BlockParser::SetextHeading(SetextHeading),
            BlockParser::AtxHeading(AtxHeading),
            BlockParser::HorizontalRule(HorizontalRule),
            BlockParser::OrderedList(List::ordered()),
            BlockParser::UnorderedList(List::unordered()),
            BlockParser::IndentedCode(IndentedCode::default()),
            BlockParser::FencedCode(FencedCode::default()),
            BlockParser::Quote(QuoteBlock::default()),
            BlockParser::Paragraph(Paragraph::default()),
            BlockParser::Unparsable(UnparsableBlock),
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            BlockParser::SetextHeading(_) => "setext heading",
            BlockParser::AtxHeading(_) => "atx heading",
            BlockParser::HorizontalRule(_) => "horizontal rule",
            BlockParser::OrderedList(_) => "ordered list",
            BlockParser::UnorderedList(_) => "unordered list",
            BlockParser::IndentedCode(_) => "indented code",
            BlockParser::FencedCode(_) => "fenced code",
            BlockParser::Quote(_) => "quote",
            BlockParser::Paragraph(_) => "paragraph",
            BlockParser::Unparsable(_) => "unparsable",
        }
    }

    /// Whether this grammar accepts any non-blank line.
    pub fn is_catch_all(&self) -> bool {
        matches!(self, BlockParser::Unparsable(_))
    }

    /// Starts or continues this grammar's block at the window position.
    pub fn parse_next(&mut self, window: &mut InputWindow, tape: &mut Tape) -> ParseResult {
        match self {
            BlockParser::SetextHeading(p) => p.parse_next(window, tape),
            BlockParser::AtxHeading(p) => p.parse_next(window, tape),
            BlockParser::HorizontalRule(p) => p.parse_next(window, tape),
            BlockParser::OrderedList(p) | BlockParser::UnorderedList(p) => {
                p.parse_next(window, tape)
            }
            BlockParser::IndentedCode(p) => p.parse_next(window, tape),
            BlockParser::FencedCode(p) => p.parse_next(window, tape),
            BlockParser::Quote(p) => p.parse_next(window, tape),
            BlockParser::Paragraph(p) => p.parse_next(window, tape),
            BlockParser::Unparsable(p) => p.parse_next(window, tape),
        }
    }

    /// Closes an open block at `pos`.
    pub fn end_block(&mut self, tape: &mut Tape, pos: usize) {
        match self {
            BlockParser::OrderedList(p) | BlockParser::UnorderedList(p) => p.end_block(tape, pos),
            BlockParser::IndentedCode(p) => p.end_block(tape, pos),
            BlockParser::FencedCode(p) => p.end_block(tape, pos),
            BlockParser::Quote(p) => p.end_block(tape, pos),
            BlockParser::Paragraph(p) => p.end_block(tape, pos),
            BlockParser::SetextHeading(_)
            | BlockParser::AtxHeading(_)
            | BlockParser::HorizontalRule(_)
            | BlockParser::Unparsable(_) => {}
        }
    }

    /// Lowest window position this grammar still needs before `pos`.
    ///
    /// Grammars finish every line within one call and keep no positions
    /// between calls, so nothing before `pos` is ever needed.
    pub fn compact(&mut self, pos: usize) -> usize {
        pos
    }
}

/// Position of the first non-whitespace character of the line at `start`,
/// if it is indented by at most three columns.
pub(crate) fn block_indent(window: &InputWindow, start: usize) -> Option<usize> {
    match measure_indent(window, start) {
        Lookahead::Found(indent) if indent.width <= 3 => Some(indent.end),
        _ => None,
    }
}
