//! Block dispatch.
//!
//! The chain owns the tape and the block grammars. When no block is open it
//! tries the grammars in priority order on the line at the window position;
//! once one of them reports `Continue` it is resumed on every following call
//! until it ends the block.

use crate::block::{BlockParser, ParseResult, UnparsableBlock};
use crate::lookahead::{Lookahead, detect_blank_line};
use crate::tape::Tape;
use crate::window::InputWindow;

pub struct Chain {
    tape: Tape,
    parsers: Vec<BlockParser>,
    /// Index of the grammar whose block is open.
    current: Option<usize>,
}

impl Chain {
    /// A chain over every grammar, with a tape of at most `max_tape_entries`.
    pub fn new(max_tape_entries: usize) -> Self {
        Self::with_parsers(
            Tape::with_max_entries(max_tape_entries),
            BlockParser::default_chain(),
        )
    }

    /// A chain over `parsers`, tried in order. The unparsable fallback is
    /// appended if the list has no catch-all.
    pub fn with_parsers(tape: Tape, mut parsers: Vec<BlockParser>) -> Self {
        if !parsers.iter().any(BlockParser::is_catch_all) {
            parsers.push(BlockParser::Unparsable(UnparsableBlock));
        }
        Self {
            tape,
            parsers,
            current: None,
        }
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn tape_mut(&mut self) -> &mut Tape {
        &mut self.tape
    }

    /// Whether a block is open and waiting for more lines.
    pub fn is_continuing(&self) -> bool {
        self.current.is_some()
    }

    /// Parses as many lines as the window holds, stopping early only while
    /// a block is open.
    ///
    /// Returns `Void` only if nothing was consumed; otherwise the last
    /// result that was not `Void`.
    pub fn parse_next(&mut self, window: &mut InputWindow) -> ParseResult {
        let mut last = ParseResult::Void;
        loop {
            let result = match self.current {
                Some(index) => self.resume(index, window),
                None => self.try_candidates(window),
            };
            match result {
                ParseResult::Void => return last,
                ParseResult::Continue => return result,
                ParseResult::Invalid => {}
                ParseResult::End | ParseResult::EmptyLine => {
                    last = result;
                    if window.remaining() == 0 {
                        return last;
                    }
                }
            }
        }
    }

    fn resume(&mut self, index: usize, window: &mut InputWindow) -> ParseResult {
        let parser = &mut self.parsers[index];
        let result = parser.parse_next(window, &mut self.tape);
        log::trace!("{} continued at {}: {result:?}", parser.name(), window.position());
        if !matches!(result, ParseResult::Void | ParseResult::Continue) {
            self.current = None;
        }
        result
    }

    fn try_candidates(&mut self, window: &mut InputWindow) -> ParseResult {
        let start = window.position();
        match detect_blank_line(window, start) {
            Lookahead::Insufficient => return ParseResult::Void,
            Lookahead::Found(next) => {
                window.set_position(next);
                return ParseResult::EmptyLine;
            }
            Lookahead::NotFound => {}
        }
        for (index, parser) in self.parsers.iter_mut().enumerate() {
            let result = parser.parse_next(window, &mut self.tape);
            if result == ParseResult::Invalid {
                continue;
            }
            log::trace!("{} started at {start}: {result:?}", parser.name());
            if result == ParseResult::Continue {
                self.current = Some(index);
            }
            return result;
        }
        log::warn!("no block grammar accepted the line at {start}");
        ParseResult::Void
    }

    /// Closes the open block, if any, at `pos`.
    pub fn end_block(&mut self, pos: usize) {
        if let Some(index) = self.current.take() {
            log::trace!("{} closed at {pos}", self.parsers[index].name());
            self.parsers[index].end_block(&mut self.tape, pos);
        }
    }

    /// Lowest window position any grammar still needs, given that the
    /// caller is done with everything before `pos`.
    pub fn compact(&mut self, pos: usize) -> usize {
        self.parsers
            .iter_mut()
            .map(|p| p.compact(pos))
            .min()
            .unwrap_or(pos)
    }
}
