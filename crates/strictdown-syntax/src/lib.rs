//! # strictdown-syntax
//!
//! An incremental, memory-bounded parser for a strict Markdown dialect. Input
//! arrives in chunks of any size; the parser records what it recognizes as a
//! flat tape of position-tagged boundary events and never copies input text.
//!
//! ## Architecture Overview
//!
//! ```text
//! chunks → InputWindow → Chain → BlockParser → line parsers → inline machine
//!                          │                                       │
//!                          └──────────────── Tape ◄────────────────┘
//!                                             │
//!                                          Cursor → renderer
//! ```
//!
//! ### 1. Input window ([`window`] module)
//!
//! The caller owns an [`InputWindow`] of decoded characters. Tape positions
//! are indices into it, so the two are always compacted together.
//!
//! ### 2. Event tape ([`tape`] module)
//!
//! Every region the parser recognizes is written as start/stop events packed
//! into one `u32` each: 20 bits of position, 7 bits of [`State`], 4 flag
//! bits. A marker and content boundary at the same position share one entry.
//!
//! ```text
//! "# Hi\n" → 0 Heading1 MS, 2 Heading1 CS, 2 Text MS|CS, 4 Text CE|ME,
//!            4 Heading1 CE, 5 Heading1 ME
//! ```
//!
//! The tape has a hard ceiling. Parsers reserve the entries they will need to
//! close what they open, and degrade to verbatim `Unparsable` regions when
//! the tape is nearly full, so the ceiling is never exceeded and every region
//! that was opened is eventually closed.
//!
//! ### 3. Grammars ([`block`], [`line`], [`inline`] modules)
//!
//! The [`Chain`] tries block grammars in priority order. Block grammars work
//! a whole line at a time and hand free text to the inline machine, which
//! handles emphasis, code, links and the like with a bounded stack.
//! Speculative work is wrapped in a [`Checkpoint`] that must be committed or
//! rolled back.
//!
//! ### 4. Traversal ([`Cursor`])
//!
//! Renderers read the tape through a cursor and keep only its index between
//! calls, so rendering can stop when the output is full and resume later.
//!
//! ## Quick Start
//!
//! ```
//! use strictdown_syntax::{Chain, InputWindow, ParseResult, State};
//!
//! let mut window = InputWindow::new();
//! let mut chain = Chain::new(strictdown_syntax::tape::DEFAULT_MAX_ENTRIES);
//!
//! window.push_str("# Hello\n");
//! window.end_of_input();
//! while chain.parse_next(&mut window) != ParseResult::Void {}
//! chain.end_block(window.position());
//!
//! assert_eq!(chain.tape().get(0).state, State::Heading1);
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! strictdown-syntax/
//! ├── lib.rs          # This file - public API and integration tests
//! ├── chars.rs        # Character classes and the end-of-input sentinel
//! ├── state.rs        # State tags stored on the tape
//! ├── span.rs         # Half-open position ranges
//! ├── window.rs       # Caller-owned input buffer
//! ├── checkpoint.rs   # Must-use mark/rollback guard
//! ├── lookahead.rs    # Non-consuming lookahead (line ends, markers, indents)
//! ├── tape/           # Packed event tape and read cursor
//! ├── inline/         # Inline state machine and its bounded stack
//! ├── line/           # Text, code, quote and list item lines
//! ├── block/          # Block grammars
//! └── chain.rs        # Priority dispatch between block grammars
//! ```

pub mod block;
pub mod chain;
pub mod chars;
pub mod checkpoint;
pub mod inline;
pub mod line;
pub mod lookahead;
pub mod span;
pub mod state;
pub mod tape;
pub mod window;

#[cfg(test)]
mod testing;

pub use block::{BlockParser, ParseResult};
pub use chain::Chain;
pub use checkpoint::Checkpoint;
pub use inline::{LineEnd, LineResult, parse_line};
pub use span::Span;
pub use state::State;
pub use tape::{Cursor, Entry, Flags, Tape};
pub use window::InputWindow;
