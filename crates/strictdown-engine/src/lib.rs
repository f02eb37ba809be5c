//! # strictdown-engine
//!
//! Turns the event tape produced by `strictdown-syntax` into HTML or XHTML,
//! incrementally and with bounded memory.
//!
//! ```
//! assert_eq!(
//!     strictdown_engine::to_html("# Hello\n\nSome *text*.\n"),
//!     "<h1>Hello</h1>\n<p>Some <i>text</i>.\n</p>"
//! );
//! ```
//!
//! [`Converter`] is the incremental entry point; [`convert`] streams between
//! any reader and writer; [`Renderer`] can be driven directly by callers that
//! run the parser chain themselves.

pub mod escape;
pub mod io;
pub mod render;
pub mod sink;
pub mod stream;
pub mod tags;

pub use io::{ConvertError, convert};
pub use render::Renderer;
pub use sink::{BoundedSink, Sink};
pub use stream::{Converter, MIN_TAPE_ENTRIES, Options, Output, StreamOutput, to_html, to_xhtml};
pub use tags::Flavor;
