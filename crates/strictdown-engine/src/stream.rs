//! Incremental Markdown to HTML conversion.
//!
//! A [`Converter`] owns the three pieces of state a conversion needs: the
//! block chain (with its tape), the input window and the renderer. Each
//! call to [`Converter::feed`] pushes a chunk, parses as far as the window
//! allows, renders everything that is ready and compacts tape and window
//! together, so memory stays proportional to the longest unfinished block
//! rather than to the document.

use std::convert::Infallible;

use strictdown_syntax::tape::{DEFAULT_MAX_ENTRIES, MAX_POSITION};
use strictdown_syntax::{Chain, InputWindow, ParseResult, Tape};

use crate::render::Renderer;
use crate::sink::BoundedSink;
use crate::tags::Flavor;

/// Smallest tape ceiling a converter accepts. Smaller values are raised.
pub const MIN_TAPE_ENTRIES: usize = 64;

/// Characters pushed into the window before the converter parses.
pub(crate) const FEED_SLICE: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub flavor: Flavor,
    pub max_tape_entries: usize,
    /// Bytes read per feed by [`convert`](crate::io::convert).
    pub chunk_size: usize,
    /// Capacity of the bounded sink used by [`convert`](crate::io::convert).
    pub output_capacity: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            flavor: Flavor::Html,
            max_tape_entries: DEFAULT_MAX_ENTRIES,
            chunk_size: 8192,
            output_capacity: 4096,
        }
    }
}

/// Where a converter sends rendered output.
pub trait Output {
    type Error;

    /// Renders every ready entry of `tape`.
    fn emit(
        &mut self,
        renderer: &mut Renderer,
        tape: &Tape,
        window: &InputWindow,
    ) -> Result<(), Self::Error>;
}

impl Output for String {
    type Error = Infallible;

    fn emit(
        &mut self,
        renderer: &mut Renderer,
        tape: &Tape,
        window: &InputWindow,
    ) -> Result<(), Infallible> {
        renderer.render(tape, window, self);
        Ok(())
    }
}

/// Renders through a [`BoundedSink`], writing it out whenever it fills.
pub struct StreamOutput<W> {
    sink: BoundedSink,
    writer: W,
}

impl<W: std::io::Write> StreamOutput<W> {
    /// Panics if `capacity` is below [`BoundedSink::MIN_CAPACITY`].
    pub fn new(writer: W, capacity: usize) -> Self {
        Self {
            sink: BoundedSink::new(capacity),
            writer,
        }
    }

    fn drain(&mut self) -> std::io::Result<()> {
        self.writer.write_all(self.sink.as_str().as_bytes())?;
        self.sink.clear();
        Ok(())
    }

    /// Writes out what is still buffered and hands back the writer.
    pub fn finish(mut self) -> std::io::Result<W> {
        self.drain()?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: std::io::Write> Output for StreamOutput<W> {
    type Error = std::io::Error;

    fn emit(
        &mut self,
        renderer: &mut Renderer,
        tape: &Tape,
        window: &InputWindow,
    ) -> std::io::Result<()> {
        while !renderer.append(tape, window, &mut self.sink) {
            self.drain()?;
        }
        Ok(())
    }
}

pub struct Converter {
    chain: Chain,
    window: InputWindow,
    renderer: Renderer,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(&Options::default())
    }
}

impl Converter {
    pub fn new(options: &Options) -> Self {
        let max = options.max_tape_entries.max(MIN_TAPE_ENTRIES);
        if max != options.max_tape_entries {
            log::warn!(
                "tape ceiling {} raised to {max}",
                options.max_tape_entries
            );
        }
        Self {
            chain: Chain::new(max),
            window: InputWindow::new(),
            renderer: Renderer::new(options.flavor),
        }
    }

    /// Characters held in the window, parsed or not.
    pub fn buffered(&self) -> usize {
        self.window.limit()
    }

    /// Whether `chars` more characters fit in the window.
    pub fn has_room(&self, chars: usize) -> bool {
        self.window.limit() + chars <= MAX_POSITION
    }

    pub fn tape(&self) -> &Tape {
        self.chain.tape()
    }

    /// Pushes `chunk` and appends the HTML that became ready to `out`.
    ///
    /// # Panics
    ///
    /// Panics if a single unfinished line outgrows the window.
    pub fn feed(&mut self, chunk: &str, out: &mut String) {
        let Ok(()) = self.feed_into(chunk, out);
    }

    /// Like [`feed`](Self::feed), for any [`Output`].
    pub fn feed_into<O: Output>(&mut self, chunk: &str, out: &mut O) -> Result<(), O::Error> {
        for slice in slices(chunk) {
            self.window.push_str(slice);
            self.pump(out)?;
        }
        Ok(())
    }

    /// Ends the input, closes whatever is still open and appends the rest
    /// of the HTML to `out`.
    pub fn finish(&mut self, out: &mut String) {
        let Ok(()) = self.finish_into(out);
    }

    pub fn finish_into<O: Output>(&mut self, out: &mut O) -> Result<(), O::Error> {
        self.window.end_of_input();
        loop {
            self.pump(out)?;
            if self.window.remaining() == 0 || !self.chain.is_continuing() {
                break;
            }
            let pos = self.window.position();
            log::debug!("closing stalled block at {pos}");
            self.chain.end_block(pos);
        }
        if self.window.remaining() > 0 {
            log::warn!(
                "{} characters left unparsed at end of input",
                self.window.remaining()
            );
        }
        self.chain.end_block(self.window.position());
        out.emit(&mut self.renderer, self.chain.tape(), &self.window)?;
        self.compact();
        Ok(())
    }

    /// Parses until the chain needs more input, rendering and compacting
    /// after every step.
    fn pump<O: Output>(&mut self, out: &mut O) -> Result<(), O::Error> {
        loop {
            let result = self.chain.parse_next(&mut self.window);
            out.emit(&mut self.renderer, self.chain.tape(), &self.window)?;
            self.compact();
            if result == ParseResult::Void {
                return Ok(());
            }
        }
    }

    /// Drops rendered entries and the input nothing refers to any more.
    pub fn compact(&mut self) {
        let cutoff = self.chain.compact(self.window.position());
        let origin = self.renderer.compact(self.chain.tape_mut(), cutoff);
        if origin > 0 {
            log::trace!("compacting {origin} characters");
            self.window.compact(origin);
        }
    }
}

/// Splits `text` into pieces of at most [`FEED_SLICE`] characters.
pub(crate) fn slices(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let split = rest
            .char_indices()
            .nth(FEED_SLICE)
            .map_or(rest.len(), |(i, _)| i);
        let (head, tail) = rest.split_at(split);
        rest = tail;
        Some(head)
    })
}

fn convert_str(input: &str, flavor: Flavor) -> String {
    let mut converter = Converter::new(&Options {
        flavor,
        ..Options::default()
    });
    let mut out = String::with_capacity(input.len() + input.len() / 4);
    converter.feed(input, &mut out);
    converter.finish(&mut out);
    out
}

/// Converts a whole document to HTML.
pub fn to_html(input: &str) -> String {
    convert_str(input, Flavor::Html)
}

/// Converts a whole document to XHTML.
pub fn to_xhtml(input: &str) -> String {
    convert_str(input, Flavor::Xhtml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const DOCUMENT: &str = "# Title\n\nSome *text* with a [link](u).\n\n- a\n- b\n\n> q\n\n```\ncode\n```\n";

    fn chunked(input: &str, chunk: usize, max_tape_entries: usize) -> String {
        let mut converter = Converter::new(&Options {
            max_tape_entries,
            ..Options::default()
        });
        let chars: Vec<char> = input.chars().collect();
        let mut out = String::new();
        for piece in chars.chunks(chunk) {
            converter.feed(&piece.iter().collect::<String>(), &mut out);
        }
        converter.finish(&mut out);
        out
    }

    #[test]
    fn converts_document() {
        assert_eq!(
            to_html(DOCUMENT),
            concat!(
                "<h1>Title</h1>\n",
                "<p>Some <i>text</i> with a <a href=\"u\">link</a>.\n</p>",
                "<ul><li>a\n</li><li>b\n</li></ul>",
                "<blockquote><p>q\n</p></blockquote>",
                "<pre><code>code\n</code></pre>\n",
            )
        );
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(5)]
    #[case(13)]
    fn chunking_does_not_change_output(#[case] chunk: usize) {
        assert_eq!(chunked(DOCUMENT, chunk, DEFAULT_MAX_ENTRIES), to_html(DOCUMENT));
    }

    #[test]
    fn small_tape_still_converts() {
        let html = chunked(DOCUMENT, 3, MIN_TAPE_ENTRIES);
        assert_eq!(html, to_html(DOCUMENT));
    }

    #[test]
    fn compaction_keeps_memory_bounded() {
        let mut converter = Converter::default();
        let mut out = String::new();
        for _ in 0..1000 {
            converter.feed("A line of text.\n\n", &mut out);
        }
        assert!(converter.buffered() < 64, "window holds {}", converter.buffered());
        assert!(converter.tape().len() < 16, "tape holds {}", converter.tape().len());
        converter.finish(&mut out);
        assert_eq!(out.matches("<p>").count(), 1000);
    }

    #[test]
    fn slices_split_on_char_boundaries() {
        let text = "é".repeat(FEED_SLICE + 3);
        let pieces: Vec<&str> = slices(&text).collect();
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].chars().count(), FEED_SLICE);
        assert_eq!(pieces[1], "ééé");
        assert_eq!(slices("").count(), 0);
    }

    #[test]
    fn unterminated_last_line() {
        assert_eq!(to_html("no newline"), "<p>no newline</p>");
    }

    #[test]
    fn open_blocks_close_at_end() {
        assert_eq!(to_html("> q"), "<blockquote><p>q</p></blockquote>");
        assert_eq!(to_html("- a\n  - b"), "<ul><li>a\n<ul><li>b</li></ul></li></ul>");
    }

    #[test]
    fn xhtml_flavor() {
        assert_eq!(to_xhtml("***\n"), "<hr/>\n");
    }

    #[test]
    fn tiny_ceiling_is_raised() {
        let converter = Converter::new(&Options {
            max_tape_entries: 4,
            ..Options::default()
        });
        assert_eq!(converter.tape().max_entries(), MIN_TAPE_ENTRIES);
    }

    #[test]
    fn stream_output_matches_string() {
        let mut converter = Converter::default();
        let mut output = StreamOutput::new(Vec::new(), BoundedSink::MIN_CAPACITY);
        converter.feed_into(DOCUMENT, &mut output).unwrap();
        converter.finish_into(&mut output).unwrap();
        let bytes = output.finish().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), to_html(DOCUMENT));
    }
}
