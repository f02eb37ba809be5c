//! Character-level escaping for spans copied from the input window.

use std::borrow::Cow;

use strictdown_syntax::chars::SENTINEL;

/// Where an escaped character ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escaping {
    /// Element text.
    Text,
    /// A double-quoted attribute value (URLs, alt text, language names).
    Attribute,
}

/// Escaped form of `c`, using `buf` for characters that need no escaping.
///
/// Returns `None` for the end-of-input sentinel, which is never copied.
pub fn escape_char(c: char, escaping: Escaping, buf: &mut [u8; 4]) -> Option<Cow<'_, str>> {
    if c == SENTINEL {
        return None;
    }
    let s: &str = c.encode_utf8(buf);
    Some(match escaping {
        Escaping::Text => html_escape::encode_text(s),
        Escaping::Attribute => html_escape::encode_double_quoted_attribute(s),
    })
}
