//! State tags recorded on the event tape.
//!
//! Every region on the tape, inline or block, is tagged with one `State`. The
//! tag occupies 7 bits of a packed tape word, so values stay below 128.

/// All region kinds known to the parser.
///
/// Values are stable: they are what the tape stores.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum State {
    /// Reserved "no state" tag.
    None = 0,

    // === Inline regions ===
    /// Plain text leaf.
    Text = 1,
    /// `**bold**`
    Bold = 2,
    /// `*italic*`
    Italic = 3,
    /// `~~strikethrough~~`
    Strikethrough = 4,
    /// `__underline__`
    Underline = 5,
    /// `` `code` ``
    Code = 6,
    /// `[text](url)`, content is the link text.
    Link = 7,
    /// `(url)` part of a link.
    LinkUrl = 8,
    /// `![alt](url)`, content is the alt text.
    Image = 9,
    /// `(url)` part of an image.
    ImageUrl = 10,
    /// Backslash followed by whitespace up to the line end.
    HardBreak = 11,
    /// Backslash-escaped character.
    Escape = 12,

    // === Block regions ===
    Paragraph = 20,
    Heading1 = 21,
    Heading2 = 22,
    Heading3 = 23,
    Heading4 = 24,
    Heading5 = 25,
    Heading6 = 26,
    HorizontalRule = 27,
    /// Fenced or indented code block.
    CodeBlock = 28,
    /// Language tag of a fenced code block.
    CodeInfo = 29,
    /// One line of a code block.
    CodeLine = 30,
    Quote = 31,
    OrderedList = 32,
    OrderedListLowerAlpha = 33,
    OrderedListUpperAlpha = 34,
    OrderedListLowerRoman = 35,
    OrderedListUpperRoman = 36,
    UnorderedList = 37,
    ListItem = 38,

    /// Verbatim fallback when no grammar applies or the tape is nearly full.
    Unparsable = 127,
}

impl State {
    /// Largest raw value a tape word can hold.
    pub const MAX_RAW: u8 = 127;

    /// Decodes a raw 7-bit tag.
    ///
    /// Panics on values that name no state: the tape only ever stores tags it
    /// was given, so anything else means a corrupted word.
    pub fn from_raw(raw: u8) -> State {
        match raw {
            0 => State::None,
            1 => State::Text,
            2 => State::Bold,
            3 => State::Italic,
            4 => State::Strikethrough,
            5 => State::Underline,
            6 => State::Code,
            7 => State::Link,
            8 => State::LinkUrl,
            9 => State::Image,
            10 => State::ImageUrl,
            11 => State::HardBreak,
            12 => State::Escape,
            20 => State::Paragraph,
            21 => State::Heading1,
            22 => State::Heading2,
            23 => State::Heading3,
            24 => State::Heading4,
            25 => State::Heading5,
            26 => State::Heading6,
            27 => State::HorizontalRule,
            28 => State::CodeBlock,
            29 => State::CodeInfo,
            30 => State::CodeLine,
            31 => State::Quote,
            32 => State::OrderedList,
            33 => State::OrderedListLowerAlpha,
            34 => State::OrderedListUpperAlpha,
            35 => State::OrderedListLowerRoman,
            36 => State::OrderedListUpperRoman,
            37 => State::UnorderedList,
            38 => State::ListItem,
            127 => State::Unparsable,
            _ => panic!("invalid tape state tag {raw}"),
        }
    }

    /// The raw 7-bit tag.
    pub fn raw(self) -> u8 {
        self as u8
    }

    /// Heading state for a level in `1..=6`.
    pub fn heading(level: usize) -> State {
        match level {
            1 => State::Heading1,
            2 => State::Heading2,
            3 => State::Heading3,
            4 => State::Heading4,
            5 => State::Heading5,
            6 => State::Heading6,
            _ => panic!("heading level {level} out of range"),
        }
    }

    /// Heading level, if this is a heading.
    pub fn heading_level(self) -> Option<usize> {
        match self {
            State::Heading1 => Some(1),
            State::Heading2 => Some(2),
            State::Heading3 => Some(3),
            State::Heading4 => Some(4),
            State::Heading5 => Some(5),
            State::Heading6 => Some(6),
            _ => None,
        }
    }

    /// Returns true for leaf regions whose content is copied to output.
    ///
    /// Leaves never contain nested entries, so their content is the gap
    /// between the content start and the next tape entry.
    pub fn copies_content(self) -> bool {
        matches!(
            self,
            State::Text | State::Code | State::Escape | State::CodeLine | State::Unparsable
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_roundtrip_for_every_state() {
        for raw in 0..=State::MAX_RAW {
            let known = matches!(raw, 0..=12 | 20..=38 | 127);
            if known {
                assert_eq!(State::from_raw(raw).raw(), raw);
            }
        }
    }

    #[test]
    #[should_panic(expected = "invalid tape state tag")]
    fn unknown_tag_panics() {
        State::from_raw(64);
    }

    #[test]
    fn headings() {
        assert_eq!(State::heading(3), State::Heading3);
        assert_eq!(State::Heading6.heading_level(), Some(6));
        assert_eq!(State::Paragraph.heading_level(), None);
    }

    #[test]
    fn classification() {
        assert!(State::Text.copies_content());
        assert!(State::CodeLine.copies_content());
        assert!(!State::Bold.copies_content());
        assert!(!State::LinkUrl.copies_content());
    }
}
