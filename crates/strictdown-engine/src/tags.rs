//! HTML and XHTML tag tables.
//!
//! The two flavors differ only in how void elements (`<hr>`, `<br>`,
//! `<img>`) are closed.

use strictdown_syntax::State;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    #[default]
    Html,
    Xhtml,
}

pub const LINK_OPEN: &str = "<a href=\"";
pub const IMAGE_OPEN: &str = "<img src=\"";
pub const IMAGE_ALT: &str = "\" alt=\"";
pub const CODE_BLOCK_OPEN: &str = "<pre><code>";
pub const CODE_BLOCK_OPEN_INFO: &str = "<pre><code class=\"language-";
/// Closes an attribute value and its start tag.
pub const ATTRIBUTE_END: &str = "\">";

impl Flavor {
    /// Closes the `alt` attribute and the `<img>` element.
    pub fn image_end(self) -> &'static str {
        match self {
            Flavor::Html => "\">",
            Flavor::Xhtml => "\" />",
        }
    }

    /// Fixed markup emitted when a region of `state` starts.
    ///
    /// Links, images and code blocks carry attributes and are assembled by
    /// the renderer from the constants above.
    pub fn open_tag(self, state: State) -> Option<&'static str> {
        let tag = match state {
            State::Paragraph => "<p>",
            State::Heading1 => "<h1>",
            State::Heading2 => "<h2>",
            State::Heading3 => "<h3>",
            State::Heading4 => "<h4>",
            State::Heading5 => "<h5>",
            State::Heading6 => "<h6>",
            State::HorizontalRule => match self {
                Flavor::Html => "<hr>\n",
                Flavor::Xhtml => "<hr/>\n",
            },
            State::Quote => "<blockquote>",
            State::OrderedList => "<ol>",
            State::OrderedListLowerAlpha => "<ol type=\"a\">",
            State::OrderedListUpperAlpha => "<ol type=\"A\">",
            State::OrderedListLowerRoman => "<ol type=\"i\">",
            State::OrderedListUpperRoman => "<ol type=\"I\">",
            State::UnorderedList => "<ul>",
            State::ListItem => "<li>",
            State::Bold => "<b>",
            State::Italic => "<i>",
            State::Strikethrough => "<s>",
            State::Underline => "<u>",
            State::Code => "<code>",
            State::HardBreak => match self {
                Flavor::Html => "<br>",
                Flavor::Xhtml => "<br/>",
            },
            _ => return None,
        };
        Some(tag)
    }

    /// Markup emitted when a region of `state` ends.
    pub fn close_tag(self, state: State) -> Option<&'static str> {
        let tag = match state {
            State::Paragraph => "</p>",
            State::Heading1 => "</h1>\n",
            State::Heading2 => "</h2>\n",
            State::Heading3 => "</h3>\n",
            State::Heading4 => "</h4>\n",
            State::Heading5 => "</h5>\n",
            State::Heading6 => "</h6>\n",
            State::CodeBlock => "</code></pre>\n",
            State::Quote => "</blockquote>",
            State::OrderedList
            | State::OrderedListLowerAlpha
            | State::OrderedListUpperAlpha
            | State::OrderedListLowerRoman
            | State::OrderedListUpperRoman => "</ol>",
            State::UnorderedList => "</ul>",
            State::ListItem => "</li>",
            State::Bold => "</b>",
            State::Italic => "</i>",
            State::Strikethrough => "</s>",
            State::Underline => "</u>",
            State::Code => "</code>",
            State::Link => "</a>",
            _ => return None,
        };
        Some(tag)
    }
}
