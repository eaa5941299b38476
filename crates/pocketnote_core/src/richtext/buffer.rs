//! Toolkit-independent formatted text buffer.
//!
//! # Responsibility
//! - Hold plain text plus attribute spans addressed by character offsets.
//! - Resolve the effective per-character style used for rendering.
//! - Keep span offsets consistent across plain-text inserts.
//!
//! # Invariants
//! - Every span satisfies `start <= end <= len()` (character offsets).
//! - Spans are kept in insertion order; for colors the last span wins.
//! - Empty spans (`start == end`) are legal and render nothing.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Foreground color palette supported by the editor toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextColor {
    Black,
    Red,
    Blue,
    Green,
    Yellow,
}

impl TextColor {
    pub const ALL: [TextColor; 5] = [
        TextColor::Black,
        TextColor::Red,
        TextColor::Blue,
        TextColor::Green,
        TextColor::Yellow,
    ];

    /// Markup name written by the encoder.
    pub fn name(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Yellow => "yellow",
        }
    }

    /// `#rrggbb` form, accepted in `<font color>` on decode.
    ///
    /// Only the five palette values are recognized. Bodies using other tags,
    /// such as `<p>`, `<br>` or `<span style>`, are not decoded.
    pub fn hex(self) -> &'static str {
        match self {
            Self::Black => "#000000",
            Self::Red => "#ff0000",
            Self::Blue => "#0000ff",
            Self::Green => "#00ff00",
            Self::Yellow => "#ffff00",
        }
    }

    /// Parses a color name or hex code, case-insensitively.
    pub fn from_markup(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|color| color.name() == normalized || color.hex() == normalized)
    }
}

/// Formatting effect carried by a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "color", rename_all = "snake_case")]
pub enum Attribute {
    Bold,
    Italic,
    Underline,
    Color(TextColor),
}

/// One `(attribute, start, end)` annotation; `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub attribute: Attribute,
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(attribute: Attribute, start: usize, end: usize) -> Self {
        Self {
            attribute,
            start,
            end,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Returns whether the character at `offset` is inside this span.
    pub fn covers(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// Effective style of a single character after all spans are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CharStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub color: Option<TextColor>,
}

impl CharStyle {
    fn apply(&mut self, attribute: Attribute) {
        match attribute {
            Attribute::Bold => self.bold = true,
            Attribute::Italic => self.italic = true,
            Attribute::Underline => self.underline = true,
            Attribute::Color(color) => self.color = Some(color),
        }
    }

    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }

    /// Active attributes in canonical nesting order: color, bold, italic,
    /// underline.
    pub fn attributes(&self) -> Vec<Attribute> {
        let mut attributes = Vec::with_capacity(4);
        if let Some(color) = self.color {
            attributes.push(Attribute::Color(color));
        }
        if self.bold {
            attributes.push(Attribute::Bold);
        }
        if self.italic {
            attributes.push(Attribute::Italic);
        }
        if self.underline {
            attributes.push(Attribute::Underline);
        }
        attributes
    }
}

/// Span offsets outside the current text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanRangeError {
    pub start: usize,
    pub end: usize,
    pub len: usize,
}

impl Display for SpanRangeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "span range {}..{} is invalid for text of length {}",
            self.start, self.end, self.len
        )
    }
}

impl Error for SpanRangeError {}

/// Serialized shape; validated through `TryFrom` on deserialize.
#[derive(Deserialize)]
struct FormattedTextParts {
    text: String,
    #[serde(default)]
    spans: Vec<Span>,
}

/// Plain text plus formatting spans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FormattedTextParts")]
pub struct FormattedText {
    text: String,
    spans: Vec<Span>,
}

impl TryFrom<FormattedTextParts> for FormattedText {
    type Error = SpanRangeError;

    fn try_from(value: FormattedTextParts) -> Result<Self, Self::Error> {
        Self::from_parts(value.text, value.spans)
    }
}

impl FormattedText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unformatted buffer holding `text`.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            spans: Vec::new(),
        }
    }

    /// Builds a buffer, rejecting any span outside `text`.
    pub fn from_parts(text: impl Into<String>, spans: Vec<Span>) -> Result<Self, SpanRangeError> {
        let mut buffer = Self::plain(text);
        for span in spans {
            buffer.apply(span.attribute, span.start, span.end)?;
        }
        Ok(buffer)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// A blank buffer triggers auto-delete on save.
    pub fn is_blank(&self) -> bool {
        self.is_empty()
    }

    /// Adds a formatting span over `[start, end)`.
    pub fn apply(
        &mut self,
        attribute: Attribute,
        start: usize,
        end: usize,
    ) -> Result<(), SpanRangeError> {
        let len = self.len();
        if start > end || end > len {
            return Err(SpanRangeError { start, end, len });
        }
        self.spans.push(Span::new(attribute, start, end));
        Ok(())
    }

    /// Appends unformatted text at the end of the buffer.
    pub fn append_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Appends a recognized voice phrase.
    ///
    /// An empty buffer takes the phrase as is; otherwise a single space
    /// separates it from the existing text. Existing spans are kept.
    pub fn append_voice_input(&mut self, phrase: &str) {
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(phrase);
    }

    /// Inserts unformatted text at character offset `at`.
    ///
    /// Spans starting at or after `at` move right; spans strictly containing
    /// `at` grow; spans ending at or before `at` are untouched.
    pub fn insert_text(&mut self, at: usize, text: &str) -> Result<(), SpanRangeError> {
        let len = self.len();
        if at > len {
            return Err(SpanRangeError {
                start: at,
                end: at,
                len,
            });
        }

        let inserted = text.chars().count();
        let byte_index = self
            .text
            .char_indices()
            .nth(at)
            .map_or(self.text.len(), |(index, _)| index);
        self.text.insert_str(byte_index, text);

        for span in &mut self.spans {
            if at <= span.start {
                span.start += inserted;
                span.end += inserted;
            } else if at < span.end {
                span.end += inserted;
            }
        }
        Ok(())
    }

    /// Effective style of every character, in text order.
    pub fn styles(&self) -> Vec<CharStyle> {
        let mut styles = vec![CharStyle::default(); self.len()];
        for span in &self.spans {
            for style in &mut styles[span.start..span.end] {
                style.apply(span.attribute);
            }
        }
        styles
    }

    /// Effective style of the character at `offset`.
    pub fn style_at(&self, offset: usize) -> Option<CharStyle> {
        if offset >= self.len() {
            return None;
        }
        let mut style = CharStyle::default();
        self.spans
            .iter()
            .filter(|span| span.covers(offset))
            .for_each(|span| style.apply(span.attribute));
        Some(style)
    }

    /// Same text and same per-character style, regardless of span layout.
    pub fn renders_same_as(&self, other: &Self) -> bool {
        self.text == other.text && self.styles() == other.styles()
    }
}
