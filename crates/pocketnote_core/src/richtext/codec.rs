//! Markup codec for formatted note bodies.
//!
//! # Responsibility
//! - Encode a `FormattedText` into the inline markup stored as note body.
//! - Decode stored markup back into a `FormattedText`.
//!
//! # Invariants
//! - `decode(&encode(b))` renders the same as `b` for every valid buffer.
//! - Both directions are pure; only `decode_or_plain` emits a log event.
//!
//! # Markup
//! - `<b>`, `<i>`, `<u>` and `<font color="NAME">` wrap styled runs.
//! - `&amp;`, `&lt;`, `&gt;` and `&quot;` escape text characters.
//! - Tags nest in the fixed order color, bold, italic, underline.

use super::buffer::{Attribute, FormattedText, Span, SpanRangeError, TextColor};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static FONT_COLOR_ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?i)color\s*=\s*"([^"]*)"$"#).expect("valid font color regex")
});

// Longest accepted entity body, e.g. `#x10FFFF`.
const MAX_ENTITY_LEN: usize = 10;

/// Decode failure for corrupt or foreign markup.
///
/// Every variant carries the byte offset in the markup where the problem
/// was detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedMarkupError {
    /// `<` without a closing `>`.
    UnterminatedTag { offset: usize },
    /// Tag name outside the supported set.
    UnknownTag { offset: usize, tag: String },
    /// Closing tag with nothing open.
    UnexpectedClosingTag { offset: usize, tag: String },
    /// Closing tag that does not match the innermost open tag.
    MismatchedClosingTag {
        offset: usize,
        expected: String,
        found: String,
    },
    /// Tag still open at end of input.
    UnclosedTag { offset: usize, tag: String },
    /// `&` without a `;` in range.
    UnterminatedEntity { offset: usize },
    UnknownEntity { offset: usize, entity: String },
    /// `<font>` without a usable `color` attribute.
    InvalidColor { offset: usize, value: String },
    /// Decoded span that does not fit the decoded text.
    SpanOutOfRange {
        offset: usize,
        source: SpanRangeError,
    },
}

impl MalformedMarkupError {
    pub fn offset(&self) -> usize {
        match self {
            Self::UnterminatedTag { offset }
            | Self::UnknownTag { offset, .. }
            | Self::UnexpectedClosingTag { offset, .. }
            | Self::MismatchedClosingTag { offset, .. }
            | Self::UnclosedTag { offset, .. }
            | Self::UnterminatedEntity { offset }
            | Self::UnknownEntity { offset, .. }
            | Self::InvalidColor { offset, .. }
            | Self::SpanOutOfRange { offset, .. } => *offset,
        }
    }
}

impl Display for MalformedMarkupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnterminatedTag { offset } => write!(f, "unterminated tag at byte {offset}"),
            Self::UnknownTag { offset, tag } => {
                write!(f, "unknown tag `{tag}` at byte {offset}")
            }
            Self::UnexpectedClosingTag { offset, tag } => {
                write!(f, "closing tag `{tag}` without open tag at byte {offset}")
            }
            Self::MismatchedClosingTag {
                offset,
                expected,
                found,
            } => write!(
                f,
                "closing tag `{found}` does not match open `{expected}` at byte {offset}"
            ),
            Self::UnclosedTag { offset, tag } => {
                write!(f, "tag `{tag}` opened at byte {offset} is never closed")
            }
            Self::UnterminatedEntity { offset } => {
                write!(f, "unterminated entity at byte {offset}")
            }
            Self::UnknownEntity { offset, entity } => {
                write!(f, "unknown entity `&{entity};` at byte {offset}")
            }
            Self::InvalidColor { offset, value } => {
                write!(f, "invalid font color `{value}` at byte {offset}")
            }
            Self::SpanOutOfRange { offset, source } => {
                write!(f, "{source} at byte {offset}")
            }
        }
    }
}

impl Error for MalformedMarkupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::SpanOutOfRange { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Serializes a buffer into note-body markup.
///
/// Text is split into maximal runs of identical effective style. Tags that
/// the next run shares as a prefix stay open, so `<b>a</b><b>b</b>` is
/// never produced for adjacent bold runs.
pub fn encode(buffer: &FormattedText) -> String {
    let mut out = String::with_capacity(buffer.text().len());
    let mut open: Vec<Attribute> = Vec::new();

    for (ch, style) in buffer.text().chars().zip(buffer.styles()) {
        let wanted = style.attributes();
        let shared = open
            .iter()
            .zip(wanted.iter())
            .take_while(|(current, next)| current == next)
            .count();

        while open.len() > shared {
            if let Some(attribute) = open.pop() {
                push_close_tag(&mut out, attribute);
            }
        }
        for attribute in &wanted[shared..] {
            push_open_tag(&mut out, *attribute);
            open.push(*attribute);
        }

        push_escaped(&mut out, ch);
    }

    while let Some(attribute) = open.pop() {
        push_close_tag(&mut out, attribute);
    }
    out
}

/// Parses note-body markup into a buffer.
///
/// Only non-empty spans are emitted. Tag names are matched
/// case-insensitively.
///
/// # Errors
/// - Returns `MalformedMarkupError` on unbalanced or unknown tags, bad
///   entities, or an unusable `<font>` color.
pub fn decode(markup: &str) -> Result<FormattedText, MalformedMarkupError> {
    let mut text = String::with_capacity(markup.len());
    let mut char_len = 0usize;
    let mut open: Vec<OpenTag> = Vec::new();
    let mut spans: Vec<(usize, Span)> = Vec::new();
    let mut opened = 0usize;
    let mut pos = 0usize;

    while let Some(ch) = markup[pos..].chars().next() {
        match ch {
            '<' => {
                let close = markup[pos..]
                    .find('>')
                    .ok_or(MalformedMarkupError::UnterminatedTag { offset: pos })?;
                let inner = &markup[pos + 1..pos + close];
                match parse_tag(inner, pos)? {
                    Tag::Open(attribute, name) => {
                        open.push(OpenTag {
                            attribute,
                            name,
                            offset: pos,
                            start: char_len,
                            order: opened,
                        });
                        opened += 1;
                    }
                    Tag::Close(name) => {
                        let top = open
                            .pop()
                            .ok_or_else(|| MalformedMarkupError::UnexpectedClosingTag {
                                offset: pos,
                                tag: name.to_string(),
                            })?;
                        if top.name != name {
                            return Err(MalformedMarkupError::MismatchedClosingTag {
                                offset: pos,
                                expected: top.name.to_string(),
                                found: name.to_string(),
                            });
                        }
                        if char_len > top.start {
                            let span = Span::new(top.attribute, top.start, char_len);
                            spans.push((top.order, span));
                        }
                    }
                }
                pos += close + 1;
            }
            '&' => {
                let (decoded, consumed) = parse_entity(&markup[pos..], pos)?;
                text.push(decoded);
                char_len += 1;
                pos += consumed;
            }
            other => {
                text.push(other);
                char_len += 1;
                pos += other.len_utf8();
            }
        }
    }

    if let Some(unclosed) = open.pop() {
        return Err(MalformedMarkupError::UnclosedTag {
            offset: unclosed.offset,
            tag: unclosed.name.to_string(),
        });
    }

    // Re-apply in opening order so an inner color overrides its outer one.
    spans.sort_by_key(|(order, _)| *order);
    let spans = spans.into_iter().map(|(_, span)| span).collect();
    FormattedText::from_parts(text, spans).map_err(|source| {
        MalformedMarkupError::SpanOutOfRange {
            offset: markup.len(),
            source,
        }
    })
}

/// Decodes `markup`, falling back to unformatted text on error.
///
/// This is the load-path policy: a corrupt body is still shown to the user
/// verbatim instead of being lost.
pub fn decode_or_plain(markup: &str) -> FormattedText {
    match decode(markup) {
        Ok(buffer) => buffer,
        Err(err) => {
            warn!(
                "event=markup_decode module=richtext status=fallback error_offset={} error={}",
                err.offset(),
                err
            );
            FormattedText::plain(markup)
        }
    }
}

/// Markup-free text of a note body, used by search and previews.
pub fn plain_text(markup: &str) -> String {
    let buffer = decode_or_plain(markup);
    buffer.text().to_string()
}

struct OpenTag {
    attribute: Attribute,
    name: &'static str,
    offset: usize,
    start: usize,
    order: usize,
}

enum Tag {
    Open(Attribute, &'static str),
    Close(&'static str),
}

fn parse_tag(inner: &str, offset: usize) -> Result<Tag, MalformedMarkupError> {
    let trimmed = inner.trim();
    if let Some(closing) = trimmed.strip_prefix('/') {
        let name = canonical_tag_name(closing.trim()).ok_or_else(|| {
            MalformedMarkupError::UnknownTag {
                offset,
                tag: trimmed.to_string(),
            }
        })?;
        return Ok(Tag::Close(name));
    }

    let (raw_name, attrs) = match trimmed.find(char::is_whitespace) {
        Some(split) => (&trimmed[..split], trimmed[split..].trim()),
        None => (trimmed, ""),
    };
    let unknown = || MalformedMarkupError::UnknownTag {
        offset,
        tag: trimmed.to_string(),
    };
    let name = canonical_tag_name(raw_name).ok_or_else(unknown)?;

    let attribute = match name {
        "b" if attrs.is_empty() => Attribute::Bold,
        "i" if attrs.is_empty() => Attribute::Italic,
        "u" if attrs.is_empty() => Attribute::Underline,
        "font" => {
            let value = FONT_COLOR_ATTR_RE
                .captures(attrs)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str())
                .ok_or_else(|| MalformedMarkupError::InvalidColor {
                    offset,
                    value: attrs.to_string(),
                })?;
            let color =
                TextColor::from_markup(value).ok_or_else(|| MalformedMarkupError::InvalidColor {
                    offset,
                    value: value.to_string(),
                })?;
            Attribute::Color(color)
        }
        _ => return Err(unknown()),
    };
    Ok(Tag::Open(attribute, name))
}

fn canonical_tag_name(raw: &str) -> Option<&'static str> {
    match raw.to_ascii_lowercase().as_str() {
        "b" => Some("b"),
        "i" => Some("i"),
        "u" => Some("u"),
        "font" => Some("font"),
        _ => None,
    }
}

/// Parses `&name;` at the start of `input`; returns the character and the
/// number of bytes consumed.
fn parse_entity(input: &str, offset: usize) -> Result<(char, usize), MalformedMarkupError> {
    let semi = input
        .char_indices()
        .take(MAX_ENTITY_LEN + 2)
        .find(|(_, ch)| *ch == ';')
        .map(|(index, _)| index)
        .ok_or(MalformedMarkupError::UnterminatedEntity { offset })?;
    let entity = &input[1..semi];

    let decoded = match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        numeric => parse_numeric_entity(numeric),
    };

    decoded
        .map(|ch| (ch, semi + 1))
        .ok_or_else(|| MalformedMarkupError::UnknownEntity {
            offset,
            entity: entity.to_string(),
        })
}

fn parse_numeric_entity(entity: &str) -> Option<char> {
    let digits = entity.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<u32>().ok()?,
    };
    char::from_u32(code)
}

fn push_open_tag(out: &mut String, attribute: Attribute) {
    match attribute {
        Attribute::Bold => out.push_str("<b>"),
        Attribute::Italic => out.push_str("<i>"),
        Attribute::Underline => out.push_str("<u>"),
        Attribute::Color(color) => {
            out.push_str("<font color=\"");
            out.push_str(color.name());
            out.push_str("\">");
        }
    }
}

fn push_close_tag(out: &mut String, attribute: Attribute) {
    out.push_str(match attribute {
        Attribute::Bold => "</b>",
        Attribute::Italic => "</i>",
        Attribute::Underline => "</u>",
        Attribute::Color(_) => "</font>",
    });
}

fn push_escaped(out: &mut String, ch: char) {
    match ch {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        other => out.push(other),
    }
}
