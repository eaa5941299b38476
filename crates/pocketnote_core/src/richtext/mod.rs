//! Rich-text buffer and markup codec.
//!
//! # Responsibility
//! - Model formatted text independently of any rendering toolkit.
//! - Convert between buffers and the markup stored in note bodies.
//!
//! # Invariants
//! - Nothing here touches persistence; the store treats bodies as opaque.

pub mod buffer;
pub mod codec;

pub use buffer::{Attribute, CharStyle, FormattedText, Span, SpanRangeError, TextColor};
pub use codec::{decode, decode_or_plain, encode, plain_text, MalformedMarkupError};
