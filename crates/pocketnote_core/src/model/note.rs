//! Note domain model.
//!
//! # Responsibility
//! - Define the persisted `(id, body)` record.
//! - Define the list projection rendered by note pickers.
//!
//! # Invariants
//! - `id` is stable for the record lifetime and never reissued by the store.
//! - `body` holds serialized rich-text markup and may be empty.

use serde::{Deserialize, Serialize};

/// Store-issued note identifier.
///
/// Ids come from a monotonically increasing counter and are never reused,
/// even after the note that held them is deleted.
pub type NoteId = u32;

/// Persisted note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Stable id assigned on create.
    pub id: NoteId,
    /// Serialized rich-text markup.
    pub body: String,
}

impl Note {
    /// Builds a note value for an already-issued id.
    ///
    /// Used by callers that pass a full record to `update_note`/`delete_note`.
    pub fn new(id: NoteId, body: impl Into<String>) -> Self {
        Self {
            id,
            body: body.into(),
        }
    }
}

/// Lightweight list row: id plus a plain-text preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSummary {
    pub id: NoteId,
    /// Markup-free preview, `None` when the note has no visible text.
    pub preview: Option<String>,
}
