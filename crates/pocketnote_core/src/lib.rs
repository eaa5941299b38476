//! Core domain logic for PocketNote.
//! This crate owns note persistence and the rich-text body format.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod richtext;
pub mod search;
pub mod service;

pub use config::{bootstrap, ConfigError, CoreConfig};
pub use logging::{init_logging, logging_status, LogLevel, LoggingError};
pub use model::note::{Note, NoteId, NoteSummary};
pub use repo::note_repo::{NoteRepository, RepoError, RepoResult, SqliteNoteRepository};
pub use repo::shared::SharedNoteStore;
pub use richtext::{
    decode, decode_or_plain, encode, plain_text, Attribute, CharStyle, FormattedText,
    MalformedMarkupError, Span, SpanRangeError, TextColor,
};
pub use search::filter::{filter_notes, note_matches};
pub use service::note_service::{derive_preview, NoteService, NoteServiceError, SaveOutcome};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
