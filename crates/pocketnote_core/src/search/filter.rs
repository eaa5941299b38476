//! Substring filter over decoded note text.
//!
//! # Responsibility
//! - Select notes whose plain text contains a query substring.
//!
//! # Invariants
//! - Matching is case-sensitive and literal (no tokenizing, no wildcards).
//! - An empty query matches every note.
//! - Input order is preserved; nothing is cached or persisted.

use crate::model::note::Note;
use crate::richtext::codec::plain_text;

/// Returns whether the decoded text of `note` contains `query`.
///
/// Markup is stripped first, so `"bold"` does not match the tag `<b>`.
/// Bodies that fail to decode are searched verbatim.
pub fn note_matches(note: &Note, query: &str) -> bool {
    query.is_empty() || plain_text(&note.body).contains(query)
}

/// Keeps only the notes matching `query`, in input order.
pub fn filter_notes(query: &str, notes: impl IntoIterator<Item = Note>) -> Vec<Note> {
    notes
        .into_iter()
        .filter(|note| note_matches(note, query))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{filter_notes, note_matches};
    use crate::model::note::Note;

    #[test]
    fn markup_is_not_searchable() {
        let note = Note::new(0, "<b>bold</b> words");
        assert!(note_matches(&note, "bold words"));
        assert!(!note_matches(&note, "<b>"));
    }

    #[test]
    fn entities_are_searched_decoded() {
        let note = Note::new(0, "fish &amp; chips");
        assert!(note_matches(&note, "fish & chips"));
    }

    #[test]
    fn empty_query_keeps_everything_in_order() {
        let notes = vec![Note::new(2, "b"), Note::new(0, "a"), Note::new(1, "")];
        let filtered = filter_notes("", notes.clone());
        assert_eq!(filtered, notes);
    }
}
