//! Note use-case service.
//!
//! # Responsibility
//! - Bridge editor buffers and stored notes through the markup codec.
//! - Apply the save policy (create, update, auto-delete on blank, skip).
//! - Gate destructive operations behind caller-supplied confirmations.
//! - Derive list previews and run text search.
//!
//! # Invariants
//! - A blank buffer never creates a note.
//! - Corrupt bodies load as plain text; they are never dropped.
//! - Confirmation callbacks run before the store is touched.

use crate::model::note::{Note, NoteId, NoteSummary};
use crate::repo::note_repo::{NoteRepository, RepoError};
use crate::richtext::buffer::FormattedText;
use crate::richtext::codec::{decode_or_plain, encode, plain_text};
use crate::search::filter::filter_notes;
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

const PREVIEW_MAX_CHARS: usize = 100;

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Target note does not exist.
    NoteNotFound(NoteId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Write succeeded but read-back disagrees.
    InconsistentState(&'static str),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent note state: {details}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NoteNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// What `save_or_delete` did with the edited buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(Note),
    Updated(Note),
    /// Existing note was emptied and removed.
    Deleted(NoteId),
    /// New note left blank; nothing stored.
    Skipped,
}

/// Note service facade over a repository implementation.
pub struct NoteService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Direct access to the underlying store contract.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Encodes `buffer` and stores it as a new note.
    pub fn create_note(&self, buffer: &FormattedText) -> Result<Note, NoteServiceError> {
        let created = self.repo.create_note(&encode(buffer))?;
        self.repo
            .find_note(created.id)?
            .ok_or(NoteServiceError::InconsistentState(
                "created note not found in read-back",
            ))
    }

    /// Encodes `buffer` and replaces the body of note `id`.
    pub fn update_note(
        &self,
        id: NoteId,
        buffer: &FormattedText,
    ) -> Result<Note, NoteServiceError> {
        self.repo.update_note(&Note::new(id, encode(buffer)))?;
        self.repo
            .find_note(id)?
            .ok_or(NoteServiceError::InconsistentState(
                "updated note not found in read-back",
            ))
    }

    pub fn read_note(&self, id: NoteId) -> Result<Note, NoteServiceError> {
        Ok(self.repo.get_note(id)?)
    }

    /// Loads note `id` into an editable buffer.
    ///
    /// Bodies that fail to decode come back as unformatted text.
    pub fn load_buffer(&self, id: NoteId) -> Result<FormattedText, NoteServiceError> {
        let note = self.repo.get_note(id)?;
        Ok(decode_or_plain(&note.body))
    }

    pub fn list_notes(&self) -> Result<Vec<Note>, NoteServiceError> {
        Ok(self.repo.list_notes()?)
    }

    /// Lists notes as id + plain-text preview rows, ascending by id.
    pub fn list_summaries(&self) -> Result<Vec<NoteSummary>, NoteServiceError> {
        let summaries = self
            .repo
            .list_notes()?
            .into_iter()
            .map(|note| NoteSummary {
                id: note.id,
                preview: derive_preview(&note.body),
            })
            .collect();
        Ok(summaries)
    }

    /// Notes whose visible text contains `query` (case-sensitive).
    ///
    /// Re-reads the store on every call.
    pub fn search(&self, query: &str) -> Result<Vec<Note>, NoteServiceError> {
        Ok(filter_notes(query, self.repo.list_notes()?))
    }

    pub fn count(&self) -> Result<u64, NoteServiceError> {
        Ok(self.repo.count_notes()?)
    }

    /// Persists the outcome of an editing session.
    ///
    /// | buffer    | `existing_id` | action  |
    /// |-----------|---------------|---------|
    /// | non-blank | `None`        | create  |
    /// | non-blank | `Some(id)`    | update  |
    /// | blank     | `Some(id)`    | delete  |
    /// | blank     | `None`        | nothing |
    pub fn save_or_delete(
        &self,
        buffer: &FormattedText,
        existing_id: Option<NoteId>,
    ) -> Result<SaveOutcome, NoteServiceError> {
        let outcome = match (buffer.is_blank(), existing_id) {
            (false, None) => SaveOutcome::Created(self.create_note(buffer)?),
            (false, Some(id)) => SaveOutcome::Updated(self.update_note(id, buffer)?),
            (true, Some(id)) => {
                self.repo.delete_note(&Note::new(id, ""))?;
                SaveOutcome::Deleted(id)
            }
            (true, None) => SaveOutcome::Skipped,
        };

        info!(
            "event=note_save module=service status=ok outcome={} id={}",
            outcome_label(&outcome),
            outcome_id(&outcome).map_or_else(|| "none".to_string(), |id| id.to_string())
        );
        Ok(outcome)
    }

    /// Deletes note `id`; missing ids are a no-op returning `false`.
    pub fn delete_note(&self, id: NoteId) -> Result<bool, NoteServiceError> {
        Ok(self.repo.delete_note(&Note::new(id, ""))?)
    }

    /// Asks `confirm` first and deletes note `id` only on `true`.
    ///
    /// Returns whether a note was removed.
    pub fn delete_with_confirmation(
        &self,
        id: NoteId,
        confirm: impl FnOnce(NoteId) -> bool,
    ) -> Result<bool, NoteServiceError> {
        if !confirm(id) {
            return Ok(false);
        }
        self.delete_note(id)
    }

    /// Asks `confirm` with the current note count, then wipes the store.
    ///
    /// Returns `None` when the caller declined, otherwise the number of
    /// removed notes.
    pub fn clear_all_with_confirmation(
        &self,
        confirm: impl FnOnce(u64) -> bool,
    ) -> Result<Option<usize>, NoteServiceError> {
        let count = self.repo.count_notes()?;
        if !confirm(count) {
            return Ok(None);
        }
        Ok(Some(self.repo.clear_all()?))
    }
}

/// Derives the list preview of a note body.
///
/// Rules: markup stripped, whitespace runs collapsed to one space, trimmed,
/// first 100 characters kept. `None` when nothing visible remains.
pub fn derive_preview(body: &str) -> Option<String> {
    let text = plain_text(body);
    let normalized = WHITESPACE_RE.replace_all(&text, " ");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(PREVIEW_MAX_CHARS).collect())
    }
}

fn outcome_label(outcome: &SaveOutcome) -> &'static str {
    match outcome {
        SaveOutcome::Created(_) => "created",
        SaveOutcome::Updated(_) => "updated",
        SaveOutcome::Deleted(_) => "deleted",
        SaveOutcome::Skipped => "skipped",
    }
}

fn outcome_id(outcome: &SaveOutcome) -> Option<NoteId> {
    match outcome {
        SaveOutcome::Created(note) | SaveOutcome::Updated(note) => Some(note.id),
        SaveOutcome::Deleted(id) => Some(*id),
        SaveOutcome::Skipped => None,
    }
}
