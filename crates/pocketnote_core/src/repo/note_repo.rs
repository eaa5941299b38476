//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/read/list/update/delete/clear/count over `notes`.
//! - Issue note ids from the persisted `next_note_id` counter.
//!
//! # Invariants
//! - Ids are never reissued: the counter only grows, even across
//!   `clear_all`, and always stays above the largest stored id.
//! - `update_note` fails with `NotFound` instead of inserting.
//! - `delete_note` on a missing id is a no-op.
//! - Read paths reject out-of-range persisted ids instead of masking them.

use crate::db::DbError;
use crate::model::note::{Note, NoteId};
use log::{debug, info};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const NOTE_SELECT_SQL: &str = "SELECT id, body FROM notes";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for note persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Storage medium failure (open, read or write).
    Db(DbError),
    NotFound(NoteId),
    InvalidData(String),
    /// Connection is not bootstrapped with the note schema.
    MissingRequiredTable(&'static str),
    /// A thread panicked while holding the shared store lock.
    LockPoisoned,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "connection is missing required table `{table}`")
            }
            Self::LockPoisoned => write!(f, "note store lock poisoned"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable CRUD contract for notes.
pub trait NoteRepository {
    /// Stores a new note under the next issued id.
    fn create_note(&self, body: &str) -> RepoResult<Note>;
    fn find_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
    /// All notes ordered by ascending id.
    fn list_notes(&self) -> RepoResult<Vec<Note>>;
    /// Replaces the body of an existing note.
    fn update_note(&self, note: &Note) -> RepoResult<()>;
    /// Removes the note with `note.id`; returns whether a row was removed.
    fn delete_note(&self, note: &Note) -> RepoResult<bool>;
    /// Removes every note; returns the number of removed rows.
    fn clear_all(&self) -> RepoResult<usize>;
    fn count_notes(&self) -> RepoResult<u64>;

    /// Like `find_note`, but a missing id is an error.
    fn get_note(&self, id: NoteId) -> RepoResult<Note> {
        self.find_note(id)?.ok_or(RepoError::NotFound(id))
    }
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Wraps a connection returned by `db::open_db*`.
    ///
    /// # Errors
    /// - `MissingRequiredTable` when the note schema is absent.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        for table in ["notes", "store_meta"] {
            if !table_exists(conn, table)? {
                return Err(RepoError::MissingRequiredTable(table));
            }
        }
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn create_note(&self, body: &str) -> RepoResult<Note> {
        let tx = self.conn.unchecked_transaction()?;
        let next: i64 = tx.query_row(
            "SELECT MAX(
                value,
                COALESCE((SELECT MAX(id) + 1 FROM notes), 0)
             )
             FROM store_meta
             WHERE key = 'next_note_id';",
            [],
            |row| row.get(0),
        )?;
        let id = parse_note_id(next)?;

        tx.execute(
            "INSERT INTO notes (id, body) VALUES (?1, ?2);",
            params![next, body],
        )?;
        tx.execute(
            "UPDATE store_meta SET value = ?1 WHERE key = 'next_note_id';",
            [next + 1],
        )?;
        tx.commit()?;

        debug!("event=note_create module=repo status=ok id={id} body_len={}", body.len());
        Ok(Note::new(id, body))
    }

    fn find_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(row)?));
        }
        Ok(None)
    }

    fn list_notes(&self) -> RepoResult<Vec<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn update_note(&self, note: &Note) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE notes SET body = ?2 WHERE id = ?1;",
            params![note.id, note.body.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(note.id));
        }
        Ok(())
    }

    fn delete_note(&self, note: &Note) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?1;", [note.id])?;
        if changed == 0 {
            debug!("event=note_delete module=repo status=noop id={}", note.id);
        }
        Ok(changed > 0)
    }

    fn clear_all(&self) -> RepoResult<usize> {
        let removed = self.conn.execute("DELETE FROM notes;", [])?;
        info!("event=note_clear_all module=repo status=ok removed={removed}");
        Ok(removed)
    }

    fn count_notes(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM notes;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative note count `{count}`")))
    }
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let raw_id: i64 = row.get("id")?;
    Ok(Note {
        id: parse_note_id(raw_id)?,
        body: row.get("body")?,
    })
}

fn parse_note_id(raw: i64) -> RepoResult<NoteId> {
    NoteId::try_from(raw)
        .map_err(|_| RepoError::InvalidData(format!("note id `{raw}` is out of range")))
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
