//! Thread-shareable note store handle.
//!
//! # Responsibility
//! - Own one connection behind a mutex for embedders that call the store
//!   from several threads.
//!
//! # Invariants
//! - Every operation runs with the lock held, so id issuing in
//!   `create_note` is never interleaved with another writer.

use crate::db::{open_db, open_db_in_memory};
use crate::repo::note_repo::{RepoError, RepoResult, SqliteNoteRepository};
use crate::service::note_service::{NoteService, NoteServiceError};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;

/// Mutex-serialized note store.
pub struct SharedNoteStore {
    conn: Mutex<Connection>,
}

impl SharedNoteStore {
    /// Wraps a connection returned by `db::open_db*`.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn open_in_memory() -> RepoResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    /// Runs `f` against a repository while holding the store lock.
    pub fn with_repo<T>(
        &self,
        f: impl FnOnce(&SqliteNoteRepository<'_>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let conn = self.conn.lock().map_err(|_| RepoError::LockPoisoned)?;
        let repo = SqliteNoteRepository::try_new(&conn)?;
        f(&repo)
    }

    /// Runs `f` against a note service while holding the store lock.
    pub fn with_service<T>(
        &self,
        f: impl FnOnce(&NoteService<SqliteNoteRepository<'_>>) -> Result<T, NoteServiceError>,
    ) -> Result<T, NoteServiceError> {
        let conn = self.conn.lock().map_err(|_| RepoError::LockPoisoned)?;
        let service = NoteService::new(SqliteNoteRepository::try_new(&conn)?);
        f(&service)
    }

    /// Releases the connection, e.g. to close it explicitly.
    pub fn into_inner(self) -> RepoResult<Connection> {
        self.conn.into_inner().map_err(|_| RepoError::LockPoisoned)
    }
}
