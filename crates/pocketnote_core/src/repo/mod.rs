//! Repository layer for note persistence.
//!
//! # Responsibility
//! - Define the note store contract used by services and embedders.
//! - Isolate SQLite query details from save/search policies.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`) in addition to
//!   storage errors.
//! - Access from several threads goes through `SharedNoteStore`.

pub mod note_repo;
pub mod shared;
