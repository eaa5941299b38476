//! Domain model for persisted notes.
//!
//! # Responsibility
//! - Define the record shape shared by the store, service and search layers.
//!
//! # Invariants
//! - Every note is identified by a `NoteId` issued by the store.
//! - The note body is opaque markup; formatting semantics live in `richtext`.

pub mod note;
