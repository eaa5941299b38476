//! Note search entry points.
//!
//! # Responsibility
//! - Filter notes by the text a user actually sees, not by stored markup.
//!
//! # See also
//! - `service::note_service::NoteService::search`

pub mod filter;
