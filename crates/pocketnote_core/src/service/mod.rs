//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate codec and repository calls into editor-level operations.
//! - Keep UI layers decoupled from storage and markup details.

pub mod note_service;
