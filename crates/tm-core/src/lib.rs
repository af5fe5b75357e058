//! Core types for Tablemancer: random tables, entries, tokens, and results.
//!
//! This crate defines the data model the resolution engine rolls against.
//! It is independent of any randomness — you can construct a
//! [`RandomTable`] programmatically or deserialize one from JSON, scan its
//! token grammar, and validate it, all without an engine.

/// Weighted table entries and the shapes they deserialize from.
pub mod entry;
/// Error types used throughout the crate.
pub mod error;
/// Resolution results and their formatting.
pub mod result;
/// Roll sequences and chain steps.
pub mod sequence;
/// The random table data model.
pub mod table;
/// Small text helpers.
pub mod text;
/// Token grammar for embedded substitutions.
pub mod token;

pub use entry::TableEntry;
pub use error::{CoreResult, FieldError, TableError};
pub use result::{ResultEntry, TableResult};
pub use sequence::{Sequence, SequenceStep};
pub use table::{DEFAULT_SUBTABLE, PrintOptions, RandomTable, Subtable};
pub use token::{Token, find_tokens, split_multiplicity, substitute};
