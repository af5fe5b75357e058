//! Schema-driven NPC generation for Tablemancer.
//!
//! A schema is a declarative record naming the fields an NPC has and the
//! token text that fills each one. Generation is a pure function over a
//! schema and the engine: every field resolves through
//! [`tm_engine::Randomizer::resolve_tokens`], so NPC fields can draw names,
//! traits, and stats from the same random tables everything else uses.

pub mod error;
pub mod generate;
pub mod schema;

pub use error::{NpcError, NpcResult};
pub use generate::{FieldValue, Npc, generate};
pub use schema::{FieldDef, FieldKind, Schema, SchemaRegistry};
