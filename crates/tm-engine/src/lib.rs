//! Table resolution engine for Tablemancer.
//!
//! Provides dice notation evaluation, weighted selection, and the recursive
//! orchestrator that rolls [`tm_core::RandomTable`]s and substitutes
//! embedded tokens. Everything is synchronous and draws from one owned RNG,
//! so a seeded engine replays the same roll sequence.

pub mod dice;
pub mod error;
pub mod randomizer;
pub mod select;

pub use dice::{DiceNotation, MathOp, Modifier};
pub use error::{EngineError, EngineResult};
pub use randomizer::{MAX_DEPTH, Randomizer, TableLookup, TokenResolver};
pub use select::{pick_entry, pick_weighted};
