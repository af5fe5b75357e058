//! The resolution orchestrator.
//!
//! A [`Randomizer`] is one engine context: it owns the RNG, the token-type
//! registry, and the injected table lookup, and it walks a table's macro
//! chain or roll sequence to produce an ordered [`TableResult`]. Selected
//! entry text is re-run through the token grammar, so entries can embed
//! dice rolls and references to other tables to any depth — bounded by a
//! recursion guard that turns table cycles into an error instead of a
//! stack overflow.

use std::collections::HashMap;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tm_core::text::capitalize;
use tm_core::token;
use tm_core::{
    DEFAULT_SUBTABLE, RandomTable, ResultEntry, Sequence, SequenceStep, TableEntry, TableResult,
    Token,
};

use crate::dice::DiceNotation;
use crate::error::{EngineError, EngineResult};
use crate::select;

/// Maximum resolution recursion depth before a chain of table references is
/// treated as cyclic.
pub const MAX_DEPTH: usize = 32;

/// A pluggable resolver for one token kind. Receives the engine, the parsed
/// token, and the table the token appeared in (for `this` references).
pub type TokenResolver =
    Rc<dyn Fn(&mut Randomizer, &Token, Option<&RandomTable>) -> EngineResult<String>>;

/// The injected mapping from table key to table instance.
pub type TableLookup = Box<dyn Fn(&str) -> Option<Rc<RandomTable>>>;

/// The table resolution engine.
///
/// One instance is one isolated context — registries are owned state, not
/// process-wide singletons, so multi-tenant and test use stay independent.
/// All randomness flows from the single owned RNG; seed it for reproducible
/// roll sequences.
pub struct Randomizer {
    rng: StdRng,
    lookup: TableLookup,
    token_types: HashMap<String, TokenResolver>,
    depth: usize,
}

impl Randomizer {
    /// Create an engine seeded from the operating system.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Create an engine with a fixed seed for reproducible rolls.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let mut rand = Self {
            rng,
            lookup: Box::new(|_| None),
            token_types: HashMap::new(),
            depth: 0,
        };
        rand.register_token_type("roll", roll_token);
        rand.register_token_type("table", table_token);
        rand
    }

    /// Install the table lookup used by `table` tokens and macro expansion.
    pub fn set_table_lookup<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<Rc<RandomTable>> + 'static,
    {
        self.lookup = Box::new(lookup);
    }

    /// Look a table up by key through the installed lookup.
    pub fn table_by_key(&self, key: &str) -> Option<Rc<RandomTable>> {
        (self.lookup)(key)
    }

    /// Register a resolver for a token kind, replacing any existing one.
    /// Kinds no resolver is registered for pass through verbatim.
    pub fn register_token_type<F>(&mut self, kind: &str, resolver: F)
    where
        F: Fn(&mut Randomizer, &Token, Option<&RandomTable>) -> EngineResult<String> + 'static,
    {
        self.token_types.insert(kind.to_string(), Rc::new(resolver));
    }

    /// Returns true when a resolver is registered for the token kind.
    pub fn has_token_type(&self, kind: &str) -> bool {
        self.token_types.contains_key(kind)
    }

    /// A uniform integer in `[min, max]` (inclusive). A reversed range
    /// collapses to `min`.
    pub fn random(&mut self, min: i64, max: i64) -> i64 {
        if min > max {
            return min;
        }
        self.rng.random_range(min..=max)
    }

    /// Pick one value from parallel slices of values and weights; see
    /// [`select::pick_weighted`].
    pub fn weighted_random<'a, T>(&mut self, values: &'a [T], weights: &[u32]) -> Option<&'a T> {
        select::pick_weighted(&mut self.rng, values, weights)
    }

    /// Pick one entry from an entry list by weight.
    pub fn roll_entry<'a>(&mut self, entries: &'a [TableEntry]) -> Option<&'a TableEntry> {
        select::pick_entry(&mut self.rng, entries)
    }

    /// Evaluate a dice notation. Empty or whitespace-only notation means "no
    /// roll requested" and yields `Ok(None)` — a valid outcome distinct from
    /// any rolled number.
    pub fn roll(&mut self, notation: &str) -> EngineResult<Option<i64>> {
        let trimmed = notation.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let dice: DiceNotation = trimmed.parse()?;
        Ok(Some(dice.roll(&mut self.rng)))
    }

    /// Substitute every registered token in `text`, leaving unregistered
    /// kinds verbatim. `context` is the table the text came from, if any; it
    /// is what a `{{table:this:...}}` reference resolves against.
    ///
    /// A failing token aborts the whole call with its error rather than
    /// leaving a placeholder behind.
    pub fn resolve_tokens(
        &mut self,
        text: &str,
        context: Option<&RandomTable>,
    ) -> EngineResult<String> {
        self.guarded(|r| {
            token::substitute(text, |tok| {
                let Some(resolver) = r.token_types.get(&tok.kind).cloned() else {
                    return Ok(None);
                };
                resolver(&mut *r, tok, context).map(Some)
            })
        })
    }

    /// Resolve a table into an ordered result sequence.
    ///
    /// A table with a macro chain resolves every referenced table in order
    /// and concatenates their results. Otherwise the roll sequence decides
    /// which subtables are rolled, in order and how often; with no sequence
    /// the first declared subtable is rolled once. `forced` replaces the
    /// first selection with the entry matching that label instead of a
    /// random draw, supporting deterministic re-rolls of a single result.
    pub fn resolve_table(
        &mut self,
        table: &RandomTable,
        forced: Option<&str>,
    ) -> EngineResult<TableResult> {
        self.guarded(|r| {
            if !table.macro_keys.is_empty() {
                return r.resolve_macro(table);
            }

            let steps: Vec<SequenceStep> = match &table.sequence {
                Sequence::Empty => {
                    let first = table
                        .first_subtable()
                        .ok_or_else(|| EngineError::EmptyTable(table.key.clone()))?;
                    vec![SequenceStep::once(&first.name)]
                }
                Sequence::Start(name) => vec![SequenceStep::once(name)],
                Sequence::Chain(chain) => chain.clone(),
            };

            let mut forced = forced;
            let mut entries = Vec::new();
            for step in &steps {
                for _ in 0..step.times {
                    let subtable = table.subtable(&step.table).ok_or_else(|| {
                        EngineError::UnknownTable(format!("{}:{}", table.key, step.table))
                    })?;
                    let picked: TableEntry = match forced.take() {
                        // a forced label bypasses the random draw; an
                        // unmatched label still resolves, just without
                        // weight or description
                        Some(label) => table
                            .find_entry(label, &step.table)
                            .cloned()
                            .unwrap_or_else(|| TableEntry::new(label)),
                        None => r.roll_entry(&subtable.entries).cloned().ok_or_else(|| {
                            EngineError::EmptyTable(format!("{}:{}", table.key, step.table))
                        })?,
                    };
                    let result = r.resolve_tokens(&picked.label, Some(table))?;
                    let desc = if picked.desc.is_empty() {
                        String::new()
                    } else {
                        r.resolve_tokens(&picked.desc, Some(table))?
                    };
                    entries.push(ResultEntry {
                        table: step.table.clone(),
                        result,
                        desc,
                    });
                }
            }
            Ok(entries.into())
        })
    }

    /// Resolve each table in the macro chain and concatenate the results in
    /// order. Entries from a component's anonymous `default` subtable are
    /// re-tagged with the component's key, so an aggregated report reads as
    /// one ordered multi-table brief.
    fn resolve_macro(&mut self, table: &RandomTable) -> EngineResult<TableResult> {
        let mut entries = Vec::new();
        for key in &table.macro_keys {
            let part = self
                .table_by_key(key)
                .ok_or_else(|| EngineError::UnknownTable(key.clone()))?;
            for mut entry in self.resolve_table(&part, None)? {
                if entry.table == DEFAULT_SUBTABLE {
                    entry.table = key.clone();
                }
                entries.push(entry);
            }
        }
        Ok(entries.into())
    }

    /// Run `f` one recursion level deeper, failing when the depth bound is
    /// exhausted. Restores the depth on both success and error.
    fn guarded<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> EngineResult<T>,
    ) -> EngineResult<T> {
        if self.depth >= MAX_DEPTH {
            return Err(EngineError::CyclicReference(MAX_DEPTH));
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }
}

impl Default for Randomizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Built-in `roll` token: `{{roll:2d6+3}}` becomes the rolled number. No
/// notation renders as the empty string.
fn roll_token(
    rand: &mut Randomizer,
    token: &Token,
    _context: Option<&RandomTable>,
) -> EngineResult<String> {
    let notation = token.args.first().map(String::as_str).unwrap_or("");
    Ok(match rand.roll(notation)? {
        Some(n) => n.to_string(),
        None => String::new(),
    })
}

/// Built-in `table` token: `{{table:key}}` rolls the referenced table's
/// first subtable, `{{table:key:subtable}}` addresses a subtable and labels
/// the pick with it. The last argument may carry a `*N` multiplicity
/// suffix; the `N` picks are joined with `", "`. The key `this` addresses
/// the table the token appeared in.
fn table_token(
    rand: &mut Randomizer,
    token: &Token,
    context: Option<&RandomTable>,
) -> EngineResult<String> {
    let first = token
        .args
        .first()
        .filter(|a| !a.is_empty())
        .ok_or_else(|| EngineError::MalformedToken(token.raw.clone()))?;
    let (key, key_times) = token::split_multiplicity(first);
    let (sub, times) = match token.args.get(1) {
        Some(arg) => {
            let (name, n) = token::split_multiplicity(arg);
            (Some(name.to_string()), n)
        }
        None => (None, key_times),
    };

    let owned: Rc<RandomTable>;
    let table: &RandomTable = if key == "this" {
        context.ok_or_else(|| EngineError::UnknownTable("this".to_string()))?
    } else {
        owned = rand
            .table_by_key(key)
            .ok_or_else(|| EngineError::UnknownTable(key.to_string()))?;
        &owned
    };

    let mut picks = Vec::with_capacity(times as usize);
    for _ in 0..times {
        let subtable = match sub.as_deref() {
            Some(name) => table.subtable(name).ok_or_else(|| {
                EngineError::UnknownTable(format!("{}:{name}", table.key))
            })?,
            None => table
                .first_subtable()
                .ok_or_else(|| EngineError::EmptyTable(table.key.clone()))?,
        };
        let entry = rand.roll_entry(&subtable.entries).cloned().ok_or_else(|| {
            EngineError::EmptyTable(format!("{}:{}", table.key, subtable.name))
        })?;
        // selected text may itself hold tokens; resolve with the referenced
        // table as the new context
        let resolved = rand.resolve_tokens(&entry.label, Some(table))?;
        picks.push(match sub.as_deref() {
            Some(name) => format!("{}: {}", capitalize(name), capitalize(&resolved)),
            None => capitalize(&resolved),
        });
    }
    Ok(picks.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// The "one"/"two" fixture: default subtable with a single entry `one`,
    /// a `two` subtable with a single entry `two`.
    fn table_one() -> RandomTable {
        RandomTable::new("one")
            .with_subtable(DEFAULT_SUBTABLE, vec![TableEntry::new("one")])
            .with_subtable("two", vec![TableEntry::new("two")])
    }

    fn registry(tables: Vec<RandomTable>) -> HashMap<String, Rc<RandomTable>> {
        tables
            .into_iter()
            .map(|t| (t.key.clone(), Rc::new(t)))
            .collect()
    }

    fn engine_with(tables: Vec<RandomTable>) -> Randomizer {
        let map = registry(tables);
        let mut rand = Randomizer::with_seed(42);
        rand.set_table_lookup(move |key| map.get(key).cloned());
        rand
    }

    #[test]
    fn random_stays_in_range() {
        let mut rand = Randomizer::with_seed(1);
        for _ in 0..100 {
            let n = rand.random(1, 4);
            assert!((1..=4).contains(&n));
            let m = rand.random(0, 4);
            assert!((0..=4).contains(&m));
        }
    }

    #[test]
    fn random_degenerate_ranges() {
        let mut rand = Randomizer::with_seed(1);
        assert_eq!(rand.random(3, 3), 3);
        assert_eq!(rand.random(5, 2), 5);
    }

    #[test]
    fn roll_empty_notation_is_no_roll() {
        let mut rand = Randomizer::with_seed(1);
        assert_eq!(rand.roll("").unwrap(), None);
        assert_eq!(rand.roll("   ").unwrap(), None);
    }

    #[test]
    fn roll_ranges() {
        let mut rand = Randomizer::with_seed(1);
        for _ in 0..100 {
            assert!((1..=4).contains(&rand.roll("d4").unwrap().unwrap()));
            assert!((2..=8).contains(&rand.roll("2d4").unwrap().unwrap()));
            assert!((1..=3).contains(&rand.roll("1d6/2").unwrap().unwrap()));
        }
        assert!(matches!(
            rand.roll("bogus"),
            Err(EngineError::MalformedNotation(_))
        ));
    }

    #[test]
    fn unknown_token_kind_passes_through() {
        let mut rand = Randomizer::with_seed(1);
        let out = rand
            .resolve_tokens("this is a token {{fake:token}}", None)
            .unwrap();
        assert_eq!(out, "this is a token {{fake:token}}");
    }

    #[test]
    fn roll_token_substitutes_number() {
        let mut rand = Randomizer::with_seed(1);
        let out = rand
            .resolve_tokens("this is a token {{roll:d1}}", None)
            .unwrap();
        assert_eq!(out, "this is a token 1");
        // malformed notation fails the call, it does not corrupt output
        assert!(matches!(
            rand.resolve_tokens("{{roll:nope}}", None),
            Err(EngineError::MalformedNotation(_))
        ));
    }

    #[test]
    fn table_token_rolls_default_and_subtable() {
        let mut rand = engine_with(vec![table_one()]);
        let out = rand
            .resolve_tokens("this is a token {{table:one}}", None)
            .unwrap();
        assert_eq!(out, "this is a token One");
        let out = rand
            .resolve_tokens("this is a token {{table:one:two}}", None)
            .unwrap();
        assert_eq!(out, "this is a token Two: Two");
    }

    #[test]
    fn table_token_multiplicity() {
        let mut rand = engine_with(vec![table_one()]);
        assert_eq!(rand.resolve_tokens("{{table:one*2}}", None).unwrap(), "One, One");
        assert_eq!(
            rand.resolve_tokens("{{table:one:two*3}}", None).unwrap(),
            "Two: Two, Two: Two, Two: Two"
        );
    }

    #[test]
    fn table_token_this_addresses_context() {
        let table = table_one();
        let mut rand = Randomizer::with_seed(42);
        let out = rand
            .resolve_tokens("{{table:this:two}}", Some(&table))
            .unwrap();
        assert_eq!(out, "Two: Two");
        assert!(matches!(
            rand.resolve_tokens("{{table:this}}", None),
            Err(EngineError::UnknownTable(_))
        ));
    }

    #[test]
    fn table_token_errors() {
        let mut rand = engine_with(vec![table_one()]);
        assert!(matches!(
            rand.resolve_tokens("{{table:missing}}", None),
            Err(EngineError::UnknownTable(_))
        ));
        assert!(matches!(
            rand.resolve_tokens("{{table:one:missing}}", None),
            Err(EngineError::UnknownTable(_))
        ));
        assert!(matches!(
            rand.resolve_tokens("{{table:}}", None),
            Err(EngineError::MalformedToken(_))
        ));
    }

    #[test]
    fn custom_token_types_can_be_registered() {
        let mut rand = Randomizer::with_seed(1);
        assert!(!rand.has_token_type("bark"));
        rand.register_token_type("bark", |_, tok, _| {
            Ok(format!("{} bark", tok.args.first().cloned().unwrap_or_default()))
        });
        assert!(rand.has_token_type("bark"));
        assert_eq!(rand.resolve_tokens("{{bark:loud}}", None).unwrap(), "loud bark");
    }

    #[test]
    fn resolve_single_roll_table() {
        let mut rand = Randomizer::with_seed(42);
        let table = table_one();
        let result = rand.resolve_table(&table, None).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.entries[0].result, "one");
        assert_eq!(result.entries[0].table, DEFAULT_SUBTABLE);
    }

    #[test]
    fn forced_label_bypasses_selection() {
        let mut rand = Randomizer::with_seed(42);
        let table = table_one();
        let result = rand.resolve_table(&table, Some("two")).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.entries[0].result, "two");
    }

    #[test]
    fn sequence_chain_rolls_in_order() {
        let table = RandomTable::new("color2")
            .with_sequence(Sequence::Chain(vec![
                SequenceStep::once("shade"),
                SequenceStep::once("color"),
            ]))
            .with_subtable("shade", vec![TableEntry::new("Light")])
            .with_subtable("color", vec![TableEntry::new("Blue")]);
        let mut rand = Randomizer::with_seed(42);
        let result = rand.resolve_table(&table, None).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.entries[0].result, "Light");
        assert_eq!(result.entries[1].result, "Blue");
        assert_eq!(result.entries[1].table, "color");
    }

    #[test]
    fn sequence_step_times_repeat_the_roll() {
        let table = RandomTable::new("gems")
            .with_sequence(Sequence::Chain(vec![SequenceStep {
                table: "gem".to_string(),
                times: 3,
            }]))
            .with_subtable("gem", vec![TableEntry::new("ruby")]);
        let mut rand = Randomizer::with_seed(42);
        let result = rand.resolve_table(&table, None).unwrap();
        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|e| e.result == "ruby" && e.table == "gem"));
    }

    #[test]
    fn entry_tokens_resolve_during_table_resolution() {
        let inner = RandomTable::new("color")
            .with_subtable(DEFAULT_SUBTABLE, vec![TableEntry::new("blue")]);
        let outer = RandomTable::new("npc").with_subtable(
            DEFAULT_SUBTABLE,
            vec![
                TableEntry::new("wears {{table:color}} robes")
                    .with_desc("rolled {{roll:d1}} time"),
            ],
        );
        let mut rand = engine_with(vec![inner, outer.clone()]);
        let result = rand.resolve_table(&outer, None).unwrap();
        assert_eq!(result.entries[0].result, "wears Blue robes");
        assert_eq!(result.entries[0].desc, "rolled 1 time");
    }

    #[test]
    fn macro_chain_aggregates_in_order() {
        let part = |key: &str, label: &str| {
            RandomTable::new(key).with_subtable(DEFAULT_SUBTABLE, vec![TableEntry::new(label)])
        };
        let generator = RandomTable::new("mission_generator").with_macro(&[
            "mission_action",
            "mission_patron",
            "mission_antagonist",
            "mission_complication",
            "mission_reward",
        ]);
        let mut rand = engine_with(vec![
            part("mission_action", "rescue"),
            part("mission_patron", "noble"),
            part("mission_antagonist", "cult"),
            part("mission_complication", "storm"),
            part("mission_reward", "gold"),
        ]);
        let result = rand.resolve_table(&generator, None).unwrap();
        assert_eq!(result.len(), 5);
        let order: Vec<&str> = result.iter().map(|e| e.table.as_str()).collect();
        assert_eq!(
            order,
            [
                "mission_action",
                "mission_patron",
                "mission_antagonist",
                "mission_complication",
                "mission_reward"
            ]
        );
    }

    #[test]
    fn macro_with_missing_component_fails() {
        let generator = RandomTable::new("gen").with_macro(&["gone"]);
        let mut rand = Randomizer::with_seed(42);
        assert!(matches!(
            rand.resolve_table(&generator, None),
            Err(EngineError::UnknownTable(_))
        ));
    }

    #[test]
    fn cyclic_references_are_detected() {
        let a = RandomTable::new("a")
            .with_subtable(DEFAULT_SUBTABLE, vec![TableEntry::new("see {{table:b}}")]);
        let b = RandomTable::new("b")
            .with_subtable(DEFAULT_SUBTABLE, vec![TableEntry::new("see {{table:a}}")]);
        let mut rand = engine_with(vec![a.clone(), b]);
        assert_eq!(
            rand.resolve_table(&a, None),
            Err(EngineError::CyclicReference(MAX_DEPTH))
        );
    }

    #[test]
    fn macro_cycles_are_detected() {
        let a = RandomTable::new("a").with_macro(&["b"]);
        let b = RandomTable::new("b").with_macro(&["a"]);
        let mut rand = engine_with(vec![a.clone(), b]);
        assert_eq!(
            rand.resolve_table(&a, None),
            Err(EngineError::CyclicReference(MAX_DEPTH))
        );
    }

    #[test]
    fn depth_recovers_after_failure() {
        let a = RandomTable::new("a").with_macro(&["a"]);
        let ok = table_one();
        let mut rand = engine_with(vec![a.clone(), ok.clone()]);
        assert!(rand.resolve_table(&a, None).is_err());
        // the guard unwound; ordinary resolution still works
        assert_eq!(rand.resolve_table(&ok, None).unwrap().len(), 1);
    }

    #[test]
    fn weighted_random_surface() {
        let mut rand = Randomizer::with_seed(42);
        let values = ["red", "orange", "yellow"];
        let picked = rand.weighted_random(&values, &[1, 2, 3]).unwrap();
        assert!(values.contains(picked));
    }
}
