//! The random table data model.
//!
//! A [`RandomTable`] is the normalized, in-memory form of one author-written
//! table definition: named subtables of weighted entries, an optional roll
//! sequence, an optional macro chain aggregating other tables, and display
//! flags. Construction normalizes the permissive JSON shapes; resolution
//! itself lives in the engine crate and never mutates the table.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::entry::{Entries, TableEntry};
use crate::error::{CoreResult, FieldError};
use crate::sequence::Sequence;
use crate::token;

/// Name of the subtable a legacy single-list definition normalizes into,
/// and the subtable an unqualified roll starts on by convention.
pub const DEFAULT_SUBTABLE: &str = "default";

/// A named, ordered list of weighted entries within one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtable {
    /// The subtable name.
    pub name: String,
    /// The entries, in declared order.
    pub entries: Vec<TableEntry>,
}

impl Subtable {
    /// Create a subtable from a name and its entries.
    pub fn new(name: &str, entries: Vec<TableEntry>) -> Self {
        Self {
            name: name.to_string(),
            entries,
        }
    }
}

/// Display flags for one subtable's results. Consumed only by formatting,
/// never by resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintOptions {
    /// Suppress the subtable name in formatted output.
    #[serde(default, deserialize_with = "flag", skip_serializing_if = "is_false")]
    pub hide_table: bool,
    /// Suppress the result text in formatted output.
    #[serde(default, deserialize_with = "flag", skip_serializing_if = "is_false")]
    pub hide_result: bool,
    /// Suppress the description in formatted output.
    #[serde(default, deserialize_with = "flag", skip_serializing_if = "is_false")]
    pub hide_desc: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Accept the original definitions' 0/1 integer flags as well as booleans.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Num(u64),
    }
    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Num(n) => n != 0,
    })
}

/// The subtable mapping in document order.
#[derive(Debug, Default)]
struct Subtables(Vec<Subtable>);

impl<'de> Deserialize<'de> for Subtables {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SubtablesVisitor;

        impl<'de> Visitor<'de> for SubtablesVisitor {
            type Value = Subtables;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a map of subtable name to entries")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                // entries arrive in document order; keep it, it decides
                // which subtable an unqualified roll starts on
                let mut subtables = Vec::new();
                while let Some((name, entries)) = map.next_entry::<String, Entries>()? {
                    subtables.push(Subtable::new(&name, entries.0));
                }
                Ok(Subtables(subtables))
            }
        }

        deserializer.deserialize_map(SubtablesVisitor)
    }
}

/// The raw configuration shape a table definition deserializes from.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTable {
    id: String,
    key: String,
    title: String,
    author: String,
    description: String,
    source: String,
    tags: Vec<String>,
    sequence: Sequence,
    /// Legacy single-list form, normalized into the `default` subtable.
    table: Option<Entries>,
    tables: Subtables,
    #[serde(rename = "macro")]
    macro_keys: Vec<String>,
    print: HashMap<String, PrintOptions>,
}

/// One author-defined random table, normalized and ready to roll on.
#[derive(Debug, Clone, Default)]
pub struct RandomTable {
    /// Storage identifier; the key falls back to this when unset.
    pub id: String,
    /// Unique identifier within a table registry.
    pub key: String,
    /// Display title.
    pub title: String,
    /// Table author.
    pub author: String,
    /// Free-text description.
    pub description: String,
    /// Where the table came from.
    pub source: String,
    /// Subject tags.
    pub tags: Vec<String>,
    /// Where to start rolling, or the chain of subtables to roll through.
    pub sequence: Sequence,
    /// Named subtables in declared order.
    pub tables: Vec<Subtable>,
    /// Keys of other tables to resolve in order instead of rolling here.
    /// A table with a macro defines no rollable entries of its own.
    pub macro_keys: Vec<String>,
    /// Per-subtable display flags.
    pub print: HashMap<String, PrintOptions>,
    /// Lazily computed transitive table references, see [`Self::dependencies`].
    dependencies: OnceLock<Vec<String>>,
}

impl From<RawTable> for RandomTable {
    fn from(raw: RawTable) -> Self {
        let mut tables = raw.tables.0;
        if let Some(legacy) = raw.table {
            // the legacy array wins over an explicit `default` subtable
            match tables.iter_mut().find(|s| s.name == DEFAULT_SUBTABLE) {
                Some(existing) => existing.entries = legacy.0,
                None => tables.push(Subtable::new(DEFAULT_SUBTABLE, legacy.0)),
            }
        }
        let key = if raw.key.is_empty() {
            raw.id.clone()
        } else {
            raw.key
        };
        Self {
            id: raw.id,
            key,
            title: raw.title,
            author: raw.author,
            description: raw.description,
            source: raw.source,
            tags: raw.tags,
            sequence: raw.sequence,
            tables,
            macro_keys: raw.macro_keys,
            print: raw.print,
            dependencies: OnceLock::new(),
        }
    }
}

impl<'de> Deserialize<'de> for RandomTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawTable::deserialize(deserializer).map(Self::from)
    }
}

impl Serialize for RandomTable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // export the definition only: empty fields stripped, never the id
        // or the dependency cache
        struct TablesSer<'a>(&'a [Subtable]);
        impl Serialize for TablesSer<'_> {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for subtable in self.0 {
                    map.serialize_entry(&subtable.name, &subtable.entries)?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(None)?;
        if !self.key.is_empty() {
            map.serialize_entry("key", &self.key)?;
        }
        if !self.title.is_empty() {
            map.serialize_entry("title", &self.title)?;
        }
        if !self.author.is_empty() {
            map.serialize_entry("author", &self.author)?;
        }
        if !self.description.is_empty() {
            map.serialize_entry("description", &self.description)?;
        }
        if !self.source.is_empty() {
            map.serialize_entry("source", &self.source)?;
        }
        if !self.tags.is_empty() {
            map.serialize_entry("tags", &self.tags)?;
        }
        if !self.sequence.is_empty() {
            map.serialize_entry("sequence", &self.sequence)?;
        }
        if !self.tables.is_empty() {
            map.serialize_entry("tables", &TablesSer(&self.tables))?;
        }
        if !self.macro_keys.is_empty() {
            map.serialize_entry("macro", &self.macro_keys)?;
        }
        if !self.print.is_empty() {
            map.serialize_entry("print", &self.print)?;
        }
        map.end()
    }
}

impl RandomTable {
    /// Create an empty table with the given key.
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Self::default()
        }
    }

    /// Add a subtable, builder-style.
    pub fn with_subtable(mut self, name: &str, entries: Vec<TableEntry>) -> Self {
        self.tables.push(Subtable::new(name, entries));
        self
    }

    /// Set the roll sequence, builder-style.
    pub fn with_sequence(mut self, sequence: Sequence) -> Self {
        self.sequence = sequence;
        self
    }

    /// Set the macro chain, builder-style.
    pub fn with_macro(mut self, keys: &[&str]) -> Self {
        self.macro_keys = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    /// Set the title, builder-style.
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    /// Parse a table definition from JSON, accepting both the legacy
    /// single-list form and the subtable mapping form.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the definition back to JSON for export, with empty fields
    /// stripped. `pretty` controls indentation.
    pub fn to_json(&self, pretty: bool) -> CoreResult<String> {
        Ok(if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        })
    }

    /// Look up a subtable by name.
    pub fn subtable(&self, name: &str) -> Option<&Subtable> {
        self.tables.iter().find(|s| s.name == name)
    }

    /// The first declared subtable — where an unqualified roll starts.
    pub fn first_subtable(&self) -> Option<&Subtable> {
        self.tables.first()
    }

    /// Find the entry behind a label, in case only the label is known and
    /// the weight or description is needed. An empty subtable name means
    /// the `default` subtable.
    pub fn find_entry(&self, label: &str, subtable: &str) -> Option<&TableEntry> {
        let name = if subtable.is_empty() {
            DEFAULT_SUBTABLE
        } else {
            subtable
        };
        self.subtable(name)?.entries.iter().find(|e| e.label == label)
    }

    /// Check the definition for problems before saving or registering.
    /// An empty vec means the table is valid.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.title.is_empty() {
            errors.push(FieldError::new("title", "Title cannot be blank"));
        }
        if self.tables.is_empty() && self.macro_keys.is_empty() {
            errors.push(FieldError::new(
                "tables",
                "Both tables and macro cannot be empty",
            ));
        }
        errors
    }

    /// The keys of other tables this table's entries reference through
    /// `table` tokens, deduplicated in first-seen order, with
    /// self-references (`this`) excluded. Computed once and cached; used by
    /// tooling and validation, never consulted at roll time.
    pub fn dependencies(&self) -> &[String] {
        self.dependencies.get_or_init(|| {
            let mut keys: Vec<String> = Vec::new();
            for subtable in &self.tables {
                for entry in &subtable.entries {
                    for tok in token::find_tokens(&entry.label) {
                        if tok.kind != "table" {
                            continue;
                        }
                        let Some(arg) = tok.args.first() else {
                            continue;
                        };
                        let (key, _) = token::split_multiplicity(arg);
                        if key != "this" && !keys.iter().any(|k| k == key) {
                            keys.push(key.to_string());
                        }
                    }
                }
            }
            keys
        })
    }
}
