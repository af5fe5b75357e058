//! Weighted table entries and the shapes they deserialize from.
//!
//! Author-written table definitions are permissive: an entry list may be an
//! array of bare strings (equal weight), an array of objects carrying
//! `label`/`weight`/`desc`, or a mapping from label to attributes. All three
//! normalize into `Vec<TableEntry>` at deserialization time so the selection
//! code only ever sees one shape.

use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// One rollable entry in a subtable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableEntry {
    /// The entry's text, possibly containing tokens.
    pub label: String,
    /// Selection weight. Entries with weight 0 are kept but never selected.
    #[serde(skip_serializing_if = "is_default_weight")]
    pub weight: u32,
    /// Optional longer description attached to the entry.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub desc: String,
}

fn is_default_weight(w: &u32) -> bool {
    *w == 1
}

impl TableEntry {
    /// Create an entry with the default weight of 1 and no description.
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            weight: 1,
            desc: String::new(),
        }
    }

    /// Set the selection weight.
    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    /// Set the description.
    pub fn with_desc(mut self, desc: &str) -> Self {
        self.desc = desc.to_string();
        self
    }
}

fn default_weight() -> u32 {
    1
}

/// The attribute object of a map-form entry (`"label": { "weight": 2 }`).
#[derive(Debug, Deserialize)]
struct EntryAttrs {
    #[serde(default = "default_weight")]
    weight: u32,
    #[serde(default)]
    desc: String,
}

/// One element of an array-form entry list: a bare label or a full object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EntrySpec {
    Label(String),
    Full {
        label: String,
        #[serde(default = "default_weight")]
        weight: u32,
        #[serde(default)]
        desc: String,
    },
}

impl From<EntrySpec> for TableEntry {
    fn from(spec: EntrySpec) -> Self {
        match spec {
            EntrySpec::Label(label) => TableEntry::new(&label),
            EntrySpec::Full {
                label,
                weight,
                desc,
            } => TableEntry {
                label,
                weight,
                desc,
            },
        }
    }
}

/// An entry list in any of the accepted author shapes, normalized to a `Vec`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Entries(
    /// The normalized entries, in declared order.
    pub Vec<TableEntry>,
);

impl<'de> Deserialize<'de> for Entries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = Entries;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("an array of entries or a map of label to attributes")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut entries = Vec::new();
                while let Some(spec) = seq.next_element::<EntrySpec>()? {
                    entries.push(spec.into());
                }
                Ok(Entries(entries))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                // visited in document order, so the map form stays ordered
                let mut entries = Vec::new();
                while let Some((label, attrs)) = map.next_entry::<String, EntryAttrs>()? {
                    entries.push(TableEntry {
                        label,
                        weight: attrs.weight,
                        desc: attrs.desc,
                    });
                }
                Ok(Entries(entries))
            }
        }

        deserializer.deserialize_any(EntriesVisitor)
    }
}
