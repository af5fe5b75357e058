//! Resolution results and their human-readable formatting.

use serde::{Deserialize, Serialize};

use crate::table::{DEFAULT_SUBTABLE, RandomTable};
use crate::text::capitalize;

/// One produced unit of output, tagged with the subtable it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    /// The subtable (or, for macro aggregation, the table key) this entry
    /// was rolled on.
    pub table: String,
    /// The resolved entry text, with all tokens substituted.
    pub result: String,
    /// The resolved description, empty when the entry had none.
    pub desc: String,
}

impl ResultEntry {
    /// Create a result entry with no description.
    pub fn new(table: &str, result: &str) -> Self {
        Self {
            table: table.to_string(),
            result: result.to_string(),
            desc: String::new(),
        }
    }
}

/// The ordered sequence of entries produced by one resolution call.
///
/// Every call returns a fresh value; nothing is cached on the table, so
/// concurrent resolutions of the same table cannot race on shared state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableResult {
    /// The produced entries, in roll order.
    pub entries: Vec<ResultEntry>,
}

impl TableResult {
    /// An empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries produced.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing was produced.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the produced entries in order.
    pub fn iter(&self) -> std::slice::Iter<'_, ResultEntry> {
        self.entries.iter()
    }

    /// The first entry's result text, or empty — the "simple" view of a
    /// single-roll table.
    pub fn first_label(&self) -> &str {
        self.entries.first().map(|e| e.result.as_str()).unwrap_or("")
    }

    /// Find the entry produced for a specific subtable. An empty name means
    /// the `default` subtable.
    pub fn for_table(&self, table: &str) -> Option<&ResultEntry> {
        let name = if table.is_empty() {
            DEFAULT_SUBTABLE
        } else {
            table
        };
        self.entries.iter().find(|e| e.table == name)
    }
}

impl From<Vec<ResultEntry>> for TableResult {
    fn from(entries: Vec<ResultEntry>) -> Self {
        Self { entries }
    }
}

impl IntoIterator for TableResult {
    type Item = ResultEntry;
    type IntoIter = std::vec::IntoIter<ResultEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl RandomTable {
    /// Render a resolution result as display text.
    ///
    /// With `simple` set, only the first entry's result text is returned.
    /// Otherwise each entry becomes one `Subtable: Result` line (the
    /// `default` subtable prints its result alone), followed by the
    /// description when present, all governed by this table's per-subtable
    /// [`crate::PrintOptions`].
    pub fn format_result(&self, result: &TableResult, simple: bool) -> String {
        if simple {
            return result.first_label().to_string();
        }
        let mut out = String::new();
        for entry in result.iter() {
            match self.print.get(&entry.table) {
                Some(opts) => {
                    if !opts.hide_table {
                        out.push_str(&capitalize(&entry.table));
                        out.push_str(": ");
                    }
                    if !opts.hide_result {
                        out.push_str(&capitalize(&entry.result));
                        out.push('\n');
                    }
                    if !opts.hide_desc && !entry.desc.is_empty() {
                        out.push_str(&entry.desc);
                        out.push('\n');
                    }
                }
                None => {
                    if entry.table == DEFAULT_SUBTABLE {
                        out.push_str(&capitalize(&entry.result));
                    } else {
                        out.push_str(&capitalize(&entry.table));
                        out.push_str(": ");
                        out.push_str(&capitalize(&entry.result));
                    }
                    out.push('\n');
                    if !entry.desc.is_empty() {
                        out.push_str(&entry.desc);
                        out.push('\n');
                    }
                }
            }
        }
        out.trim_end().to_string()
    }
}
