//! Roll sequences: where a table starts rolling and what it chains into.

use serde::{Deserialize, Serialize};

/// One step of a roll chain: a subtable name and how many rolls to make on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceStep {
    /// The subtable to roll on.
    pub table: String,
    /// How many times to roll. Bare names in a definition imply 1.
    pub times: u32,
}

impl SequenceStep {
    /// A single roll on the named subtable.
    pub fn once(table: &str) -> Self {
        Self {
            table: table.to_string(),
            times: 1,
        }
    }
}

fn default_times() -> u32 {
    1
}

/// A chain step in any of the accepted author shapes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StepSpec {
    Name(String),
    Full {
        table: String,
        #[serde(default = "default_times")]
        times: u32,
    },
}

impl From<StepSpec> for SequenceStep {
    fn from(spec: StepSpec) -> Self {
        match spec {
            StepSpec::Name(table) => Self { table, times: 1 },
            StepSpec::Full { table, times } => Self { table, times },
        }
    }
}

/// How a table resolves when it is rolled on.
///
/// Absent or empty means "roll once on the first declared subtable". A bare
/// name starts the roll on that subtable instead. A chain rolls every step
/// in order, appending one result per roll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Sequence {
    /// No sequence declared; the first declared subtable is rolled once.
    #[default]
    Empty,
    /// Roll once, starting on the named subtable.
    Start(String),
    /// Roll each step in order.
    Chain(Vec<SequenceStep>),
}

impl Sequence {
    /// Returns true when no sequence was declared.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Start(name) => name.is_empty(),
            Self::Chain(steps) => steps.is_empty(),
        }
    }
}

/// The raw shapes a sequence deserializes from.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SequenceSpec {
    Name(String),
    Steps(Vec<StepSpec>),
}

impl<'de> Deserialize<'de> for Sequence {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let spec = SequenceSpec::deserialize(deserializer)?;
        Ok(match spec {
            SequenceSpec::Name(name) if name.is_empty() => Self::Empty,
            SequenceSpec::Name(name) => Self::Start(name),
            SequenceSpec::Steps(steps) if steps.is_empty() => Self::Empty,
            SequenceSpec::Steps(steps) => {
                Self::Chain(steps.into_iter().map(SequenceStep::from).collect())
            }
        })
    }
}

impl Serialize for Sequence {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Empty => serializer.serialize_str(""),
            Self::Start(name) => serializer.serialize_str(name),
            Self::Chain(steps) => steps.serialize(serializer),
        }
    }
}
