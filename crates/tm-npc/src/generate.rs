//! NPC generation: fill a schema's fields through the engine.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tm_engine::Randomizer;

use crate::error::NpcResult;
use crate::schema::{FieldKind, Schema};

/// A generated field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Text produced by token resolution.
    Text(String),
    /// An integer parsed from the resolved text.
    Number(i64),
    /// A list of independently resolved text values.
    List(Vec<String>),
}

/// One generated NPC: an identifier, the schema that shaped it, and the
/// filled fields in schema order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Npc {
    /// Unique identifier for storage and retrieval.
    pub id: Uuid,
    /// Name of the schema this NPC was generated from.
    pub schema: String,
    /// The filled fields, in schema order.
    pub fields: Vec<(String, FieldValue)>,
}

impl Npc {
    /// Look up a generated field by key.
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

/// Generate an NPC from a schema.
///
/// Each field takes its fixed `default` when present; otherwise its
/// `source` token text is resolved through the engine — `count` times for
/// list fields, once otherwise. Number and modifier fields parse the
/// resolved text as an integer, falling back to 0 for non-numeric text.
pub fn generate(schema: &Schema, rand: &mut Randomizer) -> NpcResult<Npc> {
    let mut fields = Vec::with_capacity(schema.fields.len());
    for def in &schema.fields {
        let value = if let Some(fixed) = &def.default {
            match def.kind {
                FieldKind::List => FieldValue::List(vec![fixed.clone()]),
                FieldKind::Number | FieldKind::Modifier => {
                    FieldValue::Number(fixed.trim().parse().unwrap_or(0))
                }
                FieldKind::Text => FieldValue::Text(fixed.clone()),
            }
        } else {
            match def.kind {
                FieldKind::List => {
                    let mut values = Vec::with_capacity(def.count as usize);
                    for _ in 0..def.count.max(1) {
                        values.push(rand.resolve_tokens(&def.source, None)?);
                    }
                    FieldValue::List(values)
                }
                FieldKind::Number | FieldKind::Modifier => {
                    let text = rand.resolve_tokens(&def.source, None)?;
                    FieldValue::Number(text.trim().parse().unwrap_or(0))
                }
                FieldKind::Text => FieldValue::Text(rand.resolve_tokens(&def.source, None)?),
            }
        };
        fields.push((def.key.clone(), value));
    }
    Ok(Npc {
        id: Uuid::new_v4(),
        schema: schema.name.clone(),
        fields,
    })
}
