//! NPC schemas: declarative field lists that drive generation.
//!
//! A schema is plain data — a named list of fields, each saying what type
//! it holds and what token text fills it. Schemas that differ only in their
//! field lists need no inheritance; they are just different records handed
//! to the same generation function.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{NpcError, NpcResult};

/// What kind of value a schema field holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// A single line of text.
    #[default]
    Text,
    /// A signed integer.
    Number,
    /// A signed integer used as a roll modifier.
    Modifier,
    /// A list of text values, filled `count` times.
    List,
}

fn default_count() -> u32 {
    1
}

/// One field of an NPC schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name, unique within the schema.
    pub key: String,
    /// What kind of value the field holds.
    #[serde(default, rename = "type")]
    pub kind: FieldKind,
    /// Token text resolved through the engine to fill the field, e.g.
    /// `"{{table:colonial_names}}"` or `"{{roll:3d6}}"`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
    /// A fixed value that wins over the source when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// How many values to generate for a list field.
    #[serde(default = "default_count")]
    pub count: u32,
}

impl FieldDef {
    /// A text field filled from the given token source.
    pub fn text(key: &str, source: &str) -> Self {
        Self {
            key: key.to_string(),
            source: source.to_string(),
            count: 1,
            ..Self::default()
        }
    }

    /// Set the field kind, builder-style.
    pub fn with_kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the list count, builder-style.
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    /// Set the fixed default value, builder-style.
    pub fn with_default(mut self, value: &str) -> Self {
        self.default = Some(value.to_string());
        self
    }
}

/// A named NPC schema: the fields to generate, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Schema name; `base` is reserved.
    pub name: String,
    /// Schema author.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub author: String,
    /// The fields to generate, in declared order.
    pub fields: Vec<FieldDef>,
}

impl Schema {
    /// Create an empty schema with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Add a field, builder-style.
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Parse a schema definition from JSON.
    pub fn from_json(json: &str) -> NpcResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Registered schemas, looked up by name at generation time.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Schema>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema under its name. Empty and `base` names are
    /// reserved; registering over an existing name replaces it.
    pub fn register(&mut self, schema: Schema) -> NpcResult<()> {
        if schema.name.is_empty() || schema.name == "base" {
            return Err(NpcError::ReservedName(schema.name));
        }
        self.schemas.insert(schema.name.clone(), schema);
        Ok(())
    }

    /// Look up a schema by name.
    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    /// Look up a schema, failing with [`NpcError::UnknownSchema`].
    pub fn require(&self, name: &str) -> NpcResult<&Schema> {
        self.get(name)
            .ok_or_else(|| NpcError::UnknownSchema(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_rejects_reserved_names() {
        let mut registry = SchemaRegistry::new();
        assert!(matches!(
            registry.register(Schema::new("base")),
            Err(NpcError::ReservedName(_))
        ));
        assert!(matches!(
            registry.register(Schema::new("")),
            Err(NpcError::ReservedName(_))
        ));
        registry.register(Schema::new("colonist")).unwrap();
        assert!(registry.get("colonist").is_some());
        assert!(matches!(
            registry.require("nobody"),
            Err(NpcError::UnknownSchema(_))
        ));
    }

    #[test]
    fn schema_from_json() {
        let schema = Schema::from_json(
            r#"{
                "name": "colonist",
                "fields": [
                    { "key": "name", "type": "text", "source": "{{table:names}}" },
                    { "key": "strength", "type": "number", "source": "{{roll:3d6}}" },
                    { "key": "quirks", "type": "list", "source": "{{table:quirks}}", "count": 2 },
                    { "key": "homeworld", "default": "New Sonora" }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(schema.fields.len(), 4);
        assert_eq!(schema.fields[1].kind, FieldKind::Number);
        assert_eq!(schema.fields[2].count, 2);
        assert_eq!(schema.fields[3].default.as_deref(), Some("New Sonora"));
        assert_eq!(schema.fields[0].count, 1);
    }
}
