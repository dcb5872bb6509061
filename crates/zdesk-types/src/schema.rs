//! Typed input schemas for tools.
//!
//! A tool declares its inputs as a flat list of field specs. A small
//! interpreter checks required-field presence and value types before the
//! handler runs, so handlers can deserialize without re-validating. The same
//! specs render to JSON Schema for the `tools/list` advertisement.

use serde_json::{Map, Value, json};
use thiserror::Error;

/// The value types a tool field can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Boolean,
    StringArray,
}

impl FieldKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Integer => value.is_i64() || value.is_u64(),
            FieldKind::Boolean => value.is_boolean(),
            FieldKind::StringArray => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
        }
    }

    fn expected(self) -> &'static str {
        match self {
            FieldKind::String => "a string",
            FieldKind::Integer => "an integer",
            FieldKind::Boolean => "a boolean",
            FieldKind::StringArray => "an array of strings",
        }
    }

    fn json_schema(self) -> Value {
        match self {
            FieldKind::String => json!({"type": "string"}),
            FieldKind::Integer => json!({"type": "integer"}),
            FieldKind::Boolean => json!({"type": "boolean"}),
            FieldKind::StringArray => json!({"type": "array", "items": {"type": "string"}}),
        }
    }
}

/// One declared input field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub description: &'static str,
}

/// Validation failures, naming the offending field.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("arguments must be a JSON object")]
    NotAnObject,

    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },

    #[error("field '{field}' must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
}

/// Declared input schema for a tool.
#[derive(Debug, Clone, Default)]
pub struct ToolSchema {
    pub fields: Vec<FieldSpec>,
}

impl ToolSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required field.
    pub fn required(mut self, name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        self.fields.push(FieldSpec {
            name,
            kind,
            required: true,
            description,
        });
        self
    }

    /// Add an optional field.
    pub fn optional(mut self, name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        self.fields.push(FieldSpec {
            name,
            kind,
            required: false,
            description,
        });
        self
    }

    /// Check `args` against the declared fields.
    ///
    /// Absent or null optional fields pass; unknown fields are ignored.
    /// Missing arguments (JSON null) are treated as an empty object.
    pub fn validate(&self, args: &Value) -> Result<(), SchemaError> {
        let empty = Map::new();
        let obj = match args {
            Value::Null => &empty,
            Value::Object(map) => map,
            _ => return Err(SchemaError::NotAnObject),
        };

        for field in &self.fields {
            match obj.get(field.name) {
                None | Some(Value::Null) => {
                    if field.required {
                        return Err(SchemaError::MissingField { field: field.name });
                    }
                }
                Some(value) => {
                    if !field.kind.matches(value) {
                        return Err(SchemaError::WrongType {
                            field: field.name,
                            expected: field.kind.expected(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Render as a JSON Schema object for the tool advertisement.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for field in &self.fields {
            let mut prop = field.kind.json_schema();
            prop["description"] = Value::String(field.description.to_string());
            properties.insert(field.name.to_string(), prop);
            if field.required {
                required.push(Value::String(field.name.to_string()));
            }
        }

        let mut schema = json!({
            "type": "object",
            "properties": properties,
        });
        if !required.is_empty() {
            schema["required"] = Value::Array(required);
        }
        schema
    }
}
