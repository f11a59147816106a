//! Structural validation of JSON request bodies.
//!
//! A [`Schema`] describes the shape a body must have. [`validate`] walks the
//! value against it and reports the first violation with a message such as
//! `8 is not of type 'object'` or `'file' is a required property`.

use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, Copy)]
pub enum Schema {
    Object {
        properties: &'static [(&'static str, Schema)],
        required: &'static [&'static str],
    },
    Number,
}

impl Schema {
    fn type_name(&self) -> &'static str {
        match self {
            Schema::Object { .. } => "object",
            Schema::Number => "number",
        }
    }
}

/// Body accepted by `POST /api/songs` and `PUT /api/songs/{id}`.
pub const SONG_SCHEMA: Schema = Schema::Object {
    properties: &[(
        "file",
        Schema::Object {
            properties: &[("id", Schema::Number)],
            required: &["id"],
        },
    )],
    required: &["file"],
};

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn validate(value: &Value, schema: &Schema) -> Result<(), ValidationError> {
    match schema {
        Schema::Number => match value {
            Value::Number(_) => Ok(()),
            _ => Err(type_mismatch(value, schema)),
        },
        Schema::Object { properties, required } => {
            let object = value.as_object().ok_or_else(|| type_mismatch(value, schema))?;
            for (name, property) in properties.iter() {
                if let Some(child) = object.get(*name) {
                    validate(child, property)?;
                }
            }
            for name in required.iter() {
                if !object.contains_key(*name) {
                    return Err(ValidationError {
                        message: format!("{} is a required property", quote(name)),
                    });
                }
            }
            Ok(())
        }
    }
}

fn type_mismatch(value: &Value, schema: &Schema) -> ValidationError {
    ValidationError {
        message: format!("{} is not of type '{}'", render(value), schema.type_name()),
    }
}

/// Renders a JSON value the way it appears in validation messages:
/// strings single-quoted, `null`/`true`/`false` as `None`/`True`/`False`.
pub fn render(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(render).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => render_object(map),
    }
}

fn render_object(map: &Map<String, Value>) -> String {
    let entries: Vec<String> = map
        .iter()
        .map(|(key, value)| format!("{}: {}", quote(key), render(value)))
        .collect();
    format!("{{{}}}", entries.join(", "))
}

fn quote(s: &str) -> String {
    if s.contains('\'') && !s.contains('"') {
        return format!("\"{}\"", s.replace('\\', "\\\\"));
    }
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}
