//! A small declarative validator for JSON values.
//!
//! A [`Schema`] maps field paths to constraints. Validation walks the value
//! once and collects every [`Violation`] instead of stopping at the first.

use std::fmt;

use serde_json::Value as JsonValue;

// ---------------------------------------------------------------------------
// Paths and violations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Location of a value inside a JSON document, e.g. `backstage.new.templates[0].id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(Vec<PathSegment>);

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => f.write_str(key)?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(idx) => write!(f, "[{idx}]")?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// The value has the wrong type.
    Expected { expected: String, received: String },
    /// A strict object contains a key it does not declare.
    UnknownKey,
    /// A required key is absent.
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: FieldPath,
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ViolationKind::Expected { expected, received } => {
                write!(f, "{}: expected {expected}, received {received}", self.path)
            }
            ViolationKind::UnknownKey => write!(f, "{}: unrecognized key", self.path),
            ViolationKind::Missing => write!(f, "{}: required", self.path),
        }
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Schema {
    String,
    Number,
    Boolean,
    /// Matches when any alternative matches.
    OneOf(Vec<Schema>),
    Array(Box<Schema>),
    /// Object with arbitrary keys, every value matching the inner schema.
    Record(Box<Schema>),
    Object(ObjectSchema),
}

#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    fields: Vec<Field>,
    strict: bool,
}

#[derive(Debug, Clone)]
struct Field {
    key: String,
    schema: Schema,
    required: bool,
}

impl ObjectSchema {
    pub fn required(mut self, key: &str, schema: impl Into<Schema>) -> Self {
        self.fields.push(Field {
            key: key.to_owned(),
            schema: schema.into(),
            required: true,
        });
        self
    }

    pub fn optional(mut self, key: &str, schema: impl Into<Schema>) -> Self {
        self.fields.push(Field {
            key: key.to_owned(),
            schema: schema.into(),
            required: false,
        });
        self
    }

    /// Reject keys that are not declared.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }
}

impl From<ObjectSchema> for Schema {
    fn from(object: ObjectSchema) -> Self {
        Schema::Object(object)
    }
}

impl Schema {
    pub fn object() -> ObjectSchema {
        ObjectSchema::default()
    }

    pub fn array(item: impl Into<Schema>) -> Self {
        Schema::Array(Box::new(item.into()))
    }

    pub fn record(value: impl Into<Schema>) -> Self {
        Schema::Record(Box::new(value.into()))
    }

    pub fn one_of(alternatives: impl IntoIterator<Item = Schema>) -> Self {
        Schema::OneOf(alternatives.into_iter().collect())
    }

    /// Validate `value`, returning every violation found.
    pub fn validate(&self, value: &JsonValue) -> Result<(), Vec<Violation>> {
        let mut path = Vec::new();
        let mut violations = Vec::new();
        self.check(value, &mut path, &mut violations);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    fn check(&self, value: &JsonValue, path: &mut Vec<PathSegment>, out: &mut Vec<Violation>) {
        match (self, value) {
            (Schema::String, JsonValue::String(_))
            | (Schema::Number, JsonValue::Number(_))
            | (Schema::Boolean, JsonValue::Bool(_)) => {}
            (Schema::OneOf(alternatives), _) => {
                let matched = alternatives
                    .iter()
                    .any(|alt| alt.validate(value).is_ok());
                if !matched {
                    out.push(self.mismatch(value, path));
                }
            }
            (Schema::Array(item), JsonValue::Array(elements)) => {
                for (idx, element) in elements.iter().enumerate() {
                    path.push(PathSegment::Index(idx));
                    item.check(element, path, out);
                    path.pop();
                }
            }
            (Schema::Record(inner), JsonValue::Object(map)) => {
                for (key, entry) in map {
                    path.push(PathSegment::Key(key.clone()));
                    inner.check(entry, path, out);
                    path.pop();
                }
            }
            (Schema::Object(object), JsonValue::Object(map)) => {
                for field in &object.fields {
                    path.push(PathSegment::Key(field.key.clone()));
                    match map.get(&field.key) {
                        Some(entry) => field.schema.check(entry, path, out),
                        None if field.required => out.push(Violation {
                            path: FieldPath(path.clone()),
                            kind: ViolationKind::Missing,
                        }),
                        None => {}
                    }
                    path.pop();
                }
                if object.strict {
                    for key in map.keys() {
                        if object.fields.iter().any(|f| &f.key == key) {
                            continue;
                        }
                        path.push(PathSegment::Key(key.clone()));
                        out.push(Violation {
                            path: FieldPath(path.clone()),
                            kind: ViolationKind::UnknownKey,
                        });
                        path.pop();
                    }
                }
            }
            _ => out.push(self.mismatch(value, path)),
        }
    }

    fn mismatch(&self, value: &JsonValue, path: &[PathSegment]) -> Violation {
        Violation {
            path: FieldPath(path.to_vec()),
            kind: ViolationKind::Expected {
                expected: self.describe(),
                received: json_type_name(value).to_owned(),
            },
        }
    }

    fn describe(&self) -> String {
        match self {
            Schema::String => "string".to_owned(),
            Schema::Number => "number".to_owned(),
            Schema::Boolean => "boolean".to_owned(),
            Schema::OneOf(alternatives) => alternatives
                .iter()
                .map(Schema::describe)
                .collect::<Vec<_>>()
                .join(" | "),
            Schema::Array(_) => "array".to_owned(),
            Schema::Record(_) | Schema::Object(_) => "object".to_owned(),
        }
    }
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Schema for the templating block of `package.json`.
///
/// Only `backstage.new` is strict; the rest of the manifest is free-form.
pub fn manifest_schema() -> Schema {
    let template = Schema::object()
        .required("id", Schema::String)
        .required("target", Schema::String)
        .strict();

    let new = Schema::object()
        .optional("templates", Schema::array(template))
        .optional(
            "globals",
            Schema::record(Schema::one_of([
                Schema::String,
                Schema::Number,
                Schema::Boolean,
            ])),
        )
        .strict();

    Schema::object()
        .optional("backstage", Schema::object().optional("new", new))
        .into()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn messages(value: JsonValue) -> Vec<String> {
        manifest_schema()
            .validate(&value)
            .unwrap_err()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn accepts_manifest_without_templating_block() {
        let manifest = json!({ "name": "app", "backstage": { "role": "frontend" } });
        assert!(manifest_schema().validate(&manifest).is_ok());
    }

    #[test]
    fn accepts_full_templating_block() {
        let manifest = json!({
            "backstage": { "new": {
                "templates": [{ "id": "a", "target": "./a" }],
                "globals": { "license": "MIT", "count": 1, "private": false }
            }}
        });
        assert!(manifest_schema().validate(&manifest).is_ok());
    }

    #[test]
    fn rejects_unknown_key_in_template_entry() {
        let manifest = json!({
            "backstage": { "new": {
                "templates": [{ "id": "a", "target": "./a", "extra": 1 }]
            }}
        });
        assert_eq!(
            messages(manifest),
            ["backstage.new.templates[0].extra: unrecognized key"]
        );
    }

    #[test]
    fn rejects_unknown_key_under_new() {
        let manifest = json!({ "backstage": { "new": { "template": [] } } });
        assert_eq!(messages(manifest), ["backstage.new.template: unrecognized key"]);
    }

    #[test]
    fn collects_every_violation() {
        let manifest = json!({
            "backstage": { "new": {
                "templates": [{ "id": 7 }, "nope"],
                "globals": { "nested": { "a": 1 } }
            }}
        });
        assert_eq!(
            messages(manifest),
            [
                "backstage.new.templates[0].id: expected string, received number",
                "backstage.new.templates[0].target: required",
                "backstage.new.templates[1]: expected object, received string",
                "backstage.new.globals.nested: expected string | number | boolean, received object",
            ]
        );
    }

    #[test]
    fn top_level_must_be_object() {
        assert_eq!(messages(json!([])), ["<root>: expected object, received array"]);
    }

    #[test]
    fn optional_fields_reject_null() {
        let manifest = json!({ "backstage": { "new": { "templates": null } } });
        assert_eq!(
            messages(manifest),
            ["backstage.new.templates: expected array, received null"]
        );
    }
}
