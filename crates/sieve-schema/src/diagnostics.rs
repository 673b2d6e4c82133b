//! # Engine Diagnostics
//!
//! Converts the `jsonschema` crate's errors into [`EngineDiagnostic`]s and
//! then into the stable [`ValidationError`] shape.
//!
//! The engine reports a location in the instance, a location in the
//! schema, and an error kind. The failed keyword is the last segment of
//! the schema location, except for dependency lists where the last
//! segment is a property name. Keyword parameters (`limit`,
//! `missingProperty`, ...) come from the error kind. Kinds that carry no
//! payload fall back to the keyword's value in the schema, found by
//! following the schema location through local `$ref`s.

use jsonschema::error::{TypeKind, ValidationErrorKind};
use serde_json::{json, Map, Value};

use sieve_core::ValidationError;

/// Keyword reported for a `false` subschema.
pub const FALSE_SCHEMA_KEYWORD: &str = "false schema";

/// A single diagnostic as the engine produced it, before fallbacks apply.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineDiagnostic {
    /// Instance location; empty for the root.
    pub instance_path: String,
    /// Engine message; may be empty.
    pub message: String,
    /// Failed keyword.
    pub keyword: String,
    /// Keyword parameters, when the keyword has any.
    pub params: Option<Map<String, Value>>,
}

impl EngineDiagnostic {
    /// Build diagnostics from one engine error.
    ///
    /// `additionalProperties` errors naming several properties are split
    /// into one diagnostic per property.
    pub fn from_engine(schema: &Value, error: &jsonschema::ValidationError<'_>) -> Vec<Self> {
        let instance_path = error.instance_path.to_string();
        let schema_path = error.schema_path.to_string();

        match &error.kind {
            ValidationErrorKind::AdditionalProperties { unexpected } => unexpected
                .iter()
                .map(|property| Self {
                    instance_path: instance_path.clone(),
                    message: format!(
                        "Additional properties are not allowed ('{property}' was unexpected)"
                    ),
                    keyword: "additionalProperties".to_string(),
                    params: Some(single("additionalProperty", json!(property))),
                })
                .collect(),
            ValidationErrorKind::FalseSchema => vec![Self {
                instance_path,
                message: error.to_string(),
                keyword: FALSE_SCHEMA_KEYWORD.to_string(),
                params: None,
            }],
            ValidationErrorKind::Required { property } => {
                let (keyword, params) = required_params(schema, &schema_path, property);
                vec![Self {
                    instance_path,
                    message: error.to_string(),
                    keyword,
                    params: Some(params),
                }]
            }
            kind => {
                let keyword = keyword_from_schema_path(&schema_path);
                let params = kind_params(kind).or_else(|| {
                    keyword_params(
                        &keyword,
                        resolve_schema_path(schema, &schema_path),
                        &error.instance,
                    )
                });
                vec![Self {
                    instance_path,
                    message: error.to_string(),
                    keyword,
                    params,
                }]
            }
        }
    }

    /// Apply the root-path, message, and params fallbacks.
    pub fn normalize(&self) -> ValidationError {
        ValidationError::new(
            self.instance_path.clone(),
            self.message.clone(),
            self.keyword.clone(),
            self.params.clone().unwrap_or_default(),
        )
    }
}

/// Last non-index segment of a schema location.
fn keyword_from_schema_path(schema_path: &str) -> String {
    schema_path
        .rsplit('/')
        .find(|segment| !segment.is_empty() && segment.parse::<usize>().is_err())
        .map(unescape_segment)
        .unwrap_or_default()
}

fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// Keywords holding a map of property name -> list of required names.
const DEPENDENCY_KEYWORDS: &[&str] = &["dependentRequired", "dependencies"];

/// Keywords holding a map keyed by property name.
const NAME_MAP_KEYWORDS: &[&str] = &[
    "properties",
    "patternProperties",
    "$defs",
    "definitions",
    "dependentSchemas",
];

/// Keyword and params for a missing property.
///
/// `required` reports `missingProperty`. A dependency list, located at
/// `.../dependentRequired/<property>`, also reports the triggering
/// `property`, the comma-joined `deps` and `depsCount`.
fn required_params(
    schema: &Value,
    schema_path: &str,
    missing: &Value,
) -> (String, Map<String, Value>) {
    let mut params = single("missingProperty", missing.clone());

    let mut segments = schema_path.rsplit('/');
    let (last, parent, grandparent) = (segments.next(), segments.next(), segments.next());
    let dependency = match (last, parent) {
        (Some(property), Some(keyword))
            if DEPENDENCY_KEYWORDS.contains(&keyword)
                && !grandparent.is_some_and(|g| NAME_MAP_KEYWORDS.contains(&g)) =>
        {
            Some((keyword, unescape_segment(property)))
        }
        _ => None,
    };

    let Some((keyword, property)) = dependency else {
        return ("required".to_string(), params);
    };

    params.insert("property".to_string(), Value::String(property));
    if let Some(Value::Array(deps)) = resolve_schema_path(schema, schema_path) {
        let names: Vec<&str> = deps.iter().filter_map(Value::as_str).collect();
        params.insert("deps".to_string(), Value::String(names.join(", ")));
        params.insert("depsCount".to_string(), json!(names.len()));
    }
    (keyword.to_string(), params)
}

/// Parameters carried by the engine's error kind itself.
fn kind_params(kind: &ValidationErrorKind) -> Option<Map<String, Value>> {
    let params = match kind {
        ValidationErrorKind::Type {
            kind: TypeKind::Single(name),
        } => single("type", Value::String(name.to_string())),
        ValidationErrorKind::Enum { options } => single("allowedValues", json!(options)),
        ValidationErrorKind::Constant { expected_value } => {
            single("allowedValue", json!(expected_value))
        }
        ValidationErrorKind::Pattern { pattern } => single("pattern", json!(pattern)),
        ValidationErrorKind::Format { format } => single("format", json!(format)),
        ValidationErrorKind::MultipleOf { multiple_of } => {
            single("multipleOf", integral(json!(multiple_of)))
        }
        ValidationErrorKind::MinLength { limit } => single("limit", json!(limit)),
        ValidationErrorKind::MaxLength { limit } => single("limit", json!(limit)),
        ValidationErrorKind::MinItems { limit } => single("limit", json!(limit)),
        ValidationErrorKind::MaxItems { limit } => single("limit", json!(limit)),
        ValidationErrorKind::MinProperties { limit } => single("limit", json!(limit)),
        ValidationErrorKind::MaxProperties { limit } => single("limit", json!(limit)),
        ValidationErrorKind::Minimum { limit } => bound(">=", json!(limit)),
        ValidationErrorKind::Maximum { limit } => bound("<=", json!(limit)),
        ValidationErrorKind::ExclusiveMinimum { limit } => bound(">", json!(limit)),
        ValidationErrorKind::ExclusiveMaximum { limit } => bound("<", json!(limit)),
        _ => return None,
    };
    Some(params)
}

/// A whole float as an integer, so `multipleOf: 2` reports `2`, not `2.0`.
fn integral(value: Value) -> Value {
    match value.as_f64() {
        Some(f) if value.is_f64() && f.fract() == 0.0 && f.abs() < 9.0e15 => json!(f as i64),
        _ => value,
    }
}

/// Follow a schema location to the value it names.
///
/// A `$ref` segment jumps to the target of a local reference (`#` or
/// `#/...`), the way the engine's locations continue inside the referenced
/// schema. Remote and anchor references are not followed.
fn resolve_schema_path<'s>(schema: &'s Value, schema_path: &str) -> Option<&'s Value> {
    let mut node = schema;
    for raw in schema_path.split('/').skip(1) {
        let segment = unescape_segment(raw);
        if segment == "$ref" {
            if let Some(reference) = node.get("$ref").and_then(Value::as_str) {
                node = local_target(schema, reference)?;
                continue;
            }
        }
        node = match node {
            Value::Object(map) => map.get(&segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(node)
}

fn local_target<'s>(schema: &'s Value, reference: &str) -> Option<&'s Value> {
    let fragment = reference.strip_prefix('#')?;
    if fragment.is_empty() {
        Some(schema)
    } else if fragment.starts_with('/') {
        schema.pointer(fragment)
    } else {
        None
    }
}

/// Parameters for keywords whose diagnostics come from the schema value.
fn keyword_params(
    keyword: &str,
    keyword_value: Option<&Value>,
    instance: &Value,
) -> Option<Map<String, Value>> {
    if keyword == "uniqueItems" {
        return duplicate_items(instance).map(|(i, j)| {
            let mut params = Map::new();
            params.insert("i".to_string(), json!(i));
            params.insert("j".to_string(), json!(j));
            params
        });
    }

    let value = keyword_value?;
    match keyword {
        "type" => Some(single("type", type_param(value))),
        "enum" => Some(single("allowedValues", value.clone())),
        "const" => Some(single("allowedValue", value.clone())),
        "pattern" => Some(single("pattern", value.clone())),
        "format" => Some(single("format", value.clone())),
        "multipleOf" => Some(single("multipleOf", value.clone())),
        "minLength" | "maxLength" | "minItems" | "maxItems" | "minProperties"
        | "maxProperties" | "minContains" | "maxContains" => {
            Some(single("limit", value.clone()))
        }
        "minimum" => Some(bound(">=", value.clone())),
        "maximum" => Some(bound("<=", value.clone())),
        "exclusiveMinimum" => Some(bound(">", value.clone())),
        "exclusiveMaximum" => Some(bound("<", value.clone())),
        _ => None,
    }
}

fn bound(comparison: &str, limit: Value) -> Map<String, Value> {
    let mut params = single("comparison", json!(comparison));
    params.insert("limit".to_string(), limit);
    params
}

/// `type` as one string. A union such as `["string", "null"]` becomes
/// `"string,null"`, the comma-joined form hosts already parse.
fn type_param(value: &Value) -> Value {
    match value {
        Value::Array(names) => json!(names
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(",")),
        other => other.clone(),
    }
}

/// Indices `(i, j)` with `j < i` of the first repeated array element.
fn duplicate_items(instance: &Value) -> Option<(usize, usize)> {
    let items = instance.as_array()?;
    items.iter().enumerate().find_map(|(i, item)| {
        items[..i]
            .iter()
            .position(|earlier| earlier == item)
            .map(|j| (i, j))
    })
}

fn single(key: &str, value: Value) -> Map<String, Value> {
    let mut params = Map::new();
    params.insert(key.to_string(), value);
    params
}
