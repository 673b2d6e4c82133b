//! # Strict-Mode Schema Checks
//!
//! The `jsonschema` compiler validates a schema against its metaschema,
//! which still admits unknown keywords, unknown formats, and keywords that
//! can never apply to the declared type. Those are authoring mistakes that
//! silently weaken validation, so Sieve rejects them before compiling.
//!
//! ## Rules
//!
//! - Every key of a schema object must be a known keyword.
//! - `type` names must come from the standard vocabulary.
//! - `type` may list several names only as `[T, "null"]`.
//! - A type-specific keyword (e.g. `minLength`) needs a declared type it
//!   applies to. The type may be declared on the schema itself or on an
//!   enclosing schema that checks the same instance (`allOf`, `anyOf`,
//!   `oneOf`, `not`, `if`/`then`/`else`, `dependentSchemas`).
//! - `format` must name a known format.
//! - `required` must only name properties declared in a sibling
//!   `properties` mapping, unless other property keywords can admit them.
//!
//! Values of the wrong JSON shape (e.g. `properties: "x"`) are not
//! reported here; the compiler's metaschema check rejects them with its
//! own diagnostic.

use serde_json::{Map, Value};
use thiserror::Error;

/// Keywords understood across drafts 4 through 2020-12.
pub const KNOWN_KEYWORDS: &[&str] = &[
    // core
    "$schema",
    "$id",
    "id",
    "$ref",
    "$defs",
    "definitions",
    "$comment",
    "$anchor",
    "$dynamicRef",
    "$dynamicAnchor",
    "$recursiveRef",
    "$recursiveAnchor",
    "$vocabulary",
    // meta-data
    "title",
    "description",
    "default",
    "examples",
    "deprecated",
    "readOnly",
    "writeOnly",
    // any type
    "type",
    "enum",
    "const",
    // applicators
    "allOf",
    "anyOf",
    "oneOf",
    "not",
    "if",
    "then",
    "else",
    // numbers
    "multipleOf",
    "maximum",
    "exclusiveMaximum",
    "minimum",
    "exclusiveMinimum",
    // strings
    "maxLength",
    "minLength",
    "pattern",
    "format",
    "contentEncoding",
    "contentMediaType",
    "contentSchema",
    // arrays
    "items",
    "prefixItems",
    "additionalItems",
    "contains",
    "maxContains",
    "minContains",
    "maxItems",
    "minItems",
    "uniqueItems",
    "unevaluatedItems",
    // objects
    "properties",
    "patternProperties",
    "additionalProperties",
    "propertyNames",
    "maxProperties",
    "minProperties",
    "required",
    "dependentRequired",
    "dependentSchemas",
    "dependencies",
    "unevaluatedProperties",
];

/// Names accepted by the `type` keyword.
pub const KNOWN_TYPES: &[&str] = &[
    "null", "boolean", "object", "array", "number", "string", "integer",
];

/// Formats the engine knows how to check.
pub const KNOWN_FORMATS: &[&str] = &[
    "date-time",
    "date",
    "time",
    "duration",
    "email",
    "idn-email",
    "hostname",
    "idn-hostname",
    "ipv4",
    "ipv6",
    "uri",
    "uri-reference",
    "iri",
    "iri-reference",
    "uri-template",
    "uuid",
    "json-pointer",
    "relative-json-pointer",
    "regex",
];

/// Value family a type-specific keyword constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFamily {
    String,
    Number,
    Array,
    Object,
}

impl TypeFamily {
    /// Family a keyword applies to, or `None` for type-independent keywords.
    pub fn of_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "minLength" | "maxLength" | "pattern" | "format" | "contentEncoding"
            | "contentMediaType" | "contentSchema" => Some(Self::String),
            "minimum" | "maximum" | "exclusiveMinimum" | "exclusiveMaximum" | "multipleOf" => {
                Some(Self::Number)
            }
            "items" | "prefixItems" | "additionalItems" | "contains" | "minContains"
            | "maxContains" | "minItems" | "maxItems" | "uniqueItems" | "unevaluatedItems" => {
                Some(Self::Array)
            }
            "properties" | "patternProperties" | "additionalProperties" | "propertyNames"
            | "required" | "minProperties" | "maxProperties" | "dependentRequired"
            | "dependentSchemas" | "dependencies" | "unevaluatedProperties" => Some(Self::Object),
            _ => None,
        }
    }

    /// Whether a declared type name belongs to this family.
    pub fn covers(&self, type_name: &str) -> bool {
        matches!(
            (self, type_name),
            (Self::String, "string")
                | (Self::Number, "number" | "integer")
                | (Self::Array, "array")
                | (Self::Object, "object")
        )
    }

    fn primary_type(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

/// A strict-mode rule broken by a schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrictViolation {
    /// Key is not a recognized schema keyword.
    #[error("strict mode: unknown keyword \"{keyword}\" at {}", display_path(.path))]
    UnknownKeyword { keyword: String, path: String },

    /// `type` names something outside the standard vocabulary.
    #[error("strict mode: unknown type \"{type_name}\" at {}", display_path(.path))]
    UnknownType { type_name: String, path: String },

    /// `type` lists several names other than `[T, "null"]`.
    #[error(
        "strict mode: union type [{}] is not allowed at {}",
        .types.join(", "),
        display_path(.path)
    )]
    UnionType { types: Vec<String>, path: String },

    /// Keyword applies to none of the types in effect, or no type is declared.
    #[error(
        "strict mode: missing type \"{expected}\" for keyword \"{keyword}\" at {}",
        display_path(.path)
    )]
    InapplicableKeyword {
        keyword: String,
        expected: String,
        path: String,
    },

    /// `format` names a format the engine cannot check.
    #[error("strict mode: unknown format \"{format}\" at {}", display_path(.path))]
    UnknownFormat { format: String, path: String },

    /// `required` names a property that `properties` does not define.
    #[error(
        "strict mode: required property \"{property}\" is not defined in properties at {}",
        display_path(.path)
    )]
    UndefinedRequired { property: String, path: String },
}

impl StrictViolation {
    /// JSON Pointer into the schema where the violation sits.
    pub fn path(&self) -> &str {
        match self {
            Self::UnknownKeyword { path, .. }
            | Self::UnknownType { path, .. }
            | Self::UnionType { path, .. }
            | Self::InapplicableKeyword { path, .. }
            | Self::UnknownFormat { path, .. }
            | Self::UndefinedRequired { path, .. } => path,
        }
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "#"
    } else {
        path
    }
}

/// Check a schema against every strict-mode rule.
///
/// Returns the first violation found while walking the schema.
pub fn check_strict(schema: &Value) -> Result<(), StrictViolation> {
    match strict_violations(schema).into_iter().next() {
        Some(violation) => Err(violation),
        None => Ok(()),
    }
}

/// Collect every strict-mode violation in the schema.
pub fn strict_violations(schema: &Value) -> Vec<StrictViolation> {
    let mut out = Vec::new();
    walk(schema, "", &[], &mut out);
    out
}

/// `context` holds the types an enclosing schema declared for the same
/// instance.
fn walk(schema: &Value, path: &str, context: &[String], out: &mut Vec<StrictViolation>) {
    let Value::Object(map) = schema else {
        return;
    };

    for key in map.keys() {
        if !KNOWN_KEYWORDS.contains(&key.as_str()) {
            out.push(StrictViolation::UnknownKeyword {
                keyword: key.clone(),
                path: path.to_string(),
            });
        }
    }

    let declared = declared_types(map, path, out);
    let in_effect = if declared.is_empty() {
        context
    } else {
        declared.as_slice()
    };
    check_type_applicability(map, in_effect, path, out);

    if let Some(Value::String(format)) = map.get("format") {
        if !KNOWN_FORMATS.contains(&format.as_str()) {
            out.push(StrictViolation::UnknownFormat {
                format: format.clone(),
                path: path.to_string(),
            });
        }
    }

    check_required(map, path, out);

    for (keyword, value) in map {
        descend(keyword, value, &child(path, keyword), in_effect, out);
    }
}

/// Declared type names; unknown names are reported and dropped.
fn declared_types(
    map: &Map<String, Value>,
    path: &str,
    out: &mut Vec<StrictViolation>,
) -> Vec<String> {
    let names: Vec<&str> = match map.get("type") {
        Some(Value::String(name)) => vec![name.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => return Vec::new(),
    };

    let mut declared = Vec::with_capacity(names.len());
    for &name in &names {
        if KNOWN_TYPES.contains(&name) {
            declared.push(name.to_string());
        } else {
            out.push(StrictViolation::UnknownType {
                type_name: name.to_string(),
                path: child(path, "type"),
            });
        }
    }

    let nullable_pair = names.len() == 2 && names.contains(&"null");
    if names.len() > 1 && !nullable_pair {
        out.push(StrictViolation::UnionType {
            types: names.iter().map(|n| n.to_string()).collect(),
            path: child(path, "type"),
        });
    }
    declared
}

fn check_type_applicability(
    map: &Map<String, Value>,
    in_effect: &[String],
    path: &str,
    out: &mut Vec<StrictViolation>,
) {
    for keyword in map.keys() {
        let Some(family) = TypeFamily::of_keyword(keyword) else {
            continue;
        };

        if !in_effect.iter().any(|t| family.covers(t)) {
            out.push(StrictViolation::InapplicableKeyword {
                keyword: keyword.clone(),
                expected: family.primary_type().to_string(),
                path: path.to_string(),
            });
        }
    }
}

fn check_required(map: &Map<String, Value>, path: &str, out: &mut Vec<StrictViolation>) {
    let (Some(Value::Array(required)), Some(Value::Object(properties))) =
        (map.get("required"), map.get("properties"))
    else {
        return;
    };

    // Other property keywords may admit names outside `properties`.
    let open = map.contains_key("patternProperties")
        || matches!(map.get("additionalProperties"), Some(Value::Object(_)));
    if open {
        return;
    }

    for name in required.iter().filter_map(Value::as_str) {
        if !properties.contains_key(name) {
            out.push(StrictViolation::UndefinedRequired {
                property: name.to_string(),
                path: child(path, "required"),
            });
        }
    }
}

/// Visit the subschemas held by one keyword.
///
/// Subschemas that check the same instance inherit `in_effect`; the rest
/// start without a type context.
fn descend(
    keyword: &str,
    value: &Value,
    path: &str,
    in_effect: &[String],
    out: &mut Vec<StrictViolation>,
) {
    match keyword {
        // Maps of name -> subschema of a member value.
        "properties" | "patternProperties" | "$defs" | "definitions" => {
            if let Value::Object(entries) = value {
                for (name, sub) in entries {
                    walk(sub, &child(path, name), &[], out);
                }
            }
        }
        // Maps of name -> subschema of the same object.
        "dependentSchemas" => {
            if let Value::Object(entries) = value {
                for (name, sub) in entries {
                    walk(sub, &child(path, name), in_effect, out);
                }
            }
        }
        // Draft 7 dependencies: name -> subschema or list of names.
        "dependencies" => {
            if let Value::Object(entries) = value {
                for (name, sub) in entries {
                    if sub.is_object() || sub.is_boolean() {
                        walk(sub, &child(path, name), in_effect, out);
                    }
                }
            }
        }
        "allOf" | "anyOf" | "oneOf" => {
            if let Value::Array(items) = value {
                for (i, sub) in items.iter().enumerate() {
                    walk(sub, &child(path, &i.to_string()), in_effect, out);
                }
            }
        }
        "not" | "if" | "then" | "else" => walk(value, path, in_effect, out),
        "prefixItems" => {
            if let Value::Array(items) = value {
                for (i, sub) in items.iter().enumerate() {
                    walk(sub, &child(path, &i.to_string()), &[], out);
                }
            }
        }
        // Subschema or (draft 7 tuple form) list of subschemas.
        "items" => match value {
            Value::Array(items) => {
                for (i, sub) in items.iter().enumerate() {
                    walk(sub, &child(path, &i.to_string()), &[], out);
                }
            }
            other => walk(other, path, &[], out),
        },
        "additionalProperties" | "additionalItems" | "contains" | "propertyNames"
        | "unevaluatedItems" | "unevaluatedProperties" | "contentSchema" => {
            walk(value, path, &[], out)
        }
        _ => {}
    }
}

/// Append one JSON Pointer segment, escaping `~` and `/`.
fn child(path: &str, segment: &str) -> String {
    let escaped = segment.replace('~', "~0").replace('/', "~1");
    format!("{path}/{escaped}")
}
