//! Type-directed conversion of raw source values into schema leaf types.
//!
//! Sources hand the coercer whatever dynamic shape they produced (text from
//! the environment or the command line, typed JSON from files and maps). The
//! leaf schema decides the target: a single `type`, a list of types, or one of
//! the `anyOf`/`oneOf`/`allOf` constructs. Conversions are looked up in a
//! fixed (kind, type) table and the result is always validated against
//! the complete leaf schema, so range, enum and pattern constraints apply to
//! coerced values exactly as they apply to the merged configuration.
//!
//! ```
//! use ortho_schema::coerce::coerce_value;
//! use serde_json::json;
//!
//! let port = coerce_value(&json!("42"), &json!({"type": "integer"}))?;
//! assert_eq!(port, json!(42));
//!
//! let hosts = coerce_value(&json!("a, b, c"), &json!({"type": "array"}))?;
//! assert_eq!(hosts, json!(["a", "b", "c"]));
//! # Ok::<_, ortho_schema::coerce::CoercionError>(())
//! ```

mod matrix;

use std::fmt;
use std::str::FromStr;

use jsonschema::Validator;
use serde_json::Value;
use thiserror::Error;

/// Dynamic shape of a raw value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueKind {
    /// JSON `null`.
    Null,
    /// `true` or `false`.
    Boolean,
    /// A number with no fractional part that fits `i64` or `u64`.
    Integer,
    /// Any other number.
    Number,
    /// Text.
    String,
    /// A sequence.
    Array,
    /// A mapping.
    Object,
}

impl ValueKind {
    /// Classify `value`.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::Integer,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        })
    }
}

/// Primitive type a leaf schema can demand.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SchemaType {
    /// `"string"`
    String,
    /// `"integer"`
    Integer,
    /// `"number"`
    Number,
    /// `"boolean"`
    Boolean,
    /// `"array"`
    Array,
    /// `"object"`
    Object,
    /// `"null"`
    Null,
}

impl FromStr for SchemaType {
    type Err = CoercionError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "string" => Ok(Self::String),
            "integer" => Ok(Self::Integer),
            "number" => Ok(Self::Number),
            "boolean" => Ok(Self::Boolean),
            "array" => Ok(Self::Array),
            "object" => Ok(Self::Object),
            "null" => Ok(Self::Null),
            other => Err(CoercionError::InvalidLeaf {
                message: format!("unknown type `{other}`"),
            }),
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Null => "null",
        })
    }
}

/// Failure to turn a raw value into the shape a leaf schema demands.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CoercionError {
    /// No rule converts this kind of value to the target type.
    #[error("cannot coerce {value} ({kind}) to {target}")]
    Unsupported {
        /// Value that was offered.
        value: Value,
        /// Its dynamic kind.
        kind: ValueKind,
        /// Target type description.
        target: String,
    },

    /// A rule exists but the value does not parse as the target type.
    #[error("cannot coerce {value} ({kind}) to {target}: {reason}")]
    Malformed {
        /// Value that was offered.
        value: Value,
        /// Its dynamic kind.
        kind: ValueKind,
        /// Target type description.
        target: String,
        /// Parser explanation.
        reason: String,
    },

    /// Conversion succeeded but the result violates the leaf constraints.
    #[error("{value} ({kind}) does not satisfy {target}: {message}")]
    Constraint {
        /// Converted value.
        value: Value,
        /// Its dynamic kind.
        kind: ValueKind,
        /// Target type description.
        target: String,
        /// Validator messages.
        message: String,
    },

    /// None of the union alternatives accepted the value.
    #[error("{value} ({kind}) matches no alternative of {target}")]
    NoAlternative {
        /// Value that was offered.
        value: Value,
        /// Its dynamic kind.
        kind: ValueKind,
        /// Union description, such as `anyOf[integer, string]`.
        target: String,
        /// Failure reported by the last alternative tried.
        #[source]
        last: Box<Self>,
    },

    /// The leaf schema itself cannot drive coercion.
    #[error("leaf schema cannot be used for coercion: {message}")]
    InvalidLeaf {
        /// Explanation of the defect.
        message: String,
    },
}

impl CoercionError {
    fn unsupported(value: &Value, target: impl ToString) -> Self {
        Self::Unsupported {
            value: value.clone(),
            kind: ValueKind::of(value),
            target: target.to_string(),
        }
    }

    fn malformed(value: &Value, target: impl ToString, reason: impl ToString) -> Self {
        Self::Malformed {
            value: value.clone(),
            kind: ValueKind::of(value),
            target: target.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Coerce an optional raw value. `None` means the source has nothing for this
/// leaf and is passed through untouched.
///
/// # Errors
///
/// Returns a [`CoercionError`] when a present value cannot be coerced.
pub fn coerce(raw: Option<&Value>, leaf: &Value) -> Result<Option<Value>, CoercionError> {
    raw.map(|value| coerce_value(value, leaf)).transpose()
}

/// Coerce `raw` to the type demanded by `leaf` and validate the result.
///
/// # Errors
///
/// Returns a [`CoercionError`] when no rule applies, parsing fails, no union
/// alternative accepts the value, or the result violates the leaf schema.
pub fn coerce_value(raw: &Value, leaf: &Value) -> Result<Value, CoercionError> {
    let validator = compile(leaf)?;
    let coerced = convert_for(raw, leaf, &validator)?;
    check(&coerced, leaf, &validator)?;
    Ok(coerced)
}

fn compile(leaf: &Value) -> Result<Validator, CoercionError> {
    jsonschema::draft4::new(leaf).map_err(|e| CoercionError::InvalidLeaf {
        message: e.to_string(),
    })
}

fn check(value: &Value, leaf: &Value, validator: &Validator) -> Result<(), CoercionError> {
    let messages: Vec<String> = validator.iter_errors(value).map(|e| e.to_string()).collect();
    if messages.is_empty() {
        return Ok(());
    }
    Err(CoercionError::Constraint {
        value: value.clone(),
        kind: ValueKind::of(value),
        target: describe(leaf),
        message: messages.join("; "),
    })
}

fn convert_for(raw: &Value, leaf: &Value, validator: &Validator) -> Result<Value, CoercionError> {
    match leaf.get("type") {
        Some(Value::String(name)) => convert_to(raw, name.parse()?, leaf),
        Some(Value::Array(names)) => first_match(raw, leaf, validator, names, |name| {
            let ty: SchemaType = name
                .as_str()
                .ok_or_else(|| CoercionError::InvalidLeaf {
                    message: format!("type list entry {name} is not a string"),
                })?
                .parse()?;
            convert_to(raw, ty, leaf)
        }),
        Some(other) => Err(CoercionError::InvalidLeaf {
            message: format!("`type` must be a string or list, found {other}"),
        }),
        None => convert_union(raw, leaf, validator),
    }
}

fn convert_union(raw: &Value, leaf: &Value, validator: &Validator) -> Result<Value, CoercionError> {
    if let Some(alternatives) = alternatives(leaf, "anyOf")? {
        return first_match(raw, leaf, validator, alternatives, |alt| {
            coerce_value(raw, alt)
        });
    }
    if let Some(alternatives) = alternatives(leaf, "oneOf")? {
        return first_match(raw, leaf, validator, alternatives, |alt| {
            coerce_value(raw, alt)
        });
    }
    if let Some(alternatives) = alternatives(leaf, "allOf")? {
        return alternatives
            .iter()
            .try_fold(raw.clone(), |current, alt| coerce_value(&current, alt));
    }
    Ok(raw.clone())
}

fn alternatives<'a>(leaf: &'a Value, keyword: &str) -> Result<Option<&'a [Value]>, CoercionError> {
    match leaf.get(keyword) {
        None => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items.as_slice())),
        Some(other) => Err(CoercionError::InvalidLeaf {
            message: format!("`{keyword}` must be a list, found {other}"),
        }),
    }
}

/// Try `attempt` for each candidate in order, returning the first result that
/// also satisfies the full leaf schema.
fn first_match<F>(
    raw: &Value,
    leaf: &Value,
    validator: &Validator,
    candidates: &[Value],
    mut attempt: F,
) -> Result<Value, CoercionError>
where
    F: FnMut(&Value) -> Result<Value, CoercionError>,
{
    let mut last = None;
    for candidate in candidates {
        match attempt(candidate).and_then(|value| check(&value, leaf, validator).map(|()| value)) {
            Ok(value) => return Ok(value),
            Err(err) => last = Some(err),
        }
    }
    let cause = last.unwrap_or_else(|| CoercionError::InvalidLeaf {
        message: "union declares no alternatives".to_owned(),
    });
    Err(CoercionError::NoAlternative {
        value: raw.clone(),
        kind: ValueKind::of(raw),
        target: describe(leaf),
        last: Box::new(cause),
    })
}

fn convert_to(raw: &Value, target: SchemaType, leaf: &Value) -> Result<Value, CoercionError> {
    let converted = matrix::convert(raw, target)?;
    match (target, leaf.get("items")) {
        (SchemaType::Array, Some(items @ Value::Object(_))) => match converted {
            Value::Array(elements) => elements
                .iter()
                .map(|element| coerce_value(element, items))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => Ok(other),
        },
        _ => Ok(converted),
    }
}

/// Short human description of what a leaf demands.
fn describe(leaf: &Value) -> String {
    match leaf.get("type") {
        Some(Value::String(name)) => name.clone(),
        Some(Value::Array(names)) => names
            .iter()
            .map(|n| n.as_str().unwrap_or("?"))
            .collect::<Vec<_>>()
            .join("|"),
        _ => ["anyOf", "oneOf", "allOf"]
            .into_iter()
            .find_map(|keyword| {
                let alts = leaf.get(keyword)?.as_array()?;
                let inner: Vec<String> = alts.iter().map(describe).collect();
                Some(format!("{keyword}[{}]", inner.join(", ")))
            })
            .unwrap_or_else(|| "any".to_owned()),
    }
}

#[cfg(test)]
mod tests;
