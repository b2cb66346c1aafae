//! The (value kind × schema type) conversion table.
//!
//! Every pair is listed explicitly. Pairs without a rule fail with
//! [`CoercionError::Unsupported`]; nothing falls back to a guess.

use serde_json::{Number, Value};

use super::{CoercionError, SchemaType};

/// Borrowed view of a value split by [`super::ValueKind`].
enum Raw<'a> {
    Null,
    Boolean(bool),
    Integer(&'a Number),
    Number(f64),
    String(&'a str),
    Array(&'a [Value]),
    Object,
}

impl<'a> Raw<'a> {
    fn of(value: &'a Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Boolean(*b),
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::Integer(n),
            Value::Number(n) => n.as_f64().map_or(Self::Integer(n), Self::Number),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Array(items),
            Value::Object(_) => Self::Object,
        }
    }
}

pub(super) fn convert(value: &Value, target: SchemaType) -> Result<Value, CoercionError> {
    use SchemaType as T;

    match (Raw::of(value), target) {
        (Raw::String(_), T::String)
        | (Raw::Integer(_), T::Integer | T::Number)
        | (Raw::Number(_), T::Number)
        | (Raw::Boolean(_), T::Boolean)
        | (Raw::Array(_), T::Array)
        | (Raw::Object, T::Object)
        | (Raw::Null, T::Null) => Ok(value.clone()),

        (Raw::String(text), T::Integer) => string_to_integer(value, text),
        (Raw::String(text), T::Number) => string_to_number(value, text),
        (Raw::String(text), T::Boolean) => string_to_boolean(value, text),
        (Raw::String(text), T::Array) => string_to_array(value, text),
        (Raw::String(text), T::Object) => string_to_object(value, text),
        (Raw::String(text), T::Null) => string_to_null(value, text),

        (Raw::Integer(n), T::String) => Ok(Value::String(n.to_string())),
        (Raw::Integer(n), T::Boolean) => Ok(Value::Bool(n.as_i64() != Some(0))),
        (Raw::Number(f), T::String) => Ok(Value::String(f.to_string())),
        (Raw::Number(f), T::Integer) => float_to_integer(f).ok_or_else(|| {
            CoercionError::malformed(value, target, "value has a fractional part")
        }),
        (Raw::Boolean(b), T::String) => Ok(Value::String(b.to_string())),
        (Raw::Integer(_) | Raw::Number(_) | Raw::Boolean(_), T::Array) => {
            Ok(Value::Array(vec![value.clone()]))
        }

        (Raw::Array(items), T::String) => array_to_string(value, items),
        (Raw::Array(items), T::Boolean) => Ok(Value::Bool(!items.is_empty())),

        (Raw::Integer(_) | Raw::Number(_) | Raw::Boolean(_), T::Object | T::Null)
        | (Raw::Number(_), T::Boolean)
        | (Raw::Boolean(_), T::Integer | T::Number)
        | (Raw::Array(_), T::Integer | T::Number | T::Object | T::Null)
        | (
            Raw::Object,
            T::String | T::Integer | T::Number | T::Boolean | T::Array | T::Null,
        )
        | (
            Raw::Null,
            T::String | T::Integer | T::Number | T::Boolean | T::Array | T::Object,
        ) => Err(CoercionError::unsupported(value, target)),
    }
}

fn string_to_integer(value: &Value, text: &str) -> Result<Value, CoercionError> {
    let trimmed = text.trim();
    match trimmed.parse::<i64>() {
        Ok(i) => Ok(Value::from(i)),
        Err(err) => trimmed
            .parse::<u64>()
            .map(Value::from)
            .map_err(|_| CoercionError::malformed(value, SchemaType::Integer, err)),
    }
}

/// Parse a number, preferring the integer form when it is lossless.
fn string_to_number(value: &Value, text: &str) -> Result<Value, CoercionError> {
    let trimmed = text.trim();
    if let Ok(int) = string_to_integer(value, trimmed) {
        return Ok(int);
    }
    let parsed = trimmed
        .parse::<f64>()
        .map_err(|err| CoercionError::malformed(value, SchemaType::Number, err))?;
    if let Some(int) = float_to_integer(parsed) {
        return Ok(int);
    }
    Number::from_f64(parsed).map(Value::Number).ok_or_else(|| {
        CoercionError::malformed(value, SchemaType::Number, "value is not finite")
    })
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    reason = "the range and fraction checks make the cast exact"
)]
fn float_to_integer(f: f64) -> Option<Value> {
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.is_finite() && f.fract() == 0.0 && in_range).then(|| Value::from(f as i64))
}

/// Truthy/falsy vocabulary in the spirit of YAML 1.1 booleans.
fn string_to_boolean(value: &Value, text: &str) -> Result<Value, CoercionError> {
    let lowered = text.trim().to_ascii_lowercase();
    match lowered.as_str() {
        "true" | "yes" | "y" | "on" | "t" => Ok(Value::Bool(true)),
        "false" | "no" | "n" | "off" | "f" | "" => Ok(Value::Bool(false)),
        other => other.parse::<i64>().map(|i| Value::Bool(i != 0)).map_err(|_| {
            CoercionError::malformed(value, SchemaType::Boolean, "not a recognised boolean")
        }),
    }
}

/// Split comma separated text into trimmed items. Text that looks like a JSON
/// array is parsed as one instead so items may contain commas.
fn string_to_array(value: &Value, text: &str) -> Result<Value, CoercionError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Value::Array(Vec::new()));
    }
    if trimmed.starts_with('[') {
        return match serde_json::from_str::<Value>(trimmed) {
            Ok(parsed @ Value::Array(_)) => Ok(parsed),
            Ok(_) => Err(CoercionError::malformed(
                value,
                SchemaType::Array,
                "text is not a JSON array",
            )),
            Err(err) => Err(CoercionError::malformed(value, SchemaType::Array, err)),
        };
    }
    Ok(Value::Array(
        trimmed
            .split(',')
            .map(|item| Value::String(item.trim().to_owned()))
            .collect(),
    ))
}

fn string_to_object(value: &Value, text: &str) -> Result<Value, CoercionError> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(parsed @ Value::Object(_)) => Ok(parsed),
        Ok(_) => Err(CoercionError::malformed(
            value,
            SchemaType::Object,
            "text is not a JSON object",
        )),
        Err(err) => Err(CoercionError::malformed(value, SchemaType::Object, err)),
    }
}

fn string_to_null(value: &Value, text: &str) -> Result<Value, CoercionError> {
    match text.trim().to_ascii_lowercase().as_str() {
        "" | "null" | "~" => Ok(Value::Null),
        _ => Err(CoercionError::malformed(
            value,
            SchemaType::Null,
            "only empty text, `null` or `~` mean null",
        )),
    }
}

/// Join scalar items with commas, the inverse of [`string_to_array`].
fn array_to_string(value: &Value, items: &[Value]) -> Result<Value, CoercionError> {
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        })
        .collect::<Option<Vec<_>>>()
        .map(|parts| Value::String(parts.join(",")))
        .ok_or_else(|| CoercionError::unsupported(value, SchemaType::String))
}
