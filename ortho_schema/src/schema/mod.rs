//! Validated configuration schemas.
//!
//! A [`Schema`] wraps a Draft 4 style JSON schema once it has passed the
//! bundled meta-schema check, compiled under the `jsonschema` validator and
//! had every `$ref` on every branch resolved. The same instance then drives
//! leaf enumeration ([`Schema::leaves`]), default filling
//! ([`Schema::apply_defaults`]) and whole-document validation
//! ([`Schema::validate`]).

mod defaults;
mod walk;

use std::fmt;
use std::sync::Arc;

use jsonschema::Validator;
use serde_json::{Map, Value};

use crate::{ConfigError, ConfigResult};

pub use walk::{SchemaLeaf, Walk};

/// A configuration schema accepted by the merge engine.
pub struct Schema {
    raw: Value,
    validator: Validator,
}

impl Schema {
    /// Validate and compile `raw`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SchemaInvalid`] when the root lacks an object
    /// valued `properties`, `definitions` is not an object, the document is
    /// not a valid Draft 4 schema, any `$ref` is remote, dangling or cyclic,
    /// or a leaf does not compile once its references are inlined.
    ///
    /// # Examples
    ///
    /// ```
    /// use ortho_schema::Schema;
    /// use serde_json::json;
    ///
    /// let schema = Schema::new(json!({
    ///     "properties": {"port": {"type": "integer", "default": 8080}}
    /// }))?;
    /// assert_eq!(schema.leaves().count(), 1);
    /// assert!(Schema::new(json!({"type": "object"})).is_err());
    /// # Ok::<_, std::sync::Arc<ortho_schema::ConfigError>>(())
    /// ```
    pub fn new(raw: Value) -> ConfigResult<Self> {
        check_meta(&raw)?;
        let validator = jsonschema::draft4::new(&raw)
            .map_err(|e| Arc::new(ConfigError::schema(e.to_string())))?;
        let schema = Self { raw, validator };
        for leaf in schema.leaves() {
            let SchemaLeaf { path, schema: node } = leaf?;
            jsonschema::draft4::new(&node).map_err(|e| {
                Arc::new(ConfigError::schema(format!("leaf `{path}` does not compile: {e}")))
            })?;
        }
        Ok(schema)
    }

    /// The schema document as supplied.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.raw
    }

    /// Top-level `properties` of the document, in declaration order.
    pub(crate) fn properties(&self) -> impl DoubleEndedIterator<Item = (&String, &Value)> {
        self.raw
            .get("properties")
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|properties| properties.iter())
    }

    /// Check `data` against the complete schema.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ConfigInvalid`] for a single violation and
    /// [`ConfigError::Aggregate`] when several are found.
    pub fn validate(&self, data: &Value) -> ConfigResult<()> {
        let violations: Vec<ConfigError> = self
            .validator
            .iter_errors(data)
            .map(|err| ConfigError::ConfigInvalid {
                path: err.instance_path.to_string(),
                message: err.to_string(),
            })
            .collect();
        ConfigError::try_aggregate(violations).map_or(Ok(()), |err| Err(Arc::new(err)))
    }

    /// Look up a document-local reference such as `#/definitions/port`.
    fn lookup(&self, reference: &str) -> ConfigResult<&Value> {
        let pointer = reference.strip_prefix('#').ok_or_else(|| {
            Arc::new(ConfigError::schema(format!(
                "only document-local references are supported, found `{reference}`"
            )))
        })?;
        self.raw.pointer(pointer).ok_or_else(|| {
            Arc::new(ConfigError::schema(format!(
                "unresolvable $ref `{reference}`"
            )))
        })
    }

    /// Substitute `$ref` chains on `node`, keeping local siblings over the
    /// referenced fields. `refs` holds the references already followed on the
    /// current branch.
    pub(crate) fn resolve_node(&self, node: &Value, refs: &mut Vec<String>) -> ConfigResult<Value> {
        let mut current = node.clone();
        loop {
            let reference = match current.get("$ref") {
                None => return Ok(current),
                Some(Value::String(reference)) => reference.clone(),
                Some(other) => {
                    return Err(Arc::new(ConfigError::schema(format!(
                        "$ref must be a string, found {other}"
                    ))));
                }
            };
            if refs.contains(&reference) {
                return Err(Arc::new(ConfigError::schema(format!(
                    "cyclic $ref `{reference}` via {}",
                    refs.join(" -> ")
                ))));
            }
            let Some(mut merged) = self.lookup(&reference)?.as_object().cloned() else {
                return Err(Arc::new(ConfigError::schema(format!(
                    "$ref `{reference}` does not point at a schema object"
                ))));
            };
            if let Value::Object(local) = current {
                for (key, value) in local {
                    if key != "$ref" {
                        merged.insert(key, value);
                    }
                }
            }
            refs.push(reference);
            current = Value::Object(merged);
        }
    }
}

impl Schema {
    /// Substitute every `$ref` nested inside a resolved leaf, such as union
    /// alternatives and `items`, so the leaf compiles on its own.
    pub(crate) fn inline_refs(&self, node: Value, refs: &[String]) -> ConfigResult<Value> {
        let Value::Object(map) = node else {
            return Ok(node);
        };
        let mut inlined = Map::with_capacity(map.len());
        for (key, child) in map {
            let value = if DATA_KEYWORDS.contains(&key.as_str()) {
                child
            } else {
                self.inline_child(child, refs)?
            };
            inlined.insert(key, value);
        }
        Ok(Value::Object(inlined))
    }

    fn inline_child(&self, child: Value, refs: &[String]) -> ConfigResult<Value> {
        match child {
            Value::Object(_) => {
                let mut branch = refs.to_vec();
                let resolved = self.resolve_node(&child, &mut branch)?;
                self.inline_refs(resolved, &branch)
            }
            Value::Array(items) => items
                .into_iter()
                .map(|item| self.inline_child(item, refs))
                .collect::<ConfigResult<Vec<_>>>()
                .map(Value::Array),
            other => Ok(other),
        }
    }
}

/// Keywords holding instance data rather than subschemas.
const DATA_KEYWORDS: [&str; 3] = ["default", "enum", "examples"];

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("raw", &self.raw)
            .finish_non_exhaustive()
    }
}

/// The bundled meta-schema: structural requirements the engine places on top
/// of Draft 4.
fn check_meta(raw: &Value) -> ConfigResult<()> {
    let Some(root) = raw.as_object() else {
        return Err(Arc::new(ConfigError::schema("schema root must be an object")));
    };
    match root.get("properties") {
        Some(Value::Object(_)) => {}
        Some(_) => {
            return Err(Arc::new(ConfigError::schema("`properties` must be an object")));
        }
        None => {
            return Err(Arc::new(ConfigError::schema(
                "schema root must declare `properties`",
            )));
        }
    }
    match root.get("definitions") {
        None | Some(Value::Object(_)) => Ok(()),
        Some(_) => Err(Arc::new(ConfigError::schema("`definitions` must be an object"))),
    }
}

/// Whether a resolved node is traversed rather than treated as a leaf.
pub(crate) fn children(node: &Value) -> Option<&Map<String, Value>> {
    let properties = node.get("properties")?.as_object()?;
    if properties.is_empty() {
        return None;
    }
    let is_object = match node.get("type") {
        None => true,
        Some(Value::String(name)) => name == "object",
        Some(Value::Array(names)) => names.iter().any(|n| n.as_str() == Some("object")),
        Some(_) => false,
    };
    is_object.then_some(properties)
}
