//! Filling unpopulated paths from schema `default`s.

use std::sync::Arc;

use serde_json::{Map, Value};

use super::{Schema, children};
use crate::coerce::coerce_value;
use crate::{ConfigError, ConfigPath, ConfigResult};

impl Schema {
    /// Insert schema defaults into `data` wherever a key is still missing.
    ///
    /// Values already present, including explicit `null`s, are never
    /// replaced. Leaf defaults go through the same coercion as source data.
    /// An object node without its own `default` is still created when one of
    /// its descendants declares a default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Coercion`] when a default does not satisfy its
    /// own leaf schema, and [`ConfigError::SchemaInvalid`] for reference
    /// errors.
    ///
    /// # Examples
    ///
    /// ```
    /// use ortho_schema::Schema;
    /// use serde_json::json;
    ///
    /// let schema = Schema::new(json!({"properties": {
    ///     "log": {"properties": {
    ///         "level": {"type": "string", "default": "INFO"},
    ///         "file": {"type": ["string", "null"], "default": null}
    ///     }}
    /// }}))?;
    /// let mut data = json!({"log": {"level": "DEBUG"}});
    /// schema.apply_defaults(&mut data)?;
    /// assert_eq!(data, json!({"log": {"level": "DEBUG", "file": null}}));
    /// # Ok::<_, std::sync::Arc<ortho_schema::ConfigError>>(())
    /// ```
    pub fn apply_defaults(&self, data: &mut Value) -> ConfigResult<()> {
        let mut defaults = Map::new();
        for (key, node) in self.properties() {
            let path = ConfigPath::new([key.as_str()]);
            if let Some(value) = self.default_for(node, &path, Vec::new())? {
                defaults.insert(key.clone(), value);
            }
        }
        fill_missing(data, Value::Object(defaults));
        Ok(())
    }

    fn default_for(
        &self,
        node: &Value,
        path: &ConfigPath,
        mut refs: Vec<String>,
    ) -> ConfigResult<Option<Value>> {
        let resolved = self.resolve_node(node, &mut refs)?;
        let own = resolved.get("default").cloned();
        let Some(properties) = children(&resolved) else {
            let leaf = self.inline_refs(resolved, &refs)?;
            return own
                .map(|value| coerce_value(&value, &leaf))
                .transpose()
                .map_err(|err| Arc::new(ConfigError::coercion(path, err)));
        };
        let mut nested = Map::new();
        for (key, child) in properties {
            if let Some(value) = self.default_for(child, &path.child(key.as_str()), refs.clone())? {
                nested.insert(key.clone(), value);
            }
        }
        Ok(match own {
            Some(mut value) => {
                fill_missing(&mut value, Value::Object(nested));
                Some(value)
            }
            None if nested.is_empty() => None,
            None => Some(Value::Object(nested)),
        })
    }
}

/// Copy keys from `defaults` that `target` lacks, recursing where both sides
/// hold mappings.
fn fill_missing(target: &mut Value, defaults: Value) {
    let (Value::Object(existing), Value::Object(incoming)) = (target, defaults) else {
        return;
    };
    for (key, value) in incoming {
        match existing.get_mut(&key) {
            Some(current) => fill_missing(current, value),
            None => {
                existing.insert(key, value);
            }
        }
    }
}
