//! Environment-variable backed source.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use figment::providers::Env;
use serde_json::{Map, Value};

use super::{AccessMode, Source};
use crate::coerce::coerce_value;
use crate::{ConfigError, ConfigPath, ConfigResult, Schema, SchemaLeaf, set_in};

/// Variable lookup used by [`EnvSource`].
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Reads one variable per schema leaf.
///
/// The variable name is the prefix followed by the path segments joined with
/// `_`, so `bar.nested` with prefix `APP_` is read from `APP_bar_nested`. The
/// prefix is used verbatim and names match case-sensitively. Values are taken
/// untrimmed. Unset variables are omitted; set ones, including empty strings,
/// are coerced to the leaf type.
///
/// # Examples
///
/// ```
/// use ortho_schema::{EnvSource, Schema, SourceExt};
/// use serde_json::json;
///
/// let schema = Schema::new(json!({"properties": {"port": {"type": "integer"}}}))?;
/// let source = EnvSource::from_pairs("APP_", [("APP_port", "9000")]);
/// assert_eq!(source.load_config(&schema)?, json!({"port": 9000}));
/// # Ok::<_, std::sync::Arc<ortho_schema::ConfigError>>(())
/// ```
#[derive(Clone)]
pub struct EnvSource {
    prefix: String,
    lookup: EnvLookup,
}

impl EnvSource {
    /// Read the process environment with names starting with `prefix`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::with_lookup(prefix, process_var)
    }

    /// Resolve variables through `lookup` instead of the process environment.
    #[must_use]
    pub fn with_lookup<F>(prefix: impl Into<String>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            prefix: prefix.into(),
            lookup: Arc::new(lookup),
        }
    }

    /// Resolve variables from a fixed set of pairs.
    #[must_use]
    pub fn from_pairs<I, K, V>(prefix: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::with_lookup(prefix, move |name: &str| vars.get(name).cloned())
    }

    /// Name of the variable consulted for `path`.
    #[must_use]
    pub fn variable_name(&self, path: &ConfigPath) -> String {
        format!("{}{}", self.prefix, path.join("_"))
    }
}

/// Exact-name, untrimmed lookup in the process environment.
fn process_var(name: &str) -> Option<String> {
    Env::raw()
        .lowercase(false)
        .iter()
        .find(|(key, _)| key.as_str() == name)
        .map(|(_, value)| value)
}

impl fmt::Debug for EnvSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvSource")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl Source for EnvSource {
    fn name(&self) -> &str {
        "env"
    }

    fn mode(&self) -> AccessMode {
        AccessMode::ReadOnly
    }

    fn read(&self, schema: &Schema) -> ConfigResult<Value> {
        let mut partial = Value::Object(Map::new());
        for leaf in schema.leaves() {
            let SchemaLeaf {
                path,
                schema: leaf_schema,
            } = leaf?;
            let Some(raw) = (self.lookup)(&self.variable_name(&path)) else {
                continue;
            };
            let value = coerce_value(&Value::String(raw), &leaf_schema)
                .map_err(|err| Arc::new(ConfigError::coercion(&path, err)))?;
            set_in(&mut partial, &path, value);
        }
        Ok(partial)
    }
}
