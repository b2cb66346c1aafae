//! Source for values collected from command-line flags.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::{AccessMode, Source};
use crate::coerce::coerce_value;
use crate::{ConfigError, ConfigPath, ConfigResult, Schema, set_in};

/// Where a command-line parameter lands in the configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct CliBinding {
    /// Leaf path the parameter sets.
    pub path: ConfigPath,
    /// Resolved leaf schema used for coercion.
    pub schema: Value,
}

/// Values supplied on the command line, keyed by parameter id.
///
/// Bindings are precomputed by [`crate::CliFlags`], so loading never walks
/// the schema.
#[derive(Clone, Debug, Default)]
pub struct CliSource {
    bindings: BTreeMap<String, CliBinding>,
    values: BTreeMap<String, Value>,
}

impl CliSource {
    /// Combine parameter bindings with the raw values supplied for them.
    #[must_use]
    pub fn new<B, V>(bindings: B, values: V) -> Self
    where
        B: IntoIterator<Item = (String, CliBinding)>,
        V: IntoIterator<Item = (String, Value)>,
    {
        Self {
            bindings: bindings.into_iter().collect(),
            values: values.into_iter().collect(),
        }
    }

    /// Whether no parameter was supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Source for CliSource {
    fn name(&self) -> &str {
        "cli"
    }

    fn mode(&self) -> AccessMode {
        AccessMode::ReadOnly
    }

    fn read(&self, _schema: &Schema) -> ConfigResult<Value> {
        let mut partial = Value::Object(Map::new());
        for (parameter, raw) in &self.values {
            let binding = self.bindings.get(parameter).ok_or_else(|| {
                Arc::new(ConfigError::schema(format!(
                    "no schema binding for parameter `{parameter}`"
                )))
            })?;
            let value = coerce_value(raw, &binding.schema)
                .map_err(|err| Arc::new(ConfigError::coercion(&binding.path, err)))?;
            set_in(&mut partial, &binding.path, value);
        }
        Ok(partial)
    }
}
