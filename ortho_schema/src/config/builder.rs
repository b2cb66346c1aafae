//! Construction of [`Config`] containers.

use std::sync::Arc;

use serde_json::{Map, Value};

use super::{Config, LoadState};
use crate::{ConfigError, ConfigResult, Derivations, Schema, Source};

#[derive(Debug)]
enum SchemaInput {
    Raw(Value),
    Compiled(Arc<Schema>),
}

/// Collects everything a [`Config`] needs before the first reload.
///
/// Sources are merged in the order they are added; later sources win.
#[derive(Debug)]
#[must_use]
pub struct ConfigBuilder {
    schema: SchemaInput,
    sources: Vec<Box<dyn Source>>,
    derivations: Arc<Derivations>,
    initial: Value,
    load: bool,
}

impl ConfigBuilder {
    /// Start from an unvalidated schema document.
    pub fn new(schema: Value) -> Self {
        Self::from_input(SchemaInput::Raw(schema), Arc::new(Derivations::new()))
    }

    /// Start from an already validated schema.
    pub fn with_schema(schema: Arc<Schema>) -> Self {
        Self::from_input(SchemaInput::Compiled(schema), Arc::new(Derivations::new()))
    }

    pub(super) fn shared(schema: Arc<Schema>, derivations: Arc<Derivations>) -> Self {
        Self::from_input(SchemaInput::Compiled(schema), derivations)
    }

    fn from_input(schema: SchemaInput, derivations: Arc<Derivations>) -> Self {
        Self {
            schema,
            sources: Vec::new(),
            derivations,
            initial: Value::Object(Map::new()),
            load: true,
        }
    }

    /// Append one source.
    pub fn source(mut self, source: impl Source + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Append several boxed sources in order.
    pub fn sources(mut self, sources: impl IntoIterator<Item = Box<dyn Source>>) -> Self {
        self.sources.extend(sources);
        self
    }

    /// Rules evaluated after every merge.
    pub fn derivations(mut self, derivations: Derivations) -> Self {
        self.derivations = Arc::new(derivations);
        self
    }

    /// Seed mapping merged beneath every source. Schema defaults fill the
    /// keys it lacks.
    pub fn initial(mut self, initial: Value) -> Self {
        self.initial = initial;
        self
    }

    /// Return from [`ConfigBuilder::build`] without the first reload.
    pub const fn skip_initial_load(mut self) -> Self {
        self.load = false;
        self
    }

    /// Validate the schema, apply defaults and run the first reload.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SchemaInvalid`] for an unusable schema,
    /// [`ConfigError::ConfigInvalid`] when the seed is not a mapping, a
    /// coercion error for a bad default, or any error from the first reload.
    pub fn build(self) -> ConfigResult<Config> {
        let schema = match self.schema {
            SchemaInput::Raw(raw) => Arc::new(Schema::new(raw)?),
            SchemaInput::Compiled(schema) => schema,
        };
        let mut data = self.initial;
        if !data.is_object() {
            return Err(Arc::new(ConfigError::ConfigInvalid {
                path: String::new(),
                message: format!("initial configuration must be an object, found {data}"),
            }));
        }
        schema.apply_defaults(&mut data)?;
        let mut config = Config {
            schema,
            sources: self.sources,
            derivations: self.derivations,
            data,
            state: LoadState::Seeded,
        };
        if self.load {
            config.reload()?;
        }
        Ok(config)
    }
}
