//! The merge engine and the container that owns its result.
//!
//! A [`Config`] is built through [`ConfigBuilder`]: the schema is validated,
//! the seed mapping is filled with schema defaults and, unless skipped, the
//! first [`Config::reload`] runs before `build` returns. Each reload merges
//! every source in list order over a copy of the current data, layers derived
//! values on top, validates the result and only then commits it. A failed
//! reload leaves the previously committed data in place.

mod builder;
mod view;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{
    ConfigError, ConfigPath, ConfigResult, ConfigResultExt, Derivations, Schema, Source,
    SourceExt, deep_merge,
};

pub use builder::ConfigBuilder;
pub use view::ConfigView;

/// Whether a [`Config`] holds loaded data yet.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadState {
    /// Seed mapping plus defaults only; no reload has completed.
    Seeded,
    /// At least one reload has been committed.
    Loaded {
        /// Number of committed reloads.
        generation: u64,
    },
}

/// Merged, defaulted and validated configuration.
///
/// # Examples
///
/// ```
/// use ortho_schema::{Config, MapSource};
/// use serde_json::json;
///
/// let config = Config::builder(json!({"properties": {
///     "host": {"type": "string", "default": "localhost"},
///     "port": {"type": "integer", "default": 80}
/// }}))
/// .source(MapSource::new(json!({"port": "8080"})))
/// .build()?;
/// assert_eq!(*config.get("host")?, "localhost");
/// assert_eq!(config.get("port")?, 8080);
/// # Ok::<_, std::sync::Arc<ortho_schema::ConfigError>>(())
/// ```
#[derive(Debug)]
pub struct Config {
    schema: Arc<Schema>,
    sources: Vec<Box<dyn Source>>,
    derivations: Arc<Derivations>,
    data: Value,
    state: LoadState,
}

impl Config {
    /// Start configuring a container for `schema`.
    #[must_use]
    pub fn builder(schema: Value) -> ConfigBuilder {
        ConfigBuilder::new(schema)
    }

    /// Re-read every source and commit the validated result.
    ///
    /// # Errors
    ///
    /// Returns the first source failure (for example
    /// [`ConfigError::Coercion`]) or the validation failure of the merged
    /// data. The committed data is unchanged in either case.
    pub fn reload(&mut self) -> ConfigResult<()> {
        let mut merged = self.data.clone();
        for source in &self.sources {
            let partial = source.load_config(&self.schema)?;
            tracing::debug!(
                source = source.name(),
                keys = partial.as_object().map_or(0, Map::len),
                "merged configuration source"
            );
            deep_merge(&mut merged, partial);
        }
        let derived = self.derivations.evaluate(&merged);
        deep_merge(&mut merged, derived);
        self.schema.validate(&merged)?;
        self.data = merged;
        self.state = match self.state {
            LoadState::Seeded => LoadState::Loaded { generation: 1 },
            LoadState::Loaded { generation } => LoadState::Loaded {
                generation: generation.saturating_add(1),
            },
        };
        Ok(())
    }

    /// Build an independent container seeded with a copy of this one's data,
    /// sharing its schema and derivations, with `sources` layered on top.
    ///
    /// `self` is never modified.
    ///
    /// # Errors
    ///
    /// Returns any error from the new container's initial reload.
    pub fn override_with(&self, sources: Vec<Box<dyn Source>>) -> ConfigResult<Self> {
        tracing::debug!(sources = sources.len(), "building overridden configuration");
        ConfigBuilder::shared(Arc::clone(&self.schema), Arc::clone(&self.derivations))
            .initial(self.data.clone())
            .sources(sources)
            .build()
    }

    /// Value of the top-level `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PathNotFound`] when `key` is absent.
    pub fn get(&self, key: &str) -> ConfigResult<&Value> {
        self.data
            .get(key)
            .ok_or_else(|| Arc::new(ConfigError::not_found(key)))
    }

    /// Value of the top-level `key`, or `default` when absent.
    #[must_use]
    pub fn get_or<'a>(&'a self, key: &str, default: &'a Value) -> &'a Value {
        self.data.get(key).unwrap_or(default)
    }

    /// Value at a nested `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PathNotFound`] when any segment is absent.
    pub fn get_in(&self, path: impl Into<ConfigPath>) -> ConfigResult<&Value> {
        crate::path::get_in(&self.data, &path.into())
    }

    /// Value at a nested `path`, or `default` when absent.
    #[must_use]
    pub fn get_in_or<'a>(&'a self, path: impl Into<ConfigPath>, default: &'a Value) -> &'a Value {
        self.get_in(path).unwrap_or(default)
    }

    /// Section-by-section access starting at the root.
    #[must_use]
    pub fn view(&self) -> ConfigView<'_> {
        ConfigView::root(&self.data)
    }

    /// Deserialize the whole configuration into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Gathering`] when the data does not fit `T`.
    pub fn extract<T: DeserializeOwned>(&self) -> ConfigResult<T> {
        T::deserialize(&self.data).into_config()
    }

    /// The committed data.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.data
    }

    /// The schema this container validates against.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Names of the sources merged on reload, lowest priority first.
    pub fn source_names(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|source| source.name())
    }

    /// Load progress.
    #[must_use]
    pub const fn state(&self) -> LoadState {
        self.state
    }
}

#[cfg(test)]
mod tests;
