//! In-memory source.

use serde_json::Value;

use super::{AccessMode, Source, extract_leaves};
use crate::{ConfigResult, Schema};

/// Configuration held in memory as a nested structure.
///
/// Loading extracts and coerces schema leaves exactly as [`super::FileSource`]
/// does; writing replaces the held structure.
#[derive(Clone, Debug)]
pub struct MapSource {
    name: String,
    mode: AccessMode,
    data: Value,
}

impl MapSource {
    /// A read-only source over `data`.
    #[must_use]
    pub fn new(data: Value) -> Self {
        Self {
            name: "map".to_owned(),
            mode: AccessMode::ReadOnly,
            data,
        }
    }

    /// Replace the name reported in logs and errors.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Replace the access mode.
    #[must_use]
    pub fn with_mode(mut self, mode: AccessMode) -> Self {
        self.mode = mode;
        self
    }

    /// The held structure.
    #[must_use]
    pub const fn data(&self) -> &Value {
        &self.data
    }
}

impl Source for MapSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn mode(&self) -> AccessMode {
        self.mode
    }

    fn read(&self, schema: &Schema) -> ConfigResult<Value> {
        extract_leaves(schema, &self.data)
    }

    fn write(&mut self, data: &Value) -> ConfigResult<()> {
        self.data = data.clone();
        Ok(())
    }
}
