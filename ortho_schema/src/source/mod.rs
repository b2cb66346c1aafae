//! Providers of partial configuration.
//!
//! A [`Source`] turns whatever it is backed by (process environment, a file,
//! an in-memory structure, parsed command-line flags) into a partial nested
//! structure holding only the schema paths it has values for, each value
//! already coerced to its leaf type. Callers go through [`SourceExt`], which
//! enforces the source's [`AccessMode`].

mod cli;
mod env;
mod file;
mod map;

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::coerce::coerce_value;
use crate::{ConfigError, ConfigResult, LoaderAction, Schema, SchemaLeaf, get_in, set_in};

pub use cli::{CliBinding, CliSource};
pub use env::{EnvLookup, EnvSource};
pub use file::{FileFormat, FileSource};
pub use map::MapSource;

/// Operations a source permits.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum AccessMode {
    /// Only [`SourceExt::load_config`].
    #[default]
    ReadOnly,
    /// Only [`SourceExt::set_config`].
    WriteOnly,
    /// Both operations.
    ReadWrite,
}

impl AccessMode {
    /// Whether loading is permitted.
    #[must_use]
    pub const fn can_read(self) -> bool {
        matches!(self, Self::ReadOnly | Self::ReadWrite)
    }

    /// Whether writing is permitted.
    #[must_use]
    pub const fn can_write(self) -> bool {
        matches!(self, Self::WriteOnly | Self::ReadWrite)
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ReadOnly => "read-only",
            Self::WriteOnly => "write-only",
            Self::ReadWrite => "read-write",
        })
    }
}

/// A provider of partial configuration.
///
/// Implementors supply the raw operations. Access-mode checks and write
/// validation live in [`SourceExt`], which every source gets for free.
pub trait Source: fmt::Debug + Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Operations this source permits.
    fn mode(&self) -> AccessMode;

    /// Produce the partial configuration this source holds for `schema`.
    ///
    /// Paths the source has nothing for must be omitted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Coercion`] when a present value cannot take its
    /// leaf type, or a source specific error.
    fn read(&self, schema: &Schema) -> ConfigResult<Value>;

    /// Persist already validated configuration. Best effort and not
    /// transactional.
    ///
    /// # Errors
    ///
    /// The default implementation returns [`ConfigError::Unsupported`].
    fn write(&mut self, _data: &Value) -> ConfigResult<()> {
        Err(Arc::new(ConfigError::Unsupported {
            source_name: self.name().to_owned(),
            action: LoaderAction::Set,
        }))
    }
}

/// Mode-gated entry points for every [`Source`].
pub trait SourceExt: Source {
    /// Load the partial configuration for `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::LoaderDisallowedAction`] when the source is
    /// write-only, otherwise whatever [`Source::read`] reports.
    fn load_config(&self, schema: &Schema) -> ConfigResult<Value> {
        ensure_allowed(self, LoaderAction::Load)?;
        self.read(schema)
    }

    /// Validate `data` against `schema` and store it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::LoaderDisallowedAction`] when the source is
    /// read-only, a validation error when `data` does not satisfy `schema`,
    /// otherwise whatever [`Source::write`] reports.
    fn set_config(&mut self, schema: &Schema, data: &Value) -> ConfigResult<()> {
        ensure_allowed(self, LoaderAction::Set)?;
        schema.validate(data)?;
        self.write(data)
    }
}

impl<S: Source + ?Sized> SourceExt for S {}

fn ensure_allowed<S: Source + ?Sized>(source: &S, action: LoaderAction) -> ConfigResult<()> {
    let mode = source.mode();
    let allowed = match action {
        LoaderAction::Load => mode.can_read(),
        LoaderAction::Set => mode.can_write(),
    };
    if allowed {
        return Ok(());
    }
    Err(Arc::new(ConfigError::LoaderDisallowedAction {
        source_name: source.name().to_owned(),
        action,
        mode,
    }))
}

/// Pick every schema leaf present in `data`, coerce it and nest it into a new
/// partial structure.
///
/// Keys outside the schema are dropped. A `null` is kept only when its leaf
/// accepts null and is otherwise treated as absent.
///
/// # Errors
///
/// Returns [`ConfigError::Coercion`] for the first value that cannot take its
/// leaf type.
///
/// # Examples
///
/// ```
/// use ortho_schema::{Schema, extract_leaves};
/// use serde_json::json;
///
/// let schema = Schema::new(json!({"properties": {
///     "db": {"properties": {"port": {"type": "integer"}}}
/// }}))?;
/// let partial = extract_leaves(&schema, &json!({"db": {"port": "5432"}, "extra": 1}))?;
/// assert_eq!(partial, json!({"db": {"port": 5432}}));
/// # Ok::<_, std::sync::Arc<ortho_schema::ConfigError>>(())
/// ```
pub fn extract_leaves(schema: &Schema, data: &Value) -> ConfigResult<Value> {
    let mut partial = Value::Object(Map::new());
    for leaf in schema.leaves() {
        let SchemaLeaf {
            path,
            schema: leaf_schema,
        } = leaf?;
        let Ok(raw) = get_in(data, &path) else {
            continue;
        };
        match coerce_value(raw, &leaf_schema) {
            Ok(value) => set_in(&mut partial, &path, value),
            Err(_) if raw.is_null() => {}
            Err(err) => return Err(Arc::new(ConfigError::coercion(&path, err))),
        }
    }
    Ok(partial)
}
