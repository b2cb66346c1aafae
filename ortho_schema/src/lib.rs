//! Schema-driven layered configuration.
//!
//! `ortho_schema` merges configuration from ordered sources (environment
//! variables, JSON or TOML files, in-memory structures, command-line flags)
//! against a JSON schema that supplies types, defaults and nesting. Every
//! value a source produces is coerced to the type its schema leaf declares,
//! sources are deep-merged with later ones winning, derived values are
//! computed on top, and the result is validated before it becomes visible.
//!
//! ```
//! use ortho_schema::{Config, Derivation, Derivations, EnvSource};
//! use serde_json::{Value, json};
//!
//! let schema = json!({"properties": {
//!     "PORT": {"type": "integer", "default": 8080},
//!     "DEBUG_PORT": {"type": "integer"}
//! }});
//! let rules = Derivations::new().rule(
//!     "DEBUG_PORT",
//!     Derivation::new(["PORT"], |args: &[&Value]| {
//!         json!(args[0].as_i64().unwrap_or_default() + 1)
//!     }),
//! );
//! let base = Config::builder(schema).derivations(rules).build()?;
//! assert_eq!(base.get("DEBUG_PORT")?, 8081);
//!
//! let env = EnvSource::from_pairs("", [("PORT", "1234")]);
//! let overridden = base.override_with(vec![Box::new(env)])?;
//! assert_eq!(overridden.get("DEBUG_PORT")?, 1235);
//! # Ok::<_, std::sync::Arc<ortho_schema::ConfigError>>(())
//! ```

mod cli;
pub mod coerce;
mod config;
mod derivation;
mod error;
mod path;
mod result_ext;
mod schema;
mod source;

use std::sync::Arc;

pub use cli::CliFlags;
pub use config::{Config, ConfigBuilder, ConfigView, LoadState};
pub use derivation::{Derivation, Derivations};
pub use error::{AggregatedErrors, ConfigError, LoaderAction, is_display_request};
pub use path::{ConfigPath, deep_merge, get_in, nest, set_in};
pub use result_ext::ConfigResultExt;
pub use schema::{Schema, SchemaLeaf, Walk};
pub use source::{
    AccessMode, CliBinding, CliSource, EnvLookup, EnvSource, FileFormat, FileSource, MapSource,
    Source, SourceExt, extract_leaves,
};

/// Result type used throughout the crate. Errors are shared so they can be
/// aggregated and cloned cheaply.
pub type ConfigResult<T> = Result<T, Arc<ConfigError>>;
