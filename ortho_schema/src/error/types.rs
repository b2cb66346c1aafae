//! Primary error enum for schema-driven configuration.

use thiserror::Error;

use super::aggregate::AggregatedErrors;
use crate::coerce::CoercionError;
use crate::source::AccessMode;

/// Operation a caller attempted on a [`crate::Source`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoaderAction {
    /// Reading a partial configuration out of the source.
    Load,
    /// Writing validated configuration into the source.
    Set,
}

impl std::fmt::Display for LoaderAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Load => "load_config",
            Self::Set => "set_config",
        })
    }
}

/// Errors that can occur while building, reloading, or reading configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The supplied schema is not usable.
    #[error("Invalid schema: {message}")]
    SchemaInvalid {
        /// Explanation of the meta-schema or reference failure.
        message: String,
    },

    /// A source value could not be converted to the type its leaf demands.
    #[error("Failed to coerce value for '{path}': {source}")]
    Coercion {
        /// Dotted leaf path the value was destined for.
        path: String,
        /// Underlying coercion failure.
        #[source]
        source: CoercionError,
    },

    /// The merged configuration violates the schema.
    #[error("Invalid configuration at '{path}': {message}")]
    ConfigInvalid {
        /// JSON pointer of the offending value.
        path: String,
        /// Validator message.
        message: String,
    },

    /// The source's access mode forbids the requested operation.
    #[error("Source '{source_name}' does not permit {action} (mode is {mode})")]
    LoaderDisallowedAction {
        /// Name reported by the source.
        source_name: String,
        /// Operation that was refused.
        action: LoaderAction,
        /// Mode the source was constructed with.
        mode: AccessMode,
    },

    /// The access mode allows the operation but the source cannot perform it.
    #[error("Source '{source_name}' does not implement {action}")]
    Unsupported {
        /// Name reported by the source.
        source_name: String,
        /// Operation that is missing.
        action: LoaderAction,
    },

    /// No value exists at the requested path.
    #[error("No configuration value at '{path}'")]
    PathNotFound {
        /// Dotted path that was looked up.
        path: String,
    },

    /// A nested lookup passed through a value that is not a mapping.
    #[error("Configuration value at '{path}' is not a section")]
    NotASection {
        /// Dotted path of the non-mapping value.
        path: String,
    },

    /// Error originating from a configuration file.
    #[error("Configuration file error in '{path}': {source}")]
    File {
        /// Path that triggered the failure.
        path: std::path::PathBuf,
        /// Underlying error reported while reading, parsing or writing.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Figment could not extract data from a parsed provider.
    #[error("Failed to gather configuration: {0}")]
    Gathering(#[from] Box<figment::Error>),

    /// The CLI adapter could not parse the supplied arguments.
    #[error("Failed to parse command-line arguments: {0}")]
    CliParsing(#[from] Box<clap::Error>),

    /// Multiple errors occurred during a single operation.
    #[error("multiple configuration errors:\n{0}")]
    Aggregate(Box<AggregatedErrors>),
}
