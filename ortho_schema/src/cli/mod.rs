//! Command-line flags generated from a schema.
//!
//! Every schema leaf becomes one value-taking `--long` option named after its
//! path: segments joined with `-`, underscores turned into `-`, lowercased.
//! Supplied values are collected into a [`CliSource`] and layered over an
//! existing [`Config`] with [`Config::override_with`], so flags beat every
//! other source.
//!
//! ```
//! use clap::Command;
//! use ortho_schema::{CliFlags, Config};
//! use serde_json::json;
//!
//! let base = Config::builder(json!({"properties": {
//!     "net": {"properties": {"listen_port": {"type": "integer", "default": 80}}}
//! }}))
//! .build()?;
//! let flags = CliFlags::from_schema(base.schema())?;
//! let (config, _matches) =
//!     flags.parse_from(&base, Command::new("app"), ["app", "--net-listen-port", "8080"])?;
//! assert_eq!(config.get_in("net.listen_port")?, 8080);
//! assert_eq!(base.get_in("net.listen_port")?, 80);
//! # Ok::<_, std::sync::Arc<ortho_schema::ConfigError>>(())
//! ```

use std::collections::HashMap;
use std::ffi::OsString;
use std::sync::Arc;

use clap::error::ErrorKind;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_json::Value;

use crate::{
    CliBinding, CliSource, Config, ConfigError, ConfigPath, ConfigResult, ConfigResultExt,
    Schema, SchemaLeaf,
};

#[derive(Clone, Debug)]
struct Flag {
    id: String,
    long: String,
    binding: CliBinding,
}

/// The option set derived from a schema.
#[derive(Clone, Debug)]
pub struct CliFlags {
    flags: Vec<Flag>,
}

impl CliFlags {
    /// Derive one option per schema leaf.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SchemaInvalid`] when two leaves map to the same
    /// flag name, or for reference errors met while walking.
    pub fn from_schema(schema: &Schema) -> ConfigResult<Self> {
        let mut claimed: HashMap<String, ConfigPath> = HashMap::new();
        let mut flags = Vec::new();
        for leaf in schema.leaves() {
            let SchemaLeaf {
                path,
                schema: leaf_schema,
            } = leaf?;
            let long = flag_name(&path);
            if let Some(previous) = claimed.insert(long.clone(), path.clone()) {
                return Err(Arc::new(ConfigError::schema(format!(
                    "flag `--{long}` is derived from both `{previous}` and `{path}`"
                ))));
            }
            flags.push(Flag {
                id: path.join("_"),
                long,
                binding: CliBinding {
                    path,
                    schema: leaf_schema,
                },
            });
        }
        Ok(Self { flags })
    }

    /// Long flag names in schema order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.flags.iter().map(|flag| flag.long.as_str())
    }

    /// Add the options to `command`.
    ///
    /// Leaf descriptions become help text. When `current` is given, each
    /// option shows the value it currently holds as its default; such
    /// defaults are never collected back by [`CliFlags::source`].
    #[must_use]
    pub fn augment(&self, command: Command, current: Option<&Config>) -> Command {
        self.flags.iter().fold(command, |cmd, flag| {
            let mut arg = Arg::new(flag.id.clone())
                .long(flag.long.clone())
                .value_name(value_name(&flag.binding.schema))
                .action(ArgAction::Set);
            if let Some(help) = flag.binding.schema.get("description").and_then(Value::as_str) {
                arg = arg.help(help.to_owned());
            }
            if let Some(shown) = current
                .and_then(|config| config.get_in(&flag.binding.path).ok())
                .and_then(display_default)
            {
                arg = arg.default_value(shown);
            }
            cmd.arg(arg)
        })
    }

    /// Collect the values given on the command line.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::CliParsing`] when an option was registered
    /// with a value type other than `String`.
    pub fn source(&self, matches: &ArgMatches) -> ConfigResult<CliSource> {
        let mut values = Vec::new();
        for flag in &self.flags {
            if matches.value_source(&flag.id) != Some(ValueSource::CommandLine) {
                continue;
            }
            let raw = matches
                .try_get_one::<String>(&flag.id)
                .map_err(|e| clap::Error::raw(ErrorKind::InvalidValue, e))
                .into_config()?;
            if let Some(raw) = raw {
                values.push((flag.id.clone(), Value::String(raw.clone())));
            }
        }
        let bindings = self
            .flags
            .iter()
            .map(|flag| (flag.id.clone(), flag.binding.clone()));
        Ok(CliSource::new(bindings, values))
    }

    /// Layer the supplied flags over `config`.
    ///
    /// # Errors
    ///
    /// Returns collection errors from [`CliFlags::source`] and any error from
    /// the new container's reload.
    pub fn apply(&self, config: &Config, matches: &ArgMatches) -> ConfigResult<Config> {
        let source = self.source(matches)?;
        tracing::debug!(supplied = !source.is_empty(), "applying command-line flags");
        config.override_with(vec![Box::new(source)])
    }

    /// Parse `args` with the options added to `command`, then layer them over
    /// `config`. The matches are returned for the caller's own arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::CliParsing`] when clap rejects the arguments,
    /// including `--help` (see [`crate::is_display_request`]).
    pub fn parse_from<I, T>(
        &self,
        config: &Config,
        command: Command,
        args: I,
    ) -> ConfigResult<(Config, ArgMatches)>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self
            .augment(command, Some(config))
            .try_get_matches_from(args)
            .into_config()?;
        let overridden = self.apply(config, &matches)?;
        Ok((overridden, matches))
    }
}

fn flag_name(path: &ConfigPath) -> String {
    path.join("-").replace('_', "-").to_lowercase()
}

fn value_name(leaf: &Value) -> String {
    leaf.get("type")
        .and_then(Value::as_str)
        .map_or_else(|| "VALUE".to_owned(), str::to_uppercase)
}

fn display_default(value: &Value) -> Option<String> {
    let shown = match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Array(items) if items.iter().all(|item| !item.is_array() && !item.is_object()) => {
            Some(
                items
                    .iter()
                    .map(|item| item.as_str().map_or_else(|| item.to_string(), str::to_owned))
                    .collect::<Vec<_>>()
                    .join(","),
            )
        }
        other => Some(other.to_string()),
    };
    shown.filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests;
