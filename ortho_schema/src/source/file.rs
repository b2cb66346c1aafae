//! File-backed source for JSON and TOML documents.

use std::error::Error;
use std::io::ErrorKind;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
#[cfg(feature = "toml")]
use figment::providers::Toml;
use figment::providers::{Format, Json};
use serde_json::{Map, Value};

use super::{AccessMode, Source, extract_leaves};
use crate::{ConfigError, ConfigResult, LoaderAction, Schema};

/// Serialisation format of a [`FileSource`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum FileFormat {
    /// JSON documents.
    Json,
    /// TOML documents.
    #[cfg(feature = "toml")]
    Toml,
}

impl FileFormat {
    /// Pick a format from the file extension. Unknown extensions are JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::File`] for `.toml` files when the `toml`
    /// feature is disabled.
    pub fn for_path(path: &Utf8Path) -> ConfigResult<Self> {
        match path.extension().map(str::to_ascii_lowercase).as_deref() {
            Some("toml") => {
                #[cfg(feature = "toml")]
                {
                    Ok(Self::Toml)
                }
                #[cfg(not(feature = "toml"))]
                {
                    Err(file_error(
                        path,
                        std::io::Error::other(
                            "toml feature disabled: enable the 'toml' feature to read this file",
                        ),
                    ))
                }
            }
            _ => Ok(Self::Json),
        }
    }

    fn figment(self, text: &str) -> Figment {
        match self {
            Self::Json => Figment::from(Json::string(text)),
            #[cfg(feature = "toml")]
            Self::Toml => Figment::from(Toml::string(text)),
        }
    }

    fn render(self, data: &Value) -> Result<String, Box<dyn Error + Send + Sync>> {
        match self {
            Self::Json => Ok(serde_json::to_string_pretty(data)?),
            #[cfg(feature = "toml")]
            Self::Toml => Ok(toml::to_string(data)?),
        }
    }
}

/// Configuration parsed once from a JSON or TOML document.
///
/// A path that does not exist yields empty data. Values are extracted only at
/// schema leaf paths and coerced on every load. Sources opened from a path
/// can be given a writable [`AccessMode`]; writes replace the whole file.
///
/// # Examples
///
/// ```
/// use ortho_schema::{FileFormat, FileSource, Schema, SourceExt};
/// use serde_json::json;
///
/// let schema = Schema::new(json!({"properties": {"debug": {"type": "boolean"}}}))?;
/// let source = FileSource::from_text(FileFormat::Json, r#"{"debug": "yes"}"#)?;
/// assert_eq!(source.load_config(&schema)?, json!({"debug": true}));
/// # Ok::<_, std::sync::Arc<ortho_schema::ConfigError>>(())
/// ```
#[derive(Clone, Debug)]
pub struct FileSource {
    name: String,
    path: Option<Utf8PathBuf>,
    format: FileFormat,
    mode: AccessMode,
    data: Value,
}

impl FileSource {
    /// Read and parse `path`. A leading `~` is expanded to the home
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::File`] when the file exists but cannot be read
    /// or parsed.
    pub fn open(path: impl AsRef<Utf8Path>) -> ConfigResult<Self> {
        let path = expand_home(path.as_ref());
        let format = FileFormat::for_path(&path)?;
        let data = match std::fs::read_to_string(&path) {
            Ok(text) => parse(format, &text).map_err(|e| file_error(&path, e))?,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path, "configuration file not found; using empty data");
                Value::Object(Map::new())
            }
            Err(err) => return Err(file_error(&path, err)),
        };
        Ok(Self {
            name: path.to_string(),
            path: Some(path),
            format,
            mode: AccessMode::ReadOnly,
            data,
        })
    }

    /// Parse an in-memory document. Such sources have nowhere to write.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Gathering`] when `text` does not parse.
    pub fn from_text(format: FileFormat, text: &str) -> ConfigResult<Self> {
        let data = parse(format, text).map_err(|e| Arc::new(ConfigError::gathering(e)))?;
        Ok(Self {
            name: "<text>".to_owned(),
            path: None,
            format,
            mode: AccessMode::ReadOnly,
            data,
        })
    }

    /// Replace the access mode.
    #[must_use]
    pub fn with_mode(mut self, mode: AccessMode) -> Self {
        self.mode = mode;
        self
    }

    /// The expanded path, when opened from the filesystem.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8Path> {
        self.path.as_deref()
    }

    /// The parsed document.
    #[must_use]
    pub const fn data(&self) -> &Value {
        &self.data
    }
}

impl Source for FileSource {
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
        let Some(path) = self.path.as_ref() else {
            return Err(Arc::new(ConfigError::Unsupported {
                source_name: self.name.clone(),
                action: LoaderAction::Set,
            }));
        };
        let text = self.format.render(data).map_err(|e| file_error(path, e))?;
        std::fs::write(path, text).map_err(|e| file_error(path, e))?;
        self.data = data.clone();
        Ok(())
    }
}

fn parse(format: FileFormat, text: &str) -> Result<Value, figment::Error> {
    format.figment(text).extract::<Value>()
}

fn expand_home(path: &Utf8Path) -> Utf8PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_owned();
    };
    dirs::home_dir()
        .and_then(|home| Utf8PathBuf::from_path_buf(home).ok())
        .map_or_else(|| path.to_owned(), |home| home.join(rest))
}

fn file_error(path: &Utf8Path, err: impl Into<Box<dyn Error + Send + Sync>>) -> Arc<ConfigError> {
    Arc::new(ConfigError::File {
        path: path.as_std_path().to_path_buf(),
        source: err.into(),
    })
}
