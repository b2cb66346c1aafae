//! Attribute-style navigation through nested sections.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{ConfigError, ConfigPath, ConfigResult, ConfigResultExt};

/// Borrowed view of one section of a [`super::Config`].
///
/// Asking for a key that is absent fails with [`ConfigError::PathNotFound`];
/// using a value that is not a mapping as a section fails with
/// [`ConfigError::NotASection`].
///
/// # Examples
///
/// ```
/// use ortho_schema::Config;
/// use serde_json::json;
///
/// let config = Config::builder(json!({"properties": {
///     "db": {"properties": {"pool": {"properties": {
///         "size": {"type": "integer", "default": 4}
///     }}}}
/// }}))
/// .build()?;
/// let pool = config.view().section("db")?.section("pool")?;
/// assert_eq!(pool.value("size")?, 4);
/// assert!(pool.section("size").is_err());
/// # Ok::<_, std::sync::Arc<ortho_schema::ConfigError>>(())
/// ```
#[derive(Clone, Debug)]
pub struct ConfigView<'a> {
    path: ConfigPath,
    value: &'a Value,
}

impl<'a> ConfigView<'a> {
    pub(super) fn root(value: &'a Value) -> Self {
        Self {
            path: ConfigPath::default(),
            value,
        }
    }

    /// The nested section under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PathNotFound`] when `key` is absent and
    /// [`ConfigError::NotASection`] when this view or the value under `key`
    /// is not a mapping.
    pub fn section(&self, key: &str) -> ConfigResult<Self> {
        let value = self.value(key)?;
        let path = self.path.child(key);
        if !value.is_object() {
            return Err(Arc::new(ConfigError::NotASection {
                path: path.to_string(),
            }));
        }
        Ok(Self { path, value })
    }

    /// The value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotASection`] when this view is not a mapping
    /// and [`ConfigError::PathNotFound`] when `key` is absent.
    pub fn value(&self, key: &str) -> ConfigResult<&'a Value> {
        self.map()?
            .get(key)
            .ok_or_else(|| Arc::new(ConfigError::not_found(self.path.child(key))))
    }

    /// Keys of this section in stored order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotASection`] when this view is not a mapping.
    pub fn keys(&self) -> ConfigResult<impl Iterator<Item = &'a str> + use<'a>> {
        Ok(self.map()?.keys().map(String::as_str))
    }

    /// Deserialize this section into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Gathering`] when the section does not fit `T`.
    pub fn extract<T: DeserializeOwned>(&self) -> ConfigResult<T> {
        T::deserialize(self.value).into_config()
    }

    /// Location of this section; empty at the root.
    #[must_use]
    pub const fn path(&self) -> &ConfigPath {
        &self.path
    }

    /// The section as a raw value.
    #[must_use]
    pub const fn as_value(&self) -> &'a Value {
        self.value
    }

    fn map(&self) -> ConfigResult<&'a Map<String, Value>> {
        self.value.as_object().ok_or_else(|| {
            Arc::new(ConfigError::NotASection {
                path: self.path.to_string(),
            })
        })
    }
}
