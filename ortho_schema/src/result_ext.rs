//! Extension for mapping foreign errors into `ConfigResult` concisely.
//!
//! Replaces the repetitive `.map_err(|e| Arc::new(ConfigError::from(e)))`
//! pattern at call sites that talk to `serde_json`, `figment`, or `clap`.
//!
//! # Examples
//!
//! ```
//! use ortho_schema::{ConfigResult, ConfigResultExt};
//!
//! fn port() -> ConfigResult<u16> {
//!     serde_json::from_value(serde_json::json!(8080)).into_config()
//! }
//! assert_eq!(port().ok(), Some(8080));
//! ```

use std::sync::Arc;

use crate::{ConfigError, ConfigResult};

/// Generic extension for mapping any `Result<T, E>` with
/// `E: Into<ConfigError>` into a [`ConfigResult`].
pub trait ConfigResultExt<T> {
    /// Convert `Result<T, E>` into `ConfigResult<T>`.
    ///
    /// # Errors
    ///
    /// Propagates the original error after conversion into `Arc<ConfigError>`.
    fn into_config(self) -> ConfigResult<T>;
}

impl<T, E> ConfigResultExt<T> for Result<T, E>
where
    E: Into<ConfigError>,
{
    fn into_config(self) -> ConfigResult<T> {
        self.map_err(|e| Arc::new(e.into()))
    }
}
