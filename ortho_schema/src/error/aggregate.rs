//! Violations collected while validating a merged configuration.

use std::{error::Error, fmt, sync::Arc};

use super::ConfigError;

/// Every schema violation found while validating one merged configuration.
///
/// [`Schema::validate`](crate::Schema::validate) reports a lone violation as
/// [`ConfigError::ConfigInvalid`] and several as an aggregation, one entry per
/// offending JSON pointer.
///
/// # Examples
///
/// ```
/// use ortho_schema::{ConfigError, Schema};
/// use serde_json::json;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let schema = Schema::new(json!({"properties": {
///     "port": {"type": "integer", "minimum": 1},
///     "db": {"properties": {"host": {"type": "string"}}}
/// }}))?;
/// let Err(err) = schema.validate(&json!({"port": 0, "db": {"host": 5}})) else {
///     panic!("two violations expected");
/// };
/// let ConfigError::Aggregate(errors) = err.as_ref() else {
///     panic!("expected an aggregation, got {err}");
/// };
/// let mut paths: Vec<&str> = errors
///     .iter()
///     .filter_map(|e| match e {
///         ConfigError::ConfigInvalid { path, .. } => Some(path.as_str()),
///         _ => None,
///     })
///     .collect();
/// paths.sort_unstable();
/// assert_eq!(paths, ["/db/host", "/port"]);
/// assert_eq!(errors.len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct AggregatedErrors(Vec<Arc<ConfigError>>);

impl AggregatedErrors {
    /// Wrap the violations collected by one validation pass.
    #[must_use]
    pub const fn new(errors: Vec<Arc<ConfigError>>) -> Self {
        Self(errors)
    }

    /// Iterate over the violations in validator order.
    #[must_use = "iterators should be consumed to inspect errors"]
    pub fn iter(&self) -> impl Iterator<Item = &ConfigError> {
        self.0.iter().map(Arc::as_ref)
    }

    /// Number of violations found.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether validation found nothing to report.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AggregatedErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {e}", i + 1)?;
        }
        Ok(())
    }
}

impl Error for AggregatedErrors {}

impl IntoIterator for AggregatedErrors {
    type Item = Arc<ConfigError>;
    type IntoIter = std::vec::IntoIter<Arc<ConfigError>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
