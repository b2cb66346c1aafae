//! Shared helpers for working with `figment::Jail` in tests.
//!
//! Jails give each test a private working directory and restore any
//! environment variables it sets, which is exactly what file and environment
//! sources need.

use anyhow::{Result, anyhow};

/// Executes `f` inside a [`figment::Jail`], returning the closure's output.
///
/// # Errors
///
/// Returns an error if the jail cannot be created or the closure fails.
pub fn with_jail<F, T>(f: F) -> Result<T>
where
    F: FnOnce(&mut figment::Jail) -> figment::error::Result<T>,
{
    let mut output = None;
    figment::Jail::try_with(|j| {
        output = Some(f(j)?);
        Ok(())
    })
    .map_err(|err| anyhow!(err.to_string()))?;
    output.ok_or_else(|| anyhow!("jail closure did not return a value"))
}

/// Converts any displayable error into a [`figment::Error`] so it can cross
/// a jail closure with `?`.
pub fn jail_error(err: impl std::fmt::Display) -> figment::Error {
    figment::Error::from(err.to_string())
}
