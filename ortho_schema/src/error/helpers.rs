//! Helpers for classifying external errors.

use clap::{Error as ClapError, error::ErrorKind};

/// Returns `true` when a [`clap::Error`] corresponds to `--help` or
/// `--version`.
///
/// [`crate::CliFlags::parse_from`] surfaces these requests as
/// [`crate::ConfigError::CliParsing`]; entry points can check them here and
/// call [`clap::Error::exit`] to keep the zero exit status.
#[must_use]
pub fn is_display_request(err: &ClapError) -> bool {
    matches!(
        err.kind(),
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
    )
}
