//! Test helpers shared across crates.
//!
//! - [`env`]: serialised environment-variable guards.
//! - [`figment`]: running setup closures inside a `figment::Jail`.
//! - [`schemas`]: canonical sample schemas used by the test suites.

pub mod env;
pub mod figment;
pub mod schemas;
