//! Guards for mutating process environment variables in tests.
//!
//! Every mutation and every restoration runs under one global re-entrant
//! mutex. Guards restore the previous value (or remove the variable) when
//! dropped, so stacked guards for the same key unwind in LIFO order. Tests
//! that set several related variables should hold an [`EnvVarLock`] for the
//! whole test so readers never observe a half-applied set.
//!
//! # Examples
//!
//! ```
//! use ortho_schema_test_helpers::env;
//!
//! let _g = env::set_var("APP_PORT", "1234");
//! assert_eq!(std::env::var("APP_PORT").as_deref(), Ok("1234"));
//! ```

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use std::env;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::sync::LazyLock;

static ENV_MUTEX: LazyLock<ReentrantMutex<()>> = LazyLock::new(ReentrantMutex::default);

/// RAII guard restoring an environment variable to its prior value on drop.
#[must_use = "dropping restores the prior value"]
pub struct EnvVarGuard {
    key: String,
    original: Option<OsString>,
}

impl fmt::Debug for EnvVarGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvVarGuard")
            .field("key", &self.key)
            .field("had_original", &self.original.is_some())
            .finish()
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        let _lock = ENV_MUTEX.lock();
        match self.original.take() {
            // SAFETY: `ENV_MUTEX` is held.
            Some(value) => unsafe { env::set_var(&self.key, value) },
            // SAFETY: `ENV_MUTEX` is held.
            None => unsafe { env::remove_var(&self.key) },
        }
    }
}

/// Exclusive hold on the process environment.
#[must_use = "dropping releases the environment lock"]
pub struct EnvVarLock {
    _guard: ReentrantMutexGuard<'static, ()>,
}

impl EnvVarLock {
    /// Set `key` while this lock is held.
    pub fn set_var(&self, key: impl Into<String>, value: impl AsRef<OsStr>) -> EnvVarGuard {
        set_var(key, value)
    }

    /// Remove `key` while this lock is held.
    pub fn remove_var(&self, key: impl Into<String>) -> EnvVarGuard {
        remove_var(key)
    }
}

/// Acquire the global environment lock for the lifetime of the returned value.
pub fn lock() -> EnvVarLock {
    EnvVarLock {
        _guard: ENV_MUTEX.lock(),
    }
}

/// Set an environment variable, returning a guard that restores it.
pub fn set_var(key: impl Into<String>, value: impl AsRef<OsStr>) -> EnvVarGuard {
    let key = key.into();
    let _lock = ENV_MUTEX.lock();
    let original = env::var_os(&key);
    // SAFETY: `ENV_MUTEX` is held.
    unsafe { env::set_var(&key, value) };
    EnvVarGuard { key, original }
}

/// Remove an environment variable, returning a guard that restores it.
pub fn remove_var(key: impl Into<String>) -> EnvVarGuard {
    let key = key.into();
    let _lock = ENV_MUTEX.lock();
    let original = env::var_os(&key);
    // SAFETY: `ENV_MUTEX` is held.
    unsafe { env::remove_var(&key) };
    EnvVarGuard { key, original }
}

/// Set every pair under one lock and return the guards in setting order.
///
/// ```
/// use ortho_schema_test_helpers::env;
///
/// let _guards = env::set_vars([("APP_A", "1"), ("APP_B", "2")]);
/// assert_eq!(std::env::var("APP_B").as_deref(), Ok("2"));
/// ```
pub fn set_vars<I, K, V>(pairs: I) -> Vec<EnvVarGuard>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: AsRef<OsStr>,
{
    let held = lock();
    pairs
        .into_iter()
        .map(|(key, value)| held.set_var(key, value))
        .collect()
}
