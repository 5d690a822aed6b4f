//! Helpers for safely mutating environment variables in tests.
//!
//! Every mutation happens while holding a global re-entrant mutex. An
//! [`EnvScope`] keeps that mutex for its whole lifetime, so a test sees a
//! stable environment until the scope is dropped, at which point each
//! variable is restored in reverse order of mutation.
//!
//! # Examples
//!
//! ```
//! use test_helpers::env;
//!
//! let scope = env::scope([("BOOTSEQ_DEMO", Some("1")), ("BOOTSEQ_GONE", None)]);
//! assert_eq!(std::env::var("BOOTSEQ_DEMO").as_deref(), Ok("1"));
//! drop(scope);
//! assert!(std::env::var("BOOTSEQ_DEMO").is_err());
//! ```

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use std::env;
use std::ffi::OsString;
use std::fmt;
use std::sync::LazyLock;

static ENV_MUTEX: LazyLock<ReentrantMutex<()>> = LazyLock::new(ReentrantMutex::default);

/// Previous state of a single variable touched by a scope.
struct Restore {
    key: String,
    original: Option<OsString>,
}

/// RAII scope holding the environment lock and restoring every variable it
/// changed when dropped.
#[must_use = "dropping releases the environment lock and restores variables"]
pub struct EnvScope {
    restores: Vec<Restore>,
    _lock: ReentrantMutexGuard<'static, ()>,
}

impl EnvScope {
    /// Sets `key` to `value` inside this scope.
    pub fn set(&mut self, key: &str, value: &str) {
        self.record(key);
        // SAFETY: `ENV_MUTEX` is held for the lifetime of `self`.
        unsafe { env::set_var(key, value) };
    }

    /// Removes `key` inside this scope.
    pub fn remove(&mut self, key: &str) {
        self.record(key);
        // SAFETY: `ENV_MUTEX` is held for the lifetime of `self`.
        unsafe { env::remove_var(key) };
    }

    fn record(&mut self, key: &str) {
        self.restores.push(Restore {
            key: key.to_owned(),
            original: env::var_os(key),
        });
    }
}

impl Drop for EnvScope {
    fn drop(&mut self) {
        while let Some(restore) = self.restores.pop() {
            match restore.original {
                // SAFETY: `ENV_MUTEX` is still held; `_lock` drops after this body.
                Some(value) => unsafe { env::set_var(&restore.key, value) },
                None => unsafe { env::remove_var(&restore.key) },
            }
        }
    }
}

impl fmt::Debug for EnvScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvScope")
            .field(
                "keys",
                &self.restores.iter().map(|r| r.key.as_str()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

/// Acquires the environment lock and returns an empty scope.
pub fn lock() -> EnvScope {
    EnvScope {
        restores: Vec::new(),
        _lock: ENV_MUTEX.lock(),
    }
}

/// Applies each `(key, value)` pair, removing the variable when `value` is
/// `None`, and returns the scope that undoes them.
pub fn scope<'a, I>(vars: I) -> EnvScope
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    let mut scope = lock();
    for (key, value) in vars {
        match value {
            Some(v) => scope.set(key, v),
            None => scope.remove(key),
        }
    }
    scope
}
