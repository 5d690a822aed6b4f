//! Logging subsystem collaborator.
//!
//! Logging is brought up before configuration is validated so early
//! diagnostics are visible, then reconfigured from the bound
//! [`LoggingConfig`] before the pass decides whether it failed.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

use crate::ConfigGroup;

const DEFAULT_LEVEL: &str = "info";

/// Bound `log.*` properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `warn,bootseq=debug`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL.to_owned(),
        }
    }
}

impl ConfigGroup for LoggingConfig {
    const PREFIX: &'static str = "log";
    const DESCRIPTIONS: &'static [(&'static str, &'static str)] =
        &[("level", "Log filter directive")];

    fn validate(&self) -> Vec<String> {
        match EnvFilter::try_new(&self.level) {
            Ok(_) => Vec::new(),
            Err(err) => vec![format!("invalid log level '{}': {err}", self.level)],
        }
    }
}

/// Failures raised by a [`LoggingSubsystem`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoggingError {
    /// A global subscriber was already installed.
    #[error("failed to install the global tracing subscriber: {0}")]
    Install(#[from] tracing_subscriber::util::TryInitError),

    /// The configured filter directive does not parse.
    #[error("invalid log filter '{directive}': {source}")]
    Filter {
        /// Directive that failed to parse.
        directive: String,
        /// Parser failure.
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    /// The installed filter could not be replaced.
    #[error("failed to reload the log filter: {0}")]
    Reload(#[from] reload::Error),

    /// `configure` was called before `initialize` succeeded.
    #[error("logging has not been initialized")]
    NotInitialized,
}

/// Capability that owns process-wide logging.
pub trait LoggingSubsystem {
    /// Installs logging with built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`LoggingError`] when logging cannot be installed.
    fn initialize(&mut self) -> Result<(), LoggingError>;

    /// Applies the bound logging configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`LoggingError`] when the configuration cannot be applied.
    fn configure(&mut self, config: &LoggingConfig) -> Result<(), LoggingError>;
}

/// [`LoggingSubsystem`] backed by a global `tracing_subscriber` registry
/// with a reloadable [`EnvFilter`].
#[derive(Debug, Default)]
pub struct TracingLogging {
    handle: Option<reload::Handle<EnvFilter, Registry>>,
}

impl LoggingSubsystem for TracingLogging {
    fn initialize(&mut self) -> Result<(), LoggingError> {
        let (filter, handle) = reload::Layer::new(EnvFilter::new(DEFAULT_LEVEL));
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init()?;
        self.handle = Some(handle);
        Ok(())
    }

    fn configure(&mut self, config: &LoggingConfig) -> Result<(), LoggingError> {
        let handle = self.handle.as_ref().ok_or(LoggingError::NotInitialized)?;
        let filter = EnvFilter::try_new(&config.level).map_err(|source| LoggingError::Filter {
            directive: config.level.clone(),
            source,
        })?;
        handle.reload(filter)?;
        Ok(())
    }
}
