//! Primary error enum for bootstrap flows.

use camino::Utf8PathBuf;
use thiserror::Error;

use super::ApplicationConfigurationError;
use crate::lifecycle::LifecycleError;

/// Errors that can occur while configuring or initializing an application.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BootstrapError {
    /// The required-properties file could not be read or parsed.
    #[error("Configuration file error in '{path}': {source}")]
    ConfigFile {
        /// Path of the file that failed to load.
        path: Utf8PathBuf,
        /// Underlying I/O or parse failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// `configure()` was called on an instance that already left
    /// [`crate::BootstrapState::Uninitialized`].
    #[error("Already configured")]
    AlreadyConfigured,

    /// `initialize()` was called on an instance that is already initialized.
    #[error("Already initialized")]
    AlreadyInitialized,

    /// `initialize()` was called after the configuration pass failed.
    #[error("Configuration failed; the application cannot be initialized")]
    ConfigurationFailed,

    /// One or more configuration problems were found.
    #[error(transparent)]
    Configuration(Box<ApplicationConfigurationError>),

    /// Lifecycle-managed components failed to start.
    #[error("Failed to start lifecycle-managed components: {0}")]
    Lifecycle(#[from] LifecycleError),
}

impl BootstrapError {
    /// Returns the composite configuration failure, if this is one.
    #[must_use]
    pub fn as_configuration(&self) -> Option<&ApplicationConfigurationError> {
        match self {
            Self::Configuration(inner) => Some(inner),
            _ => None,
        }
    }
}

impl From<ApplicationConfigurationError> for BootstrapError {
    fn from(err: ApplicationConfigurationError) -> Self {
        Self::Configuration(Box::new(err))
    }
}
