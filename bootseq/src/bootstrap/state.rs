//! Checked, one-way transitions of the bootstrap sequencer.

use crate::{BootResult, BootstrapError};

/// Progress of a [`crate::Bootstrap`]. Advances monotonically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BootstrapState {
    /// Nothing has run yet.
    #[default]
    Uninitialized,
    /// A configuration pass has run, whether or not it succeeded.
    Configured,
    /// Components have been started.
    Initialized,
}

impl BootstrapState {
    /// State after starting a configuration pass.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::AlreadyConfigured`] unless the state is
    /// [`Self::Uninitialized`].
    pub fn configure(self) -> BootResult<Self> {
        match self {
            Self::Uninitialized => Ok(Self::Configured),
            Self::Configured | Self::Initialized => Err(BootstrapError::AlreadyConfigured),
        }
    }

    /// State after initialization.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::AlreadyInitialized`] when the state is
    /// already [`Self::Initialized`].
    pub fn initialize(self) -> BootResult<Self> {
        match self {
            Self::Uninitialized | Self::Configured => Ok(Self::Initialized),
            Self::Initialized => Err(BootstrapError::AlreadyInitialized),
        }
    }
}
