//! Lifecycle collaborator started as the last step of initialization.

use thiserror::Error;
use tracing::{error, info};

/// Boxed error type returned by [`Component`] implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures raised while starting or stopping managed components.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LifecycleError {
    /// `start` was called more than once.
    #[error("lifecycle manager already started")]
    AlreadyStarted,

    /// A component failed to start; components started before it were
    /// stopped again.
    #[error("component '{name}' failed to start: {source}")]
    Start {
        /// Name of the failing component.
        name: String,
        /// Failure reported by the component.
        #[source]
        source: BoxError,
    },

    /// A component failed to stop. The remaining components were still
    /// stopped.
    #[error("component '{name}' failed to stop: {source}")]
    Stop {
        /// Name of the first component that failed.
        name: String,
        /// Failure reported by the component.
        #[source]
        source: BoxError,
    },
}

/// Capability that starts and stops the application's managed components.
pub trait LifecycleManager {
    /// Starts every managed component.
    ///
    /// # Errors
    ///
    /// Returns a [`LifecycleError`] when a component fails to start.
    fn start(&mut self) -> Result<(), LifecycleError>;

    /// Stops every started component.
    ///
    /// # Errors
    ///
    /// Returns a [`LifecycleError`] when a component fails to stop.
    fn stop(&mut self) -> Result<(), LifecycleError> {
        Ok(())
    }
}

/// A unit of work with a start/stop lifecycle.
pub trait Component {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Starts the component.
    ///
    /// # Errors
    ///
    /// Returns the component's failure.
    fn start(&mut self) -> Result<(), BoxError>;

    /// Stops the component.
    ///
    /// # Errors
    ///
    /// Returns the component's failure.
    fn stop(&mut self) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Starts components in registration order and stops them in reverse.
///
/// # Examples
///
/// ```
/// use bootseq::{BoxError, Component, LifeCycleManager, LifecycleManager};
///
/// struct Cache;
///
/// impl Component for Cache {
///     fn name(&self) -> &str {
///         "cache"
///     }
///
///     fn start(&mut self) -> Result<(), BoxError> {
///         Ok(())
///     }
/// }
///
/// let mut manager = LifeCycleManager::new().with_component(Cache);
/// manager.start().expect("cache starts");
/// assert!(manager.start().is_err());
/// manager.stop().expect("cache stops");
/// ```
#[derive(Default)]
pub struct LifeCycleManager {
    components: Vec<Box<dyn Component>>,
    started: usize,
    start_attempted: bool,
}

impl LifeCycleManager {
    /// Creates a manager with no components.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `component` after those already registered.
    #[must_use]
    pub fn with_component(mut self, component: impl Component + 'static) -> Self {
        self.components.push(Box::new(component));
        self
    }

    /// Number of registered components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` when no component is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    fn stop_started(&mut self) -> Result<(), LifecycleError> {
        let mut first_failure = None;
        while self.started > 0 {
            self.started -= 1;
            let Some(component) = self.components.get_mut(self.started) else {
                continue;
            };
            info!(component = component.name(), "stopping component");
            if let Err(source) = component.stop() {
                error!(component = component.name(), error = %source, "component failed to stop");
                if first_failure.is_none() {
                    first_failure = Some(LifecycleError::Stop {
                        name: component.name().to_owned(),
                        source,
                    });
                }
            }
        }
        first_failure.map_or(Ok(()), Err)
    }
}

impl std::fmt::Debug for LifeCycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifeCycleManager")
            .field(
                "components",
                &self.components.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

impl LifecycleManager for LifeCycleManager {
    fn start(&mut self) -> Result<(), LifecycleError> {
        if self.start_attempted {
            return Err(LifecycleError::AlreadyStarted);
        }
        self.start_attempted = true;
        for index in 0..self.components.len() {
            let Some(component) = self.components.get_mut(index) else {
                break;
            };
            info!(component = component.name(), "starting component");
            if let Err(source) = component.start() {
                let name = component.name().to_owned();
                error!(component = %name, error = %source, "component failed to start");
                // The start failure is reported; stop failures are only logged.
                let _stopped = self.stop_started();
                return Err(LifecycleError::Start { name, source });
            }
            self.started += 1;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), LifecycleError> {
        self.stop_started()
    }
}
