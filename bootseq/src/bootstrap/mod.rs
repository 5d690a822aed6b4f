//! Entry point that gates application startup on validated configuration.

mod state;

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{Level, info, warn};

use crate::report::{effective_configuration, warnings_report};
use crate::sources::{
    DEFAULT_ENV_PREFIX, combine_property_sources, load_required_properties, system_properties,
};
use crate::{
    BootResult, BootstrapError, ConfigGroup, ConfigurationBinder, ConfigurationFactory,
    LifeCycleManager, LifecycleError, LifecycleManager, LoggingConfig, LoggingSubsystem, Message,
    ProblemSet, PropertyMap, TracingLogging, replace_environment_variables, unused_properties,
};

pub use state::BootstrapState;

/// Bound `bootstrap.*` properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Suppresses the effective-configuration report when set; overrides
    /// [`Bootstrap::quiet`].
    pub quiet: Option<bool>,
}

impl ConfigGroup for BootstrapConfig {
    const PREFIX: &'static str = "bootstrap";
    const DESCRIPTIONS: &'static [(&'static str, &'static str)] =
        &[("quiet", "Suppress the effective configuration report")];
}

/// Single-use sequencer from unconfigured to fully initialized.
///
/// [`Self::configure`] merges, substitutes, binds and checks the properties,
/// failing with every problem at once. [`Self::initialize`] configures first
/// when needed and then starts the lifecycle manager. Each transition runs
/// at most once per instance.
pub struct Bootstrap<B = ConfigurationFactory> {
    binder: B,
    required: Option<PropertyMap>,
    optional: Option<PropertyMap>,
    system: Option<PropertyMap>,
    environment: Option<PropertyMap>,
    env_prefix: String,
    logging: Option<Box<dyn LoggingSubsystem>>,
    lifecycle: Box<dyn LifecycleManager>,
    quiet: bool,
    state: BootstrapState,
    configured: bool,
}

impl Bootstrap {
    /// Creates a bootstrap using the default [`ConfigurationFactory`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_binder(ConfigurationFactory::default())
    }
}

impl Default for Bootstrap {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ConfigurationBinder> Bootstrap<B> {
    /// Creates a bootstrap that binds configuration through `binder`.
    #[must_use]
    pub fn with_binder(binder: B) -> Self {
        Self {
            binder,
            required: None,
            optional: None,
            system: None,
            environment: None,
            env_prefix: DEFAULT_ENV_PREFIX.to_owned(),
            logging: Some(Box::new(TracingLogging::default())),
            lifecycle: Box::new(LifeCycleManager::new()),
            quiet: false,
            state: BootstrapState::Uninitialized,
            configured: false,
        }
    }

    /// Declares configuration group `T`.
    #[must_use]
    pub fn with_group<T: ConfigGroup>(mut self) -> Self {
        self.binder.register::<T>();
        self
    }

    /// Adds one required property. Supplying any required property disables
    /// loading the config file.
    #[must_use]
    pub fn set_required_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.required
            .get_or_insert_with(PropertyMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Adds required properties. Supplying any required property disables
    /// loading the config file.
    #[must_use]
    pub fn set_required_properties<I, K, V>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.required
            .get_or_insert_with(PropertyMap::new)
            .extend(properties.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Adds one lowest-precedence property, exempt from unused checks.
    #[must_use]
    pub fn set_optional_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.optional
            .get_or_insert_with(PropertyMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Adds lowest-precedence properties, exempt from unused checks.
    #[must_use]
    pub fn set_optional_properties<I, K, V>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.optional
            .get_or_insert_with(PropertyMap::new)
            .extend(properties.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Uses `properties` as the system properties instead of reading
    /// prefixed environment variables.
    #[must_use]
    pub fn with_system_properties(mut self, properties: PropertyMap) -> Self {
        self.system = Some(properties);
        self
    }

    /// Resolves `${NAME}` references against `environment` instead of the
    /// process environment.
    #[must_use]
    pub fn with_environment(mut self, environment: PropertyMap) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Changes the prefix of environment variables read as system
    /// properties. Defaults to [`DEFAULT_ENV_PREFIX`].
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Replaces the logging subsystem.
    #[must_use]
    pub fn with_logging(mut self, logging: impl LoggingSubsystem + 'static) -> Self {
        self.logging = Some(Box::new(logging));
        self
    }

    /// Leaves logging untouched.
    #[must_use]
    pub fn do_not_initialize_logging(mut self) -> Self {
        self.logging = None;
        self
    }

    /// Replaces the lifecycle manager started by [`Self::initialize`].
    #[must_use]
    pub fn with_lifecycle_manager(mut self, lifecycle: impl LifecycleManager + 'static) -> Self {
        self.lifecycle = Box::new(lifecycle);
        self
    }

    /// Suppresses the effective-configuration report unless
    /// `bootstrap.quiet` says otherwise.
    #[must_use]
    pub const fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    /// Current state of the sequencer.
    #[must_use]
    pub const fn state(&self) -> BootstrapState {
        self.state
    }

    /// The configuration binder.
    #[must_use]
    pub const fn binder(&self) -> &B {
        &self.binder
    }

    /// Validates configuration and returns the consumed property keys.
    ///
    /// The state advances to [`BootstrapState::Configured`] before any work
    /// happens and stays there even when the pass fails.
    ///
    /// # Errors
    ///
    /// - [`BootstrapError::AlreadyConfigured`] when called a second time.
    /// - [`BootstrapError::ConfigFile`] when the config file cannot be read.
    /// - [`BootstrapError::Configuration`] carrying every error and warning
    ///   when any stage found an error.
    pub fn configure(&mut self) -> BootResult<BTreeSet<String>> {
        self.state = self.state.configure()?;
        let logging_ready = self.initialize_logging_if_required();

        let system = self
            .system
            .clone()
            .unwrap_or_else(|| system_properties(&self.env_prefix));
        let required = load_required_properties(self.required.as_ref(), &system)?;
        let properties = combine_property_sources(self.optional.as_ref(), &required, &system);

        let mut problems = ProblemSet::default();
        let mut unresolved = BTreeSet::new();
        let environment = self.environment.as_ref();
        let properties = replace_environment_variables(
            &properties,
            |name| match environment {
                Some(vars) => vars.get(name).cloned(),
                None => std::env::var(name).ok(),
            },
            |key, error| {
                unresolved.insert(key.to_owned());
                problems.push(Message::error(error));
            },
        );

        self.binder.register::<BootstrapConfig>();
        self.binder.register::<LoggingConfig>();
        let binding_errors = self
            .binder
            .bind(&properties, &mut |warning| problems.push(warning));
        problems.extend(binding_errors);

        let quiet = self.binder.build::<BootstrapConfig>().and_then(|c| c.quiet);
        // Logging picks up the bound configuration even when the pass fails below.
        if logging_ready {
            self.configure_logging(&mut problems);
        }

        problems.extend(unused_properties(
            &required,
            &unresolved,
            &self.binder.used_properties(),
        ));
        let warnings = problems.into_result()?;
        self.configured = true;

        if !quiet.unwrap_or(self.quiet) {
            self.log_effective_configuration();
        }
        if let Some(report) = warnings_report(&warnings) {
            warn!("{report}");
        }
        Ok(self.binder.used_properties())
    }

    /// Configures if needed, then starts the lifecycle manager.
    ///
    /// # Errors
    ///
    /// - [`BootstrapError::AlreadyInitialized`] when called a second time.
    /// - [`BootstrapError::ConfigurationFailed`] when an earlier
    ///   [`Self::configure`] failed.
    /// - Any error of the implicit [`Self::configure`].
    /// - [`BootstrapError::Lifecycle`] when components fail to start.
    pub fn initialize(&mut self) -> BootResult<Injector<'_, B>> {
        let next = self.state.initialize()?;
        if self.state == BootstrapState::Uninitialized {
            self.configure()?;
        } else if !self.configured {
            return Err(BootstrapError::ConfigurationFailed);
        }
        self.state = next;

        info!("Starting lifecycle-managed components");
        self.lifecycle.start()?;
        Ok(Injector {
            binder: &self.binder,
            lifecycle: self.lifecycle.as_mut(),
        })
    }

    fn initialize_logging_if_required(&mut self) -> bool {
        let Some(logging) = self.logging.as_mut() else {
            return false;
        };
        match logging.initialize() {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "logging not initialized; keeping the existing subscriber");
                false
            }
        }
    }

    fn configure_logging(&mut self, problems: &mut ProblemSet) {
        let Some(logging) = self.logging.as_mut() else {
            return;
        };
        // A group that failed to bind has already reported why.
        let Some(config) = self.binder.build::<LoggingConfig>() else {
            return;
        };
        info!("Initializing logging");
        if let Err(err) = logging.configure(&config) {
            problems.push(Message::error(format!("Failed to configure logging: {err}")));
        }
    }

    fn log_effective_configuration(&self) {
        if !tracing::enabled!(Level::INFO) {
            return;
        }
        for line in effective_configuration(&self.binder.attributes()) {
            info!("{line}");
        }
    }
}

impl<B: fmt::Debug> fmt::Debug for Bootstrap<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bootstrap")
            .field("state", &self.state)
            .field("binder", &self.binder)
            .field("env_prefix", &self.env_prefix)
            .field("initialize_logging", &self.logging.is_some())
            .field("quiet", &self.quiet)
            .finish_non_exhaustive()
    }
}

/// Handle to an initialized application.
pub struct Injector<'a, B> {
    binder: &'a B,
    lifecycle: &'a mut dyn LifecycleManager,
}

impl<B: ConfigurationBinder> Injector<'_, B> {
    /// Bound configuration group `T`.
    #[must_use]
    pub fn configuration<T: ConfigGroup>(&self) -> Option<T> {
        self.binder.build()
    }

    /// Property keys consumed while binding.
    #[must_use]
    pub fn used_properties(&self) -> BTreeSet<String> {
        self.binder.used_properties()
    }

    /// Stops the lifecycle-managed components.
    ///
    /// # Errors
    ///
    /// Returns the lifecycle manager's failure.
    pub fn stop(&mut self) -> Result<(), LifecycleError> {
        self.lifecycle.stop()
    }
}

impl<B: fmt::Debug> fmt::Debug for Injector<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injector")
            .field("binder", &self.binder)
            .finish_non_exhaustive()
    }
}
