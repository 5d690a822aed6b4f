//! Configuration-validated bootstrap sequencing for services.
//!
//! A [`Bootstrap`] merges optional, required and system property sources,
//! substitutes `${VAR}` references from the process environment, binds the
//! result against the registered [`ConfigGroup`]s, flags every required
//! property nobody consumed, and only then lets the process advance to
//! [`BootstrapState::Initialized`] and start its lifecycle-managed
//! components.
//!
//! Every problem found during a configuration pass is collected before the
//! pass fails, so a single [`ApplicationConfigurationError`] lists all of
//! them.
//!
//! ```rust,no_run
//! use bootseq::{Bootstrap, ConfigGroup};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Default, Serialize, Deserialize)]
//! #[serde(default)]
//! struct HttpConfig {
//!     port: u16,
//! }
//!
//! impl ConfigGroup for HttpConfig {
//!     const PREFIX: &'static str = "http";
//! }
//!
//! # fn main() -> Result<(), bootseq::BootstrapError> {
//! let mut bootstrap = Bootstrap::new()
//!     .with_group::<HttpConfig>()
//!     .set_required_property("http.port", "8080");
//! let injector = bootstrap.initialize()?;
//! let http: Option<HttpConfig> = injector.configuration();
//! # let _ = http;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;

mod binder;
mod bootstrap;
mod error;
mod lifecycle;
mod logging;
pub mod report;
pub mod sources;
mod substitute;
mod unused;

pub use binder::{ConfigAttribute, ConfigGroup, ConfigurationBinder, ConfigurationFactory};
pub use bootstrap::{Bootstrap, BootstrapConfig, BootstrapState, Injector};
pub use error::{
    ApplicationConfigurationError, BootstrapError, Message, MessageKind, ProblemSet,
};
pub use lifecycle::{BoxError, Component, LifeCycleManager, LifecycleError, LifecycleManager};
pub use logging::{LoggingConfig, LoggingError, LoggingSubsystem, TracingLogging};
pub use substitute::replace_environment_variables;
pub use unused::unused_properties;

/// Flat, lexicographically ordered mapping of property keys to raw values.
pub type PropertyMap = BTreeMap<String, String>;

/// Result alias used throughout the crate.
pub type BootResult<T> = Result<T, BootstrapError>;
