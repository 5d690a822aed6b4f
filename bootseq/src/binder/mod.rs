//! Schema binding: turning a flat property map into typed configuration.
//!
//! The bootstrap talks to the binding engine only through
//! [`ConfigurationBinder`], so the pipeline can run against fakes. The
//! default engine, [`ConfigurationFactory`], binds serde types implementing
//! [`ConfigGroup`].

mod factory;

use std::collections::BTreeSet;

use serde::{Serialize, de::DeserializeOwned};

use crate::{Message, PropertyMap};

pub use factory::ConfigurationFactory;

/// A typed group of configuration properties sharing a key prefix.
///
/// Every top-level field of the serialized [`Default`] value is a property
/// named `PREFIX.field`.
///
/// # Examples
///
/// ```
/// use bootseq::ConfigGroup;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// #[serde(default)]
/// struct HttpConfig {
///     port: u16,
///     password: Option<String>,
/// }
///
/// impl Default for HttpConfig {
///     fn default() -> Self {
///         Self { port: 8080, password: None }
///     }
/// }
///
/// impl ConfigGroup for HttpConfig {
///     const PREFIX: &'static str = "http";
///     const DESCRIPTIONS: &'static [(&'static str, &'static str)] =
///         &[("port", "Listen port")];
///     const LEGACY: &'static [(&'static str, &'static str)] = &[("listen-port", "port")];
///     const SENSITIVE: &'static [&'static str] = &["password"];
///
///     fn validate(&self) -> Vec<String> {
///         if self.port == 0 {
///             vec!["port must be positive".to_owned()]
///         } else {
///             Vec::new()
///         }
///     }
/// }
/// ```
pub trait ConfigGroup: Serialize + DeserializeOwned + Default + Clone + Send + Sync + 'static {
    /// Key prefix shared by every property of the group.
    const PREFIX: &'static str;

    /// Human descriptions keyed by field name.
    const DESCRIPTIONS: &'static [(&'static str, &'static str)] = &[];

    /// Deprecated field names paired with the field that replaced them.
    const LEGACY: &'static [(&'static str, &'static str)] = &[];

    /// Fields whose values must never be reported.
    const SENSITIVE: &'static [&'static str] = &[];

    /// Checks constraints that span the bound value, returning one text per
    /// violation.
    fn validate(&self) -> Vec<String> {
        Vec::new()
    }
}

/// One bound property as shown in the effective-configuration report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigAttribute {
    /// Fully qualified property name.
    pub property_name: String,
    /// Rendered default value.
    pub default_value: String,
    /// Rendered value after binding.
    pub current_value: String,
    /// Human description, empty when none was declared.
    pub description: String,
}

/// Capability that binds properties to the registered configuration groups.
pub trait ConfigurationBinder {
    /// Declares a group to bind during [`Self::bind`].
    fn register<T: ConfigGroup>(&mut self);

    /// Binds every registered group against `properties`.
    ///
    /// Deprecations and other soft problems go to `warnings`; binding and
    /// constraint failures are returned.
    fn bind(&mut self, properties: &PropertyMap, warnings: &mut dyn FnMut(Message))
    -> Vec<Message>;

    /// Keys read during the last [`Self::bind`].
    fn used_properties(&self) -> BTreeSet<String>;

    /// Returns the bound value of group `T`, if it bound successfully.
    fn build<T: ConfigGroup>(&self) -> Option<T>;

    /// Describes every bound property for reporting.
    fn attributes(&self) -> Vec<ConfigAttribute>;
}
