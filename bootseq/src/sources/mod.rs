//! Property sources and their precedence.
//!
//! Three sources feed a configuration pass, lowest precedence first:
//! optional overrides, required properties, and system properties. The
//! required source is either supplied explicitly or loaded from the file
//! named by the [`CONFIG_PROPERTY`] system property.

mod file;
mod parser;

use camino::Utf8Path;
use figment::providers::Env;
use tracing::info;

use crate::{BootResult, PropertyMap};

pub use file::load_properties_from;

/// System property naming the required-properties file.
pub const CONFIG_PROPERTY: &str = "config";

/// Environment prefix marking variables that act as system properties.
pub const DEFAULT_ENV_PREFIX: &str = "APP_";

/// Reads system properties from environment variables carrying `prefix`.
///
/// The prefix is stripped, the remainder lowercased and `__` mapped to `.`,
/// so `APP_HTTP__PORT=80` becomes `http.port=80`.
#[must_use]
pub fn system_properties(prefix: &str) -> PropertyMap {
    Env::prefixed(prefix)
        .iter()
        .filter_map(|(key, value)| {
            let name = property_key(key.as_str());
            (!name.is_empty()).then_some((name, value))
        })
        .collect()
}

fn property_key(raw: &str) -> String {
    raw.to_ascii_lowercase().replace("__", ".")
}

/// Resolves the required-properties source.
///
/// `explicit` wins when present. Otherwise the file named by the
/// [`CONFIG_PROPERTY`] entry of `system` is loaded; with no such entry the
/// source is empty.
///
/// # Errors
///
/// Returns [`crate::BootstrapError::ConfigFile`] when the named file cannot
/// be read or parsed.
pub fn load_required_properties(
    explicit: Option<&PropertyMap>,
    system: &PropertyMap,
) -> BootResult<PropertyMap> {
    if let Some(properties) = explicit {
        return Ok(properties.clone());
    }
    info!("Loading configuration");
    match system.get(CONFIG_PROPERTY) {
        Some(path) => load_properties_from(Utf8Path::new(path)),
        None => Ok(PropertyMap::new()),
    }
}

/// Merges the three sources; later sources win on key collisions.
#[must_use]
pub fn combine_property_sources(
    optional: Option<&PropertyMap>,
    required: &PropertyMap,
    system: &PropertyMap,
) -> PropertyMap {
    let mut properties = optional.cloned().unwrap_or_default();
    properties.extend(required.iter().map(|(k, v)| (k.clone(), v.clone())));
    properties.extend(system.iter().map(|(k, v)| (k.clone(), v.clone())));
    properties
}

#[cfg(test)]
mod tests;
