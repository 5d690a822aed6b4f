//! Loading a required-properties file from disk.

use camino::Utf8Path;

use crate::{BootResult, BootstrapError, PropertyMap};

use super::parser::parse_properties;
#[cfg(feature = "toml")]
use super::parser::parse_toml;

fn file_error(
    path: &Utf8Path,
    err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> BootstrapError {
    BootstrapError::ConfigFile {
        path: path.to_path_buf(),
        source: err.into(),
    }
}

/// Loads properties from `path`, selecting the format from its extension.
///
/// Files ending in `.toml` are flattened into dotted keys; anything else is
/// read as a `key=value` `.properties` file.
///
/// # Examples
///
/// ```rust,no_run
/// use bootseq::sources::load_properties_from;
/// use camino::Utf8Path;
///
/// # fn run() -> bootseq::BootResult<()> {
/// let properties = load_properties_from(Utf8Path::new("etc/config.properties"))?;
/// assert!(properties.contains_key("http.port"));
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns [`BootstrapError::ConfigFile`] if the file cannot be read or
/// parsed.
pub fn load_properties_from(path: &Utf8Path) -> BootResult<PropertyMap> {
    let data = std::fs::read_to_string(path).map_err(|e| file_error(path, e))?;
    let ext = path.extension().map(str::to_ascii_lowercase);
    let properties = match ext.as_deref() {
        Some("toml") => {
            #[cfg(feature = "toml")]
            {
                parse_toml(&data).map_err(|e| file_error(path, e))?
            }
            #[cfg(not(feature = "toml"))]
            {
                return Err(file_error(
                    path,
                    std::io::Error::other(
                        "toml feature disabled: enable the 'toml' feature to support this file format",
                    ),
                ));
            }
        }
        _ => parse_properties(&data),
    };
    Ok(properties)
}
