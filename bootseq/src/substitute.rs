//! `${NAME}` substitution inside property values.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::PropertyMap;

#[expect(
    clippy::expect_used,
    reason = "the pattern is a literal and is exercised by the unit tests"
)]
static ENV_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid environment reference pattern"));

/// Replaces every `${NAME}` marker in every value with `lookup(NAME)`.
///
/// Each marker whose variable is undefined is reported through
/// `on_error(key, text)` and the whole property is dropped from the result,
/// so it is never bound. Resolution never stops at the first failure: every
/// marker of every value is visited.
///
/// # Examples
///
/// ```
/// use bootseq::{PropertyMap, replace_environment_variables};
///
/// let mut props = PropertyMap::new();
/// props.insert("url".into(), "http://${HOST}:${PORT}".into());
/// let mut failed = Vec::new();
/// let resolved = replace_environment_variables(
///     &props,
///     |name| (name == "HOST").then(|| "localhost".to_owned()),
///     |key, _| failed.push(key.to_owned()),
/// );
/// assert!(resolved.is_empty());
/// assert_eq!(failed, ["url"]);
/// ```
pub fn replace_environment_variables<L, E>(
    properties: &PropertyMap,
    lookup: L,
    mut on_error: E,
) -> PropertyMap
where
    L: Fn(&str) -> Option<String>,
    E: FnMut(&str, String),
{
    let mut replaced = PropertyMap::new();
    for (key, value) in properties {
        let mut missing = Vec::new();
        let substituted = ENV_REFERENCE.replace_all(value, |caps: &Captures<'_>| {
            let name = caps.get(1).map_or("", |m| m.as_str());
            lookup(name).unwrap_or_else(|| {
                missing.push(name.to_owned());
                String::new()
            })
        });
        if missing.is_empty() {
            replaced.insert(key.clone(), substituted.into_owned());
        } else {
            for name in missing {
                on_error(
                    key,
                    format!(
                        "Configuration property '{key}' references environment variable '{name}' which is not set"
                    ),
                );
            }
        }
    }
    replaced
}
