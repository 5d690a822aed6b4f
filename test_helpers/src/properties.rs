//! Fixtures for property maps and properties files.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Builds a sorted property map from `(key, value)` pairs.
///
/// # Examples
///
/// ```
/// let props = test_helpers::properties::map(&[("a", "1"), ("b", "2")]);
/// assert_eq!(props.get("a").map(String::as_str), Some("1"));
/// ```
#[must_use]
pub fn map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

/// Writes `entries` as `key=value` lines to `dir/name` and returns the path.
///
/// # Errors
///
/// Returns an error when the file cannot be written.
pub fn write_file(dir: &Utf8Path, name: &str, entries: &[(&str, &str)]) -> Result<Utf8PathBuf> {
    let mut body = String::from("# generated by bootseq_test_helpers\n");
    for (key, value) in entries {
        writeln!(body, "{key}={value}").context("format properties line")?;
    }
    write_raw(dir, name, &body)
}

/// Writes `body` verbatim to `dir/name` and returns the path.
///
/// # Errors
///
/// Returns an error when the file cannot be written.
pub fn write_raw(dir: &Utf8Path, name: &str, body: &str) -> Result<Utf8PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, body).with_context(|| format!("write {path}"))?;
    Ok(path)
}
