//! Test helpers shared across crates in the bootseq workspace.
//!
//! [`env`] serialises mutation of the process environment so that tests
//! exercising system properties and `${VAR}` substitution do not race, and
//! [`properties`] builds property maps and on-disk properties files.

pub mod env;
pub mod properties;
