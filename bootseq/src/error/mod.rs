//! Error types produced while bootstrapping.

mod aggregate;
mod message;
mod types;

pub use aggregate::{ApplicationConfigurationError, ProblemSet};
pub use message::{Message, MessageKind};
pub use types::BootstrapError;
