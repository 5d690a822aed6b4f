//! Accumulation of problems across the stages of a configuration pass.

use std::{error::Error, fmt};

use super::{Message, MessageKind};

/// Errors and warnings gathered during a single configuration pass.
///
/// Every stage appends to the same set; nothing is thrown until all stages
/// have run.
///
/// # Examples
///
/// ```
/// use bootseq::{Message, ProblemSet};
///
/// let mut problems = ProblemSet::default();
/// problems.push(Message::warning("old key"));
/// let warnings = problems.into_result().expect("warnings alone do not fail");
/// assert_eq!(warnings.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProblemSet {
    errors: Vec<Message>,
    warnings: Vec<Message>,
}

impl ProblemSet {
    /// Appends `message` to the sequence matching its kind.
    pub fn push(&mut self, message: Message) {
        match message.kind() {
            MessageKind::Error => self.errors.push(message),
            MessageKind::Warning => self.warnings.push(message),
        }
    }

    /// Errors collected so far, in insertion order.
    #[must_use]
    pub fn errors(&self) -> &[Message] {
        &self.errors
    }

    /// Warnings collected so far, in insertion order.
    #[must_use]
    pub fn warnings(&self) -> &[Message] {
        &self.warnings
    }

    /// Returns `true` when no error has been recorded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Finishes the pass.
    ///
    /// # Errors
    ///
    /// Returns an [`ApplicationConfigurationError`] carrying every error and
    /// warning when at least one error was recorded.
    pub fn into_result(self) -> Result<Vec<Message>, ApplicationConfigurationError> {
        if self.errors.is_empty() {
            Ok(self.warnings)
        } else {
            Err(ApplicationConfigurationError {
                errors: self.errors,
                warnings: self.warnings,
            })
        }
    }
}

impl Extend<Message> for ProblemSet {
    fn extend<I: IntoIterator<Item = Message>>(&mut self, iter: I) {
        for message in iter {
            self.push(message);
        }
    }
}

/// Composite failure of a configuration pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationConfigurationError {
    errors: Vec<Message>,
    warnings: Vec<Message>,
}

impl ApplicationConfigurationError {
    /// Every error found during the pass.
    #[must_use]
    pub fn errors(&self) -> &[Message] {
        &self.errors
    }

    /// Every warning found during the pass.
    #[must_use]
    pub fn warnings(&self) -> &[Message] {
        &self.warnings
    }

    /// Number of errors.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always `false`; a composite failure holds at least one error.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterates over the errors.
    #[must_use = "iterators should be consumed to inspect errors"]
    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.errors.iter()
    }
}

fn write_numbered(f: &mut fmt::Formatter<'_>, messages: &[Message]) -> fmt::Result {
    for (i, message) in messages.iter().enumerate() {
        writeln!(f, "{}) {message}", i + 1)?;
    }
    Ok(())
}

impl fmt::Display for ApplicationConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Configuration errors:")?;
        writeln!(f)?;
        write_numbered(f, &self.errors)?;
        if !self.warnings.is_empty() {
            writeln!(f)?;
            writeln!(f, "Configuration warnings:")?;
            writeln!(f)?;
            write_numbered(f, &self.warnings)?;
        }
        writeln!(f)?;
        let noun = if self.errors.len() == 1 { "error" } else { "errors" };
        write!(f, "{} {noun}", self.errors.len())
    }
}

impl Error for ApplicationConfigurationError {}

impl<'a> IntoIterator for &'a ApplicationConfigurationError {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
