//! Individual configuration problems.

use std::fmt;

/// Classification of a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// The configuration is unusable; the pass must fail.
    Error,
    /// The configuration works but should be updated.
    Warning,
}

/// An immutable problem report produced by one stage of a configuration pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Message {
    kind: MessageKind,
    text: String,
}

impl Message {
    /// Creates an error message.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Error,
            text: text.into(),
        }
    }

    /// Creates a warning message.
    #[must_use]
    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Warning,
            text: text.into(),
        }
    }

    /// Display text of the message.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether this message is an error or a warning.
    #[must_use]
    pub const fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Returns `true` for [`MessageKind::Error`].
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind == MessageKind::Error
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
