//! Parse errors shared by the closed key sets.

use std::fmt;

/// Identifies which closed key set a [`ParseKeyError`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Category,
    Recurrence,
    Cadence,
    PaymentMethod,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            KeyKind::Category => "category",
            KeyKind::Recurrence => "recurrence",
            KeyKind::Cadence => "cadence",
            KeyKind::PaymentMethod => "payment method",
        };
        f.write_str(label)
    }
}

/// Raised when a string does not name a member of one of the closed key sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseKeyError {
    pub kind: KeyKind,
    pub value: String,
}

impl ParseKeyError {
    pub fn new(kind: KeyKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

impl fmt::Display for ParseKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} `{}`", self.kind, self.value)
    }
}

impl std::error::Error for ParseKeyError {}
