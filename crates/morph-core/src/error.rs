use std::fmt;

use crate::list::ListId;
use crate::morph::MorphId;

/// The object an operation was invoked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    Morph(MorphId),
    List(ListId),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Morph(id) => write!(f, "morph {id}"),
            Subject::List(id) => write!(f, "list {id}"),
        }
    }
}

/// Errors raised by [`crate::MorphTree`] operations.
///
/// Both kinds describe a defect in the calling code; none of them is
/// transient, so nothing in this crate retries or recovers from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MorphError {
    /// The operation is not legal in the current lifecycle phase.
    StateViolation {
        subject: Subject,
        operation: &'static str,
        expected: &'static str,
        actual: &'static str,
    },
    /// Content handed to a morph has a shape the morph cannot hold.
    UnsupportedContent { morph: MorphId, found: String },
}

impl MorphError {
    pub(crate) fn state(
        subject: Subject,
        operation: &'static str,
        expected: &'static str,
        actual: &'static str,
    ) -> Self {
        MorphError::StateViolation {
            subject,
            operation,
            expected,
            actual,
        }
    }

    pub fn is_state_violation(&self) -> bool {
        matches!(self, MorphError::StateViolation { .. })
    }

    pub fn is_unsupported_content(&self) -> bool {
        matches!(self, MorphError::UnsupportedContent { .. })
    }
}

impl fmt::Display for MorphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MorphError::StateViolation {
                subject,
                operation,
                expected,
                actual,
            } => write!(
                f,
                "cannot {operation} on {subject}: expected {expected}, found {actual}"
            ),
            MorphError::UnsupportedContent { morph, found } => {
                write!(f, "morph {morph} cannot hold content of type {found}")
            }
        }
    }
}

impl std::error::Error for MorphError {}
