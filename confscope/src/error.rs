//! Error taxonomy for diffing and redaction.
//!
//! Every error is a deterministic function of the inputs (or of the schema),
//! so none of them is worth retrying. Messages carry type names and qualified
//! paths so callers can diagnose a failure without knowing engine internals.

use std::fmt;

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Identifies which argument of an operation was missing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    /// Left-hand side of a diff.
    Left,
    /// Right-hand side of a diff.
    Right,
    /// Instance passed to redaction.
    Target,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Left => f.write_str("left"),
            Operand::Right => f.write_str("right"),
            Operand::Target => f.write_str("redaction target"),
        }
    }
}

/// Errors surfaced by the traversal engine, the differ and the redactor.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// `diff` was invoked with operands of different concrete types.
    #[error("unable to diff `{left}` against `{right}`: operands must have the same concrete type")]
    TypeMismatch {
        /// Type of the left operand.
        left: String,
        /// Type of the right operand.
        right: String,
    },

    /// A composite type contains itself, directly or transitively.
    #[error("type `{type_name}` contains itself through field `{path}`")]
    CyclicTypeGraph {
        /// The type that was already being expanded.
        type_name: String,
        /// Qualified path of the field that re-enters it.
        path: String,
    },

    /// A required operand was absent.
    #[error("{operand} operand is missing")]
    NullArgument {
        /// Which operand was missing.
        operand: Operand,
    },

    /// An array field could not be canonically encoded for comparison.
    #[error("failed to encode array field `{path}`")]
    Encode {
        /// Qualified path of the array field.
        path: String,
        /// The underlying serializer error.
        #[source]
        source: serde_json::Error,
    },

    /// A `Configuration` impl did not expose a field its schema declares.
    #[error("field `{path}` declared by `{type_name}` could not be resolved")]
    UnresolvedField {
        /// Root type whose layout contains the field.
        type_name: String,
        /// Qualified path of the field.
        path: String,
    },
}
