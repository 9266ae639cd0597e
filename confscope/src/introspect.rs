//! User-facing `.diff_with()` / `.redacted()` methods.

use crate::{
    diff::{diff, Difference},
    error::Result,
    redact::{redact, DEFAULT_PLACEHOLDER},
    Configuration,
};

/// Convenience methods for every [`Configuration`].
///
/// This trait is blanket-implemented; bring it into scope and call the
/// methods directly on configuration values.
pub trait Introspect: Configuration + Sized {
    /// Field-level differences between `self` (left) and `other` (right).
    fn diff_with(&self, other: &Self) -> Result<Vec<Difference>> {
        diff(self, other)
    }

    /// Deep copy with secret fields set to [`DEFAULT_PLACEHOLDER`].
    fn redacted(&self) -> Result<Self>
    where
        Self: Clone,
    {
        redact(self, DEFAULT_PLACEHOLDER)
    }

    /// Deep copy with secret fields set to `placeholder`.
    fn redacted_with(&self, placeholder: &str) -> Result<Self>
    where
        Self: Clone,
    {
        redact(self, placeholder)
    }
}

impl<T> Introspect for T where T: Configuration {}
