//! Adapters for emitting redacted configuration through `slog`.
//!
//! This module connects [`crate::redact`] with `slog` by providing
//! `slog::Value` implementations that serialize the *redacted* form of a
//! configuration as structured JSON via `slog`'s nested-value support.
//!
//! It is responsible for:
//! - Ensuring the logged representation is derived from a redacted copy,
//!   never from the original value.
//! - Avoiding fallible logging APIs: redaction or serialization failures are
//!   represented as placeholder strings rather than propagated as errors.
//!
//! It does not configure `slog`.

use serde::Serialize;
use serde_json::Value as JsonValue;
use slog::{Key, Record, Result as SlogResult, Serializer, Value as SlogValue};

use crate::{
    diff::Difference,
    redact::{redact, DEFAULT_PLACEHOLDER},
    Configuration,
};

/// A `slog::Value` that emits an owned redacted payload as structured JSON.
///
/// This type does not return errors to `slog`; if redaction or conversion
/// into a JSON value fails, it falls back to a JSON string value.
pub struct RedactedJson {
    value: JsonValue,
}

impl RedactedJson {
    fn new(value: JsonValue) -> Self {
        Self { value }
    }
}

impl SlogValue for RedactedJson {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        let nested = slog::Serde(self.value.clone());
        SlogValue::serialize(&nested, record, key, serializer)
    }
}

/// Converts configurations into a `slog::Value` that logs their redacted form.
///
/// ## Example
/// ```ignore
/// use confscope::slog::IntoRedactedJson;
///
/// info!(logger, "reloaded"; "options" => options.to_redacted_json());
/// ```
pub trait IntoRedactedJson: Configuration + Clone + Serialize {
    /// Redacts a copy of `self` with [`DEFAULT_PLACEHOLDER`] and captures it as JSON.
    ///
    /// On failure the returned value holds the JSON string
    /// `"Failed to redact configuration"` or
    /// `"Failed to serialize redacted configuration"`.
    fn to_redacted_json(&self) -> RedactedJson {
        let value = match redact(self, DEFAULT_PLACEHOLDER) {
            Ok(redacted) => serde_json::to_value(redacted).unwrap_or_else(|_| {
                JsonValue::String("Failed to serialize redacted configuration".to_string())
            }),
            Err(_) => JsonValue::String("Failed to redact configuration".to_string()),
        };
        RedactedJson::new(value)
    }
}

impl<T> IntoRedactedJson for T where T: Configuration + Clone + Serialize {}

/// Logs the difference as JSON, masking both values of secret fields.
impl SlogValue for Difference {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        let value = serde_json::to_value(self.redacted(DEFAULT_PLACEHOLDER)).unwrap_or_else(|_| {
            JsonValue::String("Failed to serialize difference".to_string())
        });
        SlogValue::serialize(&RedactedJson::new(value), record, key, serializer)
    }
}
