//! Snapshot values read out of terminal fields.
//!
//! A [`Value`] is an owned copy of a leaf or array field taken at the moment
//! the engine reads it. Differences carry these snapshots, so a report stays
//! valid after the configuration it came from is dropped or replaced.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

/// Owned snapshot of a terminal field value.
#[derive(Clone, Debug)]
pub enum Value {
    /// An absent nullable value (`None`).
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer of any width.
    Signed(i128),
    /// An unsigned integer of any width.
    Unsigned(u128),
    /// A floating point number.
    Float(f64),
    /// A single character.
    Char(char),
    /// Text, including string renderings of addresses, paths and decimals.
    Text(String),
    /// The canonical encoding of an array field.
    Sequence(Sequence),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the text payload, if this is a [`Value::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the array payload, if this is a [`Value::Sequence`].
    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Value::Sequence(sequence) => Some(sequence),
            _ => None,
        }
    }

    /// Captures an ordered collection as a [`Value::Sequence`].
    pub fn sequence<T>(value: &T) -> Result<Self, serde_json::Error>
    where
        T: Serialize + ?Sized,
    {
        Sequence::ordered(value).map(Value::Sequence)
    }
}

/// Canonical encoding of an array field.
///
/// Equality is decided on the compact JSON text, which `serde_json` writes
/// for every integer width. Two ordered sequences encode identically exactly
/// when their elements encode identically in the same order. Unordered
/// collections captured with [`Sequence::unordered`] sort their encoded
/// elements first, so equal sets compare equal regardless of iteration order.
///
/// Sets nested inside other collections (`Vec<HashSet<_>>`) are written in
/// their own iteration order; use `BTreeSet` for nested sets.
#[derive(Clone, Debug)]
pub struct Sequence {
    canonical: String,
    json: JsonValue,
}

impl Sequence {
    /// Encodes an ordered collection element by element, as `serde_json` writes it.
    pub fn ordered<T>(value: &T) -> Result<Self, serde_json::Error>
    where
        T: Serialize + ?Sized,
    {
        let canonical = serde_json::to_string(value)?;
        let json = serde_json::to_value(value)
            .unwrap_or_else(|_| JsonValue::String(canonical.clone()));
        Ok(Self { canonical, json })
    }

    /// Encodes an unordered collection with its elements sorted by encoding.
    pub fn unordered<'a, T, I>(elements: I) -> Result<Self, serde_json::Error>
    where
        T: Serialize + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let mut encoded = elements
            .into_iter()
            .map(|element| serde_json::to_string(element).map(|text| (text, element)))
            .collect::<Result<Vec<_>, _>>()?;
        encoded.sort_by(|(a, _), (b, _)| a.cmp(b));

        let texts: Vec<&str> = encoded.iter().map(|(text, _)| text.as_str()).collect();
        let canonical = format!("[{}]", texts.join(","));
        let json = encoded
            .iter()
            .map(|(_, element)| serde_json::to_value(element))
            .collect::<Result<Vec<_>, _>>()
            .map_or_else(|_| JsonValue::String(canonical.clone()), JsonValue::Array);
        Ok(Self { canonical, json })
    }

    /// The compact JSON text used for equality.
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// The JSON form used for reporting.
    ///
    /// Integers outside the 64-bit range cannot be held in a JSON tree; such
    /// sequences report their canonical text as a JSON string instead.
    pub fn as_json(&self) -> &JsonValue {
        &self.json
    }
}

impl PartialEq for Sequence {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Sequence {}

impl Serialize for Sequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.json.serialize(serializer)
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Signed(a), Value::Signed(b)) => a == b,
            (Value::Unsigned(a), Value::Unsigned(b)) => a == b,
            // NaN equals NaN so that diffing an instance against itself stays empty.
            #[allow(clippy::float_cmp)]
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => a == b,
            _ => false,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(value) => serializer.serialize_bool(*value),
            Value::Signed(value) => serializer.serialize_i128(*value),
            Value::Unsigned(value) => serializer.serialize_u128(*value),
            Value::Float(value) => serializer.serialize_f64(*value),
            Value::Char(value) => serializer.serialize_char(*value),
            Value::Text(value) => serializer.serialize_str(value),
            Value::Sequence(value) => value.serialize(serializer),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Signed(value) => write!(f, "{value}"),
            Value::Unsigned(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::Char(value) => write!(f, "{value}"),
            Value::Text(value) => f.write_str(value),
            Value::Sequence(value) => fmt::Display::fmt(value, f),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}
