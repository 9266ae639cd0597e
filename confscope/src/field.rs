//! Field classification: what kind of terminal (or non-terminal) a field is.
//!
//! Every type that can appear as a field of a [`Configuration`] implements
//! [`Field`]. Its [`FieldKind`] is a function of the type alone:
//!
//! | Kind | Types | Compared by |
//! |------|-------|-------------|
//! | Leaf | numbers, `bool`, `char`, strings, addresses, `Option<Leaf>` | value equality |
//! | Array | `Vec<T>`, `VecDeque<T>`, `Box<[T]>`, `[T; N]`, `BTreeSet<T>`, `HashSet<T>`, and `Option` of those except `[T; N]` | canonical JSON encoding |
//! | Composite | `#[derive(Configuration)]` types | recursion into their fields |
//!
//! A `None` array reads as [`Value::Null`] and differs from an empty one.
//! `HashSet` elements are sorted by their encoding before comparison. Sets
//! nested inside other collections keep their iteration order, so prefer
//! `BTreeSet` there.
//!
//! ## Custom leaves
//!
//! Decimal-like newtypes and unit-only enums opt in with `#[derive(Leaf)]`, or
//! with a manual [`Leaf`] impl plus the matching [`Field`] impl. With the
//! `rust_decimal` feature, `rust_decimal::Decimal` is a leaf out of the box.

use std::{
    borrow::Cow,
    collections::{BTreeSet, HashSet, VecDeque},
    hash::{BuildHasher, Hash},
    net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr},
    path::PathBuf,
};

use serde::Serialize;

use crate::{
    schema::TypeSchema,
    value::{Sequence, Value},
    Configuration,
};

/// Builds the schema of a composite field type.
pub type SchemaFn = fn() -> TypeSchema;

/// Value-free classification of a declared field type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldClass {
    /// Terminal scalar-like value.
    Leaf,
    /// Terminal sequence.
    Array,
    /// Nested object, expanded by the traversal engine.
    Composite,
}

/// Classification together with what the traversal engine needs to expand it.
#[derive(Clone, Copy)]
pub enum FieldKind {
    /// Terminal scalar-like value.
    Leaf,
    /// Terminal sequence.
    Array,
    /// Nested object; the function yields its schema.
    Composite(SchemaFn),
}

impl FieldKind {
    /// Drops the nested schema and keeps the classification.
    pub fn class(&self) -> FieldClass {
        match self {
            FieldKind::Leaf => FieldClass::Leaf,
            FieldKind::Array => FieldClass::Array,
            FieldKind::Composite(_) => FieldClass::Composite,
        }
    }
}

impl std::fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.class(), f)
    }
}

/// Outcome of [`Field::read`]; only array encoding can fail.
pub type ReadResult<'a> = Result<FieldRef<'a>, serde_json::Error>;

/// A field read through its [`Field`] impl.
pub enum FieldRef<'a> {
    /// Snapshot of a leaf.
    Leaf(Value),
    /// Snapshot of an array: [`Value::Sequence`], or [`Value::Null`] for an absent one.
    Array(Value),
    /// Borrow of a nested configuration.
    Composite(&'a dyn Configuration),
}

/// Classifies `T`.
pub fn classify<T: Field>() -> FieldClass {
    T::kind().class()
}

/// A type that can be declared as a field of a [`Configuration`].
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be used as a configuration field",
    label = "this type is not classified as a leaf, array or composite",
    note = "derive `Configuration` for nested option structs",
    note = "derive `Leaf` for newtypes and unit-only enums, or mark the field `#[config(skip)]`"
)]
pub trait Field {
    /// The classification of this type.
    fn kind() -> FieldKind
    where
        Self: Sized;

    /// Reads the current value.
    ///
    /// Fails only when an array cannot be encoded.
    fn read(&self) -> ReadResult<'_>;

    /// Mutable access to a nested configuration; `None` for terminals.
    fn as_composite_mut(&mut self) -> Option<&mut dyn Configuration> {
        None
    }
}

/// Scalar-like types compared by value equality.
pub trait Leaf {
    /// Snapshots the value.
    fn to_value(&self) -> Value;
}

/// How a secret field type absorbs the redaction placeholder.
///
/// String-like types take the placeholder verbatim. Sequences are replaced
/// wholesale by a one-element sequence holding the placeholder. Types that
/// cannot represent text reset to their default value.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot hold a redaction placeholder",
    label = "this field is marked `#[config(secret)]`",
    note = "secret markers apply to terminal fields; nested configurations are expanded, not replaced",
    note = "implement `Placeholder` for custom leaf types that should be masked"
)]
pub trait Placeholder: Sized {
    /// Builds the redacted replacement.
    fn from_placeholder(placeholder: &str) -> Self;
}

// =============================================================================
// Leaves
// =============================================================================

macro_rules! impl_leaf_field {
    ($ty:ty) => {
        impl Field for $ty {
            fn kind() -> FieldKind {
                FieldKind::Leaf
            }

            fn read(&self) -> ReadResult<'_> {
                Ok(FieldRef::Leaf(Leaf::to_value(self)))
            }
        }
    };
}

macro_rules! impl_leaf {
    ($variant:ident: $($ty:ty),+ $(,)?) => {
        $(
            impl Leaf for $ty {
                fn to_value(&self) -> Value {
                    Value::$variant((*self).into())
                }
            }

            impl_leaf_field!($ty);
        )+
    };
}

macro_rules! impl_display_leaf {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Leaf for $ty {
                fn to_value(&self) -> Value {
                    Value::Text(self.to_string())
                }
            }

            impl_leaf_field!($ty);
        )+
    };
}

impl_leaf!(Signed: i8, i16, i32, i64, i128);
impl_leaf!(Unsigned: u8, u16, u32, u64, u128);
impl_leaf!(Float: f32, f64);
impl_leaf!(Bool: bool);
impl_leaf!(Char: char);
impl_display_leaf!(IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr);

impl Leaf for isize {
    fn to_value(&self) -> Value {
        Value::Signed(*self as i128)
    }
}
impl_leaf_field!(isize);

impl Leaf for usize {
    fn to_value(&self) -> Value {
        Value::Unsigned(*self as u128)
    }
}
impl_leaf_field!(usize);

impl Leaf for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}
impl_leaf_field!(String);

impl Leaf for Cow<'static, str> {
    fn to_value(&self) -> Value {
        Value::Text(self.to_string())
    }
}
impl_leaf_field!(Cow<'static, str>);

impl Leaf for PathBuf {
    fn to_value(&self) -> Value {
        Value::Text(self.to_string_lossy().into_owned())
    }
}
impl_leaf_field!(PathBuf);

// Normalized so that `1.50` and `1.5` compare equal.
#[cfg(feature = "rust_decimal")]
impl Leaf for rust_decimal::Decimal {
    fn to_value(&self) -> Value {
        Value::Text(self.normalize().to_string())
    }
}
#[cfg(feature = "rust_decimal")]
impl_leaf_field!(rust_decimal::Decimal);

impl<T: Leaf> Leaf for Option<T> {
    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, Leaf::to_value)
    }
}

impl<T: Leaf> Field for Option<T> {
    fn kind() -> FieldKind {
        FieldKind::Leaf
    }

    fn read(&self) -> ReadResult<'_> {
        Ok(FieldRef::Leaf(self.to_value()))
    }
}

impl<T: Field> Field for Box<T> {
    fn kind() -> FieldKind {
        T::kind()
    }

    fn read(&self) -> ReadResult<'_> {
        (**self).read()
    }

    fn as_composite_mut(&mut self) -> Option<&mut dyn Configuration> {
        (**self).as_composite_mut()
    }
}

// =============================================================================
// Arrays
// =============================================================================

macro_rules! impl_array_field {
    ($(impl<$($param:ident),*> for $ty:ty => |$this:ident| $encode:expr;)+) => {
        $(
            impl<$($param),*> Field for $ty
            where
                T: Serialize,
            {
                fn kind() -> FieldKind {
                    FieldKind::Array
                }

                fn read(&self) -> ReadResult<'_> {
                    let $this = self;
                    $encode.map(|sequence| FieldRef::Array(Value::Sequence(sequence)))
                }
            }

            // Nullable arrays: `None` reads as null, distinct from an empty sequence.
            impl<$($param),*> Field for Option<$ty>
            where
                T: Serialize,
            {
                fn kind() -> FieldKind {
                    FieldKind::Array
                }

                fn read(&self) -> ReadResult<'_> {
                    match self {
                        Some(inner) => inner.read(),
                        None => Ok(FieldRef::Array(Value::Null)),
                    }
                }
            }
        )+
    };
}

impl_array_field! {
    impl<T> for Vec<T> => |this| Sequence::ordered(this);
    impl<T> for VecDeque<T> => |this| Sequence::ordered(this);
    impl<T> for Box<[T]> => |this| Sequence::ordered(&**this);
    impl<T> for BTreeSet<T> => |this| Sequence::ordered(this);
    impl<T, S> for HashSet<T, S> => |this| Sequence::unordered(this);
}

impl<T, const N: usize> Field for [T; N]
where
    [T; N]: Serialize,
{
    fn kind() -> FieldKind {
        FieldKind::Array
    }

    fn read(&self) -> ReadResult<'_> {
        Value::sequence(self).map(FieldRef::Array)
    }
}

// =============================================================================
// Placeholders
// =============================================================================

impl Placeholder for String {
    fn from_placeholder(placeholder: &str) -> Self {
        placeholder.to_string()
    }
}

impl Placeholder for Cow<'static, str> {
    fn from_placeholder(placeholder: &str) -> Self {
        Cow::Owned(placeholder.to_string())
    }
}

impl Placeholder for PathBuf {
    fn from_placeholder(placeholder: &str) -> Self {
        PathBuf::from(placeholder)
    }
}

impl Placeholder for char {
    fn from_placeholder(placeholder: &str) -> Self {
        placeholder.chars().next().unwrap_or('*')
    }
}

macro_rules! impl_placeholder_default {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Placeholder for $ty {
                fn from_placeholder(_placeholder: &str) -> Self {
                    <$ty>::default()
                }
            }
        )+
    };
}

impl_placeholder_default!(
    bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64
);

#[cfg(feature = "rust_decimal")]
impl_placeholder_default!(rust_decimal::Decimal);

impl<T: Placeholder> Placeholder for Option<T> {
    fn from_placeholder(placeholder: &str) -> Self {
        Some(T::from_placeholder(placeholder))
    }
}

impl<T: Placeholder> Placeholder for Box<T> {
    fn from_placeholder(placeholder: &str) -> Self {
        Box::new(T::from_placeholder(placeholder))
    }
}

impl<T: Placeholder> Placeholder for Vec<T> {
    fn from_placeholder(placeholder: &str) -> Self {
        vec![T::from_placeholder(placeholder)]
    }
}

impl<T: Placeholder> Placeholder for VecDeque<T> {
    fn from_placeholder(placeholder: &str) -> Self {
        VecDeque::from([T::from_placeholder(placeholder)])
    }
}

impl<T: Placeholder> Placeholder for Box<[T]> {
    fn from_placeholder(placeholder: &str) -> Self {
        Box::new([T::from_placeholder(placeholder)])
    }
}

impl<T: Placeholder + Ord> Placeholder for BTreeSet<T> {
    fn from_placeholder(placeholder: &str) -> Self {
        BTreeSet::from([T::from_placeholder(placeholder)])
    }
}

impl<T, S> Placeholder for HashSet<T, S>
where
    T: Placeholder + Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_placeholder(placeholder: &str) -> Self {
        let mut set = HashSet::with_hasher(S::default());
        set.insert(T::from_placeholder(placeholder));
        set
    }
}
