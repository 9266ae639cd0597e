//! Schema registration for configuration types.
//!
//! A [`Configuration`] describes its own declared fields once, as a
//! [`TypeSchema`], and gives positional access to them. The
//! `#[derive(Configuration)]` macro writes both halves; hand-written impls
//! must keep them in agreement (index `i` in the schema is index `i` in
//! [`Configuration::field`]).

use std::any::TypeId;

use crate::field::{Field, FieldKind};

/// A composite type whose declared fields can be enumerated and read.
pub trait Configuration: 'static {
    /// The declared fields of this type, in declaration order.
    fn schema() -> TypeSchema
    where
        Self: Sized;

    /// Object-safe access to [`Configuration::schema`].
    fn describe(&self) -> TypeSchema;

    /// Borrows the field declared at `index`.
    fn field(&self, index: usize) -> Option<&dyn Field>;

    /// Mutably borrows the field declared at `index`.
    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Field>;

    /// Overwrites the secret field at `index` with `placeholder`.
    ///
    /// Returns `false` when `index` does not name a secret field.
    fn redact_field(&mut self, index: usize, placeholder: &str) -> bool;

    /// Identity of the concrete type behind this value.
    fn type_identity(&self) -> TypeId {
        TypeId::of::<Self>()
    }

    /// Name of the concrete type behind this value.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Declared shape of one configuration type.
#[derive(Clone, Debug)]
pub struct TypeSchema {
    type_id: TypeId,
    name: String,
    fields: Vec<FieldSchema>,
}

/// Declared shape of one field.
#[derive(Clone, Debug)]
pub struct FieldSchema {
    name: &'static str,
    index: usize,
    declared_type: &'static str,
    kind: FieldKind,
    secret: bool,
}

impl TypeSchema {
    /// Starts a schema for `T`.
    pub fn builder<T: ?Sized + 'static>() -> TypeSchemaBuilder {
        TypeSchemaBuilder {
            schema: TypeSchema {
                type_id: TypeId::of::<T>(),
                name: colloquial_type_name(std::any::type_name::<T>()),
                fields: Vec::new(),
            },
        }
    }

    /// Identity of the described type.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Colloquial name of the described type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields, in declaration order.
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }
}

impl FieldSchema {
    /// Path segment for this field.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Position used with [`Configuration::field`].
    pub fn index(&self) -> usize {
        self.index
    }

    /// Raw `std::any::type_name` of the declared type.
    pub fn declared_type(&self) -> &'static str {
        self.declared_type
    }

    /// Classification of the declared type.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Whether the field carries a secret marker.
    pub fn is_secret(&self) -> bool {
        self.secret
    }
}

/// Accumulates fields for a [`TypeSchema`]; indices follow call order.
#[derive(Debug)]
pub struct TypeSchemaBuilder {
    schema: TypeSchema,
}

impl TypeSchemaBuilder {
    /// Declares the next field.
    #[must_use]
    pub fn field<T: Field>(mut self, name: &'static str, secret: bool) -> Self {
        let index = self.schema.fields.len();
        self.schema.fields.push(FieldSchema {
            name,
            index,
            declared_type: std::any::type_name::<T>(),
            kind: T::kind(),
            secret,
        });
        self
    }

    /// Finishes the schema.
    pub fn build(self) -> TypeSchema {
        self.schema
    }
}

/// Renders a `std::any::type_name` string without module paths.
///
/// `alloc::vec::Vec<alloc::string::String>` becomes `Vec<String>`.
pub fn colloquial_type_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut segment_start = 0;
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == ':' && chars.peek() == Some(&':') {
            chars.next();
            out.truncate(segment_start);
            continue;
        }
        out.push(ch);
        if !(ch.is_alphanumeric() || ch == '_') {
            segment_start = out.len();
        }
    }
    out
}
