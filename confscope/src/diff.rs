//! Field-level comparison of two configuration snapshots.
//!
//! Both operands are walked in lockstep over the shared flattened layout.
//! Leaves compare by value (null-aware); arrays compare by canonical JSON
//! encoding, which makes them order-sensitive and deep. Output order is the
//! layout order, independent of which fields differ.

use serde::Serialize;
use tracing::trace;

use crate::{
    error::{Error, Operand, Result},
    field::FieldRef,
    schema::colloquial_type_name,
    traverse::{layout_of, FieldDescriptor},
    value::Value,
    Configuration,
};

/// One terminal field whose value differs between two snapshots.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Difference {
    #[serde(flatten)]
    descriptor: FieldDescriptor,
    left: Value,
    right: Value,
}

impl Difference {
    /// Descriptor of the differing field.
    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    /// Qualified path of the differing field.
    pub fn path(&self) -> &str {
        self.descriptor.path()
    }

    /// Value on the left-hand side.
    pub fn left(&self) -> &Value {
        &self.left
    }

    /// Value on the right-hand side.
    pub fn right(&self) -> &Value {
        &self.right
    }

    /// Whether the differing field carries a secret marker.
    pub fn is_secret(&self) -> bool {
        self.descriptor.is_secret()
    }

    /// Whether the field lives at `prefix` or anywhere beneath it.
    ///
    /// `is_under("Web")` matches `Web` and `Web.Port` but not `WebSocket`.
    pub fn is_under(&self, prefix: &str) -> bool {
        match self.path().strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('.'),
            None => false,
        }
    }

    /// Returns a copy safe to report outside the trust boundary.
    ///
    /// Both values of a secret field are replaced with `placeholder`;
    /// differences on other fields are returned unchanged.
    #[must_use]
    pub fn redacted(&self, placeholder: &str) -> Self {
        if !self.is_secret() {
            return self.clone();
        }
        Self {
            descriptor: self.descriptor.clone(),
            left: Value::from(placeholder),
            right: Value::from(placeholder),
        }
    }
}

/// Compares two instances of the same configuration type.
pub fn diff<T: Configuration>(left: &T, right: &T) -> Result<Vec<Difference>> {
    diff_dyn(left, right)
}

/// Compares two type-erased configurations.
///
/// Fails with [`Error::TypeMismatch`] before reading any field when the
/// concrete types differ.
pub fn diff_dyn(left: &dyn Configuration, right: &dyn Configuration) -> Result<Vec<Difference>> {
    if left.type_identity() != right.type_identity() {
        return Err(Error::TypeMismatch {
            left: colloquial_type_name(left.type_name()),
            right: colloquial_type_name(right.type_name()),
        });
    }

    let layout = layout_of(left)?;
    let mut differences = Vec::new();
    for descriptor in layout.iter() {
        let left_value = read_terminal(left, descriptor)?;
        let right_value = read_terminal(right, descriptor)?;
        if left_value != right_value {
            differences.push(Difference {
                descriptor: descriptor.clone(),
                left: left_value,
                right: right_value,
            });
        }
    }

    trace!(
        type_name = left.type_name(),
        compared = layout.len(),
        differences = differences.len(),
        "diffed configuration"
    );
    Ok(differences)
}

/// Compares two optional snapshots; both must be present.
pub fn diff_optional<T: Configuration>(
    left: Option<&T>,
    right: Option<&T>,
) -> Result<Vec<Difference>> {
    let left = left.ok_or(Error::NullArgument {
        operand: Operand::Left,
    })?;
    let right = right.ok_or(Error::NullArgument {
        operand: Operand::Right,
    })?;
    diff(left, right)
}

fn read_terminal(root: &dyn Configuration, descriptor: &FieldDescriptor) -> Result<Value> {
    let unresolved = || Error::UnresolvedField {
        type_name: colloquial_type_name(root.type_name()),
        path: descriptor.path().to_string(),
    };
    let encode = |source| Error::Encode {
        path: descriptor.path().to_string(),
        source,
    };

    let (last, parents) = descriptor.route().split_last().ok_or_else(unresolved)?;
    let mut node = root;
    for &index in parents {
        let field = node.field(index).ok_or_else(unresolved)?;
        match field.read().map_err(encode)? {
            FieldRef::Composite(next) => node = next,
            FieldRef::Leaf(_) | FieldRef::Array(_) => return Err(unresolved()),
        }
    }

    match node.field(*last).ok_or_else(unresolved)?.read().map_err(encode)? {
        FieldRef::Leaf(value) | FieldRef::Array(value) => Ok(value),
        FieldRef::Composite(_) => Err(unresolved()),
    }
}
