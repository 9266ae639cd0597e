//! Redacted copies of configuration instances.
//!
//! The caller's instance is cloned first and only the clone is touched, so
//! redaction never mutates the source. Every secret-tagged terminal field in
//! the clone is overwritten through [`crate::Placeholder`]; array fields are
//! replaced wholesale rather than element by element.

use tracing::trace;

use crate::{
    error::{Error, Operand, Result},
    schema::colloquial_type_name,
    traverse::{terminal_fields, FieldDescriptor},
    Configuration,
};

/// Placeholder substituted for secret values when none is given.
pub const DEFAULT_PLACEHOLDER: &str = "*****";

/// Returns a deep copy of `instance` with every secret field set to `placeholder`.
pub fn redact<T>(instance: &T, placeholder: &str) -> Result<T>
where
    T: Configuration + Clone,
{
    let layout = terminal_fields::<T>()?;
    let mut copy = instance.clone();
    let masked = mask_secrets(&mut copy, &layout, placeholder)?;
    trace!(
        type_name = std::any::type_name::<T>(),
        masked,
        "redacted configuration"
    );
    Ok(copy)
}

/// Redacts an optional instance; the instance must be present.
pub fn redact_optional<T>(instance: Option<&T>, placeholder: &str) -> Result<T>
where
    T: Configuration + Clone,
{
    let instance = instance.ok_or(Error::NullArgument {
        operand: Operand::Target,
    })?;
    redact(instance, placeholder)
}

fn mask_secrets(
    root: &mut dyn Configuration,
    layout: &[FieldDescriptor],
    placeholder: &str,
) -> Result<usize> {
    let type_name = colloquial_type_name(root.type_name());
    let mut masked = 0;
    for descriptor in layout.iter().filter(|d| d.is_secret()) {
        let unresolved = || Error::UnresolvedField {
            type_name: type_name.clone(),
            path: descriptor.path().to_string(),
        };

        let (last, parents) = descriptor.route().split_last().ok_or_else(unresolved)?;
        let owner = descend(&mut *root, parents).ok_or_else(unresolved)?;
        if !owner.redact_field(*last, placeholder) {
            return Err(unresolved());
        }
        masked += 1;
    }
    Ok(masked)
}

fn descend<'a>(
    node: &'a mut dyn Configuration,
    route: &[usize],
) -> Option<&'a mut dyn Configuration> {
    match route.split_first() {
        None => Some(node),
        Some((&index, rest)) => descend(node.field_mut(index)?.as_composite_mut()?, rest),
    }
}
