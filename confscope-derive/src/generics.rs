//! Generic type parameter handling and trait bound management.
//!
//! Bounds are added as where-clause predicates on field *types*, and only for
//! fields whose type mentions a type parameter. A field `items: Vec<T>` gets
//! `Vec<T>: Field`, which is what the generated code needs (`T: Serialize`
//! through the `Vec` impl), rather than `T: Field`.
//!
//! Fields with fully concrete types get no predicate at all. Recursive types
//! such as `next: Box<Node>` would otherwise ask the compiler to prove
//! `Box<Node>: Field` while checking `impl Field for Node`.
//!
//! ## PhantomData Handling
//!
//! `PhantomData<T>` fields are never walked, so they never contribute bounds:
//!
//! ```ignore
//! struct Keyed<T> {
//!     id: String,
//!     _marker: PhantomData<T>,  // T should NOT require Field
//! }
//! ```

use syn::{parse_quote, GenericArgument, Generics, PathArguments, Type, WherePredicate};

/// Returns true when `ty` is `PhantomData<...>` (by last path segment).
pub(crate) fn is_phantom(ty: &Type) -> bool {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "PhantomData"),
        Type::Group(group) => is_phantom(&group.elem),
        Type::Paren(paren) => is_phantom(&paren.elem),
        _ => false,
    }
}

/// Returns true when `ty` names any of the type parameters in `generics`.
pub(crate) fn mentions_type_param(ty: &Type, generics: &Generics) -> bool {
    match ty {
        Type::Path(path) => {
            if let Some(qself) = &path.qself {
                if mentions_type_param(&qself.ty, generics) {
                    return true;
                }
            }
            path.path.segments.iter().any(|segment| {
                let names_param = generics
                    .type_params()
                    .any(|param| segment.ident == param.ident);
                let in_arguments = match &segment.arguments {
                    PathArguments::AngleBracketed(args) => args.args.iter().any(|arg| match arg {
                        GenericArgument::Type(inner) => mentions_type_param(inner, generics),
                        _ => false,
                    }),
                    PathArguments::Parenthesized(args) => {
                        args.inputs
                            .iter()
                            .any(|inner| mentions_type_param(inner, generics))
                            || match &args.output {
                                syn::ReturnType::Type(_, inner) => mentions_type_param(inner, generics),
                                syn::ReturnType::Default => false,
                            }
                    }
                    PathArguments::None => false,
                };
                names_param || in_arguments
            })
        }
        Type::Array(array) => mentions_type_param(&array.elem, generics),
        Type::Slice(slice) => mentions_type_param(&slice.elem, generics),
        Type::Group(group) => mentions_type_param(&group.elem, generics),
        Type::Paren(paren) => mentions_type_param(&paren.elem, generics),
        Type::Ptr(ptr) => mentions_type_param(&ptr.elem, generics),
        Type::Reference(reference) => mentions_type_param(&reference.elem, generics),
        Type::Tuple(tuple) => tuple
            .elems
            .iter()
            .any(|elem| mentions_type_param(elem, generics)),
        _ => false,
    }
}

/// Adds `'static` to every type parameter.
///
/// `Configuration` requires `'static` because layouts are keyed by `TypeId`.
pub(crate) fn add_static_bounds(mut generics: Generics) -> Generics {
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!('static));
    }
    generics
}

/// Appends `predicates` to the where clause of `generics`.
pub(crate) fn with_predicates(mut generics: Generics, predicates: &[WherePredicate]) -> Generics {
    if predicates.is_empty() {
        return generics;
    }
    let where_clause = generics.make_where_clause();
    for predicate in predicates {
        where_clause.predicates.push(predicate.clone());
    }
    generics
}

/// Rejects lifetime parameters with a spanned error.
pub(crate) fn reject_lifetimes(generics: &Generics, derive: &str) -> syn::Result<()> {
    if let Some(lifetime) = generics.lifetimes().next() {
        return Err(syn::Error::new_spanned(
            lifetime,
            format!(
                "`{derive}` cannot be derived for types with lifetime parameters; \
                 configuration types must be `'static`"
            ),
        ));
    }
    Ok(())
}
