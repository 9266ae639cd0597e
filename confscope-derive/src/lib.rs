//! Derive macros for `confscope`.
//!
//! This crate generates the schema registration behind
//! `#[derive(Configuration)]` and `#[derive(Leaf)]`. It:
//! - reads `#[config(...)]` container and field attributes
//! - emits `Configuration` and `Field` impls that describe and expose fields by position
//!
//! It does **not** walk, compare or redact anything. Traversal, diffing and
//! redaction live in the main `confscope` crate and run at runtime.

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::default_trait_access,
    clippy::doc_markdown,
    clippy::if_not_else,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::struct_excessive_bools,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::result_large_err,
    clippy::option_if_let_else,
    clippy::too_many_lines
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

#[allow(unused_extern_crates)]
extern crate proc_macro;

#[cfg(feature = "slog")]
use proc_macro2::Span;
use proc_macro2::TokenStream;
use proc_macro_crate::{crate_name, FoundCrate};
use quote::{format_ident, quote};
#[cfg(feature = "slog")]
use syn::parse_quote;
use syn::{parse_macro_input, spanned::Spanned, Data, DeriveInput, Result};

mod container;
mod derive_leaf;
mod derive_struct;
mod field_options;
mod generics;
use container::parse_container_options;
use derive_leaf::expand_leaf;
use derive_struct::derive_struct;
use generics::{add_static_bounds, reject_lifetimes, with_predicates};

/// Derives `confscope::Configuration` (and `Field`, `Debug`) for structs.
///
/// # Container Attributes
///
/// - `#[config(rename_all = "...")]` - Case applied to every field's path segment. One of
///   `lowercase`, `PascalCase`, `camelCase`, `snake_case`, `SCREAMING_SNAKE_CASE`, `kebab-case`.
/// - `#[config(skip_debug)]` - Opt out of `Debug` impl generation.
///
/// # Field Attributes
///
/// - **No annotation**: The field is walked. Its type must implement `confscope::Field`:
///   a leaf, an array, or another `Configuration`.
/// - `#[config(secret)]`: Redaction replaces the value through `confscope::Placeholder`.
/// - `#[config(rename = "Name")]`: Use `Name` as the path segment.
/// - `#[config(skip)]`: The field is invisible to diffing and redaction and needs no impls.
///   `PhantomData` fields are skipped automatically.
///
/// Tuple struct fields are named by position (`"0"`, `"1"`, ...). Enums, unions and types with
/// lifetime parameters are rejected at compile time.
///
/// # Additional Generated Impls
///
/// - `Debug`: secret fields are formatted as `"*****"`; skipped fields are omitted.
/// - `slog::Value` (behind `cfg(feature = "slog")`): routes the value through
///   `confscope::slog::IntoRedactedJson`, so the type must be `Clone + Serialize`. The derive first
///   looks for a top-level `slog` crate; if not found, it checks the `CONFSCOPE_SLOG_CRATE` env
///   var for an alternate path (e.g., `my_log::slog`).
///
///   Cargo unifies features across the build graph. Once any crate enables `confscope/slog`,
///   this impl is emitted for every derived type, and a type that is not `Serialize` fails to
///   compile at the derive site. Derive `Serialize` alongside `Configuration` in libraries that
///   may share a build with `slog` users.
#[proc_macro_derive(Configuration, attributes(config))]
pub fn derive_configuration(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

/// Derives `confscope::Leaf` and `confscope::Field` for value-like types.
///
/// - Unit-only enums snapshot as their variant name. `#[config(rename_all = "...")]` on the enum
///   and `#[config(rename = "...")]` on a variant change the label.
/// - Single-field structs delegate to the wrapped type's `Leaf` impl.
#[proc_macro_derive(Leaf, attributes(config))]
pub fn derive_leaf(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_leaf(input, &crate_root()) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

/// Returns the token stream to reference the confscope crate root.
///
/// Handles crate renaming (e.g., `scope = { package = "confscope", ... }`)
/// and internal usage (when derive is used inside the confscope crate itself).
fn crate_root() -> TokenStream {
    match crate_name("confscope") {
        Ok(FoundCrate::Itself) => quote! { crate },
        Ok(FoundCrate::Name(name)) => {
            let ident = format_ident!("{}", name);
            quote! { ::#ident }
        }
        Err(_) => quote! { ::confscope },
    }
}

/// Returns the token stream to reference the slog crate root.
///
/// Handles crate renaming (e.g., `my_slog = { package = "slog", ... }`).
/// If the top-level `slog` crate is not available, falls back to the
/// `CONFSCOPE_SLOG_CRATE` env var, which should be a path like `my_log::slog`.
#[cfg(feature = "slog")]
fn slog_crate() -> Result<TokenStream> {
    match crate_name("slog") {
        Ok(FoundCrate::Itself) => Ok(quote! { crate }),
        Ok(FoundCrate::Name(name)) => {
            let ident = format_ident!("{}", name);
            Ok(quote! { ::#ident })
        }
        Err(_) => {
            let env_value = std::env::var("CONFSCOPE_SLOG_CRATE").map_err(|_| {
                syn::Error::new(
                    Span::call_site(),
                    "slog support is enabled, but no top-level `slog` crate was found. \
Set the CONFSCOPE_SLOG_CRATE env var to a path (e.g., `my_log::slog`) or add \
`slog` as a direct dependency.",
                )
            })?;
            let path = syn::parse_str::<syn::Path>(&env_value).map_err(|_| {
                syn::Error::new(
                    Span::call_site(),
                    format!("CONFSCOPE_SLOG_CRATE must be a valid Rust path (got `{env_value}`)"),
                )
            })?;
            Ok(quote! { #path })
        }
    }
}

fn expand(input: DeriveInput) -> Result<TokenStream> {
    let DeriveInput {
        ident,
        generics,
        data,
        attrs,
        ..
    } = input;

    reject_lifetimes(&generics, "Configuration")?;
    let container = parse_container_options(&attrs)?;
    let crate_root = crate_root();

    let data = match &data {
        Data::Struct(data) => data,
        Data::Enum(e) => {
            return Err(syn::Error::new(
                e.enum_token.span(),
                "`Configuration` cannot be derived for enums; derive `Leaf` for unit-only enums",
            ));
        }
        Data::Union(u) => {
            return Err(syn::Error::new(
                u.union_token.span(),
                "`Configuration` cannot be derived for unions",
            ));
        }
    };

    let output = derive_struct(&ident, data, &generics, &container, &crate_root)?;

    let config_generics = with_predicates(
        add_static_bounds(generics.clone()),
        &output.field_predicates,
    );
    let (impl_generics, ty_generics, where_clause) = config_generics.split_for_impl();
    let schema_fields = &output.schema_fields;
    let field_arms = &output.field_arms;
    let field_mut_arms = &output.field_mut_arms;
    let redact_arms = &output.redact_arms;

    let debug_impl = if container.skip_debug {
        quote! {}
    } else {
        let debug_generics = with_predicates(generics.clone(), &output.debug_predicates);
        let (debug_impl_generics, debug_ty_generics, debug_where_clause) =
            debug_generics.split_for_impl();
        let debug_body = &output.debug_body;
        quote! {
            #[automatically_derived]
            impl #debug_impl_generics ::core::fmt::Debug for #ident #debug_ty_generics #debug_where_clause {
                fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                    #debug_body
                }
            }
        }
    };

    // Only generate slog impl when the slog feature is enabled on confscope-derive.
    #[cfg(feature = "slog")]
    let slog_impl = {
        let slog_crate = slog_crate()?;
        let mut slog_generics = add_static_bounds(generics);
        let slog_where_clause = slog_generics.make_where_clause();
        let self_ty: syn::Type = parse_quote!(#ident #ty_generics);
        slog_where_clause
            .predicates
            .push(parse_quote!(#self_ty: #crate_root::slog::IntoRedactedJson));
        let (slog_impl_generics, slog_ty_generics, slog_where_clause) =
            slog_generics.split_for_impl();
        quote! {
            #[automatically_derived]
            impl #slog_impl_generics #slog_crate::Value for #ident #slog_ty_generics #slog_where_clause {
                fn serialize(
                    &self,
                    record: &#slog_crate::Record<'_>,
                    key: #slog_crate::Key,
                    serializer: &mut dyn #slog_crate::Serializer,
                ) -> #slog_crate::Result {
                    let redacted = #crate_root::slog::IntoRedactedJson::to_redacted_json(self);
                    #slog_crate::Value::serialize(&redacted, record, key, serializer)
                }
            }
        }
    };

    #[cfg(not(feature = "slog"))]
    let slog_impl = quote! {};

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics #crate_root::Configuration for #ident #ty_generics #where_clause {
            fn schema() -> #crate_root::TypeSchema {
                #crate_root::TypeSchema::builder::<Self>()
                    #(#schema_fields)*
                    .build()
            }

            fn describe(&self) -> #crate_root::TypeSchema {
                <Self as #crate_root::Configuration>::schema()
            }

            fn field(&self, index: usize) -> ::core::option::Option<&dyn #crate_root::Field> {
                match index {
                    #(#field_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn field_mut(
                &mut self,
                index: usize,
            ) -> ::core::option::Option<&mut dyn #crate_root::Field> {
                match index {
                    #(#field_mut_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            #[allow(unused_variables)]
            fn redact_field(&mut self, index: usize, placeholder: &str) -> bool {
                match index {
                    #(#redact_arms)*
                    _ => false,
                }
            }
        }

        #[automatically_derived]
        impl #impl_generics #crate_root::Field for #ident #ty_generics #where_clause {
            fn kind() -> #crate_root::FieldKind {
                #crate_root::FieldKind::Composite(<Self as #crate_root::Configuration>::schema)
            }

            fn read(&self) -> #crate_root::ReadResult<'_> {
                ::core::result::Result::Ok(#crate_root::FieldRef::Composite(self))
            }

            fn as_composite_mut(
                &mut self,
            ) -> ::core::option::Option<&mut dyn #crate_root::Configuration> {
                ::core::option::Option::Some(self)
            }
        }

        #debug_impl

        #slog_impl

        // `slog` already provides `impl<V: Value> Value for &V`, so a reference
        // impl here would conflict with the blanket impl.
    })
}
