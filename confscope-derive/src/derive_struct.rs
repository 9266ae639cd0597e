//! Struct-specific `Configuration` derivation.
//!
//! This module turns each declared field into a schema entry, an accessor
//! match arm and (for secret fields) a redaction arm, and collects the
//! where-clause predicates those need.

use proc_macro2::{Ident, Literal, TokenStream};
use quote::{quote, quote_spanned};
use syn::{
    ext::IdentExt, parse_quote_spanned, spanned::Spanned, DataStruct, Fields, Generics, Index,
    LitStr, Member, Result, WherePredicate,
};

use crate::{
    container::ContainerOptions,
    field_options::parse_field_options,
    generics::{is_phantom, mentions_type_param},
};

pub(crate) struct StructDeriveOutput {
    pub(crate) schema_fields: Vec<TokenStream>,
    pub(crate) field_arms: Vec<TokenStream>,
    pub(crate) field_mut_arms: Vec<TokenStream>,
    pub(crate) redact_arms: Vec<TokenStream>,
    pub(crate) field_predicates: Vec<WherePredicate>,
    pub(crate) debug_body: TokenStream,
    pub(crate) debug_predicates: Vec<WherePredicate>,
}

pub(crate) fn derive_struct(
    name: &Ident,
    data: &DataStruct,
    generics: &Generics,
    container: &ContainerOptions,
    crate_root: &TokenStream,
) -> Result<StructDeriveOutput> {
    let mut output = StructDeriveOutput {
        schema_fields: Vec::new(),
        field_arms: Vec::new(),
        field_mut_arms: Vec::new(),
        redact_arms: Vec::new(),
        field_predicates: Vec::new(),
        debug_body: TokenStream::new(),
        debug_predicates: Vec::new(),
    };
    let mut debug_fields = Vec::new();
    let mut omitted_from_debug = false;
    let mut position = 0_usize;

    for (declared, field) in data.fields.iter().enumerate() {
        let options = parse_field_options(&field.attrs)?;
        let ty = &field.ty;
        let span = ty.span();
        let member = field.ident.clone().map_or_else(
            || {
                Member::Unnamed(Index {
                    index: u32::try_from(declared).unwrap_or(u32::MAX),
                    span: field.span(),
                })
            },
            Member::Named,
        );

        if options.skip || is_phantom(ty) {
            omitted_from_debug = true;
            continue;
        }

        let segment = match (&options.rename, &field.ident) {
            (Some(rename), _) => rename.clone(),
            (None, Some(ident)) => {
                let raw = ident.unraw().to_string();
                let cased = container
                    .rename_all
                    .map_or_else(|| raw.clone(), |rule| rule.apply_to_field(&raw));
                LitStr::new(&cased, ident.span())
            }
            (None, None) => LitStr::new(&declared.to_string(), field.span()),
        };

        let index = Literal::usize_unsuffixed(position);
        let secret = options.secret;
        position += 1;

        output.schema_fields.push(quote_spanned! { span =>
            .field::<#ty>(#segment, #secret)
        });
        output.field_arms.push(quote! {
            #index => {
                let field: &dyn #crate_root::Field = &self.#member;
                ::core::option::Option::Some(field)
            }
        });
        output.field_mut_arms.push(quote! {
            #index => {
                let field: &mut dyn #crate_root::Field = &mut self.#member;
                ::core::option::Option::Some(field)
            }
        });
        if secret {
            output.redact_arms.push(quote_spanned! { span =>
                #index => {
                    self.#member = <#ty as #crate_root::Placeholder>::from_placeholder(placeholder);
                    true
                }
            });
        }

        if mentions_type_param(ty, generics) {
            output
                .field_predicates
                .push(parse_quote_spanned! { span => #ty: #crate_root::Field });
            if secret {
                output
                    .field_predicates
                    .push(parse_quote_spanned! { span => #ty: #crate_root::Placeholder });
            } else {
                output
                    .debug_predicates
                    .push(parse_quote_spanned! { span => #ty: ::core::fmt::Debug });
            }
        }

        let value = if secret {
            quote! { &#crate_root::DEFAULT_PLACEHOLDER }
        } else {
            quote! { &self.#member }
        };
        debug_fields.push(match &field.ident {
            Some(ident) => {
                let label = LitStr::new(&ident.unraw().to_string(), ident.span());
                quote! { debug.field(#label, #value); }
            }
            None => quote! { debug.field(#value); },
        });
    }

    let type_label = LitStr::new(&name.unraw().to_string(), name.span());
    output.debug_body = match &data.fields {
        Fields::Named(_) => {
            let finish = if omitted_from_debug {
                quote! { debug.finish_non_exhaustive() }
            } else {
                quote! { debug.finish() }
            };
            quote! {
                let mut debug = f.debug_struct(#type_label);
                #(#debug_fields)*
                #finish
            }
        }
        Fields::Unnamed(_) => quote! {
            let mut debug = f.debug_tuple(#type_label);
            #(#debug_fields)*
            debug.finish()
        },
        Fields::Unit => quote! {
            f.write_str(#type_label)
        },
    };

    Ok(output)
}
