//! `Leaf` derivation for unit-only enums and single-field newtypes.
//!
//! Enums snapshot as the (optionally renamed) variant name; newtypes
//! delegate to the wrapped leaf.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    parse_quote_spanned, spanned::Spanned, Data, DataEnum, DataStruct, DeriveInput, Fields,
    Index, Member, Result, WherePredicate,
};

use crate::{
    container::parse_container_options,
    field_options::parse_field_options,
    generics::{mentions_type_param, reject_lifetimes, with_predicates},
};

pub(crate) fn expand_leaf(input: DeriveInput, crate_root: &TokenStream) -> Result<TokenStream> {
    let DeriveInput {
        ident,
        generics,
        data,
        attrs,
        ..
    } = input;

    reject_lifetimes(&generics, "Leaf")?;
    let container = parse_container_options(&attrs)?;
    if container.skip_debug {
        return Err(syn::Error::new(
            ident.span(),
            "`skip_debug` has no effect on `Leaf`; it never generates a `Debug` impl",
        ));
    }

    let (to_value_body, predicates) = match &data {
        Data::Enum(data) => (enum_body(data, container.rename_all, crate_root)?, Vec::new()),
        Data::Struct(data) => newtype_body(data, &generics, crate_root)?,
        Data::Union(u) => {
            return Err(syn::Error::new(
                u.union_token.span(),
                "`Leaf` cannot be derived for unions",
            ));
        }
    };

    let generics = with_predicates(generics, &predicates);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics #crate_root::Leaf for #ident #ty_generics #where_clause {
            fn to_value(&self) -> #crate_root::Value {
                #to_value_body
            }
        }

        #[automatically_derived]
        impl #impl_generics #crate_root::Field for #ident #ty_generics #where_clause {
            fn kind() -> #crate_root::FieldKind {
                #crate_root::FieldKind::Leaf
            }

            fn read(&self) -> #crate_root::ReadResult<'_> {
                ::core::result::Result::Ok(#crate_root::FieldRef::Leaf(
                    #crate_root::Leaf::to_value(self),
                ))
            }
        }
    })
}

fn enum_body(
    data: &DataEnum,
    rename_all: Option<crate::container::RenameRule>,
    crate_root: &TokenStream,
) -> Result<TokenStream> {
    let mut arms = Vec::new();
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new(
                variant.span(),
                "`Leaf` can only be derived for enums whose variants are all unit variants",
            ));
        }
        let options = parse_field_options(&variant.attrs)?;
        if options.secret || options.skip {
            return Err(syn::Error::new(
                variant.span(),
                "only `rename` is supported on enum variants",
            ));
        }
        let variant_ident = &variant.ident;
        let label = match options.rename {
            Some(rename) => rename.value(),
            None => {
                let raw = variant_ident.to_string();
                rename_all.map_or(raw.clone(), |rule| rule.apply_to_variant(&raw))
            }
        };
        arms.push(quote! {
            Self::#variant_ident => #crate_root::Value::Text(::std::string::String::from(#label)),
        });
    }

    Ok(quote! {
        match *self {
            #(#arms)*
        }
    })
}

fn newtype_body(
    data: &DataStruct,
    generics: &syn::Generics,
    crate_root: &TokenStream,
) -> Result<(TokenStream, Vec<WherePredicate>)> {
    let mut fields = data.fields.iter();
    let (Some(field), None) = (fields.next(), fields.next()) else {
        return Err(syn::Error::new(
            data.struct_token.span(),
            "`Leaf` can only be derived for structs with exactly one field",
        ));
    };

    let options = parse_field_options(&field.attrs)?;
    if options.secret || options.skip || options.rename.is_some() {
        return Err(syn::Error::new(
            field.span(),
            "field options are not supported on a `Leaf` newtype",
        ));
    }

    let member = field.ident.clone().map_or_else(
        || Member::Unnamed(Index::from(0)),
        Member::Named,
    );
    let ty = &field.ty;
    let mut predicates = Vec::new();
    if mentions_type_param(ty, generics) {
        predicates.push(parse_quote_spanned! { ty.span() => #ty: #crate_root::Leaf });
    }

    Ok((
        quote! { #crate_root::Leaf::to_value(&self.#member) },
        predicates,
    ))
}
