//! Parsing of `#[config(...)]` field attributes.
//!
//! This module maps attribute syntax to per-field decisions and produces
//! structured errors for invalid forms.

use proc_macro2::Span;
use syn::{spanned::Spanned, Attribute, LitStr, Meta, Result};

/// Per-field options from `#[config(...)]` attributes.
///
/// | Attribute | Effect |
/// |-----------|--------|
/// | None | Field is walked under its own (or `rename_all`-cased) name |
/// | `#[config(secret)]` | Terminal field is masked by redaction |
/// | `#[config(rename = "Name")]` | Path segment is `Name` |
/// | `#[config(skip)]` | Field is invisible to diff and redaction |
#[derive(Clone, Debug, Default)]
pub(crate) struct FieldOptions {
    pub(crate) secret: bool,
    pub(crate) rename: Option<LitStr>,
    pub(crate) skip: bool,
}

fn set_flag(target: &mut bool, name: &str, span: Span) -> Result<()> {
    if *target {
        return Err(syn::Error::new(
            span,
            format!("`{name}` specified more than once on the same field"),
        ));
    }
    *target = true;
    Ok(())
}

pub(crate) fn parse_field_options(attrs: &[Attribute]) -> Result<FieldOptions> {
    let mut options = FieldOptions::default();
    for attr in attrs {
        if !attr.path().is_ident("config") {
            continue;
        }

        match &attr.meta {
            Meta::Path(_) => {
                return Err(syn::Error::new(
                    attr.span(),
                    "expected field options (e.g., #[config(secret)])",
                ));
            }
            Meta::List(list) => {
                list.parse_nested_meta(|meta| {
                    if meta.path.is_ident("secret") {
                        set_flag(&mut options.secret, "secret", meta.path.span())
                    } else if meta.path.is_ident("skip") {
                        set_flag(&mut options.skip, "skip", meta.path.span())
                    } else if meta.path.is_ident("rename") {
                        if options.rename.is_some() {
                            return Err(meta.error("`rename` specified more than once on the same field"));
                        }
                        let name: LitStr = meta.value()?.parse()?;
                        if name.value().is_empty() || name.value().contains('.') {
                            return Err(syn::Error::new(
                                name.span(),
                                "renamed field must be non-empty and must not contain `.`",
                            ));
                        }
                        options.rename = Some(name);
                        Ok(())
                    } else {
                        Err(meta.error(
                            "unknown field option; expected `secret`, `rename = \"...\"` or `skip`",
                        ))
                    }
                })?;
            }
            Meta::NameValue(_) => {
                return Err(syn::Error::new(
                    attr.span(),
                    "name-value syntax is not supported for #[config]",
                ));
            }
        }
    }

    if options.skip && options.secret {
        return Err(syn::Error::new(
            Span::call_site(),
            "a skipped field cannot also be `secret`; skipped fields are never read",
        ));
    }

    Ok(options)
}
