//! Container-level attribute parsing for `#[derive(Configuration)]` and `#[derive(Leaf)]`.
//!
//! This module handles attributes on the struct/enum itself, not on fields.

use syn::{Attribute, LitStr, Meta, Result};

/// Options parsed from container-level `#[config(...)]` attributes.
#[derive(Clone, Debug, Default)]
pub(crate) struct ContainerOptions {
    /// If true, skip generating the `Debug` impl.
    pub(crate) skip_debug: bool,
    /// Casing applied to field (or variant) names that are not renamed explicitly.
    pub(crate) rename_all: Option<RenameRule>,
}

/// Casing conventions accepted by `rename_all`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RenameRule {
    LowerCase,
    PascalCase,
    CamelCase,
    SnakeCase,
    ScreamingSnakeCase,
    KebabCase,
}

impl RenameRule {
    fn from_str(rule: &str) -> Option<Self> {
        match rule {
            "lowercase" => Some(Self::LowerCase),
            "PascalCase" => Some(Self::PascalCase),
            "camelCase" => Some(Self::CamelCase),
            "snake_case" => Some(Self::SnakeCase),
            "SCREAMING_SNAKE_CASE" => Some(Self::ScreamingSnakeCase),
            "kebab-case" => Some(Self::KebabCase),
            _ => None,
        }
    }

    /// Renames a snake_case field identifier.
    pub(crate) fn apply_to_field(self, field: &str) -> String {
        match self {
            Self::LowerCase | Self::SnakeCase => field.to_string(),
            Self::PascalCase => field
                .split('_')
                .filter(|part| !part.is_empty())
                .map(capitalize)
                .collect(),
            Self::CamelCase => {
                let pascal = Self::PascalCase.apply_to_field(field);
                let mut chars = pascal.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_lowercase().chain(chars).collect()
                })
            }
            Self::ScreamingSnakeCase => field.to_ascii_uppercase(),
            Self::KebabCase => field.replace('_', "-"),
        }
    }

    /// Renames a PascalCase variant identifier.
    pub(crate) fn apply_to_variant(self, variant: &str) -> String {
        match self {
            Self::PascalCase => variant.to_string(),
            Self::LowerCase => variant.to_ascii_lowercase(),
            Self::CamelCase => {
                let mut chars = variant.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_lowercase().chain(chars).collect()
                })
            }
            Self::SnakeCase | Self::ScreamingSnakeCase | Self::KebabCase => {
                let mut snake = String::with_capacity(variant.len() + 4);
                for (index, ch) in variant.char_indices() {
                    if index > 0 && ch.is_uppercase() {
                        snake.push('_');
                    }
                    snake.extend(ch.to_lowercase());
                }
                Self::SnakeCase.convert_snake(self, snake)
            }
        }
    }

    fn convert_snake(self, target: Self, snake: String) -> String {
        debug_assert_eq!(self, Self::SnakeCase);
        match target {
            Self::ScreamingSnakeCase => snake.to_ascii_uppercase(),
            Self::KebabCase => snake.replace('_', "-"),
            _ => snake,
        }
    }
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Parses container-level `#[config(...)]` attributes.
pub(crate) fn parse_container_options(attrs: &[Attribute]) -> Result<ContainerOptions> {
    let mut options = ContainerOptions::default();

    for attr in attrs {
        if !attr.path().is_ident("config") {
            continue;
        }

        match &attr.meta {
            Meta::Path(_) => {
                // Bare #[config] on container - no meaning, ignore
            }
            Meta::List(list) => {
                list.parse_nested_meta(|meta| {
                    if meta.path.is_ident("skip_debug") {
                        options.skip_debug = true;
                        Ok(())
                    } else if meta.path.is_ident("rename_all") {
                        let rule: LitStr = meta.value()?.parse()?;
                        let parsed = RenameRule::from_str(&rule.value()).ok_or_else(|| {
                            syn::Error::new(
                                rule.span(),
                                format!(
                                    "unknown rename rule `{}`; expected one of `lowercase`, \
                                     `PascalCase`, `camelCase`, `snake_case`, \
                                     `SCREAMING_SNAKE_CASE`, `kebab-case`",
                                    rule.value()
                                ),
                            )
                        })?;
                        options.rename_all = Some(parsed);
                        Ok(())
                    } else {
                        Err(meta.error(format!(
                            "unknown container option `{}`; expected `skip_debug` or `rename_all`",
                            meta.path
                                .get_ident()
                                .map_or_else(|| "?".to_string(), ToString::to_string)
                        )))
                    }
                })?;
            }
            Meta::NameValue(nv) => {
                return Err(syn::Error::new_spanned(
                    nv,
                    "name-value syntax is not supported for container-level #[config]",
                ));
            }
        }
    }

    Ok(options)
}
