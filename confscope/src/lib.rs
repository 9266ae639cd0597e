//! Structural introspection for nested configuration types.
//!
//! This crate walks statically-declared configuration graphs to:
//! - **Diff**: report every terminal field whose value differs between two
//!   snapshots of the same type, by qualified path (`Credentials.Password`).
//! - **Redact**: produce a deep copy with every secret-tagged field replaced
//!   by a placeholder, leaving the original untouched.
//!
//! Types register their shape with `#[derive(Configuration)]`:
//!
//! ```ignore
//! use confscope::{Configuration, Introspect};
//!
//! #[derive(Clone, Configuration)]
//! #[config(rename_all = "PascalCase")]
//! struct Credentials {
//!     #[config(secret)]
//!     password: String,
//! }
//!
//! #[derive(Clone, Configuration)]
//! #[config(rename_all = "PascalCase")]
//! struct Options {
//!     name: String,
//!     port: u16,
//!     credentials: Credentials,
//! }
//!
//! let changes = previous.diff_with(&candidate)?;   // paths like "Port"
//! let safe = current.redacted()?;                   // password is "*****"
//! ```
//!
//! Key rules:
//! - Numbers, `bool`, `char`, strings, addresses and `Option` of those are
//!   leaves, compared by value. `None` equals only `None`.
//! - `Vec`, `VecDeque`, boxed slices, fixed arrays and sets are arrays,
//!   compared by canonical JSON encoding (order-sensitive, deep). `HashSet`
//!   elements are sorted first. `Option` of an array is a nullable array.
//! - Derived configuration types are composites and are expanded, never
//!   reported themselves.
//! - Self-referential type graphs fail with [`Error::CyclicTypeGraph`].
//!
//! What this crate does not do:
//! - load configuration or watch files
//! - decide what a difference means for the running system
//!
//! The derives live in `confscope-derive` and are re-exported here.
//!
//! ## Features
//!
//! - `slog`: derived configurations implement `slog::Value` by logging their
//!   redacted JSON form. The generated impl requires `Self: Serialize`, and
//!   Cargo unifies features across the build graph: once any crate enables
//!   `confscope/slog`, every `#[derive(Configuration)]` type in the build must
//!   also implement `Clone + Serialize`.
//! - `rust_decimal`: `rust_decimal::Decimal` is a leaf, compared by
//!   normalized value.

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
    clippy::cast_possible_wrap,
    clippy::cast_lossless,
    clippy::default_trait_access,
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::result_large_err,
    clippy::option_if_let_else
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

pub use confscope_derive::{Configuration, Leaf};

#[allow(unused_extern_crates)]
extern crate self as confscope;

// Module declarations
mod diff;
mod error;
mod field;
mod introspect;
mod redact;
mod schema;
#[cfg(feature = "slog")]
pub mod slog;
mod traverse;
mod value;

// Re-exports
pub use diff::{diff, diff_dyn, diff_optional, Difference};
pub use error::{Error, Operand, Result};
pub use field::{
    classify, Field, FieldClass, FieldKind, FieldRef, Leaf, Placeholder, ReadResult, SchemaFn,
};
pub use introspect::Introspect;
pub use redact::{redact, redact_optional, DEFAULT_PLACEHOLDER};
pub use schema::{
    colloquial_type_name, Configuration, FieldSchema, TypeSchema, TypeSchemaBuilder,
};
pub use traverse::{enumerate_fields, qualify, terminal_fields, FieldDescriptor};
pub use value::{Sequence, Value};
