#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the workspace.
//!
//! * [`razed_error`] turns a plain enum into a `thiserror` error with a context extension trait.
//! * [`main`] boots an `async fn main` on one of the `razed-runtime` profiles.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, parse_macro_input};

/// Attribute macro to bootstrap the Tokio runtime from `razed-runtime`.
///
/// The annotated `async fn` must return a `Result`. The optional argument picks
/// the runtime profile: `service` (default) or `compact`.
///
/// ```rust,ignore
/// #[razed_runtime::main(compact)]
/// async fn main() -> anyhow::Result<()> {
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::runtime::expand_main(args.into(), input).into()
}

/// Attribute macro for crate-level error enums.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already derived.
/// * `<ErrorName>Ext` trait with `.context(...)` for `Result<T, ErrorName>` and, for every
///   variant carrying a `source` field, for `Result<T, SourceError>` as well.
/// * `From<SourceError>` for every variant carrying a `source` field.
/// * `From<&'static str>` and `From<String>` when an `Internal { message, context }` variant
///   exists.
/// * A private `format_context` helper used inside `#[error(...)]` strings.
///
/// # Requirements
///
/// Only enums with named-field variants are accepted. A variant with a `source` field must
/// also carry `context: Option<Cow<'static, str>>`.
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[razed_derive::razed_error]
/// pub enum CatalogError {
///     #[error("Catalog I/O error{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal catalog error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read(path: &str) -> Result<String, CatalogError> {
///     std::fs::read_to_string(path).context("Reading tome catalog")
/// }
/// ```
#[proc_macro_attribute]
pub fn razed_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}
