#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the keel crates.
//!
//! ## Usage
//! Every crate that declares an error enum depends on this crate and on `thiserror`:
//! ```toml
//! [dependencies]
//! keel-derive = { path = "../../infra/derive" }
//! thiserror = "2"
//! ```

mod error;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Turns a plain enum into the error type of a keel crate.
///
/// # Injected Behaviors
///
/// * **Derives**: `Debug` and `thiserror::Error` are added unless already derived.
/// * **Context**: a companion `<ErrorName>Ext` trait adds `.context(...)` to
///   `Result<T, ErrorName>` and to `Result<T, Source>` for every wrapped source type.
/// * **Conversions**: `From<Source>` for each variant holding a `source` field
///   (or a field marked `#[source]`/`#[from]`), so `?` lifts upstream errors.
/// * **Internal Fallback**: `From<&'static str>` and `From<String>` when an
///   `Internal` variant is present.
/// * **Formatting**: a module-local `format_context` helper for `#[error(...)]` strings.
///
/// # Requirements
///
/// 1. Only enums are accepted.
/// 2. Variants must use named fields; tuple and unit variants are rejected.
/// 3. A `context` field, when present, must be `Option<Cow<'static, str>>`.
/// 4. Variants wrapping a source must also carry a `context` field.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[keel_derive::keel_error]
/// pub enum StoreError {
///     #[error("Invalid filter{}: {message}", format_context(.context))]
///     InvalidFilter { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
///
///     #[error("Internal store error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn check() -> Result<(), StoreError> {
///     Err("unexpected state".into())
/// }
///
/// let err = check().context("Checking store").unwrap_err();
/// ```
#[proc_macro_attribute]
pub fn keel_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    error::expand(input).into()
}
