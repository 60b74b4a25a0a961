use crate::validation::ValidationResult;
use keel_store::StoreError;
use std::borrow::Cow;

/// A specialized [`ModelError`] enum of this crate.
#[keel_derive::keel_error]
pub enum ModelError {
    /// One or more validators rejected a value. Nothing was written.
    #[error("Validation failed{}: {result}", format_context(.context))]
    Validation { result: ValidationResult, context: Option<Cow<'static, str>> },

    /// No identity filter can be built for a persisted instance: the identity field is
    /// unknown, dependency-opaque, not selected, or its properties are missing.
    #[error("Cannot resolve identity field '{field}'{}", format_context(.context))]
    UnresolvableIdentity { field: String, context: Option<Cow<'static, str>> },

    /// A selected field has no translate handler.
    #[error("Cannot translate entries{}: {message}", format_context(.context))]
    Untranslatable { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Store failure{}: {source}", format_context(.context))]
    Store { source: StoreError, context: Option<Cow<'static, str>> },

    #[error("Internal model error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl ModelError {
    /// The validation result carried by a [`ModelError::Validation`].
    #[must_use]
    pub const fn validation(&self) -> Option<&ValidationResult> {
        match self {
            Self::Validation { result, .. } => Some(result),
            _ => None,
        }
    }
}
