use std::borrow::Cow;

/// A specialized [`StoreError`] enum of this crate.
#[keel_derive::keel_error]
pub enum StoreError {
    #[error("Invalid filter{}: {message}", format_context(.context))]
    InvalidFilter { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid update{}: {message}", format_context(.context))]
    InvalidUpdate { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Unsupported operator{}: {operator}", format_context(.context))]
    UnsupportedOperator { operator: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid store configuration{}: {message}", format_context(.context))]
    InvalidConfiguration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal store error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl StoreError {
    pub(crate) fn invalid_filter(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidFilter { message: message.into(), context: None }
    }

    pub(crate) fn invalid_update(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidUpdate { message: message.into(), context: None }
    }

    pub(crate) fn unsupported(operator: &str) -> Self {
        Self::UnsupportedOperator { operator: Cow::Owned(operator.to_owned()), context: None }
    }
}
