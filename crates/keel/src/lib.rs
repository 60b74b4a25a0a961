//! Facade crate for keel.
//! Re-exports the model layer, stores, masks and configuration, and builds them from
//! [`KeelConfig`](domain::config::KeelConfig) sections.
//! Keep this crate thin: it composes the other crates, it does not implement behavior.
//!
//! ## Usage
//! - Load settings with [`load_config`] (file plus `KEEL__SECTION__KEY` overrides).
//! - Call [`init_logger`] once (feature `logger`, on by default) and hold the guard.
//! - Open a store with [`open_store`] and declare models with [`model`].

use std::sync::Arc;
use tracing::info;

pub use keel_domain as domain;
pub use keel_kernel as kernel;
pub use keel_kernel::config::{ConfigError, load_config};
#[cfg(feature = "logger")]
pub use keel_logger as logger;
pub use keel_mask as mask;
pub use keel_model::*;
pub use keel_store as store;

use keel_domain::config::{ModelSettings, StoreBackend, StoreSettings};
use keel_store::{MemoryStore, NullStore, Store, StoreError};

/// Opens the configured record store.
///
/// # Errors
/// Returns [`StoreError::InvalidConfiguration`] when the memory store settings are
/// invalid.
pub fn open_store(settings: &StoreSettings) -> Result<Arc<dyn Store>, StoreError> {
    let store: Arc<dyn Store> = match settings.backend {
        StoreBackend::Memory => Arc::new(
            MemoryStore::builder()
                .identity_property(settings.identity_property.as_str())
                .id_length(settings.id_length)
                .build()?,
        ),
        StoreBackend::Null => Arc::new(NullStore),
    };
    info!(backend = ?settings.backend, "Store opened");
    Ok(store)
}

/// An empty model over `store` with the configured identity and type fields.
#[must_use]
pub fn model(settings: &ModelSettings, store: Arc<dyn Store>) -> Model {
    Model::new(store)
        .with_identity_field(settings.identity_field.as_str())
        .with_type_field(settings.type_field.as_str())
}

/// Installs the global tracing subscriber described by `settings`.
///
/// # Errors
/// Returns [`logger::LoggerError`] for invalid settings or when a subscriber is
/// already installed.
#[cfg(feature = "logger")]
pub fn init_logger(
    settings: &domain::config::LoggingSettings,
) -> Result<logger::Logger, logger::LoggerError> {
    logger::Logger::from_settings(settings)
}
