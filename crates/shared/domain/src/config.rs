use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level configuration shared by the model layer, the store and logging.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeelConfigInner {
    pub model: ModelSettings,
    pub store: StoreSettings,
    pub logging: LoggingSettings,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct KeelConfig {
    #[serde(flatten, default)]
    inner: Arc<KeelConfigInner>,
}

impl Deref for KeelConfig {
    type Target = KeelConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for KeelConfig {
    fn deref_mut(&mut self) -> &mut KeelConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Defaults applied to every model built from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub identity_field: String,
    pub type_field: String,
}

/// Which record store backs the models.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Null,
}

/// Record store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    /// Property the in-memory store uses as the record key.
    pub identity_property: String,
    /// Length of generated record keys.
    pub id_length: usize,
}

/// Rolling policy for file logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Minutely,
    Hourly,
    #[default]
    Daily,
    Never,
}

/// Logging configuration consumed by the logger builder.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub name: String,
    pub level: String,
    pub console: bool,
    pub path: Option<PathBuf>,
    pub json: bool,
    pub env_filter: Option<String>,
    pub rotation: LogRotation,
    pub max_files: usize,
}

// --- Default ---

impl Default for ModelSettings {
    fn default() -> Self {
        Self { identity_field: "id".to_owned(), type_field: "type".to_owned() }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self { backend: StoreBackend::Memory, identity_property: "_id".to_owned(), id_length: 12 }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            name: "keel".to_owned(),
            level: "info".to_owned(),
            console: true,
            path: None,
            json: false,
            env_filter: None,
            rotation: LogRotation::Daily,
            max_files: 10,
        }
    }
}
