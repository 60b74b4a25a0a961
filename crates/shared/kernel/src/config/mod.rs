use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

const DEFAULT_CONFIG_FILE: &str = "keel";
const ENV_PREFIX: &str = "KEEL";

/// Error type for config loading.
#[keel_derive::keel_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads a configuration structure from a file layered with environment overrides.
///
/// 1. **Base File**: settings from `path` (any format the `config` crate detects by
///    extension, e.g. `keel.toml`). Defaults to `keel` in the working directory.
/// 2. **Environment Overrides**: variables prefixed with `KEEL__`. Nested keys use
///    double underscores, so `KEEL__STORE__ID_LENGTH` maps to `store.id_length`.
///
/// # Errors
/// Returns [`ConfigError::Config`] if the file cannot be found, an environment value
/// cannot be parsed, or the merged result does not deserialize into `T`.
///
/// # Example
/// ```rust
/// use keel_kernel::config::load_config;
/// use keel_kernel::domain::config::KeelConfig;
///
/// let cfg: KeelConfig = load_config(Some("config/local")).unwrap_or_default();
/// assert_eq!(cfg.model.identity_field, "id");
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path =
        path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

    info!(path = %effective_path.display(), "Loading config");

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
