//! # Logger
//!
//! Installs the global `tracing` subscriber for applications built on keel, from the
//! `logging` section of [`KeelConfig`](keel_domain::config::KeelConfig).
//!
//! Settings are first resolved into a [`LogPlan`]: level names, filter directives
//! and file options are checked there, before anything global is touched. Installing
//! the plan adds a compact console layer and/or a rolling, non-blocking file layer
//! (plain text or JSON lines). `RUST_LOG` is honoured unless `env_filter` is set.
//!
//! ## Example
//!
//! ```rust
//! use keel_domain::config::LoggingSettings;
//! use keel_logger::Logger;
//!
//! let settings = LoggingSettings { level: "debug".to_owned(), ..LoggingSettings::default() };
//! let _logger = Logger::from_settings(&settings).unwrap();
//! tracing::debug!("keel logging is up");
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use keel_domain::config::{LogRotation, LoggingSettings};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const LOG_FILE_SUFFIX: &str = "log";

/// Rolling file output of a [`LogPlan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutput {
    /// Directory receiving `<name>.<date>.log` files; created on install.
    pub directory: PathBuf,
    pub rotation: Rotation,
    pub max_files: usize,
    /// JSON lines instead of plain text.
    pub json: bool,
}

/// Checked logging settings, ready to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPlan {
    pub name: String,
    pub level: LevelFilter,
    /// Explicit directives; `None` defers to `RUST_LOG`.
    pub directives: Option<String>,
    pub console: bool,
    pub file: Option<FileOutput>,
}

impl LogPlan {
    /// Resolves the `logging` config section.
    ///
    /// # Errors
    /// [`LoggerError::InvalidConfiguration`] for a blank name, an unknown level, a
    /// malformed filter, zero `max_files` with file output, or when neither console
    /// nor file output is enabled.
    pub fn from_settings(settings: &LoggingSettings) -> Result<Self, LoggerError> {
        let name = settings.name.trim();
        if name.is_empty() {
            return Err(invalid("Logger name cannot be empty"));
        }

        let level = settings
            .level
            .trim()
            .parse::<LevelFilter>()
            .map_err(|e| invalid(format!("Invalid level '{}': {e}", settings.level)))
            .context("level")?;

        let file = match &settings.path {
            None => None,
            Some(_) if settings.max_files == 0 => {
                return Err(invalid("max_files must be greater than zero"));
            },
            Some(directory) => Some(FileOutput {
                directory: directory.clone(),
                rotation: rotation(settings.rotation),
                max_files: settings.max_files,
                json: settings.json,
            }),
        };
        if !settings.console && file.is_none() {
            return Err(invalid("Enable console output or set a log path"));
        }

        let plan = Self {
            name: name.to_owned(),
            level,
            directives: settings.env_filter.clone(),
            console: settings.console,
            file,
        };
        plan.env_filter()?;
        Ok(plan)
    }

    fn env_filter(&self) -> Result<EnvFilter, LoggerError> {
        let builder = EnvFilter::builder().with_default_directive(self.level.into());
        match &self.directives {
            None => Ok(builder.from_env_lossy()),
            Some(directives) => builder
                .parse(directives)
                .map_err(|e| invalid(format!("Invalid env filter '{directives}': {e}")))
                .context("env_filter"),
        }
    }

    /// Installs the global subscriber.
    ///
    /// # Errors
    /// [`LoggerError::Subscriber`] when a subscriber is already installed,
    /// [`LoggerError::Appender`] or [`LoggerError::Internal`] when the log directory
    /// cannot be used.
    pub fn install(self) -> Result<Logger, LoggerError> {
        let env_filter = self.env_filter()?;
        let mut layers = Vec::new();

        if self.console {
            layers.push(layer().compact().with_ansi(true).boxed());
        }

        let guard = match &self.file {
            None => None,
            Some(file) => {
                fs::create_dir_all(&file.directory).map_err(|e| LoggerError::Internal {
                    message: e.to_string().into(),
                    context: Some(format!("log directory {}", file.directory.display()).into()),
                })?;
                let appender = RollingFileAppender::builder()
                    .rotation(file.rotation.clone())
                    .filename_prefix(&self.name)
                    .filename_suffix(LOG_FILE_SUFFIX)
                    .max_log_files(file.max_files)
                    .build(&file.directory)?;

                let (writer, guard) = tracing_appender::non_blocking(appender);
                let file_layer = layer().with_writer(writer).with_ansi(false);
                layers.push(if file.json { file_layer.json().boxed() } else { file_layer.boxed() });
                Some(guard)
            },
        };

        tracing_subscriber::registry().with(env_filter).with(layers).try_init()?;
        info!(
            name = %self.name,
            level = %self.level,
            file = ?self.file.as_ref().map(|f| &f.directory),
            "Logging initialized"
        );

        Ok(Logger { name: self.name, guard })
    }
}

/// Handle to the installed subscriber.
///
/// With file output it owns the writer's worker guard: buffered lines are written
/// out when the handle is dropped, so keep it for the lifetime of the application.
#[must_use = "Dropping this handle stops the background log writer."]
#[derive(Debug)]
pub struct Logger {
    name: String,
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Resolves `settings` into a [`LogPlan`] and installs it.
    ///
    /// # Errors
    /// Every error of [`LogPlan::from_settings`] and [`LogPlan::install`].
    pub fn from_settings(settings: &LoggingSettings) -> Result<Self, LoggerError> {
        LogPlan::from_settings(settings)?.install()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a rolling file writer is attached.
    #[must_use]
    pub const fn writes_files(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            debug!(name = %self.name, "Flushing file logs");
        }
    }
}

fn invalid(message: impl Into<std::borrow::Cow<'static, str>>) -> LoggerError {
    LoggerError::InvalidConfiguration { message: message.into(), context: None }
}

const fn rotation(rotation: LogRotation) -> Rotation {
    match rotation {
        LogRotation::Minutely => Rotation::MINUTELY,
        LogRotation::Hourly => Rotation::HOURLY,
        LogRotation::Daily => Rotation::DAILY,
        LogRotation::Never => Rotation::NEVER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> LoggingSettings {
        LoggingSettings { name: "keel-test".to_owned(), ..LoggingSettings::default() }
    }

    #[test]
    fn defaults_resolve_to_console_at_info() -> Result<(), LoggerError> {
        let plan = LogPlan::from_settings(&LoggingSettings::default())?;
        assert_eq!(plan.name, "keel");
        assert_eq!(plan.level, LevelFilter::INFO);
        assert!(plan.console);
        assert!(plan.file.is_none());
        Ok(())
    }

    #[test]
    fn path_enables_json_file_output() -> Result<(), LoggerError> {
        let plan = LogPlan::from_settings(&LoggingSettings {
            console: false,
            path: Some("logs".into()),
            json: true,
            rotation: LogRotation::Hourly,
            max_files: 3,
            ..settings()
        })?;
        assert_eq!(
            plan.file,
            Some(FileOutput {
                directory: "logs".into(),
                rotation: Rotation::HOURLY,
                max_files: 3,
                json: true,
            })
        );
        Ok(())
    }

    #[test]
    fn json_without_path_has_no_file_output() -> Result<(), LoggerError> {
        let plan = LogPlan::from_settings(&LoggingSettings { json: true, ..settings() })?;
        assert!(plan.file.is_none());
        Ok(())
    }

    #[test]
    fn rotation_maps_every_policy() {
        assert_eq!(rotation(LogRotation::Minutely), Rotation::MINUTELY);
        assert_eq!(rotation(LogRotation::Hourly), Rotation::HOURLY);
        assert_eq!(rotation(LogRotation::Daily), Rotation::DAILY);
        assert_eq!(rotation(LogRotation::Never), Rotation::NEVER);
    }

    #[test]
    fn level_names_parse_case_insensitively() -> Result<(), LoggerError> {
        let plan = LogPlan::from_settings(&LoggingSettings { level: " WARN ".to_owned(), ..settings() })?;
        assert_eq!(plan.level, LevelFilter::WARN);
        Ok(())
    }

    #[test]
    fn unknown_level_is_rejected() {
        let err = LogPlan::from_settings(&LoggingSettings { level: "loud".to_owned(), ..settings() })
            .unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { context: Some(ref c), .. } if c == "level"));
    }

    #[test]
    fn malformed_filter_is_rejected() {
        let err = LogPlan::from_settings(&LoggingSettings {
            env_filter: Some("keel_model=[".to_owned()),
            ..settings()
        })
        .unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { context: Some(ref c), .. } if c == "env_filter"));
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = LogPlan::from_settings(&LoggingSettings { name: "  ".to_owned(), ..settings() }).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn file_output_needs_retained_files() {
        let err = LogPlan::from_settings(&LoggingSettings {
            path: Some("logs".into()),
            max_files: 0,
            ..settings()
        })
        .unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn some_output_is_required() {
        let err = LogPlan::from_settings(&LoggingSettings { console: false, ..settings() }).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }
}
