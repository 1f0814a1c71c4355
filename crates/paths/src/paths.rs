//! Path context for runtime environment detection and desk-aware paths.

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Identifies the runtime environment where the application is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnvironment {
    /// Running via `cargo run` or in development mode
    Development,
    /// Running as an installed binary in production
    Production,
}

/// Context for managing application paths based on studio/project/app structure.
///
/// Layout below the project root:
/// ```text
/// <base>/<studio>/<project>/
///   config/            <app>.json5 | <app>.toml
///   data/fixtures/     JSON fixtures served to list pages
///   data/exports/      rows exported from list pages
///   logs/              <app>.<timestamp>.log
/// ```
#[derive(Debug, Clone)]
pub struct PathContext {
    environment: RuntimeEnvironment,
    base_path: Arc<Path>,
    studio: String,
    project_id: String,
    app_id: &'static str,
    config_override: Option<PathBuf>,
    data_override: Option<PathBuf>,
}

impl PathContext {
    /// Creates a new PathContext with automatic environment detection.
    pub fn new(
        studio: impl Into<String>,
        project_id: impl Into<String>,
        app_id: &'static str,
    ) -> Self {
        let environment = Self::detect_environment();
        let base_path = Self::determine_base_path(environment);
        Self::build(environment, base_path, studio, project_id, app_id)
    }

    /// Creates a PathContext with an explicit base path (useful for testing).
    pub fn with_base_path(
        base_path: PathBuf,
        studio: impl Into<String>,
        project_id: impl Into<String>,
        app_id: &'static str,
    ) -> Self {
        Self::build(
            Self::detect_environment(),
            base_path,
            studio,
            project_id,
            app_id,
        )
    }

    fn build(
        environment: RuntimeEnvironment,
        base_path: PathBuf,
        studio: impl Into<String>,
        project_id: impl Into<String>,
        app_id: &'static str,
    ) -> Self {
        Self {
            environment,
            base_path: base_path.into(),
            studio: studio.into(),
            project_id: project_id.into(),
            app_id,
            config_override: None,
            data_override: None,
        }
    }

    /// Redirect the config directory (e.g. from a `<APP>_CONFIG` env variable).
    pub fn config_override(mut self, dir: Option<PathBuf>) -> Self {
        self.config_override = dir;
        self
    }

    /// Redirect the data directory (e.g. from a `<APP>_DATA` env variable).
    pub fn data_override(mut self, dir: Option<PathBuf>) -> Self {
        self.data_override = dir;
        self
    }

    /// Detects the runtime environment based on executable location.
    fn detect_environment() -> RuntimeEnvironment {
        if let Ok(exe_path) = std::env::current_exe() {
            // target/debug or target/release means a cargo build
            if exe_path.components().any(|c| c.as_os_str() == "target") {
                return RuntimeEnvironment::Development;
            }
        }

        if std::env::var("CARGO").is_ok() || std::env::var("CARGO_MANIFEST_DIR").is_ok() {
            return RuntimeEnvironment::Development;
        }

        RuntimeEnvironment::Production
    }

    /// Determines the base path based on the runtime environment.
    fn determine_base_path(environment: RuntimeEnvironment) -> PathBuf {
        match environment {
            RuntimeEnvironment::Development => std::env::var("CARGO_MANIFEST_DIR")
                .map(PathBuf::from)
                .or_else(|_| std::env::current_dir())
                .unwrap_or_else(|_| PathBuf::from(".")),
            RuntimeEnvironment::Production => dirs::data_local_dir()
                .map(|dir| dir.join("Freight_Desk"))
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    pub fn environment(&self) -> RuntimeEnvironment {
        self.environment
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn studio(&self) -> &str {
        &self.studio
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn app_id(&self) -> &str {
        self.app_id
    }

    /// Returns the project root path: `<base>/<studio>/<project_id>`
    pub fn project_root(&self) -> PathBuf {
        self.base_path.join(&self.studio).join(&self.project_id)
    }

    /// Returns the config directory: `<project_root>/config/` unless overridden.
    pub fn config_dir(&self) -> PathBuf {
        self.config_override
            .clone()
            .unwrap_or_else(|| self.project_root().join("config"))
    }

    /// Returns a config file for this app with the given extension: `config/<app_id>.<ext>`
    pub fn config_file(&self, extension: &str) -> PathBuf {
        self.config_dir()
            .join(format!("{}.{}", self.app_id, extension))
    }

    /// Returns the data directory path: `<project_root>/data/` unless overridden.
    pub fn data_dir(&self) -> PathBuf {
        self.data_override
            .clone()
            .unwrap_or_else(|| self.project_root().join("data"))
    }

    /// Returns the directory holding JSON fixtures: `data/fixtures/`
    pub fn fixtures_dir(&self) -> PathBuf {
        self.data_dir().join("fixtures")
    }

    /// Returns the directory list pages export rows into: `data/exports/`
    pub fn exports_dir(&self) -> PathBuf {
        self.data_dir().join("exports")
    }

    /// Returns the logs directory path: `<project_root>/logs/`
    pub fn logs_dir(&self) -> PathBuf {
        self.project_root().join("logs")
    }

    /// Returns a log file path with timestamp: `logs/<app_id>.<timestamp>.log`
    pub fn log_file(&self, timestamp: &str) -> PathBuf {
        self.logs_dir()
            .join(format!("{}.{}.log", self.app_id, timestamp))
    }

    /// Returns a log file path with current timestamp.
    pub fn log_file_now(&self) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
        self.log_file(&timestamp)
    }

    /// Ensures all necessary directories exist.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        let dirs = [
            self.config_dir(),
            self.data_dir(),
            self.exports_dir(),
            self.logs_dir(),
        ];

        for dir in dirs {
            if !dir.exists() {
                std::fs::create_dir_all(&dir)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_context_structure() {
        let ctx = PathContext::with_base_path(
            PathBuf::from("/test/base"),
            "my_studio",
            "freight",
            "desk",
        );

        assert_eq!(ctx.studio(), "my_studio");
        assert_eq!(ctx.project_id(), "freight");
        assert_eq!(ctx.app_id(), "desk");
        assert_eq!(
            ctx.project_root(),
            PathBuf::from("/test/base/my_studio/freight")
        );
    }

    #[test]
    fn test_config_and_data_paths() {
        let ctx = PathContext::with_base_path(PathBuf::from("/base"), "studio", "project", "app");

        assert_eq!(
            ctx.config_file("json5"),
            PathBuf::from("/base/studio/project/config/app.json5")
        );
        assert_eq!(
            ctx.fixtures_dir(),
            PathBuf::from("/base/studio/project/data/fixtures")
        );
        assert_eq!(
            ctx.exports_dir(),
            PathBuf::from("/base/studio/project/data/exports")
        );
    }

    #[test]
    fn test_overrides_replace_roots() {
        let ctx = PathContext::with_base_path(PathBuf::from("/base"), "studio", "project", "app")
            .config_override(Some(PathBuf::from("/etc/desk")))
            .data_override(Some(PathBuf::from("/srv/desk")));

        assert_eq!(ctx.config_file("toml"), PathBuf::from("/etc/desk/app.toml"));
        assert_eq!(ctx.fixtures_dir(), PathBuf::from("/srv/desk/fixtures"));
        // logs stay below the project root
        assert_eq!(ctx.logs_dir(), PathBuf::from("/base/studio/project/logs"));
    }

    #[test]
    fn test_log_file_path() {
        let ctx = PathContext::with_base_path(PathBuf::from("/base"), "studio", "project", "app");

        let log_path = ctx.log_file("20240315-120000");
        assert_eq!(
            log_path,
            PathBuf::from("/base/studio/project/logs/app.20240315-120000.log")
        );
    }
}
