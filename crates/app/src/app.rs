use paths::PathContext;
use std::marker::PhantomData;
use std::path::PathBuf;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Application infrastructure context.
///
/// Contains path management, version info, and logging infrastructure.
pub struct AppContext {
    pub path_context: PathContext,
    pub version: &'static str,
    /// The log guard must be kept alive for the duration of the application
    /// to ensure log messages are properly flushed.
    _log_guard: tracing_appender::non_blocking::WorkerGuard,
}

impl AppContext {
    pub fn app_id(&self) -> &str {
        self.path_context.app_id()
    }

    pub fn version(&self) -> &'static str {
        self.version
    }

    pub fn path_context(&self) -> &PathContext {
        &self.path_context
    }
}

/// Application metadata trait.
///
/// Define your application's identity by implementing this trait.
pub trait Application: Sized + 'static {
    const APP_ID: &'static str;
    const STUDIO: &'static str = "freight_works";
    const PROJECT_ID: &'static str = "backoffice";
}

/// Builder for creating applications with proper initialization.
///
/// Paths are resolved in [`AppBuilder::new`] so callers can read configuration
/// from [`AppBuilder::path_context`] before logging is installed by
/// [`AppBuilder::build`].
pub struct AppBuilder<A: Application> {
    path_context: PathContext,
    version: &'static str,
    log_filter: String,
    console: bool,
    _marker: PhantomData<A>,
}

impl<A: Application> AppBuilder<A> {
    /// Create a new application builder with platform paths for `A`.
    pub fn new(version: &'static str) -> Self {
        #[cfg(debug_assertions)]
        let path_context = PathContext::with_base_path(
            PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("..")
                .join("..")
                .join(".out"),
            A::STUDIO,
            A::PROJECT_ID,
            A::APP_ID,
        );
        #[cfg(not(debug_assertions))]
        let path_context = PathContext::new(A::STUDIO, A::PROJECT_ID, A::APP_ID);

        #[cfg(debug_assertions)]
        let log_filter = "info".to_string();

        #[cfg(not(debug_assertions))]
        let log_filter = "warn".to_string();

        Self {
            path_context,
            version,
            log_filter,
            console: false,
            _marker: PhantomData,
        }
    }

    /// Replace the base path (tests, portable installs).
    pub fn base_path(mut self, base: PathBuf) -> Self {
        self.path_context = PathContext::with_base_path(base, A::STUDIO, A::PROJECT_ID, A::APP_ID);
        self
    }

    /// Redirect config and/or data directories.
    pub fn dir_overrides(mut self, config: Option<PathBuf>, data: Option<PathBuf>) -> Self {
        self.path_context = self
            .path_context
            .config_override(config)
            .data_override(data);
        self
    }

    /// Filter directive used when `RUST_LOG` is not set, e.g. `"info,grid=debug"`.
    pub fn log_filter(mut self, directive: impl Into<String>) -> Self {
        self.log_filter = directive.into();
        self
    }

    /// Also log to stderr. Keep disabled while a TUI owns the terminal.
    pub fn console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    pub fn path_context(&self) -> &PathContext {
        &self.path_context
    }

    fn env_filter(&self) -> Result<EnvFilter, BoxError> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => Ok(EnvFilter::try_new(&self.log_filter)?),
        }
    }

    /// Create directories and install the tracing subscriber (file + optional console).
    pub fn build(self) -> Result<AppContext, BoxError> {
        self.path_context.ensure_directories()?;

        let log_file_path = self.path_context.log_file_now();
        let log_dir = self.path_context.logs_dir();
        let log_filename = log_file_path
            .file_name()
            .ok_or("log file path has no file name")?;

        let file_appender = tracing_appender::rolling::never(&log_dir, log_filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = fmt::layer()
            .with_target(true)
            .with_ansi(false)
            .with_writer(non_blocking)
            .with_filter(self.env_filter()?);

        let console_layer = if self.console {
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_filter(self.env_filter()?),
            )
        } else {
            None
        };

        tracing_subscriber::registry()
            .with(file_layer)
            .with(console_layer)
            .with(ErrorLayer::default())
            .try_init()?;

        tracing::info!(
            app = A::APP_ID,
            version = self.version,
            log = %log_file_path.display(),
            "application initialised"
        );

        Ok(AppContext {
            path_context: self.path_context,
            version: self.version,
            _log_guard: guard,
        })
    }
}
