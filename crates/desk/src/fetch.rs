//! Fixture loading.
//!
//! Pages read their data from JSON fixtures shaped `{headers, rows}` (or
//! `{tabs: {key: {headers, rows}}}` for tabbed lists). A [`FixtureSource`]
//! yields raw bytes; [`parse_dataset`] turns them into [`Dataset`]s with row
//! ids assigned. The [`Loader`] runs one fetch per page activation and can be
//! cancelled when the page is left.
use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use futures::future::BoxFuture;
use grid::{ColumnSpec, Fields, TableData, with_ids};
use indexmap::IndexMap;
use rust_embed::RustEmbed;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::action::Action;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("fixture not found: {0}")]
    NotFound(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed fixture {path}: {message}")]
    Malformed { path: String, message: String },

    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),
}

/// Data delivered to a list page.
#[derive(Debug, Clone, PartialEq)]
pub enum Dataset {
    Table(TableData),
    Tabs(IndexMap<String, TableData>),
}

impl Dataset {
    pub fn row_count(&self) -> usize {
        match self {
            Dataset::Table(t) => t.rows.len(),
            Dataset::Tabs(tabs) => tabs.values().map(|t| t.rows.len()).sum(),
        }
    }
}

/// Result of one fetch, tagged with the page activation that asked for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub page: String,
    pub generation: u64,
    pub result: Result<Dataset, String>,
}

pub trait FixtureSource: Send + Sync {
    fn describe(&self) -> String;

    /// Raw bytes of the fixture at `path` (no extension).
    fn read<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<Vec<u8>, FetchError>>;
}

/// Fixtures in a directory: `<dir>/<path>.json`, or `.json5` when present.
#[derive(Debug, Clone)]
pub struct FsFixtures {
    dir: PathBuf,
}

impl FsFixtures {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FixtureSource for FsFixtures {
    fn describe(&self) -> String {
        self.dir.display().to_string()
    }

    fn read<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<Vec<u8>, FetchError>> {
        Box::pin(async move {
            for ext in ["json", "json5"] {
                let file = self.dir.join(format!("{path}.{ext}"));
                match tokio::fs::read(&file).await {
                    Ok(bytes) => return Ok(bytes),
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                    Err(source) => return Err(FetchError::Io { path: file, source }),
                }
            }
            Err(FetchError::NotFound(path.to_string()))
        })
    }
}

#[derive(RustEmbed)]
#[folder = "assets/fixtures/"]
struct Assets;

/// Fixtures compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedFixtures;

impl EmbeddedFixtures {
    pub fn names() -> Vec<String> {
        Assets::iter()
            .filter_map(|f| f.strip_suffix(".json").map(str::to_string))
            .collect()
    }
}

impl FixtureSource for EmbeddedFixtures {
    fn describe(&self) -> String {
        "built-in fixtures".into()
    }

    fn read<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<Vec<u8>, FetchError>> {
        Box::pin(async move {
            Assets::get(&format!("{path}.json"))
                .map(|file| file.data.into_owned())
                .ok_or_else(|| FetchError::NotFound(path.to_string()))
        })
    }
}

#[derive(Deserialize)]
struct RawTable {
    #[serde(default)]
    headers: Vec<ColumnSpec>,
    #[serde(default)]
    rows: Vec<Fields>,
}

impl RawTable {
    fn into_table(self) -> TableData {
        TableData::new(self.headers, with_ids(self.rows))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPayload {
    Tabs { tabs: IndexMap<String, RawTable> },
    Table(RawTable),
}

/// Parse fixture bytes. `.json5` syntax is accepted as well.
pub fn parse_dataset(path: &str, bytes: &[u8]) -> Result<Dataset, FetchError> {
    let malformed = |message: String| FetchError::Malformed {
        path: path.to_string(),
        message,
    };
    let text = std::str::from_utf8(bytes).map_err(|e| malformed(e.to_string()))?;
    let payload: RawPayload = match serde_json::from_str(text) {
        Ok(p) => p,
        Err(json_err) => json5::from_str(text).map_err(|_| malformed(json_err.to_string()))?,
    };
    Ok(match payload {
        RawPayload::Table(raw) => Dataset::Table(raw.into_table()),
        RawPayload::Tabs { tabs } => Dataset::Tabs(
            tabs.into_iter()
                .map(|(key, raw)| (key, raw.into_table()))
                .collect(),
        ),
    })
}

/// Read and parse one fixture, bounded by `timeout`.
pub async fn fetch_dataset(
    source: &dyn FixtureSource,
    path: &str,
    timeout: Duration,
) -> Result<Dataset, FetchError> {
    let bytes = tokio::time::timeout(timeout, source.read(path))
        .await
        .map_err(|_| FetchError::Timeout(timeout))??;
    parse_dataset(path, &bytes)
}

/// Runs at most one live fetch. Starting a new one or calling
/// [`Loader::cancel`] drops whatever the previous fetch would have sent.
pub struct Loader {
    source: Arc<dyn FixtureSource>,
    timeout: Duration,
    token: CancellationToken,
    generation: u64,
}

impl Loader {
    pub fn new(source: Arc<dyn FixtureSource>, timeout: Duration) -> Self {
        Self {
            source,
            timeout,
            token: CancellationToken::new(),
            generation: 0,
        }
    }

    pub fn source(&self) -> &dyn FixtureSource {
        self.source.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether `loaded` belongs to the latest activation.
    pub fn is_current(&self, loaded: &Loaded) -> bool {
        loaded.generation == self.generation && !self.token.is_cancelled()
    }

    /// Spawn a fetch for `page`. The result arrives as [`Action::DataLoaded`]
    /// unless the fetch is cancelled first.
    pub fn start(&mut self, page: &str, path: &str, tx: UnboundedSender<Action>) -> u64 {
        self.token.cancel();
        self.token = CancellationToken::new();
        self.generation += 1;

        let token = self.token.clone();
        let source = self.source.clone();
        let timeout = self.timeout;
        let generation = self.generation;
        let page = page.to_string();
        let path = path.to_string();
        debug!(page = %page, path = %path, generation, "fetch started");

        tokio::spawn(async move {
            let result = tokio::select! {
                _ = token.cancelled() => None,
                r = fetch_dataset(source.as_ref(), &path, timeout) => Some(r),
            };
            let Some(result) = result else {
                debug!(page = %page, generation, "fetch cancelled");
                return;
            };
            if token.is_cancelled() {
                return;
            }
            if let Err(err) = &result {
                warn!(page = %page, path = %path, error = %err, "fetch failed");
            }
            let loaded = Loaded {
                page,
                generation,
                result: result.map_err(|e| e.to_string()),
            };
            if tx.send(Action::DataLoaded(loaded)).is_err() {
                debug!(generation, "fetch result dropped, app closed");
            }
        });
        generation
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }
}
