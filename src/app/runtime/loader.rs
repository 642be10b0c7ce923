//! Background loader: fetch all three sources, reconcile, and hand one message to the UI loop.

use std::any::Any;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::logic::reconcile;
use crate::sources::{self, ChangelogSource, EngineMapSource, RegistrySource, Source, http_client};
use crate::state::LoadedData;
use crate::theme::Settings;

/// Terminal message from the loader. Exactly one is sent per load.
#[derive(Debug)]
pub enum LoaderMessage {
    /// Rows are ready; per-source failures are listed alongside.
    Loaded(LoadedData),
    /// The load could not produce any data.
    Failed(String),
}

/// Everything the loader needs, owned so the task can outlive the caller's borrows.
#[derive(Clone, Debug)]
pub struct LoaderConfig {
    /// Changelog feed adapter.
    pub changelog: ChangelogSource,
    /// Image registry adapter.
    pub registry: RegistrySource,
    /// Electron to Chromium table adapter.
    pub engines: EngineMapSource,
    /// Snapshot directory.
    pub cache_dir: PathBuf,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Engine version assumed before the first changelog entry that names one.
    pub fallback_engine: String,
    /// Skip snapshots and refetch.
    pub force_refresh: bool,
}

impl LoaderConfig {
    /// What: Build a loader configuration from user settings.
    ///
    /// Inputs:
    /// - `settings`: Source URLs, timeout, and fallback engine version
    /// - `cache_dir`: Snapshot directory
    /// - `force_refresh`: Ignore snapshots for this run
    #[must_use]
    pub fn from_settings(settings: &Settings, cache_dir: PathBuf, force_refresh: bool) -> Self {
        Self {
            changelog: ChangelogSource {
                url: settings.changelog_url.clone(),
            },
            registry: RegistrySource {
                url: settings.registry_url.clone(),
            },
            engines: EngineMapSource {
                url: settings.engine_map_url.clone(),
            },
            cache_dir,
            timeout: Duration::from_secs(settings.request_timeout_secs),
            fallback_engine: settings.fallback_engine_version.clone(),
            force_refresh,
        }
    }
}

/// What: Fetch every source concurrently and reconcile the results.
///
/// Inputs:
/// - `cfg`: Loader configuration
///
/// Output:
/// - `Loaded` with rows and per-source errors, or `Failed` when all three sources came back empty.
///
/// Details:
/// - A failing source degrades to empty data; only a total wipe-out is a failure.
pub async fn load_all(cfg: &LoaderConfig) -> LoaderMessage {
    let client = http_client(cfg.timeout);
    let (changelog, registry, engines) = tokio::join!(
        sources::fetch(&cfg.changelog, &client, &cfg.cache_dir, cfg.force_refresh),
        sources::fetch(&cfg.registry, &client, &cfg.cache_dir, cfg.force_refresh),
        sources::fetch(&cfg.engines, &client, &cfg.cache_dir, cfg.force_refresh),
    );
    info!(
        changelog = changelog.data.len(),
        changelog_cached = changelog.from_cache,
        tags = registry.data.len(),
        tags_cached = registry.from_cache,
        engines = engines.data.len(),
        engines_cached = engines.from_cache,
        "sources loaded"
    );

    let source_errors: Vec<String> = [changelog.error, registry.error, engines.error]
        .into_iter()
        .flatten()
        .map(|e| e.to_string())
        .collect();

    if changelog.data.is_empty() && registry.data.is_empty() && engines.data.is_empty() {
        let detail = if source_errors.is_empty() {
            "every source returned an empty result".to_string()
        } else {
            source_errors.join("; ")
        };
        return LoaderMessage::Failed(format!("no release data available: {detail}"));
    }

    let cached_sources: Vec<&'static str> = [
        (ChangelogSource::NAME, changelog.from_cache),
        (RegistrySource::NAME, registry.from_cache),
        (EngineMapSource::NAME, engines.from_cache),
    ]
    .into_iter()
    .filter_map(|(name, cached)| cached.then_some(name))
    .collect();

    let rows = reconcile(
        &changelog.data,
        &registry.data,
        &engines.data,
        &cfg.fallback_engine,
    );
    LoaderMessage::Loaded(LoadedData {
        rows,
        source_errors,
        cached_sources,
    })
}

/// Best-effort text of a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "loader task panicked".to_string()
    }
}

/// What: Run `work` on the runtime and deliver its message, converting a crash into `Failed`.
///
/// Inputs:
/// - `work`: Future producing the loader's terminal message
/// - `tx`: Handoff to the UI loop
///
/// Output:
/// - Handle of the supervising task.
///
/// Details:
/// - A send error means the UI loop is gone (the user quit); the message is dropped.
pub fn spawn_worker<F>(work: F, tx: mpsc::UnboundedSender<LoaderMessage>) -> JoinHandle<()>
where
    F: Future<Output = LoaderMessage> + Send + 'static,
{
    tokio::spawn(async move {
        let msg = match tokio::spawn(work).await {
            Ok(msg) => msg,
            Err(e) if e.is_panic() => {
                let message = panic_message(&*e.into_panic());
                warn!(error = %message, "loader panicked");
                LoaderMessage::Failed(message)
            }
            Err(e) => LoaderMessage::Failed(e.to_string()),
        };
        if tx.send(msg).is_err() {
            tracing::debug!("loader result discarded, session already closed");
        }
    })
}

/// Start the background load for this session.
pub fn spawn_loader(cfg: LoaderConfig, tx: mpsc::UnboundedSender<LoaderMessage>) -> JoinHandle<()> {
    spawn_worker(async move { load_all(&cfg).await }, tx)
}
