//! Remote release data sources with per-source JSON snapshots.
//!
//! Each adapter implements [`Source`]; [`fetch`] wraps any adapter with the shared
//! snapshot-then-network policy and turns failures into an empty result plus a
//! recorded error, so one broken endpoint never takes the others down.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

pub mod changelog;
pub mod engines;
pub mod registry;
pub mod snapshot;

pub use changelog::{ChangelogRecord, ChangelogSource, parse_changelog};
pub use engines::{EngineMap, EngineMapSource};
pub use registry::{RegistrySource, TagPage, TagRecord, normalize_tag};

/// Failure of a single source fetch.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Transport failure, timeout, or non-success HTTP status.
    #[error("{name}: request failed: {error}")]
    Fetch {
        /// Source that failed.
        name: &'static str,
        /// Underlying client error.
        #[source]
        error: reqwest::Error,
    },
    /// Payload could not be parsed.
    #[error("{name}: malformed payload: {message}")]
    Parse {
        /// Source that failed.
        name: &'static str,
        /// Parser message.
        message: String,
    },
}

impl SourceError {
    /// Name of the source that produced this error.
    #[must_use]
    pub const fn source_name(&self) -> &'static str {
        match self {
            Self::Fetch { name, .. } | Self::Parse { name, .. } => name,
        }
    }
}

/// A remote data source with a normalized, cacheable output.
pub trait Source {
    /// Normalized records produced by this source.
    type Output: Serialize + DeserializeOwned + Default + Send;

    /// Short name used in logs and error messages.
    const NAME: &'static str;

    /// Snapshot file name inside the cache directory.
    const SNAPSHOT_FILE: &'static str;

    /// Fetch and normalize the payload from the network.
    fn fetch_remote(
        &self,
        client: &reqwest::Client,
    ) -> impl Future<Output = Result<Self::Output, SourceError>> + Send;

    /// Number of records, for logging.
    fn item_count(data: &Self::Output) -> usize;

    /// Whether a successful fetch should be written to the snapshot.
    fn should_snapshot(_data: &Self::Output) -> bool {
        true
    }
}

/// Result of one source fetch: data (possibly empty) plus the error that emptied it.
#[derive(Debug)]
pub struct Fetched<T> {
    /// Normalized records; `Default` when the fetch failed.
    pub data: T,
    /// Error recorded for end-of-load reporting.
    pub error: Option<SourceError>,
    /// Whether `data` came from the local snapshot.
    pub from_cache: bool,
}

/// What: Load a source from its snapshot or the network.
///
/// Inputs:
/// - `source`: Adapter to run.
/// - `client`: Shared HTTP client (carries the per-request timeout).
/// - `cache_dir`: Directory holding the snapshot files.
/// - `force_refresh`: Skip the snapshot and always hit the network.
///
/// Output:
/// - [`Fetched`] with the records, or empty records and the error.
///
/// Details:
/// - An unreadable or corrupt snapshot is treated as a miss.
/// - Successful network results are written back atomically; a failed write is only logged.
pub async fn fetch<S: Source + Sync>(
    source: &S,
    client: &reqwest::Client,
    cache_dir: &Path,
    force_refresh: bool,
) -> Fetched<S::Output> {
    let path = cache_dir.join(S::SNAPSHOT_FILE);
    if force_refresh {
        debug!(source = S::NAME, "force refresh, skipping snapshot");
    } else {
        match snapshot::load::<S::Output>(&path) {
            Ok(data) => {
                return Fetched {
                    data,
                    error: None,
                    from_cache: true,
                };
            }
            Err(e) if e.is_missing() => {
                debug!(source = S::NAME, path = %path.display(), "no snapshot");
            }
            Err(e) => {
                info!(source = S::NAME, error = %e, "snapshot unusable, refetching");
            }
        }
    }

    match source.fetch_remote(client).await {
        Ok(data) => {
            info!(source = S::NAME, items = S::item_count(&data), "fetched from network");
            if S::should_snapshot(&data)
                && let Err(e) = snapshot::save(&path, &data)
            {
                warn!(source = S::NAME, error = %e, "failed to write snapshot");
            }
            Fetched {
                data,
                error: None,
                from_cache: false,
            }
        }
        Err(e) => {
            warn!(source = S::NAME, error = %e, "fetch failed");
            Fetched {
                data: S::Output::default(),
                error: Some(e),
                from_cache: false,
            }
        }
    }
}

/// What: Build the shared HTTP client.
///
/// Inputs:
/// - `timeout`: Per-request timeout.
///
/// Output:
/// - Configured client; falls back to a default client if the builder fails.
#[must_use]
pub fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(timeout)
        .timeout(timeout)
        .user_agent(format!("obsiver/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "failed to build HTTP client, using defaults");
            reqwest::Client::new()
        })
}

/// What: GET a URL and return its body as text.
///
/// Details:
/// - Non-success HTTP statuses are reported as [`SourceError::Fetch`].
pub(crate) async fn get_text(
    client: &reqwest::Client,
    url: &str,
    name: &'static str,
) -> Result<String, SourceError> {
    let fetch_err = |error| SourceError::Fetch { name, error };
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(fetch_err)?
        .error_for_status()
        .map_err(fetch_err)?;
    let body = resp.text().await.map_err(fetch_err)?;
    debug!(source = name, url, bytes = body.len(), "fetched body");
    Ok(body)
}

/// What: GET a URL and decode its body as JSON.
///
/// Details:
/// - Decoding failures are reported as [`SourceError::Parse`], separate from transport errors.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    name: &'static str,
) -> Result<T, SourceError> {
    let body = get_text(client, url, name).await?;
    serde_json::from_str(&body).map_err(|e| SourceError::Parse {
        name,
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Adapter whose network side is scripted.
    struct Scripted {
        remote: Option<Vec<String>>,
    }

    impl Source for Scripted {
        type Output = Vec<String>;
        const NAME: &'static str = "scripted";
        const SNAPSHOT_FILE: &'static str = "scripted.json";

        async fn fetch_remote(&self, _client: &reqwest::Client) -> Result<Vec<String>, SourceError> {
            self.remote.clone().ok_or_else(|| SourceError::Parse {
                name: Self::NAME,
                message: "scripted failure".to_string(),
            })
        }

        fn item_count(data: &Vec<String>) -> usize {
            data.len()
        }
    }

    #[tokio::test]
    /// What: A network success is returned and written to the snapshot
    ///
    /// - Input: Empty cache dir, scripted success
    /// - Output: Data from network; a second, failing fetch is served from the snapshot
    async fn fetch_writes_then_reads_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let client = reqwest::Client::new();
        let ok = Scripted {
            remote: Some(vec!["a".into(), "b".into()]),
        };
        let first = fetch(&ok, &client, dir.path(), false).await;
        assert!(!first.from_cache);
        assert!(first.error.is_none());
        assert_eq!(first.data.len(), 2);

        let failing = Scripted { remote: None };
        let second = fetch(&failing, &client, dir.path(), false).await;
        assert!(second.from_cache);
        assert_eq!(second.data, vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    /// What: A failure degrades to empty data with the error recorded
    async fn fetch_failure_is_empty_with_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let client = reqwest::Client::new();
        let failing = Scripted { remote: None };
        let out = fetch(&failing, &client, dir.path(), true).await;
        assert!(out.data.is_empty());
        let err = out.error.expect("error recorded");
        assert_eq!(err.source_name(), "scripted");
        assert!(err.to_string().contains("scripted failure"));
    }

    #[tokio::test]
    /// What: Force refresh bypasses a valid snapshot
    async fn force_refresh_skips_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let client = reqwest::Client::new();
        snapshot::save(&dir.path().join("scripted.json"), &vec!["old".to_string()])
            .expect("seed snapshot");
        let fresh = Scripted {
            remote: Some(vec!["new".into()]),
        };
        let out = fetch(&fresh, &client, dir.path(), true).await;
        assert!(!out.from_cache);
        assert_eq!(out.data, vec!["new".to_string()]);
    }

    #[tokio::test]
    /// What: A corrupt snapshot is a cache miss, not an error
    async fn corrupt_snapshot_is_a_miss() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("scripted.json"), "{not json").expect("write");
        let client = reqwest::Client::new();
        let ok = Scripted {
            remote: Some(vec!["x".into()]),
        };
        let out = fetch(&ok, &client, dir.path(), false).await;
        assert!(!out.from_cache);
        assert!(out.error.is_none());
        assert_eq!(out.data, vec!["x".to_string()]);
    }
}
