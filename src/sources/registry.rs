//! Docker Hub tag listing adapter for the `linuxserver/obsidian` image.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Source, SourceError, get_json};
use crate::logic::version::numeric_runs;

/// Default tag-listing endpoint.
pub const DEFAULT_REGISTRY_URL: &str =
    "https://hub.docker.com/v2/repositories/linuxserver/obsidian/tags";

/// Tags per page requested from the registry.
pub const PAGE_SIZE: u32 = 100;

/// Upper bound on followed pages, guarding against a `next` cursor that never ends.
const MAX_PAGES: usize = 500;

/// Substrings marking tags that never name a concrete release.
const NOISE_MARKERS: [&str; 5] = ["latest", "develop", "amd64", "arm64", "-ls"];

/// Prefix some release tags carry before the version.
const VERSION_PREFIX: &str = "version-";

/// One page of the tag listing.
#[derive(Debug, Deserialize)]
pub struct TagPage {
    /// Absolute URL of the next page, `null` on the last one.
    #[serde(default)]
    pub next: Option<String>,
    /// Tags on this page.
    #[serde(default)]
    pub results: Vec<RawTag>,
}

/// Tag as returned by the registry API.
#[derive(Debug, Deserialize)]
pub struct RawTag {
    /// Tag name.
    pub name: String,
    /// ISO-8601 last push time.
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// A release tag published for the desktop image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    /// Normalized release version.
    pub version: String,
    /// Tag name to pull.
    pub name: String,
    /// Last push time, if reported.
    pub last_updated: Option<String>,
}

/// Registry adapter configuration.
#[derive(Clone, Debug)]
pub struct RegistrySource {
    /// Tag-listing endpoint (without query string).
    pub url: String,
}

impl Default for RegistrySource {
    fn default() -> Self {
        Self {
            url: DEFAULT_REGISTRY_URL.to_string(),
        }
    }
}

impl RegistrySource {
    /// First page URL with the page size applied.
    #[must_use]
    pub fn first_page_url(&self) -> String {
        let sep = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{sep}page_size={PAGE_SIZE}", self.url)
    }
}

impl Source for RegistrySource {
    type Output = Vec<TagRecord>;
    const NAME: &'static str = "registry";
    const SNAPSHOT_FILE: &'static str = "registry_tags.json";

    async fn fetch_remote(&self, client: &reqwest::Client) -> Result<Vec<TagRecord>, SourceError> {
        let mut next = Some(self.first_page_url());
        let mut tags = Vec::new();
        let mut pages = 0usize;
        while let Some(url) = next.take() {
            let page: TagPage = get_json(client, &url, Self::NAME).await?;
            pages += 1;
            debug!(page = pages, results = page.results.len(), "registry page");
            tags.extend(page.results.into_iter().filter_map(tag_record));
            next = page.next.filter(|n| !n.is_empty());
            if pages >= MAX_PAGES {
                tracing::warn!(pages, "registry pagination limit reached");
                break;
            }
        }
        sort_by_last_updated(&mut tags);
        Ok(tags)
    }

    fn item_count(data: &Vec<TagRecord>) -> usize {
        data.len()
    }

    fn should_snapshot(data: &Vec<TagRecord>) -> bool {
        !data.is_empty()
    }
}

/// What: Reduce a raw tag name to its release version.
///
/// Inputs:
/// - `name`: Tag name such as `1.5.3`, `version-1.5.3`, or `latest`.
///
/// Output:
/// - `Some(version)` for release tags; `None` for noise and placeholder tags.
///
/// Details:
/// - Noise markers are matched as substrings anywhere in the name.
/// - The `version-` prefix is stripped and everything from the first hyphen on is dropped.
/// - The result must contain a numeric run whose leading value is at least 1.
#[must_use]
pub fn normalize_tag(name: &str) -> Option<String> {
    if NOISE_MARKERS.iter().any(|m| name.contains(m)) {
        return None;
    }
    let stripped = name.replace(VERSION_PREFIX, "");
    let version = stripped.split('-').next().unwrap_or_default();
    match numeric_runs(version).first() {
        Some(&lead) if lead >= 1 => Some(version.to_string()),
        _ => None,
    }
}

/// Keep release tags only.
fn tag_record(raw: RawTag) -> Option<TagRecord> {
    let version = normalize_tag(&raw.name)?;
    Some(TagRecord {
        version,
        name: raw.name,
        last_updated: raw.last_updated,
    })
}

/// Most recently updated first; missing timestamps sort last.
pub(crate) fn sort_by_last_updated(tags: &mut [TagRecord]) {
    tags.sort_by(|a, b| {
        let ka = a.last_updated.as_deref().unwrap_or("");
        let kb = b.last_updated.as_deref().unwrap_or("");
        kb.cmp(ka)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: Noise and placeholder tags are rejected, release tags normalized
    ///
    /// - Input: Assorted tag names from the listing
    /// - Output: Only numeric versions with a leading component >= 1 survive
    fn normalize_tag_filters_and_strips() {
        assert_eq!(normalize_tag("1.5.3"), Some("1.5.3".to_string()));
        assert_eq!(normalize_tag("version-1.4.16"), Some("1.4.16".to_string()));
        assert_eq!(normalize_tag("1.2.8-r1"), Some("1.2.8".to_string()));
        assert_eq!(normalize_tag("latest"), None);
        assert_eq!(normalize_tag("develop-abc"), None);
        assert_eq!(normalize_tag("amd64-1.5.3"), None);
        assert_eq!(normalize_tag("arm64v8-1.5.3"), None);
        assert_eq!(normalize_tag("1.5.3-ls42"), None);
        assert_eq!(normalize_tag("version-unknown"), None);
        assert_eq!(normalize_tag("0.15.9"), None);
    }

    #[test]
    /// What: Tags are ordered newest first with missing timestamps last
    fn sorts_by_last_updated_desc() {
        let mk = |v: &str, t: Option<&str>| TagRecord {
            version: v.to_string(),
            name: v.to_string(),
            last_updated: t.map(str::to_string),
        };
        let mut tags = vec![
            mk("1.0.0", Some("2023-01-01T00:00:00Z")),
            mk("1.1.0", None),
            mk("1.2.0", Some("2024-01-01T00:00:00Z")),
        ];
        sort_by_last_updated(&mut tags);
        let order: Vec<&str> = tags.iter().map(|t| t.version.as_str()).collect();
        assert_eq!(order, vec!["1.2.0", "1.0.0", "1.1.0"]);
    }

    #[test]
    /// What: Page payloads deserialize with or without a next cursor
    fn tag_page_deserializes() {
        let page: TagPage = serde_json::from_str(
            r#"{"count": 2, "next": null, "results": [
                {"name": "1.5.3", "last_updated": "2024-01-01T00:00:00Z"},
                {"name": "latest"}
            ]}"#,
        )
        .expect("page");
        assert!(page.next.is_none());
        let kept: Vec<TagRecord> = page.results.into_iter().filter_map(tag_record).collect();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "1.5.3");
    }

    #[test]
    /// What: The first page URL carries the page size
    fn first_page_url_has_page_size() {
        let src = RegistrySource::default();
        assert!(src.first_page_url().ends_with("/tags?page_size=100"));
        let custom = RegistrySource {
            url: "http://localhost/tags?ordering=name".to_string(),
        };
        assert_eq!(
            custom.first_page_url(),
            "http://localhost/tags?ordering=name&page_size=100"
        );
    }

    /// What: Accept one connection per canned response, replying in order
    ///
    /// Output:
    /// - Handle resolving to the request lines seen, e.g. `GET /tags?page=2 HTTP/1.1`
    fn serve_in_order(
        listener: tokio::net::TcpListener,
        responses: Vec<(&'static str, String)>,
    ) -> tokio::task::JoinHandle<Vec<String>> {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        tokio::spawn(async move {
            let mut seen = Vec::new();
            for (status, body) in responses {
                let (mut stream, _) = listener.accept().await.expect("accept");
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                loop {
                    let n = stream.read(&mut chunk).await.expect("read");
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                    if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
                let head = String::from_utf8_lossy(&buf);
                seen.push(head.lines().next().unwrap_or_default().to_string());
                let reply = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(reply.as_bytes()).await.expect("write");
                stream.shutdown().await.ok();
            }
            seen
        })
    }

    async fn bind_local() -> (tokio::net::TcpListener, String) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let base = format!("http://{}", listener.local_addr().expect("addr"));
        (listener, base)
    }

    fn local_client() -> reqwest::Client {
        reqwest::Client::builder()
            .no_proxy()
            .build()
            .expect("client")
    }

    #[tokio::test]
    /// What: Pages are followed through `next` until it is null, then filtered and sorted
    ///
    /// Inputs:
    /// - Page 1: `version-1.5.0` and `latest`, `next` pointing at an absolute page-2 URL
    /// - Page 2: `1.4.0` and `1.5.0-ls12`, `next: null`
    ///
    /// Output:
    /// - Requests: first with `page_size=100`, second exactly the `next` URL
    /// - Tags: `1.5.0` (named `version-1.5.0`) then `1.4.0`
    async fn follows_next_cursor_across_pages() {
        let (listener, base) = bind_local().await;
        let page1 = format!(
            r#"{{"next": "{base}/tags?page=2", "results": [
                {{"name": "latest", "last_updated": "2024-03-01T00:00:00Z"}},
                {{"name": "version-1.5.0", "last_updated": "2024-02-01T00:00:00Z"}}
            ]}}"#
        );
        let page2 = r#"{"next": null, "results": [
                {"name": "1.4.0", "last_updated": "2024-01-01T00:00:00Z"},
                {"name": "1.5.0-ls12", "last_updated": "2024-02-02T00:00:00Z"}
            ]}"#
        .to_string();
        let server = serve_in_order(listener, vec![("200 OK", page1), ("200 OK", page2)]);

        let src = RegistrySource {
            url: format!("{base}/tags"),
        };
        let tags = src.fetch_remote(&local_client()).await.expect("tags");
        let requests = server.await.expect("server");

        assert_eq!(requests.len(), 2);
        assert!(requests[0].starts_with("GET /tags?page_size=100 "));
        assert!(requests[1].starts_with("GET /tags?page=2 "));
        let got: Vec<(&str, &str)> = tags
            .iter()
            .map(|t| (t.version.as_str(), t.name.as_str()))
            .collect();
        assert_eq!(got, vec![("1.5.0", "version-1.5.0"), ("1.4.0", "1.4.0")]);
    }

    #[tokio::test]
    /// What: A non-success status is a fetch error, not a parse error
    async fn http_error_status_is_fetch_error() {
        let (listener, base) = bind_local().await;
        let server = serve_in_order(
            listener,
            vec![("500 Internal Server Error", r#"{"detail": "boom"}"#.to_string())],
        );
        let src = RegistrySource {
            url: format!("{base}/tags"),
        };
        let err = src
            .fetch_remote(&local_client())
            .await
            .expect_err("server error");
        server.await.expect("server");
        assert!(matches!(err, SourceError::Fetch { name: "registry", .. }));
    }

    #[tokio::test]
    /// What: A page that is not JSON is a parse error
    async fn malformed_page_is_parse_error() {
        let (listener, base) = bind_local().await;
        let server = serve_in_order(listener, vec![("200 OK", "<html>".to_string())]);
        let src = RegistrySource {
            url: format!("{base}/tags"),
        };
        let err = src
            .fetch_remote(&local_client())
            .await
            .expect_err("bad payload");
        server.await.expect("server");
        assert!(matches!(err, SourceError::Parse { name: "registry", .. }));
    }
}
