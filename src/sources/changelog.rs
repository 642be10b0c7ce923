//! Obsidian changelog feed adapter.

use regex::Regex;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use super::{Source, SourceError, get_text};
use crate::state::Platform;

/// Default changelog feed location.
pub const DEFAULT_CHANGELOG_URL: &str = "https://obsidian.md/changelog.xml";

/// Date placeholder for entries without `updated`/`published`.
const NO_DATE: &str = "---";

/// Title markers flagging a pre-release.
const EARLY_ACCESS_MARKERS: [&str; 2] = ["(Early access)", "(Insider)"];

/// One release announced by the changelog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogRecord {
    /// Three-component version taken from the title.
    pub version: String,
    /// Desktop unless the title mentions Mobile.
    pub platform: Platform,
    /// Raw `updated`/`published` timestamp, or `---`.
    pub published: String,
    /// Electron version named in the entry body, if any.
    pub engine_version: Option<String>,
    /// Entry title as published.
    pub title: String,
    /// Title carries an early-access marker.
    pub early_access: bool,
}

/// Changelog adapter configuration.
#[derive(Clone, Debug)]
pub struct ChangelogSource {
    /// Feed URL.
    pub url: String,
}

impl Default for ChangelogSource {
    fn default() -> Self {
        Self {
            url: DEFAULT_CHANGELOG_URL.to_string(),
        }
    }
}

impl Source for ChangelogSource {
    type Output = Vec<ChangelogRecord>;
    const NAME: &'static str = "changelog";
    const SNAPSHOT_FILE: &'static str = "changelog.json";

    async fn fetch_remote(
        &self,
        client: &reqwest::Client,
    ) -> Result<Vec<ChangelogRecord>, SourceError> {
        let body = get_text(client, &self.url, Self::NAME).await?;
        parse_changelog(&body)
    }

    fn item_count(data: &Vec<ChangelogRecord>) -> usize {
        data.len()
    }
}

/// What: Parse an Atom (or RSS 2.0) changelog document into release records.
///
/// Inputs:
/// - `xml`: Raw feed document.
///
/// Output:
/// - Records in feed order; entries whose title has no `X.Y.Z` version are skipped.
///
/// # Errors
/// - [`SourceError::Parse`] when the document is not well-formed XML.
///
/// Details:
/// - The engine version is matched case-insensitively as `Electron vX.Y.Z` in the entry body.
/// - Engine versions are left empty here; backfilling happens during reconciliation.
pub fn parse_changelog(xml: &str) -> Result<Vec<ChangelogRecord>, SourceError> {
    let parse_err = |message: String| SourceError::Parse {
        name: ChangelogSource::NAME,
        message,
    };
    let version_re = Regex::new(r"(\d+\.\d+\.\d+)").map_err(|e| parse_err(e.to_string()))?;
    let engine_re =
        Regex::new(r"(?i)Electron v?(\d+\.\d+\.\d+)").map_err(|e| parse_err(e.to_string()))?;
    let doc = Document::parse(xml).map_err(|e| parse_err(e.to_string()))?;

    let mut out = Vec::new();
    for entry in doc
        .descendants()
        .filter(|n| n.has_tag_name("entry") || n.has_tag_name("item"))
    {
        let title = child_text(entry, &["title"]).unwrap_or_default();
        let Some(version) = version_re.captures(&title).and_then(|c| c.get(1)) else {
            tracing::debug!(title = %title, "skipping changelog entry without version");
            continue;
        };
        let body = child_text(entry, &["content", "encoded", "description"]).unwrap_or_default();
        let engine_version = engine_re
            .captures(&body)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());
        let published = child_text(entry, &["updated", "published", "pubDate"])
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| NO_DATE.to_string());
        let platform = if title.contains("Mobile") {
            Platform::Mobile
        } else {
            Platform::Desktop
        };
        let early_access = EARLY_ACCESS_MARKERS.iter().any(|m| title.contains(m));
        out.push(ChangelogRecord {
            version: version.as_str().to_string(),
            platform,
            published,
            engine_version,
            early_access,
            title: title.trim().to_string(),
        });
    }
    Ok(out)
}

/// Concatenated text of the first child element matching any of `names`, tried in order.
fn child_text(entry: Node<'_, '_>, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        entry
            .children()
            .find(|c| c.has_tag_name(*name))
            .map(|c| {
                c.descendants()
                    .filter(Node::is_text)
                    .filter_map(|t| t.text())
                    .collect::<String>()
            })
    })
}
