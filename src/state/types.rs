//! Core value types shared by the reconciliation engine, the view logic and the session.

use serde::{Deserialize, Serialize};

/// Release platform as announced by the changelog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    /// Desktop build (the only platform the registry publishes images for).
    Desktop,
    /// Mobile build.
    Mobile,
}

impl Platform {
    /// Display label used in the table and in the searchable text.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Desktop => "Desktop",
            Self::Mobile => "Mobile",
        }
    }
}

/// Whether a runnable container image exists for a release.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Availability {
    /// A registry tag exists for this desktop release.
    Found,
    /// Desktop release without any matching registry tag.
    Missing,
    /// Mobile release; the registry never carries mobile images.
    NotApplicable,
}

impl Availability {
    /// Display label used in the table and in the searchable text.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Found => "Found",
            Self::Missing => "Missing",
            Self::NotApplicable => "N/A",
        }
    }
}

/// Browser-engine label used when the engine map has no entry.
pub const UNKNOWN_BROWSER_VERSION: &str = "Unknown";

/// Merged, view-ready record for one `(version, platform)` pair.
///
/// Built once by [`crate::logic::reconcile`] and never mutated afterwards; all
/// fields are private and only exposed through accessors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconciledRow {
    version: String,
    platform: Platform,
    published: String,
    availability: Availability,
    engine_version: String,
    browser_version: String,
    early_access: bool,
    tag: Option<String>,
    search_blob: String,
}

impl ReconciledRow {
    /// What: Build a row and precompute its lowercase searchable text.
    ///
    /// Inputs:
    /// - `version`, `platform`, `published`: Release identity and date from the changelog.
    /// - `availability`: Image availability resolved against the registry.
    /// - `engine_version`, `browser_version`: Backfilled Electron version and its Chromium version.
    /// - `early_access`: Pre-release flag from the changelog title.
    /// - `tag`: Registry tag name when `availability` is `Found`.
    ///
    /// Output:
    /// - Immutable row.
    ///
    /// Details:
    /// - The searchable text is the space-joined display fields, lowercased.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        version: String,
        platform: Platform,
        published: String,
        availability: Availability,
        engine_version: String,
        browser_version: String,
        early_access: bool,
        tag: Option<String>,
    ) -> Self {
        let search_blob = format!(
            "{} {} {} {} {} {}",
            version,
            platform.label(),
            availability.label(),
            published,
            engine_version,
            browser_version
        )
        .to_lowercase();
        Self {
            version,
            platform,
            published,
            availability,
            engine_version,
            browser_version,
            early_access,
            tag,
            search_blob,
        }
    }

    /// Dotted numeric release version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Release platform.
    #[must_use]
    pub const fn platform(&self) -> Platform {
        self.platform
    }

    /// Image availability.
    #[must_use]
    pub const fn availability(&self) -> Availability {
        self.availability
    }

    /// Electron version (always present after backfill).
    #[must_use]
    pub fn engine_version(&self) -> &str {
        &self.engine_version
    }

    /// Chromium version or [`UNKNOWN_BROWSER_VERSION`].
    #[must_use]
    pub fn browser_version(&self) -> &str {
        &self.browser_version
    }

    /// Early-access / insider release.
    #[must_use]
    pub const fn early_access(&self) -> bool {
        self.early_access
    }

    /// Registry tag backing this row, present only for `Found` rows.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Lowercase space-joined display fields.
    #[must_use]
    pub fn search_blob(&self) -> &str {
        &self.search_blob
    }

    /// Publish date trimmed to `YYYY-MM-DD` for display.
    #[must_use]
    pub fn published_date(&self) -> String {
        if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(self.published.trim()) {
            return dt.format("%Y-%m-%d").to_string();
        }
        self.published.chars().take(10).collect()
    }
}

/// Sorting mode for the release table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Found first, then mobile, then the rest; newest version first inside each group.
    #[default]
    PriorityGrouped,
    /// Newest version first, ignoring availability.
    PureVersionDesc,
}

impl SortMode {
    /// Parse the `sort_mode` value from settings.conf.
    #[must_use]
    pub fn from_config_key(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "priority" | "grouped" | "priority_grouped" => Some(Self::PriorityGrouped),
            "version" | "version_desc" | "pure_version" => Some(Self::PureVersionDesc),
            _ => None,
        }
    }

    /// Short label for the mode bar.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PriorityGrouped => "priority",
            Self::PureVersionDesc => "version",
        }
    }

    /// The other mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::PriorityGrouped => Self::PureVersionDesc,
            Self::PureVersionDesc => Self::PriorityGrouped,
        }
    }
}

/// Row filter flags owned by the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Filters {
    /// Show mobile releases.
    pub show_mobile: bool,
    /// Show early-access / insider releases.
    pub show_early_access: bool,
    /// Only show releases with a registry image.
    pub found_only: bool,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            show_mobile: true,
            show_early_access: true,
            found_only: false,
        }
    }
}

/// Confirmed `(version, tag)` pair handed to the extraction pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Release version.
    pub version: String,
    /// Registry tag to pull.
    pub tag: String,
}

/// Terminal result of an interactive session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionOutcome {
    /// User confirmed a release with an image.
    Selected(Selection),
    /// User quit without confirming.
    Cancelled,
    /// Systemic failure (loader crash or no data at all).
    Failed(String),
}

impl std::fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Selected(sel) => write!(f, "{} ({})", sel.version, sel.tag),
            Self::Cancelled => f.write_str("cancelled"),
            Self::Failed(msg) => write!(f, "Error: {msg}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: Searchable text joins every display field in lowercase
    ///
    /// - Input: Desktop Found row with engine and browser versions
    /// - Output: Blob contains each field, lowercased, space-separated
    fn row_search_blob_is_lowercase_join() {
        let row = ReconciledRow::new(
            "1.2.3".into(),
            Platform::Desktop,
            "2024-03-01T10:00:00Z".into(),
            Availability::Found,
            "28.1.0".into(),
            "120.0.6099.56".into(),
            false,
            Some("1.2.3".into()),
        );
        assert_eq!(
            row.search_blob(),
            "1.2.3 desktop found 2024-03-01t10:00:00z 28.1.0 120.0.6099.56"
        );
        assert_eq!(row.published_date(), "2024-03-01");
    }

    #[test]
    /// What: Failed outcomes render with a distinguishable prefix
    fn failed_outcome_display_is_prefixed() {
        let out = SessionOutcome::Failed("boom".into());
        assert_eq!(out.to_string(), "Error: boom");
        assert_eq!(SessionOutcome::Cancelled.to_string(), "cancelled");
    }

    #[test]
    /// What: Sort mode config keys parse both spellings and reject junk
    fn sort_mode_from_config_key() {
        assert_eq!(
            SortMode::from_config_key("Priority"),
            Some(SortMode::PriorityGrouped)
        );
        assert_eq!(
            SortMode::from_config_key("version"),
            Some(SortMode::PureVersionDesc)
        );
        assert_eq!(SortMode::from_config_key("alpha"), None);
    }
}
