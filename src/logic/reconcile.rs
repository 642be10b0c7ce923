//! Merge the three source outputs into one deduplicated row list.

use std::collections::{HashMap, HashSet};

use crate::logic::version::compare_versions;
use crate::sources::{ChangelogRecord, EngineMap, TagRecord};
use crate::state::{Availability, Platform, ReconciledRow};

/// Default Electron version assumed for releases older than the first entry that names one.
pub const DEFAULT_FALLBACK_ENGINE: &str = "13.0.0";

/// What: Build the newest-first, deduplicated row list from the normalized source records.
///
/// Inputs:
/// - `changelog`: Changelog records in any order; engine versions may be missing.
/// - `tags`: Registry tags, ordered most recently updated first.
/// - `engines`: Electron to Chromium lookup table.
/// - `fallback_engine`: Engine version assumed before the first record that names one.
///
/// Output:
/// - One row per `(version, platform)`, newest version first.
///
/// Details:
/// - Ordering contract: records are stably sorted ascending by numeric version, engine versions
///   are backfilled along that walk, and the list is then reversed. Deduplication runs on the
///   reversed list, so the first occurrence kept for a key is the one that sorted last.
/// - When several tags share a version, the first one in `tags` (the most recently updated) backs the row.
/// - Total over every combination of empty inputs.
#[must_use]
pub fn reconcile(
    changelog: &[ChangelogRecord],
    tags: &[TagRecord],
    engines: &EngineMap,
    fallback_engine: &str,
) -> Vec<ReconciledRow> {
    let mut tag_index: HashMap<&str, &TagRecord> = HashMap::with_capacity(tags.len());
    for tag in tags {
        tag_index.entry(tag.version.as_str()).or_insert(tag);
    }

    let mut ordered: Vec<&ChangelogRecord> = changelog.iter().collect();
    ordered.sort_by(|a, b| compare_versions(&a.version, &b.version));

    let mut last_engine = fallback_engine.to_string();
    let mut backfilled: Vec<(&ChangelogRecord, String)> = Vec::with_capacity(ordered.len());
    for rec in ordered {
        if let Some(engine) = rec.engine_version.as_deref() {
            last_engine = engine.to_string();
        }
        backfilled.push((rec, last_engine.clone()));
    }
    backfilled.reverse();

    let mut seen: HashSet<(String, Platform)> = HashSet::with_capacity(backfilled.len());
    let mut rows = Vec::with_capacity(backfilled.len());
    for (rec, engine) in backfilled {
        if !seen.insert((rec.version.clone(), rec.platform)) {
            continue;
        }
        let tag = match rec.platform {
            Platform::Desktop => tag_index.get(rec.version.as_str()).copied(),
            Platform::Mobile => None,
        };
        let availability = match (rec.platform, tag) {
            (Platform::Mobile, _) => Availability::NotApplicable,
            (Platform::Desktop, Some(_)) => Availability::Found,
            (Platform::Desktop, None) => Availability::Missing,
        };
        let browser = engines.resolve(&engine).to_string();
        rows.push(ReconciledRow::new(
            rec.version.clone(),
            rec.platform,
            rec.published.clone(),
            availability,
            engine,
            browser,
            rec.early_access,
            tag.map(|t| t.name.clone()),
        ));
    }
    tracing::debug!(
        changelog = changelog.len(),
        tags = tags.len(),
        engines = engines.len(),
        rows = rows.len(),
        "reconciled release rows"
    );
    rows
}
