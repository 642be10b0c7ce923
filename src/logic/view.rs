//! Filtering, sorting and search-match helpers for the release table.
//!
//! Everything here is a pure function of the reconciled rows and the session's
//! filter state; the session calls back into it after every state change.

use std::cmp::Ordering;

use crate::logic::version::compare_versions;
use crate::state::{Availability, Filters, Platform, ReconciledRow, SortMode};

/// Number of cells rendered per row.
pub const COLUMN_COUNT: usize = 7;

/// Column headers in display order.
pub const COLUMN_TITLES: [&str; COLUMN_COUNT] = [
    "#", "Version", "Type", "Released", "Image", "Electron", "Chromium",
];

/// What: Priority group used by [`SortMode::PriorityGrouped`].
///
/// Output:
/// - `0` for rows with an image, `1` for mobile rows, `2` for everything else.
#[must_use]
pub fn group_rank(row: &ReconciledRow) -> u8 {
    if row.availability() == Availability::Found {
        0
    } else if row.platform() == Platform::Mobile {
        1
    } else {
        2
    }
}

/// What: Decide whether a row survives the current filters and query.
///
/// Inputs:
/// - `row`: Candidate row.
/// - `filters`: Session filter flags.
/// - `query_lower`: Lowercased, untrimmed query (empty disables query filtering).
///
/// Output:
/// - `true` when the row should be displayed.
#[must_use]
pub fn row_passes(row: &ReconciledRow, filters: &Filters, query_lower: &str) -> bool {
    if !filters.show_mobile && row.platform() == Platform::Mobile {
        return false;
    }
    if !filters.show_early_access && row.early_access() {
        return false;
    }
    if filters.found_only && row.availability() != Availability::Found {
        return false;
    }
    query_lower.is_empty() || row.search_blob().contains(query_lower)
}

/// What: Compute the ordered indices (into `rows`) of the visible subset.
///
/// Inputs:
/// - `rows`: Reconciled rows, newest first.
/// - `filters`: Session filter flags.
/// - `sort`: Active sort mode.
/// - `query`: Free-text query; matched case-insensitively as a substring of each row's searchable text.
///
/// Output:
/// - Indices of the rows to display, in display order.
///
/// Details:
/// - The filter predicates are independent of each other, so the result only depends on the
///   final flag values, never on the order they were toggled in.
/// - Sorting is stable; ties keep their reconciled order.
#[must_use]
pub fn visible_indices(
    rows: &[ReconciledRow],
    filters: &Filters,
    sort: SortMode,
    query: &str,
) -> Vec<usize> {
    let q = query.to_lowercase();
    let mut out: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, r)| row_passes(r, filters, &q))
        .map(|(i, _)| i)
        .collect();
    out.sort_by(|&a, &b| compare_rows(&rows[a], &rows[b], sort));
    out
}

/// What: Convenience wrapper returning the visible rows themselves.
#[must_use]
pub fn visible_rows<'a>(
    rows: &'a [ReconciledRow],
    filters: &Filters,
    sort: SortMode,
    query: &str,
) -> Vec<&'a ReconciledRow> {
    visible_indices(rows, filters, sort, query)
        .into_iter()
        .map(|i| &rows[i])
        .collect()
}

/// Ordering between two rows under `sort`.
fn compare_rows(a: &ReconciledRow, b: &ReconciledRow, sort: SortMode) -> Ordering {
    let by_version = compare_versions(b.version(), a.version());
    match sort {
        SortMode::PriorityGrouped => group_rank(a).cmp(&group_rank(b)).then(by_version),
        SortMode::PureVersionDesc => by_version,
    }
}

/// What: Prefix engine versions with `v` when they look numeric.
///
/// Details:
/// - `Unknown` and other non-numeric labels are returned unchanged.
#[must_use]
pub fn format_engine(v: &str) -> String {
    if v.chars().any(|c| c.is_ascii_digit()) {
        format!("v{v}")
    } else {
        v.to_string()
    }
}

/// What: Text of every table cell for one visible row.
///
/// Inputs:
/// - `pos`: Position of the row in the visible list (shown in the `#` column).
/// - `row`: Row to render.
///
/// Output:
/// - Cell strings in [`COLUMN_TITLES`] order.
#[must_use]
pub fn display_cells(pos: usize, row: &ReconciledRow) -> [String; COLUMN_COUNT] {
    [
        pos.to_string(),
        row.version().to_string(),
        row.platform().label().to_string(),
        row.published_date(),
        row.availability().label().to_string(),
        format_engine(row.engine_version()),
        format_engine(row.browser_version()),
    ]
}

/// What: Lowercase space-joined rendered cells, used by next/previous match.
#[must_use]
pub fn rendered_text(pos: usize, row: &ReconciledRow) -> String {
    display_cells(pos, row).join(" ").to_lowercase()
}

/// What: Find the next or previous visible row whose rendered text contains `query`.
///
/// Inputs:
/// - `rows`: Visible rows in display order.
/// - `query`: Search text; empty means no match.
/// - `cursor`: Current cursor position.
/// - `forward`: Search direction.
///
/// Output:
/// - `Some(index)` of the match, `None` when the query is empty or nothing matches.
///
/// Details:
/// - Wraps circularly; the scan ends on the cursor row itself, so a lone match under the
///   cursor is returned again instead of reporting no match.
#[must_use]
pub fn find_match(
    rows: &[&ReconciledRow],
    query: &str,
    cursor: usize,
    forward: bool,
) -> Option<usize> {
    let n = rows.len();
    if query.is_empty() || n == 0 {
        return None;
    }
    let q = query.to_lowercase();
    let start = cursor.min(n - 1);
    (1..=n)
        .map(|step| {
            if forward {
                (start + step) % n
            } else {
                (start + n - (step % n)) % n
            }
        })
        .find(|&idx| rendered_text(idx, rows[idx]).contains(&q))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(version: &str, platform: Platform, availability: Availability, early: bool) -> ReconciledRow {
        ReconciledRow::new(
            version.to_string(),
            platform,
            "2024-01-01T00:00:00Z".to_string(),
            availability,
            "25.0.0".to_string(),
            "Unknown".to_string(),
            early,
            (availability == Availability::Found).then(|| version.to_string()),
        )
    }

    fn sample() -> Vec<ReconciledRow> {
        vec![
            row("1.6.0", Platform::Desktop, Availability::Missing, true),
            row("1.6.0", Platform::Mobile, Availability::NotApplicable, false),
            row("1.5.12", Platform::Desktop, Availability::Found, false),
            row("1.10.0", Platform::Desktop, Availability::Found, false),
            row("0.9.0", Platform::Desktop, Availability::Missing, false),
        ]
    }

    #[test]
    /// What: Priority grouping puts images first, mobile second, rest last
    ///
    /// - Input: Mixed rows with default filters
    /// - Output: Found rows by version desc, then mobile, then missing by version desc
    fn priority_grouped_order() {
        let rows = sample();
        let vis = visible_rows(&rows, &Filters::default(), SortMode::PriorityGrouped, "");
        let got: Vec<(&str, Platform)> = vis.iter().map(|r| (r.version(), r.platform())).collect();
        assert_eq!(
            got,
            vec![
                ("1.10.0", Platform::Desktop),
                ("1.5.12", Platform::Desktop),
                ("1.6.0", Platform::Mobile),
                ("1.6.0", Platform::Desktop),
                ("0.9.0", Platform::Desktop),
            ]
        );
    }

    #[test]
    /// What: Pure version sort ignores availability and compares numerically
    fn pure_version_desc_order() {
        let rows = sample();
        let vis = visible_rows(&rows, &Filters::default(), SortMode::PureVersionDesc, "");
        let versions: Vec<&str> = vis.iter().map(|r| r.version()).collect();
        assert_eq!(versions, vec!["1.10.0", "1.6.0", "1.6.0", "1.5.12", "0.9.0"]);
    }

    #[test]
    /// What: Each filter flag removes its own class of rows
    fn filters_exclude_rows() {
        let rows = sample();
        let filters = Filters {
            show_mobile: false,
            show_early_access: false,
            found_only: false,
        };
        let vis = visible_rows(&rows, &filters, SortMode::PureVersionDesc, "");
        assert!(vis.iter().all(|r| r.platform() == Platform::Desktop && !r.early_access()));
        let found = Filters {
            found_only: true,
            ..Filters::default()
        };
        let vis = visible_rows(&rows, &found, SortMode::PureVersionDesc, "");
        assert!(vis.iter().all(|r| r.availability() == Availability::Found));
        assert_eq!(vis.len(), 2);
    }

    #[test]
    /// What: Query matching is a case-insensitive substring test on the searchable text
    fn query_filters_case_insensitively() {
        let rows = sample();
        let vis = visible_rows(&rows, &Filters::default(), SortMode::PureVersionDesc, "MOBILE");
        assert_eq!(vis.len(), 1);
        assert_eq!(vis[0].platform(), Platform::Mobile);
        let none = visible_rows(&rows, &Filters::default(), SortMode::PureVersionDesc, "zzz");
        assert!(none.is_empty());
    }

    #[test]
    /// What: Engine labels gain a `v` only when numeric
    fn format_engine_prefixes_numeric() {
        assert_eq!(format_engine("25.0.0"), "v25.0.0");
        assert_eq!(format_engine("Unknown"), "Unknown");
    }

    #[test]
    /// What: Rendered text includes the index column and formatted cells
    fn rendered_text_joins_cells() {
        let r = row("1.5.12", Platform::Desktop, Availability::Found, false);
        assert_eq!(
            rendered_text(3, &r),
            "3 1.5.12 desktop 2024-01-01 found v25.0.0 unknown"
        );
    }

    #[test]
    /// What: Next/previous match wrap around and a lone match is found again
    ///
    /// - Input: 3 rows, only index 2 matches, cursor at 0
    /// - Output: next -> 2, next again -> 2, prev from 0 -> 2
    fn find_match_wraps() {
        let a = row("1.0.0", Platform::Desktop, Availability::Missing, false);
        let b = row("1.1.0", Platform::Desktop, Availability::Missing, false);
        let c = row("1.2.0", Platform::Desktop, Availability::Found, false);
        let rows = vec![&a, &b, &c];
        assert_eq!(find_match(&rows, "found", 0, true), Some(2));
        assert_eq!(find_match(&rows, "found", 2, true), Some(2));
        assert_eq!(find_match(&rows, "found", 0, false), Some(2));
        assert_eq!(find_match(&rows, "missing", 0, false), Some(1));
        assert_eq!(find_match(&rows, "", 0, true), None);
        assert_eq!(find_match(&rows, "mobile", 0, true), None);
    }
}
