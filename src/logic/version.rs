//! Numeric version ordering shared by the reconciliation and view engines.

use std::cmp::Ordering;

/// What: Split a version string into its numeric runs.
///
/// Inputs:
/// - `v`: Arbitrary version text such as `"1.4.16"` or `"v28.1.0-beta"`.
///
/// Output:
/// - Every maximal run of ASCII digits, parsed as an integer, in order of appearance.
///
/// Details:
/// - Non-digit characters only act as separators.
/// - Runs that overflow `u64` saturate instead of failing.
#[must_use]
pub fn numeric_runs(v: &str) -> Vec<u64> {
    let mut out = Vec::new();
    let mut current: Option<u64> = None;
    for ch in v.chars() {
        if let Some(d) = ch.to_digit(10) {
            let acc = current.unwrap_or(0);
            current = Some(acc.saturating_mul(10).saturating_add(u64::from(d)));
        } else if let Some(n) = current.take() {
            out.push(n);
        }
    }
    if let Some(n) = current {
        out.push(n);
    }
    out
}

/// What: Compare two version strings component-wise by numeric magnitude.
///
/// Inputs:
/// - `a`, `b`: Version strings.
///
/// Output:
/// - `Ordering` of `a` relative to `b`.
///
/// Details:
/// - The shorter component list is treated as right-padded with zeros, so `1.2` equals `1.2.0`.
/// - Never falls back to string comparison: `10.0.0` is greater than `9.0.0`.
#[must_use]
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let ra = numeric_runs(a);
    let rb = numeric_runs(b);
    let len = ra.len().max(rb.len());
    for i in 0..len {
        let x = ra.get(i).copied().unwrap_or(0);
        let y = rb.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: Numeric runs ignore separators and prefixes
    ///
    /// - Input: Versions with `v` prefix, hyphen suffix, and no digits
    /// - Output: Only the digit runs are returned
    fn numeric_runs_extracts_digit_groups() {
        assert_eq!(numeric_runs("1.4.16"), vec![1, 4, 16]);
        assert_eq!(numeric_runs("v28.1.0-beta2"), vec![28, 1, 0, 2]);
        assert!(numeric_runs("latest").is_empty());
    }

    #[test]
    /// What: Comparison is numeric, not lexicographic
    ///
    /// - Input: Pairs that sort differently as strings
    /// - Output: Magnitude ordering holds
    fn compare_versions_is_numeric() {
        assert_eq!(compare_versions("10.0.0", "9.9.9"), Ordering::Greater);
        assert_eq!(compare_versions("9.10.0", "9.9.9"), Ordering::Greater);
        assert_eq!(compare_versions("1.0.9", "1.0.10"), Ordering::Less);
    }

    #[test]
    /// What: Missing trailing components count as zero
    fn compare_versions_pads_with_zero() {
        assert_eq!(compare_versions("1.2", "1.2.0"), Ordering::Equal);
        assert_eq!(compare_versions("1.2.0.1", "1.2"), Ordering::Greater);
        assert_eq!(compare_versions("", "0.0"), Ordering::Equal);
    }

    #[test]
    /// What: Oversized components saturate instead of panicking
    fn numeric_runs_saturates_on_overflow() {
        let runs = numeric_runs("99999999999999999999999.1");
        assert_eq!(runs, vec![u64::MAX, 1]);
    }
}
