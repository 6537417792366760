use serde::{Deserialize, Serialize};

use super::mapping::MappingEntry;
use super::tree::FileSetDiff;

/// Summary line for one comparable pair whose contents differ.
///
/// An entry only exists when both blobs were fetched successfully, their
/// contents are unequal, and the fast change count is strictly positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummaryEntry {
    /// Path of the file in the first side's tree.
    pub first_path: String,
    /// Path of the file in the second side's tree.
    pub second_path: String,
    /// Number of non-unchanged rows the full rendering would produce.
    pub changed_lines: u32,
}

/// Everything the presentation layer needs after one comparison pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareReport {
    /// Ref name selected for the first side.
    pub first_ref: String,
    /// Ref name selected for the second side.
    pub second_ref: String,
    /// Partition of the two file sets.
    pub files: FileSetDiff,
    /// Snapshot of the mapping table used to build candidate pairs.
    #[serde(default)]
    pub mappings: Vec<MappingEntry>,
    /// Ordered summary of pairs with differing content.
    #[serde(default)]
    pub summary: Vec<DiffSummaryEntry>,
}

/// Classification of one aligned row in a side-by-side rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    /// Line is identical on both sides.
    Unchanged,
    /// Line exists on both sides with differing content.
    Changed,
    /// Line exists only on the second side.
    Inserted,
    /// Line exists only on the first side.
    Deleted,
}

/// Intra-line span that differs from the opposite side of a changed row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightSpan {
    /// Zero-based character column where the span begins (inclusive).
    pub start_column: u32,
    /// Zero-based character column where the span ends (exclusive).
    pub end_column: u32,
}

/// One aligned row of the side-by-side table.
///
/// Line numbers and text are absent on the side that has no corresponding
/// line (the right side of a deleted row, the left side of an inserted row).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideBySideRow {
    /// The role the row plays in the alignment.
    pub kind: RowKind,
    /// 1-based line number on the first side, if present.
    #[serde(default)]
    pub first_line: Option<u32>,
    /// Text of the line on the first side, if present.
    #[serde(default)]
    pub first_text: Option<String>,
    /// Differing spans within the first side's line of a changed row.
    #[serde(default)]
    pub first_highlights: Vec<HighlightSpan>,
    /// 1-based line number on the second side, if present.
    #[serde(default)]
    pub second_line: Option<u32>,
    /// Text of the line on the second side, if present.
    #[serde(default)]
    pub second_text: Option<String>,
    /// Differing spans within the second side's line of a changed row.
    #[serde(default)]
    pub second_highlights: Vec<HighlightSpan>,
}

/// Full row-aligned two-column rendering of one comparable pair.
///
/// Context-free: every line of both inputs appears, with no collapsing of
/// unchanged runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideBySideTable {
    /// Column heading for the first side (e.g., `main:src/lib.rs`).
    pub first_label: String,
    /// Column heading for the second side.
    pub second_label: String,
    /// Aligned rows in original order.
    #[serde(default)]
    pub rows: Vec<SideBySideRow>,
}

impl SideBySideTable {
    /// Number of rows that are not classified as unchanged.
    #[must_use]
    pub fn changed_row_count(&self) -> u32 {
        let count = self
            .rows
            .iter()
            .filter(|row| row.kind != RowKind::Unchanged)
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_report_round_trip() {
        let report = CompareReport {
            first_ref: "origin/main".into(),
            second_ref: "v2.0".into(),
            files: FileSetDiff {
                only_in_first: vec!["legacy.rs".into()],
                only_in_second: vec!["modern.rs".into()],
                common: vec!["shared.rs".into()],
            },
            mappings: vec![MappingEntry::new("legacy.rs", "modern.rs")],
            summary: vec![DiffSummaryEntry {
                first_path: "shared.rs".into(),
                second_path: "shared.rs".into(),
                changed_lines: 3,
            }],
        };

        let json = serde_json::to_string_pretty(&report).expect("serialize report");
        let decoded: CompareReport = serde_json::from_str(&json).expect("deserialize report");
        assert_eq!(report, decoded);
    }

    #[test]
    fn report_defaults_are_applied() {
        let json = r#"{
            "first_ref": "origin/main",
            "second_ref": "origin/dev",
            "files": {}
        }"#;
        let report: CompareReport = serde_json::from_str(json).expect("deserialize with defaults");
        assert!(report.mappings.is_empty());
        assert!(report.summary.is_empty());
    }

    #[test]
    fn row_kind_uses_snake_case() {
        let json = serde_json::to_string(&RowKind::Unchanged).expect("serialize kind");
        assert_eq!(json, "\"unchanged\"");
        let kind: RowKind = serde_json::from_str("\"inserted\"").expect("deserialize kind");
        assert_eq!(kind, RowKind::Inserted);
    }

    #[test]
    fn changed_row_count_skips_unchanged() {
        let table = SideBySideTable {
            first_label: "a".into(),
            second_label: "b".into(),
            rows: vec![
                SideBySideRow {
                    kind: RowKind::Unchanged,
                    first_line: Some(1),
                    first_text: Some("same".into()),
                    first_highlights: vec![],
                    second_line: Some(1),
                    second_text: Some("same".into()),
                    second_highlights: vec![],
                },
                SideBySideRow {
                    kind: RowKind::Deleted,
                    first_line: Some(2),
                    first_text: Some("gone".into()),
                    first_highlights: vec![],
                    second_line: None,
                    second_text: None,
                    second_highlights: vec![],
                },
            ],
        };
        assert_eq!(table.changed_row_count(), 1);
    }

    #[test]
    fn highlight_span_bounds() {
        let span = HighlightSpan {
            start_column: 4,
            end_column: 9,
        };
        assert!(span.start_column < span.end_column);
    }
}
