//! Line-level diffing primitives shared by the summary pass and the full
//! side-by-side rendering.
//!
//! Both operations run over the same line alignment, so the fast change
//! count always equals the number of non-unchanged rows the rendering
//! produces for the same inputs.

use similar::{ChangeTag, DiffTag, TextDiff};

use crate::api::{HighlightSpan, RowKind, SideBySideRow, SideBySideTable};

/// Entry point for diff computation between two text blobs.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiffEngine;

impl DiffEngine {
    /// Construct a new diff engine instance.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Count the lines the alignment marks as changed, without building the
    /// full rendering.
    ///
    /// Returns 0 when either input is empty. For non-empty inputs the count
    /// equals the number of non-unchanged rows [`Self::render_side_by_side`]
    /// produces for the same pair.
    #[must_use]
    pub fn quick_change_count(&self, first: &str, second: &str) -> u32 {
        if first.is_empty() || second.is_empty() {
            return 0;
        }

        let diff = TextDiff::from_lines(first, second);
        let mut count = 0_usize;
        for op in diff.ops() {
            match op.tag() {
                DiffTag::Equal => {}
                DiffTag::Delete => count += op.old_range().len(),
                DiffTag::Insert => count += op.new_range().len(),
                DiffTag::Replace => count += op.old_range().len().max(op.new_range().len()),
            }
        }
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Produce the full row-aligned two-column rendering of the two texts.
    ///
    /// Context-free: every line of both inputs appears, with no collapsing
    /// of unchanged runs. Changed rows carry char-level highlight spans on
    /// both sides.
    #[must_use]
    pub fn render_side_by_side(
        &self,
        first: &str,
        second: &str,
        first_label: &str,
        second_label: &str,
    ) -> SideBySideTable {
        let first_lines: Vec<&str> = first.lines().collect();
        let second_lines: Vec<&str> = second.lines().collect();
        let line_at = |lines: &[&str], index: usize| -> String {
            lines.get(index).copied().unwrap_or_default().to_owned()
        };

        let diff = TextDiff::from_lines(first, second);
        let mut rows = Vec::new();
        for op in diff.ops() {
            let old = op.old_range();
            let new = op.new_range();
            match op.tag() {
                DiffTag::Equal => {
                    for (i, j) in old.zip(new) {
                        rows.push(unchanged_row(i, j, line_at(&first_lines, i)));
                    }
                }
                DiffTag::Delete => {
                    for i in old {
                        rows.push(deleted_row(i, line_at(&first_lines, i)));
                    }
                }
                DiffTag::Insert => {
                    for j in new {
                        rows.push(inserted_row(j, line_at(&second_lines, j)));
                    }
                }
                DiffTag::Replace => {
                    let paired = old.len().min(new.len());
                    for k in 0..paired {
                        rows.push(changed_row(
                            old.start + k,
                            new.start + k,
                            line_at(&first_lines, old.start + k),
                            line_at(&second_lines, new.start + k),
                        ));
                    }
                    for i in old.start + paired..old.end {
                        rows.push(deleted_row(i, line_at(&first_lines, i)));
                    }
                    for j in new.start + paired..new.end {
                        rows.push(inserted_row(j, line_at(&second_lines, j)));
                    }
                }
            }
        }

        SideBySideTable {
            first_label: first_label.to_owned(),
            second_label: second_label.to_owned(),
            rows,
        }
    }
}

fn unchanged_row(first_index: usize, second_index: usize, text: String) -> SideBySideRow {
    SideBySideRow {
        kind: RowKind::Unchanged,
        first_line: line_number(first_index),
        first_text: Some(text.clone()),
        first_highlights: vec![],
        second_line: line_number(second_index),
        second_text: Some(text),
        second_highlights: vec![],
    }
}

fn deleted_row(first_index: usize, text: String) -> SideBySideRow {
    SideBySideRow {
        kind: RowKind::Deleted,
        first_line: line_number(first_index),
        first_text: Some(text),
        first_highlights: vec![],
        second_line: None,
        second_text: None,
        second_highlights: vec![],
    }
}

fn inserted_row(second_index: usize, text: String) -> SideBySideRow {
    SideBySideRow {
        kind: RowKind::Inserted,
        first_line: None,
        first_text: None,
        first_highlights: vec![],
        second_line: line_number(second_index),
        second_text: Some(text),
        second_highlights: vec![],
    }
}

fn changed_row(
    first_index: usize,
    second_index: usize,
    first_text: String,
    second_text: String,
) -> SideBySideRow {
    let (first_highlights, second_highlights) = changed_spans(&first_text, &second_text);
    SideBySideRow {
        kind: RowKind::Changed,
        first_line: line_number(first_index),
        first_text: Some(first_text),
        first_highlights,
        second_line: line_number(second_index),
        second_text: Some(second_text),
        second_highlights,
    }
}

fn line_number(index: usize) -> Option<u32> {
    u32::try_from(index).ok().map(|value| value + 1)
}

/// Char-level sub-diff of one changed line pair, reduced to contiguous
/// differing spans per side.
fn changed_spans(first: &str, second: &str) -> (Vec<HighlightSpan>, Vec<HighlightSpan>) {
    let diff = TextDiff::from_chars(first, second);
    let mut first_spans = Vec::new();
    let mut second_spans = Vec::new();
    let mut first_col = 0_u32;
    let mut second_col = 0_u32;

    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Equal => {
                first_col += 1;
                second_col += 1;
            }
            ChangeTag::Delete => {
                extend_span(&mut first_spans, first_col);
                first_col += 1;
            }
            ChangeTag::Insert => {
                extend_span(&mut second_spans, second_col);
                second_col += 1;
            }
        }
    }

    (first_spans, second_spans)
}

fn extend_span(spans: &mut Vec<HighlightSpan>, column: u32) {
    if let Some(last) = spans.last_mut() {
        if last.end_column == column {
            last.end_column = column + 1;
            return;
        }
    }
    spans.push(HighlightSpan {
        start_column: column,
        end_column: column + 1,
    });
}
