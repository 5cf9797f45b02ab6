//! Fold planning for long unchanged regions
//!
//! Partitions the aligned row sequence into visible rows and collapsible
//! fold blocks. Expansion state is owned by the caller and passed in as a
//! set of stable fold ids, so planning stays a pure function.

use std::ops::Range;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::align::AlignedRow;

/// A contiguous run of unchanged rows eligible for collapsing.
///
/// `id` is the index of the first hidden row, which is stable across
/// re-plans of the same diff, so expansion state survives re-renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldBlock {
    pub id: usize,
    /// Hidden row indices; contiguous and non-empty
    pub rows: Range<usize>,
    /// First visible left line number after the fold (last hidden left line
    /// for a fold that ends the sequence)
    pub left_boundary: usize,
    /// Same for the right side
    pub right_boundary: usize,
}

impl FoldBlock {
    /// Number of rows this fold hides
    pub fn hidden_rows(&self) -> usize {
        self.rows.len()
    }
}

/// One slot of a fold plan: a visible row or a collapsed block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanEntry {
    Row(usize),
    Fold(FoldBlock),
}

/// Plan which rows are visible and which collapse into folds.
///
/// With `show_diff_only` false every row stays visible. Otherwise each
/// maximal run of unchanged rows keeps `context_size` rows next to any
/// adjacent change and hides the rest, unless its id is in `expanded`.
/// Runs too short to hide anything are emitted as plain rows.
pub fn plan(
    rows: &[AlignedRow],
    context_size: usize,
    show_diff_only: bool,
    expanded: &FxHashSet<usize>,
) -> Vec<PlanEntry> {
    let mut entries = Vec::with_capacity(rows.len());
    if !show_diff_only {
        entries.extend((0..rows.len()).map(PlanEntry::Row));
        return entries;
    }

    let mut index = 0;
    while index < rows.len() {
        if !rows[index].is_default() {
            entries.push(PlanEntry::Row(index));
            index += 1;
            continue;
        }

        // Maximal run of unchanged rows
        let start = index;
        while index < rows.len() && rows[index].is_default() {
            index += 1;
        }
        let end = index;

        match hidden_range(rows.len(), start, end, context_size) {
            Some(hidden) if !expanded.contains(&hidden.start) => {
                entries.extend((start..hidden.start).map(PlanEntry::Row));
                entries.push(PlanEntry::Fold(fold_block(rows, hidden.clone())));
                entries.extend((hidden.end..end).map(PlanEntry::Row));
            }
            _ => entries.extend((start..end).map(PlanEntry::Row)),
        }
    }
    entries
}

/// All fold candidates of a row sequence, ignoring expansion state
pub fn fold_blocks(rows: &[AlignedRow], context_size: usize) -> Vec<FoldBlock> {
    plan(rows, context_size, true, &FxHashSet::default())
        .into_iter()
        .filter_map(|entry| match entry {
            PlanEntry::Fold(block) => Some(block),
            PlanEntry::Row(_) => None,
        })
        .collect()
}

/// Which part of the run `start..end` gets hidden, if any.
///
/// Context is only owed to an adjacent change: a run touching a boundary of
/// the sequence folds fully up to that boundary, so a trailing run hiding a
/// single row still produces a fold. A run covering the entire sequence has
/// no change to anchor to and only folds once it is longer than both context
/// windows combined.
fn hidden_range(total: usize, start: usize, end: usize, context_size: usize) -> Option<Range<usize>> {
    let touches_start = start == 0;
    let touches_end = end == total;
    let len = end - start;
    if touches_start && touches_end {
        if len < 2 * context_size + 1 {
            return None;
        }
        return Some(start..end);
    }
    let hidden_start = if touches_start { start } else { start + context_size };
    let hidden_end = if touches_end { end } else { end.saturating_sub(context_size) };
    if hidden_start < hidden_end {
        Some(hidden_start..hidden_end)
    } else {
        None
    }
}

fn fold_block(rows: &[AlignedRow], hidden: Range<usize>) -> FoldBlock {
    let left_boundary = boundary(rows, &hidden, |row| row.left.as_ref().map(|s| s.number));
    let right_boundary = boundary(rows, &hidden, |row| row.right.as_ref().map(|s| s.number));
    FoldBlock { id: hidden.start, rows: hidden, left_boundary, right_boundary }
}

/// Line number shown on the fold marker: the first one following the fold,
/// falling back to the last hidden one when the fold ends the sequence.
fn boundary(
    rows: &[AlignedRow],
    hidden: &Range<usize>,
    number: impl Fn(&AlignedRow) -> Option<usize>,
) -> usize {
    rows[hidden.end..]
        .iter()
        .find_map(&number)
        .or_else(|| rows[hidden.start..hidden.end].iter().rev().find_map(&number))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::{align, AlignOptions};

    fn rows_for(old: &str, new: &str) -> Vec<AlignedRow> {
        align(old, new, &AlignOptions::default())
    }

    fn numbered(count: usize, prefix: &str) -> String {
        (1..=count).map(|i| format!("{prefix}{i}")).collect::<Vec<_>>().join("\n")
    }

    /// 100 identical lines, one change, 100 identical lines
    fn long_fixture() -> (String, String) {
        let prefix = numbered(100, "p");
        let suffix = numbered(100, "s");
        let old = format!("{prefix}\nOLD\n{suffix}");
        let new = format!("{prefix}\nNEW\n{suffix}");
        (old, new)
    }

    #[test]
    fn test_show_all_passes_rows_through() {
        let rows = rows_for(&numbered(10, "l"), &numbered(10, "l"));
        let entries = plan(&rows, 3, false, &FxHashSet::default());
        assert_eq!(entries.len(), 10);
        assert!(entries.iter().all(|e| matches!(e, PlanEntry::Row(_))));
    }

    #[test]
    fn test_short_identical_file_folds_nothing() {
        let rows = rows_for("a\nb\nc", "a\nb\nc");
        let entries = plan(&rows, 3, true, &FxHashSet::default());
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| matches!(e, PlanEntry::Row(_))));
    }

    #[test]
    fn test_long_identical_file_folds_entirely() {
        let text = numbered(20, "l");
        let rows = rows_for(&text, &text);
        let entries = plan(&rows, 3, true, &FxHashSet::default());
        assert_eq!(entries.len(), 1);
        let PlanEntry::Fold(block) = &entries[0] else { panic!("expected a fold") };
        assert_eq!(block.rows, 0..20);
    }

    #[test]
    fn test_context_windows_around_a_change() {
        let (old, new) = long_fixture();
        let rows = rows_for(&old, &new);
        assert_eq!(rows.len(), 201);

        let blocks = fold_blocks(&rows, 3);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].rows, 0..97);
        assert_eq!(blocks[1].rows, 104..201);
        assert_eq!(blocks[0].hidden_rows(), 97);
        assert_eq!(blocks[1].hidden_rows(), 97);

        // 3 context rows either side of the modification stay visible
        let entries = plan(&rows, 3, true, &FxHashSet::default());
        let visible = entries.iter().filter(|e| matches!(e, PlanEntry::Row(_))).count();
        assert_eq!(visible, 7);
    }

    #[test]
    fn test_fold_boundaries_carry_following_line_numbers() {
        let (old, new) = long_fixture();
        let rows = rows_for(&old, &new);
        let blocks = fold_blocks(&rows, 3);
        // First visible row after the leading fold is line 98 on both sides
        assert_eq!(blocks[0].left_boundary, 98);
        assert_eq!(blocks[0].right_boundary, 98);
        // Trailing fold ends the sequence; boundary falls back to the last
        // hidden line
        assert_eq!(blocks[1].left_boundary, 201);
        assert_eq!(blocks[1].right_boundary, 201);
    }

    #[test]
    fn test_expanding_a_fold_reveals_exactly_its_rows() {
        let (old, new) = long_fixture();
        let rows = rows_for(&old, &new);
        let blocks = fold_blocks(&rows, 3);

        let mut expanded = FxHashSet::default();
        expanded.insert(blocks[0].id);
        let entries = plan(&rows, 3, true, &expanded);

        let folds: Vec<&FoldBlock> = entries
            .iter()
            .filter_map(|e| match e {
                PlanEntry::Fold(block) => Some(block),
                PlanEntry::Row(_) => None,
            })
            .collect();
        assert_eq!(folds.len(), 1);
        assert_eq!(folds[0].id, blocks[1].id);

        let visible = entries.iter().filter(|e| matches!(e, PlanEntry::Row(_))).count();
        assert_eq!(visible, 7 + 97);
    }

    #[test]
    fn test_plan_is_idempotent() {
        let (old, new) = long_fixture();
        let rows = rows_for(&old, &new);
        let mut expanded = FxHashSet::default();
        expanded.insert(0);
        let first = plan(&rows, 3, true, &expanded);
        let second = plan(&rows, 3, true, &expanded);
        assert_eq!(first, second);
    }

    #[test]
    fn test_fold_completeness() {
        let (old, new) = long_fixture();
        let rows = rows_for(&old, &new);
        for expanded_ids in [vec![], vec![0]] {
            let expanded: FxHashSet<usize> = expanded_ids.into_iter().collect();
            let entries = plan(&rows, 3, true, &expanded);
            let mut seen = vec![0usize; rows.len()];
            for entry in &entries {
                match entry {
                    PlanEntry::Row(i) => seen[*i] += 1,
                    PlanEntry::Fold(block) => {
                        for i in block.rows.clone() {
                            seen[i] += 1;
                        }
                    }
                }
            }
            assert!(seen.iter().all(|&count| count == 1));
        }
    }

    #[test]
    fn test_trailing_run_hiding_one_row_still_folds() {
        // Change followed by exactly context_size + 1 unchanged rows
        let old = format!("OLD\n{}", numbered(4, "t"));
        let new = format!("NEW\n{}", numbered(4, "t"));
        let rows = rows_for(&old, &new);
        assert_eq!(rows.len(), 5);
        let blocks = fold_blocks(&rows, 3);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].rows, 4..5);
        assert_eq!(blocks[0].hidden_rows(), 1);
    }

    #[test]
    fn test_run_within_context_of_both_ends_stays_visible() {
        // Interior unchanged run of 2*context rows hides nothing
        let old = format!("OLD1\n{}\nOLD2", numbered(6, "m"));
        let new = format!("NEW1\n{}\nNEW2", numbered(6, "m"));
        let rows = rows_for(&old, &new);
        let blocks = fold_blocks(&rows, 3);
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_interior_run_of_minimum_length_hides_one_row() {
        let old = format!("OLD1\n{}\nOLD2", numbered(7, "m"));
        let new = format!("NEW1\n{}\nNEW2", numbered(7, "m"));
        let rows = rows_for(&old, &new);
        let blocks = fold_blocks(&rows, 3);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].rows, 4..5);
    }

    #[test]
    fn test_leading_run_folds_up_to_the_start() {
        let old = format!("{}\nOLD", numbered(10, "h"));
        let new = format!("{}\nNEW", numbered(10, "h"));
        let rows = rows_for(&old, &new);
        let blocks = fold_blocks(&rows, 3);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].rows, 0..7);
        assert_eq!(blocks[0].id, 0);
    }

    #[test]
    fn test_fold_ids_stable_across_replans() {
        let (old, new) = long_fixture();
        let rows = rows_for(&old, &new);
        let before: Vec<usize> = fold_blocks(&rows, 3).iter().map(|b| b.id).collect();
        let again: Vec<usize> = fold_blocks(&rows, 3).iter().map(|b| b.id).collect();
        assert_eq!(before, again);
    }

    #[test]
    fn test_zero_context_keeps_changes_visible() {
        let (old, new) = long_fixture();
        let rows = rows_for(&old, &new);
        let entries = plan(&rows, 0, true, &FxHashSet::default());
        let visible = entries.iter().filter(|e| matches!(e, PlanEntry::Row(_))).count();
        assert_eq!(visible, 1);
    }
}
