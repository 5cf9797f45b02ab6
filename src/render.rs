//! Projection of aligned, folded rows into rendering instructions
//!
//! The output carries everything a rendering layer needs (line numbers,
//! change kinds, word spans, highlight flags, fold metadata) without it
//! having to re-derive any diff logic.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::align::{AlignedRow, LineContent, LineKind, SideLine};
use crate::fold::{FoldBlock, PlanEntry};

/// Two-column or single-column presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewMode {
    #[default]
    Split,
    Inline,
}

/// One column cell of a split row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderCell {
    pub number: usize,
    pub kind: LineKind,
    pub content: LineContent,
    pub highlighted: bool,
}

/// A single-column row in inline mode; a Default row shows both line
/// numbers, a changed row only its own side's
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineRow {
    pub left_number: Option<usize>,
    pub right_number: Option<usize>,
    pub kind: LineKind,
    pub content: LineContent,
    pub highlighted: bool,
}

/// Marker standing in for a collapsed run of rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldMarker {
    pub id: usize,
    /// Count of hidden rows, for an "Expand N lines" label
    pub hidden_rows: usize,
    pub left_boundary: usize,
    pub right_boundary: usize,
}

/// One rendering instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderRow {
    Split { left: Option<RenderCell>, right: Option<RenderCell> },
    Inline(InlineRow),
    Fold(FoldMarker),
}

/// Project a fold plan over aligned rows into rendering rows.
///
/// In split mode each visible row maps to one two-column row. In inline mode
/// a modification pair expands into two rows, removed side first, since a
/// single column cannot show two diverging line numbers side by side.
/// `highlights` holds composite ids (`"L-<n>"` / `"R-<n>"`); matching rows
/// get an advisory highlight flag.
pub fn project(
    rows: &[AlignedRow],
    entries: &[PlanEntry],
    mode: ViewMode,
    highlights: &FxHashSet<String>,
) -> Vec<RenderRow> {
    let mut output = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            PlanEntry::Fold(block) => output.push(RenderRow::Fold(marker(block))),
            PlanEntry::Row(index) => {
                let row = &rows[*index];
                match mode {
                    ViewMode::Split => output.push(split_row(row, highlights)),
                    ViewMode::Inline => inline_rows(row, highlights, &mut output),
                }
            }
        }
    }
    output
}

fn marker(block: &FoldBlock) -> FoldMarker {
    FoldMarker {
        id: block.id,
        hidden_rows: block.hidden_rows(),
        left_boundary: block.left_boundary,
        right_boundary: block.right_boundary,
    }
}

fn highlight_id(side: char, number: usize) -> String {
    format!("{side}-{number}")
}

fn cell(side: &SideLine, prefix: char, highlights: &FxHashSet<String>) -> RenderCell {
    RenderCell {
        number: side.number,
        kind: side.kind,
        content: side.content.clone(),
        highlighted: highlights.contains(&highlight_id(prefix, side.number)),
    }
}

fn split_row(row: &AlignedRow, highlights: &FxHashSet<String>) -> RenderRow {
    RenderRow::Split {
        left: row.left.as_ref().map(|side| cell(side, 'L', highlights)),
        right: row.right.as_ref().map(|side| cell(side, 'R', highlights)),
    }
}

fn inline_rows(row: &AlignedRow, highlights: &FxHashSet<String>, output: &mut Vec<RenderRow>) {
    if let (true, Some(left), Some(right)) = (row.is_modification(), &row.left, &row.right) {
        // Removed line first, then its added counterpart
        output.push(RenderRow::Inline(InlineRow {
            left_number: Some(left.number),
            right_number: None,
            kind: LineKind::Removed,
            content: left.content.clone(),
            highlighted: highlights.contains(&highlight_id('L', left.number)),
        }));
        output.push(RenderRow::Inline(InlineRow {
            left_number: None,
            right_number: Some(right.number),
            kind: LineKind::Added,
            content: right.content.clone(),
            highlighted: highlights.contains(&highlight_id('R', right.number)),
        }));
        return;
    }
    match (&row.left, &row.right) {
        (Some(left), Some(right)) => output.push(RenderRow::Inline(InlineRow {
            left_number: Some(left.number),
            right_number: Some(right.number),
            kind: LineKind::Default,
            content: left.content.clone(),
            highlighted: highlights.contains(&highlight_id('L', left.number))
                || highlights.contains(&highlight_id('R', right.number)),
        })),
        (Some(left), None) => output.push(RenderRow::Inline(InlineRow {
            left_number: Some(left.number),
            right_number: None,
            kind: left.kind,
            content: left.content.clone(),
            highlighted: highlights.contains(&highlight_id('L', left.number)),
        })),
        (None, Some(right)) => output.push(RenderRow::Inline(InlineRow {
            left_number: None,
            right_number: Some(right.number),
            kind: right.kind,
            content: right.content.clone(),
            highlighted: highlights.contains(&highlight_id('R', right.number)),
        })),
        (None, None) => {}
    }
}
