//! Public entry points and session state
//!
//! Alignment, fold planning and projection are pure; the only state worth
//! keeping between calls is which folds the user opened and the memoized
//! aligned rows, both scoped to one `(old, new)` pair. `DiffSession` owns
//! exactly that.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::align::{align, AlignOptions, AlignedRow};
use crate::fold::{fold_blocks, plan, FoldBlock};
use crate::render::{project, RenderRow, ViewMode};
use crate::segment::Granularity;

#[derive(Error, Debug)]
pub enum DiffError {
    #[error("Input is not valid UTF-8 text: {0}")]
    InvalidInput(#[from] std::str::Utf8Error),
}

/// Everything the engine recognizes about how to diff and present
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffOptions {
    pub word_diff_enabled: bool,
    pub granularity: Granularity,
    /// Unchanged rows kept visible next to each change
    pub context_size: usize,
    /// Collapse long unchanged runs into folds
    pub show_diff_only: bool,
    pub left_line_offset: usize,
    pub right_line_offset: usize,
    pub view_mode: ViewMode,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            word_diff_enabled: true,
            granularity: Granularity::Chars,
            context_size: 3,
            show_diff_only: true,
            left_line_offset: 0,
            right_line_offset: 0,
            view_mode: ViewMode::Split,
        }
    }
}

impl DiffOptions {
    fn align_options(&self) -> AlignOptions {
        AlignOptions {
            word_diff_enabled: self.word_diff_enabled,
            granularity: self.granularity,
            left_line_offset: self.left_line_offset,
            right_line_offset: self.right_line_offset,
        }
    }

    /// True when `other` would produce the same aligned rows, so an existing
    /// alignment can be reused
    fn same_alignment(&self, other: &Self) -> bool {
        self.align_options() == other.align_options()
    }
}

/// Aligned rows plus every fold candidate of the diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineInformation {
    pub rows: Vec<AlignedRow>,
    pub fold_blocks: Vec<FoldBlock>,
}

/// Align two texts and report the fold candidates.
///
/// Total over any two strings; empty, identical or binary-looking inputs
/// all have well-defined output.
pub fn compute_line_information(old: &str, new: &str, options: &DiffOptions) -> LineInformation {
    let rows = align(old, new, &options.align_options());
    let fold_blocks = fold_blocks(&rows, options.context_size);
    LineInformation { rows, fold_blocks }
}

/// Byte-level entry point; fails with [`DiffError::InvalidInput`] before any
/// processing when either input is not text
pub fn compute_line_information_bytes(
    old: &[u8],
    new: &[u8],
    options: &DiffOptions,
) -> Result<LineInformation, DiffError> {
    let old = std::str::from_utf8(old)?;
    let new = std::str::from_utf8(new)?;
    Ok(compute_line_information(old, new, options))
}

/// One diff being viewed interactively.
///
/// Re-renders are cheap: the aligned rows are derived once per
/// `(old, new, alignment options)` and reused across view-mode toggles and
/// fold expansions. Expansion state is keyed by stable fold ids and survives
/// until new texts are supplied.
#[derive(Debug, Clone)]
pub struct DiffSession {
    old: String,
    new: String,
    options: DiffOptions,
    rows: Vec<AlignedRow>,
    expanded: FxHashSet<usize>,
}

impl DiffSession {
    pub fn new(old: impl Into<String>, new: impl Into<String>, options: DiffOptions) -> Self {
        let old = old.into();
        let new = new.into();
        let rows = align(&old, &new, &options.align_options());
        Self { old, new, options, rows, expanded: FxHashSet::default() }
    }

    pub fn from_bytes(old: &[u8], new: &[u8], options: DiffOptions) -> Result<Self, DiffError> {
        let old = std::str::from_utf8(old)?;
        let new = std::str::from_utf8(new)?;
        Ok(Self::new(old, new, options))
    }

    /// Swap in a new pair of texts, re-deriving the alignment and clearing
    /// fold-expansion state
    pub fn set_texts(&mut self, old: impl Into<String>, new: impl Into<String>) {
        self.old = old.into();
        self.new = new.into();
        self.rows = align(&self.old, &self.new, &self.options.align_options());
        self.expanded.clear();
    }

    /// Change presentation options; the alignment is only recomputed when an
    /// alignment-relevant option actually changed
    pub fn set_options(&mut self, options: DiffOptions) {
        let realign = !self.options.same_alignment(&options);
        self.options = options;
        if realign {
            self.rows = align(&self.old, &self.new, &self.options.align_options());
        }
    }

    pub fn options(&self) -> &DiffOptions {
        &self.options
    }

    pub fn rows(&self) -> &[AlignedRow] {
        &self.rows
    }

    /// Fold candidates for the current diff, ignoring expansion state
    pub fn fold_blocks(&self) -> Vec<FoldBlock> {
        fold_blocks(&self.rows, self.options.context_size)
    }

    /// Mark a fold as opened. Returns false for an unknown id. Expansion is
    /// monotonic: an opened fold stays open for the rest of the session.
    pub fn expand_fold(&mut self, id: usize) -> bool {
        if self.fold_blocks().iter().any(|block| block.id == id) {
            self.expanded.insert(id);
            true
        } else {
            false
        }
    }

    /// Ids of folds opened so far
    pub fn expanded_folds(&self) -> &FxHashSet<usize> {
        &self.expanded
    }

    pub fn render(&self) -> Vec<RenderRow> {
        self.render_highlighted(&FxHashSet::default())
    }

    /// Render with advisory highlight flags for rows whose composite id
    /// (`"L-<n>"` / `"R-<n>"`) appears in `highlights`
    pub fn render_highlighted(&self, highlights: &FxHashSet<String>) -> Vec<RenderRow> {
        let entries = plan(
            &self.rows,
            self.options.context_size,
            self.options.show_diff_only,
            &self.expanded,
        );
        project(&self.rows, &entries, self.options.view_mode, highlights)
    }
}
