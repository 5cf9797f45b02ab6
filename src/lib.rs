//! Line-diff alignment and presentation engine
//!
//! Takes two versions of a text and produces a structured, line-by-line
//! alignment suitable for rendering as a side-by-side or unified diff view:
//! independent line numbers per side, word-level highlighting of modified
//! lines, and collapsible folds over long unchanged regions.
//!
//! The pipeline runs strictly downstream: a granularity-parameterized
//! sequence diff ([`sequence_diff`]) feeds the line aligner ([`align`]),
//! whose rows feed the fold planner ([`plan`]) and finally the projector
//! ([`project`]). [`DiffSession`] ties the stages together and keeps the
//! only state there is: memoized alignment and which folds the user opened.
//!
//! ```
//! use diffpane::{DiffOptions, DiffSession, RenderRow};
//!
//! let session = DiffSession::new("a\nfoo\nb", "a\nbar\nb", DiffOptions::default());
//! let rendered = session.render();
//! assert!(rendered.iter().all(|row| matches!(row, RenderRow::Split { .. })));
//! ```

mod align;
mod fold;
mod lines;
mod render;
mod segment;
mod session;

pub use align::{align, AlignOptions, AlignedRow, LineContent, LineKind, SideLine, WordSpan};
pub use fold::{fold_blocks, plan, FoldBlock, PlanEntry};
pub use lines::split_lines;
pub use render::{project, FoldMarker, InlineRow, RenderCell, RenderRow, ViewMode};
pub use segment::{sequence_diff, DiffSegment, Granularity, SegmentKind};
pub use session::{
    compute_line_information, compute_line_information_bytes, DiffError, DiffOptions, DiffSession,
    LineInformation,
};
