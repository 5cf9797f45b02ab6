//! Line alignment between two versions of a text
//!
//! Consumes the line-granularity segment diff and produces an ordered
//! sequence of aligned row pairs, each side carrying its own line number.
//! A deleted line immediately followed by an inserted line at the same
//! relative position is treated as one modified line, and the pair is
//! re-diffed at a finer granularity for word-level highlighting.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::lines::split_lines;
use crate::segment::{sequence_diff, Granularity, SegmentKind};

/// Per-line change classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineKind {
    #[default]
    Default,
    Added,
    Removed,
}

/// A span of a modified line, output of the nested word-level diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordSpan {
    pub kind: LineKind,
    pub text: String,
}

/// Content of one side of a row: plain text, or word-level spans for a
/// modified line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineContent {
    Plain(String),
    Spans(Vec<WordSpan>),
}

impl LineContent {
    /// Full line text, span kinds ignored
    pub fn text(&self) -> String {
        match self {
            LineContent::Plain(text) => text.clone(),
            LineContent::Spans(spans) => spans.iter().map(|s| s.text.as_str()).collect(),
        }
    }
}

/// One side of an aligned row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideLine {
    pub number: usize,
    pub kind: LineKind,
    pub content: LineContent,
}

impl SideLine {
    fn plain(number: usize, kind: LineKind, text: String) -> Self {
        Self { number, kind, content: LineContent::Plain(text) }
    }
}

/// The atomic unit of the aligned sequence; the index within the sequence is
/// the row's identity for fold bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignedRow {
    pub left: Option<SideLine>,
    pub right: Option<SideLine>,
}

impl AlignedRow {
    /// True when neither side changed
    pub fn is_default(&self) -> bool {
        self.left.as_ref().is_some_and(|side| side.kind == LineKind::Default)
    }

    /// True when this row pairs a removed line with its added counterpart
    pub fn is_modification(&self) -> bool {
        matches!(
            (&self.left, &self.right),
            (Some(left), Some(right))
                if left.kind == LineKind::Removed && right.kind == LineKind::Added
        )
    }
}

/// Options recognized by [`align`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignOptions {
    /// Re-diff modification pairs at `granularity` for word-level spans
    pub word_diff_enabled: bool,
    /// Granularity of the nested word-level diff
    pub granularity: Granularity,
    /// Starting left line number, for rendering a sub-range of a file
    pub left_line_offset: usize,
    /// Starting right line number
    pub right_line_offset: usize,
}

impl Default for AlignOptions {
    fn default() -> Self {
        Self {
            word_diff_enabled: true,
            granularity: Granularity::Chars,
            left_line_offset: 0,
            right_line_offset: 0,
        }
    }
}

/// Align two texts into an ordered sequence of row pairs.
///
/// Trailing whitespace of both inputs is trimmed before the outer line diff,
/// so a missing final newline never shows up as a change. Total over any two
/// strings.
pub fn align(old: &str, new: &str, options: &AlignOptions) -> Vec<AlignedRow> {
    let segments = sequence_diff(old.trim_end(), new.trim_end(), Granularity::Lines);

    let mut rows = Vec::new();
    let mut left_number = options.left_line_offset;
    let mut right_number = options.right_line_offset;
    // Inserted lines consumed as the right half of a modification pair,
    // keyed by (segment index, line index within the segment)
    let mut consumed: FxHashSet<(usize, usize)> = FxHashSet::default();

    for (seg_index, segment) in segments.iter().enumerate() {
        let lines = split_lines(&segment.text);
        match segment.kind {
            SegmentKind::Equal => {
                for line in lines {
                    left_number += 1;
                    right_number += 1;
                    rows.push(AlignedRow {
                        left: Some(SideLine::plain(left_number, LineKind::Default, line.clone())),
                        right: Some(SideLine::plain(right_number, LineKind::Default, line)),
                    });
                }
            }
            SegmentKind::Deleted => {
                let next_lines = match segments.get(seg_index + 1) {
                    Some(next) if next.kind == SegmentKind::Inserted => split_lines(&next.text),
                    _ => Vec::new(),
                };
                for (line_index, line) in lines.into_iter().enumerate() {
                    left_number += 1;
                    match next_lines.get(line_index) {
                        Some(partner) => {
                            // The Nth deleted line pairs with the Nth line of
                            // the following insert segment
                            right_number += 1;
                            consumed.insert((seg_index + 1, line_index));
                            let (left_content, right_content) = if options.word_diff_enabled {
                                word_diff(&line, partner, options.granularity)
                            } else {
                                (
                                    LineContent::Plain(line),
                                    LineContent::Plain(partner.clone()),
                                )
                            };
                            rows.push(AlignedRow {
                                left: Some(SideLine {
                                    number: left_number,
                                    kind: LineKind::Removed,
                                    content: left_content,
                                }),
                                right: Some(SideLine {
                                    number: right_number,
                                    kind: LineKind::Added,
                                    content: right_content,
                                }),
                            });
                        }
                        None => rows.push(AlignedRow {
                            left: Some(SideLine::plain(left_number, LineKind::Removed, line)),
                            right: None,
                        }),
                    }
                }
            }
            SegmentKind::Inserted => {
                for (line_index, line) in lines.into_iter().enumerate() {
                    if consumed.contains(&(seg_index, line_index)) {
                        continue;
                    }
                    right_number += 1;
                    rows.push(AlignedRow {
                        left: None,
                        right: Some(SideLine::plain(right_number, LineKind::Added, line)),
                    });
                }
            }
        }
    }
    rows
}

/// Nested finer-granularity diff of one modification pair.
///
/// Left spans concatenate to the old line, right spans to the new line.
fn word_diff(old_line: &str, new_line: &str, granularity: Granularity) -> (LineContent, LineContent) {
    let segments = sequence_diff(old_line, new_line, granularity);
    let mut left = Vec::new();
    let mut right = Vec::new();
    for segment in &segments {
        match segment.kind {
            SegmentKind::Equal => {
                left.push(WordSpan { kind: LineKind::Default, text: segment.text.clone() });
                right.push(WordSpan {
                    kind: LineKind::Default,
                    text: segment.right_text().to_owned(),
                });
            }
            SegmentKind::Deleted => {
                left.push(WordSpan { kind: LineKind::Removed, text: segment.text.clone() });
            }
            SegmentKind::Inserted => {
                right.push(WordSpan { kind: LineKind::Added, text: segment.text.clone() });
            }
        }
    }
    (LineContent::Spans(left), LineContent::Spans(right))
}
