//! Granularity-parameterized sequence diffing on top of imara-diff

use std::ops::Range;

use imara_diff::{Algorithm, Diff, InternedInput, TokenSource};
use serde::{Deserialize, Serialize};

/// The unit of comparison for a diff call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Granularity {
    /// One token per character
    #[default]
    Chars,
    /// Word, whitespace and punctuation tokens; whitespace runs compare equal
    Words,
    /// Word, whitespace and punctuation tokens; whitespace is significant
    WordsWithSpace,
    /// One token per line, newline terminator included
    Lines,
    /// Line tokens compared after trimming surrounding whitespace
    TrimmedLines,
    /// Tokens end after `.` `!` `?` followed by whitespace, or at a newline
    Sentences,
}

/// Classification of a diff segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentKind {
    Equal,
    Inserted,
    Deleted,
}

/// A maximal run of tokens sharing one classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSegment {
    pub kind: SegmentKind,
    /// Old-side view for Equal and Deleted segments, new-side view for Inserted
    pub text: String,
    /// New-side view of an Equal segment when it differs from the old side
    /// (whitespace-insensitive granularities only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) counterpart: Option<String>,
}

impl DiffSegment {
    fn equal(text: String, counterpart: String) -> Self {
        let counterpart = if counterpart == text { None } else { Some(counterpart) };
        Self { kind: SegmentKind::Equal, text, counterpart }
    }

    fn changed(kind: SegmentKind, text: String) -> Self {
        Self { kind, text, counterpart: None }
    }

    /// New-side view of this segment
    pub(crate) fn right_text(&self) -> &str {
        self.counterpart.as_deref().unwrap_or(&self.text)
    }
}

/// Diff two strings at the given granularity.
///
/// Concatenating the old-side views of all Equal and Deleted segments
/// reconstructs `old` exactly; the new-side views of all Equal and Inserted
/// segments reconstruct `new`. Adjacent segments never share a kind.
pub fn sequence_diff(old: &str, new: &str, granularity: Granularity) -> Vec<DiffSegment> {
    let (old_tokens, old_keys) = tokenize(old, granularity);
    let (new_tokens, new_keys) = tokenize(new, granularity);

    let input = InternedInput::new(Tokens(&old_keys), Tokens(&new_keys));
    let diff = Diff::compute(Algorithm::Histogram, &input);

    let mut collector = SegmentCollector {
        old_tokens: &old_tokens,
        new_tokens: &new_tokens,
        pos_old: 0,
        pos_new: 0,
        segments: Vec::new(),
    };
    for hunk in diff.hunks() {
        collector.process_change(hunk.before, hunk.after);
    }
    collector.finish()
}

/// Pre-tokenized input for the interner
struct Tokens<'a>(&'a [&'a str]);

impl<'a> TokenSource for Tokens<'a> {
    type Token = &'a str;
    type Tokenizer = std::iter::Copied<std::slice::Iter<'a, &'a str>>;

    fn tokenize(&self) -> Self::Tokenizer {
        self.0.iter().copied()
    }

    fn estimate_tokens(&self) -> u32 {
        self.0.len() as u32
    }
}

/// Collects imara-diff change hunks back into covering segments.
///
/// imara-diff reports only the changed ranges; the gaps between consecutive
/// hunks are the Equal runs, and a trailing Equal run follows the last hunk.
/// Raw token slices are kept per side so segment text is rebuilt from the
/// originating input even when the interned keys were normalized (Words,
/// TrimmedLines).
struct SegmentCollector<'a> {
    old_tokens: &'a [&'a str],
    new_tokens: &'a [&'a str],
    pos_old: u32,
    pos_new: u32,
    segments: Vec<DiffSegment>,
}

impl SegmentCollector<'_> {
    fn push_equal(&mut self, old_end: u32, new_end: u32) {
        if old_end > self.pos_old {
            let text = concat(self.old_tokens, self.pos_old..old_end);
            let counterpart = concat(self.new_tokens, self.pos_new..new_end);
            self.segments.push(DiffSegment::equal(text, counterpart));
        }
    }

    fn process_change(&mut self, before: Range<u32>, after: Range<u32>) {
        self.push_equal(before.start, after.start);
        if !before.is_empty() {
            let text = concat(self.old_tokens, before.clone());
            self.segments.push(DiffSegment::changed(SegmentKind::Deleted, text));
        }
        if !after.is_empty() {
            let text = concat(self.new_tokens, after.clone());
            self.segments.push(DiffSegment::changed(SegmentKind::Inserted, text));
        }
        self.pos_old = before.end;
        self.pos_new = after.end;
    }

    fn finish(mut self) -> Vec<DiffSegment> {
        self.push_equal(self.old_tokens.len() as u32, self.new_tokens.len() as u32);
        self.segments
    }
}

fn concat(tokens: &[&str], range: Range<u32>) -> String {
    tokens[range.start as usize..range.end as usize].concat()
}

/// Split `text` into raw tokens plus the equality keys fed to the interner.
///
/// Raw tokens always partition the input completely. Keys equal the raw
/// tokens except where a granularity normalizes comparison: Words collapses
/// whitespace runs to a single space, TrimmedLines trims each line.
fn tokenize(text: &str, granularity: Granularity) -> (Vec<&str>, Vec<&str>) {
    let raw = match granularity {
        Granularity::Chars => char_tokens(text),
        Granularity::Words | Granularity::WordsWithSpace => word_tokens(text),
        Granularity::Lines | Granularity::TrimmedLines => line_tokens(text),
        Granularity::Sentences => sentence_tokens(text),
    };
    let keys = match granularity {
        Granularity::Words => raw
            .iter()
            .map(|t| if t.chars().all(char::is_whitespace) && !t.is_empty() { " " } else { *t })
            .collect(),
        Granularity::TrimmedLines => raw.iter().map(|t| t.trim()).collect(),
        _ => raw.clone(),
    };
    (raw, keys)
}

fn char_tokens(text: &str) -> Vec<&str> {
    let mut tokens = Vec::with_capacity(text.len());
    let mut iter = text.char_indices().peekable();
    while let Some((start, _)) = iter.next() {
        let end = iter.peek().map_or(text.len(), |&(next, _)| next);
        tokens.push(&text[start..end]);
    }
    tokens
}

#[derive(PartialEq, Eq, Clone, Copy)]
enum CharClass {
    Word,
    Space,
    Other,
}

fn class_of(c: char) -> CharClass {
    if c.is_alphanumeric() || c == '_' {
        CharClass::Word
    } else if c.is_whitespace() {
        CharClass::Space
    } else {
        CharClass::Other
    }
}

/// Runs of word characters, runs of whitespace, punctuation one char each
fn word_tokens(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut current: Option<CharClass> = None;
    for (i, c) in text.char_indices() {
        let class = class_of(c);
        let breaks = match current {
            None => false,
            Some(prev) => prev != class || prev == CharClass::Other,
        };
        if breaks {
            tokens.push(&text[start..i]);
            start = i;
        }
        current = Some(class);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}

/// One token per line, `\n` terminators attached
fn line_tokens(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

/// Tokens end after `.` `!` `?` when followed by whitespace, or at `\n`
fn sentence_tokens(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let end_here = match c {
            '\n' => true,
            '.' | '!' | '?' => chars.peek().map_or(true, |&(_, next)| next.is_whitespace()),
            _ => false,
        };
        if end_here {
            let end = i + c.len_utf8();
            tokens.push(&text[start..end]);
            start = end;
        }
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}
