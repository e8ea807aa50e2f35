//! Content splitting at page seams
//!
//! A split partitions a page's canonical plain text into a `before` and an
//! `after` chunk. The only hard guarantee is the integrity invariant: no
//! non-whitespace character may be dropped or reordered, checked by
//! [`validate_break_integrity`] before any split is committed.
//!
//! Seam policy for a run of consecutive newlines touching the split point:
//! the run is distributed evenly, first half (rounded up) trailing
//! `before`, the rest leading `after`. This keeps `before + after` equal to
//! the original character-for-character, and is deterministic.

use unicode_segmentation::UnicodeSegmentation;

/// The two chunks produced by a split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitResult {
    pub before: String,
    pub after: String,
}

/// Snap a byte position to the nearest grapheme boundary at or before it
fn snap_to_boundary(content: &str, position: usize) -> usize {
    let position = position.min(content.len());
    if position == content.len() {
        return position;
    }

    let mut snapped = 0;
    for (idx, _) in content.grapheme_indices(true) {
        if idx > position {
            break;
        }
        snapped = idx;
    }
    snapped
}

/// Split `content` at a plain-text byte offset, preserving line breaks.
///
/// `position` is clamped to `[0, len]` and snapped to a grapheme boundary,
/// so a caller-provided offset can never detach a combining mark. Empty
/// content splits into two empty chunks.
pub fn split_at(content: &str, position: usize) -> SplitResult {
    if content.is_empty() {
        return SplitResult {
            before: String::new(),
            after: String::new(),
        };
    }

    let seam = snap_to_boundary(content, position);
    let bytes = content.as_bytes();

    // Widen to the full newline run the seam lands in
    let mut run_start = seam;
    while run_start > 0 && bytes[run_start - 1] == b'\n' {
        run_start -= 1;
    }
    let mut run_end = seam;
    while run_end < bytes.len() && bytes[run_end] == b'\n' {
        run_end += 1;
    }

    let run = run_end - run_start;
    if run == 0 {
        return SplitResult {
            before: content[..seam].to_string(),
            after: content[seam..].to_string(),
        };
    }

    let to_before = run.div_ceil(2);
    let mut before = content[..run_start].to_string();
    before.extend(std::iter::repeat('\n').take(to_before));
    let mut after = "\n".repeat(run - to_before);
    after.push_str(&content[run_end..]);

    SplitResult { before, after }
}

/// Check that `before + after` carries exactly the non-whitespace character
/// sequence of `original`, in order.
///
/// This is the sole correctness gate before committing a split; on `false`
/// the caller must abort with no mutation.
pub fn validate_break_integrity(original: &str, before: &str, after: &str) -> bool {
    let original = original.chars().filter(|c| !c.is_whitespace());
    let recombined = before
        .chars()
        .chain(after.chars())
        .filter(|c| !c.is_whitespace());
    original.eq(recombined)
}

/// Partition content into at most `max_sections` chunks on paragraph
/// boundaries, used when distributing imported text across pages.
///
/// Chunks rejoined with `"\n\n"` reproduce the input exactly; the last
/// chunk absorbs any overflow.
pub fn split_into_sections(content: &str, max_sections: usize) -> Vec<String> {
    let max_sections = max_sections.max(1);
    if content.is_empty() {
        return vec![String::new()];
    }

    let paras: Vec<&str> = content.split("\n\n").collect();
    if paras.len() <= max_sections {
        return paras.iter().map(|p| p.to_string()).collect();
    }

    let total = content.chars().count();
    let target = total.div_ceil(max_sections);
    let mut sections: Vec<String> = Vec::with_capacity(max_sections);
    let mut current = String::new();

    for para in &paras {
        if !current.is_empty()
            && sections.len() + 1 < max_sections
            && current.chars().count() + para.chars().count() > target
        {
            sections.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push_str("\n\n");
        }
        current.push_str(para);
    }
    sections.push(current);

    sections
}
