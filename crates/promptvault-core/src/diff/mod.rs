//! LCS-based multi-granularity text diffing.
//!
//! [`generate_diff`] compares two strings at line, word, and character
//! granularity and renders the line diff as context-grouped hunks, a unified
//! diff string, and a side-by-side listing. The function is pure and total:
//! it never fails for any pair of inputs, including empty strings.

mod lcs;
mod render;

pub use lcs::longest_common_subsequence;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// Maximal runs of non-whitespace and of whitespace, each as its own token.
static WORD_TOKENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+|\s+").unwrap());

/// Options controlling normalization and hunk grouping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    /// Collapse whitespace runs to a single space and trim before comparing.
    pub ignore_whitespace: bool,
    /// Lowercase both inputs before comparing.
    pub ignore_case: bool,
    /// Number of unchanged context lines kept around changes in each hunk.
    pub context_lines: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            ignore_whitespace: false,
            ignore_case: false,
            context_lines: 3,
        }
    }
}

/// Classification of a diff entry.
///
/// `Modification` is reserved in the summary for compatibility; the walk
/// emits adjacent deletion/addition pairs instead of merging them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Unchanged,
    Addition,
    Deletion,
    Modification,
}

/// One line of a line-level diff with original 1-based line numbers.
///
/// A line number is `None` on the side where the line does not exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineEntry {
    pub kind: ChangeKind,
    pub line_number1: Option<u32>,
    pub line_number2: Option<u32>,
    pub content: String,
}

/// One token of a word- or character-level diff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenEntry {
    pub kind: ChangeKind,
    pub content: String,
}

/// A contiguous group of line-diff entries with surrounding context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffHunk {
    /// First original line of the hunk on side 1 (1-based).
    pub start_line1: u32,
    /// First original line of the hunk on side 2 (1-based).
    pub start_line2: u32,
    pub lines: Vec<LineEntry>,
}

/// One row of the side-by-side rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideBySideLine {
    pub left_line_number: Option<u32>,
    pub left_content: String,
    pub right_line_number: Option<u32>,
    pub right_content: String,
    pub kind: ChangeKind,
}

/// Line-level change counts over the grouped hunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiffSummary {
    pub additions: usize,
    pub deletions: usize,
    pub modifications: usize,
    pub unchanged: usize,
    pub total_changes: usize,
}

/// Full comparison result across all granularities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffResult {
    pub summary: DiffSummary,
    pub line_diff: Vec<DiffHunk>,
    pub word_diff: Vec<TokenEntry>,
    pub char_diff: Vec<TokenEntry>,
    pub unified: String,
    pub side_by_side: Vec<SideBySideLine>,
}

/// Compare two text contents.
///
/// Normalization is applied identically to both inputs before any
/// tokenization; all returned content reflects the normalized text.
pub fn generate_diff(content1: &str, content2: &str, options: &DiffOptions) -> DiffResult {
    let normalized1 = normalize(content1, options);
    let normalized2 = normalize(content2, options);

    let entries = diff_lines(&normalized1, &normalized2);
    let hunks = render::group_hunks(&entries, options.context_lines);
    let summary = summarize(&hunks);
    let unified = render::unified(&hunks);
    let side_by_side = render::side_by_side(&hunks);

    let words1 = tokenize_words(&normalized1);
    let words2 = tokenize_words(&normalized2);
    let word_diff = walk_tokens(&words1, &words2);

    let chars1: Vec<char> = normalized1.chars().collect();
    let chars2: Vec<char> = normalized2.chars().collect();
    let char_diff = walk_tokens(&chars1, &chars2);

    DiffResult {
        summary,
        line_diff: hunks,
        word_diff,
        char_diff,
        unified,
        side_by_side,
    }
}

fn normalize(content: &str, options: &DiffOptions) -> String {
    let mut normalized = content.to_string();
    if options.ignore_case {
        normalized = normalized.to_lowercase();
    }
    if options.ignore_whitespace {
        normalized = WHITESPACE_RUN
            .replace_all(&normalized, " ")
            .trim()
            .to_string();
    }
    normalized
}

/// Empty content has zero lines, so empty-vs-non-empty diffs come out as a
/// pure addition or deletion block.
fn split_lines(content: &str) -> Vec<&str> {
    if content.is_empty() {
        Vec::new()
    } else {
        content.split('\n').collect()
    }
}

fn tokenize_words(content: &str) -> Vec<&str> {
    WORD_TOKENS.find_iter(content).map(|m| m.as_str()).collect()
}

/// Walk both line sequences against their LCS, classifying every position.
fn diff_lines(content1: &str, content2: &str) -> Vec<LineEntry> {
    let lines1 = split_lines(content1);
    let lines2 = split_lines(content2);
    let lcs = longest_common_subsequence(&lines1, &lines2);

    let mut entries = Vec::with_capacity(lines1.len().max(lines2.len()));
    let mut i = 0;
    let mut j = 0;
    let mut k = 0;

    while i < lines1.len() || j < lines2.len() {
        if k < lcs.len()
            && i < lines1.len()
            && j < lines2.len()
            && lines1[i] == lcs[k]
            && lines2[j] == lcs[k]
        {
            entries.push(LineEntry {
                kind: ChangeKind::Unchanged,
                line_number1: Some(i as u32 + 1),
                line_number2: Some(j as u32 + 1),
                content: lines1[i].to_string(),
            });
            i += 1;
            j += 1;
            k += 1;
        } else if i < lines1.len() && (k >= lcs.len() || lines1[i] != lcs[k]) {
            entries.push(LineEntry {
                kind: ChangeKind::Deletion,
                line_number1: Some(i as u32 + 1),
                line_number2: None,
                content: lines1[i].to_string(),
            });
            i += 1;
        } else if j < lines2.len() {
            entries.push(LineEntry {
                kind: ChangeKind::Addition,
                line_number1: None,
                line_number2: Some(j as u32 + 1),
                content: lines2[j].to_string(),
            });
            j += 1;
        } else {
            break;
        }
    }

    entries
}

/// Token-level walk shared by the word and character granularities.
fn walk_tokens<T: PartialEq + Clone + ToString>(tokens1: &[T], tokens2: &[T]) -> Vec<TokenEntry> {
    let lcs = longest_common_subsequence(tokens1, tokens2);

    let mut entries = Vec::with_capacity(tokens1.len().max(tokens2.len()));
    let mut i = 0;
    let mut j = 0;
    let mut k = 0;

    while i < tokens1.len() || j < tokens2.len() {
        if k < lcs.len()
            && i < tokens1.len()
            && j < tokens2.len()
            && tokens1[i] == lcs[k]
            && tokens2[j] == lcs[k]
        {
            entries.push(TokenEntry {
                kind: ChangeKind::Unchanged,
                content: tokens1[i].to_string(),
            });
            i += 1;
            j += 1;
            k += 1;
        } else if i < tokens1.len() && (k >= lcs.len() || tokens1[i] != lcs[k]) {
            entries.push(TokenEntry {
                kind: ChangeKind::Deletion,
                content: tokens1[i].to_string(),
            });
            i += 1;
        } else if j < tokens2.len() {
            entries.push(TokenEntry {
                kind: ChangeKind::Addition,
                content: tokens2[j].to_string(),
            });
            j += 1;
        } else {
            break;
        }
    }

    entries
}

fn summarize(hunks: &[DiffHunk]) -> DiffSummary {
    let mut summary = DiffSummary::default();
    for line in hunks.iter().flat_map(|h| &h.lines) {
        match line.kind {
            ChangeKind::Addition => summary.additions += 1,
            ChangeKind::Deletion => summary.deletions += 1,
            ChangeKind::Modification => summary.modifications += 1,
            ChangeKind::Unchanged => summary.unchanged += 1,
        }
    }
    summary.total_changes = summary.additions + summary.deletions + summary.modifications;
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_content() {
        let text = "alpha\nbeta\ngamma";
        let diff = generate_diff(text, text, &DiffOptions::default());

        assert_eq!(diff.summary.additions, 0);
        assert_eq!(diff.summary.deletions, 0);
        assert_eq!(diff.summary.total_changes, 0);
        assert_eq!(diff.summary.unchanged, 3);
        // Single hunk containing the entire unchanged sequence
        assert_eq!(diff.line_diff.len(), 1);
        assert_eq!(diff.line_diff[0].lines.len(), 3);
        assert_eq!(diff.line_diff[0].start_line1, 1);
    }

    #[test]
    fn test_single_line_change() {
        let diff = generate_diff("a\nb\nc", "a\nx\nc", &DiffOptions::default());

        assert_eq!(diff.summary.additions, 1);
        assert_eq!(diff.summary.deletions, 1);
        assert_eq!(diff.summary.modifications, 0);
        assert_eq!(diff.summary.unchanged, 2);
        assert_eq!(diff.summary.total_changes, 2);

        // Delete-then-add ordering from the LCS tie-break
        let kinds: Vec<ChangeKind> = diff.line_diff[0].lines.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ChangeKind::Unchanged,
                ChangeKind::Deletion,
                ChangeKind::Addition,
                ChangeKind::Unchanged
            ]
        );
    }

    #[test]
    fn test_line_numbers_per_side() {
        let diff = generate_diff("a\nb", "a\nc", &DiffOptions::default());
        let lines = &diff.line_diff[0].lines;

        assert_eq!(lines[0].line_number1, Some(1));
        assert_eq!(lines[0].line_number2, Some(1));

        assert_eq!(lines[1].kind, ChangeKind::Deletion);
        assert_eq!(lines[1].line_number1, Some(2));
        assert_eq!(lines[1].line_number2, None);

        assert_eq!(lines[2].kind, ChangeKind::Addition);
        assert_eq!(lines[2].line_number1, None);
        assert_eq!(lines[2].line_number2, Some(2));
    }

    #[test]
    fn test_empty_vs_non_empty() {
        let diff = generate_diff("", "a\nb\nc", &DiffOptions::default());
        assert_eq!(diff.summary.additions, 3);
        assert_eq!(diff.summary.deletions, 0);
        assert_eq!(diff.line_diff.len(), 1);

        let diff = generate_diff("a\nb\nc", "", &DiffOptions::default());
        assert_eq!(diff.summary.deletions, 3);
        assert_eq!(diff.summary.additions, 0);
        assert_eq!(diff.line_diff.len(), 1);
    }

    #[test]
    fn test_disjoint_content() {
        let diff = generate_diff("a\nb", "c\nd", &DiffOptions::default());

        let kinds: Vec<ChangeKind> = diff.line_diff[0].lines.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ChangeKind::Deletion,
                ChangeKind::Deletion,
                ChangeKind::Addition,
                ChangeKind::Addition
            ]
        );
    }

    #[test]
    fn test_cross_symmetry() {
        let a = "one\ntwo\nthree\nfour";
        let b = "one\n2\nthree\n4\nfive";

        let forward = generate_diff(a, b, &DiffOptions::default());
        let backward = generate_diff(b, a, &DiffOptions::default());

        let mut deleted: Vec<String> = forward
            .line_diff
            .iter()
            .flat_map(|h| &h.lines)
            .filter(|l| l.kind == ChangeKind::Deletion)
            .map(|l| l.content.clone())
            .collect();
        let mut added_back: Vec<String> = backward
            .line_diff
            .iter()
            .flat_map(|h| &h.lines)
            .filter(|l| l.kind == ChangeKind::Addition)
            .map(|l| l.content.clone())
            .collect();
        deleted.sort();
        added_back.sort();
        assert_eq!(deleted, added_back);
    }

    #[test]
    fn test_ignore_case() {
        let diff = generate_diff(
            "Hello World",
            "hello world",
            &DiffOptions {
                ignore_case: true,
                ..Default::default()
            },
        );
        assert_eq!(diff.summary.total_changes, 0);
        // Normalized content is returned, not the original
        assert_eq!(diff.line_diff[0].lines[0].content, "hello world");
    }

    #[test]
    fn test_ignore_whitespace() {
        let diff = generate_diff(
            "  a   b  ",
            "a b",
            &DiffOptions {
                ignore_whitespace: true,
                ..Default::default()
            },
        );
        assert_eq!(diff.summary.total_changes, 0);
    }

    #[test]
    fn test_word_diff_preserves_whitespace_tokens() {
        let diff = generate_diff("a b", "a  b", &DiffOptions::default());

        // Line-level: the lines differ; word-level keeps whitespace visible
        let deleted: Vec<&str> = diff
            .word_diff
            .iter()
            .filter(|t| t.kind == ChangeKind::Deletion)
            .map(|t| t.content.as_str())
            .collect();
        let added: Vec<&str> = diff
            .word_diff
            .iter()
            .filter(|t| t.kind == ChangeKind::Addition)
            .map(|t| t.content.as_str())
            .collect();
        assert_eq!(deleted, vec![" "]);
        assert_eq!(added, vec!["  "]);
    }

    #[test]
    fn test_char_diff() {
        let diff = generate_diff("abc", "adc", &DiffOptions::default());

        let kinds: Vec<ChangeKind> = diff.char_diff.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ChangeKind::Unchanged,
                ChangeKind::Deletion,
                ChangeKind::Addition,
                ChangeKind::Unchanged
            ]
        );
        assert_eq!(diff.char_diff[1].content, "b");
        assert_eq!(diff.char_diff[2].content, "d");
    }

    #[test]
    fn test_both_empty() {
        let diff = generate_diff("", "", &DiffOptions::default());
        assert_eq!(diff.summary.total_changes, 0);
        assert_eq!(diff.summary.unchanged, 0);
        assert_eq!(diff.line_diff.len(), 1);
        assert!(diff.line_diff[0].lines.is_empty());
    }

    #[test]
    fn test_word_diff_runs_over_full_content() {
        // Word diff covers the whole input, not just changed hunks
        let a = "same same same\nchanged here";
        let b = "same same same\nchanged there";
        let diff = generate_diff(a, b, &DiffOptions::default());

        let unchanged_words = diff
            .word_diff
            .iter()
            .filter(|t| t.kind == ChangeKind::Unchanged)
            .count();
        assert!(unchanged_words >= 4);
    }
}
