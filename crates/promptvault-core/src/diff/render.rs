//! Hunk grouping and textual rendering of line diffs.

use super::{ChangeKind, DiffHunk, LineEntry, SideBySideLine};

/// Group line entries into hunks, keeping up to `context` unchanged lines
/// on each side of every change.
///
/// An unchanged run between two changes is kept whole when it fits inside
/// the combined context window of both hunks, that is when its length is at
/// most `2 * context`; a longer run splits the diff into separate hunks.
/// A diff with no changes at all is returned as one hunk spanning the
/// entire content.
pub(super) fn group_hunks(entries: &[LineEntry], context: usize) -> Vec<DiffHunk> {
    if entries.iter().all(|e| e.kind == ChangeKind::Unchanged) {
        return vec![DiffHunk {
            start_line1: 1,
            start_line2: 1,
            lines: entries.to_vec(),
        }];
    }

    let mut hunks: Vec<DiffHunk> = Vec::new();
    let mut current: Option<DiffHunk> = None;
    // Unchanged run accumulated since the last change (or since the start)
    let mut run: Vec<LineEntry> = Vec::new();

    for entry in entries {
        if entry.kind == ChangeKind::Unchanged {
            run.push(entry.clone());
            if current.is_none() && run.len() > context {
                run.remove(0);
            }
            continue;
        }

        if let Some(hunk) = current.as_mut() {
            if run.len() <= 2 * context {
                hunk.lines.append(&mut run);
                hunk.lines.push(entry.clone());
                continue;
            }
        }

        if let Some(mut hunk) = current.take() {
            // The run is too long to bridge: close with trailing context,
            // reopen with leading context for the next change.
            hunk.lines.extend(run.iter().take(context).cloned());
            let lead = run.split_off(run.len() - context);
            run.clear();
            hunks.push(hunk);
            current = Some(open_hunk(lead, entry));
        } else {
            current = Some(open_hunk(std::mem::take(&mut run), entry));
        }
    }

    if let Some(mut hunk) = current {
        let keep = run.len().min(context);
        hunk.lines.extend(run.into_iter().take(keep));
        hunks.push(hunk);
    }

    hunks
}

fn open_hunk(lead: Vec<LineEntry>, change: &LineEntry) -> DiffHunk {
    let (start_line1, start_line2) = start_of(lead.first().unwrap_or(change));
    let mut lines = lead;
    lines.push(change.clone());
    DiffHunk {
        start_line1,
        start_line2,
        lines,
    }
}

/// Starting line numbers for a hunk whose first entry is `first`. A change
/// entry only has a number on one side; the other side starts at the same
/// position.
fn start_of(first: &LineEntry) -> (u32, u32) {
    let fallback = first.line_number1.or(first.line_number2).unwrap_or(1);
    (
        first.line_number1.unwrap_or(fallback),
        first.line_number2.unwrap_or(fallback),
    )
}

/// Render hunks in unified diff format.
///
/// Header counts are per side: lines present in the original on the left,
/// lines present in the new content on the right.
pub(super) fn unified(hunks: &[DiffHunk]) -> String {
    let mut out = Vec::new();
    for hunk in hunks {
        let count1 = hunk
            .lines
            .iter()
            .filter(|l| l.line_number1.is_some())
            .count();
        let count2 = hunk
            .lines
            .iter()
            .filter(|l| l.line_number2.is_some())
            .count();
        out.push(format!(
            "@@ -{},{} +{},{} @@",
            hunk.start_line1, count1, hunk.start_line2, count2
        ));
        for line in &hunk.lines {
            let prefix = match line.kind {
                ChangeKind::Addition => '+',
                ChangeKind::Deletion => '-',
                ChangeKind::Unchanged | ChangeKind::Modification => ' ',
            };
            out.push(format!("{}{}", prefix, line.content));
        }
    }
    out.join("\n")
}

/// Flatten hunks into two-column rows; the missing side of an addition or
/// deletion is left empty.
pub(super) fn side_by_side(hunks: &[DiffHunk]) -> Vec<SideBySideLine> {
    hunks
        .iter()
        .flat_map(|h| &h.lines)
        .map(|line| {
            let (left_content, right_content) = match line.kind {
                ChangeKind::Addition => (String::new(), line.content.clone()),
                ChangeKind::Deletion => (line.content.clone(), String::new()),
                ChangeKind::Unchanged | ChangeKind::Modification => {
                    (line.content.clone(), line.content.clone())
                }
            };
            SideBySideLine {
                left_line_number: line.line_number1,
                left_content,
                right_line_number: line.line_number2,
                right_content,
                kind: line.kind,
            }
        })
        .collect()
}
