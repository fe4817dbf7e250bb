//! Line-level surgery over the in-progress document buffer.
//!
//! Every function here is a pure `&str -> String` transformation, and every
//! one degrades to a passthrough when a required argument is empty or a
//! position is out of range — a failed lookup never aborts the conversion,
//! it just leaves the buffer as it was.

use rustc_hash::FxHashSet;

use crate::tag::MarkerKind;

/// Anchor markers whose line has already had its indentation halved.
///
/// The halving transform must run at most once per marker even when the
/// marker text recurs; the set grows monotonically during one document
/// conversion and is discarded with it.
pub type IndentRecord = FxHashSet<String>;

/// The `data-attr` needle that identifies a marker line of `kind`.
///
/// The closing quote and element end are part of the needle, so
/// `list-content` never matches a `list-content-asset` marker.
fn marker_needle(kind: MarkerKind) -> String {
    format!("data-attr=\"{kind}\"></span>")
}

fn line_has_marker(line: &str, kind: MarkerKind) -> bool {
    line.contains(&marker_needle(kind))
}

/// Splice `text` into `content` before byte position `pos`.
///
/// A no-op when `text` or `content` is empty or `pos` is not a valid
/// position in `content`.
#[must_use]
pub fn insert_before(content: &str, pos: usize, text: &str) -> String {
    if content.is_empty() || text.is_empty() {
        return content.to_string();
    }
    match (content.get(..pos), content.get(pos..)) {
        (Some(head), Some(tail)) => format!("{head}{text}{tail}"),
        _ => content.to_string(),
    }
}

/// Drop every line that contains `needle` verbatim.
#[must_use]
pub fn delete_lines_containing(content: &str, needle: &str) -> String {
    if content.is_empty() || needle.is_empty() {
        return content.to_string();
    }
    content
        .split('\n')
        .filter(|line| !line.contains(needle))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Delete the maximal run of empty lines immediately above the first line
/// containing `needle`.
#[must_use]
pub fn delete_blank_run_above(content: &str, needle: &str) -> String {
    if content.is_empty() || needle.is_empty() {
        return content.to_string();
    }
    let mut lines: Vec<&str> = content.split('\n').collect();
    let Some(target) = lines.iter().position(|line| line.contains(needle)) else {
        return content.to_string();
    };
    let mut start = target;
    while start > 0 && lines.get(start - 1).is_some_and(|line| line.is_empty()) {
        start -= 1;
    }
    if start < target {
        lines.drain(start..target);
    }
    lines.join("\n")
}

/// Tighten runs of sibling list content.
///
/// Lines carrying a `kind` marker are paired up consecutively (1st–2nd,
/// 3rd–4th, …); blank lines strictly between a pair are deleted, unless a
/// line carrying one of the `excluded` markers falls strictly inside the
/// span, in which case that pair is left untouched. Fewer than two marker
/// lines means there is nothing to tighten.
#[must_use]
pub fn delete_blank_between_marker_pairs(
    content: &str,
    kind: MarkerKind,
    excluded: &[MarkerKind],
) -> String {
    if content.is_empty() {
        return content.to_string();
    }
    let lines: Vec<&str> = content.split('\n').collect();
    let targets: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line_has_marker(line, kind))
        .map(|(i, _)| i)
        .collect();
    if targets.len() < 2 {
        return content.to_string();
    }
    let blockers: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| excluded.iter().any(|&k| line_has_marker(line, k)))
        .map(|(i, _)| i)
        .collect();

    let mut doomed: FxHashSet<usize> = FxHashSet::default();
    for pair in targets.chunks(2) {
        let (Some(&start), Some(&end)) = (pair.first(), pair.get(1)) else {
            break;
        };
        if blockers.iter().any(|&b| start < b && b < end) {
            continue;
        }
        for (i, line) in lines.iter().enumerate().take(end).skip(start + 1) {
            if line.is_empty() {
                doomed.insert(i);
            }
        }
    }
    lines
        .iter()
        .enumerate()
        .filter(|(i, _)| !doomed.contains(i))
        .map(|(_, line)| *line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Make sure every line carrying a `kind` marker is followed by a blank
/// line, inserting one where missing. Idempotent.
#[must_use]
pub fn ensure_blank_line_after(content: &str, kind: MarkerKind) -> String {
    if content.is_empty() {
        return content.to_string();
    }
    let lines: Vec<&str> = content.split('\n').collect();
    let mut rebuilt: Vec<&str> = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        rebuilt.push(line);
        if line_has_marker(line, kind)
            && lines.get(i + 1).is_some_and(|next| !next.is_empty())
        {
            rebuilt.push("");
        }
    }
    rebuilt.join("\n")
}

/// Halve the indentation of the first line containing `needle`, at most once
/// per needle.
///
/// Only even, positive leading-space counts are halved; odd counts are left
/// untouched. Needles already present in `memo` are skipped, and `memo` only
/// records needles that were actually adjusted.
#[must_use]
pub fn halve_indent(content: &str, needle: &str, memo: &mut IndentRecord) -> String {
    if content.is_empty() || needle.is_empty() || memo.contains(needle) {
        return content.to_string();
    }
    let Some(indent) = leading_spaces_of_line_containing(content, needle) else {
        return content.to_string();
    };
    let count = indent.len();
    if count == 0 || count % 2 != 0 {
        return content.to_string();
    }
    let halved = " ".repeat(count / 2);
    memo.insert(needle.to_string());
    set_indent_of_line_containing(content, needle, &halved)
}

/// Leading spaces of the first line containing `needle`, or `None` when no
/// line does.
#[must_use]
pub fn leading_spaces_of_line_containing(content: &str, needle: &str) -> Option<String> {
    if needle.is_empty() {
        return None;
    }
    content
        .split('\n')
        .find(|line| line.contains(needle))
        .map(|line| line.chars().take_while(|&c| c == ' ').collect())
}

/// Rewrite the indentation of the first line containing `needle` to
/// `indent`. A no-op when `indent` is empty or no line matches.
#[must_use]
pub fn set_indent_of_line_containing(content: &str, needle: &str, indent: &str) -> String {
    if content.is_empty() || needle.is_empty() || indent.is_empty() {
        return content.to_string();
    }
    let mut lines: Vec<String> = content.split('\n').map(str::to_string).collect();
    let Some(target) = lines.iter().position(|line| line.contains(needle)) else {
        return content.to_string();
    };
    if let Some(line) = lines.get_mut(target) {
        *line = format!("{indent}{}", line.trim_start_matches(' '));
    }
    lines.join("\n")
}

/// Count the space characters between the start of a line and the first
/// occurrence of `needle` in `content`, returned as an indent string.
///
/// This deliberately skips non-space characters in between: a list lead-in
/// like `* ` in front of a tag contributes its surrounding spaces, which is
/// exactly the indentation the line's continuation needs.
#[must_use]
pub fn indent_preceding(content: &str, needle: &str) -> String {
    if needle.is_empty() {
        return String::new();
    }
    let Some(pos) = content.find(needle) else {
        return String::new();
    };
    let count = content
        .as_bytes()
        .get(..pos)
        .unwrap_or_default()
        .iter()
        .rev()
        .take_while(|&&b| b != b'\n')
        .filter(|&&b| b == b' ')
        .count();
    " ".repeat(count)
}
