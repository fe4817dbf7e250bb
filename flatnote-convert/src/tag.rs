//! The inline attribute-tag codec.
//!
//! Every block in the source database carries a serialized tag of the form
//! `{: id="…" …}` on (or at the end of) its markup. Field order varies,
//! extra fields appear, `updated` may be missing. [`normalize`] rewrites
//! every tag to the canonical two-field form so the rest of the converter
//! can rely on exact substring matching:
//!
//! ```text
//! {: id="<id>" updated="<updated-or-empty>"}
//! ```
//!
//! [`parse_all`] extracts the tags of a fragment together with the anchor
//! marker each one turns into.

use std::fmt;

use crate::patterns::{TAG_OCCURRENCE, TAG_SPAN, TAG_WITH_ID, TAG_WITH_UPDATED};

/// Classification carried by an anchor marker's `data-attr` attribute.
///
/// The cleanup passes that tighten lists and guard asset lines key off this
/// value; `JustReplace` marks anchors spliced verbatim over leftover tags at
/// the end of a document conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MarkerKind {
    /// No classification (`data-attr=""`).
    #[default]
    Plain,
    /// A list container anchor.
    List,
    /// Content belonging to a list entry.
    ListContent,
    /// List content that references an asset file.
    ListContentAsset,
    /// A leftover tag replaced in place.
    JustReplace,
}

impl MarkerKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MarkerKind::Plain => "",
            MarkerKind::List => "list",
            MarkerKind::ListContent => "list-content",
            MarkerKind::ListContentAsset => "list-content-asset",
            MarkerKind::JustReplace => "just-replace",
        }
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tag occurrence parsed out of a markup fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTag {
    /// The tag exactly as it appears after normalization.
    pub text: String,
    pub id: String,
    /// Empty when the source tag had no `updated` field.
    pub updated: String,
    /// The anchor marker this tag becomes.
    pub anchor: String,
    /// Leading spaces of the line the tag sits on.
    pub leading_spaces: String,
}

/// The anchor id for a block: `<id>` alone, or `<id>-<updated>`.
///
/// Ids are globally unique and `updated` is a same-block revision stamp, so
/// the combination stays unique.
#[must_use]
pub fn anchor_id(id: &str, updated: &str) -> String {
    if updated.is_empty() {
        id.to_string()
    } else {
        format!("{id}-{updated}")
    }
}

/// The anchor marker markup for a block id, revision stamp and
/// classification.
#[must_use]
pub fn anchor_markup(id: &str, updated: &str, kind: MarkerKind) -> String {
    format!(
        "<span id=\"{}\" data-attr=\"{}\"></span>",
        anchor_id(id, updated),
        kind
    )
}

/// Rewrite every attribute tag in `markup` to the canonical two-field form.
///
/// A would-be tag without an `id` field is not a valid tag and passes
/// through untouched, as does every non-tag line and empty input.
/// Normalizing already-normalized markup is a no-op.
#[must_use]
pub fn normalize(markup: &str) -> String {
    if markup.is_empty() {
        return String::new();
    }
    let lines: Vec<String> = markup
        .split('\n')
        .map(|line| {
            let Some(caps) = TAG_WITH_ID.captures(line) else {
                return line.to_string();
            };
            let id = caps.get(1).map_or("", |m| m.as_str());
            let updated = TAG_WITH_UPDATED
                .captures(line)
                .and_then(|c| c.get(1))
                .map_or("", |m| m.as_str());
            let canonical = format!("{{: id=\"{id}\" updated=\"{updated}\"}}");
            TAG_SPAN
                .replace_all(line, regex::NoExpand(&canonical))
                .into_owned()
        })
        .collect();
    lines.join("\n")
}

/// Parse every tag occurrence in `markup` (normalizing first), producing the
/// anchor each one maps to.
///
/// A fragment may legitimately hold more than one tag — a block followed by
/// its trailing child separator, for instance — and a single line may hold
/// several, so the scan is per occurrence, not per line.
#[must_use]
pub fn parse_all(markup: &str, kind: MarkerKind) -> Vec<ParsedTag> {
    let normalized = normalize(markup);
    let mut tags = Vec::new();
    for line in normalized.split('\n') {
        let leading_spaces: String = line.chars().take_while(|&c| c == ' ').collect();
        for occurrence in TAG_OCCURRENCE.find_iter(line) {
            let text = occurrence.as_str();
            let Some(id) = TAG_WITH_ID
                .captures(text)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
            else {
                continue;
            };
            let updated = TAG_WITH_UPDATED
                .captures(text)
                .and_then(|c| c.get(1))
                .map_or("", |m| m.as_str())
                .to_string();
            tags.push(ParsedTag {
                text: text.to_string(),
                anchor: anchor_markup(&id, &updated, kind),
                id,
                updated,
                leading_spaces: leading_spaces.clone(),
            });
        }
    }
    tags
}
