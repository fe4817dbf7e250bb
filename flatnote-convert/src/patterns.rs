//! Compiled patterns for the tag and link sub-grammars.
//!
//! Everything the converter recognises in block markup is collected here:
//! the inline attribute tag, the two cross-reference dialects and the image
//! width tags. Pattern order matters to callers — the coarse "occurrence"
//! patterns are tried first and the field extractors only run on their
//! matches, so keep the extractors in sync with the shapes the coarse
//! patterns accept.

// Patterns are fixed literals; a failure to compile is a programming error.
#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

/// A tag carrying an `id` field; capture 1 is the id.
///
/// Greedy on purpose: applied to a single tag occurrence (or a line holding
/// exactly one tag) it spans the whole tag regardless of field order.
pub(crate) static TAG_WITH_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\{:.*id="([^"]+)".*\}"#).expect("tag id pattern"));

/// A tag carrying an `updated` field; capture 1 is the stamp.
pub(crate) static TAG_WITH_UPDATED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\{:.*updated="([^"]+)".*\}"#).expect("tag updated pattern"));

/// The whole tag span on a line, first `{:` to last `}` (greedy).
/// Used to splice the canonical two-field form over the original tag.
pub(crate) static TAG_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{:.*\}").expect("tag span pattern"));

/// One tag occurrence (lazy) — a line may legitimately carry several.
pub(crate) static TAG_OCCURRENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{:\s*(.*?)\}").expect("tag occurrence pattern"));

/// Content referencing a bundled asset file, e.g. `![x](assets/x.png)`.
pub(crate) static ASSET_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.*\]\(assets.*\)").expect("asset link pattern"));

/// A direct block link: `[text](note://blocks/<id>)`.
pub(crate) static DIRECT_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\[\]]*\]\(\s*note://[^()]*\)").expect("link pattern"));

/// Bracket/paren split of a matched direct link: captures text and target.
pub(crate) static LINK_PARTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(.*)\]\((.*)\)").expect("link parts pattern"));

/// Target id of a direct link: everything after the final slash.
pub(crate) static LINK_TARGET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(note://.*/)(.*)").expect("link target pattern"));

/// One transclusion-reference occurrence: `((<id> '<text>'))`.
pub(crate) static REF_OCCURRENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\(([^)]+)\)\)").expect("reference pattern"));

/// Inner split of a matched reference: captures id and the quoted text.
pub(crate) static REF_ID_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\S+)\s*(.+)").expect("reference parts pattern"));

/// An inline tag carrying both a display width and a parent-container width,
/// in either field order.
pub(crate) static IMAGE_SIZE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{: .*style=.*parent-style=.*\}|\{: .*parent-style=.*style=.*\}")
        .expect("image size tag pattern")
});

/// Parent-container width of an image tag; capture 1 is the width value.
pub(crate) static IMAGE_PARENT_WIDTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{:.*parent-style="width:\s([^"]+);".*\}"#).expect("parent width pattern")
});

/// Author-set display width of an image tag; capture 1 is the width value.
pub(crate) static IMAGE_STYLE_WIDTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{:.* style="width:\s([^"]+);".*\}"#).expect("style width pattern")
});
