//! Cross-document link rewriting.
//!
//! Source markup reaches other blocks two ways: direct links
//! (`[text](note://blocks/<id>)`) and transclusion-style references
//! (`((<id> '<text>'))`). Both become portable relative Markdown links.
//! A target the store does not know is not an error — the author may have
//! typed something link-shaped on purpose — so the match stays byte-for-byte
//! as it was.

use flatnote_store::{Block, BlockKind, BlockStore};

use crate::{
    CancelToken, Error,
    patterns::{DIRECT_LINK, LINK_PARTS, LINK_TARGET, REF_ID_TEXT, REF_OCCURRENCE},
    tag,
};

/// Rewrites one document's outbound links into the evolving buffer.
pub(crate) struct XrefRewriter<'a, S: BlockStore> {
    store: &'a S,
    cancel: &'a CancelToken,
    /// Display name of the site root document; a reference resolving to it
    /// points at `index` instead (the generated site names it that way).
    root_document: &'a str,
}

impl<'a, S: BlockStore> XrefRewriter<'a, S> {
    pub(crate) fn new(store: &'a S, cancel: &'a CancelToken, root_document: &'a str) -> Self {
        Self {
            store,
            cancel,
            root_document,
        }
    }

    /// Rewrite every direct link and reference found in `block`'s raw
    /// markup, replacing each origin text once in `buffer`.
    pub(crate) fn rewrite_block(
        &self,
        buffer: String,
        block: &Block,
        doc: &Block,
    ) -> Result<String, Error> {
        let buffer = self.rewrite_links(buffer, block, doc)?;
        self.rewrite_refs(buffer, block, doc)
    }

    fn rewrite_links(
        &self,
        mut buffer: String,
        block: &Block,
        doc: &Block,
    ) -> Result<String, Error> {
        let markup = self.store.raw_markup(&block.id)?;
        for reference in self.scan_links(&markup, block)? {
            let rel = relative_path(&doc.path, &reference.target_path);
            tracing::debug!(block = %block.id, target = %reference.target_id, "link rewritten");
            buffer = buffer.replacen(&reference.origin, &reference.markdown_link(&rel), 1);
        }
        Ok(buffer)
    }

    fn rewrite_refs(
        &self,
        mut buffer: String,
        block: &Block,
        doc: &Block,
    ) -> Result<String, Error> {
        let markup = self.store.raw_markup(&block.id)?;
        for reference in self.scan_refs(&markup, block)? {
            let mut rel = relative_path(&doc.path, &reference.target_path);
            rel = self.substitute_index_root(rel);
            tracing::debug!(block = %block.id, target = %reference.target_id, "reference rewritten");
            buffer = buffer.replacen(&reference.origin, &reference.markdown_link(&rel), 1);
        }
        Ok(buffer)
    }

    /// Every direct link in `markup` whose target resolves. Unresolved
    /// targets never make it into the list — their origin text stays prose.
    fn scan_links(&self, markup: &str, block: &Block) -> Result<Vec<CrossReference>, Error> {
        self.cancel.check()?;
        let mut references = Vec::new();
        for found in DIRECT_LINK.find_iter(markup) {
            self.cancel.check()?;
            let Some(parts) = LINK_PARTS.captures(found.as_str()) else {
                continue;
            };
            let origin = parts.get(0).map_or("", |m| m.as_str()).trim();
            let text = parts.get(1).map_or("", |m| m.as_str()).trim();
            let link = parts.get(2).map_or("", |m| m.as_str()).trim();
            let target_id = LINK_TARGET
                .captures(link)
                .and_then(|c| c.get(2))
                .map_or("", |m| m.as_str().trim());
            let Some(target) = self.store.block(target_id)? else {
                tracing::debug!(block = %block.id, target = %target_id, "link target unresolved, kept as text");
                continue;
            };
            references.push(CrossReference::new(origin, text, &target));
        }
        Ok(references)
    }

    /// Every transclusion-style reference in `markup` whose target
    /// resolves.
    fn scan_refs(&self, markup: &str, block: &Block) -> Result<Vec<CrossReference>, Error> {
        self.cancel.check()?;
        let mut references = Vec::new();
        for found in REF_OCCURRENCE.find_iter(markup) {
            self.cancel.check()?;
            let Some(inner) = REF_OCCURRENCE
                .captures(found.as_str())
                .and_then(|c| c.get(1))
                .map(|m| m.as_str())
            else {
                continue;
            };
            let Some(parts) = REF_ID_TEXT.captures(inner) else {
                continue;
            };
            let target_id = parts.get(1).map_or("", |m| m.as_str()).trim();
            let quoted = parts.get(2).map_or("", |m| m.as_str()).trim();
            // The display text sits between quote characters (single or
            // double); anything too short to hold a quoted body is prose.
            let Some(text) = quoted.get(1..quoted.len().saturating_sub(1)) else {
                continue;
            };
            let Some(target) = self.store.block(target_id)? else {
                tracing::debug!(block = %block.id, target = %target_id, "reference target unresolved, kept as text");
                continue;
            };
            references.push(CrossReference::new(found.as_str().trim(), text, &target));
        }
        Ok(references)
    }

    /// The root document's page is named `index` in the generated tree.
    fn substitute_index_root(&self, rel: String) -> String {
        if self.root_document.is_empty() {
            return rel;
        }
        let mut segments: Vec<&str> = rel.split('/').collect();
        match segments.last() {
            Some(&last) if last == self.root_document => {
                if let Some(slot) = segments.last_mut() {
                    *slot = "index";
                }
                segments.join("/")
            }
            _ => rel,
        }
    }
}

/// One outbound reference with its target resolved, built by a scan and
/// discarded right after the rewrite that consumes it.
#[derive(Debug)]
struct CrossReference {
    /// The match exactly as it appears in the source markup.
    origin: String,
    /// Display text for the generated link.
    text: String,
    target_id: String,
    target_path: String,
    target_kind: BlockKind,
    target_updated: String,
}

impl CrossReference {
    fn new(origin: &str, text: &str, target: &Block) -> Self {
        Self {
            origin: origin.to_string(),
            text: text.to_string(),
            target_id: target.id.clone(),
            target_path: target.path.clone(),
            target_kind: target.kind,
            target_updated: target.updated.clone(),
        }
    }

    /// The Markdown link this reference becomes: document targets link to
    /// the page, block targets link to their anchor on it.
    fn markdown_link(&self, rel: &str) -> String {
        if self.target_kind == BlockKind::Document {
            format!("[{}]({rel}.md)", self.text)
        } else {
            format!(
                "[{}]({rel}.md#{})",
                self.text,
                tag::anchor_id(&self.target_id, &self.target_updated)
            )
        }
    }
}

/// Relative path from the document at `from` to the target at `to`, both
/// slash-delimited hierarchical paths.
///
/// The positional common prefix is stripped and one `../` is prepended for
/// every remaining `from` segment beyond it. Final segments are documents,
/// not directories: `from`'s final segment never counts toward the prefix
/// or the climb, and `to`'s final segment always survives the strip (a
/// target that IS an ancestor still needs its own name in the link).
pub(crate) fn relative_path(from: &str, to: &str) -> String {
    let from_segments: Vec<&str> = from.split('/').collect();
    let to_segments: Vec<&str> = to.split('/').collect();
    let limit = from_segments.len().saturating_sub(1);
    let shared = from_segments
        .iter()
        .zip(&to_segments)
        .take(limit)
        .take_while(|(a, b)| a == b)
        .count();
    let ups = limit.saturating_sub(shared);
    let tail_start = shared.min(to_segments.len().saturating_sub(1));
    let tail = to_segments.get(tail_start..).unwrap_or_default().join("/");
    format!("{}{}", "../".repeat(ups), tail)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use flatnote_store::SnapshotStore;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::CancelToken;

    #[rstest]
    #[case("/C/D", "/C/E", "E")]
    #[case("/C/D", "/X/Y", "../X/Y")]
    #[case("/C/D/E", "/X/Y", "../../X/Y")]
    #[case("/C/D", "/C/D/E", "D/E")]
    #[case("/C", "/C/D", "C/D")]
    #[case("/A/C/D", "/A/X/Y", "../X/Y")]
    #[case("/Site/A", "/Site", "Site")]
    #[case("/A", "/A", "A")]
    fn relative_paths(#[case] from: &str, #[case] to: &str, #[case] expected: &str) {
        assert_eq!(relative_path(from, to), expected);
    }

    fn doc_block() -> Block {
        Block {
            id: "d1".into(),
            kind: BlockKind::Document,
            path: "/C/D".into(),
            title: "D".into(),
            ..Block::default()
        }
    }

    fn source_block() -> Block {
        Block {
            id: "p1".into(),
            kind: BlockKind::Paragraph,
            parent_id: "d1".into(),
            document_id: "d1".into(),
            ..Block::default()
        }
    }

    /// Store with a source paragraph whose markup is `source_markup`, a
    /// target document at `/C/E` and a target paragraph inside it.
    fn store_with(source_markup: &str) -> SnapshotStore {
        let target_doc = Block {
            id: "t-doc".into(),
            kind: BlockKind::Document,
            path: "/C/E".into(),
            title: "E".into(),
            ..Block::default()
        };
        let target_para = Block {
            id: "t-par".into(),
            kind: BlockKind::Paragraph,
            path: "/C/E".into(),
            updated: "777".into(),
            ..Block::default()
        };
        SnapshotStore::new(
            vec![doc_block(), target_doc, target_para, source_block()],
            [("p1".to_string(), source_markup.to_string())],
        )
    }

    fn rewrite(store: &SnapshotStore, buffer: &str, root: &str) -> String {
        let cancel = CancelToken::new();
        XrefRewriter::new(store, &cancel, root)
            .rewrite_block(buffer.to_string(), &source_block(), &doc_block())
            .unwrap()
    }

    #[test]
    fn rewrites_both_dialects_in_one_pass() {
        let buffer = "see [chapter](note://blocks/t-doc) and ((t-par 'the line'))";
        let store = store_with(buffer);
        assert_eq!(
            rewrite(&store, buffer, ""),
            "see [chapter](E.md) and [the line](E.md#t-par-777)"
        );
    }

    #[test]
    fn unresolved_targets_pass_through_byte_for_byte() {
        let buffer = "[gone](note://blocks/zzz) and ((nope 'x'))";
        let store = store_with(buffer);
        assert_eq!(rewrite(&store, buffer, ""), buffer);
    }

    #[test]
    fn reference_to_root_document_points_at_index() {
        let buffer = "((t-doc 'home'))";
        let store = store_with(buffer);
        assert_eq!(rewrite(&store, buffer, "E"), "[home](index.md)");
    }

    #[test]
    fn direct_link_to_root_document_keeps_its_name() {
        // The index substitution is a reference-dialect convention only.
        let buffer = "[home](note://blocks/t-doc)";
        let store = store_with(buffer);
        assert_eq!(rewrite(&store, buffer, "E"), "[home](E.md)");
    }

    #[test]
    fn double_quoted_reference_text_is_accepted() {
        let buffer = "((t-par \"quoted\"))";
        let store = store_with(buffer);
        assert_eq!(rewrite(&store, buffer, ""), "[quoted](E.md#t-par-777)");
    }

    #[test]
    fn reference_without_quoted_text_is_prose() {
        let buffer = "((t-par x))";
        let store = store_with(buffer);
        // One-character "text" cannot hold a quoted body; left alone even
        // though the id would resolve.
        assert_eq!(rewrite(&store, buffer, ""), buffer);
    }
}
