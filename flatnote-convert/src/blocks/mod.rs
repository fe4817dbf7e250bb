//! Per-block-kind anchor placement.
//!
//! Every block kind follows the same three-step protocol — parse the tag,
//! resolve the insertion point, splice and clean up — but the placement
//! policy differs per kind: paragraphs anchor immediately before their
//! content, headers at the end of the heading line, lists above their
//! content, prefixed blocks (tables, quotes, media…) get a separator line,
//! code blocks put the indent after the separator. Resolution failures skip
//! the one block and processing moves on; children are always visited.

mod header;
mod list;
mod paragraph;

use flatnote_store::{Block, BlockKind, BlockStore};

use crate::{
    CancelToken, Error, buffer,
    buffer::IndentRecord,
    position, tag,
    tag::MarkerKind,
};

/// One document's block walk: holds everything the per-kind handlers share.
///
/// The buffer itself is NOT part of this state — it is threaded through
/// every call as a value, since each step's correctness depends on the
/// buffer the previous step produced.
pub(crate) struct DocumentPass<'a, S: BlockStore> {
    store: &'a S,
    cancel: &'a CancelToken,
    /// The untouched, normalized seed buffer; indentation is inferred from
    /// here because the working buffer's offsets drift as it is edited.
    original: &'a str,
    memo: IndentRecord,
}

impl<'a, S: BlockStore> DocumentPass<'a, S> {
    pub(crate) fn new(store: &'a S, cancel: &'a CancelToken, original: &'a str) -> Self {
        Self {
            store,
            cancel,
            original,
            memo: IndentRecord::default(),
        }
    }

    /// Place this block's anchor, then recurse into its children.
    ///
    /// Children are visited for every kind — even the inert ones — because
    /// content recurses arbitrarily: a block with no anchor logic of its own
    /// can still hold paragraphs reached only through its child list.
    pub(crate) fn process(&mut self, buffer: String, block: &Block) -> Result<String, Error> {
        self.cancel.check()?;
        tracing::trace!(id = %block.id, kind = ?block.kind, "processing block");

        let buffer = match block.kind {
            BlockKind::Paragraph => self.place_paragraph(buffer, block)?,
            BlockKind::Header => self.place_header(buffer, block)?,
            BlockKind::List => self.place_list(buffer, block)?,
            BlockKind::Blockquote
            | BlockKind::Html
            | BlockKind::Iframe
            | BlockKind::Table
            | BlockKind::Audio
            | BlockKind::Video => self.place_prefixed(buffer, block)?,
            BlockKind::Code => self.place_code(buffer, block)?,
            // List items carry placement logic nowhere: the row's visible
            // content is a paragraph child and the row marker itself stays a
            // leftover tag. Kept as an explicit inert arm.
            BlockKind::ListItem | BlockKind::Document | BlockKind::Other => buffer,
        };

        let mut buffer = buffer;
        for child_id in self.store.child_ids(&block.id)? {
            self.cancel.check()?;
            let Some(child) = self.store.block(&child_id)? else {
                continue;
            };
            buffer = self.process(buffer, &child)?;
        }
        Ok(buffer)
    }

    /// Table, html, iframe, blockquote, audio and video blocks all anchor
    /// the same way: indent + anchor + a separating blank line, immediately
    /// before the content. Empty content inserts nothing but the tag lines
    /// still go.
    fn place_prefixed(&self, buffer: String, block: &Block) -> Result<String, Error> {
        self.cancel.check()?;
        let ial = tag::normalize(&block.tag_source);
        let Some(first) = tag::parse_all(&ial, MarkerKind::Plain).into_iter().next() else {
            return Ok(buffer);
        };
        let markup = self.normalized_markup(&block.id)?;
        let Some(pos) = position::insertion_point(&markup, &buffer, self.original) else {
            tracing::debug!(id = %block.id, "insertion point unresolved, skipping anchor");
            return Ok(buffer);
        };
        let indent = buffer::indent_preceding(self.original, &ial);
        let insert = if block.markup.is_empty() {
            String::new()
        } else {
            format!("{indent}{}\n\n", first.anchor)
        };
        let buffer = buffer::insert_before(&buffer, pos, &insert);
        Ok(buffer::delete_lines_containing(&buffer, &ial))
    }

    /// Code blocks differ from the other prefixed kinds only in ordering:
    /// anchor, separator, THEN the indentation, so the fence that follows
    /// keeps its own indent.
    fn place_code(&self, buffer: String, block: &Block) -> Result<String, Error> {
        self.cancel.check()?;
        let ial = tag::normalize(&block.tag_source);
        let Some(first) = tag::parse_all(&ial, MarkerKind::Plain).into_iter().next() else {
            return Ok(buffer);
        };
        let markup = self.normalized_markup(&block.id)?;
        let Some(pos) = position::insertion_point(&markup, &buffer, self.original) else {
            tracing::debug!(id = %block.id, "insertion point unresolved, skipping anchor");
            return Ok(buffer);
        };
        let indent = buffer::indent_preceding(self.original, &ial);
        let insert = if block.markup.is_empty() {
            String::new()
        } else {
            format!("{}\n\n{indent}", first.anchor)
        };
        let buffer = buffer::insert_before(&buffer, pos, &insert);
        Ok(buffer::delete_lines_containing(&buffer, &ial))
    }

    fn parent_block(&self, block: &Block) -> Result<Option<Block>, Error> {
        if block.parent_id.is_empty() {
            return Ok(None);
        }
        Ok(self.store.block(&block.parent_id)?)
    }

    /// The block's full standalone markup, canonicalized, for position
    /// resolution.
    fn normalized_markup(&self, id: &str) -> Result<String, Error> {
        Ok(tag::normalize(&self.store.raw_markup(id)?))
    }
}
