//! List container anchor placement.
//!
//! A list's anchor cannot sit inline — the first row's format marker must
//! stay at the start of its line — so the anchor goes on a line of its own
//! above the list. The insertion position is pulled LEFT by the list's
//! indent width: the anchor line carries the indent itself, which keeps the
//! indentation of everything after the insertion point intact.

use flatnote_store::{Block, BlockKind, BlockStore};

use crate::{Error, buffer, position, tag, tag::MarkerKind};

use super::DocumentPass;

impl<S: BlockStore> DocumentPass<'_, S> {
    pub(crate) fn place_list(&mut self, buffer: String, block: &Block) -> Result<String, Error> {
        self.cancel.check()?;
        let Some(parent) = self.parent_block(block)? else {
            return Ok(buffer);
        };
        let ial = tag::normalize(&block.tag_source);

        // Seen from the outermost list, a list nested below another list is
        // content of that list, not a list of its own.
        let kind = if parent.kind == BlockKind::List {
            MarkerKind::ListContent
        } else {
            MarkerKind::List
        };
        let Some(first) = tag::parse_all(&ial, kind).into_iter().next() else {
            return Ok(buffer);
        };
        let anchor = first.anchor;
        let markup = self.normalized_markup(&block.id)?;
        let Some(pos) = position::insertion_point(&markup, &buffer, self.original) else {
            tracing::debug!(id = %block.id, "insertion point unresolved, skipping anchor");
            return Ok(buffer);
        };
        let indent = buffer::indent_preceding(self.original, &ial);

        let insert = if block.markup.is_empty() {
            // An empty list body is carried by its paragraph rows; the
            // paragraph handler deals with those.
            String::new()
        } else if parent.kind.is_list_series() {
            // Nested below a list row: keep it snug against the row above.
            format!("{indent}{anchor}\n")
        } else {
            // A list directly under a heading (or the document): the blocks
            // right below a heading are its children, and the anchor needs
            // a separating blank line to render outside the list.
            format!("{indent}{anchor}\n\n")
        };

        let mut buffer = match pos.checked_sub(indent.len()) {
            Some(shifted) => buffer::insert_before(&buffer, shifted, &insert),
            None => buffer,
        };
        buffer = buffer::delete_lines_containing(&buffer, &ial);
        buffer = buffer::delete_blank_run_above(&buffer, &anchor);
        buffer = buffer::delete_blank_between_marker_pairs(
            &buffer,
            MarkerKind::ListContent,
            &[MarkerKind::List, MarkerKind::ListContentAsset],
        );
        if block.is_ordered_list_series() {
            buffer = buffer::halve_indent(&buffer, &anchor, &mut self.memo);
        }
        Ok(buffer)
    }
}
