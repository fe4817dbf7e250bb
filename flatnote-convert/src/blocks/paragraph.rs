//! Paragraph anchor placement.
//!
//! Paragraphs are the workhorse: most block kinds carry their visible
//! content in paragraph children, so this handler sees plain prose, the
//! rows of every list, and the empty filler rows lists use for spacing.
//! The anchor goes immediately before the content; an empty paragraph gets
//! a placeholder line instead, since there is no content to attach to.

use flatnote_store::{Block, BlockStore};

use crate::{Error, buffer, patterns::ASSET_LINK, position, tag, tag::MarkerKind};

use super::DocumentPass;

impl<S: BlockStore> DocumentPass<'_, S> {
    pub(crate) fn place_paragraph(
        &mut self,
        buffer: String,
        block: &Block,
    ) -> Result<String, Error> {
        self.cancel.check()?;
        let ial = tag::normalize(&block.tag_source);
        let parent = self.parent_block(block)?;
        let in_list = parent
            .as_ref()
            .is_some_and(|p| p.kind.is_list_series());

        // Rows of a list are classified so the later cleanup passes can
        // tighten the list; a row that pulls in an asset file keeps its
        // surrounding blank lines instead (renderers need them).
        let kind = if in_list {
            if ASSET_LINK.is_match(&block.markup) {
                MarkerKind::ListContentAsset
            } else {
                MarkerKind::ListContent
            }
        } else {
            MarkerKind::Plain
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

        let empty = block.markup.is_empty();
        let insert = if empty {
            // Nothing to attach the anchor to: give it a line of its own
            // with a non-breaking-space placeholder. Inside a list the line
            // keeps the row's indentation and continues the previous row.
            if in_list {
                let indent = buffer::indent_preceding(self.original, &ial);
                format!("{indent}{anchor}&nbsp;")
            } else {
                format!("\n{anchor}&nbsp;")
            }
        } else {
            anchor.clone()
        };

        let mut buffer = buffer::insert_before(&buffer, pos, &insert);
        buffer = buffer::delete_lines_containing(&buffer, &ial);
        buffer = buffer::delete_blank_between_marker_pairs(
            &buffer,
            MarkerKind::ListContent,
            &[MarkerKind::List, MarkerKind::ListContentAsset],
        );
        buffer = buffer::ensure_blank_line_after(&buffer, MarkerKind::ListContentAsset);
        if in_list && empty {
            buffer = buffer::delete_blank_run_above(&buffer, &anchor);
        }

        // An ordered list's row markers are plain digits; after the anchor
        // splice, renderers only keep recognising the list when the row's
        // indentation is halved.
        if parent.is_some_and(|p| p.is_ordered_list_series()) {
            buffer = buffer::halve_indent(&buffer, &anchor, &mut self.memo);
        }
        Ok(buffer)
    }
}
