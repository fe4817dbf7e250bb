//! Header anchor placement.
//!
//! Headers are the one kind that does not need the position resolver: a
//! header's tag line directly follows the heading text, and headers are
//! never re-indented, so the tag itself is a reliable landmark. The anchor
//! lands at the end of the heading line, right before the newline that
//! precedes the tag.

use flatnote_store::{Block, BlockStore};

use crate::{Error, buffer, tag, tag::MarkerKind};

use super::DocumentPass;

impl<S: BlockStore> DocumentPass<'_, S> {
    pub(crate) fn place_header(&self, buffer: String, block: &Block) -> Result<String, Error> {
        self.cancel.check()?;
        let ial = tag::normalize(&block.tag_source);
        let Some(first) = tag::parse_all(&ial, MarkerKind::Plain).into_iter().next() else {
            return Ok(buffer);
        };
        let Some(tag_pos) = buffer.find(&ial).filter(|&p| p > 0) else {
            tracing::debug!(id = %block.id, "header tag not found, skipping anchor");
            return Ok(buffer);
        };
        let pos = tag_pos - 1;
        let insert = if block.markup.is_empty() {
            format!("{}&nbsp;\n", first.anchor)
        } else {
            first.anchor
        };
        let buffer = buffer::insert_before(&buffer, pos, &insert);
        Ok(buffer::delete_lines_containing(&buffer, &ial))
    }
}
