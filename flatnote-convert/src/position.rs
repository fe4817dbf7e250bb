//! Locates where a block's content begins inside the evolving document
//! buffer.
//!
//! A block's standalone markup carries its own minimal indentation, not the
//! deeper indentation it has once nested under list ancestors, so the
//! block's text cannot be searched for directly. What CAN be searched for
//! is the block's own closing tag line: tags keep their exact form wherever
//! the block sits. The resolver anchors on that line, re-derives the
//! in-document indentation from the original buffer, rebuilds the block's
//! earlier lines the way they must appear in the document, and then matches
//! that reconstruction backwards from the tag — character-exact, so a
//! single mismatch means "don't touch this block".

use crate::buffer::indent_preceding;

/// Byte offset in `buffer` where `block_markup`'s content begins, or `None`
/// when it cannot be pinned down (the caller skips the block's insertion —
/// never fatal to the document).
///
/// `block_markup` is the block's normalized standalone markup; `buffer` is
/// the current (partially transformed) document; `original` is the
/// untouched seed buffer the indentation is inferred from.
#[must_use]
pub(crate) fn insertion_point(
    block_markup: &str,
    buffer: &str,
    original: &str,
) -> Option<usize> {
    if block_markup.is_empty() || buffer.is_empty() {
        return None;
    }
    let lines: Vec<&str> = block_markup.split('\n').collect();
    let tag_line = lines.last()?;
    let tag_pos = buffer.find(tag_line)?;

    // The run of spaces in front of the tag line in the *original* document
    // is the indentation every continuation line carries there.
    let indent = indent_preceding(original, tag_line);

    // Rebuild the block's earlier lines as they sit in the document: the
    // first line continues the preceding line and gets no indent, blank
    // lines stay bare, everything else is indented.
    let mut target = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i + 1 == lines.len() {
            break;
        }
        if target.is_empty() {
            target.push_str(line);
        } else if line.is_empty() {
            target.push('\n');
        } else {
            target.push('\n');
            target.push_str(&indent);
            target.push_str(line);
        }
    }
    target.push('\n');

    // Walk back from the tag over its indentation padding, then demand the
    // reconstruction ends exactly there.
    let bytes = buffer.as_bytes();
    let mut i = tag_pos;
    while i > 0 {
        i -= 1;
        if bytes.get(i) == Some(&b' ') {
            continue;
        }
        let end = i + 1;
        let start = end.checked_sub(target.len())?;
        return match buffer.get(start..end) {
            Some(window) if window == target => Some(start),
            _ => None,
        };
    }
    None
}
