//! Block data model and store interface for the flatnote converter.
//!
//! A note database is exposed to the converter as a collection of [`Block`]s:
//! paragraphs, headers, lists, tables and so on, each carrying a stable id,
//! its parent/document relationship and its serialized markup. The converter
//! only ever talks to the database through the [`BlockStore`] trait, so the
//! real backing store (an HTTP API, a database dump, a test fixture) stays
//! out of the conversion logic.
//!
//! [`SnapshotStore`] is the bundled implementation: an in-memory store loaded
//! from a JSON snapshot, used by the CLI and by tests.

mod error;
mod snapshot;

use serde::{Deserialize, Serialize};

pub use error::Error;
pub use snapshot::SnapshotStore;

/// The structural kind of a block.
///
/// Unknown kinds reported by a store deserialize as [`BlockKind::Other`] so
/// a newer database does not break older converters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Paragraph,
    Header,
    List,
    ListItem,
    Blockquote,
    Code,
    Html,
    Iframe,
    Table,
    Audio,
    Video,
    Document,
    #[default]
    Other,
}

impl BlockKind {
    /// Whether this kind participates in list structure (a list container or
    /// one of its items).
    #[must_use]
    pub fn is_list_series(self) -> bool {
        matches!(self, BlockKind::List | BlockKind::ListItem)
    }
}

impl<'de> Deserialize<'de> for BlockKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(match name.as_str() {
            "paragraph" => BlockKind::Paragraph,
            "header" => BlockKind::Header,
            "list" => BlockKind::List,
            "list_item" => BlockKind::ListItem,
            "blockquote" => BlockKind::Blockquote,
            "code" => BlockKind::Code,
            "html" => BlockKind::Html,
            "iframe" => BlockKind::Iframe,
            "table" => BlockKind::Table,
            "audio" => BlockKind::Audio,
            "video" => BlockKind::Video,
            "document" => BlockKind::Document,
            _ => BlockKind::Other,
        })
    }
}

/// The list flavor of a `list` or `list_item` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListStyle {
    Ordered,
    Unordered,
    Task,
}

/// One block of structured content as reported by the store.
///
/// `markup` is the author-facing text without the block's attribute tag;
/// `tag_source` is the block's own serialized tag line. The full serialized
/// source of a block (tags included, subtree included) is fetched separately
/// through [`BlockStore::raw_markup`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    pub kind: BlockKind,
    #[serde(default)]
    pub subtype: Option<ListStyle>,
    #[serde(default)]
    pub parent_id: String,
    #[serde(default)]
    pub document_id: String,
    /// Slash-delimited hierarchical path of the block within the database.
    #[serde(default)]
    pub path: String,
    /// Revision stamp; empty when the store never recorded one.
    #[serde(default)]
    pub updated: String,
    #[serde(default)]
    pub markup: String,
    #[serde(default)]
    pub tag_source: String,
    /// Display name; meaningful for `document` blocks.
    #[serde(default)]
    pub title: String,
}

impl Block {
    /// Whether this block is an ordered list or an item of one.
    #[must_use]
    pub fn is_ordered_list_series(&self) -> bool {
        self.kind.is_list_series() && self.subtype == Some(ListStyle::Ordered)
    }
}

/// Access to the block database.
///
/// Implementations may be remote and may fail; errors propagate to the
/// caller unchanged — the converter never retries. A lookup for an id the
/// store does not know is `Ok(None)`, not an error: the converter uses that
/// distinction to treat dangling references as plain text.
pub trait BlockStore {
    /// Fetch a block by id.
    ///
    /// # Errors
    ///
    /// Returns an error when the store itself fails (unreachable backend,
    /// corrupt record). An unknown id is `Ok(None)`.
    fn block(&self, id: &str) -> Result<Option<Block>, Error>;

    /// Ids of the blocks directly below `parent_id`, in store order.
    ///
    /// Stores are allowed to over-report here: some databases list a
    /// header's first-level subordinates alongside the document's own
    /// children. Callers that need exact children filter by `parent_id`.
    ///
    /// # Errors
    ///
    /// Returns an error when the store itself fails.
    fn child_ids(&self, parent_id: &str) -> Result<Vec<String>, Error>;

    /// The serialized source text of a block, attribute tags included,
    /// covering the block's whole subtree.
    ///
    /// # Errors
    ///
    /// Returns an error when the store itself fails. An unknown id yields
    /// an empty string.
    fn raw_markup(&self, id: &str) -> Result<String, Error>;
}
