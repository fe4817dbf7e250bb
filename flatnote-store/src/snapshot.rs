//! In-memory block store loaded from a JSON snapshot.
//!
//! The snapshot format is a single object:
//!
//! ```json
//! {
//!   "blocks": [ { "id": "…", "kind": "paragraph", … }, … ],
//!   "markup": { "<block id>": "<serialized source, tags included>", … }
//! }
//! ```
//!
//! Blocks are kept in the order the snapshot lists them, which is expected
//! to be document order; child lookups scan in that order so the converter
//! sees children the way the document lays them out.

use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{Block, BlockKind, BlockStore, Error};

#[derive(Debug, Deserialize)]
struct Snapshot {
    blocks: Vec<Block>,
    #[serde(default)]
    markup: FxHashMap<String, String>,
}

/// A [`BlockStore`] over an in-memory snapshot of a block database.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    blocks: Vec<Block>,
    by_id: FxHashMap<String, usize>,
    markup: FxHashMap<String, String>,
}

impl SnapshotStore {
    /// Build a store from blocks (in document order) and per-block raw
    /// markup.
    #[must_use]
    pub fn new(
        blocks: Vec<Block>,
        markup: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        let by_id = blocks
            .iter()
            .enumerate()
            .map(|(i, b)| (b.id.clone(), i))
            .collect();
        Self {
            blocks,
            by_id,
            markup: markup.into_iter().collect(),
        }
    }

    /// Parse a snapshot from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SnapshotParse`] when the text is not a valid
    /// snapshot object.
    pub fn from_json(text: &str) -> Result<Self, Error> {
        let snapshot: Snapshot = serde_json::from_str(text)?;
        tracing::debug!(blocks = snapshot.blocks.len(), "snapshot loaded");
        Ok(Self::new(snapshot.blocks, snapshot.markup))
    }

    /// Load a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SnapshotRead`] when the file cannot be read and
    /// [`Error::SnapshotParse`] when its contents are not a valid snapshot.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)
            .map_err(|_| Error::SnapshotRead(path.to_path_buf()))?;
        Self::from_json(&text)
    }

    /// All `document` blocks, in snapshot order.
    #[must_use]
    pub fn documents(&self) -> Vec<&Block> {
        self.blocks
            .iter()
            .filter(|b| b.kind == BlockKind::Document)
            .collect()
    }
}

impl BlockStore for SnapshotStore {
    fn block(&self, id: &str) -> Result<Option<Block>, Error> {
        Ok(self
            .by_id
            .get(id)
            .and_then(|&i| self.blocks.get(i))
            .cloned())
    }

    fn child_ids(&self, parent_id: &str) -> Result<Vec<String>, Error> {
        Ok(self
            .blocks
            .iter()
            .filter(|b| b.parent_id == parent_id)
            .map(|b| b.id.clone())
            .collect())
    }

    fn raw_markup(&self, id: &str) -> Result<String, Error> {
        Ok(self.markup.get(id).cloned().unwrap_or_default())
    }
}
