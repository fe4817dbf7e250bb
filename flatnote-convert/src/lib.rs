//! Flattens an attribute-tagged block tree into anchored, link-rewritten
//! Markdown.
//!
//! A note database serializes each block with an inline attribute tag
//! (`{: id="…" updated="…"}`). Publishing those documents as a static site
//! needs a flat Markdown file per document in which
//!
//! - every block's identity survives as an invisible anchor marker at the
//!   block's exact position,
//! - the structural tags themselves are gone,
//! - links and references between documents are portable relative links,
//! - indentation and blank-line structure still render the way the source
//!   did.
//!
//! The hard part is that a block's standalone markup does not carry the
//! indentation it has inside its parents, so every splice has to re-locate
//! the block inside the evolving document text. [`Flattener`] drives that
//! conversion for one document at a time over a [`BlockStore`].
//!
//! # Example
//!
//! ```ignore
//! use flatnote_convert::{Flattener, Options};
//! use flatnote_store::SnapshotStore;
//!
//! let store = SnapshotStore::from_path(path)?;
//! let options = Options::builder().root_document("Guide").build();
//! let flattener = Flattener::new(&store, options);
//! for doc in store.documents() {
//!     let markdown = flattener.flatten_document(doc)?;
//!     // hand `markdown` to the packaging layer
//! }
//! ```
//!
//! Conversions are sequential per document by design — every step's
//! correctness depends on the buffer the previous step produced. Separate
//! documents are independent: run one `Flattener` per document in parallel
//! if you like, nothing is shared between them.

mod blocks;
pub mod buffer;
mod cancel;
mod error;
mod image;
mod patterns;
mod position;
pub mod tag;
mod xref;

use flatnote_store::{Block, BlockKind, BlockStore};

use blocks::DocumentPass;
pub use cancel::CancelToken;
pub use error::Error;
use tag::MarkerKind;
use xref::XrefRewriter;

/// Conversion options.
///
/// Use [`Options::builder()`] to construct an instance.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Options {
    image_width_adjust: f64,
    root_document: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            image_width_adjust: 20.0,
            root_document: String::new(),
        }
    }
}

impl Options {
    /// Create a new builder with default values.
    #[must_use]
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::default()
    }

    /// Percentage points added to an image's container width when its size
    /// tag is normalized.
    #[must_use]
    pub fn image_width_adjust(&self) -> f64 {
        self.image_width_adjust
    }

    /// Display name of the site root document; references resolving to it
    /// are pointed at `index` instead.
    #[must_use]
    pub fn root_document(&self) -> &str {
        &self.root_document
    }
}

/// Builder for [`Options`].
#[derive(Debug, Clone, Default)]
pub struct OptionsBuilder {
    options: Options,
}

impl OptionsBuilder {
    /// Set the image width adjustment, in percentage points.
    #[must_use]
    pub fn image_width_adjust(mut self, adjust: f64) -> Self {
        self.options.image_width_adjust = adjust;
        self
    }

    /// Set the site root document's display name.
    #[must_use]
    pub fn root_document<S: Into<String>>(mut self, name: S) -> Self {
        self.options.root_document = name.into();
        self
    }

    /// Build the [`Options`] instance.
    #[must_use]
    pub fn build(self) -> Options {
        self.options
    }
}

/// Converts documents from a block store into flat anchored Markdown.
pub struct Flattener<'a, S: BlockStore> {
    store: &'a S,
    options: Options,
    cancel: CancelToken,
}

impl<'a, S: BlockStore> Flattener<'a, S> {
    #[must_use]
    pub fn new(store: &'a S, options: Options) -> Self {
        Self {
            store,
            options,
            cancel: CancelToken::new(),
        }
    }

    /// Use a caller-provided cancellation token instead of a fresh one.
    #[must_use]
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Convert one document to its final flat Markdown text.
    ///
    /// Blocks whose anchor cannot be placed are skipped, not fatal: the
    /// document still converts best-effort and simply lacks those anchors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] when the block store fails and
    /// [`Error::Interrupted`] when the cancellation token trips; in both
    /// cases the partial buffer is discarded.
    #[tracing::instrument(skip_all, fields(doc = %doc.id))]
    pub fn flatten_document(&self, doc: &Block) -> Result<String, Error> {
        self.cancel.check()?;
        if doc.kind != BlockKind::Document {
            tracing::warn!(kind = ?doc.kind, "not a document block, producing no output");
            return Ok(String::new());
        }
        let original = tag::normalize(&self.store.raw_markup(&doc.id)?);
        if original.is_empty() {
            tracing::warn!("document has no markup, producing no output");
            return Ok(String::new());
        }
        let mut buffer = original.clone();

        // The store reports children in its own order; the document's text
        // is the authority. Blocks whose tag is missing from the seed are
        // dropped rather than guessed at — the store may be mid-edit.
        let mut top_level = Vec::new();
        for child_id in self.store.child_ids(&doc.id)? {
            self.cancel.check()?;
            let Some(block) = self.store.block(&child_id)? else {
                continue;
            };
            if block.parent_id == doc.id {
                top_level.push(block);
            }
        }
        let ordered = order_by_appearance(&top_level, &original);
        tracing::debug!(blocks = ordered.len(), "processing top-level blocks");

        let mut pass = DocumentPass::new(self.store, &self.cancel, &original);
        for block in &ordered {
            self.cancel.check()?;
            buffer = pass.process(buffer, block)?;
        }

        // The document's own tag is the buffer's last line; drop it.
        let doc_tag = tag::normalize(&doc.tag_source);
        buffer = buffer::delete_lines_containing(&buffer, &doc_tag);

        buffer = replace_leftover_tags(buffer, &self.cancel)?;

        // Each direct child's raw markup spans its whole subtree, so one
        // sweep over the children covers every nested link.
        let rewriter = XrefRewriter::new(self.store, &self.cancel, self.options.root_document());
        for child_id in self.store.child_ids(&doc.id)? {
            self.cancel.check()?;
            let Some(block) = self.store.block(&child_id)? else {
                continue;
            };
            buffer = rewriter.rewrite_block(buffer, &block, doc)?;
        }

        image::adjust_image_widths(buffer, self.options.image_width_adjust(), &self.cancel)
    }
}

/// Sort `blocks` into the order their tags appear in the seed buffer.
/// Blocks whose tag is not found are dropped.
fn order_by_appearance(blocks: &[Block], seed: &str) -> Vec<Block> {
    if seed.is_empty() {
        return Vec::new();
    }
    let keys: Vec<String> = blocks
        .iter()
        .map(|b| format!("{{: id=\"{}\"", b.id))
        .collect();
    let mut ordered = Vec::with_capacity(blocks.len());
    for line in seed.split('\n') {
        for (block, key) in blocks.iter().zip(&keys) {
            if line.contains(key.as_str()) {
                ordered.push(block.clone());
                break;
            }
        }
    }
    ordered
}

/// Replace every tag still in the buffer with an anchor marker in place.
///
/// By this point the per-kind handlers have consumed the tags they place
/// anchors for; what remains (list row markers, separator tags) still names
/// real blocks, so the identities are kept rather than dropped.
fn replace_leftover_tags(buffer: String, cancel: &CancelToken) -> Result<String, Error> {
    cancel.check()?;
    let lines: Vec<String> = buffer.split('\n').map(str::to_string).collect();
    let mut buffer = buffer;
    for line in lines {
        cancel.check()?;
        for parsed in tag::parse_all(&line, MarkerKind::JustReplace) {
            buffer = buffer.replacen(&parsed.text, &parsed.anchor, 1);
        }
    }
    Ok(buffer)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn block(id: &str) -> Block {
        Block {
            id: id.to_string(),
            ..Block::default()
        }
    }

    #[test]
    fn order_by_appearance_follows_the_seed() {
        let blocks = vec![block("b"), block("a")];
        let seed = "x\n{: id=\"a\" updated=\"\"}\ny\n{: id=\"b\" updated=\"\"}";
        let ordered = order_by_appearance(&blocks, seed);
        let ids: Vec<&str> = ordered.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn order_by_appearance_drops_unmatched_blocks() {
        let blocks = vec![block("a"), block("ghost")];
        let seed = "{: id=\"a\" updated=\"\"}";
        let ordered = order_by_appearance(&blocks, seed);
        assert_eq!(ordered.len(), 1);
    }

    #[test]
    fn leftover_tags_become_just_replace_anchors() {
        let buffer = "* {: id=\"i1\" updated=\"5\"}AA".to_string();
        let out = replace_leftover_tags(buffer, &CancelToken::new()).unwrap();
        assert_eq!(
            out,
            "* <span id=\"i1-5\" data-attr=\"just-replace\"></span>AA"
        );
    }

    #[test]
    fn default_options_match_documented_values() {
        let options = Options::default();
        assert!((options.image_width_adjust() - 20.0).abs() < f64::EPSILON);
        assert_eq!(options.root_document(), "");
    }
}
