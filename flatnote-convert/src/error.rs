/// Errors surfaced by a document conversion.
///
/// Only two things abort a conversion: the caller asking for it, and the
/// block store failing. Everything local to one block (an insertion point
/// that cannot be resolved, a malformed tag, a dangling reference) is a
/// skip, not an error — the document still converts best-effort.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Conversion interrupted")]
    Interrupted,

    #[error("Block store error: {0}")]
    Store(#[from] flatnote_store::Error),
}
