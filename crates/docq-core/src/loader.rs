//! Corpus loader trait

use async_trait::async_trait;

use crate::{Document, Result};

/// Trait for extraction collaborators.
///
/// A loader turns a corpus location into per-page [`Document`]s. Finding no
/// documents at all is reported as [`Error::CorpusNotFound`], distinct from
/// an internal failure, so callers can tell the operator "no documents
/// found" instead of surfacing an internal error.
///
/// [`Error::CorpusNotFound`]: crate::Error::CorpusNotFound
#[async_trait]
pub trait CorpusLoader: Send + Sync {
    /// Load every matching document from the corpus.
    async fn load(&self) -> Result<Vec<Document>>;
}
