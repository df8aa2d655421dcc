//! Corpus fingerprinting and build-once index caching.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::UNIX_EPOCH;

use tokio::sync::OnceCell;
use tracing::debug;

use docq_core::{Error, Result};

use crate::index::VectorIndex;

/// Deterministic identity of a corpus snapshot.
///
/// Derived from every matched file's path, byte length, and modification
/// time, so an unchanged corpus maps to the same fingerprint across runs
/// and touching any file changes it. The entry list is sorted before
/// hashing, making the fingerprint independent of scan order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorpusFingerprint(String);

impl CorpusFingerprint {
    /// Fingerprint a set of corpus files.
    pub fn of_files(paths: &[impl AsRef<Path>]) -> Result<Self> {
        let mut lines: Vec<String> = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let metadata = std::fs::metadata(path)?;
            let modified = metadata
                .modified()?
                .duration_since(UNIX_EPOCH)
                .map_err(|e| Error::Other(format!("file mtime before epoch: {}", e)))?;
            lines.push(format!(
                "{}|{}|{}.{:09}",
                path.display(),
                metadata.len(),
                modified.as_secs(),
                modified.subsec_nanos()
            ));
        }
        lines.sort();

        let digest = md5::compute(lines.join("\n").as_bytes());
        Ok(Self(format!("{:x}", digest)))
    }

    /// Wrap an already-computed digest string.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorpusFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

type IndexCell = Arc<OnceCell<Arc<VectorIndex>>>;

/// Process-wide memo table of built indexes, keyed by corpus fingerprint.
///
/// Concurrent `get_or_build` calls for one fingerprint serialize on a
/// single build and then share the same `Arc<VectorIndex>`. A failed build
/// leaves the slot empty, so the next attempt starts fresh.
#[derive(Default)]
pub struct IndexCache {
    cells: Mutex<HashMap<CorpusFingerprint, IndexCell>>,
}

impl IndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the index for `fingerprint`, running `build` at most once per
    /// fingerprint across all concurrent callers.
    pub async fn get_or_build<F, Fut>(
        &self,
        fingerprint: &CorpusFingerprint,
        build: F,
    ) -> Result<Arc<VectorIndex>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<VectorIndex>>,
    {
        let cell = {
            let mut cells = self
                .cells
                .lock()
                .map_err(|e| Error::Index(format!("cache lock error: {}", e)))?;
            cells.entry(fingerprint.clone()).or_default().clone()
        };

        if let Some(index) = cell.get() {
            debug!(fingerprint = %fingerprint, "index cache hit");
            return Ok(index.clone());
        }

        let index = cell
            .get_or_try_init(|| async {
                debug!(fingerprint = %fingerprint, "building index for corpus");
                build().await.map(Arc::new)
            })
            .await?;

        Ok(index.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use docq_core::{Chunk, TextEmbedder};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct UnitEmbedder;

    #[async_trait]
    impl TextEmbedder for UnitEmbedder {
        async fn embed(&self, _text: &str) -> docq_core::Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        fn model_id(&self) -> &str {
            "stub-embedder"
        }
    }

    fn chunks() -> Vec<Chunk> {
        vec![Chunk {
            id: "doc_0".to_string(),
            document_id: "doc".to_string(),
            text: "some corpus text".to_string(),
            start_offset: 0,
            end_offset: 16,
        }]
    }

    #[tokio::test]
    async fn concurrent_builds_share_a_single_index() {
        let cache = IndexCache::new();
        let fingerprint = CorpusFingerprint::from_raw("abc123");
        let builds = Arc::new(AtomicUsize::new(0));

        let build = |counter: Arc<AtomicUsize>| {
            move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                VectorIndex::build(chunks(), &UnitEmbedder).await
            }
        };

        let (a, b) = tokio::join!(
            cache.get_or_build(&fingerprint, build(builds.clone())),
            cache.get_or_build(&fingerprint, build(builds.clone())),
        );

        let a = a.unwrap();
        let b = b.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_build_caches_nothing() {
        let cache = IndexCache::new();
        let fingerprint = CorpusFingerprint::from_raw("retry");

        let err = cache
            .get_or_build(&fingerprint, || async {
                Err::<VectorIndex, _>(Error::EmptyCorpus("no chunks to index".to_string()))
            })
            .await;
        assert!(matches!(err, Err(Error::EmptyCorpus(_))));

        // the slot is still empty, so the next attempt builds fresh
        let index = cache
            .get_or_build(&fingerprint, || async {
                VectorIndex::build(chunks(), &UnitEmbedder).await
            })
            .await
            .unwrap();
        assert_eq!(index.len(), 1);
    }

    #[tokio::test]
    async fn distinct_fingerprints_build_independently() {
        let cache = IndexCache::new();
        let builds = Arc::new(AtomicUsize::new(0));

        let build = |counter: Arc<AtomicUsize>| {
            move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                VectorIndex::build(chunks(), &UnitEmbedder).await
            }
        };

        let a = cache
            .get_or_build(&CorpusFingerprint::from_raw("one"), build(builds.clone()))
            .await
            .unwrap();
        let b = cache
            .get_or_build(&CorpusFingerprint::from_raw("two"), build(builds.clone()))
            .await
            .unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn fingerprint_is_stable_for_an_unchanged_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.md");
        std::fs::write(&file, "hello").unwrap();

        let paths = vec![file];
        assert_eq!(
            CorpusFingerprint::of_files(&paths).unwrap(),
            CorpusFingerprint::of_files(&paths).unwrap()
        );
    }

    #[test]
    fn fingerprint_changes_when_a_file_changes() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.md");

        std::fs::write(&file, "hello").unwrap();
        let before = CorpusFingerprint::of_files(&[&file]).unwrap();

        std::fs::write(&file, "hello, changed world").unwrap();
        let after = CorpusFingerprint::of_files(&[&file]).unwrap();

        assert_ne!(before, after);
    }

    #[test]
    fn fingerprint_ignores_scan_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.md");
        let b = dir.path().join("b.md");
        std::fs::write(&a, "first").unwrap();
        std::fs::write(&b, "second").unwrap();

        assert_eq!(
            CorpusFingerprint::of_files(&[a.clone(), b.clone()]).unwrap(),
            CorpusFingerprint::of_files(&[b, a]).unwrap()
        );
    }
}
