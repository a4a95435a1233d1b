//! courier-index integration tests: index lifecycle against real files.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use courier_core::config::{EmbeddingConfig, FieldBindings, IndexConfig};
use courier_core::dataset::Dataset;
use courier_core::errors::CourierResult;
use courier_core::models::IndexDescriptor;
use courier_core::traits::IEmbeddingProvider;
use courier_embeddings::{EmbeddingCache, EmbeddingEngine, FallbackChain, HashedTfProvider};
use courier_index::IndexStore;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Deterministic provider that counts how many texts it embeds.
struct SpyProvider {
    inner: HashedTfProvider,
    embedded: Arc<AtomicUsize>,
}

impl SpyProvider {
    fn new(dims: usize, embedded: Arc<AtomicUsize>) -> Self {
        Self {
            inner: HashedTfProvider::new(dims),
            embedded,
        }
    }
}

impl IEmbeddingProvider for SpyProvider {
    fn embed(&self, text: &str) -> CourierResult<Vec<f32>> {
        self.embedded.fetch_add(1, Ordering::SeqCst);
        self.inner.embed(text)
    }
    fn embed_batch(&self, texts: &[String]) -> CourierResult<Vec<Vec<f32>>> {
        self.embedded.fetch_add(texts.len(), Ordering::SeqCst);
        self.inner.embed_batch(texts)
    }
    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }
    fn name(&self) -> &str {
        "spy"
    }
    fn is_available(&self) -> bool {
        true
    }
}

fn spy_store(root: &std::path::Path, dims: usize) -> (IndexStore, Arc<AtomicUsize>) {
    let embedded = Arc::new(AtomicUsize::new(0));
    let mut chain = FallbackChain::new();
    chain.push(Box::new(SpyProvider::new(dims, embedded.clone())));

    let config = EmbeddingConfig {
        provider: "local".to_string(),
        model: format!("spy-{dims}"),
        ..EmbeddingConfig::default()
    };
    let engine = EmbeddingEngine::from_parts(chain, EmbeddingCache::new(1000), config);

    let index_config = IndexConfig {
        root_dir: root.to_string_lossy().into_owned(),
        chunk_size: 100,
    };
    let store = IndexStore::new(engine, FieldBindings::default(), index_config);
    (store, embedded)
}

fn sample_dataset(rows: usize) -> Dataset {
    let mut csv = String::from("MAILITM_FID,EVENT_TYPE_CD,EVENT_TYPE_NM,établissement_postal,date\n");
    let codes = [("10", "Received"), ("11", "In transit"), ("12", "Delivered")];
    for i in 0..rows {
        let (code, name) = codes[i % codes.len()];
        csv.push_str(&format!(
            "RR{i:09}FR,{code},{name},Office {},2024-02-{:02}\n",
            i % 4,
            (i % 28) + 1
        ));
    }
    Dataset::from_csv_reader(csv.as_bytes()).unwrap()
}

// ---------------------------------------------------------------------------
// Dimension invariant: vectors and documents stay aligned
// ---------------------------------------------------------------------------
#[test]
fn index_and_documents_stay_aligned() {
    let dir = tempfile::tempdir().unwrap();
    let (mut store, _) = spy_store(dir.path(), 64);

    assert!(store.build(&sample_dataset(12), Some("ds-aligned"), false));
    let current = store.current().expect("index built");
    assert_eq!(current.index.len(), current.documents.len());
    assert_eq!(current.index.dimension(), 64);
}

// ---------------------------------------------------------------------------
// Cache correctness: a second build must not re-embed
// ---------------------------------------------------------------------------
#[test]
fn persisted_index_loads_without_reembedding() {
    let dir = tempfile::tempdir().unwrap();

    let (mut first, first_count) = spy_store(dir.path(), 64);
    assert!(first.build(&sample_dataset(9), Some("ds-cache"), false));
    let embedded = first_count.load(Ordering::SeqCst);
    assert!(embedded > 0);
    let first_docs: Vec<String> = first
        .current()
        .unwrap()
        .documents
        .iter()
        .map(|d| d.text.clone())
        .collect();

    // Fresh store, same artifacts on disk: no embedding calls at all.
    let (mut second, second_count) = spy_store(dir.path(), 64);
    assert!(second.build(&sample_dataset(9), Some("ds-cache"), false));
    assert_eq!(second_count.load(Ordering::SeqCst), 0);

    let second_docs: Vec<String> = second
        .current()
        .unwrap()
        .documents
        .iter()
        .map(|d| d.text.clone())
        .collect();
    assert_eq!(first_docs, second_docs);
}

// ---------------------------------------------------------------------------
// Dimension-mismatch invalidation: 64-dim cache, 128-dim engine → rebuild
// ---------------------------------------------------------------------------
#[test]
fn dimension_mismatch_forces_rebuild() {
    let dir = tempfile::tempdir().unwrap();

    let (mut narrow, _) = spy_store(dir.path(), 64);
    assert!(narrow.build(&sample_dataset(6), Some("ds-dims"), false));

    let (mut wide, wide_count) = spy_store(dir.path(), 128);
    assert!(wide.build(&sample_dataset(6), Some("ds-dims"), false));
    assert!(
        wide_count.load(Ordering::SeqCst) > 0,
        "mismatched descriptor must trigger re-embedding"
    );
    assert_eq!(wide.current().unwrap().index.dimension(), 128);

    // The persisted descriptor now records the new geometry.
    let descriptor: IndexDescriptor = serde_json::from_slice(
        &std::fs::read(dir.path().join("ds-dims").join("descriptor.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(descriptor.dimension, 128);
}

// ---------------------------------------------------------------------------
// Force rebuild bypasses the cache
// ---------------------------------------------------------------------------
#[test]
fn force_rebuild_reembeds() {
    let dir = tempfile::tempdir().unwrap();
    let (mut store, count) = spy_store(dir.path(), 64);

    assert!(store.build(&sample_dataset(5), Some("ds-force"), false));
    let after_first = count.load(Ordering::SeqCst);

    assert!(store.build(&sample_dataset(5), Some("ds-force"), true));
    assert!(count.load(Ordering::SeqCst) > after_first);
}

// ---------------------------------------------------------------------------
// Empty dataset is a boolean failure, not a panic
// ---------------------------------------------------------------------------
#[test]
fn empty_dataset_returns_false() {
    let dir = tempfile::tempdir().unwrap();
    let (mut store, _) = spy_store(dir.path(), 64);
    assert!(!store.build(&Dataset::default(), Some("ds-empty"), false));
    assert!(store.current().is_none());
}

// ---------------------------------------------------------------------------
// All three artifacts are written; no temp files remain
// ---------------------------------------------------------------------------
#[test]
fn persistence_writes_three_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let (mut store, _) = spy_store(dir.path(), 64);
    assert!(store.build(&sample_dataset(4), Some("ds-files"), false));

    let ds_dir = dir.path().join("ds-files");
    for file in ["index.json", "documents.json", "descriptor.json"] {
        assert!(ds_dir.join(file).exists(), "{file} missing");
    }
    let leftovers: Vec<_> = std::fs::read_dir(&ds_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "temp files must be renamed away");
}

// ---------------------------------------------------------------------------
// Corrupt artifacts silently trigger a rebuild
// ---------------------------------------------------------------------------
#[test]
fn corrupt_artifacts_fall_back_to_rebuild() {
    let dir = tempfile::tempdir().unwrap();
    let (mut store, _) = spy_store(dir.path(), 64);
    assert!(store.build(&sample_dataset(4), Some("ds-corrupt"), false));

    std::fs::write(dir.path().join("ds-corrupt").join("documents.json"), b"{not json").unwrap();

    let (mut second, second_count) = spy_store(dir.path(), 64);
    assert!(second.build(&sample_dataset(4), Some("ds-corrupt"), false));
    assert!(second_count.load(Ordering::SeqCst) > 0);
}

// ---------------------------------------------------------------------------
// Invalidate drops disk artifacts and in-memory state
// ---------------------------------------------------------------------------
#[test]
fn invalidate_discards_everything() {
    let dir = tempfile::tempdir().unwrap();
    let (mut store, count) = spy_store(dir.path(), 64);
    assert!(store.build(&sample_dataset(4), Some("ds-inval"), false));
    let after_first = count.load(Ordering::SeqCst);

    store.invalidate("ds-inval").unwrap();
    assert!(store.current().is_none());
    assert!(!dir.path().join("ds-inval").exists());

    // Next build embeds from scratch.
    assert!(store.build(&sample_dataset(4), Some("ds-inval"), false));
    assert!(count.load(Ordering::SeqCst) > after_first);
}

// ---------------------------------------------------------------------------
// Reconfiguring the engine drops in-memory state; descriptor goes stale
// ---------------------------------------------------------------------------
#[test]
fn reconfigure_invalidates_by_descriptor() {
    let dir = tempfile::tempdir().unwrap();
    let (mut store, _) = spy_store(dir.path(), 64);
    assert!(store.build(&sample_dataset(6), Some("ds-swap"), false));

    let replacement = Arc::new(AtomicUsize::new(0));
    let mut chain = FallbackChain::new();
    chain.push(Box::new(SpyProvider::new(128, replacement.clone())));
    let config = EmbeddingConfig {
        provider: "local".to_string(),
        model: "spy-128".to_string(),
        ..EmbeddingConfig::default()
    };
    store.reconfigure(EmbeddingEngine::from_parts(
        chain,
        EmbeddingCache::new(1000),
        config,
    ));
    assert!(store.current().is_none());

    // The 64-dim artifacts no longer match: a plain build re-embeds.
    assert!(store.build(&sample_dataset(6), Some("ds-swap"), false));
    assert!(replacement.load(Ordering::SeqCst) > 0);
    assert_eq!(store.current().unwrap().index.dimension(), 128);
}

// ---------------------------------------------------------------------------
// Chunked embedding covers every document exactly once
// ---------------------------------------------------------------------------
#[test]
fn large_datasets_chunk_without_gaps() {
    let dir = tempfile::tempdir().unwrap();
    let (mut store, count) = spy_store(dir.path(), 32);

    // 120 rows exceeds the default chunk size of 100.
    assert!(store.build(&sample_dataset(120), None, false));
    let current = store.current().unwrap();
    assert_eq!(current.index.len(), current.documents.len());
    assert_eq!(count.load(Ordering::SeqCst), current.documents.len());
}

// ---------------------------------------------------------------------------
// Search pads beyond the corpus; callers filter the -1 indices
// ---------------------------------------------------------------------------
#[test]
fn search_is_normalized_and_padded() {
    let dir = tempfile::tempdir().unwrap();
    let (mut store, _) = spy_store(dir.path(), 32);
    assert!(store.build(&sample_dataset(2), None, false));

    let corpus = store.current().unwrap().documents.len();
    let query = vec![3.0; 32]; // not normalized on purpose
    let (scores, indices) = store.search(&query, corpus + 5).unwrap();
    assert_eq!(indices.len(), corpus + 5);
    assert!(indices[corpus..].iter().all(|&i| i == -1));
    assert!(scores.iter().all(|s| s.is_finite()));
}

// ---------------------------------------------------------------------------
// No index built: search degrades to empty results
// ---------------------------------------------------------------------------
#[test]
fn search_without_index_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _) = spy_store(dir.path(), 32);
    let (scores, indices) = store.search(&vec![0.0; 32], 5).unwrap();
    assert!(scores.is_empty());
    assert!(indices.is_empty());
}
