//! Per-dataset index lifecycle: build, persist, load, invalidate.
//!
//! Persisted layout per dataset-id: `index.json`, `documents.json`,
//! `descriptor.json`. All three must exist for a cache hit, and the
//! descriptor's dimension must match the active embedding engine's.
//! Artifacts are written to a temp sibling then renamed, descriptor last,
//! so a reader never observes a descriptor whose artifacts are not fully
//! on disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use courier_core::catalog::Catalog;
use courier_core::config::{FieldBindings, IndexConfig};
use courier_core::dataset::Dataset;
use courier_core::document::Document;
use courier_core::errors::{CourierResult, IndexError};
use courier_core::models::IndexDescriptor;
use courier_embeddings::EmbeddingEngine;

use crate::builder::DocumentBuilder;
use crate::flat::{normalize, FlatIpIndex};

const INDEX_FILE: &str = "index.json";
const DOCUMENTS_FILE: &str = "documents.json";
const DESCRIPTOR_FILE: &str = "descriptor.json";

/// The in-memory index state for one dataset.
pub struct DatasetIndex {
    pub dataset_id: Option<String>,
    pub documents: Vec<Document>,
    pub catalog: Catalog,
    pub index: FlatIpIndex,
}

impl DatasetIndex {
    /// Normalize a query vector and return the `k` nearest documents as
    /// `(scores, indices)`. Padding indices (`-1`) are the caller's to
    /// filter.
    pub fn search(&self, query: &[f32], k: usize) -> CourierResult<(Vec<f32>, Vec<i64>)> {
        let mut normalized = query.to_vec();
        normalize(&mut normalized);
        self.index.search(&normalized, k)
    }
}

/// Builds, persists, loads, and invalidates per-dataset similarity indices.
///
/// At most one in-memory index is current at a time; concurrent rebuilds of
/// one dataset-id are the caller's to serialize.
pub struct IndexStore {
    engine: EmbeddingEngine,
    builder: DocumentBuilder,
    config: IndexConfig,
    current: Option<DatasetIndex>,
}

impl IndexStore {
    pub fn new(engine: EmbeddingEngine, bindings: FieldBindings, config: IndexConfig) -> Self {
        Self {
            engine,
            builder: DocumentBuilder::new(bindings),
            config,
            current: None,
        }
    }

    pub fn engine(&self) -> &EmbeddingEngine {
        &self.engine
    }

    /// Swap the embedding engine after a provider/model change.
    ///
    /// The in-memory index is dropped; persisted indices built under the old
    /// configuration go stale through descriptor mismatch, or can be
    /// discarded eagerly with `invalidate` before the next forced build.
    pub fn reconfigure(&mut self, engine: EmbeddingEngine) {
        info!(
            provider = engine.provider_name(),
            model = engine.model_name(),
            "embedding engine reconfigured"
        );
        self.engine = engine;
        self.current = None;
    }

    /// The currently loaded index, if any.
    pub fn current(&self) -> Option<&DatasetIndex> {
        self.current.as_ref()
    }

    /// Build (or load) the index for a dataset.
    ///
    /// With a dataset-id and no force flag, a persisted index whose
    /// descriptor matches the active embedding dimensions is loaded without
    /// re-embedding. Returns `false` only when zero documents were produced
    /// or the build/persist step failed.
    pub fn build(&mut self, dataset: &Dataset, dataset_id: Option<&str>, force_rebuild: bool) -> bool {
        if let Some(id) = dataset_id {
            if !force_rebuild {
                match self.try_load(id, dataset) {
                    Ok(Some(loaded)) => {
                        info!(
                            dataset_id = id,
                            documents = loaded.documents.len(),
                            "loaded persisted index"
                        );
                        self.current = Some(loaded);
                        return true;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        debug!(dataset_id = id, error = %e, "persisted index unusable, rebuilding");
                    }
                }
            }
        }

        match self.rebuild(dataset, dataset_id) {
            Ok(built) => built,
            Err(e) => {
                warn!(error = %e, "index build failed");
                false
            }
        }
    }

    /// Explicit reindex trigger: drop the persisted artifacts and any
    /// in-memory state for a dataset-id. Used when the embedding provider
    /// or model configuration changes.
    pub fn invalidate(&mut self, dataset_id: &str) -> CourierResult<()> {
        if self
            .current
            .as_ref()
            .is_some_and(|c| c.dataset_id.as_deref() == Some(dataset_id))
        {
            self.current = None;
        }
        let dir = self.dataset_dir(dataset_id);
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
            info!(dataset_id, "persisted index invalidated");
        }
        Ok(())
    }

    /// Search the current index. Returns empty results when nothing is
    /// built.
    pub fn search(&self, query: &[f32], k: usize) -> CourierResult<(Vec<f32>, Vec<i64>)> {
        match &self.current {
            Some(current) => current.search(query, k),
            None => Ok((Vec::new(), Vec::new())),
        }
    }

    fn rebuild(&mut self, dataset: &Dataset, dataset_id: Option<&str>) -> CourierResult<bool> {
        let (documents, catalog) = self.builder.build(dataset);
        if documents.is_empty() {
            warn!("no documents produced, nothing to index");
            return Ok(false);
        }

        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let mut vectors = self.embed_chunked(&texts);
        for vector in &mut vectors {
            normalize(vector);
        }

        let mut index = FlatIpIndex::new(self.engine.dimensions());
        index.add_all(vectors)?;
        debug_assert_eq!(index.len(), documents.len());

        if let Some(id) = dataset_id {
            if let Err(e) = self.persist(id, &documents, &index) {
                warn!(dataset_id = id, error = %e, "failed to persist index");
                return Ok(false);
            }
        }

        info!(
            documents = documents.len(),
            dims = index.dimension(),
            dataset_id = dataset_id.unwrap_or("-"),
            "similarity index built"
        );

        self.current = Some(DatasetIndex {
            dataset_id: dataset_id.map(str::to_string),
            documents,
            catalog,
            index,
        });
        Ok(true)
    }

    /// Embed document texts, chunked for large datasets. Chunking changes
    /// only the batching granularity, never content or order.
    fn embed_chunked(&self, texts: &[String]) -> Vec<Vec<f32>> {
        let batch_size = self.engine.batch_size();
        if texts.len() <= self.config.chunk_size {
            return self.engine.embed_batch(texts, batch_size);
        }

        let chunk_count = texts.len().div_ceil(self.config.chunk_size);
        info!(
            documents = texts.len(),
            chunks = chunk_count,
            "embedding large document set in chunks"
        );
        let mut vectors = Vec::with_capacity(texts.len());
        for (i, chunk) in texts.chunks(self.config.chunk_size).enumerate() {
            debug!(chunk = i + 1, of = chunk_count, "embedding chunk");
            vectors.extend(self.engine.embed_batch(chunk, batch_size));
        }
        vectors
    }

    fn try_load(&self, dataset_id: &str, dataset: &Dataset) -> CourierResult<Option<DatasetIndex>> {
        let dir = self.dataset_dir(dataset_id);
        let index_path = dir.join(INDEX_FILE);
        let documents_path = dir.join(DOCUMENTS_FILE);
        let descriptor_path = dir.join(DESCRIPTOR_FILE);

        // All three artifacts must exist for a cache hit.
        if !(index_path.exists() && documents_path.exists() && descriptor_path.exists()) {
            return Ok(None);
        }

        let descriptor: IndexDescriptor = read_json(&descriptor_path)?;
        if descriptor.dimension != self.engine.dimensions() {
            warn!(
                dataset_id,
                persisted = descriptor.dimension,
                active = self.engine.dimensions(),
                "embedding dimension changed, rebuilding index"
            );
            return Ok(None);
        }

        let documents: Vec<Document> = read_json(&documents_path)?;
        let index: FlatIpIndex = read_json(&index_path)?;

        if index.len() != documents.len() || documents.len() != descriptor.document_count {
            return Err(IndexError::CorruptArtifacts {
                dataset_id: dataset_id.to_string(),
                reason: format!(
                    "vectors={}, documents={}, descriptor={}",
                    index.len(),
                    documents.len(),
                    descriptor.document_count
                ),
            }
            .into());
        }

        // The catalog is cheap; re-derive it from the same dataset snapshot
        // so catalog and index can never skew.
        let catalog = self.builder.extract_catalog(dataset);

        Ok(Some(DatasetIndex {
            dataset_id: Some(dataset_id.to_string()),
            documents,
            catalog,
            index,
        }))
    }

    fn persist(
        &self,
        dataset_id: &str,
        documents: &[Document],
        index: &FlatIpIndex,
    ) -> CourierResult<()> {
        let dir = self.dataset_dir(dataset_id);
        fs::create_dir_all(&dir)?;

        let descriptor = IndexDescriptor {
            provider: self.engine.provider_name().to_string(),
            model: self.engine.model_name().to_string(),
            dimension: self.engine.dimensions(),
            document_count: documents.len(),
        };

        // Descriptor goes last: readers check it first, so the other two
        // artifacts must already be in place when it appears.
        write_json_atomic(&dir.join(INDEX_FILE), index)?;
        write_json_atomic(&dir.join(DOCUMENTS_FILE), &documents)?;
        write_json_atomic(&dir.join(DESCRIPTOR_FILE), &descriptor)?;

        debug!(dataset_id, documents = documents.len(), "index persisted");
        Ok(())
    }

    fn dataset_dir(&self, dataset_id: &str) -> PathBuf {
        Path::new(&self.config.root_dir).join(dataset_id)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> CourierResult<T> {
    let raw = fs::read(path)?;
    Ok(serde_json::from_slice(&raw)?)
}

/// Write JSON to a temp sibling, then rename over the target.
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> CourierResult<()> {
    let raw = serde_json::to_vec(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, raw)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
