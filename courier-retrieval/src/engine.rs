//! RetrievalEngine: the hybrid retrieval orchestrator.
//!
//! Pipeline per query: direct lookup → intent classification → keyword
//! branch → vector supplement → diversity backfill → final selection.
//! Stateless between calls. Any failure inside the pipeline is converted to
//! an empty result list at this boundary; the only caller-visible failure
//! mode is "no context found".

use std::collections::HashSet;
use std::sync::Mutex;

use tracing::{debug, info, warn};

use courier_core::config::{FieldBindings, RetrievalConfig};
use courier_core::dataset::Dataset;
use courier_core::errors::{CourierResult, RetrievalError};
use courier_core::models::{DegradationEvent, RetrievedContext};
use courier_core::QueryIntent;
use courier_embeddings::EmbeddingEngine;
use courier_index::{DatasetIndex, IndexStore};

use crate::diversity::{self, result_code};
use crate::intent::classify;
use crate::{direct, keyword};

/// Hybrid retrieval over one built dataset index.
pub struct RetrievalEngine<'a> {
    dataset: &'a Dataset,
    index: &'a DatasetIndex,
    embedder: &'a EmbeddingEngine,
    bindings: FieldBindings,
    config: RetrievalConfig,
    events: Mutex<Vec<DegradationEvent>>,
}

impl<'a> RetrievalEngine<'a> {
    pub fn new(
        dataset: &'a Dataset,
        index: &'a DatasetIndex,
        embedder: &'a EmbeddingEngine,
        bindings: FieldBindings,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            dataset,
            index,
            embedder,
            bindings,
            config,
            events: Mutex::new(Vec::new()),
        }
    }

    /// Convenience constructor over an index store's current index.
    ///
    /// Fails only when no index has been built yet.
    pub fn for_store(
        store: &'a IndexStore,
        dataset: &'a Dataset,
        bindings: FieldBindings,
        config: RetrievalConfig,
    ) -> CourierResult<Self> {
        let index = store.current().ok_or(RetrievalError::IndexNotBuilt)?;
        Ok(Self::new(dataset, index, store.engine(), bindings, config))
    }

    /// Retrieve ranked context for a query.
    ///
    /// Never fails: pipeline errors degrade to an empty result list and a
    /// degradation event.
    pub fn retrieve(&self, query: &str, top_k: usize) -> Vec<RetrievedContext> {
        match self.run_pipeline(query, top_k) {
            Ok(results) => results,
            Err(e) => {
                warn!(error = %e, "retrieval pipeline failed, returning empty context");
                let mut events = self.events.lock().unwrap_or_else(|p| p.into_inner());
                events.push(DegradationEvent::now(
                    "retrieval",
                    e.to_string(),
                    "empty-context",
                ));
                Vec::new()
            }
        }
    }

    /// Classify the query the way the pipeline does (exposed for callers
    /// that want the intent alongside the results).
    pub fn classify(&self, query: &str) -> QueryIntent {
        classify(query, &self.index.catalog)
    }

    /// Drain degradation events recorded by failed pipelines.
    pub fn drain_degradation_events(&self) -> Vec<DegradationEvent> {
        let mut events = self.events.lock().unwrap_or_else(|p| p.into_inner());
        std::mem::take(&mut *events)
    }

    fn run_pipeline(&self, query: &str, top_k: usize) -> CourierResult<Vec<RetrievedContext>> {
        // Step 1: direct lookup.
        let mut results = direct::direct_lookup(query, self.dataset, self.index, &self.bindings);

        // Step 2: intent classification.
        let intent = classify(query, &self.index.catalog);
        debug!(?intent, "query classified");

        // Step 3: keyword search (one branch fires).
        results.extend(keyword::keyword_search(&intent, self.index, &self.bindings));

        // Step 4: vector search always supplements; exact duplicates by
        // content string are dropped.
        let seen: HashSet<&str> = results.iter().map(|r| r.content.as_str()).collect();
        let vector_results = self.vector_search(query, top_k, &seen)?;
        results.extend(vector_results);

        // Step 5: diversity backfill for generic event-type queries. The
        // widened selection cap applies whenever the stage is eligible, so
        // coverage produced upstream survives selection too.
        let diversified = intent.about_event_type && intent.mentioned_codes.is_empty();
        diversity::backfill(&mut results, &intent, self.index, &self.bindings, top_k);

        // Step 6: final selection.
        let results = self.select(results, &intent, top_k, diversified);

        info!(
            query_len = query.len(),
            results = results.len(),
            "retrieval complete"
        );
        Ok(results)
    }

    fn vector_search(
        &self,
        query: &str,
        top_k: usize,
        seen: &HashSet<&str>,
    ) -> CourierResult<Vec<RetrievedContext>> {
        let query_vector = self.embedder.embed_one(query);
        let fetch = top_k.max(1) * self.config.vector_overfetch.max(1);
        let (scores, indices) = self.index.search(&query_vector, fetch)?;

        let mut results = Vec::new();
        for (score, idx) in scores.into_iter().zip(indices) {
            // The index pads with -1 when the corpus is smaller than k.
            if idx < 0 || idx as usize >= self.index.documents.len() {
                continue;
            }
            let document = &self.index.documents[idx as usize];
            if seen.contains(document.text.as_str()) {
                continue;
            }
            results.push(RetrievedContext {
                content: document.text.clone(),
                metadata: document.metadata.clone(),
                similarity: score.clamp(0.0, 1.0),
                source: courier_core::ContextSource::Vector,
            });
        }
        Ok(results)
    }

    /// Sort by similarity (source priority breaks ties), then pick.
    ///
    /// With explicitly mentioned codes, one result per mentioned code is
    /// admitted first so no code goes unserved, then the best remaining
    /// results fill up to `top_k`. Diversity-backfilled queries keep up to
    /// twice `top_k` so the coverage the backfill added survives selection.
    fn select(
        &self,
        mut results: Vec<RetrievedContext>,
        intent: &QueryIntent,
        top_k: usize,
        diversified: bool,
    ) -> Vec<RetrievedContext> {
        results.sort_by(RetrievedContext::ranking_cmp);

        // One block per distinct content; the best-ranked instance wins.
        let mut seen: HashSet<String> = HashSet::new();
        let mut results: Vec<RetrievedContext> = results
            .into_iter()
            .filter(|r| seen.insert(r.content.clone()))
            .collect();

        if !intent.mentioned_codes.is_empty() {
            let mut admitted = vec![false; results.len()];
            let mut selected: Vec<RetrievedContext> = Vec::new();

            for code in &intent.mentioned_codes {
                let position = results.iter().enumerate().position(|(i, r)| {
                    !admitted[i] && result_code(r, &self.bindings).as_deref() == Some(code.as_str())
                });
                if let Some(i) = position {
                    admitted[i] = true;
                    selected.push(results[i].clone());
                }
            }

            for (i, result) in results.iter().enumerate() {
                if selected.len() >= top_k {
                    break;
                }
                if !admitted[i] {
                    admitted[i] = true;
                    selected.push(result.clone());
                }
            }

            selected.sort_by(RetrievedContext::ranking_cmp);
            return selected;
        }

        let cap = if diversified {
            top_k * courier_core::config::defaults::DIVERSITY_CAP_FACTOR
        } else {
            top_k
        };
        results.truncate(cap);
        results
    }
}
