//! Similarity search adapter: free text in, scored child matches out.

use tracing::debug;

use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::store::{ChildMatch, GraphVectorStore, SearchRequest};

/// Embed a query once and run a single similarity search against the store.
///
/// The store applies the score threshold, truncation, and descending
/// ordering; no client-side re-filtering or re-sorting happens here.
pub async fn similarity_search(
    embedder: &dyn EmbeddingProvider,
    store: &dyn GraphVectorStore,
    query: &str,
    max_results: usize,
    min_score: f64,
) -> Result<Vec<ChildMatch>> {
    let embedding = embedder.embed(query).await?;
    let matches =
        store.search(&SearchRequest { embedding, max_results, min_score }).await?;
    debug!(result_count = matches.len(), max_results, min_score, "similarity search completed");
    Ok(matches)
}
