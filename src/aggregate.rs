//! Aggregation and ranking of child-level matches.
//!
//! Child matches are collapsed into deduplicated parent-level results:
//! group by owning parent, take the maximum child score as the group's
//! representative score, order groups by that score descending, and
//! truncate to the requested result count only after grouping (truncating
//! before grouping would under-return whenever several matched children
//! collapse into one parent). This mirrors the declarative statements in
//! [`crate::cypher`], executed in-process over store-resolved parent edges.

use serde_json::Value;
use tracing::debug;

use crate::document::RetrievedContent;
use crate::error::Result;
use crate::store::{ChildMatch, GraphVectorStore, ParentRecord};

/// How child matches are collapsed into results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationMode {
    /// No parent traversal: each matched node is itself a result.
    Direct,
    /// One result per parent: the parent's stored text, with the
    /// best-scoring matched child's properties as result metadata.
    ParentBestChild,
    /// One result per parent: the parent's stored text followed by every
    /// matched child's text in match order, separated by blank lines, with
    /// the parent's properties as result metadata.
    ParentConcatChildren,
}

/// Collapse matches into ranked results, resolving parent edges through the
/// store.
///
/// `matches` must already be sorted by score descending, as returned by
/// [`GraphVectorStore::search`]. Matched children without a resolvable
/// parent edge are skipped in the parent modes; an empty result is a valid
/// outcome, not an error.
pub async fn aggregate(
    store: &dyn GraphVectorStore,
    matches: Vec<ChildMatch>,
    mode: AggregationMode,
    max_results: usize,
) -> Result<Vec<RetrievedContent>> {
    if mode == AggregationMode::Direct {
        return Ok(matches
            .into_iter()
            .map(|m| RetrievedContent {
                text: m.segment.text,
                score: Some(m.score),
                metadata: m.segment.metadata,
            })
            .collect());
    }

    let id_property = store.config().id_property.clone();
    let mut resolved: Vec<(ChildMatch, ParentRecord)> = Vec::with_capacity(matches.len());
    for m in matches {
        let child_id = match m.segment.metadata.get(&id_property).and_then(Value::as_str) {
            Some(child_id) => child_id.to_string(),
            None => {
                debug!("matched child has no identity value; skipping");
                continue;
            }
        };
        match store.parent_of(&child_id).await? {
            Some(parent) => resolved.push((m, parent)),
            None => debug!(child_id = %child_id, "matched child has no parent edge; skipping"),
        }
    }

    Ok(group_matches(resolved, mode, max_results))
}

/// Pure grouping step over `(match, parent)` pairs already sorted by score
/// descending.
///
/// Because input order is score-descending, each parent's first occurrence
/// carries its maximum child score, so groups emerge already ranked and no
/// re-sort is needed.
pub(crate) fn group_matches(
    resolved: Vec<(ChildMatch, ParentRecord)>,
    mode: AggregationMode,
    max_results: usize,
) -> Vec<RetrievedContent> {
    struct Group {
        parent: ParentRecord,
        best_score: f64,
        best_child: ChildMatch,
        child_texts: Vec<String>,
    }

    let mut order: Vec<String> = Vec::new();
    let mut groups: std::collections::HashMap<String, Group> = std::collections::HashMap::new();

    for (m, parent) in resolved {
        match groups.get_mut(&parent.parent_id) {
            Some(group) => group.child_texts.push(m.segment.text.clone()),
            None => {
                order.push(parent.parent_id.clone());
                groups.insert(
                    parent.parent_id.clone(),
                    Group {
                        parent,
                        best_score: m.score,
                        best_child: m.clone(),
                        child_texts: vec![m.segment.text],
                    },
                );
            }
        }
    }

    order
        .into_iter()
        .take(max_results)
        .filter_map(|parent_id| groups.remove(&parent_id))
        .map(|group| {
            match mode {
                AggregationMode::Direct => unreachable!("handled before grouping"),
                AggregationMode::ParentBestChild => RetrievedContent {
                    text: group.parent.text,
                    score: Some(group.best_score),
                    metadata: group.best_child.segment.metadata,
                },
                AggregationMode::ParentConcatChildren => {
                    let mut text = group.parent.text;
                    for chunk in &group.child_texts {
                        text.push_str("\n\n");
                        text.push_str(chunk);
                    }
                    RetrievedContent {
                        text,
                        score: Some(group.best_score),
                        metadata: group.parent.properties,
                    }
                }
            }
        })
        .collect()
}
