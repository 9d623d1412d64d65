//! Named retriever variants.
//!
//! The parent/child engine is one parametrized machine; the variants are
//! configuration presets over it: which relationship type links the two
//! levels, how child matches aggregate into results, which statement
//! templates a graph backend runs, and which transform prompts (if any)
//! rewrite parent text at index time.

use crate::aggregate::AggregationMode;
use crate::cypher;
use crate::error::Result;
use crate::store::StoreConfig;

/// Built-in system prompt for the summary transform.
pub const SUMMARY_SYSTEM_PROMPT: &str = "You are generating concise and accurate summaries \
based on the information found in the text.\n";

/// Built-in user prompt for the summary transform.
pub const SUMMARY_USER_PROMPT: &str = "\
Generate a summary of the following input:
{{input}}

Summary:
";

/// Built-in system prompt for the hypothetical-question transform.
pub const QUESTION_SYSTEM_PROMPT: &str = "You are generating hypothetical questions based on \
the information found in the text. Make sure to provide full context in the generated \
questions.\n";

/// Built-in user prompt for the hypothetical-question transform.
pub const QUESTION_USER_PROMPT: &str = "\
Use the given format to generate hypothetical questions from the following input:
{{input}}

Hypothetical questions:
";

/// A retrieval policy preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrieverVariant {
    /// Single-level matching: embedded nodes are returned directly, with no
    /// parent traversal.
    Plain,
    /// Parent/child matching where each result is the parent's text with
    /// all matching children's texts appended, linked by `HAS_CHILD`.
    ParentChild,
    /// Children are language-model-generated hypothetical questions linked
    /// by `HAS_QUESTION`; results carry the parent's stored text.
    HypotheticalQuestion,
    /// Children are language-model-generated summaries linked by
    /// `HAS_SUMMARY`; results carry the parent's stored text.
    Summary,
}

impl RetrieverVariant {
    /// The parent-to-child relationship type, if this variant links levels.
    pub fn relationship(&self) -> Option<&'static str> {
        match self {
            RetrieverVariant::Plain => None,
            RetrieverVariant::ParentChild => Some("HAS_CHILD"),
            RetrieverVariant::HypotheticalQuestion => Some("HAS_QUESTION"),
            RetrieverVariant::Summary => Some("HAS_SUMMARY"),
        }
    }

    /// How this variant collapses child matches into results.
    pub fn aggregation_mode(&self) -> AggregationMode {
        match self {
            RetrieverVariant::Plain => AggregationMode::Direct,
            RetrieverVariant::ParentChild => AggregationMode::ParentConcatChildren,
            RetrieverVariant::HypotheticalQuestion | RetrieverVariant::Summary => {
                AggregationMode::ParentBestChild
            }
        }
    }

    /// The built-in transform prompt pair, for variants whose child level
    /// is language-model-generated.
    pub fn default_transform_prompts(&self) -> Option<(&'static str, &'static str)> {
        match self {
            RetrieverVariant::HypotheticalQuestion => {
                Some((QUESTION_SYSTEM_PROMPT, QUESTION_USER_PROMPT))
            }
            RetrieverVariant::Summary => Some((SUMMARY_SYSTEM_PROMPT, SUMMARY_USER_PROMPT)),
            RetrieverVariant::Plain | RetrieverVariant::ParentChild => None,
        }
    }

    /// Default store configuration for this variant's label, index, and
    /// relationship type.
    pub fn default_store_config(&self, dimension: usize) -> Result<StoreConfig> {
        let builder = StoreConfig::builder().dimension(dimension);
        let builder = match self.relationship() {
            None => builder,
            Some(relationship) => {
                let (label, index_name) = match self {
                    RetrieverVariant::Summary => ("Summary", "summary_embedding_index"),
                    _ => ("Child", "child_embedding_index"),
                };
                builder.label(label).index_name(index_name).relationship(relationship)
            }
        };
        builder.build()
    }

    /// Default parent-write statement, `None` for the single-level variant.
    pub fn default_parent_write(&self, config: &StoreConfig) -> Option<String> {
        match self {
            RetrieverVariant::Plain => None,
            _ => Some(cypher::parent_write_statement(config)),
        }
    }

    /// The retrieval statement a Cypher-capable backend runs for this
    /// variant, appended to the store's vector-search clause.
    pub fn retrieval_statement(&self, config: &StoreConfig) -> String {
        match self {
            RetrieverVariant::Plain => cypher::direct_retrieval_statement(config),
            RetrieverVariant::ParentChild => {
                cypher::parent_concat_retrieval_statement(config, "HAS_CHILD")
            }
            RetrieverVariant::HypotheticalQuestion => {
                cypher::parent_best_child_retrieval_statement(config, "HAS_QUESTION")
            }
            RetrieverVariant::Summary => {
                cypher::parent_best_child_retrieval_statement(config, "HAS_SUMMARY")
            }
        }
    }

    /// The batch child-write statement a Cypher-capable backend runs for
    /// this variant.
    pub fn creation_statement(&self, config: &StoreConfig) -> String {
        match self.relationship() {
            None => cypher::entity_creation_statement(config),
            Some(relationship) => cypher::child_link_statement(config, relationship),
        }
    }
}
