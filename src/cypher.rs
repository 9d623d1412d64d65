//! Cypher statement composition and identifier sanitization.
//!
//! Label and property names are configuration values spliced directly into
//! statement text, which makes them an injection surface. Every composition
//! function in this module requires names that already passed
//! [`sanitize_identifier`]; [`crate::store::StoreConfig`] enforces this at
//! build time, so a config that exists is safe to splice.
//!
//! Statement parameters (`$metadata`, `$rows`, `$parentId`, ...) are always
//! passed out-of-band and never interpolated.

use crate::error::{Result, RetrieverError};
use crate::store::StoreConfig;

/// Validate a label or property name against the identifier grammar.
///
/// Accepted names match `[A-Za-z_][A-Za-z0-9_]*`. Anything else is
/// rejected with [`RetrieverError::InvalidIdentifier`] rather than escaped,
/// so a hostile name can never reach statement text.
pub fn sanitize_identifier(value: &str, what: &str) -> Result<()> {
    let mut chars = value.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(RetrieverError::InvalidIdentifier { what: what.to_string(), value: value.to_string() })
    }
}

/// Single-row parent write: `CREATE (:Parent $metadata)`.
pub fn parent_write_statement(config: &StoreConfig) -> String {
    format!("CREATE (:{} $metadata)", config.parent_label)
}

/// Batch child upsert without a parent edge.
///
/// Consumes the `$rows` parameter; each row carries the identity value,
/// node properties, and the embedding vector.
pub fn entity_creation_statement(config: &StoreConfig) -> String {
    format!(
        "UNWIND $rows AS row\n\
         MERGE (u:{label} {{{id}: row.{id}}})\n\
         SET u += row.props\n\
         WITH row, u\n\
         CALL db.create.setNodeVectorProperty(u, $embeddingProperty, row.embedding)\n\
         RETURN count(*)",
        label = config.label,
        id = config.id_property,
    )
}

/// Batch child upsert that links each created node to its parent through
/// a typed relationship.
pub fn child_link_statement(config: &StoreConfig, relationship: &str) -> String {
    format!(
        "UNWIND $rows AS row\n\
         MATCH (p:{parent_label} {{{parent_id}: $parentId}})\n\
         CREATE (p)-[:{relationship}]->(u:{label} {{{id}: row.{id}}})\n\
         SET u += row.props\n\
         WITH row, u\n\
         CALL db.create.setNodeVectorProperty(u, $embeddingProperty, row.embedding)\n\
         RETURN count(*)",
        parent_label = config.parent_label,
        parent_id = config.parent_id_property,
        label = config.label,
        id = config.id_property,
    )
}

/// Retrieval projection for direct (non-hierarchical) matches: each matched
/// node is itself a result row.
pub fn direct_retrieval_statement(config: &StoreConfig) -> String {
    format!(
        "RETURN properties(node) AS metadata, node.{id} AS {id}, node.{text} AS {text}, score",
        id = config.id_property,
        text = config.text_property,
    )
}

/// Retrieval aggregation that returns one row per distinct parent with the
/// best-scoring matched child's properties as metadata.
///
/// Matched nodes arrive sorted by score descending, so `head(collect(node))`
/// is the best child of each group. The `LIMIT` applies after grouping.
pub fn parent_best_child_retrieval_statement(config: &StoreConfig, relationship: &str) -> String {
    format!(
        "MATCH (node)<-[:{relationship}]-(parent)\n\
         WITH parent, max(score) AS score, head(collect(node)) AS best\n\
         RETURN parent.{text} AS text, score, properties(best) AS metadata\n\
         ORDER BY score DESC\n\
         LIMIT $maxResults",
        text = config.text_property,
    )
}

/// Retrieval aggregation that returns one row per distinct parent with all
/// matched children's texts appended to the parent's own text.
pub fn parent_concat_retrieval_statement(config: &StoreConfig, relationship: &str) -> String {
    format!(
        "MATCH (node)<-[:{relationship}]-(parent)\n\
         WITH parent, collect(node.{text}) AS chunks, max(score) AS score\n\
         RETURN parent.{text} + reduce(acc = \"\", c IN chunks | acc + \"\\n\\n\" + c) AS text,\n\
         \x20      score,\n\
         \x20      properties(parent) AS metadata\n\
         ORDER BY score DESC\n\
         LIMIT $maxResults",
        text = config.text_property,
    )
}

/// Vector index creation over the child label and embedding property.
pub fn vector_index_statement(config: &StoreConfig) -> String {
    format!(
        "CREATE VECTOR INDEX {index} IF NOT EXISTS\n\
         FOR (m:{label}) ON m.{embedding}\n\
         OPTIONS {{ indexConfig: {{\n\
         \x20   `vector.dimensions`: {dimension},\n\
         \x20   `vector.similarity_function`: 'cosine'\n\
         }}}}",
        index = config.index_name,
        label = config.label,
        embedding = config.embedding_property,
        dimension = config.dimension,
    )
}

/// Uniqueness constraint over the child label and identity property.
pub fn unique_constraint_statement(config: &StoreConfig) -> String {
    format!(
        "CREATE CONSTRAINT IF NOT EXISTS FOR (n:{label}) REQUIRE n.{id} IS UNIQUE",
        label = config.label,
        id = config.id_property,
    )
}
