//! End-to-end indexing and retrieval tests over the in-memory store.

mod common;

use std::sync::Arc;

use common::{CannedChatModel, KeywordEmbedder, test_vocabulary};
use serde_json::Value;

use ragtree::{
    Document, EmbeddingProvider, GraphRetriever, GraphVectorStore, InMemoryGraphStore, Metadata,
    ParagraphSplitter, RetrieverError, RetrieverVariant, SearchRequest, Segment, SentenceSplitter,
};

fn embedder() -> Arc<KeywordEmbedder> {
    Arc::new(KeywordEmbedder::new(&test_vocabulary()))
}

fn two_topic_document() -> Document {
    Document::new(
        "Quantum mechanics studies particles. A fundamental theory in physics.\n\n\
         Spaghetti carbonara is a classic Italian pasta dish.",
    )
}

fn learning_document() -> Document {
    Document::new(
        "Machine learning is a field of computer science. Machine learning models learn from data.\n\n\
         Deep learning extends machine learning with neural networks.",
    )
}

#[tokio::test]
async fn plain_retriever_returns_the_matching_paragraph() {
    let retriever = GraphRetriever::builder()
        .embedding_provider(embedder())
        .max_results(1)
        .min_score(0.4)
        .build()
        .unwrap();

    retriever.index(&two_topic_document(), &ParagraphSplitter, None).await.unwrap();

    let contents = retriever.retrieve("fundamental theory").await.unwrap();
    assert_eq!(contents.len(), 1);
    assert!(contents[0].text.contains("fundamental theory"));
    assert!(contents[0].score.unwrap() >= 0.4);
}

#[tokio::test]
async fn parent_child_retriever_dedupes_parents() {
    let retriever = GraphRetriever::builder()
        .variant(RetrieverVariant::ParentChild)
        .embedding_provider(embedder())
        .max_results(5)
        .min_score(0.2)
        .build()
        .unwrap();

    retriever
        .index(&learning_document(), &ParagraphSplitter, Some(&SentenceSplitter))
        .await
        .unwrap();

    let contents = retriever.retrieve("Machine Learning").await.unwrap();

    // Three child sentences match, but they collapse into two parents.
    assert_eq!(contents.len(), 2);
    // Best-scoring parent first, each returning its own stored text.
    assert!(contents[0].text.starts_with("Deep learning extends machine learning"));
    assert!(contents[1].text.starts_with("Machine learning is a field of computer science."));
    assert!(contents[0].score.unwrap() >= contents[1].score.unwrap());
    // Matched children are appended after the parent's own text.
    assert!(contents[1].text.contains("\n\n"));
    for content in &contents {
        assert!(content.score.unwrap() >= 0.2);
    }
}

#[tokio::test]
async fn restrictive_threshold_narrows_to_one_parent() {
    let retriever = GraphRetriever::builder()
        .variant(RetrieverVariant::ParentChild)
        .embedding_provider(embedder())
        .max_results(5)
        .min_score(0.6)
        .build()
        .unwrap();

    retriever
        .index(&learning_document(), &ParagraphSplitter, Some(&SentenceSplitter))
        .await
        .unwrap();

    let contents = retriever.retrieve("Machine Learning").await.unwrap();
    assert_eq!(contents.len(), 1);
    assert!(contents[0].text.starts_with("Deep learning"));
}

#[tokio::test]
async fn result_limit_applies_after_parent_grouping() {
    let retriever = GraphRetriever::builder()
        .variant(RetrieverVariant::ParentChild)
        .embedding_provider(embedder())
        .max_results(2)
        .min_score(0.2)
        .build()
        .unwrap();

    retriever
        .index(&learning_document(), &ParagraphSplitter, Some(&SentenceSplitter))
        .await
        .unwrap();

    // Two child matches survive the child-level truncation and land in two
    // distinct parents; both parents must come back.
    let contents = retriever.retrieve("Machine Learning").await.unwrap();
    assert_eq!(contents.len(), 2);
}

#[tokio::test]
async fn transform_and_answer_models_compose() {
    let transform_model = Arc::new(CannedChatModel::new("Naruto"));
    let answer_model = Arc::new(CannedChatModel::new("dattebayo"));

    let retriever = GraphRetriever::builder()
        .variant(RetrieverVariant::HypotheticalQuestion)
        .embedding_provider(embedder())
        .transform_model(transform_model.clone())
        .answer_model(answer_model.clone())
        .max_results(3)
        .min_score(0.0)
        .build()
        .unwrap();

    let document = Document::new("Machine learning is a field of computer science.");
    retriever.index(&document, &ParagraphSplitter, Some(&SentenceSplitter)).await.unwrap();

    // The transform ran with the variant's built-in prompt pair over the
    // raw parent text.
    let transform_messages = transform_model.last_messages();
    assert!(transform_messages[0].content.contains("hypothetical questions"));
    assert!(transform_messages[1].content.contains("Machine learning is a field"));

    let contents = retriever.retrieve("machine learning models").await.unwrap();

    // Answer synthesis collapses everything into one item; the transform
    // output never surfaces in the final answer.
    assert_eq!(contents.len(), 1);
    assert!(contents[0].text.contains("dattebayo"));
    assert!(!contents[0].text.contains("Naruto"));
    assert!(contents[0].score.is_none());

    // The composed prompt carried the retrieved context and the question.
    let answer_messages = answer_model.last_messages();
    assert_eq!(answer_messages.len(), 1);
    assert!(answer_messages[0].content.contains("Naruto"));
    assert!(answer_messages[0].content.contains("machine learning models"));
}

#[tokio::test]
async fn answer_synthesis_runs_even_with_no_matches() {
    let answer_model = Arc::new(CannedChatModel::new("no idea"));

    let retriever = GraphRetriever::builder()
        .variant(RetrieverVariant::ParentChild)
        .embedding_provider(embedder())
        .answer_model(answer_model.clone())
        .max_results(3)
        .min_score(0.95)
        .build()
        .unwrap();

    retriever
        .index(&learning_document(), &ParagraphSplitter, Some(&SentenceSplitter))
        .await
        .unwrap();

    let contents = retriever.retrieve("spaghetti carbonara").await.unwrap();
    assert_eq!(contents.len(), 1);
    assert_eq!(contents[0].text, "no idea");
}

#[tokio::test]
async fn question_variant_surfaces_best_child_metadata() {
    let transform_model = Arc::new(CannedChatModel::new("Naruto"));

    let retriever = GraphRetriever::builder()
        .variant(RetrieverVariant::HypotheticalQuestion)
        .embedding_provider(embedder())
        .transform_model(transform_model)
        .max_results(3)
        .min_score(0.5)
        .build()
        .unwrap();

    let document = Document::new("Machine learning is a field of computer science.");
    retriever.index(&document, &ParagraphSplitter, Some(&SentenceSplitter)).await.unwrap();

    // The generated question is the embedded surface; the parent node's
    // text (also the transform output here) is what comes back.
    let contents = retriever.retrieve("naruto").await.unwrap();
    assert_eq!(contents.len(), 1);
    assert_eq!(contents[0].text, "Naruto");
    let child_id = contents[0].metadata["id"].as_str().unwrap();
    assert!(child_id.starts_with("parent_0_"));
    assert_eq!(contents[0].metadata["parentId"], "parent_0");
}

#[tokio::test]
async fn seeded_parents_match_only_the_relevant_topic() {
    let embedder = embedder();
    let config =
        RetrieverVariant::HypotheticalQuestion.default_store_config(embedder.dimensions()).unwrap();
    let store = Arc::new(InMemoryGraphStore::new(config));

    let topics = [
        ("parent_0", "ml", "Machine learning models learn from data."),
        ("parent_1", "food", "Spaghetti carbonara is a classic Italian pasta dish."),
        ("parent_2", "science", "Quantum physics explains reality."),
    ];
    for (parent_id, source, text) in topics {
        let mut metadata = Metadata::new();
        metadata.insert("parentId".into(), parent_id.into());
        metadata.insert("text".into(), text.into());
        metadata.insert("source".into(), source.into());
        let mut params = Metadata::new();
        params.insert("metadata".into(), Value::Object(metadata));
        store.run_write("CREATE (:Parent $metadata)", params).await.unwrap();

        let mut child = Segment::new(text);
        child.metadata.insert("id".into(), format!("{parent_id}_child").into());
        child.metadata.insert("source".into(), source.into());
        let embedding = embedder.embed(text).await.unwrap();
        let mut extra = Metadata::new();
        extra.insert("parentId".into(), parent_id.into());
        store.add_all(&[embedding], &[child], &extra).await.unwrap();
    }

    let retriever = GraphRetriever::builder()
        .variant(RetrieverVariant::HypotheticalQuestion)
        .embedding_provider(embedder)
        .store(store)
        .max_results(3)
        .min_score(0.6)
        .build()
        .unwrap();

    let contents = retriever.retrieve("quantum physics").await.unwrap();
    assert_eq!(contents.len(), 1);
    assert_eq!(contents[0].metadata["source"], "science");
    assert_eq!(contents[0].text, "Quantum physics explains reality.");
}

#[tokio::test]
async fn child_identity_carries_parent_and_caller_lineage() {
    let embedder = embedder();
    let retriever = GraphRetriever::builder()
        .variant(RetrieverVariant::ParentChild)
        .embedding_provider(embedder.clone())
        .max_results(10)
        .min_score(-1.0)
        .build()
        .unwrap();

    let mut metadata = Metadata::new();
    metadata.insert("id".into(), "doc-ai".into());
    let document = Document::with_metadata(
        "Machine learning is a field of computer science. Machine learning models learn from data.",
        metadata,
    );
    retriever.index(&document, &ParagraphSplitter, Some(&SentenceSplitter)).await.unwrap();

    let query_embedding = embedder.embed("machine learning").await.unwrap();
    let matches = retriever
        .store()
        .search(&SearchRequest { embedding: query_embedding, max_results: 10, min_score: -1.0 })
        .await
        .unwrap();

    assert_eq!(matches.len(), 2);
    let mut seen = std::collections::HashSet::new();
    for m in &matches {
        let id = m.segment.metadata["id"].as_str().unwrap();
        assert!(id.starts_with("parent_0_doc-ai_"), "unexpected identity {id}");
        assert_eq!(m.segment.metadata["parentId"], "parent_0");
        assert!(seen.insert(id.to_string()));
    }
}

#[tokio::test]
async fn incomplete_transform_prompt_pair_is_rejected() {
    let err = GraphRetriever::builder()
        .variant(RetrieverVariant::Summary)
        .embedding_provider(embedder())
        .transform_model(Arc::new(CannedChatModel::new("summary")))
        .system_prompt("You summarize.")
        .max_results(3)
        .min_score(0.0)
        .build()
        .unwrap_err();
    assert!(matches!(err, RetrieverError::Config(_)));
    assert!(err.to_string().contains("together"));
}

#[tokio::test]
async fn plain_variant_has_no_default_transform_prompts() {
    let err = GraphRetriever::builder()
        .embedding_provider(embedder())
        .transform_model(Arc::new(CannedChatModel::new("echo")))
        .max_results(3)
        .min_score(0.0)
        .build()
        .unwrap_err();
    assert!(matches!(err, RetrieverError::Config(_)));
}

#[tokio::test]
async fn builder_requires_embedder_and_positive_max_results() {
    let err = GraphRetriever::builder().max_results(3).min_score(0.0).build().unwrap_err();
    assert!(err.to_string().contains("embedding_provider"));

    let err = GraphRetriever::builder()
        .embedding_provider(embedder())
        .max_results(0)
        .min_score(0.0)
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("max_results"));

    let err = GraphRetriever::builder()
        .embedding_provider(embedder())
        .max_results(3)
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("min_score"));
}
