//! Shared test doubles: a deterministic embedder and a canned chat model.

use std::sync::Mutex;

use async_trait::async_trait;

use ragtree::{ChatMessage, ChatModel, EmbeddingProvider, Result};

/// A deterministic bag-of-words embedder over a closed vocabulary.
///
/// Each vocabulary word owns one dimension; embedding a text counts word
/// occurrences and L2-normalizes the vector, so cosine scores between test
/// texts are exactly predictable. Words outside the vocabulary are ignored.
pub struct KeywordEmbedder {
    vocabulary: Vec<&'static str>,
}

impl KeywordEmbedder {
    pub fn new(vocabulary: &[&'static str]) -> Self {
        Self { vocabulary: vocabulary.to_vec() }
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.vocabulary.len()];
        for word in text.split(|c: char| !c.is_alphanumeric()) {
            if word.is_empty() {
                continue;
            }
            let word = word.to_lowercase();
            if let Some(i) = self.vocabulary.iter().position(|v| *v == word) {
                vector[i] += 1.0;
            }
        }
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.vocabulary.len()
    }
}

/// The closed vocabulary every end-to-end test text draws from.
pub fn test_vocabulary() -> Vec<&'static str> {
    vec![
        "quantum", "mechanics", "studies", "particles", "a", "fundamental", "theory", "in",
        "physics", "spaghetti", "carbonara", "is", "classic", "italian", "pasta", "dish",
        "machine", "learning", "field", "of", "computer", "science", "models", "learn", "from",
        "data", "deep", "extends", "with", "neural", "networks", "have", "many", "layers",
        "naruto", "explains", "reality",
    ]
}

/// A chat model that always replies with a fixed text and records the
/// messages it was sent.
pub struct CannedChatModel {
    reply: String,
    messages: Mutex<Vec<ChatMessage>>,
}

impl CannedChatModel {
    pub fn new(reply: impl Into<String>) -> Self {
        Self { reply: reply.into(), messages: Mutex::new(Vec::new()) }
    }

    /// The messages from the most recent call.
    pub fn last_messages(&self) -> Vec<ChatMessage> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for CannedChatModel {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        *self.messages.lock().unwrap() = messages.to_vec();
        Ok(self.reply.clone())
    }
}
