//! Chat model trait and prompt templating.
//!
//! The [`ChatModel`] trait is the crate's only surface to a language model.
//! It is consumed in two roles: transforming parent text at index time
//! (summaries, hypothetical questions) and synthesizing a single answer from
//! aggregated context at retrieval time.

use async_trait::async_trait;

use crate::error::Result;

/// The role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// A system instruction.
    System,
    /// A user turn.
    User,
}

/// A single message in a chat exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    /// The message role.
    pub role: Role,
    /// The message text.
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// A chat-capable language model.
///
/// The core performs no retry, backoff, or error wrapping around these
/// calls; failures propagate to the caller as-is.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send a sequence of messages and return the model's text reply.
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// A minimal prompt template with `{{variable}}` placeholders.
///
/// # Example
///
/// ```rust,ignore
/// use ragtree::PromptTemplate;
///
/// let template = PromptTemplate::new("Summarize: {{input}}");
/// let prompt = template.apply(&[("input", "some text")]);
/// assert_eq!(prompt, "Summarize: some text");
/// ```
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Create a template from the given text.
    pub fn new(template: impl Into<String>) -> Self {
        Self { template: template.into() }
    }

    /// Substitute each `{{name}}` placeholder with its bound value.
    ///
    /// Placeholders with no binding are left untouched.
    pub fn apply(&self, variables: &[(&str, &str)]) -> String {
        let mut text = self.template.clone();
        for (name, value) in variables {
            text = text.replace(&format!("{{{{{name}}}}}"), value);
        }
        text
    }
}

/// Default instruction prefix for the answer-synthesis model.
pub const DEFAULT_ANSWER_PROMPT: &str = "You are an assistant that helps to form nice and human \
understandable answers based on the provided information from tools. \
Do not add any other information that wasn't present in the tools, and use \
very concise style in interpreting results!\n";

/// Template appended to the answer prompt, binding `context` and `question`.
pub(crate) const ANSWER_TEMPLATE: &str = "\
Answer the question based only on the context provided.

Context: {{context}}

Question: {{question}}

Answer:
";
