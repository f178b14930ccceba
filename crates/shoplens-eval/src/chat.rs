//! Chat-model seam shared by the judge and the synthesizer.

use std::collections::VecDeque;
use std::sync::Mutex;

use genai::chat::{ChatMessage, ChatRequest};
use genai::Client;

#[async_trait::async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> anyhow::Result<String>;
}

/// Provider-backed model via `genai`; the model name decides the provider.
pub struct GenaiModel {
    client: Client,
    model: String,
}

impl GenaiModel {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: Client::default(),
            model: model.into(),
        }
    }
}

#[async_trait::async_trait]
impl ChatModel for GenaiModel {
    async fn complete(&self, system: &str, prompt: &str) -> anyhow::Result<String> {
        let req = ChatRequest::new(vec![
            ChatMessage::system(system),
            ChatMessage::user(prompt),
        ]);
        let resp = self.client.exec_chat(&self.model, req, None).await?;
        Ok(resp.first_text().unwrap_or_default().to_string())
    }
}

/// Scripted model for tests: returns canned replies in order, then errors.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
}

impl ScriptedModel {
    pub fn new<S: Into<String>>(replies: Vec<S>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
        }
    }
}

#[async_trait::async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, _system: &str, _prompt: &str) -> anyhow::Result<String> {
        let mut replies = self
            .replies
            .lock()
            .map_err(|_| anyhow::anyhow!("scripted model poisoned"))?;
        replies
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("scripted model exhausted"))
    }
}
