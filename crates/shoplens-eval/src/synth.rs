//! Response synthesizer seam.
//!
//! The generator is a black box behind one trait and one prompt contract.
//! Both retrieval paths go through the same implementation with the same
//! query text and the same context shape, so neither path can drift into a
//! different prompt.

use std::sync::Arc;

use shoplens_core::error::{Error, Result};

use crate::chat::ChatModel;

const SYNTH_SYSTEM: &str = "You are a helpful product assistant for a shoe store. \
Use the provided product context to answer customer questions accurately. \
If the information is not in the context, say so honestly.";

#[async_trait::async_trait]
pub trait Synthesizer: Send + Sync {
    async fn generate(&self, query_text: &str, context_items: &[String]) -> Result<String>;
}

pub struct LlmSynthesizer {
    model: Arc<dyn ChatModel>,
}

impl LlmSynthesizer {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }
}

#[async_trait::async_trait]
impl Synthesizer for LlmSynthesizer {
    async fn generate(&self, query_text: &str, context_items: &[String]) -> Result<String> {
        if context_items.is_empty() {
            return Ok("No products found matching your query.".to_string());
        }
        let context = context_items.join("\n\n");
        let prompt = format!(
            "Based on the following product information:\n\n{}\n\nPlease answer this question: {}",
            context, query_text
        );
        self.model
            .complete(SYNTH_SYSTEM, &prompt)
            .await
            .map_err(|e| Error::Synthesis(e.to_string()))
    }
}
