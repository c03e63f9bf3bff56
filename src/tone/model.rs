//! Emotion classification backed by an `LlmProvider`.

use std::sync::Arc;

use async_trait::async_trait;

use super::EmotionModel;
use crate::error::LlmError;
use crate::llm::provider::{ChatMessage, CompletionRequest, LlmProvider};

/// Labels the model is asked to choose from.
pub const EMOTION_LABELS: &[&str] = &[
    "anger", "disgust", "fear", "joy", "neutral", "sadness", "surprise",
];

/// One worked exchange shown before the real message.
const EXAMPLE_MESSAGE: &str = "Thanks so much, the pilot results are fantastic!";
const EXAMPLE_LABEL: &str = "joy";

const CLASSIFY_TEMPERATURE: f32 = 0.0;
const CLASSIFY_MAX_TOKENS: u32 = 5;

/// Emotion model that asks an LLM for a single label.
pub struct LlmEmotionModel {
    llm: Arc<dyn LlmProvider>,
}

impl LlmEmotionModel {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }
}

fn build_system_prompt() -> String {
    format!(
        "You are an emotion classifier for business email. Read the message and answer \
         with exactly one word, the dominant emotion, chosen from: {}.\n\
         Answer with the label only. No punctuation, no explanation.",
        EMOTION_LABELS.join(", ")
    )
}

/// First word of the reply, lowercased, stripped of punctuation.
fn parse_label(raw: &str) -> Option<String> {
    let word = raw
        .split_whitespace()
        .next()?
        .trim_matches(|c: char| !c.is_alphabetic())
        .to_lowercase();
    (!word.is_empty()).then_some(word)
}

#[async_trait]
impl EmotionModel for LlmEmotionModel {
    fn name(&self) -> &str {
        self.llm.model_name()
    }

    async fn classify(&self, text: &str) -> Result<String, LlmError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(build_system_prompt()),
            ChatMessage::user(EXAMPLE_MESSAGE),
            ChatMessage::assistant(EXAMPLE_LABEL),
            ChatMessage::user(text),
        ])
        .with_temperature(CLASSIFY_TEMPERATURE)
        .with_max_tokens(CLASSIFY_MAX_TOKENS);

        let response = self.llm.complete(request).await?;
        parse_label(&response.content).ok_or_else(|| LlmError::InvalidResponse {
            provider: self.llm.model_name().to_string(),
            reason: format!("no emotion label in {:?}", response.content),
        })
    }
}
