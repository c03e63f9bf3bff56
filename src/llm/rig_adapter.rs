//! Bridges a rig `CompletionModel` to our `LlmProvider` trait.

use async_trait::async_trait;
use rig::completion::{AssistantContent, CompletionModel, Message as RigMessage};

use crate::error::LlmError;
use crate::llm::provider::{
    ChatMessage, CompletionRequest, CompletionResponse, LlmProvider, Role,
};

/// Wraps any rig completion model.
pub struct RigAdapter<M> {
    model: M,
    model_name: String,
}

impl<M> RigAdapter<M> {
    pub fn new(model: M, model_name: &str) -> Self {
        Self {
            model,
            model_name: model_name.to_string(),
        }
    }
}

fn to_rig_message(message: &ChatMessage) -> RigMessage {
    match message.role {
        Role::Assistant => RigMessage::assistant(message.content.clone()),
        Role::System | Role::User => RigMessage::user(message.content.clone()),
    }
}

/// A request reshaped for rig: system text, prior turns, final prompt.
struct RigPrompt {
    preamble: Option<String>,
    history: Vec<RigMessage>,
    prompt: RigMessage,
}

/// System messages become the preamble; the last remaining message is the prompt.
fn split_request(request: &CompletionRequest, provider: &str) -> Result<RigPrompt, LlmError> {
    let mut history: Vec<RigMessage> = request
        .messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(to_rig_message)
        .collect();

    let prompt = history.pop().ok_or_else(|| LlmError::RequestFailed {
        provider: provider.to_string(),
        reason: "request has no user message".to_string(),
    })?;

    Ok(RigPrompt {
        preamble: request.system_prompt(),
        history,
        prompt,
    })
}

#[async_trait]
impl<M> LlmProvider for RigAdapter<M>
where
    M: CompletionModel + Send + Sync + 'static,
{
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let RigPrompt {
            preamble,
            history,
            prompt,
        } = split_request(&request, &self.model_name)?;

        let mut builder = self.model.completion_request(prompt).messages(history);
        if let Some(preamble) = preamble {
            builder = builder.preamble(preamble);
        }
        if let Some(temperature) = request.temperature {
            builder = builder.temperature(f64::from(temperature));
        }
        if let Some(max_tokens) = request.max_tokens {
            builder = builder.max_tokens(u64::from(max_tokens));
        }

        let response = builder.send().await.map_err(|e| LlmError::RequestFailed {
            provider: self.model_name.clone(),
            reason: e.to_string(),
        })?;

        let content: String = response
            .choice
            .iter()
            .filter_map(|c| match c {
                AssistantContent::Text(text) => Some(text.text.clone()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("");

        if content.trim().is_empty() {
            return Err(LlmError::EmptyResponse {
                provider: self.model_name.clone(),
            });
        }

        Ok(CompletionResponse {
            content,
            input_tokens: u32::try_from(response.usage.input_tokens).unwrap_or(u32::MAX),
            output_tokens: u32::try_from(response.usage.output_tokens).unwrap_or(u32::MAX),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_map_to_rig_messages() {
        assert_eq!(
            to_rig_message(&ChatMessage::user("hello")),
            RigMessage::user("hello")
        );
        assert_eq!(
            to_rig_message(&ChatMessage::assistant("joy")),
            RigMessage::assistant("joy")
        );
    }

    #[test]
    fn system_messages_become_preamble_and_last_message_is_prompt() {
        let request = CompletionRequest::new(vec![
            ChatMessage::system("classify"),
            ChatMessage::user("example"),
            ChatMessage::assistant("joy"),
            ChatMessage::system("one word"),
            ChatMessage::user("Great news!"),
        ]);

        let split = split_request(&request, "mock").unwrap();
        assert_eq!(split.preamble.as_deref(), Some("classify\n\none word"));
        assert_eq!(
            split.history,
            vec![RigMessage::user("example"), RigMessage::assistant("joy")]
        );
        assert_eq!(split.prompt, RigMessage::user("Great news!"));
    }

    #[test]
    fn request_without_user_turn_is_rejected() {
        let request = CompletionRequest::new(vec![ChatMessage::system("only system")]);
        let err = split_request(&request, "mock").err().unwrap();
        assert!(matches!(err, LlmError::RequestFailed { provider, .. } if provider == "mock"));
    }
}
