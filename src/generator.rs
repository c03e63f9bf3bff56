//! Nudge generator: uses an LLM to write the outreach message for a stalled deal.
//!
//! Generation never fails from the caller's point of view: missing inputs,
//! a missing LLM, or any LLM error all produce a scheduling-request template.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::llm::provider::{ChatMessage, CompletionRequest, LlmProvider};
use crate::pipeline::types::Tone;

/// Everything the generator knows about a deal.
#[derive(Debug, Clone, PartialEq)]
pub struct NudgeRequest {
    pub deal_id: String,
    pub contact: String,
    pub tone: Tone,
    /// Median reply minutes, `+inf` when unknown.
    pub reply_speed: f64,
    pub deal_name: String,
    pub stage: String,
}

impl NudgeRequest {
    fn has_required_fields(&self) -> bool {
        [&self.deal_id, &self.contact, &self.deal_name, &self.stage]
            .iter()
            .all(|s| !s.trim().is_empty())
    }
}

/// Writes nudge text. Implementations must not fail.
#[async_trait]
pub trait MessageGenerator: Send + Sync {
    async fn generate(&self, request: &NudgeRequest) -> String;
}

/// Configuration for nudge generation.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// LLM temperature.
    pub temperature: f32,
    /// Max tokens for the LLM response.
    pub max_tokens: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 50,
        }
    }
}

/// Template used whenever the LLM can't be used.
pub fn fallback_message(request: &NudgeRequest) -> String {
    format!(
        "Hi {}, shall we reconnect on the {} {}? Please suggest a time.",
        request.contact,
        request.deal_name,
        request.stage.to_lowercase()
    )
}

/// LLM-backed generator with template fallback.
pub struct NudgeGenerator {
    llm: Option<Arc<dyn LlmProvider>>,
    config: GeneratorConfig,
}

impl NudgeGenerator {
    pub fn new(llm: Arc<dyn LlmProvider>, config: GeneratorConfig) -> Self {
        Self {
            llm: Some(llm),
            config,
        }
    }

    /// Generator with no LLM: always returns the template.
    pub fn template_only() -> Self {
        Self {
            llm: None,
            config: GeneratorConfig::default(),
        }
    }
}

#[async_trait]
impl MessageGenerator for NudgeGenerator {
    async fn generate(&self, request: &NudgeRequest) -> String {
        if !request.has_required_fields() {
            warn!(deal_id = %request.deal_id, "Missing required fields for nudge, using template");
            return fallback_message(request);
        }

        let Some(llm) = &self.llm else {
            debug!(deal_id = %request.deal_id, "No LLM configured, using template");
            return fallback_message(request);
        };

        let llm_request = CompletionRequest::new(vec![
            ChatMessage::system(build_system_prompt()),
            ChatMessage::user(build_user_prompt(request)),
        ])
        .with_temperature(self.config.temperature)
        .with_max_tokens(self.config.max_tokens);

        match llm.complete(llm_request).await {
            Ok(response) => {
                let text = response.content.trim();
                if text.is_empty() {
                    warn!(deal_id = %request.deal_id, "LLM returned empty nudge, using template");
                    return fallback_message(request);
                }
                info!(
                    deal_id = %request.deal_id,
                    model = llm.model_name(),
                    output_tokens = response.output_tokens,
                    "Generated nudge"
                );
                text.to_string()
            }
            Err(e) => {
                warn!(deal_id = %request.deal_id, error = %e, "LLM nudge generation failed, using template");
                fallback_message(request)
            }
        }
    }
}

// ── Prompt construction ─────────────────────────────────────────────

fn build_system_prompt() -> String {
    "You are a sales assistant helping a salesperson revive a stalled deal. \
     Write one clear, polite nudge of at most 25 words to send to the contact. \
     Match the buyer's tone and reply speed and mention the deal stage. \
     Skip generic filler and propose a concrete next step. \
     Output only the message text."
        .to_string()
}

fn build_user_prompt(request: &NudgeRequest) -> String {
    let reply_speed = if request.reply_speed.is_finite() {
        format!("{:.0} minutes", request.reply_speed)
    } else {
        "no replies observed yet".to_string()
    };

    format!(
        "Deal: {}\nStage: {}\nContact: {}\nBuyer tone: {}\nBuyer reply speed: {}\n\n\
         Write the nudge that re-engages the contact and moves the deal forward.",
        request.deal_name, request.stage, request.contact, request.tone, reply_speed
    )
}
