//! Tone inference: labels the buyer's latest message as formal or casual.
//!
//! `ToneClassifier` is an explicitly constructed service: an optional emotion
//! model plus an injectable fallback heuristic. It never fails; any model
//! problem degrades to the fallback, and empty text is always formal.

pub mod heuristic;
pub mod model;

pub use heuristic::RuleBasedTone;
pub use model::LlmEmotionModel;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::LlmError;
use crate::pipeline::types::Tone;

/// Longest input, in words, handed to the emotion model.
pub const MAX_MODEL_WORDS: usize = 512;

const CASUAL_EMOTIONS: &[&str] = &[
    "joy",
    "love",
    "surprise",
    "excitement",
    "amusement",
    "happiness",
];

const FORMAL_EMOTIONS: &[&str] = &[
    "anger",
    "fear",
    "sadness",
    "disgust",
    "neutral",
    "anxiety",
    "confusion",
];

/// Infers a tone from free text. Always answers.
#[async_trait]
pub trait ToneInference: Send + Sync {
    async fn infer_tone(&self, text: &str) -> Tone;
}

/// Classifies text into an emotion label (e.g. "joy", "neutral").
#[async_trait]
pub trait EmotionModel: Send + Sync {
    fn name(&self) -> &str;

    async fn classify(&self, text: &str) -> Result<String, LlmError>;
}

/// Rule-based tone used when no model is available or the model fails.
pub trait ToneHeuristic: Send + Sync {
    fn infer(&self, text: &str) -> Tone;
}

/// Map an emotion label to a tone. Unknown labels are formal.
pub fn map_emotion_to_tone(emotion: &str) -> Tone {
    let emotion = emotion.trim().to_lowercase();
    if CASUAL_EMOTIONS.contains(&emotion.as_str()) {
        Tone::Casual
    } else if FORMAL_EMOTIONS.contains(&emotion.as_str()) {
        Tone::Formal
    } else {
        warn!(emotion = %emotion, "Unrecognized emotion label, defaulting to formal");
        Tone::Formal
    }
}

/// Emotion model with a heuristic fallback.
pub struct ToneClassifier {
    model: Option<Arc<dyn EmotionModel>>,
    fallback: Arc<dyn ToneHeuristic>,
}

impl ToneClassifier {
    /// Model-backed classifier with the default rule-based fallback.
    pub fn new(model: Arc<dyn EmotionModel>) -> Self {
        Self {
            model: Some(model),
            fallback: Arc::new(RuleBasedTone::new()),
        }
    }

    /// No model: every decision comes from the heuristic.
    pub fn heuristic_only() -> Self {
        Self {
            model: None,
            fallback: Arc::new(RuleBasedTone::new()),
        }
    }

    /// Replace the fallback strategy.
    pub fn with_fallback(mut self, fallback: Arc<dyn ToneHeuristic>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }
}

#[async_trait]
impl ToneInference for ToneClassifier {
    async fn infer_tone(&self, text: &str) -> Tone {
        if text.trim().is_empty() {
            return Tone::Formal;
        }

        if let Some(model) = &self.model {
            let input = truncate_words(text, MAX_MODEL_WORDS);
            match model.classify(&input).await {
                Ok(label) => {
                    debug!(model = model.name(), label = %label, "Emotion model label");
                    return map_emotion_to_tone(&label);
                }
                Err(e) => {
                    warn!(model = model.name(), error = %e, "Emotion model failed, using fallback");
                }
            }
        }

        self.fallback.infer(text)
    }
}

/// Keep the first `max_words` words, logging when anything is cut.
fn truncate_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        return text.to_string();
    }
    warn!(words = words.len(), max_words, "Text truncated for tone model");
    words[..max_words].join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Emotion model returning a fixed label and recording its input.
    struct FixedModel {
        label: Result<String, ()>,
        seen: Mutex<Vec<String>>,
    }

    impl FixedModel {
        fn ok(label: &str) -> Arc<Self> {
            Arc::new(Self {
                label: Ok(label.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                label: Err(()),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl EmotionModel for FixedModel {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn classify(&self, text: &str) -> Result<String, LlmError> {
            self.seen.lock().unwrap().push(text.to_string());
            self.label.clone().map_err(|_| LlmError::RequestFailed {
                provider: "fixed".into(),
                reason: "model load error".into(),
            })
        }
    }

    struct AlwaysCasual;

    impl ToneHeuristic for AlwaysCasual {
        fn infer(&self, _text: &str) -> Tone {
            Tone::Casual
        }
    }

    #[test]
    fn maps_emotions_to_tone() {
        assert_eq!(map_emotion_to_tone("joy"), Tone::Casual);
        assert_eq!(map_emotion_to_tone("happiness"), Tone::Casual);
        assert_eq!(map_emotion_to_tone("neutral"), Tone::Formal);
        assert_eq!(map_emotion_to_tone("anger"), Tone::Formal);
        assert_eq!(map_emotion_to_tone("unknown"), Tone::Formal);
        assert_eq!(map_emotion_to_tone("  JOY  "), Tone::Casual);
    }

    #[tokio::test]
    async fn uses_model_label() {
        let classifier = ToneClassifier::new(FixedModel::ok("neutral"));
        assert_eq!(classifier.infer_tone("Please provide the ROI table.").await, Tone::Formal);

        let classifier = ToneClassifier::new(FixedModel::ok("joy"));
        assert_eq!(classifier.infer_tone("Great to hear from you!").await, Tone::Casual);
    }

    #[tokio::test]
    async fn model_failure_falls_back_to_heuristic() {
        let classifier = ToneClassifier::new(FixedModel::failing());
        assert_eq!(classifier.infer_tone("Wow!!!").await, Tone::Casual);
        assert_eq!(classifier.infer_tone("Please provide the ROI table.").await, Tone::Formal);
    }

    #[tokio::test]
    async fn empty_text_is_formal_without_calling_model() {
        let model = FixedModel::ok("joy");
        let classifier = ToneClassifier::new(model.clone()).with_fallback(Arc::new(AlwaysCasual));
        assert_eq!(classifier.infer_tone("").await, Tone::Formal);
        assert_eq!(classifier.infer_tone("   ").await, Tone::Formal);
        assert!(model.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn long_text_is_truncated_before_model() {
        let model = FixedModel::ok("neutral");
        let classifier = ToneClassifier::new(model.clone());
        let long_text = "Please provide the ROI table. ".repeat(200);

        assert_eq!(classifier.infer_tone(&long_text).await, Tone::Formal);
        let seen = model.seen.lock().unwrap();
        assert_eq!(seen[0].split_whitespace().count(), MAX_MODEL_WORDS);
    }

    #[tokio::test]
    async fn injected_fallback_is_used_without_model() {
        let classifier = ToneClassifier::heuristic_only().with_fallback(Arc::new(AlwaysCasual));
        assert!(!classifier.has_model());
        assert_eq!(classifier.infer_tone("Dear Sir, please confirm.").await, Tone::Casual);
    }
}
