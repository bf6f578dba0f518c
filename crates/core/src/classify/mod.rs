mod adapter;
mod prosody;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use adapter::Classifier;
pub use prosody::ProsodyEmotionModel;

/// The four-label taxonomy exposed by this system. Fixed by the pretrained
/// model's output vocabulary (IEMOCAP-style).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Angry,
    Happy,
    Neutral,
    Sad,
}

impl EmotionLabel {
    pub const ALL: [EmotionLabel; 4] = [Self::Angry, Self::Happy, Self::Neutral, Self::Sad];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Angry => "angry",
            Self::Happy => "happy",
            Self::Neutral => "neutral",
            Self::Sad => "sad",
        }
    }

    /// Map a model-native label string onto the taxonomy. The wav2vec2-class
    /// models emit abbreviated labels; full names are accepted too.
    pub fn from_model_label(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "ang" | "angry" => Some(Self::Angry),
            "hap" | "happy" => Some(Self::Happy),
            "neu" | "neutral" => Some(Self::Neutral),
            "sad" => Some(Self::Sad),
            _ => None,
        }
    }
}

impl std::fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model-native label strings mapped to probabilities. Probabilities are
/// expected to sum to 1.0 over the model's vocabulary.
pub type LabelScores = BTreeMap<String, f32>;

#[derive(thiserror::Error, Debug)]
pub enum InferenceError {
    #[error("model invocation failed: {0}")]
    Model(String),
    #[error("model returned no scores")]
    NoScores,
    #[error("model emitted unknown label: {0}")]
    UnknownLabel(String),
}

/// The opaque pretrained model seam. One invocation per chunk; invocations
/// are pure in their input, so callers may dispatch them concurrently.
pub trait EmotionModel: Send + Sync {
    fn infer(&self, samples: Vec<f32>) -> BoxFuture<'_, Result<LabelScores, InferenceError>>;
}

/// A chunk annotated with the model's top label and its probability.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ClassifiedChunk {
    pub index: usize,
    pub start_secs: f64,
    pub end_secs: f64,
    pub label: EmotionLabel,
    pub confidence: f32,
}

impl ClassifiedChunk {
    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }
}
