use crate::chunk::Chunk;
use crate::classify::{ClassifiedChunk, EmotionLabel, EmotionModel, InferenceError};
use std::sync::Arc;

/// Trailing chunks shorter than the model window are padded with this value
/// up to the full window length before inference.
const PAD_SAMPLE: f32 = 0.0;

/// Adapter between chunks and the opaque model: pads the window, runs
/// inference, and normalizes the native label vocabulary into
/// [`EmotionLabel`] with an arg-max confidence.
#[derive(Clone)]
pub struct Classifier {
    model: Arc<dyn EmotionModel>,
    window_samples: usize,
}

impl Classifier {
    pub fn new(model: Arc<dyn EmotionModel>, window_samples: usize) -> Self {
        Self {
            model,
            window_samples,
        }
    }

    pub async fn classify(&self, chunk: Chunk) -> Result<ClassifiedChunk, InferenceError> {
        let Chunk {
            index,
            start_secs,
            end_secs,
            samples,
            ..
        } = chunk;

        let mut samples = samples;
        if samples.len() < self.window_samples {
            samples.resize(self.window_samples, PAD_SAMPLE);
        }

        let scores = self.model.infer(samples).await?;
        let (raw_label, confidence) = scores
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(label, score)| (label.clone(), *score))
            .ok_or(InferenceError::NoScores)?;
        let label = EmotionLabel::from_model_label(&raw_label)
            .ok_or(InferenceError::UnknownLabel(raw_label))?;

        tracing::debug!(
            index,
            start_secs,
            end_secs,
            label = %label,
            confidence,
            "chunk classified"
        );
        Ok(ClassifiedChunk {
            index,
            start_secs,
            end_secs,
            label,
            confidence: confidence.clamp(0.0, 1.0),
        })
    }
}
