use crate::classify::{EmotionModel, InferenceError, LabelScores};
use crate::config::TARGET_SAMPLE_RATE;
use futures::future::BoxFuture;
use futures::FutureExt;

/// Built-in reference backend: derives an emotion distribution from coarse
/// prosody features (RMS energy and a zero-crossing pitch estimate). It
/// satisfies the same contract as the pretrained model, so the pipeline can
/// run end-to-end without model weights; a real wav2vec2-class backend plugs
/// in behind the same [`EmotionModel`] trait.
#[derive(Clone, Debug)]
pub struct ProsodyEmotionModel {
    sample_rate: u32,
}

impl ProsodyEmotionModel {
    pub fn new() -> Self {
        Self {
            sample_rate: TARGET_SAMPLE_RATE,
        }
    }
}

impl Default for ProsodyEmotionModel {
    fn default() -> Self {
        Self::new()
    }
}

fn rms_energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Crude fundamental estimate: each zero-crossing pair is one period.
fn zero_crossing_pitch_hz(samples: &[f32], sample_rate: u32) -> Option<f32> {
    if samples.len() < 2 {
        return None;
    }
    let crossings = samples
        .windows(2)
        .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
        .count();
    if crossings == 0 {
        return None;
    }
    let duration = samples.len() as f32 / sample_rate as f32;
    Some(crossings as f32 / (2.0 * duration))
}

impl EmotionModel for ProsodyEmotionModel {
    fn infer(&self, samples: Vec<f32>) -> BoxFuture<'_, Result<LabelScores, InferenceError>> {
        let sample_rate = self.sample_rate;
        async move {
            let energy = rms_energy(&samples);
            let pitch = zero_crossing_pitch_hz(&samples, sample_rate);

            // Loud + high pitch reads as happy, loud + low as angry, quiet +
            // low as sad; everything hedges toward neutral.
            let energy_factor = (energy / 0.1).clamp(0.0, 1.0);
            let pitch_factor = pitch
                .map(|hz| ((hz - 100.0) / 150.0).clamp(0.0, 1.0))
                .unwrap_or(0.5);

            let angry = energy_factor * (1.0 - pitch_factor);
            let happy = energy_factor * pitch_factor;
            let sad = (1.0 - energy_factor) * (1.0 - pitch_factor);
            let neutral = 0.5 + (1.0 - energy_factor) * pitch_factor;

            let total = angry + happy + sad + neutral;
            let scores: LabelScores = [
                ("ang", angry),
                ("hap", happy),
                ("neu", neutral),
                ("sad", sad),
            ]
            .into_iter()
            .map(|(label, weight)| (label.to_owned(), weight / total))
            .collect();
            Ok(scores)
        }
        .boxed()
    }
}
