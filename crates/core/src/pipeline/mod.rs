mod report;

use crate::chunk::{chunk_waveform, ChunkError};
use crate::classify::{Classifier, ClassifiedChunk, EmotionLabel, EmotionModel, InferenceError};
use crate::config::{AnalysisConfig, TARGET_SAMPLE_RATE};
use crate::decode::{AudioDecoder, AudioFormat, DecodeError};
use crate::merge::{merge_chunks, Segment};
use bytes::Bytes;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

pub use report::{AnalysisReport, ReportSegment, ReportShare, RawReportSegment};

#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(#[source] DecodeError),
    #[error("audio has zero duration")]
    EmptyAudio,
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error("pipeline failure: {0}")]
    Pipeline(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<DecodeError> for AnalysisError {
    fn from(e: DecodeError) -> Self {
        Self::UnsupportedFormat(e)
    }
}

impl From<ChunkError> for AnalysisError {
    fn from(e: ChunkError) -> Self {
        match e {
            ChunkError::EmptyAudio => Self::EmptyAudio,
        }
    }
}

/// Per-label slice of the analyzed time.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct LabelShare {
    pub duration_seconds: f64,
    pub percentage: f64,
}

/// Final output of one analysis call. Owned by the caller; the pipeline
/// keeps no reference to it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    pub total_duration_secs: f64,
    pub segments: Vec<Segment>,
    pub raw_chunks: Vec<ClassifiedChunk>,
    pub distribution: BTreeMap<EmotionLabel, LabelShare>,
}

/// Orchestrates decode → chunk → classify → merge → summarize. The decoder
/// and the model are injected capabilities, so tests substitute doubles for
/// both without touching real audio or inference.
pub struct Analyzer {
    decoder: Arc<dyn AudioDecoder>,
    classifier: Classifier,
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new(
        decoder: Arc<dyn AudioDecoder>,
        model: Arc<dyn EmotionModel>,
        config: AnalysisConfig,
    ) -> Self {
        let window_samples = config.chunk_duration.samples_at(TARGET_SAMPLE_RATE);
        Self {
            decoder,
            classifier: Classifier::new(model, window_samples),
            config,
        }
    }

    pub async fn analyze(
        &self,
        bytes: Bytes,
        format: AudioFormat,
    ) -> Result<AnalysisResult, AnalysisError> {
        let waveform = self.decoder.decode(bytes, format)?;
        let total_duration_secs = waveform.duration_secs();
        let chunks = chunk_waveform(&waveform, self.config.chunk_duration)?;
        // The decoded signal can be large for long recordings; the chunks
        // own their slices from here on.
        drop(waveform);

        // `buffered` bounds in-flight inference and yields completions in
        // input order, which merge correctness depends on. A single chunk's
        // failure fails the whole request; no retries.
        let classifier = &self.classifier;
        let raw_chunks: Vec<ClassifiedChunk> =
            stream::iter(chunks.into_iter().map(|c| classifier.classify(c)))
                .buffered(self.config.parallelism.get())
                .try_collect()
                .await?;

        let segments = merge_chunks(&raw_chunks);
        let distribution = compute_distribution(&segments, total_duration_secs);

        tracing::info!(
            total_secs = total_duration_secs,
            chunks = raw_chunks.len(),
            segments = segments.len(),
            "analysis complete"
        );
        Ok(AnalysisResult {
            total_duration_secs,
            segments,
            raw_chunks,
            distribution,
        })
    }
}

/// Per-label totals over the merged timeline. Labels with no occurrence are
/// omitted rather than reported as zero.
pub fn compute_distribution(
    segments: &[Segment],
    total_duration_secs: f64,
) -> BTreeMap<EmotionLabel, LabelShare> {
    let mut seconds_by_label: BTreeMap<EmotionLabel, f64> = BTreeMap::new();
    for segment in segments {
        *seconds_by_label.entry(segment.label).or_default() += segment.duration_secs();
    }
    seconds_by_label
        .into_iter()
        .map(|(label, duration_seconds)| {
            let percentage = if total_duration_secs > 0.0 {
                100.0 * duration_seconds / total_duration_secs
            } else {
                0.0
            };
            (
                label,
                LabelShare {
                    duration_seconds,
                    percentage,
                },
            )
        })
        .collect()
}
