use crate::config::ChunkDuration;
use crate::decode::Waveform;
use serde::{Deserialize, Serialize};

/// One fixed-length slice of the decoded waveform. All chunks span exactly
/// the configured duration except possibly the last, which carries whatever
/// remainder the recording has. The remainder is kept and classified; the
/// classifier pads it to the model window (see `classify`).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    pub index: usize,
    pub start_secs: f64,
    pub end_secs: f64,
    pub sample_rate: u32,
    pub samples: Vec<f32>,
}

impl Chunk {
    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ChunkError {
    #[error("audio has zero duration")]
    EmptyAudio,
}

/// Slice the waveform into contiguous, non-overlapping chunks covering
/// `[0, T)`. Produces `ceil(T / d)` chunks.
pub fn chunk_waveform(
    waveform: &Waveform,
    chunk_duration: ChunkDuration,
) -> Result<Vec<Chunk>, ChunkError> {
    if waveform.is_empty() || waveform.sample_rate == 0 {
        return Err(ChunkError::EmptyAudio);
    }

    let sample_rate = waveform.sample_rate;
    let chunk_samples = chunk_duration.samples_at(sample_rate).max(1);
    let total = waveform.samples.len();

    let mut chunks = Vec::with_capacity(total.div_ceil(chunk_samples));
    let mut offset = 0usize;
    while offset < total {
        let end = (offset + chunk_samples).min(total);
        chunks.push(Chunk {
            index: chunks.len(),
            start_secs: offset as f64 / f64::from(sample_rate),
            end_secs: end as f64 / f64::from(sample_rate),
            sample_rate,
            samples: waveform.samples[offset..end].to_vec(),
        });
        offset = end;
    }

    tracing::info!(
        chunks = chunks.len(),
        chunk_secs = chunk_duration.secs(),
        total_secs = waveform.duration_secs(),
        "audio chunked"
    );
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TARGET_SAMPLE_RATE;

    fn waveform(secs: f64) -> Waveform {
        let n = (secs * f64::from(TARGET_SAMPLE_RATE)).round() as usize;
        Waveform {
            samples: vec![0.1f32; n],
            sample_rate: TARGET_SAMPLE_RATE,
        }
    }

    fn two_secs() -> ChunkDuration {
        ChunkDuration::new(2.0).expect("positive")
    }

    #[test]
    fn chunk_count_is_ceil_of_duration_ratio() {
        for (secs, expected) in [(6.0, 3), (5.0, 3), (2.0, 1), (0.5, 1), (4.1, 3)] {
            let chunks = chunk_waveform(&waveform(secs), two_secs()).expect("chunks");
            assert_eq!(chunks.len(), expected, "duration {secs}s");
        }
    }

    #[test]
    fn chunks_are_contiguous_and_cover_full_duration() {
        let wf = waveform(7.3);
        let chunks = chunk_waveform(&wf, two_secs()).expect("chunks");
        assert_eq!(chunks[0].start_secs, 0.0);
        for pair in chunks.windows(2) {
            assert_eq!(pair[0].end_secs, pair[1].start_secs);
            assert!(pair[0].end_secs > pair[0].start_secs);
        }
        let last = chunks.last().expect("nonempty");
        assert!((last.end_secs - wf.duration_secs()).abs() < 1e-9);
    }

    #[test]
    fn all_but_last_chunk_span_exactly_the_configured_duration() {
        let chunks = chunk_waveform(&waveform(5.0), two_secs()).expect("chunks");
        assert_eq!(chunks.len(), 3);
        assert!((chunks[0].duration_secs() - 2.0).abs() < 1e-9);
        assert!((chunks[1].duration_secs() - 2.0).abs() < 1e-9);
        assert!((chunks[2].duration_secs() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn trailing_remainder_is_kept_not_dropped() {
        let chunks = chunk_waveform(&waveform(4.25), two_secs()).expect("chunks");
        assert_eq!(chunks.len(), 3);
        assert!((chunks[2].duration_secs() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn indices_are_sequential() {
        let chunks = chunk_waveform(&waveform(6.0), two_secs()).expect("chunks");
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.index, i);
        }
    }

    #[test]
    fn empty_waveform_is_an_error_not_an_empty_result() {
        let wf = Waveform {
            samples: Vec::new(),
            sample_rate: TARGET_SAMPLE_RATE,
        };
        assert_eq!(
            chunk_waveform(&wf, two_secs()).unwrap_err(),
            ChunkError::EmptyAudio
        );
    }
}
