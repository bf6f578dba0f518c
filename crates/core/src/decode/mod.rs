use crate::config::TARGET_SAMPLE_RATE;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Container format as declared by the caller. The decoder never inspects
/// file extensions or magic bytes on its own.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Wav,
    Mp3,
}

impl AudioFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Decoded mono waveform at the classifier's sample rate, peak-normalized
/// to [-1, 1]. Lives only from decode until chunking completes.
#[derive(Clone, Debug, PartialEq)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Waveform {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("unsupported audio format ({format}): {reason}")]
    UnsupportedFormat { format: AudioFormat, reason: String },
}

pub type Result<T> = std::result::Result<T, DecodeError>;

pub trait AudioDecoder: Send + Sync {
    fn decode(&self, bytes: Bytes, format: AudioFormat) -> Result<Waveform>;
}

/// Symphonia-backed decoder producing mono 16 kHz f32 output.
#[derive(Clone, Debug)]
pub struct SymphoniaDecoder {
    target_sample_rate: u32,
}

impl Default for SymphoniaDecoder {
    fn default() -> Self {
        Self {
            target_sample_rate: TARGET_SAMPLE_RATE,
        }
    }
}

impl SymphoniaDecoder {
    pub fn new(target_sample_rate: u32) -> Self {
        Self { target_sample_rate }
    }

    fn unsupported(format: AudioFormat, reason: impl fmt::Display) -> DecodeError {
        DecodeError::UnsupportedFormat {
            format,
            reason: reason.to_string(),
        }
    }

    fn decode_interleaved(
        &self,
        bytes: Bytes,
        format: AudioFormat,
    ) -> Result<(Vec<f32>, u32, u16)> {
        let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());
        let mut hint = Hint::new();
        hint.with_extension(format.extension());

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| Self::unsupported(format, e))?;
        let mut reader = probed.format;

        let track = reader
            .default_track()
            .ok_or_else(|| Self::unsupported(format, "no default audio track"))?;
        let codec_params = track.codec_params.clone();
        let sample_rate = codec_params
            .sample_rate
            .ok_or_else(|| Self::unsupported(format, "missing sample rate"))?;
        let channels = codec_params
            .channels
            .ok_or_else(|| Self::unsupported(format, "missing channel layout"))?
            .count() as u16;

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| Self::unsupported(format, e))?;

        let mut samples = Vec::new();
        loop {
            let packet = match reader.next_packet() {
                Ok(packet) => packet,
                // End of stream surfaces as an IO error.
                Err(SymphoniaError::IoError(_)) => break,
                Err(e) => return Err(Self::unsupported(format, e)),
            };
            let decoded = match decoder.decode(&packet) {
                Ok(buf) => buf,
                Err(SymphoniaError::DecodeError(e)) => {
                    tracing::debug!(error = %e, "skipping undecodable packet");
                    continue;
                }
                Err(e) => return Err(Self::unsupported(format, e)),
            };
            let spec = *decoded.spec();
            let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
            buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(buf.samples());
        }

        Ok((samples, sample_rate, channels.max(1)))
    }
}

impl AudioDecoder for SymphoniaDecoder {
    fn decode(&self, bytes: Bytes, format: AudioFormat) -> Result<Waveform> {
        let (interleaved, sample_rate, channels) = self.decode_interleaved(bytes, format)?;

        // Downmix before anything else so resampling sees a mono signal.
        let mono = downmix_to_mono(&interleaved, channels);
        let mut samples = resample_linear(&mono, sample_rate, self.target_sample_rate);
        peak_normalize(&mut samples);

        let waveform = Waveform {
            samples,
            sample_rate: self.target_sample_rate,
        };
        tracing::info!(
            format = %format,
            source_rate = sample_rate,
            channels,
            duration_secs = waveform.duration_secs(),
            "audio decoded"
        );
        Ok(waveform)
    }
}

/// Average interleaved channels down to one.
pub fn downmix_to_mono(interleaved: &[f32], channels: u16) -> Vec<f32> {
    let channels = usize::from(channels.max(1));
    if channels == 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Linear-interpolation resampler. Adequate for speech feature extraction;
/// the classifier is robust to the aliasing this introduces.
pub fn resample_linear(samples: &[f32], src_rate: u32, dst_rate: u32) -> Vec<f32> {
    if src_rate == dst_rate || samples.is_empty() || src_rate == 0 || dst_rate == 0 {
        return samples.to_vec();
    }
    let ratio = f64::from(src_rate) / f64::from(dst_rate);
    let out_len = ((samples.len() as f64) / ratio).round().max(1.0) as usize;
    let last = samples.len() - 1;
    let mut out = Vec::with_capacity(out_len);
    for i in 0..out_len {
        let pos = i as f64 * ratio;
        let idx = (pos as usize).min(last);
        let next = (idx + 1).min(last);
        let frac = (pos - idx as f64) as f32;
        out.push(samples[idx] + (samples[next] - samples[idx]) * frac);
    }
    out
}

/// Scale so the loudest sample sits at ±1.0. Silence is left untouched.
pub fn peak_normalize(samples: &mut [f32]) {
    let peak = samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
    if peak > 0.0 {
        for s in samples.iter_mut() {
            *s /= peak;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_stereo_averages_frames() {
        let interleaved = [1.0, 0.0, 0.5, 0.5, -1.0, 1.0];
        let mono = downmix_to_mono(&interleaved, 2);
        assert_eq!(mono, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn downmix_mono_is_identity() {
        let samples = [0.1, -0.2, 0.3];
        assert_eq!(downmix_to_mono(&samples, 1), samples.to_vec());
    }

    #[test]
    fn resample_same_rate_is_identity() {
        let samples = [0.0, 0.5, 1.0];
        assert_eq!(resample_linear(&samples, 16_000, 16_000), samples.to_vec());
    }

    #[test]
    fn resample_halves_length_for_2x_downsample() {
        let samples: Vec<f32> = (0..32_000).map(|i| (i as f32).sin()).collect();
        let out = resample_linear(&samples, 32_000, 16_000);
        assert_eq!(out.len(), 16_000);
    }

    #[test]
    fn resample_preserves_duration_for_upsample() {
        let samples = vec![0.0f32; 8_000];
        let out = resample_linear(&samples, 8_000, 16_000);
        assert_eq!(out.len(), 16_000);
    }

    #[test]
    fn peak_normalize_scales_to_unit_peak() {
        let mut samples = vec![0.25, -0.5, 0.1];
        peak_normalize(&mut samples);
        assert!((samples[1] + 1.0).abs() < 1e-6);
        assert!((samples[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn peak_normalize_leaves_silence_alone() {
        let mut samples = vec![0.0f32; 4];
        peak_normalize(&mut samples);
        assert_eq!(samples, vec![0.0f32; 4]);
    }

    #[test]
    fn garbage_bytes_fail_as_unsupported_format() {
        let decoder = SymphoniaDecoder::default();
        let err = decoder
            .decode(Bytes::from_static(b"not audio at all"), AudioFormat::Wav)
            .unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedFormat { .. }));
    }

    #[test]
    fn wav_fixture_decodes_to_mono_16k() {
        // Minimal 8-sample mono 16 kHz PCM16 WAV built by hand.
        let mut wav: Vec<u8> = Vec::new();
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(36u32 + 16).to_le_bytes());
        wav.extend_from_slice(b"WAVE");
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
        wav.extend_from_slice(&1u16.to_le_bytes()); // mono
        wav.extend_from_slice(&16_000u32.to_le_bytes());
        wav.extend_from_slice(&32_000u32.to_le_bytes()); // byte rate
        wav.extend_from_slice(&2u16.to_le_bytes()); // block align
        wav.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&16u32.to_le_bytes());
        for s in [0i16, 8_192, 16_384, 8_192, 0, -8_192, -16_384, -8_192] {
            wav.extend_from_slice(&s.to_le_bytes());
        }

        let decoder = SymphoniaDecoder::default();
        let waveform = decoder
            .decode(Bytes::from(wav), AudioFormat::Wav)
            .expect("valid wav");
        assert_eq!(waveform.sample_rate, 16_000);
        assert_eq!(waveform.samples.len(), 8);
        // Peak-normalized, so the loudest sample is at magnitude 1.
        let peak = waveform
            .samples
            .iter()
            .fold(0.0f32, |acc, s| acc.max(s.abs()));
        assert!((peak - 1.0).abs() < 1e-6);
    }
}
