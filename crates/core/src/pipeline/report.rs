//! Serialization boundary. Everything upstream computes in raw seconds;
//! this is the only place timestamps become `MM:SS` strings and numbers
//! get rounded for presentation.

use crate::classify::EmotionLabel;
use crate::pipeline::AnalysisResult;
use crate::util::time::seconds_to_mmss;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ReportSegment {
    pub start: String,
    pub end: String,
    pub emotion: EmotionLabel,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RawReportSegment {
    pub start: String,
    pub end: String,
    pub emotion: EmotionLabel,
    pub confidence: f64,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ReportShare {
    pub duration_seconds: f64,
    pub percentage: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    pub duration: String,
    pub duration_seconds: f64,
    pub segments: Vec<ReportSegment>,
    pub raw_segments: Vec<RawReportSegment>,
    pub summary: BTreeMap<EmotionLabel, ReportShare>,
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

impl AnalysisReport {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let segments = result
            .segments
            .iter()
            .map(|s| ReportSegment {
                start: seconds_to_mmss(s.start_secs),
                end: seconds_to_mmss(s.end_secs),
                emotion: s.label,
            })
            .collect();

        let raw_segments = result
            .raw_chunks
            .iter()
            .map(|c| RawReportSegment {
                start: seconds_to_mmss(c.start_secs),
                end: seconds_to_mmss(c.end_secs),
                emotion: c.label,
                confidence: round_to(f64::from(c.confidence), 4),
            })
            .collect();

        let summary = result
            .distribution
            .iter()
            .map(|(label, share)| {
                (
                    *label,
                    ReportShare {
                        duration_seconds: round_to(share.duration_seconds, 2),
                        percentage: round_to(share.percentage, 1),
                    },
                )
            })
            .collect();

        Self {
            duration: seconds_to_mmss(result.total_duration_secs),
            duration_seconds: round_to(result.total_duration_secs, 2),
            segments,
            raw_segments,
            summary,
        }
    }
}
