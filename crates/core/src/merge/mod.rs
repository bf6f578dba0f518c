use crate::classify::{ClassifiedChunk, EmotionLabel};
use serde::{Deserialize, Serialize};

/// One or more consecutive same-label chunks collapsed into a single
/// labeled interval. Adjacent segments never share a label.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    pub start_secs: f64,
    pub end_secs: f64,
    pub label: EmotionLabel,
}

impl Segment {
    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }
}

/// Collapse consecutive chunks sharing a label into segments. Label
/// equality is exact; confidence plays no part in merging. Single O(n)
/// scan over temporally ordered chunks.
pub fn merge_chunks(chunks: &[ClassifiedChunk]) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();
    for chunk in chunks {
        match segments.last_mut() {
            Some(run) if run.label == chunk.label => run.end_secs = chunk.end_secs,
            _ => segments.push(Segment {
                start_secs: chunk.start_secs,
                end_secs: chunk.end_secs,
                label: chunk.label,
            }),
        }
    }
    if !chunks.is_empty() {
        tracing::info!(
            chunks = chunks.len(),
            segments = segments.len(),
            "merged consecutive labels"
        );
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(index: usize, start: f64, end: f64, label: EmotionLabel) -> ClassifiedChunk {
        ClassifiedChunk {
            index,
            start_secs: start,
            end_secs: end,
            label,
            confidence: 0.9,
        }
    }

    #[test]
    fn consecutive_same_labels_collapse() {
        let chunks = [
            chunk(0, 0.0, 2.0, EmotionLabel::Neutral),
            chunk(1, 2.0, 4.0, EmotionLabel::Neutral),
            chunk(2, 4.0, 6.0, EmotionLabel::Happy),
        ];
        let segments = merge_chunks(&chunks);
        assert_eq!(
            segments,
            vec![
                Segment {
                    start_secs: 0.0,
                    end_secs: 4.0,
                    label: EmotionLabel::Neutral
                },
                Segment {
                    start_secs: 4.0,
                    end_secs: 6.0,
                    label: EmotionLabel::Happy
                },
            ]
        );
    }

    #[test]
    fn differing_confidences_still_merge() {
        let mut a = chunk(0, 0.0, 2.0, EmotionLabel::Sad);
        a.confidence = 0.99;
        let mut b = chunk(1, 2.0, 4.0, EmotionLabel::Sad);
        b.confidence = 0.41;
        let segments = merge_chunks(&[a, b]);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].end_secs, 4.0);
    }

    #[test]
    fn single_chunk_yields_single_segment() {
        let segments = merge_chunks(&[chunk(0, 0.0, 2.0, EmotionLabel::Sad)]);
        assert_eq!(
            segments,
            vec![Segment {
                start_secs: 0.0,
                end_secs: 2.0,
                label: EmotionLabel::Sad
            }]
        );
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(merge_chunks(&[]).is_empty());
    }

    #[test]
    fn no_adjacent_segments_share_a_label() {
        let labels = [
            EmotionLabel::Angry,
            EmotionLabel::Angry,
            EmotionLabel::Happy,
            EmotionLabel::Happy,
            EmotionLabel::Happy,
            EmotionLabel::Angry,
            EmotionLabel::Sad,
        ];
        let chunks: Vec<_> = labels
            .iter()
            .enumerate()
            .map(|(i, l)| chunk(i, i as f64 * 2.0, (i as f64 + 1.0) * 2.0, *l))
            .collect();
        let segments = merge_chunks(&chunks);
        for pair in segments.windows(2) {
            assert_ne!(pair[0].label, pair[1].label);
        }
        assert_eq!(segments.len(), 4);
    }

    #[test]
    fn merging_is_idempotent() {
        let labels = [
            EmotionLabel::Neutral,
            EmotionLabel::Neutral,
            EmotionLabel::Sad,
            EmotionLabel::Happy,
            EmotionLabel::Happy,
        ];
        let chunks: Vec<_> = labels
            .iter()
            .enumerate()
            .map(|(i, l)| chunk(i, i as f64, i as f64 + 1.0, *l))
            .collect();
        let segments = merge_chunks(&chunks);

        // Re-express each segment as a unit chunk of its own label.
        let rechunked: Vec<_> = segments
            .iter()
            .enumerate()
            .map(|(i, s)| ClassifiedChunk {
                index: i,
                start_secs: s.start_secs,
                end_secs: s.end_secs,
                label: s.label,
                confidence: 1.0,
            })
            .collect();
        assert_eq!(merge_chunks(&rechunked), segments);
    }

    #[test]
    fn segments_partition_the_analyzed_span() {
        let chunks = [
            chunk(0, 0.0, 2.0, EmotionLabel::Happy),
            chunk(1, 2.0, 4.0, EmotionLabel::Sad),
            chunk(2, 4.0, 5.5, EmotionLabel::Sad),
        ];
        let segments = merge_chunks(&chunks);
        assert_eq!(segments[0].start_secs, 0.0);
        assert_eq!(segments.last().expect("nonempty").end_secs, 5.5);
        for pair in segments.windows(2) {
            assert_eq!(pair[0].end_secs, pair[1].start_secs);
        }
    }
}
