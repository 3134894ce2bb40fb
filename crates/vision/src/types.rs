use crate::errors::InferenceError;
use serde::Serialize;

/// Anchors of the supported detector as flat `[w0, h0, w1, h1, ...]` pairs,
/// in grid-cell units.
pub const DEFAULT_ANCHORS: [f32; 10] = [0.573, 0.677, 1.87, 2.06, 3.34, 5.47, 7.88, 3.53, 9.77, 9.17];

/// Normalized corner-form rectangle. Serialized as `[x_min, y_min, x_max, y_max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(into = "[f32; 4]")]
pub struct BoxProposal {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl BoxProposal {
    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }

    pub fn center(&self) -> (f32, f32) {
        (
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }
}

impl From<[f32; 4]> for BoxProposal {
    fn from([x_min, y_min, x_max, y_max]: [f32; 4]) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }
}

impl From<BoxProposal> for [f32; 4] {
    fn from(b: BoxProposal) -> Self {
        [b.x_min, b.y_min, b.x_max, b.y_max]
    }
}

/// Accepted proposals as two parallel sequences: `scores[i]` belongs to `boxes[i]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetectionResult {
    pub boxes: Vec<BoxProposal>,
    pub scores: Vec<f32>,
}

impl DetectionResult {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            boxes: Vec::with_capacity(capacity),
            scores: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, bbox: BoxProposal, score: f32) {
        self.boxes.push(bbox);
        self.scores.push(score);
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Iterate `(box, score)` pairs in decode order
    pub fn iter(&self) -> impl Iterator<Item = (&BoxProposal, f32)> {
        self.boxes.iter().zip(self.scores.iter().copied())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub width: f32,
    pub height: f32,
}

/// Ordered anchor shapes; anchor `i` decodes the `i`-th block of a cell.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorSet {
    anchors: Vec<Anchor>,
}

impl AnchorSet {
    pub fn new(anchors: Vec<Anchor>) -> Self {
        Self { anchors }
    }

    /// Build from flat `[w0, h0, w1, h1, ...]` pairs.
    pub fn from_flat(values: &[f32]) -> Result<Self, InferenceError> {
        if values.len() % 2 != 0 {
            return Err(InferenceError::shape(
                "anchor pairs",
                values.len() + 1,
                values.len(),
            ));
        }

        let anchors = values
            .chunks_exact(2)
            .map(|pair| Anchor {
                width: pair[0],
                height: pair[1],
            })
            .collect();

        Ok(Self { anchors })
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Anchor> {
        self.anchors.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Anchor> {
        self.anchors.get(index)
    }
}

impl Default for AnchorSet {
    fn default() -> Self {
        Self::new(
            DEFAULT_ANCHORS
                .chunks_exact(2)
                .map(|pair| Anchor {
                    width: pair[0],
                    height: pair[1],
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_anchor_set() {
        let anchors = AnchorSet::default();

        assert_eq!(anchors.len(), 5);
        assert_eq!(
            anchors.get(0),
            Some(&Anchor {
                width: 0.573,
                height: 0.677
            })
        );
        assert_eq!(
            anchors.get(4),
            Some(&Anchor {
                width: 9.77,
                height: 9.17
            })
        );
    }

    #[test]
    fn test_anchor_set_from_flat() {
        let anchors = AnchorSet::from_flat(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        let shapes: Vec<_> = anchors.iter().map(|a| (a.width, a.height)).collect();
        assert_eq!(shapes, vec![(1.0, 2.0), (3.0, 4.0)]);

        assert!(matches!(
            AnchorSet::from_flat(&[1.0, 2.0, 3.0]),
            Err(InferenceError::ShapeMismatch { actual: 3, .. })
        ));
    }

    #[test]
    fn test_box_proposal_geometry() {
        let b = BoxProposal::from([0.2, 0.4, 0.6, 1.0]);
        assert!((b.width() - 0.4).abs() < 1e-6);
        assert!((b.height() - 0.6).abs() < 1e-6);
        let (cx, cy) = b.center();
        assert!((cx - 0.4).abs() < 1e-6);
        assert!((cy - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_detection_result_pairs_boxes_and_scores() {
        let mut result = DetectionResult::with_capacity(2);
        result.push(BoxProposal::from([0.0, 0.0, 0.1, 0.1]), 0.9);
        result.push(BoxProposal::from([0.5, 0.5, 0.7, 0.7]), 0.3);

        assert_eq!(result.len(), 2);
        let pairs: Vec<_> = result.iter().map(|(b, s)| (b.x_min, s)).collect();
        assert_eq!(pairs, vec![(0.0, 0.9), (0.5, 0.3)]);
    }

    #[test]
    fn test_detection_result_serializes_as_parallel_arrays() {
        let mut result = DetectionResult::default();
        result.push(BoxProposal::from([0.0, 0.25, 0.5, 1.5]), 0.75);

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "boxes": [[0.0, 0.25, 0.5, 1.5]],
                "scores": [0.75]
            })
        );
    }
}
