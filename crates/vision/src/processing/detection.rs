use crate::errors::InferenceError;
use crate::processing::numeric::{center_to_corners, logistic, softmax};
use crate::types::{AnchorSet, BoxProposal, DetectionResult};
use common::span_debug;

pub const DEFAULT_GRID_SIZE: usize = 13;
pub const DEFAULT_NUM_CLASSES: usize = 1;
pub const DEFAULT_SCORE_THRESHOLD: f32 = 0.05;

/// tx, ty, tw, th, objectness
const BOX_FIELDS: usize = 5;

/// Layout and acceptance parameters of a grid detector output.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    pub grid_height: usize,
    pub grid_width: usize,
    pub channels_per_cell: usize,
    pub num_classes: usize,
    pub anchors: AnchorSet,
    pub score_threshold: f32,
}

impl DetectorConfig {
    /// Channel count a cell needs for the given anchor and class counts
    pub fn channels_for(num_anchors: usize, num_classes: usize) -> usize {
        num_anchors * (BOX_FIELDS + num_classes)
    }

    pub fn tensor_len(&self) -> usize {
        self.grid_height * self.grid_width * self.channels_per_cell
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        let anchors = AnchorSet::default();
        Self {
            grid_height: DEFAULT_GRID_SIZE,
            grid_width: DEFAULT_GRID_SIZE,
            channels_per_cell: Self::channels_for(anchors.len(), DEFAULT_NUM_CLASSES),
            num_classes: DEFAULT_NUM_CLASSES,
            anchors,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
        }
    }
}

/// Sequential reader over one cell's channel slice.
///
/// Each anchor consumes a contiguous block starting where the previous
/// anchor stopped.
struct ChannelCursor<'a> {
    cell: &'a [f32],
    pos: usize,
}

impl<'a> ChannelCursor<'a> {
    fn new(cell: &'a [f32]) -> Self {
        Self { cell, pos: 0 }
    }

    #[inline]
    fn read(&mut self) -> f32 {
        let value = self.cell[self.pos];
        self.pos += 1;
        value
    }

    #[inline]
    fn read_slice(&mut self, len: usize) -> &'a [f32] {
        let slice = &self.cell[self.pos..self.pos + len];
        self.pos += len;
        slice
    }

    fn remaining(&self) -> usize {
        self.cell.len() - self.pos
    }
}

/// Turns a `[grid_height][grid_width][channels]` tensor into scored boxes.
///
/// Stateless after construction, so one decoder can serve any number of
/// pipelines concurrently.
#[derive(Debug, Clone)]
pub struct DetectionDecoder {
    config: DetectorConfig,
}

impl DetectionDecoder {
    /// Validate the layout once; `decode` relies on it afterwards.
    pub fn new(config: DetectorConfig) -> Result<Self, InferenceError> {
        if config.grid_height == 0 || config.grid_width == 0 {
            return Err(InferenceError::InvalidConfig(format!(
                "grid must have at least one cell, got {}x{}",
                config.grid_height, config.grid_width
            )));
        }
        if config.anchors.is_empty() {
            return Err(InferenceError::InvalidConfig(
                "at least one anchor is required".to_string(),
            ));
        }
        if config.num_classes == 0 {
            return Err(InferenceError::InvalidConfig(
                "at least one class is required".to_string(),
            ));
        }
        if !config.score_threshold.is_finite() {
            return Err(InferenceError::InvalidConfig(format!(
                "score threshold must be finite, got {}",
                config.score_threshold
            )));
        }

        let expected = DetectorConfig::channels_for(config.anchors.len(), config.num_classes);
        if config.channels_per_cell != expected {
            return Err(InferenceError::shape(
                "channels per cell",
                expected,
                config.channels_per_cell,
            ));
        }

        tracing::debug!(
            grid_height = config.grid_height,
            grid_width = config.grid_width,
            channels = config.channels_per_cell,
            anchors = config.anchors.len(),
            classes = config.num_classes,
            threshold = config.score_threshold,
            "Detection decoder configured"
        );

        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Number of floats a raw tensor must hold
    pub fn expected_len(&self) -> usize {
        self.config.tensor_len()
    }

    /// Decode every cell and anchor, keeping proposals whose best
    /// class-times-objectness score is strictly above the threshold.
    ///
    /// Output is in row-major cell order, then anchor order. No sorting or
    /// suppression is applied.
    pub fn decode(&self, tensor: &[f32]) -> Result<DetectionResult, InferenceError> {
        let _s = span_debug!("decode_detections");

        let expected = self.expected_len();
        if tensor.len() != expected {
            return Err(InferenceError::shape("tensor length", expected, tensor.len()));
        }

        let DetectorConfig {
            grid_height,
            grid_width,
            channels_per_cell,
            num_classes,
            ref anchors,
            score_threshold,
        } = self.config;

        let width = grid_width as f32;
        let height = grid_height as f32;
        let mut result = DetectionResult::with_capacity(grid_height * grid_width);

        for (cell_idx, cell) in tensor.chunks_exact(channels_per_cell).enumerate() {
            let gy = (cell_idx / grid_width) as f32;
            let gx = (cell_idx % grid_width) as f32;
            let mut cursor = ChannelCursor::new(cell);

            for anchor in anchors.iter() {
                let tx = cursor.read();
                let ty = cursor.read();
                let tw = cursor.read();
                let th = cursor.read();
                let t_obj = cursor.read();
                let class_logits = cursor.read_slice(num_classes);

                let x = (logistic(tx) + gx) / width;
                let y = (logistic(ty) + gy) / height;
                let w = tw.exp() * anchor.width / width;
                let h = th.exp() * anchor.height / height;

                let objectness = logistic(t_obj);
                let score = softmax(class_logits)
                    .into_iter()
                    .map(|p| p * objectness)
                    .fold(f32::NEG_INFINITY, f32::max);

                if score > score_threshold {
                    result.push(BoxProposal::from(center_to_corners(x, y, w, h)), score);
                }
            }

            debug_assert_eq!(cursor.remaining(), 0);
        }

        tracing::debug!(
            candidates = grid_height * grid_width * anchors.len(),
            accepted = result.len(),
            "Decoded grid tensor"
        );

        Ok(result)
    }
}
