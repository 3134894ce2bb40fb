use crate::processing::DetectorConfig;
use crate::processing::classification::DEFAULT_NUM_SCORES;
use crate::processing::detection::{
    DEFAULT_GRID_SIZE, DEFAULT_NUM_CLASSES, DEFAULT_SCORE_THRESHOLD,
};
use crate::types::AnchorSet;
use anyhow::Context;
use common::{env_or, env_string_or};
use preprocess::{CLASSIFICATION_INPUT_SIZE, DETECTION_INPUT_SIZE};
use std::env;
use std::str::FromStr;

pub use common::Environment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Classify,
    Detect,
}

impl FromStr for Task {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "classify" | "classification" => Ok(Task::Classify),
            "detect" | "detection" => Ok(Task::Detect),
            other => anyhow::bail!("Unknown task: {}", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub environment: Environment,
    pub task: Task,
    pub model_path: String,
    pub image_path: String,
    pub execution_provider: String,
    pub score_threshold: f32,
    pub classifier_input_size: u32,
    pub detector_input_size: u32,
    pub grid_size: usize,
    pub num_classes: usize,
    pub num_scores: usize,
    pub anchors: AnchorSet,
}

impl InferenceConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> anyhow::Result<Self> {
        let environment = Environment::from_env();

        let task = match env::var("TASK") {
            Ok(value) => value.parse()?,
            Err(_) => Task::Detect,
        };

        let anchors = match env::var("ANCHORS") {
            Ok(value) => parse_anchors(&value)?,
            Err(_) => AnchorSet::default(),
        };

        Ok(Self {
            environment,
            task,
            model_path: env_string_or("MODEL_PATH", "models/model.onnx"),
            image_path: env_string_or("IMAGE_PATH", "image.png"),
            execution_provider: env_string_or("EXECUTION_PROVIDER", "cpu"),
            score_threshold: env_or("SCORE_THRESHOLD", DEFAULT_SCORE_THRESHOLD),
            classifier_input_size: env_or("CLASSIFIER_INPUT_SIZE", CLASSIFICATION_INPUT_SIZE),
            detector_input_size: env_or("DETECTOR_INPUT_SIZE", DETECTION_INPUT_SIZE),
            grid_size: env_or("GRID_SIZE", DEFAULT_GRID_SIZE),
            num_classes: env_or("NUM_CLASSES", DEFAULT_NUM_CLASSES),
            num_scores: env_or("NUM_SCORES", DEFAULT_NUM_SCORES),
            anchors,
        })
    }

    /// Decoder layout for a square grid with the configured anchors and classes
    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            grid_height: self.grid_size,
            grid_width: self.grid_size,
            channels_per_cell: DetectorConfig::channels_for(self.anchors.len(), self.num_classes),
            num_classes: self.num_classes,
            anchors: self.anchors.clone(),
            score_threshold: self.score_threshold,
        }
    }

    /// Create default configuration for testing
    #[cfg(test)]
    pub fn test_default() -> Self {
        Self {
            environment: Environment::Development,
            task: Task::Detect,
            model_path: "/models/model.onnx".to_string(),
            image_path: "image.png".to_string(),
            execution_provider: "cpu".to_string(),
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            classifier_input_size: CLASSIFICATION_INPUT_SIZE,
            detector_input_size: DETECTION_INPUT_SIZE,
            grid_size: DEFAULT_GRID_SIZE,
            num_classes: DEFAULT_NUM_CLASSES,
            num_scores: DEFAULT_NUM_SCORES,
            anchors: AnchorSet::default(),
        }
    }
}

/// Parse a comma separated `w0,h0,w1,h1,...` list
fn parse_anchors(value: &str) -> anyhow::Result<AnchorSet> {
    let values = value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f32>()
                .with_context(|| format!("Invalid anchor value: {}", s))
        })
        .collect::<anyhow::Result<Vec<f32>>>()?;

    AnchorSet::from_flat(&values).context("ANCHORS must hold width,height pairs")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::DetectionDecoder;
    use serial_test::serial;

    const VARS: [&str; 6] = [
        "TASK",
        "ANCHORS",
        "SCORE_THRESHOLD",
        "GRID_SIZE",
        "NUM_CLASSES",
        "MODEL_PATH",
    ];

    fn clear_vars() {
        for var in VARS {
            unsafe { env::remove_var(var) };
        }
    }

    #[test]
    fn test_task_parsing() {
        assert_eq!("classify".parse::<Task>().unwrap(), Task::Classify);
        assert_eq!(" Detect ".parse::<Task>().unwrap(), Task::Detect);
        assert!("segment".parse::<Task>().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_vars();

        let config = InferenceConfig::from_env().unwrap();

        assert_eq!(config.task, Task::Detect);
        assert_eq!(config.model_path, "models/model.onnx");
        assert_eq!(config.score_threshold, 0.05);
        assert_eq!(config.classifier_input_size, 300);
        assert_eq!(config.detector_input_size, 416);
        assert_eq!(config.anchors, AnchorSet::default());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_vars();
        unsafe {
            env::set_var("TASK", "classify");
            env::set_var("ANCHORS", "1.0, 1.5, 2.0, 3.0");
            env::set_var("SCORE_THRESHOLD", "0.25");
            env::set_var("GRID_SIZE", "7");
        }

        let config = InferenceConfig::from_env().unwrap();
        clear_vars();

        assert_eq!(config.task, Task::Classify);
        assert_eq!(config.anchors.len(), 2);
        assert_eq!(config.score_threshold, 0.25);
        assert_eq!(config.grid_size, 7);
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_values() {
        clear_vars();

        unsafe { env::set_var("TASK", "segment") };
        assert!(InferenceConfig::from_env().is_err());
        clear_vars();

        unsafe { env::set_var("ANCHORS", "1.0,2.0,3.0") };
        assert!(InferenceConfig::from_env().is_err());
        clear_vars();

        unsafe { env::set_var("ANCHORS", "1.0,wide") };
        assert!(InferenceConfig::from_env().is_err());
        clear_vars();
    }

    #[test]
    fn test_detector_config_matches_default_layout() {
        let config = InferenceConfig::test_default();
        let detector = config.detector_config();

        assert_eq!(detector, DetectorConfig::default());
        assert_eq!(detector.channels_per_cell, 30);
        assert!(DetectionDecoder::new(detector).is_ok());
    }
}
