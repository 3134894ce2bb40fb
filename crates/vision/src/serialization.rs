use crate::processing::is_unavailable;
use crate::types::DetectionResult;
use serde::Serialize;

/// Printable result of one pipeline run.
///
/// NaN scores have no JSON form and serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum TaskOutput {
    Classify { scores: Vec<f32>, available: bool },
    Detect(DetectionResult),
}

impl TaskOutput {
    pub fn classification(scores: Vec<f32>) -> Self {
        let available = !is_unavailable(&scores);
        TaskOutput::Classify { scores, available }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<DetectionResult> for TaskOutput {
    fn from(result: DetectionResult) -> Self {
        TaskOutput::Detect(result)
    }
}
