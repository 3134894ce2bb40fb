pub mod backend;
pub mod config;
pub mod errors;
pub mod logging;
pub mod pipeline;
pub mod processing;
pub mod serialization;
pub mod types;

// Re-export commonly used types for convenience
pub use backend::InferenceBackend;
pub use config::{InferenceConfig, Task};
pub use errors::InferenceError;
pub use pipeline::{Classifier, Detector};
pub use processing::{ClassificationDecoder, DetectionDecoder, DetectorConfig};
pub use serialization::TaskOutput;
pub use types::{Anchor, AnchorSet, BoxProposal, DetectionResult};
