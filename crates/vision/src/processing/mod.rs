pub mod classification;
pub mod detection;
pub mod numeric;

pub use classification::{ClassificationDecoder, is_unavailable};
pub use detection::{DetectionDecoder, DetectorConfig};
pub use numeric::{logistic, softmax};
