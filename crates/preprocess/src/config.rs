/// Square side fed to the classification model.
pub const CLASSIFICATION_INPUT_SIZE: u32 = 300;

/// Square side fed to the grid detector.
pub const DETECTION_INPUT_SIZE: u32 = 416;
