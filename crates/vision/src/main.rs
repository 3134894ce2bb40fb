use anyhow::Context;
use vision::{Classifier, Detector, InferenceConfig, Task, TaskOutput, logging::setup_logging};

#[cfg(feature = "ort-backend")]
use vision::backend::ort::{ExecutionProvider, OrtBackend as Backend};

#[cfg(not(feature = "ort-backend"))]
compile_error!("The 'ort-backend' feature must be enabled to build the vision binary");

fn main() -> anyhow::Result<()> {
    let config = InferenceConfig::from_env()?;

    setup_logging(&config);

    tracing::info!(
        config = ?config,
        "Loaded configuration"
    );

    let provider: ExecutionProvider = config.execution_provider.parse()?;

    let image = std::fs::read(&config.image_path)
        .with_context(|| format!("Failed to read image {}", config.image_path))?;

    let output = match config.task {
        Task::Classify => {
            let input_size = config.classifier_input_size;
            let backend = match Backend::load_model_with_provider(
                &config.model_path,
                &vision::backend::square_rgb_shape(input_size),
                provider,
            ) {
                Ok(backend) => Some(backend),
                Err(e) => {
                    tracing::warn!(error = %e, "Classifier model unavailable, scores will be NaN");
                    None
                }
            };

            let mut classifier = Classifier::new(backend, input_size, config.num_scores)?;
            TaskOutput::classification(classifier.classify_image(&image)?)
        }
        Task::Detect => {
            let input_size = config.detector_input_size;
            tracing::info!("Loading detection model");
            let backend = Backend::load_model_with_provider(
                &config.model_path,
                &vision::backend::square_rgb_shape(input_size),
                provider,
            )
            .with_context(|| format!("Failed to load detection model {}", config.model_path))?;
            tracing::info!("Model loaded successfully");

            let mut detector = Detector::new(backend, input_size, config.detector_config())?;
            let result = detector.detect(&image)?;
            tracing::info!(detections = result.len(), "Detection complete");
            TaskOutput::from(result)
        }
    };

    println!("{}", output.to_json()?);
    Ok(())
}
