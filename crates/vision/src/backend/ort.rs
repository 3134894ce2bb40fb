use super::InferenceBackend;
use ndarray::{Array, IxDyn};
use ort::{
    session::{Session, builder::GraphOptimizationLevel},
    value::TensorRef,
};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionProvider {
    Cpu,
    Cuda,
}

impl FromStr for ExecutionProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cpu" => Ok(ExecutionProvider::Cpu),
            "cuda" | "gpu" => Ok(ExecutionProvider::Cuda),
            other => anyhow::bail!("Unknown execution provider: {}", other),
        }
    }
}

/// ONNX Runtime engine holding one session, one input tensor and the
/// flattened outputs of the last run.
pub struct OrtBackend {
    session: Session,
    input_shape: Vec<usize>,
    input: Option<Array<f32, IxDyn>>,
    outputs: Vec<Vec<f32>>,
}

impl OrtBackend {
    /// Load model with specified execution provider
    pub fn load_model_with_provider(
        path: &str,
        input_shape: &[usize],
        provider: ExecutionProvider,
    ) -> anyhow::Result<Self> {
        // Initialize ORT environment (idempotent)
        let _ = ort::init().commit();

        #[allow(unused_mut)]
        let mut builder = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?;

        match provider {
            #[cfg(feature = "cuda")]
            ExecutionProvider::Cuda => {
                tracing::info!("Initializing ONNX Runtime with CUDA execution provider");
                builder = builder.with_execution_providers([
                    ort::execution_providers::CUDAExecutionProvider::default()
                        .with_device_id(0)
                        .build()
                        .error_on_failure(),
                ])?;
            }
            #[cfg(not(feature = "cuda"))]
            ExecutionProvider::Cuda => {
                anyhow::bail!("CUDA execution provider requested but the `cuda` feature is disabled");
            }
            ExecutionProvider::Cpu => {
                tracing::info!("Initializing ONNX Runtime with CPU execution provider");
            }
        }

        let session = builder.commit_from_file(path)?;

        tracing::info!(input_shape = ?input_shape, "Model loaded from {}", path);
        Ok(Self {
            session,
            input_shape: input_shape.to_vec(),
            input: None,
            outputs: Vec::new(),
        })
    }
}

impl InferenceBackend for OrtBackend {
    fn load_model(path: &str, input_shape: &[usize]) -> anyhow::Result<Self> {
        Self::load_model_with_provider(path, input_shape, ExecutionProvider::Cpu)
    }

    fn allocate_buffers(&mut self) -> anyhow::Result<()> {
        self.input = Some(Array::zeros(IxDyn(&self.input_shape)));
        self.outputs.clear();
        Ok(())
    }

    fn set_input(&mut self, buffer: &[f32]) -> anyhow::Result<()> {
        let input = self
            .input
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("Input tensor not allocated"))?;

        if input.len() != buffer.len() {
            anyhow::bail!(
                "Input size mismatch: tensor {:?} holds {} values, got {}",
                self.input_shape,
                input.len(),
                buffer.len()
            );
        }

        input
            .as_slice_mut()
            .ok_or_else(|| anyhow::anyhow!("Input tensor is not contiguous"))?
            .copy_from_slice(buffer);

        Ok(())
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let input = self
            .input
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Input tensor not allocated"))?;

        let outputs = self
            .session
            .run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        let mut extracted = Vec::with_capacity(outputs.len());
        for index in 0..outputs.len() {
            let array = outputs[index].try_extract_array::<f32>()?;
            extracted.push(array.iter().copied().collect());
        }
        self.outputs = extracted;

        Ok(())
    }

    fn get_output(&self, index: usize) -> anyhow::Result<&[f32]> {
        self.outputs
            .get(index)
            .map(Vec::as_slice)
            .ok_or_else(|| anyhow::anyhow!("No output tensor at index {}", index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_provider_parsing() {
        assert_eq!("cpu".parse::<ExecutionProvider>().unwrap(), ExecutionProvider::Cpu);
        assert_eq!(" CUDA ".parse::<ExecutionProvider>().unwrap(), ExecutionProvider::Cuda);
        assert_eq!("gpu".parse::<ExecutionProvider>().unwrap(), ExecutionProvider::Cuda);
        assert!("tpu".parse::<ExecutionProvider>().is_err());
    }
}
