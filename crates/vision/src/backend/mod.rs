#[cfg(feature = "ort-backend")]
pub mod ort;

/// Synchronous model-execution engine with a single input and indexed outputs.
///
/// Calls follow the order `allocate_buffers` -> `set_input` -> `run` ->
/// `get_output`. An engine is owned by exactly one pipeline and is never
/// shared across concurrent calls.
pub trait InferenceBackend {
    /// Load a serialized model. `input_shape` is the full input tensor shape,
    /// e.g. `[1, 416, 416, 3]`.
    fn load_model(path: &str, input_shape: &[usize]) -> anyhow::Result<Self>
    where
        Self: Sized;

    /// (Re)allocate the input tensor and drop outputs of a previous run
    fn allocate_buffers(&mut self) -> anyhow::Result<()>;

    /// Copy a flat input buffer into the allocated input tensor
    fn set_input(&mut self, buffer: &[f32]) -> anyhow::Result<()>;

    /// Execute the model on the current input
    fn run(&mut self) -> anyhow::Result<()>;

    /// Flat view of output tensor `index` from the last run
    fn get_output(&self, index: usize) -> anyhow::Result<&[f32]>;

    /// Run the whole call sequence and return a copy of output 0.
    fn infer(&mut self, input: &[f32]) -> anyhow::Result<Vec<f32>> {
        self.allocate_buffers()?;
        self.set_input(input)?;
        self.run()?;
        Ok(self.get_output(0)?.to_vec())
    }
}

/// Input tensor shape for a square NHWC RGB image
pub fn square_rgb_shape(size: u32) -> [usize; 4] {
    [1, size as usize, size as usize, 3]
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records the call sequence and echoes the input summed into one value
    struct RecordingBackend {
        calls: Vec<&'static str>,
        input: Vec<f32>,
        output: Vec<f32>,
    }

    impl InferenceBackend for RecordingBackend {
        fn load_model(_path: &str, _input_shape: &[usize]) -> anyhow::Result<Self> {
            Ok(Self {
                calls: Vec::new(),
                input: Vec::new(),
                output: Vec::new(),
            })
        }

        fn allocate_buffers(&mut self) -> anyhow::Result<()> {
            self.calls.push("allocate");
            self.output.clear();
            Ok(())
        }

        fn set_input(&mut self, buffer: &[f32]) -> anyhow::Result<()> {
            self.calls.push("set_input");
            self.input = buffer.to_vec();
            Ok(())
        }

        fn run(&mut self) -> anyhow::Result<()> {
            self.calls.push("run");
            self.output = vec![self.input.iter().sum()];
            Ok(())
        }

        fn get_output(&self, index: usize) -> anyhow::Result<&[f32]> {
            if index != 0 {
                anyhow::bail!("Output index {} out of range", index);
            }
            Ok(&self.output)
        }
    }

    #[test]
    fn test_infer_runs_full_call_sequence() {
        let mut backend = RecordingBackend::load_model("unused", &[1, 1, 1, 3]).unwrap();

        let output = backend.infer(&[1.0, 2.0, 3.0]).unwrap();

        assert_eq!(output, vec![6.0]);
        assert_eq!(backend.calls, vec!["allocate", "set_input", "run"]);
    }

    #[test]
    fn test_get_output_out_of_range() {
        let backend = RecordingBackend::load_model("unused", &[1, 1, 1, 3]).unwrap();
        assert!(backend.get_output(1).is_err());
    }

    #[test]
    fn test_square_rgb_shape() {
        assert_eq!(square_rgb_shape(416), [1, 416, 416, 3]);
        assert_eq!(square_rgb_shape(300), [1, 300, 300, 3]);
    }
}
