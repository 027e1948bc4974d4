//! Inference Engine - ONNX Runtime Integration
//!
//! Loads the image model once and runs single forward passes.
//! The engine sits behind a trait so the runtime can be swapped.

use std::path::Path;

use ndarray::Array4;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;
use serde::Serialize;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Failed to load model: {0}")]
    Load(String),

    #[error("Unsupported model input: {0}")]
    UnsupportedInput(String),

    #[error("Failed to read labels: {0}")]
    Labels(String),

    #[error("Inference failed: {0}")]
    Run(String),
}

// ============================================================================
// MODEL INPUT
// ============================================================================

/// Memory layout of the image input tensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorLayout {
    /// `[1, H, W, 3]` - Keras / Teachable Machine exports
    Nhwc,
    /// `[1, 3, H, W]` - PyTorch style exports
    Nchw,
}

/// Fixed input geometry of a loaded model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelInput {
    pub width: u32,
    pub height: u32,
    pub layout: TensorLayout,
}

impl ModelInput {
    pub fn nhwc(width: u32, height: u32) -> Self {
        Self { width, height, layout: TensorLayout::Nhwc }
    }

    /// Derive geometry from a 4-D input shape.
    ///
    /// Channels-last wins when both positions hold 3 (a 3x3 image is not a
    /// realistic classifier input anyway).
    pub fn from_shape(dims: &[i64]) -> Result<Self, InferenceError> {
        if dims.len() != 4 {
            return Err(InferenceError::UnsupportedInput(format!(
                "expected a 4-D image tensor, got shape {:?}",
                dims
            )));
        }

        let (layout, height, width) = if dims[3] == 3 {
            (TensorLayout::Nhwc, dims[1], dims[2])
        } else if dims[1] == 3 {
            (TensorLayout::Nchw, dims[2], dims[3])
        } else {
            return Err(InferenceError::UnsupportedInput(format!(
                "no RGB channel axis in shape {:?}",
                dims
            )));
        };

        if height <= 0 || width <= 0 {
            return Err(InferenceError::UnsupportedInput(format!(
                "dynamic spatial dimensions in shape {:?}",
                dims
            )));
        }

        Ok(Self {
            width: width as u32,
            height: height as u32,
            layout,
        })
    }

    /// Tensor shape the engine expects for one image
    pub fn shape(&self) -> [usize; 4] {
        let (h, w) = (self.height as usize, self.width as usize);
        match self.layout {
            TensorLayout::Nhwc => [1, h, w, 3],
            TensorLayout::Nchw => [1, 3, h, w],
        }
    }
}

// ============================================================================
// INFERENCE ENGINE TRAIT
// ============================================================================

/// Trait for inference engines (ONNX Runtime, test stubs, ...)
pub trait InferenceEngine: Send + Sync {
    /// Human readable model identifier
    fn name(&self) -> &str;

    fn input(&self) -> ModelInput;

    /// Run one forward pass and return the flattened first output
    fn run(&self, input: Array4<f32>) -> Result<Vec<f32>, InferenceError>;
}

// ============================================================================
// ONNX IMPLEMENTATION
// ============================================================================

pub struct OnnxEngine {
    session: Mutex<Session>,
    model_path: String,
    input: ModelInput,
    output_name: String,
}

impl OnnxEngine {
    /// Load ONNX model from file
    pub fn load(model_path: &str) -> Result<Self, InferenceError> {
        tracing::info!("Loading ONNX model from: {}", model_path);

        if !Path::new(model_path).exists() {
            return Err(InferenceError::ModelNotFound(model_path.to_string()));
        }

        let session = Session::builder()
            .map_err(|e| InferenceError::Load(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| InferenceError::Load(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| InferenceError::Load(e.to_string()))?;

        let first_input = session
            .inputs
            .first()
            .ok_or_else(|| InferenceError::UnsupportedInput("model has no inputs".to_string()))?;
        let dims: Vec<i64> = first_input
            .input_type
            .tensor_shape()
            .ok_or_else(|| {
                InferenceError::UnsupportedInput(format!("input '{}' is not a tensor", first_input.name))
            })?
            .iter()
            .copied()
            .collect();
        let input = ModelInput::from_shape(&dims)?;

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| InferenceError::Load("No output defined".to_string()))?;

        tracing::info!(
            "ONNX model loaded: {}x{} ({:?}), output '{}'",
            input.width,
            input.height,
            input.layout,
            output_name
        );

        Ok(Self {
            session: Mutex::new(session),
            model_path: model_path.to_string(),
            input,
            output_name,
        })
    }
}

impl InferenceEngine for OnnxEngine {
    fn name(&self) -> &str {
        &self.model_path
    }

    fn input(&self) -> ModelInput {
        self.input
    }

    fn run(&self, input: Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        let input_tensor = Value::from_array(input)
            .map_err(|e| InferenceError::Run(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| InferenceError::Run(e.to_string()))?;

        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| InferenceError::Run("No output".to_string()))?;

        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::Run(format!("Extract error: {}", e)))?;

        Ok(data.to_vec())
    }
}

// ============================================================================
// TEST SUPPORT
// ============================================================================

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Engine returning canned scores, checking the tensor it is fed
    pub struct StubEngine {
        pub input: ModelInput,
        pub scores: Vec<f32>,
    }

    impl StubEngine {
        pub fn new(scores: Vec<f32>) -> Self {
            Self {
                input: ModelInput::nhwc(8, 8),
                scores,
            }
        }
    }

    impl InferenceEngine for StubEngine {
        fn name(&self) -> &str {
            "stub"
        }

        fn input(&self) -> ModelInput {
            self.input
        }

        fn run(&self, input: Array4<f32>) -> Result<Vec<f32>, InferenceError> {
            if input.shape() != self.input.shape() {
                return Err(InferenceError::Run(format!(
                    "unexpected input shape {:?}",
                    input.shape()
                )));
            }
            if input.iter().any(|v| !(0.0..=1.0).contains(v)) {
                return Err(InferenceError::Run("input not normalized".to_string()));
            }
            Ok(self.scores.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nhwc_shape() {
        let input = ModelInput::from_shape(&[1, 224, 224, 3]).unwrap();
        assert_eq!(input, ModelInput::nhwc(224, 224));
        assert_eq!(input.shape(), [1, 224, 224, 3]);
    }

    #[test]
    fn test_nchw_shape() {
        let input = ModelInput::from_shape(&[1, 3, 96, 128]).unwrap();
        assert_eq!(input.layout, TensorLayout::Nchw);
        assert_eq!((input.width, input.height), (128, 96));
        assert_eq!(input.shape(), [1, 3, 96, 128]);
    }

    #[test]
    fn test_dynamic_dims_rejected() {
        let err = ModelInput::from_shape(&[-1, -1, -1, 3]).unwrap_err();
        assert!(matches!(err, InferenceError::UnsupportedInput(_)));
    }

    #[test]
    fn test_non_image_shape_rejected() {
        assert!(ModelInput::from_shape(&[1, 15]).is_err());
        assert!(ModelInput::from_shape(&[1, 224, 224, 1]).is_err());
    }

    #[test]
    fn test_missing_model_file() {
        let result = OnnxEngine::load("/nonexistent/model.onnx");
        assert!(matches!(result, Err(InferenceError::ModelNotFound(_))));
    }
}
