//! Classifier Module - item detection from camera frames
//!
//! Wraps a single pre-loaded model: decode, resize, normalize, one forward
//! pass, then threshold the winning class against the label set.

pub mod engine;
pub mod labels;
pub mod preprocess;
pub mod scoring;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::Serialize;

use crate::config::Config;
pub use engine::{InferenceEngine, InferenceError, ModelInput, OnnxEngine, TensorLayout};
pub use scoring::NO_DETECTION;

/// Result of one `/detect` call
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClassifierResult {
    pub detected_item: String,
    /// Percent (0-100)
    pub confidence: f32,
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("No data")]
    EmptyPayload,

    #[error(transparent)]
    Decode(#[from] image::ImageError),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Engine status for the health endpoint
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub model_name: String,
    pub input_width: u32,
    pub input_height: u32,
    pub layout: TensorLayout,
    pub labels: Vec<String>,
    pub confidence_threshold: f32,
    pub inference_count: u64,
    pub avg_latency_ms: f32,
}

pub struct Classifier {
    engine: Box<dyn InferenceEngine>,
    labels: Vec<String>,
    threshold: f32,
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
}

impl Classifier {
    pub fn new(engine: Box<dyn InferenceEngine>, labels: Vec<String>, threshold: f32) -> Self {
        Self {
            engine,
            labels,
            threshold,
            latency_sum_us: AtomicU64::new(0),
            inference_count: AtomicU64::new(0),
        }
    }

    /// Load model and labels named by the configuration
    pub fn load(config: &Config) -> Result<Self, InferenceError> {
        let labels = match &config.labels_path {
            Some(path) => labels::load_labels_file(path)?,
            None => config.labels.clone(),
        };

        let engine = OnnxEngine::load(&config.model_path)?;

        Ok(Self::new(Box::new(engine), labels, config.confidence_threshold))
    }

    pub fn input(&self) -> ModelInput {
        self.engine.input()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Classify one encoded image
    pub fn classify(&self, bytes: &[u8]) -> Result<ClassifierResult, ClassifyError> {
        if bytes.is_empty() {
            return Err(ClassifyError::EmptyPayload);
        }

        let start = Instant::now();

        let img = preprocess::decode_image(bytes)?;
        let tensor = preprocess::to_input_tensor(&img, &self.engine.input());
        let scores = self.engine.run(tensor)?;
        if scores.iter().any(|v| v.is_nan()) {
            return Err(InferenceError::Run("Model produced NaN output".to_string()).into());
        }

        let top = scoring::top_class(&scores)
            .ok_or_else(|| InferenceError::Run("Model produced no outputs".to_string()))?;
        let item = scoring::resolve_label(&top, &self.labels, self.threshold);

        self.latency_sum_us
            .fetch_add(start.elapsed().as_micros() as u64, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            item,
            index = top.index,
            confidence = top.confidence,
            "classified frame"
        );

        Ok(ClassifierResult {
            detected_item: item.to_string(),
            confidence: top.confidence,
        })
    }

    pub fn status(&self) -> EngineStatus {
        let input = self.engine.input();
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f32 / count as f32) / 1000.0 } else { 0.0 };

        EngineStatus {
            model_name: self.engine.name().to_string(),
            input_width: input.width,
            input_height: input.height,
            layout: input.layout,
            labels: self.labels.clone(),
            confidence_threshold: self.threshold,
            inference_count: count,
            avg_latency_ms: avg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::engine::testing::StubEngine;
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([180, 120, 60])));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn classifier(scores: Vec<f32>) -> Classifier {
        let labels = vec!["onion".to_string(), "potato".to_string(), "no item".to_string()];
        Classifier::new(Box::new(StubEngine::new(scores)), labels, 60.0)
    }

    #[test]
    fn test_confident_detection() {
        let c = classifier(vec![0.1, 0.85, 0.05]);
        let result = c.classify(&png_bytes(32, 24)).unwrap();

        assert_eq!(result.detected_item, "potato");
        assert!((result.confidence - 85.0).abs() < 1e-3);
    }

    #[test]
    fn test_low_confidence_reports_none_with_score() {
        let c = classifier(vec![0.5, 0.3, 0.2]);
        let result = c.classify(&png_bytes(8, 8)).unwrap();

        assert_eq!(result.detected_item, NO_DETECTION);
        assert!((result.confidence - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_extra_output_class_is_none() {
        let c = classifier(vec![0.0, 0.0, 0.0, 0.95]);
        let result = c.classify(&png_bytes(8, 8)).unwrap();
        assert_eq!(result.detected_item, NO_DETECTION);
    }

    #[test]
    fn test_empty_and_garbage_payloads() {
        let c = classifier(vec![1.0]);
        assert!(matches!(c.classify(&[]), Err(ClassifyError::EmptyPayload)));
        assert!(matches!(c.classify(b"\x00\x01garbage"), Err(ClassifyError::Decode(_))));
    }

    #[test]
    fn test_no_outputs_is_inference_error() {
        let c = classifier(vec![]);
        let result = c.classify(&png_bytes(8, 8));
        assert!(matches!(result, Err(ClassifyError::Inference(_))));
    }

    #[test]
    fn test_nan_output_is_inference_error() {
        let c = classifier(vec![0.9, f32::NAN, 0.1]);
        let result = c.classify(&png_bytes(8, 8));
        assert!(matches!(result, Err(ClassifyError::Inference(_))));
    }

    #[test]
    fn test_status_tracks_inferences() {
        let c = classifier(vec![0.9, 0.05, 0.05]);
        assert_eq!(c.status().inference_count, 0);

        c.classify(&png_bytes(8, 8)).unwrap();
        c.classify(&png_bytes(16, 16)).unwrap();

        let status = c.status();
        assert_eq!(status.inference_count, 2);
        assert_eq!(status.model_name, "stub");
        assert_eq!((status.input_width, status.input_height), (8, 8));
        assert_eq!(status.labels.len(), 3);
    }
}
