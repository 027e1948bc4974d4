//! Configuration module

use std::env;

/// Labels shipped with the default model, in output-index order
pub const DEFAULT_LABELS: [&str; 3] = ["onion", "potato", "no item"];

/// Minimum confidence (percent) to accept a classification
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 60.0;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// ONNX model file
    pub model_path: String,

    /// Comma-separated labels, used when no labels file is given
    pub labels: Vec<String>,

    /// Optional labels.txt (Teachable Machine export)
    pub labels_path: Option<String>,

    /// Confidence threshold in percent (0-100)
    pub confidence_threshold: f32,

    /// Upper bound for /detect request bodies
    pub max_image_bytes: usize,

    /// Log output format ("pretty" or "json")
    pub log_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            model_path: "model_unquant_03.onnx".to_string(),
            labels: DEFAULT_LABELS.iter().map(|l| l.to_string()).collect(),
            labels_path: None,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            max_image_bytes: 10 * 1024 * 1024,
            log_format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            model_path: env::var("MODEL_PATH").unwrap_or(defaults.model_path),

            labels: env::var("LABELS")
                .ok()
                .map(|l| parse_label_list(&l))
                .filter(|l| !l.is_empty())
                .unwrap_or(defaults.labels),

            labels_path: env::var("LABELS_PATH").ok().filter(|p| !p.trim().is_empty()),

            confidence_threshold: env::var("CONFIDENCE_THRESHOLD")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(defaults.confidence_threshold),

            max_image_bytes: env::var("MAX_IMAGE_BYTES")
                .ok()
                .and_then(|b| b.parse().ok())
                .unwrap_or(defaults.max_image_bytes),

            log_format: env::var("LOG_FORMAT").unwrap_or(defaults.log_format),
        }
    }

    /// Socket address string the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

/// Split a comma-separated label list, dropping blanks
pub fn parse_label_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}
