//! Checkout Server
//!
//! Local server for a self-checkout weighing station.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   POST /detect (jpeg)     ┌──────────────────────────┐
//! │  ESP32 camera +  │ ────────────────────────► │  Classifier (ONNX)       │
//! │  load cell       │   POST /submit-price      │                          │
//! └──────────────────┘ ────────────────────────► │  BillLedger (running     │
//! ┌──────────────────┐   GET  /get-bill          │  total, mutex guarded)   │
//! │  ESP8266 display │ ────────────────────────► │                          │
//! │  + RFID reader   │   POST /process-payment   │                          │
//! └──────────────────┘ ────────────────────────► └──────────────────────────┘
//! ```

pub mod billing;
pub mod classifier;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod net;
pub mod telemetry;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,
    pub ledger: Arc<billing::BillLedger>,
    pub classifier: Arc<classifier::Classifier>,
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    // Camera client
    let detect_routes = Router::new()
        .route("/detect", post(handlers::detect::detect))
        .layer(DefaultBodyLimit::max(state.config.max_image_bytes));

    // Scale and display clients
    let billing_routes = Router::new()
        .route("/submit-price", post(handlers::billing::submit_price))
        .route("/get-bill", get(handlers::billing::get_bill))
        .route("/process-payment", post(handlers::billing::process_payment));

    Router::new()
        .route("/health", get(handlers::health::check))
        .merge(detect_routes)
        .merge(billing_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
