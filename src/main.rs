//! Checkout server binary

use std::sync::Arc;

use anyhow::Context;

use checkout_server::{
    billing::BillLedger, classifier::Classifier, config::Config, create_router, net, telemetry,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Initialize logging
    telemetry::init(config.json_logs());

    tracing::info!("Checkout server starting...");

    // Model load failure is fatal
    let classifier = Classifier::load(&config)
        .with_context(|| format!("Failed to load model {}", config.model_path))?;
    let input = classifier.input();
    tracing::info!(
        "Model ready: expects {}x{} input, labels {:?}",
        input.width,
        input.height,
        classifier.labels()
    );

    let state = AppState {
        config: config.clone(),
        ledger: Arc::new(BillLedger::new()),
        classifier: Arc::new(classifier),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr()))?;

    tracing::info!("🚀 Server listening on http://{}:{}", net::local_ip(), config.port);
    tracing::info!("Point the scale and display clients at this address");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
