//! Lecture evaluator binary entrypoint.
//! Loads config, wires the API and `/metrics` routers and serves them.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lecture_evaluator::config::EvaluatorConfig;
use lecture_evaluator::metrics::Metrics;
use lecture_evaluator::{router, AppState};

/// `EVALUATOR_LOG_FORMAT=json` switches to JSON lines; compact text otherwise.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("lecture_evaluator=info,warn"));

    let json = std::env::var("EVALUATOR_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = EvaluatorConfig::load()?;
    let addr = cfg.server.addr.clone();
    info!(
        criteria = cfg.criteria.names.len(),
        methods = ?cfg.pipeline.methods,
        log = %cfg.history.log_path.display(),
        "config loaded"
    );

    let metrics = Metrics::init(cfg.criteria.names.len())?;
    let app = router(AppState::new(cfg)).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
