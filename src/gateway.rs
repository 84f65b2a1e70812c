//! HTTP trigger gateway — the small API surface the dashboard calls.
//!
//! `POST /api/scan` triggers a pass on demand (overlap-safe: the orchestrator
//! serializes scans internally), and `GET /api/expiry/summary` feeds the UI's
//! urgency badges from the same classifier the scan uses.

use axum::{Json, Router, extract::State, routing::get, routing::post};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use credtrack_core::config::GatewayConfig;
use credtrack_core::traits::RecordsSource;
use credtrack_core::types::{ScanOutcome, UrgencyBand};
use credtrack_engine::lifecycle::classify;
use credtrack_engine::scan::ScanOrchestrator;

pub struct AppState {
    orchestrator: Arc<ScanOrchestrator>,
    records: Arc<dyn RecordsSource>,
}

pub async fn serve(
    config: GatewayConfig,
    orchestrator: Arc<ScanOrchestrator>,
    records: Arc<dyn RecordsSource>,
) -> anyhow::Result<()> {
    let state = Arc::new(AppState {
        orchestrator,
        records,
    });

    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/scan", post(trigger_scan))
        .route("/api/expiry/summary", get(expiry_summary))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🌐 CredTrack gateway listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Health check endpoint.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "credtrack",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Manual scan trigger. Responds with the aggregate counts.
async fn trigger_scan(State(state): State<Arc<AppState>>) -> Json<ScanOutcome> {
    Json(state.orchestrator.run_scan(chrono::Utc::now()).await)
}

/// Per-band license counts for the dashboard's urgency badges and bell icon.
/// Uses the same classifier as the scan, so badge and reminder can never
/// disagree about a license's band.
async fn expiry_summary(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let licenses = match state.records.fetch_licenses().await {
        Ok(licenses) => licenses,
        Err(e) => {
            tracing::warn!("⚠️ Summary fetch failed: {e}");
            return Json(serde_json::json!({ "error": e.to_string() }));
        }
    };

    let now = chrono::Utc::now();
    let (mut upcoming, mut warning, mut urgent, mut expired) = (0u32, 0u32, 0u32, 0u32);
    for license in &licenses {
        match classify(license.expiry_date, now).band {
            UrgencyBand::Upcoming => upcoming += 1,
            UrgencyBand::Warning => warning += 1,
            UrgencyBand::Urgent => urgent += 1,
            UrgencyBand::Expired => expired += 1,
        }
    }

    Json(serde_json::json!({
        "total": licenses.len(),
        "upcoming": upcoming,
        "warning": warning,
        "urgent": urgent,
        "expired": expired,
        // Bell icon count: everything needing attention.
        "attention": warning + urgent + expired,
    }))
}
