//! # Proof Callback
//!
//! Accepts `proof-complete` signals over HTTP and forwards them to the
//! verifier's signal hub.

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use credibil_verify::{ProofComplete, Signals};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the callback router.
pub fn router(signals: Signals) -> Router {
    Router::new()
        .route("/proof-complete", post(proof_complete))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_methods(Any).allow_origin(Any).allow_headers(Any))
        .with_state(signals)
}

/// Serve the callback endpoint on `addr`.
///
/// # Errors
///
/// Returns an error if `addr` cannot be bound.
pub async fn serve(addr: &str, signals: Signals) -> Result<JoinHandle<()>> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("proof callback listening on {}", listener.local_addr()?);

    let router = router(signals);
    let jh = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!("proof callback stopped: {e}");
        }
    });

    Ok(jh)
}

#[axum::debug_handler]
async fn proof_complete(
    State(signals): State<Signals>, Json(signal): Json<ProofComplete>,
) -> impl IntoResponse {
    // nobody listening means no session is waiting
    if signals.proof_complete(signal) == 0 {
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    StatusCode::ACCEPTED
}
