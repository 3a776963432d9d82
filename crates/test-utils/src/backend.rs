//! # Mock Backend
//!
//! A relying party backend serving `GET /api/sign-in` on an ephemeral port.

use anyhow::Result;
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::net::TcpListener;

/// What the mock backend answers to `GET /api/sign-in`.
#[derive(Clone, Debug)]
pub enum Backend {
    /// Respond `200 OK` with this JSON body.
    Envelope(String),

    /// Respond with this status and an empty body.
    Status(u16),

    /// Respond `200 OK` with a body that is not JSON.
    Malformed,
}

impl Backend {
    /// Start the backend, returning its base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub async fn serve(self) -> Result<String> {
        let router = Router::new().route("/api/sign-in", get(sign_in)).with_state(self);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("server should run");
        });

        tracing::debug!("mock backend listening on {addr}");
        Ok(format!("http://{addr}"))
    }
}

async fn sign_in(State(backend): State<Backend>) -> Response {
    match backend {
        Backend::Envelope(json) => {
            ([(header::CONTENT_TYPE, "application/json")], json).into_response()
        }
        Backend::Status(code) => {
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR).into_response()
        }
        Backend::Malformed => {
            ([(header::CONTENT_TYPE, "application/json")], "<html>not json</html>").into_response()
        }
    }
}
