//! # Envelope Client
//!
//! Fetches the "shell" authorization request from the relying party's
//! backend.

use tracing::instrument;

use crate::Result;
use crate::error::fetch;
use crate::types::AuthEnvelope;

/// Path of the sign-in endpoint on the backend.
pub const SIGN_IN_PATH: &str = "/api/sign-in";

/// Fetch the sign-in envelope from `backend_url`.
///
/// # Errors
///
/// Returns `Error::EnvelopeFetch` when the backend cannot be reached, responds
/// with a non-success status, or returns a body that is not a JSON object.
#[instrument(level = "debug", skip(http))]
pub async fn fetch_envelope(http: &reqwest::Client, backend_url: &str) -> Result<AuthEnvelope> {
    let url = format!("{}{SIGN_IN_PATH}", backend_url.trim_end_matches('/'));

    let http_resp =
        http.get(&url).send().await.map_err(|e| fetch!("issue fetching {}: {}", url, e))?;
    let status = http_resp.status();
    if !status.is_success() {
        return Err(fetch!("HTTP {}", status.as_u16()));
    }

    let body = http_resp.bytes().await.map_err(|e| fetch!("issue reading envelope: {}", e))?;
    let envelope: AuthEnvelope =
        serde_json::from_slice(&body).map_err(|e| fetch!("issue parsing envelope: {}", e))?;

    tracing::debug!("envelope: {envelope:?}");
    Ok(envelope)
}
