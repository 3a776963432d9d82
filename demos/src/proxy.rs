//! # Development Proxy
//!
//! Forwards requests under a path prefix to the relying party backend so a
//! locally served UI can call it without cross-origin or TLS trouble.
//!
//! The `Host` header is rewritten to the target and invalid TLS certificates
//! are accepted. For development use only.

use anyhow::Result;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use http::header::{self, HeaderMap};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

// Request bodies larger than this are rejected.
const BODY_LIMIT: usize = 4 * 1024 * 1024;

// Hop-by-hop headers are not forwarded.
static HOP_BY_HOP: [header::HeaderName; 6] = [
    header::CONNECTION,
    header::HOST,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Proxy settings.
#[derive(Clone, Debug)]
pub struct Proxy {
    prefix: String,
    target: String,
    http: reqwest::Client,
}

impl Proxy {
    /// Create a proxy forwarding paths under `prefix` to the `target` origin.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(prefix: impl Into<String>, target: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder().danger_accept_invalid_certs(true).build()?;
        Ok(Self {
            prefix: prefix.into().trim_end_matches('/').to_string(),
            target: target.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// The upstream URL for a request path, or `None` when the path is outside
    /// the prefix. The prefix is kept on the forwarded path.
    #[must_use]
    pub fn upstream(&self, path: &str, query: Option<&str>) -> Option<String> {
        let rest = path.strip_prefix(&self.prefix)?;
        if !(rest.is_empty() || rest.starts_with('/')) {
            return None;
        }
        let query = query.map(|q| format!("?{q}")).unwrap_or_default();
        Some(format!("{}{path}{query}", self.target))
    }

    /// Build the proxy router.
    pub fn router(self) -> Router {
        Router::new()
            .fallback(forward)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::new().allow_methods(Any).allow_origin(Any).allow_headers(Any))
            .with_state(self)
    }

    /// Serve the proxy on `addr`.
    ///
    /// # Errors
    ///
    /// Returns an error if `addr` cannot be bound.
    pub async fn serve(self, addr: &str) -> Result<JoinHandle<()>> {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(
            "proxying {}/* to {} on {}",
            self.prefix,
            self.target,
            listener.local_addr()?
        );

        let router = self.router();
        let jh = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("proxy stopped: {e}");
            }
        });

        Ok(jh)
    }
}

async fn forward(State(proxy): State<Proxy>, request: Request) -> Result<Response, AppError> {
    let Some(url) = proxy.upstream(request.uri().path(), request.uri().query()) else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };

    let (parts, body) = request.into_parts();
    let body = to_bytes(body, BODY_LIMIT).await?;

    // reqwest sets `Host` from the target URL
    let upstream = proxy
        .http
        .request(parts.method, &url)
        .headers(strip_hop_by_hop(parts.headers))
        .body(body)
        .send()
        .await?;
    tracing::debug!("{url} -> {}", upstream.status());

    let mut response = Response::builder().status(upstream.status());
    if let Some(headers) = response.headers_mut() {
        headers.extend(strip_hop_by_hop(upstream.headers().clone()));
        headers.remove(header::CONTENT_LENGTH);
    }
    let bytes = upstream.bytes().await?;

    Ok(response.body(Body::from(bytes))?)
}

fn strip_hop_by_hop(mut headers: HeaderMap) -> HeaderMap {
    for name in HOP_BY_HOP.iter() {
        headers.remove(name);
    }
    headers
}

struct AppError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::warn!("upstream error: {}", self.0);
        (StatusCode::BAD_GATEWAY, format!("{}", self.0)).into_response()
    }
}

#[cfg(test)]
mod test {
    use test_utils::Backend;
    use test_utils::data::SIGN_IN;

    use super::*;

    #[test]
    fn upstream_url() {
        let proxy = Proxy::new("/api/", "https://backend.example/").expect("should build");

        assert_eq!(
            proxy.upstream("/api/sign-in", None).as_deref(),
            Some("https://backend.example/api/sign-in")
        );
        assert_eq!(
            proxy.upstream("/api/sign-in", Some("a=1")).as_deref(),
            Some("https://backend.example/api/sign-in?a=1")
        );
        assert_eq!(proxy.upstream("/api", None).as_deref(), Some("https://backend.example/api"));
        assert_eq!(proxy.upstream("/apis", None), None);
        assert_eq!(proxy.upstream("/index.html", None), None);
    }

    #[test]
    fn hop_by_hop_removed() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "localhost:3001".parse().expect("should parse"));
        headers.insert(header::ACCEPT, "application/json".parse().expect("should parse"));

        let headers = strip_hop_by_hop(headers);
        assert!(headers.get(header::HOST).is_none());
        assert_eq!(headers[header::ACCEPT], "application/json");
    }

    #[tokio::test]
    async fn forwards_sign_in() {
        let backend = Backend::Envelope(SIGN_IN.to_string()).serve().await.expect("should serve");
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("should bind");
        let addr = listener.local_addr().expect("has address");
        let router = Proxy::new("/api", backend).expect("should build").router();
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("server should run");
        });

        let http = reqwest::Client::new();
        let resp = http.get(format!("http://{addr}/api/sign-in")).send().await.expect("should send");
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = resp.json().await.expect("should be JSON");
        assert_eq!(body["body"]["reason"], "test flow");

        let resp = http.get(format!("http://{addr}/other")).send().await.expect("should send");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
