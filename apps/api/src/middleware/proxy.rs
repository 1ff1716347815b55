//! Host rewriting for deployments behind a proxy that forwards arbitrary
//! custom domains.
//!
//! When enabled, a forwarded host that is not on the allow-list is replaced by
//! the configured safe host before host validation runs. If the wrapped
//! service still answers with a disallowed-host rejection, the request is
//! replayed once with the safe host forced.

use std::convert::Infallible;
use std::future::{poll_fn, Future};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header::HOST, HeaderMap, HeaderValue, Method, Request, StatusCode, Uri, Version},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tower::{Layer, Service};
use tracing::{info, warn};

use crate::config::ProxyConfig;
use crate::middleware::host::{
    candidate_host, AllowedHosts, DisallowedHost, ServerName, X_FORWARDED_HOST,
};

/// Bodies are buffered so the request can be replayed.
pub const MAX_BUFFERED_BODY: usize = 10 * 1024 * 1024;

/// Request extension: the host the client originally asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalHost(pub String);

#[derive(Debug, Clone)]
pub struct ProxyHostConfig {
    pub enabled: bool,
    pub allowed: AllowedHosts,
    safe_host: String,
    safe_host_header: HeaderValue,
}

impl ProxyHostConfig {
    pub fn new(enabled: bool, allowed: AllowedHosts, safe_host: &str) -> Self {
        let safe_host_header =
            HeaderValue::from_str(safe_host).unwrap_or_else(|_| HeaderValue::from_static("localhost"));
        let safe_host = safe_host_header
            .to_str()
            .unwrap_or("localhost")
            .to_string();
        Self {
            enabled,
            allowed,
            safe_host,
            safe_host_header,
        }
    }

    pub fn safe_host(&self) -> &str {
        &self.safe_host
    }

    /// Points the request at the safe host and drops the forwarded host.
    fn force_safe_host(&self, headers: &mut HeaderMap) {
        headers.insert(HOST, self.safe_host_header.clone());
        headers.remove(X_FORWARDED_HOST);
    }
}

impl From<&ProxyConfig> for ProxyHostConfig {
    fn from(config: &ProxyConfig) -> Self {
        ProxyHostConfig::new(
            config.proxy_hosted,
            AllowedHosts::new(&config.allowed_hosts),
            &config.safe_host,
        )
    }
}

#[derive(Clone)]
pub struct ProxyHostLayer {
    config: Arc<ProxyHostConfig>,
}

impl ProxyHostLayer {
    pub fn new(config: ProxyHostConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl<S> Layer<S> for ProxyHostLayer {
    type Service = ProxyHost<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ProxyHost {
            inner,
            config: self.config.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ProxyHost<S> {
    inner: S,
    config: Arc<ProxyHostConfig>,
}

impl<S> Service<Request<Body>> for ProxyHost<S>
where
    S: Service<Request<Body>, Response = Response, Error = Infallible> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        if !self.config.enabled {
            return Box::pin(self.inner.call(req));
        }

        // Take the service that was driven to readiness; leave a fresh clone behind.
        let clone = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, clone);
        let config = self.config.clone();
        Box::pin(rewrite_and_call(inner, config, req))
    }
}

/// Request head kept for the replay.
struct Head {
    method: Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
    original_host: Option<OriginalHost>,
}

impl Head {
    fn build(self, body: Bytes) -> Request<Body> {
        let mut req = Request::new(Body::from(body));
        *req.method_mut() = self.method;
        *req.uri_mut() = self.uri;
        *req.version_mut() = self.version;
        *req.headers_mut() = self.headers;
        if let Some(original) = self.original_host {
            req.extensions_mut().insert(original);
        }
        req
    }
}

async fn rewrite_and_call<S>(
    mut inner: S,
    config: Arc<ProxyHostConfig>,
    mut req: Request<Body>,
) -> Result<Response, Infallible>
where
    S: Service<Request<Body>, Response = Response, Error = Infallible>,
{
    rewrite_disallowed_host(&mut req, &config);

    let (parts, body) = req.into_parts();
    let body = match to_bytes(body, MAX_BUFFERED_BODY).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return Ok((
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(json!({ "success": false, "error": "Request body too large" })),
            )
                .into_response())
        }
    };
    let head = Head {
        method: parts.method.clone(),
        uri: parts.uri.clone(),
        version: parts.version,
        headers: parts.headers.clone(),
        original_host: parts.extensions.get::<OriginalHost>().cloned(),
    };

    let response = inner
        .call(Request::from_parts(parts, Body::from(body.clone())))
        .await?;
    let Some(rejected) = response.extensions().get::<DisallowedHost>() else {
        return Ok(response);
    };

    let requested = head
        .original_host
        .as_ref()
        .map_or(rejected.host.as_str(), |o| o.0.as_str());
    warn!(
        "Host '{}' still disallowed (client asked for '{}'); retrying as '{}'",
        rejected.host,
        requested,
        config.safe_host()
    );
    let mut retry = head.build(body);
    config.force_safe_host(retry.headers_mut());
    retry
        .extensions_mut()
        .insert(ServerName(config.safe_host().to_string()));

    poll_fn(|cx| inner.poll_ready(cx)).await?;
    inner.call(retry).await
}

/// Replaces a host that is not on the allow-list with the safe host.
fn rewrite_disallowed_host(req: &mut Request<Body>, config: &ProxyHostConfig) {
    let Some(host) = candidate_host(req.headers()) else {
        return;
    };
    if config.allowed.allows(&host) {
        return;
    }

    info!(
        "Rewriting host '{}' to '{}' behind proxy",
        host,
        config.safe_host()
    );
    config.force_safe_host(req.headers_mut());
    req.extensions_mut()
        .insert(ServerName(config.safe_host().to_string()));
    req.extensions_mut().insert(OriginalHost(host));
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use axum::{middleware::from_fn_with_state, routing::any, Router};
    use tower::ServiceExt;

    use super::*;
    use crate::middleware::host::validate_host;

    fn config(enabled: bool) -> ProxyHostConfig {
        ProxyHostConfig::new(
            enabled,
            AllowedHosts::new(["localhost", ".example.com"]),
            "localhost",
        )
    }

    /// Echoes the host and forwarded host the handler observed.
    async fn echo(req: Request<Body>) -> String {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-")
                .to_string()
        };
        let original = req
            .extensions()
            .get::<OriginalHost>()
            .map(|o| o.0.clone())
            .unwrap_or_else(|| "-".to_string());
        format!("{}|{}|{}", header(HOST.as_str()), header(X_FORWARDED_HOST), original)
    }

    fn app(enabled: bool) -> Router {
        Router::new()
            .route("/", any(echo))
            .layer(from_fn_with_state(
                Arc::new(AllowedHosts::new(["localhost", ".example.com"])),
                validate_host,
            ))
            .layer(ProxyHostLayer::new(config(enabled)))
    }

    fn request(forwarded: &str) -> Request<Body> {
        Request::builder()
            .uri("/")
            .header(HOST, "internal.vercel.app")
            .header(X_FORWARDED_HOST, forwarded)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_disallowed_forwarded_host_is_rewritten() {
        let response = app(true).oneshot(request("evil.com")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "localhost|-|evil.com");
    }

    #[tokio::test]
    async fn test_allowed_forwarded_host_passes_unchanged() {
        let response = app(true).oneshot(request("app.example.com")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_text(response).await,
            "internal.vercel.app|app.example.com|-"
        );
    }

    #[tokio::test]
    async fn test_disabled_layer_leaves_validation_in_charge() {
        let response = app(false).oneshot(request("evil.com")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.extensions().get::<DisallowedHost>().is_some());
    }

    #[tokio::test]
    async fn test_retries_once_with_safe_host_after_rejection() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::<(String, Bytes)>::new()));
        let inner = {
            let calls = calls.clone();
            let seen = seen.clone();
            tower::service_fn(move |req: Request<Body>| {
                let calls = calls.clone();
                let seen = seen.clone();
                async move {
                    let attempt = calls.fetch_add(1, Ordering::SeqCst);
                    let host = req.headers()[HOST].to_str().unwrap().to_string();
                    let body = to_bytes(req.into_body(), usize::MAX).await.unwrap();
                    seen.lock().unwrap().push((host, body));
                    let mut response = StatusCode::OK.into_response();
                    if attempt == 0 {
                        response = StatusCode::BAD_REQUEST.into_response();
                        response.extensions_mut().insert(DisallowedHost {
                            host: "app.example.com".into(),
                        });
                    }
                    Ok::<_, Infallible>(response)
                }
            })
        };

        let svc = ProxyHostLayer::new(config(true)).layer(inner);
        let req = Request::builder()
            .method(Method::POST)
            .uri("/")
            .header(HOST, "app.example.com")
            .body(Body::from("payload"))
            .unwrap();
        let response = svc.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].0, "app.example.com");
        assert_eq!(seen[1].0, "localhost");
        assert_eq!(seen[1].1, Bytes::from("payload"));
    }

    #[tokio::test]
    async fn test_retry_keeps_original_host() {
        let seen = Arc::new(Mutex::new(Vec::<Option<String>>::new()));
        let inner = {
            let seen = seen.clone();
            tower::service_fn(move |req: Request<Body>| {
                let seen = seen.clone();
                async move {
                    let mut seen = seen.lock().unwrap();
                    seen.push(req.extensions().get::<OriginalHost>().map(|o| o.0.clone()));
                    let mut response = StatusCode::OK.into_response();
                    if seen.len() == 1 {
                        response = StatusCode::BAD_REQUEST.into_response();
                        response.extensions_mut().insert(DisallowedHost {
                            host: "localhost".into(),
                        });
                    }
                    Ok::<_, Infallible>(response)
                }
            })
        };
        let svc = ProxyHostLayer::new(config(true)).layer(inner);
        let response = svc.oneshot(request("evil.com")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].as_deref(), Some("evil.com"));
    }

    #[tokio::test]
    async fn test_retry_happens_at_most_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let inner = {
            let calls = calls.clone();
            tower::service_fn(move |_req: Request<Body>| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    let mut response = StatusCode::BAD_REQUEST.into_response();
                    response.extensions_mut().insert(DisallowedHost {
                        host: "localhost".into(),
                    });
                    Ok::<_, Infallible>(response)
                }
            })
        };
        let svc = ProxyHostLayer::new(config(true)).layer(inner);
        let response = svc.oneshot(request("evil.com")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
