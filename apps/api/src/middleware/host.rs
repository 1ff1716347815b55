//! Host-header validation against an allow-list.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::HOST, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::errors::AppError;

pub const X_FORWARDED_HOST: &str = "x-forwarded-host";

/// Allow-list entries are exact host names, `.domain` for the domain and any
/// subdomain of it, or `*` for anything.
#[derive(Debug, Clone)]
pub struct AllowedHosts {
    entries: Vec<String>,
}

impl AllowedHosts {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|e| e.as_ref().trim().to_ascii_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    pub fn allows(&self, host: &str) -> bool {
        let host = strip_port(host).trim_end_matches('.').to_ascii_lowercase();
        if host.is_empty() {
            return false;
        }
        self.entries.iter().any(|entry| {
            if entry == "*" {
                return true;
            }
            match entry.strip_prefix('.') {
                Some(domain) => host == domain || host.ends_with(entry.as_str()),
                None => host == *entry,
            }
        })
    }
}

/// Removes a trailing `:port`, leaving bracketed IPv6 literals intact.
pub fn strip_port(host: &str) -> &str {
    let host = host.trim();
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}

/// The host a request claims: the first forwarded host if present, otherwise `Host`.
pub fn candidate_host(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get(X_FORWARDED_HOST)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let declared = || {
        headers
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };
    forwarded.or_else(declared).map(|h| strip_port(h).to_string())
}

/// Request extension: the server name the request is being handled as.
/// Consulted when the request carries no host header at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerName(pub String);

/// Response extension marking a disallowed-host rejection.
#[derive(Debug, Clone)]
pub struct DisallowedHost {
    pub host: String,
}

/// Rejects requests whose host is not on the allow-list with 400.
/// Requests with neither a host header nor a server name are let through.
pub async fn validate_host(
    State(allowed): State<Arc<AllowedHosts>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let host = candidate_host(req.headers())
        .or_else(|| req.extensions().get::<ServerName>().map(|s| s.0.clone()));
    if let Some(host) = host {
        if !allowed.allows(&host) {
            warn!("Rejected request for disallowed host '{host}'");
            let mut response =
                AppError::bad_request(format!("Invalid host header: '{host}'")).into_response();
            response.extensions_mut().insert(DisallowedHost { host });
            return response;
        }
    }
    next.run(req).await
}
