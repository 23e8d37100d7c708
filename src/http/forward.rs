//! Forwarding of admitted requests to upstream services.
//!
//! # Responsibilities
//! - Pick the upstream from the route table
//! - Rewrite the URI onto the upstream address and stream the body through
//! - Map upstream failures to JSON error responses
//!
//! # Design Decisions
//! - No retries; the body is streamed, never buffered
//! - Headers pass through as the admission stages left them

use std::str::FromStr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{
        uri::{Authority, Scheme},
        Request, StatusCode, Uri,
    },
    response::Response,
};

use crate::http::error_response::respond;
use crate::http::request_id::request_id;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Fallback handler: every path that survives admission lands here.
pub async fn forward_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&request).to_string();
    let path = request.uri().path().to_string();
    let method = request.method().to_string();

    let Some(route) = state.router.match_path(&path) else {
        tracing::warn!(request_id = %request_id, path = %path, "No route matched");
        metrics::record_request(&method, 404, "none", start_time);
        return respond(&path, StatusCode::NOT_FOUND, "No route matches the request path");
    };

    let (mut parts, body) = request.into_parts();
    parts.uri = match upstream_uri(&parts.uri, &route.upstream.to_string()) {
        Some(uri) => uri,
        None => {
            tracing::error!(request_id = %request_id, upstream = %route.upstream, "Could not build upstream URI");
            metrics::record_request(&method, 502, &route.name, start_time);
            return respond(&path, StatusCode::BAD_GATEWAY, "Upstream request failed");
        }
    };

    tracing::debug!(
        request_id = %request_id,
        route = %route.name,
        upstream = %route.upstream,
        "Forwarding request"
    );

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            metrics::record_request(&method, response.status().as_u16(), &route.name, start_time);
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, route = %route.name, error = %e, "Upstream error");
            metrics::record_request(&method, 502, &route.name, start_time);
            respond(&path, StatusCode::BAD_GATEWAY, "Upstream request failed")
        }
    }
}

/// `uri` with its scheme and authority replaced by `http://{upstream}`.
fn upstream_uri(uri: &Uri, upstream: &str) -> Option<Uri> {
    let mut parts = uri.clone().into_parts();
    parts.scheme = Some(Scheme::HTTP);
    parts.authority = Some(Authority::from_str(upstream).ok()?);
    if parts.path_and_query.is_none() {
        parts.path_and_query = Some("/".parse().ok()?);
    }
    Uri::from_parts(parts).ok()
}
