//! Authentication stage.
//!
//! Validates the bearer credential and attaches the caller identity to the
//! request (extension for the pipeline, headers for upstream services).

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, Request, StatusCode},
};

use crate::auth::{AuthError, CredentialValidator};
use crate::http::error_response::respond;
use crate::observability::metrics;
use crate::pipeline::headers::{BEARER_PREFIX, X_CUSTOMER_ID, X_USERNAME};
use crate::pipeline::stage::{
    AdmissionContext, AdmissionStage, AuthenticatedIdentity, StageKind, StageOutcome,
};
use crate::routing::PrefixSet;

pub struct AuthenticationStage {
    validator: Arc<CredentialValidator>,
    excluded: PrefixSet,
}

impl AuthenticationStage {
    pub fn new(validator: Arc<CredentialValidator>, excluded: PrefixSet) -> Self {
        Self {
            validator,
            excluded,
        }
    }

    fn reject(&self, ctx: &AdmissionContext, error: AuthError) -> StageOutcome {
        tracing::warn!(path = %ctx.path, reason = error.kind(), "Authentication failed");
        metrics::record_admission(StageKind::Authenticate.name(), error.kind());
        StageOutcome::Terminate(respond(&ctx.path, StatusCode::UNAUTHORIZED, error.to_string()))
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl AdmissionStage for AuthenticationStage {
    fn kind(&self) -> StageKind {
        StageKind::Authenticate
    }

    async fn apply(&self, mut request: Request<Body>, ctx: &mut AdmissionContext) -> StageOutcome {
        if self.excluded.contains(&ctx.path) {
            tracing::debug!(path = %ctx.path, "Skipping credential validation for public path");
            // Identity headers are only ever set here; never pass a caller's through.
            let headers = request.headers_mut();
            headers.remove(X_CUSTOMER_ID);
            headers.remove(X_USERNAME);
            return StageOutcome::Continue(request);
        }

        let claims = match bearer_token(request.headers()) {
            Some(token) => self.validator.validate(token),
            None => Err(AuthError::MalformedHeader),
        };
        let claims = match claims {
            Ok(claims) => claims,
            Err(e) => return self.reject(ctx, e),
        };

        let identity_value = match HeaderValue::from_bytes(claims.identity().as_bytes()) {
            Ok(value) => value,
            Err(_) => return self.reject(ctx, AuthError::MissingIdentity),
        };

        let headers = request.headers_mut();
        headers.insert(X_CUSTOMER_ID, identity_value);
        match HeaderValue::from_bytes(claims.display_name().as_bytes()) {
            Ok(value) => {
                headers.insert(X_USERNAME, value);
            }
            Err(_) => {
                // A forged value must not survive when ours cannot be set.
                headers.remove(X_USERNAME);
                tracing::debug!(identity = %claims.identity(), "Display name is not a valid header value");
            }
        }

        tracing::info!(
            identity = %claims.identity(),
            display_name = %claims.display_name(),
            path = %ctx.path,
            "Authenticated request"
        );

        request.extensions_mut().insert(AuthenticatedIdentity {
            identity: claims.identity().to_string(),
            display_name: claims.display_name().to_string(),
        });

        StageOutcome::Continue(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::AuthConfig;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const SECRET: &str = "auth-stage-secret-long-enough";
    const NOW: u64 = 1_700_000_000;

    fn stage() -> AuthenticationStage {
        let config = AuthConfig {
            signing_key: SECRET.to_string(),
            ..AuthConfig::default()
        };
        let validator =
            CredentialValidator::with_clock(&config, Arc::new(ManualClock::at_unix(NOW)));
        AuthenticationStage::new(Arc::new(validator), PrefixSet::new(config.excluded_paths))
    }

    fn token(payload: serde_json::Value) -> String {
        encode(&Header::default(), &payload, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
    }

    fn request(path: &str, auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(path);
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn run(stage: &AuthenticationStage, req: Request<Body>) -> StageOutcome {
        let mut ctx = AdmissionContext::new(req.uri().path());
        stage.apply(req, &mut ctx).await
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));
    }

    #[tokio::test]
    async fn test_excluded_path_passes_without_header() {
        match run(&stage(), request("/api/auth/login", None)).await {
            StageOutcome::Continue(req) => {
                assert!(req.extensions().get::<AuthenticatedIdentity>().is_none());
            }
            StageOutcome::Terminate(_) => panic!("excluded path was rejected"),
        }
    }

    #[tokio::test]
    async fn test_public_path_strips_identity_headers() {
        let mut req = request("/api/auth/refresh", None);
        req.headers_mut()
            .insert(X_CUSTOMER_ID, HeaderValue::from_static("victim"));
        req.headers_mut()
            .insert(X_USERNAME, HeaderValue::from_static("admin"));

        match run(&stage(), req).await {
            StageOutcome::Continue(req) => {
                assert!(req.headers().get(X_CUSTOMER_ID).is_none());
                assert!(req.headers().get(X_USERNAME).is_none());
            }
            StageOutcome::Terminate(_) => panic!("public path was rejected"),
        }
    }

    #[tokio::test]
    async fn test_missing_header_rejected() {
        match run(&stage(), request("/api/orders", None)).await {
            StageOutcome::Terminate(resp) => assert_eq!(resp.status(), StatusCode::UNAUTHORIZED),
            StageOutcome::Continue(_) => panic!("request without credentials was admitted"),
        }
    }

    #[tokio::test]
    async fn test_valid_token_attaches_identity() {
        let bearer = format!(
            "Bearer {}",
            token(json!({"sub": "alice", "customerId": "c-7", "exp": NOW + 60}))
        );
        let mut req = request("/api/orders", Some(&bearer));
        req.headers_mut()
            .insert(X_CUSTOMER_ID, HeaderValue::from_static("spoofed"));

        match run(&stage(), req).await {
            StageOutcome::Continue(req) => {
                assert_eq!(req.headers()[X_CUSTOMER_ID], "c-7");
                assert_eq!(req.headers()[X_USERNAME], "alice");
                let identity = req.extensions().get::<AuthenticatedIdentity>().unwrap();
                assert_eq!(identity.identity, "c-7");
                assert_eq!(identity.display_name, "alice");
            }
            StageOutcome::Terminate(resp) => panic!("valid token rejected: {}", resp.status()),
        }
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let bearer = format!("Bearer {}", token(json!({"sub": "u1", "exp": NOW - 1})));
        match run(&stage(), request("/api/orders", Some(&bearer))).await {
            StageOutcome::Terminate(resp) => assert_eq!(resp.status(), StatusCode::UNAUTHORIZED),
            StageOutcome::Continue(_) => panic!("expired token admitted"),
        }
    }
}
