//! Rate-limit stage.
//!
//! Counts the request against the caller's bucket for its route class.
//! The caller is whoever the authentication stage attached; requests that
//! reach here unauthenticated share the `anonymous` bucket.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};

use crate::http::error_response::respond;
use crate::observability::metrics;
use crate::pipeline::stage::{
    AdmissionContext, AdmissionStage, AuthenticatedIdentity, StageKind, StageOutcome,
};
use crate::rate_limit::{AdmissionDecision, RateLimitEngine, ANONYMOUS};
use crate::routing::{PrefixSet, Router};

pub struct RateLimitStage {
    engine: Arc<RateLimitEngine>,
    router: Arc<Router>,
    excluded: PrefixSet,
}

impl RateLimitStage {
    pub fn new(engine: Arc<RateLimitEngine>, router: Arc<Router>, excluded: PrefixSet) -> Self {
        Self {
            engine,
            router,
            excluded,
        }
    }
}

/// Message for a 429, e.g. "Maximum 10 requests per minute allowed."
pub(crate) fn quota_exceeded_message(decision: &AdmissionDecision) -> String {
    let window = match decision.reset_secs {
        60 => "minute".to_string(),
        1 => "second".to_string(),
        n => format!("{n} seconds"),
    };
    format!(
        "Rate limit exceeded. Maximum {} requests per {} allowed.",
        decision.limit, window
    )
}

#[async_trait]
impl AdmissionStage for RateLimitStage {
    fn kind(&self) -> StageKind {
        StageKind::RateLimit
    }

    async fn apply(&self, request: Request<Body>, ctx: &mut AdmissionContext) -> StageOutcome {
        if self.excluded.contains(&ctx.path) {
            tracing::debug!(path = %ctx.path, "Skipping rate limit for excluded path");
            return StageOutcome::Continue(request);
        }

        let identity = match request.extensions().get::<AuthenticatedIdentity>() {
            Some(authenticated) => authenticated.identity.clone(),
            None => {
                tracing::warn!(path = %ctx.path, "No authenticated identity, counting as anonymous");
                ANONYMOUS.to_string()
            }
        };
        let route_class = self.router.route_class(&ctx.path);

        let decision = self.engine.check(&identity, route_class).await;

        if decision.allowed {
            ctx.decision = Some(decision);
            return StageOutcome::Continue(request);
        }

        metrics::record_admission(StageKind::RateLimit.name(), "quota_exceeded");
        let mut response = respond(
            &ctx.path,
            StatusCode::TOO_MANY_REQUESTS,
            quota_exceeded_message(&decision),
        );
        decision.apply_headers(response.headers_mut());
        StageOutcome::Terminate(response)
    }
}
