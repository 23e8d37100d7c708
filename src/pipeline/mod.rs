//! Admission pipeline.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → AuthenticationStage (priority -100)
//!         public path?  → continue untouched
//!         bad/missing credential → 401 JSON, stop
//!         ok → X-Customer-Id / X-Username + AuthenticatedIdentity extension
//!     → RateLimitStage (priority -90)
//!         excluded path? → continue untouched
//!         over quota → 429 JSON + quota headers, stop
//!         store down → continue, X-RateLimit-Error: true
//!     → Forward to upstream, quota headers added to its response
//! ```
//!
//! # Design Decisions
//! - Stage order comes from each stage's declared priority, not from
//!   registration order
//! - A stage either hands the request on or produces the final response;
//!   nothing runs after a terminating stage
//! - Identity travels in a typed request extension, so a later stage cannot
//!   be fooled by a header the caller sent

pub mod auth_stage;
pub mod headers;
pub mod middleware;
pub mod rate_limit_stage;
pub mod stage;

use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response};
use thiserror::Error;

use crate::auth::CredentialValidator;
use crate::config::GatewayConfig;
use crate::observability::metrics;
use crate::rate_limit::RateLimitEngine;
use crate::routing::{PrefixSet, Router};

pub use auth_stage::AuthenticationStage;
pub use middleware::{admission_middleware, with_admission};
pub use rate_limit_stage::RateLimitStage;
pub use stage::{AdmissionContext, AdmissionStage, AuthenticatedIdentity, StageKind, StageOutcome};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("stage '{0}' registered more than once")]
    DuplicateStage(StageKind),
}

/// Result of running every stage.
#[derive(Debug)]
pub enum Admission {
    /// All stages passed; forward this request.
    Forward {
        request: Request<Body>,
        context: AdmissionContext,
    },
    /// A stage refused the request with this response.
    Reject(Response),
}

/// Ordered, immutable list of stages.
pub struct AdmissionPipeline {
    stages: Vec<Arc<dyn AdmissionStage>>,
}

impl std::fmt::Debug for AdmissionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionPipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

impl AdmissionPipeline {
    pub fn builder() -> AdmissionPipelineBuilder {
        AdmissionPipelineBuilder::default()
    }

    /// The standard gateway pipeline: authentication, then rate limiting
    /// unless it is disabled.
    pub fn from_config(
        config: &GatewayConfig,
        validator: Arc<CredentialValidator>,
        engine: Arc<RateLimitEngine>,
        router: Arc<Router>,
    ) -> Result<Self, PipelineError> {
        let mut builder = Self::builder().stage(AuthenticationStage::new(
            validator,
            PrefixSet::new(config.auth.excluded_paths.iter().cloned()),
        ));

        if config.rate_limit.enabled {
            builder = builder.stage(RateLimitStage::new(
                engine,
                router,
                PrefixSet::new(config.rate_limit.excluded_paths.iter().cloned()),
            ));
        } else {
            tracing::warn!("Rate limiting disabled");
        }

        builder.build()
    }

    /// Stage names in run order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.kind().name()).collect()
    }

    pub async fn run(&self, mut request: Request<Body>) -> Admission {
        let mut context = AdmissionContext::new(request.uri().path());

        for stage in &self.stages {
            match stage.apply(request, &mut context).await {
                StageOutcome::Continue(next) => request = next,
                StageOutcome::Terminate(response) => {
                    tracing::debug!(
                        stage = %stage.kind(),
                        status = response.status().as_u16(),
                        path = %context.path,
                        "Request rejected"
                    );
                    return Admission::Reject(response);
                }
            }
        }

        metrics::record_admission("pipeline", "admitted");
        Admission::Forward { request, context }
    }
}

#[derive(Default)]
pub struct AdmissionPipelineBuilder {
    stages: Vec<Arc<dyn AdmissionStage>>,
}

impl AdmissionPipelineBuilder {
    pub fn stage(mut self, stage: impl AdmissionStage + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Sort stages by priority and reject duplicates.
    pub fn build(mut self) -> Result<AdmissionPipeline, PipelineError> {
        self.stages.sort_by_key(|s| s.kind().priority());

        if let Some(pair) = self.stages.windows(2).find(|w| w[0].kind() == w[1].kind()) {
            return Err(PipelineError::DuplicateStage(pair[0].kind()));
        }

        tracing::info!(
            stages = ?self.stages.iter().map(|s| s.kind().name()).collect::<Vec<_>>(),
            "Admission pipeline built"
        );

        Ok(AdmissionPipeline {
            stages: self.stages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use std::sync::Mutex;

    /// Records the order stages ran in.
    struct Probe {
        kind: StageKind,
        log: Arc<Mutex<Vec<StageKind>>>,
        terminate: bool,
    }

    #[async_trait]
    impl AdmissionStage for Probe {
        fn kind(&self) -> StageKind {
            self.kind
        }

        async fn apply(&self, request: Request<Body>, _ctx: &mut AdmissionContext) -> StageOutcome {
            self.log.lock().unwrap().push(self.kind);
            if self.terminate {
                let mut response = Response::new(Body::empty());
                *response.status_mut() = StatusCode::FORBIDDEN;
                StageOutcome::Terminate(response)
            } else {
                StageOutcome::Continue(request)
            }
        }
    }

    fn probe(kind: StageKind, log: &Arc<Mutex<Vec<StageKind>>>, terminate: bool) -> Probe {
        Probe {
            kind,
            log: log.clone(),
            terminate,
        }
    }

    fn request() -> Request<Body> {
        Request::builder().uri("/api/orders").body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_priority_decides_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = AdmissionPipeline::builder()
            .stage(probe(StageKind::RateLimit, &log, false))
            .stage(probe(StageKind::Authenticate, &log, false))
            .build()
            .unwrap();

        assert_eq!(pipeline.stage_names(), vec!["authenticate", "rate_limit"]);
        assert!(matches!(pipeline.run(request()).await, Admission::Forward { .. }));
        assert_eq!(
            *log.lock().unwrap(),
            vec![StageKind::Authenticate, StageKind::RateLimit]
        );
    }

    #[tokio::test]
    async fn test_terminate_stops_pipeline() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = AdmissionPipeline::builder()
            .stage(probe(StageKind::Authenticate, &log, true))
            .stage(probe(StageKind::RateLimit, &log, false))
            .build()
            .unwrap();

        match pipeline.run(request()).await {
            Admission::Reject(resp) => assert_eq!(resp.status(), StatusCode::FORBIDDEN),
            Admission::Forward { .. } => panic!("terminated request was forwarded"),
        }
        assert_eq!(*log.lock().unwrap(), vec![StageKind::Authenticate]);
    }

    #[test]
    fn test_duplicate_stage_rejected() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let err = AdmissionPipeline::builder()
            .stage(probe(StageKind::Authenticate, &log, false))
            .stage(probe(StageKind::Authenticate, &log, false))
            .build()
            .unwrap_err();

        assert_eq!(err, PipelineError::DuplicateStage(StageKind::Authenticate));
    }
}
