//! Stage contract for the admission pipeline.

use std::fmt;

use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response};

use crate::rate_limit::AdmissionDecision;

/// The stages the gateway knows how to run, with their declared order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Authenticate,
    RateLimit,
}

impl StageKind {
    /// Run order; smaller runs first.
    ///
    /// Rate limiting keys its counters on the identity that authentication
    /// attaches, so `Authenticate` must sort before `RateLimit`.
    pub const fn priority(self) -> i32 {
        match self {
            StageKind::Authenticate => -100,
            StageKind::RateLimit => -90,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            StageKind::Authenticate => "authenticate",
            StageKind::RateLimit => "rate_limit",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity attached to a request by the authentication stage.
///
/// Lives in the request extensions, where later stages and the upstream
/// handler read it. Never derived from caller-supplied headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    pub identity: String,
    pub display_name: String,
}

/// Per-request state carried between stages.
#[derive(Debug, Clone, Default)]
pub struct AdmissionContext {
    /// Request path as received.
    pub path: String,
    /// Quota decision, once the rate-limit stage has run.
    pub decision: Option<AdmissionDecision>,
}

impl AdmissionContext {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            decision: None,
        }
    }
}

/// What a stage decided about a request.
#[derive(Debug)]
pub enum StageOutcome {
    /// Hand the (possibly augmented) request to the next stage.
    Continue(Request<Body>),
    /// Stop here and send this response.
    Terminate(Response),
}

/// One step of the admission pipeline.
#[async_trait]
pub trait AdmissionStage: Send + Sync {
    fn kind(&self) -> StageKind;

    async fn apply(&self, request: Request<Body>, ctx: &mut AdmissionContext) -> StageOutcome;
}
