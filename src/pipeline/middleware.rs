//! Axum glue for the admission pipeline.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    Router,
};

use crate::pipeline::{Admission, AdmissionPipeline};

/// Run the pipeline; forward admitted requests and stamp quota headers on
/// whatever the upstream returns.
pub async fn admission_middleware(
    State(pipeline): State<Arc<AdmissionPipeline>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match pipeline.run(request).await {
        Admission::Reject(response) => response,
        Admission::Forward { request, context } => {
            let mut response = next.run(request).await;
            if let Some(decision) = &context.decision {
                decision.apply_headers(response.headers_mut());
            }
            response
        }
    }
}

/// Put `router` behind the admission pipeline.
pub fn with_admission(router: Router, pipeline: Arc<AdmissionPipeline>) -> Router {
    router.layer(middleware::from_fn_with_state(pipeline, admission_middleware))
}
