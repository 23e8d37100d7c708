//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace span, timeout)
//!     → admission pipeline (authenticate, rate limit)
//!     → forward.rs (route lookup, stream to upstream)
//!     → Send to client
//!
//! Any refusal along the way
//!     → error_response.rs (uniform JSON body)
//! ```

pub mod error_response;
pub mod forward;
pub mod request_id;
pub mod server;

pub use error_response::{respond, ErrorBody};
pub use request_id::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
