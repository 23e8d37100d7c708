//! Credential validation subsystem.
//!
//! # Data Flow
//! ```text
//! Authorization: Bearer <jwt>
//!     → validator.rs (verify HMAC signature, check exp against Clock)
//!     → claims.rs (resolve identity: identity claim, else `sub`)
//!     → Claims, or AuthError
//! ```
//!
//! # Design Decisions
//! - All verification failures report a single kind (BadSignature)
//! - Expiry uses the injected clock, at-or-after `exp` is expired
//! - No I/O; safe to call concurrently without locks

pub mod claims;
pub mod error;
pub mod validator;

pub use claims::Claims;
pub use error::AuthError;
pub use validator::CredentialValidator;
