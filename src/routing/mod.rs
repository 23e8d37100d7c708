//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Request path
//!     → router.rs (route lookup, route class)
//!     → matcher.rs (prefix evaluation)
//!     → Return: matched Route or NoMatch ("default" class)
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → Sort by priority, then prefix length
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - The same table drives forwarding and quota bucketing, so a route's
//!   name is its route class
//! - First match wins

pub mod matcher;
pub mod router;

pub use matcher::{PathPrefixMatcher, PrefixSet};
pub use router::{Route, RouteSummary, Router, DEFAULT_ROUTE_CLASS};
