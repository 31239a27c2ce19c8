//! # Testament Gateway
//!
//! Read-only HTTP facade over the projection replica. Every address-shaped
//! path parameter is validated against the fixed identity format before any
//! lookup; malformed input is a client error (`400`), unknown resources are
//! `404`, and unexpected failures are a generic `500` whose detail is
//! suppressed outside development mode.
//!
//! The gateway is stateless and never mutates the projection; state changes
//! go through the will lifecycle service, not through HTTP.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod types;

pub use config::GatewayConfig;
pub use error::{ApiError, GatewayError};
pub use routes::{router, AppState};
pub use server::GatewayServer;
