//! # Testament Node Runtime
//!
//! Wires the workspace into one process:
//!
//! - `config` — unified configuration with environment overrides
//! - `runtime` — builds the event log/bus, the lifecycle service, the
//!   projection engine, and the query gateway, and manages shutdown
//!
//! State changes flow one direction: callers drive the
//! [`testament_lifecycle::WillService`] (reachable via
//! [`runtime::TestamentRuntime::service`]), events land on the shared log
//! and bus, the projection engine applies them to the replica, and the
//! gateway serves reads from it.

pub mod config;
pub mod runtime;

pub use config::{load_config, NodeConfig, ProjectionConfig, StorageConfig, StoreBackend};
pub use runtime::TestamentRuntime;
