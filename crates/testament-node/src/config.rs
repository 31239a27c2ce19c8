//! # Node Configuration
//!
//! Unified configuration for the runtime, with sane defaults and
//! environment-variable overrides:
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TESTAMENT_HTTP_HOST` | `127.0.0.1` | Gateway bind host |
//! | `TESTAMENT_HTTP_PORT` | `8080` | Gateway bind port |
//! | `TESTAMENT_DEV_MODE` | `false` | Error detail in responses |
//! | `TESTAMENT_STORE` | `rocksdb` | Replica store: `rocksdb` or `memory` |
//! | `TESTAMENT_DATA_DIR` | `./data` | Data directory for the replica |
//! | `TESTAMENT_BACKFILL_HORIZON` | unbounded | Lookback window in blocks |
//! | `TESTAMENT_LOG` | `info` | Log level filter |

use std::path::PathBuf;
use testament_gateway::GatewayConfig;
use tracing::warn;

/// Which replica store backs the projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Durable RocksDB store.
    RocksDb,
    /// Process-memory store; replica rebuilds from backfill on restart.
    Memory,
}

/// Storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Replica store backend.
    pub backend: StoreBackend,
    /// Data directory for durable storage.
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::RocksDb,
            data_dir: PathBuf::from("./data"),
        }
    }
}

/// Projection configuration.
#[derive(Debug, Clone)]
pub struct ProjectionConfig {
    /// Live channel capacity before subscriber backpressure.
    pub channel_capacity: usize,
    /// Bounded lookback window of the event source, in blocks. `None`
    /// means the full log is accessible.
    pub backfill_horizon: Option<u64>,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
            backfill_horizon: None,
        }
    }
}

/// Complete node configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// Query facade configuration.
    pub gateway: GatewayConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Projection configuration.
    pub projection: ProjectionConfig,
}

/// Load configuration from defaults plus environment overrides.
#[must_use]
pub fn load_config() -> NodeConfig {
    let mut config = NodeConfig::default();

    if let Ok(host) = std::env::var("TESTAMENT_HTTP_HOST") {
        config.gateway.host = host;
    }
    if let Ok(port) = std::env::var("TESTAMENT_HTTP_PORT") {
        match port.parse() {
            Ok(p) => config.gateway.port = p,
            Err(_) => {
                warn!(port = %port, "TESTAMENT_HTTP_PORT is not a valid port, keeping default");
            }
        }
    }
    if let Ok(dev) = std::env::var("TESTAMENT_DEV_MODE") {
        config.gateway.dev_mode = dev == "1" || dev.eq_ignore_ascii_case("true");
    }
    if let Ok(store) = std::env::var("TESTAMENT_STORE") {
        match store.to_ascii_lowercase().as_str() {
            "rocksdb" => config.storage.backend = StoreBackend::RocksDb,
            "memory" => config.storage.backend = StoreBackend::Memory,
            other => warn!(store = other, "Unknown TESTAMENT_STORE, keeping default"),
        }
    }
    if let Ok(dir) = std::env::var("TESTAMENT_DATA_DIR") {
        config.storage.data_dir = PathBuf::from(dir);
    }
    if let Ok(horizon) = std::env::var("TESTAMENT_BACKFILL_HORIZON") {
        match horizon.parse() {
            Ok(h) => config.projection.backfill_horizon = Some(h),
            Err(_) => {
                warn!(
                    horizon = %horizon,
                    "TESTAMENT_BACKFILL_HORIZON is not a number, keeping unbounded"
                );
            }
        }
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NodeConfig::default();
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.storage.backend, StoreBackend::RocksDb);
        assert_eq!(config.projection.channel_capacity, 1024);
        assert!(config.projection.backfill_horizon.is_none());
    }
}
