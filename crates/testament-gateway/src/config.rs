//! # Gateway Configuration

use crate::error::GatewayError;
use std::net::SocketAddr;

/// Configuration for the query facade.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Development mode: error responses carry failure detail.
    pub dev_mode: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            dev_mode: false,
        }
    }
}

impl GatewayConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.host.is_empty() {
            return Err(GatewayError::Config("host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(GatewayError::Config("port must not be zero".to_string()));
        }
        Ok(())
    }

    /// The socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr, GatewayError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| GatewayError::Config(format!("invalid bind address: {e}")))
    }
}
