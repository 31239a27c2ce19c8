//! # Gateway Server
//!
//! Binds the facade router and serves it until the shutdown signal flips.

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::routes::{router, AppState};
use std::sync::Arc;
use testament_projection::ReplicaReader;
use tokio::sync::watch;
use tracing::info;

/// The query facade server.
pub struct GatewayServer {
    config: GatewayConfig,
    reader: Arc<dyn ReplicaReader>,
}

impl GatewayServer {
    /// Create a server over a validated configuration.
    pub fn new(
        config: GatewayConfig,
        reader: Arc<dyn ReplicaReader>,
    ) -> Result<Self, GatewayError> {
        config.validate()?;
        Ok(Self { config, reader })
    }

    /// Bind and serve until `shutdown` flips.
    pub async fn serve(self, mut shutdown: watch::Receiver<bool>) -> Result<(), GatewayError> {
        let addr = self.config.bind_addr()?;
        let state = AppState {
            reader: self.reader,
            dev_mode: self.config.dev_mode,
        };
        let app = router(state);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(e.to_string()))?;
        info!(addr = %addr, "Gateway listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.changed().await;
                info!("Gateway shutting down");
            })
            .await
            .map_err(|e| GatewayError::Internal(e.to_string()))
    }
}
