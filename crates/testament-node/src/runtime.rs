//! # Runtime
//!
//! Wires the pieces together in dependency order: event log + bus, the
//! lifecycle service over them, the projection engine consuming them, and
//! the gateway reading the replica. One watch channel broadcasts shutdown
//! to every spawned task.

use crate::config::{NodeConfig, StoreBackend};
use anyhow::{Context, Result};
use std::sync::Arc;
use testament_events::{EventLog, InMemoryEventBus};
use testament_gateway::GatewayServer;
use testament_lifecycle::{LedgerSettlement, SystemClock, WillService};
use testament_projection::{
    LogEventSource, MemoryReplicaStore, ProjectionEngine, ReplicaReader, ReplicaStore,
    RocksDbReplicaStore,
};
use tokio::task::JoinHandle;
use tracing::{error, info};

/// The running node: lifecycle service, projection engine, gateway.
pub struct TestamentRuntime {
    service: Arc<WillService>,
    engine: Option<ProjectionEngine>,
    gateway: Option<GatewayServer>,
    shutdown_tx: tokio::sync::watch::Sender<bool>,
    shutdown_rx: tokio::sync::watch::Receiver<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl TestamentRuntime {
    /// Build the full wiring from configuration.
    pub fn new(config: NodeConfig) -> Result<Self> {
        let log = Arc::new(match config.projection.backfill_horizon {
            Some(horizon) => EventLog::with_horizon(horizon),
            None => EventLog::new(),
        });
        let bus = Arc::new(InMemoryEventBus::with_capacity(
            config.projection.channel_capacity,
        ));

        let service = Arc::new(WillService::new(
            Arc::new(SystemClock),
            Arc::new(LedgerSettlement::new()),
            Arc::clone(&log),
            bus.clone(),
        ));

        let (store, reader): (Arc<dyn ReplicaStore>, Arc<dyn ReplicaReader>) =
            match config.storage.backend {
                StoreBackend::RocksDb => {
                    let path = config.storage.data_dir.join("replica");
                    let store = Arc::new(
                        RocksDbReplicaStore::open_at(&path)
                            .with_context(|| format!("opening replica store at {path:?}"))?,
                    );
                    info!(path = ?path, "Replica store: RocksDB");
                    (store.clone(), store)
                }
                StoreBackend::Memory => {
                    let store = Arc::new(MemoryReplicaStore::new());
                    info!("Replica store: in-memory");
                    (store.clone(), store)
                }
            };

        let source = Arc::new(LogEventSource::new(log, bus));
        let engine = ProjectionEngine::new(source, store);
        let gateway =
            GatewayServer::new(config.gateway, reader).context("configuring gateway")?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

        Ok(Self {
            service,
            engine: Some(engine),
            gateway: Some(gateway),
            shutdown_tx,
            shutdown_rx,
            handles: Vec::new(),
        })
    }

    /// The lifecycle service's state-changing surface.
    pub fn service(&self) -> Arc<WillService> {
        Arc::clone(&self.service)
    }

    /// Spawn the projection engine and the gateway.
    pub fn start(&mut self) -> Result<()> {
        info!("===========================================");
        info!("  Testament Node v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        let engine = self
            .engine
            .take()
            .context("runtime already started: engine missing")?;
        let engine_shutdown = self.shutdown_rx.clone();
        self.handles.push(tokio::spawn(async move {
            if let Err(e) = engine.run(engine_shutdown).await {
                error!(error = %e, "Projection engine failed");
            }
        }));

        let gateway = self
            .gateway
            .take()
            .context("runtime already started: gateway missing")?;
        let gateway_shutdown = self.shutdown_rx.clone();
        self.handles.push(tokio::spawn(async move {
            if let Err(e) = gateway.serve(gateway_shutdown).await {
                error!(error = %e, "Gateway failed");
            }
        }));

        info!("Projection engine and gateway running");
        Ok(())
    }

    /// Signal shutdown and wait for the spawned tasks to finish.
    pub async fn shutdown(&mut self) {
        info!("Initiating graceful shutdown...");
        if let Err(e) = self.shutdown_tx.send(true) {
            error!(error = %e, "Failed to send shutdown signal");
        }
        for handle in self.handles.drain(..) {
            let _ = handle.await;
        }
        info!("Shutdown complete");
    }
}
