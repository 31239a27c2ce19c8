//! # End-to-End Lifecycle Scenarios
//!
//! The full flow: operations on the lifecycle service emit ordered events,
//! the projection engine rebuilds a replica from them, and the replica
//! answers the queries the gateway serves.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use testament_events::{EventLog, InMemoryEventBus};
    use testament_lifecycle::{
        LedgerSettlement, ManualClock, WillError, WillService,
    };
    use testament_projection::{
        LogEventSource, MemoryReplicaStore, ProjectionEngine, ReplicaReader,
    };
    use testament_types::Address;

    const MONTH: u64 = 2_592_000;
    const WEEK: u64 = 604_800;

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; 20])
    }

    struct World {
        service: WillService,
        clock: Arc<ManualClock>,
        settlement: Arc<LedgerSettlement>,
        engine: ProjectionEngine,
        store: Arc<MemoryReplicaStore>,
    }

    fn world() -> World {
        let clock = Arc::new(ManualClock::starting_at(1_700_000_000));
        let settlement = Arc::new(LedgerSettlement::new());
        let log = Arc::new(EventLog::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let service = WillService::new(
            clock.clone(),
            settlement.clone(),
            log.clone(),
            bus.clone(),
        );
        let store = Arc::new(MemoryReplicaStore::new());
        let engine = ProjectionEngine::new(
            Arc::new(LogEventSource::new(log, bus)),
            store.clone(),
        );
        World {
            service,
            clock,
            settlement,
            engine,
            store,
        }
    }

    /// The reference scenario: month-long check-in period, week-long dispute
    /// window, 60/40 split over 15 units, payouts 9 and 6.
    #[tokio::test]
    async fn test_full_lifecycle_with_projection() {
        let w = world();
        let (testator, b, g) = (addr(1), addr(2), addr(3));

        w.service.create_will(testator, MONTH, WEEK).await.unwrap();
        w.service
            .add_beneficiary(testator, b, 60, false)
            .await
            .unwrap();
        w.service
            .add_beneficiary(testator, g, 40, true)
            .await
            .unwrap();
        w.service.deposit_locked(testator, 10).await.unwrap();
        w.service.deposit_flexible(testator, 5).await.unwrap();

        // Past deadline + dispute window: any listed beneficiary may call.
        w.clock.advance(MONTH + WEEK + 1);
        let receipt = w.service.execute_will(b, testator).await.unwrap();
        assert_eq!(receipt.total_distributed, 15);
        assert_eq!(w.settlement.credited(&b), 9);
        assert_eq!(w.settlement.credited(&g), 6);

        // Replica catches up and agrees with the authoritative outcome.
        w.engine.catch_up().await.unwrap();
        let will = w.store.will(&testator).unwrap().unwrap();
        assert!(will.executed);
        let vaults = w.store.vaults_of(&testator).unwrap().unwrap();
        assert_eq!(vaults.locked, 0);
        assert_eq!(vaults.flexible, 0);

        let shares = w.store.wills_with_beneficiary(&b).unwrap();
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].share, 60);

        let stats = w.store.stats().unwrap();
        assert_eq!(stats.total_wills, 1);
        assert_eq!(stats.executed_wills, 1);
        assert_eq!(stats.locked_total, 0);
    }

    /// Guardian execution during the dispute window is recorded as a
    /// dispute in the replica; a non-guardian stays locked out.
    #[tokio::test]
    async fn test_guardian_dispute_execution_reaches_replica() {
        let w = world();
        let (testator, b, g) = (addr(1), addr(2), addr(3));

        w.service.create_will(testator, MONTH, WEEK).await.unwrap();
        w.service
            .add_beneficiary(testator, b, 60, false)
            .await
            .unwrap();
        w.service
            .add_beneficiary(testator, g, 40, true)
            .await
            .unwrap();
        w.service.deposit_locked(testator, 100).await.unwrap();

        w.clock.advance(MONTH + 1);
        assert_eq!(
            w.service.execute_will(b, testator).await,
            Err(WillError::Unauthorized(b))
        );
        w.service.execute_will(g, testator).await.unwrap();

        w.engine.catch_up().await.unwrap();
        let will = w.store.will(&testator).unwrap().unwrap();
        assert!(will.executed);
        assert!(will.dispute_started_at.is_some());
    }

    /// Check-ins keep pushing the deadline; the will stays locked.
    #[tokio::test]
    async fn test_check_in_defers_execution() {
        let w = world();
        let (testator, b) = (addr(1), addr(2));

        w.service.create_will(testator, MONTH, WEEK).await.unwrap();
        w.service
            .add_beneficiary(testator, b, 100, false)
            .await
            .unwrap();
        w.service.deposit_flexible(testator, 50).await.unwrap();

        for _ in 0..3 {
            w.clock.advance(MONTH - 100);
            w.service.check_in(testator).await.unwrap();
        }

        w.clock.advance(MONTH);
        // One month after the last check-in is exactly the deadline.
        assert_eq!(
            w.service.execute_will(b, testator).await,
            Err(WillError::PhaseNotElapsed)
        );

        w.engine.catch_up().await.unwrap();
        let will = w.store.will(&testator).unwrap().unwrap();
        assert!(!will.executed);
    }

    /// Flexible withdrawals release value to the testator and the replica
    /// tracks the absolute balance.
    #[tokio::test]
    async fn test_withdrawals_tracked_in_replica() {
        let w = world();
        let testator = addr(1);

        w.service.create_will(testator, MONTH, WEEK).await.unwrap();
        w.service.deposit_flexible(testator, 20).await.unwrap();
        w.service.withdraw_flexible(testator, 8).await.unwrap();
        assert_eq!(
            w.service.withdraw_flexible(testator, 100).await,
            Err(WillError::InsufficientBalance {
                requested: 100,
                available: 12
            })
        );

        w.engine.catch_up().await.unwrap();
        let vaults = w.store.vaults_of(&testator).unwrap().unwrap();
        assert_eq!(vaults.flexible, 12);
        assert_eq!(w.settlement.credited(&testator), 8);
    }

    /// Documents attach, project, and detach.
    #[tokio::test]
    async fn test_document_flow_reaches_replica() {
        let w = world();
        let testator = addr(1);
        let hash = testament_types::ContentHash::from_bytes([0xcdu8; 32]);

        w.service.create_will(testator, MONTH, WEEK).await.unwrap();
        w.service
            .add_document(testator, hash, "deed".into(), "legal".into())
            .await
            .unwrap();

        w.engine.catch_up().await.unwrap();
        let docs = w.store.documents_of(&testator).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].name, "deed");
        assert!(w.store.document(&testator, &hash).unwrap().is_some());

        w.service.remove_document(testator, hash).await.unwrap();
        w.engine.catch_up().await.unwrap();
        assert!(w.store.document(&testator, &hash).unwrap().is_none());
    }

    /// Multiple wills stay isolated: shares, vaults, and stats aggregate
    /// correctly across them.
    #[tokio::test]
    async fn test_multiple_wills_are_isolated() {
        let w = world();
        let (alice, bob, carol) = (addr(1), addr(2), addr(3));

        w.service.create_will(alice, MONTH, WEEK).await.unwrap();
        w.service.create_will(bob, MONTH, WEEK).await.unwrap();
        w.service
            .add_beneficiary(alice, carol, 50, false)
            .await
            .unwrap();
        w.service
            .add_beneficiary(bob, carol, 25, true)
            .await
            .unwrap();
        w.service.deposit_locked(alice, 100).await.unwrap();
        w.service.deposit_flexible(bob, 40).await.unwrap();

        w.engine.catch_up().await.unwrap();

        let carols = w.store.wills_with_beneficiary(&carol).unwrap();
        assert_eq!(carols.len(), 2);

        let stats = w.store.stats().unwrap();
        assert_eq!(stats.total_wills, 2);
        assert_eq!(stats.active_wills, 2);
        assert_eq!(stats.locked_total, 100);
        assert_eq!(stats.flexible_total, 40);
        assert_eq!(stats.beneficiary_entries, 2);
    }
}
