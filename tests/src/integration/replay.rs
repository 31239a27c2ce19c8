//! # Replay and Ordering Scenarios
//!
//! The projection's core guarantees: replaying the same ordered record
//! sequence twice yields byte-identical replica content, live and backfill
//! paths converge on the same replica, and a restarted engine resumes from
//! its durable checkpoint instead of reprocessing history.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use testament_events::{
        EventLog, EventPublisher, EventRecord, InMemoryEventBus, WillEvent,
    };
    use testament_lifecycle::{LedgerSettlement, ManualClock, WillService};
    use testament_projection::{
        apply_event, LogEventSource, MemoryReplicaStore, ProjectionEngine, Replica,
        ReplicaReader, ReplicaStore, RocksDbConfig, RocksDbReplicaStore,
    };
    use testament_types::{Address, EventKey};

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; 20])
    }

    /// Drive a realistic event sequence out of the actual state machine.
    async fn recorded_sequence() -> Vec<EventRecord> {
        let clock = Arc::new(ManualClock::starting_at(1_000_000));
        let log = Arc::new(EventLog::new());
        let service = WillService::new(
            clock.clone(),
            Arc::new(LedgerSettlement::new()),
            log.clone(),
            Arc::new(InMemoryEventBus::new()),
        );

        let (testator, b, g) = (addr(1), addr(2), addr(3));
        service.create_will(testator, 1_000, 500).await.unwrap();
        service.add_beneficiary(testator, b, 40, false).await.unwrap();
        service.update_beneficiary(testator, b, 60, false).await.unwrap();
        service.add_beneficiary(testator, g, 40, true).await.unwrap();
        service.deposit_locked(testator, 10).await.unwrap();
        service.deposit_flexible(testator, 9).await.unwrap();
        service.withdraw_flexible(testator, 4).await.unwrap();
        clock.advance(1_001);
        service.execute_will(g, testator).await.unwrap();

        log.range_after(None)
    }

    #[tokio::test]
    async fn test_double_replay_is_byte_identical() {
        let sequence = recorded_sequence().await;

        let mut once = Replica::default();
        for record in &sequence {
            apply_event(&mut once, record);
        }

        let mut twice = Replica::default();
        for record in sequence.iter().chain(sequence.iter()) {
            apply_event(&mut twice, record);
        }

        assert_eq!(
            bincode::serialize(&once).unwrap(),
            bincode::serialize(&twice).unwrap()
        );

        // And the final state reflects the whole story.
        let will = &once.wills[&addr(1)];
        assert!(will.executed);
        assert_eq!(once.beneficiaries[&(addr(1), addr(2))].share, 60);
        assert_eq!(once.vaults[&addr(1)].locked, 0);
    }

    #[tokio::test]
    async fn test_live_and_backfill_paths_converge() {
        let sequence = recorded_sequence().await;

        // Backfill path: records come from the log range.
        let backfill_log = Arc::new(EventLog::new());
        {
            // Re-stage the records into a fresh log via their events.
            let events: Vec<WillEvent> =
                sequence.iter().map(|r| r.event.clone()).collect();
            for event in events {
                backfill_log.append_block(vec![event]);
            }
        }
        let backfill_store = Arc::new(MemoryReplicaStore::new());
        let backfill_engine = ProjectionEngine::new(
            Arc::new(LogEventSource::new(
                backfill_log,
                Arc::new(InMemoryEventBus::new()),
            )),
            backfill_store.clone(),
        );
        backfill_engine.catch_up().await.unwrap();

        // Live path: the same records arrive over the bus only.
        let live_log = Arc::new(EventLog::new());
        let live_bus = Arc::new(InMemoryEventBus::new());
        let live_store = Arc::new(MemoryReplicaStore::new());
        let live_engine = ProjectionEngine::new(
            Arc::new(LogEventSource::new(live_log.clone(), live_bus.clone())),
            live_store.clone(),
        );

        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
        let handle = tokio::spawn(live_engine.run(shutdown_rx));
        tokio::time::sleep(Duration::from_millis(50)).await;

        for record in sequence.iter() {
            // Stamp the live log too so keys line up with the records.
            let restamped = live_log.append_block(vec![record.event.clone()]);
            for r in restamped {
                live_bus.publish(r).await;
            }
        }

        // Wait for the live replica to reach the executed state.
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        loop {
            if let Some(will) = live_store.will(&addr(1)).unwrap() {
                if will.executed {
                    break;
                }
            }
            assert!(
                std::time::Instant::now() < deadline,
                "live replica never converged"
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap().unwrap();

        assert_eq!(
            bincode::serialize(&backfill_store.snapshot()).unwrap(),
            bincode::serialize(&live_store.snapshot()).unwrap()
        );
    }

    #[tokio::test]
    async fn test_restart_resumes_from_durable_checkpoint() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().to_string_lossy().to_string();

        let log = Arc::new(EventLog::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let clock = Arc::new(ManualClock::starting_at(1_000_000));
        let service = WillService::new(
            clock.clone(),
            Arc::new(LedgerSettlement::new()),
            log.clone(),
            bus.clone(),
        );

        service.create_will(addr(1), 1_000, 500).await.unwrap();
        service.deposit_locked(addr(1), 10).await.unwrap();

        // First engine life: applies two records, checkpoints durably.
        {
            let store = Arc::new(
                RocksDbReplicaStore::open(RocksDbConfig::for_testing(path.clone())).unwrap(),
            );
            let engine = ProjectionEngine::new(
                Arc::new(LogEventSource::new(log.clone(), bus.clone())),
                store.clone(),
            );
            assert_eq!(engine.catch_up().await.unwrap(), 2);
            let (_, checkpoint) = store.load().unwrap();
            assert_eq!(checkpoint, log.head());
        }

        // More history lands while the engine is down.
        service.deposit_flexible(addr(1), 7).await.unwrap();

        // Second life: only the new record is processed.
        let store = Arc::new(
            RocksDbReplicaStore::open(RocksDbConfig::for_testing(path)).unwrap(),
        );
        let engine = ProjectionEngine::new(
            Arc::new(LogEventSource::new(log.clone(), bus)),
            store.clone(),
        );
        assert_eq!(engine.catch_up().await.unwrap(), 1);

        let vaults = store.vaults_of(&addr(1)).unwrap().unwrap();
        assert_eq!(vaults.locked, 10);
        assert_eq!(vaults.flexible, 7);
    }

    #[tokio::test]
    async fn test_bounded_horizon_limits_backfill() {
        let log = Arc::new(EventLog::with_horizon(1));
        let bus = Arc::new(InMemoryEventBus::new());

        log.append_block(vec![WillEvent::WillCreated {
            testator: addr(1),
            check_in_period: 100,
            dispute_period: 50,
            created_at: 1,
        }]);
        log.append_block(vec![WillEvent::WillCreated {
            testator: addr(2),
            check_in_period: 100,
            dispute_period: 50,
            created_at: 2,
        }]);
        log.append_block(vec![WillEvent::WillCreated {
            testator: addr(3),
            check_in_period: 100,
            dispute_period: 50,
            created_at: 3,
        }]);

        let store = Arc::new(MemoryReplicaStore::new());
        let engine = ProjectionEngine::new(
            Arc::new(LogEventSource::new(log, bus)),
            store.clone(),
        );
        engine.catch_up().await.unwrap();

        // Only the records within the lookback window are accessible.
        assert!(store.will(&addr(1)).unwrap().is_none());
        assert!(store.will(&addr(2)).unwrap().is_some());
        assert!(store.will(&addr(3)).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_keys_never_double_apply() {
        let store = Arc::new(MemoryReplicaStore::new());
        let log = Arc::new(EventLog::new());
        let bus = Arc::new(InMemoryEventBus::new());

        let records = log.append_block(vec![WillEvent::WillCreated {
            testator: addr(1),
            check_in_period: 100,
            dispute_period: 50,
            created_at: 1,
        }]);
        let engine = ProjectionEngine::new(
            Arc::new(LogEventSource::new(log.clone(), bus.clone())),
            store.clone(),
        );

        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
        let handle = tokio::spawn(engine.run(shutdown_rx));
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Redeliver the already-backfilled record three times.
        for _ in 0..3 {
            for record in records.iter().cloned() {
                bus.publish(record).await;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap().unwrap();

        let (replica, checkpoint) = store.load().unwrap();
        assert_eq!(replica.wills.len(), 1);
        assert_eq!(checkpoint, Some(EventKey::new(1, 0)));
    }
}
