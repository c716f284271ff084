#[cfg(test)]
mod tests {
    use crate::errors::{Error, LedgerError, Result};
    use crate::portfolio::holdings::{
        HoldingsService, HoldingsServiceTrait, LedgerSnapshot, NewAcquisition, Position,
        PositionRepositoryTrait, PositionSet, PositionUpdate,
    };
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    // --- Mock PositionRepository ---
    #[derive(Default)]
    struct MockPositionRepository {
        accounts: Mutex<HashMap<String, (i64, Vec<Position>)>>,
        forced_conflicts: AtomicUsize,
        saves: AtomicUsize,
    }

    impl MockPositionRepository {
        fn with_accounts(ids: &[&str]) -> Self {
            let repo = Self::default();
            {
                let mut accounts = repo.accounts.lock().unwrap();
                for id in ids {
                    accounts.insert(id.to_string(), (0, Vec::new()));
                }
            }
            repo
        }

        fn force_conflicts(&self, count: usize) {
            self.forced_conflicts.store(count, Ordering::SeqCst);
        }

        fn version(&self, account_id: &str) -> i64 {
            self.accounts.lock().unwrap()[account_id].0
        }

        fn saves(&self) -> usize {
            self.saves.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PositionRepositoryTrait for MockPositionRepository {
        fn load_positions(&self, account_id: &str) -> Result<LedgerSnapshot> {
            let accounts = self.accounts.lock().unwrap();
            let (version, positions) = accounts
                .get(account_id)
                .ok_or_else(|| Error::NotFound(format!("Account {}", account_id)))?;
            Ok(LedgerSnapshot::new(
                *version,
                PositionSet::from_positions(account_id, positions.clone()),
            ))
        }

        async fn save_positions(&self, snapshot: LedgerSnapshot) -> Result<i64> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            let mut accounts = self.accounts.lock().unwrap();
            let entry = accounts
                .get_mut(snapshot.account_id())
                .ok_or_else(|| Error::NotFound(snapshot.account_id().to_string()))?;

            let pending = self.forced_conflicts.load(Ordering::SeqCst);
            if pending > 0 {
                self.forced_conflicts.store(pending - 1, Ordering::SeqCst);
                entry.0 += 1;
                return Err(Error::ConcurrentModification("forced".to_string()));
            }
            if entry.0 != snapshot.version {
                return Err(Error::ConcurrentModification(format!(
                    "expected {}, found {}",
                    snapshot.version, entry.0
                )));
            }
            entry.0 += 1;
            entry.1 = snapshot.positions.into_positions();
            Ok(entry.0)
        }

        fn find_position_owner(&self, position_id: &str) -> Result<Option<String>> {
            let accounts = self.accounts.lock().unwrap();
            Ok(accounts
                .iter()
                .find(|(_, (_, positions))| positions.iter().any(|p| p.id == position_id))
                .map(|(id, _)| id.clone()))
        }
    }

    fn setup() -> (Arc<MockPositionRepository>, HoldingsService) {
        let repo = Arc::new(MockPositionRepository::with_accounts(&["acc-1", "acc-2"]));
        let service = HoldingsService::new(repo.clone());
        (repo, service)
    }

    fn acquisition(account_id: &str, symbol: &str, quantity: Decimal, price: Decimal) -> NewAcquisition {
        NewAcquisition {
            account_id: account_id.to_string(),
            symbol: symbol.to_string(),
            display_name: format!("{} Corp", symbol),
            quantity,
            price,
        }
    }

    #[tokio::test]
    async fn test_acquire_persists_weighted_average() {
        let (repo, service) = setup();

        service
            .acquire(acquisition("acc-1", "AAPL", dec!(10), dec!(100)))
            .await
            .unwrap();
        let position = service
            .acquire(acquisition("acc-1", "AAPL", dec!(10), dec!(200)))
            .await
            .unwrap();

        assert_eq!(position.quantity, dec!(20));
        assert_eq!(position.average_cost, dec!(150));
        let stored = service.get_positions("acc-1").unwrap();
        assert_eq!(stored, vec![position]);
        assert_eq!(repo.version("acc-1"), 2);
    }

    #[tokio::test]
    async fn test_acquire_unknown_account() {
        let (_repo, service) = setup();

        let err = service
            .acquire(acquisition("nobody", "AAPL", dec!(1), dec!(1)))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_invalid_acquisition_leaves_store_untouched() {
        let (repo, service) = setup();
        service
            .acquire(acquisition("acc-1", "AAPL", dec!(10), dec!(100)))
            .await
            .unwrap();
        let before = service.get_positions("acc-1").unwrap();

        let zero_qty = service
            .acquire(acquisition("acc-1", "AAPL", dec!(0), dec!(100)))
            .await
            .unwrap_err();
        let negative_price = service
            .acquire(acquisition("acc-1", "AAPL", dec!(1), dec!(-5)))
            .await
            .unwrap_err();

        assert!(zero_qty.is_invalid_input());
        assert!(negative_price.is_invalid_input());
        assert_eq!(service.get_positions("acc-1").unwrap(), before);
        assert_eq!(repo.version("acc-1"), 1);
    }

    #[tokio::test]
    async fn test_acquire_requires_display_name() {
        let (_repo, service) = setup();
        let mut request = acquisition("acc-1", "AAPL", dec!(1), dec!(1));
        request.display_name = "  ".to_string();

        let err = service.acquire(request).await.unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_set_position_then_get_returns_exact_values() {
        let (_repo, service) = setup();
        let created = service
            .acquire(acquisition("acc-1", "TCS", dec!(5), dec!(3200.75)))
            .await
            .unwrap();

        service
            .set_position(
                &created.id,
                PositionUpdate {
                    quantity: dec!(7.5),
                    price: dec!(3100.1234567),
                },
            )
            .await
            .unwrap();

        let stored = service.get_positions("acc-1").unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].quantity, dec!(7.5));
        assert_eq!(stored[0].average_cost, dec!(3100.1234567));
    }

    #[tokio::test]
    async fn test_set_position_unknown_id() {
        let (_repo, service) = setup();

        let err = service
            .set_position(
                "missing",
                PositionUpdate {
                    quantity: dec!(1),
                    price: dec!(1),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Ledger(LedgerError::PositionNotFound(_))));
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_remove_position_is_idempotent() {
        let (repo, service) = setup();
        let created = service
            .acquire(acquisition("acc-1", "INFY", dec!(15), dec!(1450.25)))
            .await
            .unwrap();

        let first = service.remove_position(&created.id).await.unwrap();
        let second = service.remove_position(&created.id).await.unwrap();

        assert_eq!(first.map(|p| p.symbol), Some("INFY".to_string()));
        assert!(second.is_none());
        assert!(service.get_positions("acc-1").unwrap().is_empty());
        assert_eq!(repo.version("acc-1"), 2);
    }

    #[tokio::test]
    async fn test_remove_absent_symbol_does_not_write() {
        let (repo, service) = setup();
        service
            .acquire(acquisition("acc-1", "AAPL", dec!(1), dec!(1)))
            .await
            .unwrap();
        let saves_before = repo.saves();

        let removed = service.remove_symbol("acc-1", "MSFT").await.unwrap();

        assert!(removed.is_none());
        assert_eq!(repo.saves(), saves_before);
        assert_eq!(service.get_positions("acc-1").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_version_conflict_is_retried() {
        let (repo, service) = setup();
        repo.force_conflicts(2);

        let position = service
            .acquire(acquisition("acc-1", "AAPL", dec!(3), dec!(10)))
            .await
            .unwrap();

        assert_eq!(position.quantity, dec!(3));
        assert_eq!(repo.saves(), 3);
        assert_eq!(service.get_positions("acc-1").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_version_conflict_exhausts_attempts() {
        let repo = Arc::new(MockPositionRepository::with_accounts(&["acc-1"]));
        let service = HoldingsService::new(repo.clone()).with_max_write_attempts(2);
        repo.force_conflicts(5);

        let err = service
            .acquire(acquisition("acc-1", "AAPL", dec!(3), dec!(10)))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ConcurrentModification(_)));
        assert!(err.is_retryable());
        assert_eq!(repo.saves(), 2);
        assert!(service.get_positions("acc-1").unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_acquires_are_order_independent() {
        let (_repo, service) = setup();
        let service = Arc::new(service);

        let a = {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .acquire(acquisition("acc-1", "AAPL", dec!(10), dec!(100)))
                    .await
            })
        };
        let b = {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .acquire(acquisition("acc-1", "AAPL", dec!(30), dec!(180.5)))
                    .await
            })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let positions = service.get_positions("acc-1").unwrap();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].quantity, dec!(40));
        // (10 * 100 + 30 * 180.5) / 40
        assert_eq!(positions[0].average_cost, dec!(160.375));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_acquires_lose_no_updates() {
        let (_repo, service) = setup();
        let service = Arc::new(service);

        let tasks: Vec<_> = (0..25)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .acquire(acquisition("acc-2", "TCS", dec!(2), dec!(3200.75)))
                        .await
                })
            })
            .collect();
        for result in futures::future::join_all(tasks).await {
            result.unwrap().unwrap();
        }

        let positions = service.get_positions("acc-2").unwrap();
        assert_eq!(positions[0].quantity, dec!(50));
        assert_eq!(positions[0].average_cost, dec!(3200.75));
        assert!(service.get_positions("acc-1").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_portfolio_summary() {
        let (_repo, service) = setup();
        service
            .acquire(acquisition("acc-1", "RELIANCE", dec!(10), dec!(2500.50)))
            .await
            .unwrap();
        service
            .acquire(acquisition("acc-1", "TCS", dec!(5), dec!(3200.75)))
            .await
            .unwrap();

        let summary = service.portfolio_summary("acc-1").unwrap();

        assert_eq!(summary.position_count, 2);
        assert_eq!(summary.total_cost_basis, dec!(41008.75));
    }

    #[tokio::test]
    async fn test_unknown_accounts_leave_no_lock_entries() {
        let (_repo, service) = setup();

        for i in 0..1000 {
            let account_id = format!("missing-{}", i);
            let err = service
                .acquire(acquisition(&account_id, "AAPL", dec!(1), dec!(1)))
                .await
                .unwrap_err();
            assert!(matches!(err, Error::NotFound(_)));
            service.remove_symbol(&account_id, "AAPL").await.unwrap_err();
        }

        assert_eq!(service.tracked_account_locks(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_lock_entries_released_after_mutations() {
        let (_repo, service) = setup();
        let service = Arc::new(service);

        let tasks: Vec<_> = (0..20)
            .map(|i| {
                let service = service.clone();
                let account_id = if i % 2 == 0 { "acc-1" } else { "acc-2" };
                tokio::spawn(async move {
                    service
                        .acquire(acquisition(account_id, "INFY", dec!(1), dec!(1450.25)))
                        .await
                })
            })
            .collect();
        for result in futures::future::join_all(tasks).await {
            result.unwrap().unwrap();
        }

        assert_eq!(service.tracked_account_locks(), 0);
        assert_eq!(service.get_positions("acc-1").unwrap()[0].quantity, dec!(10));
        assert_eq!(service.get_positions("acc-2").unwrap()[0].quantity, dec!(10));
    }
}
