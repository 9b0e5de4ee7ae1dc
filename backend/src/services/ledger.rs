//! Stock Ledger: authoritative quantity bookkeeping per stock record key
//!
//! Every mutation goes through here; no component writes stock record
//! fields directly. The ledger guarantees, after every committed
//! operation:
//!
//! - `0 <= reserved <= on_hand` for every record
//! - total on-hand is conserved across a move (nothing created/destroyed)
//! - no reader observes a half-applied move
//!
//! Mutations on the same key serialize through a per-key async lock; moves
//! lock both keys in a deterministic order so overlapping moves cannot
//! deadlock. Disjoint keys proceed concurrently without a global lock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::error::{AppError, AppResult};
use crate::services::stock_store::{StockMove, StockStore};
use shared::models::{StockRecord, StockRecordKey};

/// Per-key lock registry
///
/// Lock handles are created lazily and discarded again when the record
/// they guard is pruned, so the registry tracks live keys rather than
/// every key ever touched. The registry itself is only held long enough
/// to clone or drop a handle.
#[derive(Debug, Default)]
struct LockRegistry {
    inner: Mutex<HashMap<StockRecordKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl LockRegistry {
    fn handle(&self, key: &StockRecordKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self.inner.lock().unwrap();
        map.entry(key.clone())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Drop a key's handle if no task holds or awaits it
    ///
    /// Acquisition always goes through the map, so a strong count of one
    /// (the map's own reference) under the map lock proves the handle is
    /// idle and cannot be revived concurrently.
    fn discard_if_idle(&self, key: &StockRecordKey) {
        let mut map = self.inner.lock().unwrap();
        if map
            .get(key)
            .is_some_and(|handle| Arc::strong_count(handle) == 1)
        {
            map.remove(key);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }
}

/// The stock ledger over a persistence store
pub struct StockLedger<S: StockStore> {
    store: S,
    locks: LockRegistry,
}

impl<S: StockStore> StockLedger<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: LockRegistry::default(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Available quantity for a key; 0 for a non-existent key
    ///
    /// Absence is not an error. Reads may run alongside disjoint-key
    /// mutations; store atomicity guarantees they never see a torn move.
    pub async fn get_available(&self, key: &StockRecordKey) -> AppResult<Decimal> {
        let record = self.store.get(key).await?;
        Ok(record.map(|r| r.available()).unwrap_or(Decimal::ZERO))
    }

    /// Current record state, if any
    pub async fn get_record(&self, key: &StockRecordKey) -> AppResult<Option<StockRecord>> {
        self.store.get(key).await
    }

    /// Initial receipt of goods: create or increase a record
    #[instrument(skip(self), fields(key = %key))]
    pub async fn receive(&self, key: &StockRecordKey, quantity: Decimal) -> AppResult<()> {
        if quantity <= Decimal::ZERO {
            return Err(AppError::InvalidQuantity(format!(
                "receive quantity must be positive, got {}",
                quantity
            )));
        }
        let lock = self.locks.handle(key);
        let _guard = lock.lock().await;

        let mut record = self.store.get(key).await?.unwrap_or_default();
        record.adjust(quantity)?;
        self.store.put(key, record).await?;

        debug!(on_hand = %record.on_hand, "stock received");
        Ok(())
    }

    /// Take a reservation against available quantity
    #[instrument(skip(self), fields(key = %key))]
    pub async fn reserve(&self, key: &StockRecordKey, quantity: Decimal) -> AppResult<()> {
        let lock = self.locks.handle(key);
        let _guard = lock.lock().await;

        let mut record = self.store.get(key).await?.unwrap_or_default();
        record.reserve(quantity)?;
        self.store.put(key, record).await?;

        debug!(reserved = %record.reserved, "stock reserved");
        Ok(())
    }

    /// Reserve up to `quantity`, bounded by availability
    ///
    /// Returns the quantity actually reserved. Used by partial-fill
    /// transfers; the min computation happens under the key lock so a
    /// concurrent reservation cannot slip in between read and write.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn reserve_at_most(
        &self,
        key: &StockRecordKey,
        quantity: Decimal,
    ) -> AppResult<Decimal> {
        let lock = self.locks.handle(key);
        let _guard = lock.lock().await;

        let mut record = self.store.get(key).await?.unwrap_or_default();
        let grant = quantity.min(record.available());
        if grant <= Decimal::ZERO {
            return Err(AppError::InsufficientStock {
                requested: quantity,
                available: Decimal::ZERO,
            });
        }
        record.reserve(grant)?;
        self.store.put(key, record).await?;

        debug!(granted = %grant, "partial reservation taken");
        Ok(grant)
    }

    /// Release part or all of a reservation
    #[instrument(skip(self), fields(key = %key))]
    pub async fn release(&self, key: &StockRecordKey, quantity: Decimal) -> AppResult<()> {
        let lock = self.locks.handle(key);
        let guard = lock.lock().await;

        let mut record = self
            .store
            .get(key)
            .await?
            .ok_or_else(|| AppError::InvalidReservation(format!("no record for key {}", key)))?;
        record.release(quantity)?;

        let pruned = record.is_empty();
        if pruned {
            self.store.remove(key).await?;
        } else {
            self.store.put(key, record).await?;
        }

        debug!(reserved = %record.reserved, "reservation released");
        drop(guard);
        drop(lock);
        if pruned {
            self.locks.discard_if_idle(key);
        }
        Ok(())
    }

    /// Change on-hand by a signed delta
    ///
    /// On-hand may never drop below the reserved quantity. Records that
    /// reach zero on-hand and zero reserved are pruned.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn adjust(&self, key: &StockRecordKey, delta: Decimal) -> AppResult<()> {
        let lock = self.locks.handle(key);
        let guard = lock.lock().await;

        let mut record = self.store.get(key).await?.unwrap_or_default();
        record.adjust(delta)?;

        let pruned = record.is_empty();
        if pruned {
            self.store.remove(key).await?;
        } else {
            self.store.put(key, record).await?;
        }

        debug!(on_hand = %record.on_hand, "stock adjusted");
        drop(guard);
        drop(lock);
        if pruned {
            self.locks.discard_if_idle(key);
        }
        Ok(())
    }

    /// Atomically move quantity between two records
    ///
    /// Equivalent to `adjust(source, -qty)` + `adjust(dest, +qty)` as a
    /// single unit: either both are applied or neither is observed. The
    /// destination record is created when absent.
    #[instrument(skip(self), fields(source = %source, dest = %dest))]
    pub async fn move_stock(
        &self,
        source: &StockRecordKey,
        dest: &StockRecordKey,
        quantity: Decimal,
    ) -> AppResult<()> {
        self.move_inner(source, dest, quantity, Decimal::ZERO).await
    }

    /// Atomically move quantity that the caller has reserved
    ///
    /// Consumes the caller's reservation on the source as part of the same
    /// atomic unit, so a full-stock transfer (everything on hand reserved
    /// and moved) cannot trip the reserved-quantity floor.
    #[instrument(skip(self), fields(source = %source, dest = %dest))]
    pub async fn move_reserved(
        &self,
        source: &StockRecordKey,
        dest: &StockRecordKey,
        quantity: Decimal,
    ) -> AppResult<()> {
        self.move_inner(source, dest, quantity, quantity).await
    }

    async fn move_inner(
        &self,
        source: &StockRecordKey,
        dest: &StockRecordKey,
        quantity: Decimal,
        consume_reservation: Decimal,
    ) -> AppResult<()> {
        if quantity <= Decimal::ZERO {
            return Err(AppError::InvalidQuantity(format!(
                "move quantity must be positive, got {}",
                quantity
            )));
        }
        if source == dest {
            return Err(AppError::InvalidQuantity(
                "source and destination address the same stock record".to_string(),
            ));
        }

        // Deterministic lock order prevents deadlock between overlapping moves
        let (first, second) = if source <= dest {
            (source, dest)
        } else {
            (dest, source)
        };
        let first_lock = self.locks.handle(first);
        let second_lock = self.locks.handle(second);
        let first_guard = first_lock.lock().await;
        let second_guard = second_lock.lock().await;

        let mut source_after = self.store.get(source).await?.unwrap_or_default();
        if !consume_reservation.is_zero() {
            source_after.release(consume_reservation)?;
        }
        source_after.adjust(-quantity)?;
        let source_pruned = source_after.is_empty();

        let mut dest_after = self.store.get(dest).await?.unwrap_or_default();
        dest_after.adjust(quantity)?;

        self.store
            .apply_move(&StockMove {
                source_key: source.clone(),
                source_after,
                dest_key: dest.clone(),
                dest_after,
                quantity,
            })
            .await?;

        debug!(quantity = %quantity, "stock moved");
        drop(second_guard);
        drop(first_guard);
        drop(second_lock);
        drop(first_lock);
        if source_pruned {
            self.locks.discard_if_idle(source);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::stock_store::InMemoryStockStore;
    use shared::models::StockType;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn key(location: &str) -> StockRecordKey {
        StockRecordKey {
            company_code: "ACME".to_string(),
            article_code: "ART-001".to_string(),
            warehouse_code: "WH1".to_string(),
            location_code: location.to_string(),
            lot_id: "L2026-01".to_string(),
            pallet_id: None,
            stock_type: StockType::Standard,
        }
    }

    fn ledger() -> StockLedger<InMemoryStockStore> {
        StockLedger::new(InMemoryStockStore::new())
    }

    async fn seeded(location: &str, on_hand: &str) -> StockLedger<InMemoryStockStore> {
        let ledger = ledger();
        ledger.receive(&key(location), dec(on_hand)).await.unwrap();
        ledger
    }

    #[tokio::test]
    async fn test_absent_key_reads_as_zero() {
        let ledger = ledger();
        assert_eq!(ledger.get_available(&key("A-01")).await.unwrap(), dec("0"));
        assert!(ledger.get_record(&key("A-01")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_receive_accumulates() {
        let ledger = seeded("A-01", "100").await;
        ledger.receive(&key("A-01"), dec("50")).await.unwrap();
        assert_eq!(ledger.get_available(&key("A-01")).await.unwrap(), dec("150"));
    }

    #[tokio::test]
    async fn test_receive_rejects_non_positive() {
        let ledger = ledger();
        assert!(matches!(
            ledger.receive(&key("A-01"), dec("0")).await,
            Err(AppError::InvalidQuantity(_))
        ));
        assert!(matches!(
            ledger.receive(&key("A-01"), dec("-5")).await,
            Err(AppError::InvalidQuantity(_))
        ));
    }

    #[tokio::test]
    async fn test_reserve_reduces_available_not_on_hand() {
        let ledger = seeded("A-01", "100").await;
        ledger.reserve(&key("A-01"), dec("30")).await.unwrap();

        let record = ledger.get_record(&key("A-01")).await.unwrap().unwrap();
        assert_eq!(record.on_hand, dec("100"));
        assert_eq!(record.reserved, dec("30"));
        assert_eq!(record.available(), dec("70"));
    }

    #[tokio::test]
    async fn test_reserve_beyond_available_fails() {
        let ledger = seeded("A-01", "10").await;
        let err = ledger.reserve(&key("A-01"), dec("25")).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientStock { .. }));

        // Record untouched
        let record = ledger.get_record(&key("A-01")).await.unwrap().unwrap();
        assert_eq!(record.reserved, dec("0"));
    }

    #[tokio::test]
    async fn test_release_restores_availability() {
        let ledger = seeded("A-01", "100").await;
        ledger.reserve(&key("A-01"), dec("40")).await.unwrap();
        ledger.release(&key("A-01"), dec("40")).await.unwrap();

        let record = ledger.get_record(&key("A-01")).await.unwrap().unwrap();
        assert_eq!(record.reserved, dec("0"));
        assert_eq!(record.available(), dec("100"));
    }

    #[tokio::test]
    async fn test_release_without_record_fails() {
        let ledger = ledger();
        assert!(matches!(
            ledger.release(&key("A-01"), dec("1")).await,
            Err(AppError::InvalidReservation(_))
        ));
    }

    #[tokio::test]
    async fn test_reserve_at_most_caps_at_availability() {
        let ledger = seeded("A-01", "10").await;
        let granted = ledger
            .reserve_at_most(&key("A-01"), dec("25"))
            .await
            .unwrap();
        assert_eq!(granted, dec("10"));
    }

    #[tokio::test]
    async fn test_reserve_at_most_with_zero_availability_fails() {
        let ledger = seeded("A-01", "10").await;
        ledger.reserve(&key("A-01"), dec("10")).await.unwrap();

        let err = ledger
            .reserve_at_most(&key("A-01"), dec("5"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InsufficientStock { .. }));
    }

    #[tokio::test]
    async fn test_adjust_cannot_drop_below_reserved() {
        let ledger = seeded("A-01", "100").await;
        ledger.reserve(&key("A-01"), dec("60")).await.unwrap();

        let err = ledger.adjust(&key("A-01"), dec("-50")).await.unwrap_err();
        assert!(matches!(err, AppError::NegativeStock(_)));
    }

    #[tokio::test]
    async fn test_adjust_to_zero_prunes_record() {
        let ledger = seeded("A-01", "100").await;
        ledger.adjust(&key("A-01"), dec("-100")).await.unwrap();
        assert!(ledger.get_record(&key("A-01")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_move_conserves_total_on_hand() {
        let ledger = seeded("A-01", "100").await;
        ledger
            .move_stock(&key("A-01"), &key("B-02"), dec("40"))
            .await
            .unwrap();

        let source = ledger.get_record(&key("A-01")).await.unwrap().unwrap();
        let dest = ledger.get_record(&key("B-02")).await.unwrap().unwrap();
        assert_eq!(source.on_hand, dec("60"));
        assert_eq!(dest.on_hand, dec("40"));
        assert_eq!(source.on_hand + dest.on_hand, dec("100"));
    }

    #[tokio::test]
    async fn test_move_rejects_same_source_and_destination() {
        let ledger = seeded("A-01", "100").await;
        assert!(matches!(
            ledger.move_stock(&key("A-01"), &key("A-01"), dec("10")).await,
            Err(AppError::InvalidQuantity(_))
        ));
    }

    #[tokio::test]
    async fn test_move_reserved_full_stock_empties_source() {
        let ledger = seeded("A-01", "100").await;
        ledger.reserve(&key("A-01"), dec("100")).await.unwrap();
        ledger
            .move_reserved(&key("A-01"), &key("B-02"), dec("100"))
            .await
            .unwrap();

        assert!(ledger.get_record(&key("A-01")).await.unwrap().is_none());
        let dest = ledger.get_record(&key("B-02")).await.unwrap().unwrap();
        assert_eq!(dest.on_hand, dec("100"));
        assert_eq!(dest.reserved, dec("0"));
    }

    #[tokio::test]
    async fn test_pruned_records_free_their_lock_handles() {
        let ledger = seeded("A-01", "100").await;
        ledger.reserve(&key("A-01"), dec("100")).await.unwrap();
        ledger
            .move_reserved(&key("A-01"), &key("B-02"), dec("100"))
            .await
            .unwrap();

        // Source pruned by the move, its handle discarded
        assert_eq!(ledger.locks.len(), 1);

        ledger.adjust(&key("B-02"), dec("-100")).await.unwrap();
        assert_eq!(ledger.locks.len(), 0);

        // A fresh handle is minted on the next touch of the key
        ledger.receive(&key("A-01"), dec("5")).await.unwrap();
        assert_eq!(ledger.locks.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_reservations_never_overcommit() {
        let ledger = Arc::new(seeded("A-01", "100").await);

        // Two reservations of 80 against 100 available: exactly one wins
        let a = tokio::spawn({
            let ledger = ledger.clone();
            async move { ledger.reserve(&key("A-01"), dec("80")).await }
        });
        let b = tokio::spawn({
            let ledger = ledger.clone();
            async move { ledger.reserve(&key("A-01"), dec("80")).await }
        });

        let results = [a.await.unwrap(), b.await.unwrap()];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);

        let record = ledger.get_record(&key("A-01")).await.unwrap().unwrap();
        assert_eq!(record.reserved, dec("80"));
        assert!(record.reserved <= record.on_hand);
    }

    #[tokio::test]
    async fn test_concurrent_disjoint_moves_both_apply() {
        let ledger = Arc::new(ledger());
        ledger.receive(&key("A-01"), dec("50")).await.unwrap();
        ledger.receive(&key("B-01"), dec("50")).await.unwrap();

        let a = tokio::spawn({
            let ledger = ledger.clone();
            async move { ledger.move_stock(&key("A-01"), &key("A-02"), dec("50")).await }
        });
        let b = tokio::spawn({
            let ledger = ledger.clone();
            async move { ledger.move_stock(&key("B-01"), &key("B-02"), dec("50")).await }
        });

        assert!(a.await.unwrap().is_ok());
        assert!(b.await.unwrap().is_ok());
        assert_eq!(ledger.get_available(&key("A-02")).await.unwrap(), dec("50"));
        assert_eq!(ledger.get_available(&key("B-02")).await.unwrap(), dec("50"));
    }

    #[tokio::test]
    async fn test_overlapping_moves_do_not_deadlock() {
        let ledger = Arc::new(ledger());
        ledger.receive(&key("A-01"), dec("30")).await.unwrap();
        ledger.receive(&key("B-01"), dec("30")).await.unwrap();

        // Opposite lock orders; deterministic ordering must serialize them
        let a = tokio::spawn({
            let ledger = ledger.clone();
            async move { ledger.move_stock(&key("A-01"), &key("B-01"), dec("10")).await }
        });
        let b = tokio::spawn({
            let ledger = ledger.clone();
            async move { ledger.move_stock(&key("B-01"), &key("A-01"), dec("10")).await }
        });

        assert!(a.await.unwrap().is_ok());
        assert!(b.await.unwrap().is_ok());

        let total = ledger.get_available(&key("A-01")).await.unwrap()
            + ledger.get_available(&key("B-01")).await.unwrap();
        assert_eq!(total, dec("60"));
    }
}
