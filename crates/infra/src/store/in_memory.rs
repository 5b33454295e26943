//! In-memory store.
//!
//! Intended for tests/dev. Adjustments apply their delta while holding the
//! ledger lock, which gives the same no-lost-update guarantee the Postgres
//! implementation gets from a single-statement increment. Lock order is
//! always orders before ledger.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use stockline_catalog::CatalogEntry;
use stockline_core::{OrderId, Sku};
use stockline_ledger::{validate_delta, NegativeStockPolicy, RegisterItem, StockLedgerEntry};
use stockline_orders::{ApplyOutcome, DisplayStatus, ManufacturerOrder, OrderStatus};

use super::r#trait::{LedgerStore, OrderStore, StoreError};
use async_trait::async_trait;

#[derive(Debug, Clone)]
struct LocalRecord {
    name: String,
    price_cents: i64,
    quantity: i64,
    min_stock: i64,
    location: Option<String>,
    updated_at: DateTime<Utc>,
}

impl LocalRecord {
    fn entry(&self, sku: &Sku) -> StockLedgerEntry {
        StockLedgerEntry {
            sku: sku.clone(),
            quantity: self.quantity,
            min_stock: self.min_stock,
            location: self.location.clone(),
            updated_at: self.updated_at,
        }
    }
}

/// In-memory ledger + order store.
#[derive(Debug)]
pub struct InMemoryStore {
    policy: NegativeStockPolicy,
    orders: Mutex<HashMap<OrderId, ManufacturerOrder>>,
    ledger: Mutex<HashMap<Sku, LocalRecord>>,
}

impl InMemoryStore {
    pub fn new(policy: NegativeStockPolicy) -> Self {
        Self {
            policy,
            orders: Mutex::new(HashMap::new()),
            ledger: Mutex::new(HashMap::new()),
        }
    }

    fn lock_orders(&self) -> Result<MutexGuard<'_, HashMap<OrderId, ManufacturerOrder>>, StoreError> {
        self.orders
            .lock()
            .map_err(|_| StoreError::Backend("orders lock poisoned".into()))
    }

    fn lock_ledger(&self) -> Result<MutexGuard<'_, HashMap<Sku, LocalRecord>>, StoreError> {
        self.ledger
            .lock()
            .map_err(|_| StoreError::Backend("ledger lock poisoned".into()))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(NegativeStockPolicy::Allow)
    }
}

#[async_trait]
impl LedgerStore for InMemoryStore {
    async fn catalog_entries(&self) -> Result<Vec<CatalogEntry>, StoreError> {
        let ledger = self.lock_ledger()?;
        let mut entries: Vec<CatalogEntry> = ledger
            .iter()
            .map(|(sku, rec)| {
                CatalogEntry::local(
                    sku.clone(),
                    rec.name.clone(),
                    rec.price_cents,
                    rec.quantity,
                    rec.min_stock,
                )
            })
            .collect();
        entries.sort_by(|a, b| a.sku.cmp(&b.sku));
        Ok(entries)
    }

    async fn entry(&self, sku: &Sku) -> Result<StockLedgerEntry, StoreError> {
        let ledger = self.lock_ledger()?;
        ledger
            .get(sku)
            .map(|rec| rec.entry(sku))
            .ok_or(StoreError::NotFound)
    }

    async fn register(&self, item: RegisterItem) -> Result<StockLedgerEntry, StoreError> {
        item.validate()?;
        let mut ledger = self.lock_ledger()?;
        if ledger.contains_key(&item.sku) {
            return Err(StoreError::Domain(stockline_core::DomainError::conflict(
                format!("sku {} already registered", item.sku),
            )));
        }
        let rec = LocalRecord {
            name: item.name,
            price_cents: item.price_cents,
            quantity: item.initial_quantity,
            min_stock: item.min_stock,
            location: item.location,
            updated_at: Utc::now(),
        };
        let entry = rec.entry(&item.sku);
        ledger.insert(item.sku, rec);
        Ok(entry)
    }

    async fn adjust(&self, sku: &Sku, delta: i64) -> Result<StockLedgerEntry, StoreError> {
        validate_delta(delta)?;
        let mut ledger = self.lock_ledger()?;
        let rec = ledger.get_mut(sku).ok_or(StoreError::NotFound)?;
        let resulting = rec.quantity + delta;
        self.policy.check(resulting)?;
        rec.quantity = resulting;
        rec.updated_at = Utc::now();
        Ok(rec.entry(sku))
    }

    async fn overwrite(&self, sku: &Sku, quantity: i64) -> Result<StockLedgerEntry, StoreError> {
        let mut ledger = self.lock_ledger()?;
        let rec = ledger.get_mut(sku).ok_or(StoreError::NotFound)?;
        self.policy.check(quantity)?;
        rec.quantity = quantity;
        rec.updated_at = Utc::now();
        Ok(rec.entry(sku))
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn insert(&self, order: ManufacturerOrder) -> Result<(), StoreError> {
        let mut orders = self.lock_orders()?;
        if orders.contains_key(&order.id) {
            return Err(StoreError::Domain(stockline_core::DomainError::conflict(
                format!("order {} already exists", order.id),
            )));
        }
        orders.insert(order.id, order);
        Ok(())
    }

    async fn get(&self, id: OrderId) -> Result<ManufacturerOrder, StoreError> {
        let orders = self.lock_orders()?;
        orders.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn list(&self) -> Result<Vec<ManufacturerOrder>, StoreError> {
        let orders = self.lock_orders()?;
        let mut all: Vec<ManufacturerOrder> = orders.values().cloned().collect();
        all.sort_by(|a, b| {
            b.order_date
                .cmp(&a.order_date)
                .then_with(|| a.order_number.cmp(&b.order_number))
        });
        Ok(all)
    }

    async fn advance_status(
        &self,
        id: OrderId,
        next: OrderStatus,
        at: DateTime<Utc>,
    ) -> Result<ManufacturerOrder, StoreError> {
        let mut orders = self.lock_orders()?;
        let order = orders.get_mut(&id).ok_or(StoreError::NotFound)?;
        order.advance_status(next, at)?;
        Ok(order.clone())
    }

    async fn apply_to_inventory(
        &self,
        id: OrderId,
        judge: &(dyn for<'a> Fn(&'a ManufacturerOrder) -> DisplayStatus + Send + Sync),
        now: DateTime<Utc>,
    ) -> Result<ApplyOutcome, StoreError> {
        // Both locks are held for the whole check-and-commit, which is what
        // makes the transition atomic for this backend.
        let mut orders = self.lock_orders()?;
        let order = orders.get_mut(&id).ok_or(StoreError::NotFound)?;

        if let Some(applied_at) = order.inventory_applied_at {
            return Ok(ApplyOutcome::AlreadyApplied { applied_at });
        }

        let display = judge(order);
        if display != DisplayStatus::Received {
            return Ok(ApplyOutcome::NotReceived {
                display_status: display,
            });
        }

        let mut ledger = self.lock_ledger()?;
        for item in &order.items {
            if !ledger.contains_key(&item.sku) {
                return Err(StoreError::Backend(format!(
                    "ledger row missing for sku {}",
                    item.sku
                )));
            }
        }
        for item in &order.items {
            if let Some(rec) = ledger.get_mut(&item.sku) {
                rec.quantity += item.quantity_ordered;
                rec.updated_at = now;
            }
        }

        order.inventory_applied_at = Some(now);
        Ok(ApplyOutcome::Applied { applied_at: now })
    }
}
