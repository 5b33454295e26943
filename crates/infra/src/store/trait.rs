//! Storage seam for the stock ledger and manufacturer orders.
//!
//! Implementations own atomicity: the signed ledger adjustment must be a
//! single atomic increment at this layer (never a read-modify-write in
//! application code), and the apply-to-inventory transition must execute its
//! precondition check, every line credit, and the flag write as one atomic
//! unit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use stockline_catalog::CatalogEntry;
use stockline_core::{DomainError, OrderId, Sku};
use stockline_ledger::{RegisterItem, StockLedgerEntry};
use stockline_orders::{ApplyOutcome, DisplayStatus, ManufacturerOrder, OrderStatus};

/// Storage-layer error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Unknown SKU or order id.
    #[error("not found")]
    NotFound,

    /// A deterministic domain rule failed (validation, invariant, conflict).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The backing store itself failed. Fatal to the request; never
    /// swallowed, because it risks data loss.
    #[error("storage failure: {0}")]
    Backend(String),
}

/// The authoritative on-hand store for local SKUs, plus the local catalog
/// facts registered alongside them.
///
/// All quantity mutation goes through [`LedgerStore::adjust`] and the
/// explicitly-labeled [`LedgerStore::overwrite`]; no other component writes
/// quantities.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Local catalog view: one entry per registered SKU.
    async fn catalog_entries(&self) -> Result<Vec<CatalogEntry>, StoreError>;

    async fn entry(&self, sku: &Sku) -> Result<StockLedgerEntry, StoreError>;

    /// Create a brand-new ledger row. Fails with a conflict if the SKU is
    /// already registered; adjusting can never create rows.
    async fn register(&self, item: RegisterItem) -> Result<StockLedgerEntry, StoreError>;

    /// Apply a signed delta atomically relative to any concurrently-in-flight
    /// adjustment for the same SKU: N concurrent `+1`s always net `+N`.
    async fn adjust(&self, sku: &Sku, delta: i64) -> Result<StockLedgerEntry, StoreError>;

    /// Absolute-quantity overwrite (stocktake correction). The one operation
    /// allowed to set an absolute total.
    async fn overwrite(&self, sku: &Sku, quantity: i64) -> Result<StockLedgerEntry, StoreError>;
}

/// Persisted manufacturer orders and the one-time apply transition.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: ManufacturerOrder) -> Result<(), StoreError>;

    async fn get(&self, id: OrderId) -> Result<ManufacturerOrder, StoreError>;

    async fn list(&self) -> Result<Vec<ManufacturerOrder>, StoreError>;

    /// Externally-driven stored-status transition, validated by the domain
    /// state machine against the persisted row.
    async fn advance_status(
        &self,
        id: OrderId,
        next: OrderStatus,
        at: DateTime<Utc>,
    ) -> Result<ManufacturerOrder, StoreError>;

    /// The one-time apply-to-inventory transition.
    ///
    /// `judge` computes the display status from the persisted row (the
    /// caller has already fetched whatever carrier snapshot it could); the
    /// implementation re-reads the row inside its lock/transaction, checks
    /// `judge(order) == received` and `inventory_applied_at` unset, credits
    /// every line's ordered quantity, and stamps the flag - atomically. Of
    /// two concurrent calls for the same order exactly one applies; the
    /// other observes `AlreadyApplied`.
    async fn apply_to_inventory(
        &self,
        id: OrderId,
        judge: &(dyn for<'a> Fn(&'a ManufacturerOrder) -> DisplayStatus + Send + Sync),
        now: DateTime<Utc>,
    ) -> Result<ApplyOutcome, StoreError>;
}
