//! Postgres-backed store.
//!
//! The ledger adjustment is a single `UPDATE … SET quantity = quantity + $n`
//! so concurrent adjustments serialize at the database and never lose an
//! update. The apply-to-inventory transition runs in one transaction: the
//! order row is locked with `FOR UPDATE`, the display-status judgment and the
//! applied-flag check happen against that locked row, every line credit is an
//! atomic increment, and the flag write commits with them or not at all.
//!
//! Schema lives in `crates/infra/migrations/0001_init.sql`.
//!
//! ## Error Mapping
//!
//! | SQLx error | PostgreSQL code | StoreError | Scenario |
//! |------------|-----------------|------------|----------|
//! | Database (unique violation) | `23505` | `Domain(Conflict)` | duplicate SKU/order registration |
//! | Database (other) | any other | `Backend` | constraint/database failure |
//! | RowNotFound / pool / network | n/a | `Backend` | infrastructure failure |

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use stockline_catalog::CatalogEntry;
use stockline_core::{DomainError, OrderId, Sku};
use stockline_ledger::{validate_delta, NegativeStockPolicy, RegisterItem, StockLedgerEntry};
use stockline_orders::{
    ApplyOutcome, DisplayStatus, ManufacturerOrder, OrderItem, OrderStatus,
};

use super::r#trait::{LedgerStore, OrderStore, StoreError};
use async_trait::async_trait;

/// Postgres-backed ledger + order store.
///
/// Uses the SQLx connection pool, which is thread-safe (`Arc` + `Send` +
/// `Sync`); the store can be shared freely across request handlers.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
    policy: NegativeStockPolicy,
}

impl PostgresStore {
    pub fn new(pool: PgPool, policy: NegativeStockPolicy) -> Self {
        Self {
            pool: Arc::new(pool),
            policy,
        }
    }
}

fn map_sqlx_error(op: &str, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some("23505") {
            return StoreError::Domain(DomainError::conflict(format!(
                "{op}: duplicate key"
            )));
        }
    }
    StoreError::Backend(format!("{op}: {err}"))
}

fn status_to_str(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "pending",
        OrderStatus::Confirmed => "confirmed",
        OrderStatus::Shipped => "shipped",
        OrderStatus::Delivered => "delivered",
        OrderStatus::Cancelled => "cancelled",
    }
}

fn status_from_str(raw: &str) -> Result<OrderStatus, StoreError> {
    match raw {
        "pending" => Ok(OrderStatus::Pending),
        "confirmed" => Ok(OrderStatus::Confirmed),
        "shipped" => Ok(OrderStatus::Shipped),
        "delivered" => Ok(OrderStatus::Delivered),
        "cancelled" => Ok(OrderStatus::Cancelled),
        other => Err(StoreError::Backend(format!(
            "unknown stored order status '{other}'"
        ))),
    }
}

fn ledger_entry_from_row(row: &PgRow) -> Result<StockLedgerEntry, StoreError> {
    let sku: String = row
        .try_get("sku")
        .map_err(|e| StoreError::Backend(format!("ledger row: {e}")))?;
    Ok(StockLedgerEntry {
        sku: Sku::parse(&sku).map_err(StoreError::Domain)?,
        quantity: row
            .try_get("quantity")
            .map_err(|e| StoreError::Backend(format!("ledger row: {e}")))?,
        min_stock: row
            .try_get("min_stock")
            .map_err(|e| StoreError::Backend(format!("ledger row: {e}")))?,
        location: row
            .try_get("location")
            .map_err(|e| StoreError::Backend(format!("ledger row: {e}")))?,
        updated_at: row
            .try_get("updated_at")
            .map_err(|e| StoreError::Backend(format!("ledger row: {e}")))?,
    })
}

fn order_from_row(row: &PgRow) -> Result<ManufacturerOrder, StoreError> {
    let get = |e: sqlx::Error| StoreError::Backend(format!("order row: {e}"));

    let id: uuid::Uuid = row.try_get("id").map_err(get)?;
    let status: String = row.try_get("status").map_err(get)?;
    let items_json: serde_json::Value = row.try_get("items").map_err(get)?;
    let items: Vec<OrderItem> = serde_json::from_value(items_json)
        .map_err(|e| StoreError::Backend(format!("order items payload: {e}")))?;

    Ok(ManufacturerOrder {
        id: OrderId::from_uuid(id),
        order_number: row.try_get("order_number").map_err(get)?,
        status: status_from_str(&status)?,
        order_date: row.try_get::<NaiveDate, _>("order_date").map_err(get)?,
        expected_delivery: row
            .try_get::<Option<NaiveDate>, _>("expected_delivery")
            .map_err(get)?,
        actual_delivery: row
            .try_get::<Option<NaiveDate>, _>("actual_delivery")
            .map_err(get)?,
        tracking_number: row.try_get("tracking_number").map_err(get)?,
        tracking_url: row.try_get("tracking_url").map_err(get)?,
        carrier: row.try_get("carrier").map_err(get)?,
        total_amount_cents: row.try_get("total_amount_cents").map_err(get)?,
        items,
        inventory_applied_at: row
            .try_get::<Option<DateTime<Utc>>, _>("inventory_applied_at")
            .map_err(get)?,
    })
}

const ORDER_COLUMNS: &str = "id, order_number, status, order_date, expected_delivery, \
     actual_delivery, tracking_number, tracking_url, carrier, total_amount_cents, \
     items, inventory_applied_at";

#[async_trait]
impl LedgerStore for PostgresStore {
    async fn catalog_entries(&self) -> Result<Vec<CatalogEntry>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT sku, name, price_cents, quantity, min_stock
            FROM stock_ledger
            ORDER BY sku ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("catalog_entries", e))?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let get = |e: sqlx::Error| StoreError::Backend(format!("catalog row: {e}"));
            let sku: String = row.try_get("sku").map_err(get)?;
            entries.push(CatalogEntry::local(
                Sku::parse(&sku).map_err(StoreError::Domain)?,
                row.try_get("name").map_err(get)?,
                row.try_get("price_cents").map_err(get)?,
                row.try_get("quantity").map_err(get)?,
                row.try_get("min_stock").map_err(get)?,
            ));
        }
        Ok(entries)
    }

    async fn entry(&self, sku: &Sku) -> Result<StockLedgerEntry, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT sku, quantity, min_stock, location, updated_at
            FROM stock_ledger
            WHERE sku = $1
            "#,
        )
        .bind(sku.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("entry", e))?;

        match row {
            Some(row) => ledger_entry_from_row(&row),
            None => Err(StoreError::NotFound),
        }
    }

    async fn register(&self, item: RegisterItem) -> Result<StockLedgerEntry, StoreError> {
        item.validate()?;
        let row = sqlx::query(
            r#"
            INSERT INTO stock_ledger (sku, name, price_cents, quantity, min_stock, location)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING sku, quantity, min_stock, location, updated_at
            "#,
        )
        .bind(item.sku.as_str())
        .bind(&item.name)
        .bind(item.price_cents)
        .bind(item.initial_quantity)
        .bind(item.min_stock)
        .bind(&item.location)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("register", e))?;

        ledger_entry_from_row(&row)
    }

    async fn adjust(&self, sku: &Sku, delta: i64) -> Result<StockLedgerEntry, StoreError> {
        validate_delta(delta)?;

        // Single-statement increment: the database serializes concurrent
        // deltas for the same SKU, so none are lost.
        let sql = match self.policy {
            NegativeStockPolicy::Allow => {
                r#"
                UPDATE stock_ledger
                SET quantity = quantity + $2, updated_at = NOW()
                WHERE sku = $1
                RETURNING sku, quantity, min_stock, location, updated_at
                "#
            }
            NegativeStockPolicy::Reject => {
                r#"
                UPDATE stock_ledger
                SET quantity = quantity + $2, updated_at = NOW()
                WHERE sku = $1 AND quantity + $2 >= 0
                RETURNING sku, quantity, min_stock, location, updated_at
                "#
            }
        };

        let row = sqlx::query(sql)
            .bind(sku.as_str())
            .bind(delta)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("adjust", e))?;

        if let Some(row) = row {
            return ledger_entry_from_row(&row);
        }

        // No row updated: unknown SKU, or the floor guard rejected the delta.
        if self.policy == NegativeStockPolicy::Reject {
            let exists = sqlx::query("SELECT 1 FROM stock_ledger WHERE sku = $1")
                .bind(sku.as_str())
                .fetch_optional(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("adjust", e))?
                .is_some();
            if exists {
                return Err(StoreError::Domain(DomainError::invariant(
                    "stock cannot go negative",
                )));
            }
        }
        Err(StoreError::NotFound)
    }

    async fn overwrite(&self, sku: &Sku, quantity: i64) -> Result<StockLedgerEntry, StoreError> {
        self.policy.check(quantity)?;
        let row = sqlx::query(
            r#"
            UPDATE stock_ledger
            SET quantity = $2, updated_at = NOW()
            WHERE sku = $1
            RETURNING sku, quantity, min_stock, location, updated_at
            "#,
        )
        .bind(sku.as_str())
        .bind(quantity)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("overwrite", e))?;

        match row {
            Some(row) => ledger_entry_from_row(&row),
            None => Err(StoreError::NotFound),
        }
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn insert(&self, order: ManufacturerOrder) -> Result<(), StoreError> {
        let items = serde_json::to_value(&order.items)
            .map_err(|e| StoreError::Backend(format!("serialize order items: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO manufacturer_orders (
                id, order_number, status, order_date, expected_delivery,
                actual_delivery, tracking_number, tracking_url, carrier,
                total_amount_cents, items, inventory_applied_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(&order.order_number)
        .bind(status_to_str(order.status))
        .bind(order.order_date)
        .bind(order.expected_delivery)
        .bind(order.actual_delivery)
        .bind(&order.tracking_number)
        .bind(&order.tracking_url)
        .bind(&order.carrier)
        .bind(order.total_amount_cents)
        .bind(items)
        .bind(order.inventory_applied_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_order", e))?;

        Ok(())
    }

    async fn get(&self, id: OrderId) -> Result<ManufacturerOrder, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM manufacturer_orders WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_order", e))?;

        match row {
            Some(row) => order_from_row(&row),
            None => Err(StoreError::NotFound),
        }
    }

    async fn list(&self) -> Result<Vec<ManufacturerOrder>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM manufacturer_orders \
             ORDER BY order_date DESC, order_number ASC"
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_orders", e))?;

        rows.iter().map(order_from_row).collect()
    }

    async fn advance_status(
        &self,
        id: OrderId,
        next: OrderStatus,
        at: DateTime<Utc>,
    ) -> Result<ManufacturerOrder, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("advance_status", e))?;

        let row = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM manufacturer_orders WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("advance_status", e))?;

        let mut order = match row {
            Some(row) => order_from_row(&row)?,
            None => return Err(StoreError::NotFound),
        };

        order.advance_status(next, at)?;

        sqlx::query(
            r#"
            UPDATE manufacturer_orders
            SET status = $2, actual_delivery = $3
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(status_to_str(order.status))
        .bind(order.actual_delivery)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("advance_status", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("advance_status", e))?;

        Ok(order)
    }

    async fn apply_to_inventory(
        &self,
        id: OrderId,
        judge: &(dyn for<'a> Fn(&'a ManufacturerOrder) -> DisplayStatus + Send + Sync),
        now: DateTime<Utc>,
    ) -> Result<ApplyOutcome, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("apply_to_inventory", e))?;

        // Row lock serializes concurrent apply attempts for the same order;
        // the loser re-reads the flag we are about to set.
        let row = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM manufacturer_orders WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("apply_to_inventory", e))?;

        let order = match row {
            Some(row) => order_from_row(&row)?,
            None => return Err(StoreError::NotFound),
        };

        if let Some(applied_at) = order.inventory_applied_at {
            return Ok(ApplyOutcome::AlreadyApplied { applied_at });
        }

        let display = judge(&order);
        if display != DisplayStatus::Received {
            return Ok(ApplyOutcome::NotReceived {
                display_status: display,
            });
        }

        for item in &order.items {
            let result = sqlx::query(
                r#"
                UPDATE stock_ledger
                SET quantity = quantity + $2, updated_at = $3
                WHERE sku = $1
                "#,
            )
            .bind(item.sku.as_str())
            .bind(item.quantity_ordered)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("apply_to_inventory", e))?;

            if result.rows_affected() == 0 {
                // Dropping the transaction rolls back any credits so far.
                return Err(StoreError::Backend(format!(
                    "ledger row missing for sku {}",
                    item.sku
                )));
            }
        }

        let stamped = sqlx::query(
            r#"
            UPDATE manufacturer_orders
            SET inventory_applied_at = $2
            WHERE id = $1 AND inventory_applied_at IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("apply_to_inventory", e))?;

        // Unreachable while we hold the row lock; kept as a hard stop against
        // ever double-crediting.
        if stamped.rows_affected() == 0 {
            return Err(StoreError::Backend(
                "applied flag changed under row lock".into(),
            ));
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("apply_to_inventory", e))?;

        tracing::info!(order_id = %id, lines = order.items.len(), "order applied to inventory");
        Ok(ApplyOutcome::Applied { applied_at: now })
    }
}
