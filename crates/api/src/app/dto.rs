use chrono::NaiveDate;
use serde::Deserialize;

use stockline_catalog::{CatalogEntry, Source};
use stockline_ledger::StockLedgerEntry;
use stockline_orders::{ApplyOutcome, DisplayStatus, ManufacturerOrder, OrderStatus};
use stockline_tracking::TrackingSnapshot;

// -------------------------
// Request DTOs
// -------------------------

/// Signed ledger adjustment; `quantity` is the delta, not a new total.
#[derive(Debug, Deserialize)]
pub struct AdjustStockRequest {
    pub sku: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterItemRequest {
    pub sku: String,
    pub name: String,
    pub price_cents: i64,
    #[serde(default)]
    pub initial_quantity: i64,
    #[serde(default)]
    pub min_stock: i64,
    pub location: Option<String>,
}

/// Explicit absolute overwrite (stocktake correction).
#[derive(Debug, Deserialize)]
pub struct OverwriteStockRequest {
    pub sku: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub sku: String,
    pub product_name: String,
    pub quantity_ordered: i64,
    pub unit_cost_cents: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub order_number: String,
    pub order_date: Option<NaiveDate>,
    pub expected_delivery: Option<NaiveDate>,
    pub tracking_number: Option<String>,
    pub tracking_url: Option<String>,
    pub carrier: Option<String>,
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Deserialize)]
pub struct AdvanceStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingRequest {
    pub tracking_number: String,
    pub carrier: Option<String>,
    pub tracking_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub bucket: Option<String>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

fn source_str(source: Source) -> &'static str {
    match source {
        Source::Local => "local",
        Source::Shopify => "shopify",
    }
}

pub fn status_str(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "pending",
        OrderStatus::Confirmed => "confirmed",
        OrderStatus::Shipped => "shipped",
        OrderStatus::Delivered => "delivered",
        OrderStatus::Cancelled => "cancelled",
    }
}

pub fn display_status_str(status: DisplayStatus) -> &'static str {
    match status {
        DisplayStatus::Ordered => "ordered",
        DisplayStatus::Shipped => "shipped",
        DisplayStatus::Received => "received",
        DisplayStatus::Cancelled => "cancelled",
    }
}

pub fn catalog_entry_to_json(entry: &CatalogEntry) -> serde_json::Value {
    serde_json::json!({
        "sku": entry.sku.as_str(),
        "displayId": entry.display_id,
        "name": entry.name,
        "priceCents": entry.price_cents,
        "source": source_str(entry.source),
        "quantityOnHand": entry.quantity_on_hand,
        "minStock": entry.min_stock,
    })
}

pub fn ledger_entry_to_json(entry: &StockLedgerEntry) -> serde_json::Value {
    serde_json::json!({
        "sku": entry.sku.as_str(),
        "quantity": entry.quantity,
        "minStock": entry.min_stock,
        "location": entry.location,
        "updatedAt": entry.updated_at.to_rfc3339(),
    })
}

pub fn order_to_json(order: &ManufacturerOrder, display: DisplayStatus) -> serde_json::Value {
    serde_json::json!({
        "id": order.id.to_string(),
        "orderNumber": order.order_number,
        "status": status_str(order.status),
        "displayStatus": display_status_str(display),
        "orderDate": order.order_date,
        "expectedDelivery": order.expected_delivery,
        "actualDelivery": order.actual_delivery,
        "trackingNumber": order.tracking_number,
        "trackingUrl": order.tracking_url,
        "carrier": order.carrier,
        "totalAmountCents": order.total_amount_cents,
        "incoming": order.is_incoming(),
        "inventoryAppliedAt": order.inventory_applied_at.map(|t| t.to_rfc3339()),
        "items": order.items.iter().map(|item| serde_json::json!({
            "sku": item.sku.as_str(),
            "productName": item.product_name,
            "quantityOrdered": item.quantity_ordered,
            "quantityReceived": item.quantity_received,
            "unitCostCents": item.unit_cost_cents,
            "totalCostCents": item.total_cost_cents(),
        })).collect::<Vec<_>>(),
    })
}

pub fn apply_outcome_to_json(outcome: &ApplyOutcome) -> serde_json::Value {
    match outcome {
        ApplyOutcome::Applied { .. } => serde_json::json!({ "applied": true }),
        ApplyOutcome::AlreadyApplied { applied_at } => serde_json::json!({
            "applied": false,
            "message": format!("inventory already applied at {}", applied_at.to_rfc3339()),
        }),
        ApplyOutcome::NotReceived { display_status } => serde_json::json!({
            "applied": false,
            "message": format!(
                "order not yet received (current status: {})",
                display_status_str(*display_status)
            ),
        }),
    }
}

pub fn snapshot_to_json(snapshot: &TrackingSnapshot) -> serde_json::Value {
    serde_json::json!({
        "status": snapshot.status,
        "origin": snapshot.origin,
        "destination": snapshot.destination,
        "events": snapshot.events.iter().map(|e| serde_json::json!({
            "occurredAt": e.occurred_at.map(|t| t.to_rfc3339()),
            "description": e.description,
            "location": e.location,
        })).collect::<Vec<_>>(),
    })
}
