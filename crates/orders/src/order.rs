//! Manufacturer purchase order: lifecycle status, line items, applied flag.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stockline_core::{DomainError, DomainResult, OrderId, Sku};

/// Stored purchase-order lifecycle status.
///
/// Transitions are externally driven (user action or tracking-sync job) and
/// monotonic forward, with `Cancelled` reachable from any non-terminal state.
/// `Delivered` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Confirmed => 1,
            Self::Shipped => 2,
            Self::Delivered => 3,
            // Cancelled sits outside the forward chain.
            Self::Cancelled => u8::MAX,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether the stored status may move from `self` to `next`.
    ///
    /// Forward jumps are legal (a tracking-sync job may observe `delivered`
    /// while the stored status is still `confirmed`); moving backwards or out
    /// of a terminal state is not.
    pub fn can_advance_to(self, next: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == Self::Cancelled {
            return true;
        }
        next.rank() > self.rank()
    }
}

/// One purchase-order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub sku: Sku,
    pub product_name: String,
    pub quantity_ordered: i64,
    pub quantity_received: i64,
    /// Unit cost in cents.
    pub unit_cost_cents: i64,
}

impl OrderItem {
    pub fn new(
        sku: Sku,
        product_name: String,
        quantity_ordered: i64,
        unit_cost_cents: i64,
    ) -> DomainResult<Self> {
        if quantity_ordered <= 0 {
            return Err(DomainError::validation("quantity_ordered must be positive"));
        }
        if unit_cost_cents < 0 {
            return Err(DomainError::validation("unit_cost cannot be negative"));
        }
        if product_name.trim().is_empty() {
            return Err(DomainError::validation("product_name cannot be empty"));
        }
        Ok(Self {
            sku,
            product_name,
            quantity_ordered,
            quantity_received: 0,
            unit_cost_cents,
        })
    }

    /// Record a received count: `0 ≤ quantity_received ≤ quantity_ordered`.
    pub fn set_received(&mut self, quantity_received: i64) -> DomainResult<()> {
        if quantity_received < 0 || quantity_received > self.quantity_ordered {
            return Err(DomainError::validation(
                "quantity_received must be between 0 and quantity_ordered",
            ));
        }
        self.quantity_received = quantity_received;
        Ok(())
    }

    pub fn total_cost_cents(&self) -> i64 {
        self.quantity_ordered * self.unit_cost_cents
    }
}

/// Input for creating a manufacturer order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub order_number: String,
    pub order_date: NaiveDate,
    pub expected_delivery: Option<NaiveDate>,
    pub tracking_number: Option<String>,
    pub tracking_url: Option<String>,
    pub carrier: Option<String>,
    pub items: Vec<OrderItem>,
}

/// A purchase order placed with an upstream manufacturer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManufacturerOrder {
    pub id: OrderId,
    pub order_number: String,
    pub status: OrderStatus,
    pub order_date: NaiveDate,
    pub expected_delivery: Option<NaiveDate>,
    pub actual_delivery: Option<NaiveDate>,
    pub tracking_number: Option<String>,
    pub tracking_url: Option<String>,
    pub carrier: Option<String>,
    /// Order total in cents, derived from the line items.
    pub total_amount_cents: i64,
    pub items: Vec<OrderItem>,
    /// Once non-null, the ledger has been credited for this order's items and
    /// must never be credited again for the same order.
    pub inventory_applied_at: Option<DateTime<Utc>>,
}

impl ManufacturerOrder {
    pub fn create(id: OrderId, new: NewOrder) -> DomainResult<Self> {
        if new.order_number.trim().is_empty() {
            return Err(DomainError::validation("order_number cannot be empty"));
        }
        if new.items.is_empty() {
            return Err(DomainError::validation("order must have at least one item"));
        }
        let total_amount_cents = new.items.iter().map(OrderItem::total_cost_cents).sum();
        Ok(Self {
            id,
            order_number: new.order_number,
            status: OrderStatus::Pending,
            order_date: new.order_date,
            expected_delivery: new.expected_delivery,
            actual_delivery: None,
            tracking_number: new.tracking_number,
            tracking_url: new.tracking_url,
            carrier: new.carrier,
            total_amount_cents,
            items: new.items,
            inventory_applied_at: None,
        })
    }

    /// Apply an externally-driven stored-status transition.
    pub fn advance_status(&mut self, next: OrderStatus, at: DateTime<Utc>) -> DomainResult<()> {
        if !self.status.can_advance_to(next) {
            return Err(DomainError::invariant(format!(
                "cannot move order from {:?} to {:?}",
                self.status, next
            )));
        }
        if next == OrderStatus::Delivered && self.actual_delivery.is_none() {
            self.actual_delivery = Some(at.date_naive());
        }
        self.status = next;
        Ok(())
    }

    /// Listing bucket: an order is incoming until its stored status is
    /// terminal.
    pub fn is_incoming(&self) -> bool {
        !self.status.is_terminal()
    }
}

/// Result of the apply-to-inventory transition.
///
/// The non-applied variants are expected idempotent outcomes, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ApplyOutcome {
    /// The ledger was credited for every line and the flag was stamped.
    Applied { applied_at: DateTime<Utc> },
    /// A previous call already credited this order.
    AlreadyApplied { applied_at: DateTime<Utc> },
    /// The order's display status is not `received` yet.
    NotReceived { display_status: crate::display::DisplayStatus },
}

impl ApplyOutcome {
    pub fn applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}
