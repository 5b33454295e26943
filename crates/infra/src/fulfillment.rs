//! Manufacturer-order fulfillment orchestration.
//!
//! Combines the persisted order, a best-effort carrier snapshot, and the
//! display-status resolver; owns the only code path that credits the stock
//! ledger from a manufacturer order.

use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use stockline_core::OrderId;
use stockline_orders::{resolve_display_status, ApplyOutcome, DisplayStatus, ManufacturerOrder};
use stockline_tracking::TrackingSnapshot;

use crate::carrier::CarrierTracker;
use crate::store::{OrderStore, StoreError};

#[derive(Clone)]
pub struct FulfillmentService {
    orders: Arc<dyn OrderStore>,
    tracker: Arc<dyn CarrierTracker>,
}

impl FulfillmentService {
    pub fn new(orders: Arc<dyn OrderStore>, tracker: Arc<dyn CarrierTracker>) -> Self {
        Self { orders, tracker }
    }

    /// Fetch the carrier snapshot for an order, best-effort.
    ///
    /// `None` when the order has no tracking number or the carrier fetch
    /// failed; the resolver then falls back to the stored status.
    pub async fn snapshot_for(&self, order: &ManufacturerOrder) -> Option<TrackingSnapshot> {
        let tracking_number = order.tracking_number.as_deref()?;
        match self
            .tracker
            .fetch_snapshot(tracking_number, order.carrier.as_deref(), order.tracking_url.as_deref())
            .await
        {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                tracing::warn!(
                    order_id = %order.id,
                    tracking_number,
                    error = %err,
                    "carrier snapshot fetch failed; falling back to stored status"
                );
                None
            }
        }
    }

    /// Load an order together with its derived display status.
    pub async fn order_with_display(
        &self,
        id: OrderId,
    ) -> Result<(ManufacturerOrder, DisplayStatus), StoreError> {
        let order = self.orders.get(id).await?;
        let snapshot = self.snapshot_for(&order).await;
        let display = resolve_display_status(&order, snapshot.as_ref());
        Ok((order, display))
    }

    /// Commit a received order's line quantities into the stock ledger,
    /// exactly once.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn apply_to_inventory(&self, id: OrderId) -> Result<ApplyOutcome, StoreError> {
        let order = self.orders.get(id).await?;
        let snapshot = self.snapshot_for(&order).await;

        // The store re-reads the row inside its transaction and judges that
        // persisted state, so a stale `order` here cannot widen the window.
        let judge = move |candidate: &ManufacturerOrder| {
            resolve_display_status(candidate, snapshot.as_ref())
        };

        self.orders.apply_to_inventory(id, &judge, Utc::now()).await
    }
}
