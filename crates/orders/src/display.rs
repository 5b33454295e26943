//! Display-status resolver: stored status overlaid with carrier tracking.

use serde::{Deserialize, Serialize};

use stockline_tracking::{CarrierStatus, TrackingSnapshot};

use crate::order::{ManufacturerOrder, OrderStatus};

/// The user-facing fulfillment state of a manufacturer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayStatus {
    Ordered,
    Shipped,
    Received,
    Cancelled,
}

/// Derive the display status from the stored status plus an optional carrier
/// snapshot.
///
/// Trust is asymmetric: carrier data, when present, overrides the stored
/// status; when a tracking number exists but the carrier has not confirmed
/// anything yet, the stored status is only trusted conservatively - a stored
/// `delivered` stays at `ordered` until the carrier agrees. Orders with no
/// tracking number at all (freight, manual carriers) are trusted on stored
/// status alone.
pub fn resolve_display_status(
    order: &ManufacturerOrder,
    snapshot: Option<&TrackingSnapshot>,
) -> DisplayStatus {
    // Cancellation is terminal; no tracking data overrides it.
    if order.status == OrderStatus::Cancelled {
        return DisplayStatus::Cancelled;
    }

    if let Some(carrier) = snapshot.and_then(TrackingSnapshot::carrier_status) {
        return match carrier {
            CarrierStatus::Delivered => DisplayStatus::Received,
            CarrierStatus::InTransit | CarrierStatus::OutForDelivery => DisplayStatus::Shipped,
            CarrierStatus::Other => DisplayStatus::Ordered,
        };
    }

    if order.tracking_number.is_some() {
        // Tracking exists but is unconfirmed (fetch pending or failed).
        // Stored `delivered` is not trusted here.
        return match order.status {
            OrderStatus::Shipped => DisplayStatus::Shipped,
            _ => DisplayStatus::Ordered,
        };
    }

    match order.status {
        OrderStatus::Delivered => DisplayStatus::Received,
        OrderStatus::Shipped => DisplayStatus::Shipped,
        _ => DisplayStatus::Ordered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{NewOrder, OrderItem};
    use chrono::NaiveDate;
    use stockline_core::{OrderId, Sku};

    fn order(status: OrderStatus, tracking_number: Option<&str>) -> ManufacturerOrder {
        let item = OrderItem::new(Sku::parse("ARM-100").unwrap(), "Armrest".into(), 20, 450)
            .unwrap();
        let mut order = ManufacturerOrder::create(
            OrderId::new(),
            NewOrder {
                order_number: "MO-1001".into(),
                order_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                expected_delivery: None,
                tracking_number: tracking_number.map(str::to_string),
                tracking_url: None,
                carrier: Some("ups".into()),
                items: vec![item],
            },
        )
        .unwrap();
        order.status = status;
        order
    }

    fn snapshot(status: &str) -> TrackingSnapshot {
        TrackingSnapshot {
            status: Some(status.into()),
            ..TrackingSnapshot::default()
        }
    }

    #[test]
    fn cancelled_wins_over_any_tracking_data() {
        let order = order(OrderStatus::Cancelled, Some("1Z999"));
        assert_eq!(
            resolve_display_status(&order, Some(&snapshot("delivered"))),
            DisplayStatus::Cancelled
        );
    }

    #[test]
    fn carrier_delivered_overrides_stored_shipped() {
        let order = order(OrderStatus::Shipped, Some("1Z999"));
        assert_eq!(
            resolve_display_status(&order, Some(&snapshot("delivered"))),
            DisplayStatus::Received
        );
    }

    #[test]
    fn carrier_transit_tiers_map_to_shipped() {
        let order = order(OrderStatus::Pending, Some("1Z999"));
        for token in ["in_transit", "out_for_delivery", "IN_TRANSIT"] {
            assert_eq!(
                resolve_display_status(&order, Some(&snapshot(token))),
                DisplayStatus::Shipped
            );
        }
    }

    #[test]
    fn other_carrier_tokens_map_to_ordered() {
        let order = order(OrderStatus::Shipped, Some("1Z999"));
        assert_eq!(
            resolve_display_status(&order, Some(&snapshot("label_created"))),
            DisplayStatus::Ordered
        );
    }

    #[test]
    fn stored_delivered_is_not_trusted_while_tracking_unconfirmed() {
        let order = order(OrderStatus::Delivered, Some("1Z999"));
        assert_eq!(resolve_display_status(&order, None), DisplayStatus::Ordered);
    }

    #[test]
    fn stored_shipped_survives_unconfirmed_tracking() {
        let order = order(OrderStatus::Shipped, Some("1Z999"));
        assert_eq!(resolve_display_status(&order, None), DisplayStatus::Shipped);
    }

    #[test]
    fn snapshot_without_status_falls_back_conservatively() {
        let order = order(OrderStatus::Delivered, Some("1Z999"));
        let empty = TrackingSnapshot::default();
        assert_eq!(
            resolve_display_status(&order, Some(&empty)),
            DisplayStatus::Ordered
        );
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_status() -> impl Strategy<Value = OrderStatus> {
            prop_oneof![
                Just(OrderStatus::Pending),
                Just(OrderStatus::Confirmed),
                Just(OrderStatus::Shipped),
                Just(OrderStatus::Delivered),
            ]
        }

        proptest! {
            /// Property: a tracked order is never shown as received without
            /// carrier confirmation, whatever the stored status says.
            #[test]
            fn tracked_orders_need_carrier_confirmation(status in arb_status()) {
                let order = order(status, Some("1Z999"));
                prop_assert_ne!(resolve_display_status(&order, None), DisplayStatus::Received);
            }

            /// Property: carrier `delivered` resolves to received from any
            /// non-cancelled stored status.
            #[test]
            fn carrier_delivered_always_wins(status in arb_status()) {
                let order = order(status, Some("1Z999"));
                prop_assert_eq!(
                    resolve_display_status(&order, Some(&snapshot("delivered"))),
                    DisplayStatus::Received
                );
            }
        }
    }

    #[test]
    fn untracked_orders_trust_stored_status() {
        assert_eq!(
            resolve_display_status(&order(OrderStatus::Delivered, None), None),
            DisplayStatus::Received
        );
        assert_eq!(
            resolve_display_status(&order(OrderStatus::Shipped, None), None),
            DisplayStatus::Shipped
        );
        assert_eq!(
            resolve_display_status(&order(OrderStatus::Confirmed, None), None),
            DisplayStatus::Ordered
        );
    }
}
