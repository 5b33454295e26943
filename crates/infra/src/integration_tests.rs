//! Cross-component tests for the consistency contract: ledger additivity,
//! exactly-once apply, and degrade paths.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use stockline_catalog::Source;
use stockline_core::{DomainError, OrderId, Sku};
use stockline_ledger::{NegativeStockPolicy, RegisterItem};
use stockline_orders::{
    ApplyOutcome, DisplayStatus, ManufacturerOrder, NewOrder, OrderItem, OrderStatus,
};
use stockline_tracking::TrackingSnapshot;

use crate::carrier::{StaticCarrierTracker, UnreachableCarrier};
use crate::catalog_service::CatalogService;
use crate::fulfillment::FulfillmentService;
use crate::shopify::{DisabledShopify, ShopifyVariant, StaticShopifyCatalog};
use crate::store::{InMemoryStore, LedgerStore, OrderStore, StoreError};

fn sku(raw: &str) -> Sku {
    Sku::parse(raw).unwrap()
}

async fn register(store: &InMemoryStore, raw: &str, quantity: i64) {
    store
        .register(RegisterItem {
            sku: sku(raw),
            name: format!("{raw} part"),
            price_cents: 1999,
            initial_quantity: quantity,
            min_stock: 0,
            location: None,
        })
        .await
        .unwrap();
}

async fn insert_order(
    store: &InMemoryStore,
    order_number: &str,
    tracking_number: Option<&str>,
    items: Vec<OrderItem>,
) -> OrderId {
    let order = ManufacturerOrder::create(
        OrderId::new(),
        NewOrder {
            order_number: order_number.into(),
            order_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            expected_delivery: None,
            tracking_number: tracking_number.map(str::to_string),
            tracking_url: None,
            carrier: tracking_number.map(|_| "ups".to_string()),
            items,
        },
    )
    .unwrap();
    let id = order.id;
    store.insert(order).await.unwrap();
    id
}

fn arm_item(quantity: i64) -> OrderItem {
    OrderItem::new(sku("ARM-100"), "Armrest".into(), quantity, 450).unwrap()
}

fn delivered_snapshot() -> TrackingSnapshot {
    TrackingSnapshot {
        status: Some("delivered".into()),
        ..TrackingSnapshot::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_adjustments_all_land() {
    let store = Arc::new(InMemoryStore::default());
    register(&store, "ARM-100", 100).await;

    let mut handles = Vec::new();
    for _ in 0..40 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.adjust(&sku("ARM-100"), 1).await.unwrap();
        }));
    }
    for _ in 0..10 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.adjust(&sku("ARM-100"), -3).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let entry = store.entry(&sku("ARM-100")).await.unwrap();
    assert_eq!(entry.quantity, 100 + 40 - 30);
}

#[tokio::test]
async fn adjust_unknown_sku_is_not_found() {
    let store = InMemoryStore::default();
    assert!(matches!(
        store.adjust(&sku("GHOST-1"), 5).await,
        Err(StoreError::NotFound)
    ));
}

#[tokio::test]
async fn register_existing_sku_conflicts() {
    let store = InMemoryStore::default();
    register(&store, "ARM-100", 5).await;
    let err = store
        .register(RegisterItem {
            sku: sku("ARM-100"),
            name: "Armrest".into(),
            price_cents: 1999,
            initial_quantity: 0,
            min_stock: 0,
            location: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Domain(DomainError::Conflict(_))));
}

#[tokio::test]
async fn reject_policy_floors_adjustments_at_zero() {
    let store = InMemoryStore::new(NegativeStockPolicy::Reject);
    register(&store, "ARM-100", 2).await;

    let err = store.adjust(&sku("ARM-100"), -3).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::Domain(DomainError::InvariantViolation(_))
    ));

    // Allow policy keeps the permissive historical behavior.
    let permissive = InMemoryStore::default();
    register(&permissive, "ARM-100", 2).await;
    let entry = permissive.adjust(&sku("ARM-100"), -3).await.unwrap();
    assert_eq!(entry.quantity, -1);
}

#[tokio::test]
async fn received_order_applies_exactly_once() {
    let store = Arc::new(InMemoryStore::default());
    register(&store, "ARM-100", 50).await;

    // No tracking number: stored `delivered` is trusted on its own.
    let id = insert_order(&store, "MO-1001", None, vec![arm_item(20)]).await;
    store
        .advance_status(id, OrderStatus::Delivered, Utc::now())
        .await
        .unwrap();

    let fulfillment = FulfillmentService::new(store.clone(), Arc::new(UnreachableCarrier));

    let first = fulfillment.apply_to_inventory(id).await.unwrap();
    assert!(first.applied());
    assert_eq!(store.entry(&sku("ARM-100")).await.unwrap().quantity, 70);
    assert!(store.get(id).await.unwrap().inventory_applied_at.is_some());

    let second = fulfillment.apply_to_inventory(id).await.unwrap();
    assert!(matches!(second, ApplyOutcome::AlreadyApplied { .. }));
    assert_eq!(store.entry(&sku("ARM-100")).await.unwrap().quantity, 70);
}

#[tokio::test(flavor = "multi_thread")]
async fn racing_applies_credit_once() {
    let store = Arc::new(InMemoryStore::default());
    register(&store, "ARM-100", 50).await;

    let tracker = Arc::new(StaticCarrierTracker::new());
    tracker.set("1Z999", delivered_snapshot());

    let id = insert_order(&store, "MO-1001", Some("1Z999"), vec![arm_item(20)]).await;
    store
        .advance_status(id, OrderStatus::Shipped, Utc::now())
        .await
        .unwrap();

    let fulfillment = FulfillmentService::new(store.clone(), tracker);

    let (a, b) = tokio::join!(
        fulfillment.apply_to_inventory(id),
        fulfillment.apply_to_inventory(id),
    );
    let outcomes = [a.unwrap(), b.unwrap()];

    let applied = outcomes.iter().filter(|o| o.applied()).count();
    assert_eq!(applied, 1);
    assert_eq!(store.entry(&sku("ARM-100")).await.unwrap().quantity, 70);
}

#[tokio::test]
async fn carrier_delivered_overrides_stored_shipped_for_apply() {
    let store = Arc::new(InMemoryStore::default());
    register(&store, "ARM-100", 10).await;

    let tracker = Arc::new(StaticCarrierTracker::new());
    tracker.set("1Z999", delivered_snapshot());

    let id = insert_order(&store, "MO-1002", Some("1Z999"), vec![arm_item(5)]).await;
    store
        .advance_status(id, OrderStatus::Shipped, Utc::now())
        .await
        .unwrap();

    let fulfillment = FulfillmentService::new(store.clone(), tracker);
    assert!(fulfillment.apply_to_inventory(id).await.unwrap().applied());
    assert_eq!(store.entry(&sku("ARM-100")).await.unwrap().quantity, 15);
}

#[tokio::test]
async fn unconfirmed_tracking_blocks_apply_despite_stored_delivered() {
    let store = Arc::new(InMemoryStore::default());
    register(&store, "ARM-100", 10).await;

    let id = insert_order(&store, "MO-1003", Some("1Z999"), vec![arm_item(5)]).await;
    store
        .advance_status(id, OrderStatus::Delivered, Utc::now())
        .await
        .unwrap();

    // Carrier unreachable: the resolver must stay conservative.
    let fulfillment = FulfillmentService::new(store.clone(), Arc::new(UnreachableCarrier));
    let outcome = fulfillment.apply_to_inventory(id).await.unwrap();
    assert_eq!(
        outcome,
        ApplyOutcome::NotReceived {
            display_status: DisplayStatus::Ordered
        }
    );
    assert_eq!(store.entry(&sku("ARM-100")).await.unwrap().quantity, 10);
    assert!(store.get(id).await.unwrap().inventory_applied_at.is_none());
}

#[tokio::test]
async fn pending_order_is_not_applied() {
    let store = Arc::new(InMemoryStore::default());
    register(&store, "ARM-100", 10).await;
    let id = insert_order(&store, "MO-1004", None, vec![arm_item(5)]).await;

    let fulfillment = FulfillmentService::new(store.clone(), Arc::new(UnreachableCarrier));
    let outcome = fulfillment.apply_to_inventory(id).await.unwrap();
    assert_eq!(
        outcome,
        ApplyOutcome::NotReceived {
            display_status: DisplayStatus::Ordered
        }
    );
}

#[tokio::test]
async fn shopify_failure_degrades_to_local_catalog() {
    let store = Arc::new(InMemoryStore::default());
    register(&store, "ARM-100", 50).await;
    register(&store, "LEG-200", 8).await;

    let service = CatalogService::new(store.clone(), Arc::new(DisabledShopify));
    let entries = service.merged_catalog().await.unwrap();

    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.source == Source::Local));
}

#[tokio::test]
async fn merged_catalog_carries_both_sources() {
    let store = Arc::new(InMemoryStore::default());
    register(&store, "ARM-100", 50).await;

    let shopify = Arc::new(StaticShopifyCatalog::new(vec![ShopifyVariant {
        variant_id: "42".into(),
        sku: Some("ARM-100".into()),
        title: "Armrest".into(),
        price_cents: 2499,
        inventory_quantity: Some(3),
    }]));

    let service = CatalogService::new(store.clone(), shopify);
    let entries = service.merged_catalog().await.unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].source, Source::Local);
    assert_eq!(entries[1].source, Source::Shopify);
    assert_eq!(entries[1].display_id, "shopify-42");
}
