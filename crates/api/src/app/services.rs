//! Service wiring: stores + collaborator adapters behind one handle.

use std::sync::Arc;

use sqlx::PgPool;

use stockline_infra::{
    CarrierTracker, CatalogService, DisabledShopify, FulfillmentService, InMemoryStore,
    LedgerStore, OrderStore, PostgresStore, ShopifyCatalog, UnreachableCarrier,
};
use stockline_ledger::NegativeStockPolicy;

/// Everything the request handlers need, shared via `Extension`.
#[derive(Clone)]
pub struct AppServices {
    pub ledger: Arc<dyn LedgerStore>,
    pub orders: Arc<dyn OrderStore>,
    pub tracker: Arc<dyn CarrierTracker>,
    pub catalog: CatalogService,
    pub fulfillment: FulfillmentService,
}

impl AppServices {
    /// Wire services from explicit parts. The Shopify and carrier clients
    /// are consumed as opaque collaborators; deployments (and tests) plug
    /// their implementations in here.
    pub fn with_parts(
        ledger: Arc<dyn LedgerStore>,
        orders: Arc<dyn OrderStore>,
        shopify: Arc<dyn ShopifyCatalog>,
        tracker: Arc<dyn CarrierTracker>,
    ) -> Self {
        let catalog = CatalogService::new(ledger.clone(), shopify);
        let fulfillment = FulfillmentService::new(orders.clone(), tracker.clone());
        Self {
            ledger,
            orders,
            tracker,
            catalog,
            fulfillment,
        }
    }
}

fn negative_stock_policy() -> NegativeStockPolicy {
    let allow = std::env::var("ALLOW_NEGATIVE_STOCK")
        .unwrap_or_else(|_| "true".to_string())
        .parse::<bool>()
        .unwrap_or(true);
    if allow {
        NegativeStockPolicy::Allow
    } else {
        NegativeStockPolicy::Reject
    }
}

/// Build services from the environment.
///
/// `USE_PERSISTENT_STORES=true` selects Postgres (requires `DATABASE_URL`);
/// the default is the in-memory store for dev/test. Without configured
/// collaborator clients the Shopify origin and the carrier tracker run in
/// their disabled forms, and every read degrades along the documented
/// fallback paths.
pub async fn build_services() -> AppServices {
    let policy = negative_stock_policy();

    let use_persistent = std::env::var("USE_PERSISTENT_STORES")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    if use_persistent {
        let database_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set when USE_PERSISTENT_STORES=true");
        let pool = PgPool::connect(&database_url)
            .await
            .expect("failed to connect to Postgres");
        let store = Arc::new(PostgresStore::new(pool, policy));
        return AppServices::with_parts(
            store.clone(),
            store,
            Arc::new(DisabledShopify),
            Arc::new(UnreachableCarrier),
        );
    }

    let store = Arc::new(InMemoryStore::new(policy));
    AppServices::with_parts(
        store.clone(),
        store,
        Arc::new(DisabledShopify),
        Arc::new(UnreachableCarrier),
    )
}
