//! Merged catalog reads across both origins.

use std::sync::Arc;

use stockline_catalog::{merge_catalog, CatalogEntry};

use crate::shopify::ShopifyCatalog;
use crate::store::{LedgerStore, StoreError};

/// Serves the merged catalog view: local ledger-backed entries plus whatever
/// the Shopify origin can currently deliver.
#[derive(Clone)]
pub struct CatalogService {
    ledger: Arc<dyn LedgerStore>,
    shopify: Arc<dyn ShopifyCatalog>,
}

impl CatalogService {
    pub fn new(ledger: Arc<dyn LedgerStore>, shopify: Arc<dyn ShopifyCatalog>) -> Self {
        Self { ledger, shopify }
    }

    /// Recompute the catalog view.
    ///
    /// A local storage failure is fatal; a Shopify failure degrades to the
    /// local subset - a partial-source failure never discards the whole
    /// catalog.
    pub async fn merged_catalog(&self) -> Result<Vec<CatalogEntry>, StoreError> {
        let local = self.ledger.catalog_entries().await?;

        let shopify = match self.shopify.catalog_entries().await {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(error = %err, "shopify catalog fetch failed; serving local entries only");
                Vec::new()
            }
        };

        Ok(merge_catalog(local, shopify))
    }
}
