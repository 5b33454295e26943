//! Shopify catalog adapter boundary.
//!
//! The core consumes Shopify as an opaque read-only catalog origin; the raw
//! HTTP client lives outside this repository. What we own is the boundary
//! trait and the single normalization from Shopify's variant shape into
//! [`CatalogEntry`].

use serde::{Deserialize, Serialize};

use stockline_catalog::CatalogEntry;
use stockline_core::Sku;

use crate::upstream::UpstreamError;
use async_trait::async_trait;

/// A raw Shopify product variant, as delivered by the storefront API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopifyVariant {
    pub variant_id: String,
    /// Shopify does not require SKUs; variants without one are skipped.
    pub sku: Option<String>,
    pub title: String,
    pub price_cents: i64,
    /// Absent when inventory is not tracked for the variant.
    pub inventory_quantity: Option<i64>,
}

/// Normalize one raw variant into a catalog entry.
///
/// Returns `None` for variants that cannot participate in the catalog
/// (missing or blank SKU).
pub fn normalize_variant(variant: &ShopifyVariant) -> Option<CatalogEntry> {
    let sku = Sku::parse(variant.sku.as_deref()?).ok()?;
    Some(CatalogEntry::shopify(
        sku,
        &variant.variant_id,
        variant.title.clone(),
        variant.price_cents,
        variant.inventory_quantity,
    ))
}

/// Read-only Shopify catalog origin.
#[async_trait]
pub trait ShopifyCatalog: Send + Sync {
    async fn catalog_entries(&self) -> Result<Vec<CatalogEntry>, UpstreamError>;
}

/// Adapter used when no Shopify credentials are configured: every fetch
/// fails upstream, and the caller degrades to the local-only catalog.
#[derive(Debug, Default)]
pub struct DisabledShopify;

#[async_trait]
impl ShopifyCatalog for DisabledShopify {
    async fn catalog_entries(&self) -> Result<Vec<CatalogEntry>, UpstreamError> {
        Err(UpstreamError::new("shopify credentials not configured"))
    }
}

/// Fixture adapter holding a fixed set of variants (dev/tests).
#[derive(Debug, Default)]
pub struct StaticShopifyCatalog {
    variants: Vec<ShopifyVariant>,
}

impl StaticShopifyCatalog {
    pub fn new(variants: Vec<ShopifyVariant>) -> Self {
        Self { variants }
    }
}

#[async_trait]
impl ShopifyCatalog for StaticShopifyCatalog {
    async fn catalog_entries(&self) -> Result<Vec<CatalogEntry>, UpstreamError> {
        Ok(self.variants.iter().filter_map(normalize_variant).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_without_sku_are_skipped() {
        let with_sku = ShopifyVariant {
            variant_id: "42".into(),
            sku: Some("ARM-100".into()),
            title: "Armrest".into(),
            price_cents: 1999,
            inventory_quantity: Some(3),
        };
        let without_sku = ShopifyVariant {
            sku: None,
            ..with_sku.clone()
        };
        let blank_sku = ShopifyVariant {
            sku: Some("  ".into()),
            ..with_sku.clone()
        };

        assert!(normalize_variant(&with_sku).is_some());
        assert!(normalize_variant(&without_sku).is_none());
        assert!(normalize_variant(&blank_sku).is_none());
    }

    #[test]
    fn normalized_entry_keeps_untracked_inventory_absent() {
        let variant = ShopifyVariant {
            variant_id: "42".into(),
            sku: Some("ARM-100".into()),
            title: "Armrest".into(),
            price_cents: 1999,
            inventory_quantity: None,
        };
        let entry = normalize_variant(&variant).unwrap();
        assert_eq!(entry.quantity_on_hand, None);
        assert_eq!(entry.display_id, "shopify-42");
    }
}
