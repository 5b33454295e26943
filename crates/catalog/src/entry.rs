//! Normalized catalog entry schema.

use serde::{Deserialize, Serialize};

use stockline_core::Sku;

/// Data origin of a catalog entry.
///
/// A SKU may independently exist in both origins; the two rows are kept as
/// distinct, explicitly-labeled identities and are never silently unified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Local,
    Shopify,
}

/// A normalized product+stock fact from one origin.
///
/// This is a view, recomputed on every catalog read - never persisted as a
/// merged object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Unique within its `source`.
    pub sku: Sku,
    /// Source-qualified identifier: raw SKU for local rows,
    /// `"shopify-<variant_id>"` for Shopify rows.
    pub display_id: String,
    pub name: String,
    /// Price in cents.
    pub price_cents: i64,
    pub source: Source,
    /// Absent for Shopify entries not yet reconciled.
    pub quantity_on_hand: Option<i64>,
    pub min_stock: i64,
}

impl CatalogEntry {
    /// Build a local-origin entry; `display_id` is the raw SKU.
    pub fn local(sku: Sku, name: String, price_cents: i64, quantity_on_hand: i64, min_stock: i64) -> Self {
        Self {
            display_id: sku.as_str().to_string(),
            sku,
            name,
            price_cents,
            source: Source::Local,
            quantity_on_hand: Some(quantity_on_hand),
            min_stock,
        }
    }

    /// Build a Shopify-origin entry.
    ///
    /// The `display_id` is synthesized from the variant id so it can never
    /// collide with a local SKU used as `display_id`.
    pub fn shopify(
        sku: Sku,
        variant_id: &str,
        name: String,
        price_cents: i64,
        quantity_on_hand: Option<i64>,
    ) -> Self {
        Self {
            display_id: format!("shopify-{variant_id}"),
            sku,
            name,
            price_cents,
            source: Source::Shopify,
            quantity_on_hand,
            min_stock: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shopify_display_id_is_variant_qualified() {
        let e = CatalogEntry::shopify(
            Sku::parse("ARM-100").unwrap(),
            "42",
            "Armrest".into(),
            1999,
            Some(3),
        );
        assert_eq!(e.display_id, "shopify-42");
        assert_eq!(e.source, Source::Shopify);
    }

    #[test]
    fn local_display_id_is_raw_sku() {
        let e = CatalogEntry::local(Sku::parse("ARM-100").unwrap(), "Armrest".into(), 1999, 50, 5);
        assert_eq!(e.display_id, "ARM-100");
        assert_eq!(e.quantity_on_hand, Some(50));
    }
}
