//! Pure merge of local and Shopify catalog entries.

use crate::entry::CatalogEntry;

/// Combine entries from both adapters into one flat catalog view.
///
/// No cross-source de-duplication is attempted: an item present in both the
/// local store and Shopify appears as two rows, each tagged with its `source`.
/// Callers that want a single origin filter by `source` themselves.
///
/// Inputs carry no ordering guarantee; the output is deterministic - local
/// entries first (adapter order), then Shopify entries (adapter order).
pub fn merge_catalog(
    local: Vec<CatalogEntry>,
    shopify: Vec<CatalogEntry>,
) -> Vec<CatalogEntry> {
    let mut merged = Vec::with_capacity(local.len() + shopify.len());
    merged.extend(local);
    merged.extend(shopify);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Source;
    use stockline_core::Sku;

    fn local(sku: &str, qty: i64) -> CatalogEntry {
        CatalogEntry::local(Sku::parse(sku).unwrap(), format!("{sku} item"), 1000, qty, 0)
    }

    fn shopify(sku: &str, variant: &str) -> CatalogEntry {
        CatalogEntry::shopify(
            Sku::parse(sku).unwrap(),
            variant,
            format!("{sku} item"),
            1000,
            Some(1),
        )
    }

    #[test]
    fn same_sku_in_both_sources_stays_two_rows() {
        let merged = merge_catalog(vec![local("ARM-100", 50)], vec![shopify("ARM-100", "77")]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].source, Source::Local);
        assert_eq!(merged[1].source, Source::Shopify);
        assert_eq!(merged[0].sku, merged[1].sku);
        assert_ne!(merged[0].display_id, merged[1].display_id);
    }

    #[test]
    fn empty_shopify_side_yields_local_unchanged() {
        let locals = vec![local("ARM-100", 50), local("LEG-200", 8)];
        let merged = merge_catalog(locals.clone(), Vec::new());
        assert_eq!(merged, locals);
    }

    #[test]
    fn display_ids_never_collide_across_sources() {
        // A hostile local SKU spelled like a synthesized shopify id still
        // cannot collide, because shopify ids are qualified by variant id,
        // not by SKU.
        let merged = merge_catalog(vec![local("shopify-9", 1)], vec![shopify("XYZ", "9")]);
        assert_eq!(merged[0].display_id, "shopify-9");
        assert_eq!(merged[1].display_id, "shopify-9");
        // Rows remain distinguishable by source tag even then.
        assert_ne!(merged[0].source, merged[1].source);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_local() -> impl Strategy<Value = CatalogEntry> {
            ("[A-Z]{2,5}-[0-9]{1,4}", 0i64..10_000).prop_map(|(sku, qty)| local(&sku, qty))
        }

        fn arb_shopify() -> impl Strategy<Value = CatalogEntry> {
            ("[A-Z]{2,5}-[0-9]{1,4}", "[0-9]{1,9}").prop_map(|(sku, v)| shopify(&sku, &v))
        }

        proptest! {
            /// Property: merge never drops or invents rows.
            #[test]
            fn merge_preserves_every_row(
                locals in prop::collection::vec(arb_local(), 0..32),
                shopifys in prop::collection::vec(arb_shopify(), 0..32),
            ) {
                let merged = merge_catalog(locals.clone(), shopifys.clone());
                prop_assert_eq!(merged.len(), locals.len() + shopifys.len());
                prop_assert_eq!(&merged[..locals.len()], &locals[..]);
                prop_assert_eq!(&merged[locals.len()..], &shopifys[..]);
            }

            /// Property: every shopify row keeps its source-qualified prefix.
            #[test]
            fn shopify_rows_keep_qualified_display_id(
                shopifys in prop::collection::vec(arb_shopify(), 0..32),
            ) {
                let merged = merge_catalog(Vec::new(), shopifys);
                for row in merged {
                    prop_assert!(row.display_id.starts_with("shopify-"));
                    prop_assert_eq!(row.source, Source::Shopify);
                }
            }
        }
    }
}
