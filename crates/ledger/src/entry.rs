//! Ledger row schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockline_core::{DomainError, DomainResult, Sku};

/// The authoritative on-hand count for one local SKU.
///
/// Invariant: `quantity` is only ever changed by a signed-delta adjustment;
/// the absolute-overwrite operation is distinct and explicitly labeled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLedgerEntry {
    pub sku: Sku,
    /// May be negative - the ledger is bookkeeping, not a reservation system.
    pub quantity: i64,
    pub min_stock: i64,
    pub location: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl StockLedgerEntry {
    pub fn is_below_min(&self) -> bool {
        self.quantity < self.min_stock
    }
}

/// Input for the register operation - the only path that creates a ledger row.
///
/// Local catalog facts (name, price) live alongside the count because the
/// local store is the single origin for both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterItem {
    pub sku: Sku,
    pub name: String,
    pub price_cents: i64,
    pub initial_quantity: i64,
    pub min_stock: i64,
    pub location: Option<String>,
}

impl RegisterItem {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.price_cents < 0 {
            return Err(DomainError::validation("price cannot be negative"));
        }
        if self.min_stock < 0 {
            return Err(DomainError::validation("min_stock cannot be negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> RegisterItem {
        RegisterItem {
            sku: Sku::parse("ARM-100").unwrap(),
            name: "Armrest".into(),
            price_cents: 1999,
            initial_quantity: 50,
            min_stock: 5,
            location: None,
        }
    }

    #[test]
    fn valid_registration_passes() {
        assert!(registration().validate().is_ok());
    }

    #[test]
    fn blank_name_rejected() {
        let mut reg = registration();
        reg.name = "  ".into();
        assert!(matches!(reg.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn negative_price_rejected() {
        let mut reg = registration();
        reg.price_cents = -1;
        assert!(matches!(reg.validate(), Err(DomainError::Validation(_))));
    }
}
