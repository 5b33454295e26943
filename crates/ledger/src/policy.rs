//! Adjustment rules.

use serde::{Deserialize, Serialize};

use stockline_core::{DomainError, DomainResult};

/// Whether an adjustment may drive a quantity below zero.
///
/// The ledger historically permits negative stock (backorder-style
/// bookkeeping); `Reject` is available for deployments that want a floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NegativeStockPolicy {
    #[default]
    Allow,
    Reject,
}

impl NegativeStockPolicy {
    /// Check a prospective post-adjustment quantity against the policy.
    pub fn check(self, resulting_quantity: i64) -> DomainResult<()> {
        match self {
            Self::Allow => Ok(()),
            Self::Reject if resulting_quantity >= 0 => Ok(()),
            Self::Reject => Err(DomainError::invariant("stock cannot go negative")),
        }
    }
}

/// Validate a signed adjustment delta before it reaches storage.
///
/// Positive receives stock, negative consumes or corrects. A zero delta is
/// always a caller bug.
pub fn validate_delta(delta: i64) -> DomainResult<()> {
    if delta == 0 {
        return Err(DomainError::validation("delta cannot be zero"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_delta_rejected() {
        assert!(matches!(validate_delta(0), Err(DomainError::Validation(_))));
        assert!(validate_delta(-3).is_ok());
        assert!(validate_delta(7).is_ok());
    }

    #[test]
    fn allow_policy_permits_negative_quantities() {
        assert!(NegativeStockPolicy::Allow.check(-12).is_ok());
    }

    #[test]
    fn reject_policy_floors_at_zero() {
        assert!(NegativeStockPolicy::Reject.check(0).is_ok());
        assert!(matches!(
            NegativeStockPolicy::Reject.check(-1),
            Err(DomainError::InvariantViolation(_))
        ));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn allow_never_rejects(quantity in any::<i64>()) {
                prop_assert!(NegativeStockPolicy::Allow.check(quantity).is_ok());
            }

            #[test]
            fn reject_floors_exactly_at_zero(quantity in any::<i64>()) {
                prop_assert_eq!(NegativeStockPolicy::Reject.check(quantity).is_ok(), quantity >= 0);
            }
        }
    }
}
