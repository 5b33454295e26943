//! Tracking snapshot types and carrier token normalization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One scan/checkpoint reported by the carrier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub occurred_at: Option<DateTime<Utc>>,
    pub description: String,
    pub location: Option<String>,
}

/// A point-in-time view of a shipment as reported by the carrier.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrackingSnapshot {
    pub events: Vec<TrackingEvent>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    /// Carrier-reported free-form token, e.g. `delivered`, `in_transit`,
    /// `out_for_delivery`. Absent when the carrier has not accepted the
    /// shipment yet.
    pub status: Option<String>,
}

impl TrackingSnapshot {
    /// Normalize the carrier-reported token, if any.
    pub fn carrier_status(&self) -> Option<CarrierStatus> {
        self.status.as_deref().map(CarrierStatus::from_token)
    }
}

/// Normalized carrier status tiers.
///
/// Carriers report many more tokens than we distinguish; everything that is
/// neither a delivery nor active transit collapses to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarrierStatus {
    Delivered,
    InTransit,
    OutForDelivery,
    Other,
}

impl CarrierStatus {
    /// Lowercase-normalize a raw carrier token.
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_lowercase().as_str() {
            "delivered" => Self::Delivered,
            "in_transit" => Self::InTransit,
            "out_for_delivery" => Self::OutForDelivery,
            _ => Self::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_normalize_case_insensitively() {
        assert_eq!(CarrierStatus::from_token("DELIVERED"), CarrierStatus::Delivered);
        assert_eq!(CarrierStatus::from_token(" In_Transit "), CarrierStatus::InTransit);
        assert_eq!(
            CarrierStatus::from_token("out_for_delivery"),
            CarrierStatus::OutForDelivery
        );
    }

    #[test]
    fn unknown_tokens_collapse_to_other() {
        for token in ["pending", "label_created", "exception", "returned"] {
            assert_eq!(CarrierStatus::from_token(token), CarrierStatus::Other);
        }
    }

    #[test]
    fn snapshot_without_status_has_no_carrier_status() {
        assert_eq!(TrackingSnapshot::default().carrier_status(), None);
    }
}
