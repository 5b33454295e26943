//! Carrier tracking service boundary.

use std::collections::HashMap;
use std::sync::Mutex;

use stockline_tracking::TrackingSnapshot;

use crate::upstream::UpstreamError;
use async_trait::async_trait;

/// External carrier tracking service.
///
/// Fetches are best-effort: callers must degrade to the stored-status
/// fallback when this fails, never fail the whole status computation.
#[async_trait]
pub trait CarrierTracker: Send + Sync {
    async fn fetch_snapshot(
        &self,
        tracking_number: &str,
        carrier: Option<&str>,
        tracking_url: Option<&str>,
    ) -> Result<TrackingSnapshot, UpstreamError>;
}

/// Fixture tracker serving canned snapshots by tracking number (dev/tests).
///
/// Unknown tracking numbers return an empty snapshot - the carrier knows the
/// number but has reported nothing yet.
#[derive(Debug, Default)]
pub struct StaticCarrierTracker {
    snapshots: Mutex<HashMap<String, TrackingSnapshot>>,
}

impl StaticCarrierTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, tracking_number: impl Into<String>, snapshot: TrackingSnapshot) {
        if let Ok(mut snapshots) = self.snapshots.lock() {
            snapshots.insert(tracking_number.into(), snapshot);
        }
    }
}

#[async_trait]
impl CarrierTracker for StaticCarrierTracker {
    async fn fetch_snapshot(
        &self,
        tracking_number: &str,
        _carrier: Option<&str>,
        _tracking_url: Option<&str>,
    ) -> Result<TrackingSnapshot, UpstreamError> {
        let snapshots = self
            .snapshots
            .lock()
            .map_err(|_| UpstreamError::new("tracker fixture lock poisoned"))?;
        Ok(snapshots.get(tracking_number).cloned().unwrap_or_default())
    }
}

/// Tracker used when the tracking service is unreachable or unconfigured.
#[derive(Debug, Default)]
pub struct UnreachableCarrier;

#[async_trait]
impl CarrierTracker for UnreachableCarrier {
    async fn fetch_snapshot(
        &self,
        _tracking_number: &str,
        _carrier: Option<&str>,
        _tracking_url: Option<&str>,
    ) -> Result<TrackingSnapshot, UpstreamError> {
        Err(UpstreamError::new("carrier tracking service unreachable"))
    }
}
