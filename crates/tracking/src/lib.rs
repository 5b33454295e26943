//! Carrier tracking domain module.
//!
//! Snapshots are ephemeral: fetched on demand per order, cached only in
//! request-scoped memory, never persisted.

pub mod snapshot;

pub use snapshot::{CarrierStatus, TrackingEvent, TrackingSnapshot};
