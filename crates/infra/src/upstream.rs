//! Upstream collaborator failure type.

use thiserror::Error;

/// An external system of record (Shopify, carrier tracking) was unreachable
/// or returned an error.
///
/// Wherever a degrade path is defined, callers recover from this locally
/// (local-only catalog, conservative display-status fallback) instead of
/// propagating a hard failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("upstream failure: {0}")]
pub struct UpstreamError(pub String);

impl UpstreamError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}
