use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/", post(fetch_tracking))
}

/// On-demand carrier snapshot fetch.
///
/// Upstream carrier failure is a 502; callers showing order status degrade
/// to the stored-status fallback instead of surfacing this.
pub async fn fetch_tracking(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::TrackingRequest>,
) -> axum::response::Response {
    if body.tracking_number.trim().is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "trackingNumber cannot be empty",
        );
    }

    match services
        .tracker
        .fetch_snapshot(
            &body.tracking_number,
            body.carrier.as_deref(),
            body.tracking_url.as_deref(),
        )
        .await
    {
        Ok(snapshot) => (StatusCode::OK, Json(dto::snapshot_to_json(&snapshot))).into_response(),
        Err(e) => {
            tracing::warn!(tracking_number = %body.tracking_number, error = %e, "carrier fetch failed");
            errors::json_error(StatusCode::BAD_GATEWAY, "upstream_error", e.to_string())
        }
    }
}
