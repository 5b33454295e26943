use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use stockline_core::Sku;
use stockline_ledger::RegisterItem;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_inventory).post(adjust_stock))
        .route("/register", post(register_item))
        .route("/overwrite", post(overwrite_stock))
}

/// Merged catalog view across both origins.
pub async fn list_inventory(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.catalog.merged_catalog().await {
        Ok(entries) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "inventory": entries.iter().map(dto::catalog_entry_to_json).collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Signed-delta ledger adjustment.
pub async fn adjust_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::AdjustStockRequest>,
) -> axum::response::Response {
    let sku = match Sku::parse(&body.sku) {
        Ok(sku) => sku,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.ledger.adjust(&sku, body.quantity).await {
        Ok(entry) => (StatusCode::OK, Json(dto::ledger_entry_to_json(&entry))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn register_item(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterItemRequest>,
) -> axum::response::Response {
    let sku = match Sku::parse(&body.sku) {
        Ok(sku) => sku,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let item = RegisterItem {
        sku,
        name: body.name,
        price_cents: body.price_cents,
        initial_quantity: body.initial_quantity,
        min_stock: body.min_stock,
        location: body.location,
    };

    match services.ledger.register(item).await {
        Ok(entry) => (StatusCode::CREATED, Json(dto::ledger_entry_to_json(&entry))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Absolute overwrite; a distinct operation from the signed adjustment.
pub async fn overwrite_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::OverwriteStockRequest>,
) -> axum::response::Response {
    let sku = match Sku::parse(&body.sku) {
        Ok(sku) => sku,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.ledger.overwrite(&sku, body.quantity).await {
        Ok(entry) => (StatusCode::OK, Json(dto::ledger_entry_to_json(&entry))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
