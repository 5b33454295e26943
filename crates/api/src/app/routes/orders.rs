use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use stockline_core::{OrderId, Sku};
use stockline_orders::{resolve_display_status, ManufacturerOrder, NewOrder, OrderItem};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/:id", get(get_order))
        .route("/:id/status", post(advance_status))
        .route("/:id/apply-to-inventory", post(apply_to_inventory))
}

fn parse_order_id(raw: &str) -> Result<OrderId, axum::response::Response> {
    raw.parse().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid order id")
    })
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateOrderRequest>,
) -> axum::response::Response {
    let mut items = Vec::with_capacity(body.items.len());
    for line in body.items {
        let sku = match Sku::parse(&line.sku) {
            Ok(sku) => sku,
            Err(e) => return errors::domain_error_to_response(e),
        };
        match OrderItem::new(sku, line.product_name, line.quantity_ordered, line.unit_cost_cents) {
            Ok(item) => items.push(item),
            Err(e) => return errors::domain_error_to_response(e),
        }
    }

    let new = NewOrder {
        order_number: body.order_number,
        order_date: body.order_date.unwrap_or_else(|| Utc::now().date_naive()),
        expected_delivery: body.expected_delivery,
        tracking_number: body.tracking_number,
        tracking_url: body.tracking_url,
        carrier: body.carrier,
        items,
    };

    let order = match ManufacturerOrder::create(OrderId::new(), new) {
        Ok(order) => order,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let display = resolve_display_status(&order, None);
    let json = dto::order_to_json(&order, display);
    match services.orders.insert(order).await {
        Ok(()) => (StatusCode::CREATED, Json(json)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// List orders, optionally filtered to the `incoming` or `past` bucket.
///
/// Listing does not call out to the carrier; each row's display status is
/// resolved without a snapshot, which is exactly the conservative fallback.
/// The detail endpoint fetches live tracking.
pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ListOrdersQuery>,
) -> axum::response::Response {
    let incoming_only = match query.bucket.as_deref() {
        None => None,
        Some("incoming") => Some(true),
        Some("past") => Some(false),
        Some(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_bucket",
                "bucket must be one of: incoming, past",
            )
        }
    };

    let orders = match services.orders.list().await {
        Ok(orders) => orders,
        Err(e) => return errors::store_error_to_response(e),
    };

    let rows: Vec<serde_json::Value> = orders
        .iter()
        .filter(|o| incoming_only.is_none_or(|want| o.is_incoming() == want))
        .map(|o| dto::order_to_json(o, resolve_display_status(o, None)))
        .collect();

    (
        StatusCode::OK,
        Json(serde_json::json!({ "orders": rows })),
    )
        .into_response()
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_order_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.fulfillment.order_with_display(id).await {
        Ok((order, display)) => {
            (StatusCode::OK, Json(dto::order_to_json(&order, display))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Externally-driven stored-status transition.
pub async fn advance_status(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::AdvanceStatusRequest>,
) -> axum::response::Response {
    let id = match parse_order_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let next = match errors::parse_order_status(&body.status) {
        Ok(status) => status,
        Err(resp) => return resp,
    };

    match services.orders.advance_status(id, next, Utc::now()).await {
        Ok(order) => {
            let display = resolve_display_status(&order, None);
            (StatusCode::OK, Json(dto::order_to_json(&order, display))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// One-time, idempotent credit of a received order into the stock ledger.
///
/// The non-applied outcomes are 200s with `applied: false`, not errors.
pub async fn apply_to_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_order_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.fulfillment.apply_to_inventory(id).await {
        Ok(outcome) => (StatusCode::OK, Json(dto::apply_outcome_to_json(&outcome))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
