use axum::{routing::get, Router};

pub mod inventory;
pub mod orders;
pub mod system;
pub mod tracking;

/// Router for the whole REST surface.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .nest("/api/inventory", inventory::router())
        .nest("/api/manufacturer-orders", orders::router())
        .nest("/api/tracking", tracking::router())
}
