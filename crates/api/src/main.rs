use std::sync::Arc;

#[tokio::main]
async fn main() {
    stockline_observability::init();

    let services = stockline_api::app::services::build_services().await;
    let app = stockline_api::app::build_app(Arc::new(services));

    let bind = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {bind}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
